mod error;
mod keys;
mod patterns;
mod traits;
mod value;

pub use error::{CacheError, Result};
pub use keys::{
    namespace_prefix, namespaced_key, normalize_domain, strip_namespace, GLOBAL_PREFIX,
    PREFIX_LEN,
};
pub use patterns::pattern_matches;
pub use traits::{KeyValueStore, ScanPage};
pub use value::CacheValue;
