use std::{env, time::Duration};

/// Fixed timeout for establishing the store connection.
pub const CONNECT_TIMEOUT: Duration = Duration::from_millis(2500);

/// Connection settings for a [`CacheFacade`](crate::CacheFacade).
///
/// Built once by the application and handed to the facade; changing any
/// setting means building a new facade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Store host (default: "127.0.0.1")
    pub host: String,
    /// Store port (default: 6379)
    pub port: u16,
    /// Password sent with AUTH, if any (default: none)
    pub password: Option<String>,
    /// Database index selected after connecting (default: 0)
    pub database: i64,
    /// Use a reconnecting connection that outlives dropped sockets (default: false)
    pub persistent: bool,
    /// When false the facade never connects and every operation fails (default: true)
    pub active: bool,
    /// Domain the key namespace is derived from (default: none, i.e. "global")
    pub domain: Option<String>,
}

impl CacheConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `REDIS_HOST` - Store host (default: "127.0.0.1")
    /// - `REDIS_PORT` - Store port (default: 6379)
    /// - `REDIS_PASSWORD` - AUTH password, empty means none
    /// - `REDIS_DB` - Database index (default: 0)
    /// - `REDIS_PERSISTENT` - Reconnecting connection (default: false)
    /// - `REDIS_ACTIVE` - Connect at all (default: true)
    /// - `CACHE_DOMAIN` - Namespace domain, falling back to `BASE_URL`
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Values that are missing or fail to parse keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::new();
        Self {
            host: lookup("REDIS_HOST")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.host),
            port: lookup("REDIS_PORT")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.port),
            password: lookup("REDIS_PASSWORD").filter(|v| !v.is_empty()),
            database: lookup("REDIS_DB")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.database),
            persistent: lookup("REDIS_PERSISTENT")
                .and_then(|v| parse_bool(&v))
                .unwrap_or(defaults.persistent),
            active: lookup("REDIS_ACTIVE")
                .and_then(|v| parse_bool(&v))
                .unwrap_or(defaults.active),
            domain: lookup("CACHE_DOMAIN")
                .filter(|v| !v.trim().is_empty())
                .or_else(|| lookup("BASE_URL").filter(|v| !v.trim().is_empty())),
        }
    }

    /// Hard-coded defaults, ignoring the environment.
    pub fn new() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 6379,
            password: None,
            database: 0,
            persistent: false,
            active: true,
            domain: None,
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the AUTH password. An empty password disables AUTH.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        let password = password.into();
        self.password = (!password.is_empty()).then_some(password);
        self
    }

    pub fn with_database(mut self, database: i64) -> Self {
        self.database = database;
        self
    }

    pub fn with_persistent(mut self, persistent: bool) -> Self {
        self.persistent = persistent;
        self
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// The `host:port` pair, for logging.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
