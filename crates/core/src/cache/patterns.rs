//! Glob matching for store keys.
//!
//! Implements the subset of the store's `MATCH` syntax the facade relies on:
//! `*` matches any sequence of characters (including none), `?` matches
//! exactly one character, and `\` escapes the next character.

/// Checks if a key matches a glob pattern.
///
/// # Examples
///
/// ```
/// use domaincache_core::cache::pattern_matches;
///
/// assert!(pattern_matches("user:123", "user:123"));
/// assert!(pattern_matches("c75c5f:user:*", "c75c5f:user:123:profile"));
/// assert!(pattern_matches("c75c5f:*:profile", "c75c5f:user:9:profile"));
/// assert!(pattern_matches("session:?", "session:a"));
/// assert!(!pattern_matches("c75c5f:user:*", "7c84a4:user:123"));
/// ```
pub fn pattern_matches(pattern: &str, key: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let key: Vec<char> = key.chars().collect();

    let (mut p, mut k) = (0, 0);
    // Position of the last `*` seen and the key index it was tried against.
    let mut backtrack: Option<(usize, usize)> = None;

    while k < key.len() {
        match pattern.get(p).copied() {
            Some('*') => {
                backtrack = Some((p, k));
                p += 1;
                continue;
            }
            Some('?') => {
                p += 1;
                k += 1;
                continue;
            }
            Some('\\') if p + 1 < pattern.len() && pattern[p + 1] == key[k] => {
                p += 2;
                k += 1;
                continue;
            }
            Some(c) if c != '\\' && c == key[k] => {
                p += 1;
                k += 1;
                continue;
            }
            _ => {}
        }

        // Mismatch: let the last `*` swallow one more character.
        match backtrack {
            Some((star, matched)) => {
                p = star + 1;
                k = matched + 1;
                backtrack = Some((star, matched + 1));
            }
            None => return false,
        }
    }

    pattern[p..].iter().all(|&c| c == '*')
}
