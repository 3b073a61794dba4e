//! Compiled regex patterns.
//!
//! Compiled once on first use.

use once_cell::sync::Lazy;
use regex::Regex;

/// API keys are UUID v4 strings.
pub static RE_API_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$")
        .unwrap()
});

/// Runs of path separators, for counting folder depth.
pub static RE_PATH_SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\\/]+").unwrap());

/// Returns true when `key` looks like a usable API key.
pub fn is_valid_api_key(key: &str) -> bool {
    RE_API_KEY.is_match(key.trim())
}
