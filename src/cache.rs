//! Thread-local cache of parsed patterns.
//!
//! Rule files and CLI invocations tend to apply the same pattern text to
//! many trees; parsing (and regex compilation) happens once per thread.
//! Cache is capped at 256 entries; it is cleared when full.

use crate::matcher::{parse, Matcher, PatternError};
use std::cell::RefCell;
use std::collections::HashMap;

const MAX_CACHE_ENTRIES: usize = 256;

thread_local! {
    static PATTERN_CACHE: RefCell<HashMap<String, Option<Matcher>>> =
        RefCell::new(HashMap::new());
}

/// Get a parsed pattern from cache, or parse and cache it.
///
/// Parse failures are returned and not cached.
pub fn get_or_parse_pattern(text: &str) -> Result<Option<Matcher>, PatternError> {
    PATTERN_CACHE.with(|cache| {
        if let Some(parsed) = cache.borrow().get(text) {
            return Ok(parsed.clone());
        }

        let parsed = parse(text)?;

        let mut cache = cache.borrow_mut();
        if cache.len() >= MAX_CACHE_ENTRIES {
            cache.clear();
        }
        cache.insert(text.to_string(), parsed.clone());
        Ok(parsed)
    })
}

/// Clear the pattern cache (mainly for testing).
pub fn clear_cache() {
    PATTERN_CACHE.with(|cache| {
        cache.borrow_mut().clear();
    });
}

pub fn cache_size() -> usize {
    PATTERN_CACHE.with(|cache| cache.borrow().len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caches_parsed_patterns() {
        clear_cache();
        let first = get_or_parse_pattern("(defn _ ___)").unwrap();
        let second = get_or_parse_pattern("(defn _ ___)").unwrap();
        assert_eq!(first, second);
        assert_eq!(cache_size(), 1);
        assert_eq!(get_or_parse_pattern("").unwrap(), None);
        assert_eq!(cache_size(), 2);
    }

    #[test]
    fn errors_are_not_cached() {
        clear_cache();
        assert!(get_or_parse_pattern("(defn").is_err());
        assert_eq!(cache_size(), 0);
    }

    #[test]
    fn evicts_when_full() {
        clear_cache();
        for i in 0..MAX_CACHE_ENTRIES {
            get_or_parse_pattern(&format!("(n{i})")).unwrap();
        }
        assert_eq!(cache_size(), MAX_CACHE_ENTRIES);
        get_or_parse_pattern("(overflow)").unwrap();
        assert_eq!(cache_size(), 1);
    }
}
