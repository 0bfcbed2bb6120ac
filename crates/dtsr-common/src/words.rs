//! Whole-word identifier matching.
//!
//! A name is "used" in a text iff some occurrence is bracketed on both
//! sides by a non-identifier byte or the text boundary. Matching is linear
//! in the haystack per query: a substring search (memchr) followed by a
//! boundary check at each hit. Finders are compiled once per needle and
//! kept in a bounded process-wide cache.

use crate::cache::BoundedCache;
use crate::cursor::is_ident_char;
use crate::limits::FINDER_CACHE_CAP;
use memchr::memmem::Finder;
use once_cell::sync::Lazy;
use std::sync::Mutex;

static FINDER_CACHE: Lazy<Mutex<BoundedCache<String, Finder<'static>>>> =
    Lazy::new(|| Mutex::new(BoundedCache::new(FINDER_CACHE_CAP)));

/// True when `needle` occurs in `haystack` as a whole word.
pub fn contains_word(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() || haystack.len() < needle.len() {
        return false;
    }

    let finder = {
        let mut cache = match FINDER_CACHE.lock() {
            Ok(guard) => guard,
            // A poisoned lock only means another thread panicked while
            // inserting; the cache contents are still usable.
            Err(poisoned) => poisoned.into_inner(),
        };
        match cache.get(needle) {
            Some(f) => f.clone(),
            None => {
                let f = Finder::new(needle.as_bytes()).into_owned();
                cache.insert(needle.to_string(), f.clone());
                f
            }
        }
    };

    let bytes = haystack.as_bytes();
    for start in finder.find_iter(bytes) {
        let end = start + needle.len();
        let left_ok = start == 0 || !is_ident_char(bytes[start - 1]);
        let right_ok = end == bytes.len() || !is_ident_char(bytes[end]);
        if left_ok && right_ok {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_word_hit() {
        assert!(contains_word("function f(x: Config): void", "Config"));
    }

    #[test]
    fn test_prefix_is_not_a_word() {
        // `use` must not match inside `useCallback`
        assert!(!contains_word("const cb = useCallback(fn)", "use"));
    }

    #[test]
    fn test_suffix_is_not_a_word() {
        assert!(!contains_word("type MyConfig = {}", "Config"));
    }

    #[test]
    fn test_boundary_at_text_edges() {
        assert!(contains_word("Config", "Config"));
        assert!(contains_word("Config | null", "Config"));
    }

    #[test]
    fn test_dollar_and_underscore_are_identifier_bytes() {
        assert!(!contains_word("const $use = 1", "use"));
        assert!(!contains_word("const use_ = 1", "use"));
    }

    #[test]
    fn test_repeated_queries_share_cached_finder() {
        for _ in 0..3 {
            assert!(contains_word("a Config b", "Config"));
        }
    }
}
