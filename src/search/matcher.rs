//! Text matching over search criteria.
//!
//! Two modes, chosen once per search:
//!
//! - default: case-folded substring test, with a single leading/trailing
//!   `*` stripped from the pattern;
//! - whole word: a word-boundary regex where a leading or trailing `*`
//!   replaces the `\b` anchor on that side with `\w*`, so `my*` matches
//!   words starting with `my` and `*va*` matches `va` anywhere inside a
//!   word.
//!
//! Wildcard-only patterns (`*`, `**`) match every non-empty candidate in
//! both modes. An empty search string matches nothing — string-less
//! searches are driven by node-type filters, handled in the engine.

use dashmap::DashMap;
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use std::sync::Arc;
use tracing::debug;

use crate::config::SearchCriteria;
use crate::errors::{SearchError, SearchResult};

/// Compiled whole-word patterns, reused across searches.
static WORD_PATTERN_CACHE: Lazy<DashMap<(String, bool), Arc<Regex>>> = Lazy::new(DashMap::new);

/// Strategy for text matching
#[derive(Debug, Clone)]
enum MatchStrategy {
    /// Empty search string: nothing matches.
    Inert,
    /// Case-folded substring test of the wildcard-stripped pattern.
    Contains {
        needle: String,
        case_sensitive: bool,
    },
    /// Word-boundary regex with relocated wildcards.
    WholeWord(Arc<Regex>),
}

/// Handles text matching for one search
#[derive(Debug, Clone)]
pub struct TextMatcher {
    strategy: MatchStrategy,
}

impl TextMatcher {
    /// Builds the matcher for the given criteria.
    pub fn from_criteria(criteria: &SearchCriteria) -> SearchResult<Self> {
        let pattern = criteria.search_string.as_str();
        let strategy = if pattern.is_empty() {
            MatchStrategy::Inert
        } else if criteria.whole_word {
            MatchStrategy::WholeWord(cached_word_regex(pattern, criteria.case_sensitive)?)
        } else {
            let (stripped, _, _) = strip_wildcards(pattern);
            let needle = if criteria.case_sensitive {
                stripped.to_string()
            } else {
                stripped.to_lowercase()
            };
            MatchStrategy::Contains {
                needle,
                case_sensitive: criteria.case_sensitive,
            }
        };
        Ok(Self { strategy })
    }

    /// Whether the matcher can ever match (i.e. a search string is set).
    pub fn is_inert(&self) -> bool {
        matches!(self.strategy, MatchStrategy::Inert)
    }

    /// Tests a candidate text. Empty candidates never match.
    pub fn matches(&self, candidate: &str) -> bool {
        if candidate.is_empty() {
            return false;
        }
        match &self.strategy {
            MatchStrategy::Inert => false,
            MatchStrategy::Contains {
                needle,
                case_sensitive,
            } => {
                if *case_sensitive {
                    candidate.contains(needle.as_str())
                } else {
                    candidate.to_lowercase().contains(needle.as_str())
                }
            }
            MatchStrategy::WholeWord(regex) => regex.is_match(candidate),
        }
    }
}

/// Strips one leading and one trailing `*`, reporting which were present.
fn strip_wildcards(pattern: &str) -> (&str, bool, bool) {
    let leading = pattern.starts_with('*');
    let trailing = pattern.ends_with('*');
    let mut stripped = pattern;
    if leading {
        stripped = &stripped[1..];
    }
    if trailing && !stripped.is_empty() {
        stripped = &stripped[..stripped.len() - 1];
    }
    (stripped, leading, trailing)
}

fn cached_word_regex(pattern: &str, case_sensitive: bool) -> SearchResult<Arc<Regex>> {
    let key = (pattern.to_string(), case_sensitive);
    if let Some(entry) = WORD_PATTERN_CACHE.get(&key) {
        return Ok(entry.clone());
    }

    let (stripped, leading, trailing) = strip_wildcards(pattern);
    let prefix = if leading { r"\w*" } else { r"\b" };
    let suffix = if trailing { r"\w*" } else { r"\b" };
    let source = format!("{}{}{}", prefix, regex::escape(stripped), suffix);
    debug!("compiling whole-word pattern {source}");

    let regex = RegexBuilder::new(&source)
        .case_insensitive(!case_sensitive)
        .build()
        .map_err(|e| SearchError::invalid_pattern(e.to_string()))?;
    let regex = Arc::new(regex);
    WORD_PATTERN_CACHE.insert(key, regex.clone());
    Ok(regex)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(pattern: &str, whole_word: bool, case_sensitive: bool) -> TextMatcher {
        let mut criteria = SearchCriteria::new(pattern);
        criteria.whole_word = whole_word;
        criteria.case_sensitive = case_sensitive;
        TextMatcher::from_criteria(&criteria).unwrap()
    }

    #[test]
    fn test_contains_default() {
        let m = matcher("test", false, false);
        assert!(m.matches("my_test_var"));
        assert!(m.matches("TEST CASE"));
        assert!(!m.matches("tes-t"));
        assert!(!m.matches(""));
    }

    #[test]
    fn test_contains_case_sensitive() {
        let m = matcher("TODO", false, true);
        assert!(m.matches("TODO: fix this"));
        assert!(!m.matches("todo: fix this"));
    }

    #[test]
    fn test_contains_strips_wildcards() {
        let m = matcher("*test*", false, false);
        assert!(m.matches("my_test_var"));
        let m = matcher("test*", false, false);
        assert!(m.matches("contest"));
    }

    #[test]
    fn test_whole_word() {
        let m = matcher("my", true, false);
        assert!(m.matches("my variable"));
        assert!(m.matches("set my var"));
        assert!(!m.matches("myvar"));
        assert!(!m.matches("thingamy"));
    }

    #[test]
    fn test_whole_word_trailing_wildcard() {
        let m = matcher("my*", true, false);
        assert!(m.matches("myvar is set"));
        assert!(m.matches("my"));
        assert!(!m.matches("thingamy"));
    }

    #[test]
    fn test_whole_word_leading_wildcard() {
        let m = matcher("*var", true, false);
        assert!(m.matches("use myvar here"));
        assert!(m.matches("var"));
        assert!(!m.matches("variable"));
    }

    #[test]
    fn test_whole_word_both_wildcards() {
        let m = matcher("*va*", true, false);
        assert!(m.matches("myvariable"));
        assert!(m.matches("va"));
        assert!(!m.matches("vb"));
    }

    #[test]
    fn test_whole_word_escapes_metacharacters() {
        let m = matcher("a.b", true, false);
        assert!(m.matches("a.b"));
        assert!(!m.matches("aXb"));
    }

    #[test]
    fn test_wildcard_only_matches_everything_nonempty() {
        for whole_word in [false, true] {
            let m = matcher("*", whole_word, false);
            assert!(m.matches("anything"));
            assert!(m.matches("x"));
            assert!(!m.matches(""));
        }
    }

    #[test]
    fn test_empty_pattern_matches_nothing() {
        let m = matcher("", false, false);
        assert!(m.is_inert());
        assert!(!m.matches("anything"));
        assert!(!m.matches(""));
    }

    #[test]
    fn test_whole_word_narrows_contains() {
        let candidates = ["my_test_var", "test", "a test b", "contest", "testing"];
        let contains = matcher("test", false, false);
        let whole = matcher("test", true, false);
        for candidate in candidates {
            if whole.matches(candidate) {
                assert!(
                    contains.matches(candidate),
                    "narrowing violated: {candidate}"
                );
            }
        }
    }

    #[test]
    fn test_case_sensitive_narrows_insensitive() {
        let candidates = ["This", "this", "THIS one", "tHis"];
        let insensitive = matcher("This", false, false);
        let sensitive = matcher("This", false, true);
        for candidate in candidates {
            if sensitive.matches(candidate) {
                assert!(
                    insensitive.matches(candidate),
                    "narrowing violated: {candidate}"
                );
            }
        }
    }
}
