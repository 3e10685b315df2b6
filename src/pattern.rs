use std::fmt;

use crate::error::{Error, Result};
use crate::tag::TagSet;

/// A compiled glob atom of a tag expression.
///
/// The glob must match a whole tag (`use::*` matches `use::editing` but
/// `use` does not). Supported syntax is `*`, `?`, `[...]` and `[!...]`.
/// Matching is case-sensitive.
///
/// Inside a tag expression `!` always starts a negation, so `[!...]` is only
/// reachable when building a pattern directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPattern {
    source: String,
    glob: glob::Pattern,
}

impl TagPattern {
    /// Compile a glob atom.
    ///
    /// # Examples
    ///
    /// ```
    /// use debtags::{TagPattern, TagSet};
    ///
    /// let pattern = TagPattern::new("use::*").unwrap();
    /// assert!(pattern.matches_set(&TagSet::parse_list("use::editing")));
    /// assert!(!pattern.matches_set(&TagSet::parse_list("role::program")));
    ///
    /// assert!(TagPattern::new("use::[edit").is_err());
    /// ```
    pub fn new(source: &str) -> Result<Self> {
        let glob = glob::Pattern::new(source).map_err(|e| Error::Pattern {
            pattern: source.to_string(),
            reason: e.msg.to_string(),
        })?;
        Ok(TagPattern {
            source: source.to_string(),
            glob,
        })
    }

    /// The atom as it was written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether a single tag matches.
    pub fn matches(&self, tag: &str) -> bool {
        self.glob.matches(tag)
    }

    /// Whether any tag of the set matches.
    pub fn matches_set(&self, tags: &TagSet) -> bool {
        tags.iter().any(|tag| self.matches(tag))
    }
}

impl fmt::Display for TagPattern {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.source)
    }
}
