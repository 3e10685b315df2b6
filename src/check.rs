use std::collections::BTreeMap;
use std::fmt;

use crate::collection::TagSource;
use crate::vocabulary::Vocabulary;

/// Result of checking a tag source against the vocabulary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckReport {
    /// Number of (package, tag) pairs whose tag is not in the vocabulary.
    pub missing_total: usize,
    /// For each undefined tag, the number of packages using it.
    pub per_tag: BTreeMap<String, usize>,
}

impl CheckReport {
    /// Whether every tag in use is defined.
    pub fn is_ok(&self) -> bool {
        self.missing_total == 0
    }
}

impl fmt::Display for CheckReport {
    /// Summary followed by one line per undefined tag, sorted by tag.
    /// Writes nothing when the check passed.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_ok() {
            return Ok(());
        }
        writeln!(
            f,
            "{} tags were found in packages but not in the vocabulary",
            self.missing_total
        )?;
        writeln!(f, "This happens with:")?;
        for (tag, count) in &self.per_tag {
            let noun = if *count == 1 { "package" } else { "packages" };
            writeln!(f, " {tag} ({count} {noun})")?;
        }
        Ok(())
    }
}

/// Find tags used by packages but missing from the vocabulary.
///
/// # Examples
///
/// ```
/// use debtags::{check, TagCollection, Vocabulary};
///
/// let coll = TagCollection::parse("p: a, b\n").unwrap();
/// let voc = Vocabulary::parse("Tag: a\n").unwrap();
/// let report = check(&coll, &voc);
/// assert!(!report.is_ok());
/// assert_eq!(report.missing_total, 1);
/// assert_eq!(report.per_tag.get("b"), Some(&1));
/// ```
pub fn check<S: TagSource + ?Sized>(source: &S, vocabulary: &Vocabulary) -> CheckReport {
    let mut report = CheckReport::default();

    for (package, tags) in source.packages() {
        for tag in tags.iter().filter(|t| !vocabulary.contains_tag(t)) {
            tracing::debug!(package, tag, "tag not in vocabulary");
            report.missing_total += 1;
            *report.per_tag.entry(tag.to_string()).or_insert(0) += 1;
        }
    }

    report
}
