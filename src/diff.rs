use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use crate::collection::TagCollection;
use crate::error::{Error, Result};
use crate::tag::TagSet;

/// A single signed tag change.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TagChange {
    /// `+tag`
    Added(String),
    /// `-tag`
    Removed(String),
}

impl TagChange {
    /// The tag being changed.
    pub fn tag(&self) -> &str {
        match self {
            TagChange::Added(tag) | TagChange::Removed(tag) => tag,
        }
    }
}

impl FromStr for TagChange {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if let Some(tag) = s.strip_prefix('+').filter(|t| !t.is_empty()) {
            Ok(TagChange::Added(tag.to_string()))
        } else if let Some(tag) = s.strip_prefix('-').filter(|t| !t.is_empty()) {
            Ok(TagChange::Removed(tag.to_string()))
        } else {
            Err(s.to_string())
        }
    }
}

impl fmt::Display for TagChange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TagChange::Added(tag) => write!(f, "+{tag}"),
            TagChange::Removed(tag) => write!(f, "-{tag}"),
        }
    }
}

/// The tag changes of one package.
///
/// Additions come first, then removals, each group sorted by tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDiff {
    /// Package name.
    pub package: String,
    /// Ordered changes.
    pub changes: Vec<TagChange>,
}

impl PackageDiff {
    fn between(package: &str, before: &TagSet, after: &TagSet) -> PackageDiff {
        let added = after.difference(before).map(|t| TagChange::Added(t.to_string()));
        let removed = before.difference(after).map(|t| TagChange::Removed(t.to_string()));
        PackageDiff {
            package: package.to_string(),
            changes: added.chain(removed).collect(),
        }
    }
}

impl fmt::Display for PackageDiff {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: ", self.package)?;
        for (i, change) in self.changes.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{change}")?;
        }
        Ok(())
    }
}

/// Compare two collections.
///
/// Packages only in `system` lose all their tags, packages only in `user`
/// gain all of theirs. Packages without changes are omitted. The result is
/// sorted by package name.
///
/// # Examples
///
/// ```
/// use debtags::{diff, TagCollection};
///
/// let system = TagCollection::parse("p: x, y\n").unwrap();
/// let user = TagCollection::parse("p: y, z\n").unwrap();
/// let changes = diff(&system, &user);
/// assert_eq!(changes.len(), 1);
/// assert_eq!(changes[0].to_string(), "p: +z, -x");
/// ```
pub fn diff(system: &TagCollection, user: &TagCollection) -> Vec<PackageDiff> {
    let empty = TagSet::new();
    let packages: BTreeSet<&str> = system.package_names().chain(user.package_names()).collect();

    packages
        .into_iter()
        .map(|package| {
            let before = system.get(package).unwrap_or(&empty);
            let after = user.get(package).unwrap_or(&empty);
            PackageDiff::between(package, before, after)
        })
        .filter(|d| !d.changes.is_empty())
        .collect()
}

/// A set of per-package tag changes that can be applied to a collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagPatch {
    packages: BTreeMap<String, Vec<TagChange>>,
}

impl TagPatch {
    /// Build a patch from the output of [`diff`].
    pub fn from_diff(diffs: impl IntoIterator<Item = PackageDiff>) -> TagPatch {
        let mut patch = TagPatch::default();
        for d in diffs {
            patch.packages.entry(d.package).or_default().extend(d.changes);
        }
        patch
    }

    /// Parse patch lines of the form `<pkg>: +tag, -tag`.
    ///
    /// # Examples
    ///
    /// ```
    /// use debtags::{TagCollection, TagPatch};
    ///
    /// let patch = TagPatch::parse("vim: +use::editing, -use::viewing\n").unwrap();
    /// let coll = TagCollection::parse("vim: role::program, use::viewing\n").unwrap();
    /// let patched = patch.apply(&coll);
    /// assert_eq!(patched.serialize(), "vim: role::program, use::editing\n");
    /// ```
    pub fn parse(input: &str) -> Result<TagPatch> {
        let mut patch = TagPatch::default();

        for (index, line) in input.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let invalid = || Error::InvalidPatch {
                line: index + 1,
                content: line.to_string(),
            };

            let (package, changes) = line.split_once(':').ok_or_else(invalid)?;
            let package = package.trim();
            if package.is_empty() {
                return Err(invalid());
            }

            let changes = changes
                .split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(|c| c.parse::<TagChange>().map_err(|_| invalid()))
                .collect::<Result<Vec<_>>>()?;
            patch
                .packages
                .entry(package.to_string())
                .or_default()
                .extend(changes);
        }

        Ok(patch)
    }

    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.packages.values().all(Vec::is_empty)
    }

    /// Apply the changes, returning the patched collection.
    ///
    /// Packages named in the patch but missing from `coll` are created.
    pub fn apply(&self, coll: &TagCollection) -> TagCollection {
        let mut patched: BTreeMap<String, TagSet> = coll
            .iter()
            .map(|(name, tags)| (name.to_string(), tags.clone()))
            .collect();

        for (package, changes) in &self.packages {
            let tags = patched.entry(package.clone()).or_default();
            for change in changes {
                match change {
                    TagChange::Added(tag) => {
                        tags.insert(tag.as_str());
                    }
                    TagChange::Removed(tag) => {
                        tags.remove(tag);
                    }
                }
            }
        }

        patched.into_iter().collect()
    }
}

impl fmt::Display for TagPatch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (package, changes) in &self.packages {
            if changes.is_empty() {
                continue;
            }
            let changes: Vec<String> = changes.iter().map(|c| c.to_string()).collect();
            writeln!(f, "{package}: {}", changes.join(", "))?;
        }
        Ok(())
    }
}
