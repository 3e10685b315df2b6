use std::collections::{btree_map, BTreeMap};

use crate::error::{Error, Result};
use crate::output::OutputMode;
use crate::tag::TagSet;
use crate::vocabulary::Vocabulary;

/// A provider of `(package, tags)` pairs.
///
/// Each call to [`TagSource::packages`] walks the data once, in order.
pub trait TagSource {
    /// Iterate over every package and its tags.
    fn packages(&self) -> Box<dyn Iterator<Item = (&str, &TagSet)> + '_>;
}

/// Mapping from package name to its tags.
///
/// Packages are kept sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagCollection {
    packages: BTreeMap<String, TagSet>,
}

impl TagCollection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a tag database.
    ///
    /// Each line is `<pkg>: <tag>, <tag>, ...`. Several packages sharing
    /// the same tags may be listed before the colon, separated by commas.
    /// Blank lines are skipped.
    ///
    /// # Examples
    ///
    /// ```
    /// use debtags::TagCollection;
    ///
    /// let input = "\
    /// vim: role::program, use::editing
    /// libc6, libc6-dev: role::shared-lib
    /// ";
    /// let coll = TagCollection::parse(input).unwrap();
    /// assert_eq!(coll.len(), 3);
    /// assert!(coll.get("libc6-dev").unwrap().contains("role::shared-lib"));
    /// ```
    pub fn parse(input: &str) -> Result<TagCollection> {
        let mut coll = TagCollection::new();

        for (index, line) in input.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let invalid = || Error::InvalidCollectionLine {
                line: index + 1,
                content: line.to_string(),
            };

            let (names, tags) = line.split_once(':').ok_or_else(invalid)?;
            let names: Vec<&str> = names
                .split(',')
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .collect();
            if names.is_empty() {
                return Err(invalid());
            }

            let tags = TagSet::parse_list(tags);
            for name in names {
                coll.insert(name, tags.clone());
            }
        }

        tracing::debug!(packages = coll.len(), "loaded tag collection");
        Ok(coll)
    }

    /// Add tags to a package, creating it if needed.
    pub fn insert(&mut self, package: impl Into<String>, tags: TagSet) {
        self.packages.entry(package.into()).or_default().extend(tags);
    }

    /// Tags of a package, if present.
    pub fn get(&self, package: &str) -> Option<&TagSet> {
        self.packages.get(package)
    }

    /// Tags of a package that must be present.
    pub fn tags_of(&self, package: &str) -> Result<&TagSet> {
        self.get(package)
            .ok_or_else(|| Error::UnknownPackage(package.to_string()))
    }

    /// Whether the package is present.
    pub fn contains(&self, package: &str) -> bool {
        self.packages.contains_key(package)
    }

    /// Number of packages.
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Whether the collection has no packages.
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Packages and their tags, sorted by package name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TagSet)> {
        self.packages.iter().map(|(name, tags)| (name.as_str(), tags))
    }

    /// Package names, sorted.
    pub fn package_names(&self) -> impl Iterator<Item = &str> {
        self.packages.keys().map(String::as_str)
    }

    /// Keep only the tags defined in the vocabulary.
    ///
    /// Packages left with no tags remain in the collection.
    pub fn filter_by_vocabulary(&self, vocabulary: &Vocabulary) -> TagCollection {
        self.iter()
            .map(|(name, tags)| {
                (
                    name.to_string(),
                    tags.retained(|tag| vocabulary.contains_tag(tag)),
                )
            })
            .collect()
    }

    /// The same collection with every tag replaced by its facet.
    pub fn facet_collection(&self) -> TagCollection {
        self.iter()
            .map(|(name, tags)| {
                let facets: TagSet = tags.facets().into_iter().collect();
                (name.to_string(), facets)
            })
            .collect()
    }

    /// Packages having exactly this tag, sorted.
    pub fn packages_with_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.iter()
            .filter(move |(_, tags)| tags.contains(tag))
            .map(|(name, _)| name)
    }

    /// Number of packages carrying each tag.
    pub fn tag_cardinality(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for tag in self.packages.values().flat_map(|tags| tags.iter()) {
            *counts.entry(tag).or_insert(0) += 1;
        }
        counts
    }

    /// Print the collection in the given mode, one line per package.
    pub fn format_lines(&self, mode: OutputMode) -> impl Iterator<Item = String> + '_ {
        self.iter()
            .filter_map(move |(name, tags)| mode.format(name, tags))
    }

    /// Serialize back to the tag database format.
    ///
    /// Packages without tags are omitted.
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        for line in self.format_lines(OutputMode::Tags) {
            out.push_str(&line);
            out.push('\n');
        }
        out
    }
}

impl TagSource for TagCollection {
    fn packages(&self) -> Box<dyn Iterator<Item = (&str, &TagSet)> + '_> {
        Box::new(self.iter())
    }
}

impl<S: Into<String>> FromIterator<(S, TagSet)> for TagCollection {
    fn from_iter<I: IntoIterator<Item = (S, TagSet)>>(iter: I) -> Self {
        let mut coll = TagCollection::new();
        coll.extend(iter);
        coll
    }
}

impl<S: Into<String>> Extend<(S, TagSet)> for TagCollection {
    fn extend<I: IntoIterator<Item = (S, TagSet)>>(&mut self, iter: I) {
        for (name, tags) in iter {
            self.insert(name, tags);
        }
    }
}

impl IntoIterator for TagCollection {
    type Item = (String, TagSet);
    type IntoIter = btree_map::IntoIter<String, TagSet>;

    fn into_iter(self) -> Self::IntoIter {
        self.packages.into_iter()
    }
}
