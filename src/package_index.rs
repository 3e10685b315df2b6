use std::collections::BTreeMap;

use crate::collection::{TagCollection, TagSource};
use crate::deb822::{Record, RecordReader};
use crate::error::Result;
use crate::tag::TagSet;

/// Tag-relevant data of one package from a package index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageEntry {
    /// Package name.
    pub name: String,
    /// Tags from the `Tag` field.
    pub tags: TagSet,
    /// The `Description` field.
    pub description: Option<String>,
}

impl PackageEntry {
    /// Extract the entry from a package record.
    ///
    /// Returns `None` when the record has no `Package` field.
    pub fn from_record(record: &Record) -> Option<PackageEntry> {
        let name = record.get("Package")?.to_string();
        let tags = record.get("Tag").map(TagSet::parse_list).unwrap_or_default();
        Some(PackageEntry {
            name,
            tags,
            description: record.get("Description").map(str::to_string),
        })
    }

    /// First line of the description.
    pub fn short_description(&self) -> Option<&str> {
        self.description
            .as_deref()
            .map(|d| d.split('\n').next().unwrap_or_default())
    }
}

/// Packages read from an index of package records, such as an APT
/// `Packages` file or a `dpkg` status file.
///
/// When a package appears several times (one record per version), its tag
/// sets are merged and the first description is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageIndex {
    entries: BTreeMap<String, PackageEntry>,
}

impl PackageIndex {
    /// Parse a package index.
    ///
    /// Records without a `Package` field are skipped.
    ///
    /// # Examples
    ///
    /// ```
    /// use debtags::PackageIndex;
    ///
    /// let input = "\
    /// Package: vim
    /// Version: 2:9.0
    /// Tag: role::program, use::{editing,viewing}
    /// Description: Vi IMproved - enhanced vi editor
    ///  Vim is an almost compatible version of the UNIX editor Vi.
    /// ";
    /// let index = PackageIndex::parse(input).unwrap();
    /// let vim = index.get("vim").unwrap();
    /// assert_eq!(vim.tags.len(), 3);
    /// assert_eq!(vim.short_description(), Some("Vi IMproved - enhanced vi editor"));
    /// ```
    pub fn parse(input: &str) -> Result<PackageIndex> {
        let mut index = PackageIndex::default();
        for record in RecordReader::new(input) {
            let record = record?;
            match PackageEntry::from_record(&record) {
                Some(entry) => index.push(entry),
                None => tracing::warn!(record = %record, "package record without Package field"),
            }
        }
        tracing::debug!(packages = index.len(), "loaded package index");
        Ok(index)
    }

    fn push(&mut self, entry: PackageEntry) {
        match self.entries.get_mut(&entry.name) {
            Some(existing) => {
                existing.tags.extend(entry.tags);
                if existing.description.is_none() {
                    existing.description = entry.description;
                }
            }
            None => {
                self.entries.insert(entry.name.clone(), entry);
            }
        }
    }

    /// Look up a package.
    pub fn get(&self, name: &str) -> Option<&PackageEntry> {
        self.entries.get(name)
    }

    /// Entries sorted by package name.
    pub fn entries(&self) -> impl Iterator<Item = &PackageEntry> {
        self.entries.values()
    }

    /// Number of packages.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index has no packages.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The tags of every package as a collection.
    pub fn to_collection(&self) -> TagCollection {
        self.entries()
            .map(|e| (e.name.as_str(), e.tags.clone()))
            .collect()
    }
}

impl TagSource for PackageIndex {
    fn packages(&self) -> Box<dyn Iterator<Item = (&str, &TagSet)> + '_> {
        Box::new(self.entries().map(|e| (e.name.as_str(), &e.tags)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PACKAGES: &str = "\
Package: vim
Version: 2:9.0.1378-2
Tag: devel::editor, interface::text-mode, role::program,
 use::editing
Description: Vi IMproved - enhanced vi editor

Package: libc6
Version: 2.36-9
Description: GNU C Library: Shared libraries

Version: 1.0
Description: broken record without a name

Package: vim
Version: 2:9.1.0016-1
Tag: works-with::text
Description: Vi IMproved - newer
";

    #[test]
    fn parse_index() {
        let index = PackageIndex::parse(PACKAGES).unwrap();
        assert_eq!(index.len(), 2);
        let names: Vec<_> = index.entries().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["libc6", "vim"]);
    }

    #[test]
    fn tag_field_with_continuation() {
        let index = PackageIndex::parse(PACKAGES).unwrap();
        let vim = index.get("vim").unwrap();
        assert!(vim.tags.contains("use::editing"));
        assert!(vim.tags.contains("devel::editor"));
    }

    #[test]
    fn versions_merge_tags_and_keep_first_description() {
        let index = PackageIndex::parse(PACKAGES).unwrap();
        let vim = index.get("vim").unwrap();
        assert_eq!(vim.tags.len(), 5);
        assert_eq!(vim.short_description(), Some("Vi IMproved - enhanced vi editor"));
    }

    #[test]
    fn untagged_package() {
        let index = PackageIndex::parse(PACKAGES).unwrap();
        assert!(index.get("libc6").unwrap().tags.is_empty());
    }

    #[test]
    fn as_tag_source() {
        let index = PackageIndex::parse(PACKAGES).unwrap();
        let coll = index.to_collection();
        assert_eq!(coll.len(), 2);
        let from_source: Vec<_> = index.packages().map(|(name, _)| name).collect();
        assert_eq!(from_source, vec!["libc6", "vim"]);
    }

    #[test]
    fn malformed_index() {
        assert!(PackageIndex::parse("Package: a\nnonsense\n").is_err());
    }
}
