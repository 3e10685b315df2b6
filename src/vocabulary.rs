use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::deb822::{Record, RecordReader};
use crate::error::{Error, Result};
use crate::tag::facet_of;

/// One entry of the vocabulary, describing a tag or a facet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabularyRecord {
    record: Record,
}

impl VocabularyRecord {
    /// Wrap a parsed record.
    pub fn new(record: Record) -> Self {
        VocabularyRecord { record }
    }

    /// The `Tag` field.
    pub fn tag(&self) -> Option<&str> {
        self.record.get("Tag")
    }

    /// The `Facet` field.
    pub fn facet(&self) -> Option<&str> {
        self.record.get("Facet")
    }

    /// The tag name, or the facet name for facet records.
    pub fn name(&self) -> Option<&str> {
        self.tag().or_else(|| self.facet())
    }

    /// Full `Description` field.
    pub fn description(&self) -> Option<&str> {
        self.record.get("Description")
    }

    /// First line of the description.
    pub fn short_description(&self) -> Option<&str> {
        self.description()
            .map(|d| d.split('\n').next().unwrap_or_default())
    }

    /// Whether this record describes a facet rather than a tag.
    pub fn is_facet(&self) -> bool {
        self.tag().is_none() && self.facet().is_some()
    }

    /// The underlying field list.
    pub fn record(&self) -> &Record {
        &self.record
    }

    /// Case-insensitive substring match on the name and description.
    pub fn mentions(&self, keyword: &str) -> bool {
        let keyword = keyword.to_lowercase();
        [self.name(), self.description()]
            .into_iter()
            .flatten()
            .any(|text| text.to_lowercase().contains(&keyword))
    }
}

impl fmt::Display for VocabularyRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.record)
    }
}

/// The set of defined facets and tags.
///
/// Keeps the records in file order plus indexes by tag and facet name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    records: Vec<VocabularyRecord>,
    tags: BTreeMap<String, usize>,
    facets: BTreeMap<String, usize>,
}

impl Vocabulary {
    /// Parse a vocabulary file.
    ///
    /// Records with neither a `Tag` nor a `Facet` field are skipped.
    ///
    /// # Examples
    ///
    /// ```
    /// use debtags::Vocabulary;
    ///
    /// let input = "\
    /// Facet: role
    /// Description: Role
    ///
    /// Tag: role::program
    /// Description: Program
    /// ";
    /// let voc = Vocabulary::parse(input).unwrap();
    /// assert!(voc.contains_tag("role::program"));
    /// assert!(!voc.contains_tag("role"));
    /// assert_eq!(voc.tag("role::program").unwrap().short_description(), Some("Program"));
    /// ```
    pub fn parse(input: &str) -> Result<Vocabulary> {
        let records = RecordReader::new(input).collect::<Result<Vec<_>>>()?;
        let vocabulary = Vocabulary::from_records(records);
        tracing::debug!(
            tags = vocabulary.tags.len(),
            facets = vocabulary.facets.len(),
            "loaded vocabulary"
        );
        Ok(vocabulary)
    }

    /// Build a vocabulary from already parsed records.
    pub fn from_records(records: impl IntoIterator<Item = Record>) -> Vocabulary {
        let mut vocabulary = Vocabulary::default();
        for record in records {
            vocabulary.push(VocabularyRecord::new(record));
        }
        vocabulary
    }

    fn push(&mut self, entry: VocabularyRecord) {
        let index = self.records.len();
        if let Some(tag) = entry.tag() {
            self.tags.insert(tag.to_string(), index);
        } else if let Some(facet) = entry.facet() {
            self.facets.insert(facet.to_string(), index);
        } else {
            tracing::warn!(record = %entry.record, "vocabulary record without Tag or Facet");
            return;
        }
        self.records.push(entry);
    }

    /// All records in file order.
    pub fn records(&self) -> impl Iterator<Item = &VocabularyRecord> {
        self.records.iter()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the vocabulary has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether a tag is defined.
    pub fn contains_tag(&self, tag: &str) -> bool {
        self.tags.contains_key(tag)
    }

    /// All defined tag names, sorted.
    pub fn tag_names(&self) -> BTreeSet<&str> {
        self.tags.keys().map(String::as_str).collect()
    }

    /// Look up a tag record.
    pub fn tag(&self, name: &str) -> Result<&VocabularyRecord> {
        self.tags
            .get(name)
            .and_then(|&i| self.records.get(i))
            .ok_or_else(|| Error::UnknownTag(name.to_string()))
    }

    /// Look up a facet record.
    pub fn facet(&self, name: &str) -> Result<&VocabularyRecord> {
        self.facets
            .get(name)
            .and_then(|&i| self.records.get(i))
            .ok_or_else(|| Error::UnknownFacet(name.to_string()))
    }

    /// Facet records, sorted by facet name.
    pub fn facets(&self) -> impl Iterator<Item = &VocabularyRecord> {
        self.facets.values().filter_map(|&i| self.records.get(i))
    }

    /// Tag records belonging to a facet, sorted by tag name.
    pub fn tags_of_facet<'a>(
        &'a self,
        facet: &'a str,
    ) -> impl Iterator<Item = &'a VocabularyRecord> + 'a {
        self.tags
            .iter()
            .filter(move |(tag, _)| facet_of(tag) == facet)
            .filter_map(|(_, &i)| self.records.get(i))
    }

    /// Records whose name or description contains `keyword`, ignoring case.
    pub fn search<'a>(
        &'a self,
        keyword: &'a str,
    ) -> impl Iterator<Item = &'a VocabularyRecord> + 'a {
        self.records.iter().filter(move |r| r.mentions(keyword))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VOCABULARY: &str = "\
Facet: role
Description: Role
 Role performed by the package.

Tag: role::program
Description: Program
 Executable software.

Tag: role::shared-lib
Description: Shared Library

Facet: use
Description: Purpose

Tag: use::editing
Description: Editing

Tag: use::viewing
Description: Viewing
";

    #[test]
    fn parse_indexes_tags_and_facets() {
        let voc = Vocabulary::parse(VOCABULARY).unwrap();
        assert_eq!(voc.len(), 6);
        assert_eq!(
            voc.tag_names().into_iter().collect::<Vec<_>>(),
            vec!["role::program", "role::shared-lib", "use::editing", "use::viewing"]
        );
        assert_eq!(
            voc.facets().filter_map(|r| r.facet()).collect::<Vec<_>>(),
            vec!["role", "use"]
        );
    }

    #[test]
    fn facet_names_are_not_tags() {
        let voc = Vocabulary::parse(VOCABULARY).unwrap();
        assert!(!voc.contains_tag("role"));
        assert!(voc.facet("role").unwrap().is_facet());
    }

    #[test]
    fn lookup_unknown() {
        let voc = Vocabulary::parse(VOCABULARY).unwrap();
        assert_eq!(
            voc.tag("role::nonexistent").unwrap_err(),
            Error::UnknownTag("role::nonexistent".to_string())
        );
        assert_eq!(
            voc.facet("nope").unwrap_err(),
            Error::UnknownFacet("nope".to_string())
        );
    }

    #[test]
    fn descriptions() {
        let voc = Vocabulary::parse(VOCABULARY).unwrap();
        let program = voc.tag("role::program").unwrap();
        assert_eq!(program.short_description(), Some("Program"));
        assert_eq!(program.description(), Some("Program\nExecutable software."));
        assert_eq!(program.name(), Some("role::program"));
    }

    #[test]
    fn tags_of_facet() {
        let voc = Vocabulary::parse(VOCABULARY).unwrap();
        let names: Vec<_> = voc.tags_of_facet("use").filter_map(|r| r.tag()).collect();
        assert_eq!(names, vec!["use::editing", "use::viewing"]);
    }

    #[test]
    fn search_is_case_insensitive() {
        let voc = Vocabulary::parse(VOCABULARY).unwrap();
        let found: Vec<_> = voc.search("EXECUTABLE").filter_map(|r| r.name()).collect();
        assert_eq!(found, vec!["role::program"]);

        let found: Vec<_> = voc.search("role").filter_map(|r| r.name()).collect();
        assert_eq!(found, vec!["role", "role::program", "role::shared-lib"]);
    }

    #[test]
    fn records_without_name_are_skipped() {
        let voc = Vocabulary::parse("Description: orphan\n\nTag: a\n").unwrap();
        assert_eq!(voc.len(), 1);
        assert!(voc.contains_tag("a"));
    }

    #[test]
    fn malformed_vocabulary() {
        assert!(matches!(
            Vocabulary::parse("Tag: a\nbroken\n"),
            Err(Error::InvalidRecord { line: 2, .. })
        ));
    }
}
