use std::collections::btree_set;
use std::collections::BTreeSet;
use std::fmt;

/// Separator between the facet and the value of a tag.
pub const FACET_SEPARATOR: &str = "::";

/// Return the facet part of a tag.
///
/// The facet is everything before the first `::`. A tag without a
/// separator is its own facet.
///
/// # Examples
///
/// ```
/// use debtags::facet_of;
///
/// assert_eq!(facet_of("role::program"), "role");
/// assert_eq!(facet_of("made-of::lang:c"), "made-of");
/// assert_eq!(facet_of("special"), "special");
/// ```
pub fn facet_of(tag: &str) -> &str {
    tag.split_once(FACET_SEPARATOR)
        .map_or(tag, |(facet, _)| facet)
}

/// The set of tags attached to one package.
///
/// Tags are kept sorted so that every printed form is alphabetical.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TagSet {
    tags: BTreeSet<String>,
}

impl TagSet {
    /// Create an empty tag set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a tag list as found in a package record or a tag database.
    ///
    /// Tags are separated by commas and/or whitespace. The compressed form
    /// `facet::{a,b}` expands to `facet::a` and `facet::b`.
    ///
    /// # Examples
    ///
    /// ```
    /// use debtags::TagSet;
    ///
    /// let tags = TagSet::parse_list("role::program, works-with::{audio,video}");
    /// assert_eq!(tags.len(), 3);
    /// assert!(tags.contains("works-with::video"));
    /// ```
    pub fn parse_list(input: &str) -> TagSet {
        let mut tags = TagSet::new();
        let mut current = String::new();
        let mut depth = 0usize;

        for c in input.chars() {
            match c {
                '{' => {
                    depth += 1;
                    current.push(c);
                }
                '}' => {
                    depth = depth.saturating_sub(1);
                    current.push(c);
                }
                ',' if depth == 0 => expand_into(&mut tags, &mut current),
                c if c.is_whitespace() => {
                    if depth == 0 {
                        expand_into(&mut tags, &mut current);
                    }
                }
                _ => current.push(c),
            }
        }
        expand_into(&mut tags, &mut current);
        tags
    }

    /// Add a tag. Returns `false` if it was already present.
    pub fn insert(&mut self, tag: impl Into<String>) -> bool {
        self.tags.insert(tag.into())
    }

    /// Remove a tag. Returns `true` if it was present.
    pub fn remove(&mut self, tag: &str) -> bool {
        self.tags.remove(tag)
    }

    /// Whether the set holds exactly this tag.
    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Number of tags.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Whether the set has no tags.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Iterate over the tags in alphabetical order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    /// The distinct facets of all tags, sorted.
    pub fn facets(&self) -> BTreeSet<&str> {
        self.iter().map(facet_of).collect()
    }

    /// Tags in `self` that are not in `other`, sorted.
    pub fn difference<'a>(&'a self, other: &'a TagSet) -> impl Iterator<Item = &'a str> {
        self.tags.difference(&other.tags).map(String::as_str)
    }

    /// Keep only the tags for which `keep` returns `true`.
    pub fn retained(&self, mut keep: impl FnMut(&str) -> bool) -> TagSet {
        self.iter().filter(|tag| keep(*tag)).collect()
    }
}

/// Push the pending item into `tags`, expanding `prefix{a,b}` groups.
fn expand_into(tags: &mut TagSet, current: &mut String) {
    if current.is_empty() {
        return;
    }
    let item = std::mem::take(current);

    match item.find('{') {
        Some(open) if item.ends_with('}') => {
            let prefix = &item[..open];
            let body = &item[open + 1..item.len() - 1];
            for value in body.split(',').filter(|v| !v.is_empty()) {
                tags.insert(format!("{prefix}{value}"));
            }
        }
        _ => {
            tags.insert(item);
        }
    }
}

impl<S: Into<String>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        TagSet {
            tags: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<S: Into<String>> Extend<S> for TagSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.tags.extend(iter.into_iter().map(Into::into));
    }
}

impl IntoIterator for TagSet {
    type Item = String;
    type IntoIter = btree_set::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.tags.into_iter()
    }
}

impl fmt::Display for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, tag) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{tag}")?;
        }
        Ok(())
    }
}
