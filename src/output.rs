use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::tag::TagSet;

/// How a package is printed by collection and query commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum OutputMode {
    /// Just the package name.
    Names,
    /// `<pkg>: <tag>, <tag>, ...`
    #[default]
    Tags,
    /// `<pkg>: <facet>, <facet>, ...`
    Facets,
}

impl OutputMode {
    /// Format one package, or `None` when nothing should be printed.
    ///
    /// Packages without tags produce no line in the `Tags` and `Facets`
    /// modes.
    ///
    /// # Examples
    ///
    /// ```
    /// use debtags::{OutputMode, TagSet};
    ///
    /// let tags = TagSet::parse_list("use::editing, role::program, use::viewing");
    /// assert_eq!(OutputMode::Names.format("vim", &tags).as_deref(), Some("vim"));
    /// assert_eq!(
    ///     OutputMode::Tags.format("vim", &tags).as_deref(),
    ///     Some("vim: role::program, use::editing, use::viewing")
    /// );
    /// assert_eq!(OutputMode::Facets.format("vim", &tags).as_deref(), Some("vim: role, use"));
    /// assert_eq!(OutputMode::Tags.format("vim", &TagSet::new()), None);
    /// ```
    pub fn format(self, package: &str, tags: &TagSet) -> Option<String> {
        match self {
            OutputMode::Names => Some(package.to_string()),
            OutputMode::Tags if tags.is_empty() => None,
            OutputMode::Tags => Some(format!("{package}: {tags}")),
            OutputMode::Facets if tags.is_empty() => None,
            OutputMode::Facets => {
                let facets: Vec<&str> = tags.facets().into_iter().collect();
                Some(format!("{package}: {}", facets.join(", ")))
            }
        }
    }
}

impl FromStr for OutputMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "names" => Ok(OutputMode::Names),
            "tags" => Ok(OutputMode::Tags),
            "facets" => Ok(OutputMode::Facets),
            _ => Err(Error::InvalidOutputMode(s.to_string())),
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            OutputMode::Names => "names",
            OutputMode::Tags => "tags",
            OutputMode::Facets => "facets",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_mode_prints_untagged_packages() {
        assert_eq!(
            OutputMode::Names.format("foo", &TagSet::new()).as_deref(),
            Some("foo")
        );
    }

    #[test]
    fn empty_sets_are_suppressed() {
        assert_eq!(OutputMode::Tags.format("foo", &TagSet::new()), None);
        assert_eq!(OutputMode::Facets.format("foo", &TagSet::new()), None);
    }

    #[test]
    fn facets_are_deduplicated() {
        let tags = TagSet::parse_list("use::a, use::b, special");
        assert_eq!(
            OutputMode::Facets.format("foo", &tags).as_deref(),
            Some("foo: special, use")
        );
    }

    #[test]
    fn default_is_tags() {
        assert_eq!(OutputMode::default(), OutputMode::Tags);
    }

    #[test]
    fn parse_and_display() {
        for s in ["names", "tags", "facets"] {
            let mode: OutputMode = s.parse().unwrap();
            assert_eq!(mode.to_string(), s);
        }
        assert!("json".parse::<OutputMode>().is_err());
    }
}
