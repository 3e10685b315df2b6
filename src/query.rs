//! Package queries built on tag expressions.

use crate::collection::TagSource;
use crate::error::{Error, Result};
use crate::expr::TagMatcher;
use crate::output::OutputMode;
use crate::package_index::PackageIndex;
use crate::tag::TagSet;

/// Packages of `source` whose tags satisfy `matcher`, in source order.
pub fn grep<'a, S: TagSource + ?Sized>(
    source: &'a S,
    matcher: &'a TagMatcher,
) -> impl Iterator<Item = (&'a str, &'a TagSet)> + 'a {
    source.packages().filter(move |(_, tags)| matcher.matches(tags))
}

/// Formatted output lines for every matching package.
///
/// # Examples
///
/// ```
/// use debtags::{grep_lines, OutputMode, TagCollection, TagMatcher};
///
/// let coll = TagCollection::parse("\
/// emacs: role::program, use::editing
/// libc6: role::shared-lib
/// vim: role::program, use::editing
/// ").unwrap();
/// let matcher = TagMatcher::parse("role::program && use::*").unwrap();
/// assert_eq!(grep_lines(&coll, &matcher, OutputMode::Names), vec!["emacs", "vim"]);
/// ```
pub fn grep_lines<S: TagSource + ?Sized>(
    source: &S,
    matcher: &TagMatcher,
    mode: OutputMode,
) -> Vec<String> {
    let lines: Vec<String> = grep(source, matcher)
        .filter_map(|(name, tags)| mode.format(name, tags))
        .collect();
    tracing::debug!(matches = lines.len(), %mode, "grep finished");
    lines
}

/// Tags of one explicitly named package.
pub fn show<'a, S: TagSource + ?Sized>(source: &'a S, package: &str) -> Result<&'a TagSet> {
    source
        .packages()
        .find(|(name, _)| *name == package)
        .map(|(_, tags)| tags)
        .ok_or_else(|| Error::UnknownPackage(package.to_string()))
}

/// `<pkg> - <short description>` for every matching package of an index.
pub fn search(index: &PackageIndex, matcher: &TagMatcher) -> Vec<String> {
    index
        .entries()
        .filter(|entry| matcher.matches(&entry.tags))
        .map(|entry| match entry.short_description() {
            Some(description) => format!("{} - {description}", entry.name),
            None => entry.name.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::TagCollection;

    const TAGDB: &str = "\
emacs: role::program, use::editing, interface::x11
libc6: role::shared-lib
nano: role::program, use::editing, interface::text-mode
untagged:
";

    fn coll() -> TagCollection {
        TagCollection::parse(TAGDB).unwrap()
    }

    #[test]
    fn grep_by_expression() {
        let coll = coll();
        let m = TagMatcher::parse("use::editing && !interface::x11").unwrap();
        let hits: Vec<_> = grep(&coll, &m).map(|(n, _)| n).collect();
        assert_eq!(hits, vec!["nano"]);
    }

    #[test]
    fn empty_expression_matches_all_packages() {
        let coll = coll();
        let m = TagMatcher::parse("").unwrap();
        assert_eq!(grep(&coll, &m).count(), 4);
        // the untagged package has no line in tag mode
        assert_eq!(grep_lines(&coll, &m, OutputMode::Tags).len(), 3);
    }

    #[test]
    fn inverted_grep() {
        let coll = coll();
        let m = TagMatcher::with_inversion("role::program", true).unwrap();
        assert_eq!(
            grep_lines(&coll, &m, OutputMode::Names),
            vec!["libc6", "untagged"]
        );
    }

    #[test]
    fn grep_facets_mode() {
        let coll = coll();
        let m = TagMatcher::parse("role::shared-lib").unwrap();
        assert_eq!(grep_lines(&coll, &m, OutputMode::Facets), vec!["libc6: role"]);
    }

    #[test]
    fn show_package() {
        let coll = coll();
        assert_eq!(show(&coll, "libc6").unwrap().to_string(), "role::shared-lib");
        assert_eq!(
            show(&coll, "vim"),
            Err(Error::UnknownPackage("vim".to_string()))
        );
    }

    #[test]
    fn search_index() {
        let index = PackageIndex::parse(
            "Package: nano\nTag: use::editing\nDescription: small editor\n\n\
             Package: ed\nTag: use::editing\n\n\
             Package: ls\nTag: use::viewing\n",
        )
        .unwrap();
        let m = TagMatcher::parse("use::editing").unwrap();
        assert_eq!(search(&index, &m), vec!["ed", "nano - small editor"]);
    }
}
