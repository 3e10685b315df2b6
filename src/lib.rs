//! Query and check Debian package tag collections.
//!
//! Every package is annotated with a set of hierarchical tags written
//! `facet::value` (for example `role::program` or `use::editing`), and a
//! vocabulary lists the facets and tags that are defined. This crate reads
//! those collections and provides:
//!
//! - a boolean tag expression language (`&&`, `||`, `!`, parentheses and
//!   glob atoms) compiled into a [`TagMatcher`];
//! - [`diff`] between two collections, with [`TagPatch`] to apply the result;
//! - [`check`] of a collection against a [`Vocabulary`];
//! - vocabulary filtering and the usual query commands ([`grep_lines`],
//!   [`search`], [`show`]).
//!
//! # Examples
//!
//! Filter a tag database with an expression:
//!
//! ```
//! use debtags::{grep_lines, OutputMode, TagCollection, TagMatcher};
//!
//! let input = "\
//! vim: role::program, use::editing, interface::text-mode
//! gedit: role::program, use::editing, interface::x11
//! libc6: role::shared-lib
//! ";
//! let coll = TagCollection::parse(input).unwrap();
//! let matcher = TagMatcher::parse("use::editing && !interface::x11").unwrap();
//! assert_eq!(grep_lines(&coll, &matcher, OutputMode::Names), vec!["vim"]);
//! ```
//!
//! `&&` and `||` have the same precedence and associate to the right, so
//! `a && b || c` means `a && (b || c)`.

mod check;
mod collection;
mod deb822;
mod diff;
mod error;
pub mod expr;
mod output;
mod package_index;
mod pattern;
mod query;
mod tag;
mod vocabulary;

// Re-export public types
pub use check::{check, CheckReport};
pub use collection::{TagCollection, TagSource};
pub use deb822::{Record, RecordReader};
pub use diff::{diff, PackageDiff, TagChange, TagPatch};
pub use error::{Error, Result};
pub use expr::{Expr, TagMatcher};
pub use output::OutputMode;
pub use package_index::{PackageEntry, PackageIndex};
pub use pattern::TagPattern;
pub use query::{grep, grep_lines, search, show};
pub use tag::{facet_of, TagSet, FACET_SEPARATOR};
pub use vocabulary::{Vocabulary, VocabularyRecord};
