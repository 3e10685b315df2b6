use std::fmt;
use std::iter::Enumerate;
use std::str::Lines;

use crate::error::{Error, Result};

/// A `Field: value` record, as used by vocabularies and package indexes.
///
/// Records are blocks of lines separated by blank lines. A line starting
/// with whitespace continues the previous field; a continuation line made
/// of a single `.` stands for an empty line. Lines starting with `#` are
/// comments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse every record of a text.
    ///
    /// # Examples
    ///
    /// ```
    /// use debtags::Record;
    ///
    /// let input = "\
    /// Tag: role::program
    /// Description: Program
    ///  Executable software.
    ///
    /// Tag: use::editing
    /// Description: Editing
    /// ";
    /// let records = Record::parse_all(input).unwrap();
    /// assert_eq!(records.len(), 2);
    /// assert_eq!(records[0].get("tag"), Some("role::program"));
    /// assert_eq!(records[0].get("Description"), Some("Program\nExecutable software."));
    /// ```
    pub fn parse_all(input: &str) -> Result<Vec<Record>> {
        RecordReader::new(input).collect()
    }

    /// Value of a field. Field names compare case-insensitively.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Set a field, replacing an existing value with the same name.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self
            .fields
            .iter_mut()
            .find(|(field, _)| field.eq_ignore_ascii_case(&name))
        {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Fields in file order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(f, v)| (f.as_str(), v.as_str()))
    }

    /// Whether the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Display for Record {
    /// Serialize back to the `Field: value` form, without the trailing
    /// blank separator line.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (name, value) in &self.fields {
            let mut lines = value.split('\n');
            writeln!(f, "{name}: {}", lines.next().unwrap_or_default())?;
            for line in lines {
                if line.is_empty() {
                    writeln!(f, " .")?;
                } else {
                    writeln!(f, " {line}")?;
                }
            }
        }
        Ok(())
    }
}

/// Single-pass reader yielding one [`Record`] at a time.
///
/// The reader stops at the first malformed line.
#[derive(Debug)]
pub struct RecordReader<'a> {
    lines: Enumerate<Lines<'a>>,
    failed: bool,
}

impl<'a> RecordReader<'a> {
    /// Read records from a text.
    pub fn new(input: &'a str) -> Self {
        RecordReader {
            lines: input.lines().enumerate(),
            failed: false,
        }
    }
}

impl Iterator for RecordReader<'_> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let mut record = Record::new();
        for (index, line) in self.lines.by_ref() {
            if line.starts_with('#') {
                continue;
            }
            if line.trim().is_empty() {
                if record.is_empty() {
                    continue;
                }
                return Some(Ok(record));
            }

            let invalid = || Error::InvalidRecord {
                line: index + 1,
                content: line.to_string(),
            };

            if line.starts_with([' ', '\t']) {
                let Some((_, value)) = record.fields.last_mut() else {
                    self.failed = true;
                    return Some(Err(invalid()));
                };
                let content = line.trim();
                value.push('\n');
                if content != "." {
                    value.push_str(content);
                }
                continue;
            }

            match line.split_once(':') {
                Some((name, value)) if !name.trim().is_empty() => {
                    record
                        .fields
                        .push((name.trim().to_string(), value.trim().to_string()));
                }
                _ => {
                    self.failed = true;
                    return Some(Err(invalid()));
                }
            }
        }

        if record.is_empty() {
            None
        } else {
            Some(Ok(record))
        }
    }
}
