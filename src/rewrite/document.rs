// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! In-memory line representation of a text file.

use std::fmt::{Display, Formatter, Result as FmtResult};

/// Ordered lines of a text file.
///
/// # Invariant
///
/// - Every line keeps its own terminator, so rendering a document gives back
///   the exact text it was built from.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Document {
    lines: Vec<Line>,
}

impl Document {
    /// Construct new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        self.lines.iter()
    }

    /// Line at zero-based index.
    pub fn get(&self, index: usize) -> Option<&Line> {
        self.lines.get(index)
    }

    /// List lines whose content differs from other document.
    ///
    /// Both documents are expected to have the same length, which always holds
    /// for a document and its rewritten form. Extra lines of the longer
    /// document are ignored.
    pub fn diff(&self, other: &Document) -> Vec<LineChange> {
        self.lines
            .iter()
            .zip(other.lines.iter())
            .enumerate()
            .filter(|(_, (before, after))| before != after)
            .map(|(index, (before, after))| LineChange {
                number: index + 1,
                before: before.content.clone(),
                after: after.content.clone(),
            })
            .collect()
    }
}

impl Display for Document {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        self.lines.iter().try_for_each(|line| write!(fmt, "{line}"))
    }
}

impl From<&str> for Document {
    fn from(text: &str) -> Self {
        text.split_inclusive('\n').map(Line::parse).collect()
    }
}

impl From<String> for Document {
    fn from(text: String) -> Self {
        Self::from(text.as_str())
    }
}

/// Build document from lines as a line reader hands them out.
///
/// Each string may carry its own terminator. A string without one becomes a
/// line without a terminator.
impl From<Vec<String>> for Document {
    fn from(lines: Vec<String>) -> Self {
        lines.iter().map(|line| Line::parse(line)).collect()
    }
}

impl FromIterator<Line> for Document {
    fn from_iter<I: IntoIterator<Item = Line>>(iter: I) -> Self {
        Self {
            lines: iter.into_iter().collect(),
        }
    }
}

/// Single line of a document.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Line {
    content: String,
    ending: LineEnding,
}

impl Line {
    /// Construct new line.
    pub fn new(content: impl Into<String>, ending: LineEnding) -> Self {
        Self {
            content: content.into(),
            ending,
        }
    }

    /// Split raw line into content and terminator.
    fn parse(raw: &str) -> Self {
        if let Some(content) = raw.strip_suffix("\r\n") {
            Self::new(content, LineEnding::CrLf)
        } else if let Some(content) = raw.strip_suffix('\n') {
            Self::new(content, LineEnding::Lf)
        } else {
            Self::new(raw, LineEnding::None)
        }
    }

    /// Content of line without its terminator.
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn ending(&self) -> LineEnding {
        self.ending
    }

    /// Same line with different content.
    pub fn with_content(&self, content: impl Into<String>) -> Self {
        Self::new(content, self.ending)
    }
}

impl Display for Line {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        write!(fmt, "{}{}", self.content, self.ending.as_str())
    }
}

/// Terminator of a line.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    /// Last line of a file without a trailing newline.
    #[default]
    None,

    Lf,

    CrLf,
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "",
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
        }
    }
}

/// Line that differs between two documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineChange {
    /// One-based line number.
    pub number: usize,

    /// Content before rewrite.
    pub before: String,

    /// Content after rewrite.
    pub after: String,
}

impl Display for LineChange {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        write!(fmt, "{}: {:?} -> {:?}", self.number, self.before, self.after)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn keep_mixed_line_endings() {
        let text = "[package]\r\nname = \"old\"\n\nversion = \"1\"";
        let document = Document::from(text);

        assert_eq!(document.len(), 4);
        assert_eq!(document.get(0), Some(&Line::new("[package]", LineEnding::CrLf)));
        assert_eq!(document.get(2), Some(&Line::new("", LineEnding::Lf)));
        assert_eq!(document.get(3), Some(&Line::new("version = \"1\"", LineEnding::None)));
        assert_eq!(document.to_string(), text);
    }

    #[test]
    fn empty_text_has_no_lines() {
        let document = Document::from("");
        assert!(document.is_empty());
        assert_eq!(document.to_string(), "");
    }

    #[test]
    fn build_from_read_lines() {
        let lines = vec![
            String::from("[package]\r\n"),
            String::from("name = \"old\"\n"),
            String::from("version = \"1\""),
        ];
        let document = Document::from(lines);

        assert_eq!(document.len(), 3);
        assert_eq!(document.get(0), Some(&Line::new("[package]", LineEnding::CrLf)));
        assert_eq!(document.get(2), Some(&Line::new("version = \"1\"", LineEnding::None)));
        assert_eq!(document.to_string(), "[package]\r\nname = \"old\"\nversion = \"1\"");
    }

    #[test]
    fn diff_lists_changed_lines() {
        let before = Document::from("[package]\nname = \"old\"\nversion = \"1\"\n");
        let after = Document::from("[package]\nname = \"new\"\nversion = \"1\"\n");

        let result = before.diff(&after);
        let expect = vec![LineChange {
            number: 2,
            before: "name = \"old\"".into(),
            after: "name = \"new\"".into(),
        }];
        assert_eq!(result, expect);
        assert_eq!(result[0].to_string(), r#"2: "name = \"old\"" -> "name = \"new\"""#);
    }
}
