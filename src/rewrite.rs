// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Section-scoped key rewriting.
//!
//! Rebranding a checkout mostly boils down to changing the value of a handful
//! of keys inside INI-style files, e.g., the `name` key of a Cargo manifest's
//! `[package]` section, or the `Name` key of a desktop entry's
//! `[Desktop Entry]` group. The catch is that the same key name can show up
//! in more than one section. A Cargo manifest will happily contain `name`
//! inside `[package]`, `[lib]`, and every `[[bin]]` table. Thus, a rewrite
//! must be __scoped__ to the section it targets.
//!
//! # Section Tracking
//!
//! The rewriter walks a [`Document`] line by line while keeping track of the
//! section it is currently inside of. Any line whose trimmed content starts
//! with `[` is a section header, and marks the start of a new section that
//! runs until the next header or the end of the document. Content that comes
//! before the first header belongs to the top-level section, which is also
//! how a document without any headers is treated.
//!
//! # Key Rules
//!
//! A [`KeyRule`] names the section and key to target, and holds a function
//! that produces the new value. The rule fires on the _first_ line inside its
//! section whose trimmed content is the key followed by an equal sign. Each
//! rule fires at most once. All other lines, including comments, blank lines,
//! and unrecognized keys, pass through untouched. Rewriting never inserts or
//! deletes lines, so the output document always has the same length as the
//! input document.
//!
//! A rule that never fires is silently skipped by default. A
//! [`RewritePlan`] in [`Mode::Strict`] treats that as an error instead.

pub mod document;

pub use document::{Document, Line, LineChange, LineEnding};

use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter, Result as FmtResult};
use tracing::{debug, instrument};

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Rewrite key assignments of a document according to a rewrite plan.
///
/// Performs a single pass over `document`. Only the first matching line of
/// each key rule inside the rule's section gets replaced. When more than one
/// unfired rule matches the same line, the first rule in plan order wins.
///
/// # Errors
///
/// - Return [`RewriteError::MalformedPlan`] if `plan` fails validation. No
///   line is scanned in this case.
/// - Return [`RewriteError::NotFound`] if `plan` is strict, and one of its
///   key rules never fired.
#[instrument(skip_all, level = "debug")]
pub fn rewrite(document: &Document, plan: &RewritePlan) -> Result<Document> {
    plan.validate()?;

    let mut section = Scope::TopLevel;
    let mut fired = vec![false; plan.rules.len()];
    let mut lines = Vec::with_capacity(document.len());

    for line in document.lines() {
        let content = line.content().trim_start_matches(BYTE_ORDER_MARK);
        let trimmed = content.trim();

        if let Some(scope) = Scope::from_header(trimmed) {
            debug!("enter section {scope}");
            section = scope;
            lines.push(line.clone());
            continue;
        }

        let candidate = plan
            .rules
            .iter()
            .enumerate()
            .find(|(idx, rule)| !fired[*idx] && rule.scope == section && rule.matches(trimmed));

        match candidate {
            Some((idx, rule)) => {
                fired[idx] = true;

                // INVARIANT: Keep leading byte order mark and indentation.
                let prefix = &line.content()[..line.content().len() - content.trim_start().len()];
                let replacement = line.with_content(format!("{prefix}{}", rule.format()));
                debug!(
                    "rewrite {} in {}: {:?} -> {:?}",
                    rule.key,
                    rule.scope,
                    line.content(),
                    replacement.content()
                );
                lines.push(replacement);
            }
            None => lines.push(line.clone()),
        }
    }

    let mut unfired = plan
        .rules
        .iter()
        .zip(fired.iter())
        .filter_map(|(rule, fired)| (!fired).then_some(rule));

    if plan.mode == Mode::Strict {
        if let Some(rule) = unfired.next() {
            return Err(RewriteError::NotFound {
                scope: rule.scope.clone(),
                key: rule.key.clone(),
            });
        }
    } else {
        for rule in unfired {
            debug!("no match for {} in {}, skipping", rule.key, rule.scope);
        }
    }

    Ok(lines.into_iter().collect())
}

/// Section that a key rule is scoped to.
#[derive(Default, Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Content before the first section header.
    ///
    /// Covers the whole document when it has no section headers at all.
    #[default]
    TopLevel,

    /// Content of a bracketed section, e.g., `[package.metadata.winres]`.
    Named(String),
}

impl Scope {
    /// Construct scope for a named section.
    ///
    /// Surrounding whitespace of the section name is ignored.
    pub fn named(name: impl AsRef<str>) -> Self {
        Self::Named(name.as_ref().trim().to_owned())
    }

    /// Determine scope that a trimmed header line opens.
    ///
    /// Any line starting with `[` counts as a header. Array table headers like
    /// `[[bin]]` open a section named `bin`. Trailing content after the
    /// closing bracket, e.g., an inline comment, is ignored.
    ///
    /// Returns `None` if the line is not a header.
    pub fn from_header(line: impl AsRef<str>) -> Option<Self> {
        let line = line.as_ref();
        if !line.starts_with('[') {
            return None;
        }

        let name = line
            .trim_start_matches('[')
            .split(']')
            .next()
            .unwrap_or_default();

        Some(Self::named(name))
    }

    fn validate(&self, key: &str) -> Result<(), PlanError> {
        let Self::Named(name) = self else {
            return Ok(());
        };

        if name.is_empty() {
            return Err(PlanError::EmptySection { key: key.into() });
        }

        if let Some(c) = name.chars().find(|c| matches!(c, '[' | ']' | '\n' | '\r')) {
            return Err(PlanError::InvalidSection {
                name: name.clone(),
                c,
            });
        }

        Ok(())
    }
}

impl Display for Scope {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::TopLevel => fmt.write_str("top-level"),
            Self::Named(name) => write!(fmt, "[{name}]"),
        }
    }
}

impl From<Option<String>> for Scope {
    fn from(section: Option<String>) -> Self {
        match section {
            Some(name) => Self::named(name),
            None => Self::TopLevel,
        }
    }
}

/// Assignment syntax to write rewritten lines with.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Syntax {
    /// TOML style assignment with a quoted value: `key = "value"`.
    #[default]
    Toml,

    /// Desktop entry and systemd unit style assignment: `Key=value`.
    Entry,
}

impl Syntax {
    /// Format key assignment.
    ///
    /// The value is escaped so the assignment always stays on a single line.
    /// TOML values become basic strings with control characters escaped.
    /// Entry values get the `\n`, `\r`, and `\t` escapes of the desktop entry
    /// format, and lose any other control character.
    pub fn format(&self, key: &str, value: &str) -> String {
        match self {
            Self::Toml => format!("{key} = \"{}\"", escape_toml(value)),
            Self::Entry => format!("{key}={}", escape_entry(value)),
        }
    }
}

fn escape_toml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            c if c.is_control() => escaped.push_str(&format!("\\u{:04X}", c as u32)),
            c => escaped.push(c),
        }
    }
    escaped
}

fn escape_entry(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            c if c.is_control() => {}
            c => escaped.push(c),
        }
    }
    escaped
}

/// Producer of a key rule's new value.
pub type ValueFn = Box<dyn Fn() -> String + Send + Sync>;

/// Rule describing which key to rewrite in which section, and how.
pub struct KeyRule {
    scope: Scope,
    key: String,
    syntax: Syntax,
    value: ValueFn,
}

impl KeyRule {
    /// Construct new key rule with TOML assignment syntax.
    pub fn new(
        scope: Scope,
        key: impl Into<String>,
        value: impl Fn() -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            scope,
            key: key.into(),
            syntax: Syntax::default(),
            value: Box::new(value),
        }
    }

    /// Construct new key rule that always produces the same value.
    pub fn fixed(scope: Scope, key: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        Self::new(scope, key, move || value.clone())
    }

    /// Use different assignment syntax for rewritten line.
    pub fn with_syntax(mut self, syntax: Syntax) -> Self {
        self.syntax = syntax;
        self
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn syntax(&self) -> Syntax {
        self.syntax
    }

    /// Produce new value of key.
    pub fn value(&self) -> String {
        (self.value)()
    }

    fn matches(&self, line: &str) -> bool {
        line.strip_prefix(self.key.as_str())
            .is_some_and(|rest| rest.trim_start().starts_with('='))
    }

    fn format(&self) -> String {
        self.syntax.format(&self.key, &self.value())
    }

    fn validate(&self) -> Result<(), PlanError> {
        if self.key.is_empty() {
            return Err(PlanError::EmptyKey {
                scope: self.scope.clone(),
            });
        }

        if let Some(c) = self
            .key
            .chars()
            .find(|c| c.is_whitespace() || matches!(c, '=' | '[' | ']'))
        {
            return Err(PlanError::InvalidKey {
                scope: self.scope.clone(),
                key: self.key.clone(),
                c,
            });
        }

        self.scope.validate(&self.key)
    }
}

impl Debug for KeyRule {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.debug_struct("KeyRule")
            .field("scope", &self.scope)
            .field("key", &self.key)
            .field("syntax", &self.syntax)
            .finish_non_exhaustive()
    }
}

/// How to treat key rules that never fire.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Skip them silently.
    #[default]
    Lenient,

    /// Fail the rewrite.
    Strict,
}

/// Ordered set of key rules applied to one document in one pass.
#[derive(Default, Debug)]
pub struct RewritePlan {
    rules: Vec<KeyRule>,
    mode: Mode,
}

impl RewritePlan {
    /// Construct new empty rewrite plan in lenient mode.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append key rule to plan.
    pub fn with_rule(mut self, rule: KeyRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Set how unmatched key rules are treated.
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Append key rule to plan.
    pub fn push(&mut self, rule: KeyRule) {
        self.rules.push(rule);
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn rules(&self) -> &[KeyRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Check that plan is well-formed.
    ///
    /// # Errors
    ///
    /// - Return [`PlanError`] for the first problem found.
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.rules.is_empty() {
            return Err(PlanError::Empty);
        }

        self.rules.iter().try_for_each(KeyRule::validate)
    }
}

impl FromIterator<KeyRule> for RewritePlan {
    fn from_iter<I: IntoIterator<Item = KeyRule>>(iter: I) -> Self {
        Self {
            rules: iter.into_iter().collect(),
            mode: Mode::default(),
        }
    }
}

impl Extend<KeyRule> for RewritePlan {
    fn extend<I: IntoIterator<Item = KeyRule>>(&mut self, iter: I) {
        self.rules.extend(iter);
    }
}

/// Rewrite plan validation error types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    /// Plan has nothing to do.
    #[error("plan contains no key rules")]
    Empty,

    /// Key rule targets an empty key.
    #[error("key rule in {scope} has an empty key")]
    EmptyKey { scope: Scope },

    /// Key contains a character that can never match a key assignment.
    #[error("key {key:?} in {scope} contains invalid character {c:?}")]
    InvalidKey { scope: Scope, key: String, c: char },

    /// Section specifier of key rule is an empty name.
    #[error("key rule for {key:?} targets a section with an empty name")]
    EmptySection { key: String },

    /// Section specifier contains a character that cannot be in a header.
    #[error("section name {name:?} contains invalid character {c:?}")]
    InvalidSection { name: String, c: char },
}

/// Rewrite error types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RewriteError {
    /// Rewrite plan failed validation.
    #[error("malformed rewrite plan")]
    MalformedPlan(#[from] PlanError),

    /// Key rule of a strict plan never fired.
    #[error("key {key:?} not found in {scope}")]
    NotFound { scope: Scope, key: String },
}

/// Friendly result alias :3
pub type Result<T, E = RewriteError> = std::result::Result<T, E>;
