// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Branding parameters.
//!
//! A __branding__ is the set of values a checkout gets rebranded with: the new
//! application name, and optionally the executable name, public key, and
//! server address. It is assembled once per rebranding run, and handed to
//! every [`Target`] to render the values of its key rules through
//! [`ValueTemplate`]s.
//!
//! # See Also
//!
//! 1. [`catalogue`]
//! 2. [`template`]

pub mod catalogue;
pub mod template;

pub use catalogue::{builtin_targets, RuleTemplate, Target};
pub use template::ValueTemplate;

/// Values to rebrand a checkout with.
///
/// # Invariant
///
/// - Application name is never empty.
/// - Optional values are never empty strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branding {
    app_name: String,
    executable_name: Option<String>,
    public_key: Option<String>,
    server_address: Option<String>,
}

impl Branding {
    /// Construct new branding from application name.
    ///
    /// Surrounding whitespace is trimmed.
    ///
    /// # Errors
    ///
    /// - Return [`BrandError::EmptyAppName`] if application name is blank.
    pub fn new(app_name: impl AsRef<str>) -> Result<Self> {
        let app_name = app_name.as_ref().trim();
        if app_name.is_empty() {
            return Err(BrandError::EmptyAppName);
        }

        Ok(Self {
            app_name: app_name.to_owned(),
            executable_name: None,
            public_key: None,
            server_address: None,
        })
    }

    /// Set executable name.
    ///
    /// A trailing ".exe" is dropped. Blank names are ignored.
    pub fn with_executable_name(mut self, name: impl AsRef<str>) -> Self {
        let name = name.as_ref().trim();
        let name = name.strip_suffix(".exe").unwrap_or(name);
        self.executable_name = non_blank(name);
        self
    }

    /// Set public key of rendezvous server. Blank keys are ignored.
    pub fn with_public_key(mut self, key: impl AsRef<str>) -> Self {
        self.public_key = non_blank(key.as_ref());
        self
    }

    /// Set rendezvous server address. Blank addresses are ignored.
    pub fn with_server_address(mut self, address: impl AsRef<str>) -> Self {
        self.server_address = non_blank(address.as_ref());
        self
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Executable name without extension.
    ///
    /// Falls back to the lower-cased application name.
    pub fn executable(&self) -> String {
        self.executable_name
            .clone()
            .unwrap_or_else(|| self.app_name.to_lowercase())
    }

    pub fn public_key(&self) -> Option<&str> {
        self.public_key.as_deref()
    }

    pub fn server_address(&self) -> Option<&str> {
        self.server_address.as_deref()
    }
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_owned())
}

/// Branding error types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BrandError {
    /// No application name given.
    #[error("application name cannot be empty")]
    EmptyAppName,

    /// Value template never closes a placeholder.
    #[error("unterminated placeholder in template {template:?}")]
    UnterminatedPlaceholder { template: String },

    /// Value template uses a placeholder that does not exist.
    #[error("unknown placeholder {{{name}}} in template {template:?}")]
    UnknownPlaceholder { name: String, template: String },

    /// Value template needs an optional branding value that was not given.
    #[error("template {template:?} needs {{{name}}}, but no value was given")]
    MissingValue { name: String, template: String },
}

/// Friendly result alias :3
pub type Result<T, E = BrandError> = std::result::Result<T, E>;
