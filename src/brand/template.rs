// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Value templates.
//!
//! Key rule values are written as templates that reference branding values
//! through `{placeholder}` sequences. Literal braces are escaped by doubling
//! them, i.e., `{{` and `}}`. Available placeholders:
//!
//! - `{app_name}`: application name as given.
//! - `{app_name_lower}`: lower-cased application name.
//! - `{executable}`: executable name without extension.
//! - `{public_key}`: public key of rendezvous server.
//! - `{server_address}`: rendezvous server address.

use crate::brand::{BrandError, Branding, Result};

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Template for the value of a key rule.
#[derive(Default, Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ValueTemplate(String);

impl ValueTemplate {
    /// Construct new value template.
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Render template with branding values.
    ///
    /// # Errors
    ///
    /// - Return [`BrandError::UnterminatedPlaceholder`] if a `{` is never
    ///   closed.
    /// - Return [`BrandError::UnknownPlaceholder`] if placeholder does not
    ///   exist.
    /// - Return [`BrandError::MissingValue`] if placeholder refers to an
    ///   optional value that branding lacks.
    pub fn render(&self, branding: &Branding) -> Result<String> {
        let mut result = String::with_capacity(self.0.len());
        let mut chars = self.0.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    _ = chars.next();
                    result.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    _ = chars.next();
                    result.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(ch) => name.push(ch),
                            None => {
                                return Err(BrandError::UnterminatedPlaceholder {
                                    template: self.0.clone(),
                                })
                            }
                        }
                    }

                    result.push_str(&self.lookup(name.trim(), branding)?);
                }
                c => result.push(c),
            }
        }

        Ok(result)
    }

    fn lookup(&self, name: &str, branding: &Branding) -> Result<String> {
        let missing = || BrandError::MissingValue {
            name: name.to_owned(),
            template: self.0.clone(),
        };

        match name {
            "app_name" => Ok(branding.app_name().to_owned()),
            "app_name_lower" => Ok(branding.app_name().to_lowercase()),
            "executable" => Ok(branding.executable()),
            "public_key" => branding.public_key().map(str::to_owned).ok_or_else(missing),
            "server_address" => branding
                .server_address()
                .map(str::to_owned)
                .ok_or_else(missing),
            _ => Err(BrandError::UnknownPlaceholder {
                name: name.to_owned(),
                template: self.0.clone(),
            }),
        }
    }
}

impl Display for ValueTemplate {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(&self.0)
    }
}

impl From<&str> for ValueTemplate {
    fn from(template: &str) -> Self {
        Self::new(template)
    }
}

impl From<String> for ValueTemplate {
    fn from(template: String) -> Self {
        Self::new(template)
    }
}
