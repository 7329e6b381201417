// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Configuration layout.
//!
//! Specify the layout of the configuration file that rebrand uses to simplify
//! the process of serialization and deserialization. File I/O is left to the
//! caller to figure out.

use crate::{
    brand::{Target, ValueTemplate},
    rewrite::{Scope, Syntax},
};

use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Error as FmtError, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    str::FromStr,
};

/// Rebrand configuration layout.
///
/// # General Layout
///
/// The configuration is composed of two basic parts: branding settings and
/// extra targets. The branding settings supply default values for a rebranding
/// run, which command-line flags can override. The target listing adds files
/// to rewrite on top of the built-in targets.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct RebrandConfig {
    /// Settings for rebranding runs.
    #[serde(default)]
    pub branding: BrandingSettings,

    /// Extra targets to rewrite.
    #[serde(rename = "target", skip_serializing_if = "Option::is_none")]
    pub targets: Option<Vec<TargetDefinition>>,
}

impl RebrandConfig {
    /// Convert extra target listing into targets.
    pub fn extra_targets(&self) -> Vec<Target> {
        self.targets
            .iter()
            .flatten()
            .map(TargetDefinition::to_target)
            .collect()
    }
}

impl FromStr for RebrandConfig {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let mut config: RebrandConfig = toml::de::from_str(data).map_err(ConfigError::Deserialize)?;

        // INVARIANT: Perform shell expansion on source directory field.
        if let Some(source_dir) = &config.branding.source_dir {
            config.branding.source_dir = Some(SourceDir::new(
                shellexpand::full(source_dir.to_string().as_str())
                    .map_err(ConfigError::ShellExpansion)?
                    .into_owned(),
            ));
        }

        Ok(config)
    }
}

impl Display for RebrandConfig {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(
            toml::ser::to_string_pretty(self)
                .map_err(ConfigError::Serialize)?
                .as_str(),
        )
    }
}

/// Branding settings.
///
/// Default values to use for any given rebranding run.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct BrandingSettings {
    /// New application name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,

    /// New executable name without ".exe".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executable_name: Option<String>,

    /// Public key of rendezvous server.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,

    /// Rendezvous server address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_address: Option<String>,

    /// Source directory of checkout to rebrand.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_dir: Option<SourceDir>,

    /// Fail a file when any of its key rules never matches.
    #[serde(default)]
    pub strict: bool,

    /// Skip built-in targets, only rewrite extra targets.
    #[serde(default)]
    pub skip_builtin: bool,
}

/// Extra target definition.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct TargetDefinition {
    /// File path or glob pattern relative to source directory.
    pub path: String,

    /// Assignment syntax of rewritten lines.
    #[serde(default)]
    pub syntax: Syntax,

    /// Key rules of target.
    #[serde(rename = "rule", default)]
    pub rules: Vec<RuleDefinition>,
}

impl TargetDefinition {
    /// Convert definition into target.
    pub fn to_target(&self) -> Target {
        self.rules
            .iter()
            .fold(Target::new(self.path.clone(), self.syntax), |target, rule| {
                target.with_rule(
                    Scope::from(rule.section.clone()),
                    rule.key.clone(),
                    rule.value.clone(),
                )
            })
    }
}

/// Key rule definition.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct RuleDefinition {
    /// Section to scope key to. Top-level when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,

    /// Key to rewrite.
    pub key: String,

    /// Template of new value.
    pub value: ValueTemplate,
}

/// Path to source directory of checkout.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct SourceDir(PathBuf);

impl SourceDir {
    /// Construct new source directory.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// Treat source directory as [`Path`] slice.
    pub fn as_path(&self) -> &Path {
        self.0.as_path()
    }
}

impl Display for SourceDir {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(self.as_path().to_string_lossy().as_ref())
    }
}

/// Configuration error types.
#[derive(Clone, Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error(transparent)]
    Deserialize(#[from] toml::de::Error),

    /// Failed to serialize configuration.
    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),

    /// Failed to perform shell expansion on configuration.
    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<std::env::VarError>),
}

impl From<ConfigError> for FmtError {
    fn from(_: ConfigError) -> Self {
        FmtError
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;

    #[sealed_test(env = [("SRC", "/home/blah/src")])]
    fn deserialize_rebrand_config() -> anyhow::Result<()> {
        let result: RebrandConfig = r#"
            [branding]
            app_name = "Acme Remote"
            executable_name = "acme"
            source_dir = "$SRC/rustdesk"

            [[target]]
            path = "res/RustDesk2.toml"

            [[target.rule]]
            section = "options"
            key = "custom-rendezvous-server"
            value = "{server_address}"

            [[target]]
            path = "res/*.desktop"
            syntax = "entry"

            [[target.rule]]
            key = "Comment"
            value = "{app_name}"
        "#
        .parse()?;

        let expect = RebrandConfig {
            branding: BrandingSettings {
                app_name: Some("Acme Remote".into()),
                executable_name: Some("acme".into()),
                source_dir: Some(SourceDir::new("/home/blah/src/rustdesk")),
                ..Default::default()
            },
            targets: Some(vec![
                TargetDefinition {
                    path: "res/RustDesk2.toml".into(),
                    syntax: Syntax::Toml,
                    rules: vec![RuleDefinition {
                        section: Some("options".into()),
                        key: "custom-rendezvous-server".into(),
                        value: "{server_address}".into(),
                    }],
                },
                TargetDefinition {
                    path: "res/*.desktop".into(),
                    syntax: Syntax::Entry,
                    rules: vec![RuleDefinition {
                        section: None,
                        key: "Comment".into(),
                        value: "{app_name}".into(),
                    }],
                },
            ]),
        };

        assert_eq!(result, expect);

        let targets = result.extra_targets();
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].rules()[0].scope, Scope::named("options"));
        assert_eq!(targets[1].rules()[0].scope, Scope::TopLevel);

        Ok(())
    }

    #[test]
    fn empty_config_is_default() -> anyhow::Result<()> {
        let result: RebrandConfig = "".parse()?;
        assert_eq!(result, RebrandConfig::default());

        Ok(())
    }

    #[test]
    fn serialize_rebrand_config() -> anyhow::Result<()> {
        let config = RebrandConfig {
            branding: BrandingSettings {
                app_name: Some("Acme Remote".into()),
                server_address: Some("rs.acme.test".into()),
                strict: true,
                ..Default::default()
            },
            targets: Some(vec![TargetDefinition {
                path: "res/RustDesk2.toml".into(),
                syntax: Syntax::Toml,
                rules: vec![RuleDefinition {
                    section: Some("options".into()),
                    key: "key".into(),
                    value: "{public_key}".into(),
                }],
            }]),
        };

        let result = config.to_string();
        let expect = indoc! {r#"
            [branding]
            app_name = "Acme Remote"
            server_address = "rs.acme.test"
            strict = true
            skip_builtin = false
        "#};
        assert!(result.starts_with(expect));
        assert!(result.contains("[[target.rule]]"));
        assert!(!result.contains("executable_name"));

        let result: RebrandConfig = result.parse()?;
        assert_eq!(result, config);

        Ok(())
    }
}
