// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Manifest file handling.
//!
//! Persist rewrites of manifest files on disk. A manifest is read as a whole,
//! rewritten in memory, and only then written back as a whole. Thus, a
//! failing rewrite never leaves a half-rewritten file behind.
//!
//! The write itself goes through a temporary sibling file that is renamed
//! over the original manifest, so readers either see the old content or the
//! new content, never a truncated mix of both.

use crate::rewrite::{rewrite, Document, LineChange, RewriteError, RewritePlan};

use std::{
    ffi::OsString,
    fs::{canonicalize, metadata, read_to_string, remove_file, rename, set_permissions, write},
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tracing::{debug, info, instrument};

/// Manifest file to rewrite keys of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestFile {
    path: PathBuf,
}

impl ManifestFile {
    /// Construct new manifest file handle.
    ///
    /// Does not check if the path exists.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    /// Read manifest into document.
    ///
    /// # Errors
    ///
    /// - Return [`ManifestError::Missing`] if manifest does not exist.
    /// - Return [`ManifestError::ReadManifest`] if manifest cannot be read.
    pub fn read(&self) -> Result<Document> {
        read_to_string(&self.path)
            .map(Document::from)
            .map_err(|err| match err.kind() {
                ErrorKind::NotFound => ManifestError::Missing {
                    path: self.path.clone(),
                },
                _ => ManifestError::ReadManifest {
                    source: err,
                    path: self.path.clone(),
                },
            })
    }

    /// Determine what rewrite plan would change without writing anything.
    ///
    /// # Errors
    ///
    /// - Return [`ManifestError::Missing`] if manifest does not exist.
    /// - Return [`ManifestError::ReadManifest`] if manifest cannot be read.
    /// - Return [`ManifestError::Rewrite`] if rewrite plan fails.
    pub fn preview(&self, plan: &RewritePlan) -> Result<Outcome> {
        let (_, outcome) = self.rewritten(plan)?;
        Ok(outcome)
    }

    /// Rewrite manifest according to rewrite plan.
    ///
    /// Manifest is left untouched when rewrite plan fails or changes nothing.
    ///
    /// # Errors
    ///
    /// - Return [`ManifestError::Missing`] if manifest does not exist.
    /// - Return [`ManifestError::ReadManifest`] if manifest cannot be read.
    /// - Return [`ManifestError::Rewrite`] if rewrite plan fails.
    /// - Return [`ManifestError::WriteManifest`] if manifest cannot be written.
    #[instrument(skip(self, plan), fields(path = %self.path.display()), level = "debug")]
    pub fn edit(&self, plan: &RewritePlan) -> Result<Outcome> {
        let (document, outcome) = self.rewritten(plan)?;

        if let Outcome::Updated(changes) = &outcome {
            info!("update {:?} ({} lines)", self.path.display(), changes.len());
            self.write_atomic(&document.to_string())
                .map_err(|err| ManifestError::WriteManifest {
                    source: err,
                    path: self.path.clone(),
                })?;
        } else {
            debug!("{:?} already up to date", self.path.display());
        }

        Ok(outcome)
    }

    fn rewritten(&self, plan: &RewritePlan) -> Result<(Document, Outcome)> {
        let original = self.read()?;
        let document = rewrite(&original, plan).map_err(|err| ManifestError::Rewrite {
            source: err,
            path: self.path.clone(),
        })?;

        let changes = original.diff(&document);
        let outcome = if changes.is_empty() {
            Outcome::Unchanged
        } else {
            Outcome::Updated(changes)
        };

        Ok((document, outcome))
    }

    fn write_atomic(&self, content: &str) -> std::io::Result<()> {
        // INVARIANT: Replace the file a symlinked manifest points to, not the link.
        let target = canonicalize(&self.path)?;

        let mut name = OsString::from(".");
        name.push(target.file_name().unwrap_or_default());
        name.push(".rebrand");
        let staging = target.with_file_name(name);

        let result = write(&staging, content.as_bytes())
            .and_then(|_| set_permissions(&staging, metadata(&target)?.permissions()))
            .and_then(|_| rename(&staging, &target));

        if result.is_err() {
            let _ = remove_file(&staging);
        }

        result
    }
}

/// Result of rewriting a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Manifest already had the requested values.
    Unchanged,

    /// Manifest lines that were rewritten.
    Updated(Vec<LineChange>),
}

/// Manifest handling error types.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// Manifest does not exist.
    #[error("manifest not found at {:?}", path.display())]
    Missing { path: PathBuf },

    /// Manifest cannot be read from.
    #[error("failed to read manifest at {:?}", path.display())]
    ReadManifest {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Manifest cannot be written to.
    #[error("failed to write manifest at {:?}", path.display())]
    WriteManifest {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Rewrite plan cannot be applied to manifest.
    #[error("failed to rewrite manifest at {:?}", path.display())]
    Rewrite {
        #[source]
        source: RewriteError,
        path: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = ManifestError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewrite::{KeyRule, Mode, Scope};
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;

    const CARGO_TOML: &str = indoc! {r#"
        [package]
        name = "rustdesk"
        default-run = "rustdesk"

        [package.metadata.winres]
        ProductName = "RustDesk"
    "#};

    fn package_name(value: &str) -> RewritePlan {
        RewritePlan::new().with_rule(KeyRule::fixed(Scope::named("package"), "name", value))
    }

    #[sealed_test]
    fn edit_writes_rewritten_manifest() -> anyhow::Result<()> {
        write("Cargo.toml", CARGO_TOML)?;
        let manifest = ManifestFile::new("Cargo.toml");

        let result = manifest.edit(&package_name("acme"))?;
        let expect = Outcome::Updated(vec![LineChange {
            number: 2,
            before: "name = \"rustdesk\"".into(),
            after: "name = \"acme\"".into(),
        }]);
        assert_eq!(result, expect);

        let result = read_to_string("Cargo.toml")?;
        let expect = indoc! {r#"
            [package]
            name = "acme"
            default-run = "rustdesk"

            [package.metadata.winres]
            ProductName = "RustDesk"
        "#};
        assert_eq!(result, expect);
        assert!(!Path::new(".Cargo.toml.rebrand").exists());

        Ok(())
    }

    #[sealed_test]
    fn edit_twice_is_unchanged() -> anyhow::Result<()> {
        write("Cargo.toml", CARGO_TOML)?;
        let manifest = ManifestFile::new("Cargo.toml");

        manifest.edit(&package_name("acme"))?;
        let result = manifest.edit(&package_name("acme"))?;
        assert_eq!(result, Outcome::Unchanged);

        Ok(())
    }

    #[sealed_test]
    fn preview_does_not_write() -> anyhow::Result<()> {
        write("Cargo.toml", CARGO_TOML)?;
        let manifest = ManifestFile::new("Cargo.toml");

        let result = manifest.preview(&package_name("acme"))?;
        assert!(matches!(result, Outcome::Updated(changes) if changes.len() == 1));
        assert_eq!(read_to_string("Cargo.toml")?, CARGO_TOML);

        Ok(())
    }

    #[sealed_test]
    fn failed_rewrite_leaves_manifest_untouched() -> anyhow::Result<()> {
        write("Cargo.toml", CARGO_TOML)?;
        let manifest = ManifestFile::new("Cargo.toml");
        let plan = package_name("acme")
            .with_rule(KeyRule::fixed(Scope::named("features"), "default", "x"))
            .with_mode(Mode::Strict);

        let result = manifest.edit(&plan);
        assert!(matches!(
            result,
            Err(ManifestError::Rewrite {
                source: RewriteError::NotFound { .. },
                ..
            })
        ));
        assert_eq!(read_to_string("Cargo.toml")?, CARGO_TOML);

        Ok(())
    }

    #[cfg(unix)]
    #[sealed_test]
    fn edit_follows_symlinked_manifest() -> anyhow::Result<()> {
        std::fs::create_dir("shared")?;
        write("shared/Cargo.toml", CARGO_TOML)?;
        std::os::unix::fs::symlink("shared/Cargo.toml", "Cargo.toml")?;

        ManifestFile::new("Cargo.toml").edit(&package_name("acme"))?;

        assert!(std::fs::symlink_metadata("Cargo.toml")?.file_type().is_symlink());
        assert!(read_to_string("shared/Cargo.toml")?.contains("name = \"acme\""));
        assert!(!Path::new("shared/.Cargo.toml.rebrand").exists());

        Ok(())
    }

    #[sealed_test]
    fn missing_manifest() {
        let manifest = ManifestFile::new("Cargo.toml");
        let result = manifest.edit(&package_name("acme"));
        assert!(matches!(result, Err(ManifestError::Missing { .. })));
    }
}
