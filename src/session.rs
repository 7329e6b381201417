// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Rebranding sessions.
//!
//! A __session__ applies a listing of targets to the source directory of a
//! checkout with one branding. Files are rewritten one at a time. A file that
//! fails to rewrite is logged and recorded in the session [`Report`], but does
//! not stop the remaining files from being rewritten.

use crate::{
    brand::{BrandError, Branding, Target},
    manifest::{ManifestError, ManifestFile, Outcome},
    rewrite::{LineChange, Mode},
};

use glob::{glob, GlobError, Pattern, PatternError};
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// Rebranding run over a source directory.
#[derive(Debug, Clone)]
pub struct Session {
    source_dir: PathBuf,
    branding: Branding,
    targets: Vec<Target>,
    mode: Mode,
}

impl Session {
    /// Construct new session in lenient mode.
    pub fn new(
        source_dir: impl Into<PathBuf>,
        branding: Branding,
        targets: impl IntoIterator<Item = Target>,
    ) -> Self {
        Self {
            source_dir: source_dir.into(),
            branding,
            targets: targets.into_iter().collect(),
            mode: Mode::default(),
        }
    }

    /// Set how key rules that never fire are treated.
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn source_dir(&self) -> &Path {
        self.source_dir.as_path()
    }

    pub fn branding(&self) -> &Branding {
        &self.branding
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// Resolve target pattern into existing files under source directory.
    ///
    /// # Errors
    ///
    /// - Return [`SessionError::Pattern`] if target pattern is invalid.
    /// - Return [`SessionError::Glob`] if a matched path cannot be read.
    pub fn resolve(&self, target: &Target) -> Result<Vec<PathBuf>> {
        let base = Pattern::escape(self.source_dir.to_string_lossy().as_ref());
        let pattern = Path::new(&base).join(target.pattern());

        let mut paths = glob(pattern.to_string_lossy().as_ref())?
            .collect::<std::result::Result<Vec<_>, GlobError>>()?;
        paths.retain(|path| path.is_file());

        Ok(paths)
    }

    /// Apply all targets, writing rewritten files back.
    ///
    /// # Errors
    ///
    /// - Return [`SessionError::MissingSourceDir`] if source directory does not
    ///   exist. Per-file failures are recorded in the report instead.
    pub fn run(&self) -> Result<Report> {
        self.run_with(false, |_| {})
    }

    /// Apply all targets without writing anything.
    ///
    /// # Errors
    ///
    /// - Return [`SessionError::MissingSourceDir`] if source directory does not
    ///   exist.
    pub fn dry_run(&self) -> Result<Report> {
        self.run_with(true, |_| {})
    }

    /// Apply all targets, calling back after each finished file.
    ///
    /// # Errors
    ///
    /// - Return [`SessionError::MissingSourceDir`] if source directory does not
    ///   exist.
    #[instrument(skip(self, on_file), fields(source_dir = %self.source_dir.display()))]
    pub fn run_with(&self, dry_run: bool, mut on_file: impl FnMut(&FileReport)) -> Result<Report> {
        if !self.source_dir.is_dir() {
            return Err(SessionError::MissingSourceDir {
                path: self.source_dir.clone(),
            });
        }

        let mut report = Report::default();
        for target in &self.targets {
            for entry in self.apply(target, dry_run) {
                on_file(&entry);
                report.entries.push(entry);
            }
        }

        info!(
            "{} updated, {} unchanged, {} skipped, {} failed",
            report.updated().count(),
            report.unchanged().count(),
            report.skipped().count(),
            report.failures().count()
        );

        Ok(report)
    }

    fn apply(&self, target: &Target, dry_run: bool) -> Vec<FileReport> {
        let fallback = self.source_dir.join(target.pattern());

        let plan = match target.plan(&self.branding, self.mode) {
            Ok(plan) => plan,
            Err(error) => return vec![FileReport::failed(fallback, error.into())],
        };

        let paths = match self.resolve(target) {
            Ok(paths) => paths,
            Err(error) => return vec![FileReport::failed(fallback, error)],
        };

        if paths.is_empty() {
            warn!("nothing matches {:?}, skipping", fallback.display());
            return vec![FileReport {
                path: fallback,
                status: FileStatus::Skipped,
            }];
        }

        paths
            .into_iter()
            .map(|path| {
                let manifest = ManifestFile::new(&path);
                let result = if dry_run {
                    manifest.preview(&plan)
                } else {
                    manifest.edit(&plan)
                };

                match result {
                    Ok(Outcome::Updated(changes)) => FileReport {
                        path,
                        status: FileStatus::Updated(changes),
                    },
                    Ok(Outcome::Unchanged) => FileReport {
                        path,
                        status: FileStatus::Unchanged,
                    },
                    Err(error) => FileReport::failed(path, error.into()),
                }
            })
            .collect()
    }
}

/// Outcome of every file touched by a session.
#[derive(Debug, Default)]
pub struct Report {
    entries: Vec<FileReport>,
}

impl Report {
    pub fn entries(&self) -> &[FileReport] {
        &self.entries
    }

    pub fn updated(&self) -> impl Iterator<Item = &FileReport> {
        self.entries
            .iter()
            .filter(|entry| matches!(entry.status, FileStatus::Updated(_)))
    }

    pub fn unchanged(&self) -> impl Iterator<Item = &FileReport> {
        self.entries
            .iter()
            .filter(|entry| matches!(entry.status, FileStatus::Unchanged))
    }

    pub fn skipped(&self) -> impl Iterator<Item = &FileReport> {
        self.entries
            .iter()
            .filter(|entry| matches!(entry.status, FileStatus::Skipped))
    }

    pub fn failures(&self) -> impl Iterator<Item = &FileReport> {
        self.entries
            .iter()
            .filter(|entry| matches!(entry.status, FileStatus::Failed(_)))
    }

    /// Check if any file failed.
    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }
}

/// Outcome of one file.
#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub status: FileStatus,
}

impl FileReport {
    fn failed(path: PathBuf, error: SessionError) -> Self {
        warn!("failed to rebrand {:?}: {error}", path.display());
        Self {
            path,
            status: FileStatus::Failed(error),
        }
    }
}

/// Status of one file after a session.
#[derive(Debug)]
pub enum FileStatus {
    /// File was rewritten, or would be on a dry run.
    Updated(Vec<LineChange>),

    /// File already carried the branding.
    Unchanged,

    /// Target pattern matched no file.
    Skipped,

    /// File could not be rewritten.
    Failed(SessionError),
}

/// Session error types.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Source directory does not exist.
    #[error("source directory {:?} does not exist", path.display())]
    MissingSourceDir { path: PathBuf },

    /// Rule values of target cannot be rendered.
    #[error(transparent)]
    Brand(#[from] BrandError),

    /// Manifest cannot be rewritten.
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Target pattern is not a valid glob pattern.
    #[error(transparent)]
    Pattern(#[from] PatternError),

    /// Matched path cannot be accessed.
    #[error(transparent)]
    Glob(#[from] GlobError),
}

/// Friendly result alias :3
pub type Result<T, E = SessionError> = std::result::Result<T, E>;
