// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Rebrand a local checkout of a remote-desktop application.
//!
//! Rebranding rewrites the product name, executable name, and related values
//! inside the INI-style files of a checkout, e.g., Cargo manifests, desktop
//! entries, and systemd service units. Every rewrite is scoped to the section
//! of the file that owns the key, so equally named keys in other sections are
//! left alone.
//!
//! # See Also
//!
//! 1. [`rewrite`]
//! 2. [`session`]

pub mod brand;
pub mod config;
pub mod manifest;
pub mod path;
pub mod rewrite;
pub mod session;

pub use brand::{builtin_targets, Branding, Target};
pub use rewrite::{rewrite, Document, KeyRule, Mode, RewritePlan, Scope, Syntax};
pub use session::{Report, Session};
