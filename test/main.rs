// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT


use anyhow::Result;
use indoc::indoc;
use std::{
    fs::{create_dir_all, read_to_string, write},
    path::{Path, PathBuf},
};

pub(crate) const CARGO_TOML: &str = indoc! {r#"
    [package]
    name = "rustdesk"
    version = "1.3.2"
    default-run = "rustdesk"

    [lib]
    name = "librustdesk"

    [package.metadata.winres]
    ProductName = "RustDesk"
    OriginalFilename = "rustdesk.exe"
"#};

pub(crate) const PORTABLE_CARGO_TOML: &str = "\u{feff}[package]\r\nname = \"rustdesk-portable-packer\"\r\n\r\n[package.metadata.winres]\r\nProductName = \"RustDesk\"\r\nOriginalFilename = \"rustdesk.exe\"\r\n";

pub(crate) const DESKTOP_ENTRY: &str = indoc! {"
    [Desktop Entry]
    Version=1.5
    Name=RustDesk
    Exec=rustdesk %u

    [Desktop Action new-window]
    Name=Open a New Window
"};

pub(crate) const SERVICE_UNIT: &str = indoc! {"
    [Unit]
    Description=RustDesk
    Requires=network.target

    [Service]
    ExecStart=/usr/bin/rustdesk --service
"};

/// Fake RustDesk checkout laid out on disk.
pub(crate) struct CheckoutFixture {
    root: PathBuf,
}

impl CheckoutFixture {
    pub(crate) fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        create_dir_all(&root)?;

        Ok(Self { root })
    }

    /// Checkout with every file the built-in targets know about.
    pub(crate) fn rustdesk(root: impl Into<PathBuf>) -> Result<Self> {
        let fixture = Self::new(root)?;
        fixture.add("Cargo.toml", CARGO_TOML)?;
        fixture.add("libs/portable/Cargo.toml", PORTABLE_CARGO_TOML)?;
        fixture.add("res/rustdesk.desktop", DESKTOP_ENTRY)?;
        fixture.add("res/rustdesk-link.desktop", DESKTOP_ENTRY)?;
        fixture.add("res/rustdesk.service", SERVICE_UNIT)?;

        Ok(fixture)
    }

    pub(crate) fn add(&self, path: impl AsRef<Path>, contents: impl AsRef<str>) -> Result<()> {
        let path = self.root.join(path);
        if let Some(parent) = path.parent() {
            create_dir_all(parent)?;
        }
        write(path, contents.as_ref())?;

        Ok(())
    }

    pub(crate) fn read(&self, path: impl AsRef<Path>) -> Result<String> {
        Ok(read_to_string(self.root.join(path))?)
    }

    pub(crate) fn root(&self) -> &Path {
        self.root.as_path()
    }
}
