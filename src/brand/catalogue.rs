// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Rebranding targets.
//!
//! A __target__ is a file pattern, relative to the source directory of the
//! checkout, paired with the key rules to apply to every file it matches.
//! Rule values are kept as [`ValueTemplate`]s until a [`Branding`] is known,
//! at which point the target turns into a [`RewritePlan`].
//!
//! The built-in catalogue covers the INI-style files of a RustDesk checkout
//! that carry the product name: the root and portable Cargo manifests, the
//! desktop entries, and the systemd service units.

use crate::{
    brand::{Branding, Result, ValueTemplate},
    rewrite::{KeyRule, Mode, RewritePlan, Scope, Syntax},
};

/// File pattern with the key rules to apply to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pattern: String,
    syntax: Syntax,
    rules: Vec<RuleTemplate>,
}

impl Target {
    /// Construct new target without rules.
    ///
    /// Pattern may use glob syntax, e.g., `res/*.desktop`.
    pub fn new(pattern: impl Into<String>, syntax: Syntax) -> Self {
        Self {
            pattern: pattern.into(),
            syntax,
            rules: Vec::new(),
        }
    }

    /// Append key rule to target.
    pub fn with_rule(
        mut self,
        scope: Scope,
        key: impl Into<String>,
        value: impl Into<ValueTemplate>,
    ) -> Self {
        self.rules.push(RuleTemplate {
            scope,
            key: key.into(),
            value: value.into(),
        });
        self
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn syntax(&self) -> Syntax {
        self.syntax
    }

    pub fn rules(&self) -> &[RuleTemplate] {
        &self.rules
    }

    /// Render rule values with branding into rewrite plan.
    ///
    /// # Errors
    ///
    /// - Return [`BrandError`](crate::brand::BrandError) if any rule value
    ///   fails to render.
    pub fn plan(&self, branding: &Branding, mode: Mode) -> Result<RewritePlan> {
        let mut plan = RewritePlan::new().with_mode(mode);
        for rule in &self.rules {
            let value = rule.value.render(branding)?;
            plan.push(
                KeyRule::fixed(rule.scope.clone(), rule.key.clone(), value)
                    .with_syntax(self.syntax),
            );
        }

        Ok(plan)
    }
}

/// Key rule whose value is not rendered yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTemplate {
    pub scope: Scope,
    pub key: String,
    pub value: ValueTemplate,
}

/// Built-in rebranding targets of a RustDesk checkout.
pub fn builtin_targets() -> Vec<Target> {
    let package = Scope::named("package");
    let winres = Scope::named("package.metadata.winres");

    vec![
        Target::new("Cargo.toml", Syntax::Toml)
            .with_rule(package.clone(), "name", "{app_name}")
            .with_rule(package, "default-run", "{app_name}")
            .with_rule(winres.clone(), "ProductName", "{app_name}")
            .with_rule(winres.clone(), "OriginalFilename", "{executable}.exe"),
        Target::new("libs/portable/Cargo.toml", Syntax::Toml)
            .with_rule(winres.clone(), "ProductName", "{app_name}")
            .with_rule(winres, "OriginalFilename", "{executable}.exe"),
        Target::new("res/*.desktop", Syntax::Entry).with_rule(
            Scope::named("Desktop Entry"),
            "Name",
            "{app_name}",
        ),
        Target::new("res/*.service", Syntax::Entry).with_rule(
            Scope::named("Unit"),
            "Description",
            "{app_name} Service",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewrite::{rewrite, Document};
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    fn builtin(pattern: &str) -> Target {
        builtin_targets()
            .into_iter()
            .find(|target| target.pattern() == pattern)
            .unwrap()
    }

    #[test]
    fn rebrand_root_cargo_manifest() -> anyhow::Result<()> {
        let branding = Branding::new("Acme")?;
        let plan = builtin("Cargo.toml").plan(&branding, Mode::Strict)?;
        let document = Document::from(indoc! {r#"
            [package]
            name = "rustdesk"
            version = "1.3.2"
            default-run = "rustdesk"

            [lib]
            name = "librustdesk"

            [[bin]]
            name = "naming"

            [package.metadata.winres]
            LegalCopyright = "Copyright © 2025 Purslane Ltd. All rights reserved."
            ProductName = "RustDesk"
            FileDescription = "RustDesk Remote Desktop"
            OriginalFilename = "rustdesk.exe"
        "#});

        let result = rewrite(&document, &plan)?.to_string();
        let expect = indoc! {r#"
            [package]
            name = "Acme"
            version = "1.3.2"
            default-run = "Acme"

            [lib]
            name = "librustdesk"

            [[bin]]
            name = "naming"

            [package.metadata.winres]
            LegalCopyright = "Copyright © 2025 Purslane Ltd. All rights reserved."
            ProductName = "Acme"
            FileDescription = "RustDesk Remote Desktop"
            OriginalFilename = "acme.exe"
        "#};
        assert_eq!(result, expect);

        Ok(())
    }

    #[test]
    fn rebrand_service_unit() -> anyhow::Result<()> {
        let branding = Branding::new("Acme")?;
        let plan = builtin("res/*.service").plan(&branding, Mode::Lenient)?;
        let document = Document::from(indoc! {"
            [Unit]
            Description=RustDesk
            Requires=network.target

            [Service]
            Description=not a unit key
            ExecStart=/usr/bin/rustdesk --service
        "});

        let result = rewrite(&document, &plan)?.to_string();
        let expect = indoc! {"
            [Unit]
            Description=Acme Service
            Requires=network.target

            [Service]
            Description=not a unit key
            ExecStart=/usr/bin/rustdesk --service
        "};
        assert_eq!(result, expect);

        Ok(())
    }

    #[test]
    fn plan_fails_on_missing_branding_value() -> anyhow::Result<()> {
        let branding = Branding::new("Acme")?;
        let target = Target::new("res/RustDesk2.toml", Syntax::Toml).with_rule(
            Scope::named("options"),
            "key",
            "{public_key}",
        );

        assert!(target.plan(&branding, Mode::Lenient).is_err());

        Ok(())
    }
}
