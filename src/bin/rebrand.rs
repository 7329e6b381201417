// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use rebrand::{
    builtin_targets,
    config::{BrandingSettings, RebrandConfig, RuleDefinition, SourceDir, TargetDefinition},
    path::default_config_path,
    session::FileStatus,
    Branding, Mode, Session, Syntax, Target,
};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use inquire::Text;
use std::{
    fs::{read_to_string, write},
    io::ErrorKind,
    path::PathBuf,
    process::exit,
};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "rebrand [options] <rebrand-command>",
    subcommand_help_heading = "Commands",
    version
)]
struct Cli {
    /// Path to configuration file.
    #[arg(short, long, global = true, value_name = "path")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    fn run(self) -> Result<()> {
        match self.command {
            Command::Apply(opts) => run_apply(self.config, opts),
            Command::Plan(opts) => run_plan(self.config, opts),
            Command::Init(opts) => run_init(self.config, opts),
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Rebrand files of a source directory.
    #[command(override_usage = "rebrand apply [options] [source_dir]")]
    Apply(ApplyOptions),

    /// Show targets and the values they would be rewritten with.
    #[command(override_usage = "rebrand plan [options]")]
    Plan(PlanOptions),

    /// Write starter configuration file.
    #[command(override_usage = "rebrand init [options]")]
    Init(InitOptions),
}

#[derive(Args, Clone, Debug, Default)]
struct BrandingOptions {
    /// New application name.
    #[arg(short, long, value_name = "name")]
    pub name: Option<String>,

    /// New executable name without ".exe".
    #[arg(short, long, value_name = "name")]
    pub executable: Option<String>,

    /// Public key of rendezvous server.
    #[arg(short = 'k', long, value_name = "key")]
    pub public_key: Option<String>,

    /// Rendezvous server address.
    #[arg(short, long, value_name = "address")]
    pub server: Option<String>,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct ApplyOptions {
    /// Source directory of checkout to rebrand.
    #[arg(value_name = "source_dir")]
    pub source_dir: Option<PathBuf>,

    #[command(flatten)]
    pub branding: BrandingOptions,

    /// Fail a file when any of its key rules never matches.
    #[arg(long)]
    pub strict: bool,

    /// Show what would change without writing anything.
    #[arg(short, long)]
    pub dry_run: bool,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct PlanOptions {
    #[command(flatten)]
    pub branding: BrandingOptions,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct InitOptions {
    /// Overwrite existing configuration file.
    #[arg(short, long)]
    pub force: bool,
}

fn main() {
    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .with_timer(false)
        .without_time();
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    if let Err(error) = run() {
        error!("{error:?}");
        exit(1);
    }

    exit(0)
}

fn run() -> Result<()> {
    Cli::parse().run()
}

fn run_apply(config_path: Option<PathBuf>, opts: ApplyOptions) -> Result<()> {
    let config = load_config(config_path)?;
    let branding = resolve_branding(&config.branding, &opts.branding, true)?;
    let source_dir = match (opts.source_dir, &config.branding.source_dir) {
        (Some(path), _) => path,
        (None, Some(path)) => path.as_path().to_path_buf(),
        (None, None) => std::env::current_dir().context("failed to determine current directory")?,
    };
    let mode = if opts.strict || config.branding.strict {
        Mode::Strict
    } else {
        Mode::Lenient
    };

    let session = Session::new(source_dir, branding, session_targets(&config)).with_mode(mode);
    info!(
        "rebrand {:?} as {:?}",
        session.source_dir().display(),
        session.branding().app_name()
    );

    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.green} {pos:>3} files  {wide_msg}")?
            .tick_chars("-\\|/ "),
    );
    let report = session.run_with(opts.dry_run, |entry| {
        bar.inc(1);
        bar.set_message(entry.path.display().to_string());
    })?;
    bar.finish_and_clear();

    for entry in report.entries() {
        match &entry.status {
            FileStatus::Updated(changes) => {
                let verb = if opts.dry_run { "would update" } else { "updated" };
                println!("{verb} {}", entry.path.display());
                for change in changes {
                    println!("    {change}");
                }
            }
            FileStatus::Unchanged => println!("unchanged {}", entry.path.display()),
            FileStatus::Skipped => println!("skipped {}", entry.path.display()),
            FileStatus::Failed(error) => println!("failed {}: {error}", entry.path.display()),
        }
    }

    if report.has_failures() {
        bail!("{} files failed to rebrand", report.failures().count());
    }

    Ok(())
}

fn run_plan(config_path: Option<PathBuf>, opts: PlanOptions) -> Result<()> {
    let config = load_config(config_path)?;
    let branding = resolve_branding(&config.branding, &opts.branding, false)?;

    for target in session_targets(&config) {
        println!("{}", target.pattern());
        for rule in target.rules() {
            let value = rule
                .value
                .render(&branding)
                .unwrap_or_else(|err| format!("<{err}>"));
            println!("    {} {} = {value:?}", rule.scope, rule.key);
        }
    }

    Ok(())
}

fn run_init(config_path: Option<PathBuf>, opts: InitOptions) -> Result<()> {
    let path = match config_path {
        Some(path) => path,
        None => default_config_path()?,
    };

    if path.exists() && !opts.force {
        bail!("configuration file {:?} already exists", path.display());
    }

    let config = RebrandConfig {
        branding: BrandingSettings {
            app_name: Some("<put new application name here>".into()),
            executable_name: Some("<put new executable name here>".into()),
            source_dir: Some(SourceDir::new("<put path to checkout here>")),
            ..Default::default()
        },
        targets: Some(vec![TargetDefinition {
            path: "res/RustDesk2.toml".into(),
            syntax: Syntax::Toml,
            rules: vec![RuleDefinition {
                section: Some("options".into()),
                key: "custom-rendezvous-server".into(),
                value: "{server_address}".into(),
            }],
        }]),
    };

    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        mkdirp::mkdirp(parent)
            .with_context(|| format!("failed to create directory {:?}", parent.display()))?;
    }
    write(&path, config.to_string())
        .with_context(|| format!("failed to write configuration file {:?}", path.display()))?;
    info!("wrote configuration file {:?}", path.display());

    Ok(())
}

fn load_config(config_path: Option<PathBuf>) -> Result<RebrandConfig> {
    let (path, explicit) = match config_path {
        Some(path) => (path, true),
        None => (default_config_path()?, false),
    };

    match read_to_string(&path) {
        Ok(data) => data
            .parse()
            .with_context(|| format!("invalid configuration file {:?}", path.display())),
        Err(err) if err.kind() == ErrorKind::NotFound && !explicit => Ok(RebrandConfig::default()),
        Err(err) => Err(err)
            .with_context(|| format!("failed to read configuration file {:?}", path.display())),
    }
}

fn resolve_branding(
    settings: &BrandingSettings,
    opts: &BrandingOptions,
    interactive: bool,
) -> Result<Branding> {
    let app_name = match opts.name.clone().or_else(|| settings.app_name.clone()) {
        Some(name) => name,
        None if interactive => Text::new("new application name").prompt()?,
        None => bail!("no application name given, use --name or the configuration file"),
    };

    let mut branding = Branding::new(app_name)?;
    if let Some(name) = opts.executable.as_ref().or(settings.executable_name.as_ref()) {
        branding = branding.with_executable_name(name);
    } else {
        warn!("no executable name given, using {:?}", branding.executable());
    }
    if let Some(key) = opts.public_key.as_ref().or(settings.public_key.as_ref()) {
        branding = branding.with_public_key(key);
    }
    if let Some(address) = opts.server.as_ref().or(settings.server_address.as_ref()) {
        branding = branding.with_server_address(address);
    }

    Ok(branding)
}

fn session_targets(config: &RebrandConfig) -> Vec<Target> {
    let mut targets = if config.branding.skip_builtin {
        Vec::new()
    } else {
        builtin_targets()
    };
    targets.extend(config.extra_targets());
    targets
}
