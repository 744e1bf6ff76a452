use crate::backend::{resolve, ResolvedBackend};
use crate::config::{BackendEntry, Config, ConfigBuilder};
use crate::corpus::classify;
use crate::discovery::{discover_with_backend, DiscoverySource};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug, Clone)]
#[command(name = "roamfind")]
#[command(version, about = "List and classify the files of a notes directory", long_about = None)]
pub struct Args {
    /// Configuration file (TOML)
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Notes root directory
    #[arg(short, long, value_name = "DIR", env = "ROAMFIND_DIRECTORY", global = true)]
    pub directory: Option<PathBuf>,

    /// Corpus file extension, repeatable (default: org)
    #[arg(short, long = "extension", value_name = "EXT", global = true)]
    pub extensions: Vec<String>,

    /// Exclude regex matched against the root-relative path, repeatable
    #[arg(long, value_name = "REGEX", global = true)]
    pub exclude: Vec<String>,

    /// Disable all exclude patterns
    #[arg(long, global = true, conflicts_with = "exclude")]
    pub no_exclude: bool,

    /// Search backend in preference order, repeatable: find, fd, fdfind, rg[=PATH]
    #[arg(short, long = "backend", value_name = "TAG[=PATH]", global = true)]
    pub backends: Vec<BackendEntry>,

    /// Skip external tools and use the built-in walker
    #[arg(long, global = true, conflicts_with = "backends")]
    pub walker: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// List every corpus file
    List {
        /// Print a JSON report with the backend used
        #[arg(long)]
        json: bool,
    },

    /// Check whether paths belong to the corpus
    Check {
        /// Paths to check
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Show the backend that would be used
    Backend,

    /// Show the search command that would be run
    Command,
}

pub fn init_logging(args: &Args) {
    let level = if args.quiet {
        "error"
    } else if args.verbose {
        "debug"
    } else {
        "info"
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

pub fn run(args: Args) -> Result<ExitCode> {
    let config = build_config(&args)?;
    log::debug!("corpus root: {}", config.root_directory().display());

    match &args.command {
        Commands::List { json } => list(&config, *json),
        Commands::Check { paths } => check(&config, paths),
        Commands::Backend => show_backend(&config),
        Commands::Command => show_command(&config),
    }
}

/// Config file first, then command-line overrides.
pub fn build_config(args: &Args) -> Result<Config> {
    let mut builder = match &args.config {
        Some(path) => ConfigBuilder::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ConfigBuilder::new(),
    };

    if let Some(dir) = &args.directory {
        builder = builder.root_directory(dir);
    }
    if !args.extensions.is_empty() {
        builder = builder.extensions(args.extensions.clone());
    }
    if args.no_exclude {
        builder = builder.no_exclude();
    } else if !args.exclude.is_empty() {
        builder = builder.exclude(args.exclude.clone());
    }
    if args.walker {
        builder = builder.backend_preference(Vec::new());
    } else if !args.backends.is_empty() {
        builder = builder.backend_preference(args.backends.clone());
    }

    match builder.clone().build() {
        Err(crate::error::DiscoveryError::MissingRoot) => builder
            .root_directory(Config::default().root_directory())
            .build()
            .context("Invalid configuration"),
        other => other.context("Invalid configuration"),
    }
}

fn list(config: &Config, json: bool) -> Result<ExitCode> {
    let resolved = resolve(config.backend_preference())?;
    let discovery = discover_with_backend(config, &resolved);

    if json {
        let report = serde_json::to_string_pretty(&discovery)
            .context("Failed to serialize discovery report")?;
        println!("{}", report);
    } else {
        for file in &discovery.files {
            println!("{}", file.display());
        }
    }

    match discovery.source {
        DiscoverySource::Backend(tag) => log::info!("{} files via {}", discovery.files.len(), tag),
        DiscoverySource::Walker => log::info!("{} files via the built-in walker", discovery.files.len()),
    }

    Ok(ExitCode::SUCCESS)
}

fn check(config: &Config, paths: &[PathBuf]) -> Result<ExitCode> {
    let mut all_members = true;

    for path in paths {
        let absolute = absolutize(path)?;
        let classification = classify(config, Some(&absolute));

        if classification.is_member() {
            println!("{} {}", "✓".green(), absolute.display());
        } else {
            all_members = false;
            println!("{} {} - {}", "✗".red(), absolute.display(), classification);
        }
    }

    Ok(if all_members { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn show_backend(config: &Config) -> Result<ExitCode> {
    match resolve(config.backend_preference())? {
        ResolvedBackend::External { tag, executable } => {
            println!("{} {}", tag, executable.display());
        }
        ResolvedBackend::Fallback => println!("walker (built-in)"),
    }
    Ok(ExitCode::SUCCESS)
}

fn show_command(config: &Config) -> Result<ExitCode> {
    let resolved = resolve(config.backend_preference())?;
    match resolved.query(config.root_directory(), config.extensions()) {
        Some(command) => println!("{}", command),
        None => println!("walker (built-in, no external command)"),
    }
    Ok(ExitCode::SUCCESS)
}

/// Existing paths are canonicalized; others are made absolute lexically.
fn absolutize(path: &Path) -> Result<PathBuf> {
    if let Ok(canonical) = path.canonicalize() {
        return Ok(canonical);
    }
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    Ok(cwd.join(path))
}
