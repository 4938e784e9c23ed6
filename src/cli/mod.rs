//! Command-line interface for sitekit.
//!
//! # Available Commands
//!
//! - `prerender` - Resolve build-time fetches and expand dynamic routes
//! - `schema` - Reduce component metadata to the runtime schema map
//!
//! # Usage
//!
//! ```bash
//! # Fetch data for every page and write dist/site-content.json
//! sitekit prerender --content site-content.json
//!
//! # Write the runtime schemas of all components to stdout
//! sitekit schema --components src/components
//!
//! # Debug output, custom config
//! sitekit --verbose --config ci/sitekit.toml prerender --content site-content.json
//! ```
//!
//! # Global Options
//!
//! - `--verbose` - Enable debug output
//! - `--quiet` - Only report errors
//! - `--config <PATH>` - Use a specific `sitekit.toml`
//!
//! `RUST_LOG`, when set, takes precedence over `--verbose` and `--quiet`.

mod prerender;
mod schema;

pub use prerender::PrerenderCommand;
pub use schema::SchemaCommand;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Logging and configuration derived from the global flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Default log filter when `RUST_LOG` is unset
    pub log_level: String,

    /// Explicit configuration file (`--config`)
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    /// Install the global tracing subscriber. Later calls have no effect.
    pub fn init_logging(&self) {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new(&self.log_level)
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init();
    }
}

/// Build-time tooling for data-driven static sites.
#[derive(Parser, Debug)]
#[command(
    name = "sitekit",
    about = "Build-time data fetching, route expansion and runtime schemas for static sites",
    version,
    author
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only report errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the build configuration file.
    ///
    /// Defaults to `SITEKIT_CONFIG`, then `sitekit.toml` in the site root.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch data for every scope and expand dynamic pages.
    ///
    /// See [`PrerenderCommand`].
    Prerender(PrerenderCommand),

    /// Extract runtime schemas from component metadata.
    ///
    /// See [`SchemaCommand`].
    Schema(SchemaCommand),
}

impl Cli {
    /// Execute the parsed command.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Translate global flags into a [`CliConfig`].
    ///
    /// ```rust
    /// use clap::Parser;
    /// use sitekit_cli::cli::Cli;
    ///
    /// let cli = Cli::parse_from(["sitekit", "--verbose", "schema", "--components", "src/components"]);
    /// assert_eq!(cli.build_config().log_level, "debug");
    /// ```
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "info"
        };

        CliConfig {
            log_level: log_level.to_string(),
            config_path: self.config.clone(),
        }
    }

    /// Execute with an explicit configuration.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.init_logging();

        match self.command {
            Commands::Prerender(cmd) => cmd.execute_with_config_path(config.config_path).await,
            Commands::Schema(cmd) => cmd.execute(),
        }
    }
}
