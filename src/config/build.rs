//! Per-site build configuration (`sitekit.toml`).
//!
//! ```toml
//! # All keys are optional
//! public_dir = "public"
//! output_dir = "dist"
//!
//! [fetch]
//! timeout_secs = 30
//! retries = 2
//! user_agent = "my-site-build"
//! ```
//!
//! # Lookup order
//!
//! 1. The path given explicitly (`--config`)
//! 2. The `SITEKIT_CONFIG` environment variable
//! 3. `<site_root>/sitekit.toml`
//!
//! An explicitly requested file must exist. The default location may be absent,
//! in which case defaults apply.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use super::parse_config;
use crate::constants::{
    CONFIG_ENV_VAR, CONFIG_FILE_NAME, DEFAULT_FETCH_RETRIES, DEFAULT_FETCH_TIMEOUT, DEFAULT_OUTPUT_DIR,
    DEFAULT_PUBLIC_DIR, DEFAULT_USER_AGENT,
};
use crate::core::SiteError;

/// Build configuration for one site.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BuildConfig {
    /// Root directory of the site. Relative data paths resolve against it.
    pub site_root: PathBuf,

    /// Directory serving static files; `/`-prefixed data paths resolve here.
    ///
    /// Relative values are joined onto `site_root`.
    pub public_dir: PathBuf,

    /// Directory receiving build output.
    ///
    /// Relative values are joined onto `site_root`.
    pub output_dir: PathBuf,

    /// Remote fetch behavior.
    pub fetch: FetchSettings,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            site_root: PathBuf::from("."),
            public_dir: PathBuf::from(DEFAULT_PUBLIC_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            fetch: FetchSettings::default(),
        }
    }
}

/// Settings for remote data fetches.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FetchSettings {
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Retries for transient failures (connect errors, timeouts, 5xx).
    pub retries: usize,
    /// `User-Agent` header value.
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_FETCH_TIMEOUT.as_secs(),
            retries: DEFAULT_FETCH_RETRIES,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl FetchSettings {
    /// Timeout as a [`Duration`].
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl BuildConfig {
    /// Load configuration for the site at `site_root`.
    ///
    /// `site_root` always overrides the `site_root` key of the file, and the
    /// returned configuration has `public_dir` and `output_dir` resolved.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly requested file (argument or
    /// `SITEKIT_CONFIG`) does not exist, or if the file is invalid TOML.
    pub fn load_with_optional(path: Option<PathBuf>, site_root: &Path) -> Result<Self> {
        let explicit = path.or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from));

        let mut config = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(SiteError::ConfigError {
                        message: format!("config file not found: {}", path.display()),
                    }
                    .into());
                }
                debug!("Loading build config from {}", path.display());
                parse_config::<Self>(&path)?
            }
            None => {
                let default_path = site_root.join(CONFIG_FILE_NAME);
                if default_path.exists() {
                    debug!("Loading build config from {}", default_path.display());
                    parse_config::<Self>(&default_path)?
                } else {
                    debug!("No {} in {}, using defaults", CONFIG_FILE_NAME, site_root.display());
                    Self::default()
                }
            }
        };

        config.site_root = site_root.to_path_buf();
        Ok(config.resolved())
    }

    /// Resolve relative `public_dir` / `output_dir` against `site_root`.
    #[must_use]
    pub fn resolved(mut self) -> Self {
        if self.public_dir.is_relative() {
            self.public_dir = self.site_root.join(&self.public_dir);
        }
        if self.output_dir.is_relative() {
            self.output_dir = self.site_root.join(&self.output_dir);
        }
        self
    }
}
