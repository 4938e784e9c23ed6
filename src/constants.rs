//! Global constants used throughout the sitekit codebase.
//!
//! This module contains timeout durations, retry parameters, default
//! directory names and other values that are shared by several modules.

use std::time::Duration;

/// Default timeout for a single remote data fetch (30 seconds).
///
/// A remote source that does not answer within this window degrades to an
/// empty result with an error message instead of stalling the build.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of retries for transient remote fetch failures.
pub const DEFAULT_FETCH_RETRIES: usize = 2;

/// Starting delay for exponential backoff between fetch retries (50ms).
pub const STARTING_BACKOFF_DELAY_MS: u64 = 50;

/// Maximum backoff delay between fetch retries (2 seconds).
pub const MAX_BACKOFF_DELAY_MS: u64 = 2000;

/// User agent sent with remote data requests.
pub const DEFAULT_USER_AGENT: &str = concat!("sitekit/", env!("CARGO_PKG_VERSION"));

/// Directory (relative to the site root) holding static files and data.
pub const DEFAULT_PUBLIC_DIR: &str = "public";

/// Directory (relative to the site root) receiving build output.
pub const DEFAULT_OUTPUT_DIR: &str = "dist";

/// Directory prefix that `collection` fetch shorthands expand into.
pub const COLLECTION_DATA_DIR: &str = "/data";

/// Name of the per-site build configuration file.
pub const CONFIG_FILE_NAME: &str = "sitekit.toml";

/// Environment variable overriding the configuration file location.
pub const CONFIG_ENV_VAR: &str = "SITEKIT_CONFIG";

/// File name of the expanded site content written by `sitekit prerender`.
pub const EXPANDED_CONTENT_FILE: &str = "site-content.json";

/// Component metadata file names probed by schema discovery, in priority order.
pub const META_FILE_NAMES: &[&str] = &["meta.json", "meta.yaml", "meta.yml"];
