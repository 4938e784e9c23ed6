//! Test utilities for sitekit
//!
//! Helpers shared by unit and integration tests:
//! - Logging that plays well with the test harness
//! - Temporary site directories with content, data and component metadata
//!
//! # Example
//!
//! ```rust,no_run
//! use sitekit_cli::test_utils::{SiteFixture, init_test_logging};
//!
//! # fn example() -> anyhow::Result<()> {
//! init_test_logging(None);
//! let site = SiteFixture::new()?;
//! site.data_file("team.json", r#"[{"name": "Ada"}]"#)?;
//! # Ok(())
//! # }
//! ```

pub mod fixtures;

pub use fixtures::SiteFixture;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. `level` wins over `RUST_LOG`; with
/// neither set, nothing is logged.
///
/// ```bash
/// RUST_LOG=sitekit_cli=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}
