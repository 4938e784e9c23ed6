//! Generic configuration parsing utilities.
//!
//! Generic TOML parsing for any `DeserializeOwned` configuration type, with the
//! file path attached to every error.
//!
//! ```rust,no_run
//! use sitekit_cli::config::{BuildConfig, parse_config};
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! let config: BuildConfig = parse_config(Path::new("sitekit.toml"))?;
//! println!("public dir: {}", config.public_dir.display());
//! # Ok(())
//! # }
//! ```
//!
//! Example error output:
//! ```text
//! Failed to parse config file: /path/to/sitekit.toml
//! Caused by:
//!     invalid type: string "ten", expected u64
//! ```

use anyhow::{Context, Result};
use std::path::Path;

/// Parse a TOML configuration file into `T`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not deserialize into `T`.
/// The underlying error (file system or TOML parsing) is preserved as the cause.
pub fn parse_config<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: T = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        use tempfile::tempdir;

        let temp = tempdir().unwrap();
        let config_path = temp.path().join("test.toml");

        #[derive(serde::Deserialize)]
        struct TestConfig {
            name: String,
            value: i32,
        }

        let toml_content = r#"
            name = "test"
            value = 42
        "#;

        std::fs::write(&config_path, toml_content).unwrap();

        let config: TestConfig = parse_config(&config_path).unwrap();
        assert_eq!(config.name, "test");
        assert_eq!(config.value, 42);
    }

    #[test]
    fn test_parse_config_error_mentions_path() {
        use tempfile::tempdir;

        let temp = tempdir().unwrap();
        let config_path = temp.path().join("invalid.toml");

        #[derive(Debug, serde::Deserialize)]
        struct TestConfig {
            #[allow(dead_code)] // Field used by serde for deserialization validation, not accessed directly
            name: String,
        }

        std::fs::write(&config_path, "invalid = toml {").unwrap();

        let err = parse_config::<TestConfig>(&config_path).unwrap_err();
        assert!(err.to_string().contains("invalid.toml"));
    }
}
