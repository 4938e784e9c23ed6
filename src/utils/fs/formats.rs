//! Structured data file reading and writing.
//!
//! Data sources and site content come in two formats:
//! - JSON (`.json`)
//! - YAML (`.yaml`, `.yml`)
//!
//! Both are loaded into [`serde_json::Value`] so the rest of the pipeline works on
//! one value model. Files with any other extension are sniffed: JSON first, then
//! YAML.
//!
//! # Examples
//!
//! ```rust,no_run
//! use sitekit_cli::utils::fs::formats::{read_structured_file, write_json_file};
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! let team = read_structured_file(Path::new("public/data/team.yml"))?;
//! write_json_file(Path::new("dist/team.json"), &team, true)?;
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Payload format of a data file, detected from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    /// `.json`
    Json,
    /// `.yaml` / `.yml`
    Yaml,
    /// Anything else; parsed as JSON, falling back to YAML
    Unknown,
}

impl DataFormat {
    /// Detect the format from a path's extension (case-insensitive).
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref() {
            Some("json") => Self::Json,
            Some("yaml" | "yml") => Self::Yaml,
            _ => Self::Unknown,
        }
    }
}

/// Parse text in the given format into a JSON value.
///
/// # Errors
/// Returns the parser error of the format that was tried last.
pub fn parse_structured(content: &str, format: DataFormat) -> Result<Value> {
    match format {
        DataFormat::Json => serde_json::from_str(content).context("Invalid JSON"),
        DataFormat::Yaml => parse_yaml(content),
        DataFormat::Unknown => {
            serde_json::from_str(content).or_else(|_| parse_yaml(content).context("Neither JSON nor YAML"))
        }
    }
}

fn parse_yaml(content: &str) -> Result<Value> {
    let yaml: serde_yaml::Value = serde_yaml::from_str(content).context("Invalid YAML")?;
    serde_json::to_value(yaml).context("YAML document cannot be represented as JSON")
}

/// Read and parse a JSON or YAML file, choosing the parser by extension.
///
/// # Errors
/// Returns an error with the file path if it cannot be read or parsed.
pub fn read_structured_file(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    parse_structured(&content, DataFormat::from_path(path))
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Async variant of [`read_structured_file`] used by the fetch executor.
///
/// The `io::Error` is returned separately from parse failures so callers can
/// tell a missing file from a malformed one.
pub async fn read_structured_file_async(path: &Path) -> std::result::Result<Result<Value>, std::io::Error> {
    let content = tokio::fs::read_to_string(path).await?;
    Ok(parse_structured(&content, DataFormat::from_path(path)))
}

/// Writes data as JSON to a file atomically.
///
/// # Errors
/// Returns an error if serialization fails or the file cannot be written
pub fn write_json_file<T>(path: &Path, data: &T, pretty: bool) -> Result<()>
where
    T: serde::Serialize,
{
    let json = if pretty {
        serde_json::to_string_pretty(data)?
    } else {
        serde_json::to_string(data)?
    };
    super::atomic::safe_write(path, &json)
        .with_context(|| format!("Failed to write JSON file: {}", path.display()))
}
