//! Runtime schemas for components.
//!
//! Each component directory carries editor metadata in `meta.json`,
//! `meta.yaml` or `meta.yml`:
//!
//! ```text
//! components/
//! ├── ArticleList/meta.yaml
//! ├── Hero/meta.json
//! └── TeamGrid/meta.yml
//! ```
//!
//! [`load_component_metas`] reads them, and [`build_schema_map`] reduces them
//! to the `{componentName: RuntimeSchema}` map embedded in the generated entry.

pub mod extractor;

pub use extractor::{DataBinding, RuntimeSchema, extract_runtime_schema, parse_data_string, reduce_field, reduce_schemas};

use anyhow::Result;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::constants::META_FILE_NAMES;
use crate::core::SiteError;
use crate::utils::fs::read_structured_file;

/// Reduce component metadata to runtime schemas.
///
/// Components whose metadata yields nothing are left out.
pub fn build_schema_map<I, K>(metas: I) -> BTreeMap<String, RuntimeSchema>
where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<String>,
{
    metas
        .into_iter()
        .filter_map(|(name, meta)| extract_runtime_schema(&meta).map(|schema| (name.into(), schema)))
        .collect()
}

/// Read every `<dir>/<Component>/meta.{json,yaml,yml}`.
///
/// The component name is its directory name. When a component has several
/// meta files the first in `meta.json`, `meta.yaml`, `meta.yml` order is used.
/// Unreadable files are logged and skipped.
///
/// # Errors
/// Returns an error if `dir` does not exist or is not a directory.
pub fn load_component_metas(dir: &Path) -> Result<BTreeMap<String, Value>> {
    if !dir.is_dir() {
        return Err(SiteError::ConfigError {
            message: format!("components directory not found: {}", dir.display()),
        }
        .into());
    }

    let mut metas = BTreeMap::new();
    for entry in WalkDir::new(dir)
        .min_depth(2)
        .max_depth(2)
        .sort_by_file_name()
        .into_iter()
        .filter_map(std::result::Result::ok)
    {
        let path = entry.path();
        let is_meta = entry.file_type().is_file()
            && path.file_name().and_then(|n| n.to_str()).is_some_and(|n| META_FILE_NAMES.contains(&n));
        if !is_meta {
            continue;
        }
        let Some(component) = path.parent().and_then(Path::file_name).and_then(|n| n.to_str()) else {
            continue;
        };
        if metas.contains_key(component) {
            debug!("Ignoring {} for {}: already loaded", path.display(), component);
            continue;
        }

        match read_structured_file(path) {
            Ok(meta) => {
                metas.insert(component.to_string(), meta);
            }
            Err(e) => warn!("Skipping component {}: {:#}", component, e),
        }
    }

    debug!("Loaded metadata for {} components from {}", metas.len(), dir.display());
    Ok(metas)
}
