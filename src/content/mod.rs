//! Site content document model.
//!
//! The site content document is produced by the content collection step and
//! consumed by the prerender pipeline:
//!
//! ```json
//! {
//!   "config": { "fetch": "/data/nav.json" },
//!   "pages": [
//!     {
//!       "route": "/blog",
//!       "fetch": { "collection": "articles", "sort": "date desc" },
//!       "sections": [
//!         { "parsedContent": { "title": "Latest" }, "params": { "limit": 3 } }
//!       ]
//!     },
//!     {
//!       "route": "/blog/:slug",
//!       "isDynamic": true,
//!       "paramName": "slug",
//!       "parentSchema": "articles",
//!       "sections": []
//!     }
//!   ]
//! }
//! ```
//!
//! Field names are camelCase on the wire. Every type keeps unknown fields in a
//! flattened `extra` map, so a load/save round trip does not lose data owned by
//! other build steps.

pub mod merge;

pub use merge::{attach_cascaded_data, merge_cascade, merge_data_into_content};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::core::SiteError;
use crate::utils::fs::write_json_file;

/// Schema name → data, inherited from ancestor scopes.
///
/// Shared between sibling sections. Never mutated in place; a scope that adds
/// keys builds a new map.
pub type Cascade = Arc<Map<String, Value>>;

/// The whole site: global config plus the page list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteContent {
    #[serde(default)]
    pub config: SiteConfig,

    #[serde(default)]
    pub pages: Vec<Page>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Site-wide settings. Only the site-level fetch is interpreted here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One page, possibly a dynamic route template such as `/blog/:slug`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub route: String,

    #[serde(default)]
    pub is_dynamic: bool,

    /// Route parameter name for dynamic pages (`slug` in `/blog/:slug`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param_name: Option<String>,

    /// Schema of the parent route's collection that drives expansion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_schema: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Raw page-level fetch declaration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch: Option<Value>,

    #[serde(default)]
    pub sections: Vec<Section>,

    /// Set on pages produced by dynamic route expansion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic_context: Option<DynamicContext>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Page {
    /// Whether this page is a route template that expansion must replace.
    pub fn is_template(&self) -> bool {
        self.is_dynamic && self.param_name.is_some() && self.parent_schema.is_some()
    }
}

/// A content section. Sections nest through `subsections`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    /// Structured document; fetched section data lands under `data.<schema>`
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub parsed_content: Value,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub params: Map<String, Value>,

    /// Raw section-level fetch declaration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch: Option<Value>,

    #[serde(default, skip_serializing_if = "cascade_is_empty")]
    pub cascaded_data: Cascade,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subsections: Vec<Section>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn cascade_is_empty(cascade: &Cascade) -> bool {
    cascade.is_empty()
}

/// Context attached to a page generated from a dynamic route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicContext {
    pub param_name: String,
    pub param_value: String,
    /// Plural schema of the collection (`articles`)
    pub schema: String,
    /// Singular key the current item is cascaded under (`article`)
    pub singular_schema: String,
    pub current_item: Value,
    pub all_items: Value,
}

/// Data fetched at page scope, recorded per route for dynamic-route lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageFetchRecord {
    pub schema: String,
    pub data: Value,
}

/// Route → page-level fetch record.
pub type PageFetchMap = HashMap<String, PageFetchRecord>;

impl SiteContent {
    /// Load a site content document from a JSON file.
    ///
    /// # Errors
    ///
    /// [`SiteError::ContentNotFound`] if the file does not exist,
    /// [`SiteError::ContentParseError`] if it is not a valid document.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SiteError::ContentNotFound {
                    path: path.display().to_string(),
                }
            } else {
                SiteError::IoError(e)
            }
        })?;

        let content = serde_json::from_str(&text).map_err(|e| SiteError::ContentParseError {
            file: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(content)
    }

    /// Write the document as pretty-printed JSON.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        write_json_file(path, self, true)
    }

    /// Pages that are route templates.
    pub fn dynamic_pages(&self) -> impl Iterator<Item = &Page> {
        self.pages.iter().filter(|page| page.is_template())
    }
}
