//! Fetch declaration parsing.
//!
//! Content authors declare data sources in several shapes. All of them are
//! normalized into one [`FetchDescriptor`]:
//!
//! ```yaml
//! # String shorthand: a path, schema inferred from the file name
//! fetch: /data/team.json
//!
//! # Path or URL object
//! fetch:
//!   url: https://api.example.com/v1/posts?page=1
//!   schema: posts
//!   transform: data.items
//!   prerender: true
//!
//! # Named collection
//! fetch:
//!   collection: articles
//!   sort: date desc
//!   limit: 3
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::constants::COLLECTION_DATA_DIR;

/// Canonical description of one data source.
///
/// Exactly one of `path` / `url` is set. Values are only produced by
/// [`FetchDescriptor::parse`], which upholds that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchDescriptor {
    /// Local data file, relative to the site root or (with a leading `/`) the public dir
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Remote endpoint returning JSON
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Key the data is stored under in content and cascades
    pub schema: String,

    /// Resolve at build time (`false` leaves the fetch to the runtime)
    pub prerender: bool,

    /// Merge into existing content data instead of replacing it
    pub merge: bool,

    /// Dotted path extracted from the raw payload before querying
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<String>,

    /// Keep only the first N items
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,

    /// Sort expression, e.g. `date desc, title`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,

    /// Filter expression, e.g. `status == published`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

impl FetchDescriptor {
    /// Normalize a fetch declaration.
    ///
    /// Returns `None` for `null`, empty strings, non-string scalars, arrays,
    /// and objects that declare none of `path`, `url`, or `collection`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_json::json;
    /// use sitekit_cli::fetch::FetchDescriptor;
    ///
    /// let desc = FetchDescriptor::parse(&json!({"collection": "articles", "limit": 3})).unwrap();
    /// assert_eq!(desc.path.as_deref(), Some("/data/articles.json"));
    /// assert_eq!(desc.schema, "articles");
    /// assert_eq!(desc.limit, Some(3));
    /// ```
    pub fn parse(input: &Value) -> Option<Self> {
        match input {
            Value::String(s) => Self::parse_str(s),
            Value::Object(obj) => Self::parse_object(obj),
            _ => None,
        }
    }

    /// Parse the string shorthand: the string is a path.
    pub fn parse_str(path: &str) -> Option<Self> {
        let path = path.trim();
        if path.is_empty() {
            return None;
        }
        let schema = infer_schema(path)?;
        Some(Self {
            path: Some(path.to_string()),
            url: None,
            schema,
            prerender: true,
            merge: false,
            transform: None,
            limit: None,
            sort: None,
            filter: None,
        })
    }

    fn parse_object(obj: &Map<String, Value>) -> Option<Self> {
        let explicit_schema = non_empty_str(obj, "schema");

        let (path, url, inferred) = if let Some(collection) = non_empty_str(obj, "collection") {
            (Some(format!("{COLLECTION_DATA_DIR}/{collection}.json")), None, Some(collection))
        } else {
            let path = non_empty_str(obj, "path");
            let url = non_empty_str(obj, "url");
            match (path, url) {
                (Some(path), url) => {
                    if url.is_some() {
                        debug!("Fetch declares both path and url; using path {}", path);
                    }
                    let inferred = infer_schema(&path);
                    (Some(path), None, inferred)
                }
                (None, Some(url)) => {
                    let inferred = infer_schema(&url);
                    (None, Some(url), inferred)
                }
                (None, None) => return None,
            }
        };

        let schema = explicit_schema.or(inferred)?;
        let prerender = obj.get("prerender").and_then(Value::as_bool).unwrap_or(path.is_some());
        let merge = obj.get("merge").and_then(Value::as_bool).unwrap_or(false);

        Some(Self {
            path,
            url,
            schema,
            prerender,
            merge,
            transform: non_empty_str(obj, "transform"),
            limit: obj.get("limit").and_then(parse_limit),
            sort: non_empty_str(obj, "sort"),
            filter: non_empty_str(obj, "filter"),
        })
    }

    /// The path or URL this descriptor reads from.
    pub fn source(&self) -> &str {
        self.path.as_deref().or(self.url.as_deref()).unwrap_or_default()
    }

    /// Whether the source is a remote URL.
    pub const fn is_remote(&self) -> bool {
        self.path.is_none() && self.url.is_some()
    }
}

/// Infer a schema name from the last path or URL segment, extension stripped.
///
/// Query strings and fragments are ignored, so
/// `https://api.example.com/v1/posts.json?page=2` yields `posts`.
///
/// ```rust
/// use sitekit_cli::fetch::infer_schema;
///
/// assert_eq!(infer_schema("/data/team-members.json").as_deref(), Some("team-members"));
/// assert_eq!(infer_schema("data/events").as_deref(), Some("events"));
/// ```
pub fn infer_schema(source: &str) -> Option<String> {
    let without_query = source.split(['?', '#']).next().unwrap_or_default();
    let segment = without_query.trim_end_matches('/').rsplit('/').next().unwrap_or_default();
    let stem = match segment.rfind('.') {
        Some(0) | None => segment,
        Some(idx) => &segment[..idx],
    };
    (!stem.is_empty()).then(|| stem.to_string())
}

fn non_empty_str(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

fn parse_limit(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
