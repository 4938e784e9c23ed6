//! Dynamic route expansion.
//!
//! A dynamic page is a route template such as `/blog/:slug` carrying a
//! `paramName` and `parentSchema`. Expansion replaces it with one concrete page
//! per item of the collection fetched by the parent route (`/blog`):
//!
//! ```text
//! /blog          fetch → articles: [{slug: post-1}, {slug: post-2}]
//! /blog/:slug    ──────→ /blog/post-1, /blog/post-2
//! ```
//!
//! Every concrete page is an independent deep copy of the template. Its
//! sections receive the current item under the singular schema name and the
//! whole collection under the plural one.

use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::content::{Cascade, DynamicContext, Page, PageFetchMap, attach_cascaded_data};

/// Replace every dynamic page with its concrete pages.
///
/// Static pages are passed through in place. Concrete pages appear in the
/// order of their source items, at the position of their template.
pub fn expand_dynamic_pages(pages: &[Page], page_fetches: &PageFetchMap) -> Vec<Page> {
    let mut warnings = Vec::new();
    expand_dynamic_pages_reporting(pages, page_fetches, &mut warnings)
}

/// [`expand_dynamic_pages`], collecting a message for every skipped page or item.
pub fn expand_dynamic_pages_reporting(
    pages: &[Page],
    page_fetches: &PageFetchMap,
    warnings: &mut Vec<String>,
) -> Vec<Page> {
    let mut expanded = Vec::with_capacity(pages.len());

    for page in pages {
        if !page.is_dynamic {
            expanded.push(page.clone());
            continue;
        }

        let (Some(param_name), Some(parent_schema)) = (&page.param_name, &page.parent_schema) else {
            let message = format!("Dynamic page {} has no paramName/parentSchema; left unexpanded", page.route);
            warn!("{}", message);
            warnings.push(message);
            expanded.push(page.clone());
            continue;
        };

        let parent = parent_route(&page.route, param_name);
        let Some(record) = page_fetches.get(&parent) else {
            let message = format!("Skipping dynamic page {}: parent route {} fetched no data", page.route, parent);
            warn!("{}", message);
            warnings.push(message);
            continue;
        };
        let Some(items) = record.data.as_array() else {
            let message = format!("Skipping dynamic page {}: data of {} is not a list", page.route, parent);
            warn!("{}", message);
            warnings.push(message);
            continue;
        };

        if &record.schema != parent_schema {
            debug!(
                "Dynamic page {} expects schema '{}' but {} fetched '{}'",
                page.route, parent_schema, parent, record.schema
            );
        }

        let singular = singularize(parent_schema);
        let all_items = Value::Array(items.clone());
        let before = expanded.len();

        for (index, item) in items.iter().enumerate() {
            let Some(param_value) = param_value(item, param_name) else {
                let message =
                    format!("Skipping item {} of {} for {}: no usable '{}'", index, parent, page.route, param_name);
                warn!("{}", message);
                warnings.push(message);
                continue;
            };

            let context = DynamicContext {
                param_name: param_name.clone(),
                param_value,
                schema: parent_schema.clone(),
                singular_schema: singular.clone(),
                current_item: item.clone(),
                all_items: all_items.clone(),
            };
            expanded.push(concrete_page(page, context));
        }

        debug!("Expanded {} into {} pages", page.route, expanded.len() - before);
    }

    expanded
}

fn concrete_page(template: &Page, context: DynamicContext) -> Page {
    let mut page = template.clone();
    page.route = substitute_param(&template.route, &context.param_name, &context.param_value);
    page.is_dynamic = false;
    page.param_name = None;
    page.parent_schema = None;

    let mut injected = Map::new();
    injected.insert(context.singular_schema.clone(), context.current_item.clone());
    injected.insert(context.schema.clone(), context.all_items.clone());
    let injected: Cascade = Arc::new(injected);
    page.sections = attach_cascaded_data(&template.sections, &injected);

    if let Some(title) = non_empty_str(&context.current_item, "title") {
        page.title = Some(title);
    }
    if let Some(description) = non_empty_str(&context.current_item, "description")
        .or_else(|| non_empty_str(&context.current_item, "excerpt"))
    {
        page.description = Some(description);
    }

    page.dynamic_context = Some(context);
    page
}

/// Route of the page whose fetch feeds a dynamic route.
///
/// ```rust
/// use sitekit_cli::prerender::parent_route;
///
/// assert_eq!(parent_route("/blog/:slug", "slug"), "/blog");
/// assert_eq!(parent_route("/:slug", "slug"), "/");
/// ```
pub fn parent_route(route: &str, param_name: &str) -> String {
    let param_segment = format!(":{param_name}");
    let segments: Vec<&str> = route.split('/').filter(|s| !s.is_empty()).collect();
    let end = segments.iter().position(|s| *s == param_segment).unwrap_or(segments.len());

    if end == 0 {
        "/".to_string()
    } else {
        format!("/{}", segments[..end].join("/"))
    }
}

/// Singular form of a schema name: one trailing `s` removed.
///
/// Irregular plurals are not handled (`people` → `peopl`).
pub fn singularize(schema: &str) -> String {
    schema.strip_suffix('s').unwrap_or(schema).to_string()
}

fn substitute_param(route: &str, param_name: &str, value: &str) -> String {
    let param_segment = format!(":{param_name}");
    route
        .split('/')
        .map(|segment| if segment == param_segment { value } else { segment })
        .collect::<Vec<_>>()
        .join("/")
}

/// Route segment for an item, `None` when the key is missing or falsy.
fn param_value(item: &Value, param_name: &str) -> Option<String> {
    match item.get(param_name)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64().is_some_and(|f| f != 0.0) => Some(
            n.as_i64()
                .map(|i| i.to_string())
                .or_else(|| n.as_u64().map(|u| u.to_string()))
                .unwrap_or_else(|| n.to_string()),
        ),
        _ => None,
    }
}

fn non_empty_str(item: &Value, key: &str) -> Option<String> {
    item.get(key).and_then(Value::as_str).filter(|s| !s.is_empty()).map(str::to_string)
}
