//! sitekit - build-time data tooling for static sites
//!
//! sitekit sits between content collection and HTML rendering in a static site
//! build. It resolves the data a site declares, expands data-driven routes into
//! concrete pages, and reduces component metadata to what the runtime needs.
//!
//! # Pipeline
//!
//! ```text
//! site-content.json
//!   → fetch      parse declarations, read local/remote sources, filter/sort/limit
//!   → content    merge data into sections, cascade site/page data downwards
//!   → prerender  expand /blog/:slug into one page per fetched item
//!   → renderer   (external) HTML per page
//! ```
//!
//! # Core Modules
//!
//! - [`fetch`] - Fetch declarations, source execution, query expressions
//! - [`content`] - Site content model and the merge engine
//! - [`prerender`] - Scope orchestration, dynamic route expansion, page output
//! - [`schema`] - Runtime schema extraction from component metadata
//!
//! ## Supporting Modules
//!
//! - [`cli`] - Command-line interface
//! - [`config`] - `sitekit.toml` build configuration
//! - [`core`] - Error types and user-facing error reporting
//! - [`constants`] - Shared defaults
//! - [`utils`] - File format detection and atomic writes
//!
//! # Fetch Declarations
//!
//! ```json
//! { "fetch": "/data/team.json" }
//! { "fetch": { "url": "https://api.example.com/posts", "transform": "data.items", "prerender": true } }
//! { "fetch": { "collection": "articles", "filter": "featured == true", "sort": "date desc", "limit": 3 } }
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use sitekit_cli::config::BuildConfig;
//! use sitekit_cli::content::SiteContent;
//! use sitekit_cli::prerender::Prerenderer;
//! use std::path::Path;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let site_root = Path::new("my-site");
//! let config = BuildConfig::load_with_optional(None, site_root)?;
//! let content = SiteContent::load(&site_root.join("site-content.json"))?;
//!
//! let output = Prerenderer::from_config(&config)?.run(content).await?;
//! for warning in &output.warnings {
//!     eprintln!("warning: {warning}");
//! }
//! output.content.save(&config.output_dir.join("site-content.json"))?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod content;
pub mod core;
pub mod fetch;
pub mod prerender;
pub mod schema;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
