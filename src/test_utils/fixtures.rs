//! Temporary site directories for tests.

use anyhow::{Context, Result};
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::constants::{DEFAULT_PUBLIC_DIR, EXPANDED_CONTENT_FILE};

/// A site root in a temporary directory, removed on drop.
///
/// Layout written by the helpers:
///
/// ```text
/// <root>/
/// ├── site-content.json      content()
/// ├── public/data/<name>     data_file()
/// └── components/<C>/<meta>  component_meta()
/// ```
#[derive(Debug)]
pub struct SiteFixture {
    temp: TempDir,
}

impl SiteFixture {
    /// Create an empty site root.
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp: TempDir::new().context("Failed to create temp site root")?,
        })
    }

    /// Site root directory.
    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    /// Write `body` to a path relative to the site root.
    pub fn write(&self, relative: &str, body: &str) -> Result<PathBuf> {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, body).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Write a data file under `public/data/`.
    pub fn data_file(&self, name: &str, body: &str) -> Result<PathBuf> {
        self.write(&format!("{DEFAULT_PUBLIC_DIR}/data/{name}"), body)
    }

    /// Write the site content document.
    pub fn content(&self, content: &Value) -> Result<PathBuf> {
        self.write(EXPANDED_CONTENT_FILE, &serde_json::to_string_pretty(content)?)
    }

    /// Write `components/<component>/<file_name>`.
    pub fn component_meta(&self, component: &str, file_name: &str, body: &str) -> Result<PathBuf> {
        self.write(&format!("components/{component}/{file_name}"), body)
    }

    /// A blog: an index page fetching `articles` and a `/blog/:slug` template.
    pub fn blog_content() -> Value {
        json!({
            "config": {"fetch": "/data/nav.json"},
            "pages": [
                {
                    "route": "/",
                    "title": "Home",
                    "sections": [{"parsedContent": {"title": "Welcome"}}]
                },
                {
                    "route": "/blog",
                    "title": "Blog",
                    "fetch": {"collection": "articles", "sort": "date desc"},
                    "sections": [{"parsedContent": {"title": "Latest posts"}}]
                },
                {
                    "route": "/blog/:slug",
                    "isDynamic": true,
                    "paramName": "slug",
                    "parentSchema": "articles",
                    "title": "Article",
                    "sections": [{"parsedContent": {"title": "Post"}, "subsections": [{"parsedContent": {}}]}]
                }
            ]
        })
    }

    /// Articles matching [`SiteFixture::blog_content`].
    pub fn blog_articles() -> Value {
        json!([
            {"slug": "first-post", "title": "First", "date": "2024-01-10", "excerpt": "The first one"},
            {"slug": "second-post", "title": "Second", "date": "2024-03-02", "description": "The second one"}
        ])
    }

    /// Write [`SiteFixture::blog_content`] together with its data files.
    pub fn with_blog() -> Result<Self> {
        let site = Self::new()?;
        site.content(&Self::blog_content())?;
        site.data_file("nav.json", r#"["home", "blog"]"#)?;
        site.data_file("articles.json", &Self::blog_articles().to_string())?;
        Ok(site)
    }
}
