//! Writing rendered pages to disk.
//!
//! HTML generation itself belongs to whatever template engine the site uses.
//! It plugs in through [`PageRenderer`]; this module only decides where each
//! page goes and keeps going when one page fails.

use anyhow::Result;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

use crate::content::{Page, SiteContent};
use crate::core::SiteError;
use crate::utils::fs::safe_write;

/// Turns one expanded page into HTML.
pub trait PageRenderer {
    /// Render `page`. `site` gives access to global config and the other pages.
    fn render(&self, page: &Page, site: &SiteContent) -> Result<String>;
}

impl<F> PageRenderer for F
where
    F: Fn(&Page, &SiteContent) -> Result<String>,
{
    fn render(&self, page: &Page, site: &SiteContent) -> Result<String> {
        self(page, site)
    }
}

/// Render every concrete page of `site` into `out_dir`.
///
/// A page at `/blog/post-1` is written to `out_dir/blog/post-1/index.html`,
/// and `/` to `out_dir/index.html`. Pages still marked dynamic are skipped. A
/// page whose renderer fails is logged and skipped.
///
/// # Errors
/// Returns an error only if a rendered page cannot be written.
pub fn render_pages(site: &SiteContent, renderer: &dyn PageRenderer, out_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    let mut failed = 0usize;

    for page in &site.pages {
        if page.is_dynamic {
            debug!("Not rendering unexpanded template {}", page.route);
            continue;
        }

        let html = match renderer.render(page, site) {
            Ok(html) => html,
            Err(e) => {
                let error = SiteError::RenderError {
                    route: page.route.clone(),
                    reason: format!("{e:#}"),
                };
                warn!("{}", error);
                failed += 1;
                continue;
            }
        };

        let path = page_output_path(out_dir, &page.route);
        safe_write(&path, &html)?;
        debug!("Wrote {}", path.display());
        written.push(path);
    }

    info!("Rendered {} pages ({} failed)", written.len(), failed);
    Ok(written)
}

/// Output file for a route. Empty, `.` and `..` segments are dropped.
pub fn page_output_path(out_dir: &Path, route: &str) -> PathBuf {
    let mut path = out_dir.to_path_buf();
    for segment in route.split('/') {
        let mut components = Path::new(segment).components();
        if let (Some(Component::Normal(name)), None) = (components.next(), components.next()) {
            path.push(name);
        }
    }
    path.join("index.html")
}
