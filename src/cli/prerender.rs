//! `sitekit prerender`: fetch, merge and expand site content.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::BuildConfig;
use crate::constants::EXPANDED_CONTENT_FILE;
use crate::content::SiteContent;
use crate::prerender::Prerenderer;

/// Resolve every build-time fetch and expand dynamic routes.
///
/// Reads the site content document, runs site, page and section fetches,
/// expands dynamic pages from their parent collections, and writes the result.
/// Data problems are reported as warnings and never fail the command.
#[derive(Args, Debug)]
pub struct PrerenderCommand {
    /// Site content document (JSON)
    #[arg(long, short = 'c', value_name = "FILE")]
    pub content: PathBuf,

    /// Root for data paths [default: directory of --content]
    #[arg(long, value_name = "DIR")]
    pub site_root: Option<PathBuf>,

    /// Expanded content destination [default: <output_dir>/site-content.json]
    #[arg(long, short, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl PrerenderCommand {
    /// Run with an optional explicit configuration file.
    pub async fn execute_with_config_path(self, config_path: Option<PathBuf>) -> Result<()> {
        let site_root = self.site_root.clone().unwrap_or_else(|| default_site_root(&self.content));
        let config = BuildConfig::load_with_optional(config_path, &site_root)?;
        debug!("Build config: {:?}", config);

        let content = SiteContent::load(&self.content)?;
        let templates = content.dynamic_pages().count();
        let prerenderer = Prerenderer::from_config(&config)?;
        let output = prerenderer.run(content).await?;

        let out_path = self.output.unwrap_or_else(|| config.output_dir.join(EXPANDED_CONTENT_FILE));
        output
            .content
            .save(&out_path)
            .with_context(|| format!("Failed to write expanded content to {}", out_path.display()))?;

        let generated = output.content.pages.iter().filter(|p| p.dynamic_context.is_some()).count();
        println!(
            "{}",
            format!(
                "Prerendered {} pages ({} generated from {} dynamic routes) → {}",
                output.content.pages.len(),
                generated,
                templates,
                out_path.display()
            )
            .green()
        );
        if !output.warnings.is_empty() {
            println!("\n{}", format!("Warnings ({}):", output.warnings.len()).yellow());
            for warning in &output.warnings {
                println!("  - {warning}");
            }
        }

        Ok(())
    }
}

fn default_site_root(content: &Path) -> PathBuf {
    match content.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
