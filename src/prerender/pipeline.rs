//! Build-time fetch orchestration across site, page and section scopes.
//!
//! Execution order:
//!
//! 1. The site-level fetch runs first. Its result seeds the site cascade.
//! 2. Pages are processed concurrently. Each page starts from the site cascade,
//!    adds its own fetch result under its schema and records `{schema, data}`
//!    for its route.
//! 3. Within a page, sections are processed concurrently. A section fetch is
//!    merged into that section's `parsedContent` only. The page cascade is
//!    attached to the section, then its subsections are processed the same way.
//!
//! Nothing in here fails the build because of data. Invalid declarations and
//! unreadable sources are logged, recorded in [`PrerenderOutput::warnings`], and
//! the affected scope proceeds with empty data.

use anyhow::Result;
use futures::future::join_all;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::expand::expand_dynamic_pages_reporting;
use crate::config::BuildConfig;
use crate::content::{
    Cascade, Page, PageFetchMap, PageFetchRecord, Section, SiteContent, merge_cascade, merge_data_into_content,
};
use crate::core::SiteError;
use crate::fetch::{ExecutorOptions, FetchDescriptor, FetchExecutor};

/// Result of a prerender run.
#[derive(Debug, Clone)]
pub struct PrerenderOutput {
    /// Site content with fetched data merged in
    pub content: SiteContent,
    /// Page-level fetch results keyed by route
    pub page_fetches: PageFetchMap,
    /// Recoverable problems encountered along the way
    pub warnings: Vec<String>,
}

/// Outcome of resolving one scope's fetch declaration.
#[derive(Debug, Default)]
struct ScopeFetch {
    fetched: Option<(FetchDescriptor, Value)>,
    warning: Option<String>,
}

/// Runs fetches for a site content document.
#[derive(Debug, Clone)]
pub struct Prerenderer {
    executor: FetchExecutor,
}

impl Prerenderer {
    /// Create a prerenderer around an executor.
    pub const fn new(executor: FetchExecutor) -> Self {
        Self {
            executor,
        }
    }

    /// Create a prerenderer for a resolved build configuration.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &BuildConfig) -> Result<Self> {
        Ok(Self::new(FetchExecutor::new(ExecutorOptions::from_config(config))?))
    }

    /// Fetch and merge data at every scope, then expand dynamic pages.
    pub async fn run(&self, content: SiteContent) -> Result<PrerenderOutput> {
        let mut output = self.fetch_site_data(content).await?;

        let templates = std::mem::take(&mut output.content.pages);
        output.content.pages =
            expand_dynamic_pages_reporting(&templates, &output.page_fetches, &mut output.warnings);

        info!(
            "Prerender produced {} pages ({} warnings)",
            output.content.pages.len(),
            output.warnings.len()
        );
        Ok(output)
    }

    /// Fetch and merge data at site, page and section scope.
    ///
    /// Dynamic pages are left as templates; see [`Prerenderer::run`].
    pub async fn fetch_site_data(&self, content: SiteContent) -> Result<PrerenderOutput> {
        let SiteContent {
            config,
            pages,
            extra,
        } = content;
        let mut warnings = Vec::new();

        let site_fetch = self.resolve_scope("site", config.fetch.as_ref()).await;
        warnings.extend(site_fetch.warning);
        let mut site_cascade = Map::new();
        if let Some((descriptor, data)) = site_fetch.fetched {
            site_cascade.insert(descriptor.schema, data);
        }
        let site_cascade: Cascade = Arc::new(site_cascade);

        let processed = join_all(pages.into_iter().map(|page| self.process_page(page, &site_cascade))).await;

        let mut page_fetches = PageFetchMap::new();
        let mut out_pages = Vec::with_capacity(processed.len());
        for (page, record, page_warnings) in processed {
            warnings.extend(page_warnings);
            if let Some(record) = record {
                page_fetches.insert(page.route.clone(), record);
            }
            out_pages.push(page);
        }

        debug!("Fetched data for {} of {} pages", page_fetches.len(), out_pages.len());

        Ok(PrerenderOutput {
            content: SiteContent {
                config,
                pages: out_pages,
                extra,
            },
            page_fetches,
            warnings,
        })
    }

    async fn process_page(
        &self,
        mut page: Page,
        site_cascade: &Cascade,
    ) -> (Page, Option<PageFetchRecord>, Vec<String>) {
        let mut warnings = Vec::new();

        let page_fetch = self.resolve_scope(&page.route, page.fetch.as_ref()).await;
        warnings.extend(page_fetch.warning);

        let (cascade, record) = match page_fetch.fetched {
            Some((descriptor, data)) => {
                let mut own = Map::new();
                own.insert(descriptor.schema.clone(), data.clone());
                let cascade = merge_cascade(site_cascade, &Arc::new(own));
                let record = PageFetchRecord {
                    schema: descriptor.schema,
                    data,
                };
                (cascade, Some(record))
            }
            None => (Arc::clone(site_cascade), None),
        };

        let sections = std::mem::take(&mut page.sections);
        let route = page.route.clone();
        let results = join_all(sections.into_iter().enumerate().map(|(index, section)| {
            self.process_section(section, format!("{route} sections[{index}]"), &cascade)
        }))
        .await;

        for (section, section_warnings) in results {
            warnings.extend(section_warnings);
            page.sections.push(section);
        }

        (page, record, warnings)
    }

    async fn process_section(&self, mut section: Section, scope: String, cascade: &Cascade) -> (Section, Vec<String>) {
        let mut warnings = Vec::new();

        let section_fetch = self.resolve_scope(&scope, section.fetch.as_ref()).await;
        warnings.extend(section_fetch.warning);
        if let Some((descriptor, data)) = section_fetch.fetched {
            section.parsed_content =
                merge_data_into_content(&section.parsed_content, Some(&data), &descriptor.schema, descriptor.merge)
                    .into_owned();
        }

        section.cascaded_data = merge_cascade(&section.cascaded_data, cascade);

        let children = std::mem::take(&mut section.subsections);
        let results = join_all(children.into_iter().enumerate().map(|(index, child)| {
            Box::pin(self.process_section(child, format!("{scope}.subsections[{index}]"), cascade))
        }))
        .await;

        for (child, child_warnings) in results {
            warnings.extend(child_warnings);
            section.subsections.push(child);
        }

        (section, warnings)
    }

    /// Parse and, when it runs at build time, execute one fetch declaration.
    async fn resolve_scope(&self, scope: &str, declaration: Option<&Value>) -> ScopeFetch {
        let Some(declaration) = declaration.filter(|d| !is_absent(d)) else {
            return ScopeFetch::default();
        };

        let Some(descriptor) = FetchDescriptor::parse(declaration) else {
            let error = SiteError::InvalidFetchConfig {
                scope: scope.to_string(),
                reason: "expected a path string or an object with path, url or collection".to_string(),
            };
            warn!("{}", error);
            return ScopeFetch {
                fetched: None,
                warning: Some(error.to_string()),
            };
        };

        if !descriptor.prerender {
            debug!("Leaving {} ({}) to runtime fetching", descriptor.source(), scope);
            return ScopeFetch::default();
        }

        let result = self.executor.execute(Some(&descriptor)).await;
        let warning = result.error.map(|reason| {
            SiteError::SourceUnavailable {
                source_name: descriptor.source().to_string(),
                reason,
            }
            .to_string()
        });
        let data = result.data.unwrap_or_else(|| Value::Array(Vec::new()));

        ScopeFetch {
            fetched: Some((descriptor, data)),
            warning,
        }
    }
}

fn is_absent(declaration: &Value) -> bool {
    match declaration {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}
