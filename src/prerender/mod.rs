//! Prerendering: fetch, merge, expand, render.
//!
//! [`Prerenderer::run`] takes a loaded [`SiteContent`](crate::content::SiteContent)
//! and returns it with every build-time fetch resolved and every dynamic route
//! expanded. [`render_pages`] then hands the result to a [`PageRenderer`].

pub mod expand;
pub mod pipeline;
pub mod render;

pub use expand::{expand_dynamic_pages, expand_dynamic_pages_reporting, parent_route, singularize};
pub use pipeline::{PrerenderOutput, Prerenderer};
pub use render::{PageRenderer, page_output_path, render_pages};
