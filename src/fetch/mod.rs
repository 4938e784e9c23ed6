//! Build-time data fetching.
//!
//! A fetch goes through three stages:
//!
//! 1. [`descriptor`] normalizes the author's declaration into a [`FetchDescriptor`]
//! 2. [`executor`] reads the source (local file or remote URL)
//! 3. [`query`] applies `transform`, then `filter`, `sort` and `limit`
//!
//! None of these stages fail a build. Bad declarations parse to `None`,
//! unreadable sources produce an empty result carrying an error message, and
//! malformed query expressions are logged and ignored.

pub mod descriptor;
pub mod executor;
pub mod query;

pub use descriptor::{FetchDescriptor, infer_schema};
pub use executor::{ExecutorOptions, FetchExecutor, FetchResult};
pub use query::{apply_filter, apply_limit, apply_post_processing, apply_sort, apply_transform, get_nested};
