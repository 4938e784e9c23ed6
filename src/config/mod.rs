//! Configuration management for sitekit
//!
//! A site's build settings live in `sitekit.toml` at the site root. Every key
//! is optional; see [`BuildConfig`] for the file format and lookup order.
//!
//! # Modules
//!
//! - `build` - [`BuildConfig`] and [`FetchSettings`]
//! - `parser` - Generic TOML parsing utilities with error context

mod build;
mod parser;

pub use build::{BuildConfig, FetchSettings};
pub use parser::parse_config;
