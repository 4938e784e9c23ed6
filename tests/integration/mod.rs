//! Integration test suite for sitekit
//!
//! End-to-end tests over temporary site directories: the library pipeline
//! against local and remote sources, and the `sitekit` binary.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **pipeline**: fetch → merge → expand through the library API
//! - **cli**: `sitekit prerender` and `sitekit schema` via `assert_cmd`

mod cli;
mod pipeline;
