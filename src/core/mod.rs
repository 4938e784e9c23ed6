//! Core types for sitekit
//!
//! This module holds the error handling shared by every other module:
//! - [`SiteError`] - Enumerated error types for the failures callers tell apart
//! - [`ErrorContext`] - User-friendly error wrapper with suggestions and details
//! - [`user_friendly_error`] - Convert any error to user-friendly format

pub mod error;

pub use error::{ErrorContext, SiteError, user_friendly_error};
