//! Error handling for sitekit
//!
//! This module provides the error types and user-facing error reporting for the
//! sitekit build tooling. It follows two rules:
//! 1. **Strongly-typed errors** for the failures that callers need to tell apart
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Error Categories
//!
//! - **Content**: [`SiteError::ContentNotFound`], [`SiteError::ContentParseError`]
//! - **Configuration**: [`SiteError::ConfigError`], [`SiteError::InvalidFetchConfig`]
//! - **Data sources**: [`SiteError::SourceUnavailable`]
//! - **Output**: [`SiteError::RenderError`]
//!
//! Most data-source problems never surface as errors at all. A missing file or
//! an unreachable URL becomes an empty [`FetchResult`](crate::fetch::FetchResult)
//! carrying a message, a dynamic page without parent data is skipped, and a
//! malformed query expression is a no-op. Those paths log a warning and the
//! build keeps going. The variants below cover what is left: content that
//! cannot be read at all, broken configuration, and programmer errors.
//!
//! # Examples
//!
//! ```rust,no_run
//! use sitekit_cli::core::{SiteError, ErrorContext, user_friendly_error};
//!
//! let error = SiteError::ContentNotFound {
//!     path: "site-content.json".to_string(),
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display(); // Shows colored error with suggestions
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for sitekit operations
#[derive(Error, Debug)]
pub enum SiteError {
    /// The site content document does not exist
    #[error("Site content not found: {path}")]
    ContentNotFound {
        /// Path that was looked up
        path: String,
    },

    /// The site content document exists but is not valid
    #[error("Failed to parse site content {file}: {reason}")]
    ContentParseError {
        /// File that failed to parse
        file: String,
        /// Parser message
        reason: String,
    },

    /// Build configuration is unusable
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the problem
        message: String,
    },

    /// A fetch declaration could not be turned into a descriptor
    ///
    /// Reported as a warning by the prerender pipeline; the scope carrying the
    /// declaration simply gets no data.
    #[error("Invalid fetch configuration at {scope}: {reason}")]
    InvalidFetchConfig {
        /// Where the declaration lives (`site`, a page route, or a section path)
        scope: String,
        /// Why it was rejected
        reason: String,
    },

    /// A local data file or remote endpoint could not be read
    #[error("Data source unavailable: {source_name}: {reason}")]
    SourceUnavailable {
        /// Path or URL of the source
        source_name: String,
        /// Underlying cause
        reason: String,
    },

    /// A page renderer failed for one route
    #[error("Failed to render {route}: {reason}")]
    RenderError {
        /// Route of the page
        route: String,
        /// Renderer message
        reason: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

impl Clone for SiteError {
    fn clone(&self) -> Self {
        match self {
            Self::ContentNotFound {
                path,
            } => Self::ContentNotFound {
                path: path.clone(),
            },
            Self::ContentParseError {
                file,
                reason,
            } => Self::ContentParseError {
                file: file.clone(),
                reason: reason.clone(),
            },
            Self::ConfigError {
                message,
            } => Self::ConfigError {
                message: message.clone(),
            },
            Self::InvalidFetchConfig {
                scope,
                reason,
            } => Self::InvalidFetchConfig {
                scope: scope.clone(),
                reason: reason.clone(),
            },
            Self::SourceUnavailable {
                source_name,
                reason,
            } => Self::SourceUnavailable {
                source_name: source_name.clone(),
                reason: reason.clone(),
            },
            Self::RenderError {
                route,
                reason,
            } => Self::RenderError {
                route: route.clone(),
                reason: reason.clone(),
            },
            // io::Error is not Clone
            Self::IoError(e) => Self::Other {
                message: format!("IO error: {e}"),
            },
            Self::Other {
                message,
            } => Self::Other {
                message: message.clone(),
            },
        }
    }
}

/// Error wrapper adding a suggestion and details for terminal display
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: SiteError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: SiteError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    ///
    /// Suggestions are displayed in green in the terminal.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details explaining the error.
    ///
    /// Details are displayed in yellow in the terminal.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`] with suggestions
///
/// Recognizes [`SiteError`] variants, IO errors, and JSON/TOML parse errors
/// anywhere in the `anyhow` chain; anything else is reported with its full
/// cause chain.
///
/// # Examples
///
/// ```rust,no_run
/// use sitekit_cli::core::user_friendly_error;
///
/// let error = anyhow::anyhow!("Something went wrong");
/// let context = user_friendly_error(error);
///
/// context.display();
/// ```
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    for cause in error.chain() {
        if let Some(site_error) = cause.downcast_ref::<SiteError>() {
            return create_error_context(site_error.clone());
        }
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(SiteError::Other {
                    message: error_with_chain(&error),
                })
                .with_suggestion("Check file ownership and permissions of the site directory")
                .with_details("sitekit needs to read site content and data files and write the output directory");
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(SiteError::Other {
                    message: error_with_chain(&error),
                })
                .with_suggestion("Check that the file or directory exists and the path is correct");
            }
            _ => {}
        }
    }

    if let Some(json_error) = error.downcast_ref::<serde_json::Error>() {
        return ErrorContext::new(SiteError::ContentParseError {
            file: "input".to_string(),
            reason: json_error.to_string(),
        })
        .with_suggestion("Validate the JSON document, e.g. with `jq . <file>`");
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(SiteError::ConfigError {
            message: toml_error.to_string(),
        })
        .with_suggestion("Check the TOML syntax in sitekit.toml");
    }

    ErrorContext::new(SiteError::Other {
        message: error_with_chain(&error),
    })
}

/// Render an error followed by its numbered cause chain.
fn error_with_chain(error: &anyhow::Error) -> String {
    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    message
}

/// Attach suggestions tailored to each [`SiteError`] variant.
fn create_error_context(error: SiteError) -> ErrorContext {
    match &error {
        SiteError::ContentNotFound {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Pass the site content document with --content, or run the content collector first")
            .with_details("The prerender pipeline reads the JSON document produced by the content collection step"),
        SiteError::ContentParseError {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Regenerate the site content document; it must be a JSON object with `config` and `pages`"),
        SiteError::ConfigError {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Check sitekit.toml or the file given with --config / SITEKIT_CONFIG"),
        SiteError::InvalidFetchConfig {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("A fetch declaration needs `path`, `url`, or `collection`"),
        SiteError::SourceUnavailable {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Check the data path or URL; set `prerender: false` to fetch it at runtime instead"),
        SiteError::RenderError {
            ..
        } => ErrorContext::new(error)
            .with_details("The page renderer failed; other pages were still written"),
        _ => ErrorContext::new(error),
    }
}
