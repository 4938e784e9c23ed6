//! Shared utilities for sitekit.
//!
//! - [`fs`] - atomic writes and structured (JSON/YAML) file handling

pub mod fs;

pub use fs::{DataFormat, atomic_write, ensure_dir, read_structured_file, safe_write, write_json_file};
