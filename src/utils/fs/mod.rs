//! File system utilities for build input and output.
//!
//! - [`atomic`] - temp-and-rename writes for build output
//! - [`formats`] - JSON/YAML data file reading, JSON writing

pub mod atomic;
pub mod formats;

pub use atomic::{atomic_write, ensure_dir, safe_write};
pub use formats::{DataFormat, read_structured_file, read_structured_file_async, write_json_file};
