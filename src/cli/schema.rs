//! `sitekit schema`: build the runtime schema map.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use crate::schema::{build_schema_map, load_component_metas};
use crate::utils::fs::write_json_file;

/// Reduce every component's metadata to its runtime schema.
///
/// Scans `<components>/<Name>/meta.{json,yaml,yml}` and writes
/// `{"Name": RuntimeSchema, ...}`. Components without runtime metadata are
/// left out.
#[derive(Args, Debug)]
pub struct SchemaCommand {
    /// Directory containing one subdirectory per component
    #[arg(long, value_name = "DIR")]
    pub components: PathBuf,

    /// Write the map to a file instead of stdout
    #[arg(long, short, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl SchemaCommand {
    /// Run the command.
    pub fn execute(self) -> Result<()> {
        let metas = load_component_metas(&self.components)?;
        let total = metas.len();
        let schemas = build_schema_map(metas);

        match self.output {
            Some(path) => {
                write_json_file(&path, &schemas, true)?;
                println!(
                    "{}",
                    format!("Wrote runtime schemas for {} of {} components → {}", schemas.len(), total, path.display())
                        .green()
                );
            }
            None => println!("{}", serde_json::to_string_pretty(&schemas)?),
        }

        Ok(())
    }
}
