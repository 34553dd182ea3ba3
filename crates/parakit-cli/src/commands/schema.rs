//! Schema dump command.

use std::path::Path;

use anyhow::Result;
use parakit_core::GameSchema;

/// Print the active schema as TOML, or write it to `output`.
///
/// The output is a valid override file for `[target] schema`.
pub fn dump(schema: &GameSchema, output: Option<&Path>) -> Result<()> {
    let text = schema.to_toml_string()?;
    match output {
        Some(path) => {
            std::fs::write(path, text)?;
            println!("Schema for {} saved to: {}", schema.title, path.display());
        }
        None => print!("{}", text),
    }
    Ok(())
}
