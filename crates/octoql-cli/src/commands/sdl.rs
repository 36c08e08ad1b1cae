use std::path::Path;

use anyhow::{Context, Result};

use crate::model::ModelFile;
use crate::output::print_success;

pub fn render(model: ModelFile) -> Result<String> {
    let schema = model.into_synthesizer()?.finish()?;
    Ok(schema.sdl())
}

pub fn sdl(model: ModelFile, output: Option<&Path>) -> Result<()> {
    let sdl = render(model)?;
    match output {
        Some(path) => {
            std::fs::write(path, &sdl)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            print_success(&format!("Schema written to {}", path.display()));
        }
        None => print!("{sdl}"),
    }
    Ok(())
}
