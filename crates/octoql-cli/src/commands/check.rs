use anyhow::Result;
use colored::Colorize;

use crate::model::ModelFile;
use crate::output::{print_success, render_table};

/// Type name, collection name, field count and node flag of every
/// collection type, in declaration order.
pub fn summarize(model: ModelFile) -> Result<Vec<[String; 4]>> {
    let names: Vec<String> = model.model.collections.iter().map(|c| c.name.clone()).collect();
    let synthesizer = model.into_synthesizer()?;

    let mut rows = Vec::with_capacity(names.len());
    for name in &names {
        let ty = synthesizer.collection_type(name)?;
        let fields = ty.fields(synthesizer.context())?;
        rows.push([
            ty.name().to_string(),
            name.clone(),
            fields.len().to_string(),
            if ty.is_node() { "yes" } else { "no" }.to_string(),
        ]);
    }
    synthesizer.finish()?;
    Ok(rows)
}

pub fn check(model: ModelFile) -> Result<()> {
    let rows = summarize(model)?;
    println!("{}", render_table(["Type", "Collection", "Fields", "Node"], &rows));
    println!("{}: {}", "Collection types".cyan(), rows.len());
    print_success("Schema is valid");
    Ok(())
}
