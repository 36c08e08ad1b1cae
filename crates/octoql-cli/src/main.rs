mod cli;
mod commands;
mod logging;
mod model;
mod output;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};
use output::print_error;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level);

    let model = model::ModelFile::load(&cli.model)?;

    match &cli.command {
        Commands::Sdl(args) => {
            commands::sdl::sdl(model, args.output.as_deref())?;
        }
        Commands::Check => {
            commands::check::check(model)?;
        }
        Commands::Query(args) => {
            commands::query::query(model, &args.query, args.variables.as_deref()).await?;
        }
    }

    Ok(())
}
