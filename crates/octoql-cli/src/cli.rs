use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "octoql")]
#[command(about = "octoql - synthesize GraphQL schemas from collection models")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Model definition file (TOML)
    #[arg(short, long, global = true, env = "OCTOQL_MODEL", default_value = "octoql.toml")]
    pub model: PathBuf,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, env = "OCTOQL_LOG_LEVEL", default_value = "warn")]
    pub log_level: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the synthesized schema in SDL
    Sdl(SdlArgs),
    /// Build the schema and list every collection type
    Check,
    /// Execute a query against the seeded rows
    Query(QueryArgs),
}

#[derive(clap::Args)]
pub struct SdlArgs {
    /// Write the SDL to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args)]
pub struct QueryArgs {
    /// GraphQL query text
    #[arg(short, long)]
    pub query: String,

    /// Query variables as a JSON object
    #[arg(long)]
    pub variables: Option<String>,
}
