use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "alpha-mcp-import")]
#[command(about = "Import an alpha MCP mapping directory and inspect the result")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// MCP directory containing conf/ and jars/
    #[arg(long, value_name = "DIR", global = true)]
    pub root: Option<PathBuf>,

    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Json, global = true)]
    pub format: OutputFormat,

    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Count what the import produced
    Summary,
    /// Show the mapping of a single entry
    Lookup {
        #[command(subcommand)]
        entry: LookupEntry,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum LookupEntry {
    Class {
        name: String,
    },
    Field {
        owner: String,
        name: String,
        descriptor: String,
    },
    Method {
        owner: String,
        name: String,
        descriptor: String,
    },
}

#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}
