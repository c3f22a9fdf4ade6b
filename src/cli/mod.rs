pub mod check;
pub mod import;
pub mod init;
pub mod migrate;
pub mod random;
pub mod serve;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "resepi")]
#[command(version)]
#[command(about = "A small recipe collection site", long_about = None)]
pub struct Cli {
    #[arg(short, long, default_value = "resepi.toml", env = "RESEPI_CONFIG")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a config file and data directory
    Init {
        #[arg(default_value = ".")]
        path: PathBuf,
        #[arg(long)]
        name: Option<String>,
    },
    /// Run the web server
    Serve {
        #[arg(short = 'H', long)]
        host: Option<String>,
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Apply database migrations to the local store
    Migrate,
    /// Load recipes from a JSON array into the local store
    Import {
        file: PathBuf,
        /// Replace recipes whose id already exists
        #[arg(long)]
        overwrite: bool,
    },
    /// Print the slug a title derives to
    Slug { title: String },
    /// Print the path of a random recipe
    Random,
    /// Report titles that share a slug or have none
    Check,
}
