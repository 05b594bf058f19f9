mod commands;
mod summary;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "beaded", about = "MNDWI water mapping for tundra imagery")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show raster or catalog metadata
    Info(commands::info::InfoArgs),
    /// Compute the MNDWI of a multi-band raster
    Index(commands::index::IndexArgs),
    /// Flag pixels whose index falls below a threshold
    Threshold(commands::threshold::ThresholdArgs),
    /// Train k-means on sampled pixels and label the raster
    Cluster(commands::cluster::ClusterArgs),
    /// Run the full per-sensor pipeline from a catalog
    Run(commands::pipeline::RunArgs),
    /// Print the default pipeline config as TOML
    Config(commands::config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        Commands::Info(args) => commands::info::run(args),
        Commands::Index(args) => commands::index::run(args),
        Commands::Threshold(args) => commands::threshold::run(args),
        Commands::Cluster(args) => commands::cluster::run(args),
        Commands::Run(args) => commands::pipeline::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
