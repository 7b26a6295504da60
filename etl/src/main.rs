use anyhow::Result;
use clap::{Parser, Subcommand};
use etl::config::RunArgs;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "etl")]
#[command(about = "Build enriched NDJSON collections from the MovieLens CSV dumps", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load every source, assemble documents and write the NDJSON outputs
    Run(RunArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => etl::run(args).await.map(|_| ()),
    }
}
