use clap::Parser;
use colored::*;
use std::process;

use specgen_cli::{handle_command, init_tracing, Commands, Config};

#[derive(Parser)]
#[command(name = "specgen")]
#[command(about = "Generate, refine and export technical specifications")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();
    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "Configuration error:".red().bold(), e);
            process::exit(2);
        }
    };

    if let Err(e) = handle_command(cli.command, &config).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}
