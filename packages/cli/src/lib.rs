// ABOUTME: Library half of the specgen CLI
// ABOUTME: Configuration, logging setup and subcommand handlers

pub mod commands;
pub mod config;

#[cfg(test)]
mod tests;

pub use commands::{handle_command, Commands};
pub use config::{Config, ConfigError};

const DEFAULT_LOG_FILTER: &str = "warn,specgen=info";

/// Install the global tracing subscriber; `RUST_LOG` overrides the default filter
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
