use clap::Parser;
use placegate::cli::{Cli, Commands};
use placegate::types::config::Config;
use placegate::PlacegateResult;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> PlacegateResult<()> {
    let cli = Cli::parse();

    // Load configuration first (no logging yet)
    let config = if cli.config.exists() {
        Config::load(&cli.config).unwrap_or_else(|_| Config::default_config())
    } else {
        Config::default_config()
    };

    // CLI flags take precedence over config
    let log_level = if cli.quiet {
        "error".to_string()
    } else if cli.verbose {
        "debug".to_string()
    } else {
        config.general.log_level.clone()
    };

    let filter = EnvFilter::from_default_env().add_directive(
        format!("placegate={}", log_level)
            .parse()
            .unwrap_or_else(|_| "placegate=info".parse().expect("fallback directive is valid")),
    );

    if config.general.log_format == "json" {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .init();
    }

    tracing::debug!("Configuration loaded from: {}", cli.config.display());

    match cli.command {
        Commands::Init { path } => {
            placegate::cli::commands::init(path).await?;
        }
        Commands::Lookup {
            query_type,
            sw,
            ne,
            min_rating,
            json,
        } => {
            placegate::cli::commands::lookup(&query_type, sw, ne, min_rating, json, &config)
                .await?;
        }
        Commands::Stats { json } => {
            placegate::cli::commands::stats(json, &config).await?;
        }
        Commands::ClearCache => {
            placegate::cli::commands::clear_cache(&config).await?;
        }
        Commands::ResetLimit => {
            placegate::cli::commands::reset_limit(&config).await?;
        }
        Commands::Version => {
            placegate::cli::commands::version();
        }
    }

    Ok(())
}
