use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reelcost::config::Config;

mod commands;

#[derive(Parser)]
#[command(
    name = "reelcost",
    version,
    about = "Price a director's filmography across streaming and rental services",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json); overrides configuration
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// TOML configuration file (environment variables are used otherwise)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Price one or more directors' filmographies
    Price {
        /// Director names, e.g. "wes anderson"
        #[arg(required = true)]
        directors: Vec<String>,

        /// Streaming service you subscribe to (repeatable)
        #[arg(short, long = "service")]
        services: Vec<String>,

        /// Subscribe to nothing: price every film by rental
        #[arg(long, conflicts_with = "services")]
        no_services: bool,

        /// Print the report as JSON
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// List directors priced so far
    Directors,

    /// List the default streaming services
    Services,

    /// Start the HTTP API server
    Serve {
        /// Port to listen on (overrides configuration)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;

    let log_format = cli.log_format.as_deref().unwrap_or(config.logging.format.as_str());
    setup_tracing(log_format, &config.logging.level, cli.verbose)?;

    if let Err(e) = reelcost::metrics::init_metrics() {
        tracing::warn!(error = %e, "Metrics initialization failed, continuing without metrics");
    }

    match cli.command {
        Commands::Price {
            directors,
            services,
            no_services,
            json,
        } => {
            tracing::info!(directors = ?directors, services = ?services, no_services, "Starting price command");
            let services = requested_services(services, no_services);
            commands::price(&config, &directors, services, json).await?;
        }

        Commands::Directors => {
            commands::directors(&config).await?;
        }

        Commands::Services => {
            commands::services(&config);
        }

        Commands::Serve { port } => {
            tracing::info!(port = ?port, "Starting serve command");
            commands::serve(config, port).await?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    config.validate()?;
    Ok(config)
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            tracing_subscriber::EnvFilter::new("reelcost=debug,info")
        } else {
            tracing_subscriber::EnvFilter::new(format!("reelcost={level},warn"))
        }
    });

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}

/// Services named on the command line, `None` to use the configured defaults
fn requested_services(services: Vec<String>, no_services: bool) -> Option<Vec<String>> {
    if no_services {
        Some(Vec::new())
    } else {
        (!services.is_empty()).then_some(services)
    }
}
