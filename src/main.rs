mod cli;
mod config;
mod datasources;
mod error;
mod logic;
mod models;

use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use error::Result;
use logic::PollService;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Initialize logging; -v flags lower the default filter
    let default_filter = match cli.verbose {
        0 => "bikeday=info",
        1 => "bikeday=debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    match cli.command {
        Some(Commands::Init) => {
            let (_, path) = Config::setup_interactive()?;
            println!("Run `bikeday check` to verify the setup at {}", path.display());
            Ok(())
        }
        Some(Commands::Check) => {
            let config = load_config(&cli)?;
            check(config).await
        }
        Some(Commands::Run) | None => {
            let config = load_config(&cli)?;
            let service = PollService::new(config);
            service.run().await
        }
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    if !Config::exists(cli.config.as_ref()) {
        eprintln!("No configuration found. Run `bikeday init` to set up.");
        std::process::exit(1);
    }
    match Config::load(cli.config.clone()) {
        Ok(c) => Ok(c),
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Validates the config against a live Home Assistant and prints one
/// evaluation per sensor without publishing anything.
async fn check(config: Config) -> Result<()> {
    println!("Config: {:#?}", config);

    let service = PollService::new(config);

    match service.client().test_connection().await {
        Ok(true) => println!("Home Assistant: OK"),
        Ok(false) => println!("Home Assistant: reachable but rejected the request"),
        Err(e) => println!("Home Assistant: OFFLINE ({})", e),
    }

    for sensor in service.sensors() {
        match service.refresh_sensor(sensor).await {
            Ok(update) => {
                println!(
                    "{}: {} ({})",
                    sensor.name,
                    update.verdict.state_str(),
                    update
                        .attributes
                        .condition
                        .as_deref()
                        .unwrap_or("no condition")
                );
                if let Some(bad_at) = update.verdict.bad_at {
                    println!("  bad weather at {}", bad_at);
                }
            }
            Err(e) => println!("{}: unavailable ({})", sensor.name, e),
        }
    }

    Ok(())
}
