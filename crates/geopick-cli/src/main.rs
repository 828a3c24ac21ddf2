mod sensor;
mod shell;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use geopick_core::{AppConfig, Geocoder};
use geopick_nominatim::NominatimClient;
use geopick_session::{PickerDriver, PickerSession};
use geopick_store::{FileStorage, LocationStore};

#[derive(Debug, Parser)]
#[command(name = "geopick")]
#[command(about = "Pick, save, and reuse map locations from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the interactive picker (the default).
    Pick,
    /// Print the saved locations.
    List,
    /// Print the currently selected location.
    Current,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = geopick_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    match cli.command.unwrap_or(Commands::Pick) {
        Commands::Pick => run_picker(&config).await,
        Commands::List => print_list(&config),
        Commands::Current => print_current(&config),
    }
}

async fn run_picker(config: &AppConfig) -> anyhow::Result<()> {
    let storage = FileStorage::open(&config.data_path)?;
    let store = LocationStore::load(storage);
    tracing::debug!(
        path = %config.data_path.display(),
        locations = store.list().len(),
        "loaded location storage"
    );
    let session = PickerSession::new(store, config.map_center);

    let geocoder: Arc<dyn Geocoder> = Arc::new(NominatimClient::with_base_url(
        &config.user_agent,
        config.request_timeout_secs,
        &config.nominatim_url,
    )?);
    let positions = sensor::from_config(config.device_position);

    let driver = PickerDriver::new(session, geocoder, positions);
    match shell::run(driver).await? {
        Some(chosen) => {
            println!("Selected: {} ({})", chosen.name, chosen.address);
            println!("          {:.6}, {:.6}", chosen.lat, chosen.lng);
        }
        None => println!("No location selected."),
    }
    Ok(())
}

fn print_list(config: &AppConfig) -> anyhow::Result<()> {
    let store = LocationStore::load(FileStorage::open(&config.data_path)?);
    if store.list().is_empty() {
        println!("No saved locations yet.");
        return Ok(());
    }

    for location in store.list() {
        let marker = if store.current().is_some_and(|c| c.id == location.id) {
            "*"
        } else {
            " "
        };
        println!(
            "{marker} {} | {} ({:.4}, {:.4})",
            location.name, location.address, location.lat, location.lng
        );
    }
    Ok(())
}

fn print_current(config: &AppConfig) -> anyhow::Result<()> {
    let store = LocationStore::load(FileStorage::open(&config.data_path)?);
    match store.current() {
        Some(current) => {
            println!("{} ({})", current.name, current.address);
            println!("{:.6}, {:.6}", current.lat, current.lng);
        }
        None => println!("No location selected."),
    }
    Ok(())
}
