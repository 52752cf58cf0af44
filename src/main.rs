/// Command-line front end for the oracle
///
/// Wires the built-in calendar registry, the file-backed override store,
/// and the configured signing keys into the issuance service, then runs a
/// single query and prints the JSON an HTTP adapter would serve.
use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use marketproof::calendar::CalendarRegistry;
use marketproof::config::load_config;
use marketproof::oracle::{FileOverrideStore, ReceiptIssuer};
use marketproof::service::{ApiError, OracleService};
use marketproof::signing::CanonicalSigner;

fn print_error_and_exit(err: &ApiError) -> ! {
    eprintln!("{}", serde_json::to_string_pretty(err).unwrap_or_default());
    std::process::exit(1);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter("marketproof=debug,info")
        .init();

    let config_path =
        std::env::var("MARKETPROOF_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    let config = load_config(&config_path)?;
    info!("Configuration loaded from {}", config_path);

    let calendars = Arc::new(CalendarRegistry::builtin());
    let signer = Arc::new(CanonicalSigner::from_config(&config.signing_keys)?);
    let overrides = Arc::new(FileOverrideStore::new(&config.overrides_path));
    let issuer = Arc::new(ReceiptIssuer::new(
        calendars.clone(),
        overrides,
        signer.clone(),
    ));
    let service = OracleService::new(calendars, issuer, signer);

    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(String::as_str).unwrap_or("status");
    let now = Utc::now();

    match command {
        "status" => {
            let mic = args.get(2).map(String::as_str).unwrap_or("XNYS");
            match service.status(mic, now).await {
                Ok(receipt) => println!("{}", serde_json::to_string_pretty(&receipt)?),
                Err(err) => print_error_and_exit(&err),
            }
        }
        "schedule" => {
            let mic = args.get(2).map(String::as_str).unwrap_or("XNYS");
            match service.schedule(mic, now) {
                Ok(response) => println!("{}", serde_json::to_string_pretty(&response)?),
                Err(err) => print_error_and_exit(&err),
            }
        }
        "exchanges" => {
            println!("{}", serde_json::to_string_pretty(&service.exchanges())?);
        }
        "keys" => {
            println!("{}", serde_json::to_string_pretty(&service.keys())?);
        }
        "health" => match service.health(now).await {
            Ok(receipt) => println!("{}", serde_json::to_string_pretty(&receipt)?),
            Err(err) => print_error_and_exit(&err),
        },
        other => {
            eprintln!("Unknown command: {}", other);
            eprintln!("Usage: marketproof [status|schedule|exchanges|keys|health] [MIC]");
            std::process::exit(2);
        }
    }

    Ok(())
}
