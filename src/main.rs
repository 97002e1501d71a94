use clap::Parser;
use evmap::app::{self, AppState};
use evmap::config::Config;
use evmap::map::ClusterEngine;
use evmap::{logging, server};
use serde::Serialize;
use std::path::PathBuf;
use tracing::warn;

/// EV Map: charging stations from KEPCO open data on a clustered map
///
/// Fetches one page of charging stations, geocodes each address through
/// VWorld (road → parcel → shortened road), and either prints the rendered
/// map as JSON or serves it as an interactive page.
///
/// Examples:
///   evmap
///   evmap --metro 26 --page-size 50
///   evmap --zoom 14 > seoul.json
///   evmap --serve --port 8080
#[derive(Parser)]
#[command(name = "evmap", version, about, long_about = None)]
struct Cli {
    /// Config file (JSON). Defaults to ~/.evmap/config.json if present.
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Metropolitan-area code (11 = Seoul, 26 = Busan, ...).
    #[arg(long)]
    metro: Option<String>,

    /// Stations per page.
    #[arg(long)]
    page_size: Option<u32>,

    /// Page number, starting at 1.
    #[arg(long)]
    page: Option<u32>,

    /// Zoom level used for the clustered output.
    #[arg(long, short = 'z')]
    zoom: Option<u8>,

    /// Serve the interactive map instead of printing JSON.
    #[arg(long)]
    serve: bool,

    /// Bind address for --serve.
    #[arg(long)]
    host: Option<String>,

    /// Port for --serve.
    #[arg(long, short = 'p')]
    port: Option<u16>,
}

#[derive(Serialize)]
struct CliOutput {
    status: app::StatusView,
    map: evmap::map::MapSnapshot,
    stations: Vec<evmap::station::StationRecord>,
}

fn main() {
    logging::init();
    let cli = Cli::parse();

    // ── Configuration ───────────────────────────────────────────

    let config = load_config(&cli).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    for var in config.missing_keys() {
        warn!("{} is not set; upstream requests will likely be rejected", var);
    }

    // ── Serve ───────────────────────────────────────────────────

    if cli.serve {
        let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
            eprintln!("Error: Cannot start runtime: {}", e);
            std::process::exit(1);
        });
        if let Err(e) = runtime.block_on(server::run(config)) {
            eprintln!("Server error: {}", e);
            std::process::exit(1);
        }
        return;
    }

    // ── One-shot load ───────────────────────────────────────────

    let state = AppState::new(&config);
    state.mark_ready(ClusterEngine::new(config.cluster));
    app::run_load(&state, &app::build_loader(&config));

    let status = state.status();
    eprintln!("  {}", status.message);

    let output = CliOutput {
        map: state.snapshot(cli.zoom),
        stations: state.stations().to_vec(),
        status,
    };

    match serde_json::to_string_pretty(&output) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error: Cannot encode output: {}", e);
            std::process::exit(1);
        }
    }
}

fn load_config(cli: &Cli) -> Result<Config, evmap::config::ConfigError> {
    // Priority: flags > environment > file > defaults
    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_env();

    if let Some(ref metro) = cli.metro {
        config.stations.metro_code = metro.clone();
    }
    if let Some(n) = cli.page_size {
        config.stations.page_size = n;
    }
    if let Some(n) = cli.page {
        config.stations.page_no = n;
    }
    if let Some(z) = cli.zoom {
        config.map.zoom = z;
    }
    if let Some(ref host) = cli.host {
        config.server.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    config.validate()?;
    Ok(config)
}
