//! relief-node: disaster-relief logistics coordinator

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tracing::{info, warn};

use relief_node::api::{create_router, AppState};
use relief_node::auth::TokenIssuer;
use relief_node::config::Config;
use relief_node::store::Store;
use relief_node::{escalator, seed};

#[derive(Parser)]
#[command(name = "relief-node")]
#[command(about = "Disaster-relief logistics coordinator")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "relief-node.toml")]
    config: String,

    /// Data directory
    #[arg(short, long, env = "RELIEF_DATA_DIR")]
    data_dir: Option<String>,

    /// HTTP port (overrides config file)
    #[arg(short, long, env = "RELIEF_HTTP_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("relief_node=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    info!("Starting relief-node");
    info!("Config file: {}", cli.config);

    let mut config: Config = if std::path::Path::new(&cli.config).exists() {
        let content = std::fs::read_to_string(&cli.config)?;
        toml::from_str(&content)?
    } else {
        warn!("Config file not found, using defaults");
        Config::default()
    };

    // Apply CLI overrides
    if let Some(data_dir) = cli.data_dir {
        config.node.data_dir = PathBuf::from(data_dir);
    }
    if let Some(port) = cli.port {
        config.api.http_port = port;
    }

    config.validate()?;

    info!("Data dir: {}", config.node.data_dir.display());

    let mut store = Store::open(&config.node.data_dir)?;

    // One-time district seed, skipped for names already present
    if let Some(seed_path) = &config.seed.districts_file {
        if seed_path.exists() {
            let inserted = seed::load_districts(&mut store, seed_path)?;
            info!(inserted, "Districts initialized");
        } else {
            warn!(path = %seed_path.display(), "District seed file not found, skipping");
        }
    }

    let store = store.into_shared();

    // Priority escalator runs independently of request volume
    if config.escalator.enabled {
        tokio::spawn(escalator::run(
            store.clone(),
            config.escalator.interval_secs,
        ));
    } else {
        info!("Priority escalator is disabled");
    }

    let tokens = TokenIssuer::new(
        config.auth.jwt_secret.clone(),
        config.auth.token_expiry_secs,
    )?;
    let app = create_router(AppState {
        store,
        tokens,
        auth: config.auth.clone(),
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.api.http_port));
    info!("API listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
