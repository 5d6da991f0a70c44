//! Notary server binary.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};

use notary_core::NotaryConfig;
use notary_core::config::find_on_path;
use notary_core::tracing_init::init_tracing;
use notary_server::auth::JwtManager;
use notary_server::notifications::{CertificateNotifier, NoopNotifier, PebbleNotifier};
#[cfg(feature = "metrics")]
use notary_server::metrics::Metrics;
use notary_server::server::{AppState, build_router};
use notary_server::storage::NotaryDatabase;

const DEFAULT_PORT: u16 = 3000;

#[derive(Parser, Debug)]
#[command(name = "notary")]
#[command(version, about = "Notary certificate management server")]
struct Args {
    /// TOML config file
    #[arg(long, env = "NOTARY_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address (overrides the config file port)
    #[arg(long, env = "NOTARY_ADDR")]
    addr: Option<SocketAddr>,

    #[arg(long, env = "NOTARY_DB_PATH")]
    db_path: Option<PathBuf>,

    /// Run `pebble notify` whenever a certificate changes
    #[arg(long, env = "NOTARY_PEBBLE_NOTIFICATIONS")]
    pebble_notifications: bool,

    #[arg(long, env = "NOTARY_LOG_JSON")]
    log_json: bool,
}

/// Effective settings after merging the config file with CLI flags.
struct Settings {
    addr: SocketAddr,
    db_path: PathBuf,
    pebble_notifications: bool,
    log_json: bool,
}

impl Settings {
    fn resolve(args: Args) -> anyhow::Result<Self> {
        let file = args.config.as_deref().map(NotaryConfig::load).transpose()?;

        let port = file.as_ref().map_or(DEFAULT_PORT, |c| c.port);
        let addr = args
            .addr
            .unwrap_or_else(|| SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)));

        let db_path = match (args.db_path, &file) {
            (Some(path), _) => path,
            (None, Some(config)) => config.db_path.clone(),
            (None, None) => default_db_path()?,
        };

        let pebble_notifications =
            args.pebble_notifications || file.as_ref().is_some_and(|c| c.pebble_notifications);
        if pebble_notifications && find_on_path("pebble").is_none() {
            anyhow::bail!("pebble notifications enabled but pebble binary not found");
        }

        Ok(Self {
            addr,
            db_path,
            pebble_notifications,
            log_json: args.log_json || file.as_ref().is_some_and(|c| c.log_json),
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::resolve(Args::parse())?;

    init_tracing("notary_server=info,tower_http=info", settings.log_json);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %settings.addr,
        "Starting notary"
    );

    info!(path = %settings.db_path.display(), "Opening notary database");
    let db = NotaryDatabase::open(&settings.db_path).await?;

    let jwt = Arc::new(JwtManager::generate()?);

    let notifier: Arc<dyn CertificateNotifier> = if settings.pebble_notifications {
        info!("Pebble notifications enabled");
        Arc::new(PebbleNotifier::default())
    } else {
        Arc::new(NoopNotifier)
    };

    let state = AppState::new(db, jwt, notifier);
    #[cfg(feature = "metrics")]
    let state = state.with_metrics(Arc::new(Metrics::new()?));
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(settings.addr).await?;
    info!(addr = %settings.addr, "Notary server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Notary stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received shutdown signal"),
        Err(e) => {
            warn!(error = %e, "Cannot listen for Ctrl-C, running until killed");
            std::future::pending::<()>().await;
        }
    }
}

fn default_db_path() -> anyhow::Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(home.join(".notary").join("notary.db"))
}
