use std::{net::SocketAddr, sync::Arc};

use notifier::Notifier;
use server_api::ApiContext;
use storage::{ContactStore, SqliteContactStore};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod api;
mod app_state;
mod config;

use api::build_router;
use app_state::AppState;
use config::{load_settings, prepare_database_url};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = load_settings();
    let database_url = match settings.database_url.as_deref() {
        Some(raw) => Some(prepare_database_url(raw)?),
        None => {
            warn!("DATABASE_URL is not set; contact submissions will be refused until it is");
            None
        }
    };

    let store = Arc::new(SqliteContactStore::new(database_url));
    if let Err(error) = store.connect().await {
        warn!(%error, "contact store unavailable at startup; retrying on first submission");
    }

    let notifier = Notifier::from_config(&settings.notifier_config());
    if !notifier.is_configured() {
        warn!("RESEND_API_KEY is not set; submissions will be saved without operator email");
    }

    let state = AppState {
        api: ApiContext { store, notifier },
    };
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
