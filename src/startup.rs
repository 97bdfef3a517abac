use crate::agent::AgentGateway;
use crate::config::Config;
use crate::error::Error;
use crate::server::auth::RemoteLoginService;
use crate::server::userdb::SupabaseDirectory;
use crate::server::{build_router, AppState};
use crate::session::SessionStore;
use crate::shutdown;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::{oneshot, RwLock};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load and initialize the application config
pub async fn load_config() -> miette::Result<Arc<RwLock<Config>>> {
    match Config::load() {
        Ok(config) => Ok(Arc::new(RwLock::new(config))),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Initialize and start the HTTP server
pub async fn start_server(config: Arc<RwLock<Config>>) -> miette::Result<()> {
    let (port, session_file) = {
        let config_read = config.read().await;
        (config_read.port, config_read.session_file.clone())
    };

    let state = AppState {
        gateway: Arc::new(AgentGateway::new(Arc::clone(&config))),
        login: Arc::new(RemoteLoginService::new(Arc::clone(&config))),
        directory: Arc::new(SupabaseDirectory::new(Arc::clone(&config))),
        sessions: Arc::new(SessionStore::open(&session_file)),
    };

    let app = build_router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(Error::from)?;

    // Create shutdown channel and spawn the signal handler task
    let (shutdown_send, shutdown_recv) = oneshot::channel();
    tokio::spawn(shutdown::handle_signals(shutdown_send));

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_recv.await;
            info!("Received shutdown signal, stopping server");
        })
        .await
        .map_err(Error::from)?;

    Ok(())
}
