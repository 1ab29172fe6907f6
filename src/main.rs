use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use adboard::api::{create_api_router, AppState};
use adboard::config::Config;
use adboard::graph::{GraphClient, WindowResolver};
use adboard::notify::TelegramNotifier;
use adboard::storage::{AccountStore, FileAccountStore};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    info!("Loaded configuration");

    let store: Arc<dyn AccountStore> =
        Arc::new(FileAccountStore::new(&config.store.accounts_file));
    store.init().await?;
    info!("Account store ready at {}", config.store.accounts_file);

    let graph = Arc::new(GraphClient::new(&config.graph)?);
    info!(
        "Graph API client targeting {} (reference offset UTC{:+})",
        config.graph.base_url, config.graph.reference_offset_hours
    );

    let windows = WindowResolver::new(config.graph.reference_offset_hours);

    let notifier = match config.telegram.as_ref() {
        Some(telegram) => {
            info!("Telegram notifications enabled (chat {})", telegram.chat_id);
            Some(TelegramNotifier::new(telegram)?)
        }
        None => {
            info!("Telegram notifications disabled");
            None
        }
    };

    if config.app.is_none() {
        info!("No FB app credentials configured; token exchange endpoints will reject requests");
    }

    let state = Arc::new(AppState {
        store,
        graph,
        windows,
        notifier,
        app: config.app.clone(),
    });
    let router = create_api_router(state);

    let addr = format!("{}:{}", config.api_server.host, config.api_server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("API server listening on http://{addr}");

    axum::serve(listener, router).await?;

    Ok(())
}
