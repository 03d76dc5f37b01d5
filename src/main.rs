use std::net::SocketAddr;
use std::sync::Arc;

use dotenvy::dotenv;
use restaurant_backend::config::{Config, StoreBackend};
use restaurant_backend::database;
use restaurant_backend::repository::{MemoryRestaurantStore, PgRestaurantStore, RestaurantStore};
use restaurant_backend::routes;
use restaurant_backend::state::AppState;
use tokio::net::TcpListener;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

const MEMORY_SEED_CATEGORIES: [&str; 5] = ["Spanish", "Italian", "French", "Chinese", "Fast food"];

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

async fn build_store(config: &Config) -> Result<Arc<dyn RestaurantStore>, String> {
    match &config.backend {
        StoreBackend::Postgres { url, max_connections } => {
            let pool = database::create_pool(url, *max_connections)
                .await
                .map_err(|e| format!("Failed to create database pool: {e}"))?;
            if config.run_migrations {
                database::run_migrations(&pool)
                    .await
                    .map_err(|e| format!("Failed to run migrations: {e}"))?;
                tracing::info!("Migrations applied");
            }
            Ok(Arc::new(PgRestaurantStore::new(pool)))
        }
        StoreBackend::Memory => {
            let store = MemoryRestaurantStore::new();
            for name in MEMORY_SEED_CATEGORIES {
                store.add_restaurant_category(name).await;
            }
            tracing::warn!("Using in-memory store; data is lost on shutdown");
            Ok(Arc::new(store))
        }
    }
}

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    init_tracing();

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return;
        }
    };

    let store = match build_store(&config).await {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("{e}");
            return;
        }
    };

    // Create application state
    let app_state = AppState::new(store, config.jwt_secret.as_str());
    let app = routes::create_router(app_state);

    // Try port..port+20 to avoid crash when address is in use
    let listener = {
        let mut bound = None;
        for offset in 0u16..=20 {
            let port = config.port.saturating_add(offset);
            let addr = SocketAddr::from((config.host, port));
            match TcpListener::bind(addr).await {
                Ok(l) => { bound = Some((l, addr)); break; }
                Err(e) => {
                    if offset == 0 { tracing::warn!(%addr, error=%e, "Port in use, trying next"); }
                }
            }
        }
        match bound {
            Some((l, addr)) => {
                tracing::info!("Server running on {}", addr);
                l
            }
            None => {
                tracing::error!("Failed to bind to any port starting at {} on {}", config.port, config.host);
                return;
            }
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error=%e, "Server error");
    }
}
