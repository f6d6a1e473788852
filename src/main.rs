use axum::serve;
use nst_backend::api::handlers::AppState;
use nst_backend::api::routes::create_router;
use nst_backend::config::AppConfig;
use nst_backend::services::{HttpObjectStorage, HttpStyleTransferModel};
use nst_backend::store::PostgresStore;
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    // Initialize logging with explicit filter to suppress sqlx debug logs
    use env_logger::Builder;
    use log::LevelFilter;

    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter_module("sqlx", LevelFilter::Warn)
        .init();

    println!("NST backend: image stylization service");

    let config = AppConfig::load()?;
    println!(
        "Configuration loaded: server={}:{}",
        config.server.host, config.server.port
    );

    println!("Connecting to PostgreSQL...");
    let database_url = config.database_url()?;
    let max_connections = config.database.max_connections.unwrap_or(20);
    let postgres_store = PostgresStore::new(&database_url, max_connections).await?;

    println!("Running database migrations...");
    postgres_store.migrate().await?;
    println!("Document store ready");

    let state = AppState {
        store: Arc::new(postgres_store),
        storage: Arc::new(HttpObjectStorage::new(
            config.storage.upload_base_url.clone(),
            config.storage.public_base_url.clone(),
        )),
        model: Arc::new(HttpStyleTransferModel::new(config.model.base_url.clone())),
        expose_error_details: config.expose_error_details(),
    };

    let app = create_router().with_state(state);

    let bind_address = config.server_address();
    let listener = TcpListener::bind(&bind_address).await?;
    println!("NST backend running on http://{}", bind_address);

    serve(listener, app).await?;

    Ok(())
}
