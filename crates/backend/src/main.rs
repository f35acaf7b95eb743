pub mod api;
pub mod domain;
pub mod shared;
pub mod system;

use api::handlers;
use domain::records::repository::{self, RecordStore};
use shared::config::{self, Config};

/// Начальные строки: seed-файл из конфигурации, иначе демонстрационный набор
fn seed_rows(config: &Config) -> anyhow::Result<Vec<contracts::shared::data_table::Row>> {
    match config.records.seed_path.as_deref() {
        Some(path) => {
            let path = config::resolve_path(path);
            tracing::info!("Loading records from {}", path.display());
            repository::load_seed(&path)
        }
        None => Ok(repository::demo_rows(config.records.demo_rows)),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use axum::http::{header, Method};
    use axum::middleware;
    use axum::{
        routing::{get, post},
        Router,
    };
    use std::net::SocketAddr;
    use tokio::net::TcpListener;
    use tower_http::cors::{Any, CorsLayer};
    use tower_http::services::ServeDir;

    system::tracing::initialize()?;

    let config = config::load_config()?;

    let rows = seed_rows(&config)?;
    tracing::info!("Record store initialized with {} rows", rows.len());
    repository::initialize_store(RecordStore::new(rows, config.records.max_page_size))?;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/records", get(handlers::records::list))
        .route("/api/records/delete", post(handlers::records::delete))
        .fallback_service(ServeDir::new(config::resolve_path(&config.server.static_dir)))
        .layer(middleware::from_fn(system::middleware::request_logger::request_logger))
        .layer(cors);

    let port = config.server.port;
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();

    tracing::info!("Attempting to bind server to http://{}", addr);
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => {
            tracing::info!("Server successfully bound to {}", addr);
            listener
        }
        Err(e) => {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                tracing::error!(
                    "Error: Port {} is already in use. Please ensure no other process is using this port.",
                    port
                );
            } else {
                tracing::error!("Failed to bind to port {}. Error: {}", port, e);
            }
            return Err(e.into());
        }
    };

    axum::serve(listener, app).await?;

    Ok(())
}
