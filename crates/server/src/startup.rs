use std::{env, net::SocketAddr, path::Path, sync::Arc};

use axum::Router;
use common::utils::logging::{init_logging_default, init_logging_json};
use dotenvy::dotenv;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::routes;
use crate::users::AppState;
use service::{
    runtime,
    storage::{JsonTableStore, UserTable},
};

/// Initialize logging via shared common utils; `LOG_FORMAT=json` selects
/// structured output.
fn init_logging() {
    match env::var("LOG_FORMAT").as_deref() {
        Ok("json") => init_logging_json(),
        _ => init_logging_default(),
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Load configuration from config.toml, falling back to env vars when no
/// usable file is present.
fn load_config() -> configs::AppConfig {
    match configs::AppConfig::load_and_validate() {
        Ok(cfg) => cfg,
        Err(_) => {
            let mut cfg = configs::AppConfig::default();
            if let Ok(host) = env::var("SERVER_HOST") {
                cfg.server.host = host;
            }
            if let Some(port) = env::var("SERVER_PORT").ok().and_then(|p| p.parse().ok()) {
                cfg.server.port = port;
            }
            cfg.table.normalize_from_env();
            cfg
        }
    }
}

fn bind_addr(server: &configs::ServerConfig) -> anyhow::Result<SocketAddr> {
    Ok(format!("{}:{}", server.host, server.port).parse()?)
}

/// Public entry: build the app and run the HTTP server.
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();

    let cfg = load_config();

    let data_dir = Path::new(&cfg.table.data_path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| ".".to_string());
    runtime::ensure_env(&data_dir).await?;

    let table: Arc<dyn UserTable> =
        JsonTableStore::new(&cfg.table.data_path, cfg.table.scan_page_size).await?;
    let state = AppState {
        table,
        legacy_status_codes: cfg.dispatch.legacy_status_codes,
    };

    let app: Router = routes::build_router(state, build_cors());

    let addr = bind_addr(&cfg.server)?;
    info!(%addr, table = %cfg.table.data_path, "starting user registry server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
