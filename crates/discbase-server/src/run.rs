use crate::config::ServerConfig;
use crate::error::Result;
use axum::http::StatusCode;
use axum::{Router, response::IntoResponse, routing::get};
use discbase_app::rest_api::{disc, image};
use discbase_app::state::{AppConfig, AppState};
use discbase_store::file_store::FileStore;
use futures::FutureExt;
use tracing::{debug, info};

pub async fn run(args: ServerConfig) -> Result<()> {
    let state = build_state(&args).await?;
    run_with_state(args, state).await
}

pub async fn run_with_state(args: ServerConfig, state: AppState) -> Result<()> {
    let shutdown = tokio::signal::ctrl_c().map(|_| ());
    run_graceful_with_state(args, state, shutdown).await
}

pub async fn run_graceful_with_state<S>(
    args: ServerConfig,
    state: AppState,
    shutdown_signal: S,
) -> Result<()>
where
    S: std::future::Future<Output = ()> + Send + 'static,
{
    let mut app = main_router(state);

    if !args.no_cors {
        app = app.layer(tower_http::cors::CorsLayer::very_permissive());
    }

    let ip: std::net::IpAddr = args.listen_address.parse()?;
    let addr = std::net::SocketAddr::from((ip, args.port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    debug!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    Ok(())
}

fn main_router(state: AppState) -> Router<()> {
    Router::new()
        .nest("/api/discs", disc::router(state.config().upload_limit_mb))
        // public resources
        .merge(image::images_router())
        .with_state(state)
        .route("/health", get(health))
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

pub async fn build_state(config: &ServerConfig) -> Result<AppState> {
    let data_dir = config.data_dir();
    if !data_dir.is_dir() {
        tokio::fs::create_dir_all(&data_dir).await?;
        info!("Created data directory");
    }
    let files_dir = config.files_dir();
    if !files_dir.is_dir() {
        tokio::fs::create_dir_all(&files_dir).await?;
        info!("Created directory for disc images");
    }

    let pool = discbase_dal::new_pool(&config.database_url()).await?;
    sqlx::migrate!("../../migrations").run(&pool).await?;

    let app_config = AppConfig {
        base_url: config.base_url.clone(),
        upload_limit_mb: config.upload_limit_mb,
    };
    let store = FileStore::new(&files_dir);

    Ok(AppState::new(app_config, pool, store))
}
