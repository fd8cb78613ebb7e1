use discbase_server::{Result, build_state, config::ServerConfig, run_with_state};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = ServerConfig::load()?;
    let state = build_state(&args).await?;
    info!("Disc catalog API listening on {}", args.base_url);

    run_with_state(args, state).await
}
