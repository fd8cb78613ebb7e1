use std::time::Duration;

use anyhow::{Result, anyhow};
use discbase_server::config::{Parser, ServerConfig};
use rand::Rng as _;
use tempfile::TempDir;
use url::Url;

fn random_port() -> Result<u16> {
    let mut rng = rand::rng();

    let mut retries = 3;
    while retries > 0 {
        let port: u16 = rng.random_range(3030..4030);
        let addr: std::net::SocketAddr = format!("127.0.0.1:{}", port).parse()?;
        match std::net::TcpStream::connect_timeout(&addr, std::time::Duration::from_millis(100)) {
            Err(e) if e.kind() == std::io::ErrorKind::ConnectionRefused => return Ok(port),
            Err(_) => retries -= 1,
            Ok(_) => retries -= 1,
        }
    }

    Err(anyhow!("Could not find a free port"))
}

pub struct ConfigGuard {
    #[allow(dead_code)]
    data_dir: TempDir,
}

pub fn test_config(test_name: &str) -> Result<(ServerConfig, ConfigGuard)> {
    let tmp_data_dir = TempDir::with_prefix(format!("{}_", test_name))?;
    let data_dir = tmp_data_dir.path().to_string_lossy().to_string();
    let port = random_port()?;
    let port = port.to_string();
    let base_url = format!("http://localhost:{}", port);
    let args = &[
        "discbase-e2e-tests",
        "--data-dir",
        &data_dir,
        "--port",
        &port,
        "--base-url",
        &base_url,
    ];
    let config = ServerConfig::try_parse_from(args)?;
    Ok((
        config,
        ConfigGuard {
            data_dir: tmp_data_dir,
        },
    ))
}

/// Builds the state, spawns the server and waits until it answers on /health.
pub async fn launch_env(config: ServerConfig) -> Result<(reqwest::Client, Url)> {
    let base_url = config.base_url.clone();
    let state = discbase_server::build_state(&config).await?;
    tokio::spawn(discbase_server::run_graceful_with_state(
        config,
        state,
        futures::future::pending(),
    ));

    let client = reqwest::Client::builder().build()?;
    wait_ready(&client, &base_url).await?;
    Ok((client, base_url))
}

async fn wait_ready(client: &reqwest::Client, base_url: &Url) -> Result<()> {
    let health_url = base_url.join("health")?;
    for _ in 0..100 {
        if let Ok(response) = client.get(health_url.clone()).send().await {
            if response.status().is_success() {
                return Ok(());
            }
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    Err(anyhow!("Server did not become ready"))
}

pub fn extend_url(url: &Url, segment: impl ToString) -> Url {
    let mut url = url.clone();
    url.path_segments_mut()
        .expect("URL must have a path")
        .push(&segment.to_string());
    url
}
