use std::{fs, path::PathBuf};

use crate::error::Result;
pub use clap::Parser;
use url::Url;

#[derive(Debug, Clone, clap::Parser)]
pub struct ServerConfig {
    #[arg(
        short,
        long,
        default_value_t = 5000,
        env = "DISCBASE_LISTEN_PORT",
        help = "Port to listen on"
    )]
    pub port: u16,
    #[arg(
        short,
        long,
        default_value = "127.0.0.1",
        env = "DISCBASE_LISTEN_ADDRESS",
        help = "Address to listen on"
    )]
    pub listen_address: String,

    #[arg(
        long,
        env = "DISCBASE_BASE_URL",
        default_value = "http://localhost:5000",
        help = "Base URL of the server, as visible to clients"
    )]
    pub base_url: Url,

    #[arg(
        long,
        env = "DISCBASE_DATABASE_URL",
        help = "Database URL e.g. sqlite://file.db or similar, default is sqlite://[data-dir]/discbase.db, where data-dir is set by --data-dir"
    )]
    database_url: Option<String>,

    #[arg(
        long,
        env = "DISCBASE_DATA_DIR",
        help = "Data directory (image files, database etc.), default is system default like ~/.local/share/discbase",
        default_value_t = default_data_dir()
    )]
    data_dir: String,

    #[arg(
        long,
        env = "DISCBASE_FILES_DIR",
        help = "Directory for image files, default data_dir/files"
    )]
    files_dir: Option<PathBuf>,

    #[arg(
        long,
        env = "DISCBASE_UPLOAD_LIMIT_MB",
        default_value = "20",
        help = "Maximum upload size in MB"
    )]
    pub upload_limit_mb: usize,

    #[arg(long, env = "DISCBASE_NO_CORS", help = "Disable CORS")]
    pub no_cors: bool,
}

fn default_data_dir() -> String {
    let dir = dirs::data_dir()
        .map(|p| p.join("discbase"))
        .unwrap_or_else(|| PathBuf::from("discbase"));

    if !fs::exists(&dir).expect("Failed to check if data directory exists") {
        fs::create_dir_all(&dir).expect("Failed to create data directory");
    } else if !dir.is_dir() {
        panic!("Data directory is not a directory",)
    }

    dir.to_string_lossy().to_string()
}

impl ServerConfig {
    pub fn load() -> Result<Self> {
        ServerConfig::try_parse().map_err(|e| e.into())
    }

    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }

    pub fn files_dir(&self) -> PathBuf {
        self.files_dir
            .clone()
            .unwrap_or_else(|| self.data_dir().join("files"))
    }

    pub fn database_url(&self) -> String {
        self.database_url
            .clone()
            .unwrap_or_else(|| format!("sqlite://{}/discbase.db?mode=rwc", self.data_dir))
    }
}
