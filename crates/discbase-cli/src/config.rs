use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::commands::cleanup::CleanupCmd;

#[derive(Parser)]
#[command(
    version,
    about,
    long_about = "CLI for discbase - provides commands to manage the disc catalog installation."
)]
pub struct CliConfig {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    Cleanup(CleanupCmd),
}

impl crate::commands::Executor for Command {
    async fn run(self) -> anyhow::Result<()> {
        match self {
            Command::Cleanup(cmd) => cmd.run().await,
        }
    }
}

/// Backend location shared by commands working on the installation directly.
#[derive(Args, Debug, Clone)]
pub struct BackendConfig {
    #[arg(
        long,
        env = "DISCBASE_DATABASE_URL",
        help = "Database URL e.g. sqlite://discbase.db"
    )]
    pub database_url: String,

    #[arg(long, env = "DISCBASE_FILES_DIR", help = "Directory for image files")]
    pub files_dir: PathBuf,
}
