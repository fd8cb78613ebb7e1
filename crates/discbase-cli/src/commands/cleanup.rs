use std::collections::HashSet;

use clap::{ArgGroup, Args, Parser};
use discbase_store::StorePrefix;
use tokio::fs;

use crate::commands::Executor;
use crate::config::BackendConfig;

#[derive(Parser, Debug)]
pub struct CleanupCmd {
    #[command(flatten)]
    backend: BackendConfig,
    #[command(flatten)]
    work: WorkSelection,
}

#[derive(Args, Debug)]
#[command(
    group(
        ArgGroup::new("work")
            .required(true)
            .args(["images", "all"])
    )
)]
pub struct WorkSelection {
    #[arg(long, help = "Delete image files no disc references")]
    images: bool,
    #[arg(long, help = "Do all cleanup tasks")]
    all: bool,
}

impl Executor for CleanupCmd {
    async fn run(self) -> anyhow::Result<()> {
        if self.work.images || self.work.all {
            let pool = discbase_dal::new_pool(&self.backend.database_url).await?;
            let referenced: HashSet<String> = sqlx::query_scalar::<_, String>(
                "SELECT image_path FROM disc WHERE image_path IS NOT NULL",
            )
            .fetch_all(&pool)
            .await?
            .into_iter()
            // records store route paths like /images/disc_1_... - compare file names
            .filter_map(|p| p.rsplit('/').next().map(str::to_string))
            .collect();

            let images_dir = self.backend.files_dir.join(StorePrefix::Images.as_str());
            if !fs::try_exists(&images_dir).await? {
                return Ok(());
            }
            let mut files = fs::read_dir(&images_dir).await?;
            while let Some(file) = files.next_entry().await? {
                let name = file.file_name().to_string_lossy().to_string();
                if !referenced.contains(&name) {
                    fs::remove_file(file.path()).await?;
                    println!("Deleted {:?}", file.path());
                }
            }
        }

        Ok(())
    }
}
