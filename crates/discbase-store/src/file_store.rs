use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use bytes::Bytes;
use futures::{Stream, TryStreamExt as _};
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use tokio::{fs, io, io::AsyncWriteExt as _, task::spawn_blocking};
use tokio_util::io::ReaderStream;
use tracing::debug;

use super::{
    StoreInfo, ValidPath,
    error::{StoreError, StoreResult},
};

#[inline]
fn hex(bytes: &[u8]) -> String {
    base16ct::lower::encode_string(bytes)
}

struct FileStoreInner {
    root: PathBuf,
}

#[derive(Clone)]
pub struct FileStore {
    inner: Arc<FileStoreInner>,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            inner: Arc::new(FileStoreInner { root: root.into() }),
        }
    }

    pub fn root(&self) -> &Path {
        &self.inner.root
    }

    /// Writes data to an anonymous temp file inside the store root.
    ///
    /// The file becomes visible only after [`StagedFile::commit`]; a staged
    /// file dropped without commit is removed from disk.
    pub async fn stage(&self, data: &[u8]) -> StoreResult<StagedFile> {
        let root = self.inner.root.clone();
        if !fs::try_exists(&root).await? {
            fs::create_dir_all(&root).await?;
        }
        let tmp = spawn_blocking(move || NamedTempFile::new_in(root)).await??; // propagate join errors
        let tmp_path = tmp.path().to_path_buf();
        // reopen the temp path with tokio so we can write async
        let mut out = fs::OpenOptions::new().write(true).open(&tmp_path).await?;
        out.write_all(data).await?;
        out.sync_all().await?;
        let digest = Sha256::digest(data);
        Ok(StagedFile {
            tmp,
            root: self.inner.root.clone(),
            size: data.len() as u64,
            hash: hex(&digest),
        })
    }

    pub async fn load_data(
        &self,
        path: &ValidPath,
    ) -> Result<impl Stream<Item = StoreResult<Bytes>> + 'static, StoreError> {
        let final_path = self.inner.root.join(path.as_ref());
        let file = fs::File::open(&final_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StoreError::NotFound(path.as_ref().to_string())
            } else {
                e.into()
            }
        })?;
        let stream = ReaderStream::new(file).map_err(StoreError::from);
        Ok(stream)
    }

    pub async fn remove(&self, path: &ValidPath) -> StoreResult<()> {
        let final_path = self.inner.root.join(path.as_ref());
        fs::remove_file(&final_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StoreError::NotFound(path.as_ref().to_string())
            } else {
                StoreError::from(e)
            }
        })?;
        debug!("Removed file {final_path:?}");
        Ok(())
    }

    pub async fn size(&self, path: &ValidPath) -> StoreResult<u64> {
        let final_path = self.inner.root.join(path.as_ref());
        let meta = fs::metadata(&final_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StoreError::NotFound(path.as_ref().to_string())
            } else {
                StoreError::from(e)
            }
        })?;
        Ok(meta.len())
    }

    pub fn local_path(&self, path: &ValidPath) -> PathBuf {
        self.inner.root.join(path.as_ref())
    }
}

/// Bytes written to disk but not yet published under their final name.
pub struct StagedFile {
    tmp: NamedTempFile,
    root: PathBuf,
    size: u64,
    hash: String,
}

impl StagedFile {
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Atomically renames the staged file into its final location, creating
    /// parent directories as needed.
    pub async fn commit(self, path: &ValidPath) -> StoreResult<StoreInfo> {
        let StagedFile {
            tmp,
            root,
            size,
            hash,
        } = self;
        let final_path = root.join(path.as_ref());
        if let Some(parent) = final_path.parent() {
            if !fs::try_exists(parent).await? {
                fs::create_dir_all(parent).await?;
            }
        }
        // persist is a rename; temp and target share the store root filesystem
        spawn_blocking({
            let dst = final_path.clone();
            move || tmp.persist(dst).map(|_| ())
        })
        .await?
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.error))?;
        debug!("Stored {size} bytes to {final_path:?}");
        Ok(StoreInfo {
            final_path: path.clone(),
            size,
            hash,
        })
    }
}
