//! On-disk home of certificate files.

use std::{
    io,
    path::{Path, PathBuf},
};
use uuid::Uuid;

/// Public URL prefix the directory is served under.
pub const PUBLIC_PREFIX: &str = "/uploads";

#[derive(Debug, Clone)]
pub struct UploadDir {
    root: PathBuf,
}

impl UploadDir {
    /// Creates the directory if needed and proves it is writable, so a bad
    /// mount fails at startup instead of on the first upload.
    pub async fn provision(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;

        let probe = root.join(format!(".probe-{}", Uuid::new_v4()));
        tokio::fs::write(&probe, b"ok").await?;
        tokio::fs::remove_file(&probe).await?;

        tracing::info!("Upload directory ready at {}", root.display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn public_path(filename: &str) -> String {
        format!("{}/{}", PUBLIC_PREFIX, filename)
    }

    pub async fn write(&self, filename: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        let path = self.resolve(filename)?;
        tokio::fs::write(&path, bytes).await?;
        Ok(path)
    }

    /// Returns `Ok(false)` when the file was already gone.
    pub async fn remove(&self, filename: &str) -> io::Result<bool> {
        let path = self.resolve(filename)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn resolve(&self, filename: &str) -> io::Result<PathBuf> {
        if !sanitize_filename(filename) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("refusing unsafe filename {:?}", filename),
            ));
        }
        Ok(self.root.join(filename))
    }
}

/// Rejects path traversal and separators; only flat names live here.
pub fn sanitize_filename(filename: &str) -> bool {
    !filename.is_empty()
        && !filename.contains("..")
        && !filename.contains('/')
        && !filename.contains('\\')
        && !filename.contains('\0')
}
