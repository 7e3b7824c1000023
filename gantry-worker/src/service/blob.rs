//! Blob store seam
//!
//! The crash-log path consumes a single operation: upload a readable
//! stream, get back an opaque resource id. The store itself is external
//! to the worker and injected.

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWriteExt};
use uuid::Uuid;

/// A readable stream handed to the blob store
pub type ByteStream = Box<dyn AsyncRead + Send + Unpin>;

/// Write-only view of the cluster's blob store
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Uploads everything the stream yields
    ///
    /// # Returns
    /// The resource id the content can later be fetched under
    async fn upload_stream(&self, stream: ByteStream) -> Result<String>;
}

/// Blob store backed by a local directory
///
/// Each upload lands in its own file named after the generated resource
/// id. Suitable for single-host deployments and tests.
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Creates a store spooling into `root`
    ///
    /// The directory is created lazily on first upload.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn upload_stream(&self, mut stream: ByteStream) -> Result<String> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("failed to create blob directory {}", self.root.display()))?;

        let resource_id = Uuid::new_v4().to_string();
        let path = self.root.join(&resource_id);

        let mut file = tokio::fs::File::create(&path)
            .await
            .with_context(|| format!("failed to create blob file {}", path.display()))?;
        tokio::io::copy(&mut stream, &mut file)
            .await
            .context("failed to spool stream into the blob store")?;
        file.flush().await?;

        Ok(resource_id)
    }
}
