//! File access for raw volumes

use crate::error::{RawSliceError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Read/stat capability over named resources.
///
/// Implement this for hosts whose files do not live on the local filesystem.
#[async_trait]
pub trait FileAccess: Send + Sync {
    /// Read the complete contents of a resource
    async fn read(&self, path: &str) -> Result<Bytes>;

    /// Size of a resource in bytes
    async fn size(&self, path: &str) -> Result<u64>;

    /// Check if a resource exists
    async fn exists(&self, path: &str) -> Result<bool>;
}

/// Local file system access rooted at a base directory
pub struct FileSystemAccess {
    base_path: PathBuf,
}

impl FileSystemAccess {
    /// Create a new file system accessor
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    /// Get the full path for a relative path
    fn full_path(&self, path: &str) -> PathBuf {
        self.base_path.join(path)
    }
}

#[async_trait]
impl FileAccess for FileSystemAccess {
    async fn read(&self, path: &str) -> Result<Bytes> {
        let data = fs::read(self.full_path(path)).await?;
        Ok(Bytes::from(data))
    }

    async fn size(&self, path: &str) -> Result<u64> {
        let metadata = fs::metadata(self.full_path(path)).await?;
        Ok(metadata.len())
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        Ok(fs::try_exists(self.full_path(path)).await?)
    }
}

/// Split a `file://` URL or plain path into a file accessor and a resource key
pub fn create_file_access(url: &str) -> Result<(Box<dyn FileAccess>, String)> {
    if let Some(scheme_end) = url.find("://") {
        let scheme = &url[..scheme_end];
        if scheme != "file" {
            return Err(RawSliceError::Configuration(format!(
                "Unsupported URL scheme: {}",
                scheme
            )));
        }
    }

    let path = Path::new(url.strip_prefix("file://").unwrap_or(url));
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| RawSliceError::Configuration(format!("URL has no file name: {}", url)))?;
    let base = path.parent().unwrap_or_else(|| Path::new(""));

    Ok((Box::new(FileSystemAccess::new(base)), name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_file_system_access() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("volume.raw"), [1u8, 2, 3, 4]).unwrap();
        let access = FileSystemAccess::new(temp_dir.path());

        let data = access.read("volume.raw").await.unwrap();
        assert_eq!(&data[..], &[1, 2, 3, 4]);
        assert_eq!(access.size("volume.raw").await.unwrap(), 4);
        assert!(access.exists("volume.raw").await.unwrap());
        assert!(!access.exists("missing.raw").await.unwrap());
        assert!(matches!(
            access.read("missing.raw").await,
            Err(RawSliceError::Io(_))
        ));
    }

    #[tokio::test]
    async fn test_create_file_access() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("ct.bin"), [7u8; 3]).unwrap();
        let url = format!("file://{}", temp_dir.path().join("ct.bin").display());

        let (access, key) = create_file_access(&url).unwrap();
        assert_eq!(key, "ct.bin");
        assert_eq!(access.size(&key).await.unwrap(), 3);
    }

    #[test]
    fn test_create_file_access_rejects_remote() {
        assert!(matches!(
            create_file_access("s3://bucket/volume.raw"),
            Err(RawSliceError::Configuration(_))
        ));
    }
}
