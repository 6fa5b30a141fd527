//! File materialization for export payloads
//!
//! The orchestrator hands the payload and a suggested filename to a
//! [`FileDelivery`] and never depends on how the file is presented to the user.
//!
//! - [`DirectoryDelivery`]: saves into a directory, renaming on collision the way
//!   a browser download manager does (`report (1).xlsx`)
//! - [`MemoryDelivery`]: keeps files in memory for embedding UIs and tests

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::error::{Error, Result};
use crate::utils::{MAX_RENAME_ATTEMPTS, collision_candidate};

/// Result of a successful delivery
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeliveredFile {
    /// Filename the file was saved under (may differ from the suggestion)
    pub filename: String,
    /// Location on disk, for deliveries that write files
    pub path: Option<PathBuf>,
    /// Payload size
    pub size_bytes: u64,
}

/// Materializes a downloadable file from an opaque payload
#[async_trait]
pub trait FileDelivery: Send + Sync {
    /// Deliver `bytes` under (approximately) `filename`
    async fn deliver(&self, bytes: Vec<u8>, filename: &str) -> Result<DeliveredFile>;
}

/// Saves exports into a directory
#[derive(Clone, Debug)]
pub struct DirectoryDelivery {
    dir: PathBuf,
}

impl DirectoryDelivery {
    /// Deliver into `dir` (created on first use)
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl FileDelivery for DirectoryDelivery {
    async fn deliver(&self, bytes: Vec<u8>, filename: &str) -> Result<DeliveredFile> {
        // Only the final component is honoured; a server-influenced name must not escape the directory
        let safe_name = Path::new(filename)
            .file_name()
            .ok_or_else(|| Error::Delivery {
                path: self.dir.join(filename),
                reason: "filename has no final component".to_string(),
            })?
            .to_owned();

        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to create export directory '{}': {}",
                    self.dir.display(),
                    e
                ),
            ))
        })?;

        let requested = self.dir.join(&safe_name);
        for attempt in 0..=MAX_RENAME_ATTEMPTS {
            let candidate = collision_candidate(&requested, attempt);
            let file = match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&candidate)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(Error::Io(e)),
            };

            write_or_discard(file, &bytes, &candidate).await?;

            let filename = candidate
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            tracing::info!(path = %candidate.display(), size_bytes = bytes.len(), "export saved");

            return Ok(DeliveredFile {
                filename,
                path: Some(candidate),
                size_bytes: bytes.len() as u64,
            });
        }

        Err(Error::Delivery {
            path: requested,
            reason: format!(
                "could not find unique filename after {} attempts",
                MAX_RENAME_ATTEMPTS
            ),
        })
    }
}

/// Write `bytes` into the freshly created `path`, removing it again on failure
async fn write_or_discard<W>(mut file: W, bytes: &[u8], path: &Path) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let written = async {
        file.write_all(bytes).await?;
        file.flush().await
    }
    .await;

    let Err(e) = written else {
        return Ok(());
    };

    drop(file);
    if let Err(remove_err) = tokio::fs::remove_file(path).await {
        tracing::warn!(
            path = %path.display(),
            error = %remove_err,
            "failed to remove partially written export"
        );
    }

    Err(Error::Delivery {
        path: path.to_path_buf(),
        reason: format!("write failed: {}", e),
    })
}

/// Keeps delivered files in memory
#[derive(Debug, Default)]
pub struct MemoryDelivery {
    files: Mutex<Vec<(String, Vec<u8>)>>,
}

impl MemoryDelivery {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Files delivered so far, oldest first
    pub fn files(&self) -> Vec<(String, Vec<u8>)> {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl FileDelivery for MemoryDelivery {
    async fn deliver(&self, bytes: Vec<u8>, filename: &str) -> Result<DeliveredFile> {
        let size_bytes = bytes.len() as u64;
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((filename.to_string(), bytes));

        Ok(DeliveredFile {
            filename: filename.to_string(),
            path: None,
            size_bytes,
        })
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tempfile::tempdir;

    /// Accepts `accept` bytes, then fails every write like a full disk
    struct FullDisk {
        accept: usize,
    }

    impl AsyncWrite for FullDisk {
        fn poll_write(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            if self.accept == 0 {
                return Poll::Ready(Err(io::Error::other("no space left on device")));
            }
            let n = buf.len().min(self.accept);
            self.accept -= n;
            Poll::Ready(Ok(n))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn failed_write_leaves_no_partial_file() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("orders_export_20230610_140509.xlsx");
        std::fs::write(&path, b"PK").unwrap();

        let result = write_or_discard(FullDisk { accept: 2 }, b"PK\x03\x04rest", &path).await;

        match result {
            Err(Error::Delivery { path: failed, reason }) => {
                assert_eq!(failed, path);
                assert!(reason.contains("no space left on device"));
            }
            other => panic!("expected delivery error, got {other:?}"),
        }
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn successful_write_keeps_the_file() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("report.xlsx");
        let file = tokio::fs::File::create(&path).await.unwrap();

        write_or_discard(file, b"data", &path).await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"data");
    }

    #[tokio::test]
    async fn directory_delivery_creates_directory_and_writes_bytes() {
        let temp_dir = tempdir().unwrap();
        let delivery = DirectoryDelivery::new(temp_dir.path().join("exports"));

        let delivered = delivery
            .deliver(vec![1, 2, 3], "orders_export_20230610_140509.xlsx")
            .await
            .unwrap();

        let path = delivered.path.clone().unwrap();
        assert_eq!(delivered.filename, "orders_export_20230610_140509.xlsx");
        assert_eq!(delivered.size_bytes, 3);
        assert_eq!(std::fs::read(path).unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn directory_delivery_renames_on_collision() {
        let temp_dir = tempdir().unwrap();
        let delivery = DirectoryDelivery::new(temp_dir.path());

        let first = delivery.deliver(b"one".to_vec(), "report.xlsx").await.unwrap();
        let second = delivery.deliver(b"two".to_vec(), "report.xlsx").await.unwrap();
        let third = delivery.deliver(b"three".to_vec(), "report.xlsx").await.unwrap();

        assert_eq!(first.filename, "report.xlsx");
        assert_eq!(second.filename, "report (1).xlsx");
        assert_eq!(third.filename, "report (2).xlsx");
        assert_eq!(
            std::fs::read(temp_dir.path().join("report.xlsx")).unwrap(),
            b"one"
        );
    }

    #[tokio::test]
    async fn directory_delivery_strips_path_components() {
        let temp_dir = tempdir().unwrap();
        let delivery = DirectoryDelivery::new(temp_dir.path().join("out"));

        let delivered = delivery
            .deliver(b"x".to_vec(), "../../etc/orders.xlsx")
            .await
            .unwrap();

        assert_eq!(
            delivered.path.unwrap(),
            temp_dir.path().join("out").join("orders.xlsx")
        );
    }

    #[tokio::test]
    async fn directory_delivery_rejects_empty_name() {
        let temp_dir = tempdir().unwrap();
        let delivery = DirectoryDelivery::new(temp_dir.path());

        assert!(matches!(
            delivery.deliver(b"x".to_vec(), "..").await,
            Err(Error::Delivery { .. })
        ));
    }

    #[tokio::test]
    async fn memory_delivery_keeps_files_in_order() {
        let delivery = MemoryDelivery::new();

        delivery.deliver(vec![1], "a.xlsx").await.unwrap();
        delivery.deliver(vec![2, 3], "b.csv").await.unwrap();

        assert_eq!(
            delivery.files(),
            vec![
                ("a.xlsx".to_string(), vec![1]),
                ("b.csv".to_string(), vec![2, 3]),
            ]
        );
    }
}
