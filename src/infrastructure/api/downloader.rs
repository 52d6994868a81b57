//! Saves remote images into the download directory.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::domain::errors::DownloadError;
use crate::domain::ports::DownloadPort;

/// Upper bound on numbered variants tried before giving up.
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// HTTP downloader writing into a fixed directory.
pub struct HttpDownloader {
    client: Client,
    dir: PathBuf,
}

impl HttpDownloader {
    /// Creates downloader writing into `dir`.
    #[must_use]
    pub fn new(client: Client, dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            dir: dir.into(),
        }
    }
}

/// Returns `dir/file_name`, or `dir/stem (n).ext` for the first free `n`.
pub(crate) fn unique_path(dir: &Path, file_name: &str) -> Option<PathBuf> {
    let candidate = dir.join(file_name);
    if !candidate.exists() {
        return Some(candidate);
    }

    let name = Path::new(file_name);
    let stem = name
        .file_stem()
        .map_or_else(|| file_name.to_string(), |s| s.to_string_lossy().to_string());
    let ext = name.extension().map(|e| e.to_string_lossy().to_string());

    (1..MAX_NAME_ATTEMPTS)
        .map(|n| match &ext {
            Some(ext) => dir.join(format!("{stem} ({n}).{ext}")),
            None => dir.join(format!("{stem} ({n})")),
        })
        .find(|path| !path.exists())
}

fn write_atomically(dir: &Path, target: &Path, bytes: &[u8]) -> std::io::Result<()> {
    use std::io::Write;

    std::fs::create_dir_all(dir)?;
    let mut temp_file = tempfile::NamedTempFile::new_in(dir)?;
    temp_file.write_all(bytes)?;
    temp_file.persist_noclobber(target).map_err(|e| e.error)?;
    Ok(())
}

#[async_trait]
impl DownloadPort for HttpDownloader {
    async fn download(&self, url: &str, file_name: &str) -> Result<PathBuf, DownloadError> {
        debug!(url, file_name, "Downloading image");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DownloadError::Network {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(url, %status, "Download rejected");
            return Err(DownloadError::Status {
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(|e| DownloadError::Network {
            message: e.to_string(),
        })?;

        let dir = self.dir.clone();
        let file_name = file_name.to_string();
        let path = tokio::task::spawn_blocking(move || -> Result<PathBuf, DownloadError> {
            let target = unique_path(&dir, &file_name).ok_or_else(|| DownloadError::Write {
                path: dir.join(&file_name),
                message: "no free file name".to_string(),
            })?;
            write_atomically(&dir, &target, &bytes).map_err(|e| DownloadError::Write {
                path: target.clone(),
                message: e.to_string(),
            })?;
            Ok(target)
        })
        .await
        .map_err(|e| DownloadError::Network {
            message: format!("write task failed: {e}"),
        })??;

        info!(path = %path.display(), "Image saved");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_unique_path_free_name() {
        let dir = tempdir().unwrap();
        assert_eq!(
            unique_path(dir.path(), "face-swap-result.jpg"),
            Some(dir.path().join("face-swap-result.jpg"))
        );
    }

    #[test]
    fn test_unique_path_numbers_existing() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("faceswap-image.jpg"), b"a").unwrap();
        std::fs::write(dir.path().join("faceswap-image (1).jpg"), b"b").unwrap();

        assert_eq!(
            unique_path(dir.path(), "faceswap-image.jpg"),
            Some(dir.path().join("faceswap-image (2).jpg"))
        );
    }

    #[test]
    fn test_write_atomically_creates_dir() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("Downloads");
        let target = nested.join("x.jpg");

        write_atomically(&nested, &target, b"jpeg").unwrap();

        assert_eq!(std::fs::read(&target).unwrap(), b"jpeg");
    }
}
