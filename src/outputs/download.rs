use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use crate::kernel::controller::TrimController;
use crate::services::trim::TrimService;

/// Every retrieved artifact is saved under this name.
pub const DOWNLOAD_FILE_NAME: &str = "audio.mp3";

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("download link is not available")]
    NotAvailable,
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Saves the current artifact to `<dir>/audio.mp3`.
///
/// Only valid while the controller is in the succeeded state. The handle is
/// left live, so the same result can be saved again.
pub async fn retrieve<S: TrimService>(controller: &TrimController<S>, dir: &Path) -> Result<PathBuf, DownloadError> {
    let payload = controller
        .download_link()
        .and_then(|handle| controller.resolve(&handle));

    let Some(payload) = payload else {
        warn!("Download link is not available.");
        return Err(DownloadError::NotAvailable);
    };

    let path = save_to_dir(&payload, dir).await?;
    info!(path = %path.display(), bytes = payload.len(), "Saved trimmed audio");
    Ok(path)
}

pub async fn save_to_dir(payload: &[u8], dir: &Path) -> Result<PathBuf, DownloadError> {
    let path = dir.join(DOWNLOAD_FILE_NAME);
    let io_err = |source: std::io::Error| DownloadError::Io { path: path.clone(), source };

    tokio::fs::create_dir_all(dir).await.map_err(io_err)?;
    let mut file = tokio::fs::File::create(&path).await.map_err(io_err)?;
    file.write_all(payload).await.map_err(io_err)?;
    file.flush().await.map_err(io_err)?;
    Ok(path)
}
