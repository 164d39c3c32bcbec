//! Viewer side of file exchange.

use std::path::{Path, PathBuf};

use tracing::info;

use tether_core::transfer::{read_payload, write_payload};
use tether_core::{HostService, TetherError};

/// Push a local file to the host. Returns the name it was sent under.
pub async fn send_file(host: &dyn HostService, path: &Path) -> Result<String, TetherError> {
    let payload = read_payload(path).await?;
    let name = payload.name().to_string();
    let size = payload.data().len();

    host.push_file(payload).await?;
    info!(file = %name, bytes = size, "File sent");
    Ok(name)
}

/// Ask the host operator for a file and save it into `dir`.
///
/// `Ok(None)` when the operator cancelled the selection.
pub async fn receive_file(host: &dyn HostService, dir: &Path) -> Result<Option<PathBuf>, TetherError> {
    let Some(payload) = host.pull_file().await? else {
        info!("Host cancelled the file selection");
        return Ok(None);
    };

    let path = write_payload(dir, &payload).await?;
    info!(path = %path.display(), bytes = payload.data().len(), "File received");
    Ok(Some(path))
}
