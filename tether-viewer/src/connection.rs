//! Connection setup to the host.
//!
//! Connect, resolve the service by name, then register the session
//! identity. The whole handshake runs under the configured timeout, and
//! any failure here is fatal for the viewer.

use std::sync::Arc;

use tracing::info;

use tether_core::{HostService, RemoteHost, TetherError};

use crate::config::ViewerConfig;

/// Connect to the configured host and register as `session_id`.
pub async fn connect_to_host(
    config: &ViewerConfig,
    session_id: &str,
) -> Result<Arc<RemoteHost>, TetherError> {
    let info = config.connection_info();
    let timeout = config.connect_timeout();
    info!("connecting to host at {info}");

    // A host busy with another viewer accepts the socket but never answers.
    let handshake = async {
        let host = RemoteHost::connect(&info).await?;
        host.lookup(&config.network.service_name).await?;
        host.register(session_id).await?;
        Ok::<_, TetherError>(host)
    };
    let host = tokio::time::timeout(timeout, handshake).await.map_err(|_| {
        TetherError::Io(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            format!("no answer from {info} within {timeout:?}"),
        ))
    })??;

    info!(
        service = %config.network.service_name,
        session = %session_id,
        "Registered with host"
    );
    Ok(Arc::new(host))
}
