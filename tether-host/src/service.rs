//! Host service core logic.
//!
//! [`SharingService`] answers viewer calls: capture, geometry, input,
//! and file exchange. [`HostServer`] accepts viewers and serves the
//! service to them, one viewer at a time.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use tether_core::desktop::{CaptureService, InputRelay};
use tether_core::protocol::{FileTransferPayload, InputEvent};
use tether_core::transfer::{read_payload, write_payload};
use tether_core::{Connection, HostService, RpcServer, Session, TetherError};

use crate::picker::FilePicker;

// ── SharingService ───────────────────────────────────────────────

pub struct SharingService {
    capture: Arc<CaptureService>,
    relay: Arc<InputRelay>,
    files_dir: PathBuf,
    picker: Arc<dyn FilePicker>,
}

impl SharingService {
    pub fn new(
        capture: CaptureService,
        relay: InputRelay,
        files_dir: impl Into<PathBuf>,
        picker: Arc<dyn FilePicker>,
    ) -> Self {
        Self {
            capture: Arc::new(capture),
            relay: Arc::new(relay),
            files_dir: files_dir.into(),
            picker,
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        self.capture.session()
    }

    fn note_unlinked(&self, what: &str) {
        if !self.session().is_linked() {
            warn!(session = %self.session().id(), "{what} on an unlinked session");
        }
    }
}

fn worker_failed(e: tokio::task::JoinError) -> TetherError {
    TetherError::Other(format!("worker task failed: {e}"))
}

#[async_trait]
impl HostService for SharingService {
    async fn register(&self, id: &str) -> Result<(), TetherError> {
        self.session().register(id);
        Ok(())
    }

    async fn capture_frame(&self) -> Result<Vec<u8>, TetherError> {
        let capture = Arc::clone(&self.capture);
        tokio::task::spawn_blocking(move || capture.capture_frame())
            .await
            .map_err(worker_failed)?
    }

    async fn screen_width(&self) -> Result<u32, TetherError> {
        self.capture.screen_width()
    }

    async fn screen_height(&self) -> Result<u32, TetherError> {
        self.capture.screen_height()
    }

    async fn send_input(&self, event: InputEvent) -> Result<(), TetherError> {
        self.note_unlinked("Input event");
        let relay = Arc::clone(&self.relay);
        tokio::task::spawn_blocking(move || relay.apply(&event))
            .await
            .map_err(worker_failed)?
    }

    async fn push_file(&self, payload: FileTransferPayload) -> Result<(), TetherError> {
        self.note_unlinked("File push");
        let path = write_payload(&self.files_dir, &payload).await?;
        info!(path = %path.display(), bytes = payload.data().len(), "File received and saved");
        Ok(())
    }

    async fn pull_file(&self) -> Result<Option<FileTransferPayload>, TetherError> {
        self.note_unlinked("File pull");
        let picker = Arc::clone(&self.picker);
        let selection = tokio::task::spawn_blocking(move || picker.pick())
            .await
            .map_err(worker_failed)?;

        let Some(path) = selection else {
            info!("File selection cancelled");
            return Ok(None);
        };

        let payload = read_payload(&path).await?;
        info!(path = %path.display(), bytes = payload.data().len(), "File sent to viewer");
        Ok(Some(payload))
    }
}

// ── HostServer ───────────────────────────────────────────────────

/// Accepts viewer connections and serves them.
pub struct HostServer {
    listener: TcpListener,
    rpc: RpcServer,
}

impl HostServer {
    pub async fn bind(address: &str, rpc: RpcServer) -> Result<Self, TetherError> {
        let listener = TcpListener::bind(address).await?;
        Ok(Self { listener, rpc })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, TetherError> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept viewers until `cancel` fires. Viewers are served one at a
    /// time; the next is accepted when the current one disconnects.
    pub async fn run(self, cancel: CancellationToken) {
        info!(
            service = self.rpc.service_name(),
            address = ?self.listener.local_addr().ok(),
            "Host listening"
        );

        loop {
            let accept = tokio::select! {
                _ = cancel.cancelled() => break,
                result = self.listener.accept() => result,
            };

            let stream = match accept {
                Ok((stream, _)) => stream,
                Err(e) => {
                    warn!(error = %e, "Accept error");
                    continue;
                }
            };

            let conn = match Connection::new(stream) {
                Ok(conn) => conn,
                Err(e) => {
                    warn!(error = %e, "Could not set up viewer connection");
                    continue;
                }
            };

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = self.rpc.serve_connection(conn) => {}
            }
        }

        info!("Host stopped");
    }
}
