//! Request/response calls between viewer and host.
//!
//! [`HostService`] is the contract the host exposes. The host implements
//! it locally and serves it with [`RpcServer`]; the viewer talks to it
//! through [`RemoteHost`], which implements the same trait over a
//! [`Connection`](crate::network::Connection).
//!
//! Calls are matched to responses by request id, so several may be in
//! flight on one link. No call carries a deadline.

mod client;
mod server;

use async_trait::async_trait;

use crate::error::TetherError;
use crate::protocol::file::FileTransferPayload;
use crate::protocol::input::InputEvent;
use crate::protocol::screen::ScreenGeometry;

pub use client::RemoteHost;
pub use server::RpcServer;

/// Operations a viewer may invoke on a host.
#[async_trait]
pub trait HostService: Send + Sync {
    /// Link (or unlink) the host session. Never fails for a mismatch.
    async fn register(&self, id: &str) -> Result<(), TetherError>;

    /// One encoded frame of the host display. Empty when nothing is
    /// available.
    async fn capture_frame(&self) -> Result<Vec<u8>, TetherError>;

    async fn screen_width(&self) -> Result<u32, TetherError>;

    async fn screen_height(&self) -> Result<u32, TetherError>;

    /// Both dimensions, queried separately.
    async fn screen_geometry(&self) -> Result<ScreenGeometry, TetherError> {
        let width = self.screen_width().await?;
        let height = self.screen_height().await?;
        Ok(ScreenGeometry::new(width, height))
    }

    /// Replay one input event on the host.
    async fn send_input(&self, event: InputEvent) -> Result<(), TetherError>;

    /// Store a file in the host's working directory.
    async fn push_file(&self, payload: FileTransferPayload) -> Result<(), TetherError>;

    /// Let the host operator pick a file to hand over. `None` when the
    /// selection is cancelled.
    async fn pull_file(&self) -> Result<Option<FileTransferPayload>, TetherError>;
}
