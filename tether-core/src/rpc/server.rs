use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::TetherError;
use crate::message::{Command, MessageType};
use crate::network::Connection;
use crate::packet::Packet;
use crate::protocol::fault::RemoteFault;
use crate::protocol::file::{FileTransferPayload, PullFileResponse};
use crate::protocol::input::InputEvent;
use crate::protocol::screen::ScreenDimension;
use crate::protocol::session::{LookupRequest, RegisterRequest};
use crate::rpc::HostService;

/// Serves a [`HostService`] under a service name.
#[derive(Clone)]
pub struct RpcServer {
    service: Arc<dyn HostService>,
    service_name: Arc<str>,
}

impl RpcServer {
    pub fn new(service: Arc<dyn HostService>, service_name: impl Into<Arc<str>>) -> Self {
        Self {
            service,
            service_name: service_name.into(),
        }
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Answer calls on `conn` until the peer disconnects.
    ///
    /// Each call is handled on its own task, so a slow call (a pending
    /// file selection, say) does not hold up the others.
    pub async fn serve_connection(&self, conn: Connection) {
        let peer = conn.peer_addr();
        let (tx, mut rx) = conn.split();
        info!(%peer, "Viewer connected");

        while let Some(packet) = rx.recv().await {
            if packet.is_heartbeat() {
                continue;
            }

            let server = self.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let Some(response) = server.dispatch(packet).await else {
                    return;
                };
                if tx.send(response).await.is_err() {
                    debug!(%peer, "Viewer gone before response was sent");
                }
            });
        }

        info!(%peer, "Viewer disconnected");
    }

    /// Handle one command packet and build its response.
    ///
    /// Returns `None` for packets that get no answer.
    pub async fn dispatch(&self, packet: Packet) -> Option<Packet> {
        let request_id = packet.request_id();

        if !matches!(packet.message_type(), Ok(MessageType::Command)) {
            warn!(request_id, "Non-command packet from viewer; ignored");
            return None;
        }
        let command = match packet.command() {
            Ok(command) => command,
            Err(e) => {
                warn!(request_id, error = %e, "Unknown command; ignored");
                return None;
            }
        };
        if !command.expects_response() {
            return None;
        }

        let result = self.handle(command, request_id, packet.into_payload()).await;
        let response = result.or_else(|e| {
            warn!(%command, request_id, error = %e, "Call failed");
            RemoteFault::from(&e).into_packet(request_id, command)
        });

        match response {
            Ok(response) => Some(response),
            Err(e) => {
                warn!(%command, request_id, error = %e, "Could not build response");
                None
            }
        }
    }

    async fn handle(
        &self,
        command: Command,
        request_id: u64,
        payload: Vec<u8>,
    ) -> Result<Packet, TetherError> {
        let empty = |command| Packet::new_response(request_id, command, Vec::new());

        match command {
            Command::Ping | Command::Heartbeat => empty(command),
            Command::Lookup => {
                let request = LookupRequest::from_bytes(&payload)?;
                if request.service_name != *self.service_name {
                    return Err(TetherError::NotBound(request.service_name));
                }
                empty(command)
            }
            Command::Register => {
                let request = RegisterRequest::from_bytes(&payload)?;
                self.service.register(&request.id).await?;
                empty(command)
            }
            Command::ScreenCapture => {
                let frame = self.service.capture_frame().await?;
                Packet::new_response(request_id, command, frame)
            }
            Command::ScreenWidth => ScreenDimension(self.service.screen_width().await?)
                .into_packet(request_id, command),
            Command::ScreenHeight => ScreenDimension(self.service.screen_height().await?)
                .into_packet(request_id, command),
            Command::InputEvent => {
                match InputEvent::from_bytes(&payload) {
                    Ok(event) => self.service.send_input(event).await?,
                    Err(e) => warn!(request_id, error = %e, "Malformed input event; dropped"),
                }
                empty(command)
            }
            Command::FilePush => {
                let file = FileTransferPayload::from_bytes(&payload)?;
                self.service.push_file(file).await?;
                empty(command)
            }
            Command::FilePull => {
                let file = self.service.pull_file().await?;
                PullFileResponse::from(file).into_packet(request_id)
            }
        }
    }
}
