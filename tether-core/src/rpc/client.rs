use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::error::TetherError;
use crate::flags::ProtocolFlags;
use crate::message::{Command, MessageType};
use crate::network::{Connection, ConnectionInfo, ConnectionSender};
use crate::packet::Packet;
use crate::protocol::fault::RemoteFault;
use crate::protocol::file::{FileTransferPayload, PullFileResponse};
use crate::protocol::input::InputEvent;
use crate::protocol::screen::ScreenDimension;
use crate::protocol::session::{LookupRequest, RegisterRequest};
use crate::rpc::HostService;

type PendingCalls = Arc<Mutex<HashMap<u64, oneshot::Sender<Packet>>>>;

/// Viewer-side handle to a host.
///
/// Cheap to share behind an `Arc`; every method may be called
/// concurrently. When the link drops, in-flight and later calls fail
/// with [`TetherError::Disconnected`].
#[derive(Debug)]
pub struct RemoteHost {
    tx: ConnectionSender,
    pending: PendingCalls,
    closed: Arc<AtomicBool>,
    next_request_id: AtomicU64,
    peer: SocketAddr,
}

impl RemoteHost {
    pub async fn connect(info: &ConnectionInfo) -> Result<Self, TetherError> {
        let conn = Connection::connect(info).await?;
        info!(peer = %conn.peer_addr(), "Connected to host");
        Ok(Self::from_connection(conn))
    }

    /// Take over an established connection and start routing responses.
    pub fn from_connection(conn: Connection) -> Self {
        let peer = conn.peer_addr();
        let (tx, rx) = conn.split();
        let pending = PendingCalls::default();
        let closed = Arc::new(AtomicBool::new(false));

        tokio::spawn(route_responses(
            rx,
            Arc::clone(&pending),
            Arc::clone(&closed),
            peer,
        ));

        Self {
            tx,
            pending,
            closed,
            // 0 is reserved for heartbeats.
            next_request_id: AtomicU64::new(1),
            peer,
        }
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// `true` once the host side of the link has gone away.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Check that the host serves `service_name`.
    pub async fn lookup(&self, service_name: &str) -> Result<(), TetherError> {
        let request_id = self.next_id();
        let packet = LookupRequest::new(service_name).into_packet(request_id)?;
        match self.call(request_id, packet).await {
            Ok(_) => Ok(()),
            Err(TetherError::Remote(_)) => Err(TetherError::NotBound(service_name.to_string())),
            Err(e) => Err(e),
        }
    }

    pub async fn ping(&self) -> Result<(), TetherError> {
        let request_id = self.next_id();
        let packet = Packet::new_command(request_id, Command::Ping, Vec::new())?;
        self.call(request_id, packet).await.map(|_| ())
    }

    fn next_id(&self) -> u64 {
        self.next_request_id.fetch_add(1, Ordering::Relaxed)
    }

    async fn call_empty(&self, command: Command) -> Result<Packet, TetherError> {
        let request_id = self.next_id();
        let packet = Packet::new_command(request_id, command, Vec::new())?;
        self.call(request_id, packet).await
    }

    /// Send `packet` and wait for the response carrying `request_id`.
    async fn call(&self, request_id: u64, packet: Packet) -> Result<Packet, TetherError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.pending
            .lock()
            .map_err(|_| TetherError::Other("pending call table poisoned".into()))?
            .insert(request_id, reply_tx);

        if self.is_closed() || self.tx.send(packet).await.is_err() {
            self.forget(request_id);
            return Err(TetherError::Disconnected);
        }

        let response = reply_rx.await.map_err(|_| TetherError::Disconnected)?;
        if response.flags().contains(ProtocolFlags::ERROR) {
            let fault = RemoteFault::from_bytes(response.payload())?;
            return Err(TetherError::Remote(fault.message));
        }
        Ok(response)
    }

    fn forget(&self, request_id: u64) {
        if let Ok(mut pending) = self.pending.lock() {
            pending.remove(&request_id);
        }
    }
}

/// Deliver each response to the caller waiting on its request id.
///
/// When the link closes, all waiting callers are released.
async fn route_responses(
    mut rx: mpsc::Receiver<Packet>,
    pending: PendingCalls,
    closed: Arc<AtomicBool>,
    peer: SocketAddr,
) {
    while let Some(packet) = rx.recv().await {
        if packet.is_heartbeat() {
            continue;
        }
        if !matches!(packet.message_type(), Ok(MessageType::Response)) {
            warn!(%peer, ?packet, "Unexpected command from host; ignored");
            continue;
        }

        let waiter = pending
            .lock()
            .ok()
            .and_then(|mut pending| pending.remove(&packet.request_id()));
        match waiter {
            Some(waiter) => {
                let _ = waiter.send(packet);
            }
            None => debug!(%peer, request_id = packet.request_id(), "Response for unknown call"),
        }
    }

    warn!(%peer, "Host connection closed");
    closed.store(true, Ordering::SeqCst);
    if let Ok(mut pending) = pending.lock() {
        pending.clear();
    }
}

#[async_trait]
impl HostService for RemoteHost {
    async fn register(&self, id: &str) -> Result<(), TetherError> {
        let request_id = self.next_id();
        let packet = RegisterRequest::new(id).into_packet(request_id)?;
        self.call(request_id, packet).await.map(|_| ())
    }

    async fn capture_frame(&self) -> Result<Vec<u8>, TetherError> {
        Ok(self.call_empty(Command::ScreenCapture).await?.into_payload())
    }

    async fn screen_width(&self) -> Result<u32, TetherError> {
        let response = self.call_empty(Command::ScreenWidth).await?;
        Ok(ScreenDimension::from_bytes(response.payload())?.0)
    }

    async fn screen_height(&self) -> Result<u32, TetherError> {
        let response = self.call_empty(Command::ScreenHeight).await?;
        Ok(ScreenDimension::from_bytes(response.payload())?.0)
    }

    async fn send_input(&self, event: InputEvent) -> Result<(), TetherError> {
        let request_id = self.next_id();
        let packet = event.into_packet(request_id)?;
        self.call(request_id, packet).await.map(|_| ())
    }

    async fn push_file(&self, payload: FileTransferPayload) -> Result<(), TetherError> {
        let request_id = self.next_id();
        let packet = payload.into_packet(request_id)?;
        self.call(request_id, packet).await.map(|_| ())
    }

    async fn pull_file(&self) -> Result<Option<FileTransferPayload>, TetherError> {
        let response = self.call_empty(Command::FilePull).await?;
        Ok(PullFileResponse::from_bytes(response.payload())?.into_option())
    }
}
