use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::{net::TcpStream, sync::mpsc};
use tokio_util::codec::Framed;
use tracing::{debug, trace, warn};

use crate::codec::TetherCodec;
use crate::error::TetherError;
use crate::packet::Packet;

/// Interval between keep-alive packets on an idle link.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);

const CHANNEL_CAPACITY: usize = 100;

pub type ConnectionSender = mpsc::Sender<Packet>;

/// A framed TCP link to a single peer.
///
/// Reading and writing happen on background tasks; callers exchange
/// whole [`Packet`]s through channels. A heartbeat is sent every
/// [`HEARTBEAT_INTERVAL`] for as long as any sender is alive.
#[derive(Debug)]
pub struct Connection {
    // User -> background writer
    tx: ConnectionSender,
    // Background reader -> user
    rx: mpsc::Receiver<Packet>,
    peer: SocketAddr,
}

impl Connection {
    pub fn new(stream: TcpStream) -> Result<Self, TetherError> {
        let peer = stream.peer_addr()?;
        stream.set_nodelay(true)?;

        let (mut net_writer, mut net_reader) = Framed::new(stream, TetherCodec).split();

        // User -> Network
        let (user_tx, mut network_rx) = mpsc::channel::<Packet>(CHANNEL_CAPACITY);

        // Network -> User
        let (network_tx, user_rx) = mpsc::channel(CHANNEL_CAPACITY);

        tokio::spawn(async move {
            while let Some(packet) = network_rx.recv().await {
                if let Err(e) = net_writer.send(packet).await {
                    warn!(%peer, error = %e, "Network write error");
                    break;
                }
            }
            // Half-close so the peer sees end of stream.
            let _ = net_writer.close().await;
            debug!(%peer, "Writer task finished");
        });

        tokio::spawn(async move {
            while let Some(result) = net_reader.next().await {
                match result {
                    Ok(packet) => {
                        if network_tx.send(packet).await.is_err() {
                            // Receiver dropped, nobody is listening.
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(%peer, error = %e, "Network read error");
                        break;
                    }
                }
            }
            debug!(%peer, "Reader task finished");
        });

        // Weak so an abandoned connection is not kept alive by its own heartbeat.
        let heartbeat_tx = user_tx.downgrade();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(HEARTBEAT_INTERVAL);
            interval.tick().await;
            loop {
                interval.tick().await;
                let Some(tx) = heartbeat_tx.upgrade() else {
                    break;
                };
                if tx.send(Packet::heartbeat()).await.is_err() {
                    break;
                }
                trace!(%peer, "Heartbeat sent");
            }
        });

        Ok(Self {
            tx: user_tx,
            rx: user_rx,
            peer,
        })
    }

    pub async fn connect(conn_info: &ConnectionInfo) -> Result<Self, TetherError> {
        let stream = TcpStream::connect(conn_info.to_string()).await?;
        Self::new(stream)
    }

    pub async fn send(&self, packet: Packet) -> Result<(), TetherError> {
        self.tx.send(packet).await?;
        Ok(())
    }

    pub async fn recv(&mut self) -> Option<Packet> {
        self.rx.recv().await
    }

    pub fn sender(&self) -> ConnectionSender {
        self.tx.clone()
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Separate the outgoing and incoming halves.
    pub fn split(self) -> (ConnectionSender, mpsc::Receiver<Packet>) {
        (self.tx, self.rx)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionInfo {
    ip: String,
    port: u16,
}

impl ConnectionInfo {
    pub fn new(ip: impl Into<String>, port: u16) -> Self {
        Self {
            ip: ip.into(),
            port,
        }
    }

    pub fn ip(&self) -> &str {
        &self.ip
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl fmt::Display for ConnectionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ip, self.port)
    }
}
