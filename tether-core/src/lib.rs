//! # tether-core
//!
//! Core library for the Tether remote desktop system.
//!
//! This crate contains:
//! - **Protocol types**: `PacketHeader`, `Packet`, `Command`, `MessageType`, `ProtocolFlags`
//! - **Protocol payloads**: Structured request/response types for session, screen, input, and file exchange
//! - **Codec**: `TetherCodec` for framed TCP I/O via `tokio_util`
//! - **Network**: `Connection` for managed TCP connections with heartbeat
//! - **RPC**: the `HostService` contract, its remote client, and its server
//! - **Desktop**: capture, frame codec, coordinate mapping, input relay, frame stream
//! - **State**: the host's session registry
//! - **Transfer**: file name validation and whole-file I/O
//! - **Error**: `TetherError`, a typed `thiserror`-based error hierarchy

pub mod codec;
pub mod desktop;
pub mod error;
pub mod flags;
pub mod header;
pub mod message;
pub mod network;
pub mod packet;
pub mod protocol;
pub mod rpc;
pub mod state;
pub mod transfer;

// ── Re-exports for ergonomic usage ───────────────────────────────

pub use codec::TetherCodec;
pub use error::TetherError;
pub use flags::ProtocolFlags;
pub use header::{HEADER_LENGTH, PacketHeader};
pub use message::{Command, MessageType};
pub use network::{Connection, ConnectionInfo, ConnectionSender};
pub use packet::{MAX_PAYLOAD_SIZE, Packet};
pub use rpc::{HostService, RemoteHost, RpcServer};
pub use state::Session;

pub use desktop::{
    CaptureService, CaptureSource, DisplayFrame, FrameCodec, FrameStats, InputInjector,
    InputRelay, RenderArea, StreamClient, StreamConfig, SyntheticCapture, ZstdFrameCodec,
};
