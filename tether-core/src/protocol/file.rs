//! File exchange protocol: whole-file push and pull.
//!
//! # Wire Protocol
//!
//! ## Push (viewer → host)
//! ```text
//! Viewer ──[FilePush]────────────────────────► Host
//!   Payload: FileTransferPayload (bincode)
//! Host   ──[FilePush]────────────────────────► Viewer   (empty, or ERROR)
//! ```
//!
//! ## Pull (host → viewer)
//! ```text
//! Viewer ──[FilePull]────────────────────────► Host
//!   Payload: empty
//! Host   ──[FilePull]────────────────────────► Viewer
//!   Payload: PullFileResponse (bincode)
//! ```
//!
//! No chunking, no resume, no integrity check beyond the packet checksum.

use serde::{Deserialize, Serialize};

use crate::error::TetherError;
use crate::message::Command;
use crate::packet::{MAX_PAYLOAD_SIZE, Packet};

/// Bytes bincode adds around a file on the wire: the `PullFileResponse`
/// variant tag plus the length prefixes of data and name.
pub const FILE_ENVELOPE_OVERHEAD: usize = 4 + 8 + 8;

// ── FileTransferPayload ───────────────────────────────────────────

/// A whole file in memory: its bytes and its bare name.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileTransferPayload {
    data: Vec<u8>,
    name: String,
}

impl FileTransferPayload {
    pub fn new(data: Vec<u8>, name: impl Into<String>) -> Self {
        Self {
            data,
            name: name.into(),
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Largest file body that still fits in one packet under `name`.
    pub fn max_data_len(name: &str) -> usize {
        MAX_PAYLOAD_SIZE.saturating_sub(FILE_ENVELOPE_OVERHEAD + name.len())
    }

    pub fn into_parts(self) -> (Vec<u8>, String) {
        (self.data, self.name)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, TetherError> {
        bincode::serialize(self).map_err(|e| TetherError::Encoding(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TetherError> {
        bincode::deserialize(bytes).map_err(|e| TetherError::Encoding(e.to_string()))
    }

    /// Build a `FilePush` command `Packet`.
    pub fn into_packet(self, request_id: u64) -> Result<Packet, TetherError> {
        let payload = self.to_bytes()?;
        Packet::new_command(request_id, Command::FilePush, payload)
    }
}

impl std::fmt::Debug for FileTransferPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileTransferPayload")
            .field("name", &self.name)
            .field("len", &self.data.len())
            .finish()
    }
}

// ── PullFileResponse ──────────────────────────────────────────────

/// Answer to `FilePull`. A cancelled selection is its own variant, never
/// an empty file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum PullFileResponse {
    File(FileTransferPayload),
    Cancelled,
}

impl PullFileResponse {
    pub fn to_bytes(&self) -> Result<Vec<u8>, TetherError> {
        bincode::serialize(self).map_err(|e| TetherError::Encoding(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TetherError> {
        bincode::deserialize(bytes).map_err(|e| TetherError::Encoding(e.to_string()))
    }

    pub fn into_packet(self, request_id: u64) -> Result<Packet, TetherError> {
        let payload = self.to_bytes()?;
        Packet::new_response(request_id, Command::FilePull, payload)
    }

    pub fn into_option(self) -> Option<FileTransferPayload> {
        match self {
            PullFileResponse::File(payload) => Some(payload),
            PullFileResponse::Cancelled => None,
        }
    }
}

impl From<Option<FileTransferPayload>> for PullFileResponse {
    fn from(value: Option<FileTransferPayload>) -> Self {
        match value {
            Some(payload) => PullFileResponse::File(payload),
            None => PullFileResponse::Cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_packet_keeps_bytes_and_name() {
        let payload = FileTransferPayload::new(vec![0xDE, 0xAD, 0xBE, 0xEF], "notes.txt");
        let pkt = payload.clone().into_packet(12).unwrap();
        assert_eq!(pkt.command().unwrap(), Command::FilePush);

        let decoded = FileTransferPayload::from_bytes(pkt.payload()).unwrap();
        assert_eq!(decoded.data(), payload.data());
        assert_eq!(decoded.name(), "notes.txt");
    }

    #[test]
    fn cancelled_is_distinct_from_empty_file() {
        let empty = PullFileResponse::from(Some(FileTransferPayload::new(Vec::new(), "empty.bin")));
        let cancelled = PullFileResponse::from(None);

        let empty = PullFileResponse::from_bytes(&empty.to_bytes().unwrap()).unwrap();
        let cancelled = PullFileResponse::from_bytes(&cancelled.to_bytes().unwrap()).unwrap();

        let file = empty.into_option().expect("empty file is still a file");
        assert!(file.data().is_empty());
        assert!(cancelled.into_option().is_none());
    }

    #[test]
    fn envelope_overhead_covers_both_directions() {
        let payload = FileTransferPayload::new(vec![1; 300], "report.pdf");
        let pushed = payload.to_bytes().unwrap().len();
        let pulled = PullFileResponse::from(Some(payload)).to_bytes().unwrap().len();

        assert!(pushed <= 300 + "report.pdf".len() + FILE_ENVELOPE_OVERHEAD);
        assert_eq!(pulled, 300 + "report.pdf".len() + FILE_ENVELOPE_OVERHEAD);
        assert_eq!(
            FileTransferPayload::max_data_len("report.pdf"),
            MAX_PAYLOAD_SIZE - FILE_ENVELOPE_OVERHEAD - "report.pdf".len()
        );
    }

    #[test]
    fn debug_does_not_dump_contents() {
        let payload = FileTransferPayload::new(vec![0; 4096], "big.bin");
        let text = format!("{payload:?}");
        assert!(text.contains("4096"));
        assert!(text.len() < 100);
    }
}
