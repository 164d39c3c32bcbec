//! Connection bootstrap: service lookup and identity registration.
//!
//! # Wire Protocol
//!
//! ```text
//! Viewer ──[Lookup]──────────────────────────► Host
//!   Payload: LookupRequest (bincode)
//! Host   ──[Lookup]──────────────────────────► Viewer   (empty, or ERROR)
//!
//! Viewer ──[Register]────────────────────────► Host
//!   Payload: RegisterRequest (bincode)
//! Host   ──[Register]────────────────────────► Viewer   (always empty)
//! ```
//!
//! A mismatched identity is not reported back; the host only flips its
//! link flag.

use serde::{Deserialize, Serialize};

use crate::error::TetherError;
use crate::message::Command;
use crate::packet::Packet;

/// Resolve the service bound on the host under a well-known name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LookupRequest {
    pub service_name: String,
}

impl LookupRequest {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, TetherError> {
        bincode::serialize(self).map_err(|e| TetherError::Encoding(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TetherError> {
        bincode::deserialize(bytes).map_err(|e| TetherError::Encoding(e.to_string()))
    }

    pub fn into_packet(self, request_id: u64) -> Result<Packet, TetherError> {
        let payload = self.to_bytes()?;
        Packet::new_command(request_id, Command::Lookup, payload)
    }
}

/// Present an identity to the host's session registry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegisterRequest {
    pub id: String,
}

impl RegisterRequest {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, TetherError> {
        bincode::serialize(self).map_err(|e| TetherError::Encoding(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TetherError> {
        bincode::deserialize(bytes).map_err(|e| TetherError::Encoding(e.to_string()))
    }

    pub fn into_packet(self, request_id: u64) -> Result<Packet, TetherError> {
        let payload = self.to_bytes()?;
        Packet::new_command(request_id, Command::Register, payload)
    }
}
