//! Screen capture protocol.
//!
//! # Wire Protocol
//!
//! ## Frame capture
//! ```text
//! Viewer ──[ScreenCapture]───────────────────► Host
//!   Payload: empty
//! Host   ──[ScreenCapture]───────────────────► Viewer
//!   Payload: compressed frame bytes (raw, not bincode; may be empty)
//! ```
//!
//! ## Geometry
//! ```text
//! Viewer ──[ScreenWidth | ScreenHeight]──────► Host
//!   Payload: empty
//! Host   ──[ScreenWidth | ScreenHeight]──────► Viewer
//!   Payload: ScreenDimension (bincode)
//! ```
//!
//! Geometry is queried separately from capture and never embedded in
//! the frame response.

use serde::{Deserialize, Serialize};

use crate::error::TetherError;
use crate::message::Command;
use crate::packet::Packet;

// ── ScreenGeometry ────────────────────────────────────────────────

/// Width × height of a display or drawable area, in pixels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub struct ScreenGeometry {
    pub width: u32,
    pub height: u32,
}

impl ScreenGeometry {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// `true` when either side is zero (nothing laid out yet).
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl std::fmt::Display for ScreenGeometry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

// ── ScreenDimension ───────────────────────────────────────────────

/// A single dimension answer to `ScreenWidth` / `ScreenHeight`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScreenDimension(pub u32);

impl ScreenDimension {
    pub fn to_bytes(&self) -> Result<Vec<u8>, TetherError> {
        bincode::serialize(self).map_err(|e| TetherError::Encoding(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TetherError> {
        bincode::deserialize(bytes).map_err(|e| TetherError::Encoding(e.to_string()))
    }

    /// Build a response `Packet` for `command` (width or height).
    pub fn into_packet(self, request_id: u64, command: Command) -> Result<Packet, TetherError> {
        let payload = self.to_bytes()?;
        Packet::new_response(request_id, command, payload)
    }
}
