//! Input forwarding protocol.
//!
//! # Wire Protocol
//!
//! ```text
//! Viewer ──[InputEvent]──────────────────────► Host
//!   Payload: InputEvent (bincode)
//! Host   ──[InputEvent]──────────────────────► Viewer   (empty ack)
//! ```
//!
//! Pointer coordinates are already in the host's screen space when they
//! leave the viewer. One packet per local interaction; events are never
//! batched or coalesced.

use serde::{Deserialize, Serialize};

use crate::error::TetherError;
use crate::message::Command;
use crate::packet::Packet;

// ── Pointer ───────────────────────────────────────────────────────

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// No button involved (plain motion).
    None,
    Left,
    Middle,
    Right,
    /// Extra buttons, identified by the platform's button number.
    Other(u16),
}

/// What happened to the pointer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PointerKind {
    Move,
    Press,
    Release,
    /// Press immediately followed by release.
    Click,
    /// Pointer entered the capture area.
    Enter,
    /// Pointer left the capture area.
    Exit,
}

/// A pointer event in host screen coordinates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub x: i32,
    pub y: i32,
    pub button: MouseButton,
}

impl PointerEvent {
    pub fn new(kind: PointerKind, x: i32, y: i32, button: MouseButton) -> Self {
        Self { kind, x, y, button }
    }
}

// ── Keyboard ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum KeyAction {
    Press,
    Release,
}

/// A key event carrying the platform key code untouched.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeyEvent {
    pub action: KeyAction,
    pub code: u32,
}

// ── InputEvent ────────────────────────────────────────────────────

/// Any event the viewer can forward to the host.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum InputEvent {
    Pointer(PointerEvent),
    Key(KeyEvent),
}

impl InputEvent {
    pub fn pointer(kind: PointerKind, x: i32, y: i32, button: MouseButton) -> Self {
        InputEvent::Pointer(PointerEvent::new(kind, x, y, button))
    }

    pub fn key_press(code: u32) -> Self {
        InputEvent::Key(KeyEvent {
            action: KeyAction::Press,
            code,
        })
    }

    pub fn key_release(code: u32) -> Self {
        InputEvent::Key(KeyEvent {
            action: KeyAction::Release,
            code,
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, TetherError> {
        bincode::serialize(self).map_err(|e| TetherError::Encoding(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TetherError> {
        bincode::deserialize(bytes).map_err(|e| TetherError::Encoding(e.to_string()))
    }

    pub fn into_packet(self, request_id: u64) -> Result<Packet, TetherError> {
        let payload = self.to_bytes()?;
        Packet::new_command(request_id, Command::InputEvent, payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_event_packet() {
        let ev = InputEvent::pointer(PointerKind::Click, 960, 540, MouseButton::Left);
        let pkt = ev.into_packet(8).unwrap();
        assert_eq!(pkt.command().unwrap(), Command::InputEvent);
        assert_eq!(InputEvent::from_bytes(pkt.payload()).unwrap(), ev);
    }

    #[test]
    fn unknown_variant_tag_is_an_encoding_error() {
        // Enum tag 7 does not exist for InputEvent.
        let bytes = 7u32.to_le_bytes();
        assert!(matches!(
            InputEvent::from_bytes(&bytes),
            Err(TetherError::Encoding(_))
        ));
    }
}
