//! Protocol message types and command definitions.
//!
//! Uses proper enums with `TryFrom`: no panics on unknown values.

use crate::error::TetherError;
use std::fmt;

// ── MessageType ──────────────────────────────────────────────────

/// Distinguishes commands (viewer → host) from responses (host → viewer).
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    /// A request sent by the caller.
    Command = 0x1,
    /// The reply to a request.
    Response = 0x2,
}

impl TryFrom<u32> for MessageType {
    type Error = TetherError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0x1 => Ok(MessageType::Command),
            0x2 => Ok(MessageType::Response),
            _ => Err(TetherError::UnknownVariant {
                type_name: "MessageType",
                value: value as u64,
            }),
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageType::Command => write!(f, "Command"),
            MessageType::Response => write!(f, "Response"),
        }
    }
}

// ── Command ──────────────────────────────────────────────────────

/// All commands understood by the Tether protocol.
///
/// Organized by category:
/// - `0x0001..0x00FF`: Protocol-level (lookup, registration, heartbeat)
/// - `0x0200..0x02FF`: File exchange
/// - `0x0400..0x04FF`: Screen capture and input
#[repr(u64)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    // ── Protocol (0x00xx) ────────────────────────────────────────
    /// Liveness probe; answered with an empty response.
    Ping = 0x0001,
    /// Resolve the host's well-known service name.
    Lookup = 0x0002,
    /// Present the viewer's identity to the session registry.
    Register = 0x0003,
    /// Periodic keep-alive, never answered.
    Heartbeat = 0x0004,

    // ── File (0x02xx) ────────────────────────────────────────────
    /// Upload a whole file (viewer → host).
    FilePush = 0x0206,
    /// Download a host-selected file (host → viewer).
    FilePull = 0x0207,

    // ── Screen / Input (0x04xx) ──────────────────────────────────
    /// Capture and encode one frame.
    ScreenCapture = 0x0401,
    /// Query the host display width.
    ScreenWidth = 0x0402,
    /// Query the host display height.
    ScreenHeight = 0x0403,
    /// Inject one pointer or keyboard event.
    InputEvent = 0x0404,
}

impl TryFrom<u64> for Command {
    type Error = TetherError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        match value {
            0x0001 => Ok(Command::Ping),
            0x0002 => Ok(Command::Lookup),
            0x0003 => Ok(Command::Register),
            0x0004 => Ok(Command::Heartbeat),

            0x0206 => Ok(Command::FilePush),
            0x0207 => Ok(Command::FilePull),

            0x0401 => Ok(Command::ScreenCapture),
            0x0402 => Ok(Command::ScreenWidth),
            0x0403 => Ok(Command::ScreenHeight),
            0x0404 => Ok(Command::InputEvent),

            _ => Err(TetherError::UnknownVariant {
                type_name: "Command",
                value,
            }),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl Command {
    /// Returns `true` if this command expects a response from the peer.
    pub fn expects_response(&self) -> bool {
        !matches!(self, Command::Heartbeat)
    }
}
