//! High-level protocol payload definitions for the host service.
//!
//! Each sub-module defines the structured request/response payloads for
//! one protocol domain (session, screen, input, file exchange). Payloads
//! are serialized with `serde` + `bincode` and carried inside [`Packet`]
//! bodies.
//!
//! [`Packet`]: crate::packet::Packet

pub mod fault;
pub mod file;
pub mod input;
pub mod screen;
pub mod session;

// Re-export the most commonly used types at the protocol level.
pub use fault::RemoteFault;
pub use file::{FileTransferPayload, PullFileResponse};
pub use input::{InputEvent, KeyAction, KeyEvent, MouseButton, PointerEvent, PointerKind};
pub use screen::{ScreenDimension, ScreenGeometry};
pub use session::{LookupRequest, RegisterRequest};
