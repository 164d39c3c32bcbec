//! Local input → host input events.
//!
//! Local pointer positions are relative to the drawable area. Before
//! forwarding they are remapped to host screen pixels using the current
//! area size and a fresh host geometry query. One event is forwarded at
//! a time, in the order it was captured.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use tether_core::desktop::{RenderArea, remap_point};
use tether_core::protocol::{InputEvent, MouseButton, PointerKind, ScreenGeometry};
use tether_core::{HostService, TetherError};

use crate::config::InputConfig;

/// An input event as captured on the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalEvent {
    Move { x: i32, y: i32 },
    /// Motion with a button held; forwarded as a plain move.
    Drag { x: i32, y: i32, button: MouseButton },
    Press { x: i32, y: i32, button: MouseButton },
    Release { x: i32, y: i32, button: MouseButton },
    Click { x: i32, y: i32, button: MouseButton },
    Enter { x: i32, y: i32 },
    Exit { x: i32, y: i32 },
    KeyDown(u32),
    KeyUp(u32),
}

impl LocalEvent {
    fn pointer(&self) -> Option<(PointerKind, i32, i32, MouseButton)> {
        use LocalEvent::*;
        match *self {
            Move { x, y } | Drag { x, y, .. } => Some((PointerKind::Move, x, y, MouseButton::None)),
            Press { x, y, button } => Some((PointerKind::Press, x, y, button)),
            Release { x, y, button } => Some((PointerKind::Release, x, y, button)),
            Click { x, y, button } => Some((PointerKind::Click, x, y, button)),
            Enter { x, y } => Some((PointerKind::Enter, x, y, MouseButton::None)),
            Exit { x, y } => Some((PointerKind::Exit, x, y, MouseButton::None)),
            KeyDown(_) | KeyUp(_) => None,
        }
    }

    pub fn is_pointer(&self) -> bool {
        self.pointer().is_some()
    }
}

/// Build the event to forward, or `None` when it cannot be mapped yet
/// (the drawable area has no size).
pub fn translate(event: LocalEvent, area: ScreenGeometry, host: ScreenGeometry) -> Option<InputEvent> {
    match event {
        LocalEvent::KeyDown(code) => Some(InputEvent::key_press(code)),
        LocalEvent::KeyUp(code) => Some(InputEvent::key_release(code)),
        _ => {
            let (kind, x, y, button) = event.pointer()?;
            let (hx, hy) = remap_point(x, y, area, host)?;
            Some(InputEvent::pointer(kind, hx, hy, button))
        }
    }
}

// ── InputForwarder ───────────────────────────────────────────────

/// Queue of local events, drained in order by a background task.
#[derive(Debug, Clone)]
pub struct InputForwarder {
    tx: mpsc::Sender<LocalEvent>,
}

impl InputForwarder {
    pub fn spawn(
        host: Arc<dyn HostService>,
        area: RenderArea,
        config: InputConfig,
    ) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(256);
        let task = tokio::spawn(forward_events(rx, host, area, config));
        (Self { tx }, task)
    }

    /// Queue an event. Fails once the forwarder has stopped.
    pub async fn submit(&self, event: LocalEvent) -> Result<(), TetherError> {
        self.tx.send(event).await?;
        Ok(())
    }
}

async fn forward_events(
    mut rx: mpsc::Receiver<LocalEvent>,
    host: Arc<dyn HostService>,
    area: RenderArea,
    config: InputConfig,
) {
    while let Some(event) = rx.recv().await {
        let enabled = if event.is_pointer() {
            config.capture_mouse
        } else {
            config.capture_keyboard
        };
        if !enabled {
            continue;
        }

        if let Err(e) = forward_one(host.as_ref(), &area, event).await {
            warn!(?event, error = %e, "Input event not delivered");
        }
    }
    debug!("Input forwarder stopped");
}

async fn forward_one(
    host: &dyn HostService,
    area: &RenderArea,
    event: LocalEvent,
) -> Result<(), TetherError> {
    let host_geometry = if event.is_pointer() {
        host.screen_geometry().await?
    } else {
        ScreenGeometry::default()
    };

    match translate(event, area.get(), host_geometry) {
        Some(input) => host.send_input(input).await,
        None => {
            debug!(?event, "Drawable area has no size; event skipped");
            Ok(())
        }
    }
}
