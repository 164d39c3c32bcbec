//! Input injection on the host.
//!
//! OS-level injection is a platform capability; [`InputInjector`] is the
//! seam for it. [`InputRelay`] turns forwarded [`InputEvent`]s into
//! injector calls.

use std::sync::Mutex;

use tracing::{debug, info, warn};

use crate::error::TetherError;
use crate::protocol::input::{InputEvent, KeyAction, MouseButton, PointerEvent, PointerKind};

// ── InputInjector ────────────────────────────────────────────────

/// Injects pointer and keyboard actions into the host's input stream.
///
/// Coordinates are absolute host screen pixels. Key codes are platform
/// key codes, passed through untouched.
pub trait InputInjector: Send + Sync {
    fn move_pointer(&self, x: i32, y: i32) -> Result<(), TetherError>;
    fn press_button(&self, button: MouseButton) -> Result<(), TetherError>;
    fn release_button(&self, button: MouseButton) -> Result<(), TetherError>;
    fn press_key(&self, code: u32) -> Result<(), TetherError>;
    fn release_key(&self, code: u32) -> Result<(), TetherError>;
}

// ── InputRelay ───────────────────────────────────────────────────

/// Replays forwarded input events through an [`InputInjector`].
pub struct InputRelay {
    injector: Box<dyn InputInjector>,
}

impl InputRelay {
    pub fn new(injector: impl InputInjector + 'static) -> Self {
        Self {
            injector: Box::new(injector),
        }
    }

    /// Apply one event.
    ///
    /// Pointer events always move the pointer first. Button actions with
    /// no actionable button are dropped after the move.
    pub fn apply(&self, event: &InputEvent) -> Result<(), TetherError> {
        match event {
            InputEvent::Pointer(pointer) => self.apply_pointer(pointer),
            InputEvent::Key(key) => match key.action {
                KeyAction::Press => self.injector.press_key(key.code),
                KeyAction::Release => self.injector.release_key(key.code),
            },
        }
    }

    fn apply_pointer(&self, event: &PointerEvent) -> Result<(), TetherError> {
        self.injector.move_pointer(event.x, event.y)?;

        match event.kind {
            PointerKind::Move | PointerKind::Enter | PointerKind::Exit => Ok(()),
            PointerKind::Press | PointerKind::Release | PointerKind::Click => {
                if !is_actionable(event.button) {
                    warn!(
                        kind = ?event.kind,
                        button = ?event.button,
                        "Pointer action without a supported button; dropped"
                    );
                    return Ok(());
                }
                match event.kind {
                    PointerKind::Press => self.injector.press_button(event.button),
                    PointerKind::Release => self.injector.release_button(event.button),
                    _ => {
                        self.injector.press_button(event.button)?;
                        self.injector.release_button(event.button)
                    }
                }
            }
        }
    }
}

fn is_actionable(button: MouseButton) -> bool {
    matches!(
        button,
        MouseButton::Left | MouseButton::Middle | MouseButton::Right
    )
}

// ── LogInjector ──────────────────────────────────────────────────

/// Injector that only logs. Used when the host runs without an OS
/// input backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogInjector;

impl InputInjector for LogInjector {
    fn move_pointer(&self, x: i32, y: i32) -> Result<(), TetherError> {
        debug!(x, y, "Pointer move");
        Ok(())
    }

    fn press_button(&self, button: MouseButton) -> Result<(), TetherError> {
        info!(?button, "Button press");
        Ok(())
    }

    fn release_button(&self, button: MouseButton) -> Result<(), TetherError> {
        info!(?button, "Button release");
        Ok(())
    }

    fn press_key(&self, code: u32) -> Result<(), TetherError> {
        info!(code, "Key press");
        Ok(())
    }

    fn release_key(&self, code: u32) -> Result<(), TetherError> {
        info!(code, "Key release");
        Ok(())
    }
}

// ── RecordingInjector ────────────────────────────────────────────

/// One injected action, as seen by [`RecordingInjector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectedAction {
    Move(i32, i32),
    Press(MouseButton),
    Release(MouseButton),
    KeyDown(u32),
    KeyUp(u32),
}

/// Injector that records every action in order.
#[derive(Debug, Default)]
pub struct RecordingInjector {
    actions: Mutex<Vec<InjectedAction>>,
}

impl RecordingInjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain recorded actions.
    pub fn take(&self) -> Vec<InjectedAction> {
        self.actions
            .lock()
            .map(|mut actions| std::mem::take(&mut *actions))
            .unwrap_or_default()
    }

    fn record(&self, action: InjectedAction) -> Result<(), TetherError> {
        self.actions
            .lock()
            .map_err(|_| TetherError::Injection("recorder lock poisoned".into()))?
            .push(action);
        Ok(())
    }
}

impl InputInjector for RecordingInjector {
    fn move_pointer(&self, x: i32, y: i32) -> Result<(), TetherError> {
        self.record(InjectedAction::Move(x, y))
    }

    fn press_button(&self, button: MouseButton) -> Result<(), TetherError> {
        self.record(InjectedAction::Press(button))
    }

    fn release_button(&self, button: MouseButton) -> Result<(), TetherError> {
        self.record(InjectedAction::Release(button))
    }

    fn press_key(&self, code: u32) -> Result<(), TetherError> {
        self.record(InjectedAction::KeyDown(code))
    }

    fn release_key(&self, code: u32) -> Result<(), TetherError> {
        self.record(InjectedAction::KeyUp(code))
    }
}

impl<T: InputInjector + ?Sized> InputInjector for std::sync::Arc<T> {
    fn move_pointer(&self, x: i32, y: i32) -> Result<(), TetherError> {
        (**self).move_pointer(x, y)
    }

    fn press_button(&self, button: MouseButton) -> Result<(), TetherError> {
        (**self).press_button(button)
    }

    fn release_button(&self, button: MouseButton) -> Result<(), TetherError> {
        (**self).release_button(button)
    }

    fn press_key(&self, code: u32) -> Result<(), TetherError> {
        (**self).press_key(code)
    }

    fn release_key(&self, code: u32) -> Result<(), TetherError> {
        (**self).release_key(code)
    }
}
