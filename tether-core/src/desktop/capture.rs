//! Screen capture sources.
//!
//! Native screen grabbing is a platform capability outside this crate;
//! [`CaptureSource`] is the seam a backend plugs into. The crate ships
//! [`SyntheticCapture`], a deterministic test-pattern display used by the
//! host in headless deployments and by tests.

use std::sync::{Arc, Mutex};

use crate::error::TetherError;
use crate::desktop::types::{PixelFormat, RawScreenFrame};
use crate::protocol::screen::ScreenGeometry;

/// Produces snapshots of the host display.
///
/// Acquired once at host startup and held for the process lifetime.
pub trait CaptureSource: Send {
    /// Current display resolution.
    fn geometry(&self) -> Result<ScreenGeometry, TetherError>;

    /// Grab one full snapshot of the display.
    fn capture(&mut self) -> Result<RawScreenFrame, TetherError>;
}

// ── SyntheticCapture ─────────────────────────────────────────────

#[derive(Debug)]
struct SyntheticDisplay {
    geometry: ScreenGeometry,
    scene: u8,
}

/// Test-pattern display whose content only changes when told to.
///
/// Clones share the same display, so a test (or operator command) can
/// resize or repaint it while the host holds the capture source.
#[derive(Debug, Clone)]
pub struct SyntheticCapture {
    display: Arc<Mutex<SyntheticDisplay>>,
}

impl SyntheticCapture {
    pub fn new(geometry: ScreenGeometry) -> Self {
        Self {
            display: Arc::new(Mutex::new(SyntheticDisplay { geometry, scene: 0 })),
        }
    }

    /// Change the simulated resolution.
    pub fn set_geometry(&self, geometry: ScreenGeometry) {
        if let Ok(mut display) = self.display.lock() {
            display.geometry = geometry;
        }
    }

    /// Change what is on screen.
    pub fn repaint(&self) {
        if let Ok(mut display) = self.display.lock() {
            display.scene = display.scene.wrapping_add(1);
        }
    }

    fn snapshot(&self) -> Result<(ScreenGeometry, u8), TetherError> {
        let display = self
            .display
            .lock()
            .map_err(|_| TetherError::Capture("synthetic display lock poisoned".into()))?;
        Ok((display.geometry, display.scene))
    }
}

impl CaptureSource for SyntheticCapture {
    fn geometry(&self) -> Result<ScreenGeometry, TetherError> {
        Ok(self.snapshot()?.0)
    }

    fn capture(&mut self) -> Result<RawScreenFrame, TetherError> {
        let (geometry, scene) = self.snapshot()?;
        if geometry.is_empty() {
            return Err(TetherError::Capture(format!(
                "display has no area ({geometry})"
            )));
        }

        let (w, h) = (geometry.width as usize, geometry.height as usize);
        let mut data = Vec::with_capacity(w * h * 4);
        for y in 0..h {
            for x in 0..w {
                // BGRA gradient with a scene-dependent tint.
                data.push((x * 255 / w.max(1)) as u8);
                data.push((y * 255 / h.max(1)) as u8);
                data.push(scene.wrapping_mul(37));
                data.push(0xFF);
            }
        }

        RawScreenFrame::packed(geometry.width, geometry.height, PixelFormat::Bgra8, data)
    }
}
