//! Display renderer: draws published frames.
//!
//! The native window and blitting live outside this crate. The
//! [`Renderer`] trait is where a windowing backend attaches; the viewer
//! ships [`HeadlessRenderer`], which tracks what would be on screen.

use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use tether_core::desktop::DisplayFrame;
use tether_core::protocol::ScreenGeometry;

/// Draws fitted frames.
pub trait Renderer: Send {
    fn render(&mut self, frame: &DisplayFrame) -> Result<(), String>;
}

/// Renderer without a window. Keeps the last frame's metadata.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    frames: u64,
    last_sequence: Option<u64>,
    last_size: ScreenGeometry,
}

impl HeadlessRenderer {
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn last_sequence(&self) -> Option<u64> {
        self.last_sequence
    }

    pub fn last_size(&self) -> ScreenGeometry {
        self.last_size
    }
}

impl Renderer for HeadlessRenderer {
    fn render(&mut self, frame: &DisplayFrame) -> Result<(), String> {
        let expected = frame.frame.stride as usize * frame.frame.height as usize;
        if frame.frame.data.len() < expected {
            return Err(format!(
                "frame buffer too small: {} < {expected}",
                frame.frame.data.len()
            ));
        }

        self.frames += 1;
        self.last_sequence = Some(frame.sequence);
        self.last_size = frame.frame.geometry();
        debug!(
            sequence = frame.sequence,
            size = %self.last_size,
            source = %frame.source,
            "Frame drawn"
        );
        Ok(())
    }
}

/// Draw each newly published frame until `cancel` fires or the stream
/// goes away. Returns the renderer.
pub async fn run_renderer<R: Renderer>(
    mut frames: watch::Receiver<Option<Arc<DisplayFrame>>>,
    mut renderer: R,
    cancel: CancellationToken,
) -> R {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            changed = frames.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }

        let frame = frames.borrow_and_update().clone();
        if let Some(frame) = frame
            && let Err(e) = renderer.render(&frame)
        {
            warn!("render error: {e}");
        }
    }
    renderer
}
