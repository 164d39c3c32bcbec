//! Host-side capture service.
//!
//! Answers capture requests with an encoded snapshot of the host display
//! and reports the display geometry. Capture is gated on the session
//! link: an unlinked session gets the last good frame, or nothing.
//!
//! Capture and encoding are CPU bound; async callers should run them on
//! the blocking pool.

use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use crate::desktop::capture::CaptureSource;
use crate::desktop::encoder::FrameCodec;
use crate::error::TetherError;
use crate::protocol::screen::ScreenGeometry;
use crate::state::Session;

/// Screen capture orchestrator for one host.
pub struct CaptureService {
    session: Arc<Session>,
    source: Mutex<Box<dyn CaptureSource>>,
    codec: Arc<dyn FrameCodec>,
    /// Most recent successfully encoded frame.
    last_frame: Mutex<Option<Vec<u8>>>,
}

impl CaptureService {
    pub fn new(
        session: Arc<Session>,
        source: impl CaptureSource + 'static,
        codec: Arc<dyn FrameCodec>,
    ) -> Self {
        Self {
            session,
            source: Mutex::new(Box::new(source)),
            codec,
            last_frame: Mutex::new(None),
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Capture and encode one frame.
    ///
    /// - Linked: a fresh full-frame snapshot. A capture or encode failure
    ///   is returned as an error and the previous frame is kept.
    /// - Unlinked: the last good frame, or empty bytes if there is none.
    pub fn capture_frame(&self) -> Result<Vec<u8>, TetherError> {
        if !self.session.is_linked() {
            warn!(session = %self.session.id(), "Capture requested on an unlinked session");
            return Ok(self.last_frame()?.unwrap_or_default());
        }

        let frame = self.lock_source()?.capture()?;
        let encoded = self.codec.encode(&frame)?;
        debug!(
            width = frame.width,
            height = frame.height,
            bytes = encoded.len(),
            "Frame captured"
        );

        *self
            .last_frame
            .lock()
            .map_err(|_| TetherError::Capture("frame cache lock poisoned".into()))? =
            Some(encoded.clone());
        Ok(encoded)
    }

    /// Current host display resolution, queried fresh each call.
    pub fn geometry(&self) -> Result<ScreenGeometry, TetherError> {
        self.lock_source()?.geometry()
    }

    pub fn screen_width(&self) -> Result<u32, TetherError> {
        Ok(self.geometry()?.width)
    }

    pub fn screen_height(&self) -> Result<u32, TetherError> {
        Ok(self.geometry()?.height)
    }

    fn last_frame(&self) -> Result<Option<Vec<u8>>, TetherError> {
        self.last_frame
            .lock()
            .map(|cached| cached.clone())
            .map_err(|_| TetherError::Capture("frame cache lock poisoned".into()))
    }

    fn lock_source(&self) -> Result<std::sync::MutexGuard<'_, Box<dyn CaptureSource>>, TetherError> {
        self.source
            .lock()
            .map_err(|_| TetherError::Capture("capture source lock poisoned".into()))
    }
}
