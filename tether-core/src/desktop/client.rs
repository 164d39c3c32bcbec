//! Viewer-side frame stream.
//!
//! Repeatedly asks the host for a frame, decodes it, fits it to the
//! current drawable area, and publishes the result through a
//! `tokio::sync::watch` channel so the renderer always sees the latest
//! frame without blocking the fetch loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::desktop::encoder::FrameCodec;
use crate::desktop::scale::fit_frame;
use crate::desktop::types::RawScreenFrame;
use crate::error::TetherError;
use crate::protocol::screen::ScreenGeometry;
use crate::rpc::HostService;

// ── RenderArea ───────────────────────────────────────────────────

/// The viewer's drawable area, shared between the UI (which resizes it)
/// and the stream and input paths (which read it).
#[derive(Debug, Clone, Default)]
pub struct RenderArea(Arc<AtomicU64>);

impl RenderArea {
    pub fn new(geometry: ScreenGeometry) -> Self {
        let area = Self::default();
        area.set(geometry);
        area
    }

    pub fn set(&self, geometry: ScreenGeometry) {
        let packed = ((geometry.width as u64) << 32) | geometry.height as u64;
        self.0.store(packed, Ordering::SeqCst);
    }

    pub fn get(&self) -> ScreenGeometry {
        let packed = self.0.load(Ordering::SeqCst);
        ScreenGeometry::new((packed >> 32) as u32, packed as u32)
    }
}

// ── DisplayFrame / FrameStats ────────────────────────────────────

/// A frame ready to draw: already fitted to the render area.
#[derive(Debug, Clone)]
pub struct DisplayFrame {
    /// Sequential number of this frame since the stream started.
    pub sequence: u64,
    /// Dimensions of the frame as captured on the host.
    pub source: ScreenGeometry,
    /// The fitted raster.
    pub frame: RawScreenFrame,
}

/// Stream statistics exposed to the UI.
#[derive(Debug, Clone, Default)]
pub struct FrameStats {
    /// Smoothed frames per second.
    pub fps: f64,
    /// Frames published since start.
    pub total_frames: u64,
    /// Compressed bytes received.
    pub total_bytes: u64,
    /// Empty capture responses (nothing shown).
    pub empty_frames: u64,
    /// Failed iterations (remote, decode, or resample faults).
    pub failures: u64,
    /// Geometry of the last frame as captured.
    pub source: ScreenGeometry,
}

// ── StreamConfig ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default)]
pub struct StreamConfig {
    /// Upper bound on requests per second. `0` polls back to back.
    pub max_fps: u32,
}

impl StreamConfig {
    fn interval(&self) -> Option<Duration> {
        (self.max_fps > 0).then(|| Duration::from_secs_f64(1.0 / self.max_fps as f64))
    }
}

// ── StreamClient ─────────────────────────────────────────────────

/// Pulls frames from a host and publishes them for display.
pub struct StreamClient {
    host: Arc<dyn HostService>,
    codec: Arc<dyn FrameCodec>,
    area: RenderArea,
    config: StreamConfig,
    frame_tx: watch::Sender<Option<Arc<DisplayFrame>>>,
    stats_tx: watch::Sender<FrameStats>,
}

impl StreamClient {
    pub fn new(
        host: Arc<dyn HostService>,
        codec: Arc<dyn FrameCodec>,
        area: RenderArea,
        config: StreamConfig,
    ) -> Self {
        let (frame_tx, _) = watch::channel(None);
        let (stats_tx, _) = watch::channel(FrameStats::default());
        Self {
            host,
            codec,
            area,
            config,
            frame_tx,
            stats_tx,
        }
    }

    /// Latest displayable frame; `None` until the first one arrives.
    pub fn frame_receiver(&self) -> watch::Receiver<Option<Arc<DisplayFrame>>> {
        self.frame_tx.subscribe()
    }

    pub fn stats_receiver(&self) -> watch::Receiver<FrameStats> {
        self.stats_tx.subscribe()
    }

    /// Run the fetch loop until `cancel` fires.
    ///
    /// A failed iteration is logged and the loop carries on; the
    /// previously published frame stays on screen.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = self.config.interval().map(|period| {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });
        let mut last_frame_at: Option<Instant> = None;
        info!(max_fps = self.config.max_fps, "Frame stream started");

        loop {
            match ticker.as_mut() {
                Some(ticker) => {
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = ticker.tick() => {}
                    }
                }
                None => {
                    if cancel.is_cancelled() {
                        break;
                    }
                    tokio::task::yield_now().await;
                }
            }

            let result = tokio::select! {
                _ = cancel.cancelled() => break,
                result = self.poll_once() => result,
            };

            match result {
                Ok(Some(_)) => {
                    let now = Instant::now();
                    if let Some(prev) = last_frame_at.replace(now) {
                        let secs = now.duration_since(prev).as_secs_f64();
                        if secs > 0.0 {
                            self.stats_tx.send_modify(|s| {
                                // Exponential smoothing over recent frames.
                                let instant = 1.0 / secs;
                                s.fps = if s.fps == 0.0 { instant } else { s.fps * 0.9 + instant * 0.1 };
                            });
                        }
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    self.stats_tx.send_modify(|s| s.failures += 1);
                    warn!(error = %e, "Frame update failed");
                }
            }
        }

        info!("Frame stream stopped");
    }

    /// One fetch-decode-fit-publish cycle.
    ///
    /// Returns `Ok(None)` when the host sent an empty frame. While the
    /// render area has no size the frame is published unscaled.
    pub async fn poll_once(&self) -> Result<Option<Arc<DisplayFrame>>, TetherError> {
        let bytes = self.host.capture_frame().await?;
        self.stats_tx.send_modify(|s| s.total_bytes += bytes.len() as u64);

        if bytes.is_empty() {
            self.stats_tx.send_modify(|s| s.empty_frames += 1);
            debug!("Host returned an empty frame");
            return Ok(None);
        }

        let area = self.area.get();
        let codec = Arc::clone(&self.codec);
        let (source, fitted) = tokio::task::spawn_blocking(move || {
            let raw = codec.decode(&bytes)?;
            let fitted = fit_frame(&raw, area)?;
            Ok::<_, TetherError>((raw.geometry(), fitted))
        })
        .await
        .map_err(|e| TetherError::Other(format!("frame worker failed: {e}")))??;

        let mut sequence = 0;
        self.stats_tx.send_modify(|s| {
            s.total_frames += 1;
            s.source = source;
            sequence = s.total_frames;
        });

        let frame = Arc::new(DisplayFrame {
            sequence,
            source,
            frame: fitted,
        });
        self.frame_tx.send_replace(Some(Arc::clone(&frame)));
        Ok(Some(frame))
    }
}
