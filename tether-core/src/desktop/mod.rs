//! # Desktop sharing pipeline
//!
//! ```text
//! HOST                                         VIEWER
//! ┌─────────────────────────┐                 ┌──────────────────────────┐
//! │ CaptureSource           │                 │ StreamClient             │
//! │   ↓                     │  ScreenCapture  │   ↓ FrameCodec::decode   │
//! │ CaptureService          │ ◄────────────── │   ↓ fit_frame            │
//! │   ↓ FrameCodec::encode  │ ──────────────► │   ↓ watch channel        │
//! │                         │                 │ renderer                 │
//! │ InputRelay              │   InputEvent    │                          │
//! │   ↓ InputInjector       │ ◄────────────── │ remap_point              │
//! └─────────────────────────┘                 └──────────────────────────┘
//! ```
//!
//! | Module     | Purpose                                            |
//! |------------|----------------------------------------------------|
//! | `types`    | Raw raster and pixel format                        |
//! | `capture`  | Capture source seam and synthetic display          |
//! | `encoder`  | zstd frame codec                                   |
//! | `geometry` | Fit scaling and pointer remapping                  |
//! | `scale`    | Resampling to the drawable area                    |
//! | `input`    | Injector seam and the relay that drives it         |
//! | `service`  | Host-side capture orchestration                    |
//! | `client`   | Viewer-side frame stream                           |

pub mod capture;
pub mod client;
pub mod encoder;
pub mod geometry;
pub mod input;
pub mod scale;
pub mod service;
pub mod types;

// ── Re-exports ───────────────────────────────────────────────────

pub use capture::{CaptureSource, SyntheticCapture};
pub use client::{DisplayFrame, FrameStats, RenderArea, StreamClient, StreamConfig};
pub use encoder::{FrameCodec, ZstdFrameCodec};
pub use geometry::{fit_scale, fit_size, remap_point};
pub use input::{InjectedAction, InputInjector, InputRelay, LogInjector, RecordingInjector};
pub use scale::{fit_frame, resample};
pub use service::CaptureService;
pub use types::{PixelFormat, RawScreenFrame};
