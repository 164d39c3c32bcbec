//! Frame codec: raw raster ⇄ compressed bytes.
//!
//! The host encodes every capture as a full frame; the viewer decodes it
//! back into a [`RawScreenFrame`]. The compressed stream is self
//! describing:
//!
//! ```text
//! zstd( width: u32 LE | height: u32 LE | format: u32 LE | packed rows )
//! ```
//!
//! Encoding is deterministic for a fixed compression level, so an
//! unchanged display yields byte-identical frames.

use std::io::Read;

use crate::desktop::types::{PixelFormat, RawScreenFrame};
use crate::error::TetherError;

/// Length of the raster header inside the compressed stream.
pub const FRAME_HEADER_LENGTH: usize = 12;

/// Largest raster the decoder will inflate.
pub const MAX_DECODED_FRAME: usize = 512 * 1024 * 1024;

/// Encodes rasters for the wire and decodes them back.
pub trait FrameCodec: Send + Sync {
    fn encode(&self, frame: &RawScreenFrame) -> Result<Vec<u8>, TetherError>;
    fn decode(&self, bytes: &[u8]) -> Result<RawScreenFrame, TetherError>;
}

// ── ZstdFrameCodec ───────────────────────────────────────────────

/// Lossless zstd codec over tightly packed rows.
#[derive(Debug, Clone, Copy)]
pub struct ZstdFrameCodec {
    /// zstd compression level (1 = fast, 19 = smallest).
    compression_level: i32,
}

impl ZstdFrameCodec {
    pub const DEFAULT_LEVEL: i32 = 1;

    pub fn new(compression_level: i32) -> Self {
        Self { compression_level }
    }

    pub fn compression_level(&self) -> i32 {
        self.compression_level
    }
}

impl Default for ZstdFrameCodec {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LEVEL)
    }
}

impl FrameCodec for ZstdFrameCodec {
    fn encode(&self, frame: &RawScreenFrame) -> Result<Vec<u8>, TetherError> {
        let pixels = frame.packed_data();
        let mut raw = Vec::with_capacity(FRAME_HEADER_LENGTH + pixels.len());
        raw.extend_from_slice(&frame.width.to_le_bytes());
        raw.extend_from_slice(&frame.height.to_le_bytes());
        raw.extend_from_slice(&(frame.format as u32).to_le_bytes());
        raw.extend_from_slice(&pixels);

        zstd::encode_all(raw.as_slice(), self.compression_level)
            .map_err(|e| TetherError::Codec(format!("zstd encode failed: {e}")))
    }

    fn decode(&self, bytes: &[u8]) -> Result<RawScreenFrame, TetherError> {
        let mut decoder = zstd::stream::read::Decoder::new(bytes)
            .map_err(|e| TetherError::Codec(format!("zstd decode failed: {e}")))?;

        let mut header = [0u8; FRAME_HEADER_LENGTH];
        decoder
            .read_exact(&mut header)
            .map_err(|e| TetherError::Codec(format!("truncated frame header: {e}")))?;

        let width = read_u32(&header, 0);
        let height = read_u32(&header, 4);
        let format = PixelFormat::try_from(read_u32(&header, 8))?;

        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(format.bytes_per_pixel()))
            .filter(|&n| n <= MAX_DECODED_FRAME)
            .ok_or_else(|| {
                TetherError::Codec(format!("frame {width}x{height} exceeds decode limit"))
            })?;

        // Read one byte past the expected size to detect trailing data.
        let mut pixels = Vec::with_capacity(expected);
        decoder
            .take(expected as u64 + 1)
            .read_to_end(&mut pixels)
            .map_err(|e| TetherError::Codec(format!("zstd decode failed: {e}")))?;

        if pixels.len() != expected {
            return Err(TetherError::Codec(format!(
                "frame {width}x{height} carries {} pixel bytes, expected {expected}",
                pixels.len()
            )));
        }

        RawScreenFrame::packed(width, height, format, pixels)
    }
}

fn read_u32(buf: &[u8], offset: usize) -> u32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&buf[offset..offset + 4]);
    u32::from_le_bytes(bytes)
}

// ── Tests ────────────────────────────────────────────────────────
