//! Shared raster types for the capture/display pipeline.
//!
//! These are **internal** frame representations used between pipeline
//! stages. The wire only ever carries the compressed bytes produced by a
//! [`FrameCodec`](crate::desktop::encoder::FrameCodec).

use crate::error::TetherError;
use crate::protocol::screen::ScreenGeometry;

// ── PixelFormat ──────────────────────────────────────────────────

/// Pixel layout for raw frames.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 4 bytes per pixel: Blue, Green, Red, Alpha.
    Bgra8 = 1,
    /// 4 bytes per pixel: Red, Green, Blue, Alpha.
    Rgba8 = 2,
    /// 3 bytes per pixel: Red, Green, Blue.
    Rgb8 = 3,
}

impl PixelFormat {
    /// Bytes consumed by a single pixel in this format.
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Bgra8 | PixelFormat::Rgba8 => 4,
            PixelFormat::Rgb8 => 3,
        }
    }
}

impl TryFrom<u32> for PixelFormat {
    type Error = TetherError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(PixelFormat::Bgra8),
            2 => Ok(PixelFormat::Rgba8),
            3 => Ok(PixelFormat::Rgb8),
            _ => Err(TetherError::UnknownVariant {
                type_name: "PixelFormat",
                value: value as u64,
            }),
        }
    }
}

// ── RawScreenFrame ───────────────────────────────────────────────

/// An uncompressed raster.
///
/// The `data` buffer holds `height` rows of `stride` bytes each.
/// `stride` may be larger than `width * bytes_per_pixel` when the
/// capture backend pads rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawScreenFrame {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Row pitch in **bytes** (may exceed `width * bpp`).
    pub stride: u32,
    /// Pixel layout.
    pub format: PixelFormat,
    /// Raw pixel data: `stride * height` bytes.
    pub data: Vec<u8>,
}

impl RawScreenFrame {
    /// Wrap tightly packed rows, checking the buffer length.
    pub fn packed(
        width: u32,
        height: u32,
        format: PixelFormat,
        data: Vec<u8>,
    ) -> Result<Self, TetherError> {
        let stride = width as usize * format.bytes_per_pixel();
        let expected = stride * height as usize;
        if data.len() != expected {
            return Err(TetherError::InvalidPacketLength {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            stride: stride as u32,
            format,
            data,
        })
    }

    pub fn geometry(&self) -> ScreenGeometry {
        ScreenGeometry::new(self.width, self.height)
    }

    /// Bytes of one row without padding.
    pub fn row_len(&self) -> usize {
        self.width as usize * self.format.bytes_per_pixel()
    }

    /// Returns a row slice (including possible padding bytes).
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.stride as usize;
        let end = start + self.stride as usize;
        &self.data[start..end]
    }

    /// `true` when rows carry no padding.
    pub fn is_packed(&self) -> bool {
        self.stride as usize == self.row_len()
    }

    /// Copy of the pixel data with row padding stripped.
    pub fn packed_data(&self) -> Vec<u8> {
        if self.is_packed() {
            return self.data.clone();
        }
        let row_len = self.row_len();
        let mut out = Vec::with_capacity(row_len * self.height as usize);
        for y in 0..self.height {
            out.extend_from_slice(&self.row(y)[..row_len]);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_checks_length() {
        assert!(RawScreenFrame::packed(2, 2, PixelFormat::Rgb8, vec![0; 12]).is_ok());
        assert!(RawScreenFrame::packed(2, 2, PixelFormat::Rgb8, vec![0; 11]).is_err());
    }

    #[test]
    fn packed_data_strips_padding() {
        // 2×2 RGB with one byte of padding per row.
        let frame = RawScreenFrame {
            width: 2,
            height: 2,
            stride: 7,
            format: PixelFormat::Rgb8,
            data: vec![1, 2, 3, 4, 5, 6, 0xEE, 7, 8, 9, 10, 11, 12, 0xEE],
        };
        assert!(!frame.is_packed());
        assert_eq!(frame.packed_data(), vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]);
    }

    #[test]
    fn pixel_format_discriminants() {
        for fmt in [PixelFormat::Bgra8, PixelFormat::Rgba8, PixelFormat::Rgb8] {
            assert_eq!(PixelFormat::try_from(fmt as u32).unwrap(), fmt);
        }
        assert!(PixelFormat::try_from(9).is_err());
    }
}
