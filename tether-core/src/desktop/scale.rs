//! Raster resampling for display.

use image::imageops::{self, FilterType};
use image::{ImageBuffer, Rgb, Rgba};

use crate::desktop::geometry::fit_size;
use crate::desktop::types::RawScreenFrame;
use crate::error::TetherError;
use crate::protocol::screen::ScreenGeometry;

/// Resample `frame` to exactly `size` with a smooth (bilinear) filter.
///
/// The pixel format is kept; channels are filtered independently so
/// BGRA data needs no swizzle.
pub fn resample(frame: &RawScreenFrame, size: ScreenGeometry) -> Result<RawScreenFrame, TetherError> {
    if size.is_empty() {
        return Err(TetherError::Codec(format!("cannot resample to {size}")));
    }
    if frame.geometry() == size && frame.is_packed() {
        return Ok(frame.clone());
    }

    let (w, h) = (frame.width, frame.height);
    let data = match frame.format.bytes_per_pixel() {
        4 => {
            let img = ImageBuffer::<Rgba<u8>, _>::from_raw(w, h, frame.packed_data())
                .ok_or_else(|| buffer_mismatch(frame))?;
            imageops::resize(&img, size.width, size.height, FilterType::Triangle).into_raw()
        }
        3 => {
            let img = ImageBuffer::<Rgb<u8>, _>::from_raw(w, h, frame.packed_data())
                .ok_or_else(|| buffer_mismatch(frame))?;
            imageops::resize(&img, size.width, size.height, FilterType::Triangle).into_raw()
        }
        bpp => {
            return Err(TetherError::Codec(format!(
                "unsupported pixel size {bpp} for resampling"
            )));
        }
    };

    RawScreenFrame::packed(size.width, size.height, frame.format, data)
}

/// Scale `frame` to fit inside `area`, preserving its aspect ratio.
///
/// The fit is computed from the frame's own dimensions. When either side
/// has no size there is no scale and the frame is returned as is.
pub fn fit_frame(frame: &RawScreenFrame, area: ScreenGeometry) -> Result<RawScreenFrame, TetherError> {
    match fit_size(frame.geometry(), area) {
        Some(size) => resample(frame, size),
        None => Ok(frame.clone()),
    }
}

fn buffer_mismatch(frame: &RawScreenFrame) -> TetherError {
    TetherError::Codec(format!(
        "pixel buffer of {} bytes does not match {}",
        frame.data.len(),
        frame.geometry()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::desktop::types::PixelFormat;

    fn solid(w: u32, h: u32, px: [u8; 4]) -> RawScreenFrame {
        let data = px.iter().copied().cycle().take((w * h * 4) as usize).collect();
        RawScreenFrame::packed(w, h, PixelFormat::Bgra8, data).unwrap()
    }

    #[test]
    fn fit_frame_letterboxes_into_area() {
        let frame = solid(192, 108, [10, 20, 30, 255]);
        let fitted = fit_frame(&frame, ScreenGeometry::new(80, 60)).unwrap();
        assert_eq!(fitted.geometry(), ScreenGeometry::new(80, 45));
        assert_eq!(fitted.data.len(), 80 * 45 * 4);
    }

    #[test]
    fn solid_colour_survives_filtering() {
        let frame = solid(64, 64, [10, 20, 30, 255]);
        let small = resample(&frame, ScreenGeometry::new(16, 16)).unwrap();
        assert!(small.data.chunks(4).all(|px| px == [10, 20, 30, 255]));
    }

    #[test]
    fn rgb_frames_are_supported() {
        let frame = RawScreenFrame::packed(4, 2, PixelFormat::Rgb8, vec![7; 24]).unwrap();
        let out = resample(&frame, ScreenGeometry::new(2, 1)).unwrap();
        assert_eq!(out.format, PixelFormat::Rgb8);
        assert_eq!(out.data, vec![7; 6]);
    }

    #[test]
    fn empty_target_leaves_frame_unscaled() {
        let frame = solid(4, 4, [0; 4]);
        let out = fit_frame(&frame, ScreenGeometry::new(0, 10)).unwrap();
        assert_eq!(out, frame);
    }

    #[test]
    fn resample_to_nothing_is_rejected() {
        let frame = solid(4, 4, [0; 4]);
        assert!(resample(&frame, ScreenGeometry::new(0, 10)).is_err());
    }
}
