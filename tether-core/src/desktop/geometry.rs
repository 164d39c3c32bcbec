//! Coordinate mapping between the viewer's drawable area and the host
//! screen.
//!
//! Frames are scaled to fit the drawable area with the aspect ratio
//! preserved; pointer positions go the other way, from drawable area to
//! host pixels. All functions are pure.

use crate::protocol::screen::ScreenGeometry;

/// Uniform scale factor that fits `source` inside `target` without
/// distortion, i.e. `min(tw / sw, th / sh)`.
///
/// Returns `None` when either geometry has no area.
pub fn fit_scale(source: ScreenGeometry, target: ScreenGeometry) -> Option<f64> {
    if source.is_empty() || target.is_empty() {
        return None;
    }
    let sx = target.width as f64 / source.width as f64;
    let sy = target.height as f64 / source.height as f64;
    Some(sx.min(sy))
}

/// Size of `source` scaled to fit `target`.
///
/// Each side is rounded and kept within `target` and at least one pixel.
pub fn fit_size(source: ScreenGeometry, target: ScreenGeometry) -> Option<ScreenGeometry> {
    let scale = fit_scale(source, target)?;
    let w = scaled(source.width, scale).clamp(1, target.width);
    let h = scaled(source.height, scale).clamp(1, target.height);
    Some(ScreenGeometry::new(w, h))
}

/// Map a point in the capture area to host screen coordinates:
/// `x * host.width / area.width`, rounded to the nearest pixel.
///
/// Returns `None` while the capture area has no size (nothing laid out
/// yet). Points outside the area map outside the host screen; no
/// clamping is applied.
pub fn remap_point(
    x: i32,
    y: i32,
    area: ScreenGeometry,
    host: ScreenGeometry,
) -> Option<(i32, i32)> {
    if area.is_empty() {
        return None;
    }
    let hx = (x as f64 * host.width as f64 / area.width as f64).round();
    let hy = (y as f64 * host.height as f64 / area.height as f64).round();
    Some((hx as i32, hy as i32))
}

fn scaled(side: u32, scale: f64) -> u32 {
    (side as f64 * scale).round() as u32
}
