use kurbo::Point;

use crate::{
    foundation::error::{DrapeError, DrapeResult},
    geometry::homography::Homography,
    raster::buffer::{ChannelLayout, RasterBuffer},
    raster::sample::{Border, sample_bilinear, store_straight},
};

/// The logo's own corners `(0,0), (w,0), (w,h), (0,h)`.
pub fn logo_corners(width: u32, height: u32) -> [Point; 4] {
    let (w, h) = (f64::from(width), f64::from(height));
    [
        Point::new(0.0, 0.0),
        Point::new(w, 0.0),
        Point::new(w, h),
        Point::new(0.0, h),
    ]
}

/// Project `logo` so its corners land on `corners` (TL, TR, BR, BL in the logo's local frame).
///
/// Color and alpha are resampled together through the inverse homography. The output keeps the
/// logo's size; pixels the projected quad does not cover are fully transparent.
pub fn perspective_warp(logo: &RasterBuffer, corners: &[Point; 4]) -> DrapeResult<RasterBuffer> {
    let (w, h) = logo.dimensions();
    let forward = Homography::from_quads(&logo_corners(w, h), corners)?;
    let inverse = forward
        .inverse()
        .ok_or_else(|| DrapeError::degenerate("perspective transform is not invertible"))?;

    let mut out = vec![0u8; (w as usize) * (h as usize) * 4];
    for y in 0..h {
        for x in 0..w {
            let Some(src) = inverse.apply(Point::new(f64::from(x), f64::from(y))) else {
                continue;
            };
            let px = sample_bilinear(logo, src.x, src.y, Border::Transparent);
            let i = ((y as usize) * (w as usize) + x as usize) * 4;
            store_straight(&mut out[i..i + 4], px);
        }
    }
    RasterBuffer::new(w, h, ChannelLayout::Rgba, out)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/perspective.rs"]
mod tests;
