//! Fabric displacement: a blurred luminance field of the garment nudges where each logo pixel
//! is sampled, so prints bend along folds and weave.

use crate::{
    foundation::error::{DrapeError, DrapeResult},
    raster::blur::{blur_plane, sigma_for_radius},
    raster::buffer::{ChannelLayout, RasterBuffer},
    raster::plane::Plane,
    raster::sample::{Border, sample_bilinear, store_straight},
};

/// Smoothed luminance of `region` in `[0, 1]`.
pub fn displacement_map(region: &RasterBuffer, blur_radius: u32) -> DrapeResult<Plane> {
    let blurred = blur_plane(&region.luma(), blur_radius, sigma_for_radius(blur_radius))?;
    Ok(blurred.map(|v| (v / 255.0).clamp(0.0, 1.0)))
}

/// Resample `logo` through the displacement field of the same-sized `region`.
///
/// Each output pixel `(i, j)` samples the logo at `(i + s, j + s)` with
/// `s = (map(i, j) - 0.5) * intensity`, bilinear with reflect-101 borders. Alpha travels through
/// the same map as color, so the printed silhouette bends with the fabric. Output is straight
/// RGBA of the logo's size.
pub fn displace(
    logo: &RasterBuffer,
    region: &RasterBuffer,
    intensity: f32,
    blur_radius: u32,
) -> DrapeResult<RasterBuffer> {
    if !intensity.is_finite() || intensity < 0.0 {
        return Err(DrapeError::validation(
            "displacement intensity must be finite and >= 0",
        ));
    }
    if region.dimensions() != logo.dimensions() {
        return Err(DrapeError::invalid_dimension(format!(
            "displacement region {:?} does not match logo {:?}",
            region.dimensions(),
            logo.dimensions()
        )));
    }
    if intensity == 0.0 {
        return Ok(logo.to_rgba());
    }

    let map = displacement_map(region, blur_radius)?;
    let (w, h) = logo.dimensions();
    let mut out = vec![0u8; (w as usize) * (h as usize) * 4];
    for y in 0..h {
        for x in 0..w {
            let shift = f64::from((map.get(x, y) - 0.5) * intensity);
            let px = sample_bilinear(
                logo,
                f64::from(x) + shift,
                f64::from(y) + shift,
                Border::Reflect,
            );
            let i = ((y as usize) * (w as usize) + x as usize) * 4;
            store_straight(&mut out[i..i + 4], px);
        }
    }
    RasterBuffer::new(w, h, ChannelLayout::Rgba, out)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/displacement.rs"]
mod tests;
