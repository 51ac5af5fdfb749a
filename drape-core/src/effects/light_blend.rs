use crate::{
    foundation::error::{DrapeError, DrapeResult},
    foundation::math::round_to_u8,
    raster::blur::{blur_plane, sigma_for_radius},
    raster::buffer::RasterBuffer,
    raster::plane::Plane,
};

/// Where the light map is multiplied into the logo.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightBlendMode {
    /// Every pixel.
    #[default]
    Unconditional,
    /// Only pixels whose light value exceeds the configured threshold; others keep their color.
    Thresholded,
}

/// Min/max-normalized, blurred luminance of `region`. A flat region yields a uniform 1.0 map.
pub fn light_map(region: &RasterBuffer, blur_radius: u32) -> DrapeResult<Plane> {
    let luma = region.luma();
    let normalized = luma
        .normalized_min_max()
        .unwrap_or_else(|| Plane::uniform(luma.width(), luma.height(), 1.0));
    blur_plane(&normalized, blur_radius, sigma_for_radius(blur_radius))
}

/// Shade `logo` with the fabric under it: `c * (1 - k) + c * light * k` per color channel.
///
/// `region` is the base crop under the logo and must match its size. Alpha and channel layout
/// are preserved.
pub fn light_blend(
    logo: &RasterBuffer,
    region: &RasterBuffer,
    intensity: f32,
    mode: LightBlendMode,
    threshold: f32,
    blur_radius: u32,
) -> DrapeResult<RasterBuffer> {
    if !(0.0..=1.0).contains(&intensity) {
        return Err(DrapeError::validation(
            "light blend intensity must be within [0, 1]",
        ));
    }
    if region.dimensions() != logo.dimensions() {
        return Err(DrapeError::invalid_dimension(format!(
            "light blend region {:?} does not match logo {:?}",
            region.dimensions(),
            logo.dimensions()
        )));
    }

    let map = light_map(region, blur_radius)?;
    let mut out = logo.clone();
    let channels = out.channels();
    for (px, &light) in out.data_mut().chunks_exact_mut(channels).zip(map.data()) {
        if mode == LightBlendMode::Thresholded && light <= threshold {
            continue;
        }
        let gain = (1.0 - intensity) + light * intensity;
        for c in &mut px[..3] {
            *c = round_to_u8(f32::from(*c) * gain);
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/light_blend.rs"]
mod tests;
