use crate::{
    foundation::math::{reflect101, round_to_u8},
    raster::buffer::RasterBuffer,
};

/// How taps outside the source image are resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Border {
    /// Mirror back into the image (`reflect-101`).
    Reflect,
    /// Repeat the nearest edge pixel.
    Clamp,
    /// Contribute nothing (transparent black).
    Transparent,
}

/// Premultiplied RGBA sample in `0.0..=255.0`.
pub(crate) type PremulF32 = [f32; 4];

fn resolve(i: i64, len: u32, border: Border) -> Option<u32> {
    match border {
        Border::Reflect => Some(reflect101(i, len as usize) as u32),
        Border::Clamp => Some(i.clamp(0, i64::from(len) - 1) as u32),
        Border::Transparent => (0..i64::from(len)).contains(&i).then_some(i as u32),
    }
}

fn premul_at(src: &RasterBuffer, x: u32, y: u32) -> PremulF32 {
    let px = src.pixel(x, y);
    let a = if px.len() == 4 { f32::from(px[3]) } else { 255.0 };
    let k = a / 255.0;
    [
        f32::from(px[0]) * k,
        f32::from(px[1]) * k,
        f32::from(px[2]) * k,
        a,
    ]
}

/// Bilinear sample at continuous pixel coordinates, where integer coordinates hit pixel
/// centers exactly. Color is interpolated premultiplied so transparent texels do not bleed.
pub(crate) fn sample_bilinear(src: &RasterBuffer, x: f64, y: f64, border: Border) -> PremulF32 {
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = (x - x0) as f32;
    let fy = (y - y0) as f32;
    let (x0, y0) = (x0 as i64, y0 as i64);

    let taps = [
        (x0, y0, (1.0 - fx) * (1.0 - fy)),
        (x0 + 1, y0, fx * (1.0 - fy)),
        (x0, y0 + 1, (1.0 - fx) * fy),
        (x0 + 1, y0 + 1, fx * fy),
    ];

    let mut acc = [0.0f32; 4];
    for (tx, ty, w) in taps {
        if w == 0.0 {
            continue;
        }
        let (Some(sx), Some(sy)) = (
            resolve(tx, src.width(), border),
            resolve(ty, src.height(), border),
        ) else {
            continue;
        };
        let px = premul_at(src, sx, sy);
        for c in 0..4 {
            acc[c] += px[c] * w;
        }
    }
    acc
}

/// Write a premultiplied sample back as straight RGBA8.
pub(crate) fn store_straight(dst: &mut [u8], px: PremulF32) {
    let a = px[3];
    if a < 0.5 {
        dst[..4].copy_from_slice(&[0, 0, 0, 0]);
        return;
    }
    let k = 255.0 / a;
    for c in 0..3 {
        dst[c] = round_to_u8(px[c] * k);
    }
    dst[3] = round_to_u8(a);
}

#[cfg(test)]
#[path = "../../tests/unit/raster/sample.rs"]
mod tests;
