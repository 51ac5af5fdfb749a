use crate::{
    foundation::error::{DrapeError, DrapeResult},
    foundation::math::mul_div255_u8,
    raster::buffer::{ChannelLayout, RasterBuffer},
};

/// Straight-alpha source-over for one pixel: `src * a + dst * (1 - a)` per color channel.
///
/// `dst` has 3 or 4 samples; with 4, its alpha becomes `a + da * (1 - a)`.
pub(crate) fn over_straight(dst: &mut [u8], src: [u8; 4]) {
    let a = u16::from(src[3]);
    if a == 0 {
        return;
    }
    if a == 255 {
        dst[..3].copy_from_slice(&src[..3]);
        if dst.len() == 4 {
            dst[3] = 255;
        }
        return;
    }

    let inv = 255 - a;
    for c in 0..3 {
        let v = u16::from(mul_div255_u8(u16::from(src[c]), a))
            + u16::from(mul_div255_u8(u16::from(dst[c]), inv));
        dst[c] = v.min(255) as u8;
    }
    if dst.len() == 4 {
        let v = a + u16::from(mul_div255_u8(u16::from(dst[3]), inv));
        dst[3] = v.min(255) as u8;
    }
}

/// Blend `src` (straight RGBA) into a copy of `dst` with its top-left at `top_left`.
///
/// Only the footprint intersected with `dst` is written. The source is never resized.
pub fn composite(
    dst: &RasterBuffer,
    src: &RasterBuffer,
    top_left: (i64, i64),
) -> DrapeResult<RasterBuffer> {
    let mut out = dst.clone();
    composite_in_place(&mut out, src, top_left)?;
    Ok(out)
}

pub(crate) fn composite_in_place(
    dst: &mut RasterBuffer,
    src: &RasterBuffer,
    top_left: (i64, i64),
) -> DrapeResult<()> {
    if src.layout() != ChannelLayout::Rgba {
        return Err(DrapeError::channel_mismatch(
            "composite source must carry an alpha channel (rgba)",
        ));
    }

    let (ox, oy) = top_left;
    let x_start = ox.max(0);
    let y_start = oy.max(0);
    let x_end = (ox + i64::from(src.width())).min(i64::from(dst.width()));
    let y_end = (oy + i64::from(src.height())).min(i64::from(dst.height()));
    if x_start >= x_end || y_start >= y_end {
        return Ok(());
    }

    for y in y_start..y_end {
        for x in x_start..x_end {
            let s = src.pixel((x - ox) as u32, (y - oy) as u32);
            let s = [s[0], s[1], s[2], s[3]];
            over_straight(dst.pixel_mut(x as u32, y as u32), s);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/effects/composite.rs"]
mod tests;
