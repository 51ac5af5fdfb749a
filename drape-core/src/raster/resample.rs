use image::{RgbImage, RgbaImage, imageops::FilterType};

use crate::{
    foundation::config::ResampleFilter,
    foundation::error::{DrapeError, DrapeResult},
    raster::buffer::{ChannelLayout, RasterBuffer},
    raster::sample::{Border, sample_bilinear, store_straight},
};

/// Requested output size for [`resize`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResizeTarget {
    /// Exact output dimensions.
    Exact {
        /// Output width.
        width: u32,
        /// Output height.
        height: u32,
    },
    /// Output width; height follows the source aspect ratio.
    Width(u32),
    /// Output height; width follows the source aspect ratio.
    Height(u32),
}

impl ResizeTarget {
    /// Concrete `(width, height)` for a source of `src_w x src_h`.
    ///
    /// The derived side is truncated, matching integer pixel arithmetic elsewhere in the
    /// pipeline; a result of 0 is an [`DrapeError::InvalidDimension`].
    pub fn resolve(self, src_w: u32, src_h: u32) -> DrapeResult<(u32, u32)> {
        let (w, h) = match self {
            Self::Exact { width, height } => (width, height),
            Self::Width(width) => {
                let h = (f64::from(width) * f64::from(src_h) / f64::from(src_w)) as u32;
                (width, h)
            }
            Self::Height(height) => {
                let w = (f64::from(height) * f64::from(src_w) / f64::from(src_h)) as u32;
                (w, height)
            }
        };
        if w == 0 || h == 0 {
            return Err(DrapeError::invalid_dimension(format!(
                "resize target {self:?} of a {src_w}x{src_h} source is {w}x{h}"
            )));
        }
        Ok((w, h))
    }
}

/// Scale `src` to `target`, returning a new buffer with the same channel layout.
pub fn resize(
    src: &RasterBuffer,
    target: ResizeTarget,
    filter: ResampleFilter,
) -> DrapeResult<RasterBuffer> {
    let (w, h) = target.resolve(src.width(), src.height())?;
    if (w, h) == src.dimensions() {
        return Ok(src.clone());
    }

    match filter {
        ResampleFilter::Bilinear => resize_bilinear(src, w, h),
        ResampleFilter::Area => resize_with(src, w, h, FilterType::Triangle),
        ResampleFilter::Lanczos => resize_with(src, w, h, FilterType::Lanczos3),
    }
}

fn resize_with(src: &RasterBuffer, w: u32, h: u32, filter: FilterType) -> DrapeResult<RasterBuffer> {
    let bad_len = || DrapeError::invalid_dimension("raster length does not match image size");
    match src.layout() {
        ChannelLayout::Rgb => {
            let img = RgbImage::from_raw(src.width(), src.height(), src.data().to_vec())
                .ok_or_else(bad_len)?;
            let out = image::imageops::resize(&img, w, h, filter);
            RasterBuffer::new(w, h, ChannelLayout::Rgb, out.into_raw())
        }
        ChannelLayout::Rgba => {
            // Filter in premultiplied space so transparent texels do not darken edges.
            let mut premul = src.data().to_vec();
            premultiply_in_place(&mut premul);
            let img = RgbaImage::from_raw(src.width(), src.height(), premul).ok_or_else(bad_len)?;
            let mut out = image::imageops::resize(&img, w, h, filter).into_raw();
            unpremultiply_in_place(&mut out);
            RasterBuffer::new(w, h, ChannelLayout::Rgba, out)
        }
    }
}

fn resize_bilinear(src: &RasterBuffer, w: u32, h: u32) -> DrapeResult<RasterBuffer> {
    let sx = f64::from(src.width()) / f64::from(w);
    let sy = f64::from(src.height()) / f64::from(h);
    let mut out = vec![0u8; (w as usize) * (h as usize) * 4];
    for y in 0..h {
        let fy = (f64::from(y) + 0.5) * sy - 0.5;
        for x in 0..w {
            let fx = (f64::from(x) + 0.5) * sx - 0.5;
            let i = ((y as usize) * (w as usize) + x as usize) * 4;
            store_straight(&mut out[i..i + 4], sample_bilinear(src, fx, fy, Border::Clamp));
        }
    }
    let rgba = RasterBuffer::new(w, h, ChannelLayout::Rgba, out)?;
    Ok(match src.layout() {
        ChannelLayout::Rgba => rgba,
        ChannelLayout::Rgb => rgba.flatten_onto([0, 0, 0]),
    })
}

fn premultiply_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 {
            px[..3].copy_from_slice(&[0, 0, 0]);
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * a + 127) / 255) as u8;
        }
    }
}

fn unpremultiply_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u32::from(px[3]);
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u32::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/resample.rs"]
mod tests;
