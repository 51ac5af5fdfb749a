use image::{DynamicImage, RgbImage, RgbaImage};

use crate::{
    foundation::error::{DrapeError, DrapeResult},
    foundation::math::{luma_u8, mul_div255_u8},
    raster::plane::Plane,
};

/// Channel layout of a [`RasterBuffer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelLayout {
    /// Three interleaved samples per pixel.
    Rgb,
    /// Four interleaved samples per pixel, straight (non-premultiplied) alpha last.
    Rgba,
}

impl ChannelLayout {
    /// Samples per pixel.
    pub fn channels(self) -> usize {
        match self {
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }

    /// Layout for a channel count, `ChannelMismatch` for anything but 3 or 4.
    pub fn from_channels(channels: usize) -> DrapeResult<Self> {
        match channels {
            3 => Ok(Self::Rgb),
            4 => Ok(Self::Rgba),
            n => Err(DrapeError::channel_mismatch(format!(
                "expected 3 or 4 channels, got {n}"
            ))),
        }
    }

    /// Whether the layout carries an alpha channel.
    pub fn has_alpha(self) -> bool {
        matches!(self, Self::Rgba)
    }
}

/// Row-major 8-bit raster image.
///
/// Invariant: `data.len() == width * height * layout.channels()` and both dimensions are
/// positive. Every transform in this crate takes `&RasterBuffer` and returns a fresh buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterBuffer {
    width: u32,
    height: u32,
    layout: ChannelLayout,
    data: Vec<u8>,
}

impl RasterBuffer {
    /// Wrap raw samples, validating the length invariant.
    pub fn new(width: u32, height: u32, layout: ChannelLayout, data: Vec<u8>) -> DrapeResult<Self> {
        let expected = byte_len(width, height, layout)?;
        if data.len() != expected {
            return Err(DrapeError::invalid_dimension(format!(
                "{width}x{height} {layout:?} needs {expected} bytes, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            layout,
            data,
        })
    }

    /// A buffer where every pixel equals `px` (`px.len()` must match the layout).
    pub fn filled(width: u32, height: u32, layout: ChannelLayout, px: &[u8]) -> DrapeResult<Self> {
        if px.len() != layout.channels() {
            return Err(DrapeError::channel_mismatch(format!(
                "fill pixel has {} samples for {layout:?}",
                px.len()
            )));
        }
        let pixels = (width as usize) * (height as usize);
        Self::new(width, height, layout, px.repeat(pixels))
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Channel layout.
    pub fn layout(&self) -> ChannelLayout {
        self.layout
    }

    /// Samples per pixel.
    pub fn channels(&self) -> usize {
        self.layout.channels()
    }

    /// Raw interleaved samples.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consume into raw interleaved samples.
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Samples of the pixel at `(x, y)`. Panics when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let i = self.index(x, y);
        &self.data[i..i + self.channels()]
    }

    pub(crate) fn pixel_mut(&mut self, x: u32, y: u32) -> &mut [u8] {
        let i = self.index(x, y);
        let c = self.channels();
        &mut self.data[i..i + c]
    }

    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    fn index(&self, x: u32, y: u32) -> usize {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
        ((y as usize) * (self.width as usize) + x as usize) * self.channels()
    }

    /// RGBA copy; RGB input gains an opaque alpha channel.
    pub fn to_rgba(&self) -> RasterBuffer {
        match self.layout {
            ChannelLayout::Rgba => self.clone(),
            ChannelLayout::Rgb => {
                let mut out = Vec::with_capacity(self.data.len() / 3 * 4);
                for px in self.data.chunks_exact(3) {
                    out.extend_from_slice(&[px[0], px[1], px[2], 255]);
                }
                RasterBuffer {
                    width: self.width,
                    height: self.height,
                    layout: ChannelLayout::Rgba,
                    data: out,
                }
            }
        }
    }

    /// The alpha plane as bytes; fully opaque for RGB buffers.
    pub fn alpha_channel(&self) -> Vec<u8> {
        match self.layout {
            ChannelLayout::Rgb => vec![255; (self.width as usize) * (self.height as usize)],
            ChannelLayout::Rgba => self.data.chunks_exact(4).map(|px| px[3]).collect(),
        }
    }

    /// RGBA copy whose alpha channel is replaced by `alpha` (one byte per pixel).
    pub fn with_alpha(&self, alpha: &[u8]) -> DrapeResult<RasterBuffer> {
        let pixels = (self.width as usize) * (self.height as usize);
        if alpha.len() != pixels {
            return Err(DrapeError::invalid_dimension(format!(
                "alpha plane has {} samples for a {}x{} image",
                alpha.len(),
                self.width,
                self.height
            )));
        }
        let mut out = self.to_rgba();
        for (px, &a) in out.data.chunks_exact_mut(4).zip(alpha) {
            px[3] = a;
        }
        Ok(out)
    }

    /// Copy of the `w x h` window at `(x, y)`. Samples outside the image repeat the nearest edge
    /// pixel, so the result always has the requested size.
    pub fn crop_clamped(&self, x: i64, y: i64, w: u32, h: u32) -> DrapeResult<RasterBuffer> {
        let c = self.channels();
        let mut data = Vec::with_capacity(byte_len(w, h, self.layout)?);
        let max_x = i64::from(self.width) - 1;
        let max_y = i64::from(self.height) - 1;
        for row in 0..i64::from(h) {
            let sy = (y + row).clamp(0, max_y) as u32;
            for col in 0..i64::from(w) {
                let sx = (x + col).clamp(0, max_x) as u32;
                let i = self.index(sx, sy);
                data.extend_from_slice(&self.data[i..i + c]);
            }
        }
        RasterBuffer::new(w, h, self.layout, data)
    }

    /// Rec.601 luma plane in `0.0..=255.0`.
    pub fn luma(&self) -> Plane {
        let c = self.channels();
        let data = self
            .data
            .chunks_exact(c)
            .map(|px| luma_u8(px[0], px[1], px[2]))
            .collect();
        Plane::from_vec(self.width, self.height, data)
    }

    /// RGB copy composited over an opaque background color.
    pub fn flatten_onto(&self, bg: [u8; 3]) -> RasterBuffer {
        let data = match self.layout {
            ChannelLayout::Rgb => self.data.clone(),
            ChannelLayout::Rgba => {
                let mut out = Vec::with_capacity(self.data.len() / 4 * 3);
                for px in self.data.chunks_exact(4) {
                    let a = u16::from(px[3]);
                    let inv = 255 - a;
                    for (i, &b) in bg.iter().enumerate() {
                        let v = u16::from(mul_div255_u8(u16::from(px[i]), a))
                            + u16::from(mul_div255_u8(u16::from(b), inv));
                        out.push(v.min(255) as u8);
                    }
                }
                out
            }
        };
        RasterBuffer {
            width: self.width,
            height: self.height,
            layout: ChannelLayout::Rgb,
            data,
        }
    }

    /// Convert a decoded image; images with an alpha channel become RGBA, others RGB.
    pub fn from_dynamic(img: DynamicImage) -> DrapeResult<RasterBuffer> {
        let (width, height) = (img.width(), img.height());
        if img.color().has_alpha() {
            Self::new(width, height, ChannelLayout::Rgba, img.into_rgba8().into_raw())
        } else {
            Self::new(width, height, ChannelLayout::Rgb, img.into_rgb8().into_raw())
        }
    }

    /// Convert into an `image` crate buffer for encoding.
    pub fn to_dynamic(&self) -> DrapeResult<DynamicImage> {
        let img = match self.layout {
            ChannelLayout::Rgb => RgbImage::from_raw(self.width, self.height, self.data.clone())
                .map(DynamicImage::ImageRgb8),
            ChannelLayout::Rgba => RgbaImage::from_raw(self.width, self.height, self.data.clone())
                .map(DynamicImage::ImageRgba8),
        };
        img.ok_or_else(|| DrapeError::invalid_dimension("raster length does not match image size"))
    }
}

fn byte_len(width: u32, height: u32, layout: ChannelLayout) -> DrapeResult<usize> {
    if width == 0 || height == 0 {
        return Err(DrapeError::invalid_dimension(format!(
            "raster dimensions must be > 0, got {width}x{height}"
        )));
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(layout.channels()))
        .ok_or_else(|| DrapeError::invalid_dimension("raster buffer size overflow"))
}

#[cfg(test)]
#[path = "../../tests/unit/raster/buffer.rs"]
mod tests;
