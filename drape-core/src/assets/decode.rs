use anyhow::Context;

use crate::{foundation::error::DrapeResult, raster::buffer::RasterBuffer};

/// Decode encoded image bytes (PNG, JPEG, ...) into a straight-alpha buffer.
///
/// Files with an alpha channel decode to RGBA, everything else to RGB. 16-bit and float
/// sources are reduced to 8 bits per sample.
pub fn decode_image(bytes: &[u8]) -> DrapeResult<RasterBuffer> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    RasterBuffer::from_dynamic(dyn_img)
}

/// Encode `buf` as PNG bytes, keeping the alpha channel if present.
pub fn encode_png(buf: &RasterBuffer) -> DrapeResult<Vec<u8>> {
    let mut out = Vec::new();
    buf.to_dynamic()?
        .write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)
        .context("encode png")?;
    Ok(out)
}

/// Encode `buf` as baseline JPEG at `quality` (1..=100), flattening any alpha onto white.
pub fn encode_jpeg(buf: &RasterBuffer, quality: u8) -> DrapeResult<Vec<u8>> {
    let flat = buf.flatten_onto([255, 255, 255]);
    let mut out = Vec::new();
    let enc = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100));
    flat.to_dynamic()?
        .write_with_encoder(enc)
        .context("encode jpeg")?;
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
