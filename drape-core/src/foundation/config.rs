use std::path::Path;

use anyhow::Context;

use crate::foundation::error::{DrapeError, DrapeResult};

/// Interpolation used when scaling graphics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResampleFilter {
    /// Area-weighted (triangle support widened by the scale ratio when shrinking).
    #[default]
    Area,
    /// Plain bilinear sampling of the four nearest pixels.
    Bilinear,
    /// Lanczos3, sharper but slower.
    Lanczos,
}

/// Tunable constants shared by the engine, the batch driver and the sinks.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Inset from the image edges for the corner placements.
    pub placement_margin_px: u32,
    /// Gaussian blur radius used by the fabric strategies (kernel is `2r + 1` taps).
    pub blur_radius: u32,
    /// Light-map level above which the thresholded light blend applies.
    pub light_threshold: f32,
    /// Pixels per physical unit of a job's target width.
    pub pixels_per_unit: f64,
    /// How far above the vertical center a batch logo sits when no y is given.
    pub vertical_lift_px: i64,
    /// Interpolation used to scale graphics.
    pub resample_filter: ResampleFilter,
    /// JPEG quality for sinks that encode JPEG.
    pub jpeg_quality: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            placement_margin_px: 50,
            blur_radius: 10,
            light_threshold: 0.5,
            // 12 inches of print width cover 370 px of the garment photos.
            pixels_per_unit: 370.0 / 12.0,
            vertical_lift_px: 0,
            resample_filter: ResampleFilter::Area,
            jpeg_quality: 95,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON configuration. Missing fields take their defaults.
    pub fn from_json_str(s: &str) -> DrapeResult<Self> {
        let cfg: Self = serde_json::from_str(s).map_err(|e| DrapeError::serde(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn from_path(path: &Path) -> DrapeResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Check value ranges.
    pub fn validate(&self) -> DrapeResult<()> {
        if !self.pixels_per_unit.is_finite() || self.pixels_per_unit <= 0.0 {
            return Err(DrapeError::validation(
                "pixels_per_unit must be finite and > 0",
            ));
        }
        if !(0.0..=1.0).contains(&self.light_threshold) {
            return Err(DrapeError::validation(
                "light_threshold must be within [0, 1]",
            ));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(DrapeError::validation("jpeg_quality must be within 1..=100"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
