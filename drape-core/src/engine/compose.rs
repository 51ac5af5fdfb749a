use kurbo::Point;

use crate::{
    effects::composite::composite,
    effects::displacement::displace,
    effects::light_blend::{LightBlendMode, light_blend},
    effects::perspective::perspective_warp,
    foundation::config::EngineConfig,
    foundation::error::{DrapeError, DrapeResult},
    geometry::placement::Placement,
    raster::buffer::RasterBuffer,
    raster::resample::{ResizeTarget, resize},
};

/// Fabric simulation applied to the scaled logo before compositing. Exactly one per call.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WrapStrategy {
    /// Plain alpha compositing.
    #[default]
    None,
    /// Luminance-driven sample displacement; `intensity` is the peak shift in pixels.
    Displacement {
        /// Shift in pixels at full white/black, `>= 0`.
        intensity: f32,
    },
    /// Multiply the garment's normalized light map into the logo color.
    LightBlend {
        /// Blend weight in `[0, 1]`.
        intensity: f32,
        /// Everywhere, or only above the light threshold.
        #[serde(default)]
        mode: LightBlendMode,
    },
    /// Four-corner projection of the scaled logo.
    PerspectiveWarp {
        /// Destination corners TL, TR, BR, BL in the scaled logo's local frame.
        corners: [Point; 4],
        /// Base-image top-left for the warped logo. `None` uses the resolved placement.
        #[serde(default)]
        offset: Option<(i64, i64)>,
    },
}

impl WrapStrategy {
    /// Reject parameters no strategy can honor.
    pub fn validate(&self) -> DrapeResult<()> {
        match self {
            Self::None | Self::PerspectiveWarp { .. } => Ok(()),
            Self::Displacement { intensity } => {
                if !intensity.is_finite() || *intensity < 0.0 {
                    return Err(DrapeError::validation(
                        "displacement intensity must be finite and >= 0",
                    ));
                }
                Ok(())
            }
            Self::LightBlend { intensity, .. } => {
                if !(0.0..=1.0).contains(intensity) {
                    return Err(DrapeError::validation(
                        "light blend intensity must be within [0, 1]",
                    ));
                }
                Ok(())
            }
        }
    }
}

/// How big the logo is drawn.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogoSize {
    /// Height as a fraction of the base height; width follows the logo aspect ratio.
    HeightFraction(f64),
    /// Width in pixels; height follows the logo aspect ratio.
    Width(u32),
    /// Exact pixel size.
    Exact {
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
    },
}

impl LogoSize {
    fn target(self, base_height: u32) -> ResizeTarget {
        match self {
            // `as` saturates: NaN and negatives become 0 and fail as invalid dimensions.
            Self::HeightFraction(scale) => ResizeTarget::Height((scale * f64::from(base_height)) as u32),
            Self::Width(w) => ResizeTarget::Width(w),
            Self::Exact { width, height } => ResizeTarget::Exact { width, height },
        }
    }
}

/// Where and how large the logo lands on a given base.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LogoLayout {
    /// Scaled logo `(width, height)`.
    pub size: (u32, u32),
    /// Clamped top-left write offset.
    pub top_left: (u32, u32),
}

/// Resolve → resize → wrap → composite, the single entry point for placing a logo.
#[derive(Clone, Debug, Default)]
pub struct CompositionEngine {
    config: EngineConfig,
}

impl CompositionEngine {
    /// Engine with the given constants.
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Active constants.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Geometry only: the scaled logo size and its clamped offset on `base_dims`.
    pub fn layout(
        &self,
        base_dims: (u32, u32),
        logo_dims: (u32, u32),
        placement: &Placement,
        size: LogoSize,
    ) -> DrapeResult<LogoLayout> {
        let scaled = size.target(base_dims.1).resolve(logo_dims.0, logo_dims.1)?;
        let top_left =
            placement.resolve_top_left(base_dims, scaled, self.config.placement_margin_px);
        Ok(LogoLayout {
            size: scaled,
            top_left,
        })
    }

    /// Place `logo` on a copy of `base`.
    ///
    /// The result has the base's size and channel layout. Out-of-range placements clamp; the
    /// only failures are invalid sizes and strategy errors.
    #[tracing::instrument(skip(self, base, logo), fields(base = ?base.dimensions(), logo = ?logo.dimensions()))]
    pub fn compose(
        &self,
        base: &RasterBuffer,
        logo: &RasterBuffer,
        placement: &Placement,
        size: LogoSize,
        strategy: &WrapStrategy,
    ) -> DrapeResult<RasterBuffer> {
        strategy.validate()?;

        let layout = self.layout(base.dimensions(), logo.dimensions(), placement, size)?;
        let (w, h) = layout.size;
        let scaled = resize(
            &logo.to_rgba(),
            ResizeTarget::Exact {
                width: w,
                height: h,
            },
            self.config.resample_filter,
        )?;
        let (x, y) = (i64::from(layout.top_left.0), i64::from(layout.top_left.1));
        tracing::debug!(size = ?layout.size, top_left = ?layout.top_left, "resolved logo layout");

        let cfg = &self.config;
        let (prepared, at) = match strategy {
            WrapStrategy::None => (scaled, (x, y)),
            WrapStrategy::Displacement { intensity } => {
                let region = base.crop_clamped(x, y, w, h)?;
                (
                    displace(&scaled, &region, *intensity, cfg.blur_radius)?,
                    (x, y),
                )
            }
            WrapStrategy::LightBlend { intensity, mode } => {
                let region = base.crop_clamped(x, y, w, h)?;
                let blended = light_blend(
                    &scaled,
                    &region,
                    *intensity,
                    *mode,
                    cfg.light_threshold,
                    cfg.blur_radius,
                )?;
                (blended, (x, y))
            }
            WrapStrategy::PerspectiveWarp { corners, offset } => {
                (perspective_warp(&scaled, corners)?, offset.unwrap_or((x, y)))
            }
        };

        composite(base, &prepared, at)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/compose.rs"]
mod tests;
