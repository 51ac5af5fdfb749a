use kurbo::{Point, Vec2};

use crate::foundation::error::{DrapeError, DrapeResult};

/// Where on the base image a logo goes.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferencePoint {
    /// True center of the base image.
    Center,
    /// Inset from the top-left corner by the placement margin.
    UpperLeft,
    /// Inset from the top-right corner by the placement margin.
    UpperRight,
    /// Inset from the bottom-left corner by the placement margin.
    LowerLeft,
    /// Inset from the bottom-right corner by the placement margin.
    LowerRight,
    /// Caller-chosen pixel coordinate, interpreted per [`AnchorMode`].
    Explicit {
        /// Horizontal coordinate in base pixels.
        x: i64,
        /// Vertical coordinate in base pixels.
        y: i64,
    },
}

impl std::str::FromStr for ReferencePoint {
    type Err = DrapeError;

    fn from_str(s: &str) -> DrapeResult<Self> {
        let key = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match key.as_str() {
            "center" | "centre" => Ok(Self::Center),
            "upper_left" | "top_left" => Ok(Self::UpperLeft),
            "upper_right" | "top_right" => Ok(Self::UpperRight),
            "lower_left" | "bottom_left" => Ok(Self::LowerLeft),
            "lower_right" | "bottom_right" => Ok(Self::LowerRight),
            _ => Err(DrapeError::validation(format!(
                "unknown placement '{}'",
                s.trim()
            ))),
        }
    }
}

/// Which point of the logo a resolved coordinate denotes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorMode {
    /// The coordinate is the logo's center.
    #[default]
    Center,
    /// The coordinate is the logo's top-left corner.
    TopLeft,
}

/// A placement request: reference point plus anchor convention.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Placement {
    /// Named or explicit position.
    pub reference: ReferencePoint,
    /// How the position relates to the logo box.
    #[serde(default)]
    pub anchor: AnchorMode,
}

impl Default for Placement {
    fn default() -> Self {
        Self::centered()
    }
}

impl Placement {
    /// Center of the base image.
    pub fn centered() -> Self {
        Self {
            reference: ReferencePoint::Center,
            anchor: AnchorMode::Center,
        }
    }

    /// Named or explicit placement with the center anchor.
    pub fn at(reference: ReferencePoint) -> Self {
        Self {
            reference,
            anchor: AnchorMode::Center,
        }
    }

    /// Explicit coordinate with the given anchor convention.
    pub fn explicit(x: i64, y: i64, anchor: AnchorMode) -> Self {
        Self {
            reference: ReferencePoint::Explicit { x, y },
            anchor,
        }
    }

    /// The requested point in this placement's anchor convention, before clamping.
    ///
    /// Guide overlays draw this point; [`Placement::resolve_top_left`] derives the write offset
    /// from it, so both agree on the corner margin.
    pub fn anchor_point(&self, base: (u32, u32), logo: (u32, u32), margin_px: u32) -> Point {
        let (bw, bh) = (f64::from(base.0), f64::from(base.1));
        let half = Vec2::new(f64::from(logo.0) / 2.0, f64::from(logo.1) / 2.0);
        let m = f64::from(margin_px);

        let logo_center = match self.reference {
            ReferencePoint::Explicit { x, y } => return Point::new(x as f64, y as f64),
            ReferencePoint::Center => Point::new(bw / 2.0, bh / 2.0),
            ReferencePoint::UpperLeft => Point::new(m + half.x, m + half.y),
            ReferencePoint::UpperRight => Point::new(bw - m - half.x, m + half.y),
            ReferencePoint::LowerLeft => Point::new(m + half.x, bh - m - half.y),
            ReferencePoint::LowerRight => Point::new(bw - m - half.x, bh - m - half.y),
        };
        match self.anchor {
            AnchorMode::Center => logo_center,
            AnchorMode::TopLeft => logo_center - half,
        }
    }

    /// Integer top-left write offset for a `logo`-sized box on a `base`-sized image, clamped so
    /// the box stays inside the base whenever it fits.
    pub fn resolve_top_left(&self, base: (u32, u32), logo: (u32, u32), margin_px: u32) -> (u32, u32) {
        let p = self.anchor_point(base, logo, margin_px);
        let tl = match self.anchor {
            AnchorMode::Center => {
                p - Vec2::new(f64::from(logo.0) / 2.0, f64::from(logo.1) / 2.0)
            }
            AnchorMode::TopLeft => p,
        };
        clamp_top_left(tl.x.floor() as i64, tl.y.floor() as i64, base, logo)
    }
}

/// `x = max(0, min(base_w - logo_w, x))`, symmetric for `y`. A logo larger than the base pins
/// to 0 on that axis and is cropped by the write region.
pub fn clamp_top_left(x: i64, y: i64, base: (u32, u32), logo: (u32, u32)) -> (u32, u32) {
    let max_x = i64::from(base.0) - i64::from(logo.0);
    let max_y = i64::from(base.1) - i64::from(logo.1);
    (x.min(max_x).max(0) as u32, y.min(max_y).max(0) as u32)
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/placement.rs"]
mod tests;
