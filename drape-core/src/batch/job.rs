use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::{
    engine::compose::LogoSize,
    foundation::config::EngineConfig,
    foundation::error::{DrapeError, DrapeResult},
    geometry::placement::{AnchorMode, Placement},
    raster::resample::ResizeTarget,
};

/// How a job sizes its graphic.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobSize {
    /// Printed width in physical units, converted with [`EngineConfig::pixels_per_unit`].
    PhysicalWidth(f64),
    /// Logo height as a fraction of the base height.
    HeightFraction(f64),
}

/// Where a job puts its graphic.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobPlacement {
    /// Catalog-sheet overrides: `x` is the logo's center column, `y` its top row.
    ///
    /// Missing `x` centers horizontally; missing `y` centers vertically, lifted by
    /// [`EngineConfig::vertical_lift_px`].
    Overrides {
        /// Logo center x in base pixels.
        x: Option<i64>,
        /// Logo top y in base pixels.
        y: Option<i64>,
    },
    /// A ready-made placement, used as-is.
    Fixed(Placement),
}

impl Default for JobPlacement {
    fn default() -> Self {
        Self::Overrides { x: None, y: None }
    }
}

/// One unit of batch work: put `graphic_id` on `base_id`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BatchJob {
    /// Graphic identifier for the asset lookup.
    pub graphic_id: String,
    /// Base identifier for the asset lookup; also the alpha-mask cache key.
    pub base_id: String,
    /// Logo sizing.
    pub size: JobSize,
    /// Logo placement.
    #[serde(default)]
    pub placement: JobPlacement,
    /// Output identifier; `<base>_<graphic>` when unset.
    #[serde(default)]
    pub output_id: Option<String>,
}

impl BatchJob {
    /// Job sized by physical width with default placement.
    pub fn new(graphic_id: impl Into<String>, base_id: impl Into<String>, width_units: f64) -> Self {
        Self {
            graphic_id: graphic_id.into(),
            base_id: base_id.into(),
            size: JobSize::PhysicalWidth(width_units),
            placement: JobPlacement::default(),
            output_id: None,
        }
    }

    /// Set the output identifier.
    pub fn with_output_id(mut self, id: impl Into<String>) -> Self {
        self.output_id = Some(id.into());
        self
    }

    /// Set the x/y overrides.
    pub fn with_overrides(mut self, x: Option<i64>, y: Option<i64>) -> Self {
        self.placement = JobPlacement::Overrides { x, y };
        self
    }

    /// Identifier handed to the output sink.
    pub fn output_id(&self) -> String {
        match &self.output_id {
            Some(id) if !id.trim().is_empty() => id.trim().to_string(),
            _ => format!("{}_{}", self.base_id, self.graphic_id),
        }
    }

    /// Engine inputs for this job on a base of `base_dims` with a graphic of `logo_dims`.
    pub(crate) fn resolve(
        &self,
        base_dims: (u32, u32),
        logo_dims: (u32, u32),
        config: &EngineConfig,
    ) -> DrapeResult<(Placement, LogoSize)> {
        let size = match self.size {
            JobSize::PhysicalWidth(units) => {
                if !units.is_finite() || units <= 0.0 {
                    return Err(DrapeError::invalid_dimension(format!(
                        "job width must be finite and > 0, got {units}"
                    )));
                }
                LogoSize::Width((units * config.pixels_per_unit) as u32)
            }
            JobSize::HeightFraction(scale) => LogoSize::HeightFraction(scale),
        };

        let placement = match self.placement {
            JobPlacement::Fixed(p) => p,
            JobPlacement::Overrides { x, y } => {
                let (bw, bh) = (i64::from(base_dims.0), i64::from(base_dims.1));
                let center_x = x.unwrap_or(bw / 2);
                let center_y = match y {
                    Some(top) => {
                        let logo_h = match size {
                            LogoSize::Width(w) => ResizeTarget::Width(w).resolve(logo_dims.0, logo_dims.1)?.1,
                            LogoSize::HeightFraction(s) => (s * f64::from(base_dims.1)) as u32,
                            LogoSize::Exact { height, .. } => height,
                        };
                        top.checked_add(i64::from(logo_h / 2)).ok_or_else(|| {
                            DrapeError::validation(format!("job y coordinate {top} is out of range"))
                        })?
                    }
                    None => (bh / 2).saturating_sub(i64::from(config.vertical_lift_px)),
                };
                Placement::explicit(center_x, center_y, AnchorMode::Center)
            }
        };
        Ok((placement, size))
    }
}

/// Jobs for one graphic over a whole set of bases: same placement and scale everywhere, output id
/// `<base stem>_logo`.
pub fn catalog_jobs<I, S>(
    graphic_id: &str,
    base_ids: I,
    placement: Placement,
    scale: f64,
) -> Vec<BatchJob>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    base_ids
        .into_iter()
        .map(|base| {
            let base = base.as_ref();
            let stem = Path::new(base)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| base.to_string());
            BatchJob {
                graphic_id: graphic_id.to_string(),
                base_id: base.to_string(),
                size: JobSize::HeightFraction(scale),
                placement: JobPlacement::Fixed(placement),
                output_id: Some(format!("{stem}_logo")),
            }
        })
        .collect()
}

/// One row of a catalog sheet as exported to JSON.
///
/// Field names follow the sheet's column headers (`Design`, `Garment`, `Width`, `Style Number`,
/// `MPN`, `x coordinate`, `y coordinate`) or their snake_case forms. Cells may be numbers or
/// strings.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct JobRecord {
    /// Graphic identifier.
    #[serde(default, alias = "Design", deserialize_with = "de_text")]
    pub design: Option<String>,
    /// Base identifier.
    #[serde(default, alias = "Garment", deserialize_with = "de_text")]
    pub garment: Option<String>,
    /// Printed width in physical units.
    #[serde(default, alias = "Width", deserialize_with = "de_number")]
    pub width: Option<f64>,
    /// Preferred output id.
    #[serde(default, alias = "Style Number", deserialize_with = "de_text")]
    pub style_number: Option<String>,
    /// Fallback output id.
    #[serde(default, alias = "MPN", deserialize_with = "de_text")]
    pub mpn: Option<String>,
    /// Logo center x; `"512px"` and `512` are both accepted.
    #[serde(default, alias = "x coordinate", deserialize_with = "de_coord")]
    pub x: Option<i64>,
    /// Logo top y.
    #[serde(default, alias = "y coordinate", deserialize_with = "de_coord")]
    pub y: Option<i64>,
}

impl JobRecord {
    /// Validate required cells and build the job.
    pub fn into_job(self) -> DrapeResult<BatchJob> {
        let design = self
            .design
            .ok_or_else(|| DrapeError::validation("job record is missing 'Design'"))?;
        let garment = self
            .garment
            .ok_or_else(|| DrapeError::validation("job record is missing 'Garment'"))?;
        let width = self
            .width
            .ok_or_else(|| DrapeError::validation("job record is missing a numeric 'Width'"))?;

        let output_id = self
            .style_number
            .or(self.mpn)
            .unwrap_or_else(|| format!("{garment}_{design}"));
        Ok(BatchJob::new(design, garment, width)
            .with_overrides(self.x, self.y)
            .with_output_id(output_id))
    }
}

/// A catalog sheet: a JSON array of [`JobRecord`]s.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct JobList {
    /// Records in sheet order.
    pub records: Vec<JobRecord>,
}

impl JobList {
    /// Parse a sheet from JSON.
    pub fn from_json_str(s: &str) -> DrapeResult<Self> {
        serde_json::from_str(s).map_err(|e| DrapeError::serde(format!("job list: {e}")))
    }

    /// Read and parse a sheet from a JSON file.
    pub fn from_path(path: &Path) -> DrapeResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read job list '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Convert every record, failing on the first malformed one.
    pub fn into_jobs(self) -> DrapeResult<Vec<BatchJob>> {
        self.records
            .into_iter()
            .enumerate()
            .map(|(i, r)| {
                r.into_job()
                    .map_err(|e| DrapeError::validation(format!("record {i}: {e}")))
            })
            .collect()
    }
}

fn cell_text(v: &serde_json::Value) -> Option<String> {
    let s = match v {
        serde_json::Value::String(s) => s.trim().to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!s.is_empty()).then_some(s)
}

fn cell_number(v: &serde_json::Value) -> Option<f64> {
    match v {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => {
            let s = s.trim();
            s.strip_suffix("px").unwrap_or(s).trim().parse().ok()
        }
        _ => None,
    }
    .filter(|v: &f64| v.is_finite())
}

fn de_text<'de, D: serde::Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(cell_text(&serde_json::Value::deserialize(d)?))
}

fn de_number<'de, D: serde::Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    Ok(cell_number(&serde_json::Value::deserialize(d)?))
}

fn de_coord<'de, D: serde::Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    Ok(cell_number(&serde_json::Value::deserialize(d)?).map(|v| v.trunc() as i64))
}

#[cfg(test)]
#[path = "../../tests/unit/batch/job.rs"]
mod tests;
