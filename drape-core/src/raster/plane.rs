/// Single-channel `f32` image used for luminance, light and displacement maps.
#[derive(Clone, Debug, PartialEq)]
pub struct Plane {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl Plane {
    pub(crate) fn from_vec(width: u32, height: u32, data: Vec<f32>) -> Self {
        debug_assert_eq!(data.len(), (width as usize) * (height as usize));
        Self {
            width,
            height,
            data,
        }
    }

    /// Plane of `width x height` where every sample is `v`.
    pub fn uniform(width: u32, height: u32, v: f32) -> Self {
        Self::from_vec(width, height, vec![v; (width as usize) * (height as usize)])
    }

    /// Width in samples.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in samples.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major samples.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Sample at `(x, y)`. Panics when out of bounds.
    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.data[(y as usize) * (self.width as usize) + x as usize]
    }

    /// Smallest and largest sample.
    pub fn min_max(&self) -> (f32, f32) {
        self.data
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }

    /// Apply `f` to every sample.
    pub fn map(mut self, f: impl Fn(f32) -> f32) -> Self {
        for v in &mut self.data {
            *v = f(*v);
        }
        self
    }

    /// Stretch samples so the minimum maps to 0 and the maximum to 1. Returns `None` for a flat
    /// plane, where the stretch is undefined.
    pub fn normalized_min_max(&self) -> Option<Plane> {
        let (lo, hi) = self.min_max();
        if hi <= lo {
            return None;
        }
        let span = hi - lo;
        Some(self.clone().map(|v| (v - lo) / span))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/plane.rs"]
mod tests;
