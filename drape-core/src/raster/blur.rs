use crate::{
    foundation::error::{DrapeError, DrapeResult},
    foundation::math::reflect101,
    raster::plane::Plane,
};

/// Sigma OpenCV derives for a `2r + 1` kernel when none is given.
pub fn sigma_for_radius(radius: u32) -> f32 {
    let ksize = (2 * radius + 1) as f32;
    0.3 * ((ksize - 1.0) * 0.5 - 1.0) + 0.8
}

/// Separable Gaussian blur of a plane with reflect-101 borders.
pub fn blur_plane(src: &Plane, radius: u32, sigma: f32) -> DrapeResult<Plane> {
    if radius == 0 {
        return Ok(src.clone());
    }

    let kernel = gaussian_kernel(radius, sigma)?;
    let (w, h) = (src.width() as usize, src.height() as usize);
    let mut tmp = vec![0.0f32; w * h];
    let mut out = vec![0.0f32; w * h];

    horizontal_pass(src.data(), &mut tmp, w, h, &kernel);
    vertical_pass(&tmp, &mut out, w, h, &kernel);
    Ok(Plane::from_vec(src.width(), src.height(), out))
}

fn gaussian_kernel(radius: u32, sigma: f32) -> DrapeResult<Vec<f32>> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(DrapeError::validation("blur sigma must be > 0"));
    }

    let r = radius as i64;
    let denom = 2.0 * f64::from(sigma) * f64::from(sigma);
    let weights: Vec<f64> = (-r..=r)
        .map(|i| {
            let x = i as f64;
            (-x * x / denom).exp()
        })
        .collect();
    let sum: f64 = weights.iter().sum();
    if sum <= 0.0 {
        return Err(DrapeError::validation("gaussian kernel sum is zero"));
    }
    Ok(weights.into_iter().map(|w| (w / sum) as f32).collect())
}

fn horizontal_pass(src: &[f32], dst: &mut [f32], w: usize, h: usize, k: &[f32]) {
    let radius = (k.len() / 2) as i64;
    for y in 0..h {
        let row = &src[y * w..(y + 1) * w];
        for x in 0..w {
            let mut acc = 0.0f32;
            for (ki, &kw) in k.iter().enumerate() {
                let sx = reflect101(x as i64 + ki as i64 - radius, w);
                acc += kw * row[sx];
            }
            dst[y * w + x] = acc;
        }
    }
}

fn vertical_pass(src: &[f32], dst: &mut [f32], w: usize, h: usize, k: &[f32]) {
    let radius = (k.len() / 2) as i64;
    for y in 0..h {
        for x in 0..w {
            let mut acc = 0.0f32;
            for (ki, &kw) in k.iter().enumerate() {
                let sy = reflect101(y as i64 + ki as i64 - radius, h);
                acc += kw * src[sy * w + x];
            }
            dst[y * w + x] = acc;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/blur.rs"]
mod tests;
