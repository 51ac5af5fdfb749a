use kurbo::Point;
use nalgebra::{Matrix3, SMatrix, SVector, Vector3};

use crate::foundation::error::{DrapeError, DrapeResult};

const EPS_AREA: f64 = 1e-6;

/// Projective transform `dst ~ H * src` in homogeneous pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Homography {
    h: Matrix3<f64>,
}

impl Homography {
    /// Identity transform.
    pub fn identity() -> Self {
        Self {
            h: Matrix3::identity(),
        }
    }

    /// Row-major coefficients.
    pub fn to_array(&self) -> [[f64; 3]; 3] {
        [
            [self.h[(0, 0)], self.h[(0, 1)], self.h[(0, 2)]],
            [self.h[(1, 0)], self.h[(1, 1)], self.h[(1, 2)]],
            [self.h[(2, 0)], self.h[(2, 1)], self.h[(2, 2)]],
        ]
    }

    /// Map a point. Points on the line at infinity map to `None`.
    pub fn apply(&self, p: Point) -> Option<Point> {
        let v = self.h * Vector3::new(p.x, p.y, 1.0);
        let w = v[2];
        if w.abs() < 1e-12 {
            return None;
        }
        Some(Point::new(v[0] / w, v[1] / w))
    }

    /// Inverse transform, `None` when singular.
    pub fn inverse(&self) -> Option<Self> {
        self.h.try_inverse().map(|h| Self { h })
    }

    /// Solve the unique homography taking `src[i]` to `dst[i]` for four correspondences.
    ///
    /// Both quads must be non-degenerate: no duplicate corners, no three collinear corners.
    pub fn from_quads(src: &[Point; 4], dst: &[Point; 4]) -> DrapeResult<Self> {
        check_quad(src, "source")?;
        check_quad(dst, "destination")?;

        // Unknowns [h11 h12 h13 h21 h22 h23 h31 h32], h33 = 1:
        // h11 x + h12 y + h13 - u h31 x - u h32 y = u
        // h21 x + h22 y + h23 - v h31 x - v h32 y = v
        let mut a = SMatrix::<f64, 8, 8>::zeros();
        let mut b = SVector::<f64, 8>::zeros();
        for k in 0..4 {
            let (x, y) = (src[k].x, src[k].y);
            let (u, v) = (dst[k].x, dst[k].y);

            let r0 = 2 * k;
            a[(r0, 0)] = x;
            a[(r0, 1)] = y;
            a[(r0, 2)] = 1.0;
            a[(r0, 6)] = -u * x;
            a[(r0, 7)] = -u * y;
            b[r0] = u;

            let r1 = 2 * k + 1;
            a[(r1, 3)] = x;
            a[(r1, 4)] = y;
            a[(r1, 5)] = 1.0;
            a[(r1, 6)] = -v * x;
            a[(r1, 7)] = -v * y;
            b[r1] = v;
        }

        let sol = a
            .lu()
            .solve(&b)
            .ok_or_else(|| DrapeError::degenerate("corner correspondence has no solution"))?;
        if sol.iter().any(|v| !v.is_finite()) {
            return Err(DrapeError::degenerate("homography is not finite"));
        }

        let h = Matrix3::new(
            sol[0], sol[1], sol[2], //
            sol[3], sol[4], sol[5], //
            sol[6], sol[7], 1.0,
        );
        if h.determinant().abs() < 1e-12 {
            return Err(DrapeError::degenerate("homography is singular"));
        }
        Ok(Self { h })
    }
}

/// Twice the signed area of triangle `abc`.
fn cross(a: Point, b: Point, c: Point) -> f64 {
    (b - a).cross(c - a)
}

fn check_quad(q: &[Point; 4], which: &str) -> DrapeResult<()> {
    if q.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
        return Err(DrapeError::degenerate(format!(
            "{which} corners must be finite"
        )));
    }
    for i in 0..4 {
        for j in (i + 1)..4 {
            if (q[i] - q[j]).hypot() < 1e-9 {
                return Err(DrapeError::degenerate(format!(
                    "{which} corners {i} and {j} coincide"
                )));
            }
        }
    }
    for skip in 0..4 {
        let tri: Vec<Point> = (0..4).filter(|&i| i != skip).map(|i| q[i]).collect();
        if cross(tri[0], tri[1], tri[2]).abs() < EPS_AREA {
            return Err(DrapeError::degenerate(format!(
                "three {which} corners are collinear"
            )));
        }
    }
    let area2 = cross(q[0], q[1], q[2]) + cross(q[0], q[2], q[3]);
    if area2.abs() < EPS_AREA {
        return Err(DrapeError::degenerate(format!("{which} quad has zero area")));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/homography.rs"]
mod tests;
