//! Curve flattening.
//!
//! Turns a sparse control point list into a fixed-step polyline sample of
//! the Bezier curve, with arc-length data used by velocity computation.

use crate::error::{BeatmapError, Result};

/// Fixed approximation step in osu!pixels; the sample count is derived
/// from the estimated curve length in these units.
const APPROX_STEP: f32 = 4.0;

/// A flattened curve.
///
/// `points` is indexed over samples, while `segment_distances` is indexed
/// over the ORIGINAL control points (`[0]` followed by each control
/// point's distance from its predecessor). The two arrays do not share an
/// index space; consumers must not treat `segment_distances[i]` as the
/// distance of sample `i`. Use [`cumulative_sample_distances`] for a
/// table aligned with `points`.
///
/// [`cumulative_sample_distances`]: CurveSample::cumulative_sample_distances
#[derive(Debug, Clone, PartialEq)]
pub struct CurveSample {
    pub points: Vec<(f32, f32)>,
    pub segment_distances: Vec<f32>,
    pub total_distance: f32,
}

impl CurveSample {
    /// Flattens `control_points` into a polyline.
    ///
    /// The sample count is `floor(approx_length / 4) + 2` where
    /// `approx_length` is the summed distance between consecutive control
    /// points, so even a degenerate curve gets two samples and the
    /// `t = i / (n - 1)` parameter never divides by zero.
    pub fn flatten(control_points: &[(f32, f32)]) -> Result<CurveSample> {
        if control_points.len() < 2 {
            return Err(BeatmapError::DegenerateCurve {
                count: control_points.len(),
            });
        }

        let mut approx_length = 0.0;
        for pair in control_points.windows(2) {
            approx_length += dist(pair[0], pair[1]);
        }

        let ncurve = (approx_length / APPROX_STEP) as usize + 2;
        let mut points = Vec::with_capacity(ncurve);
        for i in 0..ncurve {
            let t = i as f32 / (ncurve - 1) as f32;
            points.push(point_at(control_points, t));
        }

        let mut segment_distances = vec![0.0];
        let mut total_distance = 0.0;
        for i in 1..control_points.len() {
            let d = dist(control_points[i], control_points[i - 1]);
            segment_distances.push(d);
            total_distance += d;
        }

        Ok(CurveSample {
            points,
            segment_distances,
            total_distance,
        })
    }

    /// Cumulative arc length at each SAMPLED point, aligned with
    /// `points`. This is the consistent-index alternative to
    /// `segment_distances`; the last entry is the polyline's length,
    /// which differs from `total_distance` (a control point chord sum).
    pub fn cumulative_sample_distances(&self) -> Vec<f32> {
        let mut cumulative = Vec::with_capacity(self.points.len());
        let mut running = 0.0;
        cumulative.push(running);
        for pair in self.points.windows(2) {
            running += dist(pair[0], pair[1]);
            cumulative.push(running);
        }
        cumulative
    }
}

/// Evaluates the degree `k` Bezier curve defined by all of
/// `control_points` at parameter `t`, as the Bernstein-weighted sum
/// `sum_j C(k,j) t^j (1-t)^(k-j) P_j`.
pub fn point_at(control_points: &[(f32, f32)], t: f32) -> (f32, f32) {
    let n = control_points.len();
    let mut c = (0.0, 0.0);

    for (i, p) in control_points.iter().enumerate() {
        let b = bernstein(i, n - 1, t);
        c.0 += p.0 * b;
        c.1 += p.1 * b;
    }

    c
}

/// Bernstein basis polynomial `C(n,i) t^i (1-t)^(n-i)`. The binomial
/// coefficient is accumulated in f64 so high-degree curves don't overflow
/// an integer factorial.
fn bernstein(i: usize, n: usize, t: f32) -> f32 {
    let mut binom = 1.0f64;
    for k in 0..i {
        binom = binom * (n - k) as f64 / (k + 1) as f64;
    }

    let t = t as f64;
    (binom * t.powi(i as i32) * (1.0 - t).powi((n - i) as i32)) as f32
}

fn dist(a: (f32, f32), b: (f32, f32)) -> f32 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    (dx * dx + dy * dy).sqrt()
}
