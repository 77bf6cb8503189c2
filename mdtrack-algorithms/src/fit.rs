//! Tangent-line least-squares fitting.
//!
//! The fit minimizes sum((a*x_i + b*y_i + c - r_i)^2) over unconstrained
//! (a, b, c) via the 3x3 normal equations, then renormalizes (a, b) to
//! unit length. This is an approximation of the constrained problem that
//! requires a^2 + b^2 = 1 during minimization; the two-step procedure is
//! kept for output parity with the production chain.
//! [`fit_tangent_line_constrained`] solves the exact problem and exists
//! for validation only.

use mdtrack_core::{Error, Line, Position, Result};

/// Degrees of freedom: six measurements minus three line parameters.
pub const NDF: f64 = 3.0;

/// Determinant magnitude below which the normal equations are singular.
const DET_EPSILON: f64 = 1e-12;

/// Pivot magnitude below which elimination stops.
const PIVOT_EPSILON: f64 = 1e-15;

/// A fitted line with its per-tube residuals and quality score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TangentFit {
    /// The normalized fitted line.
    pub line: Line,
    /// Tangency residual per tube: distance to the line minus |r_i|.
    pub residuals: [f64; 6],
    /// Sum of squared residuals divided by [`NDF`].
    pub chi2ndf: f64,
}

/// Fits the least-squares tangent line to six wires with signed radii.
///
/// # Errors
/// Returns [`Error::DegenerateFit`] when the normal equations are
/// singular or the raw (a, b) solution has zero magnitude.
pub fn fit_tangent_line(positions: &[Position; 6], radii: &[f64; 6]) -> Result<Line> {
    let mut ata = [[0.0_f64; 3]; 3];
    let mut atb = [0.0_f64; 3];
    for (p, &r) in positions.iter().zip(radii.iter()) {
        let (x, y) = (p.x, p.y);
        ata[0][0] += x * x;
        ata[0][1] += x * y;
        ata[0][2] += x;
        ata[1][0] += y * x;
        ata[1][1] += y * y;
        ata[1][2] += y;
        ata[2][0] += x;
        ata[2][1] += y;
        ata[2][2] += 1.0;
        atb[0] += x * r;
        atb[1] += y * r;
        atb[2] += r;
    }

    let det = ata[0][0] * (ata[1][1] * ata[2][2] - ata[1][2] * ata[2][1])
        - ata[0][1] * (ata[1][0] * ata[2][2] - ata[1][2] * ata[2][0])
        + ata[0][2] * (ata[1][0] * ata[2][1] - ata[1][1] * ata[2][0]);
    if det.abs() < DET_EPSILON {
        return Err(Error::DegenerateFit("singular normal equations".into()));
    }

    // Gaussian elimination with partial pivoting on the augmented matrix.
    let mut m = [[0.0_f64; 4]; 3];
    for i in 0..3 {
        m[i][..3].copy_from_slice(&ata[i]);
        m[i][3] = atb[i];
    }
    for i in 0..3 {
        let mut pivot = i;
        for row in (i + 1)..3 {
            if m[row][i].abs() > m[pivot][i].abs() {
                pivot = row;
            }
        }
        if m[pivot][i].abs() < PIVOT_EPSILON {
            return Err(Error::DegenerateFit("vanishing pivot".into()));
        }
        if pivot != i {
            m.swap(i, pivot);
        }
        let div = m[i][i];
        for col in i..4 {
            m[i][col] /= div;
        }
        for row in 0..3 {
            if row != i {
                let factor = m[row][i];
                for col in i..4 {
                    m[row][col] -= factor * m[i][col];
                }
            }
        }
    }

    let (a, b, c) = (m[0][3], m[1][3], m[2][3]);
    let norm = (a * a + b * b).sqrt();
    if norm <= f64::EPSILON {
        return Err(Error::DegenerateFit("zero-norm line".into()));
    }
    Ok(Line { a: a / norm, b: b / norm, c: c / norm })
}

/// Computes per-tube residuals and chi2/ndf for a line.
#[must_use]
pub fn score(line: &Line, positions: &[Position; 6], radii: &[f64; 6]) -> ([f64; 6], f64) {
    let mut residuals = [0.0_f64; 6];
    let mut chi2 = 0.0;
    for i in 0..6 {
        let res = line.distance_to(positions[i]) - radii[i].abs();
        residuals[i] = res;
        chi2 += res * res;
    }
    (residuals, chi2 / NDF)
}

/// Fits and scores in one step.
///
/// # Errors
/// Propagates [`Error::DegenerateFit`] from [`fit_tangent_line`].
pub fn fit_and_score(positions: &[Position; 6], radii: &[f64; 6]) -> Result<TangentFit> {
    let line = fit_tangent_line(positions, radii)?;
    let (residuals, chi2ndf) = score(&line, positions, radii);
    Ok(TangentFit { line, residuals, chi2ndf })
}

/// Solves the exact constrained problem: minimize the tangency sum with
/// a^2 + b^2 = 1 enforced during minimization, not after.
///
/// The offset c is eliminated at the data centroid, (a, b) is
/// parametrized as (cos phi, sin phi), and phi is Newton-refined from
/// the two-step solution. Exposed for validating the production
/// approximation; the pipeline does not call it.
///
/// # Errors
/// Returns [`Error::DegenerateFit`] when no two-step seed exists.
pub fn fit_tangent_line_constrained(positions: &[Position; 6], radii: &[f64; 6]) -> Result<Line> {
    let seed = fit_tangent_line(positions, radii)?;

    let n = 6.0;
    let mean_x = positions.iter().map(|p| p.x).sum::<f64>() / n;
    let mean_y = positions.iter().map(|p| p.y).sum::<f64>() / n;
    let mean_r = radii.iter().sum::<f64>() / n;

    let mut phi = seed.b.atan2(seed.a);
    for _ in 0..32 {
        let (sin, cos) = phi.sin_cos();
        let mut g1 = 0.0;
        let mut g2 = 0.0;
        for (p, &r) in positions.iter().zip(radii.iter()) {
            let cx = p.x - mean_x;
            let cy = p.y - mean_y;
            let cr = r - mean_r;
            let u = cos * cx + sin * cy - cr;
            let v = -sin * cx + cos * cy;
            g1 += 2.0 * u * v;
            g2 += 2.0 * (v * v - u * (u + cr));
        }
        if g2.abs() < PIVOT_EPSILON {
            break;
        }
        let step = g1 / g2;
        phi -= step;
        if step.abs() < 1e-14 {
            break;
        }
    }

    let (sin, cos) = phi.sin_cos();
    let c = mean_r - cos * mean_x - sin * mean_y;
    Ok(Line { a: cos, b: sin, c })
}
