//! Drift-time to drift-radius (RT) relation.
//!
//! A monotonic piecewise-linear mapping built from calibration samples.
//! Queries outside the sampled range clamp to the first/last radius.

use crate::error::{Error, Result};

/// Piecewise-linear RT relation with a fixed t0 offset.
#[derive(Debug, Clone)]
pub struct RtRelation {
    times: Vec<f64>,
    radii: Vec<f64>,
    t0: f64,
}

impl RtRelation {
    /// Builds a relation from (time, radius) samples.
    ///
    /// Samples are sorted by time; `t0` is subtracted from every query
    /// before lookup. At least two finite samples are required.
    pub fn from_samples(samples: &[(f64, f64)], t0: f64) -> Result<Self> {
        if samples.len() < 2 {
            return Err(Error::Config(format!(
                "RT relation needs at least 2 samples, got {}",
                samples.len()
            )));
        }
        if samples.iter().any(|(t, r)| !t.is_finite() || !r.is_finite()) {
            return Err(Error::Config("RT relation sample is not finite".into()));
        }
        let mut sorted: Vec<(f64, f64)> = samples.to_vec();
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0));
        let times = sorted.iter().map(|s| s.0).collect();
        let radii = sorted.iter().map(|s| s.1).collect();
        Ok(Self { times, radii, t0 })
    }

    /// Returns the t0 offset.
    #[must_use]
    pub fn t0(&self) -> f64 {
        self.t0
    }

    /// Maps a raw drift time to a drift radius (mm).
    #[must_use]
    pub fn radius_at(&self, drift_time: f64) -> f64 {
        let t = drift_time - self.t0;
        let last = self.times.len() - 1;
        if t <= self.times[0] {
            return self.radii[0];
        }
        if t >= self.times[last] {
            return self.radii[last];
        }
        // First sample at or above t; the guards above keep i in 1..=last.
        let i = self.times.partition_point(|&s| s < t);
        let (ta, tb) = (self.times[i - 1], self.times[i]);
        let (ra, rb) = (self.radii[i - 1], self.radii[i]);
        ra + (t - ta) / (tb - ta) * (rb - ra)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_needs_two_samples() {
        assert!(RtRelation::from_samples(&[(0.0, 0.0)], 0.0).is_err());
    }

    #[test]
    fn test_exact_samples_and_interpolation() {
        let rt = RtRelation::from_samples(&[(0.0, 0.0), (100.0, 2.0), (300.0, 8.0)], 0.0).unwrap();
        assert_abs_diff_eq!(rt.radius_at(100.0), 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(rt.radius_at(50.0), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(rt.radius_at(200.0), 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_clamping_outside_table() {
        let rt = RtRelation::from_samples(&[(10.0, 1.0), (20.0, 3.0)], 0.0).unwrap();
        assert_abs_diff_eq!(rt.radius_at(-5.0), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(rt.radius_at(500.0), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_t0_offset_applies_before_lookup() {
        let rt = RtRelation::from_samples(&[(0.0, 0.0), (100.0, 2.0)], 489.624).unwrap();
        assert_abs_diff_eq!(rt.radius_at(489.624 + 50.0), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_unsorted_samples_are_sorted() {
        let rt = RtRelation::from_samples(&[(100.0, 2.0), (0.0, 0.0)], 0.0).unwrap();
        assert_abs_diff_eq!(rt.radius_at(25.0), 0.5, epsilon = 1e-12);
    }
}
