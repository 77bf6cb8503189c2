//! Fitted track output types.

use crate::geometry::Position;
use crate::hit::TopKey;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A normalized line a*x + b*y + c = 0 with a^2 + b^2 = 1.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Line {
    /// Normal-vector x component.
    pub a: f64,
    /// Normal-vector y component.
    pub b: f64,
    /// Offset term.
    pub c: f64,
}

impl Line {
    /// Signed offset of a point from the line.
    #[inline]
    #[must_use]
    pub fn signed_offset(&self, p: Position) -> f64 {
        self.a * p.x + self.b * p.y + self.c
    }

    /// Perpendicular distance from a point to the line.
    #[inline]
    #[must_use]
    pub fn distance_to(&self, p: Position) -> f64 {
        self.signed_offset(p).abs()
    }
}

/// One output row: a source hit annotated with its fit results.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrackHit {
    /// Module id of the source hit.
    pub module: u16,
    /// Channel id of the source hit.
    pub channel: u16,
    /// Event id of the source hit.
    pub event_id: u32,
    /// Trigger timestamp of the source hit.
    pub trigger: i64,
    /// Drift time (ns).
    pub drift_time: f64,
    /// Corrected time (ns).
    pub corr_time: f64,
    /// ADC time (ns).
    pub adc_time: f64,
    /// Trigger timestamp minus the bundle's mean trigger timestamp.
    pub dt: f64,
    /// Fitted wire x position (mm).
    pub x: f64,
    /// Fitted wire y position (mm).
    pub y: f64,
    /// Measured drift radius (mm).
    pub drift_radius: f64,
    /// Tangency residual: wire-to-line distance minus the drift radius.
    pub residual: f64,
}

impl TrackHit {
    /// Builds the deduplication key identifying this row's source hit.
    #[inline]
    #[must_use]
    pub fn top_key(&self) -> TopKey {
        TopKey {
            module: self.module,
            channel: self.channel,
            event_id: self.event_id,
            trigger: self.trigger,
        }
    }
}

/// Six hits sharing one fitted line and quality score.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrackBundle {
    /// Track id, unique within a run's output.
    pub track_id: u32,
    /// The six member hits with their per-tube fit annotations.
    pub hits: Vec<TrackHit>,
    /// The fitted tangent line.
    pub line: Line,
    /// Sum of squared residuals over degrees of freedom.
    pub chi2ndf: f64,
}

impl TrackBundle {
    /// Key of the geometrically highest member hit (maximum y), used by
    /// the global deduplication pass. Ties keep the earliest member.
    /// Returns None for an empty bundle.
    #[must_use]
    pub fn top_key_by_max_y(&self) -> Option<TopKey> {
        let mut top = self.hits.first()?;
        for hit in &self.hits[1..] {
            if hit.y > top.y {
                top = hit;
            }
        }
        Some(top.top_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn track_hit(channel: u16, y: f64) -> TrackHit {
        TrackHit {
            module: 0,
            channel,
            event_id: 1,
            trigger: 100,
            drift_time: 0.0,
            corr_time: 0.0,
            adc_time: 0.0,
            dt: 0.0,
            x: 0.0,
            y,
            drift_radius: 0.0,
            residual: 0.0,
        }
    }

    #[test]
    fn test_line_distance() {
        let line = Line { a: 0.0, b: 1.0, c: -5.0 };
        assert_abs_diff_eq!(line.distance_to(Position::new(3.0, 7.0)), 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(line.signed_offset(Position::new(3.0, 2.0)), -3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_top_key_by_max_y_prefers_first_on_tie() {
        let bundle = TrackBundle {
            track_id: 0,
            hits: vec![track_hit(1, 67.0), track_hit(2, 41.0), track_hit(3, 67.0)],
            line: Line { a: 0.0, b: 1.0, c: 0.0 },
            chi2ndf: 0.0,
        };
        assert_eq!(bundle.top_key_by_max_y().unwrap().channel, 1);
    }

    #[test]
    fn test_top_key_by_max_y_empty() {
        let bundle = TrackBundle {
            track_id: 0,
            hits: Vec::new(),
            line: Line { a: 0.0, b: 1.0, c: 0.0 },
            chi2ndf: 0.0,
        };
        assert!(bundle.top_key_by_max_y().is_none());
    }
}
