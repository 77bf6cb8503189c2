//! Hit types and the arena-indexed hit store.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One drift-tube reading: tube address, trigger identity, and timing.
///
/// Immutable once parsed. Hits are owned by a [`HitStore`] for the lifetime
/// of a run and referenced by index, never by raw address, so the store can
/// be shared across threads without invalidation concerns.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Hit {
    /// Module id (one readout unit, three layers of tubes).
    pub module: u16,
    /// Channel id within the module (layer + column).
    pub channel: u16,
    /// Event id assigned by the acquisition system.
    pub event_id: u32,
    /// Trigger leading-edge timestamp, monotonically comparable.
    pub trigger: i64,
    /// Drift time (ns).
    pub drift_time: f64,
    /// ADC time (ns).
    pub adc_time: f64,
    /// Corrected time (ns).
    pub corr_time: f64,
    /// Measured drift radius (mm), non-negative; sign is assigned later
    /// by the enumeration convention.
    pub drift_radius: f64,
}

/// Deduplication identity of a track's designated top hit.
///
/// Totally ordered so best-candidate maps iterate deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TopKey {
    /// Module id of the top hit.
    pub module: u16,
    /// Channel id of the top hit.
    pub channel: u16,
    /// Event id of the top hit.
    pub event_id: u32,
    /// Trigger timestamp of the top hit.
    pub trigger: i64,
}

impl TopKey {
    /// Builds the key identifying `hit`.
    #[inline]
    #[must_use]
    pub fn of(hit: &Hit) -> Self {
        Self {
            module: hit.module,
            channel: hit.channel,
            event_id: hit.event_id,
            trigger: hit.trigger,
        }
    }
}

/// Owns every hit of a run and hands out read-only index-based views.
#[derive(Debug, Clone, Default)]
pub struct HitStore {
    hits: Vec<Hit>,
}

impl HitStore {
    /// Takes ownership of a parsed hit collection.
    #[must_use]
    pub fn from_hits(hits: Vec<Hit>) -> Self {
        Self { hits }
    }

    /// Returns the number of stored hits.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    /// Returns true if the store holds no hits.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Returns the hit at `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds; indices obtained from this
    /// store's views are always valid.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> &Hit {
        &self.hits[index]
    }

    /// Iterates over all hits with their indices.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Hit)> {
        self.hits.iter().enumerate()
    }

    /// Iterates over hits whose trigger timestamp lies in `[t0, t1)`.
    pub fn hits_in_window(&self, t0: i64, t1: i64) -> impl Iterator<Item = (usize, &Hit)> {
        self.hits
            .iter()
            .enumerate()
            .filter(move |(_, h)| h.trigger >= t0 && h.trigger < t1)
    }

    /// Iterates over hits occupying a given (module, channel) address.
    pub fn hits_at(&self, module: u16, channel: u16) -> impl Iterator<Item = (usize, &Hit)> {
        self.hits
            .iter()
            .enumerate()
            .filter(move |(_, h)| h.module == module && h.channel == channel)
    }

    /// Returns the inclusive trigger-timestamp range, or None when empty.
    #[must_use]
    pub fn trigger_range(&self) -> Option<(i64, i64)> {
        let first = self.hits.first()?.trigger;
        let (min, max) = self
            .hits
            .iter()
            .fold((first, first), |(lo, hi), h| (lo.min(h.trigger), hi.max(h.trigger)));
        Some((min, max))
    }
}

impl std::ops::Index<usize> for HitStore {
    type Output = Hit;

    #[inline]
    fn index(&self, index: usize) -> &Hit {
        &self.hits[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(module: u16, channel: u16, trigger: i64) -> Hit {
        Hit {
            module,
            channel,
            event_id: 1,
            trigger,
            drift_time: 0.0,
            adc_time: 0.0,
            corr_time: 0.0,
            drift_radius: 1.0,
        }
    }

    #[test]
    fn test_window_view_is_half_open() {
        let store = HitStore::from_hits(vec![hit(0, 0, 10), hit(0, 1, 20), hit(0, 2, 30)]);
        let in_window: Vec<usize> = store.hits_in_window(10, 30).map(|(i, _)| i).collect();
        assert_eq!(in_window, vec![0, 1]);
    }

    #[test]
    fn test_hits_at_address() {
        let store = HitStore::from_hits(vec![hit(0, 5, 10), hit(1, 5, 11), hit(0, 5, 12)]);
        let found: Vec<usize> = store.hits_at(0, 5).map(|(i, _)| i).collect();
        assert_eq!(found, vec![0, 2]);
        assert_eq!(store.hits_at(2, 5).count(), 0);
    }

    #[test]
    fn test_trigger_range() {
        assert_eq!(HitStore::default().trigger_range(), None);
        let store = HitStore::from_hits(vec![hit(0, 0, 42), hit(0, 1, 7), hit(0, 2, 99)]);
        assert_eq!(store.trigger_range(), Some((7, 99)));
    }

    #[test]
    fn test_top_key_ordering() {
        let a = TopKey { module: 0, channel: 1, event_id: 1, trigger: 3 };
        let b = TopKey { module: 0, channel: 1, event_id: 1, trigger: 4 };
        assert!(a < b);
        assert_eq!(a, TopKey::of(&Hit { drift_radius: 9.0, ..hit(0, 1, 3) }));
    }
}
