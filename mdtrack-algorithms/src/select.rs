//! Track selection and deduplication.
//!
//! The per-window pass folds every accepted candidate into an ordered
//! best-map keyed by the convention-designated top hit; the global pass
//! re-keys surviving bundles on their maximum-y member. Replacement is
//! strictly-better in both passes.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use mdtrack_core::{
    GeometryTable, HitStore, Position, ReconstructionConfig, TopKey, TrackBundle, TrackHit,
};

use crate::candidates::{slot_channels, CandidateIter, WindowIndex, SLOT_A_TOP};
use crate::fit::{fit_and_score, TangentFit};

/// Per-window rejection and acceptance counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowStats {
    /// Candidates scored (including rejected ones).
    pub candidates_tested: usize,
    /// Candidates above the chi2/ndf cut.
    pub rejected_chi2: usize,
    /// Candidates whose fit was degenerate.
    pub degenerate_fits: usize,
    /// Candidates referencing an address missing from the geometry.
    pub unknown_address: usize,
}

impl WindowStats {
    /// Accumulates another window's counters into this one.
    pub fn merge(&mut self, other: &WindowStats) {
        self.candidates_tested += other.candidates_tested;
        self.rejected_chi2 += other.rejected_chi2;
        self.degenerate_fits += other.degenerate_fits;
        self.unknown_address += other.unknown_address;
    }
}

/// A candidate that survived scoring, pending selection.
struct ScoredCandidate {
    hits: [usize; 6],
    positions: [Position; 6],
    fit: TangentFit,
}

/// Enumerates and scores every candidate of one window, returning one
/// bundle per surviving convention top-key.
///
/// Track ids are assigned later by the pipeline; bundles come back with
/// a placeholder id, ordered by top-key.
#[must_use]
pub fn best_tracks_in_window(
    store: &HitStore,
    geometry: &GeometryTable,
    config: &ReconstructionConfig,
    t0: i64,
    t1: i64,
) -> (Vec<TrackBundle>, WindowStats) {
    let index = WindowIndex::build(store, t0, t1);
    let mut stats = WindowStats::default();
    let mut best: BTreeMap<TopKey, ScoredCandidate> = BTreeMap::new();

    if index.is_empty() {
        return (Vec::new(), stats);
    }

    for convention in &config.conventions {
        for &(module_a, module_b) in &config.module_pairs {
            if !index.has_module(module_a) || !index.has_module(module_b) {
                continue;
            }
            for base in 0..config.geometry.columns() {
                let channels = slot_channels(convention, base);
                let Some(a_bot) = index.slot(module_a, channels[0]) else { continue };
                let Some(a_med) = index.slot(module_a, channels[1]) else { continue };
                let Some(a_top) = index.slot(module_a, channels[2]) else { continue };
                let Some(b_bot) = index.slot(module_b, channels[0]) else { continue };
                let Some(b_med) = index.slot(module_b, channels[1]) else { continue };
                let Some(b_top) = index.slot(module_b, channels[2]) else { continue };

                for hits in CandidateIter::new([a_bot, a_med, a_top, b_bot, b_med, b_top]) {
                    stats.candidates_tested += 1;

                    let mut positions = [Position::default(); 6];
                    let mut radii = [0.0_f64; 6];
                    let mut resolved = true;
                    for (i, &hit_index) in hits.iter().enumerate() {
                        let hit = &store[hit_index];
                        match geometry.position_of(hit.module, hit.channel) {
                            Ok(p) => {
                                positions[i] = p;
                                radii[i] = hit.drift_radius * convention.signs[i];
                            }
                            Err(_) => {
                                stats.unknown_address += 1;
                                resolved = false;
                                break;
                            }
                        }
                    }
                    if !resolved {
                        continue;
                    }

                    let Ok(fit) = fit_and_score(&positions, &radii) else {
                        stats.degenerate_fits += 1;
                        continue;
                    };
                    if fit.chi2ndf > config.chi2ndf_cut {
                        stats.rejected_chi2 += 1;
                        continue;
                    }

                    let key = TopKey::of(&store[hits[SLOT_A_TOP]]);
                    let candidate = ScoredCandidate { hits, positions, fit };
                    match best.entry(key) {
                        Entry::Vacant(slot) => {
                            slot.insert(candidate);
                        }
                        Entry::Occupied(mut slot) => {
                            if fit.chi2ndf < slot.get().fit.chi2ndf {
                                slot.insert(candidate);
                            }
                        }
                    }
                }
            }
        }
    }

    let bundles = best
        .into_values()
        .map(|candidate| build_bundle(store, &candidate))
        .collect();
    (bundles, stats)
}

/// Materializes a selected candidate into a six-row bundle with each
/// row's offset from the bundle's mean trigger timestamp.
fn build_bundle(store: &HitStore, candidate: &ScoredCandidate) -> TrackBundle {
    let mean_trigger = candidate
        .hits
        .iter()
        .map(|&i| store[i].trigger as f64)
        .sum::<f64>()
        / 6.0;

    let hits = candidate
        .hits
        .iter()
        .enumerate()
        .map(|(i, &hit_index)| {
            let hit = &store[hit_index];
            TrackHit {
                module: hit.module,
                channel: hit.channel,
                event_id: hit.event_id,
                trigger: hit.trigger,
                drift_time: hit.drift_time,
                corr_time: hit.corr_time,
                adc_time: hit.adc_time,
                dt: hit.trigger as f64 - mean_trigger,
                x: candidate.positions[i].x,
                y: candidate.positions[i].y,
                drift_radius: hit.drift_radius,
                residual: candidate.fit.residuals[i],
            }
        })
        .collect();

    TrackBundle {
        track_id: 0,
        hits,
        line: candidate.fit.line,
        chi2ndf: candidate.fit.chi2ndf,
    }
}

/// Global deduplication across all windows: re-keys each bundle on its
/// maximum-y hit and keeps the strictly best chi2/ndf per key.
///
/// Bundles are visited in ascending track-id order (the order the
/// pipeline assigns), so ties keep the earliest bundle. The result is
/// sorted by track id.
#[must_use]
pub fn dedupe_global(bundles: Vec<TrackBundle>) -> Vec<TrackBundle> {
    let mut best: BTreeMap<TopKey, TrackBundle> = BTreeMap::new();
    for bundle in bundles {
        if bundle.hits.len() != 6 {
            continue;
        }
        let Some(key) = bundle.top_key_by_max_y() else { continue };
        match best.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(bundle);
            }
            Entry::Occupied(mut slot) => {
                if bundle.chi2ndf < slot.get().chi2ndf {
                    slot.insert(bundle);
                }
            }
        }
    }
    let mut retained: Vec<TrackBundle> = best.into_values().collect();
    retained.sort_by_key(|b| b.track_id);
    retained
}
