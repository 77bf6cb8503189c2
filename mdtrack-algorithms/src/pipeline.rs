//! Run-level orchestration: windows, parallelism, and statistics.

use rayon::prelude::*;

use mdtrack_core::{Error, GeometryTable, HitStore, ReconstructionConfig, Result, TrackBundle};

use crate::select::{best_tracks_in_window, dedupe_global, WindowStats};

/// Execution options that do not affect the result.
#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    /// Process windows on the rayon thread pool. Output is identical to
    /// the sequential order either way.
    pub parallel: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self { parallel: true }
    }
}

/// Counters reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Hits available in the store.
    pub hits: usize,
    /// Time windows derived from the trigger range.
    pub windows: usize,
    /// Candidates scored across all windows.
    pub candidates_tested: usize,
    /// Candidates above the chi2/ndf cut.
    pub rejected_chi2: usize,
    /// Candidates with a degenerate fit.
    pub degenerate_fits: usize,
    /// Candidates referencing an unregistered address.
    pub unknown_address: usize,
    /// Bundles retained by the per-window passes.
    pub tracks_before_dedup: usize,
    /// Bundles surviving the global pass.
    pub tracks_after_dedup: usize,
}

impl RunStats {
    fn merge_window(&mut self, window: &WindowStats) {
        self.candidates_tested += window.candidates_tested;
        self.rejected_chi2 += window.rejected_chi2;
        self.degenerate_fits += window.degenerate_fits;
        self.unknown_address += window.unknown_address;
    }
}

/// Runs the full reconstruction: per-window enumeration and selection,
/// sequential track-id assignment in window order, then the global
/// deduplication pass.
///
/// # Errors
/// Returns [`Error::Config`] for a non-positive window width.
pub fn reconstruct(
    store: &HitStore,
    geometry: &GeometryTable,
    config: &ReconstructionConfig,
    options: &PipelineOptions,
) -> Result<(Vec<TrackBundle>, RunStats)> {
    if config.window_width <= 0 {
        return Err(Error::Config(format!(
            "window width must be positive, got {}",
            config.window_width
        )));
    }

    let mut stats = RunStats { hits: store.len(), ..RunStats::default() };

    let Some((trigger_min, trigger_max)) = store.trigger_range() else {
        return Ok((Vec::new(), stats));
    };

    let mut starts = Vec::new();
    let mut start = trigger_min;
    while start <= trigger_max {
        starts.push(start);
        start += config.window_width;
    }
    stats.windows = starts.len();

    let process = |&w0: &i64| best_tracks_in_window(store, geometry, config, w0, w0 + config.window_width);
    let outcomes: Vec<(Vec<TrackBundle>, WindowStats)> = if options.parallel {
        starts.par_iter().map(process).collect()
    } else {
        starts.iter().map(process).collect()
    };

    let mut all_bundles = Vec::new();
    let mut next_id: u32 = 0;
    for (bundles, window_stats) in outcomes {
        stats.merge_window(&window_stats);
        for mut bundle in bundles {
            bundle.track_id = next_id;
            next_id += 1;
            all_bundles.push(bundle);
        }
    }
    stats.tracks_before_dedup = all_bundles.len();

    let retained = dedupe_global(all_bundles);
    stats.tracks_after_dedup = retained.len();
    Ok((retained, stats))
}
