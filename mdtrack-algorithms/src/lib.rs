//! mdtrack-algorithms: Track reconstruction algorithms.
//!
//! This crate provides the reconstruction pipeline over a loaded hit
//! store:
//! - **Tangent-line fit** - least-squares line tangent to six drift circles
//! - **Candidate enumeration** - time-windowed six-slot products
//! - **Selection** - per-window and global best-per-top-hit deduplication
//!
#![warn(missing_docs)]

pub mod candidates;
pub mod fit;
mod pipeline;
mod select;

pub use candidates::{slot_channels, CandidateIter, WindowIndex};
pub use fit::{fit_and_score, fit_tangent_line, fit_tangent_line_constrained, TangentFit, NDF};
pub use pipeline::{reconstruct, PipelineOptions, RunStats};
pub use select::{best_tracks_in_window, dedupe_global, WindowStats};
