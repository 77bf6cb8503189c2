//! mdtrack-io: CSV input and output for mdtrack.
//!
//! Readers resolve columns by name from the header and recover from
//! malformed rows by skipping them; writers emit fixed column orders
//! with fixed decimal precision.
//!

mod error;
mod reader;
mod writer;

pub use error::{Error, Result};
pub use reader::{read_hits, read_rt_samples, read_timed_hits, ReadStats};
pub use writer::{HitWriter, TrackWriter};
