//! CSV output writers.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use mdtrack_core::{Hit, TrackBundle};

use crate::error::Result;

/// Column order of the track table.
const TRACK_HEADER: &str = "track_id,module_id,channel_id,event_id,drift_time,corr_time,\
adc_time,trigger_timestamp,Dt,x,y,drift_radius,residual,a,b,c,chi2ndf";

/// Writer for the reconstructed track table.
///
/// Emits six contiguous rows per bundle, all floating fields at six
/// decimal places for reproducible output.
pub struct TrackWriter {
    writer: BufWriter<File>,
}

impl TrackWriter {
    /// Creates the destination file.
    ///
    /// # Errors
    /// Fails when the destination cannot be opened.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self { writer: BufWriter::new(file) })
    }

    /// Writes the header and every bundle row, then flushes.
    ///
    /// # Errors
    /// A write failure partway is fatal to the run, not resumable.
    pub fn write_tracks(&mut self, bundles: &[TrackBundle]) -> Result<()> {
        writeln!(self.writer, "{TRACK_HEADER}")?;
        for bundle in bundles {
            for hit in &bundle.hits {
                writeln!(
                    self.writer,
                    "{},{},{},{},{:.6},{:.6},{:.6},{},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6}",
                    bundle.track_id,
                    hit.module,
                    hit.channel,
                    hit.event_id,
                    hit.drift_time,
                    hit.corr_time,
                    hit.adc_time,
                    hit.trigger,
                    hit.dt,
                    hit.x,
                    hit.y,
                    hit.drift_radius,
                    hit.residual,
                    bundle.line.a,
                    bundle.line.b,
                    bundle.line.c,
                    bundle.chi2ndf,
                )?;
            }
        }
        self.writer.flush()?;
        Ok(())
    }
}

/// Column order of the hit table, matching the reader's schema.
const HIT_HEADER: &str =
    "module_id,channel_id,event_id,trigger_timestamp,drift_time,corr_time,adc_time,drift_radius";

/// Writer for hit tables, used to persist RT-derived radii.
pub struct HitWriter {
    writer: BufWriter<File>,
}

impl HitWriter {
    /// Creates the destination file.
    ///
    /// # Errors
    /// Fails when the destination cannot be opened.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self { writer: BufWriter::new(file) })
    }

    /// Writes the header and one row per hit, then flushes.
    ///
    /// # Errors
    /// Any write failure aborts.
    pub fn write_hits<'a, I>(&mut self, hits: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a Hit>,
    {
        writeln!(self.writer, "{HIT_HEADER}")?;
        for hit in hits {
            writeln!(
                self.writer,
                "{},{},{},{},{:.6},{:.6},{:.6},{:.6}",
                hit.module,
                hit.channel,
                hit.event_id,
                hit.trigger,
                hit.drift_time,
                hit.corr_time,
                hit.adc_time,
                hit.drift_radius,
            )?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdtrack_core::{Line, TrackHit};
    use tempfile::NamedTempFile;

    fn bundle() -> TrackBundle {
        let hits = (0u16..6)
            .map(|i| TrackHit {
                module: u16::from(i >= 3),
                channel: u16::from(i),
                event_id: 7,
                trigger: 100,
                drift_time: 150.25,
                corr_time: 140.5,
                adc_time: 80.0,
                dt: 0.0,
                x: 15.0 + f64::from(i),
                y: 15.0,
                drift_radius: 2.5,
                residual: 0.125,
            })
            .collect();
        TrackBundle {
            track_id: 3,
            hits,
            line: Line { a: 0.0, b: 1.0, c: -5.0 },
            chi2ndf: 0.25,
        }
    }

    #[test]
    fn test_track_csv_layout() {
        let file = NamedTempFile::new().unwrap();
        let mut writer = TrackWriter::create(file.path()).unwrap();
        writer.write_tracks(&[bundle()]).unwrap();

        let content = std::fs::read_to_string(file.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0], TRACK_HEADER);
        assert_eq!(
            lines[1],
            "3,0,0,7,150.250000,140.500000,80.000000,100,0.000000,15.000000,15.000000,\
             2.500000,0.125000,0.000000,1.000000,-5.000000,0.250000"
        );
        // Six rows share the track id.
        assert!(lines[1..].iter().all(|l| l.starts_with("3,")));
    }

    #[test]
    fn test_hit_csv_roundtrips_through_reader() {
        let hit = Hit {
            module: 2,
            channel: 19,
            event_id: 42,
            trigger: 12_345,
            drift_time: 512.5,
            corr_time: 22.875,
            adc_time: 64.0,
            drift_radius: 3.25,
        };
        let file = NamedTempFile::new().unwrap();
        let mut writer = HitWriter::create(file.path()).unwrap();
        writer.write_hits([&hit]).unwrap();

        let (store, stats) = crate::reader::read_hits(file.path()).unwrap();
        assert_eq!(stats.rows_parsed, 1);
        assert_eq!(*store.get(0), hit);
    }
}
