//! CSV hit-table readers.
//!
//! Columns are resolved from the header by case-insensitive name, in any
//! order. A missing required column aborts the load; a malformed row is
//! skipped and counted, and the run proceeds with whatever parses.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use mdtrack_core::{Hit, HitStore};

use crate::error::{Error, Result};

/// Counters from one load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadStats {
    /// Rows parsed into hits.
    pub rows_parsed: usize,
    /// Malformed rows that were skipped.
    pub rows_skipped: usize,
}

/// Header of the hit table, mapped to column indices.
struct HitColumns {
    module: usize,
    channel: usize,
    event_id: usize,
    trigger: usize,
    drift_time: usize,
    corr_time: usize,
    adc_time: usize,
    drift_radius: Option<usize>,
}

fn split_header(line: &str) -> Vec<String> {
    line.split(',').map(|c| c.trim().to_lowercase()).collect()
}

fn resolve(columns: &[String], name: &str) -> Result<usize> {
    columns
        .iter()
        .position(|c| c == name)
        .ok_or_else(|| Error::Schema { column: name.to_string() })
}

impl HitColumns {
    fn resolve(header: &str, require_radius: bool) -> Result<Self> {
        let columns = split_header(header);
        let drift_radius = if require_radius {
            Some(resolve(&columns, "drift_radius")?)
        } else {
            columns.iter().position(|c| c == "drift_radius")
        };
        Ok(Self {
            module: resolve(&columns, "module_id")?,
            channel: resolve(&columns, "channel_id")?,
            event_id: resolve(&columns, "event_id")?,
            trigger: resolve(&columns, "trigger_timestamp")?,
            drift_time: resolve(&columns, "drift_time")?,
            corr_time: resolve(&columns, "corr_time")?,
            adc_time: resolve(&columns, "adc_time")?,
            drift_radius,
        })
    }

    fn parse_row(&self, line_no: usize, line: &str) -> Result<Hit> {
        let tokens: Vec<&str> = line.split(',').map(str::trim).collect();
        let field = |index: usize| -> Result<&str> {
            tokens.get(index).copied().ok_or_else(|| Error::RowParse {
                line: line_no,
                reason: format!("missing field {index}"),
            })
        };
        let parse = |index: usize| -> Result<f64> {
            field(index)?.parse().map_err(|_| Error::RowParse {
                line: line_no,
                reason: format!("invalid number in field {index}"),
            })
        };
        let parse_int = |index: usize| -> Result<i64> {
            field(index)?.parse().map_err(|_| Error::RowParse {
                line: line_no,
                reason: format!("invalid integer in field {index}"),
            })
        };

        let module = u16::try_from(parse_int(self.module)?).map_err(|_| Error::RowParse {
            line: line_no,
            reason: "module id out of range".into(),
        })?;
        let channel = u16::try_from(parse_int(self.channel)?).map_err(|_| Error::RowParse {
            line: line_no,
            reason: "channel id out of range".into(),
        })?;
        let event_id = u32::try_from(parse_int(self.event_id)?).map_err(|_| Error::RowParse {
            line: line_no,
            reason: "event id out of range".into(),
        })?;

        Ok(Hit {
            module,
            channel,
            event_id,
            trigger: parse_int(self.trigger)?,
            drift_time: parse(self.drift_time)?,
            corr_time: parse(self.corr_time)?,
            adc_time: parse(self.adc_time)?,
            drift_radius: match self.drift_radius {
                Some(index) => parse(index)?,
                None => 0.0,
            },
        })
    }
}

fn read_impl<P: AsRef<Path>>(path: P, require_radius: bool) -> Result<(HitStore, ReadStats)> {
    let file = File::open(path)?;
    let mut lines = BufReader::new(file).lines();
    let header = lines.next().ok_or(Error::EmptyInput)??;
    let columns = HitColumns::resolve(&header, require_radius)?;

    let mut hits = Vec::new();
    let mut stats = ReadStats::default();
    for (number, line) in lines.enumerate() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        // Line numbers are 1-based and the header is line 1.
        match columns.parse_row(number + 2, &line) {
            Ok(hit) => {
                hits.push(hit);
                stats.rows_parsed += 1;
            }
            Err(_) => stats.rows_skipped += 1,
        }
    }
    Ok((HitStore::from_hits(hits), stats))
}

/// Loads a hit table, requiring the `drift_radius` column.
///
/// # Errors
/// Fails with [`Error::Schema`] for a missing required column and with
/// [`Error::Io`] when the file cannot be read.
pub fn read_hits<P: AsRef<Path>>(path: P) -> Result<(HitStore, ReadStats)> {
    read_impl(path, true)
}

/// Loads a hit table that may lack `drift_radius` (radii default to 0),
/// for feeding the RT-relation step.
///
/// # Errors
/// Same failure modes as [`read_hits`], minus the radius requirement.
pub fn read_timed_hits<P: AsRef<Path>>(path: P) -> Result<(HitStore, ReadStats)> {
    read_impl(path, false)
}

/// Loads an RT-relation calibration table with `time_ns` and `radius_mm`
/// columns. Malformed rows are skipped and counted.
///
/// # Errors
/// Fails with [`Error::Schema`] or [`Error::Io`] like the hit readers.
pub fn read_rt_samples<P: AsRef<Path>>(path: P) -> Result<(Vec<(f64, f64)>, ReadStats)> {
    let file = File::open(path)?;
    let mut lines = BufReader::new(file).lines();
    let header = lines.next().ok_or(Error::EmptyInput)??;
    let columns = split_header(&header);
    let time = resolve(&columns, "time_ns")?;
    let radius = resolve(&columns, "radius_mm")?;

    let mut samples = Vec::new();
    let mut stats = ReadStats::default();
    for line in lines {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        let tokens: Vec<&str> = line.split(',').map(str::trim).collect();
        let pair = tokens
            .get(time)
            .and_then(|t| t.parse::<f64>().ok())
            .zip(tokens.get(radius).and_then(|r| r.parse::<f64>().ok()));
        match pair {
            Some(sample) => {
                samples.push(sample);
                stats.rows_parsed += 1;
            }
            None => stats.rows_skipped += 1,
        }
    }
    Ok((samples, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_reads_hits_in_any_column_order() {
        let file = write_file(
            "drift_radius,module_id,channel_id,event_id,trigger_timestamp,drift_time,corr_time,adc_time\n\
             2.5,3,17,42,10000,150.0,140.0,80.0\n",
        );
        let (store, stats) = read_hits(file.path()).unwrap();
        assert_eq!(stats.rows_parsed, 1);
        assert_eq!(stats.rows_skipped, 0);
        let hit = store.get(0);
        assert_eq!(hit.module, 3);
        assert_eq!(hit.channel, 17);
        assert_eq!(hit.event_id, 42);
        assert_eq!(hit.trigger, 10_000);
        assert_abs_diff_eq!(hit.drift_radius, 2.5, epsilon = 1e-12);
    }

    #[test]
    fn test_header_is_case_insensitive() {
        let file = write_file(
            "Module_ID,Channel_ID,Event_ID,Trigger_Timestamp,Drift_Time,Corr_Time,ADC_Time,Drift_Radius\n\
             0,0,1,5,1.0,2.0,3.0,4.0\n",
        );
        let (store, _) = read_hits(file.path()).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_malformed_rows_are_skipped_not_fatal() {
        let file = write_file(
            "module_id,channel_id,event_id,trigger_timestamp,drift_time,corr_time,adc_time,drift_radius\n\
             0,0,1,100,1.0,2.0,3.0,1.5\n\
             0,bogus,1,100,1.0,2.0,3.0,1.5\n\
             0,1,1,100,1.0,2.0,3.0,not_a_number\n\
             0,2,1,100,1.0,2.0,3.0\n\
             0,3,1,200,1.0,2.0,3.0,2.5\n",
        );
        let (store, stats) = read_hits(file.path()).unwrap();
        assert_eq!(stats.rows_parsed, 2);
        assert_eq!(stats.rows_skipped, 3);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(1).channel, 3);
    }

    #[test]
    fn test_missing_column_is_schema_error() {
        let file = write_file("module_id,channel_id,event_id,trigger_timestamp\n0,0,1,5\n");
        let err = read_hits(file.path()).unwrap_err();
        assert!(matches!(err, Error::Schema { .. }));
    }

    #[test]
    fn test_empty_file_is_rejected() {
        let file = write_file("");
        assert!(matches!(read_hits(file.path()), Err(Error::EmptyInput)));
    }

    #[test]
    fn test_timed_hits_default_radius_to_zero() {
        let file = write_file(
            "module_id,channel_id,event_id,trigger_timestamp,drift_time,corr_time,adc_time\n\
             0,0,1,100,512.0,2.0,3.0\n",
        );
        let (store, _) = read_timed_hits(file.path()).unwrap();
        assert_abs_diff_eq!(store.get(0).drift_radius, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(store.get(0).drift_time, 512.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rt_table_reader() {
        let file = write_file("time_ns,radius_mm\n0.0,0.0\nbad,row\n100.0,2.0\n");
        let (samples, stats) = read_rt_samples(file.path()).unwrap();
        assert_eq!(samples, vec![(0.0, 0.0), (100.0, 2.0)]);
        assert_eq!(stats.rows_skipped, 1);
    }
}
