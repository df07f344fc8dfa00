//! Reading and writing trip logs.
//!
//! A trip log is a comma separated text file with one sample per line:
//!
//! ```text
//! Time,Latitude,Longitude
//! 0,35.2111,-97.4411
//! 5,35.2112,-97.4412
//! ```
//!
//! Header lines are recognised by the [`HEADER_MARKER`] token, wherever they
//! appear, rather than by position.

use crate::dataset::TripDataset;
use crate::error::LoadError;
use crate::gpx::read_gpx;
use crate::sample::Sample;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Token identifying a header line.
pub const HEADER_MARKER: &str = "Time";

/// Header written by [`write_trip_log`].
pub const HEADER: &str = "Time,Latitude,Longitude";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripFormat {
    TripLog,
    Gpx,
}

impl TripFormat {
    /// `.gpx` files are GPX, anything else is treated as a trip log.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("gpx") => TripFormat::Gpx,
            _ => TripFormat::TripLog,
        }
    }
}

fn parse_field<T: FromStr>(
    fields: &[&str],
    position: usize,
    name: &'static str,
    line: usize,
) -> Result<T, LoadError> {
    let raw = fields
        .get(position)
        .map(|f| f.trim())
        .filter(|f| !f.is_empty())
        .ok_or(LoadError::MissingField { line, field: name })?;
    raw.parse().map_err(|_| LoadError::Parse {
        line,
        message: format!("invalid {name} \"{raw}\""),
    })
}

/// Reads a trip log. Blank lines and header lines are skipped.
pub fn read_trip_log<R: BufRead>(reader: R) -> Result<TripDataset, LoadError> {
    let mut samples = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_number = index + 1;

        if line.trim().is_empty() {
            continue;
        }
        if line.contains(HEADER_MARKER) {
            debug!("skipping header on line {line_number}");
            continue;
        }

        let fields: Vec<&str> = line.split(',').collect();
        let time = parse_field::<u32>(&fields, 0, "time", line_number)?;
        let latitude = parse_field::<f64>(&fields, 1, "latitude", line_number)?;
        let longitude = parse_field::<f64>(&fields, 2, "longitude", line_number)?;
        samples.push(Sample::new(time, latitude, longitude));
    }

    debug!("read {} samples from trip log", samples.len());
    Ok(TripDataset::new(samples)?)
}

/// Reads a trip from `input` in the given format.
pub fn read_trip(input: &[u8], format: TripFormat) -> Result<TripDataset, LoadError> {
    match format {
        TripFormat::TripLog => read_trip_log(input),
        TripFormat::Gpx => read_gpx(input),
    }
}

/// Loads a trip file, choosing the format from its extension.
pub fn load_trip(path: &Path) -> Result<TripDataset, LoadError> {
    let input = fs::read(path)?;
    read_trip(&input, TripFormat::from_path(path))
}

/// Writes samples as a trip log, header included.
pub fn write_trip_log<W: Write>(samples: &[Sample], mut output: W) -> io::Result<()> {
    writeln!(output, "{HEADER}")?;
    for sample in samples {
        writeln!(
            output,
            "{},{},{}",
            sample.time_minutes(),
            sample.latitude(),
            sample.longitude()
        )?;
    }
    output.flush()
}
