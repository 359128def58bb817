//! The Track Loader - fetch text, keep the rows that name a position.
//!
//! Expected layout: one header line, then `<ignored>, <lat>, <lon>[, ...]`.
//! Bad rows are reported and dropped; only an unreachable source is an
//! error.

use crate::diagnostics::{Diagnostic, DiagnosticSink, RowDefect};
use crate::track::{GeoPoint, Track};
use globetrack_env::{EnvError, TextSource};
use thiserror::Error;
use tracing::debug;

/// Column holding latitude in degrees.
pub const LATITUDE_COLUMN: usize = 1;

/// Column holding longitude in degrees.
pub const LONGITUDE_COLUMN: usize = 2;

/// Errors surfaced by `load_track`.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The fetch itself failed; no track was produced.
    #[error("Track source unavailable ({location}): {cause}")]
    SourceUnavailable {
        location: String,
        #[source]
        cause: EnvError,
    },
}

impl LoadError {
    pub fn unavailable(location: impl Into<String>, cause: EnvError) -> Self {
        Self::SourceUnavailable {
            location: location.into(),
            cause,
        }
    }
}

/// Fetches `source` and parses it into a Track.
///
/// # Returns
/// * `Ok(track)` - Possibly empty; skipped rows went to `sink`
/// * `Err(LoadError::SourceUnavailable)` - The fetch did not succeed
pub async fn load_track<S>(source: &S, sink: &dyn DiagnosticSink) -> Result<Track, LoadError>
where
    S: TextSource + ?Sized,
{
    let location = source.describe();
    let text = source
        .fetch_text()
        .await
        .map_err(|cause| LoadError::unavailable(location.clone(), cause))?;

    debug!(location = %location, bytes = text.len(), "Raw track data:\n{}", text);

    let track = parse_track_from(&location, &text, sink);
    debug!(points = track.len(), "Parsed track positions: {:?}", track.points());
    Ok(track)
}

/// Parses track text that is already in memory.
pub fn parse_track(text: &str, sink: &dyn DiagnosticSink) -> Track {
    parse_track_from("<memory>", text, sink)
}

fn parse_track_from(location: &str, text: &str, sink: &dyn DiagnosticSink) -> Track {
    // Fields split strictly on commas, one record per line
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut points = Vec::new();
    let mut skipped = 0;
    let mut row = 0;
    let mut next_line = first_data_line(text);

    for result in reader.records() {
        let line = match &result {
            Ok(record) => record.position().map(|p| p.line()),
            Err(e) => e.position().map(|p| p.line()),
        };

        // The reader drops empty lines; they are still rows with one empty field
        if let Some(line) = line {
            while next_line < line {
                report_blank_line(sink, row, next_line);
                skipped += 1;
                row += 1;
                next_line += 1;
            }
            next_line = line + 1;
        }
        let line = line.unwrap_or(0);

        let parsed = result
            .map_err(|e| (String::new(), RowDefect::Unreadable { reason: e.to_string() }))
            .and_then(|record| {
                parse_record(&record).map_err(|defect| (join_fields(&record), defect))
            });

        match parsed {
            Ok(point) => points.push(point),
            Err((raw, defect)) => {
                skipped += 1;
                sink.report(Diagnostic::MalformedRow {
                    row,
                    line,
                    raw,
                    defect,
                });
            }
        }
        row += 1;
    }

    let last_line = text.lines().count() as u64;
    while next_line <= last_line {
        report_blank_line(sink, row, next_line);
        skipped += 1;
        row += 1;
        next_line += 1;
    }

    if points.is_empty() {
        sink.report(Diagnostic::EmptyTrack {
            location: location.to_string(),
        });
    } else {
        sink.report(Diagnostic::TrackLoaded {
            location: location.to_string(),
            points: points.len(),
            skipped,
        });
    }

    Track::new(points)
}

/// 1-based line following the header. Leading empty lines never hold the
/// header.
fn first_data_line(text: &str) -> u64 {
    text.lines()
        .position(|l| !l.is_empty())
        .map_or(u64::MAX, |header| header as u64 + 2)
}

fn report_blank_line(sink: &dyn DiagnosticSink, row: usize, line: u64) {
    sink.report(Diagnostic::MalformedRow {
        row,
        line,
        raw: String::new(),
        defect: RowDefect::TooFewFields { found: 1 },
    });
}

/// Validates a single trimmed record.
fn parse_record(record: &csv::StringRecord) -> Result<GeoPoint, RowDefect> {
    if record.len() < 3 {
        return Err(RowDefect::TooFewFields { found: record.len() });
    }

    let latitude = parse_coordinate(record.get(LATITUDE_COLUMN))
        .ok_or_else(|| RowDefect::InvalidLatitude {
            value: record.get(LATITUDE_COLUMN).unwrap_or_default().to_string(),
        })?;
    let longitude = parse_coordinate(record.get(LONGITUDE_COLUMN))
        .ok_or_else(|| RowDefect::InvalidLongitude {
            value: record.get(LONGITUDE_COLUMN).unwrap_or_default().to_string(),
        })?;

    Ok(GeoPoint::surface(longitude, latitude))
}

fn parse_coordinate(field: Option<&str>) -> Option<f64> {
    field
        .and_then(|f| f.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

fn join_fields(record: &csv::StringRecord) -> String {
    record.iter().collect::<Vec<_>>().join(",")
}
