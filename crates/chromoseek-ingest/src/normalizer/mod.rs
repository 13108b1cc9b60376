//! Interval document normalizer
//!
//! Turns lines of gene annotation (GTF) and interval (BED) files into
//! [`FeatureDocument`]s. Each format gets a [`RecordParser`]; a
//! [`DocumentStream`] drives one over a file, skipping headers and malformed
//! lines.
//!
//! Coordinate conversion happens in exactly one place per format:
//!
//! | Format | Source convention       | Stored `location`            |
//! |--------|-------------------------|------------------------------|
//! | GTF    | 1-based, fully closed   | `gte = start`, `lt = end + 1` |
//! | BED    | 0-based, half-open      | `gte = start`, `lt = end`     |

pub mod bed;
pub mod gtf;
pub mod stream;

use chromoseek_common::{FeatureDocument, FeatureType, Location, Strand};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

pub use bed::BedParser;
pub use gtf::GtfParser;
pub use stream::DocumentStream;

/// Why a single line could not be converted. Never escapes a [`DocumentStream`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordError {
    #[error("expected at least {expected} fields, found {found}")]
    MissingFields { expected: usize, found: usize },

    #[error("invalid {field} coordinate '{value}'")]
    InvalidCoordinate { field: &'static str, value: String },

    #[error("invalid score '{0}'")]
    InvalidScore(String),

    #[error("invalid strand '{0}'")]
    InvalidStrand(String),

    #[error("empty interval [{gte}, {lt})")]
    EmptyInterval { gte: u64, lt: u64 },
}

/// Converts the tab-separated fields of one data line.
///
/// `Ok(None)` means the record is deliberately excluded (not an error).
pub trait RecordParser: Send {
    fn parse_record(
        &self,
        fields: &[&str],
        source_file: &str,
    ) -> Result<Option<FeatureDocument>, RecordError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationFormat {
    /// Hierarchical gene annotation
    Gtf,
    /// Columnar intervals
    Bed,
}

impl AnnotationFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            AnnotationFormat::Gtf => "gtf",
            AnnotationFormat::Bed => "bed",
        }
    }

    /// Infer the format from a `.gtf` / `.bed` extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "gtf" => Some(AnnotationFormat::Gtf),
            "bed" => Some(AnnotationFormat::Bed),
            _ => None,
        }
    }
}

impl FromStr for AnnotationFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gtf" => Ok(AnnotationFormat::Gtf),
            "bed" => Ok(AnnotationFormat::Bed),
            other => Err(format!("unknown annotation format '{}', expected gtf or bed", other)),
        }
    }
}

impl std::fmt::Display for AnnotationFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Feature-type label for an interval file: its stem up to the first `_`.
///
/// `peaks_h3k27ac.bed` is labelled `peaks`.
pub fn feature_label(path: &Path) -> FeatureType {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    let label = stem.split('_').next().unwrap_or_default();
    FeatureType::from(label)
}

/// Comment, track and browser lines carry no records.
pub fn is_header(line: &str) -> bool {
    line.starts_with('#') || line.starts_with("track") || line.starts_with("browser")
}

fn parse_coordinate(field: &'static str, value: &str) -> Result<u64, RecordError> {
    value.parse().map_err(|_| RecordError::InvalidCoordinate {
        field,
        value: value.to_string(),
    })
}

/// `.` means no score.
fn parse_score(value: &str) -> Result<f64, RecordError> {
    if value == "." {
        return Ok(0.0);
    }
    value
        .parse()
        .map_err(|_| RecordError::InvalidScore(value.to_string()))
}

fn parse_strand(value: &str) -> Result<Strand, RecordError> {
    value
        .parse()
        .map_err(|_| RecordError::InvalidStrand(value.to_string()))
}

fn location(gte: u64, lt: u64) -> Result<Location, RecordError> {
    Location::half_open(gte, lt).ok_or(RecordError::EmptyInterval { gte, lt })
}
