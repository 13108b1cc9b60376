//! Canonical interval-document model
//!
//! Every annotation format ingested by ChromoSeek is normalized into a
//! [`FeatureDocument`]. Intervals are always stored half-open (`[gte, lt)`),
//! whatever the native convention of the source file.

use crate::error::{ChromoseekError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Query Regions
// ============================================================================

/// A caller-supplied coordinate range.
///
/// Both bounds are inclusive when used in an overlap query. `start <= end`
/// is checked by [`Region::validate`], not at construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    /// Chromosome name, e.g. `1` or `chr1`
    pub chrom: String,
    pub start: u64,
    pub end: u64,
}

impl Region {
    pub fn new(chrom: impl Into<String>, start: u64, end: u64) -> Self {
        Self {
            chrom: chrom.into(),
            start,
            end,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.chrom.trim().is_empty() {
            return Err(ChromoseekError::invalid_region(
                self.to_string(),
                "chromosome cannot be empty",
            ));
        }
        if self.start > self.end {
            return Err(ChromoseekError::invalid_region(
                self.to_string(),
                format!("start {} is greater than end {}", self.start, self.end),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.chrom, self.start, self.end)
    }
}

impl FromStr for Region {
    type Err = ChromoseekError;

    /// Parse `chrom:start-end`. Thousands separators (`,`) in coordinates are ignored.
    fn from_str(s: &str) -> Result<Self> {
        let (chrom, range) = s
            .trim()
            .rsplit_once(':')
            .ok_or_else(|| ChromoseekError::invalid_region(s, "expected 'chrom:start-end'"))?;
        let (start, end) = range
            .split_once('-')
            .ok_or_else(|| ChromoseekError::invalid_region(s, "expected 'start-end' range"))?;

        let parse_coord = |value: &str| {
            value.replace(',', "").trim().parse::<u64>().map_err(|e| {
                ChromoseekError::invalid_region(s, format!("invalid coordinate '{}': {}", value, e))
            })
        };

        let region = Region::new(chrom, parse_coord(start)?, parse_coord(end)?);
        region.validate()?;
        Ok(region)
    }
}

// ============================================================================
// Stored Intervals
// ============================================================================

/// Half-open interval `[gte, lt)` as persisted in the `location` range field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub gte: u64,
    pub lt: u64,
}

impl Location {
    /// Build a non-empty half-open interval. Returns `None` when `lt <= gte`.
    pub fn half_open(gte: u64, lt: u64) -> Option<Self> {
        (lt > gte).then_some(Self { gte, lt })
    }

    pub fn len(&self) -> u64 {
        self.lt.saturating_sub(self.gte)
    }

    pub fn is_empty(&self) -> bool {
        self.lt <= self.gte
    }

    /// Whether this interval intersects the closed range `[start, end]`.
    pub fn intersects(&self, start: u64, end: u64) -> bool {
        self.gte <= end && self.lt > start
    }
}

// ============================================================================
// Controlled Vocabularies
// ============================================================================

/// Searchable feature category.
///
/// Gene annotations map onto the three fixed variants; columnar inputs carry
/// a caller-supplied label, kept as [`FeatureType::Other`]. The store sees
/// the plain string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FeatureType {
    Gene,
    Exon,
    Cds,
    Other(String),
}

impl FeatureType {
    pub fn as_str(&self) -> &str {
        match self {
            FeatureType::Gene => "gene",
            FeatureType::Exon => "exon",
            FeatureType::Cds => "CDS",
            FeatureType::Other(label) => label,
        }
    }
}

impl From<&str> for FeatureType {
    fn from(s: &str) -> Self {
        match s {
            "gene" => FeatureType::Gene,
            "exon" => FeatureType::Exon,
            "CDS" => FeatureType::Cds,
            other => FeatureType::Other(other.to_string()),
        }
    }
}

impl From<String> for FeatureType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "gene" | "exon" | "CDS" => FeatureType::from(s.as_str()),
            _ => FeatureType::Other(s),
        }
    }
}

impl From<FeatureType> for String {
    fn from(feature_type: FeatureType) -> Self {
        match feature_type {
            FeatureType::Other(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for FeatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strand of a feature: `+`, `-`, or `.` when unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Strand {
    #[serde(rename = "+")]
    Forward,
    #[serde(rename = "-")]
    Reverse,
    #[default]
    #[serde(rename = ".")]
    Unknown,
}

impl Strand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strand::Forward => "+",
            Strand::Reverse => "-",
            Strand::Unknown => ".",
        }
    }
}

impl FromStr for Strand {
    type Err = ChromoseekError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "+" => Ok(Strand::Forward),
            "-" => Ok(Strand::Reverse),
            "." => Ok(Strand::Unknown),
            other => Err(ChromoseekError::Parse(format!("invalid strand '{}'", other))),
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Feature Documents
// ============================================================================

/// The canonical, persisted unit.
///
/// Created once by the normalizer from a single source record and never
/// updated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureDocument {
    /// Chromosome/contig identifier, matched exactly
    pub chrom: String,

    pub location: Location,

    pub feature_type: FeatureType,

    /// Stable identifier, derived when the source has none
    pub feature_id: String,

    /// Only present on documents derived from gene annotations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gene_name: Option<String>,

    pub strand: Strand,

    #[serde(default)]
    pub score: f64,

    /// File name of the originating file (no directory part)
    pub source_file: String,
}
