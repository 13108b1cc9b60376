//! GTF gene annotation records
//!
//! Nine tab-separated columns:
//!
//! ```text
//! seqname  source  feature  start  end  score  strand  frame  attributes
//! 1        havana  exon     11869  12227  .    +       .      gene_name "DDX11L1"; transcript_id "ENST00000456328";
//! ```
//!
//! Only `transcript`, `exon` and `CDS` records carrying a `gene_name`
//! attribute become documents. Transcripts are stored as `gene` features.

use chromoseek_common::{FeatureDocument, FeatureType};
use regex::Regex;
use std::collections::HashMap;

use super::{location, parse_coordinate, parse_score, parse_strand, RecordError, RecordParser};

const FIELD_COUNT: usize = 9;

/// `key "value";` pairs in the attribute column
const ATTRIBUTE_PATTERN: &str = r#"(\S+)\s+"([^"]+)";"#;

pub struct GtfParser {
    attribute_pattern: Regex,
}

impl GtfParser {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            attribute_pattern: Regex::new(ATTRIBUTE_PATTERN)?,
        })
    }

    /// Attribute key/value pairs. Later duplicates win.
    pub fn parse_attributes<'a>(&self, column: &'a str) -> HashMap<&'a str, &'a str> {
        self.attribute_pattern
            .captures_iter(column)
            .map(|caps| {
                let (_, [key, value]) = caps.extract();
                (key, value)
            })
            .collect()
    }
}

/// Stored feature type for a retained GTF feature kind.
fn searchable_type(kind: &str) -> Option<FeatureType> {
    match kind {
        "transcript" => Some(FeatureType::Gene),
        "exon" => Some(FeatureType::Exon),
        "CDS" => Some(FeatureType::Cds),
        _ => None,
    }
}

impl RecordParser for GtfParser {
    fn parse_record(
        &self,
        fields: &[&str],
        source_file: &str,
    ) -> Result<Option<FeatureDocument>, RecordError> {
        let Some(kind) = fields.get(2) else {
            return Err(RecordError::MissingFields {
                expected: FIELD_COUNT,
                found: fields.len(),
            });
        };
        let Some(feature_type) = searchable_type(kind) else {
            return Ok(None);
        };
        if fields.len() < FIELD_COUNT {
            return Err(RecordError::MissingFields {
                expected: FIELD_COUNT,
                found: fields.len(),
            });
        }

        let attributes = self.parse_attributes(fields[8]);
        let Some(gene_name) = attributes.get("gene_name").copied() else {
            return Ok(None);
        };
        let feature_id = attributes.get("transcript_id").copied().unwrap_or(gene_name);

        let start = parse_coordinate("start", fields[3])?;
        let end = parse_coordinate("end", fields[4])?;
        // 1-based closed [start, end] becomes half-open [start, end + 1)
        let lt = end.checked_add(1).ok_or_else(|| RecordError::InvalidCoordinate {
            field: "end",
            value: fields[4].to_string(),
        })?;

        Ok(Some(FeatureDocument {
            chrom: fields[0].to_string(),
            location: location(start, lt)?,
            feature_type,
            feature_id: feature_id.to_string(),
            gene_name: Some(gene_name.to_string()),
            strand: parse_strand(fields[6])?,
            score: parse_score(fields[5])?,
            source_file: source_file.to_string(),
        }))
    }
}
