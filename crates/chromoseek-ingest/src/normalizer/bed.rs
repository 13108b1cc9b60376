//! BED interval records
//!
//! At least three tab-separated columns: `chrom start end`, optionally
//! followed by `name score strand` (further columns are ignored). The format
//! carries no feature type, so every record gets the parser's label.

use chromoseek_common::{FeatureDocument, FeatureType, Strand};

use super::{location, parse_coordinate, parse_score, parse_strand, RecordError, RecordParser};

const MIN_FIELDS: usize = 3;

pub struct BedParser {
    feature_type: FeatureType,
}

impl BedParser {
    pub fn new(feature_type: FeatureType) -> Self {
        Self { feature_type }
    }

    pub fn feature_type(&self) -> &FeatureType {
        &self.feature_type
    }
}

impl RecordParser for BedParser {
    fn parse_record(
        &self,
        fields: &[&str],
        source_file: &str,
    ) -> Result<Option<FeatureDocument>, RecordError> {
        if fields.len() < MIN_FIELDS {
            return Err(RecordError::MissingFields {
                expected: MIN_FIELDS,
                found: fields.len(),
            });
        }

        let chrom = fields[0];
        let start = parse_coordinate("start", fields[1])?;
        let end = parse_coordinate("end", fields[2])?;

        let feature_id = match fields.get(3) {
            Some(name) => name.to_string(),
            None => format!("{}:{}-{}", chrom, fields[1], fields[2]),
        };
        let score = fields.get(4).map_or(Ok(0.0), |s| parse_score(s))?;
        let strand = fields.get(5).map_or(Ok(Strand::Unknown), |s| parse_strand(s))?;

        Ok(Some(FeatureDocument {
            chrom: chrom.to_string(),
            location: location(start, end)?,
            feature_type: self.feature_type.clone(),
            feature_id,
            gene_name: None,
            strand,
            score,
            source_file: source_file.to_string(),
        }))
    }
}
