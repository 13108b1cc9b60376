//! Lazy, single-pass document stream over one annotation file

use chromoseek_common::{FeatureDocument, FeatureType};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Lines};
use std::path::Path;
use tracing::{debug, warn};

use super::{feature_label, is_header, AnnotationFormat, BedParser, GtfParser, RecordParser};
use crate::error::{IngestError, Result};

/// Yields documents from a line-oriented reader, reading it forward once.
///
/// Header lines are skipped silently, excluded records are counted, and
/// malformed lines are logged with the source file and line, then skipped.
/// Read failures are yielded as errors.
pub struct DocumentStream<R> {
    lines: Lines<R>,
    parser: Box<dyn RecordParser>,
    source_file: String,
    line_number: usize,
    excluded: usize,
    malformed: usize,
}

impl DocumentStream<BufReader<File>> {
    /// Open `path` for streaming.
    ///
    /// BED files without an explicit `feature_type` are labelled from their
    /// file name (see [`feature_label`]). GTF files ignore `feature_type`.
    pub fn open(
        path: &Path,
        format: AnnotationFormat,
        feature_type: Option<FeatureType>,
    ) -> Result<Self> {
        let file = File::open(path).map_err(|e| IngestError::io(path, e))?;
        let source_file = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let parser: Box<dyn RecordParser> = match format {
            AnnotationFormat::Gtf => Box::new(GtfParser::new()?),
            AnnotationFormat::Bed => Box::new(BedParser::new(
                feature_type.unwrap_or_else(|| feature_label(path)),
            )),
        };

        debug!(path = %path.display(), %format, "Opened annotation file");
        Ok(Self::new(BufReader::new(file), parser, source_file))
    }
}

impl<R: BufRead> DocumentStream<R> {
    pub fn new(reader: R, parser: Box<dyn RecordParser>, source_file: impl Into<String>) -> Self {
        Self {
            lines: reader.lines(),
            parser,
            source_file: source_file.into(),
            line_number: 0,
            excluded: 0,
            malformed: 0,
        }
    }

    pub fn source_file(&self) -> &str {
        &self.source_file
    }

    /// Records deliberately left out (unretained kinds, no gene name).
    pub fn excluded(&self) -> usize {
        self.excluded
    }

    /// Lines skipped because they could not be converted.
    pub fn malformed(&self) -> usize {
        self.malformed
    }

    /// Pull up to `size` documents. An empty batch means the file is exhausted.
    pub fn next_batch(&mut self, size: usize) -> io::Result<Vec<FeatureDocument>> {
        self.by_ref().take(size).collect()
    }
}

impl<R: BufRead> Iterator for DocumentStream<R> {
    type Item = io::Result<FeatureDocument>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e)),
            };
            self.line_number += 1;

            let line = line.trim_end_matches(['\r', '\n']);
            let record = line.trim();
            if record.is_empty() || is_header(line) {
                continue;
            }

            // surrounding whitespace, trailing tabs included, is not a column
            let fields: Vec<&str> = record.split('\t').collect();
            match self.parser.parse_record(&fields, &self.source_file) {
                Ok(Some(document)) => return Some(Ok(document)),
                Ok(None) => self.excluded += 1,
                Err(e) => {
                    self.malformed += 1;
                    warn!(
                        source_file = %self.source_file,
                        line_number = self.line_number,
                        line,
                        error = %e,
                        "Skipping malformed line"
                    );
                },
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn bed_stream(content: &str) -> DocumentStream<Cursor<Vec<u8>>> {
        DocumentStream::new(
            Cursor::new(content.as_bytes().to_vec()),
            Box::new(BedParser::new(FeatureType::from("peak"))),
            "peaks.bed",
        )
    }

    #[test]
    fn test_skips_headers_and_blank_lines() {
        let stream = bed_stream("track name=x\nbrowser hide all\n# comment\n\n1\t0\t10\n");
        let docs: Vec<_> = stream.collect::<io::Result<_>>().unwrap();

        assert_eq!(docs.len(), 1);
    }

    #[test]
    fn test_malformed_line_does_not_stop_stream() {
        let mut stream = bed_stream("1\t0\t10\tA\n1\tabc\t20\tB\n1\t30\t40\tC\n");
        let docs: Vec<FeatureDocument> = stream.by_ref().collect::<io::Result<_>>().unwrap();

        let ids: Vec<&str> = docs.iter().map(|d| d.feature_id.as_str()).collect();
        assert_eq!(ids, vec!["A", "C"]);
        assert_eq!(stream.malformed(), 1);
    }

    #[test]
    fn test_crlf_line_endings() {
        let docs: Vec<_> = bed_stream("1\t0\t10\tA\t5\t-\r\n")
            .collect::<io::Result<Vec<_>>>()
            .unwrap();

        assert_eq!(docs[0].strand, chromoseek_common::Strand::Reverse);
    }

    #[test]
    fn test_surrounding_whitespace_is_trimmed() {
        let mut stream = bed_stream("1\t50\t150 \n1\t60\t160\t\n  1\t70\t170\tC\n");
        let docs: Vec<FeatureDocument> = stream.by_ref().collect::<io::Result<_>>().unwrap();

        let ids: Vec<&str> = docs.iter().map(|d| d.feature_id.as_str()).collect();
        assert_eq!(ids, vec!["1:50-150", "1:60-160", "C"]);
        assert_eq!(docs[0].location.lt, 150);
        assert_eq!(stream.malformed(), 0);
    }

    #[test]
    fn test_excluded_records_are_counted() {
        let content = "1\ts\tgene\t1\t10\t.\t+\t.\tgene_name \"A\";\n\
                       1\ts\texon\t1\t10\t.\t+\t.\tgene_name \"A\";\n";
        let mut stream = DocumentStream::new(
            Cursor::new(content.as_bytes().to_vec()),
            Box::new(GtfParser::new().unwrap()),
            "genes.gtf",
        );

        let docs: Vec<FeatureDocument> = stream.by_ref().collect::<io::Result<_>>().unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(stream.excluded(), 1);
        assert_eq!(stream.malformed(), 0);
    }

    #[test]
    fn test_batches() {
        let mut stream = bed_stream("1\t0\t1\n1\t1\t2\n1\t2\t3\n");

        assert_eq!(stream.next_batch(2).unwrap().len(), 2);
        assert_eq!(stream.next_batch(2).unwrap().len(), 1);
        assert!(stream.next_batch(2).unwrap().is_empty());
    }

    #[test]
    fn test_open_labels_bed_from_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("enhancers_liver.bed");
        std::fs::write(&path, "1\t0\t10\n").unwrap();

        let mut stream = DocumentStream::open(&path, AnnotationFormat::Bed, None).unwrap();
        let doc = stream.next().unwrap().unwrap();

        assert_eq!(doc.feature_type, FeatureType::from("enhancers"));
        assert_eq!(doc.source_file, "enhancers_liver.bed");
        assert_eq!(stream.source_file(), "enhancers_liver.bed");
    }

    #[test]
    fn test_open_missing_file() {
        let result = DocumentStream::open(Path::new("/nonexistent/x.bed"), AnnotationFormat::Bed, None);
        assert!(matches!(result, Err(IngestError::Io { .. })));
    }
}
