use std::collections::HashMap;
use std::io::BufRead;

use crate::error::{Error, Result};
use crate::types::{Span, Strand};

/// A single parsed record line from a GTF file.
///
/// Coordinates are kept exactly as written: 1-based, inclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationRecord {
    pub line_no: usize,
    pub seqname: String,      // chromosome / contig
    pub feature_type: String, // column 3
    pub span: Span,
    pub strand: Strand,
    pub attrs: HashMap<String, String>,
}

impl AnnotationRecord {
    /// Convenience: get an attribute value.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(|s| s.as_str())
    }

    pub fn is_feature(&self, types: &[String]) -> bool {
        types.iter().any(|t| t == &self.feature_type)
    }

    pub fn pick_first_attr(&self, keys: &[String]) -> Option<String> {
        for k in keys {
            if let Some(v) = self.attr(k) {
                let v = v.trim();
                if !v.is_empty() {
                    return Some(v.to_string());
                }
            }
        }
        None
    }
}

/// Streaming parser for GTF files.
///
/// Most callers want [`crate::annotation::AnnotationBuilder`] instead, which
/// turns the record stream into a [`crate::ChromosomeIndex`].
///
/// ```no_run
/// use std::fs::File;
/// use std::io::BufReader;
/// use junction_annotator::annotation::AnnotationReader;
///
/// let file = File::open("genes.gtf").unwrap();
/// for rec in AnnotationReader::new(BufReader::new(file)).records() {
///     let rec = rec.unwrap();
///     println!("{} {}", rec.seqname, rec.span);
/// }
/// ```
pub struct AnnotationReader<R: BufRead> {
    reader: R,
    buf: String,
    line_no: usize,
}

impl<R: BufRead> AnnotationReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: String::new(),
            line_no: 0,
        }
    }

    /// Returns an iterator over parsed records.
    ///
    /// - Skips blank lines
    /// - Skips comment lines starting with '#'
    pub fn records(mut self) -> impl Iterator<Item = Result<AnnotationRecord>> {
        std::iter::from_fn(move || loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(Error::io(e, "<annotation>"))),
            }
            self.line_no += 1;

            let line = self.buf.trim_end_matches(&['\n', '\r'][..]);
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            return Some(parse_record_line(line, self.line_no));
        })
    }
}

/// Parse a single non-comment line into an `AnnotationRecord`.
pub fn parse_record_line(line: &str, line_no: usize) -> Result<AnnotationRecord> {
    // seqname source feature start end score strand phase attributes
    let cols: Vec<&str> = line.split('\t').collect();
    if cols.len() != 9 {
        return Err(Error::annotation(
            line_no,
            format!("expected 9 tab-separated columns, found {}", cols.len()),
            line,
        ));
    }

    let start: u32 = cols[3]
        .parse()
        .map_err(|_| Error::annotation(line_no, format!("non-numeric start '{}'", cols[3]), line))?;
    let stop: u32 = cols[4]
        .parse()
        .map_err(|_| Error::annotation(line_no, format!("non-numeric end '{}'", cols[4]), line))?;

    if start == 0 || stop < start {
        return Err(Error::annotation(
            line_no,
            format!("invalid coordinates {start}-{stop}"),
            line,
        ));
    }

    let strand = Strand::from_gtf(cols[6]).ok_or_else(|| {
        Error::annotation(line_no, format!("unknown strand '{}'", cols[6]), line)
    })?;

    let attrs = parse_attributes(cols[8]);

    Ok(AnnotationRecord {
        line_no,
        seqname: cols[0].to_string(),
        feature_type: cols[2].to_string(),
        span: Span { start, stop },
        strand,
        attrs,
    })
}

/// Parse the attributes field for either GFF3 or GTF.
///
/// GFF3 uses `key=value;...`, GTF uses `key "value"; ...`. A field containing
/// '=' is read as GFF3, anything else as GTF.
pub fn parse_attributes(s: &str) -> HashMap<String, String> {
    let s = s.trim();
    let gff3 = s.contains('=');

    let mut map = HashMap::new();

    for part in s.split(';') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        let split = if gff3 {
            part.split_once('=')
        } else {
            part.split_once(char::is_whitespace)
        };
        let (key, value) = match split {
            Some((k, v)) => (k.trim(), v.trim()),
            None => (part, ""),
        };

        let value = unquote(value);
        if !key.is_empty() && !value.is_empty() {
            // GTF repeats keys such as `tag`; first occurrence wins
            map.entry(key.to_string()).or_insert(value);
        }
    }

    map
}

fn unquote(v: &str) -> String {
    let v = v.trim();
    let v = v.strip_prefix('"').unwrap_or(v);
    let v = v.strip_suffix('"').unwrap_or(v);
    v.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parse_gtf_line() {
        let line = "chr1\tHAVANA\texon\t101\t150\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1\"; gene_name \"Alpha\"; tag \"basic\"; tag \"CCDS\";";
        let rec = parse_record_line(line, 7).unwrap();

        assert_eq!(rec.line_no, 7);
        assert_eq!(rec.seqname, "chr1");
        assert_eq!(rec.feature_type, "exon");
        assert_eq!(rec.span, Span::new(101, 150));
        assert_eq!(rec.strand, Strand::Plus);

        assert_eq!(rec.attr("gene_id"), Some("G1"));
        assert_eq!(rec.attr("transcript_id"), Some("T1"));
        assert_eq!(rec.attr("gene_name"), Some("Alpha"));
        assert_eq!(rec.attr("tag"), Some("basic"));
    }

    #[test]
    fn parse_gff3_attributes() {
        let attrs = parse_attributes("ID=ex1;Parent=tx1;gene_id=G9");
        assert_eq!(attrs.get("Parent").map(String::as_str), Some("tx1"));
        assert_eq!(attrs.get("gene_id").map(String::as_str), Some("G9"));
    }

    #[test]
    fn non_numeric_coordinates_are_rejected() {
        let line = "chr1\tsrc\tgene\tabc\t150\t.\t+\t.\tgene_id \"G1\";";
        let err = parse_record_line(line, 3).unwrap_err();
        match err {
            Error::MalformedAnnotation { line_no, problem, .. } => {
                assert_eq!(line_no, 3);
                assert!(problem.contains("non-numeric start"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn short_lines_are_rejected() {
        let err = parse_record_line("chr1\tsrc\tgene\t1\t2", 1).unwrap_err();
        assert!(matches!(err, Error::MalformedAnnotation { .. }));
    }

    #[test]
    fn streaming_reader_skips_comments_and_blank_lines() {
        let data = "\
##description: test
chr1\tsrc\texon\t1\t2\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1\";

chr1\tsrc\texon\t3\t4\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1\";
";
        let reader = AnnotationReader::new(Cursor::new(data.as_bytes()));

        let recs: Vec<_> = reader.records().collect::<Result<Vec<_>>>().unwrap();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].line_no, 2);
        assert_eq!(recs[1].line_no, 4);
        assert_eq!(recs[1].span, Span::new(3, 4));
    }
}
