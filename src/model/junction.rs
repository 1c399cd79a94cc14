use std::fmt;

use crate::error::{Error, Result};
use crate::types::Feature;

/// One splice junction from a LeafCutter count/phenotype table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Junction {
    /// Identifier exactly as found in the input.
    pub name: String,
    pub chromosome: String,
    pub start: u32,
    pub stop: u32,
    pub cluster_id: String,
}

impl Junction {
    /// Parse a `chr:start:stop:clusterId` identifier.
    ///
    /// ```
    /// use junction_annotator::Junction;
    ///
    /// let j = Junction::parse_id("chr3:100:200:clu1").unwrap();
    /// assert_eq!((j.chromosome.as_str(), j.start, j.stop), ("chr3", 100, 200));
    /// assert_eq!(j.cluster_id, "clu1");
    /// ```
    pub fn parse_id(raw: &str) -> Result<Junction> {
        let fields: Vec<&str> = raw.split(':').collect();
        if fields.len() != 4 {
            return Err(Error::MalformedJunction {
                raw: raw.to_string(),
                problem: format!(
                    "expected 4 ':'-separated fields (chr:start:stop:cluster), found {}",
                    fields.len()
                ),
            });
        }

        let coord = |s: &str, what: &str| -> Result<u32> {
            s.parse().map_err(|_| Error::MalformedJunction {
                raw: raw.to_string(),
                problem: format!("non-numeric {what} '{s}'"),
            })
        };

        let start = coord(fields[1], "start")?;
        let stop = coord(fields[2], "stop")?;
        if start > stop {
            return Err(Error::MalformedJunction {
                raw: raw.to_string(),
                problem: format!("start {start} > stop {stop}"),
            });
        }

        Ok(Junction {
            name: raw.to_string(),
            chromosome: fields[0].to_string(),
            start,
            stop,
            cluster_id: fields[3].to_string(),
        })
    }
}

impl Feature for Junction {
    fn start(&self) -> u32 {
        self.start
    }

    fn stop(&self) -> u32 {
        self.stop
    }
}

impl fmt::Display for Junction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Span;

    #[test]
    fn parses_plain_identifier() {
        let j = Junction::parse_id("chr3:100:200:clu1").unwrap();
        assert_eq!(j.chromosome, "chr3");
        assert_eq!(j.start, 100);
        assert_eq!(j.stop, 200);
        assert_eq!(j.cluster_id, "clu1");
        assert_eq!(j.name, "chr3:100:200:clu1");
    }

    #[test]
    fn leafcutter_cluster_id_keeps_strand_suffix() {
        let j = Junction::parse_id("chr1:14830:14970:clu_1_-").unwrap();
        assert_eq!(j.cluster_id, "clu_1_-");
    }

    #[test]
    fn wrong_field_count_is_an_error() {
        for raw in ["chr1:100:200", "chr1:100:200:clu1:extra", "justaname"] {
            let err = Junction::parse_id(raw).unwrap_err();
            assert!(matches!(err, Error::MalformedJunction { .. }), "{raw}");
        }
    }

    #[test]
    fn non_numeric_coordinate_is_an_error() {
        let err = Junction::parse_id("chr1:abc:200:clu1").unwrap_err();
        assert!(err.to_string().contains("non-numeric start"));
    }

    #[test]
    fn start_after_stop_is_an_error() {
        let err = Junction::parse_id("chr1:300:150:clu1").unwrap_err();
        assert!(matches!(err, Error::MalformedJunction { .. }));
        assert!(err.to_string().contains("start 300 > stop 150"));

        // zero-length intron is still accepted
        assert!(Junction::parse_id("chr1:150:150:clu1").is_ok());
    }

    #[test]
    fn overlap_with_gene_span_is_symmetric() {
        let j = Junction::parse_id("chr1:160:170:cluX").unwrap();
        let gene = Span::new(150, 300);
        assert_eq!(j.overlaps(&gene), gene.overlaps(&j));
        assert_eq!(j.bp_overlap(&gene), 11);
    }
}
