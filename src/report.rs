use std::fmt;
use std::io::Write;

use crate::resolve::{Classification, ClusterReport};
use crate::types::Feature;

fn flag(b: bool) -> &'static str {
    if b {
        "TRUE"
    } else {
        "FALSE"
    }
}

/// Human-readable report block for one cluster.
///
/// Unambiguous clusters are a single summary line. Ambiguous clusters add one
/// line per junction listing every overlapping gene as
/// `symbol(start-stop); Str: strand - ov:bp-EXONFLAG` followed by the nearest
/// gene, and end with an empty line.
impl fmt::Display for ClusterReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let members = self.cluster.junctions.len();
        match &self.class {
            Classification::NoGene => writeln!(
                f,
                "cluster {} overlaps no genes and has {} members",
                self.cluster.id, members
            ),
            Classification::SingleGene(_) => writeln!(
                f,
                "cluster {} overlaps 1 gene and has {} members",
                self.cluster.id, members
            ),
            Classification::Ambiguous { genes, junctions } => {
                writeln!(
                    f,
                    "cluster {} overlaps {} genes and has {} members",
                    self.cluster.id,
                    genes.len(),
                    members
                )?;

                for r in junctions {
                    write!(f, "{}", r.junction.name)?;
                    if r.candidates.is_empty() {
                        write!(f, "\tNA")?;
                    }
                    for c in &r.candidates {
                        write!(
                            f,
                            "\t{}({}-{}); Str: {} - ov:{}-{}",
                            c.gene.symbol,
                            c.gene.start(),
                            c.gene.stop(),
                            c.gene.strand,
                            c.bp_overlap,
                            flag(c.has_exon_overlap)
                        )?;
                    }
                    let nearest = r.nearest().map(|c| c.gene.symbol.as_str()).unwrap_or("NA");
                    writeln!(f, "\tNearest:{nearest}")?;
                }
                writeln!(f)
            }
        }
    }
}

/// Tab-separated per-junction gene assignments.
pub struct AssignmentTable<W: Write> {
    out: W,
    pub rows: usize,
}

impl<W: Write> AssignmentTable<W> {
    pub const HEADER: &'static str =
        "junction\tcluster\tchromosome\tstart\tstop\tcluster_genes\tgene\texon_overlap";

    /// Writes the header line.
    pub fn new(mut out: W) -> std::io::Result<Self> {
        writeln!(out, "{}", Self::HEADER)?;
        Ok(Self { out, rows: 0 })
    }

    pub fn write_report(&mut self, report: &ClusterReport<'_>) -> std::io::Result<()> {
        let n_genes = report.gene_count();
        for a in report.assignments() {
            let j = a.junction;
            writeln!(
                self.out,
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                j.name,
                j.cluster_id,
                j.chromosome,
                j.start,
                j.stop,
                n_genes,
                a.gene.map(|g| g.symbol.as_str()).unwrap_or("NA"),
                a.has_exon_overlap.map(flag).unwrap_or("NA"),
            )?;
            self.rows += 1;
        }
        Ok(())
    }

    pub fn finish(mut self) -> std::io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}
