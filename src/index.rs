use std::collections::HashMap;
use std::fmt;
use std::io::BufRead;

use crate::annotation::io::{AnnotationReader, AnnotationRecord};
use crate::error::{Error, Result};
use crate::model::gene::Gene;
use crate::model::types::{GeneId, GeneKey};
use crate::types::{Feature, Span};

/// Default bin width of the per-chromosome lookup, in base pairs.
pub const DEFAULT_BIN_WIDTH: u32 = 100_000;

/// Configure which attribute keys and feature types are read from the GTF:
/// - gene stable identifier (required on every consumed record)
/// - gene symbol (falls back to the gene identifier)
/// - transcript identifier (required on transcript and exon records)
/// - GFF3-style parent linkage, tried when no transcript key is present
///
/// Notes:
/// - We allow multiple keys per category; first present wins.
/// - Parent values are split by ',' and each is treated as a transcript id.
#[derive(Debug, Clone)]
pub struct IdNameKeys {
    pub gene_id_keys: Vec<String>,
    pub gene_name_keys: Vec<String>,
    pub transcript_id_keys: Vec<String>,
    pub parent_keys: Vec<String>,

    pub gene_feature_types: Vec<String>,
    pub transcript_feature_types: Vec<String>,
    pub exon_feature_types: Vec<String>,
}

impl Default for IdNameKeys {
    fn default() -> Self {
        Self {
            gene_id_keys: vec!["gene_id".into()],
            gene_name_keys: vec!["gene_name".into()],
            transcript_id_keys: vec!["transcript_id".into()],
            parent_keys: vec!["Parent".into()],

            gene_feature_types: vec!["gene".into()],
            transcript_feature_types: vec!["transcript".into()],
            exon_feature_types: vec!["exon".into()],
        }
    }
}

/// Per-chromosome bucket index: bin -> gene ids.
///
/// This is a pre-filter only: it returns candidate genes whose span touches
/// the same bins as the query.
#[derive(Debug, Clone)]
pub struct ChrBuckets {
    pub bin_width: u32,
    pub bins: Vec<Vec<GeneId>>,
}

impl ChrBuckets {
    pub fn new(bin_width: u32) -> Self {
        Self {
            bin_width,
            bins: Vec::new(),
        }
    }

    fn add_span(&mut self, gene_id: GeneId, span: Span) {
        let b0 = (span.start / self.bin_width) as usize;
        let b1 = (span.stop / self.bin_width) as usize;

        if self.bins.len() <= b1 {
            self.bins.resize_with(b1 + 1, Vec::new);
        }
        for b in b0..=b1 {
            self.bins[b].push(gene_id);
        }
    }

    fn finalize(&mut self) {
        for bin in &mut self.bins {
            bin.sort_unstable();
            bin.dedup();
        }
    }

    /// Candidate gene ids for a span (union across bins), sorted and deduped.
    fn candidates(&self, span: Span) -> Vec<GeneId> {
        let b0 = (span.start / self.bin_width) as usize;
        if b0 >= self.bins.len() {
            return Vec::new();
        }
        let b1 = ((span.stop / self.bin_width) as usize).min(self.bins.len() - 1);

        let mut out: Vec<GeneId> = Vec::new();
        for b in b0..=b1 {
            out.extend_from_slice(&self.bins[b]);
        }
        out.sort_unstable();
        out.dedup();
        out
    }
}

/// The read-only gene index:
/// - chromosome dictionary (chr name -> chr_id)
/// - deduplicated genes, numbered in annotation order
/// - genes per chromosome plus buckets for fast overlap lookup
#[derive(Debug, Clone)]
pub struct ChromosomeIndex {
    pub bin_width: u32,

    pub chr_names: Vec<String>,
    chr_to_id: HashMap<String, usize>,

    pub genes: Vec<Gene>,
    chr_genes: Vec<Vec<GeneId>>,
    chr_buckets: Vec<ChrBuckets>,

    /// Genes dropped because an identical gene (same place, same symbol) was already present.
    pub duplicates_merged: usize,
}

/// Human-readable summary of the `ChromosomeIndex`.
///
/// One global line (genes, transcripts, chromosomes, bin width) followed by
/// one line per chromosome with gene/transcript counts and bin occupancy.
impl fmt::Display for ChromosomeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n_txs: usize = self.genes.iter().map(|g| g.transcripts().len()).sum();

        writeln!(
            f,
            "ChromosomeIndex: {} genes, {} transcripts, {} chromosomes, bin_width={} bp",
            self.genes.len(),
            n_txs,
            self.chr_names.len(),
            self.bin_width
        )?;

        for (chr_id, chr_name) in self.chr_names.iter().enumerate() {
            let gene_ids = &self.chr_genes[chr_id];
            let n_txs: usize = gene_ids
                .iter()
                .map(|&g| self.genes[g].transcripts().len())
                .sum();

            let buckets = &self.chr_buckets[chr_id];
            let nbins = buckets.bins.len();
            let hits: usize = buckets.bins.iter().map(|b| b.len()).sum();
            let mean_genes_per_bin = if nbins == 0 {
                0.0
            } else {
                hits as f64 / nbins as f64
            };

            writeln!(
                f,
                "  - {}: genes={}, transcripts={}, bins={}, mean_genes/bin={:.3}",
                chr_name,
                gene_ids.len(),
                n_txs,
                nbins,
                mean_genes_per_bin
            )?;
        }

        Ok(())
    }
}

impl ChromosomeIndex {
    pub fn new(bin_width: u32) -> Self {
        Self {
            bin_width: bin_width.max(1),
            chr_names: Vec::new(),
            chr_to_id: HashMap::new(),
            genes: Vec::new(),
            chr_genes: Vec::new(),
            chr_buckets: Vec::new(),
            duplicates_merged: 0,
        }
    }

    /// Build an index directly from a GTF reader.
    ///
    /// Workflow:
    /// 1) parse records, keeping only gene/transcript/exon feature types
    /// 2) intern genes per (chromosome, gene id) and transcripts per gene
    /// 3) finalize spans (declared `gene`/`transcript` lines win over observed extents)
    /// 4) merge genes with the same [`GeneKey`]
    /// 5) group by chromosome and build buckets
    ///
    /// ```
    /// use std::io::Cursor;
    /// use junction_annotator::{ChromosomeIndex, IdNameKeys};
    ///
    /// let gtf = "\
    /// chr1\tsrc\tgene\t101\t250\t.\t+\t.\tgene_id \"G1\"; gene_name \"ALPHA\";\n\
    /// chr1\tsrc\texon\t101\t150\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1\";\n\
    /// chr1\tsrc\texon\t201\t250\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1\";\n";
    ///
    /// let idx = ChromosomeIndex::new(1000)
    ///     .from_reader(Cursor::new(gtf.as_bytes()), &IdNameKeys::default())
    ///     .unwrap();
    ///
    /// assert_eq!(idx.genes.len(), 1);
    /// assert_eq!(idx.genes_on_chromosome("chr1")[0].symbol, "ALPHA");
    /// assert!(idx.genes_on_chromosome("chrM").is_empty());
    /// ```
    pub fn from_reader<R: BufRead>(mut self, reader: R, keys: &IdNameKeys) -> Result<Self> {
        let mut drafts: Vec<Gene> = Vec::new();
        let mut draft_ids: HashMap<(usize, String), usize> = HashMap::new();

        for rec in AnnotationReader::new(reader).records() {
            let rec = rec?;

            let is_gene = rec.is_feature(&keys.gene_feature_types);
            let is_tx = rec.is_feature(&keys.transcript_feature_types);
            let is_exon = rec.is_feature(&keys.exon_feature_types);
            if !(is_gene || is_tx || is_exon) {
                continue;
            }

            let chr_id = self.intern_chr(&rec.seqname);

            let gene_key = rec.pick_first_attr(&keys.gene_id_keys).ok_or_else(|| {
                missing_attr(&rec, "gene id", &keys.gene_id_keys)
            })?;

            let draft = match draft_ids.get(&(chr_id, gene_key.clone())) {
                Some(&d) => d,
                None => {
                    let symbol = rec
                        .pick_first_attr(&keys.gene_name_keys)
                        .unwrap_or_else(|| gene_key.clone());
                    let d = drafts.len();
                    drafts.push(Gene::new(d, gene_key.clone(), symbol, chr_id, rec.strand, rec.span));
                    draft_ids.insert((chr_id, gene_key), d);
                    d
                }
            };
            let gene = &mut drafts[draft];

            if is_gene {
                gene.declare_span(rec.span);
                if let Some(name) = rec.pick_first_attr(&keys.gene_name_keys) {
                    gene.symbol = name;
                }
                continue;
            }
            gene.cover(rec.span);

            let tx_raw = rec
                .pick_first_attr(&keys.transcript_id_keys)
                .or_else(|| rec.pick_first_attr(&keys.parent_keys))
                .ok_or_else(|| {
                    let mut tried = keys.transcript_id_keys.clone();
                    tried.extend(keys.parent_keys.iter().cloned());
                    missing_attr(&rec, "transcript id", &tried)
                })?;

            for tx_key in split_parent_list(&tx_raw) {
                let t = gene.transcript_entry(&tx_key, rec.strand, rec.span);
                let tx = gene.transcript_mut(t);
                if is_tx {
                    tx.declare_span(rec.span);
                } else {
                    tx.add_exon(rec.span);
                }
            }
        }

        // Finalize and merge genes with identical coordinates + symbol
        let mut by_key: HashMap<GeneKey, GeneId> = HashMap::new();
        for mut gene in drafts {
            gene.finalize();
            let key = gene.key();
            match by_key.get(&key) {
                Some(&gid) => {
                    self.genes[gid].absorb(gene);
                    self.duplicates_merged += 1;
                }
                None => {
                    let gid = self.genes.len();
                    gene.id = gid;
                    by_key.insert(key, gid);
                    self.genes.push(gene);
                }
            }
        }

        self.build_buckets();

        Ok(self)
    }

    pub fn chr_id(&self, chr: &str) -> Option<usize> {
        self.chr_to_id.get(chr).copied()
    }

    /// Genes on a chromosome in annotation order; empty for an unknown chromosome.
    pub fn genes_on_chromosome(&self, chr: &str) -> Vec<&Gene> {
        match self.chr_id(chr) {
            Some(chr_id) => self.chr_genes[chr_id].iter().map(|&g| &self.genes[g]).collect(),
            None => Vec::new(),
        }
    }

    /// Genes on `chr` whose span overlaps `feature`, in annotation order.
    pub fn overlapping_genes<F: Feature + ?Sized>(&self, chr: &str, feature: &F) -> Vec<&Gene> {
        let Some(chr_id) = self.chr_id(chr) else {
            return Vec::new();
        };
        if feature.stop() < feature.start() {
            return Vec::new();
        }
        let query = Span {
            start: feature.start(),
            stop: feature.stop(),
        };

        self.chr_buckets[chr_id]
            .candidates(query)
            .into_iter()
            .map(|g| &self.genes[g])
            .filter(|g| g.overlaps(feature))
            .collect()
    }

    // -----------------------
    // Internal helpers
    // -----------------------

    fn intern_chr(&mut self, chr: &str) -> usize {
        if let Some(&id) = self.chr_to_id.get(chr) {
            return id;
        }
        let id = self.chr_names.len();
        self.chr_names.push(chr.to_string());
        self.chr_to_id.insert(chr.to_string(), id);
        id
    }

    fn build_buckets(&mut self) {
        self.chr_genes = vec![Vec::new(); self.chr_names.len()];
        self.chr_buckets = (0..self.chr_names.len())
            .map(|_| ChrBuckets::new(self.bin_width))
            .collect();

        for gene in &self.genes {
            self.chr_genes[gene.chr_id].push(gene.id);
            self.chr_buckets[gene.chr_id].add_span(gene.id, gene.span());
        }
        for cb in &mut self.chr_buckets {
            cb.finalize();
        }
    }
}

fn missing_attr(rec: &AnnotationRecord, what: &str, tried: &[String]) -> Error {
    Error::annotation(
        rec.line_no,
        format!("missing required {what} attribute (tried keys: {tried:?})"),
        &format!("{}\t{}\t{}", rec.seqname, rec.feature_type, rec.span),
    )
}

/// Split Parent= list (GFF3) by commas; also trim whitespace.
fn split_parent_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn build(gtf: &str, bin_width: u32) -> Result<ChromosomeIndex> {
        ChromosomeIndex::new(bin_width).from_reader(Cursor::new(gtf.as_bytes()), &IdNameKeys::default())
    }

    const TWO_GENES: &str = "\
chr1\tsrc\tgene\t100\t200\t.\t+\t.\tgene_id \"GA\"; gene_name \"A\";
chr1\tsrc\ttranscript\t100\t200\t.\t+\t.\tgene_id \"GA\"; transcript_id \"TA1\";
chr1\tsrc\texon\t100\t120\t.\t+\t.\tgene_id \"GA\"; transcript_id \"TA1\";
chr1\tsrc\texon\t180\t200\t.\t+\t.\tgene_id \"GA\"; transcript_id \"TA1\";
chr1\tsrc\tCDS\t185\t200\t.\t+\t0\tgene_id \"GA\"; transcript_id \"TA1\";
chr1\tsrc\tgene\t150\t300\t.\t-\t.\tgene_id \"GB\"; gene_name \"B\";
chr1\tsrc\texon\t150\t165\t.\t-\t.\tgene_id \"GB\"; transcript_id \"TB1\";
chr1\tsrc\texon\t250\t300\t.\t-\t.\tgene_id \"GB\"; transcript_id \"TB1\";
chr2\tsrc\tgene\t5000\t9000\t.\t+\t.\tgene_id \"GC\"; gene_name \"C\";
";

    #[test]
    fn builds_gene_transcript_exon_tree() {
        let idx = build(TWO_GENES, 100).unwrap();

        assert_eq!(idx.chr_names, vec!["chr1".to_string(), "chr2".to_string()]);
        assert_eq!(idx.genes.len(), 3);

        let a = &idx.genes[0];
        assert_eq!(a.symbol, "A");
        assert_eq!(a.span(), Span::new(100, 200));
        assert_eq!(a.transcripts().len(), 1);
        // CDS records are not exons
        assert_eq!(a.transcripts()[0].exons().len(), 2);

        let b = &idx.genes[1];
        assert_eq!(b.strand, crate::types::Strand::Minus);
        assert_eq!(b.transcripts()[0].span(), Span::new(150, 300));
    }

    #[test]
    fn genes_on_unknown_chromosome_is_empty() {
        let idx = build(TWO_GENES, 100).unwrap();
        assert_eq!(idx.genes_on_chromosome("chr1").len(), 2);
        assert_eq!(idx.genes_on_chromosome("chr2").len(), 1);
        assert!(idx.genes_on_chromosome("chrUn_KI270302v1").is_empty());
    }

    #[test]
    fn overlapping_genes_matches_linear_scan() {
        let idx = build(TWO_GENES, 64).unwrap();

        for (start, stop) in [(160, 170), (90, 99), (201, 249), (1, 10_000), (300, 300)] {
            let q = Span::new(start, stop);
            let fast: Vec<GeneId> = idx.overlapping_genes("chr1", &q).iter().map(|g| g.id).collect();
            let slow: Vec<GeneId> = idx
                .genes_on_chromosome("chr1")
                .into_iter()
                .filter(|g| g.overlaps(&q))
                .map(|g| g.id)
                .collect();
            assert_eq!(fast, slow, "query {q}");
        }
    }

    #[test]
    fn span_falls_back_to_records_without_gene_line() {
        let gtf = "\
chr1\tsrc\texon\t500\t600\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1\";
chr1\tsrc\texon\t800\t900\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T2\";
";
        let idx = build(gtf, 100).unwrap();
        let g = &idx.genes[0];
        assert_eq!(g.span(), Span::new(500, 900));
        // no gene_name => symbol is the id
        assert_eq!(g.symbol, "G1");
        assert_eq!(g.transcripts().len(), 2);
    }

    #[test]
    fn identical_genes_are_merged() {
        let gtf = "\
chr1\tsrc\tgene\t100\t200\t.\t+\t.\tgene_id \"ENSG1\"; gene_name \"DUP\";
chr1\tsrc\texon\t100\t200\t.\t+\t.\tgene_id \"ENSG1\"; transcript_id \"T1\";
chr1\tsrc\tgene\t100\t200\t.\t+\t.\tgene_id \"ENSG1.2\"; gene_name \"DUP\";
chr1\tsrc\texon\t120\t180\t.\t+\t.\tgene_id \"ENSG1.2\"; transcript_id \"T2\";
chr1\tsrc\tgene\t100\t200\t.\t+\t.\tgene_id \"ENSG9\"; gene_name \"OTHER\";
";
        let idx = build(gtf, 100).unwrap();
        assert_eq!(idx.genes.len(), 2);
        assert_eq!(idx.duplicates_merged, 1);
        assert_eq!(idx.genes[0].transcripts().len(), 2);
        assert_eq!(idx.genes[0].source_ids.len(), 2);
        assert_eq!(idx.genes[1].symbol, "OTHER");
    }

    #[test]
    fn merged_duplicates_keep_exons_of_shared_transcript() {
        let gtf = "\
chr1\tsrc\tgene\t100\t400\t.\t+\t.\tgene_id \"ENSG1\"; gene_name \"DUP\";
chr1\tsrc\texon\t100\t150\t.\t+\t.\tgene_id \"ENSG1\"; transcript_id \"T1\";
chr1\tsrc\tgene\t100\t400\t.\t+\t.\tgene_id \"ENSG1.2\"; gene_name \"DUP\";
chr1\tsrc\texon\t300\t400\t.\t+\t.\tgene_id \"ENSG1.2\"; transcript_id \"T1\";
";
        let idx = build(gtf, 100).unwrap();
        assert_eq!(idx.genes.len(), 1);
        assert_eq!(idx.genes[0].transcripts().len(), 1);
        assert!(idx.genes[0].has_exon_overlapping(&Span::new(350, 360)));
        assert!(idx.genes[0].has_exon_overlapping(&Span::new(120, 130)));
    }

    #[test]
    fn same_gene_id_on_two_chromosomes_stays_separate() {
        let gtf = "\
chrX\tsrc\tgene\t100\t200\t.\t+\t.\tgene_id \"PAR1\"; gene_name \"P\";
chrY\tsrc\tgene\t100\t200\t.\t+\t.\tgene_id \"PAR1\"; gene_name \"P\";
";
        let idx = build(gtf, 100).unwrap();
        assert_eq!(idx.genes.len(), 2);
        assert_eq!(idx.genes_on_chromosome("chrY").len(), 1);
    }

    #[test]
    fn missing_gene_id_is_fatal() {
        let gtf = "chr1\tsrc\texon\t100\t200\t.\t+\t.\ttranscript_id \"T1\";\n";
        let err = build(gtf, 100).unwrap_err();
        match err {
            Error::MalformedAnnotation { line_no, problem, .. } => {
                assert_eq!(line_no, 1);
                assert!(problem.contains("gene id"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_transcript_id_on_exon_is_fatal() {
        let gtf = "chr1\tsrc\texon\t100\t200\t.\t+\t.\tgene_id \"G1\";\n";
        assert!(matches!(build(gtf, 100), Err(Error::MalformedAnnotation { .. })));
    }

    #[test]
    fn parent_list_creates_two_transcripts() {
        let gtf = "chr2\tsrc\texon\t5\t20\t.\t-\t.\tParent=tx1,tx2;gene_id=G9;gene_name=Nice\n";
        let idx = build(gtf, 100).unwrap();
        assert_eq!(idx.genes[0].symbol, "Nice");
        assert_eq!(idx.genes[0].transcripts().len(), 2);
    }

    #[test]
    fn display_lists_every_chromosome() {
        let idx = build(TWO_GENES, 100).unwrap();
        let s = idx.to_string();
        assert!(s.starts_with("ChromosomeIndex: 3 genes, 2 transcripts, 2 chromosomes"));
        assert!(s.contains("  - chr1: genes=2"));
        assert!(s.contains("  - chr2: genes=1"));
    }
}
