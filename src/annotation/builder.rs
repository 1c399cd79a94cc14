use std::io::BufRead;
use std::path::Path;

use log::info;

use crate::error::{Error, Result};
use crate::fileio::open_text;
use crate::index::{ChromosomeIndex, IdNameKeys, DEFAULT_BIN_WIDTH};

/// High-level builder for creating a `ChromosomeIndex` from a GTF file.
///
/// - parses the whole file (optionally gzipped)
/// - configurable attribute keys and feature types
/// - builds genes + transcripts + exons, the chromosome dictionary and buckets
#[derive(Debug, Clone)]
pub struct AnnotationBuilder {
    pub bin_width: u32,
    pub keys: IdNameKeys,
}

impl Default for AnnotationBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_BIN_WIDTH)
    }
}

impl AnnotationBuilder {
    pub fn new(bin_width: u32) -> Self {
        Self {
            bin_width,
            keys: IdNameKeys::default(),
        }
    }

    pub fn keys(mut self, keys: IdNameKeys) -> Self {
        self.keys = keys;
        self
    }

    /// Convenience: set the gene id key(s), first present wins.
    pub fn gene_id_keys(mut self, keys: &[&str]) -> Self {
        self.keys.gene_id_keys = keys.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Convenience: set the gene symbol key(s).
    pub fn gene_name_keys(mut self, keys: &[&str]) -> Self {
        self.keys.gene_name_keys = keys.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Convenience: set transcript id key(s).
    pub fn transcript_id_keys(mut self, keys: &[&str]) -> Self {
        self.keys.transcript_id_keys = keys.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Convenience: define what feature types count as exons.
    pub fn exon_feature_types(mut self, types: &[&str]) -> Self {
        self.keys.exon_feature_types = types.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Build index from anything implementing `BufRead`.
    pub fn build_from_reader<R: BufRead>(&self, reader: R) -> Result<ChromosomeIndex> {
        ChromosomeIndex::new(self.bin_width).from_reader(reader, &self.keys)
    }

    /// Build index from a file path; `.gz` files are decompressed on the fly.
    pub fn build_from_path<P: AsRef<Path>>(&self, path: P) -> Result<ChromosomeIndex> {
        let path = path.as_ref();
        info!("Loading annotation from: {}", path.display());

        let reader = open_text(path)?;
        let idx = self.build_from_reader(reader).map_err(|e| match e {
            Error::Io { source, .. } => Error::io(source, path),
            other => other,
        })?;

        info!(
            "Indexed {} genes on {} chromosomes ({} duplicate genes merged)",
            idx.genes.len(),
            idx.chr_names.len(),
            idx.duplicates_merged
        );
        Ok(idx)
    }
}

// -------------------- tests --------------------
