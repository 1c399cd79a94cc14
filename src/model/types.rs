/// Internal numeric gene id (index into `ChromosomeIndex::genes`).
pub type GeneId = usize;

/// Value identity of a gene: the same symbol at the same place is the same gene,
/// however many annotation records (or `gene_id`s) describe it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GeneKey {
    pub chr_id: usize,
    pub start: u32,
    pub stop: u32,
    pub symbol: String,
}
