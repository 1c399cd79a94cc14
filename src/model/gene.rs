use crate::model::transcript::Transcript;
use crate::model::types::{GeneId, GeneKey};
use crate::types::{Feature, Span, Strand};

/// Gene model: symbol, span and the transcripts it owns.
///
/// Notes:
/// - `source_ids` keeps every `gene_id` folded into this gene by deduplication;
///   the first entry is the one that created it.
/// - transcripts are owned, never shared with another gene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gene {
    pub id: GeneId,
    pub source_ids: Vec<String>,
    pub symbol: String,
    pub chr_id: usize,
    pub strand: Strand,
    span: Span,
    declared: Option<Span>,
    transcripts: Vec<Transcript>,
}

impl Gene {
    pub fn new(
        id: GeneId,
        source_id: impl Into<String>,
        symbol: impl Into<String>,
        chr_id: usize,
        strand: Strand,
        first_seen: Span,
    ) -> Self {
        Self {
            id,
            source_ids: vec![source_id.into()],
            symbol: symbol.into(),
            chr_id,
            strand,
            span: first_seen,
            declared: None,
            transcripts: Vec::new(),
        }
    }

    /// Record the coordinates of an explicit `gene` line.
    pub fn declare_span(&mut self, span: Span) {
        self.declared = Some(span);
    }

    /// Widen the observed span with a transcript or exon record.
    pub fn cover(&mut self, span: Span) {
        self.span = self.span.union(span);
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn key(&self) -> GeneKey {
        GeneKey {
            chr_id: self.chr_id,
            start: self.span.start,
            stop: self.span.stop,
            symbol: self.symbol.clone(),
        }
    }

    /// Returns the index of the transcript, creating it on first sight.
    pub fn transcript_entry(&mut self, tx_id: &str, strand: Strand, first_seen: Span) -> usize {
        if let Some(i) = self.transcripts.iter().position(|t| t.id == tx_id) {
            return i;
        }
        self.transcripts.push(Transcript::new(tx_id, strand, first_seen));
        self.transcripts.len() - 1
    }

    pub fn transcript_mut(&mut self, idx: usize) -> &mut Transcript {
        &mut self.transcripts[idx]
    }

    pub fn transcripts(&self) -> &[Transcript] {
        &self.transcripts
    }

    /// Take over the transcripts and ids of a duplicate of this gene.
    ///
    /// A transcript id present in both genes keeps every exon of either copy.
    pub fn absorb(&mut self, other: Gene) {
        for id in other.source_ids {
            if !self.source_ids.contains(&id) {
                self.source_ids.push(id);
            }
        }
        for tx in other.transcripts {
            match self.transcripts.iter_mut().find(|t| t.id == tx.id) {
                Some(own) => {
                    for &exon in tx.exons() {
                        if !own.exons().contains(&exon) {
                            own.add_exon(exon);
                        }
                    }
                    own.finalize();
                }
                None => self.transcripts.push(tx),
            }
        }
    }

    /// Finalize transcripts and settle the gene span.
    pub fn finalize(&mut self) {
        for tx in &mut self.transcripts {
            tx.finalize();
        }
        if let Some(d) = self.declared {
            self.span = d;
        }
    }

    /// True if `feature` overlaps at least one exon of at least one transcript.
    pub fn has_exon_overlapping<F: Feature + ?Sized>(&self, feature: &F) -> bool {
        self.transcripts.iter().any(|t| t.has_exon_overlapping(feature))
    }
}

impl Feature for Gene {
    fn start(&self) -> u32 {
        self.span.start
    }

    fn stop(&self) -> u32 {
        self.span.stop
    }
}
