use crate::types::{Feature, Span, Strand};

/// A transcript owned by exactly one [`crate::Gene`].
///
/// While the annotation is being read the span grows with every record seen
/// for the transcript; a `transcript` record, when present, takes precedence
/// once [`Transcript::finalize`] runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    pub id: String,
    pub strand: Strand,
    span: Span,
    declared: Option<Span>,
    exons: Vec<Span>,
}

impl Transcript {
    pub fn new(id: impl Into<String>, strand: Strand, first_seen: Span) -> Self {
        Self {
            id: id.into(),
            strand,
            span: first_seen,
            declared: None,
            exons: Vec::new(),
        }
    }

    /// Record the coordinates of an explicit `transcript` line.
    pub fn declare_span(&mut self, span: Span) {
        self.declared = Some(span);
    }

    pub fn add_exon(&mut self, exon: Span) {
        self.span = self.span.union(exon);
        self.exons.push(exon);
    }

    pub fn exons(&self) -> &[Span] {
        &self.exons
    }

    pub fn span(&self) -> Span {
        self.span
    }

    /// Sort exons by position and settle the final span.
    pub fn finalize(&mut self) -> Span {
        self.exons.sort_by_key(|e| (e.start, e.stop));
        if let Some(d) = self.declared {
            self.span = d;
        }
        self.span
    }

    pub fn has_exon_overlapping<F: Feature + ?Sized>(&self, feature: &F) -> bool {
        self.exons.iter().any(|e| e.overlaps(feature))
    }
}

impl Feature for Transcript {
    fn start(&self) -> u32 {
        self.span.start
    }

    fn stop(&self) -> u32 {
        self.span.stop
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finalize_sorts_exons_and_prefers_declared_span() {
        let mut tx = Transcript::new("T1", Strand::Plus, Span::new(300, 350));
        tx.add_exon(Span::new(300, 350));
        tx.add_exon(Span::new(100, 150));
        assert_eq!(tx.span(), Span::new(100, 350));

        tx.declare_span(Span::new(90, 360));
        let span = tx.finalize();

        assert_eq!(span, Span::new(90, 360));
        assert_eq!(tx.exons(), &[Span::new(100, 150), Span::new(300, 350)]);
    }

    #[test]
    fn exon_overlap_ignores_introns() {
        let mut tx = Transcript::new("T1", Strand::Minus, Span::new(100, 150));
        tx.add_exon(Span::new(100, 150));
        tx.add_exon(Span::new(300, 350));
        tx.finalize();

        assert!(tx.overlaps(&Span::new(160, 290)));
        assert!(!tx.has_exon_overlapping(&Span::new(160, 290)));
        assert!(tx.has_exon_overlapping(&Span::new(150, 299)));
    }
}
