//! Cluster-to-gene resolution.
//!
//! Every cluster is classified by the number of distinct genes its junctions
//! overlap. Clusters touching more than one gene get a per-junction breakdown
//! and a nearest-gene recommendation based on boundary distance alone; exon
//! overlap is reported next to it but never changes the choice.

use std::collections::HashSet;

use log::{info, warn};

use crate::index::ChromosomeIndex;
use crate::junctions::{Cluster, Clusters};
use crate::model::gene::Gene;
use crate::model::junction::Junction;
use crate::model::types::GeneId;
use crate::types::Feature;

/// Default number of ambiguous clusters reported before the run stops.
pub const DEFAULT_MAX_AMBIGUOUS_CLUSTERS: usize = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Stop after this many ambiguous clusters; `None` resolves everything.
    pub max_ambiguous_clusters: Option<usize>,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            max_ambiguous_clusters: Some(DEFAULT_MAX_AMBIGUOUS_CLUSTERS),
        }
    }
}

/// One gene overlapping one junction.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub gene: &'a Gene,
    /// Bases shared between the junction and the full gene span.
    pub bp_overlap: u32,
    /// The junction touches an exon of some transcript of the gene.
    pub has_exon_overlap: bool,
    pub distance: u32,
}

/// Candidates for one junction of an ambiguous cluster.
#[derive(Debug, Clone)]
pub struct JunctionResolution<'a> {
    pub junction: &'a Junction,
    /// In annotation order.
    pub candidates: Vec<Candidate<'a>>,
    /// Index into `candidates` of the gene with the smallest boundary distance.
    pub nearest: Option<usize>,
}

impl<'a> JunctionResolution<'a> {
    pub fn nearest(&self) -> Option<&Candidate<'a>> {
        self.nearest.map(|i| &self.candidates[i])
    }
}

#[derive(Debug, Clone)]
pub enum Classification<'a> {
    /// No junction of the cluster overlaps any gene.
    NoGene,
    /// All overlaps hit the same gene; it is assigned to every junction.
    SingleGene(&'a Gene),
    /// More than one gene; genes are the union over all junctions, first-seen order.
    Ambiguous {
        genes: Vec<&'a Gene>,
        junctions: Vec<JunctionResolution<'a>>,
    },
}

#[derive(Debug, Clone)]
pub struct ClusterReport<'a> {
    pub cluster: &'a Cluster,
    pub class: Classification<'a>,
}

impl<'a> ClusterReport<'a> {
    pub fn gene_count(&self) -> usize {
        match &self.class {
            Classification::NoGene => 0,
            Classification::SingleGene(_) => 1,
            Classification::Ambiguous { genes, .. } => genes.len(),
        }
    }

    pub fn is_ambiguous(&self) -> bool {
        matches!(self.class, Classification::Ambiguous { .. })
    }

    /// The gene assigned to each junction, with its exon-overlap flag.
    pub fn assignments(&self) -> Vec<Assignment<'a>> {
        let cluster: &'a Cluster = self.cluster;
        let junctions = &cluster.junctions;
        match &self.class {
            Classification::NoGene => junctions
                .iter()
                .map(|j| Assignment { junction: j, gene: None, has_exon_overlap: None })
                .collect(),
            Classification::SingleGene(gene) => junctions
                .iter()
                .map(|j| Assignment {
                    junction: j,
                    gene: Some(*gene),
                    has_exon_overlap: Some(gene.has_exon_overlapping(j)),
                })
                .collect(),
            Classification::Ambiguous { junctions, .. } => junctions
                .iter()
                .map(|r| {
                    let nearest = r.nearest();
                    Assignment {
                        junction: r.junction,
                        gene: nearest.map(|c| c.gene),
                        has_exon_overlap: nearest.map(|c| c.has_exon_overlap),
                    }
                })
                .collect(),
        }
    }
}

/// Final gene call for one junction.
#[derive(Debug, Clone, Copy)]
pub struct Assignment<'a> {
    pub junction: &'a Junction,
    pub gene: Option<&'a Gene>,
    pub has_exon_overlap: Option<bool>,
}

/// Counters of one `resolve` run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveSummary {
    pub clusters: usize,
    pub no_gene: usize,
    pub single_gene: usize,
    pub ambiguous: usize,
    /// The ambiguous-cluster cutoff ended the run before all clusters were seen.
    pub stopped_early: bool,
    /// Junction chromosomes absent from the annotation, first-seen order.
    pub missing_chromosomes: Vec<String>,
}

/// Resolves clusters against a read-only [`ChromosomeIndex`].
///
/// Clusters are independent of each other; the only state of a run lives in
/// the [`ResolveSummary`] threaded through [`Resolver::resolve_with`].
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    index: &'a ChromosomeIndex,
    opts: ResolveOptions,
}

impl<'a> Resolver<'a> {
    pub fn new(index: &'a ChromosomeIndex, opts: ResolveOptions) -> Self {
        Self { index, opts }
    }

    /// Classify a single cluster.
    pub fn resolve_cluster(&self, cluster: &'a Cluster) -> ClusterReport<'a> {
        let mut overlapping: Vec<&'a Gene> = Vec::new();
        let mut seen: HashSet<GeneId> = HashSet::new();
        let mut genes_per_junction: Vec<Vec<&'a Gene>> = Vec::with_capacity(cluster.junctions.len());

        for junction in &cluster.junctions {
            let genes = self.index.overlapping_genes(&junction.chromosome, junction);
            for &g in &genes {
                if seen.insert(g.id) {
                    overlapping.push(g);
                }
            }
            genes_per_junction.push(genes);
        }

        let class = match overlapping.len() {
            0 => Classification::NoGene,
            1 => Classification::SingleGene(overlapping[0]),
            _ => Classification::Ambiguous {
                genes: overlapping,
                junctions: cluster
                    .junctions
                    .iter()
                    .zip(genes_per_junction)
                    .map(|(j, genes)| resolve_junction(j, genes))
                    .collect(),
            },
        };

        ClusterReport { cluster, class }
    }

    /// Resolve clusters in order, handing each report to `sink`.
    ///
    /// Stops after the configured number of ambiguous clusters has been
    /// delivered; that is a normal end of the run, flagged in the summary.
    pub fn resolve_with<E, F>(&self, clusters: &'a Clusters, mut sink: F) -> Result<ResolveSummary, E>
    where
        F: FnMut(ClusterReport<'a>) -> Result<(), E>,
    {
        let mut summary = ResolveSummary::default();
        let mut missing: HashSet<&str> = HashSet::new();

        for cluster in clusters {
            for j in &cluster.junctions {
                if self.index.chr_id(&j.chromosome).is_none() && missing.insert(j.chromosome.as_str()) {
                    warn!(
                        "Chromosome {} is not in the annotation; its junctions overlap no genes",
                        j.chromosome
                    );
                    summary.missing_chromosomes.push(j.chromosome.clone());
                }
            }

            let report = self.resolve_cluster(cluster);
            summary.clusters += 1;
            match report.gene_count() {
                0 => summary.no_gene += 1,
                1 => summary.single_gene += 1,
                _ => summary.ambiguous += 1,
            }
            sink(report)?;

            if let Some(max) = self.opts.max_ambiguous_clusters {
                if summary.ambiguous >= max && summary.clusters < clusters.len() {
                    info!("Reported {} ambiguous clusters; stopping", summary.ambiguous);
                    summary.stopped_early = true;
                    break;
                }
            }
        }

        Ok(summary)
    }

    /// Collect all reports in memory.
    pub fn resolve(&self, clusters: &'a Clusters) -> (Vec<ClusterReport<'a>>, ResolveSummary) {
        let mut reports = Vec::new();
        let summary = self
            .resolve_with(clusters, |r| {
                reports.push(r);
                Ok::<(), std::convert::Infallible>(())
            })
            .unwrap_or_else(|never| match never {});
        (reports, summary)
    }
}

/// Per-junction breakdown; the first candidate at minimum distance wins.
fn resolve_junction<'a>(junction: &'a Junction, genes: Vec<&'a Gene>) -> JunctionResolution<'a> {
    let candidates: Vec<Candidate<'a>> = genes
        .into_iter()
        .map(|gene| Candidate {
            gene,
            bp_overlap: gene.bp_overlap(junction),
            has_exon_overlap: gene.has_exon_overlapping(junction),
            distance: gene.boundary_distance(junction),
        })
        .collect();

    let mut nearest: Option<usize> = None;
    for (i, c) in candidates.iter().enumerate() {
        match nearest {
            Some(n) if candidates[n].distance <= c.distance => {}
            _ => nearest = Some(i),
        }
    }

    JunctionResolution {
        junction,
        candidates,
        nearest,
    }
}
