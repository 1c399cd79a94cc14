//! junction_annotator
//!
//! Annotates LeafCutter splice-junction clusters with the genes they overlap.
//! A GTF gene model is indexed per chromosome; every cluster is classified as
//! touching no gene, one gene, or several genes, and junctions of ambiguous
//! clusters get a nearest-gene recommendation. Coordinates are 1-based,
//! inclusive throughout.

pub mod error;
pub mod types;
pub mod fileio;
pub mod model;
pub mod annotation;
pub mod index;
pub mod junctions;
pub mod resolve;
pub mod report;
pub mod pipeline;

pub use error::{Error, Result};
pub use index::{ChromosomeIndex, IdNameKeys};

pub use annotation::AnnotationBuilder;
pub use junctions::{Cluster, Clusters, JunctionLoader};
pub use resolve::{Classification, ClusterReport, ResolveOptions, ResolveSummary, Resolver};
pub use report::AssignmentTable;
pub use pipeline::{annotate, AnnotateConfig};

pub use types::{Feature, Span, Strand};

pub use model::gene::Gene;
pub use model::junction::Junction;
pub use model::transcript::Transcript;
pub use model::types::{GeneId, GeneKey};
