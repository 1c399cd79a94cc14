use std::io::Write;
use std::path::PathBuf;

use log::info;

use crate::annotation::AnnotationBuilder;
use crate::error::{Error, Result};
use crate::fileio::create_text;
use crate::index::IdNameKeys;
use crate::junctions::JunctionLoader;
use crate::report::AssignmentTable;
use crate::resolve::{ResolveOptions, ResolveSummary, Resolver};

/// Everything one annotation run needs.
#[derive(Debug, Clone)]
pub struct AnnotateConfig {
    pub annotation: PathBuf,
    pub junctions: PathBuf,
    pub output: PathBuf,
    pub bin_width: u32,
    pub keys: IdNameKeys,
    pub max_junctions: Option<usize>,
    pub resolve: ResolveOptions,
}

/// Load junctions and annotation, resolve every cluster, write the text report
/// to `report` and the assignment table to `cfg.output`.
pub fn annotate<W: Write>(cfg: &AnnotateConfig, mut report: W) -> Result<ResolveSummary> {
    let clusters = JunctionLoader::new(cfg.max_junctions).load_from_path(&cfg.junctions)?;

    let index = AnnotationBuilder::new(cfg.bin_width)
        .keys(cfg.keys.clone())
        .build_from_path(&cfg.annotation)?;
    log::debug!("{index}");

    let out = create_text(&cfg.output)?;
    let mut table = AssignmentTable::new(out).map_err(|e| Error::io(e, &cfg.output))?;

    let summary = Resolver::new(&index, cfg.resolve).resolve_with(&clusters, |r| {
        write!(report, "{r}").map_err(|e| Error::io(e, "<report>"))?;
        table.write_report(&r).map_err(|e| Error::io(e, &cfg.output))
    })?;

    let rows = table.rows;
    table.finish().map_err(|e| Error::io(e, &cfg.output))?;
    report.flush().map_err(|e| Error::io(e, "<report>"))?;

    info!(
        "{} clusters resolved: {} without gene, {} single gene, {} ambiguous{}",
        summary.clusters,
        summary.no_gene,
        summary.single_gene,
        summary.ambiguous,
        if summary.stopped_early { " (ambiguous-cluster limit reached)" } else { "" }
    );
    info!("{} assignments written to {}", rows, cfg.output.display());

    Ok(summary)
}
