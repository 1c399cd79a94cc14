use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};

use junction_annotator::index::DEFAULT_BIN_WIDTH;
use junction_annotator::junctions::DEFAULT_MAX_JUNCTIONS;
use junction_annotator::resolve::DEFAULT_MAX_AMBIGUOUS_CLUSTERS;
use junction_annotator::{annotate, AnnotateConfig, IdNameKeys, ResolveOptions};

/// Annotate LeafCutter junction clusters with overlapping genes from a GTF.
#[derive(Parser, Debug)]
#[command(name = "junction-annotate")]
#[command(author, version, about)]
struct Cli {
    /// Gene annotation (.gtf or .gtf.gz)
    annotation_file: PathBuf,

    /// LeafCutter junction table with one header line (optionally .gz)
    junction_file: PathBuf,

    /// Per-junction gene assignment table (TSV, gzipped if it ends in .gz)
    output_file: PathBuf,

    /// Stop reading junctions after this many lines (0 = no limit)
    #[arg(long, default_value_t = DEFAULT_MAX_JUNCTIONS)]
    max_junctions: usize,

    /// Stop after reporting this many ambiguous clusters (0 = no limit)
    #[arg(long, default_value_t = DEFAULT_MAX_AMBIGUOUS_CLUSTERS)]
    max_ambiguous_clusters: usize,

    /// Bin width of the per-chromosome gene lookup in base pairs
    #[arg(long, default_value_t = DEFAULT_BIN_WIDTH)]
    bin_width: u32,

    /// Attribute keys to use for gene ID (repeatable).
    #[arg(
        long = "gene-id-key",
        value_name = "KEY",
        num_args = 1,
        action = ArgAction::Append,
        default_values_t = vec!["gene_id".to_string()]
    )]
    gene_id_keys: Vec<String>,

    /// Attribute keys to use for the gene symbol (repeatable).
    /// Falls back to the gene ID when none is present.
    #[arg(
        long = "gene-name-key",
        value_name = "KEY",
        num_args = 1,
        action = ArgAction::Append,
        default_values_t = vec!["gene_name".to_string()]
    )]
    gene_name_keys: Vec<String>,

    /// Attribute keys to use for transcript ID (repeatable).
    #[arg(
        long = "transcript-id-key",
        value_name = "KEY",
        num_args = 1,
        action = ArgAction::Append,
        default_values_t = vec!["transcript_id".to_string()]
    )]
    transcript_id_keys: Vec<String>,
}

fn limit(n: usize) -> Option<usize> {
    (n > 0).then_some(n)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let cfg = AnnotateConfig {
        annotation: cli.annotation_file,
        junctions: cli.junction_file,
        output: cli.output_file,
        bin_width: cli.bin_width,
        keys: IdNameKeys {
            gene_id_keys: cli.gene_id_keys,
            gene_name_keys: cli.gene_name_keys,
            transcript_id_keys: cli.transcript_id_keys,
            ..IdNameKeys::default()
        },
        max_junctions: limit(cli.max_junctions),
        resolve: ResolveOptions {
            max_ambiguous_clusters: limit(cli.max_ambiguous_clusters),
        },
    };

    let stdout = io::stdout();
    annotate(&cfg, io::BufWriter::new(stdout.lock())).with_context(|| {
        format!(
            "annotating {} against {}",
            cfg.junctions.display(),
            cfg.annotation.display()
        )
    })?;

    Ok(())
}
