use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use log::{debug, info, warn};

use crate::error::{Error, Result};
use crate::fileio::open_text;
use crate::model::junction::Junction;

/// Lines between debug progress messages.
const PROGRESS_EVERY: usize = 50_000;

/// Default number of data lines read before loading stops.
pub const DEFAULT_MAX_JUNCTIONS: usize = 50_000;

/// Junctions sharing one cluster id, in the order they appear in the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    pub id: String,
    pub junctions: Vec<Junction>,
}

/// All clusters of one junction file.
///
/// Clusters keep first-seen order; junctions are only ever appended.
#[derive(Debug, Clone, Default)]
pub struct Clusters {
    clusters: Vec<Cluster>,
    by_id: HashMap<String, usize>,
    /// Data lines consumed (header excluded).
    pub lines_parsed: usize,
    /// True when loading stopped at the line limit before end of input.
    pub truncated: bool,
}

impl Clusters {
    pub fn push(&mut self, junction: Junction) {
        let idx = match self.by_id.get(&junction.cluster_id) {
            Some(&idx) => idx,
            None => {
                let idx = self.clusters.len();
                self.by_id.insert(junction.cluster_id.clone(), idx);
                self.clusters.push(Cluster {
                    id: junction.cluster_id.clone(),
                    junctions: Vec::new(),
                });
                idx
            }
        };
        self.clusters[idx].junctions.push(junction);
    }

    pub fn get(&self, cluster_id: &str) -> Option<&Cluster> {
        self.by_id.get(cluster_id).map(|&i| &self.clusters[i])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Cluster> {
        self.clusters.iter()
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn junction_count(&self) -> usize {
        self.clusters.iter().map(|c| c.junctions.len()).sum()
    }
}

impl<'a> IntoIterator for &'a Clusters {
    type Item = &'a Cluster;
    type IntoIter = std::slice::Iter<'a, Cluster>;

    fn into_iter(self) -> Self::IntoIter {
        self.clusters.iter()
    }
}

/// Reads a LeafCutter table and groups its junctions into clusters.
///
/// The first line is a header. Every following line starts with a
/// `chr:start:stop:cluster` identifier, separated from the rest of the line by
/// a tab (or a space when the line has no tab).
#[derive(Debug, Clone, Copy)]
pub struct JunctionLoader {
    /// Stop after this many data lines; `None` reads everything.
    pub max_junctions: Option<usize>,
}

impl Default for JunctionLoader {
    fn default() -> Self {
        Self {
            max_junctions: Some(DEFAULT_MAX_JUNCTIONS),
        }
    }
}

impl JunctionLoader {
    pub fn new(max_junctions: Option<usize>) -> Self {
        Self { max_junctions }
    }

    pub fn load_from_path<P: AsRef<Path>>(&self, path: P) -> Result<Clusters> {
        let path = path.as_ref();
        info!("Loading splice junctions from: {}", path.display());
        let reader = open_text(path)?;
        self.load_from_reader(reader).map_err(|e| match e {
            Error::Io { source, .. } => Error::io(source, path),
            other => other,
        })
    }

    pub fn load_from_reader<R: BufRead>(&self, mut reader: R) -> Result<Clusters> {
        let mut clusters = Clusters::default();
        let mut line = String::new();

        // header
        reader
            .read_line(&mut line)
            .map_err(|e| Error::io(e, "<junctions>"))?;

        loop {
            if let Some(max) = self.max_junctions {
                if clusters.lines_parsed >= max {
                    line.clear();
                    let more = reader
                        .read_line(&mut line)
                        .map_err(|e| Error::io(e, "<junctions>"))?;
                    clusters.truncated = more > 0;
                    break;
                }
            }

            line.clear();
            let n = reader
                .read_line(&mut line)
                .map_err(|e| Error::io(e, "<junctions>"))?;
            if n == 0 {
                break;
            }

            let s = line.trim();
            if s.is_empty() {
                continue;
            }

            clusters.push(Junction::parse_id(identifier_field(s))?);
            clusters.lines_parsed += 1;

            if clusters.lines_parsed % PROGRESS_EVERY == 0 {
                debug!(
                    "{} lines parsed, {} clusters",
                    clusters.lines_parsed,
                    clusters.len()
                );
            }
        }

        if clusters.truncated {
            warn!(
                "Junction loading stopped after {} lines (limit reached); remaining input ignored",
                clusters.lines_parsed
            );
        }
        info!(
            "{} lines parsed, {} loaded, {} clusters",
            clusters.lines_parsed,
            clusters.junction_count(),
            clusters.len()
        );

        Ok(clusters)
    }
}

/// First column of a data line: tab-delimited, or space-delimited as a fallback.
fn identifier_field(line: &str) -> &str {
    let sep = if line.contains('\t') { '\t' } else { ' ' };
    line.split(sep).next().unwrap_or(line)
}
