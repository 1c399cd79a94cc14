use std::path::PathBuf;

/// Errors raised while loading annotation or junction input.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {source} ({path})")]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("malformed annotation record at line {line_no}: {problem}\n  {line}")]
    MalformedAnnotation {
        line_no: usize,
        problem: String,
        line: String,
    },

    #[error("malformed junction identifier '{raw}': {problem}")]
    MalformedJunction { raw: String, problem: String },
}

impl Error {
    /// Convenience for wrapping an `io::Error` with a path context.
    pub fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            source,
            path: path.into(),
        }
    }

    pub(crate) fn annotation(line_no: usize, problem: impl Into<String>, line: &str) -> Self {
        Self::MalformedAnnotation {
            line_no,
            problem: problem.into(),
            line: line.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
