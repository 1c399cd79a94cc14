use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::error::{Error, Result};

fn is_gz(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("gz"))
        .unwrap_or(false)
}

/// Open a text file for buffered reading, decompressing when the name ends in `.gz`.
pub fn open_text(path: &Path) -> Result<Box<dyn BufRead>> {
    let f = File::open(path).map_err(|e| Error::io(e, path))?;

    if is_gz(path) {
        Ok(Box::new(BufReader::new(GzDecoder::new(f))))
    } else {
        Ok(Box::new(BufReader::new(f)))
    }
}

/// Create a text file for buffered writing, gzip-compressed when the name ends in `.gz`.
pub fn create_text(path: &Path) -> Result<Box<dyn Write>> {
    let f = File::create(path).map_err(|e| Error::io(e, path))?;

    if is_gz(path) {
        Ok(Box::new(BufWriter::new(GzEncoder::new(f, Compression::default()))))
    } else {
        Ok(Box::new(BufWriter::new(f)))
    }
}
