use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use flate2::read::GzDecoder;

use crate::errors::EdgeListProviderError;

/// Opens `path` for buffered reading, decompressing `.gz` files.
pub(crate) fn open(path: &Path) -> Result<Box<dyn BufRead>, EdgeListProviderError> {
    let file = File::open(path).map_err(|source| EdgeListProviderError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    if is_gzip(path) {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

pub(crate) fn is_gzip(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
}
