use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use super::json::{import_json_array, import_ndjson};
use super::options::{ImportFormat, ImportOptions, ImportReport};
use crate::errors::BookError;
use crate::store::BookStore;

/// Skips leading whitespace and decides the format from the first non-blank byte.
pub fn detect_format<R: BufRead>(reader: &mut R) -> Result<ImportFormat, BookError> {
    loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            return Ok(ImportFormat::Ndjson);
        }
        match buf.iter().position(|b| !b.is_ascii_whitespace()) {
            Some(i) => {
                let format = if buf[i] == b'[' { ImportFormat::JsonArray } else { ImportFormat::Ndjson };
                reader.consume(i);
                return Ok(format);
            }
            None => {
                let n = buf.len();
                reader.consume(n);
            }
        }
    }
}

/// Import books from a file path into `store`.
///
/// # Errors
/// I/O errors on read failures; [`BookError::Import`] for an undecodable record
/// unless `skip_errors` is set; store errors unchanged.
pub fn import_file<P: AsRef<Path>>(
    store: &dyn BookStore,
    path: P,
    opts: &ImportOptions,
) -> Result<ImportReport, BookError> {
    log::info!("import: path={}, collection={}", path.as_ref().display(), store.name());
    let file = File::open(&path)?;
    import_from_reader(store, file, opts)
}

pub fn import_from_reader<R: Read>(
    store: &dyn BookStore,
    reader: R,
    opts: &ImportOptions,
) -> Result<ImportReport, BookError> {
    let mut reader = BufReader::new(reader);
    let format = match opts.format {
        ImportFormat::Auto => detect_format(&mut reader)?,
        other => other,
    };
    let mut report = ImportReport::default();
    match format {
        ImportFormat::JsonArray => import_json_array(store, reader, opts, &mut report)?,
        _ => import_ndjson(store, reader, opts, &mut report)?,
    }
    log::info!(
        target: crate::logger::AUDIT_TARGET,
        "import collection={} inserted={} skipped={}",
        store.name(),
        report.inserted,
        report.skipped
    );
    Ok(report)
}
