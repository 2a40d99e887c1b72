use std::io::{BufRead, BufReader, Read};

use bson::Document as BsonDocument;

use super::options::{ImportOptions, ImportReport};
use crate::book::Book;
use crate::errors::BookError;
use crate::store::BookStore;

/// Accumulates decoded books and writes them in batches.
struct Batch<'a> {
    store: &'a dyn BookStore,
    opts: &'a ImportOptions,
    pending: Vec<BsonDocument>,
}

impl<'a> Batch<'a> {
    fn new(store: &'a dyn BookStore, opts: &'a ImportOptions) -> Self {
        Self { store, opts, pending: Vec::with_capacity(opts.batch_size.max(1)) }
    }

    fn push(
        &mut self,
        record: usize,
        parsed: Result<Book, serde_json::Error>,
        report: &mut ImportReport,
    ) -> Result<(), BookError> {
        match parsed {
            Ok(book) => self.pending.push(book.to_document()?),
            Err(e) if self.opts.skip_errors => {
                log::warn!("import: skipping record {record}: {e}");
                report.skipped += 1;
                return Ok(());
            }
            Err(e) => {
                log::warn!(
                    target: crate::logger::AUDIT_TARGET,
                    "import collection={} aborted at record {record} inserted={}",
                    self.store.name(),
                    report.inserted
                );
                return Err(BookError::Import {
                    record,
                    inserted: report.inserted,
                    message: e.to_string(),
                });
            }
        }
        if self.pending.len() >= self.opts.batch_size.max(1) {
            self.flush(report)?;
        }
        if let Some(n) = self.opts.progress_every
            && n > 0
            && record % n == 0
        {
            log::info!("imported {} records", report.inserted + self.pending.len() as u64);
        }
        Ok(())
    }

    fn flush(&mut self, report: &mut ImportReport) -> Result<(), BookError> {
        let docs = std::mem::take(&mut self.pending);
        report.inserted += self.store.insert_many(docs)?;
        Ok(())
    }
}

/// One JSON object per line; blank lines are ignored. Records are numbered by line.
pub fn import_ndjson<R: Read>(
    store: &dyn BookStore,
    reader: R,
    opts: &ImportOptions,
    report: &mut ImportReport,
) -> Result<(), BookError> {
    let mut batch = Batch::new(store, opts);
    for (idx, line) in BufReader::new(reader).lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        batch.push(idx + 1, serde_json::from_str::<Book>(line), report)?;
    }
    batch.flush(report)
}

/// A single JSON array of book objects.
pub fn import_json_array<R: Read>(
    store: &dyn BookStore,
    mut reader: R,
    opts: &ImportOptions,
    report: &mut ImportReport,
) -> Result<(), BookError> {
    let mut s = String::new();
    reader.read_to_string(&mut s)?;
    let values: Vec<serde_json::Value> = serde_json::from_str(&s)?;
    let mut batch = Batch::new(store, opts);
    for (idx, v) in values.into_iter().enumerate() {
        batch.push(idx + 1, serde_json::from_value::<Book>(v), report)?;
    }
    batch.flush(report)
}
