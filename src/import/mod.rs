//! Seeding the collection from NDJSON or JSON array files.
mod json;
mod options;
mod pipeline;

pub use options::{ImportFormat, ImportOptions, ImportReport};
pub use pipeline::{detect_format, import_file, import_from_reader};
