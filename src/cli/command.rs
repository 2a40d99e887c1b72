use std::path::PathBuf;

use crate::import::ImportFormat;
use crate::query::{Order, SortSpec};

pub enum Command {
    // Reads
    FindByGenre {
        genre: String,
    },
    PublishedAfter {
        year: i32,
    },
    ByAuthor {
        author: String,
    },
    InStockAfter {
        year: i32,
    },
    Projected {
        genre: String,
    },
    Sorted {
        order: Order,
    },
    Page {
        page: u64,
        size: u64,
        order_by: SortSpec,
    },
    // Writes
    UpdatePrice {
        title: String,
        price: f64,
    },
    DeleteByTitle {
        title: String,
    },
    // Reports
    AveragePriceByGenre,
    TopAuthor,
    ByDecade,
    /// All three reports in sequence.
    Reports,
    // Indexes
    CreateIndexes,
    Indexes,
    // Seeding
    Seed {
        file: PathBuf,
        format: ImportFormat,
        skip_errors: bool,
    },
}
