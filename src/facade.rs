//! The book query facade: one canned request per operation against the `books` collection.

use std::path::Path;
use std::sync::Arc;

use bson::{Bson, Document as BsonDocument};
use serde::de::DeserializeOwned;

use crate::book::{
    AuthorCount, Book, BookSummary, DecadeCount, GenreAverage, bson_to_i64, count_field, fields,
};
use crate::config::{AppConfig, Backend};
use crate::errors::BookError;
use crate::import::{self, ImportOptions, ImportReport};
use crate::logger::AUDIT_TARGET as AUDIT;
use crate::query::{
    Accumulator, DeleteReport, Filter, FindOptions, GroupKey, IndexSpec, Order, Pipeline,
    ProjectExpr, SortSpec, Stage, UpdateDoc, UpdateReport, as_f64,
};
use crate::store::{BookStore, MemoryStore, MongoStore};

const AVERAGE_PRICE: &str = "averagePrice";
const TOTAL_BOOKS: &str = "totalBooks";

#[derive(Clone)]
pub struct BookQueries {
    store: Option<Arc<dyn BookStore>>,
}

impl BookQueries {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self { store: Some(store) }
    }

    /// A facade with no backend; every operation fails with [`BookError::NotConnected`].
    #[must_use]
    pub fn disconnected() -> Self {
        Self { store: None }
    }

    /// Opens the backend selected by `cfg`, loading the seed file into it when one is configured.
    pub fn open(cfg: &AppConfig) -> Result<Self, BookError> {
        let store: Arc<dyn BookStore> = match cfg.backend {
            Backend::Mongo => Arc::new(MongoStore::connect(&cfg.uri, &cfg.database, &cfg.collection)?),
            Backend::Memory => Arc::new(MemoryStore::new(cfg.collection.clone())),
        };
        let queries = Self::new(store);
        if let Some(path) = &cfg.seed_file {
            queries.seed(path, &ImportOptions::default())?;
        }
        Ok(queries)
    }

    /// Loads books from an NDJSON or JSON array file into the collection.
    pub fn seed(&self, path: &Path, opts: &ImportOptions) -> Result<ImportReport, BookError> {
        let store = self.store()?;
        let report = import::import_file(store, path, opts)?;
        log::info!("seeded {} with {} books from {}", store.name(), report.inserted, path.display());
        Ok(report)
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.store.is_some()
    }

    fn store(&self) -> Result<&dyn BookStore, BookError> {
        self.store.as_deref().ok_or(BookError::NotConnected)
    }

    fn find_books(&self, filter: &Filter, opts: &FindOptions) -> Result<Vec<Book>, BookError> {
        let store = self.store()?;
        let docs = store.find(filter, opts)?;
        log::debug!("find on {} returned {} documents", store.name(), docs.len());
        Ok(decode_rows(docs))
    }

    pub fn find_by_genre(&self, genre: &str) -> Result<Vec<Book>, BookError> {
        self.find_books(&Filter::eq(fields::GENRE, genre), &FindOptions::default())
    }

    pub fn find_published_after(&self, year: i32) -> Result<Vec<Book>, BookError> {
        self.find_books(&Filter::gt(fields::PUBLISHED_YEAR, year), &FindOptions::default())
    }

    pub fn find_by_author(&self, author: &str) -> Result<Vec<Book>, BookError> {
        self.find_books(&Filter::eq(fields::AUTHOR, author), &FindOptions::default())
    }

    /// Sets the price of the first book titled `title`.
    ///
    /// # Errors
    /// [`BookError::InvalidArgument`] when `new_price` is negative or not finite.
    pub fn update_price(&self, title: &str, new_price: f64) -> Result<UpdateReport, BookError> {
        if !new_price.is_finite() || new_price < 0.0 {
            return Err(BookError::InvalidArgument(format!(
                "price must be a non-negative number, got {new_price}"
            )));
        }
        let store = self.store()?;
        let update = UpdateDoc { set: vec![(fields::PRICE.to_string(), Bson::Double(new_price))] };
        let report = store.update_one(&Filter::eq(fields::TITLE, title), &update)?;
        log::info!(
            target: AUDIT,
            "update_price title={title:?} price={new_price} matched={} modified={}",
            report.matched,
            report.modified
        );
        Ok(report)
    }

    /// Deletes the first book titled `title`. No match is a zero count, not an error.
    pub fn delete_by_title(&self, title: &str) -> Result<DeleteReport, BookError> {
        let store = self.store()?;
        let report = store.delete_one(&Filter::eq(fields::TITLE, title))?;
        log::info!(target: AUDIT, "delete_by_title title={title:?} deleted={}", report.deleted);
        Ok(report)
    }

    pub fn find_in_stock_after_year(&self, year: i32) -> Result<Vec<Book>, BookError> {
        let filter = Filter::And(vec![
            Filter::eq(fields::IN_STOCK, true),
            Filter::gt(fields::PUBLISHED_YEAR, year),
        ]);
        self.find_books(&filter, &FindOptions::default())
    }

    /// Title, author and price of every book in `genre`.
    pub fn find_projected(&self, genre: &str) -> Result<Vec<BookSummary>, BookError> {
        let store = self.store()?;
        let opts = FindOptions {
            projection: Some(vec![
                fields::TITLE.to_string(),
                fields::AUTHOR.to_string(),
                fields::PRICE.to_string(),
            ]),
            ..Default::default()
        };
        let docs = store.find(&Filter::eq(fields::GENRE, genre), &opts)?;
        Ok(decode_rows(docs))
    }

    /// Every book ordered by price. Equal prices keep the collection's natural order.
    pub fn find_sorted(&self, order: Order) -> Result<Vec<Book>, BookError> {
        let opts = FindOptions {
            sort: Some(vec![SortSpec { field: fields::PRICE.to_string(), order }]),
            ..Default::default()
        };
        self.find_books(&Filter::True, &opts)
    }

    /// Zero-based page `page` of `page_size` books, ordered by `order_by`.
    ///
    /// # Errors
    /// [`BookError::InvalidArgument`] for a zero page size (which the server would
    /// read as "no limit") or when the offset overflows.
    pub fn find_page(&self, page: u64, page_size: u64, order_by: SortSpec) -> Result<Vec<Book>, BookError> {
        if page_size == 0 {
            return Err(BookError::InvalidArgument("page size must be at least 1".into()));
        }
        let skip = page.checked_mul(page_size).ok_or_else(|| {
            BookError::InvalidArgument(format!("page {page} of size {page_size} is out of range"))
        })?;
        let opts = FindOptions {
            sort: Some(vec![order_by]),
            skip: Some(skip),
            limit: Some(page_size),
            ..Default::default()
        };
        self.find_books(&Filter::True, &opts)
    }

    pub fn average_price_by_genre(&self) -> Result<Vec<GenreAverage>, BookError> {
        let rows = self.store()?.aggregate(&average_price_pipeline())?;
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            match (row.get(fields::GENRE), row.get(AVERAGE_PRICE).and_then(as_f64)) {
                (Some(Bson::String(genre)), Some(average_price)) => {
                    out.push(GenreAverage { genre: genre.clone(), average_price });
                }
                _ => log::warn!("skipping genre average without a genre or numeric prices: {row}"),
            }
        }
        Ok(out)
    }

    /// The author with the most books; on a tie the lexically smallest name wins.
    pub fn author_with_most_books(&self) -> Result<Option<AuthorCount>, BookError> {
        let rows = self.store()?.aggregate(&top_author_pipeline())?;
        let Some(row) = rows.into_iter().next() else {
            return Ok(None);
        };
        let author = match row.get("_id") {
            Some(Bson::String(s)) => s.clone(),
            _ => return Err(BookError::Malformed(format!("expected an author name: {row}"))),
        };
        Ok(Some(AuthorCount { author, total_books: count_field(&row, TOTAL_BOOKS)? }))
    }

    /// Book counts per decade of `published_year`, ascending by decade.
    pub fn books_by_decade(&self) -> Result<Vec<DecadeCount>, BookError> {
        let rows = self.store()?.aggregate(&decade_pipeline())?;
        rows.iter().map(decode_decade).collect()
    }

    /// Ensures `{title: 1}` and `{author: 1, published_year: 1}` exist. Safe to repeat.
    pub fn create_indexes(&self) -> Result<Vec<String>, BookError> {
        let store = self.store()?;
        let mut names = Vec::with_capacity(2);
        for spec in book_indexes() {
            let name = store.create_index(&spec)?;
            log::info!(target: AUDIT, "create_index collection={} name={name}", store.name());
            names.push(name);
        }
        Ok(names)
    }

    /// Secondary index names on the collection.
    pub fn indexes(&self) -> Result<Vec<String>, BookError> {
        self.store()?.list_indexes()
    }

    pub fn insert_books(&self, books: &[Book]) -> Result<u64, BookError> {
        let store = self.store()?;
        let docs = books.iter().map(Book::to_document).collect::<Result<Vec<_>, _>>()?;
        let inserted = store.insert_many(docs)?;
        log::info!(target: AUDIT, "insert_books collection={} inserted={inserted}", store.name());
        Ok(inserted)
    }
}

// One drifted document must not fail the whole read; it is skipped with a warning.
fn decode_rows<T: DeserializeOwned>(docs: Vec<BsonDocument>) -> Vec<T> {
    let mut out = Vec::with_capacity(docs.len());
    for doc in docs {
        let id = doc.get(fields::ID).cloned().unwrap_or(Bson::Null);
        match bson::from_document::<T>(doc) {
            Ok(row) => out.push(row),
            Err(e) => log::warn!("skipping undecodable book {id}: {e}"),
        }
    }
    out
}

fn decode_decade(row: &BsonDocument) -> Result<DecadeCount, BookError> {
    let decade = row
        .get("_id")
        .and_then(bson_to_i64)
        .and_then(|d| i32::try_from(d).ok())
        .ok_or_else(|| BookError::Malformed(format!("expected a numeric decade: {row}")))?;
    Ok(DecadeCount { decade, total_books: count_field(row, TOTAL_BOOKS)? })
}

/// `{title: 1}` and `{author: 1, published_year: 1}`.
#[must_use]
pub fn book_indexes() -> [IndexSpec; 2] {
    [
        IndexSpec::new(vec![SortSpec::asc(fields::TITLE)]),
        IndexSpec::new(vec![SortSpec::asc(fields::AUTHOR), SortSpec::asc(fields::PUBLISHED_YEAR)]),
    ]
}

/// Group by genre, average the price, round to cents, order by genre.
#[must_use]
pub fn average_price_pipeline() -> Pipeline {
    Pipeline::new()
        .stage(Stage::Group {
            key: GroupKey::Field(fields::GENRE.into()),
            fields: vec![(AVERAGE_PRICE.into(), Accumulator::Avg(fields::PRICE.into()))],
        })
        .stage(Stage::Project(vec![
            (fields::GENRE.into(), ProjectExpr::Key),
            (AVERAGE_PRICE.into(), ProjectExpr::Round { path: AVERAGE_PRICE.into(), places: 2 }),
        ]))
        .stage(Stage::Sort(vec![SortSpec::asc(fields::GENRE)]))
}

/// Count books per author; highest count first, ties by author name.
#[must_use]
pub fn top_author_pipeline() -> Pipeline {
    Pipeline::new()
        .stage(Stage::Group {
            key: GroupKey::Field(fields::AUTHOR.into()),
            fields: vec![(TOTAL_BOOKS.into(), Accumulator::Count)],
        })
        .stage(Stage::Sort(vec![SortSpec::desc(TOTAL_BOOKS), SortSpec::asc("_id")]))
        .stage(Stage::Limit(1))
}

/// Count books per numeric decade, sorted on the number rather than its label.
/// Documents whose year is null or not a number are left out.
#[must_use]
pub fn decade_pipeline() -> Pipeline {
    Pipeline::new()
        .stage(Stage::Match(Filter::Numeric { path: fields::PUBLISHED_YEAR.into() }))
        .stage(Stage::Group {
            key: GroupKey::Decade(fields::PUBLISHED_YEAR.into()),
            fields: vec![(TOTAL_BOOKS.into(), Accumulator::Count)],
        })
        .stage(Stage::Sort(vec![SortSpec::asc("_id")]))
}
