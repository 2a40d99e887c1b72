//! The Book document and the report rows derived from it.

use bson::oid::ObjectId;
use bson::{Bson, Document as BsonDocument};
use serde::{Deserialize, Serialize};

use crate::errors::BookError;
use crate::query::as_f64;

/// Field names as stored in the `books` collection.
pub mod fields {
    pub const ID: &str = "_id";
    pub const TITLE: &str = "title";
    pub const AUTHOR: &str = "author";
    pub const GENRE: &str = "genre";
    pub const PUBLISHED_YEAR: &str = "published_year";
    pub const PRICE: &str = "price";
    pub const IN_STOCK: &str = "in_stock";
}

/// A book as stored in the collection.
///
/// `published_year` is the canonical year field. Documents are decoded
/// leniently through [`StoredBook`]; see there for the fallbacks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredBook")]
pub struct Book {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub published_year: i32,
    pub price: f64,
    pub in_stock: bool,
}

/// The collection is schema-less, so a stored book is read field by field:
/// - `published_year` wins over the legacy `year` when both are present
/// - missing or null strings decode as empty, missing `in_stock` as `false`
/// - years and prices accept any numeric width; a year must be integral
/// - a non-ObjectId `_id` is dropped
///
/// Only a document without a numeric year or price is rejected.
#[derive(Debug, Default, Deserialize)]
struct StoredBook {
    #[serde(rename = "_id", default)]
    id: Option<Bson>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    genre: Option<String>,
    #[serde(default)]
    published_year: Option<Bson>,
    #[serde(default)]
    year: Option<Bson>,
    #[serde(default)]
    price: Option<Bson>,
    #[serde(default)]
    in_stock: Option<bool>,
}

fn year_of(v: Option<&Bson>) -> Option<i32> {
    v.and_then(bson_to_i64).and_then(|y| i32::try_from(y).ok())
}

impl TryFrom<StoredBook> for Book {
    type Error = String;

    fn try_from(raw: StoredBook) -> Result<Self, Self::Error> {
        let published_year = year_of(raw.published_year.as_ref())
            .or_else(|| year_of(raw.year.as_ref()))
            .ok_or_else(|| "missing or non-integral published_year".to_string())?;
        let price = raw
            .price
            .as_ref()
            .and_then(as_f64)
            .ok_or_else(|| "missing or non-numeric price".to_string())?;
        Ok(Book {
            id: match raw.id {
                Some(Bson::ObjectId(oid)) => Some(oid),
                _ => None,
            },
            title: raw.title.unwrap_or_default(),
            author: raw.author.unwrap_or_default(),
            genre: raw.genre.unwrap_or_default(),
            published_year,
            price,
            in_stock: raw.in_stock.unwrap_or(false),
        })
    }
}

impl Book {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        genre: impl Into<String>,
        published_year: i32,
        price: f64,
        in_stock: bool,
    ) -> Self {
        Self {
            id: None,
            title: title.into(),
            author: author.into(),
            genre: genre.into(),
            published_year,
            price,
            in_stock,
        }
    }

    pub fn to_document(&self) -> Result<BsonDocument, BookError> {
        Ok(bson::to_document(self)?)
    }

    pub fn from_document(doc: BsonDocument) -> Result<Self, BookError> {
        Ok(bson::from_document(doc)?)
    }
}

/// Projected read: title, author and price only. Decoded with the same
/// fallbacks as [`Book`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredSummary")]
pub struct BookSummary {
    pub title: String,
    pub author: String,
    pub price: f64,
}

#[derive(Debug, Default, Deserialize)]
struct StoredSummary {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    price: Option<Bson>,
}

impl TryFrom<StoredSummary> for BookSummary {
    type Error = String;

    fn try_from(raw: StoredSummary) -> Result<Self, Self::Error> {
        let price = raw
            .price
            .as_ref()
            .and_then(as_f64)
            .ok_or_else(|| "missing or non-numeric price".to_string())?;
        Ok(BookSummary {
            title: raw.title.unwrap_or_default(),
            author: raw.author.unwrap_or_default(),
            price,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreAverage {
    pub genre: String,
    #[serde(rename = "averagePrice")]
    pub average_price: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorCount {
    pub author: String,
    #[serde(rename = "totalBooks")]
    pub total_books: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecadeCount {
    pub decade: i32,
    #[serde(rename = "totalBooks")]
    pub total_books: u64,
}

impl DecadeCount {
    /// Display label, e.g. `1980s`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}s", self.decade)
    }
}

// Aggregation results come back with whatever numeric width the server picked.
pub(crate) fn bson_to_i64(v: &Bson) -> Option<i64> {
    match v {
        Bson::Int32(i) => Some(i64::from(*i)),
        Bson::Int64(i) => Some(*i),
        Bson::Double(f) if f.is_finite() && f.fract() == 0.0 => Some(*f as i64),
        _ => None,
    }
}

pub(crate) fn count_field(doc: &BsonDocument, key: &str) -> Result<u64, BookError> {
    doc.get(key)
        .and_then(bson_to_i64)
        .and_then(|n| u64::try_from(n).ok())
        .ok_or_else(|| BookError::Malformed(format!("expected a count in `{key}`: {doc}")))
}
