pub mod book;
pub mod cli;
pub mod config;
pub mod errors;
pub mod facade;
pub mod import;
pub mod logger;
pub mod query;
pub mod store;

pub use book::{AuthorCount, Book, BookSummary, DecadeCount, GenreAverage};
pub use config::{AppConfig, Backend};
pub use errors::BookError;
pub use facade::BookQueries;
pub use store::{BookStore, MemoryStore, MongoStore};

