// Shared fixtures for the integration and property suites
#![allow(dead_code)]

use std::sync::Arc;

use bookshelf::{Book, BookQueries, MemoryStore};

pub fn sample_books() -> Vec<Book> {
    vec![
        Book::new("The Great Gatsby", "F. Scott Fitzgerald", "Classic", 1925, 10.99, true),
        Book::new("Beloved", "Toni Morrison", "Historical Fiction", 1987, 14.00, true),
        Book::new("The Hobbit", "J.R.R. Tolkien", "Fantasy", 1937, 12.50, true),
        Book::new("The Fellowship of the Ring", "J.R.R. Tolkien", "Fantasy", 1954, 15.25, false),
        Book::new("A Game of Thrones", "George R.R. Martin", "Fantasy", 1996, 18.75, true),
        Book::new("Song of Solomon", "Toni Morrison", "Fiction", 1977, 11.00, true),
        Book::new("Wolf Hall", "Hilary Mantel", "Historical Fiction", 2009, 16.40, false),
        Book::new("The Road", "Cormac McCarthy", "Fiction", 2006, 9.99, true),
        Book::new("Circe", "Madeline Miller", "Fantasy", 2018, 13.30, true),
        Book::new("Emma", "Jane Austen", "Classic", 1815, 7.25, false),
        Book::new("The Night Circus", "Erin Morgenstern", "Fantasy", 2011, 12.00, true),
        Book::new("The Remains of the Day", "Kazuo Ishiguro", "Fiction", 1989, 10.00, true),
    ]
}

/// A facade over an empty in-process collection.
pub fn empty_queries() -> BookQueries {
    BookQueries::new(Arc::new(MemoryStore::new("books")))
}

/// A facade over an in-process collection holding `books`.
pub fn queries_with(books: &[Book]) -> BookQueries {
    let q = empty_queries();
    q.insert_books(books).expect("seed books");
    q
}

pub fn sample_queries() -> BookQueries {
    queries_with(&sample_books())
}

pub fn titles(books: &[Book]) -> Vec<&str> {
    books.iter().map(|b| b.title.as_str()).collect()
}
