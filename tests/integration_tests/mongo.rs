// Runs against a live deployment: BOOKSHELF_TEST_MONGODB_URI=mongodb://localhost:27017 cargo test -- --ignored
use std::sync::Arc;

use bookshelf::query::SortSpec;
use bookshelf::{BookQueries, MongoStore};

use crate::support::sample_books;

fn live_queries(collection: &str) -> Option<BookQueries> {
    let uri = std::env::var("BOOKSHELF_TEST_MONGODB_URI").ok()?;
    let store = MongoStore::connect(&uri, "bookshelf_test", collection).expect("mongo client");
    let client = mongodb::sync::Client::with_uri_str(&uri).expect("mongo client");
    client
        .database("bookshelf_test")
        .collection::<bson::Document>(collection)
        .drop()
        .run()
        .expect("drop test collection");
    let q = BookQueries::new(Arc::new(store));
    q.insert_books(&sample_books()).expect("seed");
    Some(q)
}

#[test]
#[ignore]
fn mongo_reads_and_writes() {
    let Some(q) = live_queries("reads_writes") else { return };
    assert_eq!(q.find_by_genre("Fantasy").unwrap().len(), 5);
    assert!(q.find_published_after(2009).unwrap().iter().all(|b| b.published_year > 2009));

    assert_eq!(q.update_price("The Great Gatsby", 15.50).unwrap().modified, 1);
    assert_eq!(q.update_price("The Great Gatsby", 15.50).unwrap().modified, 0);
    assert_eq!(q.delete_by_title("Beloved").unwrap().deleted, 1);
    assert_eq!(q.delete_by_title("Beloved").unwrap().deleted, 0);

    let projected = q.find_projected("Fantasy").unwrap();
    assert_eq!(projected.len(), 5);
    let p0 = q.find_page(0, 5, SortSpec::asc("title")).unwrap();
    let p1 = q.find_page(1, 5, SortSpec::asc("title")).unwrap();
    assert!(p1.iter().all(|b| !p0.iter().any(|a| a.title == b.title)));
}

#[test]
#[ignore]
fn mongo_reports_and_indexes() {
    let Some(q) = live_queries("reports_indexes") else { return };
    let top = q.author_with_most_books().unwrap().unwrap();
    assert_eq!(top.author, "J.R.R. Tolkien");
    assert_eq!(top.total_books, 2);

    let averages = q.average_price_by_genre().unwrap();
    assert_eq!(averages[0].genre, "Classic");
    assert_eq!(averages[0].average_price, 9.12);

    let decades = q.books_by_decade().unwrap();
    assert_eq!(decades.first().unwrap().label(), "1810s");
    assert!(decades.windows(2).all(|w| w[0].decade < w[1].decade));

    q.create_indexes().unwrap();
    q.create_indexes().unwrap();
    assert_eq!(q.indexes().unwrap().len(), 2);
}
