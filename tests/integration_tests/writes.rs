use bookshelf::BookError;

use crate::support::{empty_queries, queries_with, sample_books, sample_queries};

#[test]
fn update_price_is_visible_and_idempotent() {
    let q = sample_queries();
    let first = q.update_price("The Great Gatsby", 15.50).unwrap();
    assert_eq!((first.matched, first.modified), (1, 1));
    let gatsby = q.find_by_author("F. Scott Fitzgerald").unwrap();
    assert_eq!(gatsby[0].price, 15.50);

    let second = q.update_price("The Great Gatsby", 15.50).unwrap();
    assert_eq!((second.matched, second.modified), (1, 0));
}

#[test]
fn update_price_unknown_title_matches_nothing() {
    let q = sample_queries();
    let r = q.update_price("No Such Book", 3.0).unwrap();
    assert_eq!((r.matched, r.modified), (0, 0));
}

#[test]
fn update_price_touches_only_first_duplicate() {
    let mut books = sample_books();
    let mut dup = books[0].clone();
    dup.author = "Someone Else".into();
    books.push(dup);
    let q = queries_with(&books);
    q.update_price("The Great Gatsby", 1.0).unwrap();
    assert_eq!(q.find_by_author("F. Scott Fitzgerald").unwrap()[0].price, 1.0);
    assert_eq!(q.find_by_author("Someone Else").unwrap()[0].price, 10.99);
}

#[test]
fn update_price_rejects_bad_values() {
    let q = sample_queries();
    for bad in [-0.01, f64::INFINITY, f64::NAN] {
        assert!(matches!(q.update_price("Emma", bad), Err(BookError::InvalidArgument(_))));
    }
    // Nothing was written
    assert_eq!(q.find_by_author("Jane Austen").unwrap()[0].price, 7.25);
    assert_eq!(q.update_price("Emma", 0.0).unwrap().modified, 1);
}

#[test]
fn delete_by_title_removes_at_most_one() {
    let q = sample_queries();
    let before = q.find_by_author("Toni Morrison").unwrap().len();
    assert_eq!(q.delete_by_title("Beloved").unwrap().deleted, 1);
    assert_eq!(q.find_by_author("Toni Morrison").unwrap().len(), before - 1);
    assert_eq!(q.delete_by_title("Beloved").unwrap().deleted, 0);
}

#[test]
fn delete_on_empty_collection_is_zero() {
    let q = empty_queries();
    assert_eq!(q.delete_by_title("Beloved").unwrap().deleted, 0);
}

#[test]
fn create_indexes_twice_leaves_exactly_two() {
    let q = sample_queries();
    let names = q.create_indexes().unwrap();
    assert_eq!(names, ["title_1", "author_1_published_year_1"]);
    q.create_indexes().unwrap();
    let listed = q.indexes().unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().all(|n| n != "_id_"));
}

#[test]
fn insert_books_assigns_ids() {
    let q = empty_queries();
    assert_eq!(q.insert_books(&sample_books()[..3]).unwrap(), 3);
    assert_eq!(q.insert_books(&[]).unwrap(), 0);
    let all = q.find_published_after(i32::MIN).unwrap();
    assert_eq!(all.len(), 3);
    assert!(all.iter().all(|b| b.id.is_some()));
}

#[test]
fn disconnected_facade_fails_every_operation() {
    let q = bookshelf::BookQueries::disconnected();
    assert!(matches!(q.find_published_after(2000), Err(BookError::NotConnected)));
    assert!(matches!(q.update_price("Emma", 1.0), Err(BookError::NotConnected)));
    assert!(matches!(q.average_price_by_genre(), Err(BookError::NotConnected)));
    assert!(matches!(q.author_with_most_books(), Err(BookError::NotConnected)));
    assert!(matches!(q.indexes(), Err(BookError::NotConnected)));
    assert!(matches!(q.insert_books(&sample_books()), Err(BookError::NotConnected)));
}
