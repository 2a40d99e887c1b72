use bookshelf::{AuthorCount, Book, DecadeCount, GenreAverage};

use crate::support::{empty_queries, queries_with, sample_queries};

#[test]
fn decades_scenario() {
    let q = queries_with(&[
        Book::new("One", "a", "g", 2001, 1.0, true),
        Book::new("Two", "b", "g", 1985, 1.0, true),
        Book::new("Three", "c", "g", 1992, 1.0, true),
    ]);
    let got = q.books_by_decade().unwrap();
    let labelled: Vec<(String, u64)> = got.iter().map(|d| (d.label(), d.total_books)).collect();
    assert_eq!(
        labelled,
        [("1980s".to_string(), 1), ("1990s".to_string(), 1), ("2000s".to_string(), 1)]
    );
}

#[test]
fn decades_sort_numerically() {
    let q = queries_with(&[
        Book::new("Future", "a", "g", 2105, 1.0, true),
        Book::new("Old", "b", "g", 995, 1.0, true),
        Book::new("Recent", "c", "g", 2010, 1.0, true),
        Book::new("Recent too", "d", "g", 2019, 1.0, true),
    ]);
    let got = q.books_by_decade().unwrap();
    assert_eq!(
        got,
        [
            DecadeCount { decade: 990, total_books: 1 },
            DecadeCount { decade: 2010, total_books: 2 },
            DecadeCount { decade: 2100, total_books: 1 },
        ]
    );
}

#[test]
fn decades_over_sample_collection() {
    let got = sample_queries().books_by_decade().unwrap();
    let total: u64 = got.iter().map(|d| d.total_books).sum();
    assert_eq!(total, 12);
    assert!(got.windows(2).all(|w| w[0].decade < w[1].decade));
    assert_eq!(got.first().unwrap().label(), "1810s");
}

#[test]
fn average_price_by_genre_rounds_and_sorts() {
    let got = sample_queries().average_price_by_genre().unwrap();
    let genres: Vec<&str> = got.iter().map(|g| g.genre.as_str()).collect();
    assert_eq!(genres, ["Classic", "Fantasy", "Fiction", "Historical Fiction"]);
    // (10.99 + 7.25) / 2 = 9.12
    assert_eq!(got[0], GenreAverage { genre: "Classic".into(), average_price: 9.12 });
    // (12.50 + 15.25 + 18.75 + 13.30 + 12.00) / 5 = 14.36
    assert_eq!(got[1].average_price, 14.36);
    // (11.00 + 9.99 + 10.00) / 3 = 10.33
    assert_eq!(got[2].average_price, 10.33);
    // (14.00 + 16.40) / 2 = 15.20
    assert_eq!(got[3].average_price, 15.2);
}

#[test]
fn average_price_rounds_half_to_even() {
    let q = queries_with(&[
        Book::new("a", "x", "Even", 2000, 1.0, true),
        Book::new("b", "x", "Even", 2000, 1.25, true),
    ]);
    // 1.125 sits exactly on the midpoint
    let got = q.average_price_by_genre().unwrap();
    assert_eq!(got[0].average_price, 1.12);
}

#[test]
fn reports_on_empty_collection() {
    let q = empty_queries();
    assert!(q.average_price_by_genre().unwrap().is_empty());
    assert!(q.author_with_most_books().unwrap().is_none());
    assert!(q.books_by_decade().unwrap().is_empty());
}

#[test]
fn top_author_counts_books() {
    let got = sample_queries().author_with_most_books().unwrap().unwrap();
    // J.R.R. Tolkien and Toni Morrison both have two; the smaller name wins
    assert_eq!(got, AuthorCount { author: "J.R.R. Tolkien".into(), total_books: 2 });
}

#[test]
fn top_author_tie_break_is_stable_under_insert_order() {
    let books = [
        Book::new("z1", "Zadie Smith", "g", 2000, 1.0, true),
        Book::new("z2", "Zadie Smith", "g", 2005, 1.0, true),
        Book::new("a1", "Anne Tyler", "g", 1982, 1.0, true),
        Book::new("a2", "Anne Tyler", "g", 1988, 1.0, true),
        Book::new("m1", "Mo Yan", "g", 1987, 1.0, true),
    ];
    let forward = queries_with(&books).author_with_most_books().unwrap().unwrap();
    let mut reversed = books.to_vec();
    reversed.reverse();
    let backward = queries_with(&reversed).author_with_most_books().unwrap().unwrap();
    assert_eq!(forward.author, "Anne Tyler");
    assert_eq!(forward, backward);
}

#[test]
fn clear_winner_beats_name_order() {
    let q = queries_with(&[
        Book::new("a", "Aaron", "g", 2000, 1.0, true),
        Book::new("b", "Zed", "g", 2000, 1.0, true),
        Book::new("c", "Zed", "g", 2001, 1.0, true),
    ]);
    assert_eq!(q.author_with_most_books().unwrap().unwrap().author, "Zed");
}

#[test]
fn null_and_non_numeric_years_are_left_out_of_decades() {
    use bson::doc;
    let store = bookshelf::MemoryStore::with_documents(
        "books",
        vec![
            doc! { "title": "a", "published_year": 1985 },
            doc! { "title": "b", "published_year": bson::Bson::Null },
            doc! { "title": "c", "published_year": "1992" },
            doc! { "title": "d" },
            doc! { "title": "e", "published_year": 1989.0 },
        ],
    );
    let q = bookshelf::BookQueries::new(std::sync::Arc::new(store));
    assert_eq!(q.books_by_decade().unwrap(), [DecadeCount { decade: 1980, total_books: 2 }]);
}
