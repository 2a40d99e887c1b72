use proptest::prelude::*;

use bookshelf::Book;
use bookshelf::query::{Order, SortSpec};

use crate::support::queries_with;

const GENRES: [&str; 4] = ["Fantasy", "Fiction", "Historical Fiction", "fantasy"];
const AUTHORS: [&str; 3] = ["Ann", "Bo", "Cy"];

fn book_strategy() -> impl Strategy<Value = Book> {
    (
        "[a-z]{1,8}",
        0usize..AUTHORS.len(),
        0usize..GENRES.len(),
        1800i32..2030,
        0u32..10_000,
        any::<bool>(),
    )
        .prop_map(|(title, a, g, year, cents, in_stock)| {
            Book::new(title, AUTHORS[a], GENRES[g], year, f64::from(cents) / 100.0, in_stock)
        })
}

proptest! {
    #[test]
    fn prop_genre_filter_is_exact(books in proptest::collection::vec(book_strategy(), 0..40), g in 0usize..GENRES.len()) {
        let q = queries_with(&books);
        let genre = GENRES[g];
        let got = q.find_by_genre(genre).unwrap();
        prop_assert!(got.iter().all(|b| b.genre == genre));
        prop_assert_eq!(got.len(), books.iter().filter(|b| b.genre == genre).count());
    }

    #[test]
    fn prop_published_after_is_strict(books in proptest::collection::vec(book_strategy(), 0..40), year in 1790i32..2040) {
        let q = queries_with(&books);
        let got = q.find_published_after(year).unwrap();
        prop_assert!(got.iter().all(|b| b.published_year > year));
        prop_assert_eq!(got.len(), books.iter().filter(|b| b.published_year > year).count());
    }

    #[test]
    fn prop_pages_partition_the_collection(books in proptest::collection::vec(book_strategy(), 0..40), size in 1u64..7) {
        let q = queries_with(&books);
        let mut seen = Vec::new();
        let mut page = 0;
        loop {
            let rows = q.find_page(page, size, SortSpec::asc("title")).unwrap();
            prop_assert!(rows.len() as u64 <= size);
            if rows.is_empty() {
                break;
            }
            seen.extend(rows);
            page += 1;
        }
        prop_assert_eq!(seen.len(), books.len());
        prop_assert!(seen.windows(2).all(|w| w[0].title <= w[1].title));
        let mut ids: Vec<_> = seen.iter().filter_map(|b| b.id).collect();
        ids.sort();
        ids.dedup();
        prop_assert_eq!(ids.len(), books.len());
    }

    #[test]
    fn prop_sorted_price_is_monotonic(books in proptest::collection::vec(book_strategy(), 0..40)) {
        let q = queries_with(&books);
        let asc = q.find_sorted(Order::Asc).unwrap();
        prop_assert!(asc.windows(2).all(|w| w[0].price <= w[1].price));
    }

    #[test]
    fn prop_decade_counts_sum_to_total(books in proptest::collection::vec(book_strategy(), 0..40)) {
        let q = queries_with(&books);
        let decades = q.books_by_decade().unwrap();
        prop_assert_eq!(decades.iter().map(|d| d.total_books).sum::<u64>(), books.len() as u64);
        prop_assert!(decades.windows(2).all(|w| w[0].decade < w[1].decade));
        prop_assert!(decades.iter().all(|d| d.decade % 10 == 0));
    }
}
