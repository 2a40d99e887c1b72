use std::io::Write;

use serde::Serialize;

use crate::book::{AuthorCount, Book, BookSummary, DecadeCount, GenreAverage};
use crate::errors::BookError;
use crate::facade::BookQueries;
use crate::import::ImportOptions;

use super::command::Command;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OutputMode {
    /// Report headings followed by one pretty JSON document per row.
    Human,
    /// One tab-separated line per row.
    Plain,
    /// A single JSON value per command.
    Json,
}

trait PlainRow {
    fn plain(&self) -> String;
}

impl PlainRow for Book {
    fn plain(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{:.2}\t{}",
            self.title, self.author, self.genre, self.published_year, self.price, self.in_stock
        )
    }
}

impl PlainRow for BookSummary {
    fn plain(&self) -> String {
        format!("{}\t{}\t{:.2}", self.title, self.author, self.price)
    }
}

impl PlainRow for GenreAverage {
    fn plain(&self) -> String {
        format!("{}\t{:.2}", self.genre, self.average_price)
    }
}

impl PlainRow for AuthorCount {
    fn plain(&self) -> String {
        format!("{}\t{}", self.author, self.total_books)
    }
}

/// Decade rows are shown with their label rather than the numeric key.
#[derive(Serialize)]
struct DecadeRow {
    decade: String,
    #[serde(rename = "totalBooks")]
    total_books: u64,
}

impl From<&DecadeCount> for DecadeRow {
    fn from(d: &DecadeCount) -> Self {
        Self { decade: d.label(), total_books: d.total_books }
    }
}

impl PlainRow for DecadeRow {
    fn plain(&self) -> String {
        format!("{}\t{}", self.decade, self.total_books)
    }
}

const AVERAGE_HEADING: &str = "Average Price of Books by Genre";
const TOP_AUTHOR_HEADING: &str = "Author with the Most Books";
const DECADE_HEADING: &str = "Number of Books by Publication Decade";

fn emit_rows<T: Serialize + PlainRow>(
    out: &mut dyn Write,
    mode: OutputMode,
    heading: &str,
    rows: &[T],
) -> Result<(), BookError> {
    match mode {
        OutputMode::Json => writeln!(out, "{}", serde_json::to_string(rows)?)?,
        OutputMode::Plain => {
            for r in rows {
                writeln!(out, "{}", r.plain())?;
            }
        }
        OutputMode::Human => {
            writeln!(out, "=== {heading} ===")?;
            if rows.is_empty() {
                writeln!(out, "(no results)")?;
            }
            for r in rows {
                writeln!(out, "{}", serde_json::to_string_pretty(r)?)?;
            }
        }
    }
    Ok(())
}

fn emit_value<T: Serialize>(
    out: &mut dyn Write,
    mode: OutputMode,
    plain: String,
    value: &T,
) -> Result<(), BookError> {
    match mode {
        OutputMode::Json => writeln!(out, "{}", serde_json::to_string(value)?)?,
        OutputMode::Plain | OutputMode::Human => writeln!(out, "{plain}")?,
    }
    Ok(())
}

/// Runs `cmd` against `queries`, printing human-readable output to stdout.
pub fn run(queries: &BookQueries, cmd: Command) -> Result<(), BookError> {
    let stdout = std::io::stdout();
    let mut lock = stdout.lock();
    run_with_format(queries, cmd, OutputMode::Human, &mut lock)
}

pub fn run_with_format(
    queries: &BookQueries,
    cmd: Command,
    mode: OutputMode,
    out: &mut dyn Write,
) -> Result<(), BookError> {
    match cmd {
        Command::FindByGenre { genre } => {
            let rows = queries.find_by_genre(&genre)?;
            emit_rows(out, mode, &format!("Books in genre {genre:?}"), &rows)
        }
        Command::PublishedAfter { year } => {
            let rows = queries.find_published_after(year)?;
            emit_rows(out, mode, &format!("Books published after {year}"), &rows)
        }
        Command::ByAuthor { author } => {
            let rows = queries.find_by_author(&author)?;
            emit_rows(out, mode, &format!("Books by {author}"), &rows)
        }
        Command::InStockAfter { year } => {
            let rows = queries.find_in_stock_after_year(year)?;
            emit_rows(out, mode, &format!("In-stock books published after {year}"), &rows)
        }
        Command::Projected { genre } => {
            let rows = queries.find_projected(&genre)?;
            emit_rows(out, mode, &format!("Title, author and price of {genre:?} books"), &rows)
        }
        Command::Sorted { order } => {
            let rows = queries.find_sorted(order)?;
            emit_rows(out, mode, &format!("Books by price ({order:?})"), &rows)
        }
        Command::Page { page, size, order_by } => {
            let rows = queries.find_page(page, size, order_by)?;
            emit_rows(out, mode, &format!("Page {page} ({size} per page)"), &rows)
        }
        Command::UpdatePrice { title, price } => {
            let r = queries.update_price(&title, price)?;
            emit_value(out, mode, format!("matched={} modified={}", r.matched, r.modified), &r)
        }
        Command::DeleteByTitle { title } => {
            let r = queries.delete_by_title(&title)?;
            emit_value(out, mode, format!("deleted={}", r.deleted), &r)
        }
        Command::AveragePriceByGenre => {
            let rows = queries.average_price_by_genre()?;
            emit_rows(out, mode, AVERAGE_HEADING, &rows)
        }
        Command::TopAuthor => {
            let rows: Vec<AuthorCount> = queries.author_with_most_books()?.into_iter().collect();
            emit_rows(out, mode, TOP_AUTHOR_HEADING, &rows)
        }
        Command::ByDecade => {
            let rows: Vec<DecadeRow> = queries.books_by_decade()?.iter().map(DecadeRow::from).collect();
            emit_rows(out, mode, DECADE_HEADING, &rows)
        }
        Command::Reports => {
            let averages = queries.average_price_by_genre()?;
            let top: Vec<AuthorCount> = queries.author_with_most_books()?.into_iter().collect();
            let decades: Vec<DecadeRow> =
                queries.books_by_decade()?.iter().map(DecadeRow::from).collect();
            if mode == OutputMode::Json {
                let json = serde_json::json!({
                    "averagePriceByGenre": averages,
                    "authorWithMostBooks": top.first(),
                    "booksByDecade": decades,
                });
                writeln!(out, "{json}")?;
                return Ok(());
            }
            emit_rows(out, mode, AVERAGE_HEADING, &averages)?;
            emit_rows(out, mode, TOP_AUTHOR_HEADING, &top)?;
            emit_rows(out, mode, DECADE_HEADING, &decades)
        }
        Command::CreateIndexes => {
            let names = queries.create_indexes()?;
            emit_value(out, mode, names.join("\n"), &names)
        }
        Command::Indexes => {
            let names = queries.indexes()?;
            emit_value(out, mode, names.join("\n"), &names)
        }
        Command::Seed { file, format, skip_errors } => {
            let opts = ImportOptions { format, skip_errors, ..Default::default() };
            let report = queries.seed(&file, &opts)?;
            let json = serde_json::json!({"inserted": report.inserted, "skipped": report.skipped});
            emit_value(
                out,
                mode,
                format!("inserted={} skipped={}", report.inserted, report.skipped),
                &json,
            )
        }
    }
}
