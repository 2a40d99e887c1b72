use crate::errors::BookError;
use crate::import::ImportFormat;
use crate::query::{Order, SortSpec};

pub fn parse_order(s: &str) -> Result<Order, BookError> {
    match s.to_ascii_lowercase().as_str() {
        "asc" | "ascending" | "1" => Ok(Order::Asc),
        "desc" | "descending" | "-1" => Ok(Order::Desc),
        other => Err(BookError::InvalidArgument(format!("unknown sort order `{other}`"))),
    }
}

/// `title`, `+title` ascending; `-price` descending.
pub fn parse_sort_spec(s: &str) -> Result<SortSpec, BookError> {
    let s = s.trim();
    let (field, order) = match s.strip_prefix('-') {
        Some(rest) => (rest, Order::Desc),
        None => (s.strip_prefix('+').unwrap_or(s), Order::Asc),
    };
    if field.is_empty() {
        return Err(BookError::InvalidArgument("sort field must not be empty".into()));
    }
    Ok(SortSpec { field: field.to_string(), order })
}

pub fn parse_import_format(s: Option<&str>) -> ImportFormat {
    match s.map(str::to_ascii_lowercase).as_deref() {
        Some("ndjson" | "jsonl") => ImportFormat::Ndjson,
        Some("json" | "array") => ImportFormat::JsonArray,
        _ => ImportFormat::Auto,
    }
}
