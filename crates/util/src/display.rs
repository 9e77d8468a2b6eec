//! # Display helpers
//!
//! Small formatting primitives shared by the report renderers: byte sizes,
//! unix-millisecond timestamps, hard wrapping and plain column tables.

use chrono::{DateTime, Local, SecondsFormat, Utc};
use humansize::{BINARY, format_size};
use prettytable::{Cell, Row, Table, format};

const BYTES_PER_MEGABYTE: u64 = 1024 * 1024;

/// Humanise a byte count using binary units, e.g. `512 MiB`.
pub fn format_bytes(bytes: u64) -> String {
    format_size(bytes, BINARY)
}

/// Humanise a size given in megabytes.
pub fn format_megabytes(megabytes: u64) -> String {
    format_bytes(megabytes.saturating_mul(BYTES_PER_MEGABYTE))
}

/// Render unix milliseconds as an RFC-3339 UTC timestamp.
///
/// # Example
/// ```rust
/// use scs_util::display::format_millis_rfc3339;
///
/// assert_eq!(format_millis_rfc3339(0), "1970-01-01T00:00:00Z");
/// ```
pub fn format_millis_rfc3339(millis: i64) -> String {
    match DateTime::<Utc>::from_timestamp_millis(millis) {
        Some(timestamp) => timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
        None => millis.to_string(),
    }
}

/// Render unix milliseconds in the local timezone, for human reading only.
pub fn format_millis_local(millis: i64) -> String {
    match DateTime::<Utc>::from_timestamp_millis(millis) {
        Some(timestamp) => timestamp.with_timezone(&Local).format("%a %d %b %H:%M:%S %Z %Y").to_string(),
        None => millis.to_string(),
    }
}

/// Hard-wrap `text` so that no line exceeds `width` columns once the first
/// line is printed after an `indent`-wide label. Lines break every
/// `width - indent` characters regardless of spaces, and continuation lines
/// carry the indent themselves.
///
/// # Example
/// ```rust
/// use scs_util::display::wrap_with_hanging_indent;
///
/// assert_eq!(wrap_with_hanging_indent("abcdef", 5, 2), "abc\n  def");
/// ```
pub fn wrap_with_hanging_indent(text: &str, width: usize, indent: usize) -> String {
    let line_width = width.saturating_sub(indent).max(1);
    let chars: Vec<char> = text.chars().collect();
    let separator = format!("\n{}", " ".repeat(indent));
    chars
        .chunks(line_width)
        .map(|chunk| chunk.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(&separator)
}

/// Render rows under `headers` as whitespace-aligned columns without borders.
pub fn render_table<S: AsRef<str>>(headers: &[&str], rows: &[Vec<S>]) -> String {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_CLEAN);
    table.set_titles(Row::new(headers.iter().map(|header| Cell::new(header)).collect()));
    for row in rows {
        table.add_row(Row::new(row.iter().map(|value| Cell::new(value.as_ref())).collect()));
    }
    table.to_string()
}
