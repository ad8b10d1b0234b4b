//! Post Parser: turns pasted free text into dated post records.
//!
//! One record per non-blank line. A line that opens with `YYYY-MM-DD:` keeps
//! that date; any other line is dated `unknown` and kept whole. Never fails.

use crate::models::portfolio::{DatedPost, UNKNOWN_DATE};

const DATE_LEN: usize = 10;

/// Parses raw multi-line text into dated posts, in input order.
pub fn parse_posts(raw_text: &str) -> Vec<DatedPost> {
    raw_text
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(parse_line)
        .filter(|post| !post.text.is_empty())
        .collect()
}

fn parse_line(line: &str) -> DatedPost {
    match split_date_prefix(line) {
        Some((date, text)) => DatedPost {
            date: date.to_string(),
            text: text.to_string(),
        },
        None => DatedPost {
            date: UNKNOWN_DATE.to_string(),
            text: line.to_string(),
        },
    }
}

/// Splits `YYYY-MM-DD:<ws>rest` into the date token and `rest`.
/// The token is matched by shape only; calendar validity is not checked.
fn split_date_prefix(line: &str) -> Option<(&str, &str)> {
    let date = line.get(..DATE_LEN)?;
    let rest = line[DATE_LEN..].strip_prefix(':')?;

    let shaped = date.bytes().enumerate().all(|(i, b)| match i {
        4 | 7 => b == b'-',
        _ => b.is_ascii_digit(),
    });

    shaped.then(|| (date, rest.trim_start()))
}
