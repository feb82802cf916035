//! Delimited text (CSV and friends) decoding

use std::borrow::Cow;

use tracing::debug;

use super::error::{IngestError, IngestResult};
use super::frame::RawTable;

/// Delimiters tried when sniffing, in preference order
const CANDIDATE_DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];

/// Lines inspected when sniffing the delimiter
const SNIFF_LINES: usize = 10;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Decode file bytes as UTF-8, falling back to Windows-1252. A leading
/// byte-order mark is dropped.
pub fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => {
            debug!("Input is not valid UTF-8, decoding as Windows-1252");
            let (text, _) = encoding_rs::WINDOWS_1252.decode_without_bom_handling(bytes);
            text
        }
    }
}

/// Count `delimiter` occurrences outside double-quoted sections.
fn count_unquoted(line: &str, delimiter: u8) -> usize {
    let mut in_quotes = false;
    let mut count = 0;
    for byte in line.bytes() {
        if byte == b'"' {
            in_quotes = !in_quotes;
        } else if byte == delimiter && !in_quotes {
            count += 1;
        }
    }
    count
}

/// Pick the delimiter that appears a consistent, non-zero number of times
/// on the first lines; prefers more columns, then the earlier candidate.
/// Defaults to a comma.
pub fn sniff_delimiter(text: &str) -> u8 {
    let lines: Vec<&str> = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take(SNIFF_LINES)
        .collect();
    if lines.is_empty() {
        return b',';
    }

    let mut best: Option<(u8, usize)> = None;
    for delimiter in CANDIDATE_DELIMITERS {
        let counts: Vec<usize> = lines.iter().map(|l| count_unquoted(l, delimiter)).collect();
        let first = counts[0];
        if first == 0 || counts.iter().any(|&c| c != first) {
            continue;
        }
        if best.is_none_or(|(_, n)| first > n) {
            best = Some((delimiter, first));
        }
    }

    best.map(|(d, _)| d).unwrap_or(b',')
}

/// Parse delimited text into a raw table. Every record must have the same
/// width as the header row.
pub fn parse_delimited(bytes: &[u8], name: &str) -> IngestResult<RawTable> {
    let text = decode_text(bytes);
    if text.trim().is_empty() {
        return Err(IngestError::Empty);
    }
    let delimiter = sniff_delimiter(&text);
    debug!(table = %name, delimiter = %(delimiter as char).escape_default(), "Parsing delimited file");

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(false)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut records = Vec::new();
    for record in reader.records() {
        let record = record?;
        records.push(record.iter().map(|v| Some(v.to_string())).collect());
    }

    Ok(RawTable::from_rows(name, headers, records))
}
