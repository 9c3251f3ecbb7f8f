//! CSV parsing helpers shared by file and remote sources.

use crate::error::{ProcessingError, Result};
use polars::prelude::*;
use std::io::Cursor;
use tracing::debug;

/// Separators considered when sniffing a header line.
const CANDIDATE_SEPARATORS: [u8; 3] = [b';', b',', b'\t'];

/// Guess the field separator from the first non-empty line.
///
/// Picks the candidate that occurs most often outside quotes; ties and lines
/// without any candidate resolve to a comma.
pub fn sniff_separator(content: &str) -> u8 {
    let Some(header) = content.lines().find(|l| !l.trim().is_empty()) else {
        return b',';
    };

    let mut counts = [0usize; CANDIDATE_SEPARATORS.len()];
    let mut in_quotes = false;
    for byte in header.bytes() {
        if byte == b'"' {
            in_quotes = !in_quotes;
            continue;
        }
        if in_quotes {
            continue;
        }
        if let Some(i) = CANDIDATE_SEPARATORS.iter().position(|&s| s == byte) {
            counts[i] += 1;
        }
    }

    let comma_count = counts[1];
    CANDIDATE_SEPARATORS
        .iter()
        .zip(counts)
        .filter(|&(_, count)| count > comma_count)
        .max_by_key(|&(_, count)| count)
        .map(|(&sep, _)| sep)
        .unwrap_or(b',')
}

/// Parse CSV text into a DataFrame.
///
/// Tries standard quoted parsing first, then retries on cleaned content
/// (collapsed doubled quotes, blank lines removed) before giving up.
pub fn parse_csv_str(
    content: &str,
    separator: u8,
    infer_schema_length: usize,
    source: &str,
) -> Result<DataFrame> {
    let df = match read_with_options(content.to_string(), separator, infer_schema_length) {
        Ok(df) => df,
        Err(e) => {
            debug!("Standard parsing of '{}' failed: {}", source, e);
            let cleaned = clean_csv_content(content);
            read_with_options(cleaned, separator, infer_schema_length)?
        }
    };

    if df.height() == 0 {
        return Err(ProcessingError::EmptyDataset(source.to_string()));
    }
    Ok(df)
}

fn read_with_options(
    content: String,
    separator: u8,
    infer_schema_length: usize,
) -> PolarsResult<DataFrame> {
    CsvReadOptions::default()
        .with_infer_schema_length(Some(infer_schema_length))
        .with_has_header(true)
        .with_parse_options(
            CsvParseOptions::default()
                .with_separator(separator)
                .with_quote_char(Some(b'"')),
        )
        .into_reader_with_file_handle(Cursor::new(content))
        .finish()
}

/// Clean CSV content.
pub fn clean_csv_content(content: &str) -> String {
    content
        .replace("\"\"\"", "\"")
        .replace("\"\"", "\"")
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_semicolon() {
        let header = "\"fixed acidity\";\"volatile acidity\";\"quality\"\n7.4;0.7;5\n";
        assert_eq!(sniff_separator(header), b';');
    }

    #[test]
    fn test_sniff_comma_default() {
        assert_eq!(sniff_separator("a,b,c\n1,2,3"), b',');
        assert_eq!(sniff_separator("single\n1"), b',');
        assert_eq!(sniff_separator(""), b',');
    }

    #[test]
    fn test_sniff_ignores_quoted_separators() {
        assert_eq!(sniff_separator("\"a;b\",c,d\n"), b',');
    }

    #[test]
    fn test_sniff_tab() {
        assert_eq!(sniff_separator("a\tb\tc\n1\t2\t3"), b'\t');
    }

    #[test]
    fn test_parse_csv_str_semicolon() {
        let content = "alcohol;quality\n9.4;5\n9.8;5\n10.0;6\n";
        let df = parse_csv_str(content, b';', 100, "inline").unwrap();
        assert_eq!(df.shape(), (3, 2));
        assert_eq!(df.column("quality").unwrap().dtype(), &DataType::Int64);
    }

    #[test]
    fn test_parse_csv_str_header_only_is_empty() {
        let result = parse_csv_str("alcohol,quality\n", b',', 100, "inline");
        assert!(matches!(result, Err(ProcessingError::EmptyDataset(_))));
    }

    #[test]
    fn test_clean_csv_content() {
        let cleaned = clean_csv_content("a,b\n\n1,\"\"x\"\"\n   \n2,y\n");
        assert_eq!(cleaned, "a,b\n1,\"x\"\n2,y");
    }
}
