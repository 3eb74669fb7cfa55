//! CSV input reading.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::StringRecord;
use log::{debug, info};

use crate::error::{ImportError, Result};
use crate::models::{SourceRecord, REQUIRED_HEADERS};

const UTF8_BOM: char = '\u{feff}';

/// Header names as matched against the record fields.
///
/// A leading BOM is dropped; names are otherwise compared exactly. When a
/// field name repeats, the last column wins and earlier copies are renamed so
/// deserialization skips them.
fn clean_headers(headers: &StringRecord) -> StringRecord {
    let names: Vec<&str> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| if i == 0 { h.trim_start_matches(UTF8_BOM) } else { h })
        .collect();

    names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let repeated_later = names[i + 1..].contains(name);
            if repeated_later && REQUIRED_HEADERS.contains(name) {
                format!("{}~{}", name, i)
            } else {
                name.to_string()
            }
        })
        .collect()
}

/// Required headers absent from `headers`, sorted.
pub fn missing_headers(headers: &StringRecord) -> Vec<String> {
    let mut missing: Vec<String> = REQUIRED_HEADERS
        .iter()
        .filter(|required| !headers.iter().any(|h| h == **required))
        .map(|s| s.to_string())
        .collect();
    missing.sort();
    missing
}

/// Read every record from a CSV stream with a header row.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<SourceRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = clean_headers(rdr.headers()?);
    let missing = missing_headers(&headers);
    if !missing.is_empty() {
        return Err(ImportError::Header(missing));
    }
    debug!("CSV headers: {:?}", headers);
    rdr.set_headers(headers);

    let mut records = Vec::new();
    for record in rdr.deserialize::<SourceRecord>() {
        records.push(record?);
    }
    Ok(records)
}

/// Read every record from the CSV file at `path`.
pub fn read_source_records(path: &Path) -> Result<Vec<SourceRecord>> {
    let file = File::open(path)?;
    let records = read_records(BufReader::new(file))?;
    info!("Read {} rows from {}", records.len(), path.display());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(input: &str) -> Result<Vec<SourceRecord>> {
        read_records(input.as_bytes())
    }

    #[test]
    fn test_reads_rows_and_ignores_extra_columns() {
        let csv = "book_title,book_author,trademe_categories,shopify_tags,extra\n\
                   Foo [1],Ann Author,Books > Fiction,\"[\"\"a\"\"]\",x\n";
        let records = read(csv).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].book_title.as_deref(), Some("Foo [1]"));
        assert_eq!(records[0].book_author.as_deref(), Some("Ann Author"));
        assert_eq!(records[0].trademe_categories.as_deref(), Some("Books > Fiction"));
        assert_eq!(records[0].shopify_tags.as_deref(), Some(r#"["a"]"#));
    }

    #[test]
    fn test_bom_is_tolerated() {
        let csv = "\u{feff}book_title,book_author,trademe_categories,shopify_tags\nT,A,C,tag\n";
        let records = read(csv).unwrap();
        assert_eq!(records[0].book_title.as_deref(), Some("T"));
    }

    #[test]
    fn test_column_order_does_not_matter() {
        let csv = "shopify_tags,trademe_categories,book_author,book_title\ntag,C,A,T\n";
        let records = read(csv).unwrap();
        assert_eq!(records[0].book_title.as_deref(), Some("T"));
        assert_eq!(records[0].shopify_tags.as_deref(), Some("tag"));
    }

    #[test]
    fn test_missing_headers_listed_sorted() {
        let err = read("book_title,book_author\nT,A\n").unwrap_err();
        match err {
            ImportError::Header(missing) => {
                assert_eq!(missing, vec!["shopify_tags", "trademe_categories"]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_short_rows_yield_missing_values() {
        let csv = "book_title,book_author,trademe_categories,shopify_tags\nOnly Title,Someone\n";
        let records = read(csv).unwrap();
        assert_eq!(records[0].book_title.as_deref(), Some("Only Title"));
        assert!(records[0].shopify_tags.is_none());
        assert!(records[0].trademe_categories.is_none());
    }

    #[test]
    fn test_repeated_header_last_column_wins() {
        let csv = "book_title,book_author,trademe_categories,shopify_tags,book_title\n\
                   T,A,C,tag,T2\n";
        let records = read(csv).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].book_title.as_deref(), Some("T2"));
        assert_eq!(records[0].book_author.as_deref(), Some("A"));
    }

    #[test]
    fn test_repeated_extra_header_is_ignored() {
        let csv = "notes,book_title,book_author,trademe_categories,shopify_tags,notes\n\
                   x,T,A,C,tag,y\n";
        let records = read(csv).unwrap();
        assert_eq!(records[0].shopify_tags.as_deref(), Some("tag"));
    }

    #[test]
    fn test_header_names_match_exactly() {
        let err = read(" book_title,book_author,trademe_categories,shopify_tags\nT,A,C,tag\n")
            .unwrap_err();
        match err {
            ImportError::Header(missing) => assert_eq!(missing, vec!["book_title"]),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_header_only_file() {
        let records = read("book_title,book_author,trademe_categories,shopify_tags\n").unwrap();
        assert!(records.is_empty());
    }
}
