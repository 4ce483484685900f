//! Rating records as read from a `userId,itemId,rating,timestamp` source.

use csv::{Reader, ReaderBuilder, StringRecord, Trim};
use serde::{Deserialize, Serialize};
use std::io::Read;
use thiserror::Error;

/// Records whose first field starts with this prefix are column headers.
pub const HEADER_PREFIX: &str = "userId";

const FIELD_COUNT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingRecord {
    pub user_id: u64,
    pub item_id: u64,
    pub rating: f64,
    pub timestamp: u64,
}

/// A record that could not be parsed. Rejected records are reported to the
/// caller, never skipped.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("line {line}: expected 4 fields, found {found}")]
    FieldCount { line: u64, found: usize },

    #[error("line {line}: invalid {field} '{value}'")]
    InvalidField {
        line: u64,
        field: &'static str,
        value: String,
    },

    #[error("malformed CSV: {0}")]
    Malformed(#[from] csv::Error),
}

/// A CSV reader over a ratings source. Headers are detected per record, field
/// counts are checked by [`RatingRecord::from_record`] and fields are trimmed.
pub fn rating_reader<R: Read>(input: R) -> Reader<R> {
    ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(input)
}

impl RatingRecord {
    pub fn from_record(record: &StringRecord) -> Result<Self, RecordError> {
        let line = record_line(record);
        if record.len() != FIELD_COUNT {
            return Err(RecordError::FieldCount {
                line,
                found: record.len(),
            });
        }

        let rating: f64 = parse_field(record, 2, "rating")?;
        if !rating.is_finite() {
            return Err(RecordError::InvalidField {
                line,
                field: "rating",
                value: record[2].to_string(),
            });
        }

        Ok(Self {
            user_id: parse_field(record, 0, "userId")?,
            item_id: parse_field(record, 1, "itemId")?,
            rating,
            timestamp: parse_field(record, 3, "timestamp")?,
        })
    }
}

/// 1-based line of the source the record starts on, 0 when unknown.
pub fn record_line(record: &StringRecord) -> u64 {
    record.position().map_or(0, |position| position.line())
}

pub fn is_header(record: &StringRecord) -> bool {
    record
        .get(0)
        .is_some_and(|first| first.starts_with(HEADER_PREFIX))
}

/// Header records and whitespace-only lines carry no rating.
pub fn is_data_record(record: &StringRecord) -> bool {
    !is_header(record) && record.iter().any(|field| !field.is_empty())
}

fn parse_field<T: std::str::FromStr>(
    record: &StringRecord,
    index: usize,
    field: &'static str,
) -> Result<T, RecordError> {
    let value = &record[index];
    value.parse().map_err(|_| RecordError::InvalidField {
        line: record_line(record),
        field,
        value: value.to_string(),
    })
}
