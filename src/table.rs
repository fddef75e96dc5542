//! Flattening of per-ngram time series into a single table

use crate::{
    progress::{ProgressConfig, ProgressReport, Work},
    Ngram, Result,
};
use serde_json::{Map, Value};
use std::{collections::HashSet, ops::Range};

/// Name of the column that tells which ngram a row comes from
pub const NGRAM_COLUMN: &str = "ngram";

/// One time series record, e.g. `{"date": "2021-01-01", "rank": 5}`
///
/// The set of fields is whatever the service sent, we do not assume any.
pub type Record = Map<String, Value>;

/// Time series of all queried ngrams, flattened into one table
///
/// Rows are ordered by ngram, then in the order where the service listed
/// them. Every row carries an [`NGRAM_COLUMN`] field.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CombinedTable {
    /// Column names, in output order
    columns: Box<[Box<str>]>,

    /// Rows, missing fields are treated as empty
    rows: Box<[Record]>,

    /// Range of rows associated with each ngram
    ngram_rows: Box<[(Ngram, Range<usize>)]>,
}
//
impl CombinedTable {
    /// Column names, in output order
    pub fn columns(&self) -> &[Box<str>] {
        &self.columns
    }

    /// Table rows
    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    /// Rows associated with each ngram, in table order
    pub fn ngram_rows(&self) -> impl Iterator<Item = (&str, &[Record])> + '_ {
        (self.ngram_rows.iter()).map(|(ngram, range)| (&**ngram, &self.rows[range.clone()]))
    }

    /// Number of ngrams that went into this table
    pub fn num_ngrams(&self) -> usize {
        self.ngram_rows.len()
    }
}

/// Accumulator of ngram time series
///
/// Feed it with the time series of each ngram using
/// [`add_ngram()`](Self::add_ngram), then call [`finish()`](Self::finish).
#[derive(Debug, Default)]
pub struct TableBuilder {
    /// Columns seen so far, in order of first appearance
    columns: Vec<Box<str>>,

    /// Same as `columns`, for fast lookup
    known_columns: HashSet<Box<str>>,

    /// Rows accumulated so far
    rows: Vec<Record>,

    /// Range of rows associated with each ngram seen so far
    ngram_rows: Vec<(Ngram, Range<usize>)>,
}
//
impl TableBuilder {
    /// Set up the accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Integrate the time series of one ngram, return how many rows it had
    ///
    /// The columns of the first record ever seen come first in the final
    /// table, followed by the ngram column, then by any column that later
    /// records introduce.
    pub fn add_ngram(&mut self, ngram: &str, series: Value) -> Result<usize> {
        let records = records(ngram, series)?;
        if records.is_empty() {
            log::warn!("Service reported no data for ngram {ngram:?}");
        }
        let start = self.rows.len();
        for mut record in records {
            self.discover_columns(&record);
            log::trace!("Adding record {record:?} for ngram {ngram:?}");
            record.insert(NGRAM_COLUMN.into(), Value::String(ngram.into()));
            self.rows.push(record);
        }
        let range = start..self.rows.len();
        log::debug!("Collected {} rows for ngram {ngram:?}", range.len());
        self.ngram_rows.push((ngram.into(), range.clone()));
        Ok(range.len())
    }

    /// Export the final table
    pub fn finish(mut self) -> CombinedTable {
        if self.known_columns.is_empty() {
            self.columns.push(NGRAM_COLUMN.into());
        }
        CombinedTable {
            columns: self.columns.into(),
            rows: self.rows.into(),
            ngram_rows: self.ngram_rows.into(),
        }
    }

    /// Record the columns of a new record
    fn discover_columns(&mut self, record: &Record) {
        let first_record = self.known_columns.is_empty();
        let new_columns = record.keys().map(String::as_str);
        let new_columns = new_columns.chain(first_record.then_some(NGRAM_COLUMN));
        for column in new_columns {
            if self.known_columns.insert(column.into()) {
                if !first_record {
                    log::debug!("Found late column {column:?}, earlier rows will leave it empty");
                }
                self.columns.push(column.into());
            }
        }
    }
}

/// Flatten the ngram time series from an API response into one table
pub fn reshape(data: Map<String, Value>, report: &ProgressReport) -> Result<CombinedTable> {
    let ngrams = report.add(
        "Flattening ngram time series",
        ProgressConfig::new(Work::Steps(data.len())),
    );
    let mut table = TableBuilder::new();
    for (ngram, series) in data {
        table.add_ngram(&ngram, series)?;
        ngrams.make_progress(1);
    }
    Ok(table.finish())
}

/// Extract the records from the time series of an ngram
///
/// The service normally sends an object of records keyed by row identifier,
/// but arrays of records and objects of columns are accepted too.
fn records(ngram: &str, series: Value) -> Result<Vec<Record>> {
    match series {
        Value::Null => Ok(Vec::new()),
        Value::Array(entries) => (entries.into_iter().enumerate())
            .map(|(idx, entry)| into_record(ngram, &idx.to_string(), entry))
            .collect(),
        Value::Object(entries) if is_columnar(&entries) => Ok(transpose(entries)),
        Value::Object(entries) => (entries.into_iter())
            .map(|(key, entry)| into_record(ngram, &key, entry))
            .collect(),
        other => anyhow::bail!("time series of ngram {ngram:?} is not a collection of records: {other}"),
    }
}

/// Check that a time series entry is a record
fn into_record(ngram: &str, key: &str, entry: Value) -> Result<Record> {
    match entry {
        Value::Object(record) => Ok(record),
        other => anyhow::bail!("entry {key:?} of ngram {ngram:?} is not a record: {other}"),
    }
}

/// Truth that an object holds columns rather than records
///
/// At least one field must be an array, and no field may be a record.
fn is_columnar(entries: &Map<String, Value>) -> bool {
    entries.values().any(Value::is_array) && !entries.values().any(Value::is_object)
}

/// Turn an object of columns into records
///
/// Short columns are padded with nulls, and scalar fields are repeated on
/// every row.
fn transpose(columns: Map<String, Value>) -> Vec<Record> {
    let num_rows = (columns.values())
        .filter_map(Value::as_array)
        .map(Vec::len)
        .max()
        .unwrap_or(0);
    (0..num_rows)
        .map(|row| {
            (columns.iter())
                .map(|(name, column)| {
                    let value = match column {
                        Value::Array(values) => values.get(row).cloned().unwrap_or(Value::Null),
                        scalar => scalar.clone(),
                    };
                    (name.clone(), value)
                })
                .collect()
        })
        .collect()
}
