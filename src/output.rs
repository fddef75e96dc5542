//! CSV serialization of the combined table

use crate::{
    table::{CombinedTable, Record},
    Result,
};
use anyhow::Context;
use csv_async::AsyncWriter;
use serde_json::Value;
use std::path::Path;
use tokio::fs;

/// Write the combined table to a CSV file, replacing any existing file, and
/// optionally one CSV file per ngram into a directory
///
/// Every file is rendered in memory before anything is written, so
/// serialization problems never leave a truncated file behind. Per-ngram
/// files are written first, so that the combined table is only replaced once
/// they have all been saved.
pub async fn write_tables(
    table: &CombinedTable,
    output: &Path,
    split_dir: Option<&Path>,
) -> Result<()> {
    // Render everything
    let combined = to_csv_bytes(table.columns(), table.rows()).await?;
    let mut split_files = Vec::new();
    if let Some(dir) = split_dir {
        for (ngram, rows) in table.ngram_rows() {
            let path = dir.join(format!("{}.csv", file_stem(ngram)));
            split_files.push((ngram, path, to_csv_bytes(table.columns(), rows).await?));
        }
    }

    // Write down the per-ngram files
    if let Some(dir) = split_dir {
        fs::create_dir_all(dir)
            .await
            .with_context(|| format!("creating per-ngram output directory {}", dir.display()))?;
    }
    for (ngram, path, csv) in split_files {
        fs::write(&path, &csv)
            .await
            .with_context(|| format!("writing time series of {ngram:?} to {}", path.display()))?;
        log::debug!("Wrote time series of ngram {ngram:?} to {}", path.display());
    }

    // Write down the combined table
    fs::write(output, &combined)
        .await
        .with_context(|| format!("writing combined table to {}", output.display()))
}

/// Render rows as CSV, with a header and no row index
pub async fn to_csv_bytes(columns: &[Box<str>], rows: &[Record]) -> Result<Vec<u8>> {
    let mut writer = AsyncWriter::from_writer(Vec::new());
    writer
        .write_record(columns.iter().map(|column| &**column))
        .await
        .context("writing CSV header")?;
    for row in rows {
        let cells = columns.iter().map(|column| cell(row.get(&**column)));
        writer.write_record(cells).await.context("writing CSV row")?;
    }
    writer.flush().await.context("flushing CSV output")?;
    writer
        .into_inner()
        .await
        .map_err(|_| anyhow::format_err!("failed to extract CSV output from its writer"))
}

/// Textual form of a table cell
///
/// Missing fields and nulls are left empty, strings are written without JSON
/// quotes, and everything else is written as JSON.
fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// File name for the data of an ngram
fn file_stem(ngram: &str) -> String {
    ngram.replace(['/', '\\'], "_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{progress::ProgressReport, table};
    use serde_json::json;

    fn combined(data: Value) -> CombinedTable {
        let Value::Object(data) = data else {
            panic!("test data should be an object");
        };
        table::reshape(data, &ProgressReport::new()).expect("test data should be valid")
    }

    async fn render(table: &CombinedTable) -> String {
        let bytes = to_csv_bytes(table.columns(), table.rows())
            .await
            .expect("rendering to memory should work");
        String::from_utf8(bytes).expect("CSV output should be UTF-8")
    }

    #[tokio::test]
    async fn covid_scenario() {
        let table = combined(json!({
            "covid": {
                "0": {"date": "2021-01-01", "rank": 5},
                "1": {"date": "2021-01-02", "rank": 3},
            }
        }));
        assert_eq!(
            render(&table).await,
            "date,rank,ngram\n2021-01-01,5,covid\n2021-01-02,3,covid\n"
        );
    }

    #[tokio::test]
    async fn cells_are_quoted_and_padded() {
        let table = combined(json!({
            "J&J": {"0": {"date": "2021-01-01", "note": "a, \"b\"", "ok": true}},
            "lockdown": {"0": {"date": "2021-01-03", "note": "line1\nline2"}},
            "masks": {"0": {"date": "2021-01-02", "extra": [1, 2], "note": null}},
        }));
        assert_eq!(
            render(&table).await,
            "date,note,ok,ngram,extra\n\
             2021-01-01,\"a, \"\"b\"\"\",true,J&J,\n\
             2021-01-03,\"line1\nline2\",,lockdown,\n\
             2021-01-02,,,masks,\"[1,2]\"\n"
        );
    }

    #[tokio::test]
    async fn empty_table_has_header_only() {
        let table = combined(json!({}));
        assert_eq!(render(&table).await, "ngram\n");
    }

    #[tokio::test]
    async fn write_replaces_existing_file() {
        let dir = tempfile::tempdir().expect("temporary directory");
        let path = dir.path().join("out.csv");
        std::fs::write(&path, "stale content that is longer than the new one\n").expect("seed file");
        let table = combined(json!({"a": {"0": {"rank": 1}}}));
        write_tables(&table, &path, None).await.expect("write should work");
        assert_eq!(std::fs::read_to_string(&path).expect("read back"), "rank,ngram\n1,a\n");
    }

    #[tokio::test]
    async fn split_writes_one_file_per_ngram() {
        let dir = tempfile::tempdir().expect("temporary directory");
        let output = dir.path().join("out.csv");
        let split_dir = dir.path().join("per-ngram");
        let table = combined(json!({
            "a": {"0": {"rank": 1}, "1": {"rank": 2}},
            "b/c": {"0": {"rank": 3}},
        }));
        write_tables(&table, &output, Some(split_dir.as_path()))
            .await
            .expect("write should work");
        assert_eq!(
            std::fs::read_to_string(&output).expect("read back"),
            "rank,ngram\n1,a\n2,a\n3,b/c\n"
        );
        assert_eq!(
            std::fs::read_to_string(split_dir.join("a.csv")).expect("read back"),
            "rank,ngram\n1,a\n2,a\n"
        );
        assert_eq!(
            std::fs::read_to_string(split_dir.join("b_c.csv")).expect("read back"),
            "rank,ngram\n3,b/c\n"
        );
    }

    #[tokio::test]
    async fn split_failure_keeps_combined_table_untouched() {
        let dir = tempfile::tempdir().expect("temporary directory");
        let output = dir.path().join("out.csv");
        std::fs::write(&output, "previous run\n").expect("seed file");
        let not_a_dir = dir.path().join("not-a-dir");
        std::fs::write(&not_a_dir, "").expect("seed file");
        let table = combined(json!({"a": {"0": {"rank": 1}}}));
        assert!(write_tables(&table, &output, Some(not_a_dir.as_path())).await.is_err());
        assert_eq!(
            std::fs::read_to_string(&output).expect("read back"),
            "previous run\n"
        );
    }

    #[test]
    fn cell_rendering() {
        assert_eq!(cell(None), "");
        assert_eq!(cell(Some(&Value::Null)), "");
        assert_eq!(cell(Some(&json!("text"))), "text");
        assert_eq!(cell(Some(&json!(5))), "5");
        assert_eq!(cell(Some(&json!(0.25))), "0.25");
        assert_eq!(cell(Some(&json!(false))), "false");
        assert_eq!(cell(Some(&json!({"k": 1}))), r#"{"k":1}"#);
    }
}
