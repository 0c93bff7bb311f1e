//! Tabular boundary — decodes uploaded CSV into rows of cells, cleans
//! spreadsheet export artifacts, and serializes result tables back to CSV.
//!
//! Convention: row 0 is ALWAYS a header row and is never treated as data.
//! Data access is positional — column 0 is the job title, column 1 the
//! detail (or catch copy, depending on the pipeline).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("input table needs at least 2 columns, found {found}")]
    TooFewColumns { found: usize },
}

/// One input row: a job title plus its description (or catch copy).
/// Immutable once read — pipelines build new output rows, never mutate these.
#[derive(Debug, Clone, PartialEq)]
pub struct JobRecord {
    pub title: String,
    pub detail: String,
}

/// An in-memory table: one header row plus data rows of equal arity.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        debug_assert_eq!(row.len(), self.headers.len());
        self.rows.push(row);
    }

    /// Decodes CSV bytes. Every cell (headers included) goes through
    /// [`clean_cell`] on the way in.
    pub fn from_csv(bytes: &[u8]) -> Result<Self, TableError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .has_headers(true)
            .from_reader(bytes);

        let headers = reader
            .headers()?
            .iter()
            .map(clean_cell)
            .collect::<Vec<String>>();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(clean_cell).collect());
        }

        Ok(Self { headers, rows })
    }

    /// Serializes the table to CSV bytes, header row first.
    pub fn to_csv(&self) -> Result<Vec<u8>, TableError> {
        let mut buf = Vec::new();
        {
            let mut writer = csv::Writer::from_writer(&mut buf);
            writer.write_record(&self.headers)?;
            for row in &self.rows {
                writer.write_record(row)?;
            }
            writer.flush().map_err(csv::Error::from)?;
        }
        Ok(buf)
    }

    /// Extracts the positional title/detail pairs from the data rows.
    /// Fails when the table carries fewer than two columns.
    pub fn job_records(&self) -> Result<Vec<JobRecord>, TableError> {
        if self.headers.len() < 2 {
            return Err(TableError::TooFewColumns {
                found: self.headers.len(),
            });
        }
        Ok(self
            .rows
            .iter()
            .map(|row| JobRecord {
                title: row.first().cloned().unwrap_or_default(),
                detail: row.get(1).cloned().unwrap_or_default(),
            })
            .collect())
    }
}

/// Strips Excel export artifacts from a cell: the `_x000D_` carriage-return
/// escape plus any embedded CR/LF characters.
pub fn clean_cell(raw: &str) -> String {
    raw.replace("_x000D_", "")
        .replace(['\r', '\n'], "")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_cell_strips_export_artifacts() {
        assert_eq!(clean_cell("組立_x000D_\r\n作業"), "組立作業");
        assert_eq!(clean_cell("  事務  "), "事務");
        assert_eq!(clean_cell("検査"), "検査");
    }

    #[test]
    fn test_from_csv_parses_headers_and_rows() {
        let csv = "職種名,仕事内容\n工場での組立 担当,部品を組み立てる仕事です\n事務,書類整理\n";
        let table = Table::from_csv(csv.as_bytes()).unwrap();
        assert_eq!(table.headers, vec!["職種名", "仕事内容"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][0], "工場での組立 担当");
    }

    #[test]
    fn test_from_csv_cleans_cells() {
        let csv = "title,detail\nライン作業_x000D_,検品と梱包\n";
        let table = Table::from_csv(csv.as_bytes()).unwrap();
        assert_eq!(table.rows[0][0], "ライン作業");
    }

    #[test]
    fn test_job_records_positional() {
        let csv = "職種名,仕事内容,備考\n組立,部品の組立,夜勤あり\n";
        let table = Table::from_csv(csv.as_bytes()).unwrap();
        let records = table.job_records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "組立");
        assert_eq!(records[0].detail, "部品の組立");
    }

    #[test]
    fn test_job_records_rejects_single_column() {
        let table = Table::from_csv("職種名\n事務\n".as_bytes()).unwrap();
        let err = table.job_records().unwrap_err();
        assert!(matches!(err, TableError::TooFewColumns { found: 1 }));
    }

    #[test]
    fn test_job_records_pads_short_rows() {
        let mut table = Table::new(vec!["a".into(), "b".into()]);
        table.rows.push(vec!["タイトルのみ".into()]);
        let records = table.job_records().unwrap();
        assert_eq!(records[0].detail, "");
    }

    #[test]
    fn test_to_csv_round_trips() {
        let mut table = Table::new(vec!["元の職種名".into(), "複製の職種名".into()]);
        table.push_row(vec!["組立".into(), "組立スタッフ".into()]);
        let bytes = table.to_csv().unwrap();
        let recovered = Table::from_csv(&bytes).unwrap();
        assert_eq!(recovered.headers, table.headers);
        assert_eq!(recovered.rows, table.rows);
    }
}
