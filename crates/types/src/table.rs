use crate::error::ValueError;
use crate::scalar::Scalar;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// An ordered result set: named columns and rows of cells.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TabularResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Scalar>>,
}

impl TabularResult {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TabularResult {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<Scalar>) -> Result<(), ValueError> {
        if row.len() != self.columns.len() {
            return Err(ValueError::RowWidth {
                row: self.rows.len(),
                expected: self.columns.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn with_row(mut self, row: Vec<Scalar>) -> Result<Self, ValueError> {
        self.push_row(row)?;
        Ok(self)
    }

    /// Builds a result set from JSON records. Columns are the union of record
    /// keys in first-seen order; a record missing a column gets a null cell.
    pub fn from_records(records: &[Value]) -> Result<Self, ValueError> {
        let mut columns: Vec<String> = Vec::new();
        for (i, record) in records.iter().enumerate() {
            let map = record.as_object().ok_or(ValueError::NotARecord(i))?;
            for key in map.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }

        let mut table = TabularResult::new(columns);
        for record in records {
            let row = table
                .columns
                .iter()
                .map(|column| match record.get(column) {
                    Some(cell) => Scalar::from_json(cell).unwrap_or_else(|| Scalar::Str(cell.to_string())),
                    None => Scalar::Null,
                })
                .collect();
            table.rows.push(row);
        }
        Ok(table)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&Scalar> {
        self.rows.get(row)?.get(column)
    }

    /// Header line followed by one line per row, without a trailing newline.
    pub fn to_csv(&self) -> Result<String, ValueError> {
        if self.columns.is_empty() && self.rows.is_empty() {
            return Ok(String::new());
        }
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row.iter().map(|cell| cell.to_string()))?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| ValueError::Csv(csv::Error::from(e.into_error())))?;
        let mut text = String::from_utf8_lossy(&bytes).into_owned();
        while text.ends_with('\n') || text.ends_with('\r') {
            text.pop();
        }
        Ok(text)
    }
}

impl fmt::Display for TabularResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.to_csv().map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}
