//! Consumers of the scraper's combined CSV export.

pub mod lexicon;
pub mod llm;

use crate::error::{Error, Result};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::fs;
use std::path::Path;

/// A CSV file held in memory, header first
#[derive(Debug, Clone, Default)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    /// Read a CSV file, tolerating a UTF-8 BOM and ragged rows
    pub fn read(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::parse(contents.strip_prefix('\u{feff}').unwrap_or(&contents))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .flexible(true)
            .from_reader(contents.as_bytes());

        let headers = rdr.headers()?.iter().map(str::to_string).collect::<Vec<_>>();
        let rows = rdr
            .records()
            .map(|record| record.map(|r| to_row(&r, headers.len())))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self { headers, rows })
    }

    /// Index of `column`, or an error listing what is available
    pub fn column_index(&self, column: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| Error::MissingColumn {
                column: column.to_string(),
                available: self.headers.join(", "),
            })
    }

    /// Values of one column, `None` for empty or whitespace-only cells
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = Option<&str>> {
        self.rows.iter().map(move |row| {
            row.get(index)
                .map(String::as_str)
                .filter(|value| !value.trim().is_empty())
        })
    }

    /// Append a column; `values` must have one entry per row
    pub fn push_column(&mut self, name: &str, values: Vec<String>) {
        debug_assert_eq!(values.len(), self.rows.len());
        self.headers.push(name.to_string());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
    }

    /// Write the table, creating parent directories as needed
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut wtr = WriterBuilder::new().from_path(path)?;
        wtr.write_record(&self.headers)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

fn to_row(record: &StringRecord, width: usize) -> Vec<String> {
    let mut row: Vec<String> = record.iter().map(str::to_string).collect();
    row.resize(width.max(row.len()), String::new());
    row
}
