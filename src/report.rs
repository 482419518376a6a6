//! CSV report output
//!
//! The report writer opens its destination up front so an unwritable path fails
//! before any fetching, buffers rows in arrival order, and writes everything in
//! one go at the end of the run.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::fields::{Field, OutputRow};

/// Errors that can occur when writing the report
#[derive(Debug, Error)]
pub enum ReportError {
    /// The output file could not be created
    #[error("Cannot create report file {}: {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Writing rows to the output file failed
    #[error("Failed to write report file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Accumulates report rows and writes them as CSV
pub struct ReportWriter {
    path: PathBuf,
    fields: Vec<Field>,
    rows: Vec<OutputRow>,
    writer: csv::Writer<File>,
}

impl ReportWriter {
    /// Creates (or truncates) the output file for the given columns
    ///
    /// Missing parent directories are created.
    pub fn create(path: impl Into<PathBuf>, fields: &[Field]) -> Result<Self, ReportError> {
        let path = path.into();
        let create_err = |source| ReportError::Create {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(create_err)?;
        }
        let file = File::create(&path).map_err(create_err)?;

        Ok(Self {
            writer: csv::Writer::from_writer(file),
            path,
            fields: fields.to_vec(),
            rows: Vec::new(),
        })
    }

    /// Buffers a row
    pub fn push(&mut self, row: OutputRow) {
        self.rows.push(row);
    }

    /// Number of buffered rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True if no rows have been buffered
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Writes the header and every buffered row, returning the row count
    pub fn finish(mut self) -> Result<usize, ReportError> {
        let path = self.path.clone();
        let write_err = |source| ReportError::Write {
            path: path.clone(),
            source,
        };

        self.writer
            .write_record(self.fields.iter().map(Field::as_str))
            .map_err(write_err)?;

        for row in &self.rows {
            debug_assert!(row.fields().eq(self.fields.iter().copied()));
            self.writer.write_record(row.values()).map_err(write_err)?;
        }

        self.writer
            .flush()
            .map_err(|e| write_err(csv::Error::from(e)))?;

        Ok(self.rows.len())
    }
}

/// Reads back the first `lines` lines of a written report
pub fn preview(path: &Path, lines: usize) -> io::Result<Vec<String>> {
    let file = File::open(path)?;
    BufReader::new(file).lines().take(lines).collect()
}
