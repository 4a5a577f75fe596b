// crates/shelter-core/src/loader/mod.rs

//! # Dataset Loader
//!
//! Handles the Physical Layer (I/O, Decompression) and delegates to the
//! format parsers (CSV vs JSON records). The result is an immutable
//! [`Dataset`] holding only the columns its [`SchemaDescriptor`] declares.

use crate::error::{Result, ShelterError};
use crate::schema::{SchemaDescriptor, SourceSpec};
use crate::text::clean_header;
use crate::traits::TableSource;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

pub mod common_io;
mod csv;
mod json;

/// Header row plus rows of optional text cells, straight from a source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    /// Headers are trimmed (and stripped of a BOM); short rows are padded
    /// with absent cells, long rows truncated to the header width.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        let columns: Vec<String> = columns.iter().map(|c| clean_header(c)).collect();
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, None);
                row
            })
            .collect();
        Self { columns, rows }
    }

    /// Convenience for literals: `""` cells become absent.
    pub fn from_text(columns: &[&str], rows: &[&[&str]]) -> Self {
        Self::new(
            columns.iter().map(|c| c.to_string()).collect(),
            rows.iter()
                .map(|row| {
                    row.iter()
                        .map(|cell| (!cell.is_empty()).then(|| cell.to_string()))
                        .collect()
                })
                .collect(),
        )
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row)?.get(column)?.as_deref()
    }
}

/// Identity of one version of a source: id plus modification stamp.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetVersion {
    pub source: String,
    pub modified: Option<SystemTime>,
    pub len: u64,
}

/// An immutable, named, versioned table restricted to its declared columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    id: String,
    version: DatasetVersion,
    schema: SchemaDescriptor,
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl Dataset {
    /// Reads `source` and validates it against `spec.schema`.
    pub fn load(spec: &SourceSpec, source: &dyn TableSource) -> Result<Self> {
        let version = source.version()?;
        let table = source.read()?;
        Self::from_table(&spec.id, version, &spec.schema, table)
    }

    /// Fails with `Schema { missing }` when any required column (or the
    /// declared key column) is absent; drops every undeclared column.
    pub fn from_table(
        id: &str,
        version: DatasetVersion,
        schema: &SchemaDescriptor,
        table: RawTable,
    ) -> Result<Self> {
        let missing = schema.missing(&table.columns);
        if !missing.is_empty() {
            return Err(ShelterError::Schema {
                dataset: id.to_owned(),
                missing,
            });
        }

        let columns = schema.retained(&table.columns);
        let positions: Vec<usize> = columns
            .iter()
            .filter_map(|c| table.columns.iter().position(|t| t == c))
            .collect();

        let rows = table
            .rows
            .into_iter()
            .map(|mut row| positions.iter().map(|&p| row[p].take()).collect())
            .collect::<Vec<Vec<Option<String>>>>();

        debug!(
            dataset = id,
            rows = rows.len(),
            kept = columns.len(),
            dropped = table.columns.len() - columns.len(),
            "dataset loaded"
        );

        Ok(Self {
            id: id.to_owned(),
            version,
            schema: schema.clone(),
            columns,
            rows,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn version(&self) -> &DatasetVersion {
        &self.version
    }

    pub fn schema(&self) -> &SchemaDescriptor {
        &self.schema
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell text by column name; `None` when the column is absent or the cell empty.
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row)?.get(idx)?.as_deref()
    }
}

/// A table stored on disk: `.csv` or `.json`, optionally `.gz` compressed.
#[derive(Debug, Clone)]
pub struct FileSource {
    id: String,
    path: PathBuf,
}

impl FileSource {
    pub fn new(id: &str, path: impl Into<PathBuf>) -> Self {
        Self {
            id: id.to_owned(),
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TableSource for FileSource {
    fn version(&self) -> Result<DatasetVersion> {
        let meta = std::fs::metadata(&self.path).map_err(|e| {
            ShelterError::NotFound(format!("Dataset not found at {}: {}", self.path.display(), e))
        })?;
        Ok(DatasetVersion {
            source: self.id.clone(),
            modified: meta.modified().ok(),
            len: meta.len(),
        })
    }

    fn read(&self) -> Result<RawTable> {
        let bytes = common_io::read_all(&self.path)?;
        match common_io::payload_extension(&self.path).as_deref() {
            Some("json") => json::parse(&bytes),
            Some("csv") | Some("txt") | None => csv::parse(bytes),
            Some(other) => Err(ShelterError::Config(format!(
                "{}: unsupported table format `{other}` (expected csv or json)",
                self.path.display()
            ))),
        }
    }
}

/// A table held in memory. The revision number stands in for a
/// modification time; bump it to signal new contents.
#[derive(Debug, Clone)]
pub struct MemorySource {
    id: String,
    revision: u64,
    table: RawTable,
}

impl MemorySource {
    pub fn new(id: &str, table: RawTable) -> Self {
        Self {
            id: id.to_owned(),
            revision: 0,
            table,
        }
    }

    pub fn with_revision(mut self, revision: u64) -> Self {
        self.revision = revision;
        self
    }
}

impl TableSource for MemorySource {
    fn version(&self) -> Result<DatasetVersion> {
        Ok(DatasetVersion {
            source: self.id.clone(),
            modified: None,
            len: self.revision,
        })
    }

    fn read(&self) -> Result<RawTable> {
        Ok(self.table.clone())
    }
}
