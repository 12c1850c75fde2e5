//! Tabular projection of parsed records: one row per record, one column per
//! distinct tag path.
//!
//! This is the shape a grid view or spreadsheet exporter consumes; writing
//! any particular file format is left to the caller.

use std::collections::HashMap;

use serde::Serialize;

use crate::grammar::record::Record;

/// Header of the first column, holding each record's id.
pub const ID_COLUMN: &str = "ID";

/// Records flattened into rows and columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    /// [`ID_COLUMN`] followed by every tag path, in first-seen order across
    /// all records.
    pub columns: Vec<String>,
    /// One row per record, aligned with `columns`. `None` marks a path the
    /// record does not have (as opposed to an empty value).
    pub rows: Vec<Vec<Option<String>>>,
}

impl Table {
    /// Index of the column for `path` (the id column is never matched).
    pub fn column_index(&self, path: &str) -> Option<usize> {
        self.columns
            .iter()
            .skip(1)
            .position(|c| c == path)
            .map(|i| i + 1)
    }

    /// Cell at `row` for tag path `path`.
    pub fn cell(&self, row: usize, path: &str) -> Option<&str> {
        let col = self.column_index(path)?;
        self.rows.get(row)?.get(col)?.as_deref()
    }
}

/// Flatten records into a [`Table`].
pub fn to_table(records: &[Record]) -> Table {
    let mut columns = vec![ID_COLUMN.to_string()];
    let mut index: HashMap<&str, usize> = HashMap::new();
    for record in records {
        for path in record.fields.keys() {
            if !index.contains_key(path) {
                index.insert(path, columns.len());
                columns.push(path.to_string());
            }
        }
    }

    let rows = records
        .iter()
        .map(|record| {
            let mut row = vec![None; columns.len()];
            row[0] = Some(record.id.clone());
            for (path, value) in record.fields.iter() {
                row[index[path]] = Some(value.to_string());
            }
            row
        })
        .collect();

    Table { columns, rows }
}
