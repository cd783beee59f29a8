use crate::error::Result;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// One sparse row: column name → value, insertion-ordered.
///
/// Rows are sparse because flattened card documents have per-row-variable
/// column sets (a card with three attacks has `attack_3_*` columns, a card
/// with none has no `attack_*` columns at all).
pub type Row = IndexMap<String, Value>;

/// An in-memory tabular batch with a column union over its rows.
///
/// Column order is first-seen order across rows, so the static source
/// table's iteration order carries through to the final artifact.
#[derive(Debug, Clone, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from sparse rows, computing the column union.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let mut table = Self::new();
        for row in rows {
            table.push_row(row);
        }
        table
    }

    /// Builds a table by serializing a slice of uniform records. Each
    /// record must serialize to a JSON object.
    pub fn from_records<T: Serialize>(records: &[T]) -> Result<Self> {
        let mut rows = Vec::with_capacity(records.len());
        for record in records {
            let value = serde_json::to_value(record)?;
            let mut row = Row::new();
            if let Value::Object(map) = value {
                for (key, val) in map {
                    row.insert(key, val);
                }
            }
            rows.push(row);
        }
        Ok(Self::from_rows(rows))
    }

    pub fn push_row(&mut self, row: Row) {
        for column in row.keys() {
            if !self.columns.iter().any(|c| c == column) {
                self.columns.push(column.clone());
            }
        }
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// A batch with zero rows or zero columns carries no usable data.
    pub fn is_structurally_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }

    /// Concatenates batches into one table: columns are the union across
    /// all batches (first-seen order), rows keep batch iteration order.
    pub fn concat(batches: Vec<Table>) -> Table {
        let mut combined = Table::new();
        for batch in batches {
            for column in &batch.columns {
                if !combined.columns.iter().any(|c| c == column) {
                    combined.columns.push(column.clone());
                }
            }
            combined.rows.extend(batch.rows);
        }
        combined
    }

    /// Materializes dense records over the full column set, filling cells
    /// absent from a sparse row with null. This is the shape handed to the
    /// load stage.
    pub fn to_dense_records(&self) -> Vec<IndexMap<String, Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .map(|column| {
                        let value = row.get(column).cloned().unwrap_or(Value::Null);
                        (column.clone(), value)
                    })
                    .collect()
            })
            .collect()
    }
}
