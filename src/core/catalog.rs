use std::collections::HashMap;

use crate::core::cell::CellValue;

/// An in-memory song catalog with an arbitrary, unknown-in-advance schema.
///
/// Rows are stored column-aligned: `rows[i][j]` is the value of `columns[j]`
/// in row `i`. Column names keep the case they were provided with.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

/// Borrowed view of one catalog row
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    catalog: &'a Catalog,
    index: usize,
}

impl Catalog {
    /// Create a catalog from header names and rows.
    ///
    /// Short rows are padded with missing cells and long rows truncated, so
    /// every row is aligned with the header. Duplicate header names are made
    /// unique by suffixing `.1`, `.2`, ... onto later occurrences.
    #[must_use]
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let columns = dedupe_columns(columns);
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, CellValue::Missing);
                row
            })
            .collect();
        Self { columns, rows }
    }

    /// Row-wise union of several catalogs, preserving part order.
    ///
    /// The result's columns are the union of all parts' columns in first-seen
    /// order; a part without a given column contributes missing cells.
    #[must_use]
    pub fn concat(parts: Vec<Catalog>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();
        for part in &parts {
            for col in &part.columns {
                if !positions.contains_key(col) {
                    positions.insert(col.clone(), columns.len());
                    columns.push(col.clone());
                }
            }
        }

        let mut rows = Vec::with_capacity(parts.iter().map(Catalog::len).sum());
        for part in parts {
            let mapping: Vec<usize> = part.columns.iter().map(|c| positions[c]).collect();
            for row in part.rows {
                let mut out = vec![CellValue::Missing; columns.len()];
                for (value, &target) in row.into_iter().zip(&mapping) {
                    out[target] = value;
                }
                rows.push(out);
            }
        }

        Self { columns, rows }
    }

    /// Column names in source order
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Check if a column with this exact (case-sensitive) name exists
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Get a row by position
    #[must_use]
    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        (index < self.rows.len()).then_some(Row {
            catalog: self,
            index,
        })
    }

    /// Iterate rows in catalog order
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        (0..self.rows.len()).map(move |index| Row {
            catalog: self,
            index,
        })
    }

    /// Append a column computed for every row.
    ///
    /// Values beyond the row count are ignored; rows without a value get a
    /// missing cell. An existing column of the same name is overwritten.
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<CellValue>) {
        let name = name.into();
        let mut values = values.into_iter();
        if let Some(idx) = self.column_index(&name) {
            for row in &mut self.rows {
                row[idx] = values.next().unwrap_or_default();
            }
        } else {
            self.columns.push(name);
            for row in &mut self.rows {
                row.push(values.next().unwrap_or_default());
            }
        }
    }

    /// Keep only the first `n` rows
    #[must_use]
    pub fn head(&self, n: usize) -> Self {
        Self {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    /// Number of rows
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if catalog has no rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<'a> Row<'a> {
    /// Position of this row in its catalog
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Value of the named column, `None` if the catalog has no such column
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&'a CellValue> {
        let idx = self.catalog.column_index(column)?;
        self.catalog.rows[self.index].get(idx)
    }

    /// All values in column order
    #[must_use]
    pub fn values(&self) -> &'a [CellValue] {
        &self.catalog.rows[self.index]
    }
}

fn dedupe_columns(columns: Vec<String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut out = Vec::with_capacity(columns.len());
    for col in columns {
        let mut name = col.clone();
        while seen.contains_key(&name) {
            let counter = seen.entry(col.clone()).or_insert(0);
            *counter += 1;
            name = format!("{col}.{counter}");
        }
        seen.insert(name.clone(), 0);
        out.push(name);
    }
    out
}
