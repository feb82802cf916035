//! Column-major in-memory table

use indexmap::IndexMap;

/// Raw cell data for one table, stored column by column. Absent cells are
/// `None`; every column has `row_count()` entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub name: String,
    columns: IndexMap<String, Vec<Option<String>>>,
    rows: usize,
}

impl RawTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: IndexMap::new(),
            rows: 0,
        }
    }

    /// Build from a header row and row-major records. Short records are
    /// padded with absent cells.
    pub fn from_rows(
        name: impl Into<String>,
        headers: Vec<String>,
        records: Vec<Vec<Option<String>>>,
    ) -> Self {
        let mut columns: Vec<Vec<Option<String>>> =
            vec![Vec::with_capacity(records.len()); headers.len()];
        for record in &records {
            for (idx, column) in columns.iter_mut().enumerate() {
                column.push(record.get(idx).cloned().flatten());
            }
        }

        let mut table = Self::new(name);
        table.rows = records.len();
        for (header, values) in headers.into_iter().zip(columns) {
            table.columns.insert(header, values);
        }
        table
    }

    /// Append a column, padding or truncating to the current row count.
    /// The first column pushed fixes the row count.
    pub fn push_column(&mut self, name: String, mut values: Vec<Option<String>>) {
        if self.columns.is_empty() {
            self.rows = values.len();
        }
        values.resize(self.rows, None);
        self.columns.insert(name, values);
    }

    pub fn column(&self, name: &str) -> Option<&[Option<String>]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &[Option<String>])> {
        self.columns
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.columns.is_empty()
    }

    /// Keep only rows for which `keep(row_index)` is true.
    pub fn retain_rows(&mut self, keep: impl Fn(usize) -> bool) {
        let kept: Vec<usize> = (0..self.rows).filter(|&r| keep(r)).collect();
        for values in self.columns.values_mut() {
            let taken: Vec<Option<String>> = kept.iter().map(|&r| values[r].take()).collect();
            *values = taken;
        }
        self.rows = kept.len();
    }

    pub fn retain_columns(&mut self, keep: impl Fn(&str, &[Option<String>]) -> bool) {
        self.columns.retain(|name, values| keep(name, values));
    }

    /// Copy of this table restricted to `names`, in the given order.
    pub fn select<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> RawTable {
        let mut table = RawTable::new(self.name.clone());
        table.rows = self.rows;
        for name in names {
            if let Some(values) = self.columns.get(name) {
                table.columns.insert(name.to_string(), values.clone());
            }
        }
        table
    }

    pub(crate) fn columns_mut(&mut self) -> impl Iterator<Item = &mut Vec<Option<String>>> {
        self.columns.values_mut()
    }

    pub(crate) fn take_columns(self) -> (String, IndexMap<String, Vec<Option<String>>>, usize) {
        (self.name, self.columns, self.rows)
    }

    pub(crate) fn from_parts(
        name: String,
        columns: IndexMap<String, Vec<Option<String>>>,
        rows: usize,
    ) -> Self {
        Self {
            name,
            columns,
            rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(v: &str) -> Option<String> {
        Some(v.to_string())
    }

    #[test]
    fn test_from_rows_pads_short_records() {
        let table = RawTable::from_rows(
            "t",
            vec!["a".into(), "b".into()],
            vec![vec![cell("1"), cell("x")], vec![cell("2")]],
        );
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column("b").unwrap(), &[cell("x"), None]);
    }

    #[test]
    fn test_retain_rows_and_select() {
        let mut table = RawTable::from_rows(
            "t",
            vec!["a".into(), "b".into()],
            vec![
                vec![cell("1"), cell("x")],
                vec![None, None],
                vec![cell("3"), cell("z")],
            ],
        );
        table.retain_rows(|r| r != 1);
        assert_eq!(table.row_count(), 2);
        let selected = table.select(["b"]);
        assert_eq!(selected.column_count(), 1);
        assert_eq!(selected.column("b").unwrap(), &[cell("x"), cell("z")]);
    }
}
