use indexmap::IndexMap;

/// One source row keyed by normalized column name. An absent key means the
/// source file lacked the column or left the cell blank; downstream code
/// treats both the same way.
pub type Row = IndexMap<String, String>;

/// Column-union table of rows from one or more source files. Column order is
/// first-seen order across the concatenated inputs.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DataTable {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl DataTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|column| column == name)
    }

    pub fn push_row(&mut self, row: Row) {
        for column in row.keys() {
            if !self.has_column(column) {
                self.columns.push(column.clone());
            }
        }
        self.rows.push(row);
    }

    /// Appends another table's rows, widening the column union. This is a
    /// concatenation, not a join: rows keep only the cells they came with.
    pub fn absorb(&mut self, other: DataTable) {
        for column in other.columns {
            if !self.has_column(&column) {
                self.columns.push(column);
            }
        }
        self.rows.extend(other.rows);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[(&str, &str)]) -> Row {
        cells
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn push_row_extends_column_union_in_first_seen_order() {
        let mut table = DataTable::new();
        table.push_row(row(&[("a", "1"), ("b", "2")]));
        table.push_row(row(&[("c", "3"), ("a", "4")]));

        assert_eq!(table.columns(), &["a", "b", "c"]);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn absorb_concatenates_without_filling_missing_cells() {
        let mut left = DataTable::new();
        left.push_row(row(&[("a", "1")]));
        let mut right = DataTable::new();
        right.push_row(row(&[("b", "2")]));

        left.absorb(right);

        assert_eq!(left.columns(), &["a", "b"]);
        assert_eq!(left.rows()[1].get("a"), None);
        assert_eq!(left.rows()[1].get("b").map(String::as_str), Some("2"));
    }
}
