//! The column-oriented result container.

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::error::{Error, ErrorKind, Result};

/// One named column of cells.
///
/// Invariant: a column inside a `Table` always has exactly `num_rows` cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub(crate) name: String,
    pub(crate) cells: Vec<Value>,
}

impl Column {
    /// The column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The cells, in row order.
    pub fn cells(&self) -> &[Value] {
        &self.cells
    }
}

/// Column-oriented table of `serde_json::Value` cells.
///
/// Rows keep insertion order; columns keep the order they were first seen
/// (source header order for CSV input). Missing values are `Value::Null`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub(crate) columns: Vec<Column>,
    pub(crate) num_rows: usize,
}

impl Table {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Materialize records into a table, one row per record and one column
    /// per distinct key. Keys absent from a record become null cells.
    pub fn from_records(records: Vec<Map<String, Value>>) -> Self {
        let mut names: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        for record in &records {
            for key in record.keys() {
                if seen.insert(key.clone()) {
                    names.push(key.clone());
                }
            }
        }

        let num_rows = records.len();
        let columns = names
            .into_iter()
            .map(|name| {
                let cells = records
                    .iter()
                    .map(|record| record.get(&name).cloned().unwrap_or(Value::Null))
                    .collect();
                Column { name, cells }
            })
            .collect();

        Self { columns, num_rows }
    }

    /// Number of rows.
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Number of columns.
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// True when the table holds no rows.
    pub fn is_empty(&self) -> bool {
        self.num_rows == 0
    }

    /// The columns, in order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column names, in order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Whether a column with this name exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Get one cell by row index and column name.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        self.column(column)?.cells.get(row)
    }

    /// Materialize one row as a name -> value mapping.
    pub fn row(&self, row: usize) -> Option<Map<String, Value>> {
        if row >= self.num_rows {
            return None;
        }
        let mut map = Map::new();
        for column in &self.columns {
            map.insert(column.name.clone(), column.cells[row].clone());
        }
        Some(map)
    }

    /// Insert a column, replacing any existing column with the same name.
    ///
    /// Fails unless the cell count matches the table's row count. On an
    /// empty table the first column establishes the row count.
    pub fn set_column(&mut self, name: impl Into<String>, cells: Vec<Value>) -> Result<()> {
        let name = name.into();
        if self.columns.is_empty() {
            self.num_rows = cells.len();
        } else if cells.len() != self.num_rows {
            return Err(Error::new(ErrorKind::ColumnLength {
                column: name,
                expected: self.num_rows,
                actual: cells.len(),
            }));
        }

        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(column) => column.cells = cells,
            None => self.columns.push(Column { name, cells }),
        }
        Ok(())
    }

    /// Remove a column by name and return it, if present.
    pub fn drop_column(&mut self, name: &str) -> Option<Column> {
        let index = self.columns.iter().position(|c| c.name == name)?;
        Some(self.columns.remove(index))
    }

    /// Lowercase every column name.
    pub fn lowercase_column_names(&mut self) {
        for column in &mut self.columns {
            column.name = column.name.to_lowercase();
        }
    }

    /// Append another table's rows below this one.
    ///
    /// The column set becomes the union of both tables; cells missing on
    /// either side are null-filled. Row order is self's rows, then other's.
    pub fn append(&mut self, other: Table) {
        let old_rows = self.num_rows;
        let new_rows = old_rows + other.num_rows;

        for column in other.columns {
            match self.columns.iter_mut().find(|c| c.name == column.name) {
                Some(existing) => existing.cells.extend(column.cells),
                None => {
                    let mut cells = vec![Value::Null; old_rows];
                    cells.extend(column.cells);
                    self.columns.push(Column {
                        name: column.name,
                        cells,
                    });
                }
            }
        }

        for column in &mut self.columns {
            column.cells.resize(new_rows, Value::Null);
        }
        self.num_rows = new_rows;
    }

    /// Tighten string columns to numbers where every non-null cell parses.
    ///
    /// Per column, all-or-nothing: integers if every cell parses as an
    /// integer, else floats if every cell parses as a float, else the
    /// column is left untouched. Columns holding booleans, arrays, or
    /// objects are never coerced.
    pub fn coerce_numeric(&mut self) {
        for column in &mut self.columns {
            if let Some(cells) = coerce_cells(&column.cells) {
                column.cells = cells;
            }
        }
    }

    /// Replace null cells with a string marker.
    ///
    /// The bulk upload API recognizes `#N/A` as an explicit null, which is
    /// the usual marker here.
    pub fn fill_nulls(&mut self, marker: &str) {
        for column in &mut self.columns {
            for cell in &mut column.cells {
                if cell.is_null() {
                    *cell = Value::String(marker.to_string());
                }
            }
        }
    }
}

fn coerce_cells(cells: &[Value]) -> Option<Vec<Value>> {
    if cells
        .iter()
        .any(|v| matches!(v, Value::Bool(_) | Value::Array(_) | Value::Object(_)))
    {
        return None;
    }
    if cells.iter().all(|v| v.is_null()) {
        return None;
    }

    let as_ints: Option<Vec<Value>> = cells.iter().map(int_cell).collect();
    if let Some(cells) = as_ints {
        return Some(cells);
    }
    cells.iter().map(float_cell).collect()
}

fn int_cell(cell: &Value) -> Option<Value> {
    match cell {
        Value::Null => Some(Value::Null),
        Value::Number(n) => (n.is_i64() || n.is_u64()).then(|| cell.clone()),
        Value::String(s) => s.trim().parse::<i64>().ok().map(Value::from),
        _ => None,
    }
}

fn float_cell(cell: &Value) -> Option<Value> {
    match cell {
        Value::Null => Some(Value::Null),
        Value::Number(_) => Some(cell.clone()),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rec(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_from_records_union_and_null_fill() {
        let table = Table::from_records(vec![
            rec(json!({"Id": "001", "Name": "Acme"})),
            rec(json!({"Id": "002", "Industry": "Tech"})),
        ]);

        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.num_columns(), 3);
        assert_eq!(table.get(0, "Name"), Some(&json!("Acme")));
        assert_eq!(table.get(1, "Name"), Some(&Value::Null));
        assert_eq!(table.get(0, "Industry"), Some(&Value::Null));
        assert_eq!(table.get(1, "Industry"), Some(&json!("Tech")));
    }

    #[test]
    fn test_from_records_empty() {
        let table = Table::from_records(vec![]);
        assert!(table.is_empty());
        assert_eq!(table.num_columns(), 0);
    }

    #[test]
    fn test_set_column_upserts() {
        let mut table = Table::from_records(vec![
            rec(json!({"Id": "001"})),
            rec(json!({"Id": "002"})),
        ]);

        table
            .set_column("Name", vec![json!("a"), json!("b")])
            .unwrap();
        assert_eq!(table.num_columns(), 2);

        // Overwrite in place, keeping position
        table
            .set_column("Id", vec![json!("x"), json!("y")])
            .unwrap();
        assert_eq!(table.num_columns(), 2);
        assert_eq!(table.column_names().next(), Some("Id"));
        assert_eq!(table.get(0, "Id"), Some(&json!("x")));
    }

    #[test]
    fn test_set_column_length_mismatch() {
        let mut table = Table::from_records(vec![rec(json!({"Id": "001"}))]);
        let err = table.set_column("Name", vec![]).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::ColumnLength { .. }));
    }

    #[test]
    fn test_drop_column() {
        let mut table = Table::from_records(vec![rec(json!({"Id": "001", "Name": "Acme"}))]);
        let dropped = table.drop_column("Name").unwrap();
        assert_eq!(dropped.name(), "Name");
        assert!(!table.has_column("Name"));
        assert!(table.drop_column("Name").is_none());
    }

    #[test]
    fn test_row_materialization() {
        let table = Table::from_records(vec![rec(json!({"Id": "001", "Name": "Acme"}))]);
        let row = table.row(0).unwrap();
        assert_eq!(row["Id"], json!("001"));
        assert_eq!(row["Name"], json!("Acme"));
        assert!(table.row(1).is_none());
    }

    #[test]
    fn test_append_same_schema_preserves_order() {
        let mut first = Table::from_records(vec![
            rec(json!({"Id": "001"})),
            rec(json!({"Id": "002"})),
        ]);
        let second = Table::from_records(vec![rec(json!({"Id": "003"}))]);

        first.append(second);
        assert_eq!(first.num_rows(), 3);
        let ids: Vec<&Value> = first.column("Id").unwrap().cells().iter().collect();
        assert_eq!(ids, vec![&json!("001"), &json!("002"), &json!("003")]);
    }

    #[test]
    fn test_append_mismatched_schema_null_fills() {
        let mut first = Table::from_records(vec![rec(json!({"Id": "001", "Name": "Acme"}))]);
        let second = Table::from_records(vec![rec(json!({"Id": "002", "Industry": "Tech"}))]);

        first.append(second);
        assert_eq!(first.num_rows(), 2);
        assert_eq!(first.num_columns(), 3);
        assert_eq!(first.get(1, "Name"), Some(&Value::Null));
        assert_eq!(first.get(0, "Industry"), Some(&Value::Null));
        assert_eq!(first.get(1, "Industry"), Some(&json!("Tech")));
    }

    #[test]
    fn test_append_to_empty() {
        let mut table = Table::new();
        table.append(Table::from_records(vec![rec(json!({"Id": "001"}))]));
        assert_eq!(table.num_rows(), 1);
        assert_eq!(table.get(0, "Id"), Some(&json!("001")));
    }

    #[test]
    fn test_lowercase_column_names() {
        let mut table = Table::from_records(vec![rec(json!({"Id": "001", "AccountName": "x"}))]);
        table.lowercase_column_names();
        let names: Vec<&str> = table.column_names().collect();
        assert_eq!(names, vec!["id", "accountname"]);
    }

    #[test]
    fn test_coerce_numeric_integers() {
        let mut table = Table::from_records(vec![
            rec(json!({"n": "42"})),
            rec(json!({"n": " 7 "})),
            rec(json!({"n": null})),
        ]);
        table.coerce_numeric();
        assert_eq!(table.get(0, "n"), Some(&json!(42)));
        assert_eq!(table.get(1, "n"), Some(&json!(7)));
        assert_eq!(table.get(2, "n"), Some(&Value::Null));
    }

    #[test]
    fn test_coerce_numeric_floats() {
        let mut table = Table::from_records(vec![
            rec(json!({"n": "1.5"})),
            rec(json!({"n": "2"})),
        ]);
        table.coerce_numeric();
        assert_eq!(table.get(0, "n"), Some(&json!(1.5)));
        assert_eq!(table.get(1, "n"), Some(&json!(2.0)));
    }

    #[test]
    fn test_coerce_numeric_leaves_mixed_untouched() {
        let mut table = Table::from_records(vec![
            rec(json!({"n": "42", "m": "42"})),
            rec(json!({"n": "acme", "m": ""})),
        ]);
        table.coerce_numeric();
        // Any unparsable cell leaves the whole column alone
        assert_eq!(table.get(0, "n"), Some(&json!("42")));
        assert_eq!(table.get(0, "m"), Some(&json!("42")));
        assert_eq!(table.get(1, "m"), Some(&json!("")));
    }

    #[test]
    fn test_coerce_numeric_skips_structured_cells() {
        let mut table = Table::from_records(vec![rec(json!({"n": [1, 2], "b": true}))]);
        table.coerce_numeric();
        assert_eq!(table.get(0, "n"), Some(&json!([1, 2])));
        assert_eq!(table.get(0, "b"), Some(&json!(true)));
    }

    #[test]
    fn test_fill_nulls() {
        let mut table = Table::from_records(vec![
            rec(json!({"Id": "001", "Name": null})),
            rec(json!({"Id": "002"})),
        ]);
        table.fill_nulls("#N/A");
        assert_eq!(table.get(0, "Name"), Some(&json!("#N/A")));
        assert_eq!(table.get(1, "Name"), Some(&json!("#N/A")));
        assert_eq!(table.get(0, "Id"), Some(&json!("001")));
    }
}
