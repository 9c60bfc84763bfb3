//! Decoding delimited result content into a `Table`.

use serde_json::Value;

use crate::error::Result;
use crate::table::{Column, Table};

impl Table {
    /// Decode CSV text into a table.
    ///
    /// The first row is the header and supplies the column names; every
    /// following row becomes one table row, in file order. Cells come out
    /// as strings (run `coerce_numeric` afterwards to tighten them).
    pub fn from_csv_str(data: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new().from_reader(data.as_bytes());

        let headers = reader.headers()?.clone();
        let mut columns: Vec<Column> = headers
            .iter()
            .map(|name| Column {
                name: name.to_string(),
                cells: Vec::new(),
            })
            .collect();

        let mut num_rows = 0;
        for record in reader.records() {
            let record = record?;
            for (index, column) in columns.iter_mut().enumerate() {
                let cell = record.get(index).unwrap_or("");
                column.cells.push(Value::String(cell.to_string()));
            }
            num_rows += 1;
        }

        Ok(Self { columns, num_rows })
    }
}
