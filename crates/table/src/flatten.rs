//! Hierarchical query-result flattening.
//!
//! Salesforce query responses nest related records inside each row: a
//! parent lookup comes back as a mapping tagged with `attributes.type`, a
//! child sub-query as a `{totalSize, records: [...]}` result set. This
//! module unwinds those into flat `object.field` columns.
//!
//! Parent expansion can surface another parent mapping (a lookup on the
//! looked-up object), so the rewrite runs as a fixed-point iteration: each
//! pass classifies every column from its first non-null cell, expands what
//! it can, and runs again until a full pass rewrites nothing.

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Error, ErrorKind, Result};
use crate::table::Table;

/// Reserved column carrying each record's own object metadata.
const ATTRIBUTES_COLUMN: &str = "attributes";

/// Options for `normalize`.
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    /// Lowercase every column name before returning.
    pub lowercase_headers: bool,
    /// Expand relationship columns into flat `object.field` columns. When
    /// false, only the reserved attributes column is dropped.
    pub flatten_relationships: bool,
    /// Keep `attributes` mappings instead of dropping them.
    pub keep_attributes: bool,
    /// Fail when a column's non-null cells disagree about their
    /// relationship shape, instead of following the first sample.
    pub strict_shapes: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            lowercase_headers: false,
            flatten_relationships: true,
            keep_attributes: false,
            strict_shapes: false,
        }
    }
}

impl NormalizeOptions {
    /// Lowercase column names before returning.
    pub fn with_lowercase_headers(mut self, enabled: bool) -> Self {
        self.lowercase_headers = enabled;
        self
    }

    /// Enable or disable relationship expansion.
    pub fn with_flatten_relationships(mut self, enabled: bool) -> Self {
        self.flatten_relationships = enabled;
        self
    }

    /// Keep attributes mappings instead of dropping them.
    pub fn with_keep_attributes(mut self, enabled: bool) -> Self {
        self.keep_attributes = enabled;
        self
    }

    /// Error on mixed-shape columns instead of following the first sample.
    pub fn with_strict_shapes(mut self, enabled: bool) -> Self {
        self.strict_shapes = enabled;
        self
    }
}

/// Relationship shape of one cell, decided in a single classification step.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Shape {
    /// Scalar or otherwise unexpandable value.
    Leaf,
    /// Child result set: `{totalSize, records: [...]}`.
    ChildSet { object: String },
    /// Single related record: `{attributes: {type, ...}, ...fields}`.
    ParentRef { object: String },
}

/// Classify one cell value.
///
/// A value is a child set when it carries a non-null `totalSize` and names
/// a related object, a parent reference when it names one without
/// `totalSize`, and a leaf otherwise. Values that nest records but never
/// name an object type stay leaves.
fn classify(value: &Value) -> Shape {
    let Some(map) = value.as_object() else {
        return Shape::Leaf;
    };
    let Some(object) = related_object_name(map) else {
        return Shape::Leaf;
    };
    if map.get("totalSize").is_some_and(|v| !v.is_null()) {
        Shape::ChildSet { object }
    } else {
        Shape::ParentRef { object }
    }
}

/// Pull the related object's type name out of a nested mapping.
///
/// A child set names its object on the first sub-record
/// (`records[0].attributes.type`); a parent reference names it directly
/// (`attributes.type`). The sub-record path wins when both resolve.
fn related_object_name(map: &Map<String, Value>) -> Option<String> {
    let from_records = map
        .get("records")
        .and_then(|records| records.get(0))
        .and_then(|record| record.get("attributes"))
        .and_then(|attributes| attributes.get("type"))
        .and_then(Value::as_str);
    let from_attributes = map
        .get("attributes")
        .and_then(|attributes| attributes.get("type"))
        .and_then(Value::as_str);

    from_records.or(from_attributes).map(str::to_string)
}

/// Flatten raw query records into a table.
///
/// Materializes the records (one row per record, one column per distinct
/// top-level key), then rewrites relationship columns to a fixed point:
///
/// - child-set columns are rewritten in place, each cell becoming a list
///   of `"object.field"` mappings over the sub-records' leaf fields (null
///   cells stay null);
/// - parent-reference columns expand into one new `"object.field"` column
///   per field seen across the non-null cells, and the original column is
///   dropped. This is what forces another pass, since a parent's field
///   can itself hold a parent reference.
///
/// Columns whose cells are all null are left untouched. With
/// `flatten_relationships` disabled only the attributes column is dropped.
/// Lowercasing, when requested, is applied last.
pub fn normalize(records: Vec<Map<String, Value>>, options: &NormalizeOptions) -> Result<Table> {
    let mut table = Table::from_records(records);

    if options.flatten_relationships {
        flatten_to_fixed_point(&mut table, options)?;
    } else if !options.keep_attributes {
        table.drop_column(ATTRIBUTES_COLUMN);
    }

    if options.lowercase_headers {
        table.lowercase_column_names();
    }
    Ok(table)
}

fn flatten_to_fixed_point(table: &mut Table, options: &NormalizeOptions) -> Result<()> {
    let mut rewrote = true;
    while rewrote {
        rewrote = false;

        // Snapshot of this pass's columns: parent expansion appends new
        // columns mid-pass, and those belong to the next pass.
        let names: Vec<String> = table.column_names().map(str::to_string).collect();
        for name in names {
            let Some(column) = table.column(&name) else {
                // Dropped earlier in this pass.
                continue;
            };
            let Some(sample) = column.cells().iter().find(|cell| !cell.is_null()) else {
                // All-null column: no classification possible, leave it.
                continue;
            };

            if name == ATTRIBUTES_COLUMN && sample.get("type").is_some() {
                if !options.keep_attributes {
                    table.drop_column(&name);
                }
                continue;
            }

            let shape = classify(sample);
            if options.strict_shapes {
                check_uniform_shape(column.cells(), &shape, &name)?;
            }

            match shape {
                Shape::Leaf => {}
                Shape::ChildSet { object } => {
                    debug!(column = %name, object = %object, "rewriting child result sets");
                    let Some(column) = table.column(&name) else {
                        continue;
                    };
                    let cells: Vec<Value> = column
                        .cells()
                        .iter()
                        .map(|cell| child_sub_table(&object, cell))
                        .collect();
                    // In-place rewrite; child sets hold only leaves, so no
                    // further pass is needed for them.
                    table.set_column(name.as_str(), cells)?;
                }
                Shape::ParentRef { object } => {
                    debug!(column = %name, object = %object, "expanding parent reference");
                    expand_parent_column(table, &name, &object, options)?;
                    rewrote = true;
                }
            }
        }
    }
    Ok(())
}

fn check_uniform_shape(cells: &[Value], expected: &Shape, column: &str) -> Result<()> {
    for cell in cells.iter().filter(|cell| !cell.is_null()) {
        if &classify(cell) != expected {
            return Err(Error::new(ErrorKind::MixedShapes {
                column: column.to_string(),
            }));
        }
    }
    Ok(())
}

/// Rewrite one child-set cell into a list of flat sub-records.
///
/// Each sub-record becomes a `"object.field"` -> value mapping over its
/// leaf fields; nested mappings (the sub-record's own `attributes`, or
/// deeper relationships) are skipped rather than expanded. Null cells stay
/// null, as do cells with no usable record list.
fn child_sub_table(object: &str, cell: &Value) -> Value {
    if cell.is_null() {
        return Value::Null;
    }
    let Some(records) = cell.get("records").and_then(Value::as_array) else {
        return Value::Null;
    };

    let rows: Vec<Value> = records
        .iter()
        .filter_map(Value::as_object)
        .map(|record| {
            let mut flat = Map::new();
            for (field, value) in record {
                if value.is_object() {
                    continue;
                }
                flat.insert(format!("{object}.{field}"), value.clone());
            }
            Value::Object(flat)
        })
        .collect();
    Value::Array(rows)
}

/// Expand a parent-reference column into `"object.field"` columns and drop
/// the original.
fn expand_parent_column(
    table: &mut Table,
    name: &str,
    object: &str,
    options: &NormalizeOptions,
) -> Result<()> {
    let Some(column) = table.column(name) else {
        return Ok(());
    };
    let cells = column.cells().to_vec();

    // Union of field names across the non-null parent mappings.
    let mut fields: Vec<&str> = Vec::new();
    for cell in &cells {
        let Some(map) = cell.as_object() else { continue };
        for field in map.keys() {
            if field == ATTRIBUTES_COLUMN && !options.keep_attributes {
                continue;
            }
            if !fields.contains(&field.as_str()) {
                fields.push(field);
            }
        }
    }

    for field in fields {
        let new_cells: Vec<Value> = cells
            .iter()
            .map(|cell| cell.get(field).cloned().unwrap_or(Value::Null))
            .collect();
        table.set_column(format!("{object}.{field}"), new_cells)?;
    }
    table.drop_column(name);
    Ok(())
}
