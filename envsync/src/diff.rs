//! Difference detection over canonical schema maps.
//!
//! A column differs when the set of rendered signatures across all
//! environments holds more than one distinct value. Absence counts: a
//! column missing from an environment contributes the empty-string
//! signature, so "present here, absent there" is always a difference.

use std::collections::HashSet;

use serde::Serialize;

use crate::model::Environment;
use crate::signature::SchemaMap;

/// Ordered schema differences across a set of environments.
///
/// Tables are sorted lexicographically; within a table, columns keep their
/// canonical-map order. Tables without differing columns are omitted.
#[derive(Debug, Clone, Serialize)]
pub struct SchemaReport {
    /// Environment names, in comparison order (source first)
    pub environments: Vec<String>,
    pub tables: Vec<TableDiff>,
}

impl SchemaReport {
    pub fn has_differences(&self) -> bool {
        !self.tables.is_empty()
    }
}

/// All differing columns of one table.
#[derive(Debug, Clone, Serialize)]
pub struct TableDiff {
    pub table: String,
    pub columns: Vec<ColumnDiff>,
}

/// One differing column with its per-environment signatures, aligned with
/// the report's environment order. Absent columns render as `""`.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnDiff {
    pub column: String,
    pub signatures: Vec<String>,
}

/// Detect differences between environments over a prebuilt schema map.
pub fn detect(environments: &[Environment], map: &SchemaMap) -> SchemaReport {
    let names: Vec<String> = environments.iter().map(|env| env.name.clone()).collect();

    let mut table_names: Vec<&String> = map.keys().collect();
    table_names.sort();

    let mut tables = Vec::new();
    for table_name in table_names {
        let mut columns = Vec::new();

        for (column_name, by_environment) in &map[table_name.as_str()] {
            let signatures: Vec<String> = names
                .iter()
                .map(|name| {
                    by_environment
                        .get(name)
                        .map(|signature| signature.rendered.clone())
                        .unwrap_or_default()
                })
                .collect();

            let distinct: HashSet<&String> = signatures.iter().collect();
            if distinct.len() > 1 {
                columns.push(ColumnDiff {
                    column: column_name.clone(),
                    signatures,
                });
            }
        }

        if !columns.is_empty() {
            tables.push(TableDiff {
                table: table_name.clone(),
                columns,
            });
        }
    }

    SchemaReport {
        environments: names,
        tables,
    }
}
