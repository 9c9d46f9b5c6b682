//! Canonical schema builder.
//!
//! Renders every column and relation of a table into a deterministic
//! "options signature": an ordered list of option strings plus their
//! `", "`-joined form. Two columns are considered equal across
//! environments iff their rendered signatures are byte-equal; raw
//! structural equality is never used.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde_json::Value;

use crate::model::{Column, ColumnDefinition, Environment, Relation, Table};

/// Columns managed by the backend itself. Never compared, never synced.
pub const SYSTEM_COLUMNS: &[&str] = &["objectId", "created", "updated", "ownerId", "blUserLocale"];

/// Signature map of one table: column name → signature, in canonical order
/// (own columns first, then relations, then geo-relations).
pub type ColumnSignatureMap = IndexMap<String, ColumnSignature>;

/// Aggregated view over all environments:
/// table name → column name → environment name → signature.
pub type SchemaMap = IndexMap<String, IndexMap<String, HashMap<String, ColumnSignature>>>;

/// Canonical form of one column or relation.
#[derive(Debug, Clone)]
pub struct ColumnSignature {
    /// Ordered option strings, starting with the type or relation shape
    pub options: Vec<String>,

    /// The `", "`-joined rendering; the sole basis for equality
    pub rendered: String,

    /// The definition behind this signature, kept for mutation payloads
    pub definition: ColumnDefinition,
}

impl ColumnSignature {
    fn new(options: Vec<String>, definition: ColumnDefinition) -> Self {
        let rendered = options.join(", ");
        Self {
            options,
            rendered,
            definition,
        }
    }
}

/// Build the canonical signature map for one table.
///
/// System columns and any name in `columns_to_ignore` are skipped, for
/// relations as well as own columns. Missing optional fields are simply
/// left out of the signature.
pub fn build_table_signatures(table: &Table, columns_to_ignore: &[String]) -> ColumnSignatureMap {
    let ignored = |name: &str| {
        SYSTEM_COLUMNS.contains(&name) || columns_to_ignore.iter().any(|column| column == name)
    };

    let mut map = ColumnSignatureMap::new();

    for column in &table.columns {
        if ignored(&column.name) {
            continue;
        }
        map.insert(
            column.name.clone(),
            ColumnSignature::new(column_options(column), ColumnDefinition::Column(column.clone())),
        );
    }

    for relation in table.relations.iter().chain(&table.geo_relations) {
        if ignored(&relation.name) {
            continue;
        }
        map.insert(
            relation.name.clone(),
            ColumnSignature::new(
                relation_options(relation),
                ColumnDefinition::Relation(relation.clone()),
            ),
        );
    }

    map
}

/// Fold every environment's per-table signature maps into one structure,
/// keyed by table, then column, then environment name. Column order within
/// a table is the canonical order of the first environment that defines it.
pub fn build_schema_map(environments: &[Environment], columns_to_ignore: &[String]) -> SchemaMap {
    let mut map = SchemaMap::new();

    for environment in environments {
        for table in &environment.tables {
            let columns = build_table_signatures(table, columns_to_ignore);
            let by_column = map.entry(table.name.clone()).or_default();

            for (column_name, signature) in columns {
                by_column
                    .entry(column_name)
                    .or_default()
                    .insert(environment.name.clone(), signature);
            }
        }
    }

    map
}

/// Option order is fixed: type, UQ, NN, IDX, REGEXP, DEFAULT, SIZE.
fn column_options(column: &Column) -> Vec<String> {
    let mut options = vec![column.data_type.clone()];

    if column.unique {
        options.push("UQ".to_string());
    }
    if column.required {
        options.push("NN".to_string());
    }
    if column.indexed {
        options.push("IDX".to_string());
    }
    if let Some(pattern) = &column.custom_regex {
        options.push(format!("REGEXP:{pattern}"));
    }
    if let Some(value) = &column.default_value {
        options.push(format!("DEFAULT:{}", render_default(value)));
    }
    if let Some(size) = column.size
        && is_string_type(&column.data_type)
    {
        options.push(format!("SIZE:{size}"));
    }

    options
}

/// Relation shape is `toTable(cardinality)`, then UQ, NN, and finally the
/// identification column's name when the resolver supplied one. A reference
/// still in ID form never reaches a signature.
fn relation_options(relation: &Relation) -> Vec<String> {
    let mut options = vec![format!(
        "{}({})",
        relation.to_table_name,
        relation.relationship_type.alias()
    )];

    if relation.unique {
        options.push("UQ".to_string());
    }
    if relation.required {
        options.push("NN".to_string());
    }
    if let Some(reference) = &relation.identification
        && let Some(name) = reference.as_name()
    {
        options.push(name.to_string());
    }

    options
}

/// Render a default value the way it reads in the console UI: bare strings,
/// JSON rendering for everything else.
fn render_default(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn is_string_type(data_type: &str) -> bool {
    matches!(data_type, "STRING" | "STRING_ID")
}
