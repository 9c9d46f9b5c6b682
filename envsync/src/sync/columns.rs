//! Column pass of the reconciliation engine.
//!
//! Comparison always runs over name-normalized copies of the environments,
//! while mutation payloads are resolved against each raw target, whose
//! column index carries the numeric ids that target assigned.

use std::collections::HashMap;

use indexmap::IndexMap;
use log::{error, info};
use serde_json::{Map, Value};

use crate::api::{ConfirmPrompt, ConsoleApi};
use crate::errors::ApiResult;
use crate::model::{ColumnDefinition, ColumnRef, Environment};
use crate::resolve::{ColumnIndex, identification_id_for, normalize_all};
use crate::signature::{ColumnSignature, build_schema_map};

use super::{SyncOptions, SyncStats, is_system_table};

/// What a single column reconciliation step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnAction {
    Added,
    Updated,
    Removed,
    Skipped,
    Unchanged,
}

/// Align every target's columns with the source, table by table. Tables
/// are visited in lexicographic order; within a table, columns follow
/// [`ordered_column_names`]. Per-column failures are logged as
/// `<table>.<column>` and never abort the batch.
pub async fn sync_columns(
    api: &dyn ConsoleApi,
    environments: &[Environment],
    options: &SyncOptions,
    prompt: &mut dyn ConfirmPrompt,
    stats: &mut SyncStats,
) {
    let Some((source, targets)) = environments.split_first() else {
        return;
    };

    let normalized = normalize_all(environments);
    let schema = build_schema_map(&normalized, &options.columns_to_ignore);
    let indexes: Vec<ColumnIndex<'_>> = targets.iter().map(ColumnIndex::new).collect();

    let mut table_names: Vec<&String> = schema
        .keys()
        .filter(|name| !is_system_table(name))
        .collect();
    table_names.sort();

    let mut pass = ColumnPass {
        api,
        options,
        prompt,
    };

    for table_name in table_names {
        let columns = &schema[table_name.as_str()];

        for column_name in ordered_column_names(table_name, columns, &source.name) {
            let signatures = &columns[column_name.as_str()];

            for (target, index) in targets.iter().zip(&indexes) {
                let outcome = pass
                    .sync_one(
                        target,
                        index,
                        table_name,
                        &column_name,
                        signatures.get(&source.name),
                        signatures.get(&target.name),
                    )
                    .await;

                match outcome {
                    Ok(ColumnAction::Added) => stats.columns_added += 1,
                    Ok(ColumnAction::Updated) => stats.columns_updated += 1,
                    Ok(ColumnAction::Removed) => stats.columns_removed += 1,
                    Ok(ColumnAction::Skipped) => stats.skipped += 1,
                    Ok(ColumnAction::Unchanged) => {}
                    Err(err) => {
                        error!("{table_name}.{column_name}: {err}");
                        stats.failures += 1;
                    }
                }
            }
        }
    }
}

struct ColumnPass<'a> {
    api: &'a dyn ConsoleApi,
    options: &'a SyncOptions,
    prompt: &'a mut dyn ConfirmPrompt,
}

impl ColumnPass<'_> {
    /// Reconcile one column of one table against one target. `wanted` is
    /// the source's signature, `current` the target's; either may be
    /// absent.
    async fn sync_one(
        &mut self,
        target: &Environment,
        index: &ColumnIndex<'_>,
        table: &str,
        column: &str,
        wanted: Option<&ColumnSignature>,
        current: Option<&ColumnSignature>,
    ) -> ApiResult<ColumnAction> {
        match (wanted, current) {
            (Some(wanted), None) => {
                let payload = add_payload(wanted, index);
                self.api.add_column(&target.id, table, &payload).await?;
                info!("added column {}.{table}.{column}", target.name);
                Ok(ColumnAction::Added)
            }
            (None, Some(_)) => {
                let message = format!(
                    "Are you sure you want to delete the column {}.{table}.{column}?",
                    target.name
                );
                if !self.options.silent && !self.prompt.confirm(&message) {
                    return Ok(ColumnAction::Skipped);
                }
                self.api.remove_column(&target.id, table, column).await?;
                info!("removed column {}.{table}.{column}", target.name);
                Ok(ColumnAction::Removed)
            }
            (Some(wanted), Some(current)) if wanted.rendered != current.rendered => {
                let message = format!(
                    "Are you sure you want to update the column {}.{table}.{column}: \"{}\" => \"{}\"?",
                    target.name, current.rendered, wanted.rendered
                );
                if !self.options.silent && !self.prompt.confirm(&message) {
                    return Ok(ColumnAction::Skipped);
                }
                if let Some(values) = backfill_values(wanted) {
                    // Existing null rows would reject a required-column
                    // update, so data is backfilled first.
                    let clause = format!("{column} is null");
                    let rows = self.api.bulk_update(&target.id, table, &clause, &values).await?;
                    info!("backfilled {rows} rows of {}.{table}.{column}", target.name);
                }
                let payload = update_payload(wanted, current, index);
                self.api.update_column(&target.id, table, &payload).await?;
                info!("updated column {}.{table}.{column}", target.name);
                Ok(ColumnAction::Updated)
            }
            _ => Ok(ColumnAction::Unchanged),
        }
    }
}

/// Processing order within one table: columns the source no longer defines
/// come first (removals), plain columns next, computed columns last since
/// their expressions may reference the others. The sort is stable, so
/// canonical order is preserved within each group. On the Users table the
/// identity column additionally moves to the very front; other column
/// definitions may depend on it.
fn ordered_column_names(
    table: &str,
    columns: &IndexMap<String, HashMap<String, ColumnSignature>>,
    source_environment: &str,
) -> Vec<String> {
    let mut names: Vec<String> = columns.keys().cloned().collect();

    names.sort_by_key(|name| match columns[name.as_str()].get(source_environment) {
        None => 0u8,
        Some(signature) if signature.definition.expression().is_some() => 2,
        Some(_) => 1,
    });

    if table == "Users"
        && let Some(position) = names.iter().position(|name| {
            columns[name.as_str()]
                .get(source_environment)
                .is_some_and(|signature| signature.definition.identity())
        })
        && position > 0
    {
        let identity = names.remove(position);
        names.insert(0, identity);
    }

    names
}

/// Payload for creating the source's column on a target. Source-local ids
/// never travel: a column's id is dropped, a relation's identification
/// name is re-resolved into the target's own id space.
fn add_payload(wanted: &ColumnSignature, index: &ColumnIndex<'_>) -> ColumnDefinition {
    match &wanted.definition {
        ColumnDefinition::Column(column) => {
            let mut payload = column.clone();
            payload.column_id = None;
            ColumnDefinition::Column(payload)
        }
        ColumnDefinition::Relation(relation) => {
            let mut payload = relation.clone();
            payload.identification = identification_id_for(index, relation).map(ColumnRef::Id);
            ColumnDefinition::Relation(payload)
        }
    }
}

/// Payload for updating an existing target column: the source's definition,
/// addressed by the id the target knows the column under.
fn update_payload(
    wanted: &ColumnSignature,
    current: &ColumnSignature,
    index: &ColumnIndex<'_>,
) -> ColumnDefinition {
    match &wanted.definition {
        ColumnDefinition::Column(column) => {
            let mut payload = column.clone();
            payload.column_id = current.definition.as_column().and_then(|column| column.column_id);
            ColumnDefinition::Column(payload)
        }
        ColumnDefinition::Relation(relation) => {
            let mut payload = relation.clone();
            payload.identification = identification_id_for(index, relation).map(ColumnRef::Id);
            ColumnDefinition::Relation(payload)
        }
    }
}

/// A required column with a non-null default gets its existing null rows
/// set to that default before the definition update is attempted.
fn backfill_values(wanted: &ColumnSignature) -> Option<Map<String, Value>> {
    let column = wanted.definition.as_column()?;
    if !column.required {
        return None;
    }
    let default = column.default_value.clone().filter(|value| !value.is_null())?;

    let mut values = Map::new();
    values.insert(column.name.clone(), default);
    Some(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Cardinality, Column, Relation, Table};
    use crate::signature::build_table_signatures;
    use serde_json::json;

    fn environment(name: &str, tables: Vec<Table>) -> Environment {
        Environment {
            id: format!("{name}-id"),
            name: name.to_string(),
            tables,
            roles: Vec::new(),
            services: Vec::new(),
            api_keys: Vec::new(),
        }
    }

    fn table(name: &str, columns: Vec<Column>) -> Table {
        Table {
            name: name.to_string(),
            columns,
            relations: Vec::new(),
            geo_relations: Vec::new(),
        }
    }

    fn signature_of(column: Column) -> ColumnSignature {
        let name = column.name.clone();
        let mut map = build_table_signatures(&table("Fixture", vec![column]), &[]);
        map.swap_remove(&name).unwrap()
    }

    #[test]
    fn test_expression_columns_sort_last() {
        let mut total = Column::new("total", "DOUBLE");
        total.expression = Some("price * quantity".to_string());
        let book = table("Book", vec![total, Column::new("title", "STRING")]);

        let schema = build_schema_map(&[environment("dev", vec![book])], &[]);
        let order = ordered_column_names("Book", &schema["Book"], "dev");

        assert_eq!(order, ["title", "total"]);
    }

    #[test]
    fn test_columns_missing_in_source_sort_first() {
        let source = environment("dev", vec![table("Book", vec![Column::new("title", "STRING")])]);
        let target = environment(
            "prod",
            vec![table(
                "Book",
                vec![Column::new("title", "STRING"), Column::new("legacy", "INT")],
            )],
        );

        let schema = build_schema_map(&[source, target], &[]);
        let order = ordered_column_names("Book", &schema["Book"], "dev");

        assert_eq!(order, ["legacy", "title"]);
    }

    #[test]
    fn test_users_identity_column_moves_to_front() {
        let mut username = Column::new("username", "STRING");
        username.identity = true;
        let users = table("Users", vec![Column::new("email", "STRING"), username]);

        let schema = build_schema_map(&[environment("dev", vec![users])], &[]);
        let order = ordered_column_names("Users", &schema["Users"], "dev");

        assert_eq!(order, ["username", "email"]);
    }

    #[test]
    fn test_identity_promotion_only_applies_to_users() {
        let mut code = Column::new("code", "STRING");
        code.identity = true;
        let book = table("Book", vec![Column::new("title", "STRING"), code]);

        let schema = build_schema_map(&[environment("dev", vec![book])], &[]);
        let order = ordered_column_names("Book", &schema["Book"], "dev");

        assert_eq!(order, ["title", "code"]);
    }

    #[test]
    fn test_backfill_needs_required_and_non_null_default() {
        let mut status = Column::new("status", "STRING");
        status.required = true;
        status.default_value = Some(json!("pending"));

        let values = backfill_values(&signature_of(status)).unwrap();
        assert_eq!(values["status"], json!("pending"));
    }

    #[test]
    fn test_no_backfill_without_default() {
        let mut status = Column::new("status", "STRING");
        status.required = true;

        assert!(backfill_values(&signature_of(status)).is_none());
    }

    #[test]
    fn test_no_backfill_for_null_default() {
        let mut status = Column::new("status", "STRING");
        status.required = true;
        status.default_value = Some(Value::Null);

        assert!(backfill_values(&signature_of(status)).is_none());
    }

    #[test]
    fn test_no_backfill_for_optional_column() {
        let mut status = Column::new("status", "STRING");
        status.default_value = Some(json!("pending"));

        assert!(backfill_values(&signature_of(status)).is_none());
    }

    #[test]
    fn test_add_payload_strips_source_local_id() {
        let mut title = Column::new("title", "STRING");
        title.column_id = Some(17);
        let target = environment("prod", vec![]);
        let index = ColumnIndex::new(&target);

        let payload = add_payload(&signature_of(title), &index);

        assert_eq!(payload.as_column().unwrap().column_id, None);
    }

    #[test]
    fn test_update_payload_carries_target_id() {
        let mut wanted = Column::new("title", "STRING");
        wanted.column_id = Some(17);
        wanted.required = true;
        let mut current = Column::new("title", "STRING");
        current.column_id = Some(99);
        let target = environment("prod", vec![]);
        let index = ColumnIndex::new(&target);

        let payload = update_payload(&signature_of(wanted), &signature_of(current), &index);

        let column = payload.as_column().unwrap();
        assert_eq!(column.column_id, Some(99));
        assert!(column.required);
    }

    #[test]
    fn test_relation_payload_resolves_identification_against_target() {
        let mut isbn = Column::new("isbn", "STRING");
        isbn.column_id = Some(42);
        let target = environment("prod", vec![table("Person", vec![isbn])]);
        let index = ColumnIndex::new(&target);

        let mut author = Relation::new("author", "Person", Cardinality::OneToOne);
        author.identification = Some(ColumnRef::Name("isbn".to_string()));
        let mut map = build_table_signatures(
            &Table {
                name: "Book".to_string(),
                columns: Vec::new(),
                relations: vec![author],
                geo_relations: Vec::new(),
            },
            &[],
        );
        let signature = map.swap_remove("author").unwrap();

        let payload = add_payload(&signature, &index);

        assert_eq!(
            payload.as_relation().unwrap().identification,
            Some(ColumnRef::Id(42))
        );
    }
}
