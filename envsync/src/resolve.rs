//! Relation identifier resolver.
//!
//! Relation identification references arrive in two encodings: column
//! names (human-authored definitions) and numeric column IDs (raw console
//! exports). IDs are local to the environment that issued them, so every
//! cross-environment step needs a translation:
//!
//! - ID→Name ([`normalize_environment`]) runs before signatures are built,
//!   so comparison always sees portable names.
//! - Name→ID ([`identification_id_for`]) runs when a mutation payload is
//!   assembled for a specific target, which only accepts its own IDs.
//!
//! Both passes are best-effort: a miss drops the reference from the result
//! and logs a warning, it never fails the run.

use std::collections::HashMap;

use log::warn;

use crate::model::{Column, ColumnRef, Environment, Relation};

/// Environment-local lookup of columns by table, keyed by numeric ID and
/// by name. IDs in this index are only meaningful for the environment the
/// index was built from.
pub struct ColumnIndex<'a> {
    environment: &'a str,
    by_id: HashMap<&'a str, HashMap<u64, &'a Column>>,
    by_name: HashMap<&'a str, HashMap<&'a str, &'a Column>>,
}

impl<'a> ColumnIndex<'a> {
    pub fn new(environment: &'a Environment) -> Self {
        let mut by_id: HashMap<&str, HashMap<u64, &Column>> = HashMap::new();
        let mut by_name: HashMap<&str, HashMap<&str, &Column>> = HashMap::new();

        for table in &environment.tables {
            for column in &table.columns {
                if let Some(id) = column.column_id {
                    by_id.entry(table.name.as_str()).or_default().insert(id, column);
                }
                by_name
                    .entry(table.name.as_str())
                    .or_default()
                    .insert(column.name.as_str(), column);
            }
        }

        Self {
            environment: &environment.name,
            by_id,
            by_name,
        }
    }

    pub fn by_id(&self, table: &str, id: u64) -> Option<&'a Column> {
        self.by_id.get(table).and_then(|columns| columns.get(&id)).copied()
    }

    pub fn by_name(&self, table: &str, name: &str) -> Option<&'a Column> {
        self.by_name.get(table).and_then(|columns| columns.get(name)).copied()
    }
}

/// ID→Name pass over one environment.
///
/// Returns a copy in which every relation identification reference is
/// name-based, resolved through the environment's own column index.
/// Unresolvable IDs are dropped. The input is never mutated.
pub fn normalize_environment(environment: &Environment) -> Environment {
    let index = ColumnIndex::new(environment);
    let mut normalized = environment.clone();

    for table in &mut normalized.tables {
        let table_name = table.name.clone();
        for relation in table.relations.iter_mut().chain(table.geo_relations.iter_mut()) {
            relation.identification = match relation.identification.take() {
                Some(ColumnRef::Id(id)) => match index.by_id(&relation.to_table_name, id) {
                    Some(column) => Some(ColumnRef::Name(column.name.clone())),
                    None => {
                        warn!(
                            "{}: relation {table_name}.{} references unknown column id {id} in {}",
                            index.environment, relation.name, relation.to_table_name
                        );
                        None
                    }
                },
                reference => reference,
            };
        }
    }

    normalized
}

/// Normalize every environment in order.
pub fn normalize_all(environments: &[Environment]) -> Vec<Environment> {
    environments.iter().map(normalize_environment).collect()
}

/// Name→ID pass for one relation, against a target environment's index.
///
/// Takes a name-based reference from the source definition and returns the
/// numeric ID the target environment knows that column by. `None` when the
/// reference is absent, still ID-encoded, or has no match in the target.
pub fn identification_id_for(target: &ColumnIndex<'_>, relation: &Relation) -> Option<u64> {
    let name = relation.identification.as_ref()?.as_name()?;

    match target.by_name(&relation.to_table_name, name).and_then(|column| column.column_id) {
        Some(id) => Some(id),
        None => {
            warn!(
                "{}: relation {}: no column named {name} with an id in {}",
                target.environment, relation.name, relation.to_table_name
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Cardinality, Table};

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

    fn person_table(isbn_id: u64) -> Table {
        let mut isbn = Column::new("isbn", "STRING");
        isbn.column_id = Some(isbn_id);
        Table {
            name: "Person".to_string(),
            columns: vec![Column::new("fullName", "STRING"), isbn],
            relations: Vec::new(),
            geo_relations: Vec::new(),
        }
    }

    fn book_table(identification: Option<ColumnRef>) -> Table {
        let mut author = Relation::new("author", "Person", Cardinality::OneToOne);
        author.identification = identification;
        Table {
            name: "Book".to_string(),
            columns: vec![Column::new("title", "STRING")],
            relations: vec![author],
            geo_relations: Vec::new(),
        }
    }

    #[test]
    fn test_id_reference_resolves_to_name() {
        let env = environment(
            "dev",
            vec![book_table(Some(ColumnRef::Id(7))), person_table(7)],
        );

        let normalized = normalize_environment(&env);

        let author = &normalized.table("Book").unwrap().relations[0];
        assert_eq!(author.identification, Some(ColumnRef::Name("isbn".to_string())));
    }

    #[test]
    fn test_unresolvable_id_is_dropped() {
        let env = environment(
            "dev",
            vec![book_table(Some(ColumnRef::Id(999))), person_table(7)],
        );

        let normalized = normalize_environment(&env);

        assert_eq!(normalized.table("Book").unwrap().relations[0].identification, None);
    }

    #[test]
    fn test_name_reference_passes_through() {
        let reference = ColumnRef::Name("isbn".to_string());
        let env = environment(
            "dev",
            vec![book_table(Some(reference.clone())), person_table(7)],
        );

        let normalized = normalize_environment(&env);

        assert_eq!(
            normalized.table("Book").unwrap().relations[0].identification,
            Some(reference)
        );
    }

    #[test]
    fn test_input_environment_is_untouched() {
        let env = environment(
            "dev",
            vec![book_table(Some(ColumnRef::Id(7))), person_table(7)],
        );

        let _ = normalize_environment(&env);

        assert_eq!(
            env.table("Book").unwrap().relations[0].identification,
            Some(ColumnRef::Id(7))
        );
    }

    #[test]
    fn test_geo_relations_are_normalized_too() {
        let mut location = Relation::new("location", "Person", Cardinality::OneToOne);
        location.identification = Some(ColumnRef::Id(7));
        let mut book = book_table(None);
        book.geo_relations.push(location);

        let normalized = normalize_environment(&environment("dev", vec![book, person_table(7)]));

        assert_eq!(
            normalized.table("Book").unwrap().geo_relations[0].identification,
            Some(ColumnRef::Name("isbn".to_string()))
        );
    }

    #[test]
    fn test_name_resolves_to_target_local_id() {
        let target = environment("prod", vec![person_table(42)]);
        let index = ColumnIndex::new(&target);

        let mut relation = Relation::new("author", "Person", Cardinality::OneToOne);
        relation.identification = Some(ColumnRef::Name("isbn".to_string()));

        assert_eq!(identification_id_for(&index, &relation), Some(42));
    }

    #[test]
    fn test_missing_target_column_yields_none() {
        let target = environment("prod", vec![person_table(42)]);
        let index = ColumnIndex::new(&target);

        let mut relation = Relation::new("author", "Person", Cardinality::OneToOne);
        relation.identification = Some(ColumnRef::Name("nickname".to_string()));

        assert_eq!(identification_id_for(&index, &relation), None);
    }

    #[test]
    fn test_round_trip_recovers_original_name() {
        // Name → prod-local ID, then ID → name inside prod again.
        let prod = environment("prod", vec![book_table(None), person_table(42)]);
        let index = ColumnIndex::new(&prod);

        let mut relation = Relation::new("author", "Person", Cardinality::OneToOne);
        relation.identification = Some(ColumnRef::Name("isbn".to_string()));
        let id = identification_id_for(&index, &relation).unwrap();

        let mut round_tripped = prod.clone();
        round_tripped.tables[0].relations[0].identification = Some(ColumnRef::Id(id));
        let normalized = normalize_environment(&round_tripped);

        assert_eq!(
            normalized.table("Book").unwrap().relations[0].identification,
            Some(ColumnRef::Name("isbn".to_string()))
        );
    }
}
