//! Schema comparison: resolver pre-pass, canonical maps, difference detection.

use crate::diff::{self, SchemaReport};
use crate::model::Environment;
use crate::resolve;
use crate::signature;

/// Knobs shared by the schema comparator and the sync executor.
#[derive(Debug, Clone, Default)]
pub struct CompareOptions {
    /// Column names excluded from comparison on top of the system set
    pub columns_to_ignore: Vec<String>,
}

/// Compare table schemas across environments. The first environment is the
/// source; order is preserved into the report.
pub fn compare_tables(environments: &[Environment], options: &CompareOptions) -> SchemaReport {
    let normalized = resolve::normalize_all(environments);
    let map = signature::build_schema_map(&normalized, &options.columns_to_ignore);
    diff::detect(&normalized, &map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Cardinality, Column, ColumnRef, Relation, Table};

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

    // Each environment stores the identification reference in its own
    // encoding; after the resolver pre-pass both must compare equal.
    #[test]
    fn test_id_and_name_encodings_compare_equal() {
        let person = |id: u64| {
            let mut isbn = Column::new("isbn", "STRING");
            isbn.column_id = Some(id);
            Table {
                name: "Person".to_string(),
                columns: vec![isbn],
                relations: Vec::new(),
                geo_relations: Vec::new(),
            }
        };
        let book = |identification: ColumnRef| {
            let mut author = Relation::new("author", "Person", Cardinality::OneToOne);
            author.identification = Some(identification);
            Table {
                name: "Book".to_string(),
                columns: Vec::new(),
                relations: vec![author],
                geo_relations: Vec::new(),
            }
        };

        let dev = environment("dev", vec![book(ColumnRef::Id(7)), person(7)]);
        let prod = environment(
            "prod",
            vec![book(ColumnRef::Name("isbn".to_string())), person(91)],
        );

        let report = compare_tables(&[dev, prod], &CompareOptions::default());

        assert!(!report.has_differences());
    }

    #[test]
    fn test_ignored_columns_do_not_report() {
        let with_color = Table {
            name: "Book".to_string(),
            columns: vec![Column::new("title", "STRING"), Column::new("color", "STRING")],
            relations: Vec::new(),
            geo_relations: Vec::new(),
        };
        let without_color = Table {
            name: "Book".to_string(),
            columns: vec![Column::new("title", "STRING")],
            relations: Vec::new(),
            geo_relations: Vec::new(),
        };

        let dev = environment("dev", vec![with_color]);
        let prod = environment("prod", vec![without_color]);

        let options = CompareOptions {
            columns_to_ignore: vec!["color".to_string()],
        };
        let report = compare_tables(&[dev, prod], &options);

        assert!(!report.has_differences());
    }

    // The backend adds blUserLocale to Users on its own schedule, so one
    // environment having it and another not is not a schema difference.
    #[test]
    fn test_locale_system_column_does_not_report() {
        let with_locale = Table {
            name: "Users".to_string(),
            columns: vec![
                Column::new("email", "STRING"),
                Column::new("blUserLocale", "STRING"),
            ],
            relations: Vec::new(),
            geo_relations: Vec::new(),
        };
        let without_locale = Table {
            name: "Users".to_string(),
            columns: vec![Column::new("email", "STRING")],
            relations: Vec::new(),
            geo_relations: Vec::new(),
        };

        let dev = environment("dev", vec![with_locale]);
        let prod = environment("prod", vec![without_locale]);

        let report = compare_tables(&[dev, prod], &CompareOptions::default());

        assert!(!report.has_differences());
    }
}
