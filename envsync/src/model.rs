//! Data model for environment schemas as exported by the console API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One deployed application environment: schema, roles, services, API keys.
///
/// Read-only input to the comparison pipeline; only the sync executor
/// mutates the remote counterpart (and this struct's in-memory table list,
/// which tracks successful removals between passes).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    /// Environment identifier assigned by the console
    pub id: String,

    /// Human-readable environment name (unique within one run)
    pub name: String,

    #[serde(default)]
    pub tables: Vec<Table>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<Role>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<Service>,

    /// Names of custom API keys defined in this environment
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub api_keys: Vec<String>,
}

impl Environment {
    /// Look up a table by name.
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|table| table.name == name)
    }
}

/// A data table with its own columns plus relation pseudo-columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub name: String,

    #[serde(default)]
    pub columns: Vec<Column>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relations: Vec<Relation>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub geo_relations: Vec<Relation>,
}

impl Table {
    /// Create an empty table shell, as returned right after an add-table call.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            relations: Vec::new(),
            geo_relations: Vec::new(),
        }
    }
}

/// A single column definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub name: String,

    /// Backend data type name (e.g. "STRING", "INT", "BOOLEAN")
    pub data_type: String,

    /// Numeric identifier assigned by the owning environment.
    /// Only meaningful within that environment, never compared across.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_id: Option<u64>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub unique: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub indexed: bool,

    /// Marks the login-identity column of the Users table
    #[serde(default, skip_serializing_if = "is_false")]
    pub identity: bool,

    /// Custom validation pattern applied by the backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_regex: Option<String>,

    /// Default value applied to new rows; any JSON scalar
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,

    /// Maximum length, string-typed columns only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,

    /// Computed-column expression; such columns depend on others
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
}

impl Column {
    /// Create a plain column with the given name and data type.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            column_id: None,
            required: false,
            unique: false,
            indexed: false,
            identity: false,
            custom_regex: None,
            default_value: None,
            size: None,
            expression: None,
        }
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// A relation to another table, acting as a pseudo-column of its owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relation {
    pub name: String,

    /// Name of the table this relation points to
    pub to_table_name: String,

    pub relationship_type: Cardinality,

    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub unique: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub auto_load: bool,

    /// Reference to the column of the target table that identifies related
    /// records. Name-based when human-authored, ID-based in raw console
    /// exports; IDs are local to one environment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identification: Option<ColumnRef>,
}

impl Relation {
    /// Create a relation pseudo-column with no flags set.
    pub fn new(
        name: impl Into<String>,
        to_table_name: impl Into<String>,
        relationship_type: Cardinality,
    ) -> Self {
        Self {
            name: name.into(),
            to_table_name: to_table_name.into(),
            relationship_type,
            required: false,
            unique: false,
            auto_load: false,
            identification: None,
        }
    }
}

/// Relation cardinality as encoded by the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Cardinality {
    OneToOne,
    OneToMany,
}

impl Cardinality {
    /// Short form used inside canonical signatures.
    pub fn alias(&self) -> &'static str {
        match self {
            Cardinality::OneToOne => "1:1",
            Cardinality::OneToMany => "1:N",
        }
    }
}

/// A column reference that is either environment-local (numeric ID) or
/// portable (name). Raw exports carry IDs; everything that crosses an
/// environment boundary must carry a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnRef {
    Id(u64),
    Name(String),
}

impl ColumnRef {
    pub fn as_name(&self) -> Option<&str> {
        match self {
            ColumnRef::Name(name) => Some(name),
            ColumnRef::Id(_) => None,
        }
    }

    pub fn as_id(&self) -> Option<u64> {
        match self {
            ColumnRef::Id(id) => Some(*id),
            ColumnRef::Name(_) => None,
        }
    }
}

/// A security role together with its operation-level permissions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub name: String,

    #[serde(default)]
    pub permissions: Vec<Permission>,
}

/// Access ruling for one operation under one role.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    /// Operation identifier (e.g. "data.find", "messaging.publish")
    pub operation: String,

    /// Access level string as reported by the console (e.g. "GRANT", "DENY")
    pub access: String,
}

/// A deployed API service and its endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub name: String,

    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
}

/// One invocable endpoint of a service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub name: String,

    pub method: String,

    pub path: String,
}

impl Endpoint {
    /// Comparable rendering of the endpoint's shape.
    pub fn signature(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

/// A concrete schema entry: either a plain column or a relation
/// pseudo-column. Also serves as the mutation payload shape, serialized
/// untagged so each variant keeps its own wire fields.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ColumnDefinition {
    Column(Column),
    Relation(Relation),
}

impl ColumnDefinition {
    pub fn name(&self) -> &str {
        match self {
            ColumnDefinition::Column(column) => &column.name,
            ColumnDefinition::Relation(relation) => &relation.name,
        }
    }

    pub fn identity(&self) -> bool {
        match self {
            ColumnDefinition::Column(column) => column.identity,
            ColumnDefinition::Relation(_) => false,
        }
    }

    pub fn expression(&self) -> Option<&str> {
        match self {
            ColumnDefinition::Column(column) => column.expression.as_deref(),
            ColumnDefinition::Relation(_) => None,
        }
    }

    pub fn as_column(&self) -> Option<&Column> {
        match self {
            ColumnDefinition::Column(column) => Some(column),
            ColumnDefinition::Relation(_) => None,
        }
    }

    pub fn as_relation(&self) -> Option<&Relation> {
        match self {
            ColumnDefinition::Relation(relation) => Some(relation),
            ColumnDefinition::Column(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_ref_deserializes_both_encodings() {
        let by_id: ColumnRef = serde_json::from_str("42").unwrap();
        assert_eq!(by_id, ColumnRef::Id(42));
        assert_eq!(by_id.as_id(), Some(42));
        assert_eq!(by_id.as_name(), None);

        let by_name: ColumnRef = serde_json::from_str("\"isbn\"").unwrap();
        assert_eq!(by_name, ColumnRef::Name("isbn".to_string()));
        assert_eq!(by_name.as_id(), None);
        assert_eq!(by_name.as_name(), Some("isbn"));
    }

    #[test]
    fn test_cardinality_wire_format() {
        let one_to_one: Cardinality = serde_json::from_str("\"ONE_TO_ONE\"").unwrap();
        assert_eq!(one_to_one, Cardinality::OneToOne);
        assert_eq!(one_to_one.alias(), "1:1");

        let one_to_many: Cardinality = serde_json::from_str("\"ONE_TO_MANY\"").unwrap();
        assert_eq!(one_to_many.alias(), "1:N");
    }

    #[test]
    fn test_column_omits_unset_flags() {
        let column = Column::new("title", "STRING");
        let json = serde_json::to_value(&column).unwrap();

        assert_eq!(json["name"], "title");
        assert_eq!(json["dataType"], "STRING");
        assert!(json.get("required").is_none());
        assert!(json.get("columnId").is_none());
    }

    #[test]
    fn test_environment_wire_format_round_trip() {
        let raw = r#"{
            "id": "app-dev",
            "name": "dev",
            "tables": [{
                "name": "Book",
                "columns": [
                    { "name": "title", "dataType": "STRING", "required": true, "size": 120 }
                ],
                "relations": [{
                    "name": "author",
                    "toTableName": "Person",
                    "relationshipType": "ONE_TO_ONE",
                    "identification": 7
                }]
            }]
        }"#;

        let env: Environment = serde_json::from_str(raw).unwrap();
        let book = env.table("Book").unwrap();
        assert_eq!(book.columns[0].size, Some(120));
        assert_eq!(book.relations[0].identification, Some(ColumnRef::Id(7)));
        assert!(env.table("Person").is_none());
    }
}
