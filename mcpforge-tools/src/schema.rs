//! Schema descriptors for tool contracts.
//!
//! A [`SchemaDescriptor`] is the abstract shape of a value: a scalar kind, an
//! object of named fields, or an unconstrained placeholder. Descriptors are
//! serialized as JSON Schema and can validate JSON values.
//!
//! # Example
//!
//! ```rust
//! use mcpforge_tools::{ObjectSchemaBuilder, ScalarKind};
//!
//! let schema = ObjectSchemaBuilder::new()
//!     .scalar("id", ScalarKind::Number, Some("The user id"), true)
//!     .scalar("verbose", ScalarKind::Boolean, None, false)
//!     .build();
//!
//! assert!(schema.validate(&serde_json::json!({"id": 7})).is_ok());
//! assert!(schema.validate(&serde_json::json!({"verbose": true})).is_err());
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;
use std::fmt;

use crate::definition::ObjectJsonSchema;
use crate::errors::SchemaError;

/// The scalar kinds the type guesser distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    /// A finite number.
    Number,
    /// `true` or `false`.
    Boolean,
    /// Anything else.
    String,
}

impl ScalarKind {
    /// JSON Schema type name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::String => "string",
        }
    }

    fn matches(&self, value: &JsonValue) -> bool {
        match self {
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::String => value.is_string(),
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify an example value.
///
/// Numeric-ness is tested first, then boolean-ness; everything else is a
/// string. Numeric strings (`"42"`, `" 1.5e3 "`) count as numbers and the
/// exact strings `"true"` / `"false"` count as booleans. Null, arrays and
/// objects fall through to string.
#[must_use]
pub fn guess_kind(value: &JsonValue) -> ScalarKind {
    match value {
        JsonValue::Number(_) => ScalarKind::Number,
        JsonValue::String(text) if is_numeric_literal(text) => ScalarKind::Number,
        JsonValue::Bool(_) => ScalarKind::Boolean,
        JsonValue::String(text) if text == "true" || text == "false" => ScalarKind::Boolean,
        _ => ScalarKind::String,
    }
}

/// Classify an optional example value. Absent values are strings.
#[must_use]
pub fn guess_optional_kind(value: Option<&JsonValue>) -> ScalarKind {
    value.map_or(ScalarKind::String, guess_kind)
}

fn is_numeric_literal(text: &str) -> bool {
    let trimmed = text.trim();
    !trimmed.is_empty() && trimmed.parse::<f64>().is_ok_and(f64::is_finite)
}

/// A field of an object schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Shape of the field value.
    pub schema: SchemaDescriptor,
    /// Whether the field must be present.
    pub required: bool,
}

/// Abstract description of a value's shape.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaDescriptor {
    /// A single scalar kind.
    Scalar {
        /// The kind.
        kind: ScalarKind,
        /// Human description.
        description: Option<String>,
    },
    /// An object with named fields.
    Object {
        /// Fields, in declaration order.
        fields: IndexMap<String, Field>,
        /// Human description.
        description: Option<String>,
    },
    /// Anything goes. Used whenever inference cannot determine a shape.
    Unconstrained {
        /// Human description.
        description: Option<String>,
    },
}

impl SchemaDescriptor {
    /// Create a scalar schema.
    #[must_use]
    pub fn scalar(kind: ScalarKind) -> Self {
        Self::Scalar {
            kind,
            description: None,
        }
    }

    /// Create an object schema with no fields.
    #[must_use]
    pub fn empty_object() -> Self {
        Self::Object {
            fields: IndexMap::new(),
            description: None,
        }
    }

    /// Create the unconstrained placeholder.
    #[must_use]
    pub fn unconstrained() -> Self {
        Self::Unconstrained { description: None }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        let slot = match &mut self {
            Self::Scalar { description, .. }
            | Self::Object { description, .. }
            | Self::Unconstrained { description } => description,
        };
        *slot = Some(desc.into());
        self
    }

    /// Get the description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Scalar { description, .. }
            | Self::Object { description, .. }
            | Self::Unconstrained { description } => description.as_deref(),
        }
    }

    /// Check if this is the unconstrained placeholder.
    #[must_use]
    pub fn is_unconstrained(&self) -> bool {
        matches!(self, Self::Unconstrained { .. })
    }

    /// The scalar kind, for scalar schemas.
    #[must_use]
    pub fn kind(&self) -> Option<ScalarKind> {
        match self {
            Self::Scalar { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// The fields, for object schemas.
    #[must_use]
    pub fn fields(&self) -> Option<&IndexMap<String, Field>> {
        match self {
            Self::Object { fields, .. } => Some(fields),
            _ => None,
        }
    }

    /// Look up a field of an object schema.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields().and_then(|fields| fields.get(name))
    }

    /// Render as a JSON Schema value.
    #[must_use]
    pub fn to_json_schema(&self) -> JsonValue {
        match self {
            Self::Scalar { kind, description } => {
                let mut schema = serde_json::Map::new();
                schema.insert("type".to_string(), JsonValue::from(kind.as_str()));
                if let Some(desc) = description {
                    schema.insert("description".to_string(), JsonValue::from(desc.as_str()));
                }
                JsonValue::Object(schema)
            }
            Self::Object {
                fields,
                description,
            } => {
                let mut object = ObjectJsonSchema::new();
                for (name, field) in fields {
                    object.add_property(name, field.schema.to_json_schema(), field.required);
                }
                object.description = description.clone();
                object.into()
            }
            Self::Unconstrained { description } => {
                let mut schema = serde_json::Map::new();
                if let Some(desc) = description {
                    schema.insert("description".to_string(), JsonValue::from(desc.as_str()));
                }
                JsonValue::Object(schema)
            }
        }
    }

    /// Read a JSON Schema value back. Shapes this crate does not produce
    /// become the unconstrained placeholder.
    #[must_use]
    pub fn from_json_schema(value: &JsonValue) -> Self {
        let description = value
            .get("description")
            .and_then(JsonValue::as_str)
            .map(String::from);
        let kind = match value.get("type").and_then(JsonValue::as_str) {
            Some("number" | "integer") => ScalarKind::Number,
            Some("boolean") => ScalarKind::Boolean,
            Some("string") => ScalarKind::String,
            Some("object") => {
                let required: Vec<&str> = value
                    .get("required")
                    .and_then(JsonValue::as_array)
                    .map(|names| names.iter().filter_map(JsonValue::as_str).collect())
                    .unwrap_or_default();
                let fields = value
                    .get("properties")
                    .and_then(JsonValue::as_object)
                    .map(|props| {
                        props
                            .iter()
                            .map(|(name, schema)| {
                                let field = Field {
                                    schema: Self::from_json_schema(schema),
                                    required: required.contains(&name.as_str()),
                                };
                                (name.clone(), field)
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                return Self::Object {
                    fields,
                    description,
                };
            }
            _ => return Self::Unconstrained { description },
        };
        Self::Scalar { kind, description }
    }

    /// Validate a value against this schema.
    pub fn validate(&self, value: &JsonValue) -> Result<(), SchemaError> {
        self.validate_at(value, "$")
    }

    fn validate_at(&self, value: &JsonValue, path: &str) -> Result<(), SchemaError> {
        match self {
            Self::Unconstrained { .. } => Ok(()),
            Self::Scalar { kind, .. } => {
                if kind.matches(value) {
                    Ok(())
                } else {
                    Err(SchemaError::type_mismatch(path, kind.as_str(), value))
                }
            }
            Self::Object { fields, .. } => {
                let Some(object) = value.as_object() else {
                    return Err(SchemaError::type_mismatch(path, "object", value));
                };
                for (name, field) in fields {
                    let field_path = format!("{path}.{name}");
                    match object.get(name) {
                        None if field.required => {
                            return Err(SchemaError::missing_field(field_path));
                        }
                        None => {}
                        Some(JsonValue::Null) if !field.required => {}
                        Some(v) => field.schema.validate_at(v, &field_path)?,
                    }
                }
                Ok(())
            }
        }
    }
}

impl Default for SchemaDescriptor {
    fn default() -> Self {
        Self::unconstrained()
    }
}

impl Serialize for SchemaDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json_schema().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SchemaDescriptor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = JsonValue::deserialize(deserializer)?;
        Ok(Self::from_json_schema(&value))
    }
}

/// Builder for object schemas.
///
/// Fields keep the order they were added in.
#[derive(Debug, Clone, Default)]
pub struct ObjectSchemaBuilder {
    fields: IndexMap<String, Field>,
    description: Option<String>,
}

impl ObjectSchemaBuilder {
    /// Create a new empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a scalar field.
    #[must_use]
    pub fn scalar(
        self,
        name: &str,
        kind: ScalarKind,
        desc: Option<&str>,
        required: bool,
    ) -> Self {
        let mut schema = SchemaDescriptor::scalar(kind);
        if let Some(desc) = desc {
            schema = schema.with_description(desc);
        }
        self.field(name, schema, required)
    }

    /// Add a field of any shape.
    #[must_use]
    pub fn field(mut self, name: &str, schema: SchemaDescriptor, required: bool) -> Self {
        self.fields
            .insert(name.to_string(), Field { schema, required });
        self
    }

    /// Set the schema description.
    #[must_use]
    pub fn description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Number of fields added so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if no field has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Build the object schema.
    #[must_use]
    pub fn build(self) -> SchemaDescriptor {
        SchemaDescriptor::Object {
            fields: self.fields,
            description: self.description,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!("42"), ScalarKind::Number)]
    #[case(json!(" 1.5e3 "), ScalarKind::Number)]
    #[case(json!("-0.25"), ScalarKind::Number)]
    #[case(json!(7), ScalarKind::Number)]
    #[case(json!(3.5), ScalarKind::Number)]
    #[case(json!("true"), ScalarKind::Boolean)]
    #[case(json!("false"), ScalarKind::Boolean)]
    #[case(json!(true), ScalarKind::Boolean)]
    #[case(json!("abc"), ScalarKind::String)]
    #[case(json!(""), ScalarKind::String)]
    #[case(json!("   "), ScalarKind::String)]
    #[case(json!("True"), ScalarKind::String)]
    #[case(json!("12abc"), ScalarKind::String)]
    #[case(json!("Infinity"), ScalarKind::String)]
    #[case(json!("NaN"), ScalarKind::String)]
    #[case(json!(null), ScalarKind::String)]
    #[case(json!([1, 2]), ScalarKind::String)]
    #[case(json!({"a": 1}), ScalarKind::String)]
    fn test_guess_kind(#[case] value: JsonValue, #[case] expected: ScalarKind) {
        assert_eq!(guess_kind(&value), expected);
    }

    #[test]
    fn test_guess_optional_kind_absent() {
        assert_eq!(guess_optional_kind(None), ScalarKind::String);
        assert_eq!(guess_optional_kind(Some(&json!("1"))), ScalarKind::Number);
    }

    #[test]
    fn test_builder_keeps_order_and_required() {
        let schema = ObjectSchemaBuilder::new()
            .scalar("z", ScalarKind::String, None, true)
            .scalar("a", ScalarKind::Number, Some("A number"), false)
            .build();

        let fields = schema.fields().unwrap();
        let names: Vec<&str> = fields.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["z", "a"]);
        assert!(fields["z"].required);
        assert!(!fields["a"].required);
        assert_eq!(fields["a"].schema.description(), Some("A number"));
    }

    #[test]
    fn test_to_json_schema() {
        let schema = ObjectSchemaBuilder::new()
            .scalar("id", ScalarKind::Number, Some("Path parameter: id"), true)
            .field(
                "body",
                SchemaDescriptor::unconstrained().with_description("JSON request body"),
                false,
            )
            .build();

        assert_eq!(
            schema.to_json_schema(),
            json!({
                "type": "object",
                "properties": {
                    "id": {"type": "number", "description": "Path parameter: id"},
                    "body": {"description": "JSON request body"}
                },
                "required": ["id"]
            })
        );
    }

    #[test]
    fn test_empty_object_schema() {
        assert_eq!(
            SchemaDescriptor::empty_object().to_json_schema(),
            json!({"type": "object", "properties": {}})
        );
    }

    #[test]
    fn test_json_schema_roundtrip() {
        let schema = ObjectSchemaBuilder::new()
            .scalar("name", ScalarKind::String, None, true)
            .field(
                "body",
                ObjectSchemaBuilder::new()
                    .scalar("active", ScalarKind::Boolean, None, true)
                    .build(),
                false,
            )
            .description("Input")
            .build();

        let text = serde_json::to_string(&schema).unwrap();
        let parsed: SchemaDescriptor = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, schema);
    }

    #[test]
    fn test_unknown_json_schema_is_unconstrained() {
        let parsed = SchemaDescriptor::from_json_schema(&json!({"type": "array", "items": {}}));
        assert!(parsed.is_unconstrained());

        let parsed = SchemaDescriptor::from_json_schema(&json!({"type": "integer"}));
        assert_eq!(parsed.kind(), Some(ScalarKind::Number));
    }

    #[test]
    fn test_validate_object() {
        let schema = ObjectSchemaBuilder::new()
            .scalar("id", ScalarKind::Number, None, true)
            .scalar("label", ScalarKind::String, None, false)
            .build();

        assert!(schema.validate(&json!({"id": 1})).is_ok());
        assert!(schema.validate(&json!({"id": 1, "label": null})).is_ok());
        assert!(schema.validate(&json!({"id": 1, "extra": [1]})).is_ok());

        let err = schema.validate(&json!({"label": "x"})).unwrap_err();
        assert_eq!(err, SchemaError::missing_field("$.id"));

        let err = schema.validate(&json!({"id": "1"})).unwrap_err();
        assert!(err.to_string().contains("$.id"));
        assert!(err.to_string().contains("expected number"));

        let err = schema.validate(&json!([1])).unwrap_err();
        assert!(err.to_string().contains("expected object"));
    }

    #[test]
    fn test_validate_unconstrained_accepts_anything() {
        let schema = SchemaDescriptor::unconstrained();
        assert!(schema.validate(&json!(null)).is_ok());
        assert!(schema.validate(&json!([1, "a"])).is_ok());
    }
}
