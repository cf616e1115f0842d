//! Schema inference from request definitions.
//!
//! Input schemas come from the declared path variables, query parameters and
//! raw JSON body. Output schemas come from one saved example response. Any
//! shape that cannot be inferred collapses to the unconstrained placeholder
//! so a tool is always produced.

use mcpforge_core::{
    RequestSpec, ResponseExample, Variable, PATH_VARIABLE_PLACEHOLDER,
    QUERY_VARIABLE_PLACEHOLDER,
};
use serde_json::{Map, Value as JsonValue};
use std::collections::HashSet;

use crate::schema::{guess_kind, guess_optional_kind, ObjectSchemaBuilder, SchemaDescriptor};

/// Input field carrying the request body.
pub const BODY_FIELD: &str = "body";

/// Description of a body whose shape is unknown.
pub const BODY_DESCRIPTION: &str = "JSON request body";

/// Description of an output whose shape is unknown.
pub const OUTPUT_DESCRIPTION: &str = "The successful response from the API.";

/// Build the input schema of a request.
///
/// - every path variable becomes a required scalar field
/// - every query parameter becomes an optional scalar field, unless a path
///   variable already uses its key
/// - a raw body becomes the optional `body` field
#[must_use]
pub fn build_input_schema(request: &RequestSpec) -> SchemaDescriptor {
    let mut builder = ObjectSchemaBuilder::new();
    let mut path_keys = HashSet::new();

    for variable in &request.url.path_variables {
        let key = variable.key_or(PATH_VARIABLE_PLACEHOLDER);
        let desc = variable_description(variable, || format!("Path parameter: {key}"));
        builder = builder.scalar(
            key,
            guess_optional_kind(variable.value.as_ref()),
            Some(&desc),
            true,
        );
        path_keys.insert(key);
    }

    for variable in &request.url.query {
        let key = variable.key_or(QUERY_VARIABLE_PLACEHOLDER);
        if path_keys.contains(key) {
            tracing::warn!(key, "Query parameter shares its key with a path variable, keeping the path field");
            continue;
        }
        let desc = variable_description(variable, || format!("Query parameter: {key}"));
        builder = builder.scalar(
            key,
            guess_optional_kind(variable.value.as_ref()),
            Some(&desc),
            false,
        );
    }

    if let Some(raw) = request.raw_body() {
        let body = match serde_json::from_str::<JsonValue>(raw) {
            Ok(JsonValue::Object(map)) => object_from_example(&map),
            _ => {
                tracing::debug!("Request body is not a JSON object, leaving it unconstrained");
                SchemaDescriptor::unconstrained().with_description(BODY_DESCRIPTION)
            }
        };
        builder = builder.field(BODY_FIELD, body, false);
    }

    builder.build()
}

/// Pick the example response the output schema is inferred from.
///
/// The first 200 or 201 example wins; otherwise the first example.
#[must_use]
pub fn select_response(responses: &[ResponseExample]) -> Option<&ResponseExample> {
    responses
        .iter()
        .find(|r| matches!(r.code, Some(200 | 201)))
        .or_else(|| responses.first())
}

/// Build the output schema from the saved example responses.
#[must_use]
pub fn build_output_schema(responses: &[ResponseExample]) -> SchemaDescriptor {
    select_response(responses)
        .and_then(|response| response.body.as_deref())
        .and_then(|body| match serde_json::from_str::<JsonValue>(body) {
            Ok(JsonValue::Object(map)) if !map.is_empty() => Some(object_from_example(&map)),
            _ => None,
        })
        .unwrap_or_else(|| SchemaDescriptor::unconstrained().with_description(OUTPUT_DESCRIPTION))
}

/// One required scalar field per top-level key, typed from its value.
fn object_from_example(example: &Map<String, JsonValue>) -> SchemaDescriptor {
    example
        .iter()
        .fold(ObjectSchemaBuilder::new(), |builder, (key, value)| {
            builder.scalar(key, guess_kind(value), None, true)
        })
        .build()
}

fn variable_description(variable: &Variable, default: impl FnOnce() -> String) -> String {
    variable
        .description
        .clone()
        .filter(|d| !d.is_empty())
        .unwrap_or_else(default)
}
