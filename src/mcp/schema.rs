//! Tool argument schemas and parsing
//!
//! Input schemas are derived from the argument structs, and the same structs
//! gate every call: deserialization rejects missing and unknown fields, then
//! `validator` rules reject empty or malformed values.

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use validator::Validate;

use crate::error::McpError;
use crate::mcp::types::Tool;

/// JSON Schema for an argument struct, in the shape MCP clients expect
pub fn input_schema<T: JsonSchema>() -> Value {
    let schema = schemars::schema_for!(T);
    let mut value = serde_json::to_value(schema).unwrap_or_else(|_| json!({ "type": "object" }));

    if let Value::Object(map) = &mut value {
        map.remove("$schema");
        map.remove("title");
        map.entry("properties").or_insert_with(|| json!({}));
    }

    value
}

/// Build a tool definition whose schema comes from `T`
pub fn tool_def<T: JsonSchema>(name: &str, description: &str) -> Tool {
    Tool {
        name: name.to_string(),
        description: Some(description.to_string()),
        input_schema: input_schema::<T>(),
    }
}

/// Deserialize and validate tool arguments; `null` counts as `{}`
pub fn parse_args<T: DeserializeOwned + Validate>(args: Value) -> Result<T, McpError> {
    let args = if args.is_null() { json!({}) } else { args };

    let parsed: T = serde_json::from_value(args).map_err(|e| McpError::InvalidArguments {
        message: e.to_string(),
    })?;

    parsed.validate().map_err(|e| McpError::InvalidArguments {
        message: e.to_string(),
    })?;

    Ok(parsed)
}

/// Argument struct for tools that take nothing
#[derive(Debug, Default, serde::Deserialize, JsonSchema, Validate)]
#[serde(deny_unknown_fields)]
pub struct NoArgs {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, JsonSchema, Validate)]
    #[serde(deny_unknown_fields)]
    struct Sample {
        #[validate(length(min = 1))]
        email_id: String,
        #[serde(default)]
        limit: Option<u32>,
    }

    #[test]
    fn test_schema_shape() {
        let schema = input_schema::<Sample>();
        assert!(schema.get("$schema").is_none());
        assert_eq!(schema["type"], "object");
        assert!(schema["properties"]["email_id"].is_object());
        assert_eq!(schema["required"], json!(["email_id"]));
        assert_eq!(schema["additionalProperties"], false);
    }

    #[test]
    fn test_no_args_schema_has_properties() {
        let schema = input_schema::<NoArgs>();
        assert_eq!(schema["properties"], json!({}));
    }

    #[test]
    fn test_missing_field_rejected() {
        let err = parse_args::<Sample>(json!({})).unwrap_err();
        assert!(err.to_string().contains("email_id"));
    }

    #[test]
    fn test_empty_field_rejected() {
        let err = parse_args::<Sample>(json!({ "email_id": "" })).unwrap_err();
        assert!(matches!(err, McpError::InvalidArguments { .. }));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = parse_args::<Sample>(json!({ "email_id": "a", "extra": 1 })).unwrap_err();
        assert!(err.to_string().contains("extra"));
    }

    #[test]
    fn test_null_means_empty_object() {
        assert!(parse_args::<NoArgs>(Value::Null).is_ok());
        let parsed = parse_args::<Sample>(json!({ "email_id": "m1" })).unwrap();
        assert_eq!(parsed.email_id, "m1");
        assert_eq!(parsed.limit, None);
    }
}
