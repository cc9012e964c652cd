//! Schema validator for introspection responses.
//!
//! - `introspection`: query text and the serde model of `data.__schema`
//! - `rules`: structural validation of the constructed schema

pub mod introspection;
pub mod rules;

pub use introspection::{
    introspection_request_body, ping_request_body, IntrospectionSchema, TypeKind, TypeRef,
    INTROSPECTION_QUERY, PING_QUERY,
};
pub use rules::validate_schema;

use serde_json::Value;

use crate::diagnosis::Diagnosis;

/// Validate the raw body of an introspection response.
///
/// Returns `None` only for a parseable response whose `data.__schema`
/// describes a structurally valid schema. Every diagnosis quotes the raw
/// body.
pub fn validate(raw_body: &str) -> Option<Diagnosis> {
    let document: Value = match serde_json::from_str(raw_body) {
        Ok(document) => document,
        Err(e) => {
            return Some(Diagnosis::schema(format!(
                "introspection response could not be parsed as JSON ({e}). Raw response:\n{raw_body}"
            )))
        }
    };

    let Some(raw_schema) = document
        .get("data")
        .and_then(|data| data.get("__schema"))
        .filter(|schema| schema.is_object())
    else {
        return Some(Diagnosis::schema(format!(
            "introspection response has no data.__schema; introspection may be disabled on the server. Raw response:\n{raw_body}"
        )));
    };

    let schema: IntrospectionSchema = match serde_json::from_value(raw_schema.clone()) {
        Ok(schema) => schema,
        Err(e) => {
            return Some(Diagnosis::schema(format!(
                "introspection result could not be built into a schema:\n  - {e}\nRaw response:\n{raw_body}"
            )))
        }
    };

    let errors = validate_schema(&schema);
    if errors.is_empty() {
        return None;
    }

    let listed: Vec<String> = errors.iter().map(|e| format!("  - {e}")).collect();
    Some(Diagnosis::schema(format!(
        "introspection result describes an invalid schema ({} error(s)):\n{}\nRaw response:\n{raw_body}",
        errors.len(),
        listed.join("\n")
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnosis::Category;

    const VALID: &str = r#"{
        "data": {
            "__schema": {
                "queryType": { "name": "Query" },
                "mutationType": null,
                "subscriptionType": null,
                "types": [
                    { "kind": "SCALAR", "name": "String" },
                    {
                        "kind": "OBJECT",
                        "name": "Query",
                        "interfaces": [],
                        "fields": [
                            { "name": "hello", "args": [], "type": { "kind": "SCALAR", "name": "String", "ofType": null }, "isDeprecated": false }
                        ]
                    }
                ],
                "directives": []
            }
        }
    }"#;

    #[test]
    fn test_valid_introspection_yields_nothing() {
        assert!(validate(VALID).is_none());
    }

    #[test]
    fn test_unparseable_body_quotes_raw_body() {
        let d = validate("<html>Bad Gateway</html>").unwrap();
        assert_eq!(d.category, Category::Schema);
        assert!(d.message.contains("<html>Bad Gateway</html>"));
        assert!(d.message.contains("could not be parsed"));
    }

    #[test]
    fn test_errors_only_body_suggests_disabled_introspection() {
        let body = r#"{"errors":[{"message":"GraphQL introspection is not allowed"}]}"#;
        let d = validate(body).unwrap();
        assert_eq!(d.category, Category::Schema);
        assert!(d.message.contains("introspection may be disabled"));
        assert!(d.message.contains(body));
    }

    #[test]
    fn test_data_without_schema() {
        let d = validate(r#"{"data":{"__typename":"Query"}}"#).unwrap();
        assert!(d.message.contains("no data.__schema"));

        let d = validate(r#"{"data":null}"#).unwrap();
        assert!(d.message.contains("no data.__schema"));
    }

    #[test]
    fn test_malformed_schema_shape() {
        let body = r#"{"data":{"__schema":{"queryType":{"name":"Query"}}}}"#;
        let d = validate(body).unwrap();
        assert_eq!(d.category, Category::Schema);
        assert!(d.message.contains("could not be built"));
        assert!(d.message.contains(body));
    }

    #[test]
    fn test_structural_errors_are_listed() {
        let body = VALID.replace(r#""name": "String", "ofType""#, r#""name": "Missing", "ofType""#);
        let d = validate(&body).unwrap();
        assert_eq!(d.category, Category::Schema);
        assert!(d.message.contains("invalid schema"));
        assert!(d.message.contains("  - Query.hello references unknown type \"Missing\"."));
        assert!(d.message.contains(&body));
    }
}
