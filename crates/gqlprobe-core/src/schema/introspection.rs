//! Introspection result model.
//!
//! Mirrors the shape returned for [`INTROSPECTION_QUERY`] under
//! `data.__schema`. Fields a server may legitimately omit are optional so
//! the structural validator, not the deserializer, decides what is wrong.

use serde::{Deserialize, Serialize};

/// The standard full introspection query.
pub const INTROSPECTION_QUERY: &str = r#"query IntrospectionQuery {
  __schema {
    queryType { name }
    mutationType { name }
    subscriptionType { name }
    types {
      ...FullType
    }
    directives {
      name
      description
      locations
      args {
        ...InputValue
      }
    }
  }
}

fragment FullType on __Type {
  kind
  name
  description
  fields(includeDeprecated: true) {
    name
    description
    args {
      ...InputValue
    }
    type {
      ...TypeRef
    }
    isDeprecated
    deprecationReason
  }
  inputFields {
    ...InputValue
  }
  interfaces {
    ...TypeRef
  }
  enumValues(includeDeprecated: true) {
    name
    description
    isDeprecated
    deprecationReason
  }
  possibleTypes {
    ...TypeRef
  }
}

fragment InputValue on __InputValue {
  name
  description
  type { ...TypeRef }
  defaultValue
}

fragment TypeRef on __Type {
  kind
  name
  ofType {
    kind
    name
    ofType {
      kind
      name
      ofType {
        kind
        name
        ofType {
          kind
          name
          ofType {
            kind
            name
            ofType {
              kind
              name
              ofType {
                kind
                name
              }
            }
          }
        }
      }
    }
  }
}
"#;

/// Query sent by the ping probe.
pub const PING_QUERY: &str = "query Ping { __typename }";

/// Built-in introspection types; the only names allowed to start with `__`.
pub const INTROSPECTION_TYPE_NAMES: &[&str] = &[
    "__Schema",
    "__Type",
    "__TypeKind",
    "__Field",
    "__InputValue",
    "__EnumValue",
    "__Directive",
    "__DirectiveLocation",
];

/// JSON body for the introspection probe.
pub fn introspection_request_body() -> serde_json::Value {
    serde_json::json!({
        "operationName": "IntrospectionQuery",
        "query": INTROSPECTION_QUERY,
    })
}

/// JSON body for the ping probe.
pub fn ping_request_body() -> serde_json::Value {
    serde_json::json!({ "query": PING_QUERY })
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeKind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
    List,
    NonNull,
}

impl TypeKind {
    pub fn is_output(&self) -> bool {
        matches!(
            self,
            TypeKind::Scalar
                | TypeKind::Object
                | TypeKind::Interface
                | TypeKind::Union
                | TypeKind::Enum
        )
    }

    pub fn is_input(&self) -> bool {
        matches!(self, TypeKind::Scalar | TypeKind::Enum | TypeKind::InputObject)
    }

    pub fn is_wrapper(&self) -> bool {
        matches!(self, TypeKind::List | TypeKind::NonNull)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectionSchema {
    pub query_type: Option<NamedRef>,
    pub mutation_type: Option<NamedRef>,
    pub subscription_type: Option<NamedRef>,
    pub types: Vec<FullType>,
    #[serde(default)]
    pub directives: Vec<Directive>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NamedRef {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FullType {
    pub kind: TypeKind,
    pub name: Option<String>,
    pub description: Option<String>,
    pub fields: Option<Vec<Field>>,
    pub input_fields: Option<Vec<InputValue>>,
    pub interfaces: Option<Vec<TypeRef>>,
    pub enum_values: Option<Vec<EnumValue>>,
    pub possible_types: Option<Vec<TypeRef>>,
}

impl FullType {
    pub fn name_or_placeholder(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub args: Vec<InputValue>,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default)]
    pub is_deprecated: bool,
    pub deprecation_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InputValue {
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EnumValue {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub is_deprecated: bool,
    pub deprecation_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Directive {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub args: Vec<InputValue>,
}

/// Reference to a type, possibly wrapped in LIST / NON_NULL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TypeRef {
    pub kind: TypeKind,
    pub name: Option<String>,
    pub of_type: Option<Box<TypeRef>>,
}

impl TypeRef {
    pub fn named(kind: TypeKind, name: &str) -> Self {
        Self {
            kind,
            name: Some(name.to_string()),
            of_type: None,
        }
    }

    pub fn non_null(inner: TypeRef) -> Self {
        Self {
            kind: TypeKind::NonNull,
            name: None,
            of_type: Some(Box::new(inner)),
        }
    }

    pub fn list(inner: TypeRef) -> Self {
        Self {
            kind: TypeKind::List,
            name: None,
            of_type: Some(Box::new(inner)),
        }
    }

    pub fn inner(&self) -> Option<&TypeRef> {
        self.of_type.as_deref()
    }

    /// Innermost named reference, if the wrapper chain is well-formed.
    pub fn named_type(&self) -> Option<&TypeRef> {
        if self.kind.is_wrapper() {
            self.inner().and_then(TypeRef::named_type)
        } else {
            Some(self)
        }
    }
}

impl std::fmt::Display for TypeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            TypeKind::NonNull => match self.inner() {
                Some(inner) => write!(f, "{inner}!"),
                None => f.write_str("<missing>!"),
            },
            TypeKind::List => match self.inner() {
                Some(inner) => write!(f, "[{inner}]"),
                None => f.write_str("[<missing>]"),
            },
            _ => f.write_str(self.name.as_deref().unwrap_or("<unnamed>")),
        }
    }
}
