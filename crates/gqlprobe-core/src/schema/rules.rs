//! Structural validation of an introspected schema.
//!
//! Checks type/field consistency the way a GraphQL schema builder would
//! before accepting a schema: root types, name rules, reference resolution,
//! input/output positions, interface implementation, and the non-empty
//! requirements for composite types.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

use super::introspection::{
    FullType, InputValue, IntrospectionSchema, TypeKind, TypeRef, INTROSPECTION_TYPE_NAMES,
};

static NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[_A-Za-z][_0-9A-Za-z]*$").expect("name pattern is a valid regex")
});

/// Validate a schema and return every violation found (empty if valid).
pub fn validate_schema(schema: &IntrospectionSchema) -> Vec<String> {
    let mut validator = Validator::new(schema);
    validator.run();
    validator.errors
}

/// Where a type reference appears, which decides the allowed kinds.
#[derive(Clone, Copy)]
enum Position {
    Output,
    Input,
}

struct Validator<'a> {
    schema: &'a IntrospectionSchema,
    types: HashMap<&'a str, &'a FullType>,
    errors: Vec<String>,
}

impl<'a> Validator<'a> {
    fn new(schema: &'a IntrospectionSchema) -> Self {
        Self {
            schema,
            types: HashMap::new(),
            errors: Vec::new(),
        }
    }

    fn run(&mut self) {
        self.index_types();
        self.check_roots();

        let schema = self.schema;
        for ty in &schema.types {
            let Some(name) = ty.name.as_deref() else {
                continue;
            };
            match ty.kind {
                TypeKind::Object | TypeKind::Interface => {
                    self.check_fields(name, ty);
                    self.check_implementations(name, ty);
                }
                TypeKind::Union => self.check_union(name, ty),
                TypeKind::Enum => self.check_enum(name, ty),
                TypeKind::InputObject => self.check_input_object(name, ty),
                TypeKind::Scalar | TypeKind::List | TypeKind::NonNull => {}
            }
        }

        self.check_directives();
    }

    fn error(&mut self, message: String) {
        self.errors.push(message);
    }

    // -- types ------------------------------------------------------------

    fn index_types(&mut self) {
        let schema = self.schema;
        for (index, ty) in schema.types.iter().enumerate() {
            let Some(name) = ty.name.as_deref() else {
                self.error(format!("Type at position {index} has no name."));
                continue;
            };

            if ty.kind.is_wrapper() {
                self.error(format!(
                    "Type {name} is declared with wrapper kind {:?}; only named types may be defined.",
                    ty.kind
                ));
            }

            self.check_name(name, &format!("Type {name}"));
            if name.starts_with("__") && !INTROSPECTION_TYPE_NAMES.contains(&name) {
                self.error(format!(
                    "Name \"{name}\" must not begin with \"__\", which is reserved by GraphQL introspection."
                ));
            }

            if self.types.insert(name, ty).is_some() {
                self.error(format!("Schema must contain uniquely named types but contains multiple types named \"{name}\"."));
            }
        }
    }

    fn check_roots(&mut self) {
        let schema = self.schema;
        match &schema.query_type {
            Some(root) => self.check_root("Query", &root.name),
            None => self.error("Query root type must be provided.".to_string()),
        }
        if let Some(root) = &schema.mutation_type {
            self.check_root("Mutation", &root.name);
        }
        if let Some(root) = &schema.subscription_type {
            self.check_root("Subscription", &root.name);
        }
    }

    fn check_root(&mut self, operation: &str, name: &str) {
        match self.types.get(name).map(|ty| ty.kind) {
            Some(TypeKind::Object) => {}
            Some(kind) => self.error(format!(
                "{operation} root type must be Object type, it cannot be {name} of kind {kind:?}."
            )),
            None => self.error(format!(
                "{operation} root type {name} is not defined in the schema."
            )),
        }
    }

    fn check_name(&mut self, name: &str, what: &str) {
        if !NAME_PATTERN.is_match(name) {
            self.error(format!(
                "{what} has invalid name \"{name}\"; names must match /^[_a-zA-Z][_a-zA-Z0-9]*$/."
            ));
        }
    }

    // -- references -------------------------------------------------------

    /// Resolve a reference to its named definition, reporting malformed
    /// wrapper chains, unknown names and kind mismatches.
    fn resolve(&mut self, ty: &TypeRef, context: &str) -> Option<&'a FullType> {
        match ty.kind {
            TypeKind::NonNull => match ty.inner() {
                Some(inner) if inner.kind == TypeKind::NonNull => {
                    self.error(format!("{context} wraps a non-null type in another non-null."));
                    None
                }
                Some(inner) => self.resolve(inner, context),
                None => {
                    self.error(format!("{context} has a NON_NULL type without ofType."));
                    None
                }
            },
            TypeKind::List => match ty.inner() {
                Some(inner) => self.resolve(inner, context),
                None => {
                    self.error(format!("{context} has a LIST type without ofType."));
                    None
                }
            },
            kind => {
                let Some(name) = ty.name.as_deref() else {
                    self.error(format!("{context} references a {kind:?} type without a name."));
                    return None;
                };
                let Some(definition) = self.types.get(name).copied() else {
                    self.error(format!("{context} references unknown type \"{name}\"."));
                    return None;
                };
                if definition.kind != kind {
                    self.error(format!(
                        "{context} references {name} as {kind:?} but it is defined as {:?}.",
                        definition.kind
                    ));
                }
                Some(definition)
            }
        }
    }

    fn check_type_position(&mut self, ty: &TypeRef, position: Position, context: &str) {
        let Some(definition) = self.resolve(ty, context) else {
            return;
        };
        match position {
            Position::Output if !definition.kind.is_output() => self.error(format!(
                "The type of {context} must be Output Type but got: {ty}."
            )),
            Position::Input if !definition.kind.is_input() => self.error(format!(
                "The type of {context} must be Input Type but got: {ty}."
            )),
            _ => {}
        }
    }

    fn check_arguments(&mut self, args: &[InputValue], owner: &str) {
        let mut seen = HashSet::new();
        for arg in args {
            let context = format!("{owner}({}:)", arg.name);
            self.check_name(&arg.name, &context);
            if !seen.insert(arg.name.as_str()) {
                self.error(format!("Argument {context} can only be defined once."));
            }
            self.check_type_position(&arg.ty, Position::Input, &context);
        }
    }

    // -- composite types --------------------------------------------------

    fn check_fields(&mut self, type_name: &str, ty: &FullType) {
        let fields = ty.fields.as_deref().unwrap_or_default();
        if fields.is_empty() {
            self.error(format!(
                "Type {type_name} must define one or more fields."
            ));
            return;
        }

        let mut seen = HashSet::new();
        for field in fields {
            let context = format!("{type_name}.{}", field.name);
            self.check_name(&field.name, &context);
            if !seen.insert(field.name.as_str()) {
                self.error(format!("Field {context} can only be defined once."));
            }
            self.check_type_position(&field.ty, Position::Output, &context);
            self.check_arguments(&field.args, &context);
        }
    }

    fn check_implementations(&mut self, type_name: &str, ty: &FullType) {
        let Some(interfaces) = ty.interfaces.as_deref() else {
            return;
        };

        let mut seen = HashSet::new();
        for iface_ref in interfaces {
            let context = format!("Type {type_name}");
            let Some(iface) = self.resolve(iface_ref, &context) else {
                continue;
            };
            let iface_name = iface.name_or_placeholder();

            if iface.kind != TypeKind::Interface {
                self.error(format!(
                    "Type {type_name} must only implement Interface types, it cannot implement {iface_name}."
                ));
                continue;
            }
            if iface_name == type_name {
                self.error(format!("Type {type_name} cannot implement itself."));
                continue;
            }
            if !seen.insert(iface_name) {
                self.error(format!(
                    "Type {type_name} can only implement {iface_name} once."
                ));
                continue;
            }

            self.check_interface_fields(type_name, ty, iface_name, iface);
        }
    }

    fn check_interface_fields(
        &mut self,
        type_name: &str,
        ty: &FullType,
        iface_name: &str,
        iface: &FullType,
    ) {
        let own_fields = ty.fields.as_deref().unwrap_or_default();

        for iface_field in iface.fields.as_deref().unwrap_or_default() {
            let Some(field) = own_fields.iter().find(|f| f.name == iface_field.name) else {
                self.error(format!(
                    "Interface field {iface_name}.{} expected but {type_name} does not provide it.",
                    iface_field.name
                ));
                continue;
            };

            if !self.is_subtype(&field.ty, &iface_field.ty) {
                self.error(format!(
                    "Interface field {iface_name}.{name} expects type {expected} but {type_name}.{name} is type {actual}.",
                    name = field.name,
                    expected = iface_field.ty,
                    actual = field.ty,
                ));
            }

            for iface_arg in &iface_field.args {
                match field.args.iter().find(|a| a.name == iface_arg.name) {
                    None => self.error(format!(
                        "Interface field argument {iface_name}.{}({}:) expected but {type_name}.{} does not provide it.",
                        iface_field.name, iface_arg.name, field.name
                    )),
                    Some(arg) if arg.ty != iface_arg.ty => self.error(format!(
                        "Interface field argument {iface_name}.{}({}:) expects type {} but {type_name}.{}({}:) is type {}.",
                        iface_field.name, iface_arg.name, iface_arg.ty, field.name, arg.name, arg.ty
                    )),
                    Some(_) => {}
                }
            }

            for arg in &field.args {
                let declared = iface_field.args.iter().any(|a| a.name == arg.name);
                let required = arg.ty.kind == TypeKind::NonNull && arg.default_value.is_none();
                if !declared && required {
                    self.error(format!(
                        "Argument {type_name}.{}({}:) must not be required type {} if not provided by the Interface field {iface_name}.{}.",
                        field.name, arg.name, arg.ty, iface_field.name
                    ));
                }
            }
        }
    }

    /// Covariant output subtyping, as used for interface field types.
    fn is_subtype(&self, sub: &TypeRef, sup: &TypeRef) -> bool {
        match (sub.kind, sup.kind) {
            (TypeKind::NonNull, TypeKind::NonNull) => match (sub.inner(), sup.inner()) {
                (Some(a), Some(b)) => self.is_subtype(a, b),
                _ => false,
            },
            (_, TypeKind::NonNull) => false,
            (TypeKind::NonNull, _) => sub.inner().is_some_and(|a| self.is_subtype(a, sup)),
            (TypeKind::List, TypeKind::List) => match (sub.inner(), sup.inner()) {
                (Some(a), Some(b)) => self.is_subtype(a, b),
                _ => false,
            },
            (TypeKind::List, _) | (_, TypeKind::List) => false,
            _ => match (sub.name.as_deref(), sup.name.as_deref()) {
                (Some(a), Some(b)) => a == b || self.is_possible_type(b, a),
                _ => false,
            },
        }
    }

    fn is_possible_type(&self, abstract_name: &str, object_name: &str) -> bool {
        let Some(abstract_type) = self.types.get(abstract_name) else {
            return false;
        };
        match abstract_type.kind {
            TypeKind::Union => abstract_type
                .possible_types
                .as_deref()
                .unwrap_or_default()
                .iter()
                .any(|t| t.name.as_deref() == Some(object_name)),
            TypeKind::Interface => self
                .types
                .get(object_name)
                .and_then(|t| t.interfaces.as_deref())
                .unwrap_or_default()
                .iter()
                .any(|t| t.name.as_deref() == Some(abstract_name)),
            _ => false,
        }
    }

    fn check_union(&mut self, type_name: &str, ty: &FullType) {
        let members = ty.possible_types.as_deref().unwrap_or_default();
        if members.is_empty() {
            self.error(format!(
                "Union type {type_name} must define one or more member types."
            ));
            return;
        }

        let mut seen = HashSet::new();
        for member in members {
            let context = format!("Union type {type_name}");
            let Some(definition) = self.resolve(member, &context) else {
                continue;
            };
            let member_name = definition.name_or_placeholder();
            if definition.kind != TypeKind::Object {
                self.error(format!(
                    "Union type {type_name} can only include Object types, it cannot include {member_name}."
                ));
            }
            if !seen.insert(member_name) {
                self.error(format!(
                    "Union type {type_name} can only include type {member_name} once."
                ));
            }
        }
    }

    fn check_enum(&mut self, type_name: &str, ty: &FullType) {
        let values = ty.enum_values.as_deref().unwrap_or_default();
        if values.is_empty() {
            self.error(format!(
                "Enum type {type_name} must define one or more values."
            ));
            return;
        }

        let mut seen = HashSet::new();
        for value in values {
            self.check_name(&value.name, &format!("Enum value {type_name}.{}", value.name));
            if !seen.insert(value.name.as_str()) {
                self.error(format!(
                    "Enum type {type_name} can include value {} only once.",
                    value.name
                ));
            }
        }
    }

    fn check_input_object(&mut self, type_name: &str, ty: &FullType) {
        let fields = ty.input_fields.as_deref().unwrap_or_default();
        if fields.is_empty() {
            self.error(format!(
                "Input Object type {type_name} must define one or more fields."
            ));
            return;
        }

        let mut seen = HashSet::new();
        for field in fields {
            let context = format!("{type_name}.{}", field.name);
            self.check_name(&field.name, &context);
            if !seen.insert(field.name.as_str()) {
                self.error(format!("Input field {context} can only be defined once."));
            }
            self.check_type_position(&field.ty, Position::Input, &context);
        }
    }

    // -- directives -------------------------------------------------------

    fn check_directives(&mut self) {
        let schema = self.schema;
        let mut seen = HashSet::new();
        for directive in &schema.directives {
            let context = format!("@{}", directive.name);
            self.check_name(&directive.name, &format!("Directive {context}"));
            if !seen.insert(directive.name.as_str()) {
                self.error(format!(
                    "Directive {context} can only be defined once."
                ));
            }
            self.check_arguments(&directive.args, &context);
        }
    }
}
