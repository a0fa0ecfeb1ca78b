//! Declared types and their members.
//!
//! Every collection defaults to empty when absent from a metadata dump, so a
//! definition with missing sub-structure simply "has none of that category".

use serde::{Deserialize, Serialize};

use super::type_ref::{TypeName, TypeRef, NESTED_SEPARATOR};

/// Full name of the marker attribute the compiler puts on synthesised types.
pub const COMPILER_GENERATED_ATTRIBUTE: &str =
    "System.Runtime.CompilerServices.CompilerGeneratedAttribute";

/// Debug-symbol line number marking compiler-hidden sequence points.
pub const HIDDEN_LINE: u32 = 0x00FE_EFEE;

/// The category of a declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    /// Reference type.
    #[default]
    Class,
    /// Value type.
    Struct,
    /// Interface.
    Interface,
    /// Enumeration.
    Enum,
    /// Delegate type.
    Delegate,
}

impl std::fmt::Display for TypeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Class => write!(f, "class"),
            Self::Struct => write!(f, "struct"),
            Self::Interface => write!(f, "interface"),
            Self::Enum => write!(f, "enum"),
            Self::Delegate => write!(f, "delegate"),
        }
    }
}

/// A custom attribute application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// The attribute type.
    #[serde(rename = "type")]
    pub attribute_type: TypeRef,
    /// Types passed as `typeof(..)` constructor or named arguments.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_arguments: Vec<TypeRef>,
}

impl Attribute {
    /// Creates an attribute without type arguments.
    #[must_use]
    pub fn new(attribute_type: TypeRef) -> Self {
        Self {
            attribute_type,
            type_arguments: Vec::new(),
        }
    }

    /// Full name of the attribute type.
    #[must_use]
    pub fn full_name(&self) -> Option<String> {
        self.attribute_type.element_full_name()
    }
}

/// A generic parameter declaration with its constraints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericParameter {
    /// Parameter name.
    pub name: String,
    /// Constraint types.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<TypeRef>,
}

/// A constant value stored in metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConstantValue {
    /// Boolean constant.
    Bool(bool),
    /// Integral constant.
    Integer(i64),
    /// Floating point constant.
    Float(f64),
    /// String literal.
    String(String),
}

impl ConstantValue {
    /// Returns the string literal, if this is one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

/// A field declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Field name.
    pub name: String,
    /// Field type.
    #[serde(rename = "type")]
    pub field_type: TypeRef,
    /// Attributes applied to the field.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
    /// Publicly visible.
    #[serde(default)]
    pub is_public: bool,
    /// Static field.
    #[serde(default)]
    pub is_static: bool,
    /// Init-only (`readonly`).
    #[serde(default)]
    pub is_readonly: bool,
    /// Compile-time constant (`const`).
    #[serde(default)]
    pub is_literal: bool,
    /// Value of a literal field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constant: Option<ConstantValue>,
}

impl FieldDefinition {
    /// Creates a private instance field.
    #[must_use]
    pub fn new(name: impl Into<String>, field_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            field_type,
            attributes: Vec::new(),
            is_public: false,
            is_static: false,
            is_readonly: false,
            is_literal: false,
            constant: None,
        }
    }

    /// Creates a `const string` field.
    #[must_use]
    pub fn string_constant(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            is_static: true,
            is_literal: true,
            constant: Some(ConstantValue::String(value.into())),
            ..Self::new(name, TypeRef::named("System.String"))
        }
    }
}

/// A property declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDefinition {
    /// Property name.
    pub name: String,
    /// Property type.
    #[serde(rename = "type")]
    pub property_type: TypeRef,
    /// Attributes applied to the property.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
    /// Publicly visible.
    #[serde(default)]
    pub is_public: bool,
    /// Has a setter.
    #[serde(default)]
    pub has_setter: bool,
    /// The setter is `init`-only.
    #[serde(default)]
    pub init_only: bool,
}

impl PropertyDefinition {
    /// Creates a public get-only property.
    #[must_use]
    pub fn new(name: impl Into<String>, property_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            property_type,
            attributes: Vec::new(),
            is_public: true,
            has_setter: false,
            init_only: false,
        }
    }
}

/// An event declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDefinition {
    /// Event name.
    pub name: String,
    /// Delegate type of the event.
    #[serde(rename = "type")]
    pub event_type: TypeRef,
    /// Attributes applied to the event.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
    /// Add / remove / raise methods.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accessors: Vec<MethodDefinition>,
}

/// A method parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name.
    #[serde(default)]
    pub name: String,
    /// Parameter type.
    #[serde(rename = "type")]
    pub parameter_type: TypeRef,
    /// Attributes applied to the parameter.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
}

/// A type referenced by an instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Operand {
    /// `newarr`, `castclass`, `box`, `ldtoken` and friends.
    Type {
        /// The referenced type.
        #[serde(rename = "type")]
        type_ref: TypeRef,
    },
    /// `ldfld`, `stsfld` and friends.
    Field {
        /// Type declaring the field.
        declaring_type: TypeRef,
        /// Field name.
        name: String,
        /// Field type.
        #[serde(rename = "type")]
        field_type: TypeRef,
    },
    /// `call`, `callvirt`, `newobj` and friends.
    Method {
        /// Type declaring the method.
        declaring_type: TypeRef,
        /// Method name.
        name: String,
        /// Return type.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        return_type: Option<TypeRef>,
        /// Parameter types.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        parameters: Vec<TypeRef>,
        /// Method-level generic arguments of the call site.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        generic_arguments: Vec<TypeRef>,
    },
}

/// One instruction of a method body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    /// Opcode mnemonic.
    pub opcode: String,
    /// Metadata operand, if the opcode takes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operand: Option<Operand>,
}

impl Instruction {
    /// Creates an instruction with a metadata operand.
    #[must_use]
    pub fn new(opcode: impl Into<String>, operand: Operand) -> Self {
        Self {
            opcode: opcode.into(),
            operand: Some(operand),
        }
    }
}

/// A debug-symbol sequence point.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SequencePoint {
    /// Source document path.
    pub document: String,
    /// Start line (1-indexed, [`HIDDEN_LINE`] for hidden points).
    pub line: u32,
}

/// A method declaration including its body.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MethodDefinition {
    /// Method name.
    pub name: String,
    /// Attributes applied to the method.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
    /// Method-level generic parameters.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generic_parameters: Vec<GenericParameter>,
    /// Return type (`None` for `void`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<TypeRef>,
    /// Parameters.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    /// Local variable types.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locals: Vec<TypeRef>,
    /// Body instructions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub instructions: Vec<Instruction>,
    /// Debug sequence points.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sequence_points: Vec<SequencePoint>,
    /// Publicly visible.
    #[serde(default)]
    pub is_public: bool,
    /// Static method.
    #[serde(default)]
    pub is_static: bool,
}

impl MethodDefinition {
    /// Creates an empty `void` method.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the return type.
    #[must_use]
    pub fn returning(mut self, return_type: TypeRef) -> Self {
        self.return_type = Some(return_type);
        self
    }

    /// Adds a parameter.
    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, parameter_type: TypeRef) -> Self {
        self.parameters.push(Parameter {
            name: name.into(),
            parameter_type,
            attributes: Vec::new(),
        });
        self
    }

    /// Adds a local variable.
    #[must_use]
    pub fn with_local(mut self, local: TypeRef) -> Self {
        self.locals.push(local);
        self
    }

    /// Adds an instruction.
    #[must_use]
    pub fn with_instruction(mut self, instruction: Instruction) -> Self {
        self.instructions.push(instruction);
        self
    }
}

/// A declared type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDefinition {
    /// Namespace (empty for the global namespace; the outermost declaring
    /// type's namespace for nested types).
    #[serde(default)]
    pub namespace: String,
    /// Name (`Outer/Inner` for nested types).
    pub name: String,
    /// Type category.
    #[serde(default)]
    pub kind: TypeKind,
    /// Publicly visible.
    #[serde(default)]
    pub is_public: bool,
    /// Abstract (static classes are abstract and sealed).
    #[serde(default)]
    pub is_abstract: bool,
    /// Sealed.
    #[serde(default)]
    pub is_sealed: bool,
    /// Base type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<TypeRef>,
    /// Implemented interfaces.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<TypeRef>,
    /// Type-level generic parameters.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generic_parameters: Vec<GenericParameter>,
    /// Attributes applied to the type.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
    /// Fields.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldDefinition>,
    /// Properties.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<PropertyDefinition>,
    /// Events.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<EventDefinition>,
    /// Methods, constructors and accessors.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<MethodDefinition>,
    /// Full names of directly nested types.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nested_types: Vec<String>,
}

impl TypeDefinition {
    /// Creates an empty public type.
    #[must_use]
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            kind,
            is_public: true,
            is_abstract: false,
            is_sealed: false,
            base: None,
            interfaces: Vec::new(),
            generic_parameters: Vec::new(),
            attributes: Vec::new(),
            fields: Vec::new(),
            properties: Vec::new(),
            events: Vec::new(),
            methods: Vec::new(),
            nested_types: Vec::new(),
        }
    }

    /// Creates an empty public class deriving from `System.Object`.
    #[must_use]
    pub fn class(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(namespace, name, TypeKind::Class).with_base(TypeRef::named("System.Object"))
    }

    /// Returns `Namespace.Name`.
    #[must_use]
    pub fn full_name(&self) -> String {
        TypeName::new(self.namespace.as_str(), self.name.as_str()).full_name()
    }

    /// Returns the innermost simple name.
    #[must_use]
    pub fn simple_name(&self) -> &str {
        self.name
            .rsplit(NESTED_SEPARATOR)
            .next()
            .unwrap_or(&self.name)
    }

    /// Whether this type is declared inside another type.
    #[must_use]
    pub fn is_nested(&self) -> bool {
        self.name.contains(NESTED_SEPARATOR)
    }

    /// Static classes are abstract sealed classes.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.kind == TypeKind::Class && self.is_abstract && self.is_sealed
    }

    /// Whether this type was synthesised by the compiler (closures, iterators).
    #[must_use]
    pub fn is_compiler_generated(&self) -> bool {
        self.simple_name().starts_with('<')
            || self.has_attribute(COMPILER_GENERATED_ATTRIBUTE, true)
    }

    /// Whether an attribute with the given full name is applied to this type.
    #[must_use]
    pub fn has_attribute(&self, full_name: &str, case_sensitive: bool) -> bool {
        self.attributes.iter().any(|a| {
            a.full_name()
                .is_some_and(|n| names_equal(&n, full_name, case_sensitive))
        })
    }

    /// Sets the base type.
    #[must_use]
    pub fn with_base(mut self, base: TypeRef) -> Self {
        self.base = Some(base);
        self
    }

    /// Adds an implemented interface.
    #[must_use]
    pub fn with_interface(mut self, interface: TypeRef) -> Self {
        self.interfaces.push(interface);
        self
    }

    /// Adds a type-level attribute.
    #[must_use]
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Adds a generic parameter.
    #[must_use]
    pub fn with_generic_parameter(mut self, parameter: GenericParameter) -> Self {
        self.generic_parameters.push(parameter);
        self
    }

    /// Adds a field.
    #[must_use]
    pub fn with_field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }

    /// Adds a property.
    #[must_use]
    pub fn with_property(mut self, property: PropertyDefinition) -> Self {
        self.properties.push(property);
        self
    }

    /// Adds an event.
    #[must_use]
    pub fn with_event(mut self, event: EventDefinition) -> Self {
        self.events.push(event);
        self
    }

    /// Adds a method.
    #[must_use]
    pub fn with_method(mut self, method: MethodDefinition) -> Self {
        self.methods.push(method);
        self
    }

    /// Registers a nested type by full name.
    #[must_use]
    pub fn with_nested(mut self, full_name: impl Into<String>) -> Self {
        self.nested_types.push(full_name.into());
        self
    }
}

/// Compares two names under the configured case sensitivity.
#[must_use]
pub fn names_equal(a: &str, b: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        a == b
    } else {
        a.to_lowercase() == b.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_class_is_abstract_and_sealed() {
        let mut def = TypeDefinition::class("App", "Helpers");
        assert!(!def.is_static());
        def.is_abstract = true;
        def.is_sealed = true;
        assert!(def.is_static());
    }

    #[test]
    fn compiler_generated_by_name_or_marker() {
        let closure = TypeDefinition::class("App", "Worker/<>c");
        assert!(closure.is_compiler_generated());
        assert!(closure.is_nested());
        assert_eq!(closure.simple_name(), "<>c");

        let marked = TypeDefinition::class("App", "Generated").with_attribute(Attribute::new(
            TypeRef::named(COMPILER_GENERATED_ATTRIBUTE),
        ));
        assert!(marked.is_compiler_generated());

        assert!(!TypeDefinition::class("App", "Worker").is_compiler_generated());
    }

    #[test]
    fn deserializes_with_missing_collections() {
        let json = r#"{ "namespace": "App.Core", "name": "Order", "kind": "struct" }"#;
        let def: TypeDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(def.full_name(), "App.Core.Order");
        assert_eq!(def.kind, TypeKind::Struct);
        assert!(def.base.is_none());
        assert!(def.methods.is_empty());
    }

    #[test]
    fn deserializes_instruction_operands() {
        let json = r#"{
            "name": "Run",
            "instructions": [
                { "opcode": "newobj", "operand": { "kind": "method", "declaring_type": "App.Data.Repo", "name": ".ctor" } },
                { "opcode": "ldfld", "operand": { "kind": "field", "declaring_type": "App.Core.Order", "name": "id", "type": "valuetype System.Int32" } },
                { "opcode": "ret" }
            ]
        }"#;
        let method: MethodDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(method.instructions.len(), 3);
        assert!(matches!(
            method.instructions[0].operand,
            Some(Operand::Method { .. })
        ));
        assert!(method.instructions[2].operand.is_none());
    }

    #[test]
    fn case_insensitive_name_comparison() {
        assert!(names_equal("App.Core", "app.core", false));
        assert!(!names_equal("App.Core", "app.core", true));
    }
}
