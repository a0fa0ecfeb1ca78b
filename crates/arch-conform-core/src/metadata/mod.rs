//! Type metadata consumed by the engine.
//!
//! The engine never parses binary modules itself. It reads declared types
//! through a [`MetadataProvider`]; [`TypeModel`] is the in-tree provider,
//! built programmatically or loaded from JSON dumps.
//!
//! ```text
//! JSON dump(s)
//!   ↓ serde (TypeRef parsed from its string syntax)
//! TypeModel (handles + name index)
//!   ↓ MetadataProvider
//! walker / predicates
//! ```

mod definition;
mod model;
mod type_ref;

pub use definition::{
    names_equal, Attribute, ConstantValue, EventDefinition, FieldDefinition, GenericParameter,
    Instruction, MethodDefinition, Operand, Parameter, PropertyDefinition, SequencePoint,
    TypeDefinition, TypeKind, COMPILER_GENERATED_ATTRIBUTE, HIDDEN_LINE,
};
pub use model::{LoadError, MetadataProvider, TypeHandle, TypeModel};
pub use type_ref::{TypeName, TypeRef, TypeRefParseError, NESTED_SEPARATOR};
