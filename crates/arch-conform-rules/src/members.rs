//! Member-shape predicates.

use arch_conform_core::metadata::{TypeDefinition, TypeRef};
use arch_conform_core::{predicate, FilterFn};

const NULLABLE: &str = "System.Nullable`1";

/// Types whose state cannot change after construction.
///
/// Every field is `readonly` or `const`, every property lacks a setter or
/// has an `init`-only one, and the type declares no events.
#[must_use]
pub fn are_immutable() -> FilterFn {
    predicate(|_, def| is_immutable(def))
}

fn is_immutable(def: &TypeDefinition) -> bool {
    def.fields.iter().all(|f| f.is_readonly || f.is_literal)
        && def.properties.iter().all(|p| !p.has_setter || p.init_only)
        && def.events.is_empty()
}

/// Types whose fields and properties can all hold null.
///
/// Reference types, arrays and `System.Nullable<T>` qualify; value types,
/// pointers and unbound generic parameters do not. Constants are ignored.
#[must_use]
pub fn have_only_nullable_members() -> FilterFn {
    predicate(|ctx, def| {
        def.fields
            .iter()
            .filter(|f| !f.is_literal)
            .map(|f| &f.field_type)
            .chain(def.properties.iter().map(|p| &p.property_type))
            .all(|t| is_nullable(t, |a, b| ctx.names_equal(a, b)))
    })
}

fn is_nullable(type_ref: &TypeRef, names_equal: impl Fn(&str, &str) -> bool) -> bool {
    match type_ref {
        TypeRef::Named(name) => !name.value_type,
        TypeRef::Array { .. } => true,
        TypeRef::Generic { definition, .. } => {
            !definition.value_type || names_equal(&definition.full_name(), NULLABLE)
        }
        TypeRef::Pointer(_) | TypeRef::ByRef(_) | TypeRef::GenericParameter { .. } => false,
    }
}

/// Types declaring no public fields. Public constants count as fields.
#[must_use]
pub fn have_no_public_fields() -> FilterFn {
    predicate(|_, def| !def.fields.iter().any(|f| f.is_public))
}
