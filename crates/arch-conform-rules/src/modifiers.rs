//! Kind and modifier predicates.

use arch_conform_core::metadata::TypeKind;
use arch_conform_core::{predicate, FilterFn};

fn of_kind(kind: TypeKind) -> FilterFn {
    predicate(move |_, def| def.kind == kind)
}

/// Classes.
#[must_use]
pub fn are_classes() -> FilterFn {
    of_kind(TypeKind::Class)
}

/// Interfaces.
#[must_use]
pub fn are_interfaces() -> FilterFn {
    of_kind(TypeKind::Interface)
}

/// Structs.
#[must_use]
pub fn are_structs() -> FilterFn {
    of_kind(TypeKind::Struct)
}

/// Enums.
#[must_use]
pub fn are_enums() -> FilterFn {
    of_kind(TypeKind::Enum)
}

/// Delegates.
#[must_use]
pub fn are_delegates() -> FilterFn {
    of_kind(TypeKind::Delegate)
}

/// Abstract types. Static classes are excluded.
#[must_use]
pub fn are_abstract() -> FilterFn {
    predicate(|_, def| def.is_abstract && !def.is_sealed)
}

/// Sealed types. Static classes are excluded.
#[must_use]
pub fn are_sealed() -> FilterFn {
    predicate(|_, def| def.is_sealed && !def.is_abstract)
}

/// Static classes.
#[must_use]
pub fn are_static() -> FilterFn {
    predicate(|_, def| def.is_static())
}

/// Types declared inside another type.
#[must_use]
pub fn are_nested() -> FilterFn {
    predicate(|_, def| def.is_nested())
}

/// Publicly visible types.
#[must_use]
pub fn are_public() -> FilterFn {
    predicate(|_, def| def.is_public)
}

/// Generic type definitions.
#[must_use]
pub fn are_generic() -> FilterFn {
    predicate(|_, def| !def.generic_parameters.is_empty())
}
