//! Namespace slicing.
//!
//! Types under a common prefix are grouped by the first namespace segment
//! after it: with prefix `App.Modules`, `App.Modules.Orders.Api.Controller`
//! lands in slice `Orders`. Types declared directly in the prefix namespace
//! (or outside it) belong to no slice.

use std::collections::BTreeMap;

use tracing::debug;

use crate::dependency::dependency_filter;
use crate::metadata::{MetadataProvider, TypeHandle};
use crate::result::TestResult;
use crate::sequence::{evaluate, CandidateSet, FilterContext, FunctionSequence, Polarity, RuleError};
use crate::strategy::CheckKind;

/// One slice of the type population.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slice {
    /// The segment naming the slice.
    pub name: String,
    /// Full namespace of the slice (`prefix.name`).
    pub namespace: String,
    /// Member types, in provider order.
    pub types: Vec<TypeHandle>,
}

/// Slices built from one prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliceSet {
    prefix: String,
    slices: Vec<Slice>,
}

impl SliceSet {
    /// Groups the provider's types by the segment following `prefix`.
    #[must_use]
    pub fn by_namespace_prefix(
        provider: &dyn MetadataProvider,
        prefix: &str,
        case_sensitive: bool,
    ) -> Self {
        let prefix = prefix.trim_end_matches('.');
        let mut slices: BTreeMap<String, Slice> = BTreeMap::new();

        for handle in provider.handles() {
            let Some(definition) = provider.definition(handle) else {
                continue;
            };
            let Some(name) = slice_segment(&definition.namespace, prefix, case_sensitive) else {
                continue;
            };
            let key = if case_sensitive {
                name.to_string()
            } else {
                name.to_lowercase()
            };
            slices
                .entry(key)
                .or_insert_with(|| Slice {
                    name: name.to_string(),
                    namespace: format!("{prefix}.{name}"),
                    types: Vec::new(),
                })
                .types
                .push(handle);
        }

        debug!("Sliced `{}` into {} slice(s)", prefix, slices.len());
        Self {
            prefix: prefix.to_string(),
            slices: slices.into_values().collect(),
        }
    }

    /// The prefix the slices were cut from.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The slices, ordered by name.
    #[must_use]
    pub fn slices(&self) -> &[Slice] {
        &self.slices
    }

    /// Checks that no slice depends on another.
    ///
    /// Every type of every slice is checked for an `AnyOf` dependency on the
    /// namespaces of the other slices; the failures of all slices are merged.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a filter.
    pub fn check_independent(&self, ctx: &FilterContext<'_>) -> Result<TestResult, RuleError> {
        let mut result = TestResult::success(0);

        for slice in &self.slices {
            let others: Vec<String> = self
                .slices
                .iter()
                .filter(|other| other.namespace != slice.namespace)
                .map(|other| other.namespace.clone())
                .collect();
            if others.is_empty() {
                result.merge(TestResult::success(slice.types.len()));
                continue;
            }

            let mut sequence = FunctionSequence::new();
            sequence.add_filter(dependency_filter(CheckKind::AnyOf, others));
            let mut candidates = CandidateSet::new(slice.types.iter().copied());
            result.merge(evaluate(ctx, &mut candidates, &sequence, Polarity::ShouldNot)?);
        }

        Ok(result)
    }
}

/// Returns the segment after `prefix` when `namespace` extends it.
fn slice_segment<'n>(namespace: &'n str, prefix: &str, case_sensitive: bool) -> Option<&'n str> {
    if namespace.len() <= prefix.len() || !namespace.is_char_boundary(prefix.len()) {
        return None;
    }
    let (head, rest) = namespace.split_at(prefix.len());
    let head_matches = if case_sensitive {
        head == prefix
    } else {
        head.to_lowercase() == prefix.to_lowercase()
    };
    if !head_matches {
        return None;
    }
    rest.strip_prefix('.')?
        .split('.')
        .next()
        .filter(|segment| !segment.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CheckOptions;
    use crate::metadata::{FieldDefinition, TypeDefinition, TypeKind, TypeModel, TypeRef};

    fn ty(namespace: &str, name: &str) -> TypeDefinition {
        TypeDefinition::new(namespace, name, TypeKind::Class)
    }

    fn model(orders_uses_billing: bool) -> TypeModel {
        let mut controller = ty("App.Modules.Orders.Api", "OrdersController");
        if orders_uses_billing {
            controller = controller.with_field(FieldDefinition::new(
                "billing",
                TypeRef::named("App.Modules.Billing.Invoice"),
            ));
        }
        TypeModel::new([
            ty("App.Modules", "ModuleRegistry"),
            controller,
            ty("App.Modules.Orders", "Order"),
            ty("App.Modules.Billing", "Invoice"),
            ty("App.Shared", "Clock"),
        ])
    }

    #[test]
    fn groups_by_first_segment_after_prefix() {
        let model = model(false);
        let slices = SliceSet::by_namespace_prefix(&model, "App.Modules", false);
        let names: Vec<_> = slices.slices().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Billing", "Orders"]);
        assert_eq!(slices.slices()[1].types.len(), 2);
        assert_eq!(slices.slices()[1].namespace, "App.Modules.Orders");
    }

    #[test]
    fn prefix_must_end_at_segment_boundary() {
        assert_eq!(slice_segment("App.ModulesX.A", "App.Modules", true), None);
        assert_eq!(slice_segment("App.Modules", "App.Modules", true), None);
        assert_eq!(slice_segment("app.modules.A.B", "App.Modules", false), Some("A"));
        assert_eq!(slice_segment("app.modules.A", "App.Modules", true), None);
    }

    #[test]
    fn independent_slices_pass() {
        let model = model(false);
        let ctx = FilterContext::new(&model, CheckOptions::default());
        let result = SliceSet::by_namespace_prefix(&model, "App.Modules", false)
            .check_independent(&ctx)
            .unwrap();
        assert!(result.is_successful);
        assert_eq!(result.checked, 3);
    }

    #[test]
    fn cross_slice_dependency_fails() {
        let model = model(true);
        let ctx = FilterContext::new(&model, CheckOptions::default());
        let result = SliceSet::by_namespace_prefix(&model, "App.Modules", false)
            .check_independent(&ctx)
            .unwrap();
        assert!(!result.is_successful);
        assert_eq!(result.failing_names(), vec!["App.Modules.Orders.Api.OrdersController"]);
        assert_eq!(
            result.failing_types[0].explanation.as_deref(),
            Some("has a dependency on App.Modules.Billing.Invoice")
        );
    }
}
