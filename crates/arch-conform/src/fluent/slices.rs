//! Slice rules.

use arch_conform_core::{RuleError, SliceSet, TestResult};

use super::Types;

/// Slicing stage: choose how types are grouped.
#[derive(Debug)]
pub struct Slices<'m> {
    types: Types<'m>,
}

impl<'m> Slices<'m> {
    pub(super) fn new(types: Types<'m>) -> Self {
        Self { types }
    }

    /// One slice per namespace segment directly below `prefix`.
    #[must_use]
    pub fn by_namespace_prefix(self, prefix: impl Into<String>) -> SliceRule<'m> {
        SliceRule {
            types: self.types,
            prefix: prefix.into(),
        }
    }
}

/// Slices chosen by a namespace prefix.
#[derive(Debug)]
pub struct SliceRule<'m> {
    types: Types<'m>,
    prefix: String,
}

impl<'m> SliceRule<'m> {
    /// Starts the slice condition.
    #[must_use]
    pub fn should(self) -> SliceConditions<'m> {
        SliceConditions {
            rule: self,
            independent: false,
        }
    }

    /// The slices as currently computed.
    #[must_use]
    pub fn get_slices(&self) -> SliceSet {
        SliceSet::by_namespace_prefix(
            self.types.provider(),
            &self.prefix,
            self.types.options().case_sensitive,
        )
    }
}

/// Conditions over slices.
#[derive(Debug)]
pub struct SliceConditions<'m> {
    rule: SliceRule<'m>,
    independent: bool,
}

impl SliceConditions<'_> {
    /// No type in one slice may depend on another slice.
    #[must_use]
    pub fn not_have_dependencies_between_slices(mut self) -> Self {
        self.independent = true;
        self
    }

    /// Evaluates the slice conditions.
    ///
    /// Without a condition every sliced type passes.
    ///
    /// # Errors
    ///
    /// Returns the first error raised while searching dependencies.
    pub fn get_result(&self) -> Result<TestResult, RuleError> {
        let slices = self.rule.get_slices();
        if self.independent {
            slices.check_independent(&self.rule.types.context())
        } else {
            Ok(TestResult::success(
                slices.slices().iter().map(|s| s.types.len()).sum(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arch_conform_core::metadata::{TypeDefinition, TypeModel, TypeRef};

    fn model() -> TypeModel {
        TypeModel::new([
            TypeDefinition::class("App.Modules.Orders", "OrderService")
                .with_base(TypeRef::parse("App.Modules.Billing.Invoice").unwrap()),
            TypeDefinition::class("App.Modules.Billing", "Invoice"),
            TypeDefinition::class("App.Modules.Shipping", "Parcel"),
            TypeDefinition::class("App.Modules", "ModuleRegistry")
                .with_base(TypeRef::parse("App.Modules.Orders.OrderService").unwrap()),
        ])
    }

    #[test]
    fn cross_slice_dependency_fails() {
        let model = model();
        let result = Types::in_model(&model)
            .slice()
            .by_namespace_prefix("App.Modules")
            .should()
            .not_have_dependencies_between_slices()
            .get_result()
            .unwrap();

        assert!(!result.is_successful);
        assert_eq!(result.checked, 3);
        assert_eq!(
            result.failing_names(),
            vec!["App.Modules.Orders.OrderService"]
        );
    }

    #[test]
    fn slices_are_listed() {
        let model = model();
        let rule = Types::in_model(&model).slice().by_namespace_prefix("App.Modules");
        let names: Vec<_> = rule
            .get_slices()
            .slices()
            .iter()
            .map(|s| s.name.clone())
            .collect();
        assert_eq!(names, vec!["Billing", "Orders", "Shipping"]);
    }

    #[test]
    fn no_condition_passes() {
        let model = model();
        let result = Types::in_model(&model)
            .slice()
            .by_namespace_prefix("App.Modules")
            .should()
            .get_result()
            .unwrap();
        assert!(result.is_successful);
    }
}
