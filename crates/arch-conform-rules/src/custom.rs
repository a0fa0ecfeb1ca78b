//! User-supplied predicates.

use arch_conform_core::metadata::TypeDefinition;
use arch_conform_core::{predicate, try_predicate, FilterFn, RuleError};

/// Wraps an infallible callback.
pub fn custom<F>(f: F) -> FilterFn
where
    F: Fn(&TypeDefinition) -> bool + Send + Sync + 'static,
{
    predicate(move |_, def| f(def))
}

/// Wraps a fallible callback. The first error aborts the evaluation and is
/// returned unchanged inside [`RuleError::Callback`].
pub fn try_custom<F, E>(f: F) -> FilterFn
where
    F: Fn(&TypeDefinition) -> Result<bool, E> + Send + Sync + 'static,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    try_predicate(move |_, def| f(def).map_err(|e| RuleError::Callback(e.into())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{selected, try_selected};
    use arch_conform_core::metadata::TypeModel;

    #[derive(Debug, thiserror::Error)]
    #[error("metadata for {0} is incomplete")]
    struct Incomplete(String);

    fn model() -> TypeModel {
        TypeModel::new([
            TypeDefinition::class("App", "Short"),
            TypeDefinition::class("App", "MuchLongerName"),
        ])
    }

    #[test]
    fn custom_callback_selects() {
        let model = model();
        assert_eq!(
            selected(&model, custom(|def| def.name.len() > 5)),
            vec!["App.MuchLongerName"]
        );
    }

    #[test]
    fn callback_error_propagates_unchanged() {
        let model = model();
        let err = try_selected(
            &model,
            try_custom(|def| {
                if def.name == "Short" {
                    Err(Incomplete(def.full_name()))
                } else {
                    Ok(true)
                }
            }),
        )
        .unwrap_err();
        let RuleError::Callback(inner) = err else {
            panic!("expected callback error");
        };
        assert!(inner.downcast_ref::<Incomplete>().is_some());
        assert_eq!(inner.to_string(), "metadata for App.Short is incomplete");
    }
}
