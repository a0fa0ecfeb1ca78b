//! Name folding and pattern compilation shared by the predicates.

use std::borrow::Cow;

use arch_conform_core::{CheckOptions, RuleError};
use regex::{Regex, RegexBuilder};

/// Lower-cases `value` unless matching is case-sensitive.
pub(crate) fn fold(value: &str, options: CheckOptions) -> Cow<'_, str> {
    if options.case_sensitive {
        Cow::Borrowed(value)
    } else {
        Cow::Owned(value.to_lowercase())
    }
}

/// Compiles a user pattern honouring case sensitivity.
pub(crate) fn compile(pattern: &str, options: CheckOptions) -> Result<Regex, RuleError> {
    RegexBuilder::new(pattern)
        .case_insensitive(!options.case_sensitive)
        .build()
        .map_err(|e| RuleError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })
}

/// Whether `namespace` equals `prefix` or lies below it.
pub(crate) fn is_within(namespace: &str, prefix: &str, options: CheckOptions) -> bool {
    let namespace = fold(namespace, options);
    let prefix = fold(prefix.trim_end_matches('.'), options);
    namespace == prefix
        || (namespace.starts_with(prefix.as_ref())
            && namespace[prefix.len()..].starts_with('.'))
}
