//=========================================================================
// Injector Errors
//=========================================================================

use thiserror::Error;

/// Resolution failures.
///
/// All variants indicate a wiring defect. They surface at construction
/// time and are never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InjectError {
    /// No scope between the requesting one and the root provides the type.
    #[error("unresolved dependency `{type_name}` (requested from scope `{scope}`)")]
    UnresolvedDependency {
        type_name: &'static str,
        scope: String,
    },

    /// A parent scope was released while a descendant was still in use.
    #[error("parent of scope `{scope}` was released during lookup of `{type_name}`")]
    ScopeReleased {
        type_name: &'static str,
        scope: String,
    },

    /// A factory produced a value of a different type than it was bound to.
    #[error("binding for `{type_name}` in scope `{scope}` holds a value of another type")]
    TypeMismatch {
        type_name: &'static str,
        scope: String,
    },
}
