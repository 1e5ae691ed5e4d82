//=========================================================================
// Resolution Container
//=========================================================================
//
// Hierarchical service registry keyed by type.
//
// Architecture:
//   Scope (root)
//     ├─ bindings: HashMap<TypeId, Binding>
//     └─ Scope (child) ──weak──> parent
//           └─ Scope (grandchild) ──weak──> child
//
// Lookups walk the parent chain. A scope is released when the component
// that owns it drops its handle, taking every binding it holds with it.
//
//=========================================================================

//=== Module Declarations =================================================

mod error;
mod scope;

//=== Public API ==========================================================

pub use error::InjectError;
pub use scope::Scope;

//=== Inject Trait ========================================================

/// Single-step construction from a scope plus per-use parameters.
///
/// Dependencies are resolved from `scope` and domain data arrives in
/// `params` within the same call, so a value is never observable in a
/// wired-but-uninitialized state. Components with no domain data use
/// `Params = ()`.
///
/// The scope handed to `inject` is a fresh child scope created for the
/// component. Keep a clone of it to own it; drop it to release it.
///
/// ```
/// # use tilewalk::core::injector::{Inject, InjectError, Scope};
/// struct Greeting(String);
///
/// struct Greeter {
///     greeting: std::rc::Rc<Greeting>,
///     name: String,
/// }
///
/// impl Inject for Greeter {
///     type Params = String;
///
///     fn inject(scope: &Scope, name: String) -> Result<Self, InjectError> {
///         Ok(Self { greeting: scope.resolve::<Greeting>()?, name })
///     }
/// }
///
/// let root = Scope::root("app");
/// root.provide(Greeting("hello".into()));
/// let greeter = root.init::<Greeter>("world".into()).unwrap();
/// assert_eq!(greeter.greeting.0, "hello");
/// ```
pub trait Inject: Sized + 'static {
    /// Domain data supplied by the call site.
    type Params;

    /// Builds the component, resolving its dependencies from `scope`.
    fn inject(scope: &Scope, params: Self::Params) -> Result<Self, InjectError>;
}
