//=========================================================================
// Scope
//=========================================================================
//
// A binding table with an optional, non-owning parent link.
//
// Pattern: provide → resolve (walks to root) → drop owner → released
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::{type_name, Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use log::{debug, trace};

//=== Internal Dependencies ===============================================

use super::{Inject, InjectError};

//=== Binding =============================================================

type Factory = Rc<dyn Fn(&Scope) -> Result<Rc<dyn Any>, InjectError>>;

/// A single type-keyed entry: a shared instance or a transient factory.
#[derive(Clone)]
enum Binding {
    Instance(Rc<dyn Any>),
    Factory(Factory),
}

//=== Scope Storage =======================================================

struct ScopeInner {
    name: String,
    bindings: RefCell<HashMap<TypeId, Binding>>,
    parent: Option<Weak<ScopeInner>>,
}

//=== Scope ===============================================================

/// Handle to a node of the resolution hierarchy.
///
/// Cloning the handle shares the same scope. The scope and all of its
/// bindings live as long as at least one handle does; children only hold
/// a weak link upward, so a child never keeps its parent alive.
#[derive(Clone)]
pub struct Scope {
    inner: Rc<ScopeInner>,
}

impl Scope {
    //--- Construction -----------------------------------------------------

    /// Creates a root scope with no parent.
    pub fn root(name: impl Into<String>) -> Self {
        let name = name.into();
        debug!("Created root scope `{}`", name);
        Self {
            inner: Rc::new(ScopeInner {
                name,
                bindings: RefCell::new(HashMap::new()),
                parent: None,
            }),
        }
    }

    /// Creates an empty child scope whose lookups fall back to `self`.
    pub fn child(&self, name: impl Into<String>) -> Self {
        let name = name.into();
        trace!("Created scope `{}` under `{}`", name, self.inner.name);
        Self {
            inner: Rc::new(ScopeInner {
                name,
                bindings: RefCell::new(HashMap::new()),
                parent: Some(Rc::downgrade(&self.inner)),
            }),
        }
    }

    //--- Registration -----------------------------------------------------

    /// Binds `value` at this scope, replacing any binding for `T` held here.
    ///
    /// Bindings in ancestor scopes are left untouched; they are shadowed
    /// for lookups starting at this scope or below.
    pub fn provide<T: 'static>(&self, value: T) -> Rc<T> {
        let shared = Rc::new(value);
        self.provide_shared(Rc::clone(&shared));
        shared
    }

    /// Binds an already shared instance at this scope.
    pub fn provide_shared<T: 'static>(&self, value: Rc<T>) {
        self.insert::<T>(Binding::Instance(value));
    }

    /// Binds a factory that builds a fresh `T` on every resolution.
    ///
    /// The factory receives the scope the lookup started from, so bindings
    /// shadowed further down the hierarchy are honoured.
    pub fn provide_factory<T, F>(&self, factory: F)
    where
        T: 'static,
        F: Fn(&Scope) -> Result<T, InjectError> + 'static,
    {
        let erased: Factory = Rc::new(move |scope: &Scope| {
            factory(scope).map(|value| Rc::new(value) as Rc<dyn Any>)
        });
        self.insert::<T>(Binding::Factory(erased));
    }

    /// Constructs `T` from this scope and binds it here under its own type.
    pub fn self_provide<T: Inject<Params = ()>>(&self) -> Result<Rc<T>, InjectError> {
        let value = T::inject(self, ())?;
        Ok(self.provide(value))
    }

    //--- Construction Helpers ---------------------------------------------

    /// Builds a new, unregistered `T` in a fresh child scope.
    ///
    /// Every call produces a distinct instance.
    pub fn create<T: Inject<Params = ()>>(&self) -> Result<T, InjectError> {
        self.init::<T>(())
    }

    /// Builds a new, unregistered `T` in a fresh child scope, passing the
    /// call site's domain parameters in the same step.
    pub fn init<T: Inject>(&self, params: T::Params) -> Result<T, InjectError> {
        let scope = self.child(short_type_name::<T>());
        T::inject(&scope, params)
    }

    //--- Resolution -------------------------------------------------------

    /// Returns the nearest binding for `T`, walking from this scope to the root.
    ///
    /// # Errors
    ///
    /// [`InjectError::UnresolvedDependency`] when no scope on the chain
    /// provides `T`.
    pub fn resolve<T: 'static>(&self) -> Result<Rc<T>, InjectError> {
        let binding = self.lookup::<T>()?;

        let erased = match binding {
            Binding::Instance(instance) => instance,
            Binding::Factory(factory) => factory(self)?,
        };

        erased.downcast::<T>().map_err(|_| InjectError::TypeMismatch {
            type_name: type_name::<T>(),
            scope: self.inner.name.clone(),
        })
    }

    /// Returns `true` if `T` resolves from this scope.
    pub fn contains<T: 'static>(&self) -> bool {
        self.lookup::<T>().is_ok()
    }

    /// Returns `true` if this scope itself binds `T` (ancestors ignored).
    pub fn provides_locally<T: 'static>(&self) -> bool {
        self.inner.bindings.borrow().contains_key(&TypeId::of::<T>())
    }

    //--- Introspection ----------------------------------------------------

    /// Returns the scope's diagnostic name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Returns the number of bindings held directly by this scope.
    pub fn len(&self) -> usize {
        self.inner.bindings.borrow().len()
    }

    /// Returns `true` if this scope holds no bindings of its own.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the parent scope if it is still alive.
    pub fn parent(&self) -> Option<Scope> {
        self.inner
            .parent
            .as_ref()
            .and_then(Weak::upgrade)
            .map(|inner| Scope { inner })
    }

    /// Returns `true` if both handles refer to the same scope.
    pub fn ptr_eq(&self, other: &Scope) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    //--- Internal Helpers -------------------------------------------------

    fn insert<T: 'static>(&self, binding: Binding) {
        let replaced = self
            .inner
            .bindings
            .borrow_mut()
            .insert(TypeId::of::<T>(), binding)
            .is_some();

        if replaced {
            debug!("Scope `{}` rebound {}", self.inner.name, type_name::<T>());
        } else {
            trace!("Scope `{}` bound {}", self.inner.name, type_name::<T>());
        }
    }

    fn lookup<T: 'static>(&self) -> Result<Binding, InjectError> {
        let key = TypeId::of::<T>();
        let mut current = Rc::clone(&self.inner);

        loop {
            // Clone the binding out so factories run without a live borrow.
            if let Some(binding) = current.bindings.borrow().get(&key) {
                return Ok(binding.clone());
            }

            let next = match &current.parent {
                None => {
                    return Err(InjectError::UnresolvedDependency {
                        type_name: type_name::<T>(),
                        scope: self.inner.name.clone(),
                    })
                }
                Some(parent) => parent.upgrade().ok_or_else(|| InjectError::ScopeReleased {
                    type_name: type_name::<T>(),
                    scope: current.name.clone(),
                })?,
            };

            current = next;
        }
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("name", &self.inner.name)
            .field("bindings", &self.len())
            .field("has_parent", &self.inner.parent.is_some())
            .finish()
    }
}

fn short_type_name<T>() -> &'static str {
    let full = type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Debug, PartialEq)]
    struct Volume(u8);

    #[derive(Debug, PartialEq)]
    struct Title(&'static str);

    struct Mixer {
        volume: Rc<Volume>,
        scope: Scope,
    }

    impl Inject for Mixer {
        type Params = ();

        fn inject(scope: &Scope, _: ()) -> Result<Self, InjectError> {
            Ok(Self {
                volume: scope.resolve::<Volume>()?,
                scope: scope.clone(),
            })
        }
    }

    struct Labelled {
        title: Rc<Title>,
        label: String,
    }

    impl Inject for Labelled {
        type Params = String;

        fn inject(scope: &Scope, label: String) -> Result<Self, InjectError> {
            Ok(Self {
                title: scope.resolve::<Title>()?,
                label,
            })
        }
    }

    //--- Resolution -------------------------------------------------------

    #[test]
    fn resolve_returns_local_binding() {
        let root = Scope::root("root");
        root.provide(Volume(7));
        assert_eq!(*root.resolve::<Volume>().unwrap(), Volume(7));
    }

    #[test]
    fn resolve_walks_to_ancestors() {
        let root = Scope::root("root");
        root.provide(Volume(3));
        let child = root.child("child");
        let grandchild = child.child("grandchild");

        assert_eq!(*grandchild.resolve::<Volume>().unwrap(), Volume(3));
    }

    #[test]
    fn nearest_binding_wins() {
        let root = Scope::root("root");
        root.provide(Volume(1));
        let child = root.child("child");
        child.provide(Volume(2));

        assert_eq!(*child.resolve::<Volume>().unwrap(), Volume(2));
        assert_eq!(*root.resolve::<Volume>().unwrap(), Volume(1));
    }

    #[test]
    fn missing_binding_is_unresolved() {
        let root = Scope::root("root");
        let child = root.child("child");

        match child.resolve::<Volume>() {
            Err(InjectError::UnresolvedDependency { scope, type_name }) => {
                assert_eq!(scope, "child");
                assert!(type_name.ends_with("Volume"));
            }
            other => panic!("expected unresolved dependency, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn provide_overwrites_only_current_scope() {
        let root = Scope::root("root");
        root.provide(Volume(1));
        let child = root.child("child");
        child.provide(Volume(2));
        child.provide(Volume(5));

        assert_eq!(*child.resolve::<Volume>().unwrap(), Volume(5));
        assert_eq!(*root.resolve::<Volume>().unwrap(), Volume(1));
        assert_eq!(child.len(), 1);
    }

    #[test]
    fn instance_binding_is_shared() {
        let root = Scope::root("root");
        root.provide(Volume(9));

        let a = root.resolve::<Volume>().unwrap();
        let b = root.child("c").resolve::<Volume>().unwrap();
        assert!(Rc::ptr_eq(&a, &b));
    }

    #[test]
    fn factory_builds_fresh_value_each_time() {
        let root = Scope::root("root");
        let counter = Rc::new(Cell::new(0u8));
        let seen = Rc::clone(&counter);
        root.provide_factory(move |_| {
            seen.set(seen.get() + 1);
            Ok(Volume(seen.get()))
        });

        assert_eq!(*root.resolve::<Volume>().unwrap(), Volume(1));
        assert_eq!(*root.resolve::<Volume>().unwrap(), Volume(2));
        assert_eq!(counter.get(), 2);
    }

    #[test]
    fn factory_resolves_from_requesting_scope() {
        let root = Scope::root("root");
        root.provide(Title("root"));
        root.provide_factory(|scope| Ok(Volume(scope.resolve::<Title>()?.0.len() as u8)));

        let child = root.child("child");
        child.provide(Title("child!"));

        assert_eq!(*child.resolve::<Volume>().unwrap(), Volume(6));
        assert_eq!(*root.resolve::<Volume>().unwrap(), Volume(4));
    }

    //--- Construction -----------------------------------------------------

    #[test]
    fn self_provide_binds_constructed_instance() {
        let root = Scope::root("root");
        root.provide(Volume(4));

        let mixer = root.self_provide::<Mixer>().unwrap();
        let resolved = root.resolve::<Mixer>().unwrap();
        assert!(Rc::ptr_eq(&mixer, &resolved));
        assert_eq!(*resolved.volume, Volume(4));
    }

    #[test]
    fn create_is_transient_and_unregistered() {
        let root = Scope::root("root");
        root.provide(Volume(4));

        let a = root.create::<Mixer>().unwrap();
        let b = root.create::<Mixer>().unwrap();

        assert!(!a.scope.ptr_eq(&b.scope));
        assert!(!root.contains::<Mixer>());
        assert!(a.scope.parent().unwrap().ptr_eq(&root));
        assert_eq!(a.scope.name(), "Mixer");
    }

    #[test]
    fn create_fails_fast_on_missing_dependency() {
        let root = Scope::root("root");
        assert!(matches!(
            root.create::<Mixer>(),
            Err(InjectError::UnresolvedDependency { .. })
        ));
    }

    #[test]
    fn init_passes_domain_parameters() {
        let root = Scope::root("root");
        root.provide(Title("map"));

        let built = root.init::<Labelled>("hero".to_string()).unwrap();
        assert_eq!(*built.title, Title("map"));
        assert_eq!(built.label, "hero");
    }

    //--- Lifetime ---------------------------------------------------------

    #[test]
    fn dropping_scope_releases_its_bindings() {
        let root = Scope::root("root");
        let child = root.child("child");
        let volume = child.provide(Volume(1));

        assert_eq!(Rc::strong_count(&volume), 2);
        drop(child);
        assert_eq!(Rc::strong_count(&volume), 1);
    }

    #[test]
    fn child_does_not_keep_parent_alive() {
        let root = Scope::root("root");
        root.provide(Volume(1));
        let child = root.child("child");

        drop(root);

        assert!(child.parent().is_none());
        assert!(matches!(
            child.resolve::<Volume>(),
            Err(InjectError::ScopeReleased { .. })
        ));
    }

    #[test]
    fn provides_locally_ignores_ancestors() {
        let root = Scope::root("root");
        root.provide(Volume(1));
        let child = root.child("child");

        assert!(child.contains::<Volume>());
        assert!(!child.provides_locally::<Volume>());
        assert!(root.provides_locally::<Volume>());
    }
}
