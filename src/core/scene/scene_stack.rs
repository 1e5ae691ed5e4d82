//=========================================================================
// Scene Stack
//=========================================================================
//
// Owns the ordered stack of live scenes and drives their lifecycle.
//
// Scenes are registered as constructors by key. Every push builds a
// fresh scene inside a new child scope; every pop tears it down
// completely. Only the top scene is Started, everything below is Ended.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;
use std::time::Duration;

use log::{debug, error, info, warn};
use thiserror::Error;

//=== Internal Dependencies ===============================================

use super::{Scene, SceneKey, SceneState, SceneTransition};
use crate::core::globals::{GlobalContext, Viewport};
use crate::core::injector::{Inject, InjectError, Scope};

//=== Scene Error =========================================================

/// Scene stack misuse and construction failures.
///
/// These are programmer errors: reported immediately, never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneError {
    #[error("cannot pop: the scene stack is empty")]
    EmptyStack,

    #[error("scene {0} is already on the stack")]
    AlreadyOnStack(String),

    #[error("scene {0} was never registered")]
    Unregistered(String),

    #[error("scene {scene} cannot go from {from:?} to {to:?}")]
    InvalidTransition {
        scene: String,
        from: SceneState,
        to: SceneState,
    },

    #[error("scene {scene} failed to initialize: {reason}")]
    InitFailed { scene: String, reason: String },

    #[error(transparent)]
    Inject(#[from] InjectError),
}

//=== Scene Entry =========================================================

type SceneFactory<S> = Box<dyn Fn(&Scope) -> Result<Box<dyn Scene<S>>, InjectError>>;

/// A live scene plus its tracked lifecycle state.
struct SceneEntry<S: SceneKey> {
    key: S,
    state: SceneState,
    scene: Box<dyn Scene<S>>,
}

impl<S: SceneKey> SceneEntry<S> {
    fn advance(&mut self, next: SceneState) -> Result<(), SceneError> {
        if !self.state.can_transition_to(next) {
            return Err(SceneError::InvalidTransition {
                scene: format!("{:?}", self.key),
                from: self.state,
                to: next,
            });
        }

        debug!("Scene {:?}: {:?} -> {:?}", self.key, self.state, next);
        self.state = next;
        Ok(())
    }

    fn start(&mut self, context: &mut GlobalContext<S>) -> Result<(), SceneError> {
        self.advance(SceneState::Started)?;
        self.scene.on_start(context);
        Ok(())
    }

    fn end(&mut self, context: &mut GlobalContext<S>) -> Result<(), SceneError> {
        self.advance(SceneState::Ended)?;
        self.scene.on_end(context);
        Ok(())
    }

    fn destroy(&mut self, context: &mut GlobalContext<S>) -> Result<(), SceneError> {
        self.advance(SceneState::Destroyed)?;
        self.scene.on_destroy(context);
        Ok(())
    }
}

//=== Scene Stack =========================================================

/// Stack-based scene lifecycle manager.
///
/// Invariant: when the stack is non-empty, exactly the top scene is
/// [`SceneState::Started`] and every scene below it is
/// [`SceneState::Ended`].
pub struct SceneStack<S: SceneKey> {
    scope: Scope,
    factories: HashMap<S, SceneFactory<S>>,
    stack: Vec<SceneEntry<S>>,
}

impl<S: SceneKey> SceneStack<S> {
    //--- Construction -----------------------------------------------------

    /// Creates an empty stack whose scenes are built under `scope`.
    pub fn new(scope: Scope) -> Self {
        Self {
            scope,
            factories: HashMap::new(),
            stack: Vec::new(),
        }
    }

    //--- Registration -----------------------------------------------------

    /// Registers `T` as the scene built for `key`.
    pub fn register<T>(&mut self, key: S)
    where
        T: Scene<S> + Inject<Params = ()>,
    {
        self.register_with(key, |scope| {
            let scene = scope.create::<T>()?;
            Ok(Box::new(scene) as Box<dyn Scene<S>>)
        });
    }

    /// Registers a custom constructor for `key`.
    ///
    /// The factory receives the stack's scope and is expected to build the
    /// scene in a child of it.
    pub fn register_with<F>(&mut self, key: S, factory: F)
    where
        F: Fn(&Scope) -> Result<Box<dyn Scene<S>>, InjectError> + 'static,
    {
        if self.factories.insert(key, Box::new(factory)).is_some() {
            warn!("Scene {:?} was already registered and has been replaced", key);
        }
    }

    //--- Stack Operations -------------------------------------------------

    /// Builds the scene registered under `key` and makes it active.
    ///
    /// Order of hooks: previous top `on_end`, new scene `on_init`, new
    /// scene `on_start`. The previous scene is suspended, not destroyed.
    ///
    /// # Errors
    ///
    /// - [`SceneError::AlreadyOnStack`] if a scene with this key is live
    /// - [`SceneError::Unregistered`] if no constructor exists for `key`
    /// - [`SceneError::Inject`] if construction failed to resolve a service
    /// - [`SceneError::InitFailed`] if `on_init` failed; the previous top
    ///   scene is started again
    pub fn push(&mut self, key: S, context: &mut GlobalContext<S>) -> Result<(), SceneError> {
        if self.stack.iter().any(|entry| entry.key == key) {
            return Err(SceneError::AlreadyOnStack(format!("{:?}", key)));
        }

        let factory = self
            .factories
            .get(&key)
            .ok_or_else(|| SceneError::Unregistered(format!("{:?}", key)))?;

        let mut entry = SceneEntry {
            key,
            state: SceneState::Created,
            scene: factory(&self.scope)?,
        };

        if let Some(top) = self.stack.last_mut() {
            top.end(context)?;
        }

        entry.advance(SceneState::Initialized)?;
        if let Err(reason) = entry.scene.on_init(context) {
            drop(entry);
            if let Some(top) = self.stack.last_mut() {
                top.start(context)?;
            }
            return Err(SceneError::InitFailed {
                scene: format!("{:?}", key),
                reason: reason.to_string(),
            });
        }

        entry.start(context)?;
        self.stack.push(entry);

        info!("Pushed scene {:?} (depth {})", key, self.stack.len());
        Ok(())
    }

    /// Ends and destroys the active scene, then reactivates the one below.
    ///
    /// Returns the key of the removed scene.
    ///
    /// # Errors
    ///
    /// [`SceneError::EmptyStack`] if there is nothing to pop.
    pub fn pop(&mut self, context: &mut GlobalContext<S>) -> Result<S, SceneError> {
        let mut entry = self.stack.pop().ok_or(SceneError::EmptyStack)?;
        let key = entry.key;

        entry.end(context)?;
        entry.destroy(context)?;
        drop(entry);

        if let Some(top) = self.stack.last_mut() {
            top.start(context)?;
        }

        info!("Popped scene {:?} (depth {})", key, self.stack.len());
        Ok(key)
    }

    /// Ends the active scene and destroys every scene, top first.
    pub fn clear(&mut self, context: &mut GlobalContext<S>) -> Result<(), SceneError> {
        if let Some(top) = self.stack.last_mut() {
            top.end(context)?;
        }

        while let Some(mut entry) = self.stack.pop() {
            entry.destroy(context)?;
        }

        debug!("Cleared scene stack");
        Ok(())
    }

    //--- Per-Frame --------------------------------------------------------

    /// Updates the active scene.
    pub fn update(&mut self, context: &mut GlobalContext<S>, dt: Duration) {
        if let Some(top) = self.stack.last_mut() {
            if top.state == SceneState::Started {
                top.scene.update(context, dt);
            }
        }
    }

    /// Forwards a viewport change to the active scene's resize sink.
    pub fn resize(&mut self, viewport: Viewport) {
        if let Some(top) = self.stack.last_mut() {
            debug!("Resize {}x{} -> scene {:?}", viewport.width, viewport.height, top.key);
            top.scene.on_resize(viewport);
        }
    }

    /// Applies every queued transition in FIFO order.
    ///
    /// Failures are logged immediately and returned; later transitions in
    /// the same batch still run.
    pub fn process_transitions(&mut self, context: &mut GlobalContext<S>) -> Vec<SceneError> {
        let mut failures = Vec::new();

        for transition in context.scene_transitions.take() {
            let result = match transition {
                SceneTransition::Push(key) => self.push(key, context),
                SceneTransition::Pop => self.pop(context).map(|_| ()),
                SceneTransition::Clear => self.clear(context),
            };

            if let Err(e) = result {
                error!("Scene transition {:?} failed: {}", transition, e);
                failures.push(e);
            }
        }

        failures
    }

    //--- Query API --------------------------------------------------------

    /// Key of the active scene.
    pub fn active(&self) -> Option<S> {
        self.stack.last().map(|entry| entry.key)
    }

    /// Keys and states from bottom to top.
    pub fn states(&self) -> Vec<(S, SceneState)> {
        self.stack.iter().map(|entry| (entry.key, entry.state)).collect()
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Scope under which scenes are constructed.
    pub fn scope(&self) -> &Scope {
        &self.scope
    }
}

//=========================================================================
// Tests
//=========================================================================
