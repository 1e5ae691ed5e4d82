//=========================================================================
// Global Systems
//=========================================================================
//
// Container for engine-level systems with logic.
//
// Holds the root service scope and the scene stack. Systems operate on
// GlobalContext data once per core tick.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::Duration;

use log::{info, warn};

//=== Internal Dependencies ===============================================

use super::{GlobalContext, Viewport};
use crate::core::injector::Scope;
use crate::core::scene::{SceneError, SceneKey, SceneStack};

//=== GlobalSystems =======================================================

/// Container for engine-level logic systems.
///
/// - `scope`: root injection scope; application services live here
/// - `scenes`: stack-based scene lifecycle manager building scenes in
///   children of `scope`
pub struct GlobalSystems<S: SceneKey> {
    scope: Scope,
    pub scenes: SceneStack<S>,
    entry: Option<S>,
    running: bool,
}

impl<S: SceneKey> GlobalSystems<S> {
    /// Creates systems around a fresh root scope.
    pub fn new() -> Self {
        let scope = Scope::root("root");
        Self {
            scenes: SceneStack::new(scope.clone()),
            scope,
            entry: None,
            running: false,
        }
    }

    /// Root scope where application-lifetime services are provided.
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Sets the scene pushed when the core loop starts.
    pub fn set_entry_scene(&mut self, key: S) {
        self.entry = Some(key);
    }

    //--- Lifecycle --------------------------------------------------------

    /// Pushes the entry scene.
    ///
    /// # Errors
    ///
    /// Whatever the push of the entry scene reports. Without an entry
    /// scene this is a no-op and the loop ends on the first tick.
    pub fn start(&mut self, context: &mut GlobalContext<S>) -> Result<(), SceneError> {
        match self.entry {
            Some(key) => {
                info!("Starting with scene {:?}", key);
                self.scenes.push(key, context)?;
                self.running = true;
            }
            None => warn!("No entry scene set"),
        }
        Ok(())
    }

    //--- Update Loop ------------------------------------------------------

    /// Runs one frame. Returns `false` once the scene stack has emptied.
    ///
    /// # Processing Pipeline
    ///
    /// 1. Input: platform batches → `context.input_state`
    /// 2. Messages: last frame's `context.message_bus` queues dropped
    /// 3. Scene update: active scene only
    /// 4. Transitions: queued push/pop/clear applied in FIFO order
    ///
    /// A message posted during frame N is readable until frame N+1 starts.
    pub fn update(&mut self, context: &mut GlobalContext<S>, dt: Duration) -> bool {
        let batches = std::mem::take(&mut context.frame_events);
        context.input_state.advance_frame(&batches);

        context.message_bus.clear_all();

        self.scenes.update(context, dt);
        self.scenes.process_transitions(context);

        if self.running && self.scenes.is_empty() {
            info!("Scene stack is empty");
            self.running = false;
        }
        self.running
    }

    /// Records the new viewport and notifies the active scene.
    pub fn resize(&mut self, context: &mut GlobalContext<S>, viewport: Viewport) {
        context.viewport = viewport;
        self.scenes.resize(viewport);
    }

    /// Destroys every remaining scene.
    pub fn shutdown(&mut self, context: &mut GlobalContext<S>) {
        if let Err(e) = self.scenes.clear(context) {
            warn!("Scene teardown failed: {}", e);
        }
        self.running = false;
    }
}

impl<S: SceneKey> Default for GlobalSystems<S> {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
