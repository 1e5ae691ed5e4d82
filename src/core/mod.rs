//=========================================================================
// Core Systems
//=========================================================================
//
// Everything that runs on the logic thread, plus the orchestrator that
// drives it at a fixed tick rate.
//
// Architecture:
// ```text
//   Platform thread ──PlatformEvent──> EventCollector
//                                           ↓
//   CoreSystemsOrchestrator (fixed TPS)
//     ├─ GlobalSystems  (root Scope, SceneStack)
//     └─ GlobalContext  (input, transitions, message bus, viewport)
// ```
//
// Scenes and services are single-threaded (`Rc`), so they are built on
// the logic thread itself by the setup closure handed to `Engine::init`.
//
//=========================================================================

//=== Module Declarations =================================================

pub mod globals;
pub mod injector;
pub mod input;
pub mod message_bus;
pub mod nodes;
pub mod scene;
pub mod scheduler;
pub mod services;

pub(crate) mod platform_bridge;

//=== External Dependencies ===============================================

use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};
use log::{error, info};

//=== Internal Dependencies ===============================================

use globals::{GlobalContext, GlobalSystems, Viewport};
use platform_bridge::{EventCollector, PlatformEvent, TickControl};
use scene::SceneKey;

pub use platform_bridge::PlatformError;

//=== CoreSystemsOrchestrator =============================================

type SetupFn<S> = Box<dyn FnOnce(&mut GlobalSystems<S>) + Send + 'static>;

/// Owns the logic-thread configuration until the thread is spawned.
pub(crate) struct CoreSystemsOrchestrator<S: SceneKey> {
    setup: Option<SetupFn<S>>,
    viewport: Viewport,
}

impl<S: SceneKey> CoreSystemsOrchestrator<S> {
    pub(crate) fn new(viewport: Viewport) -> Self {
        Self { setup: None, viewport }
    }

    /// Stores the closure that registers services and scenes.
    ///
    /// It runs on the logic thread before the first tick.
    pub(crate) fn init_systems<F>(&mut self, setup: F)
    where
        F: FnOnce(&mut GlobalSystems<S>) + Send + 'static,
    {
        self.setup = Some(Box::new(setup));
    }

    //--- spawn_core_thread() ---------------------------------------------

    /// Spawns the logic thread.
    ///
    /// Each tick:
    ///  1. Collects platform events (exit on close or disconnect)
    ///  2. Applies the latest resize
    ///  3. Updates systems; exits when the scene stack empties
    ///  4. Sleeps to maintain fixed pacing
    ///
    /// `alive` is dropped when the thread ends, which tells the platform
    /// to close the window.
    pub(crate) fn spawn_core_thread(
        self,
        receiver: Receiver<PlatformEvent>,
        alive: Sender<()>,
        tps: f64,
    ) -> thread::JoinHandle<()> {
        let frame_duration = Duration::from_secs_f64(1.0 / tps);

        thread::spawn(move || {
            let _alive = alive;
            let mut systems = GlobalSystems::new();
            let mut context = GlobalContext::new(self.viewport);
            let mut collector = EventCollector::new(receiver);

            if let Some(setup) = self.setup {
                setup(&mut systems);
            }

            if let Err(e) = systems.start(&mut context) {
                error!("Entry scene failed: {}", e);
                return;
            }

            let mut last_tick = Instant::now();

            loop {
                let frame_start = Instant::now();

                //--- Step 1: Gather platform events ------------------------
                if collector.collect_frame() == TickControl::Exit {
                    info!("Core thread exiting (window closed)");
                    break;
                }

                //--- Step 2: Viewport --------------------------------------
                if let Some(viewport) = collector.take_resize() {
                    systems.resize(&mut context, viewport);
                }

                //--- Step 3: Update systems --------------------------------
                context.frame_events = collector.take_batches();
                let dt = frame_start.duration_since(last_tick);
                last_tick = frame_start;

                if !systems.update(&mut context, dt) {
                    info!("Core thread exiting (no scenes left)");
                    break;
                }

                //--- Step 4: Maintain fixed pacing -------------------------
                let elapsed = frame_start.elapsed();
                if elapsed < frame_duration {
                    thread::sleep(frame_duration - elapsed);
                }
            }

            systems.shutdown(&mut context);
        })
    }
}
