//=========================================================================
// Engine
//
// Main entry point and coordinator for the runtime.
//
// Architecture:
// ```text
//     EngineBuilder  ──build()──>  Engine  ──init()──>  ──run()──>  [Runtime]
//         │                          │
//         ├─ with_tps()              └─ spawns the core thread
//         ├─ with_channel_capacity()    runs the platform loop
//         └─ with_window()              blocks until exit
// ```
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use log::{error, info};

//=== Internal Dependencies ===============================================

use crate::config::{GameConfig, WindowConfig};
use crate::core::globals::{GlobalSystems, Viewport};
use crate::core::platform_bridge::PlatformEvent;
use crate::core::scene::SceneKey;
use crate::core::{CoreSystemsOrchestrator, PlatformError};
use crate::platform::Platform;

//=== EngineBuilder =======================================================

/// Builder for configuring and constructing an [`Engine`].
///
/// # Default Values
///
/// - **TPS**: 60.0 (logic updates per second)
/// - **Channel capacity**: 128 events
/// - **Window**: "tilewalk", 800x600
///
/// # Examples
///
/// ```no_run
/// use tilewalk::EngineBuilder;
/// use tilewalk::core::scene::SceneKey;
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// enum Screen { Title }
/// impl SceneKey for Screen {}
///
/// EngineBuilder::<Screen>::new()
///     .with_tps(120.0)
///     .with_channel_capacity(256)
///     .build()
///     .init(|systems| systems.set_entry_scene(Screen::Title))
///     .run()
///     .unwrap();
/// ```
pub struct EngineBuilder<S: SceneKey> {
    tps: f64,
    channel_capacity: usize,
    window: WindowConfig,
    _phantom: std::marker::PhantomData<S>,
}

impl<S: SceneKey> EngineBuilder<S> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            tps: 60.0,
            channel_capacity: 128,
            window: WindowConfig::default(),
            _phantom: std::marker::PhantomData,
        }
    }

    /// Builder seeded from the `[engine]` and `[window]` config sections.
    ///
    /// # Panics
    ///
    /// Same conditions as [`with_tps`](Self::with_tps) and
    /// [`with_channel_capacity`](Self::with_channel_capacity).
    pub fn from_config(config: &GameConfig) -> Self {
        Self::new()
            .with_tps(config.engine.tps)
            .with_channel_capacity(config.engine.channel_capacity)
            .with_window(config.window.clone())
    }

    /// Sets the target ticks per second for the logic thread.
    ///
    /// Scene updates, input and walk animation all advance once per tick.
    ///
    /// # Panics
    ///
    /// Panics unless `tps` is positive and finite.
    pub fn with_tps(mut self, tps: f64) -> Self {
        assert!(tps > 0.0 && tps.is_finite(), "TPS must be positive and finite, got {}", tps);
        self.tps = tps;
        self
    }

    /// Sets the channel capacity for platform → core communication.
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        assert!(capacity > 0, "Channel capacity must be positive");
        self.channel_capacity = capacity;
        self
    }

    /// Sets the window title and initial inner size.
    pub fn with_window(mut self, window: WindowConfig) -> Self {
        self.window = window;
        self
    }

    /// Builds the engine instance.
    pub fn build(self) -> Engine<S> {
        info!("Building engine (TPS: {}, channel: {})", self.tps, self.channel_capacity);

        let viewport = Viewport::new(self.window.width, self.window.height);
        Engine {
            orchestrator: CoreSystemsOrchestrator::new(viewport),
            tps: self.tps,
            channel_capacity: self.channel_capacity,
            window: self.window,
        }
    }
}

impl<S: SceneKey> Default for EngineBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}

//=== Engine ==============================================================

/// Runtime facade.
///
/// ```text
/// Engine (Main Thread)
///   ├─► CoreSystemsOrchestrator (Logic Thread @ TPS)
///   │     └─► GlobalSystems: root Scope, SceneStack
///   │
///   └─► Platform (Event Loop)
///         └─► Window, Input Polling
///
/// platform ──PlatformEvent (bounded)──> core
/// core     ──alive (dropped on exit)──> platform
/// ```
pub struct Engine<S: SceneKey> {
    orchestrator: CoreSystemsOrchestrator<S>,
    tps: f64,
    channel_capacity: usize,
    window: WindowConfig,
}

impl<S: SceneKey> Engine<S> {
    //--- Initialization ---------------------------------------------------

    /// Stores the setup closure that provides services and registers
    /// scenes.
    ///
    /// Services are not `Send`, so the closure runs on the logic thread
    /// right before the entry scene is pushed.
    pub fn init<F>(mut self, setup: F) -> Self
    where
        F: FnOnce(&mut GlobalSystems<S>) + Send + 'static,
    {
        self.orchestrator.init_systems(setup);
        self
    }

    //--- Execution --------------------------------------------------------

    /// Starts the runtime and blocks until the application exits.
    ///
    /// # Lifecycle
    ///
    /// 1. Creates the platform → core channel and the `alive` link
    /// 2. Spawns the logic thread running at the configured TPS
    /// 3. Runs the platform event loop (blocks here)
    /// 4. Exit: window closed → core sees `WindowClosed`; scene stack
    ///    emptied → core drops `alive` → platform closes the window
    ///
    /// # Errors
    ///
    /// [`PlatformError`] if the event loop could not be created or failed.
    pub fn run(self) -> Result<(), PlatformError> {
        info!("Starting engine runtime (TPS: {})", self.tps);

        //--- 1. Create communication channels ----------------------------
        let (tx, rx): (Sender<PlatformEvent>, Receiver<PlatformEvent>) =
            bounded(self.channel_capacity);
        let (alive_tx, alive_rx) = unbounded::<()>();

        //--- 2. Spawn the core logic thread -------------------------------
        let core_handle = self.orchestrator.spawn_core_thread(rx, alive_tx, self.tps);
        info!("Core logic thread spawned");

        //--- 3. Launch the platform subsystem -----------------------------
        let result = Platform::new(tx, alive_rx, self.window).run();
        if let Err(e) = &result {
            error!("Platform error: {}", e);
        }
        info!("Platform event loop exited");

        //--- 4. Wait for the logic thread --------------------------------
        match core_handle.join() {
            Ok(()) => info!("Core thread terminated cleanly"),
            Err(e) => error!("Core thread panicked: {:?}", e),
        }

        info!("Engine shutdown complete");
        result
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
