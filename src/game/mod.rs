//=========================================================================
// Game
//=========================================================================
//
// The concrete client built on the engine: a title menu and the field
// scene where the actor walks around a map.
//
// Architecture:
// ```text
//   bootstrap::install ──> root Scope (services) + SceneStack (factories)
//
//   MenuScene ──Enter──> FieldScene
//       ↑                    │
//       └──────Escape────────┘
// ```
//
//=========================================================================

//=== Module Declarations =================================================

mod bootstrap;
mod field;
mod menu;

//=== Public API ==========================================================

pub use bootstrap::{install, provide_services, register_scenes};
pub use field::{FieldScene, Interaction};
pub use menu::{MenuCommand, MenuScene};

//=== Internal Dependencies ===============================================

use crate::core::scene::SceneKey;

//=== GameScene ===========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameScene {
    Menu,
    Field,
}

impl SceneKey for GameScene {}

//=========================================================================
// Test Harness
//=========================================================================

#[cfg(test)]
pub(crate) mod testing {
    use std::path::Path;
    use std::time::Duration;

    use super::*;
    use crate::config::GameConfig;
    use crate::core::globals::{GlobalContext, GlobalSystems, Viewport};
    use crate::core::input::{InputEvent, KeyCode, Modifiers, MouseButton};
    use crate::core::services::testing::RecordingAudio;
    use crate::core::services::AudioManager;
    use crate::map::MapTable;

    pub(crate) const FRAME: Duration = Duration::from_millis(50);

    /// Fully wired game with a recording audio backend and a save file
    /// under `save_dir`.
    pub(crate) struct Harness {
        pub systems: GlobalSystems<GameScene>,
        pub context: GlobalContext<GameScene>,
        pub audio: RecordingAudio,
    }

    impl Harness {
        pub(crate) fn new(save_dir: &Path) -> Self {
            let mut config = GameConfig::default();
            config.paths.save_file = save_dir.join("save.toml");
            Self::with_config(config)
        }

        pub(crate) fn with_config(config: GameConfig) -> Self {
            let audio = RecordingAudio::default();
            let mut systems = GlobalSystems::new();
            provide_services(
                systems.scope(),
                &config,
                MapTable::builtin(),
                AudioManager::new(Box::new(audio.clone())),
            );
            register_scenes(&mut systems.scenes);
            systems.set_entry_scene(GameScene::Menu);

            let mut context = GlobalContext::new(Viewport::new(800, 600));
            systems.start(&mut context).unwrap();

            Self { systems, context, audio }
        }

        /// Runs one tick with `events` as the frame's only input batch.
        pub(crate) fn frame(&mut self, events: Vec<InputEvent>) -> bool {
            self.context.frame_events = vec![events];
            self.systems.update(&mut self.context, FRAME)
        }

        pub(crate) fn idle(&mut self, frames: usize) {
            for _ in 0..frames {
                self.frame(Vec::new());
            }
        }

        pub(crate) fn tap(&mut self, key: KeyCode) -> bool {
            self.frame(vec![
                InputEvent::KeyDown { key, modifiers: Modifiers::NONE },
                InputEvent::KeyUp { key, modifiers: Modifiers::NONE },
            ])
        }

        /// Left click at a window position.
        pub(crate) fn click(&mut self, x: f32, y: f32) -> bool {
            self.frame(vec![
                InputEvent::PointerMoved { x, y },
                InputEvent::MouseButtonDown { button: MouseButton::Left, modifiers: Modifiers::NONE },
                InputEvent::MouseButtonUp { button: MouseButton::Left, modifiers: Modifiers::NONE },
            ])
        }

        pub(crate) fn active(&self) -> Option<GameScene> {
            self.systems.scenes.active()
        }
    }
}
