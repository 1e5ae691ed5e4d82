//=========================================================================
// Menu Scene
//=========================================================================
//
// Entry scene: a three-entry command window over a background image.
//
//   Up / Down  move the cursor (wrapping)
//   Enter      run the selected command
//   Escape     leave the menu, which ends the run loop
//
//=========================================================================

//=== External Dependencies ===============================================

use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use log::{debug, info, warn};

//=== Internal Dependencies ===============================================

use super::GameScene;
use crate::config::GameConfig;
use crate::core::globals::GlobalContext;
use crate::core::injector::{Inject, InjectError, Scope};
use crate::core::input::KeyCode;
use crate::core::scene::{HookResult, Scene, SceneTransition};
use crate::core::services::{ActorRecord, GameStorage, Preload, ResourceHandle, ResourceManager};

//=== MenuCommand =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    NewGame,
    LoadGame,
    About,
}

impl MenuCommand {
    pub const ALL: [MenuCommand; 3] = [MenuCommand::NewGame, MenuCommand::LoadGame, MenuCommand::About];

    pub fn label(self) -> &'static str {
        match self {
            MenuCommand::NewGame => "New Game",
            MenuCommand::LoadGame => "Load Game",
            MenuCommand::About => "About",
        }
    }
}

//=== MenuScene ===========================================================

pub struct MenuScene {
    _scope: Scope,
    resources: Rc<ResourceManager>,
    storage: Rc<GameStorage>,
    save_file: PathBuf,
    background: Option<ResourceHandle>,
    cursor: usize,
}

impl MenuScene {
    pub const PRELOAD: Preload = Preload {
        sounds: &[],
        images: &["menu.jpg"],
    };

    pub fn selected(&self) -> MenuCommand {
        MenuCommand::ALL[self.cursor]
    }

    pub fn background(&self) -> Option<&ResourceHandle> {
        self.background.as_ref()
    }

    fn move_cursor(&mut self, forward: bool) {
        let count = MenuCommand::ALL.len();
        self.cursor = if forward {
            (self.cursor + 1) % count
        } else {
            (self.cursor + count - 1) % count
        };
        debug!("Menu cursor on {}", self.selected().label());
    }

    fn activate(&mut self, context: &mut GlobalContext<GameScene>) {
        let command = self.selected();
        info!("Menu command: {}", command.label());

        match command {
            MenuCommand::NewGame => {
                self.storage.set_actor(ActorRecord::default());
                context.scene_transitions.push(SceneTransition::Push(GameScene::Field));
            }
            MenuCommand::LoadGame => match self.storage.reload(&self.save_file) {
                Ok(()) => context.scene_transitions.push(SceneTransition::Push(GameScene::Field)),
                Err(e) => warn!("Cannot load {}: {}", self.save_file.display(), e),
            },
            MenuCommand::About => context.scene_transitions.push(SceneTransition::Pop),
        }
    }
}

impl Inject for MenuScene {
    type Params = ();

    fn inject(scope: &Scope, _: ()) -> Result<Self, InjectError> {
        let config = scope.resolve::<GameConfig>()?;
        Ok(Self {
            _scope: scope.clone(),
            resources: scope.resolve()?,
            storage: scope.resolve()?,
            save_file: config.paths.save_file.clone(),
            background: None,
            cursor: 0,
        })
    }
}

impl Scene<GameScene> for MenuScene {
    fn on_init(&mut self, _context: &mut GlobalContext<GameScene>) -> HookResult {
        let mut handles = self.resources.preload(&Self::PRELOAD)?;
        self.background = handles.pop();
        Ok(())
    }

    fn update(&mut self, context: &mut GlobalContext<GameScene>, _dt: Duration) {
        let input = &context.input_state;

        if input.is_key_pressed(KeyCode::Escape) {
            context.scene_transitions.push(SceneTransition::Pop);
            return;
        }

        if input.is_key_pressed(KeyCode::ArrowDown) {
            self.move_cursor(true);
        }
        if input.is_key_pressed(KeyCode::ArrowUp) {
            self.move_cursor(false);
        }
        if input.is_key_pressed(KeyCode::Enter) {
            self.activate(context);
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::testing::Harness;
    use tempfile::tempdir;

    #[test]
    fn menu_is_entry_scene() {
        let dir = tempdir().unwrap();
        let harness = Harness::new(dir.path());
        assert_eq!(harness.active(), Some(GameScene::Menu));
    }

    #[test]
    fn enter_on_new_game_opens_field_at_default_record() {
        let dir = tempdir().unwrap();
        let mut harness = Harness::new(dir.path());
        let storage = harness.systems.scope().resolve::<GameStorage>().unwrap();
        storage.set_actor(ActorRecord { x: 4, y: 8, direction: crate::map::Direction::Left });

        harness.tap(KeyCode::Enter);

        assert_eq!(harness.active(), Some(GameScene::Field));
        assert_eq!(harness.systems.scenes.len(), 2);
        assert_eq!(storage.actor(), ActorRecord::default());
    }

    #[test]
    fn load_without_save_file_stays_on_menu() {
        let dir = tempdir().unwrap();
        let mut harness = Harness::new(dir.path());

        harness.tap(KeyCode::ArrowDown);
        harness.tap(KeyCode::Enter);

        assert_eq!(harness.active(), Some(GameScene::Menu));
        assert_eq!(harness.systems.scenes.len(), 1);
    }

    #[test]
    fn load_with_save_file_restores_record() {
        let dir = tempdir().unwrap();
        let saved = ActorRecord { x: 3, y: 5, direction: crate::map::Direction::Up };
        GameStorage::new(saved).save(&dir.path().join("save.toml")).unwrap();

        let mut harness = Harness::new(dir.path());
        harness.tap(KeyCode::ArrowDown);
        harness.tap(KeyCode::Enter);

        assert_eq!(harness.active(), Some(GameScene::Field));
        let storage = harness.systems.scope().resolve::<GameStorage>().unwrap();
        assert_eq!(storage.actor(), saved);
    }

    #[test]
    fn cursor_wraps_upwards_to_about_which_ends_run() {
        let dir = tempdir().unwrap();
        let mut harness = Harness::new(dir.path());

        harness.tap(KeyCode::ArrowUp);
        assert!(!harness.tap(KeyCode::Enter));
        assert!(harness.systems.scenes.is_empty());
    }

    #[test]
    fn escape_pops_menu() {
        let dir = tempdir().unwrap();
        let mut harness = Harness::new(dir.path());

        assert!(!harness.tap(KeyCode::Escape));
        assert_eq!(harness.active(), None);
    }

    #[test]
    fn missing_background_fails_init() {
        let root = Scope::root("root");
        root.provide(GameConfig::default());
        root.provide(ResourceManager::new("assets"));
        root.provide(GameStorage::default());

        let mut scene = root.create::<MenuScene>().unwrap();
        let mut context = GlobalContext::new(crate::core::globals::Viewport::new(800, 600));
        assert!(scene.on_init(&mut context).is_err());
    }
}
