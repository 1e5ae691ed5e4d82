//=========================================================================
// Bootstrap
//=========================================================================
//
// Wires application services into the root scope and registers scenes.
// Runs on the logic thread inside the `Engine::init` closure.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::info;

//=== Internal Dependencies ===============================================

use super::{FieldScene, GameScene, MenuScene};
use crate::config::GameConfig;
use crate::core::globals::GlobalSystems;
use crate::core::injector::Scope;
use crate::core::scene::SceneStack;
use crate::core::services::{AudioManager, GameStorage, ResourceManager};
use crate::map::{MapRules, MapTable, TileMetrics};

//=== install() ===========================================================

/// Full setup with silent audio and Menu as the entry scene.
pub fn install(systems: &mut GlobalSystems<GameScene>, config: &GameConfig, maps: MapTable) {
    provide_services(systems.scope(), config, maps, AudioManager::silent());
    register_scenes(&mut systems.scenes);
    systems.set_entry_scene(GameScene::Menu);
}

/// Provides every application-lifetime service in `scope`.
pub fn provide_services(scope: &Scope, config: &GameConfig, maps: MapTable, audio: AudioManager) {
    let resources = ResourceManager::new(config.paths.assets.clone())
        .with_manifest(&MenuScene::PRELOAD)
        .with_manifest(&FieldScene::PRELOAD);

    info!(
        "Services: {} maps, {} resources, tile size {}",
        maps.len(),
        resources.len(),
        config.map.tile_size
    );

    scope.provide(TileMetrics::new(config.map.tile_size));
    scope.provide(MapRules::from(&config.map));
    scope.provide(maps);
    scope.provide(resources);
    scope.provide(audio);
    scope.provide(GameStorage::default());
    scope.provide(config.clone());
}

pub fn register_scenes(scenes: &mut SceneStack<GameScene>) {
    scenes.register::<MenuScene>(GameScene::Menu);
    scenes.register::<FieldScene>(GameScene::Field);
}

//=========================================================================
// Unit Tests
//=========================================================================
