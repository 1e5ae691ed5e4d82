//=========================================================================
// Field Scene
//=========================================================================
//
// The map scene. Owns one MapEngine and the walk lock around it.
//
// Click flow:
// ```text
//   pointer click ──> MapEngine::handle_pointer ──> MapClickEvent
//        ↓ lock free?                                    (dropped if held)
//   lock + walking ME ──> walk_to(cell, walkable + event cells)
//        ↓ WalkCompleted
//   stop ME, store actor record, interact with nearby event, unlock
// ```
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
use crate::core::globals::{GlobalContext, Viewport};
use crate::core::injector::{Inject, InjectError, Scope};
use crate::core::input::KeyCode;
use crate::core::nodes::{NodeCollection, NodeId};
use crate::core::scene::{HookResult, Scene, SceneTransition};
use crate::core::services::{ActorRecord, AudioManager, GameStorage, Preload, ResourceHandle, ResourceManager};
use crate::map::{
    ActorState, GridPos, MapData, MapEngine, MapRules, MapTable, ObstacleGrid, WalkCompleted,
};

//=== Constants ===========================================================

const BGM: &str = "POL-blooming-short.wav";
const WALKING_ME: &str = "walking.wav";

/// Horizontal shift of the map from the viewport centre.
const MAP_OFFSET_X: f32 = 200.0;

//=== Interaction =========================================================

/// Posted to the context message bus when a walk ends next to an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interaction {
    pub event_id: String,
    pub pos: GridPos,
}

//=== FieldScene ==========================================================

struct FieldSounds {
    bgm: ResourceHandle,
    walking: ResourceHandle,
}

pub struct FieldScene {
    scope: Scope,
    resources: Rc<ResourceManager>,
    audio: Rc<AudioManager>,
    storage: Rc<GameStorage>,
    maps: Rc<MapTable>,
    rules: Rc<MapRules>,
    start_map: String,
    save_file: PathBuf,

    nodes: NodeCollection,
    map: Option<NodeId>,
    sounds: Option<FieldSounds>,

    walk_lock: bool,
    clicked: Option<GridPos>,
}

impl Inject for FieldScene {
    type Params = ();

    fn inject(scope: &Scope, _: ()) -> Result<Self, InjectError> {
        let config = scope.resolve::<GameConfig>()?;
        Ok(Self {
            scope: scope.clone(),
            resources: scope.resolve()?,
            audio: scope.resolve()?,
            storage: scope.resolve()?,
            maps: scope.resolve()?,
            rules: scope.resolve()?,
            start_map: config.map.start_map.clone(),
            save_file: config.paths.save_file.clone(),
            nodes: NodeCollection::new(),
            map: None,
            sounds: None,
            walk_lock: false,
            clicked: None,
        })
    }
}

impl FieldScene {
    pub const PRELOAD: Preload = Preload {
        sounds: &[BGM, WALKING_ME],
        images: &[],
    };

    //--- Map Access -------------------------------------------------------

    pub fn engine(&self) -> Option<&MapEngine> {
        self.nodes.get::<MapEngine>(self.map?)
    }

    fn engine_mut(&mut self) -> Option<&mut MapEngine> {
        self.nodes.get_mut::<MapEngine>(self.map?)
    }

    pub fn is_walk_locked(&self) -> bool {
        self.walk_lock
    }

    /// Centres the map in `viewport`, shifted right.
    fn layout(&mut self, viewport: Viewport) {
        if let Some(engine) = self.engine_mut() {
            let (width, height) = engine.size();
            let x = (viewport.width as f32 - width) / 2.0 + MAP_OFFSET_X;
            let y = (viewport.height as f32 - height) / 2.0;
            engine.set_origin(x, y);
        }
    }

    //--- Walk Requests ----------------------------------------------------

    /// Feeds this frame's clicks to the map and returns the cells hit.
    fn collect_clicks(&mut self, clicks: &[(f32, f32)]) -> Vec<GridPos> {
        let Some(engine) = self.engine_mut() else {
            return Vec::new();
        };

        let (ox, oy) = engine.origin();
        for &(x, y) in clicks {
            engine.handle_pointer(x - ox, y - oy);
        }
        engine.take_clicks().into_iter().map(|click| click.pos).collect()
    }

    fn request_walk(&mut self, target: GridPos) {
        if self.walk_lock {
            warn!("Click on {} dropped: walk in progress", target);
            return;
        }

        let result = match self.engine_mut() {
            Some(engine) => {
                let obstacles = obstacle_grid(engine);
                engine.walk_to(target, &obstacles)
            }
            None => return,
        };

        match result {
            Ok(steps) => {
                debug!("Walking to {} in {} steps", target, steps);
                self.walk_lock = true;
                self.clicked = Some(target);
                if let Some(sounds) = &self.sounds {
                    self.audio.play_me(&sounds.walking);
                }
            }
            Err(e) => warn!("Walk to {} rejected: {}", target, e),
        }
    }

    fn finish_walk(&mut self, done: WalkCompleted, context: &mut GlobalContext<GameScene>) {
        self.audio.stop_me();
        self.storage.set_actor(ActorRecord {
            x: done.pos.x,
            y: done.pos.y,
            direction: done.direction,
        });

        let clicked = self.clicked.take().unwrap_or(done.pos);
        let radius = self.rules.interact_distance;

        if let Some(engine) = self.engine() {
            if let Some(pos) = nearest_event(engine.map(), done.pos, clicked, radius) {
                if let Some(event_id) = engine.interact(pos) {
                    context.message_bus.push(Interaction { event_id, pos });
                }
            }
        }

        self.walk_lock = false;
    }
}

//--- Helpers -------------------------------------------------------------

/// Base walkability with every event cell blocked. Rebuilt per request.
fn obstacle_grid(engine: &MapEngine) -> ObstacleGrid {
    let mut obstacles = engine.walkable().obstacles();
    for event in &engine.map().events {
        obstacles.block(event.pos());
    }
    obstacles
}

/// Closest event within `radius` of `from`; ties go to `clicked`.
fn nearest_event(map: &MapData, from: GridPos, clicked: GridPos, radius: usize) -> Option<GridPos> {
    map.events
        .iter()
        .map(|event| event.pos())
        .filter(|pos| pos.manhattan(from) <= radius)
        .min_by_key(|pos| (pos.manhattan(from), *pos != clicked))
}

//=== Scene Lifecycle =====================================================

impl Scene<GameScene> for FieldScene {
    fn on_init(&mut self, context: &mut GlobalContext<GameScene>) -> HookResult {
        self.resources.preload(&Self::PRELOAD)?;
        let sounds = FieldSounds {
            bgm: self.resources.sound(BGM)?,
            walking: self.resources.sound(WALKING_ME)?,
        };

        let map = self.maps.get(&self.start_map)?.clone();
        let actor = ActorState::from(self.storage.actor());
        let engine = self.scope.init::<MapEngine>((map, actor))?;

        self.map = Some(self.nodes.add(engine));
        self.nodes.on_init();
        self.walk_lock = false;
        self.layout(context.viewport);

        // Last: a failed init is dropped without on_end.
        self.audio.play_bgm(&sounds.bgm);
        self.sounds = Some(sounds);
        Ok(())
    }

    fn on_start(&mut self, context: &mut GlobalContext<GameScene>) {
        self.layout(context.viewport);
    }

    fn on_end(&mut self, _context: &mut GlobalContext<GameScene>) {
        self.audio.stop_me();
        self.audio.stop_bgm();

        if let Err(e) = self.storage.save(&self.save_file) {
            warn!("Cannot write {}: {}", self.save_file.display(), e);
        }
    }

    fn on_destroy(&mut self, _context: &mut GlobalContext<GameScene>) {
        self.nodes.on_destroy();
        self.map = None;
        self.clicked = None;
        self.walk_lock = false;
        info!("Field torn down");
    }

    fn update(&mut self, context: &mut GlobalContext<GameScene>, dt: Duration) {
        if context.input_state.is_key_pressed(KeyCode::Escape) {
            context.scene_transitions.push(SceneTransition::Pop);
            return;
        }

        let clicks = context.input_state.clicks().to_vec();
        for target in self.collect_clicks(&clicks) {
            self.request_walk(target);
        }

        self.nodes.update(dt);

        let completions = self
            .engine_mut()
            .map(MapEngine::take_completions)
            .unwrap_or_default();
        for done in completions {
            self.finish_walk(done, context);
        }
    }

    fn on_resize(&mut self, viewport: Viewport) {
        self.layout(viewport);
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::testing::Harness;
    use crate::map::Direction;
    use tempfile::tempdir;

    /// Window position of the centre of a cell with an 800x600 viewport.
    /// The map (384x320) sits at (408, 140).
    fn cell(x: usize, y: usize) -> (f32, f32) {
        (408.0 + x as f32 * 32.0 + 16.0, 140.0 + y as f32 * 32.0 + 16.0)
    }

    fn field(dir: &std::path::Path) -> Harness {
        let mut harness = Harness::new(dir);
        harness.tap(KeyCode::Enter);
        assert_eq!(harness.active(), Some(GameScene::Field));
        harness.audio.take();
        harness
    }

    fn storage(harness: &Harness) -> Rc<GameStorage> {
        harness.systems.scope().resolve::<GameStorage>().unwrap()
    }

    fn walk_to(harness: &mut Harness, x: usize, y: usize) {
        let (px, py) = cell(x, y);
        harness.click(px, py);
        harness.idle(200);
    }

    /// Walks like `walk_to`, gathering interactions frame by frame.
    fn walk_collecting(harness: &mut Harness, x: usize, y: usize) -> Vec<Interaction> {
        let (px, py) = cell(x, y);
        harness.click(px, py);
        let mut seen = harness.context.message_bus.take::<Interaction>();
        for _ in 0..200 {
            harness.idle(1);
            seen.extend(harness.context.message_bus.take::<Interaction>());
        }
        seen
    }

    //--- Walking ----------------------------------------------------------

    #[test]
    fn click_walks_actor_and_stores_record() {
        let dir = tempdir().unwrap();
        let mut harness = field(dir.path());

        walk_to(&mut harness, 3, 1);

        assert_eq!(
            storage(&harness).actor(),
            ActorRecord { x: 3, y: 1, direction: Direction::Right }
        );
        assert_eq!(harness.audio.take(), vec!["Me play walking.wav", "Me stop"]);
    }

    #[test]
    fn click_during_walk_is_dropped() {
        let dir = tempdir().unwrap();
        let mut harness = field(dir.path());

        let (px, py) = cell(3, 1);
        harness.click(px, py);
        let (qx, qy) = cell(1, 3);
        harness.click(qx, qy);
        harness.idle(200);

        assert_eq!(storage(&harness).actor(), ActorRecord { x: 3, y: 1, direction: Direction::Right });
        assert_eq!(harness.audio.take(), vec!["Me play walking.wav", "Me stop"]);
    }

    #[test]
    fn click_outside_map_is_ignored() {
        let dir = tempdir().unwrap();
        let mut harness = field(dir.path());

        harness.click(10.0, 10.0);
        harness.idle(5);

        assert_eq!(storage(&harness).actor(), ActorRecord::default());
        assert!(harness.audio.take().is_empty());
    }

    //--- Interaction ------------------------------------------------------

    #[test]
    fn walk_ending_near_event_interacts_once() {
        let dir = tempdir().unwrap();
        let mut harness = field(dir.path());

        let interactions = walk_collecting(&mut harness, 7, 1);
        assert_eq!(
            interactions,
            vec![Interaction { event_id: "elder".into(), pos: GridPos::new(8, 2) }]
        );
    }

    #[test]
    fn walk_ending_three_cells_away_does_not_interact() {
        let dir = tempdir().unwrap();
        let mut harness = field(dir.path());

        let interactions = walk_collecting(&mut harness, 6, 1);

        assert_eq!(storage(&harness).actor().x, 6);
        assert!(interactions.is_empty());
    }

    #[test]
    fn clicking_an_event_interacts_without_moving() {
        let dir = tempdir().unwrap();
        let mut harness = field(dir.path());
        walk_to(&mut harness, 8, 1);

        let interactions = walk_collecting(&mut harness, 8, 2);

        assert_eq!(storage(&harness).actor().y, 1);
        assert_eq!(interactions.len(), 1);
        assert_eq!(interactions[0].event_id, "elder");
    }

    #[test]
    fn interactions_do_not_pile_up_across_walks() {
        let dir = tempdir().unwrap();
        let mut harness = field(dir.path());

        for _ in 0..5 {
            let (px, py) = cell(7, 1);
            harness.click(px, py);
            let mut frames = 0;
            while harness.context.message_bus.count::<Interaction>() == 0 {
                assert!(frames < 200, "walk to (7,1) never interacted");
                harness.idle(1);
                frames += 1;
            }
            assert_eq!(harness.context.message_bus.count::<Interaction>(), 1);

            harness.idle(1);
            assert_eq!(harness.context.message_bus.count::<Interaction>(), 0);

            walk_to(&mut harness, 6, 1);
        }

        assert_eq!(harness.context.message_bus.total(), 0);
    }

    #[test]
    fn nearest_event_prefers_clicked_cell_on_ties() {
        let mut map = MapTable::builtin().get("MAP_0").unwrap().clone();
        map.events[1].x = 8;
        map.events[1].y = 4;
        let from = GridPos::new(8, 3);

        assert_eq!(nearest_event(&map, from, GridPos::new(8, 4), 2), Some(GridPos::new(8, 4)));
        assert_eq!(nearest_event(&map, from, GridPos::new(8, 2), 2), Some(GridPos::new(8, 2)));
        assert_eq!(nearest_event(&map, GridPos::new(1, 1), GridPos::new(1, 1), 2), None);
    }

    //--- Lifecycle --------------------------------------------------------

    #[test]
    fn init_plays_bgm_and_end_stops_it_and_saves() {
        let dir = tempdir().unwrap();
        let mut harness = Harness::new(dir.path());

        harness.tap(KeyCode::Enter);
        assert_eq!(harness.audio.take(), vec!["Bgm play POL-blooming-short.wav"]);

        walk_to(&mut harness, 2, 1);
        harness.audio.take();

        harness.tap(KeyCode::Escape);
        assert_eq!(harness.active(), Some(GameScene::Menu));
        assert_eq!(harness.audio.take(), vec!["Bgm stop"]);

        let saved = GameStorage::load(&dir.path().join("save.toml")).unwrap();
        assert_eq!(saved.actor(), ActorRecord { x: 2, y: 1, direction: Direction::Right });
    }

    #[test]
    fn failed_init_leaves_no_music_playing() {
        let dir = tempdir().unwrap();
        let mut config = GameConfig::default();
        config.paths.save_file = dir.path().join("save.toml");
        config.map.start_map = "MISSING".into();
        let mut harness = Harness::with_config(config);

        harness.tap(KeyCode::Enter);

        assert_eq!(harness.active(), Some(GameScene::Menu));
        assert!(harness.audio.take().is_empty());
        let audio = harness.systems.scope().resolve::<AudioManager>().unwrap();
        assert_eq!(audio.current_bgm(), None);
    }

    #[test]
    fn escape_mid_walk_tears_down_cleanly() {
        let dir = tempdir().unwrap();
        let mut harness = field(dir.path());

        let (px, py) = cell(9, 1);
        harness.click(px, py);
        harness.idle(3);
        harness.tap(KeyCode::Escape);
        harness.idle(3);

        assert_eq!(harness.active(), Some(GameScene::Menu));
        assert_eq!(harness.audio.take(), vec!["Me play walking.wav", "Me stop", "Bgm stop"]);
        assert_eq!(storage(&harness).actor(), ActorRecord::default());
    }

    #[test]
    fn resize_recentres_map() {
        let dir = tempdir().unwrap();
        let mut harness = field(dir.path());

        harness.systems.resize(&mut harness.context, Viewport::new(1024, 768));
        let (px, py) = (
            (1024.0 - 384.0) / 2.0 + 200.0 + 2.0 * 32.0 + 1.0,
            (768.0 - 320.0) / 2.0 + 1.0 * 32.0 + 1.0,
        );
        harness.click(px, py);
        harness.idle(100);

        assert_eq!(storage(&harness).actor().x, 2);
    }
}
