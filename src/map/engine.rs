//=========================================================================
// Map Engine
//=========================================================================
//
// Owns one loaded map: tile layer, walkability, event characters and the
// actor walking on it.
//
// Walk state machine:
// ```text
//   Stop ──walk_to──> Walking ──┬─ step task Continue (interpolating)
//                               ├─ step task Done → next waypoint
//                               └─ route empty → Stop + WalkCompleted
// ```
//
// The engine never reacts to its own clicks. It reports them through its
// outbox and the owning scene decides whether to call `walk_to`.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use log::{debug, info, trace};

//=== Internal Dependencies ===============================================

use super::actor::{ActorBody, ActorState, ActorStatus, StepTask};
use super::character::CharacterNode;
use super::data::{MapData, MapTable};
use super::grid::{Direction, GridPos, ObstacleGrid, TileMetrics, WalkabilityGrid};
use super::pathfinder::{find_path, Waypoint};
use super::MapError;
use crate::config::MapConfig;
use crate::core::injector::{Inject, InjectError, Scope};
use crate::core::message_bus::MessageBus;
use crate::core::nodes::{Node, NodeCollection};
use crate::core::scheduler::Scheduler;

//=== Services ============================================================

/// Movement rules shared by every map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapRules {
    pub walk_duration: Duration,
    pub interact_distance: usize,
}

impl From<&MapConfig> for MapRules {
    fn from(config: &MapConfig) -> Self {
        Self {
            walk_duration: config.walk_duration(),
            interact_distance: config.interact_distance,
        }
    }
}

impl Default for MapRules {
    fn default() -> Self {
        Self::from(&MapConfig::default())
    }
}

//=== Outbox Messages =====================================================

/// Pointer-down on a map cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapClickEvent {
    pub pos: GridPos,
}

/// A `walk_to` request finished; the actor stands at `pos`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkCompleted {
    pub pos: GridPos,
    pub direction: Direction,
    pub steps: usize,
}

//=== Tile Layer ==========================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileSprite {
    pub tile_id: u32,
    pub x: f32,
    pub y: f32,
}

/// The map's tiles composed once into a single layer.
#[derive(Debug, Clone, PartialEq)]
pub struct TileLayer {
    pub width: f32,
    pub height: f32,
    pub sprites: Vec<TileSprite>,
}

impl TileLayer {
    fn bake(map: &MapData, metrics: &TileMetrics) -> Self {
        let (width, height) = metrics.extent(map.rows, map.cols);
        let mut sprites = Vec::with_capacity(map.data.len());

        for y in 0..map.rows {
            for x in 0..map.cols {
                let pos = GridPos::new(x, y);
                if let Some(tile_id) = map.tile_id(pos) {
                    let (px, py) = metrics.grid_to_pixel(pos);
                    sprites.push(TileSprite { tile_id, x: px, y: py });
                }
            }
        }

        trace!("Baked {} tiles into {}x{} layer", sprites.len(), width, height);
        Self { width, height, sprites }
    }
}

//=== MapEngine ===========================================================

pub struct MapEngine {
    scope: Scope,
    map: MapData,
    walkable: WalkabilityGrid,
    metrics: Rc<TileMetrics>,
    walk_duration: Duration,
    layer: TileLayer,
    body: ActorBody,
    scheduler: Scheduler<ActorBody>,
    route: VecDeque<Waypoint>,
    steps: usize,
    characters: NodeCollection,
    outbox: MessageBus,
    origin: (f32, f32),
}

impl Inject for MapEngine {
    type Params = (MapData, ActorState);

    /// Wires services and loads `map` in one step.
    fn inject(scope: &Scope, (map, actor): Self::Params) -> Result<Self, InjectError> {
        let metrics = scope.resolve::<TileMetrics>()?;
        let rules = scope.resolve::<MapRules>()?;
        let table = scope.resolve::<MapTable>()?;

        // Pinned here: characters and later children use the metrics the
        // layer was baked with, even if an ancestor rebinds them.
        scope.provide_shared(Rc::clone(&metrics));

        let walkable = WalkabilityGrid::from_map(&map, table.tiles());
        let layer = TileLayer::bake(&map, &metrics);

        let mut characters = NodeCollection::new();
        for event in &map.events {
            characters.add(scope.init::<CharacterNode>(event.clone())?);
        }

        let body = ActorBody {
            state: ActorState { status: ActorStatus::Stop, ..actor },
            pixel: metrics.grid_to_pixel(actor.pos),
        };

        info!(
            "Loaded map `{}` ({}x{}, {} events), actor at {}",
            map.id,
            map.cols,
            map.rows,
            map.events.len(),
            actor.pos
        );

        Ok(Self {
            scope: scope.clone(),
            map,
            walkable,
            metrics,
            walk_duration: rules.walk_duration,
            layer,
            body,
            scheduler: Scheduler::new(),
            route: VecDeque::new(),
            steps: 0,
            characters,
            outbox: MessageBus::new(),
            origin: (0.0, 0.0),
        })
    }
}

impl MapEngine {
    /// The map's own scope. Parent of every character scope.
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    //--- Pointer Input ----------------------------------------------------

    /// Converts a map-local pixel position to a cell and reports it.
    ///
    /// Returns the clicked cell, or `None` when the position is off the map.
    pub fn handle_pointer(&mut self, local_x: f32, local_y: f32) -> Option<GridPos> {
        let pos = self
            .metrics
            .pixel_to_grid(local_x, local_y)
            .filter(|pos| self.walkable.contains(*pos))?;

        trace!("Map click at {}", pos);
        self.outbox.push(MapClickEvent { pos });
        Some(pos)
    }

    /// Drains clicks reported since the last call, oldest first.
    pub fn take_clicks(&mut self) -> Vec<MapClickEvent> {
        self.outbox.take::<MapClickEvent>()
    }

    /// Drains finished walks since the last call.
    pub fn take_completions(&mut self) -> Vec<WalkCompleted> {
        self.outbox.take::<WalkCompleted>()
    }

    //--- Movement ---------------------------------------------------------

    /// Starts walking the actor towards `target`, avoiding `obstacles`.
    ///
    /// Returns the number of steps in the route. A route of zero steps
    /// still completes, on the next update.
    ///
    /// # Errors
    ///
    /// - [`MapError::WalkInProgress`] while a previous walk is running
    /// - [`MapError::OutOfBounds`] if `target` is not on the map
    pub fn walk_to(&mut self, target: GridPos, obstacles: &ObstacleGrid) -> Result<usize, MapError> {
        if self.is_walking() {
            return Err(MapError::WalkInProgress);
        }
        if !self.walkable.contains(target) {
            return Err(MapError::OutOfBounds { x: target.x, y: target.y });
        }

        self.body.state.status = ActorStatus::Walking;
        self.route = find_path(self.body.state.pos, target, obstacles)
            .into_iter()
            .skip(1)
            .collect();
        self.steps = self.route.len();

        debug!("Walk {} -> {} ({} steps)", self.body.state.pos, target, self.steps);

        if let Some(first) = self.route.pop_front() {
            self.begin_step(first);
        }
        Ok(self.steps)
    }

    fn begin_step(&mut self, waypoint: Waypoint) {
        self.body.state.direction = waypoint.direction;
        let to = self.metrics.grid_to_pixel(waypoint.pos);
        self.scheduler.register(StepTask::new(self.body.pixel, to, waypoint.pos, self.walk_duration));
    }

    fn advance_walk(&mut self, dt: Duration) {
        if !self.is_walking() {
            return;
        }

        self.scheduler.tick(&mut self.body, dt);
        if !self.scheduler.is_empty() {
            return;
        }

        match self.route.pop_front() {
            Some(next) => self.begin_step(next),
            None => self.finish_walk(),
        }
    }

    fn finish_walk(&mut self) {
        let state = &mut self.body.state;
        state.status = ActorStatus::Stop;

        debug!("Walk finished at {} facing {:?}", state.pos, state.direction);
        self.outbox.push(WalkCompleted {
            pos: state.pos,
            direction: state.direction,
            steps: self.steps,
        });
    }

    //--- Events -----------------------------------------------------------

    /// Interaction hook for the event at `pos`. Completes immediately.
    ///
    /// Returns the id of the event there, if any.
    pub fn interact(&self, pos: GridPos) -> Option<String> {
        let id = self.map.event_at(pos).map(|event| event.id.clone());
        match &id {
            Some(id) => info!("Interact with `{}` at {}", id, pos),
            None => debug!("Interact at {}: nothing there", pos),
        }
        id
    }

    //--- Layout -----------------------------------------------------------

    /// Window position of the map's top-left corner.
    pub fn origin(&self) -> (f32, f32) {
        self.origin
    }

    pub fn set_origin(&mut self, x: f32, y: f32) {
        self.origin = (x, y);
    }

    /// Map size in pixels as (width, height).
    pub fn size(&self) -> (f32, f32) {
        (self.layer.width, self.layer.height)
    }

    //--- Query API --------------------------------------------------------

    pub fn map(&self) -> &MapData {
        &self.map
    }

    pub fn walkable(&self) -> &WalkabilityGrid {
        &self.walkable
    }

    pub fn layer(&self) -> &TileLayer {
        &self.layer
    }

    pub fn actor(&self) -> ActorState {
        self.body.state
    }

    /// Rendered actor position in map-local pixels.
    pub fn actor_pixel(&self) -> (f32, f32) {
        self.body.pixel
    }

    pub fn is_walking(&self) -> bool {
        self.body.state.status == ActorStatus::Walking
    }

    /// Number of step tasks currently registered.
    pub fn pending_steps(&self) -> usize {
        self.scheduler.len()
    }

    pub fn characters(&self) -> impl Iterator<Item = &CharacterNode> + '_ {
        self.characters
            .ids()
            .filter_map(|id| self.characters.get::<CharacterNode>(id))
    }
}

//=== Node Lifecycle ======================================================

impl Node for MapEngine {
    fn on_init(&mut self) {
        self.characters.on_init();
    }

    fn update(&mut self, dt: Duration) {
        self.advance_walk(dt);
        self.characters.update(dt);
    }

    /// Drops any in-flight walk together with the characters.
    fn on_destroy(&mut self) {
        let cancelled = self.scheduler.clear();
        if cancelled > 0 {
            debug!("Map `{}` torn down mid-walk", self.map.id);
        }
        self.route.clear();
        self.body.state.status = ActorStatus::Stop;
        self.characters.on_destroy();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const FRAME: Duration = Duration::from_millis(50);

    fn root() -> Scope {
        let root = Scope::root("root");
        root.provide(TileMetrics::new(32));
        root.provide(MapRules { walk_duration: Duration::from_millis(200), interact_distance: 2 });
        root.provide(MapTable::builtin());
        root
    }

    fn engine_at(root: &Scope, x: usize, y: usize) -> MapEngine {
        let map = MapTable::builtin().get("MAP_0").unwrap().clone();
        let actor = ActorState::new(GridPos::new(x, y), Direction::Down);
        let mut engine = root.init::<MapEngine>((map, actor)).unwrap();
        engine.on_init();
        engine
    }

    /// Updates until the walk finishes; returns the number of frames.
    fn run_walk(engine: &mut MapEngine) -> usize {
        for frame in 1..=500 {
            engine.update(FRAME);
            if !engine.is_walking() {
                return frame;
            }
        }
        panic!("walk did not finish");
    }

    fn obstacles(engine: &MapEngine) -> ObstacleGrid {
        let mut grid = engine.walkable().obstacles();
        for event in &engine.map().events {
            grid.block(event.pos());
        }
        grid
    }

    //--- Loading ----------------------------------------------------------

    #[test]
    fn load_bakes_layer_and_spawns_characters() {
        let root = root();
        let engine = engine_at(&root, 1, 1);

        assert_eq!(engine.layer().sprites.len(), 120);
        assert_eq!(engine.size(), (384.0, 320.0));
        assert_eq!(engine.walkable().len(), 120);

        let ids: Vec<_> = engine.characters().map(|c| c.event_id().to_owned()).collect();
        assert_eq!(ids, vec!["elder", "signpost"]);
        assert!(engine.characters().all(CharacterNode::is_visible));
    }

    #[test]
    fn map_scope_keeps_its_tile_metrics() {
        let root = root();
        let engine = engine_at(&root, 1, 1);

        assert!(engine.scope().provides_locally::<TileMetrics>());

        root.provide(TileMetrics::new(16));
        assert_eq!(engine.scope().resolve::<TileMetrics>().unwrap().tile_size(), 32);

        let elder = engine.map().events[0].clone();
        let node = engine.scope().init::<CharacterNode>(elder).unwrap();
        assert_eq!(node.pixel(), (256.0, 64.0));
    }

    #[test]
    fn missing_service_fails_construction() {
        let root = Scope::root("bare");
        root.provide(TileMetrics::new(32));
        let map = MapTable::builtin().get("MAP_0").unwrap().clone();

        let result = root.init::<MapEngine>((map, ActorState::new(GridPos::new(1, 1), Direction::Down)));
        assert!(matches!(result, Err(InjectError::UnresolvedDependency { .. })));
    }

    //--- Pointer ----------------------------------------------------------

    #[test]
    fn click_reports_grid_cell_without_moving() {
        let root = root();
        let mut engine = engine_at(&root, 1, 1);

        assert_eq!(engine.handle_pointer(65.0, 97.0), Some(GridPos::new(2, 3)));
        assert_eq!(engine.take_clicks(), vec![MapClickEvent { pos: GridPos::new(2, 3) }]);
        assert!(engine.take_clicks().is_empty());
        assert!(!engine.is_walking());
    }

    #[test]
    fn click_off_map_is_ignored() {
        let root = root();
        let mut engine = engine_at(&root, 1, 1);

        assert_eq!(engine.handle_pointer(-4.0, 10.0), None);
        assert_eq!(engine.handle_pointer(400.0, 10.0), None);
        assert!(engine.take_clicks().is_empty());
    }

    //--- Walking ----------------------------------------------------------

    #[test]
    fn walk_reaches_target_and_reports_once() {
        let root = root();
        let mut engine = engine_at(&root, 1, 1);
        let grid = obstacles(&engine);

        let steps = engine.walk_to(GridPos::new(3, 1), &grid).unwrap();
        assert_eq!(steps, 2);
        assert_eq!(engine.actor().direction, Direction::Right);
        assert!(engine.is_walking());

        run_walk(&mut engine);

        assert_eq!(engine.actor().pos, GridPos::new(3, 1));
        assert_eq!(engine.actor_pixel(), (96.0, 32.0));
        assert_eq!(
            engine.take_completions(),
            vec![WalkCompleted { pos: GridPos::new(3, 1), direction: Direction::Right, steps: 2 }]
        );
        assert_eq!(engine.pending_steps(), 0);
    }

    #[test]
    fn grid_position_commits_only_at_step_end() {
        let root = root();
        let mut engine = engine_at(&root, 1, 1);
        let grid = obstacles(&engine);
        engine.walk_to(GridPos::new(1, 2), &grid).unwrap();

        engine.update(Duration::from_millis(100));
        assert_eq!(engine.actor().pos, GridPos::new(1, 1));
        assert_relative_eq!(engine.actor_pixel().1, 48.0, epsilon = 1e-3);

        engine.update(Duration::from_millis(100));
        assert_eq!(engine.actor().pos, GridPos::new(1, 2));
    }

    #[test]
    fn second_walk_while_walking_is_rejected() {
        let root = root();
        let mut engine = engine_at(&root, 1, 1);
        let grid = obstacles(&engine);

        engine.walk_to(GridPos::new(3, 1), &grid).unwrap();
        engine.update(FRAME);
        let before = engine.actor().pos;

        assert_eq!(engine.walk_to(GridPos::new(1, 8), &grid), Err(MapError::WalkInProgress));
        assert_eq!(engine.actor().pos, before);

        run_walk(&mut engine);
        assert_eq!(engine.actor().pos, GridPos::new(3, 1));
    }

    #[test]
    fn route_never_enters_blocked_cells() {
        let root = root();
        let mut engine = engine_at(&root, 1, 5);
        let grid = obstacles(&engine);

        engine.walk_to(GridPos::new(3, 7), &grid).unwrap();

        let mut visited = vec![engine.actor().pos];
        for _ in 0..500 {
            engine.update(FRAME);
            visited.push(engine.actor().pos);
            if !engine.is_walking() {
                break;
            }
        }

        assert_eq!(engine.actor().pos, GridPos::new(3, 7));
        assert!(visited.iter().all(|pos| !grid.is_blocked(*pos)));
    }

    #[test]
    fn unreachable_target_completes_in_place() {
        let root = root();
        let mut engine = engine_at(&root, 1, 1);
        let grid = obstacles(&engine);

        assert_eq!(engine.walk_to(GridPos::new(4, 2), &grid), Ok(0));
        assert_eq!(run_walk(&mut engine), 1);
        assert_eq!(engine.actor().pos, GridPos::new(1, 1));
        assert_eq!(engine.take_completions().len(), 1);
    }

    #[test]
    fn target_off_map_is_rejected() {
        let root = root();
        let mut engine = engine_at(&root, 1, 1);
        let grid = obstacles(&engine);

        assert_eq!(
            engine.walk_to(GridPos::new(12, 0), &grid),
            Err(MapError::OutOfBounds { x: 12, y: 0 })
        );
        assert!(!engine.is_walking());
    }

    //--- Interact / Teardown ----------------------------------------------

    #[test]
    fn interact_reports_event_id() {
        let root = root();
        let engine = engine_at(&root, 1, 1);

        assert_eq!(engine.interact(GridPos::new(8, 2)).as_deref(), Some("elder"));
        assert_eq!(engine.interact(GridPos::new(1, 1)), None);
    }

    #[test]
    fn destroy_mid_walk_deregisters_step_task() {
        let root = root();
        let mut engine = engine_at(&root, 1, 1);
        let grid = obstacles(&engine);

        engine.walk_to(GridPos::new(6, 1), &grid).unwrap();
        engine.update(FRAME);
        assert_eq!(engine.pending_steps(), 1);

        engine.on_destroy();

        assert_eq!(engine.pending_steps(), 0);
        assert!(!engine.is_walking());
        assert_eq!(engine.characters().count(), 0);

        let pos = engine.actor().pos;
        engine.update(Duration::from_secs(1));
        assert_eq!(engine.actor().pos, pos);
        assert!(engine.take_completions().is_empty());
    }
}
