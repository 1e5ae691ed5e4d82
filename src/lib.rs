//=========================================================================
// tilewalk — Library Root
//
// A tile-based 2D game client: scoped service resolution, a scene stack,
// grid pathfinding and frame-stepped actor movement.
//
// Typical usage:
// ```no_run
// use tilewalk::config::GameConfig;
// use tilewalk::game::{self, GameScene};
// use tilewalk::map::MapTable;
// use tilewalk::EngineBuilder;
//
// let config = GameConfig::default();
// let setup = config.clone();
//
// EngineBuilder::<GameScene>::from_config(&config)
//     .build()
//     .init(move |systems| game::install(systems, &setup, MapTable::builtin()))
//     .run()
//     .unwrap();
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` holds everything that runs on the logic thread: injector, scene
// stack, scheduler, nodes, input state and services.
//
// `map` is the tile map, pathfinder and map engine; `game` the concrete
// menu and field scenes built on top of it.
//
pub mod config;
pub mod core;
pub mod game;
pub mod map;
pub mod prelude;

//--- Internal Modules ----------------------------------------------------
//
// `platform` owns the winit window and event loop and is not part of the
// public API surface.
//
mod engine;
mod platform;

//--- Public Exports ------------------------------------------------------

pub use engine::{Engine, EngineBuilder};
