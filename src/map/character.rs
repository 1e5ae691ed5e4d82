//=========================================================================
// Character Node
//=========================================================================
//
// Visual node for a character standing on a map event cell.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;

use log::trace;

//=== Internal Dependencies ===============================================

use super::data::MapEvent;
use super::grid::{Direction, TileMetrics};
use crate::core::injector::{Inject, InjectError, Scope};
use crate::core::nodes::Node;

//=== CharacterNode =======================================================

#[derive(Debug)]
pub struct CharacterNode {
    event_id: String,
    sprite: String,
    direction: Direction,
    pixel: (f32, f32),
    visible: bool,
}

impl CharacterNode {
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn sprite(&self) -> &str {
        &self.sprite
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Top-left corner in map-local pixels.
    pub fn pixel(&self) -> (f32, f32) {
        self.pixel
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

impl Inject for CharacterNode {
    type Params = MapEvent;

    fn inject(scope: &Scope, event: MapEvent) -> Result<Self, InjectError> {
        let metrics = scope.resolve::<TileMetrics>()?;
        Ok(Self::placed(&metrics, event))
    }
}

impl CharacterNode {
    fn placed(metrics: &TileMetrics, event: MapEvent) -> Self {
        Self {
            pixel: metrics.grid_to_pixel(event.pos()),
            event_id: event.id,
            sprite: event.character.sprite,
            direction: event.character.direction,
            visible: false,
        }
    }
}

impl Node for CharacterNode {
    fn on_init(&mut self) {
        trace!("Character `{}` shown at {:?}", self.event_id, self.pixel);
        self.visible = true;
    }

    fn on_destroy(&mut self) {
        self.visible = false;
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
