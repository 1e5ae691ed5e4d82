//=========================================================================
// Actor
//=========================================================================
//
// Logical actor state and the per-step movement task.
//
// ActorState changes only at step boundaries: a StepTask interpolates
// the rendered position every tick and commits the grid position once,
// when the step completes.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::Duration;

use log::trace;

//=== Internal Dependencies ===============================================

use super::grid::{Direction, GridPos};
use crate::core::scheduler::{Task, TaskStatus};
use crate::core::services::ActorRecord;

//=== ActorState ==========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActorStatus {
    #[default]
    Stop,
    Walking,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActorState {
    pub pos: GridPos,
    pub direction: Direction,
    pub status: ActorStatus,
}

impl ActorState {
    pub fn new(pos: GridPos, direction: Direction) -> Self {
        Self { pos, direction, status: ActorStatus::Stop }
    }

    pub fn record(&self) -> ActorRecord {
        ActorRecord { x: self.pos.x, y: self.pos.y, direction: self.direction }
    }
}

impl From<ActorRecord> for ActorState {
    fn from(record: ActorRecord) -> Self {
        Self::new(GridPos::new(record.x, record.y), record.direction)
    }
}

//=== ActorBody ===========================================================

/// Actor state plus its rendered position in map-local pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct ActorBody {
    pub state: ActorState,
    pub pixel: (f32, f32),
}

//=== StepTask ============================================================

/// Moves the actor one cell.
///
/// Linear interpolation from `from` to `to` while the step runs; on the
/// tick where elapsed reaches `duration` the position snaps to `to`, the
/// grid position is committed and the task reports `Done`.
#[derive(Debug, Clone)]
pub struct StepTask {
    from: (f32, f32),
    to: (f32, f32),
    target: GridPos,
    duration: Duration,
    elapsed: Duration,
}

impl StepTask {
    pub fn new(from: (f32, f32), to: (f32, f32), target: GridPos, duration: Duration) -> Self {
        Self { from, to, target, duration, elapsed: Duration::ZERO }
    }

    pub fn target(&self) -> GridPos {
        self.target
    }
}

impl Task<ActorBody> for StepTask {
    fn tick(&mut self, body: &mut ActorBody, dt: Duration) -> TaskStatus {
        self.elapsed += dt;

        if self.elapsed >= self.duration {
            body.pixel = self.to;
            body.state.pos = self.target;
            trace!("Step committed at {}", self.target);
            return TaskStatus::Done;
        }

        let t = self.elapsed.as_secs_f32() / self.duration.as_secs_f32();
        body.pixel = (
            self.from.0 + (self.to.0 - self.from.0) * t,
            self.from.1 + (self.to.1 - self.from.1) * t,
        );
        TaskStatus::Continue
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
