//=========================================================================
// Task Scheduler
//=========================================================================
//
// Per-scene clock driving cooperative, frame-synchronous tasks.
//
// Architecture:
//   register(task) → SlotMap<TaskId, Box<dyn Task<T>>>
//                         ↓  once per frame
//   tick(target, dt) → Task::tick() → Continue | Done
//                         ↓
//   Done tasks removed by the scheduler, ids returned to the caller
//
// Tasks never remove themselves. They receive the state they animate as
// `&mut T` on every tick instead of holding a reference to it, so a task
// cannot outlive or alias its target.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::Duration;

use log::trace;
use slotmap::{new_key_type, SlotMap};

//=== TaskStatus ==========================================================

/// Outcome of a single task tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Keep the task registered for the next frame.
    Continue,

    /// Remove the task; its work is complete.
    Done,
}

//=== Task Trait ==========================================================

/// A unit of per-frame work operating on a target of type `T`.
pub trait Task<T> {
    /// Advances the task by `dt`.
    fn tick(&mut self, target: &mut T, dt: Duration) -> TaskStatus;
}

impl<T, F> Task<T> for F
where
    F: FnMut(&mut T, Duration) -> TaskStatus,
{
    fn tick(&mut self, target: &mut T, dt: Duration) -> TaskStatus {
        self(target, dt)
    }
}

new_key_type! {
    /// Handle to a registered task.
    pub struct TaskId;
}

//=== Scheduler ===========================================================

/// Ordered set of tasks ticked once per frame.
///
/// Tasks run in registration order. A task registered during a frame is
/// first ticked on the following frame.
pub struct Scheduler<T> {
    tasks: SlotMap<TaskId, Box<dyn Task<T>>>,
    order: Vec<TaskId>,
    elapsed: Duration,
}

impl<T> Scheduler<T> {
    /// Creates an empty scheduler with its clock at zero.
    pub fn new() -> Self {
        Self {
            tasks: SlotMap::with_key(),
            order: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }

    //--- Registration -----------------------------------------------------

    /// Registers a task and returns its handle.
    pub fn register<K>(&mut self, task: K) -> TaskId
    where
        K: Task<T> + 'static,
    {
        let id = self.tasks.insert(Box::new(task));
        self.order.push(id);
        trace!("Registered task {:?} ({} pending)", id, self.order.len());
        id
    }

    /// Deregisters a task. Returns `false` if it had already finished.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        if self.tasks.remove(id).is_some() {
            self.order.retain(|&other| other != id);
            trace!("Cancelled task {:?}", id);
            true
        } else {
            false
        }
    }

    /// Deregisters every task. Returns how many were pending.
    pub fn clear(&mut self) -> usize {
        let pending = self.order.len();
        self.tasks.clear();
        self.order.clear();
        pending
    }

    //--- Update Loop ------------------------------------------------------

    /// Advances the clock by `dt` and ticks every registered task once.
    ///
    /// Returns the ids of tasks that reported [`TaskStatus::Done`], in the
    /// order they finished. Those tasks are no longer registered.
    pub fn tick(&mut self, target: &mut T, dt: Duration) -> Vec<TaskId> {
        self.elapsed += dt;

        let mut finished = Vec::new();
        let snapshot = self.order.clone();

        for id in snapshot {
            let Some(task) = self.tasks.get_mut(id) else {
                continue;
            };

            if task.tick(target, dt) == TaskStatus::Done {
                self.tasks.remove(id);
                finished.push(id);
            }
        }

        if !finished.is_empty() {
            self.order.retain(|id| !finished.contains(id));
        }

        finished
    }

    //--- Query API --------------------------------------------------------

    /// Returns `true` if the task is still registered.
    pub fn contains(&self, id: TaskId) -> bool {
        self.tasks.contains_key(id)
    }

    /// Returns the number of registered tasks.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if no task is registered.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Total time this scheduler's clock has advanced.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
