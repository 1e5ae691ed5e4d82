//=========================================================================
// Message Bus
//=========================================================================
//
// Per-frame, type-keyed event queues.
//
// Producers push during a frame; the owning consumer drains once. Used
// for scene-level traffic in `GlobalContext` and as the Map Engine's
// outbox for click and walk-completion events.
//
//=========================================================================

//=== Module Declarations =================================================

mod message_bus;
mod message_queue;

//=== Public API ==========================================================

pub use message_bus::{Message, MessageBus};
