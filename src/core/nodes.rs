//=========================================================================
// Node Collection
//=========================================================================
//
// Ordered collection of visual nodes with lifecycle propagation.
//
// Architecture:
//   NodeCollection
//     ├─ nodes: SlotMap<NodeId, Box<dyn Node>>
//     └─ order: Vec<NodeId>   (draw / update order)
//
// Flow:
//   add() ─┬─ collection live?  → Node::on_init() immediately
//          └─ not yet           → deferred to on_init()
//   update(dt) → every node, in order
//   on_destroy() → every node, reverse order, then emptied
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;
use std::time::Duration;

use log::trace;
use slotmap::{new_key_type, SlotMap};

//=== Node Trait ==========================================================

/// A visual element owned by a [`NodeCollection`].
///
/// All lifecycle hooks default to no-ops.
pub trait Node: Any {
    /// Called once when the node becomes part of a live collection.
    fn on_init(&mut self) {}

    /// Called once per frame while the collection is live.
    fn update(&mut self, _dt: Duration) {}

    /// Called once when the node is removed or its collection torn down.
    fn on_destroy(&mut self) {}

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

new_key_type! {
    /// Handle to a node inside a [`NodeCollection`].
    pub struct NodeId;
}

//=== NodeCollection ======================================================

/// Per-scene (or per-map) ordered set of nodes.
pub struct NodeCollection {
    nodes: SlotMap<NodeId, Box<dyn Node>>,
    order: Vec<NodeId>,
    live: bool,
}

impl NodeCollection {
    /// Creates an empty collection that has not been initialized yet.
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            order: Vec::new(),
            live: false,
        }
    }

    //--- Membership -------------------------------------------------------

    /// Appends a node, initializing it right away if the collection is live.
    pub fn add<N: Node>(&mut self, node: N) -> NodeId {
        let id = self.nodes.insert(Box::new(node));
        self.order.push(id);

        if self.live {
            if let Some(node) = self.nodes.get_mut(id) {
                node.on_init();
            }
        }

        trace!("Added node {:?} ({} total)", id, self.order.len());
        id
    }

    /// Removes a node, running its `on_destroy` hook if it had been initialized.
    pub fn remove(&mut self, id: NodeId) -> bool {
        let Some(mut node) = self.nodes.remove(id) else {
            return false;
        };

        if self.live {
            node.on_destroy();
        }

        self.order.retain(|&other| other != id);
        true
    }

    //--- Lifecycle --------------------------------------------------------

    /// Initializes every node added so far. Idempotent.
    pub fn on_init(&mut self) {
        if self.live {
            return;
        }
        self.live = true;

        for &id in &self.order {
            if let Some(node) = self.nodes.get_mut(id) {
                node.on_init();
            }
        }
    }

    /// Updates every node in insertion order.
    pub fn update(&mut self, dt: Duration) {
        if !self.live {
            return;
        }

        for &id in &self.order {
            if let Some(node) = self.nodes.get_mut(id) {
                node.update(dt);
            }
        }
    }

    /// Tears down every node in reverse insertion order and empties the collection.
    pub fn on_destroy(&mut self) {
        if self.live {
            for &id in self.order.iter().rev() {
                if let Some(node) = self.nodes.get_mut(id) {
                    node.on_destroy();
                }
            }
        }

        self.live = false;
        self.nodes.clear();
        self.order.clear();
    }

    //--- Typed Access -----------------------------------------------------

    /// Returns the node as `N`, or `None` if absent or of another type.
    pub fn get<N: Node>(&self, id: NodeId) -> Option<&N> {
        self.nodes.get(id)?.as_any().downcast_ref::<N>()
    }

    /// Mutable variant of [`get`](Self::get).
    pub fn get_mut<N: Node>(&mut self, id: NodeId) -> Option<&mut N> {
        self.nodes.get_mut(id)?.as_any_mut().downcast_mut::<N>()
    }

    /// Iterates node ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.order.iter().copied()
    }

    //--- Query API --------------------------------------------------------

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Returns `true` between `on_init` and `on_destroy`.
    pub fn is_live(&self) -> bool {
        self.live
    }
}

impl Default for NodeCollection {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
