//! Graph nodes and their per-layer locked adjacency lists.
//!
//! A node exists on layers `0..=top_layer` and carries one neighbor list per
//! layer, each behind its own mutex so that concurrent writers only contend
//! on the neighborhoods they actually touch. Neighbor references are shared
//! handles; the bidirectional edges make the ownership graph cyclic, so the
//! index breaks the cycles explicitly on teardown (see `Index::drop`).

use parking_lot::Mutex;
use std::sync::Arc;

/// Shared handle to a node. A node may appear in many neighbor lists across
/// layers; all handles are released when the index is dropped.
pub(crate) type NodeRef = Arc<Node>;

/// One indexed item: identity, label, descriptor, and layered adjacency.
pub(crate) struct Node {
    /// Dense id, assigned monotonically from 0 at insertion.
    pub id: u32,
    /// Opaque label. Must not contain `,` or `\n` (snapshot format).
    pub name: String,
    /// The vector, of the index's fixed dimension.
    pub descriptor: Vec<f64>,
    /// Highest layer this node exists on.
    pub top_layer: usize,
    /// Neighbor list per layer, index 0 = bottom. Each list has its own lock.
    layers: Box<[Mutex<Vec<NodeRef>>]>,
}

impl Node {
    /// Create a node living on `layers_count` layers.
    ///
    /// Layer 0 reserves `cap_lower` slots and the upper layers `cap_upper`;
    /// callers pass one more than the degree caps so a neighborhood can
    /// over-fill before it is pruned back down.
    pub fn new(
        id: u32,
        name: String,
        descriptor: Vec<f64>,
        layers_count: usize,
        cap_upper: usize,
        cap_lower: usize,
    ) -> Self {
        let layers = (0..layers_count)
            .map(|layer| {
                let cap = if layer == 0 { cap_lower } else { cap_upper };
                Mutex::new(Vec::with_capacity(cap))
            })
            .collect();

        Self {
            id,
            name,
            descriptor,
            top_layer: layers_count.saturating_sub(1),
            layers,
        }
    }

    /// Number of layers this node exists on (`top_layer + 1`).
    pub fn layers_count(&self) -> usize {
        self.layers.len()
    }

    /// The locked neighbor list for `layer`.
    ///
    /// Panics if `layer > top_layer`; reaching a node on a layer above its
    /// top layer is a broken graph invariant, not a recoverable error.
    pub fn neighbours(&self, layer: usize) -> &Mutex<Vec<NodeRef>> {
        &self.layers[layer]
    }

    /// Append `neighbour` to this node's layer-`layer` list under its lock.
    ///
    /// No dedup check; callers must not double-add.
    pub fn add_neighbour(&self, neighbour: NodeRef, layer: usize) {
        self.layers[layer].lock().push(neighbour);
    }

    /// Clear every adjacency list, dropping the shared handles they hold.
    pub fn clear_neighbours(&self) {
        for layer in self.layers.iter() {
            layer.lock().clear();
        }
    }
}

// Manual impl: following neighbor links would recurse through graph cycles.
impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("top_layer", &self.top_layer)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: u32, layers_count: usize) -> NodeRef {
        Arc::new(Node::new(
            id,
            format!("n{}", id),
            vec![id as f64, 0.0],
            layers_count,
            17,
            33,
        ))
    }

    #[test]
    fn test_layer_capacities() {
        let n = node(0, 3);
        assert_eq!(n.layers_count(), 3);
        assert_eq!(n.top_layer, 2);
        assert_eq!(n.neighbours(0).lock().capacity(), 33);
        assert_eq!(n.neighbours(1).lock().capacity(), 17);
        assert_eq!(n.neighbours(2).lock().capacity(), 17);
    }

    #[test]
    fn test_add_neighbour() {
        let a = node(0, 2);
        let b = node(1, 1);

        a.add_neighbour(b.clone(), 0);
        a.add_neighbour(b.clone(), 1);
        b.add_neighbour(a.clone(), 0);

        assert_eq!(a.neighbours(0).lock().len(), 1);
        assert_eq!(a.neighbours(1).lock().len(), 1);
        assert_eq!(a.neighbours(0).lock()[0].id, 1);
        assert_eq!(b.neighbours(0).lock()[0].id, 0);
    }

    #[test]
    fn test_clear_neighbours_breaks_cycles() {
        let a = node(0, 1);
        let b = node(1, 1);
        a.add_neighbour(b.clone(), 0);
        b.add_neighbour(a.clone(), 0);

        a.clear_neighbours();
        b.clear_neighbours();

        assert!(a.neighbours(0).lock().is_empty());
        assert_eq!(Arc::strong_count(&a), 1);
        assert_eq!(Arc::strong_count(&b), 1);
    }
}
