//! The concurrent HNSW index: insert and query pipelines.
//!
//! # Algorithm Overview
//!
//! The index maintains a multi-layer proximity graph:
//! - Layer 0 contains every node with dense connections (up to `M0` neighbors)
//! - Higher layers contain geometrically thinner subsets (up to `M` neighbors)
//! - Insert and query both start at the entry point on the top layer and
//!   greedily descend; the bottom layers are searched with a wider beam (`ef`)
//!
//! # Concurrency
//!
//! All operations take `&self` and synchronize through fine-grained locks:
//! the entry point, the id counter, the layer RNG, and one lock per
//! (node, layer) neighbor list. No lock is ever held while acquiring
//! another, so the lock order is trivial and deadlock-free. Traversals size
//! their visited table from an id-space snapshot and ignore nodes inserted
//! after they started; a bidirectional edge is installed one side at a time,
//! so readers may observe it half-applied and must tolerate the asymmetry.

use crate::distance::{Euclidean, Metric};
use crate::error::{Error, Result};
use crate::node::{Node, NodeRef};
use crate::queue::{Candidate, CandidateQueue, ResultQueue, VisitedSet};
use crate::Settings;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Hard cap on the drawn top layer, as a guard against degenerate `ml`
/// settings. Unreachable in practice: with `ml = 1/ln(16)` the expected
/// share of nodes at layer 16 is 16^-16.
const MAX_LAYER: usize = 16;

/// One query match: the stored label, its vector, and the distance to the
/// query under the index's metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Label the item was inserted under.
    pub name: String,
    /// The stored vector.
    pub descriptor: Vec<f64>,
    /// Distance to the query (lower is closer).
    pub distance: f64,
}

/// A concurrent in-memory HNSW index over labeled `f64` vectors.
///
/// All operations take `&self`; share the index by reference or `Arc` to
/// insert and query from multiple threads. Items cannot be deleted or
/// updated; the graph only grows until the index is dropped.
///
/// # Example
///
/// ```
/// use smallworld::{Index, Settings};
///
/// # fn main() -> smallworld::Result<()> {
/// let index = Index::new(3, Settings::default())?;
/// index.insert("a", vec![1.0, 0.0, 0.0])?;
/// index.insert("b", vec![0.0, 1.0, 0.0])?;
///
/// let matches = index.search(&[1.0, 0.0, 0.0], 1)?;
/// assert_eq!(matches[0].name, "a");
/// # Ok(())
/// # }
/// ```
pub struct Index {
    /// Fixed vector dimension for every item.
    dim: usize,
    /// Distance capability, injected at construction.
    metric: Arc<dyn Metric>,
    /// Tuning parameters, immutable after construction.
    settings: Settings,
    /// Root of every traversal; always a node with the highest top layer.
    entry: Mutex<Option<NodeRef>>,
    /// Next dense id to issue. `len()` reads this as the item count.
    next_id: Mutex<u32>,
    /// Shared RNG for the top-layer draw.
    rng: Mutex<fastrand::Rng>,
}

impl Index {
    /// Create an empty index for `dim`-dimensional vectors with the
    /// Euclidean metric.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` if `dim` is zero or a setting
    /// violates its constraint.
    pub fn new(dim: usize, settings: Settings) -> Result<Self> {
        Self::with_metric(dim, settings, Arc::new(Euclidean))
    }

    /// Create an empty index with a caller-provided metric.
    pub fn with_metric(dim: usize, settings: Settings, metric: Arc<dyn Metric>) -> Result<Self> {
        if dim == 0 {
            return Err(Error::invalid_arg("dim", "must be positive"));
        }
        settings.validate()?;

        Ok(Self {
            dim,
            metric,
            settings,
            entry: Mutex::new(None),
            next_id: Mutex::new(0),
            rng: Mutex::new(fastrand::Rng::new()),
        })
    }

    /// Used by the snapshot loader, which rebuilds the graph by hand.
    pub(crate) fn assemble(
        dim: usize,
        settings: Settings,
        metric: Arc<dyn Metric>,
        entry: NodeRef,
        next_id: u32,
    ) -> Self {
        Self {
            dim,
            metric,
            settings,
            entry: Mutex::new(Some(entry)),
            next_id: Mutex::new(next_id),
            rng: Mutex::new(fastrand::Rng::new()),
        }
    }

    /// The vector dimension this index was created with.
    pub fn descriptor_size(&self) -> usize {
        self.dim
    }

    /// Number of items inserted so far.
    pub fn len(&self) -> usize {
        *self.next_id.lock() as usize
    }

    /// Whether the index holds no items.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The tuning parameters this index was created with.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Insert a labeled vector.
    ///
    /// Draws a random top layer, descends greedily from the entry point,
    /// then on each layer the new node lives on selects up to `M` diverse
    /// neighbors, installs bidirectional edges, and prunes any neighborhood
    /// the new edges pushed past its degree cap.
    ///
    /// # Errors
    ///
    /// Returns `Error::WrongDimension` if the vector length differs from
    /// the index dimension, and `Error::InvalidArgument` if the label
    /// contains `,` or a newline (the snapshot format cannot carry those).
    pub fn insert(&self, name: impl Into<String>, descriptor: Vec<f64>) -> Result<()> {
        let name = name.into();
        if descriptor.len() != self.dim {
            return Err(Error::WrongDimension {
                expected: self.dim,
                got: descriptor.len(),
            });
        }
        if name.contains(',') || name.contains('\n') {
            return Err(Error::invalid_arg(
                "name",
                "labels must not contain ',' or newlines",
            ));
        }

        let node_layer = self.random_layer();
        let node = self.create_node(name, descriptor, node_layer);

        let Some(mut entry) = self.entry_or_install(&node) else {
            // First node; it became the entry point and has no peers to link.
            return Ok(());
        };

        // Id-space snapshot: this traversal ignores nodes inserted after it.
        let candidates_count = self.len();

        let max_m_any = self.settings.m.max(self.settings.m0);
        let max_search = self.settings.ef_construction.max(max_m_any) + 1;

        let mut candidates = CandidateQueue::with_capacity(candidates_count);
        let mut visited = VisitedSet::new(candidates_count);
        let mut nearest = ResultQueue::with_capacity(max_search);
        let mut discarded: Vec<Candidate> = Vec::with_capacity(max_search);
        let mut neighbours: Vec<NodeRef> = Vec::with_capacity(max_m_any + 1);

        let entry_top = entry.top_layer;

        // Greedy descent through the layers above the new node's top layer.
        for layer in ((node_layer + 1)..=entry_top).rev() {
            self.search_at_layer(
                &node.descriptor,
                &entry,
                1,
                layer,
                &mut candidates,
                &mut visited,
                &mut nearest,
            );
            if let Some(best) = nearest.nearest() {
                entry = best.node.clone();
            }

            candidates.clear();
            visited.clear();
            nearest.clear();
        }

        // Wide search and edge installation on the layers the node lives on.
        for layer in (0..=node_layer.min(entry_top)).rev() {
            let max_m = if layer == 0 {
                self.settings.m0
            } else {
                self.settings.m
            };
            let ef = self.settings.ef_construction.max(max_m);

            self.search_at_layer(
                &node.descriptor,
                &entry,
                ef,
                layer,
                &mut candidates,
                &mut visited,
                &mut nearest,
            );
            if let Some(best) = nearest.nearest() {
                entry = best.node.clone();
            }

            // The initial fan-out from the new node is bounded by M on every
            // layer; only the post-hoc pruning below uses the layer-0 cap.
            let pool = nearest.take_sorted();
            self.select_neighbours(pool, self.settings.m, &mut discarded, &mut neighbours);
            discarded.clear();

            for other in &neighbours {
                node.add_neighbour(other.clone(), layer);
                other.add_neighbour(node.clone(), layer);
            }

            // Prune any neighborhood the new edges pushed past its cap. The
            // affected layer lock is held for the whole refill.
            for other in &neighbours {
                let mut hood = other.neighbours(layer).lock();
                if hood.len() > max_m {
                    let mut pool: Vec<Candidate> = hood
                        .iter()
                        .map(|third| {
                            Candidate::new(self.node_distance(other, third), third.clone())
                        })
                        .collect();
                    pool.sort_unstable();

                    hood.clear();
                    self.select_neighbours(pool, max_m, &mut discarded, &mut hood);
                    discarded.clear();
                }
            }

            candidates.clear();
            visited.clear();
            nearest.clear();
            neighbours.clear();
        }

        if node_layer > entry_top {
            self.set_entry_point(&node);
        }

        Ok(())
    }

    /// Find the `k` nearest items to `descriptor`.
    ///
    /// Results are sorted ascending by distance. An empty index yields an
    /// empty list. Concurrent inserts never invalidate a running query; a
    /// query simply does not see nodes inserted after it started.
    ///
    /// # Errors
    ///
    /// Returns `Error::WrongDimension` if the query vector length differs
    /// from the index dimension.
    pub fn search(&self, descriptor: &[f64], k: usize) -> Result<Vec<SearchResult>> {
        if descriptor.len() != self.dim {
            return Err(Error::WrongDimension {
                expected: self.dim,
                got: descriptor.len(),
            });
        }

        let Some(mut entry) = self.entry_point() else {
            return Ok(Vec::new());
        };

        let ef = self.settings.ef_search.max(k);
        let candidates_count = self.len();

        let mut candidates = CandidateQueue::with_capacity(candidates_count);
        let mut visited = VisitedSet::new(candidates_count);
        let mut nearest = ResultQueue::with_capacity(ef + 1);

        for layer in (1..=entry.top_layer).rev() {
            self.search_at_layer(
                descriptor,
                &entry,
                1,
                layer,
                &mut candidates,
                &mut visited,
                &mut nearest,
            );
            if let Some(best) = nearest.nearest() {
                entry = best.node.clone();
            }

            candidates.clear();
            visited.clear();
            nearest.clear();
        }

        self.search_at_layer(
            descriptor,
            &entry,
            ef,
            0,
            &mut candidates,
            &mut visited,
            &mut nearest,
        );

        Ok(nearest
            .take_sorted()
            .into_iter()
            .take(k)
            .map(|c| SearchResult {
                name: c.node.name.clone(),
                descriptor: c.node.descriptor.clone(),
                distance: c.distance,
            })
            .collect())
    }

    /// Best-first beam search restricted to one layer.
    ///
    /// Fills `results` with up to `ef` of the nearest nodes to `target`
    /// discovered on `layer`, starting from `entry`. With `ef = 1` this
    /// degenerates to greedy hill-climbing, which is how the upper-layer
    /// descent uses it. The scratch queues and visited table are caller
    /// owned so one insert can reuse them across layers.
    fn search_at_layer(
        &self,
        target: &[f64],
        entry: &NodeRef,
        ef: usize,
        layer: usize,
        candidates: &mut CandidateQueue,
        visited: &mut VisitedSet,
        results: &mut ResultQueue,
    ) {
        let entry_distance = self.metric.distance(target, &entry.descriptor);
        candidates.push(Candidate::new(entry_distance, entry.clone()));
        results.push(Candidate::new(entry_distance, entry.clone()));
        visited.insert(entry.id);

        let mut hood: Vec<NodeRef> = Vec::new();

        while let Some(candidate) = candidates.pop_nearest() {
            if candidate.distance > results.furthest_distance() {
                break;
            }

            // Snapshot the neighborhood so the lock is released before any
            // distance computation.
            hood.clear();
            hood.extend(candidate.node.neighbours(layer).lock().iter().cloned());

            for neighbour in &hood {
                // False both for already-seen nodes and for ids past the
                // snapshot bound (inserted after this traversal started).
                if !visited.insert(neighbour.id) {
                    continue;
                }

                let neighbour_distance = self.metric.distance(target, &neighbour.descriptor);
                if neighbour_distance < results.furthest_distance() || results.len() < ef {
                    candidates.push(Candidate::new(neighbour_distance, neighbour.clone()));
                    results.push(Candidate::new(neighbour_distance, neighbour.clone()));
                    if results.len() > ef {
                        results.pop_furthest();
                    }
                }
            }
        }
    }

    /// Choose up to `count` diverse neighbors from `pool` (sorted ascending
    /// by distance to the target).
    ///
    /// A candidate is accepted only if it is closer to the target than to
    /// every already-chosen neighbor, so each edge opens a genuinely new
    /// direction. With `keep_pruned` set, rejected candidates pad `chosen`
    /// back up to `count` in rejection order.
    fn select_neighbours(
        &self,
        pool: Vec<Candidate>,
        count: usize,
        discarded: &mut Vec<Candidate>,
        chosen: &mut Vec<NodeRef>,
    ) {
        for candidate in pool {
            if chosen.len() >= count {
                break;
            }

            let diverse = !chosen.iter().any(|picked| {
                self.metric.distance(&picked.descriptor, &candidate.node.descriptor)
                    < candidate.distance
            });

            if diverse {
                chosen.push(candidate.node);
            } else {
                discarded.push(candidate);
            }
        }

        if self.settings.keep_pruned {
            for candidate in discarded.iter() {
                if chosen.len() >= count {
                    break;
                }
                chosen.push(candidate.node.clone());
            }
        }
    }

    /// Draw a top layer from the geometric-tailed distribution
    /// `floor(-ln(u) * ml)` with `u` uniform in `(0, 1]`.
    fn random_layer(&self) -> usize {
        let unit = 1.0 - self.rng.lock().f64();
        let layer = (-unit.ln() * self.settings.ml) as usize;
        layer.min(MAX_LAYER)
    }

    fn generate_id(&self) -> u32 {
        let mut next = self.next_id.lock();
        let id = *next;
        *next += 1;
        id
    }

    fn create_node(&self, name: String, descriptor: Vec<f64>, top_layer: usize) -> NodeRef {
        // One spare slot per list tolerates the over-fill-then-prune pattern.
        Arc::new(Node::new(
            self.generate_id(),
            name,
            descriptor,
            top_layer + 1,
            self.settings.m + 1,
            self.settings.m0 + 1,
        ))
    }

    pub(crate) fn entry_point(&self) -> Option<NodeRef> {
        self.entry.lock().clone()
    }

    /// Return the current entry point, or install `node` as the first one.
    ///
    /// Check and install happen in one critical section, so of two writers
    /// racing on an empty index exactly one installs its node; the other
    /// receives the winner's and links into its graph normally.
    fn entry_or_install(&self, node: &NodeRef) -> Option<NodeRef> {
        let mut entry = self.entry.lock();
        match entry.as_ref() {
            Some(current) => Some(current.clone()),
            None => {
                *entry = Some(node.clone());
                None
            }
        }
    }

    /// Promote `node` to entry point if it strictly exceeds the current
    /// entry point's top layer. The entry point's top layer never decreases.
    fn set_entry_point(&self, node: &NodeRef) {
        let mut entry = self.entry.lock();
        let replace = match entry.as_ref() {
            Some(current) => node.top_layer > current.top_layer,
            None => true,
        };
        if replace {
            *entry = Some(node.clone());
        }
    }

    fn node_distance(&self, a: &Node, b: &Node) -> f64 {
        self.metric.distance(&a.descriptor, &b.descriptor)
    }

    /// Every node reachable from the entry point over layer-0 edges, in
    /// deterministic depth-first order. Covers the whole index: each insert
    /// leaves its node connected on layer 0.
    pub(crate) fn collect_nodes(&self) -> Vec<NodeRef> {
        let Some(entry) = self.entry_point() else {
            return Vec::new();
        };
        let bound = self.len();

        let mut visited = VisitedSet::new(bound);
        visited.insert(entry.id);

        let mut stack = Vec::with_capacity(bound);
        stack.push(entry);
        let mut nodes = Vec::with_capacity(bound);

        while let Some(node) = stack.pop() {
            let hood: Vec<NodeRef> = node.neighbours(0).lock().clone();
            nodes.push(node);

            for neighbour in hood {
                if visited.insert(neighbour.id) {
                    stack.push(neighbour);
                }
            }
        }

        nodes
    }
}

impl std::fmt::Debug for Index {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Index")
            .field("dim", &self.dim)
            .field("settings", &self.settings)
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

impl Drop for Index {
    fn drop(&mut self) {
        // Bidirectional edges form reference cycles; clear every adjacency
        // list so the nodes can actually be freed.
        for node in self.collect_nodes() {
            node.clear_neighbours();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::euclidean_distance_simd;

    fn uniform_points(count: usize, dim: usize, seed: u64) -> Vec<Vec<f64>> {
        let mut rng = fastrand::Rng::with_seed(seed);
        (0..count)
            .map(|_| (0..dim).map(|_| rng.f64()).collect())
            .collect()
    }

    fn fill(index: &Index, points: &[Vec<f64>]) {
        for (i, point) in points.iter().enumerate() {
            index.insert(format!("p{:04}", i), point.clone()).unwrap();
        }
    }

    /// Structural sweep: reachability, degree caps, no self-loops, entry
    /// point dominance, and the expected node count.
    fn check_graph(index: &Index, expected: usize) {
        let nodes = index.collect_nodes();
        assert_eq!(nodes.len(), expected, "layer-0 walk must cover every node");
        assert_eq!(index.len(), expected);

        let entry = index.entry_point().unwrap();
        let max_top = nodes.iter().map(|n| n.top_layer).max().unwrap();
        assert_eq!(entry.top_layer, max_top, "entry point must dominate");

        for node in &nodes {
            for layer in 0..node.layers_count() {
                let hood = node.neighbours(layer).lock();
                let cap = if layer == 0 {
                    index.settings().m0
                } else {
                    index.settings().m
                };
                assert!(
                    hood.len() <= cap,
                    "node {} layer {} has {} neighbours (cap {})",
                    node.id,
                    layer,
                    hood.len(),
                    cap
                );
                assert!(
                    hood.iter().all(|n| n.id != node.id),
                    "node {} has a self-loop on layer {}",
                    node.id,
                    layer
                );
            }
        }
    }

    #[test]
    fn test_empty_search() {
        let index = Index::new(3, Settings::default()).unwrap();
        assert!(index.is_empty());
        assert_eq!(index.search(&[0.0, 0.0, 0.0], 5).unwrap(), Vec::new());
    }

    #[test]
    fn test_single_insert() {
        let index = Index::new(3, Settings::default()).unwrap();
        index.insert("a", vec![1.0, 0.0, 0.0]).unwrap();

        let results = index.search(&[1.0, 0.0, 0.0], 1).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "a");
        assert_eq!(results[0].descriptor, vec![1.0, 0.0, 0.0]);
        assert_eq!(results[0].distance, 0.0);
    }

    #[test]
    fn test_two_point_distances() {
        let index = Index::new(2, Settings::default()).unwrap();
        index.insert("a", vec![0.0, 0.0]).unwrap();
        index.insert("b", vec![3.0, 4.0]).unwrap();

        let results = index.search(&[0.0, 0.0], 2).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].name, "a");
        assert_eq!(results[0].distance, 0.0);
        assert_eq!(results[1].name, "b");
        assert_eq!(results[1].distance, 5.0);
    }

    #[test]
    fn test_degree_caps_after_inserts() {
        let settings = Settings::with_m(4).with_ef_construction(32);
        assert_eq!(settings.m0, 8);
        let index = Index::new(2, settings).unwrap();

        fill(&index, &uniform_points(200, 2, 42));
        check_graph(&index, 200);
    }

    #[test]
    fn test_edges_are_bidirectional_before_any_pruning() {
        // Few enough points that no neighborhood ever exceeds its cap, so
        // every installed edge must still be symmetric. (Pruning later drops
        // single edge endpoints on purpose.)
        let index = Index::new(2, Settings::default()).unwrap();
        fill(&index, &uniform_points(10, 2, 9));

        let nodes = index.collect_nodes();
        assert_eq!(nodes.len(), 10);

        for node in &nodes {
            for layer in 0..node.layers_count() {
                for neighbour in node.neighbours(layer).lock().iter() {
                    let back = neighbour
                        .neighbours(layer)
                        .lock()
                        .iter()
                        .any(|n| n.id == node.id);
                    assert!(
                        back,
                        "edge {} -> {} on layer {} has no reverse",
                        node.id, neighbour.id, layer
                    );
                }
            }
        }
    }

    #[test]
    fn test_search_results_sorted_ascending() {
        let index = Index::new(4, Settings::default()).unwrap();
        fill(&index, &uniform_points(120, 4, 3));

        let results = index.search(&[0.5, 0.5, 0.5, 0.5], 10).unwrap();
        assert_eq!(results.len(), 10);
        for pair in results.windows(2) {
            assert!(pair[0].distance <= pair[1].distance);
        }
    }

    #[test]
    fn test_recall_against_brute_force() {
        let points = uniform_points(64, 8, 7);
        let settings = Settings::with_m(8).with_ef_search(50);
        let index = Index::new(8, settings).unwrap();
        fill(&index, &points);

        let mut agreed = 0;
        for query in &points {
            let brute_best = points
                .iter()
                .map(|p| euclidean_distance_simd(query, p))
                .fold(f64::INFINITY, f64::min);

            let results = index.search(query, 1).unwrap();
            if (results[0].distance - brute_best).abs() < 1e-12 {
                agreed += 1;
            }
        }

        assert!(
            agreed * 10 >= points.len() * 9,
            "top-1 agreed with brute force on only {}/{} queries",
            agreed,
            points.len()
        );
    }

    #[test]
    fn test_concurrent_inserts() {
        let threads = 4;
        let per_thread = 500;
        let settings = Settings::with_m(8).with_ef_construction(64);
        let index = Index::new(4, settings).unwrap();

        std::thread::scope(|scope| {
            for t in 0..threads {
                let index = &index;
                scope.spawn(move || {
                    let mut rng = fastrand::Rng::with_seed(100 + t as u64);
                    for i in 0..per_thread {
                        let point = (0..4).map(|_| rng.f64()).collect();
                        index.insert(format!("t{}-{:03}", t, i), point).unwrap();
                    }
                });
            }
        });

        check_graph(&index, threads * per_thread);

        // The collected node set is exactly the multiset of inserted labels.
        let mut names: Vec<String> = index
            .collect_nodes()
            .iter()
            .map(|n| n.name.clone())
            .collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), threads * per_thread);
    }

    #[test]
    fn test_concurrent_insert_and_search() {
        let index = Index::new(4, Settings::with_m(8)).unwrap();
        fill(&index, &uniform_points(100, 4, 11));

        std::thread::scope(|scope| {
            let writer = &index;
            scope.spawn(move || {
                let mut rng = fastrand::Rng::with_seed(12);
                for i in 0..200 {
                    let point = (0..4).map(|_| rng.f64()).collect();
                    writer.insert(format!("w{:03}", i), point).unwrap();
                }
            });

            for _ in 0..2 {
                let reader = &index;
                scope.spawn(move || {
                    let mut rng = fastrand::Rng::with_seed(13);
                    for _ in 0..200 {
                        let query: Vec<f64> = (0..4).map(|_| rng.f64()).collect();
                        let results = reader.search(&query, 5).unwrap();
                        assert!(!results.is_empty());
                        assert!(results.len() <= 5);
                    }
                });
            }
        });

        check_graph(&index, 300);
    }

    #[test]
    fn test_flat_index_with_zero_ml() {
        let settings = Settings::default().with_ml(0.0);
        let index = Index::new(2, settings).unwrap();
        fill(&index, &uniform_points(50, 2, 5));

        let entry = index.entry_point().unwrap();
        assert_eq!(entry.top_layer, 0, "ml = 0 must degenerate to a flat index");

        let results = index.search(&[0.5, 0.5], 3).unwrap();
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn test_wrong_dimension() {
        let index = Index::new(3, Settings::default()).unwrap();

        let err = index.insert("a", vec![1.0, 2.0]).unwrap_err();
        assert!(matches!(
            err,
            Error::WrongDimension {
                expected: 3,
                got: 2
            }
        ));

        index.insert("a", vec![1.0, 2.0, 3.0]).unwrap();
        let err = index.search(&[1.0], 1).unwrap_err();
        assert!(matches!(
            err,
            Error::WrongDimension {
                expected: 3,
                got: 1
            }
        ));
    }

    #[test]
    fn test_label_with_separator_rejected() {
        let index = Index::new(2, Settings::default()).unwrap();

        let err = index.insert("a,b", vec![0.0, 0.0]).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { field, .. } if field == "name"));

        let err = index.insert("a\nb", vec![0.0, 0.0]).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
    }

    #[test]
    fn test_invalid_construction() {
        let err = Index::new(0, Settings::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { field, .. } if field == "dim"));

        let mut settings = Settings::default();
        settings.m = 0;
        assert!(Index::new(3, settings).is_err());
    }

    #[test]
    fn test_index_is_send_sync() {
        fn check<T: Send + Sync>() {}
        check::<Index>();
    }
}
