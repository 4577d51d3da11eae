//! smallworld - concurrent in-memory HNSW index
//!
//! smallworld builds a Hierarchical Navigable Small World graph over a
//! stream of labeled fixed-dimension vectors and answers k-nearest-neighbor
//! queries in sub-linear expected time, with tunable recall/throughput
//! trade-offs.
//!
//! # Core Philosophy
//!
//! - **Fine-grained locking**: writers only contend on the neighborhoods
//!   they touch; queries never block inserts
//! - **Snapshot isolation for traversals**: concurrent inserts never
//!   invalidate an in-flight query, it simply does not see the newest points
//! - **Pluggable distance**: one small capability trait, injected at
//!   construction; Euclidean by default
//! - **Plain-text snapshots**: the whole graph round-trips through a
//!   line-oriented dump for persistence and restore
//!
//! # Example
//!
//! ```no_run
//! use smallworld::{Index, Settings};
//!
//! # fn main() -> smallworld::Result<()> {
//! let index = Index::new(128, Settings::with_m(16).with_ef_search(50))?;
//!
//! index.insert("doc1", vec![0.1; 128])?;
//! index.insert("doc2", vec![0.2; 128])?;
//!
//! for hit in index.search(&vec![0.1; 128], 10)? {
//!     println!("{} at distance {}", hit.name, hit.distance);
//! }
//!
//! index.save("vectors.idx")?;
//! let restored = Index::open("vectors.idx")?;
//! assert_eq!(restored.len(), 2);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod distance;
pub mod error;
pub mod index;
mod node;
mod queue;
mod snapshot;

pub use distance::{Cosine, Euclidean, Metric};
pub use error::{Error, Result};
pub use index::{Index, SearchResult};

use serde::{Deserialize, Serialize};

/// Tuning parameters for the HNSW graph.
///
/// All numeric settings must be positive; `ml` may be zero, which
/// degenerates the structure to a flat single-layer index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Target degree on layers >= 1 (`M` in the paper).
    /// Typical values: 8-64. Higher = better recall, larger graph.
    pub m: usize,
    /// Degree cap on layer 0. Typically `2 * M`.
    pub m0: usize,
    /// Beam width during insert (`efConstruction` in the paper).
    pub ef_construction: usize,
    /// Default beam width during query (`efSearch` in the paper); queries
    /// asking for more than this many results widen the beam to `k`.
    pub ef_search: usize,
    /// Prefactor for the top-layer distribution (`mL` in the paper,
    /// `1/ln(M)` by default). Layer l holds roughly `M^-l` of the nodes.
    pub ml: f64,
    /// Pad pruned neighborhoods back up to the degree bound, trading some
    /// redundancy for constant fan-out.
    pub keep_pruned: bool,
}

impl Default for Settings {
    fn default() -> Self {
        // M=16 is a good default for most use cases
        let m = 16;
        Self {
            m,
            m0: 2 * m,
            ef_construction: 100,
            ef_search: 10,
            ml: 1.0 / (m as f64).ln(),
            keep_pruned: true,
        }
    }
}

impl Settings {
    /// Create settings with a specific `M`, deriving `m0 = 2 * M` and
    /// `ml = 1 / ln(M)`.
    pub fn with_m(m: usize) -> Self {
        Self {
            m,
            m0: 2 * m,
            ml: 1.0 / (m as f64).ln(),
            ..Self::default()
        }
    }

    /// Set the layer-0 degree cap.
    pub fn with_m0(mut self, m0: usize) -> Self {
        self.m0 = m0;
        self
    }

    /// Set the insert-time beam width.
    pub fn with_ef_construction(mut self, ef: usize) -> Self {
        self.ef_construction = ef;
        self
    }

    /// Set the query-time beam width.
    pub fn with_ef_search(mut self, ef: usize) -> Self {
        self.ef_search = ef;
        self
    }

    /// Set the top-layer distribution prefactor.
    pub fn with_ml(mut self, ml: f64) -> Self {
        self.ml = ml;
        self
    }

    /// Set whether pruned neighborhoods are padded back up to the bound.
    pub fn with_keep_pruned(mut self, keep: bool) -> Self {
        self.keep_pruned = keep;
        self
    }

    /// Check every setting against its constraint.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` naming the offending field.
    pub fn validate(&self) -> Result<()> {
        if self.m == 0 {
            return Err(Error::invalid_arg("m", "must be positive"));
        }
        if self.m0 == 0 {
            return Err(Error::invalid_arg("m0", "must be positive"));
        }
        if self.ef_construction == 0 {
            return Err(Error::invalid_arg("ef_construction", "must be positive"));
        }
        if self.ef_search == 0 {
            return Err(Error::invalid_arg("ef_search", "must be positive"));
        }
        if !self.ml.is_finite() || self.ml < 0.0 {
            return Err(Error::invalid_arg(
                "ml",
                "must be a non-negative finite number",
            ));
        }

        Ok(())
    }
}
