//! Directed graph store for ERGM estimation.
//!
//! The graph is stored as forward and reverse adjacency lists (for fast
//! iteration over out- and in-neighbours) together with three dense
//! two-path count matrices that are maintained incrementally on every
//! arc insertion and removal. Statistics that depend on shared partners
//! (triangle and closure effects) read the matrices in O(1) instead of
//! intersecting neighbour lists.
//!
//! Nodes are numbered `0..n-1`.

/// Mutable digraph with incrementally maintained two-path matrices
pub mod digraph;

/// Binary, categorical, continuous and set-valued node attribute tables
pub mod attributes;

/// Snowball-sample zones for conditional estimation
pub mod snowball;

/// Citation-ERGM time periods (terms)
pub mod citation;

/// Arc-list and attribute file input/output
pub mod io;

pub use attributes::NodeAttributes;
pub use citation::CitationTerms;
pub use digraph::{Arc, ArcRemoval, Digraph, NodeId};
pub use snowball::SnowballSample;
