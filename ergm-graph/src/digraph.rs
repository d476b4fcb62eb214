//! Mutable directed graph with incrementally maintained two-path matrices.
//!
//! The three N x N matrices count, for every ordered node pair:
//!
//! ```text
//! mix_two_path[a, b] = #{ v : a -> v and v -> b }   (directed path a -> v -> b)
//! in_two_path[a, b]  = #{ v : a -> v and b -> v }   (shared head, symmetric)
//! out_two_path[a, b] = #{ v : v -> a and v -> b }   (shared tail, symmetric)
//! ```
//!
//! They are updated in O(deg(i) + deg(j)) on every toggle of arc i -> j and
//! are never recomputed from the arc lists during sampling;
//! [`Digraph::two_paths_from_scratch`] exists for correctness testing only.
//! The dense matrices cost O(N^2) memory; a sparse map with the same
//! incremental-update contract is the replacement if node counts outgrow
//! that.

use crate::attributes::NodeAttributes;
use crate::citation::CitationTerms;
use crate::snowball::SnowballSample;
use fnv::FnvHashMap;
use ndarray::Array2;

/// Node identifier, an index in `0..num_nodes`.
pub type NodeId = u32;

/// A directed arc `tail -> head`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arc {
    /// Sending node
    pub tail: NodeId,
    /// Receiving node
    pub head: NodeId,
}

pub(crate) fn arc_key(i: NodeId, j: NodeId) -> u64 {
    ((i as u64) << 32) | j as u64
}

/// A flat arc list with an O(1) position index, supporting uniform random
/// selection, swap-removal, and exact slot restoration after an undo.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ArcPool {
    pub(crate) arcs: Vec<Arc>,
    pos: FnvHashMap<u64, usize>,
}

impl ArcPool {
    pub(crate) fn len(&self) -> usize {
        self.arcs.len()
    }

    pub(crate) fn get(&self, idx: usize) -> Arc {
        self.arcs[idx]
    }

    pub(crate) fn contains(&self, i: NodeId, j: NodeId) -> bool {
        self.pos.contains_key(&arc_key(i, j))
    }

    pub(crate) fn push(&mut self, arc: Arc) {
        self.pos.insert(arc_key(arc.tail, arc.head), self.arcs.len());
        self.arcs.push(arc);
    }

    /// Swap-remove the arc, returning the slot it occupied.
    pub(crate) fn remove(&mut self, i: NodeId, j: NodeId) -> usize {
        let slot = self
            .pos
            .remove(&arc_key(i, j))
            .expect("arc not present in pool");
        self.arcs.swap_remove(slot);
        if slot < self.arcs.len() {
            let moved = self.arcs[slot];
            self.pos.insert(arc_key(moved.tail, moved.head), slot);
        }
        slot
    }

    /// Put the arc back into the slot it was removed from, leaving the pool
    /// byte-for-byte as it was before the removal.
    pub(crate) fn restore(&mut self, arc: Arc, slot: usize) {
        let last = self.arcs.len();
        self.push(arc);
        if slot != last {
            self.arcs.swap(slot, last);
            let other = self.arcs[last];
            self.pos.insert(arc_key(other.tail, other.head), last);
            self.pos.insert(arc_key(arc.tail, arc.head), slot);
        }
    }
}

/// Token returned by [`Digraph::remove_arc`], recording every slot the arc
/// occupied so that [`Digraph::undo_removal`] restores the graph exactly
/// (adjacency-list order and pool order included). A rejected delete
/// proposal must leave no trace.
#[derive(Debug)]
pub struct ArcRemoval {
    arc: Arc,
    out_pos: usize,
    in_pos: usize,
    pool_slot: usize,
    inner_slot: Option<usize>,
    sender_slot: Option<usize>,
}

/// Directed graph over a fixed node set with derived two-path matrices,
/// node attributes, and optional conditional-estimation metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Digraph {
    num_nodes: usize,
    out_neighbors: Vec<Vec<NodeId>>,
    in_neighbors: Vec<Vec<NodeId>>,
    all_arcs: ArcPool,
    mix_two_path: Array2<u32>,
    in_two_path: Array2<u32>,
    out_two_path: Array2<u32>,
    /// Node attribute tables
    pub attrs: NodeAttributes,
    snowball: Option<SnowballSample>,
    citation: Option<CitationTerms>,
}

impl Digraph {
    /// Create an empty digraph with `num_nodes` nodes and no attributes.
    pub fn new(num_nodes: usize) -> Self {
        Digraph {
            num_nodes,
            out_neighbors: vec![Vec::new(); num_nodes],
            in_neighbors: vec![Vec::new(); num_nodes],
            all_arcs: ArcPool::default(),
            mix_two_path: Array2::zeros((num_nodes, num_nodes)),
            in_two_path: Array2::zeros((num_nodes, num_nodes)),
            out_two_path: Array2::zeros((num_nodes, num_nodes)),
            attrs: NodeAttributes::default(),
            snowball: None,
            citation: None,
        }
    }

    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    pub fn num_arcs(&self) -> usize {
        self.all_arcs.len()
    }

    /// Graph density `L / (N * (N - 1))`.
    pub fn density(&self) -> f64 {
        let n = self.num_nodes as f64;
        self.num_arcs() as f64 / (n * (n - 1.0))
    }

    #[inline]
    pub fn is_arc(&self, i: NodeId, j: NodeId) -> bool {
        self.all_arcs.contains(i, j)
    }

    pub fn out_neighbors(&self, i: NodeId) -> &[NodeId] {
        &self.out_neighbors[i as usize]
    }

    pub fn in_neighbors(&self, i: NodeId) -> &[NodeId] {
        &self.in_neighbors[i as usize]
    }

    pub fn outdegree(&self, i: NodeId) -> usize {
        self.out_neighbors[i as usize].len()
    }

    pub fn indegree(&self, i: NodeId) -> usize {
        self.in_neighbors[i as usize].len()
    }

    /// All arcs, in pool order. Uniform selection over this slice is how
    /// delete candidates are drawn.
    pub fn arcs(&self) -> &[Arc] {
        &self.all_arcs.arcs
    }

    /// Number of directed paths `i -> v -> j`.
    #[inline]
    pub fn mix_two_path(&self, i: NodeId, j: NodeId) -> u32 {
        self.mix_two_path[[i as usize, j as usize]]
    }

    /// Number of shared heads: `#{ v : i -> v and j -> v }`.
    #[inline]
    pub fn in_two_path(&self, i: NodeId, j: NodeId) -> u32 {
        self.in_two_path[[i as usize, j as usize]]
    }

    /// Number of shared tails: `#{ v : v -> i and v -> j }`.
    #[inline]
    pub fn out_two_path(&self, i: NodeId, j: NodeId) -> u32 {
        self.out_two_path[[i as usize, j as usize]]
    }

    pub fn snowball(&self) -> Option<&SnowballSample> {
        self.snowball.as_ref()
    }

    pub fn citation(&self) -> Option<&CitationTerms> {
        self.citation.as_ref()
    }

    /// Attach snowball-sampling zones (one wave number per node) and build
    /// the inner-arc pool and previous-wave degree counts from the current
    /// arc set. Fails if an existing arc skips a wave.
    pub fn attach_snowball(&mut self, zone: Vec<u32>) -> anyhow::Result<()> {
        anyhow::ensure!(
            zone.len() == self.num_nodes,
            "zone file has {} entries for {} nodes",
            zone.len(),
            self.num_nodes
        );
        let mut sb = SnowballSample::new(zone);
        for &arc in self.all_arcs.arcs.iter() {
            sb.seed_arc(arc)?;
        }
        self.snowball = Some(sb);
        Ok(())
    }

    /// Attach citation-ERGM terms (one time period per node) and build the
    /// pool of arcs sent from the last term.
    pub fn attach_citation(&mut self, term: Vec<u32>) -> anyhow::Result<()> {
        anyhow::ensure!(
            term.len() == self.num_nodes,
            "term file has {} entries for {} nodes",
            term.len(),
            self.num_nodes
        );
        let mut ct = CitationTerms::new(term);
        for &arc in self.all_arcs.arcs.iter() {
            ct.seed_arc(arc);
        }
        self.citation = Some(ct);
        Ok(())
    }

    /// Insert arc `i -> j`.
    ///
    /// Panics if the arc is already present: toggling an arc into a state
    /// it is already in is a contract violation, not a recoverable error.
    pub fn insert_arc(&mut self, i: NodeId, j: NodeId) {
        assert!((i as usize) < self.num_nodes && (j as usize) < self.num_nodes);
        assert!(!self.is_arc(i, j), "arc {} -> {} already present", i, j);
        // Matrices are updated while the arc itself is absent from the
        // adjacency lists, on both insert and remove.
        self.update_two_paths(i, j, 1);
        self.out_neighbors[i as usize].push(j);
        self.in_neighbors[j as usize].push(i);
        self.all_arcs.push(Arc { tail: i, head: j });
        if let Some(sb) = self.snowball.as_mut() {
            sb.arc_inserted(i, j);
        }
        if let Some(ct) = self.citation.as_mut() {
            ct.arc_inserted(i, j);
        }
    }

    /// Remove arc `i -> j`, returning a token that [`Digraph::undo_removal`]
    /// accepts to restore the graph exactly.
    ///
    /// Panics if the arc is not present.
    pub fn remove_arc(&mut self, i: NodeId, j: NodeId) -> ArcRemoval {
        assert!(self.is_arc(i, j), "arc {} -> {} not present", i, j);
        let out_pos = self.out_neighbors[i as usize]
            .iter()
            .position(|&v| v == j)
            .expect("adjacency list out of sync");
        self.out_neighbors[i as usize].swap_remove(out_pos);
        let in_pos = self.in_neighbors[j as usize]
            .iter()
            .position(|&v| v == i)
            .expect("adjacency list out of sync");
        self.in_neighbors[j as usize].swap_remove(in_pos);
        let pool_slot = self.all_arcs.remove(i, j);
        self.update_two_paths(i, j, -1);
        let inner_slot = self
            .snowball
            .as_mut()
            .and_then(|sb| sb.arc_removed(i, j));
        let sender_slot = self
            .citation
            .as_mut()
            .and_then(|ct| ct.arc_removed(i, j));
        ArcRemoval {
            arc: Arc { tail: i, head: j },
            out_pos,
            in_pos,
            pool_slot,
            inner_slot,
            sender_slot,
        }
    }

    /// Reverse a [`Digraph::remove_arc`]: every list and pool ends up
    /// byte-for-byte identical to its state before the removal.
    pub fn undo_removal(&mut self, removal: ArcRemoval) {
        let Arc { tail: i, head: j } = removal.arc;
        self.update_two_paths(i, j, 1);
        restore_at(&mut self.out_neighbors[i as usize], j, removal.out_pos);
        restore_at(&mut self.in_neighbors[j as usize], i, removal.in_pos);
        self.all_arcs.restore(removal.arc, removal.pool_slot);
        if let Some(sb) = self.snowball.as_mut() {
            sb.arc_restored(i, j, removal.inner_slot);
        }
        if let Some(ct) = self.citation.as_mut() {
            ct.arc_restored(i, j, removal.sender_slot);
        }
    }

    /// Incremental two-path update for a toggle of arc `i -> j`; the arc
    /// must not be in the adjacency lists when this runs. `delta` is +1
    /// (insert) or -1 (remove). Cost O(deg(i) + deg(j)).
    fn update_two_paths(&mut self, i: NodeId, j: NodeId, delta: i32) {
        let (iu, ju) = (i as usize, j as usize);
        // v <- i -> j : out-two-stars centred on i
        for k in 0..self.out_neighbors[iu].len() {
            let v = self.out_neighbors[iu][k];
            if v == i || v == j {
                continue;
            }
            bump(&mut self.out_two_path, v as usize, ju, delta);
            bump(&mut self.out_two_path, ju, v as usize, delta);
        }
        // v -> i -> j : mixed two-paths ending at j
        for k in 0..self.in_neighbors[iu].len() {
            let v = self.in_neighbors[iu][k];
            if v == i || v == j {
                continue;
            }
            bump(&mut self.mix_two_path, v as usize, ju, delta);
        }
        // i -> j -> v : mixed two-paths starting at i
        for k in 0..self.out_neighbors[ju].len() {
            let v = self.out_neighbors[ju][k];
            if v == i || v == j {
                continue;
            }
            bump(&mut self.mix_two_path, iu, v as usize, delta);
        }
        // v -> j <- i : in-two-stars centred on j
        for k in 0..self.in_neighbors[ju].len() {
            let v = self.in_neighbors[ju][k];
            if v == i || v == j {
                continue;
            }
            bump(&mut self.in_two_path, v as usize, iu, delta);
            bump(&mut self.in_two_path, iu, v as usize, delta);
        }
    }

    /// Recompute all three two-path matrices directly from the adjacency
    /// lists. Only used to verify the incremental maintenance in tests;
    /// sampling never calls this.
    pub fn two_paths_from_scratch(&self) -> (Array2<u32>, Array2<u32>, Array2<u32>) {
        let n = self.num_nodes;
        let mut mix = Array2::zeros((n, n));
        let mut in_ = Array2::zeros((n, n));
        let mut out = Array2::zeros((n, n));
        for k in 0..n {
            let kk = k as NodeId;
            for &a in &self.in_neighbors[k] {
                for &b in &self.out_neighbors[k] {
                    if a != b && a != kk && b != kk {
                        mix[[a as usize, b as usize]] += 1;
                    }
                }
            }
            for &a in &self.in_neighbors[k] {
                for &b in &self.in_neighbors[k] {
                    if a != b && a != kk && b != kk {
                        in_[[a as usize, b as usize]] += 1;
                    }
                }
            }
            for &a in &self.out_neighbors[k] {
                for &b in &self.out_neighbors[k] {
                    if a != b && a != kk && b != kk {
                        out[[a as usize, b as usize]] += 1;
                    }
                }
            }
        }
        (mix, in_, out)
    }
}

fn bump(mat: &mut Array2<u32>, a: usize, b: usize, delta: i32) {
    let v = &mut mat[[a, b]];
    if delta > 0 {
        *v += 1;
    } else {
        debug_assert!(*v > 0, "two-path count underflow at ({}, {})", a, b);
        *v -= 1;
    }
}

/// Push `value` and swap it into `slot`, undoing a prior `swap_remove(slot)`.
fn restore_at(list: &mut Vec<NodeId>, value: NodeId, slot: usize) {
    let last = list.len();
    list.push(value);
    if slot != last {
        list.swap(slot, last);
    }
}
