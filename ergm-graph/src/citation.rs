//! Citation-ERGM term metadata.
//!
//! A citation ERGM conditions on a time ordering of the nodes: every tie is
//! fixed except those sent by a node in the most recent term. The sampler
//! therefore only toggles arcs whose tail is in the last term, drawn from
//! the pool maintained here.

use crate::digraph::{Arc, ArcPool, NodeId};

/// Terms (time periods) and the pool of arcs sent from the last term.
#[derive(Debug, Clone, PartialEq)]
pub struct CitationTerms {
    /// Term (time period) per node
    pub term: Vec<u32>,
    /// Most recent term present
    pub max_term: u32,
    /// Nodes in the most recent term, in node order
    pub maxterm_nodes: Vec<NodeId>,
    pub(crate) sender_arcs: ArcPool,
}

impl CitationTerms {
    pub(crate) fn new(term: Vec<u32>) -> Self {
        let max_term = term.iter().copied().max().unwrap_or(0);
        let maxterm_nodes = (0..term.len() as NodeId)
            .filter(|&v| term[v as usize] == max_term)
            .collect();
        CitationTerms {
            term,
            max_term,
            maxterm_nodes,
            sender_arcs: ArcPool::default(),
        }
    }

    pub(crate) fn seed_arc(&mut self, arc: Arc) {
        self.arc_inserted(arc.tail, arc.head);
    }

    pub fn is_maxterm(&self, v: NodeId) -> bool {
        self.term[v as usize] == self.max_term
    }

    pub fn num_maxterm_nodes(&self) -> usize {
        self.maxterm_nodes.len()
    }

    pub fn num_sender_arcs(&self) -> usize {
        self.sender_arcs.len()
    }

    /// Arcs sent from the last term, in pool order.
    pub fn sender_arcs(&self) -> &[Arc] {
        &self.sender_arcs.arcs
    }

    pub(crate) fn arc_inserted(&mut self, i: NodeId, j: NodeId) {
        if self.is_maxterm(i) {
            self.sender_arcs.push(Arc { tail: i, head: j });
        }
    }

    pub(crate) fn arc_removed(&mut self, i: NodeId, j: NodeId) -> Option<usize> {
        if self.is_maxterm(i) {
            Some(self.sender_arcs.remove(i, j))
        } else {
            None
        }
    }

    pub(crate) fn arc_restored(&mut self, i: NodeId, j: NodeId, slot: Option<usize>) {
        if let Some(slot) = slot {
            debug_assert!(self.is_maxterm(i));
            self.sender_arcs.restore(Arc { tail: i, head: j }, slot);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::digraph::Digraph;

    #[test]
    fn test_sender_pool() {
        let mut g = Digraph::new(4);
        g.insert_arc(0, 1); // old term, fixed
        g.insert_arc(2, 0);
        g.insert_arc(3, 1);
        g.attach_citation(vec![0, 0, 1, 1]).unwrap();

        let ct = g.citation().unwrap();
        assert_eq!(ct.max_term, 1);
        assert_eq!(ct.maxterm_nodes, vec![2, 3]);
        assert_eq!(ct.num_sender_arcs(), 2);

        g.insert_arc(2, 1);
        assert_eq!(g.citation().unwrap().num_sender_arcs(), 3);
        let removal = g.remove_arc(2, 0);
        assert_eq!(g.citation().unwrap().num_sender_arcs(), 2);
        g.undo_removal(removal);
        assert_eq!(g.citation().unwrap().num_sender_arcs(), 3);

        // removing an old-term arc leaves the pool alone
        let removal = g.remove_arc(0, 1);
        assert_eq!(g.citation().unwrap().num_sender_arcs(), 3);
        g.undo_removal(removal);
    }
}
