//! Snowball-sample zone metadata for conditional estimation.
//!
//! In a snowball design the ties of the outermost wave (and between the
//! outermost and second-outermost waves) are fixed: only arcs between
//! "inner" nodes (wave < max wave) may be toggled, an added tie may not
//! skip a wave, and a tie may not be deleted if it is the last one
//! connecting a node to its preceding wave. Wave numbering ignores arc
//! direction, as the sampling procedure does.

use crate::digraph::{Arc, ArcPool, NodeId};

/// Zones (wave numbers), the inner-arc pool, and previous-wave degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct SnowballSample {
    /// Wave number per node; wave 0 is the seed set
    pub zone: Vec<u32>,
    /// Largest wave number present
    pub max_zone: u32,
    /// Nodes with `zone < max_zone`, in node order
    pub inner_nodes: Vec<NodeId>,
    pub(crate) inner_arcs: ArcPool,
    /// Per node, the number of ties (ignoring direction) to nodes in the
    /// preceding wave. A delete move must not take this to zero.
    pub prev_wave_degree: Vec<u32>,
}

impl SnowballSample {
    pub(crate) fn new(zone: Vec<u32>) -> Self {
        let max_zone = zone.iter().copied().max().unwrap_or(0);
        let inner_nodes = (0..zone.len() as NodeId)
            .filter(|&v| zone[v as usize] < max_zone)
            .collect();
        let n = zone.len();
        SnowballSample {
            zone,
            max_zone,
            inner_nodes,
            inner_arcs: ArcPool::default(),
            prev_wave_degree: vec![0; n],
        }
    }

    /// Account for an arc already in the graph when zones are attached.
    /// Fails if the arc skips a wave, which no snowball sample can contain.
    pub(crate) fn seed_arc(&mut self, arc: Arc) -> anyhow::Result<()> {
        let (zi, zj) = (self.zone[arc.tail as usize], self.zone[arc.head as usize]);
        anyhow::ensure!(
            zi.abs_diff(zj) <= 1,
            "arc {} -> {} connects waves {} and {}, not a snowball sample",
            arc.tail,
            arc.head,
            zi,
            zj
        );
        self.arc_inserted(arc.tail, arc.head);
        Ok(())
    }

    pub fn is_inner(&self, v: NodeId) -> bool {
        self.zone[v as usize] < self.max_zone
    }

    pub fn num_inner_nodes(&self) -> usize {
        self.inner_nodes.len()
    }

    pub fn num_inner_arcs(&self) -> usize {
        self.inner_arcs.len()
    }

    /// Arcs with both endpoints inner, in pool order.
    pub fn inner_arcs(&self) -> &[Arc] {
        &self.inner_arcs.arcs
    }

    pub(crate) fn arc_inserted(&mut self, i: NodeId, j: NodeId) {
        let (zi, zj) = (self.zone[i as usize], self.zone[j as usize]);
        if zi == zj + 1 {
            self.prev_wave_degree[i as usize] += 1;
        } else if zj == zi + 1 {
            self.prev_wave_degree[j as usize] += 1;
        }
        if self.is_inner(i) && self.is_inner(j) {
            self.inner_arcs.push(Arc { tail: i, head: j });
        }
    }

    pub(crate) fn arc_removed(&mut self, i: NodeId, j: NodeId) -> Option<usize> {
        let (zi, zj) = (self.zone[i as usize], self.zone[j as usize]);
        if zi == zj + 1 {
            self.prev_wave_degree[i as usize] -= 1;
        } else if zj == zi + 1 {
            self.prev_wave_degree[j as usize] -= 1;
        }
        if self.is_inner(i) && self.is_inner(j) {
            Some(self.inner_arcs.remove(i, j))
        } else {
            None
        }
    }

    pub(crate) fn arc_restored(&mut self, i: NodeId, j: NodeId, slot: Option<usize>) {
        let (zi, zj) = (self.zone[i as usize], self.zone[j as usize]);
        if zi == zj + 1 {
            self.prev_wave_degree[i as usize] += 1;
        } else if zj == zi + 1 {
            self.prev_wave_degree[j as usize] += 1;
        }
        if let Some(slot) = slot {
            self.inner_arcs.restore(Arc { tail: i, head: j }, slot);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::digraph::Digraph;

    /// Two seed nodes, two wave-1 nodes, two wave-2 (outermost) nodes.
    fn snowball_graph() -> Digraph {
        let mut g = Digraph::new(6);
        g.insert_arc(0, 1);
        g.insert_arc(0, 2);
        g.insert_arc(1, 3);
        g.insert_arc(2, 3);
        g.insert_arc(2, 4);
        g.insert_arc(3, 5);
        g.attach_snowball(vec![0, 0, 1, 1, 2, 2]).unwrap();
        g
    }

    #[test]
    fn test_inner_structure() {
        let g = snowball_graph();
        let sb = g.snowball().unwrap();
        assert_eq!(sb.max_zone, 2);
        assert_eq!(sb.inner_nodes, vec![0, 1, 2, 3]);
        // inner arcs: 0->1, 0->2, 1->3, 2->3
        assert_eq!(sb.num_inner_arcs(), 4);
        // wave-1 nodes each have one tie to wave 0; 2->3 is within wave 1
        assert_eq!(sb.prev_wave_degree[2], 1);
        assert_eq!(sb.prev_wave_degree[3], 1);
        assert_eq!(sb.prev_wave_degree[0], 0);
        // outermost nodes count their ties to wave 1
        assert_eq!(sb.prev_wave_degree[4], 1);
        assert_eq!(sb.prev_wave_degree[5], 1);
    }

    #[test]
    fn test_pool_follows_toggles() {
        let mut g = snowball_graph();
        g.insert_arc(1, 2);
        assert_eq!(g.snowball().unwrap().num_inner_arcs(), 5);
        let removal = g.remove_arc(1, 3);
        assert_eq!(g.snowball().unwrap().num_inner_arcs(), 4);
        assert_eq!(g.snowball().unwrap().prev_wave_degree[3], 0);
        g.undo_removal(removal);
        assert_eq!(g.snowball().unwrap().num_inner_arcs(), 5);
        assert_eq!(g.snowball().unwrap().prev_wave_degree[3], 1);
    }

    #[test]
    fn test_wave_skipping_arc_rejected() {
        let mut g = Digraph::new(3);
        g.insert_arc(0, 2);
        assert!(g.attach_snowball(vec![0, 1, 2]).is_err());
    }
}
