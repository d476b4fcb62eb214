//! Structural change statistics for directed graphs.
//!
//! Each variant computes the change in its statistic for adding arc
//! `i -> j`. The alternating ("geometrically weighted") effects take the
//! decay parameter lambda (> 1); the others ignore it. Where a statistic
//! depends on shared partners it reads the graph's two-path matrices
//! instead of intersecting neighbour lists.

use ergm_graph::{Digraph, NodeId};

/// Structural statistic identifiers, resolved once at configuration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuralStat {
    Arc,
    Reciprocity,
    Sink,
    Source,
    Isolates,
    InTwoStars,
    OutTwoStars,
    TwoPath,
    TransitiveTriad,
    CyclicTriad,
    AltInStars,
    AltOutStars,
    AltKTrianglesT,
    AltTwoPathsT,
    AltTwoPathsD,
}

impl StructuralStat {
    pub fn from_name(name: &str) -> Option<Self> {
        use StructuralStat::*;
        Some(match name {
            "Arc" => Arc,
            "Reciprocity" => Reciprocity,
            "Sink" => Sink,
            "Source" => Source,
            "Isolates" => Isolates,
            "InTwoStars" => InTwoStars,
            "OutTwoStars" => OutTwoStars,
            "TwoPath" => TwoPath,
            "TransitiveTriad" => TransitiveTriad,
            "CyclicTriad" => CyclicTriad,
            "AltInStars" => AltInStars,
            "AltOutStars" => AltOutStars,
            "AltKTrianglesT" => AltKTrianglesT,
            "AltTwoPathsT" => AltTwoPathsT,
            "AltTwoPathsD" => AltTwoPathsD,
            _ => return None,
        })
    }

    pub fn name(&self) -> &'static str {
        use StructuralStat::*;
        match self {
            Arc => "Arc",
            Reciprocity => "Reciprocity",
            Sink => "Sink",
            Source => "Source",
            Isolates => "Isolates",
            InTwoStars => "InTwoStars",
            OutTwoStars => "OutTwoStars",
            TwoPath => "TwoPath",
            TransitiveTriad => "TransitiveTriad",
            CyclicTriad => "CyclicTriad",
            AltInStars => "AltInStars",
            AltOutStars => "AltOutStars",
            AltKTrianglesT => "AltKTrianglesT",
            AltTwoPathsT => "AltTwoPathsT",
            AltTwoPathsD => "AltTwoPathsD",
        }
    }

    /// Change in the statistic for adding arc `i -> j` to `g`.
    pub fn change(&self, g: &Digraph, i: NodeId, j: NodeId, lambda: f64) -> f64 {
        use StructuralStat::*;
        match self {
            Arc => 1.0,
            Reciprocity => {
                if i != j && g.is_arc(j, i) {
                    1.0
                } else {
                    0.0
                }
            }
            Sink => {
                if i == j {
                    return 0.0;
                }
                let gained = g.indegree(j) == 0 && g.outdegree(j) == 0;
                let lost = g.outdegree(i) == 0 && g.indegree(i) > 0;
                (gained as i32 - lost as i32) as f64
            }
            Source => {
                if i == j {
                    return 0.0;
                }
                let gained = g.outdegree(i) == 0 && g.indegree(i) == 0;
                let lost = g.indegree(j) == 0 && g.outdegree(j) > 0;
                (gained as i32 - lost as i32) as f64
            }
            Isolates => {
                let isolate = |v: NodeId| g.indegree(v) == 0 && g.outdegree(v) == 0;
                if i == j {
                    -(isolate(i) as i32) as f64
                } else {
                    -((isolate(i) as i32 + isolate(j) as i32) as f64)
                }
            }
            InTwoStars => g.indegree(j) as f64,
            OutTwoStars => g.outdegree(i) as f64,
            TwoPath => {
                let recip = if i != j && g.is_arc(j, i) { 2 } else { 0 };
                (g.indegree(i) + g.outdegree(j)) as f64 - recip as f64
            }
            TransitiveTriad => {
                (g.mix_two_path(i, j) + g.in_two_path(i, j) + g.out_two_path(i, j)) as f64
            }
            CyclicTriad => g.mix_two_path(j, i) as f64,
            AltInStars => {
                debug_assert!(lambda > 1.0);
                let b = 1.0 - 1.0 / lambda;
                lambda * (1.0 - b.powi(g.indegree(j) as i32))
            }
            AltOutStars => {
                debug_assert!(lambda > 1.0);
                let b = 1.0 - 1.0 / lambda;
                lambda * (1.0 - b.powi(g.outdegree(i) as i32))
            }
            AltKTrianglesT => {
                debug_assert!(lambda > 1.0);
                let b = 1.0 - 1.0 / lambda;
                let mut delta = 0.0;
                // i -> j becomes a leg of two-paths closing existing arcs
                for &v in g.out_neighbors(j) {
                    if v == i || v == j {
                        continue;
                    }
                    if g.is_arc(i, v) {
                        delta += b.powi(g.mix_two_path(i, v) as i32);
                    }
                }
                for &v in g.in_neighbors(i) {
                    if v == i || v == j {
                        continue;
                    }
                    if g.is_arc(v, j) {
                        delta += b.powi(g.mix_two_path(v, j) as i32);
                    }
                }
                // and a new base closed by existing i -> v -> j two-paths
                delta + lambda * (1.0 - b.powi(g.mix_two_path(i, j) as i32))
            }
            AltTwoPathsT => {
                debug_assert!(lambda > 1.0);
                let b = 1.0 - 1.0 / lambda;
                let mut delta = 0.0;
                for &v in g.out_neighbors(j) {
                    if v == i || v == j {
                        continue;
                    }
                    delta += b.powi(g.mix_two_path(i, v) as i32);
                }
                for &v in g.in_neighbors(i) {
                    if v == i || v == j {
                        continue;
                    }
                    delta += b.powi(g.mix_two_path(v, j) as i32);
                }
                delta
            }
            AltTwoPathsD => {
                debug_assert!(lambda > 1.0);
                let b = 1.0 - 1.0 / lambda;
                let mut delta = 0.0;
                for &v in g.out_neighbors(i) {
                    if v == i || v == j {
                        continue;
                    }
                    delta += b.powi(g.out_two_path(v, j) as i32);
                }
                delta
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_roundtrip() {
        for name in [
            "Arc",
            "Reciprocity",
            "Sink",
            "Source",
            "Isolates",
            "InTwoStars",
            "OutTwoStars",
            "TwoPath",
            "TransitiveTriad",
            "CyclicTriad",
            "AltInStars",
            "AltOutStars",
            "AltKTrianglesT",
            "AltTwoPathsT",
            "AltTwoPathsD",
        ] {
            let stat = StructuralStat::from_name(name).unwrap();
            assert_eq!(stat.name(), name);
        }
        assert!(StructuralStat::from_name("NoSuchStat").is_none());
    }

    #[test]
    fn test_simple_deltas() {
        let mut g = Digraph::new(4);
        g.insert_arc(0, 1);
        g.insert_arc(1, 2);

        assert_eq!(StructuralStat::Arc.change(&g, 2, 3, 0.0), 1.0);
        // 1 -> 0 closes the 0 -> 1 dyad
        assert_eq!(StructuralStat::Reciprocity.change(&g, 1, 0, 0.0), 1.0);
        assert_eq!(StructuralStat::Reciprocity.change(&g, 2, 3, 0.0), 0.0);
        // node 3 is an isolate
        assert_eq!(StructuralStat::Isolates.change(&g, 2, 3, 0.0), -1.0);
        // adding 0 -> 2 gives node 2 indegree two
        assert_eq!(StructuralStat::InTwoStars.change(&g, 0, 2, 0.0), 1.0);
        // 0 -> 2 closes the two-path 0 -> 1 -> 2
        assert_eq!(StructuralStat::TransitiveTriad.change(&g, 0, 2, 0.0), 1.0);
        // 2 -> 0 closes the cycle 0 -> 1 -> 2 -> 0
        assert_eq!(StructuralStat::CyclicTriad.change(&g, 2, 0, 0.0), 1.0);
    }

    #[test]
    fn test_sink_source() {
        let mut g = Digraph::new(3);
        g.insert_arc(0, 1);
        // node 1 is a sink, node 0 a source, node 2 neither
        // 1 -> 2: node 1 stops being a sink, node 2 becomes one
        assert_eq!(StructuralStat::Sink.change(&g, 1, 2, 0.0), 0.0);
        // 2 -> 1: node 2 becomes a source, node 1 stays a sink
        assert_eq!(StructuralStat::Source.change(&g, 2, 1, 0.0), 1.0);
        // 2 -> 0: node 0 stops being a source
        assert_eq!(StructuralStat::Source.change(&g, 2, 0, 0.0), 0.0);
    }
}
