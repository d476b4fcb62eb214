//! Nodal attribute change statistics.
//!
//! Each statistic reads one attribute column, identified by an index into
//! the table its kind lives in ([`AttrStat::table`]). Missing values never
//! contribute: a missing binary/categorical value matches nothing, a
//! missing continuous value contributes zero.

use ergm_graph::{Digraph, NodeId};

/// Which attribute table a statistic's column index refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrTable {
    Binary,
    Categorical,
    Continuous,
    Set,
}

/// Nodal attribute statistic identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrStat {
    Sender,
    Receiver,
    Interaction,
    Matching,
    MatchingReciprocity,
    Mismatching,
    MismatchingReciprocity,
    ContinuousSender,
    ContinuousReceiver,
    Diff,
    DiffReciprocity,
    DiffSign,
    JaccardSimilarity,
}

impl AttrStat {
    pub fn from_name(name: &str) -> Option<Self> {
        use AttrStat::*;
        Some(match name {
            "Sender" => Sender,
            "Receiver" => Receiver,
            "Interaction" => Interaction,
            "Matching" => Matching,
            "MatchingReciprocity" => MatchingReciprocity,
            "Mismatching" => Mismatching,
            "MismatchingReciprocity" => MismatchingReciprocity,
            "ContinuousSender" => ContinuousSender,
            "ContinuousReceiver" => ContinuousReceiver,
            "Diff" => Diff,
            "DiffReciprocity" => DiffReciprocity,
            "DiffSign" => DiffSign,
            "JaccardSimilarity" => JaccardSimilarity,
            _ => return None,
        })
    }

    pub fn name(&self) -> &'static str {
        use AttrStat::*;
        match self {
            Sender => "Sender",
            Receiver => "Receiver",
            Interaction => "Interaction",
            Matching => "Matching",
            MatchingReciprocity => "MatchingReciprocity",
            Mismatching => "Mismatching",
            MismatchingReciprocity => "MismatchingReciprocity",
            ContinuousSender => "ContinuousSender",
            ContinuousReceiver => "ContinuousReceiver",
            Diff => "Diff",
            DiffReciprocity => "DiffReciprocity",
            DiffSign => "DiffSign",
            JaccardSimilarity => "JaccardSimilarity",
        }
    }

    /// The table the column index resolves against.
    pub fn table(&self) -> AttrTable {
        use AttrStat::*;
        match self {
            Sender | Receiver | Interaction => AttrTable::Binary,
            Matching | MatchingReciprocity | Mismatching | MismatchingReciprocity => {
                AttrTable::Categorical
            }
            ContinuousSender | ContinuousReceiver | Diff | DiffReciprocity | DiffSign => {
                AttrTable::Continuous
            }
            JaccardSimilarity => AttrTable::Set,
        }
    }

    /// Change in the statistic for adding arc `i -> j`, reading column `a`.
    pub fn change(&self, g: &Digraph, i: NodeId, j: NodeId, a: usize) -> f64 {
        use AttrStat::*;
        match self {
            Sender => bin01(g, a, i),
            Receiver => bin01(g, a, j),
            Interaction => bin01(g, a, i) * bin01(g, a, j),
            Matching => cat_match(g, a, i, j),
            MatchingReciprocity => {
                if i != j && g.is_arc(j, i) {
                    cat_match(g, a, i, j)
                } else {
                    0.0
                }
            }
            Mismatching => cat_mismatch(g, a, i, j),
            MismatchingReciprocity => {
                if i != j && g.is_arc(j, i) {
                    cat_mismatch(g, a, i, j)
                } else {
                    0.0
                }
            }
            ContinuousSender => cont0(g, a, i),
            ContinuousReceiver => cont0(g, a, j),
            Diff => cont_diff(g, a, i, j).abs(),
            DiffReciprocity => {
                if i != j && g.is_arc(j, i) {
                    cont_diff(g, a, i, j).abs()
                } else {
                    0.0
                }
            }
            DiffSign => match cont_diff(g, a, i, j).partial_cmp(&0.0) {
                Some(std::cmp::Ordering::Greater) => 1.0,
                Some(std::cmp::Ordering::Less) => -1.0,
                _ => 0.0,
            },
            JaccardSimilarity => jaccard(g, a, i, j),
        }
    }
}

fn bin01(g: &Digraph, a: usize, v: NodeId) -> f64 {
    match g.attrs.binary_value(a, v) {
        Some(true) => 1.0,
        _ => 0.0,
    }
}

fn cat_match(g: &Digraph, a: usize, i: NodeId, j: NodeId) -> f64 {
    match (
        g.attrs.categorical_value(a, i),
        g.attrs.categorical_value(a, j),
    ) {
        (Some(x), Some(y)) if x == y => 1.0,
        _ => 0.0,
    }
}

fn cat_mismatch(g: &Digraph, a: usize, i: NodeId, j: NodeId) -> f64 {
    match (
        g.attrs.categorical_value(a, i),
        g.attrs.categorical_value(a, j),
    ) {
        (Some(x), Some(y)) if x != y => 1.0,
        _ => 0.0,
    }
}

fn cont0(g: &Digraph, a: usize, v: NodeId) -> f64 {
    let x = g.attrs.continuous_value(a, v);
    if x.is_nan() {
        0.0
    } else {
        x
    }
}

/// `x_i - x_j`, zero if either value is missing.
fn cont_diff(g: &Digraph, a: usize, i: NodeId, j: NodeId) -> f64 {
    let (xi, xj) = (
        g.attrs.continuous_value(a, i),
        g.attrs.continuous_value(a, j),
    );
    if xi.is_nan() || xj.is_nan() {
        0.0
    } else {
        xi - xj
    }
}

fn jaccard(g: &Digraph, a: usize, i: NodeId, j: NodeId) -> f64 {
    match (g.attrs.set_value(a, i), g.attrs.set_value(a, j)) {
        (Some(si), Some(sj)) => {
            let union = si.union(sj).count();
            if union == 0 {
                0.0
            } else {
                si.intersection(sj).count() as f64 / union as f64
            }
        }
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fnv::FnvHashSet;

    fn attr_graph() -> Digraph {
        let mut g = Digraph::new(4);
        g.insert_arc(1, 0);
        g.attrs
            .add_binary("member", vec![Some(true), Some(false), None, Some(true)]);
        g.attrs
            .add_categorical("dept", vec![Some(0), Some(0), Some(1), None]);
        g.attrs
            .add_continuous("age", vec![30.0, 40.0, f64::NAN, 25.0]);
        let set = |items: &[u32]| Some(items.iter().copied().collect::<FnvHashSet<u32>>());
        g.attrs
            .add_set("skills", vec![set(&[1, 2]), set(&[2, 3]), None, set(&[])]);
        g
    }

    #[test]
    fn test_binary_stats() {
        let g = attr_graph();
        assert_eq!(AttrStat::Sender.change(&g, 0, 1, 0), 1.0);
        assert_eq!(AttrStat::Sender.change(&g, 1, 0, 0), 0.0);
        // missing is not true
        assert_eq!(AttrStat::Sender.change(&g, 2, 0, 0), 0.0);
        assert_eq!(AttrStat::Interaction.change(&g, 0, 3, 0), 1.0);
        assert_eq!(AttrStat::Interaction.change(&g, 0, 1, 0), 0.0);
    }

    #[test]
    fn test_categorical_stats() {
        let g = attr_graph();
        assert_eq!(AttrStat::Matching.change(&g, 0, 1, 0), 1.0);
        assert_eq!(AttrStat::Matching.change(&g, 0, 2, 0), 0.0);
        // missing never matches and never mismatches
        assert_eq!(AttrStat::Matching.change(&g, 0, 3, 0), 0.0);
        assert_eq!(AttrStat::Mismatching.change(&g, 0, 3, 0), 0.0);
        // arc 1 -> 0 exists, so 0 -> 1 reciprocates
        assert_eq!(AttrStat::MatchingReciprocity.change(&g, 0, 1, 0), 1.0);
        assert_eq!(AttrStat::MatchingReciprocity.change(&g, 1, 2, 0), 0.0);
    }

    #[test]
    fn test_continuous_stats() {
        let g = attr_graph();
        assert_eq!(AttrStat::ContinuousSender.change(&g, 0, 1, 0), 30.0);
        assert_eq!(AttrStat::ContinuousSender.change(&g, 2, 1, 0), 0.0);
        assert_eq!(AttrStat::Diff.change(&g, 0, 1, 0), 10.0);
        assert_eq!(AttrStat::Diff.change(&g, 0, 2, 0), 0.0);
        assert_eq!(AttrStat::DiffSign.change(&g, 1, 0, 0), 1.0);
        assert_eq!(AttrStat::DiffSign.change(&g, 0, 1, 0), -1.0);
    }

    #[test]
    fn test_jaccard() {
        let g = attr_graph();
        // {1,2} vs {2,3}: one shared of three
        assert!((AttrStat::JaccardSimilarity.change(&g, 0, 1, 0) - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(AttrStat::JaccardSimilarity.change(&g, 0, 2, 0), 0.0);
        // empty set: empty union
        assert_eq!(AttrStat::JaccardSimilarity.change(&g, 3, 3, 0), 0.0);
    }
}
