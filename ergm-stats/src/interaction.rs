//! Attribute interaction change statistics, taking a pair of columns.

use ergm_graph::{Digraph, NodeId};

/// Attribute interaction statistic identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrInteractionStat {
    /// Both endpoints match on each of two categorical columns
    MatchingInteraction,
}

impl AttrInteractionStat {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "MatchingInteraction" => Some(AttrInteractionStat::MatchingInteraction),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AttrInteractionStat::MatchingInteraction => "MatchingInteraction",
        }
    }

    /// Change in the statistic for adding arc `i -> j`, reading categorical
    /// columns `a` and `b`.
    pub fn change(&self, g: &Digraph, i: NodeId, j: NodeId, a: usize, b: usize) -> f64 {
        match self {
            AttrInteractionStat::MatchingInteraction => {
                let matches = |col: usize| {
                    matches!(
                        (
                            g.attrs.categorical_value(col, i),
                            g.attrs.categorical_value(col, j),
                        ),
                        (Some(x), Some(y)) if x == y
                    )
                };
                if matches(a) && matches(b) {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}
