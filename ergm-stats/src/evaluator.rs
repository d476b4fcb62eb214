//! The configured statistic list and change-statistic evaluation.
//!
//! A [`ChangeStatsModel`] is an ordered selection of statistics, built once
//! before estimation and immutable during a run. The parameter vector theta
//! shares its ordering: structural, attribute, dyadic, then interaction
//! statistics, concatenated.

use crate::attribute::{AttrStat, AttrTable};
use crate::dyadic::DyadicStat;
use crate::interaction::AttrInteractionStat;
use crate::structural::StructuralStat;
use anyhow::{anyhow, bail};
use ergm_graph::{Digraph, NodeId};
use ndarray::Array1;

/// Decay used for alternating statistics when none is given in the spec.
pub const DEFAULT_LAMBDA: f64 = 2.0;

#[derive(Debug, Clone)]
struct AttrParam {
    stat: AttrStat,
    index: usize,
    column: String,
}

#[derive(Debug, Clone)]
struct InteractionParam {
    stat: AttrInteractionStat,
    indices: (usize, usize),
    columns: (String, String),
}

/// Ordered change-statistic specification; defines the dimension and
/// ordering of theta.
#[derive(Debug, Clone, Default)]
pub struct ChangeStatsModel {
    structural: Vec<(StructuralStat, f64)>,
    attribute: Vec<AttrParam>,
    dyadic: Vec<DyadicStat>,
    interaction: Vec<InteractionParam>,
}

impl ChangeStatsModel {
    pub fn new() -> Self {
        ChangeStatsModel::default()
    }

    pub fn add_structural(&mut self, stat: StructuralStat, lambda: f64) -> &mut Self {
        self.structural.push((stat, lambda));
        self
    }

    pub fn add_attribute(&mut self, stat: AttrStat, index: usize, column: &str) -> &mut Self {
        self.attribute.push(AttrParam {
            stat,
            index,
            column: column.to_owned(),
        });
        self
    }

    pub fn add_dyadic(&mut self, stat: DyadicStat) -> &mut Self {
        self.dyadic.push(stat);
        self
    }

    pub fn add_interaction(
        &mut self,
        stat: AttrInteractionStat,
        indices: (usize, usize),
        columns: (&str, &str),
    ) -> &mut Self {
        self.interaction.push(InteractionParam {
            stat,
            indices,
            columns: (columns.0.to_owned(), columns.1.to_owned()),
        });
        self
    }

    /// Build a model from textual specs, resolving attribute column names
    /// against the loaded graph. Spec syntax: `Name`, `Name(lambda)` for
    /// structural, `Name(column)` for attribute, `Name(column,column)` for
    /// interaction statistics.
    pub fn from_specs(
        g: &Digraph,
        structural: &[String],
        attribute: &[String],
        dyadic: &[String],
        interaction: &[String],
    ) -> anyhow::Result<Self> {
        let mut model = ChangeStatsModel::new();
        for spec in structural {
            let (name, args) = parse_spec(spec)?;
            let stat = StructuralStat::from_name(name)
                .ok_or_else(|| anyhow!("unknown structural statistic {:?}", name))?;
            let lambda = match args.as_slice() {
                [] => DEFAULT_LAMBDA,
                [l] => l
                    .parse::<f64>()
                    .map_err(|_| anyhow!("bad decay value {:?} for {}", l, name))?,
                _ => bail!("{}: expected at most one decay argument", name),
            };
            model.add_structural(stat, lambda);
        }
        for spec in attribute {
            let (name, args) = parse_spec(spec)?;
            let stat = AttrStat::from_name(name)
                .ok_or_else(|| anyhow!("unknown attribute statistic {:?}", name))?;
            let [column] = args.as_slice() else {
                bail!("{}: expected exactly one attribute name", name);
            };
            let index = find_column(g, stat.table(), column)
                .ok_or_else(|| anyhow!("{}: no {:?} attribute named {:?}", name, stat.table(), column))?;
            model.add_attribute(stat, index, column);
        }
        for spec in dyadic {
            let (name, args) = parse_spec(spec)?;
            let stat = DyadicStat::from_name(name)
                .ok_or_else(|| anyhow!("unknown dyadic statistic {:?}", name))?;
            if !args.is_empty() {
                bail!("{}: dyadic statistics take no arguments", name);
            }
            match stat {
                DyadicStat::GeoDistance | DyadicStat::LogGeoDistance => {
                    if g.attrs.latitude_index.is_none() || g.attrs.longitude_index.is_none() {
                        bail!("{}: no latitude/longitude attribute columns loaded", name);
                    }
                }
                DyadicStat::EuclideanDistance => {
                    if g.attrs.x_index.is_none() || g.attrs.y_index.is_none() {
                        bail!("{}: no x/y attribute columns loaded", name);
                    }
                }
            }
            model.add_dyadic(stat);
        }
        for spec in interaction {
            let (name, args) = parse_spec(spec)?;
            let stat = AttrInteractionStat::from_name(name)
                .ok_or_else(|| anyhow!("unknown interaction statistic {:?}", name))?;
            let [a, b] = args.as_slice() else {
                bail!("{}: expected exactly two attribute names", name);
            };
            let ia = g
                .attrs
                .find_categorical(a)
                .ok_or_else(|| anyhow!("{}: no categorical attribute named {:?}", name, a))?;
            let ib = g
                .attrs
                .find_categorical(b)
                .ok_or_else(|| anyhow!("{}: no categorical attribute named {:?}", name, b))?;
            model.add_interaction(stat, (ia, ib), (*a, *b));
        }
        Ok(model)
    }

    /// Total number of parameters (dimension of theta).
    pub fn num_params(&self) -> usize {
        self.structural.len() + self.attribute.len() + self.dyadic.len() + self.interaction.len()
    }

    /// Whether an explicit Arc parameter is configured (disallowed with the
    /// IFD sampler, which derives it from the auxiliary parameter).
    pub fn has_arc_param(&self) -> bool {
        self.structural
            .iter()
            .any(|(s, _)| *s == StructuralStat::Arc)
    }

    /// Display names, one per parameter, in theta order. Attribute
    /// statistics are suffixed with their column name.
    pub fn param_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.num_params());
        for (stat, _) in &self.structural {
            names.push(stat.name().to_owned());
        }
        for p in &self.attribute {
            names.push(format!("{}_{}", p.stat.name(), p.column));
        }
        for stat in &self.dyadic {
            names.push(stat.name().to_owned());
        }
        for p in &self.interaction {
            names.push(format!(
                "{}_{}_{}",
                p.stat.name(),
                p.columns.0,
                p.columns.1
            ));
        }
        names
    }

    /// Evaluate every configured statistic for a toggle of arc `i -> j`.
    ///
    /// `changestats` receives the *add* deltas (never negated); the
    /// returned total is `theta . changestats`, negated when `is_delete`.
    /// For a delete move the caller must already have removed the arc, so
    /// the add deltas are evaluated on the arc-free graph and the negated
    /// dot product is the true delete score.
    pub fn calc_change_stats(
        &self,
        g: &Digraph,
        i: NodeId,
        j: NodeId,
        theta: &Array1<f64>,
        is_delete: bool,
        changestats: &mut Array1<f64>,
    ) -> f64 {
        debug_assert_eq!(theta.len(), self.num_params());
        debug_assert_eq!(changestats.len(), self.num_params());
        debug_assert!(!g.is_arc(i, j), "candidate arc must be absent when scoring");
        let sign = if is_delete { -1.0 } else { 1.0 };
        let mut total = 0.0;
        let mut l = 0;
        for (stat, lambda) in &self.structural {
            let d = stat.change(g, i, j, *lambda);
            changestats[l] = d;
            total += theta[l] * sign * d;
            l += 1;
        }
        for p in &self.attribute {
            let d = p.stat.change(g, i, j, p.index);
            changestats[l] = d;
            total += theta[l] * sign * d;
            l += 1;
        }
        for stat in &self.dyadic {
            let d = stat.change(g, i, j);
            changestats[l] = d;
            total += theta[l] * sign * d;
            l += 1;
        }
        for p in &self.interaction {
            let d = p.stat.change(g, i, j, p.indices.0, p.indices.1);
            changestats[l] = d;
            total += theta[l] * sign * d;
            l += 1;
        }
        total
    }
}

/// Split `Name` / `Name(arg)` / `Name(arg,arg)`.
fn parse_spec(spec: &str) -> anyhow::Result<(&str, Vec<&str>)> {
    let spec = spec.trim();
    match spec.find('(') {
        None => Ok((spec, vec![])),
        Some(open) => {
            if !spec.ends_with(')') {
                bail!("malformed statistic spec {:?}", spec);
            }
            let name = &spec[..open];
            let args = spec[open + 1..spec.len() - 1]
                .split(',')
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .collect();
            Ok((name, args))
        }
    }
}

fn find_column(g: &Digraph, table: AttrTable, name: &str) -> Option<usize> {
    match table {
        AttrTable::Binary => g.attrs.find_binary(name),
        AttrTable::Categorical => g.attrs.find_categorical(name),
        AttrTable::Continuous => g.attrs.find_continuous(name),
        AttrTable::Set => g.attrs.find_set(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    const LAMBDA: f64 = 2.0;

    fn random_graph(n: usize, p: f64, seed: u64) -> Digraph {
        let mut g = Digraph::new(n);
        let mut rng = SmallRng::seed_from_u64(seed);
        for i in 0..n as NodeId {
            for j in 0..n as NodeId {
                if i != j && rng.random::<f64>() < p {
                    g.insert_arc(i, j);
                }
            }
        }
        g
    }

    fn choose2(d: usize) -> f64 {
        (d * d.saturating_sub(1)) as f64 / 2.0
    }

    /// Whole-graph statistic value, counted directly.
    fn brute_force(g: &Digraph, stat: StructuralStat, lambda: f64) -> f64 {
        use StructuralStat::*;
        let n = g.num_nodes();
        let b = 1.0 - 1.0 / lambda;
        let (mix, _in2p, out2p) = g.two_paths_from_scratch();
        match stat {
            Arc => g.num_arcs() as f64,
            Reciprocity => {
                let mut count = 0;
                for a in 0..n as NodeId {
                    for c in 0..n as NodeId {
                        if a < c && g.is_arc(a, c) && g.is_arc(c, a) {
                            count += 1;
                        }
                    }
                }
                count as f64
            }
            Sink => (0..n as NodeId)
                .filter(|&v| g.indegree(v) > 0 && g.outdegree(v) == 0)
                .count() as f64,
            Source => (0..n as NodeId)
                .filter(|&v| g.outdegree(v) > 0 && g.indegree(v) == 0)
                .count() as f64,
            Isolates => (0..n as NodeId)
                .filter(|&v| g.indegree(v) == 0 && g.outdegree(v) == 0)
                .count() as f64,
            InTwoStars => (0..n as NodeId).map(|v| choose2(g.indegree(v))).sum(),
            OutTwoStars => (0..n as NodeId).map(|v| choose2(g.outdegree(v))).sum(),
            TwoPath => mix.iter().map(|&c| c as f64).sum(),
            TransitiveTriad => g
                .arcs()
                .iter()
                .map(|a| mix[[a.tail as usize, a.head as usize]] as f64)
                .sum(),
            CyclicTriad => {
                let total: f64 = g
                    .arcs()
                    .iter()
                    .map(|a| mix[[a.head as usize, a.tail as usize]] as f64)
                    .sum();
                total / 3.0
            }
            AltInStars => {
                lambda
                    * lambda
                    * (0..n as NodeId)
                        .map(|v| {
                            let d = g.indegree(v);
                            b.powi(d as i32) - 1.0 + d as f64 / lambda
                        })
                        .sum::<f64>()
            }
            AltOutStars => {
                lambda
                    * lambda
                    * (0..n as NodeId)
                        .map(|v| {
                            let d = g.outdegree(v);
                            b.powi(d as i32) - 1.0 + d as f64 / lambda
                        })
                        .sum::<f64>()
            }
            AltKTrianglesT => {
                lambda
                    * g.arcs()
                        .iter()
                        .map(|a| 1.0 - b.powi(mix[[a.tail as usize, a.head as usize]] as i32))
                        .sum::<f64>()
            }
            AltTwoPathsT => {
                let mut total = 0.0;
                for a in 0..n {
                    for c in 0..n {
                        if a != c {
                            total += 1.0 - b.powi(mix[[a, c]] as i32);
                        }
                    }
                }
                lambda * total
            }
            AltTwoPathsD => {
                let mut total = 0.0;
                for a in 0..n {
                    for c in (a + 1)..n {
                        total += 1.0 - b.powi(out2p[[a, c]] as i32);
                    }
                }
                lambda * total
            }
        }
    }

    /// Empty-graph value of the statistic (all deltas accumulate on top).
    fn empty_value(stat: StructuralStat, n: usize) -> f64 {
        match stat {
            StructuralStat::Isolates => n as f64,
            _ => 0.0,
        }
    }

    const ALL_STATS: [StructuralStat; 15] = [
        StructuralStat::Arc,
        StructuralStat::Reciprocity,
        StructuralStat::Sink,
        StructuralStat::Source,
        StructuralStat::Isolates,
        StructuralStat::InTwoStars,
        StructuralStat::OutTwoStars,
        StructuralStat::TwoPath,
        StructuralStat::TransitiveTriad,
        StructuralStat::CyclicTriad,
        StructuralStat::AltInStars,
        StructuralStat::AltOutStars,
        StructuralStat::AltKTrianglesT,
        StructuralStat::AltTwoPathsT,
        StructuralStat::AltTwoPathsD,
    ];

    /// Summing each statistic's change over an arc insertion sequence must
    /// reproduce the whole-graph statistic counted directly at the end.
    #[test]
    fn test_deltas_accumulate_to_brute_force() {
        let n = 10;
        let mut rng = SmallRng::seed_from_u64(7);
        let mut g = Digraph::new(n);
        let mut acc: Vec<f64> = ALL_STATS.iter().map(|&s| empty_value(s, n)).collect();

        for _ in 0..120 {
            let i = rng.random_range(0..n as NodeId);
            let j = rng.random_range(0..n as NodeId);
            if i == j || g.is_arc(i, j) {
                continue;
            }
            for (k, stat) in ALL_STATS.iter().enumerate() {
                acc[k] += stat.change(&g, i, j, LAMBDA);
            }
            g.insert_arc(i, j);
        }

        for (k, stat) in ALL_STATS.iter().enumerate() {
            let direct = brute_force(&g, *stat, LAMBDA);
            assert_abs_diff_eq!(acc[k], direct, epsilon = 1e-8);
        }
    }

    /// Delete/add symmetry: for an arc present in the graph, the change
    /// statistic evaluated after removing it equals the drop in the
    /// whole-graph statistic caused by the removal.
    #[test]
    fn test_delete_add_symmetry() {
        let g0 = random_graph(9, 0.25, 21);
        let arcs: Vec<_> = g0.arcs().to_vec();
        for arc in arcs.iter().take(12) {
            let mut g = g0.clone();
            let before: Vec<f64> = ALL_STATS
                .iter()
                .map(|&s| brute_force(&g, s, LAMBDA))
                .collect();
            g.remove_arc(arc.tail, arc.head);
            for (k, stat) in ALL_STATS.iter().enumerate() {
                let after = brute_force(&g, *stat, LAMBDA);
                let delta = stat.change(&g, arc.tail, arc.head, LAMBDA);
                assert_abs_diff_eq!(before[k] - after, delta, epsilon = 1e-8);
            }
        }
    }

    #[test]
    fn test_calc_change_stats_sign_convention() {
        let mut g = random_graph(8, 0.3, 5);
        let mut model = ChangeStatsModel::new();
        model
            .add_structural(StructuralStat::Arc, 0.0)
            .add_structural(StructuralStat::Reciprocity, 0.0)
            .add_structural(StructuralStat::AltInStars, LAMBDA);
        let theta = Array1::from(vec![0.5, -1.0, 2.0]);
        let mut cs_add = Array1::zeros(3);
        let mut cs_del = Array1::zeros(3);

        let arc = g.arcs()[0];
        let removal = g.remove_arc(arc.tail, arc.head);
        let t_add = model.calc_change_stats(&g, arc.tail, arc.head, &theta, false, &mut cs_add);
        let t_del = model.calc_change_stats(&g, arc.tail, arc.head, &theta, true, &mut cs_del);
        // the raw vector is identical, only the total flips sign
        assert_eq!(cs_add, cs_del);
        assert_abs_diff_eq!(t_add, -t_del, epsilon = 1e-12);
        assert_abs_diff_eq!(t_add, theta.dot(&cs_add), epsilon = 1e-12);
        g.undo_removal(removal);
    }

    #[test]
    fn test_from_specs_and_names() {
        let mut g = Digraph::new(3);
        g.attrs.add_binary("member", vec![Some(true); 3]);
        g.attrs.add_categorical("dept", vec![Some(0); 3]);
        g.attrs.add_categorical("city", vec![Some(1); 3]);

        let model = ChangeStatsModel::from_specs(
            &g,
            &["Arc".into(), "AltInStars(3.5)".into()],
            &["Sender(member)".into(), "Matching(dept)".into()],
            &[],
            &["MatchingInteraction(dept,city)".into()],
        )
        .unwrap();
        assert_eq!(model.num_params(), 5);
        assert!(model.has_arc_param());
        assert_eq!(
            model.param_names(),
            vec![
                "Arc",
                "AltInStars",
                "Sender_member",
                "Matching_dept",
                "MatchingInteraction_dept_city"
            ]
        );

        // unknown names are configuration errors
        assert!(ChangeStatsModel::from_specs(&g, &["Wobble".into()], &[], &[], &[]).is_err());
        assert!(
            ChangeStatsModel::from_specs(&g, &[], &["Sender(absent)".into()], &[], &[]).is_err()
        );
        assert!(ChangeStatsModel::from_specs(&g, &[], &[], &["GeoDistance".into()], &[]).is_err());
    }
}
