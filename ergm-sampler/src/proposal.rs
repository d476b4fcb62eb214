//! Candidate selection under the four constraint regimes.
//!
//! Graphs are sparse, so rejection sampling (pick random nodes until the
//! candidate is valid) is cheap and keeps every draw uniform over the
//! candidate space.

use crate::{MoveRestriction, SamplerOptions};
use ergm_graph::{Digraph, NodeId, SnowballSample};
use rand::rngs::SmallRng;
use rand::Rng;

/// An arc between waves may not be deleted if it is the last tie
/// connecting the higher-wave endpoint to its preceding wave.
fn is_last_link(sb: &SnowballSample, i: NodeId, j: NodeId) -> bool {
    let (zi, zj) = (sb.zone[i as usize], sb.zone[j as usize]);
    (zi > zj && sb.prev_wave_degree[i as usize] == 1)
        || (zj > zi && sb.prev_wave_degree[j as usize] == 1)
}

/// Draw a uniformly random dyad from the applicable candidate space and
/// toggle it: an existing arc is a delete candidate, an absent one an add.
/// Used by the basic sampler, so that the delete-proposal frequency tracks
/// the current arc count.
pub(crate) fn propose_toggle(
    g: &Digraph,
    opts: &SamplerOptions,
    rng: &mut SmallRng,
) -> (NodeId, NodeId, bool) {
    let n = g.num_nodes() as NodeId;
    match opts.restriction {
        MoveRestriction::None => loop {
            let i = rng.random_range(0..n);
            let j = rng.random_range(0..n);
            if i == j && !opts.allow_loops {
                continue;
            }
            if g.is_arc(i, j) {
                return (i, j, true);
            }
            if opts.forbid_reciprocity && i != j && g.is_arc(j, i) {
                continue;
            }
            return (i, j, false);
        },
        MoveRestriction::Snowball => {
            let sb = g.snowball().expect("snowball restriction without zone data");
            loop {
                let i = sb.inner_nodes[rng.random_range(0..sb.num_inner_nodes())];
                let j = sb.inner_nodes[rng.random_range(0..sb.num_inner_nodes())];
                if i == j {
                    continue;
                }
                if g.is_arc(i, j) {
                    if is_last_link(sb, i, j) {
                        continue;
                    }
                    return (i, j, true);
                }
                if sb.zone[i as usize].abs_diff(sb.zone[j as usize]) > 1 {
                    continue;
                }
                return (i, j, false);
            }
        }
        MoveRestriction::Citation => {
            let ct = g.citation().expect("citation restriction without terms");
            loop {
                let i = ct.maxterm_nodes[rng.random_range(0..ct.num_maxterm_nodes())];
                let j = rng.random_range(0..n);
                if i == j {
                    continue;
                }
                return (i, j, g.is_arc(i, j));
            }
        }
    }
}

/// Uniform delete candidate from the applicable arc pool, or `None` when
/// the pool is empty and the caller must fall back to an add move.
pub(crate) fn select_delete(
    g: &Digraph,
    opts: &SamplerOptions,
    rng: &mut SmallRng,
) -> Option<(NodeId, NodeId)> {
    match opts.restriction {
        MoveRestriction::None => {
            if g.num_arcs() == 0 {
                return None;
            }
            let arc = g.arcs()[rng.random_range(0..g.num_arcs())];
            Some((arc.tail, arc.head))
        }
        MoveRestriction::Snowball => {
            let sb = g.snowball().expect("snowball restriction without zone data");
            if sb.num_inner_arcs() == 0 {
                return None;
            }
            loop {
                let arc = sb.inner_arcs()[rng.random_range(0..sb.num_inner_arcs())];
                if !is_last_link(sb, arc.tail, arc.head) {
                    return Some((arc.tail, arc.head));
                }
            }
        }
        MoveRestriction::Citation => {
            let ct = g.citation().expect("citation restriction without terms");
            if ct.num_sender_arcs() == 0 {
                return None;
            }
            let arc = ct.sender_arcs()[rng.random_range(0..ct.num_sender_arcs())];
            Some((arc.tail, arc.head))
        }
    }
}

/// Uniform add candidate: a valid ordered pair currently lacking an arc.
pub(crate) fn select_add(g: &Digraph, opts: &SamplerOptions, rng: &mut SmallRng) -> (NodeId, NodeId) {
    let n = g.num_nodes() as NodeId;
    match opts.restriction {
        MoveRestriction::None => loop {
            let i = rng.random_range(0..n);
            let j = rng.random_range(0..n);
            if i == j && !opts.allow_loops {
                continue;
            }
            if g.is_arc(i, j) {
                continue;
            }
            if opts.forbid_reciprocity && i != j && g.is_arc(j, i) {
                continue;
            }
            return (i, j);
        },
        MoveRestriction::Snowball => {
            let sb = g.snowball().expect("snowball restriction without zone data");
            loop {
                let i = sb.inner_nodes[rng.random_range(0..sb.num_inner_nodes())];
                let j = sb.inner_nodes[rng.random_range(0..sb.num_inner_nodes())];
                if i == j || g.is_arc(i, j) {
                    continue;
                }
                if sb.zone[i as usize].abs_diff(sb.zone[j as usize]) > 1 {
                    continue;
                }
                return (i, j);
            }
        }
        MoveRestriction::Citation => {
            let ct = g.citation().expect("citation restriction without terms");
            loop {
                let i = ct.maxterm_nodes[rng.random_range(0..ct.num_maxterm_nodes())];
                let j = rng.random_range(0..n);
                if i == j || g.is_arc(i, j) {
                    continue;
                }
                return (i, j);
            }
        }
    }
}
