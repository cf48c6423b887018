//! Exhaustive merge-order search via dynamic programming over subsets.
//!
//! Enumerates every bipartition of every subset of the input nodes, so the
//! result is the true optimum under the active objective. Exponential in
//! the number of nodes; only feasible for small inputs.

use std::sync::Arc;

use hashbrown::HashMap;

use super::cost::{
    experience_for_levels, merge_allowed, merge_level_cost, round_level_cost, MAX_MERGE_LEVELS,
};
use super::node::{ItemNode, MergeTree, SolverRun, SolverWin};
use super::plan::Objective;
use super::progress::Pacer;
use crate::enchant::EnchantMap;
use crate::error::SearchError;

/// Maximum number of nodes the exhaustive solver accepts. With n nodes the
/// subset-split enumeration costs ~3^n; past this the beam solver is the
/// only practical option.
pub const MAX_EXACT_NODES: usize = 20;

/// How many subsets to process between progress reports.
const REPORT_EVERY: u64 = 256;

/// One DP entry: the best known way (under the active objective) to merge
/// the subset down to a single item ending at this work value. Entries with
/// different work values coexist because a higher-work entry can still win
/// once future penalties are paid.
struct DpEntry {
    levels: u32,
    xp: u32,
    work: u32,
    enchants: EnchantMap,
    is_target: bool,
    tree: Arc<MergeTree>,
}

/// Runs the exhaustive search. `nodes` must be non-empty and at most
/// [`MAX_EXACT_NODES`] long; the caller guards both.
pub(crate) fn exact_search(
    nodes: &[ItemNode],
    objective: Objective,
    pacer: &mut Pacer<'_, '_>,
) -> Result<SolverRun, SearchError> {
    let n = nodes.len();
    debug_assert!(n >= 1 && n <= MAX_EXACT_NODES);

    #[cfg(feature = "tracing")]
    tracing::debug!(nodes = n, ?objective, "exhaustive search start");

    let mut memo: HashMap<u32, Vec<DpEntry>> = HashMap::with_capacity(1 << n);
    for (index, node) in nodes.iter().enumerate() {
        memo.insert(
            1u32 << index,
            vec![DpEntry {
                levels: 0,
                xp: 0,
                work: node.work,
                enchants: node.enchants.clone(),
                is_target: node.is_target,
                tree: MergeTree::leaf(index),
            }],
        );
    }

    let composite_masks = (1u64 << n) - 1 - n as u64;
    let mut processed = 0u64;
    let mut states_explored = 0u64;

    for size in 2..=n {
        for mask in subsets_of_size(n, size) {
            let mut best: Vec<DpEntry> = Vec::new();

            for left in proper_submasks(mask) {
                let right = mask ^ left;
                if left > right {
                    // Each unordered split is visited once; both merge
                    // directions are still tried below.
                    continue;
                }
                let (Some(left_entries), Some(right_entries)) =
                    (memo.get(&left), memo.get(&right))
                else {
                    continue;
                };

                for l in left_entries {
                    for r in right_entries {
                        for (target, sacrifice) in [(l, r), (r, l)] {
                            states_explored += 1;
                            if !merge_allowed(target.is_target, sacrifice.is_target) {
                                continue;
                            }
                            let cost_levels = round_level_cost(merge_level_cost(
                                &target.enchants,
                                target.work,
                                &sacrifice.enchants,
                                sacrifice.work,
                            ));
                            if cost_levels > MAX_MERGE_LEVELS {
                                continue;
                            }

                            let work = target.work.max(sacrifice.work) + 1;
                            let levels = target.levels + sacrifice.levels + cost_levels;
                            let xp =
                                target.xp + sacrifice.xp + experience_for_levels(cost_levels);
                            let key = objective.exact_key(levels, xp, work);

                            match best.iter_mut().find(|entry| entry.work == work) {
                                Some(existing)
                                    if key
                                        < objective.exact_key(
                                            existing.levels,
                                            existing.xp,
                                            existing.work,
                                        ) =>
                                {
                                    *existing = DpEntry {
                                        levels,
                                        xp,
                                        work,
                                        enchants: target
                                            .enchants
                                            .merged_with(&sacrifice.enchants),
                                        is_target: target.is_target || sacrifice.is_target,
                                        tree: MergeTree::merge(
                                            Arc::clone(&target.tree),
                                            Arc::clone(&sacrifice.tree),
                                        ),
                                    };
                                }
                                Some(_) => {}
                                None => best.push(DpEntry {
                                    levels,
                                    xp,
                                    work,
                                    enchants: target.enchants.merged_with(&sacrifice.enchants),
                                    is_target: target.is_target || sacrifice.is_target,
                                    tree: MergeTree::merge(
                                        Arc::clone(&target.tree),
                                        Arc::clone(&sacrifice.tree),
                                    ),
                                }),
                            }
                        }
                    }
                }
            }

            if !best.is_empty() {
                memo.insert(mask, best);
            }

            processed += 1;
            if pacer.interrupted() {
                return Err(SearchError::Cancelled);
            }
            pacer.breathe();
            if processed % REPORT_EVERY == 0 {
                pacer.report(
                    states_explored,
                    &format!("{processed}/{composite_masks} subsets processed"),
                );
            }
        }
    }

    let full = (1u32 << n) - 1;
    let winner = memo.remove(&full).and_then(|entries| {
        entries
            .into_iter()
            .min_by_key(|entry| objective.exact_key(entry.levels, entry.xp, entry.work))
            .map(|entry| SolverWin {
                tree: entry.tree,
                total_levels: entry.levels,
                total_xp: entry.xp,
                final_work: entry.work,
                enchants: entry.enchants,
            })
    });

    #[cfg(feature = "tracing")]
    tracing::debug!(states_explored, solved = winner.is_some(), "exhaustive search done");

    Ok(SolverRun {
        winner,
        states_explored,
    })
}

/// All subsets of `{0..n-1}` with exactly `size` members.
fn subsets_of_size(n: usize, size: usize) -> Vec<u32> {
    let mut result = Vec::new();
    generate_subsets(n, size, 0, 0, &mut result);
    result
}

fn generate_subsets(n: usize, size: usize, start: usize, current: u32, result: &mut Vec<u32>) {
    if size == 0 {
        result.push(current);
        return;
    }
    if start >= n || n - start < size {
        return;
    }
    generate_subsets(n, size - 1, start + 1, current | (1 << start), result);
    generate_subsets(n, size, start + 1, current, result);
}

/// Iterates every proper non-empty submask of `mask`.
fn proper_submasks(mask: u32) -> impl Iterator<Item = u32> {
    let mut submask = (mask - 1) & mask;
    std::iter::from_fn(move || {
        if submask == 0 {
            return None;
        }
        let result = submask;
        submask = (submask - 1) & mask;
        Some(result)
    })
}
