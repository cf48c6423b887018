//! Approximate merge-order search via beam search.
//!
//! Keeps a bounded set of partial solutions, expands every legal pairwise
//! merge each round, deduplicates by canonical signature, and truncates to
//! the best `beam_width` states. Scales to inputs the exhaustive solver
//! cannot touch, trading optimality for width.

use hashbrown::hash_map::Entry;
use hashbrown::HashMap;

use super::cost::{
    experience_for_levels, merge_allowed, merge_level_cost, round_level_cost, MAX_MERGE_LEVELS,
};
use super::node::{CombinedItem, ItemNode, SolverRun, SolverWin};
use super::plan::Objective;
use super::progress::Pacer;
use crate::error::SearchError;

/// One partial solution: the items not yet merged together, plus running
/// totals. The items' origin sets always partition the original inputs.
struct BeamState {
    items: Vec<CombinedItem>,
    total_levels: u32,
    total_xp: u32,
}

impl BeamState {
    fn initial(nodes: &[ItemNode]) -> Self {
        Self {
            items: nodes
                .iter()
                .enumerate()
                .map(|(index, node)| CombinedItem::from_node(index, node))
                .collect(),
            total_levels: 0,
            total_xp: 0,
        }
    }

    /// Highest work counter across remaining items: the penalty exposure
    /// any future merge might have to pay.
    fn max_work(&self) -> u32 {
        self.items.iter().map(|item| item.work).max().unwrap_or(0)
    }

    /// Order-independent signature: two states with equal signatures are
    /// the same logical configuration reached through different pairings.
    fn signature(&self) -> String {
        let mut sigs: Vec<String> = self.items.iter().map(CombinedItem::signature).collect();
        sigs.sort_unstable();
        sigs.join(";")
    }

    fn rank(&self, objective: Objective) -> (u64, u64, u64) {
        objective.beam_key(
            self.total_levels,
            self.total_xp,
            self.max_work(),
            self.items.len(),
        )
    }

    /// New state with `sacrifice_index` merged into `target_index`.
    fn merge_pair(
        &self,
        target_index: usize,
        sacrifice_index: usize,
        cost_levels: u32,
        cost_xp: u32,
    ) -> Self {
        let merged = CombinedItem::merged(
            &self.items[target_index],
            &self.items[sacrifice_index],
            cost_levels,
            cost_xp,
        );
        let mut items = Vec::with_capacity(self.items.len() - 1);
        for (index, item) in self.items.iter().enumerate() {
            if index != target_index && index != sacrifice_index {
                items.push(item.clone());
            }
        }
        items.push(merged);
        Self {
            items,
            total_levels: self.total_levels + cost_levels,
            total_xp: self.total_xp + cost_xp,
        }
    }
}

/// Runs the beam search. `nodes` must be non-empty; the caller guards it.
pub(crate) fn beam_search(
    nodes: &[ItemNode],
    objective: Objective,
    beam_width: usize,
    pacer: &mut Pacer<'_, '_>,
) -> Result<SolverRun, SearchError> {
    let n = nodes.len();
    let width = beam_width.max(1);
    debug_assert!(n >= 1);

    #[cfg(feature = "tracing")]
    tracing::debug!(nodes = n, width, ?objective, "beam search start");

    let mut beam = vec![BeamState::initial(nodes)];
    let mut states_explored = 0u64;

    // Every state in round r holds n - r items, so n - 1 rounds solve.
    for round in 1..n {
        let mut candidates: HashMap<String, BeamState> = HashMap::new();

        for state in &beam {
            pacer.breathe();
            let count = state.items.len();
            for i in 0..count {
                for j in (i + 1)..count {
                    for (target_index, sacrifice_index) in [(i, j), (j, i)] {
                        let target = &state.items[target_index];
                        let sacrifice = &state.items[sacrifice_index];
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
                        let cost_xp = experience_for_levels(cost_levels);
                        let next =
                            state.merge_pair(target_index, sacrifice_index, cost_levels, cost_xp);

                        match candidates.entry(next.signature()) {
                            Entry::Occupied(mut slot) => {
                                if next.rank(objective) < slot.get().rank(objective) {
                                    slot.insert(next);
                                }
                            }
                            Entry::Vacant(slot) => {
                                slot.insert(next);
                            }
                        }
                    }
                }
            }
        }

        if candidates.is_empty() {
            // Every remaining pairing is over the cap; discarded states
            // cannot be revisited, so the search is stuck.
            return Ok(SolverRun {
                winner: None,
                states_explored,
            });
        }

        states_explored += candidates.len() as u64;

        let mut next_beam: Vec<BeamState> = candidates.into_values().collect();
        next_beam.sort_unstable_by_key(|state| state.rank(objective));
        next_beam.truncate(width);

        #[cfg(feature = "tracing")]
        tracing::trace!(round, kept = next_beam.len(), states_explored, "beam round done");

        beam = next_beam;
        pacer.report(
            states_explored,
            &format!("{round}/{} items merged", n - 1),
        );
        if pacer.interrupted() {
            return Err(SearchError::Cancelled);
        }
    }

    let winner = beam
        .into_iter()
        .min_by_key(|state| state.rank(objective))
        .map(|state| {
            let item = state
                .items
                .into_iter()
                .next()
                .expect("terminal beam state holds exactly one item");
            SolverWin {
                tree: item.tree,
                total_levels: item.levels,
                total_xp: item.xp,
                final_work: item.work,
                enchants: item.enchants,
            }
        });

    Ok(SolverRun {
        winner,
        states_explored,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enchant::EnchantMap;
    use std::time::Duration;

    fn pacer() -> Pacer<'static, 'static> {
        Pacer::new(None, None, Duration::from_millis(25))
    }

    fn book(id: &str, level: u32) -> ItemNode {
        ItemNode::new(
            format!("{id} {level}"),
            EnchantMap::from_pairs([(id, level)]),
            0,
            false,
        )
    }

    #[test]
    fn test_wide_beam_matches_exact_on_identical_books() {
        let nodes: Vec<_> = (0..8).map(|_| book("sharpness", 1)).collect();
        let run = beam_search(&nodes, Objective::Levels, 1000, &mut pacer()).unwrap();
        let win = run.winner.unwrap();
        // Same optimum the exhaustive solver finds.
        assert_eq!(win.total_levels, 28);
        assert_eq!(win.final_work, 3);
    }

    #[test]
    fn test_narrow_beam_still_solves() {
        let nodes: Vec<_> = (0..6).map(|_| book("unbreaking", 1)).collect();
        let run = beam_search(&nodes, Objective::Levels, 1, &mut pacer()).unwrap();
        assert!(run.winner.is_some());
    }

    #[test]
    fn test_stuck_beam_reports_no_winner() {
        let mut a = book("sharpness", 1);
        a.work = 6;
        let mut b = book("sharpness", 1);
        b.work = 6;
        let run = beam_search(&[a, b], Objective::Levels, 100, &mut pacer()).unwrap();
        assert!(run.winner.is_none());
    }

    #[test]
    fn test_dedup_collapses_symmetric_pairings() {
        // Two identical books: both merge directions give one signature.
        let nodes = vec![book("sharpness", 1), book("sharpness", 1)];
        let run = beam_search(&nodes, Objective::Levels, 100, &mut pacer()).unwrap();
        assert_eq!(run.states_explored, 1);
        assert!(run.winner.is_some());
    }

    #[test]
    fn test_partition_invariant_holds_for_winner() {
        let nodes: Vec<_> = (0..5).map(|_| book("power", 1)).collect();
        let run = beam_search(&nodes, Objective::Levels, 50, &mut pacer()).unwrap();
        let mut leaves = Vec::new();
        run.winner.unwrap().tree.leaves(&mut leaves);
        leaves.sort_unstable();
        assert_eq!(leaves, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_prior_work_mode_prefers_flat_trees() {
        let nodes: Vec<_> = (0..4).map(|_| book("looting", 1)).collect();
        let run = beam_search(&nodes, Objective::PriorWork, 200, &mut pacer()).unwrap();
        // Four items pack into a height-2 tree.
        assert_eq!(run.winner.unwrap().final_work, 2);
    }
}
