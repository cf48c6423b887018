//! Search configuration and the `find_best_order` entry point.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::beam::beam_search;
use super::exact::{exact_search, MAX_EXACT_NODES};
use super::node::{ItemNode, SolverRun};
use super::progress::{CancelToken, Pacer, ProgressFn};
use super::steps::{reconstruct_steps, MergeStep};
use crate::enchant::EnchantMap;
use crate::error::SearchError;

/// Sentinel `total_levels` of an infeasible result.
pub const INFEASIBLE_LEVELS: u32 = u32::MAX;

/// Beam width used when the caller does not pick one.
pub const DEFAULT_BEAM_WIDTH: usize = 250;

/// What a search minimizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    /// Total game levels paid across all merges.
    #[default]
    Levels,
    /// Total experience points paid across all merges.
    Xp,
    /// Final prior-work exposure of the result.
    PriorWork,
}

impl Objective {
    /// Ranking for one exhaustive-solver entry (a single combined item).
    pub(crate) fn exact_key(self, levels: u32, xp: u32, work: u32) -> (u64, u64, u64) {
        match self {
            Self::Levels => (u64::from(levels), u64::from(xp), u64::from(work)),
            Self::Xp => (u64::from(xp), u64::from(levels), u64::from(work)),
            Self::PriorWork => (u64::from(work), u64::from(levels), u64::from(xp)),
        }
    }

    /// Ranking for a beam state. Work is the *maximum* across remaining
    /// items, since any of them may still face further merges.
    pub(crate) fn beam_key(
        self,
        levels: u32,
        xp: u32,
        max_work: u32,
        items: usize,
    ) -> (u64, u64, u64) {
        match self {
            Self::Levels => (u64::from(levels), u64::from(xp), u64::from(max_work)),
            Self::Xp => (u64::from(xp), u64::from(levels), items as u64),
            Self::PriorWork => (u64::from(max_work), u64::from(levels), u64::from(xp)),
        }
    }
}

/// The item the merged enchantments end up on. At most one exists per
/// search; it can never be consumed as a sacrifice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetInput {
    pub name: String,
    pub enchantments: EnchantMap,
    /// Anvil work counter already on the item.
    pub initial_work: u32,
}

/// One sacrificial enchanted book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookInput {
    pub id: String,
    pub enchantments: EnchantMap,
    /// Anvil work counter already on the book, normally 0.
    pub initial_work: u32,
}

/// Search options.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub objective: Objective,
    /// `None` runs the exhaustive solver; `Some(k)` the beam solver.
    pub beam_width: Option<usize>,
    pub cancel: Option<CancelToken>,
    /// How often the solver yields the thread mid-search.
    pub yield_interval: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            objective: Objective::Levels,
            beam_width: Some(DEFAULT_BEAM_WIDTH),
            cancel: None,
            yield_interval: Duration::from_millis(25),
        }
    }
}

impl SearchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exhaustive preset: the true optimum, small inputs only.
    pub fn exhaustive() -> Self {
        Self {
            beam_width: None,
            ..Self::default()
        }
    }

    /// Fast preset: a narrow beam for instant answers on large inputs.
    pub fn fast() -> Self {
        Self {
            beam_width: Some(32),
            ..Self::default()
        }
    }

    pub fn with_objective(mut self, objective: Objective) -> Self {
        self.objective = objective;
        self
    }

    pub fn with_beam_width(mut self, beam_width: Option<usize>) -> Self {
        self.beam_width = beam_width;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn with_yield_interval(mut self, yield_interval: Duration) -> Self {
        self.yield_interval = yield_interval;
        self
    }
}

/// Outcome of a merge-order search.
///
/// Absence of `error` is the success signal; an infeasible search carries
/// [`INFEASIBLE_LEVELS`] and an error describing why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Sum of per-merge rounded level costs.
    pub total_levels: u32,
    /// Sum of per-merge experience costs.
    pub total_xp: u32,
    /// Work counter of the final surviving item.
    pub final_work: u32,
    /// Merges in the order they must be performed.
    pub steps: Vec<MergeStep>,
    /// Enchantments on the final item.
    pub combined_enchants: EnchantMap,
    /// Diagnostic counter of states the solver considered.
    pub states_explored: u64,
    pub error: Option<SearchError>,
}

impl SearchResult {
    pub fn is_feasible(&self) -> bool {
        self.error.is_none()
    }

    fn trivial() -> Self {
        Self {
            total_levels: 0,
            total_xp: 0,
            final_work: 0,
            steps: Vec::new(),
            combined_enchants: EnchantMap::new(),
            states_explored: 0,
            error: None,
        }
    }

    fn failed(error: SearchError, states_explored: u64) -> Self {
        Self {
            total_levels: INFEASIBLE_LEVELS,
            total_xp: 0,
            final_work: 0,
            steps: Vec::new(),
            combined_enchants: EnchantMap::new(),
            states_explored,
            error: Some(error),
        }
    }
}

/// Finds the cheapest merge order for `books` (and the optional `target`)
/// under the configured objective.
pub fn find_best_order(
    target: Option<&TargetInput>,
    books: &[BookInput],
    config: &SearchConfig,
) -> SearchResult {
    run_guarded(target, books, config, None)
}

/// Like [`find_best_order`], reporting progress through `on_progress`:
/// cumulative states explored plus a human-readable label, monotonically,
/// never after the result is produced.
pub fn find_best_order_with_progress(
    target: Option<&TargetInput>,
    books: &[BookInput],
    config: &SearchConfig,
    on_progress: &mut ProgressFn<'_>,
) -> SearchResult {
    run_guarded(target, books, config, Some(on_progress))
}

fn run_guarded(
    target: Option<&TargetInput>,
    books: &[BookInput],
    config: &SearchConfig,
    progress: Option<&mut ProgressFn<'_>>,
) -> SearchResult {
    // The solvers never panic on malformed input, but a panic must not
    // escape to the caller as a raw fault.
    match catch_unwind(AssertUnwindSafe(|| run(target, books, config, progress))) {
        Ok(result) => result,
        Err(_) => SearchResult::failed(
            SearchError::internal(
                "the search failed unexpectedly; try fewer enchantments or a faster preset",
            ),
            0,
        ),
    }
}

fn run(
    target: Option<&TargetInput>,
    books: &[BookInput],
    config: &SearchConfig,
    progress: Option<&mut ProgressFn<'_>>,
) -> SearchResult {
    let nodes = build_nodes(target, books);
    if nodes.is_empty() {
        return SearchResult::trivial();
    }

    let mut pacer = Pacer::new(progress, config.cancel.clone(), config.yield_interval);

    let solved = match config.beam_width {
        None => {
            if nodes.len() > MAX_EXACT_NODES {
                return SearchResult::failed(
                    SearchError::no_solution(format!(
                        "{} items exceed the exhaustive solver's limit of {MAX_EXACT_NODES}; \
                         use a beam width instead",
                        nodes.len()
                    )),
                    0,
                );
            }
            exact_search(&nodes, config.objective, &mut pacer)
        }
        Some(width) => beam_search(&nodes, config.objective, width, &mut pacer),
    };

    match solved {
        Err(error) => SearchResult::failed(error, 0),
        Ok(SolverRun {
            winner: None,
            states_explored,
        }) => SearchResult::failed(
            SearchError::no_solution(
                "every complete merge sequence exceeds the 39-level anvil cap",
            ),
            states_explored,
        ),
        Ok(SolverRun {
            winner: Some(win),
            states_explored,
        }) => {
            let (steps, final_item) = reconstruct_steps(&win.tree, &nodes);
            debug_assert_eq!(final_item.work, win.final_work);
            SearchResult {
                total_levels: win.total_levels,
                total_xp: win.total_xp,
                final_work: final_item.work,
                steps,
                combined_enchants: final_item.enchants,
                states_explored,
                error: None,
            }
        }
    }
}

fn build_nodes(target: Option<&TargetInput>, books: &[BookInput]) -> Vec<ItemNode> {
    let mut nodes = Vec::with_capacity(books.len() + usize::from(target.is_some()));
    if let Some(target) = target {
        // A fresh, unenchanted target adds no ordering decision; the plan
        // covers the book merges only.
        if !target.enchantments.is_empty() || target.initial_work > 0 {
            nodes.push(ItemNode::new(
                target.name.clone(),
                target.enchantments.clone(),
                target.initial_work,
                true,
            ));
        }
    }
    for book in books {
        nodes.push(ItemNode::new(
            book.id.clone(),
            book.enchantments.clone(),
            book.initial_work,
            false,
        ));
    }
    nodes
}
