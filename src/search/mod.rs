//! Merge-order search: cost model, both solvers, and step reconstruction.
//!
//! Two solvers answer the same question — in which order should the books
//! be merged — with different guarantees:
//! - Exhaustive: bitmask DP over subsets, true optimum, exponential in the
//!   number of nodes.
//! - Beam: bounded best-first rounds, polynomial per round, optimality
//!   traded for beam width.

mod beam;
mod cost;
mod exact;
mod node;
mod plan;
mod progress;
mod steps;

pub use cost::{
    enchantment_cost, experience_for_levels, merge_allowed, merge_level_cost,
    prior_work_penalty, round_level_cost, MAX_MERGE_LEVELS,
};
pub use exact::MAX_EXACT_NODES;
pub use node::ItemNode;
pub use plan::{
    find_best_order, find_best_order_with_progress, BookInput, Objective, SearchConfig,
    SearchResult, TargetInput, DEFAULT_BEAM_WIDTH, INFEASIBLE_LEVELS,
};
pub use progress::{CancelToken, ProgressFn};
pub use steps::MergeStep;
