//! # anvil-order
//!
//! Finds the cheapest order of anvil merges to combine a set of enchanted
//! books (and optionally a target item) into one item.
//!
//! ## Features
//!
//! - Exhaustive bitmask-DP solver: the true optimum for small inputs
//! - Beam-search solver: anytime approximation for arbitrarily many books
//! - Three objectives: total levels, total experience, final prior work
//! - Step-by-step reconstruction of the winning merge sequence
//! - Progress callbacks and cooperative cancellation between rounds
//!
//! ## Example
//!
//! ```
//! use anvil_order::{find_best_order, BookInput, EnchantMap, SearchConfig};
//!
//! let books = vec![
//!     BookInput {
//!         id: "Book (sharpness 3)".into(),
//!         enchantments: EnchantMap::from_pairs([("sharpness", 3)]),
//!         initial_work: 0,
//!     },
//!     BookInput {
//!         id: "Book (looting 2)".into(),
//!         enchantments: EnchantMap::from_pairs([("looting", 2)]),
//!         initial_work: 0,
//!     },
//! ];
//!
//! let result = find_best_order(None, &books, &SearchConfig::exhaustive());
//! assert!(result.is_feasible());
//! assert_eq!(result.steps.len(), 1);
//! ```

pub mod enchant;
pub mod error;
pub mod search;

pub use enchant::{max_level_for, resulting_level, weight_for, EnchantMap};
pub use error::SearchError;
pub use search::{
    enchantment_cost, experience_for_levels, find_best_order, find_best_order_with_progress,
    merge_level_cost, prior_work_penalty, BookInput, CancelToken, ItemNode, MergeStep, Objective,
    ProgressFn, SearchConfig, SearchResult, TargetInput, DEFAULT_BEAM_WIDTH, INFEASIBLE_LEVELS,
    MAX_EXACT_NODES, MAX_MERGE_LEVELS,
};
