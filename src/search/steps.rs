//! Turning a winning merge tree into the ordered list of anvil steps a
//! player actually performs.

use serde::{Deserialize, Serialize};

use super::cost::{
    experience_for_levels, merge_level_cost, prior_work_penalty, round_level_cost,
};
use super::node::{ItemNode, MergeTree};
use crate::enchant::EnchantMap;

/// One reconstructed merge, with both sides' states at that point in the
/// chain so a UI can render the full anvil screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeStep {
    pub description: String,
    /// Surviving side's label.
    pub target_label: String,
    /// Sacrificed side's label.
    pub sacrifice_label: String,
    pub target_enchants: EnchantMap,
    pub sacrifice_enchants: EnchantMap,
    pub result_enchants: EnchantMap,
    pub cost_levels: u32,
    pub cost_xp: u32,
    /// Work counter on the merged item.
    pub resulting_work: u32,
    /// Penalty the *next* merge involving the merged item would pay;
    /// lets a caller flag a prospective follow-up as "Too Expensive".
    pub resulting_penalty: u32,
}

/// Final item state after replaying a merge tree.
pub(crate) struct ReplayedItem {
    pub label: String,
    pub enchants: EnchantMap,
    pub work: u32,
}

/// Emits one step per internal merge node, children before parent, in the
/// order the merges must be performed. All costs are recomputed from the
/// two sides' replayed states through the shared cost model, so the steps
/// agree with the search no matter which solver produced the tree.
pub(crate) fn reconstruct_steps(
    tree: &MergeTree,
    nodes: &[ItemNode],
) -> (Vec<MergeStep>, ReplayedItem) {
    let mut steps = Vec::new();
    let final_item = replay(tree, nodes, &mut steps);
    (steps, final_item)
}

fn replay(tree: &MergeTree, nodes: &[ItemNode], steps: &mut Vec<MergeStep>) -> ReplayedItem {
    match tree {
        MergeTree::Leaf(index) => {
            let node = &nodes[*index];
            ReplayedItem {
                label: display_label(&node.label).to_string(),
                enchants: node.enchants.clone(),
                work: node.work,
            }
        }
        MergeTree::Merge { target, sacrifice } => {
            let survivor = replay(target, nodes, steps);
            let consumed = replay(sacrifice, nodes, steps);

            let cost_levels = round_level_cost(merge_level_cost(
                &survivor.enchants,
                survivor.work,
                &consumed.enchants,
                consumed.work,
            ));
            let cost_xp = experience_for_levels(cost_levels);
            let result_enchants = survivor.enchants.merged_with(&consumed.enchants);
            let resulting_work = survivor.work.max(consumed.work) + 1;

            let description = format!(
                "Combine {} ({}) into {} ({})",
                consumed.label,
                annotate(&consumed.enchants),
                survivor.label,
                annotate(&survivor.enchants),
            );

            steps.push(MergeStep {
                description,
                target_label: survivor.label.clone(),
                sacrifice_label: consumed.label,
                target_enchants: survivor.enchants,
                sacrifice_enchants: consumed.enchants,
                result_enchants: result_enchants.clone(),
                cost_levels,
                cost_xp,
                resulting_work,
                resulting_penalty: prior_work_penalty(resulting_work),
            });

            ReplayedItem {
                label: survivor.label,
                enchants: result_enchants,
                work: resulting_work,
            }
        }
    }
}

/// Strips a trailing parenthesized enchantment listing from a label, so
/// "Book 3 (sharpness 5)" reads as "Book 3" in descriptions.
fn display_label(raw: &str) -> &str {
    if raw.ends_with(')') {
        if let Some(position) = raw.rfind(" (") {
            return &raw[..position];
        }
    }
    raw
}

fn annotate(enchants: &EnchantMap) -> String {
    if enchants.is_empty() {
        "unenchanted".to_string()
    } else {
        enchants.to_string()
    }
}
