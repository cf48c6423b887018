//! Search-state types: input nodes, in-flight combined items, and the
//! merge trace used to reconstruct steps.

use std::sync::Arc;

use smallvec::SmallVec;

use crate::enchant::EnchantMap;

/// One original input item — a sacrificial book or the designated target.
///
/// Nodes are built once from the caller's input and referenced by index for
/// the rest of the search.
#[derive(Debug, Clone)]
pub struct ItemNode {
    /// Display identifier.
    pub label: String,
    pub enchants: EnchantMap,
    /// Anvil work counter already on the item before this session.
    pub work: u32,
    /// At most one node in an input set is the target.
    pub is_target: bool,
    /// Sum of weight × level, diagnostic only.
    pub base_value: u32,
}

impl ItemNode {
    pub fn new(label: impl Into<String>, enchants: EnchantMap, work: u32, is_target: bool) -> Self {
        let base_value = enchants.base_value();
        Self {
            label: label.into(),
            enchants,
            work,
            is_target,
            base_value,
        }
    }
}

/// Binary merge trace. Each internal node records which side survived;
/// leaves index into the original node arena. Partitions are disjoint by
/// construction, so this is always a tree.
#[derive(Debug)]
pub enum MergeTree {
    Leaf(usize),
    Merge {
        target: Arc<MergeTree>,
        sacrifice: Arc<MergeTree>,
    },
}

impl MergeTree {
    pub fn leaf(index: usize) -> Arc<Self> {
        Arc::new(Self::Leaf(index))
    }

    pub fn merge(target: Arc<Self>, sacrifice: Arc<Self>) -> Arc<Self> {
        Arc::new(Self::Merge { target, sacrifice })
    }

    /// Collects the original node indices under this tree.
    pub fn leaves(&self, out: &mut Vec<usize>) {
        match self {
            Self::Leaf(index) => out.push(*index),
            Self::Merge { target, sacrifice } => {
                target.leaves(out);
                sacrifice.leaves(out);
            }
        }
    }
}

/// Provisional result of zero or more merges, as tracked by the beam
/// solver. `origins` stays sorted; within one solver state every original
/// index appears in exactly one item.
#[derive(Debug, Clone)]
pub struct CombinedItem {
    pub enchants: EnchantMap,
    /// Anvil work counter of this combined item.
    pub work: u32,
    /// Rounded level cost accumulated building this item.
    pub levels: u32,
    /// Experience points accumulated building this item.
    pub xp: u32,
    /// True if the designated target is somewhere in this item's ancestry.
    pub is_target: bool,
    pub origins: SmallVec<[u16; 8]>,
    pub tree: Arc<MergeTree>,
}

impl CombinedItem {
    /// Wraps one un-merged input node.
    pub fn from_node(index: usize, node: &ItemNode) -> Self {
        let mut origins = SmallVec::new();
        origins.push(index as u16);
        Self {
            enchants: node.enchants.clone(),
            work: node.work,
            levels: 0,
            xp: 0,
            is_target: node.is_target,
            origins,
            tree: MergeTree::leaf(index),
        }
    }

    /// Combines two items, `target` surviving, with the already-finalized
    /// costs of this merge.
    pub fn merged(target: &Self, sacrifice: &Self, cost_levels: u32, cost_xp: u32) -> Self {
        let mut origins: SmallVec<[u16; 8]> = target
            .origins
            .iter()
            .chain(sacrifice.origins.iter())
            .copied()
            .collect();
        origins.sort_unstable();
        Self {
            enchants: target.enchants.merged_with(&sacrifice.enchants),
            work: target.work.max(sacrifice.work) + 1,
            levels: target.levels + sacrifice.levels + cost_levels,
            xp: target.xp + sacrifice.xp + cost_xp,
            is_target: target.is_target || sacrifice.is_target,
            origins,
            tree: MergeTree::merge(Arc::clone(&target.tree), Arc::clone(&sacrifice.tree)),
        }
    }

    /// Canonical signature of this item's observable state. Two items with
    /// equal signatures face identical future merge options.
    pub fn signature(&self) -> String {
        format!(
            "{}|w{}|t{}",
            self.enchants.signature(),
            self.work,
            u8::from(self.is_target)
        )
    }
}

/// A solver's winning terminal state, before step reconstruction.
#[derive(Debug)]
pub(crate) struct SolverWin {
    pub tree: Arc<MergeTree>,
    pub total_levels: u32,
    pub total_xp: u32,
    pub final_work: u32,
    pub enchants: EnchantMap,
}

/// Outcome of one solver invocation. `winner: None` means no complete
/// merge sequence stayed under the cap.
#[derive(Debug)]
pub(crate) struct SolverRun {
    pub winner: Option<SolverWin>,
    pub states_explored: u64,
}
