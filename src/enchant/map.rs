//! Enchantment maps and the anvil leveling rule.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::registry::{max_level_for, weight_for};

/// The level an enchantment ends up at when a sacrifice contributes
/// `sacrifice` on top of the survivor's `target` level.
///
/// Rules, in order:
/// - the higher level wins outright;
/// - equal levels below `max` bump by one;
/// - otherwise the survivor's level stands.
///
/// Both the merge and the cost calculation go through this function, so the
/// level they charge for is always the level they produce.
pub fn resulting_level(target: u32, sacrifice: u32, max: u32) -> u32 {
    if sacrifice > target {
        sacrifice
    } else if sacrifice == target && target < max {
        target + 1
    } else {
        target
    }
}

/// A set of enchantments with their levels.
///
/// Levels are always ≥ 1; an absent key means level 0. The map is immutable
/// once attached to an item — merging produces a new map. `BTreeMap` keeps
/// iteration, display, and canonical signatures deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnchantMap(BTreeMap<String, u32>);

impl EnchantMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a map from `(id, level)` pairs, dropping zero levels.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        Self(
            pairs
                .into_iter()
                .filter(|(_, level)| *level > 0)
                .map(|(id, level)| (id.into(), level))
                .collect(),
        )
    }

    /// Level of `id`, 0 if absent.
    pub fn level(&self, id: &str) -> u32 {
        self.0.get(id).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates `(id, level)` in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.0.iter().map(|(id, level)| (id.as_str(), *level))
    }

    /// Sum of weight × level over all enchantments. Diagnostic only; the
    /// cost formulas charge per merge, not per item.
    pub fn base_value(&self) -> u32 {
        self.iter()
            .map(|(id, level)| weight_for(id) * level)
            .sum()
    }

    /// Applies the leveling rule for every enchantment in `sacrifice`,
    /// passing the survivor's own enchantments through unchanged.
    pub fn merged_with(&self, sacrifice: &EnchantMap) -> EnchantMap {
        let mut merged = self.0.clone();
        for (id, sacrifice_level) in sacrifice.iter() {
            let level = resulting_level(self.level(id), sacrifice_level, max_level_for(id));
            merged.insert(id.to_string(), level);
        }
        EnchantMap(merged)
    }

    /// Canonical `id:level` listing, used in beam-state signatures.
    pub fn signature(&self) -> String {
        let mut out = String::new();
        for (id, level) in self.iter() {
            if !out.is_empty() {
                out.push(',');
            }
            out.push_str(id);
            out.push(':');
            out.push_str(&level.to_string());
        }
        out
    }
}

impl fmt::Display for EnchantMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (id, level) in self.iter() {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{} {}", id, level)?;
            first = false;
        }
        Ok(())
    }
}
