//! Cost model for anvil merges.
//!
//! Pure functions shared by both solvers and by step reconstruction, so a
//! merge is always charged exactly what replaying it would charge.

use crate::enchant::{max_level_for, resulting_level, weight_for, EnchantMap};

/// Hard per-merge cap: the anvil refuses any merge above 39 levels.
pub const MAX_MERGE_LEVELS: u32 = 39;

/// Anvil prior-work penalty: doubles with each prior use of the item.
pub fn prior_work_penalty(work: u32) -> u32 {
    if work == 0 {
        return 0;
    }
    let doubled = 1u64 << work.min(32);
    u32::try_from(doubled - 1).unwrap_or(u32::MAX)
}

/// Experience points needed to buy `levels` levels from zero.
///
/// Fixed three-regime game curve; the constants are not tunable.
pub fn experience_for_levels(levels: u32) -> u32 {
    let l = f64::from(levels);
    match levels {
        0 => 0,
        1..=16 => levels * levels + 6 * levels,
        17..=31 => (2.5 * l * l - 40.5 * l + 360.0).round() as u32,
        _ => (4.5 * l * l - 162.5 * l + 2220.0).round() as u32,
    }
}

/// Level cost contributed by the sacrifice's enchantments: the *resulting*
/// level times the enchantment weight, summed over every key the sacrifice
/// carries. Enchantments only the survivor has cost nothing.
pub fn enchantment_cost(target: &EnchantMap, sacrifice: &EnchantMap) -> f64 {
    sacrifice
        .iter()
        .map(|(id, sacrifice_level)| {
            let level = resulting_level(target.level(id), sacrifice_level, max_level_for(id));
            f64::from(level * weight_for(id))
        })
        .sum()
}

/// Full level cost of one merge: enchantment cost plus both sides'
/// prior-work penalties. Compare the *rounded* value against
/// [`MAX_MERGE_LEVELS`].
pub fn merge_level_cost(
    target: &EnchantMap,
    target_work: u32,
    sacrifice: &EnchantMap,
    sacrifice_work: u32,
) -> f64 {
    enchantment_cost(target, sacrifice)
        + f64::from(prior_work_penalty(target_work))
        + f64::from(prior_work_penalty(sacrifice_work))
}

/// The one rounding function applied wherever a level cost is finalized:
/// before the cap test, before the experience curve, and before
/// accumulation. Half-values round away from zero, so a true cost of 38.5
/// is a feasible 39.
pub fn round_level_cost(cost: f64) -> u32 {
    let rounded = cost.round();
    if rounded >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        rounded as u32
    }
}

/// Whether a merge may keep `target_is_target` as the survivor: the unique
/// designated target can never be consumed as a sacrifice.
pub fn merge_allowed(target_is_target: bool, sacrifice_is_target: bool) -> bool {
    !sacrifice_is_target || target_is_target
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enchant::EnchantMap;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_prior_work_penalty() {
        assert_eq!(prior_work_penalty(0), 0);
        assert_eq!(prior_work_penalty(1), 1);
        assert_eq!(prior_work_penalty(2), 3);
        assert_eq!(prior_work_penalty(6), 63);
    }

    #[test]
    fn test_experience_curve_boundaries() {
        assert_eq!(experience_for_levels(0), 0);
        assert_eq!(experience_for_levels(16), 352);
        assert_eq!(experience_for_levels(17), 394);
        assert_eq!(experience_for_levels(30), 1395);
        assert_eq!(experience_for_levels(31), 1507);
        assert_eq!(experience_for_levels(32), 1628);
    }

    #[test]
    fn test_empty_sacrifice_costs_nothing() {
        let target = EnchantMap::from_pairs([("sharpness", 5), ("looting", 3)]);
        assert_eq!(enchantment_cost(&target, &EnchantMap::new()), 0.0);
    }

    #[test]
    fn test_cost_charges_resulting_level() {
        // Equal sharpness 3 bumps to 4, so 4 levels × weight 1 are charged.
        let target = EnchantMap::from_pairs([("sharpness", 3)]);
        let sacrifice = EnchantMap::from_pairs([("sharpness", 3)]);
        assert_eq!(enchantment_cost(&target, &sacrifice), 4.0);
    }

    #[test]
    fn test_cost_weighs_by_registry() {
        // thorns weight 4, level 2 -> 8; unbreaking weight 1, level 3 -> 3
        let sacrifice = EnchantMap::from_pairs([("thorns", 2), ("unbreaking", 3)]);
        assert_eq!(enchantment_cost(&EnchantMap::new(), &sacrifice), 11.0);
    }

    #[test]
    fn test_merge_cost_includes_penalties() {
        let sacrifice = EnchantMap::from_pairs([("sharpness", 1)]);
        let cost = merge_level_cost(&EnchantMap::new(), 2, &sacrifice, 1);
        // 1 level + penalty(2)=3 + penalty(1)=1
        assert_eq!(cost, 5.0);
    }

    #[test]
    fn test_rounding_half_up() {
        assert_eq!(round_level_cost(38.5), 39);
        assert_eq!(round_level_cost(38.4), 38);
        assert_eq!(round_level_cost(0.0), 0);
    }

    #[test]
    fn test_merge_allowed() {
        assert!(merge_allowed(false, false));
        assert!(merge_allowed(true, false));
        assert!(merge_allowed(true, true));
        assert!(!merge_allowed(false, true));
    }
}
