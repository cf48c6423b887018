//! Enchantment vocabulary: identifiers, anvil weights, and the leveling
//! rule applied when two enchanted items meet on an anvil.

mod map;
mod registry;

pub use map::{resulting_level, EnchantMap};
pub use registry::{max_level_for, weight_for};
