//! Stage unlocks derived from the persisted high score

use std::collections::BTreeSet;

use crate::sim::StageCatalog;

/// Levels selectable with the given high score. The first stage is always open.
pub fn unlocked_levels(catalog: &StageCatalog, high_score: u64) -> BTreeSet<u32> {
    let mut levels: BTreeSet<u32> = catalog
        .iter()
        .filter(|s| s.score_threshold <= high_score)
        .map(|s| s.level)
        .collect();
    levels.insert(catalog.first().level);
    levels
}

/// Levels opened by raising the high score from `old_high` to `new_high`
pub fn newly_unlocked(catalog: &StageCatalog, old_high: u64, new_high: u64) -> BTreeSet<u32> {
    let before = unlocked_levels(catalog, old_high);
    unlocked_levels(catalog, new_high)
        .difference(&before)
        .copied()
        .collect()
}
