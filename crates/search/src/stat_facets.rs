//! Which stats get a threshold slider for the selected categories.

use std::collections::BTreeMap;

use kadi_core::{Hash, InterpolationPoint, StatDefinition, StatGroupDefinition};
use rustc_hash::FxHashSet;
use serde::Serialize;

/// Curves with at least this many points are display-only and get no slider.
const MAX_SLIDER_CURVE: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SliderStat {
    pub hash: Hash,
    pub name: String,
}

/// Stats offered as sliders, in stat-definition order.
///
/// The groups of the selected categories are visited in group-table order and
/// a stat seen in several groups keeps the curve of the last one.
pub fn slider_stats(
    categories: &[Hash],
    category_groups: &BTreeMap<Hash, Hash>,
    groups: &[StatGroupDefinition],
    stats: &[StatDefinition],
) -> Vec<SliderStat> {
    let wanted: FxHashSet<Hash> = categories.iter().filter_map(|c| category_groups.get(c).copied()).collect();
    let mut curves: BTreeMap<Hash, &[InterpolationPoint]> = BTreeMap::new();
    for g in groups.iter().filter(|g| wanted.contains(&g.hash)) {
        for s in &g.scaled_stats {
            curves.insert(s.stat_hash, &s.display_interpolation);
        }
    }
    stats
        .iter()
        .filter(|d| curves.get(&d.hash).map(|c| c.len() < MAX_SLIDER_CURVE).unwrap_or(false))
        .map(|d| SliderStat { hash: d.hash, name: d.display_properties.name.clone() })
        .collect()
}
