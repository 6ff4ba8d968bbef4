//! StatCatalog: stat display metadata and per-group interpolation curves.

use std::collections::BTreeMap;

use kadi_core::{Hash, InterpolationPoint, RawItem, ResolvedStat, ScaledStat, StatDefinition, StatGroupDefinition, StatMap, WeaponStat};
use rustc_hash::FxHashMap;

pub struct StatCatalog<'a> {
    stats: FxHashMap<Hash, &'a StatDefinition>,
    groups: FxHashMap<Hash, &'a StatGroupDefinition>,
}

impl<'a> StatCatalog<'a> {
    pub fn new(stats: &'a [StatDefinition], groups: &'a [StatGroupDefinition]) -> Self {
        Self {
            stats: stats.iter().map(|s| (s.hash, s)).collect(),
            groups: groups.iter().map(|g| (g.hash, g)).collect(),
        }
    }

    pub fn stat(&self, id: Hash) -> Option<&'a StatDefinition> { self.stats.get(&id).copied() }

    pub fn group(&self, id: Hash) -> Option<&'a StatGroupDefinition> { self.groups.get(&id).copied() }

    pub fn scaled(&self, group: Hash, stat: Hash) -> Option<&'a ScaledStat> {
        self.group(group)?.scaled_stats.iter().find(|s| s.stat_hash == stat)
    }

    pub fn interpolation(&self, group: Hash, stat: Hash) -> Option<&'a [InterpolationPoint]> {
        self.scaled(group, stat).map(|s| s.display_interpolation.as_slice())
    }

    /// Join the item's investment stats with stat definitions; unknown ids are dropped.
/// A repeated stat id keeps its last entry.
    pub fn resolve_stats(&self, item: &RawItem) -> StatMap {
        let mut out = StatMap::new();
        for inv in &item.investment_stats {
            let Some(def) = self.stat(inv.stat_type_hash) else { continue };
            out.insert(
                inv.stat_type_hash,
                ResolvedStat {
                    stat_type_hash: inv.stat_type_hash,
                    value: inv.value,
                    is_conditionally_active: inv.is_conditionally_active,
                    name: def.display_properties.name.clone(),
                    description: def.display_properties.description.clone(),
                },
            );
        }
        out
    }

    /// Resolved stats that also appear in the item's stat group, with their display curves.
    pub fn with_interpolation(&self, item: &RawItem) -> BTreeMap<Hash, WeaponStat> {
        let mut out = BTreeMap::new();
        let Some(group) = item.stat_group_hash().and_then(|g| self.group(g)) else { return out };
        let mut resolved = self.resolve_stats(item);
        for scaled in &group.scaled_stats {
            let Some(stat) = resolved.remove(&scaled.stat_hash) else { continue };
            out.insert(
                scaled.stat_hash,
                WeaponStat {
                    stat,
                    display_interpolation: scaled.display_interpolation.clone(),
                    display_as_numeric: scaled.display_as_numeric,
                },
            );
        }
        out
    }
}
