//! FilterEngine: facet registry, selection state, recompute, sort and grouping.

use std::collections::BTreeMap;
use std::sync::Arc;

use kadi_core::{Hash, WeaponLite};
use serde::Serialize;

use crate::facet::{builtin_predicate, FacetKey, Predicate, Selection};
use crate::FilterError;

/// Index into the engine's weapon list.
pub type DocId = usize;

/// What an idle engine (no active facet) shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdleView {
    #[default]
    All,
    /// Nothing until a facet is active or the query is longer than `min_query_len`.
    RequireInput { min_query_len: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineState {
    #[default]
    Idle,
    Filtering,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SortSpec {
    pub stat: Hash,
    pub descending: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Group {
    pub label: String,
    pub value: Hash,
    pub hits: Vec<DocId>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FilterView {
    /// Bumped by the debounced loop on every publish; 0 for direct recomputes.
    pub epoch: u64,
    pub hits: Vec<DocId>,
    pub groups: Option<Vec<Group>>,
    pub active: Vec<FacetKey>,
    pub state: EngineState,
}

pub struct FilterEngine {
    weapons: Arc<Vec<WeaponLite>>,
    predicates: BTreeMap<FacetKey, Predicate>,
    selections: BTreeMap<FacetKey, Selection>,
    query: String,
    sort: Option<SortSpec>,
    group_by: Option<FacetKey>,
    idle: IdleView,
}

impl FilterEngine {
    /// Engine with no registered facets.
    pub fn new(weapons: impl Into<Arc<Vec<WeaponLite>>>) -> Self {
        Self {
            weapons: weapons.into(),
            predicates: BTreeMap::new(),
            selections: BTreeMap::new(),
            query: String::new(),
            sort: None,
            group_by: None,
            idle: IdleView::All,
        }
    }

    /// Register every built-in facet with its built-in predicate.
    pub fn with_default_facets(mut self) -> Self {
        for k in FacetKey::ALL {
            self.register_facet(k, builtin_predicate(k));
        }
        self
    }

    pub fn with_idle_view(mut self, idle: IdleView) -> Self {
        self.idle = idle;
        self
    }

    pub fn weapons(&self) -> &Arc<Vec<WeaponLite>> { &self.weapons }

    /// Replaces any previous predicate for `key`.
    pub fn register_facet(&mut self, key: FacetKey, predicate: Predicate) { self.predicates.insert(key, predicate); }

    /// An empty selection deactivates the facet.
    pub fn set_facet_values(&mut self, key: FacetKey, selection: Selection) -> Result<(), FilterError> {
        if !self.predicates.contains_key(&key) {
            return Err(FilterError::UnregisteredFacet(key));
        }
        if selection.is_empty() {
            self.selections.remove(&key);
            return Ok(());
        }
        let shape_ok = matches!(selection, Selection::Thresholds(_)) == key.is_threshold();
        if !shape_ok {
            return Err(FilterError::InvalidSelection(format!("{key} does not accept {selection:?}")));
        }
        self.selections.insert(key, selection);
        Ok(())
    }

    pub fn clear_facet(&mut self, key: FacetKey) { self.selections.remove(&key); }

    pub fn selection(&self, key: FacetKey) -> Option<&Selection> { self.selections.get(&key) }

    pub fn set_query(&mut self, text: impl Into<String>) { self.query = text.into(); }

    pub fn query(&self) -> &str { &self.query }

    pub fn set_sort(&mut self, sort: Option<SortSpec>) { self.sort = sort; }

    pub fn set_group_by(&mut self, key: Option<FacetKey>) -> Result<(), FilterError> {
        if let Some(k) = key {
            if k.is_threshold() {
                return Err(FilterError::InvalidSelection(format!("{k} cannot be grouped")));
            }
        }
        self.group_by = key;
        Ok(())
    }

    pub fn state(&self) -> EngineState {
        if self.selections.is_empty() { EngineState::Idle } else { EngineState::Filtering }
    }

    /// Active facet keys in stable order.
    pub fn active_facets(&self) -> Vec<FacetKey> { self.selections.keys().copied().collect() }

    /// Filtered and sorted doc ids. Pure over (weapons, selections, query, sort, idle policy).
    pub fn recompute(&self) -> Vec<DocId> {
        if let IdleView::RequireInput { min_query_len } = self.idle {
            if self.selections.is_empty() && self.query.trim().chars().count() <= min_query_len {
                return Vec::new();
            }
        }
        let mut hits = filter_weapons(&self.weapons, &self.predicates, &self.selections, &self.query);
        if let Some(sort) = self.sort {
            sort_by_stat(&self.weapons, &mut hits, sort);
        }
        hits
    }

    pub fn view(&self) -> FilterView {
        let started = std::time::Instant::now();
        let hits = self.recompute();
        let groups = self
            .group_by
            .and_then(|k| self.selections.get(&k).map(|sel| group_hits(&self.weapons, &hits, k, sel)));
        metrics::counter!("filter_recompute_total", 1u64);
        metrics::histogram!("filter_recompute_ms", started.elapsed().as_secs_f64() * 1000.0);
        FilterView { epoch: 0, hits, groups, active: self.active_facets(), state: self.state() }
    }
}

/// Docs whose name contains `query` (case-insensitive) and that pass every active facet.
/// A selection with no registered predicate matches nothing.
pub fn filter_weapons(
    weapons: &[WeaponLite],
    predicates: &BTreeMap<FacetKey, Predicate>,
    selections: &BTreeMap<FacetKey, Selection>,
    query: &str,
) -> Vec<DocId> {
    let needle = query.trim().to_lowercase();
    let active: Vec<(FacetKey, Option<&Predicate>, &Selection)> =
        selections.iter().map(|(k, s)| (*k, predicates.get(k), s)).collect();
    weapons
        .iter()
        .enumerate()
        .filter(|(_, w)| needle.is_empty() || w.name.to_lowercase().contains(&needle))
        .filter(|(_, w)| active.iter().all(|(k, p, s)| p.map(|p| p(*s, k.field(w))).unwrap_or(false)))
        .map(|(i, _)| i)
        .collect()
}

/// Stable sort by one raw stat. Docs lacking the stat keep their positions.
pub fn sort_by_stat(weapons: &[WeaponLite], hits: &mut [DocId], sort: SortSpec) {
    let slots: Vec<usize> = (0..hits.len()).filter(|i| weapons[hits[*i]].stats.contains_key(&sort.stat)).collect();
    let mut ranked: Vec<(i32, DocId)> = slots.iter().map(|i| (weapons[hits[*i]].stats[&sort.stat], hits[*i])).collect();
    if sort.descending {
        ranked.sort_by(|a, b| b.0.cmp(&a.0));
    } else {
        ranked.sort_by(|a, b| a.0.cmp(&b.0));
    }
    for (slot, (_, doc)) in slots.into_iter().zip(ranked) {
        hits[slot] = doc;
    }
}

/// One group per selected value in selection order; empty groups are omitted.
pub fn group_hits(weapons: &[WeaponLite], hits: &[DocId], key: FacetKey, selection: &Selection) -> Vec<Group> {
    selection
        .values()
        .iter()
        .filter_map(|v| {
            let members: Vec<DocId> = hits.iter().copied().filter(|d| key.field(&weapons[*d]).has(*v)).collect();
            (!members.is_empty()).then(|| Group { label: key.label_for(*v), value: *v, hits: members })
        })
        .collect()
}
