//! Kadi search: faceted filtering over WeaponLite records.
//! Predicate registry, recompute, sort/group, plus a debounced input loop.

#![forbid(unsafe_code)]

pub mod debounce;
pub mod engine;
pub mod facet;
pub mod stat_facets;

use thiserror::Error;

pub use debounce::{spawn_filter_loop, DebounceConfig, FilterEvent, FilterHandle};
pub use engine::{
    filter_weapons, group_hits, sort_by_stat, DocId, EngineState, FilterEngine, FilterView, Group, IdleView, SortSpec,
};
pub use facet::{builtin_predicate, parse_threshold, FacetKey, FieldValue, InputSlot, Predicate, Selection};
pub use stat_facets::{slider_stats, SliderStat};

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("facet {0} has no registered predicate")]
    UnregisteredFacet(FacetKey),
    #[error("unknown facet: {0}")]
    UnknownFacet(String),
    #[error("invalid selection: {0}")]
    InvalidSelection(String),
}
