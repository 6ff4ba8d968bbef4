//! Kadi core types: manifest records, derived weapon records, catalog constants.

#![forbid(unsafe_code)]

pub mod facets;
pub mod hash_keys;
pub mod hashes;
pub mod manifest;
pub mod tables;
pub mod weapon;

/// Catalog identity. Every manifest id (item, stat, plug set, category) is a u32.
pub type Hash = u32;

pub use manifest::{
    DisplayProperties, InterpolationPoint, InvestmentStat, PlugSetDefinition, PlugSetEntry, RawItem,
    SandboxPerkDefinition, ScaledStat, SocketBlock, SocketEntry, StatDefinition, StatGroupDefinition,
};
pub use weapon::{
    Intrinsic, Masterwork, Ornament, PerkColumn, Placeholder, PlugDetail, ResolvedStat, SocketKind, SocketMod,
    StatMap, Trait, Weapon, WeaponLite, WeaponSockets, WeaponStat,
};

pub mod prelude {
    pub use super::{
        Hash, RawItem, ResolvedStat, SocketKind, SocketMod, StatDefinition, StatGroupDefinition, Weapon, WeaponLite,
        WeaponStat,
    };
}
