//! Names of the derived tables written by the pipeline.

pub const WEAPONS_LITE: &str = "WeaponsLite";
pub const WEAPONS: &str = "Weapons";
pub const CATEGORY_STAT_GROUPS: &str = "WeaponCategoryStatGroupMap";

pub const TRAITS: &str = "Traits";
pub const MASTERWORK: &str = "MasterWork";
pub const CATALYSTS: &str = "Catalysts";
pub const WEAPON_MODS: &str = "WeaponMods";
pub const ORNAMENTS: &str = "Ornaments";

/// Manifest tables copied through unchanged for stat-slider discovery.
pub const STAT_DEFINITIONS: &str = "DestinyStatDefinition";
pub const STAT_GROUP_DEFINITIONS: &str = "DestinyStatGroupDefinition";

pub const BUCKET_TABLES: [&str; 5] = [TRAITS, MASTERWORK, CATALYSTS, WEAPON_MODS, ORNAMENTS];
