//! Manifest records as published by the catalog (camelCase JSON).
//!
//! Only the fields the pipeline reads are modelled; unknown fields are ignored
//! and missing ones fall back to their defaults.

use serde::{Deserialize, Serialize};

use crate::Hash;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DisplayProperties {
    pub name: String,
    pub description: String,
    pub icon: String,
}

/// Item definition (weapon, plug, ornament, ...). Immutable once loaded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawItem {
    pub hash: Hash,
    pub display_properties: DisplayProperties,
    /// `None` means the item is uncategorised (and never classified).
    pub item_category_hashes: Option<Vec<Hash>>,
    pub item_sub_type: i32,
    pub item_type_display_name: String,
    pub item_type_and_tier_display_name: String,
    pub flavor_text: String,
    pub screenshot: String,
    pub icon_watermark: String,
    pub icon_watermark_shelved: String,
    pub trait_ids: Option<Vec<String>>,
    pub plug: Option<PlugBlock>,
    pub sockets: Option<SocketBlock>,
    pub investment_stats: Vec<InvestmentStat>,
    pub stats: Option<ItemStatBlock>,
    pub perks: Vec<ItemPerkRef>,
    pub inventory: Option<InventoryBlock>,
    pub equipping_block: Option<EquippingBlock>,
    pub default_damage_type_hash: Option<Hash>,
    pub collectible_hash: Option<Hash>,
    pub summary_item_hash: Option<Hash>,
}

impl RawItem {
    pub fn name(&self) -> &str { &self.display_properties.name }

    pub fn has_category(&self, category: Hash) -> bool {
        self.item_category_hashes.as_deref().map(|c| c.contains(&category)).unwrap_or(false)
    }

    pub fn plug_category(&self) -> Option<&str> {
        self.plug.as_ref().map(|p| p.plug_category_identifier.as_str())
    }

    pub fn stat_group_hash(&self) -> Option<Hash> {
        self.stats.as_ref().and_then(|s| s.stat_group_hash)
    }

    /// True when one of the item's investment stats targets `stat`.
    pub fn tracks_stat(&self, stat: Hash) -> bool {
        self.investment_stats.iter().any(|s| s.stat_type_hash == stat)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlugBlock {
    pub plug_category_identifier: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SocketBlock {
    pub socket_entries: Vec<SocketEntry>,
    pub socket_categories: Vec<SocketCategory>,
}

impl SocketBlock {
    /// Entries referenced by every category with `category_hash`, in category then index order.
    /// Indexes pointing past the entry list are skipped.
    pub fn entries_in(&self, category_hash: Hash) -> impl Iterator<Item = &SocketEntry> + '_ {
        self.socket_categories
            .iter()
            .filter(move |c| c.socket_category_hash == category_hash)
            .flat_map(|c| c.socket_indexes.iter())
            .filter_map(move |i| self.socket_entries.get(*i))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SocketEntry {
    pub single_initial_item_hash: Hash,
    pub reusable_plug_items: Vec<PlugRef>,
    pub reusable_plug_set_hash: Option<Hash>,
    pub randomized_plug_set_hash: Option<Hash>,
}

impl SocketEntry {
    pub fn offered_hashes(&self) -> impl Iterator<Item = Hash> + '_ {
        self.reusable_plug_items.iter().map(|p| p.plug_item_hash)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlugRef {
    pub plug_item_hash: Hash,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SocketCategory {
    pub socket_category_hash: Hash,
    pub socket_indexes: Vec<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InvestmentStat {
    pub stat_type_hash: Hash,
    pub value: i32,
    pub is_conditionally_active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemStatBlock {
    pub stat_group_hash: Option<Hash>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemPerkRef {
    pub perk_hash: Hash,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InventoryBlock {
    pub tier_type_hash: Hash,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EquippingBlock {
    pub equipment_slot_type_hash: Hash,
    pub ammo_type: u32,
}

// ---- Auxiliary tables ----

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatDefinition {
    pub hash: Hash,
    pub display_properties: DisplayProperties,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatGroupDefinition {
    pub hash: Hash,
    pub scaled_stats: Vec<ScaledStat>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScaledStat {
    pub stat_hash: Hash,
    pub display_as_numeric: bool,
    pub display_interpolation: Vec<InterpolationPoint>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpolationPoint {
    pub value: i32,
    pub weight: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlugSetDefinition {
    pub hash: Hash,
    pub reusable_plug_items: Vec<PlugSetEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlugSetEntry {
    pub plug_item_hash: Hash,
    pub currently_can_roll: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SandboxPerkDefinition {
    pub hash: Hash,
    pub display_properties: DisplayProperties,
}
