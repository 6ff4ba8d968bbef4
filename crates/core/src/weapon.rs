//! Derived records: the detailed `Weapon` and the flat `WeaponLite`.
//!
//! Maps keyed by stat or perk id are `BTreeMap`s so serialized tables are
//! stable between runs (keys become decimal strings in JSON).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::manifest::InterpolationPoint;
use crate::Hash;

/// Investment stat joined with its stat definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedStat {
    pub stat_type_hash: Hash,
    pub value: i32,
    pub is_conditionally_active: bool,
    pub name: String,
    pub description: String,
}

/// Resolved stat plus the display curve from the weapon's stat group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeaponStat {
    #[serde(flatten)]
    pub stat: ResolvedStat,
    pub display_interpolation: Vec<InterpolationPoint>,
    pub display_as_numeric: bool,
}

pub type StatMap = BTreeMap<Hash, ResolvedStat>;

// ---- Sockets ----

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketKind {
    Catalyst,
    Mod,
    Masterwork,
    Ornament,
}

impl SocketKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SocketKind::Catalyst => "Catalyst",
            SocketKind::Mod => "Mod",
            SocketKind::Masterwork => "Masterwork",
            SocketKind::Ornament => "Ornament",
        }
    }
}

/// Empty-socket representation. Never carries stats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placeholder {
    pub kind: String,
    pub hash: Hash,
    pub icon: String,
    pub description: String,
    pub investment_stats: StatMap,
}

impl Placeholder {
    pub fn new(kind: SocketKind, hash: Hash, icon: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: format!("placeholder {}", kind.as_str()),
            hash,
            icon: icon.into(),
            description: description.into(),
            investment_stats: StatMap::new(),
        }
    }
}

/// One socket kind on a weapon: the placeholder and the concrete plugs.
/// `items` never contains the placeholder's hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocketMod<T> {
    pub placeholder: Placeholder,
    pub items: Vec<T>,
}

impl<T: HasHash> SocketMod<T> {
    pub fn new(placeholder: Placeholder, items: Vec<T>) -> Self {
        let ph = placeholder.hash;
        let items = items.into_iter().filter(|i| i.hash() != ph).collect();
        Self { placeholder, items }
    }
}

pub trait HasHash {
    fn hash(&self) -> Hash;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlugDetail {
    /// Item kind label (`Catalyst`, `Mod`, `Masterwork`, `Trait`).
    pub kind: String,
    pub hash: Hash,
    pub name: String,
    pub icon: String,
    pub description: String,
    // string keys: this struct is flattened into `Masterwork` and `Trait`
    #[serde(with = "crate::hash_keys")]
    pub investment_stats: StatMap,
}

impl HasHash for PlugDetail {
    fn hash(&self) -> Hash { self.hash }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Masterwork {
    #[serde(flatten)]
    pub plug: PlugDetail,
    pub watermark: String,
}

impl HasHash for Masterwork {
    fn hash(&self) -> Hash { self.plug.hash }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ornament {
    pub kind: String,
    pub hash: Hash,
    pub name: String,
    pub icon: String,
    pub description: String,
    pub screenshot: String,
    pub flavour_text: String,
}

impl HasHash for Ornament {
    fn hash(&self) -> Hash { self.hash }
}

/// Perk detail inside a column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trait {
    #[serde(flatten)]
    pub plug: PlugDetail,
    pub currently_can_roll: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerkColumn {
    #[serde(rename = "type")]
    pub label: String,
    pub items: BTreeMap<Hash, Trait>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Intrinsic {
    pub name: String,
    pub icon: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeaponSockets {
    pub catalyst: Option<SocketMod<PlugDetail>>,
    #[serde(rename = "mod")]
    pub mod_: Option<SocketMod<PlugDetail>>,
    pub masterwork: Option<SocketMod<Masterwork>>,
    pub ornament: Option<SocketMod<Ornament>>,
}

// ---- Weapon records ----

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Weapon {
    pub hash: Hash,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub screenshot: String,
    pub icon_watermark: String,
    pub icon_watermark_shelved: String,
    pub flavour_text: String,
    pub item_type_and_tier_display_name: String,
    pub intrinsic: Intrinsic,
    pub perks: Vec<PerkColumn>,
    pub investment_stats: BTreeMap<Hash, WeaponStat>,
    pub sockets: WeaponSockets,
}

/// Flat record used by the filter engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeaponLite {
    pub hash: Hash,
    pub name: String,
    pub icon: String,
    pub collectible_hash: Option<Hash>,
    pub summary_item_hash: Option<Hash>,
    pub icon_watermark: String,
    pub icon_watermark_shelved: String,
    pub flavour_text: String,
    pub item_type_and_tier_display_name: String,
    pub ammo_type: u32,
    pub default_damage_type: Hash,
    pub equipment_slot_type_hash: Hash,
    pub tier_type_hash: Hash,
    pub item_category: SmallVec<[Hash; 4]>,
    pub perks: Vec<Hash>,
    pub stats: BTreeMap<Hash, i32>,
    pub investment_stats: BTreeMap<Hash, WeaponStat>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn socket_mod_drops_placeholder_from_items() {
        let ph = Placeholder::new(SocketKind::Mod, 5, "/p.png", "empty");
        let items = vec![
            PlugDetail { hash: 5, ..Default::default() },
            PlugDetail { hash: 6, ..Default::default() },
        ];
        let sm = SocketMod::new(ph, items);
        assert_eq!(sm.placeholder.kind, "placeholder Mod");
        assert_eq!(sm.items.len(), 1);
        assert_eq!(sm.items[0].hash, 6);
    }

    #[test]
    fn sockets_serialize_with_catalog_names() {
        let mw = Masterwork {
            plug: PlugDetail { hash: 9, name: "Masterwork".into(), ..Default::default() },
            watermark: "/w.png".into(),
        };
        let sockets = WeaponSockets {
            masterwork: Some(SocketMod::new(Placeholder::new(SocketKind::Masterwork, 0, "", ""), vec![mw])),
            ..Default::default()
        };
        let v = serde_json::to_value(&sockets).unwrap();
        assert!(v.get("mod").unwrap().is_null());
        let item = &v["masterwork"]["items"][0];
        assert_eq!(item["hash"], 9);
        assert_eq!(item["watermark"], "/w.png");
        assert!(item["investmentStats"].as_object().unwrap().is_empty());
    }

    #[test]
    fn weapon_lite_stat_keys_are_decimal_strings() {
        let mut lite = WeaponLite { hash: 1, ..Default::default() };
        lite.stats.insert(4_043_523_819, 84);
        let v = serde_json::to_value(&lite).unwrap();
        assert_eq!(v["stats"]["4043523819"], 84);
        let back: WeaponLite = serde_json::from_value(v).unwrap();
        assert_eq!(back.stats.get(&4_043_523_819), Some(&84));
    }

    #[test]
    fn weapon_with_plug_stats_survives_json() {
        let stat = ResolvedStat { stat_type_hash: 1_240_592_695, value: 10, name: "Range".into(), ..Default::default() };
        let plug = |hash, kind: &str| PlugDetail {
            kind: kind.into(),
            hash,
            name: format!("plug {hash}"),
            investment_stats: StatMap::from([(stat.stat_type_hash, stat.clone())]),
            ..Default::default()
        };
        let weapon = Weapon {
            hash: 1,
            name: "Fatebringer".into(),
            perks: vec![PerkColumn {
                label: "Barrels".into(),
                items: BTreeMap::from([(20, Trait { plug: plug(20, "Trait"), currently_can_roll: true })]),
            }],
            investment_stats: BTreeMap::from([(
                stat.stat_type_hash,
                WeaponStat { stat: stat.clone(), display_as_numeric: true, ..Default::default() },
            )]),
            sockets: WeaponSockets {
                masterwork: Some(SocketMod::new(
                    Placeholder::new(SocketKind::Masterwork, 0, "", ""),
                    vec![Masterwork { plug: plug(30, "Masterwork"), watermark: "/w.png".into() }],
                )),
                ..Default::default()
            },
            ..Default::default()
        };
        let text = serde_json::to_string(&vec![weapon.clone()]).unwrap();
        let back: Vec<Weapon> = serde_json::from_str(&text).unwrap();
        assert_eq!(back, vec![weapon]);
        let v: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(v[0]["perks"][0]["items"]["20"]["investmentStats"]["1240592695"]["value"], 10);
    }
}
