//! Facet keys, selections and the built-in predicates.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use kadi_core::facets::{self, FacetLabel};
use kadi_core::{Hash, WeaponLite};
use serde::{Deserialize, Serialize};

use crate::FilterError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FacetKey {
    AmmoType,
    DefaultDamageType,
    EquipmentSlotTypeHash,
    TierTypeHash,
    ItemCategory,
    Perks,
    Stats,
}

/// How a facet is driven from the input side; picks the debounce interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSlot {
    Toggle,
    Slider,
    Text,
}

impl FacetKey {
    pub const ALL: [FacetKey; 7] = [
        FacetKey::AmmoType,
        FacetKey::DefaultDamageType,
        FacetKey::EquipmentSlotTypeHash,
        FacetKey::TierTypeHash,
        FacetKey::ItemCategory,
        FacetKey::Perks,
        FacetKey::Stats,
    ];

    /// Field name on `WeaponLite`.
    pub fn as_str(self) -> &'static str {
        match self {
            FacetKey::AmmoType => "ammoType",
            FacetKey::DefaultDamageType => "defaultDamageType",
            FacetKey::EquipmentSlotTypeHash => "equipmentSlotTypeHash",
            FacetKey::TierTypeHash => "tierTypeHash",
            FacetKey::ItemCategory => "itemCategory",
            FacetKey::Perks => "perks",
            FacetKey::Stats => "stats",
        }
    }

    pub fn slot(self) -> InputSlot {
        match self {
            FacetKey::Stats => InputSlot::Slider,
            _ => InputSlot::Toggle,
        }
    }

    /// Threshold facets take `Selection::Thresholds`; the rest take `Selection::Values`.
    pub fn is_threshold(self) -> bool { matches!(self, FacetKey::Stats) }

    pub fn labels(self) -> Option<&'static [FacetLabel]> {
        match self {
            FacetKey::AmmoType => Some(facets::AMMO_TYPES),
            FacetKey::DefaultDamageType => Some(facets::DAMAGE_TYPES),
            FacetKey::EquipmentSlotTypeHash => Some(facets::EQUIPMENT_SLOTS),
            FacetKey::TierTypeHash => Some(facets::TIERS),
            FacetKey::ItemCategory => Some(facets::ITEM_CATEGORIES),
            FacetKey::Perks | FacetKey::Stats => None,
        }
    }

    /// Display label for one facet value; the numeric id when the table has no entry.
    pub fn label_for(self, value: Hash) -> String {
        self.labels()
            .and_then(|t| facets::label_for(t, value))
            .map(str::to_string)
            .unwrap_or_else(|| value.to_string())
    }

    pub fn field(self, w: &WeaponLite) -> FieldValue<'_> {
        match self {
            FacetKey::AmmoType => FieldValue::Scalar(w.ammo_type),
            FacetKey::DefaultDamageType => FieldValue::Scalar(w.default_damage_type),
            FacetKey::EquipmentSlotTypeHash => FieldValue::Scalar(w.equipment_slot_type_hash),
            FacetKey::TierTypeHash => FieldValue::Scalar(w.tier_type_hash),
            FacetKey::ItemCategory => FieldValue::Set(&w.item_category),
            FacetKey::Perks => FieldValue::Set(&w.perks),
            FacetKey::Stats => FieldValue::Stats(&w.stats),
        }
    }
}

impl fmt::Display for FacetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for FacetKey {
    type Err = FilterError;

    /// Field names plus short aliases (`ammo`, `damage`, `slot`, `tier`, `category`, `perk`, `stat`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let k = match s.trim().to_ascii_lowercase().as_str() {
            "ammotype" | "ammo" => FacetKey::AmmoType,
            "defaultdamagetype" | "damage" | "element" => FacetKey::DefaultDamageType,
            "equipmentslottypehash" | "slot" => FacetKey::EquipmentSlotTypeHash,
            "tiertypehash" | "tier" | "rarity" => FacetKey::TierTypeHash,
            "itemcategory" | "category" | "archetype" => FacetKey::ItemCategory,
            "perks" | "perk" => FacetKey::Perks,
            "stats" | "stat" => FacetKey::Stats,
            _ => return Err(FilterError::UnknownFacet(s.to_string())),
        };
        Ok(k)
    }
}

/// A weapon's value for one facet.
#[derive(Debug, Clone, Copy)]
pub enum FieldValue<'a> {
    Scalar(Hash),
    Set(&'a [Hash]),
    Stats(&'a BTreeMap<Hash, i32>),
}

impl FieldValue<'_> {
    /// True when the field equals (scalar) or contains (set) `value`.
    pub fn has(&self, value: Hash) -> bool {
        match self {
            FieldValue::Scalar(v) => *v == value,
            FieldValue::Set(s) => s.contains(&value),
            FieldValue::Stats(_) => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Selection {
    Values(Vec<Hash>),
    Thresholds(#[serde(with = "kadi_core::hash_keys")] BTreeMap<Hash, i32>),
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        match self {
            Selection::Values(v) => v.is_empty(),
            Selection::Thresholds(t) => t.is_empty(),
        }
    }

    pub fn values(&self) -> &[Hash] {
        match self {
            Selection::Values(v) => v,
            Selection::Thresholds(_) => &[],
        }
    }
}

/// `(selection, field) -> keep`. Must not panic on a mismatched shape.
pub type Predicate = Arc<dyn Fn(&Selection, FieldValue<'_>) -> bool + Send + Sync>;

/// Scalar field is one of the selected values.
pub fn member_of(sel: &Selection, field: FieldValue<'_>) -> bool {
    match (sel, field) {
        (Selection::Values(v), FieldValue::Scalar(x)) => v.contains(&x),
        _ => false,
    }
}

/// Any selected value is present in a multi-valued field.
pub fn any_present(sel: &Selection, field: FieldValue<'_>) -> bool {
    match (sel, field) {
        (Selection::Values(v), FieldValue::Set(s)) => v.iter().any(|x| s.contains(x)),
        _ => false,
    }
}

/// Every selected stat is strictly above its threshold; a missing stat fails.
pub fn exceeds_thresholds(sel: &Selection, field: FieldValue<'_>) -> bool {
    match (sel, field) {
        (Selection::Thresholds(t), FieldValue::Stats(m)) => t.iter().all(|(k, min)| m.get(k).map(|v| v > min).unwrap_or(false)),
        _ => false,
    }
}

pub fn builtin_predicate(key: FacetKey) -> Predicate {
    match key {
        FacetKey::ItemCategory | FacetKey::Perks => Arc::new(any_present),
        FacetKey::Stats => Arc::new(exceeds_thresholds),
        _ => Arc::new(member_of),
    }
}

/// Parse `ID>VALUE` or `NAME>VALUE` (basic stat names) into a threshold pair.
pub fn parse_threshold(input: &str) -> Result<(Hash, i32), FilterError> {
    let bad = || FilterError::InvalidSelection(format!("expected STAT>VALUE, got {input:?}"));
    let (stat, value) = input.split_once('>').ok_or_else(bad)?;
    let stat = stat.trim();
    let hash = stat.parse::<Hash>().ok().or_else(|| facets::basic_stat_hash(stat)).ok_or_else(bad)?;
    let value = value.trim().parse::<i32>().map_err(|_| bad())?;
    Ok((hash, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_parse_from_field_names_and_aliases() {
        for k in FacetKey::ALL {
            assert_eq!(k.as_str().parse::<FacetKey>().unwrap(), k);
        }
        assert_eq!("Ammo".parse::<FacetKey>().unwrap(), FacetKey::AmmoType);
        assert!(matches!("colour".parse::<FacetKey>(), Err(FilterError::UnknownFacet(_))));
    }

    #[test]
    fn selections_decode_from_json() {
        let sel: Selection = serde_json::from_str(r#"{"4043523819": 40}"#).unwrap();
        assert_eq!(sel, Selection::Thresholds(BTreeMap::from([(4_043_523_819, 40)])));
        let sel: Selection = serde_json::from_str("[6, 7]").unwrap();
        assert_eq!(sel, Selection::Values(vec![6, 7]));
        assert_eq!(serde_json::to_string(&Selection::Thresholds(BTreeMap::from([(1, 2)]))).unwrap(), r#"{"1":2}"#);
        assert!(serde_json::from_str::<Selection>(r#"{"range": 40}"#).is_err());
    }

    #[test]
    fn wrong_shape_is_false() {
        let stats = BTreeMap::from([(1, 50)]);
        assert!(!member_of(&Selection::Thresholds(BTreeMap::new()), FieldValue::Scalar(1)));
        assert!(!any_present(&Selection::Values(vec![1]), FieldValue::Scalar(1)));
        assert!(!exceeds_thresholds(&Selection::Values(vec![1]), FieldValue::Stats(&stats)));
    }

    #[test]
    fn thresholds_are_strict_and_missing_fails() {
        let stats = BTreeMap::from([(1, 50), (2, 40)]);
        let sel = |pairs: &[(Hash, i32)]| Selection::Thresholds(pairs.iter().copied().collect());
        assert!(exceeds_thresholds(&sel(&[(1, 40)]), FieldValue::Stats(&stats)));
        assert!(!exceeds_thresholds(&sel(&[(2, 40)]), FieldValue::Stats(&stats)));
        assert!(!exceeds_thresholds(&sel(&[(3, 0)]), FieldValue::Stats(&stats)));
    }

    #[test]
    fn threshold_parsing() {
        assert_eq!(parse_threshold("4043523819>40").unwrap(), (4_043_523_819, 40));
        assert_eq!(parse_threshold("range > 55").unwrap(), (1_240_592_695, 55));
        assert!(parse_threshold("range=55").is_err());
        assert!(parse_threshold("bogus>1").is_err());
    }

    #[test]
    fn labels_fall_back_to_ids() {
        assert_eq!(FacetKey::ItemCategory.label_for(7), "pulse_rifle");
        assert_eq!(FacetKey::ItemCategory.label_for(424242), "424242");
        assert_eq!(FacetKey::Perks.label_for(5), "5");
    }
}
