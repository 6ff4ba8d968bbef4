//! Fixed label tables for facet values and basic stat names.
//!
//! Used for reverse lookup when grouping results and for parsing user input.
//! Labels are lower snake case; lookups by label ignore case and accept `-`.

use crate::Hash;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FacetLabel {
    pub label: &'static str,
    pub hash: Hash,
}

const fn fl(label: &'static str, hash: Hash) -> FacetLabel { FacetLabel { label, hash } }

// ---------------- Facet tables ----------------
pub static DAMAGE_TYPES: &[FacetLabel] = &[
    fl("kinetic", 3_373_582_085),
    fl("stasis", 151_347_233),
    fl("solar", 1_847_026_933),
    fl("arc", 2_303_181_850),
    fl("void", 3_454_344_768),
];

pub static EQUIPMENT_SLOTS: &[FacetLabel] = &[
    fl("kinetic_slot", 1_498_876_634),
    fl("energy", 2_465_295_065),
    fl("heavy", 953_998_645),
];

pub static AMMO_TYPES: &[FacetLabel] = &[
    fl("primary", 1),
    fl("special", 2),
    fl("power", 3),
];

pub static ITEM_CATEGORIES: &[FacetLabel] = &[
    fl("pulse_rifle", 7),
    fl("hand_cannon", 6),
    fl("glaive", 3_871_742_104),
    fl("trace_rifle", 2_489_664_120),
    fl("scout_rifle", 8),
    fl("auto_rifle", 5),
    fl("sword", 54),
    fl("rocket", 13),
    fl("submachine_gun", 3_954_685_534),
    fl("machine_gun", 12),
    fl("sidearm", 14),
    fl("shotgun", 11),
    fl("sniper_rifle", 10),
    fl("grenade_launcher", 153_950_757),
    fl("bow", 3_317_538_576),
    fl("fusion_rifle", 9),
    fl("linear_fusion_rifle", 1_504_945_536),
];

pub static TIERS: &[FacetLabel] = &[
    fl("rare", 2_127_292_149),
    fl("common", 2_395_677_314),
    fl("exotic", 2_759_499_571),
    fl("legendary", 4_008_398_120),
];

pub fn label_for(table: &[FacetLabel], hash: Hash) -> Option<&'static str> {
    table.iter().find(|f| f.hash == hash).map(|f| f.label)
}

pub fn hash_for(table: &[FacetLabel], label: &str) -> Option<Hash> {
    let wanted = label.trim().to_ascii_lowercase().replace('-', "_");
    table.iter().find(|f| f.label == wanted).map(|f| f.hash)
}

/// Parse either a label from `table` or a bare numeric id.
pub fn parse_value(table: &[FacetLabel], input: &str) -> Option<Hash> {
    hash_for(table, input).or_else(|| input.trim().parse::<Hash>().ok())
}

// ---------------- Basic stat names ----------------
pub static BASIC_STATS: &[(Hash, &str)] = &[
    (4_043_523_819, "Impact"),
    (1_240_592_695, "Range"),
    (155_624_089, "Stability"),
    (943_549_884, "Handling"),
    (4_188_031_367, "Reload Speed"),
    (3_871_231_066, "Magazine"),
    (1_345_609_583, "Aim Assistance"),
    (3_555_269_338, "Zoom"),
    (2_715_839_340, "Recoil Direction"),
    (447_667_954, "Draw Time"),
    (2_961_396_640, "Charge Time"),
    (2_523_465_841, "Velocity"),
    (3_614_673_599, "Blast Radius"),
    (1_591_432_999, "Accuracy"),
    (925_767_036, "Ammo Capacity"),
    (1_931_675_084, "Inventory Size"),
    (2_996_146_975, "Mobility"),
    (392_767_087, "Resilience"),
    (1_943_323_491, "Recovery"),
];

pub fn basic_stat_name(hash: Hash) -> Option<&'static str> {
    BASIC_STATS.iter().find(|(h, _)| *h == hash).map(|(_, n)| *n)
}

/// Case-insensitive; `reload_speed`, `reload-speed` and `Reload Speed` all match.
pub fn basic_stat_hash(name: &str) -> Option<Hash> {
    let norm = |s: &str| s.chars().filter(|c| c.is_ascii_alphanumeric()).collect::<String>().to_ascii_lowercase();
    let wanted = norm(name);
    BASIC_STATS.iter().find(|(_, n)| norm(n) == wanted).map(|(h, _)| *h)
}
