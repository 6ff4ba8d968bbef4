//! SocketExtractor: per-kind socket contents for one weapon.
//!
//! Every extraction selects socket entries by socket category first; an item
//! without a socket block is a data-contract error for all of them. Expected
//! absence (no eligible entry, empty plug set) is `Ok(None)`.

use std::collections::BTreeMap;

use kadi_core::hashes::{self, MASTERWORK_PEAK_VALUE};
use kadi_core::{
    Hash, Intrinsic, Masterwork, Ornament, PerkColumn, Placeholder, PlugDetail, PlugSetDefinition, RawItem,
    SandboxPerkDefinition, SocketEntry, SocketKind, SocketMod, Trait,
};
use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashMap;

use crate::classify::{ItemBucket, ItemCategories};
use crate::error::TransformError;
use crate::stats::StatCatalog;

static ADEPT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)harrowed|adept|timelost").expect("adept pattern"));

/// Adept-class weapons (harrowed, adept, timelost) keep every masterwork tier and adept mods.
pub fn is_adept(name: &str) -> bool { ADEPT_RE.is_match(name) }

/// A bucket member reached through a plug set.
#[derive(Debug, Clone, Copy)]
pub struct Plug<'a> {
    pub item: &'a RawItem,
    pub currently_can_roll: bool,
}

/// Entries under every socket category with `category`; out-of-range indexes are skipped.
pub fn socket_entries<'a>(item: &'a RawItem, category: Hash) -> Result<impl Iterator<Item = &'a SocketEntry> + 'a, TransformError> {
    let block = item.sockets.as_ref().ok_or(TransformError::MissingSocketBlock { item: item.hash })?;
    Ok(block.entries_in(category))
}

pub struct SocketExtractor<'a> {
    cats: &'a ItemCategories<'a>,
    stats: &'a StatCatalog<'a>,
    plug_sets: FxHashMap<Hash, &'a PlugSetDefinition>,
    sandbox_perks: FxHashMap<Hash, &'a SandboxPerkDefinition>,
}

impl<'a> SocketExtractor<'a> {
    pub fn new(
        cats: &'a ItemCategories<'a>,
        stats: &'a StatCatalog<'a>,
        plug_sets: &'a [PlugSetDefinition],
        sandbox_perks: &'a [SandboxPerkDefinition],
    ) -> Self {
        let mut sets = FxHashMap::default();
        for s in plug_sets {
            sets.entry(s.hash).or_insert(s);
        }
        Self { cats, stats, plug_sets: sets, sandbox_perks: sandbox_perks.iter().map(|p| (p.hash, p)).collect() }
    }

    /// Resolve a plug set against `bucket`, in plug-set order; unknown plugs are skipped.
    pub fn plug_items(&self, set_hash: Hash, bucket: &ItemBucket<'a>) -> Vec<Plug<'a>> {
        let Some(set) = self.plug_sets.get(&set_hash) else { return Vec::new() };
        set.reusable_plug_items
            .iter()
            .filter_map(|p| bucket.get(p.plug_item_hash).map(|item| Plug { item, currently_can_roll: p.currently_can_roll }))
            .collect()
    }

    fn detail(&self, kind: &str, item: &RawItem) -> PlugDetail {
        PlugDetail {
            kind: kind.to_string(),
            hash: item.hash,
            name: item.display_properties.name.clone(),
            icon: item.display_properties.icon.clone(),
            description: item.display_properties.description.clone(),
            investment_stats: self.stats.resolve_stats(item),
        }
    }

    // ---- Intrinsic ----

    pub fn intrinsic(&self, weapon: &'a RawItem) -> Result<Intrinsic, TransformError> {
        let plug = socket_entries(weapon, hashes::SOCKET_INTRINSIC)?.next().map(|e| e.single_initial_item_hash).unwrap_or(0);
        let m = self
            .cats
            .weapon_mods()
            .get(plug)
            .ok_or(TransformError::MissingIntrinsic { weapon: weapon.hash, plug })?;
        Ok(Intrinsic {
            name: m.display_properties.name.clone(),
            icon: m.display_properties.icon.clone(),
            description: m.display_properties.description.clone(),
        })
    }

    // ---- Perks ----

    /// One resolved plug list per perk socket (tracker excluded); lists may be empty.
    fn perk_sets(&self, weapon: &'a RawItem) -> Result<Vec<Vec<Plug<'a>>>, TransformError> {
        let mods = self.cats.weapon_mods();
        Ok(socket_entries(weapon, hashes::SOCKET_PERKS)?
            .filter(|e| e.single_initial_item_hash != hashes::TRACKER_SOCKET)
            .map(|e| match e.randomized_plug_set_hash.or(e.reusable_plug_set_hash) {
                Some(set) => self.plug_items(set, mods),
                None => Vec::new(),
            })
            .collect())
    }

    pub fn perk_columns(&self, weapon: &'a RawItem) -> Result<Vec<PerkColumn>, TransformError> {
        Ok(self
            .perk_sets(weapon)?
            .into_iter()
            .filter_map(|set| {
                let label = set.first()?.item.item_type_display_name.clone();
                let mut items = BTreeMap::new();
                for p in set {
                    items.insert(p.item.hash, Trait { plug: self.detail("Trait", p.item), currently_can_roll: p.currently_can_roll });
                }
                Some(PerkColumn { label, items })
            })
            .collect())
    }

    /// Perk hashes of all columns, flattened in column order.
    pub fn perk_hashes(&self, weapon: &'a RawItem) -> Result<Vec<Hash>, TransformError> {
        Ok(self.perk_sets(weapon)?.into_iter().flatten().map(|p| p.item.hash).collect())
    }

    // ---- Catalyst ----

    pub fn catalyst(&self, weapon: &'a RawItem) -> Result<Option<SocketMod<PlugDetail>>, TransformError> {
        let Some(entry) = socket_entries(weapon, hashes::SOCKET_REUSABLE)?.find(|e| !e.reusable_plug_items.is_empty()) else {
            return Ok(None);
        };
        let offered: Vec<Hash> = entry.offered_hashes().collect();
        let catalysts = self.cats.catalysts();
        let catalyst = catalysts.items().iter().find(|c| offered.contains(&c.hash));
        let masterwork = self.cats.masterworks().items().iter().find(|m| offered.contains(&m.hash));
        let (Some(catalyst), Some(_)) = (catalyst, masterwork) else { return Ok(None) };

        let ph = catalysts.get(entry.single_initial_item_hash).ok_or(TransformError::MissingPlaceholder {
            weapon: weapon.hash,
            kind: SocketKind::Catalyst.as_str(),
            plug: entry.single_initial_item_hash,
        })?;
        let placeholder = Placeholder::new(SocketKind::Catalyst, ph.hash, ph.display_properties.icon.clone(), ph.display_properties.description.clone());
        Ok(Some(SocketMod::new(placeholder, vec![self.detail("Catalyst", catalyst)])))
    }

    // ---- Masterwork ----

    pub fn masterwork(&self, weapon: &'a RawItem) -> Result<Option<SocketMod<Masterwork>>, TransformError> {
        let Some(entry) = socket_entries(weapon, hashes::SOCKET_REUSABLE)?.find(|e| hashes::is_tier_one_masterwork(e.single_initial_item_hash)) else {
            return Ok(None);
        };
        let offered: Vec<Hash> = entry.offered_hashes().collect();
        if offered.is_empty() {
            return Ok(None);
        }
        let ph_hash = entry.single_initial_item_hash;
        let candidates: Vec<&RawItem> = self
            .cats
            .masterworks()
            .items()
            .iter()
            .copied()
            .filter(|m| offered.contains(&m.hash) || m.hash == ph_hash)
            .collect();

        let adept = is_adept(weapon.name());
        let items: Vec<Masterwork> = candidates
            .iter()
            .filter(|m| m.name() == hashes::MASTERWORK_ITEM_NAME)
            .filter(|m| {
                // peak stat: first contribution at the masterwork value
                m.investment_stats
                    .iter()
                    .find(|s| s.value == MASTERWORK_PEAK_VALUE)
                    .map(|s| weapon.tracks_stat(s.stat_type_hash))
                    .unwrap_or(false)
            })
            .map(|m| {
                let mut plug = self.detail("Masterwork", m);
                if !adept {
                    plug.investment_stats.retain(|_, s| s.value == MASTERWORK_PEAK_VALUE);
                }
                Masterwork { plug, watermark: m.icon_watermark.clone() }
            })
            .collect();

        let placeholder = match candidates.iter().find(|m| m.hash == ph_hash) {
            Some(p) => Placeholder::new(SocketKind::Masterwork, p.hash, p.display_properties.icon.clone(), p.display_properties.description.clone()),
            None => Placeholder::new(
                SocketKind::Masterwork,
                0,
                hashes::DEFAULT_MASTERWORK_ICON,
                items.first().map(|i| i.plug.description.clone()).unwrap_or_default(),
            ),
        };
        Ok(Some(SocketMod::new(placeholder, items)))
    }

    // ---- Mod ----

    pub fn mods(&self, weapon: &'a RawItem) -> Result<Option<SocketMod<PlugDetail>>, TransformError> {
        if weapon.item_type_and_tier_display_name.to_lowercase().starts_with("exotic") {
            return Ok(None);
        }
        let Some(entry) = socket_entries(weapon, hashes::SOCKET_REUSABLE)?.find(|e| e.single_initial_item_hash == hashes::EMPTY_MOD_SOCKET) else {
            return Ok(None);
        };
        let Some(set) = entry.reusable_plug_set_hash else { return Ok(None) };
        let mut all = self.plug_items(set, self.cats.weapon_mods());
        let ph = all.iter().find(|p| p.item.hash == hashes::EMPTY_MOD_SOCKET).map(|p| p.item).ok_or(TransformError::MissingPlaceholder {
            weapon: weapon.hash,
            kind: SocketKind::Mod.as_str(),
            plug: hashes::EMPTY_MOD_SOCKET,
        })?;

        if is_adept(weapon.name()) {
            all.reverse();
        } else {
            all.retain(|p| !p.item.name().to_lowercase().contains("adept"));
        }

        let mut items = Vec::with_capacity(all.len());
        for p in all.iter().filter(|p| p.item.hash != ph.hash) {
            let perk = p.item.perks.first().ok_or(TransformError::MissingPerkReference { plug: p.item.hash })?.perk_hash;
            let sandbox = self
                .sandbox_perks
                .get(&perk)
                .ok_or(TransformError::UnknownSandboxPerk { plug: p.item.hash, perk })?;
            let mut detail = self.detail("Mod", p.item);
            detail.description = sandbox.display_properties.description.clone();
            items.push(detail);
        }
        let placeholder = Placeholder::new(SocketKind::Mod, ph.hash, ph.display_properties.icon.clone(), ph.display_properties.description.clone());
        Ok(Some(SocketMod::new(placeholder, items)))
    }

    // ---- Ornament ----

    pub fn ornament(&self, weapon: &'a RawItem) -> Result<Option<SocketMod<Ornament>>, TransformError> {
        let Some(entry) = socket_entries(weapon, hashes::SOCKET_COSMETIC)?.find(|e| e.single_initial_item_hash != hashes::NO_ORNAMENT) else {
            return Ok(None);
        };
        let Some(set) = entry.reusable_plug_set_hash else { return Ok(None) };
        let mut ornaments = self.plug_items(set, self.cats.ornaments()).into_iter().map(|p| Ornament {
            kind: SocketKind::Ornament.as_str().to_string(),
            hash: p.item.hash,
            name: p.item.display_properties.name.clone(),
            icon: p.item.display_properties.icon.clone(),
            description: p.item.display_properties.description.clone(),
            screenshot: p.item.screenshot.clone(),
            flavour_text: weapon.flavor_text.clone(),
        });
        let Some(first) = ornaments.next() else { return Ok(None) };
        let placeholder = Placeholder::new(SocketKind::Ornament, first.hash, first.icon, first.description);
        Ok(Some(SocketMod::new(placeholder, ornaments.collect())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use kadi_core::{StatDefinition, StatGroupDefinition};
    use serde_json::{json, Value};

    const IMPACT: u32 = 4_043_523_819;
    const RANGE: u32 = 1_240_592_695;
    const STABILITY: u32 = 155_624_089;

    struct Fixture {
        items: Vec<RawItem>,
        stats: Vec<StatDefinition>,
        groups: Vec<StatGroupDefinition>,
        plug_sets: Vec<PlugSetDefinition>,
        perks: Vec<SandboxPerkDefinition>,
    }

    fn from<T: serde::de::DeserializeOwned>(v: Value) -> T { serde_json::from_value(v).unwrap() }

    fn fixture(extra: Vec<Value>) -> Fixture {
        let mut items = vec![
            json!({"hash": 100, "itemCategoryHashes": [610365472], "displayProperties": {"name": "Rapid Hit"}, "itemTypeDisplayName": "Trait"}),
            json!({"hash": 101, "itemCategoryHashes": [610365472], "displayProperties": {"name": "Outlaw"}, "itemTypeDisplayName": "Trait"}),
            json!({"hash": 102, "itemCategoryHashes": [610365472], "displayProperties": {"name": "Kill Clip"}, "itemTypeDisplayName": "Trait"}),
            json!({"hash": 110, "itemCategoryHashes": [610365472], "displayProperties": {"name": "Adaptive Frame", "description": "Dependable."}}),
            json!({"hash": 2323986101u32, "itemCategoryHashes": [610365472], "displayProperties": {"name": "Empty Mod Socket", "icon": "/empty.png"}}),
            json!({"hash": 120, "itemCategoryHashes": [610365472], "displayProperties": {"name": "Backup Mag"}, "perks": [{"perkHash": 900}]}),
            json!({"hash": 121, "itemCategoryHashes": [610365472], "displayProperties": {"name": "Adept Range"}, "perks": [{"perkHash": 901}]}),
            json!({"hash": 200, "itemCategoryHashes": [], "displayProperties": {"name": "Masterwork"}, "plug": {"plugCategoryIdentifier": "v400.plugs.weapons.masterworks.stat.range"},
                   "iconWatermark": "/mw.png",
                   "investmentStats": [{"statTypeHash": RANGE, "value": 10}, {"statTypeHash": STABILITY, "value": 5}]}),
            json!({"hash": 201, "itemCategoryHashes": [], "displayProperties": {"name": "Masterwork"}, "plug": {"plugCategoryIdentifier": "v400.plugs.weapons.masterworks.stat.zoom"},
                   "investmentStats": [{"statTypeHash": 3555269338u32, "value": 10}]}),
            json!({"hash": 202, "itemCategoryHashes": [], "displayProperties": {"name": "Masterwork"}, "plug": {"plugCategoryIdentifier": "v400.plugs.weapons.masterworks.stat.range"},
                   "investmentStats": [{"statTypeHash": RANGE, "value": 3}]}),
            json!({"hash": 300, "itemCategoryHashes": [3124752623u32], "displayProperties": {"name": "Default Shader"}, "screenshot": "/s0.png"}),
            json!({"hash": 301, "itemCategoryHashes": [3124752623u32], "displayProperties": {"name": "Gilded"}, "screenshot": "/s1.png"}),
        ];
        items.extend(extra);
        Fixture {
            items: items.into_iter().map(from).collect(),
            stats: from(json!([
                {"hash": IMPACT, "displayProperties": {"name": "Impact"}},
                {"hash": RANGE, "displayProperties": {"name": "Range"}},
                {"hash": STABILITY, "displayProperties": {"name": "Stability"}},
            ])),
            groups: Vec::new(),
            plug_sets: from(json!([
                {"hash": 1000, "reusablePlugItems": [{"plugItemHash": 100, "currentlyCanRoll": true}, {"plugItemHash": 101}, {"plugItemHash": 999}]},
                {"hash": 1001, "reusablePlugItems": [{"plugItemHash": 102, "currentlyCanRoll": true}]},
                {"hash": 1002, "reusablePlugItems": [{"plugItemHash": 2323986101u32}, {"plugItemHash": 120}, {"plugItemHash": 121}]},
                {"hash": 1003, "reusablePlugItems": [{"plugItemHash": 300}, {"plugItemHash": 301}]},
                {"hash": 1004, "reusablePlugItems": []},
            ])),
            perks: from(json!([
                {"hash": 900, "displayProperties": {"description": "Faster reloads."}},
                {"hash": 901, "displayProperties": {"description": "More range."}},
            ])),
        }
    }

    fn weapon(name: &str, type_tier: &str) -> Value {
        json!({
            "hash": 1, "itemCategoryHashes": [1, 6],
            "displayProperties": {"name": name},
            "itemTypeAndTierDisplayName": type_tier,
            "flavorText": "flavour",
            "investmentStats": [{"statTypeHash": IMPACT, "value": 80}, {"statTypeHash": RANGE, "value": 40}],
            "sockets": {
                "socketEntries": [
                    {"singleInitialItemHash": 110},
                    {"singleInitialItemHash": 0, "randomizedPlugSetHash": 1000, "reusablePlugSetHash": 1001},
                    {"singleInitialItemHash": 0, "reusablePlugSetHash": 1001},
                    {"singleInitialItemHash": 2285418970u32, "reusablePlugSetHash": 1000},
                    {"singleInitialItemHash": 0, "reusablePlugSetHash": 1004},
                    {"singleInitialItemHash": 2323986101u32, "reusablePlugSetHash": 1002},
                    {"singleInitialItemHash": 4248210736u32, "reusablePlugSetHash": 1003},
                    {"singleInitialItemHash": 1, "reusablePlugSetHash": 1003},
                    {"singleInitialItemHash": 518224747, "reusablePlugItems": [{"plugItemHash": 200}, {"plugItemHash": 201}, {"plugItemHash": 202}]}
                ],
                "socketCategories": [
                    {"socketCategoryHash": 3956125808u32, "socketIndexes": [0]},
                    {"socketCategoryHash": 4241085061u32, "socketIndexes": [1, 2, 3, 4, 42]},
                    {"socketCategoryHash": 2685412949u32, "socketIndexes": [5, 8]},
                    {"socketCategoryHash": 2048875504u32, "socketIndexes": [6, 7]}
                ]
            }
        })
    }

    fn with_extractor<R>(fx: &Fixture, f: impl for<'x> FnOnce(&SocketExtractor<'x>, &ItemCategories<'x>) -> R) -> R {
        let cats = classify(&fx.items);
        let stats = StatCatalog::new(&fx.stats, &fx.groups);
        let ex = SocketExtractor::new(&cats, &stats, &fx.plug_sets, &fx.perks);
        f(&ex, &cats)
    }

    #[test]
    fn adept_pattern_is_case_insensitive() {
        assert!(is_adept("Fatebringer (Timelost)"));
        assert!(is_adept("Eyes of Tomorrow (ADEPT)"));
        assert!(is_adept("Harrowed Gjallarhorn"));
        assert!(!is_adept("Fatebringer"));
    }

    #[test]
    fn missing_socket_block_errors_everywhere() {
        let fx = fixture(vec![json!({"hash": 1, "itemCategoryHashes": [1]})]);
        with_extractor(&fx, |ex, cats| {
            let w = cats.weapons().items()[0];
            assert!(matches!(ex.intrinsic(w), Err(TransformError::MissingSocketBlock { item: 1 })));
            assert!(ex.perk_columns(w).is_err());
            assert!(ex.catalyst(w).is_err());
            assert!(ex.masterwork(w).is_err());
            assert!(ex.ornament(w).is_err());
        });
    }

    #[test]
    fn intrinsic_and_perks() {
        let fx = fixture(vec![weapon("Fatebringer", "Legendary Hand Cannon")]);
        with_extractor(&fx, |ex, cats| {
            let w = cats.weapons().items()[0];
            let intrinsic = ex.intrinsic(w).unwrap();
            assert_eq!(intrinsic.name, "Adaptive Frame");
            assert_eq!(intrinsic.description, "Dependable.");

            let cols = ex.perk_columns(w).unwrap();
            // randomized set wins, tracker excluded, empty column dropped
            assert_eq!(cols.len(), 2);
            assert_eq!(cols[0].label, "Trait");
            assert_eq!(cols[0].items.keys().copied().collect::<Vec<_>>(), vec![100, 101]);
            assert!(cols[0].items[&100].currently_can_roll);
            assert!(!cols[0].items[&101].currently_can_roll);
            assert_eq!(cols[1].items.keys().copied().collect::<Vec<_>>(), vec![102]);
            assert_eq!(ex.perk_hashes(w).unwrap(), vec![100, 101, 102]);
        });
    }

    #[test]
    fn missing_intrinsic_plug_is_an_error() {
        let mut w = weapon("Fatebringer", "Legendary Hand Cannon");
        w["sockets"]["socketEntries"][0]["singleInitialItemHash"] = json!(555);
        let fx = fixture(vec![w]);
        with_extractor(&fx, |ex, cats| {
            let w = cats.weapons().items()[0];
            assert!(matches!(ex.intrinsic(w), Err(TransformError::MissingIntrinsic { plug: 555, .. })));
        });
    }

    #[test]
    fn catalyst_is_null_without_eligible_entry() {
        let fx = fixture(vec![weapon("Fatebringer", "Legendary Hand Cannon")]);
        with_extractor(&fx, |ex, cats| {
            let w = cats.weapons().items()[0];
            // reusable entry offers masterworks but no catalyst
            assert!(ex.catalyst(w).unwrap().is_none());
        });
    }

    #[test]
    fn catalyst_with_placeholder() {
        let mut w = weapon("Ace of Spades", "Exotic Hand Cannon");
        w["sockets"]["socketEntries"][8] = json!({"singleInitialItemHash": 400, "reusablePlugItems": [{"plugItemHash": 401}, {"plugItemHash": 200}]});
        let fx = fixture(vec![
            w,
            json!({"hash": 400, "itemCategoryHashes": [], "displayProperties": {"name": "Empty Catalyst", "icon": "/cat.png"}, "traitIds": ["item.exotic_catalyst"]}),
            json!({"hash": 401, "itemCategoryHashes": [], "displayProperties": {"name": "Ace of Spades Catalyst"},
                   "investmentStats": [{"statTypeHash": RANGE, "value": 10}, {"statTypeHash": 77, "value": 1}]}),
        ]);
        with_extractor(&fx, |ex, cats| {
            let w = cats.weapons().items()[0];
            let cat = ex.catalyst(w).unwrap().unwrap();
            assert_eq!(cat.placeholder.kind, "placeholder Catalyst");
            assert_eq!(cat.placeholder.hash, 400);
            assert!(cat.placeholder.investment_stats.is_empty());
            assert_eq!(cat.items.len(), 1);
            assert_eq!(cat.items[0].hash, 401);
            assert_eq!(cat.items[0].investment_stats.keys().copied().collect::<Vec<_>>(), vec![RANGE]);
        });
    }

    #[test]
    fn catalyst_without_placeholder_is_an_error() {
        let mut w = weapon("Ace of Spades", "Exotic Hand Cannon");
        w["sockets"]["socketEntries"][8] = json!({"singleInitialItemHash": 404, "reusablePlugItems": [{"plugItemHash": 401}, {"plugItemHash": 200}]});
        let fx = fixture(vec![
            w,
            json!({"hash": 401, "itemCategoryHashes": [], "displayProperties": {"name": "Ace of Spades Catalyst"}}),
        ]);
        with_extractor(&fx, |ex, cats| {
            let w = cats.weapons().items()[0];
            assert!(matches!(ex.catalyst(w), Err(TransformError::MissingPlaceholder { plug: 404, .. })));
        });
    }

    #[test]
    fn masterwork_keeps_peak_tiers_for_tracked_stats() {
        let fx = fixture(vec![weapon("Fatebringer", "Legendary Hand Cannon")]);
        with_extractor(&fx, |ex, cats| {
            let w = cats.weapons().items()[0];
            let mw = ex.masterwork(w).unwrap().expect("tier-one socket");
            // 201 targets zoom (untracked), 202 has no peak stat
            assert_eq!(mw.items.iter().map(|m| m.plug.hash).collect::<Vec<_>>(), vec![200]);
            for m in &mw.items {
                let peak = m.plug.investment_stats.values().find(|s| s.value == MASTERWORK_PEAK_VALUE).unwrap();
                assert!(w.tracks_stat(peak.stat_type_hash));
                assert!(m.plug.investment_stats.values().all(|s| s.value == MASTERWORK_PEAK_VALUE));
            }
            assert_eq!(mw.items[0].watermark, "/mw.png");
            // placeholder 518224747 is not a MasterWork member: synthetic one
            assert_eq!(mw.placeholder.hash, 0);
            assert_eq!(mw.placeholder.icon, hashes::DEFAULT_MASTERWORK_ICON);
            assert_eq!(mw.placeholder.kind, "placeholder Masterwork");
        });
    }

    #[test]
    fn adept_masterwork_keeps_every_tier() {
        let fx = fixture(vec![weapon("Fatebringer (Timelost)", "Legendary Hand Cannon")]);
        with_extractor(&fx, |ex, cats| {
            let w = cats.weapons().items()[0];
            let mw = ex.masterwork(w).unwrap().unwrap();
            let stats = &mw.items[0].plug.investment_stats;
            assert_eq!(stats.len(), 2);
            assert_eq!(stats[&STABILITY].value, 5);
        });
    }

    #[test]
    fn masterwork_null_without_tier_one_socket() {
        let mut w = weapon("Fatebringer", "Legendary Hand Cannon");
        w["sockets"]["socketEntries"][8]["singleInitialItemHash"] = json!(12345);
        let fx = fixture(vec![w]);
        with_extractor(&fx, |ex, cats| {
            assert!(ex.masterwork(cats.weapons().items()[0]).unwrap().is_none());
        });
    }

    #[test]
    fn mods_by_weapon_class() {
        let fx = fixture(vec![weapon("Fatebringer", "Legendary Hand Cannon")]);
        with_extractor(&fx, |ex, cats| {
            let m = ex.mods(cats.weapons().items()[0]).unwrap().unwrap();
            assert_eq!(m.placeholder.hash, hashes::EMPTY_MOD_SOCKET);
            assert_eq!(m.placeholder.icon, "/empty.png");
            assert_eq!(m.items.iter().map(|i| i.hash).collect::<Vec<_>>(), vec![120]);
            assert_eq!(m.items[0].description, "Faster reloads.");
        });

        let fx = fixture(vec![weapon("Fatebringer (Adept)", "Legendary Hand Cannon")]);
        with_extractor(&fx, |ex, cats| {
            let m = ex.mods(cats.weapons().items()[0]).unwrap().unwrap();
            assert_eq!(m.items.iter().map(|i| i.hash).collect::<Vec<_>>(), vec![121, 120]);
        });

        let fx = fixture(vec![weapon("Ace of Spades", "Exotic Hand Cannon")]);
        with_extractor(&fx, |ex, cats| {
            assert!(ex.mods(cats.weapons().items()[0]).unwrap().is_none());
        });
    }

    #[test]
    fn mod_errors_on_broken_perk_refs() {
        let mut fx = fixture(vec![weapon("Fatebringer", "Legendary Hand Cannon")]);
        fx.perks.retain(|p| p.hash != 900);
        with_extractor(&fx, |ex, cats| {
            assert!(matches!(ex.mods(cats.weapons().items()[0]), Err(TransformError::UnknownSandboxPerk { plug: 120, perk: 900 })));
        });

        let mut fx = fixture(vec![weapon("Fatebringer", "Legendary Hand Cannon")]);
        for it in fx.items.iter_mut().filter(|i| i.hash == 120) {
            it.perks.clear();
        }
        with_extractor(&fx, |ex, cats| {
            assert!(matches!(ex.mods(cats.weapons().items()[0]), Err(TransformError::MissingPerkReference { plug: 120 })));
        });
    }

    #[test]
    fn ornament_first_plug_is_placeholder() {
        let fx = fixture(vec![weapon("Fatebringer", "Legendary Hand Cannon")]);
        with_extractor(&fx, |ex, cats| {
            let o = ex.ornament(cats.weapons().items()[0]).unwrap().unwrap();
            assert_eq!(o.placeholder.hash, 300);
            assert_eq!(o.placeholder.kind, "placeholder Ornament");
            assert_eq!(o.items.len(), 1);
            assert_eq!(o.items[0].hash, 301);
            assert_eq!(o.items[0].screenshot, "/s1.png");
            assert_eq!(o.items[0].flavour_text, "flavour");
        });
    }

    #[test]
    fn ornament_null_for_empty_plug_set() {
        let mut w = weapon("Fatebringer", "Legendary Hand Cannon");
        w["sockets"]["socketEntries"][7]["reusablePlugSetHash"] = json!(1004);
        let fx = fixture(vec![w]);
        with_extractor(&fx, |ex, cats| {
            assert!(ex.ornament(cats.weapons().items()[0]).unwrap().is_none());
        });
    }
}
