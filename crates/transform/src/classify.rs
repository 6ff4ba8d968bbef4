//! ItemClassifier: partitions raw items into named buckets.
//!
//! Rules are evaluated in a fixed priority order; the first match wins and
//! items matching nothing are dropped (counted, never an error).

use std::fmt;

use kadi_core::{hashes, Hash, RawItem};
use rustc_hash::FxHashMap;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Bucket {
    Weapons,
    Traits,
    MasterWork,
    Catalysts,
    WeaponMods,
    Ornaments,
}

impl Bucket {
    pub const ALL: [Bucket; 6] = [
        Bucket::Weapons,
        Bucket::Traits,
        Bucket::MasterWork,
        Bucket::Catalysts,
        Bucket::WeaponMods,
        Bucket::Ornaments,
    ];

    /// Table name; also the key used when persisting the raw bucket.
    pub fn as_str(self) -> &'static str {
        match self {
            Bucket::Weapons => "Weapons",
            Bucket::Traits => "Traits",
            Bucket::MasterWork => "MasterWork",
            Bucket::Catalysts => "Catalysts",
            Bucket::WeaponMods => "WeaponMods",
            Bucket::Ornaments => "Ornaments",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Ordered bucket members plus a hash index. Duplicate hashes resolve to the first member.
#[derive(Debug, Default, Clone)]
pub struct ItemBucket<'a> {
    items: Vec<&'a RawItem>,
    by_hash: FxHashMap<Hash, usize>,
}

impl<'a> ItemBucket<'a> {
    fn push(&mut self, item: &'a RawItem) {
        let idx = self.items.len();
        self.items.push(item);
        self.by_hash.entry(item.hash).or_insert(idx);
    }

    pub fn get(&self, hash: Hash) -> Option<&'a RawItem> { self.by_hash.get(&hash).map(|i| self.items[*i]) }
    pub fn contains(&self, hash: Hash) -> bool { self.by_hash.contains_key(&hash) }
    pub fn items(&self) -> &[&'a RawItem] { &self.items }
    pub fn len(&self) -> usize { self.items.len() }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }
}

#[derive(Debug, Default, Clone)]
pub struct ItemCategories<'a> {
    buckets: [ItemBucket<'a>; 6],
    unmatched: usize,
}

impl<'a> ItemCategories<'a> {
    pub fn bucket(&self, b: Bucket) -> &ItemBucket<'a> { &self.buckets[b as usize] }
    pub fn weapons(&self) -> &ItemBucket<'a> { self.bucket(Bucket::Weapons) }
    pub fn weapon_mods(&self) -> &ItemBucket<'a> { self.bucket(Bucket::WeaponMods) }
    pub fn masterworks(&self) -> &ItemBucket<'a> { self.bucket(Bucket::MasterWork) }
    pub fn catalysts(&self) -> &ItemBucket<'a> { self.bucket(Bucket::Catalysts) }
    pub fn ornaments(&self) -> &ItemBucket<'a> { self.bucket(Bucket::Ornaments) }
    pub fn traits(&self) -> &ItemBucket<'a> { self.bucket(Bucket::Traits) }
    /// Categorised items that matched no rule.
    pub fn unmatched(&self) -> usize { self.unmatched }
}

/// Bucket for a single item, or `None` when no rule applies.
pub fn classify_item(item: &RawItem) -> Option<Bucket> {
    let cats = item.item_category_hashes.as_deref()?;
    let tagged = |h: Hash| cats.contains(&h);

    if tagged(hashes::CATEGORY_ORNAMENT) || hashes::ORNAMENT_SUB_TYPES.contains(&item.item_sub_type) {
        return Some(Bucket::Ornaments);
    }
    if tagged(hashes::CATEGORY_WEAPON) && !tagged(hashes::CATEGORY_DUMMY) {
        return Some(Bucket::Weapons);
    }
    if tagged(hashes::CATEGORY_WEAPON_MOD) {
        return Some(Bucket::WeaponMods);
    }
    let type_tier = item.item_type_and_tier_display_name.to_lowercase();
    if type_tier.ends_with("trait") || type_tier.ends_with("intrinsic") || tagged(hashes::CATEGORY_INTRINSIC_TRAIT) {
        return Some(Bucket::Traits);
    }
    let plug_cat = item.plug_category().unwrap_or("").to_lowercase();
    if plug_cat.contains(hashes::PLUG_MASTERWORK) {
        return Some(Bucket::MasterWork);
    }
    let catalyst_trait = item
        .trait_ids
        .as_deref()
        .map(|ids| ids.iter().any(|t| t.contains(hashes::TRAIT_EXOTIC_CATALYST)))
        .unwrap_or(false);
    // exotic masterwork plugs already matched the masterwork rule above
    if catalyst_trait || item.name().to_lowercase().ends_with("catalyst") {
        return Some(Bucket::Catalysts);
    }
    None
}

pub fn classify(items: &[RawItem]) -> ItemCategories<'_> {
    let mut out = ItemCategories::default();
    for item in items {
        if item.item_category_hashes.is_none() {
            continue;
        }
        match classify_item(item) {
            Some(b) => out.buckets[b as usize].push(item),
            None => out.unmatched += 1,
        }
    }
    for b in Bucket::ALL {
        let n = out.bucket(b).len();
        debug!(bucket = %b, items = n, "classified");
        metrics::counter!("classify_items_total", n as u64, "bucket" => b.as_str());
    }
    debug!(unmatched = out.unmatched, "items matched no bucket");
    metrics::counter!("classify_unmatched_total", out.unmatched as u64);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(v: serde_json::Value) -> RawItem { serde_json::from_value(v).unwrap() }

    #[test]
    fn rules_follow_priority_order() {
        // Ornament beats weapon; weapon beats mod.
        let orn = item(json!({"hash": 1, "itemCategoryHashes": [1, 3124752623u32]}));
        let sub = item(json!({"hash": 2, "itemCategoryHashes": [], "itemSubType": 21}));
        let wpn = item(json!({"hash": 3, "itemCategoryHashes": [1, 610365472]}));
        let dummy = item(json!({"hash": 4, "itemCategoryHashes": [1, 3109687656u32]}));
        let tr = item(json!({"hash": 5, "itemCategoryHashes": [], "itemTypeAndTierDisplayName": "Exotic Intrinsic"}));
        let mw = item(json!({"hash": 6, "itemCategoryHashes": [], "plug": {"plugCategoryIdentifier": "v400.plugs.weapons.masterworks.stat.range"}}));
        let cat = item(json!({"hash": 7, "itemCategoryHashes": [], "traitIds": ["item_type.exotic_catalyst"]}));
        let cat_name = item(json!({"hash": 8, "itemCategoryHashes": [], "displayProperties": {"name": "Ace of Spades Catalyst"}}));
        assert_eq!(classify_item(&orn), Some(Bucket::Ornaments));
        assert_eq!(classify_item(&sub), Some(Bucket::Ornaments));
        assert_eq!(classify_item(&wpn), Some(Bucket::Weapons));
        assert_eq!(classify_item(&dummy), None);
        assert_eq!(classify_item(&tr), Some(Bucket::Traits));
        assert_eq!(classify_item(&mw), Some(Bucket::MasterWork));
        assert_eq!(classify_item(&cat), Some(Bucket::Catalysts));
        assert_eq!(classify_item(&cat_name), Some(Bucket::Catalysts));
    }

    #[test]
    fn exotic_masterwork_plugs_are_masterworks_only() {
        let items = vec![item(json!({
            "hash": 9,
            "itemCategoryHashes": [],
            "plug": {"plugCategoryIdentifier": "v400.exotic.masterwork"}
        }))];
        let cats = classify(&items);
        assert!(cats.masterworks().contains(9));
        assert!(cats.catalysts().is_empty());
    }

    #[test]
    fn uncategorised_items_are_skipped() {
        let items = vec![
            item(json!({"hash": 1, "itemSubType": 20})),
            item(json!({"hash": 2, "itemCategoryHashes": [610365472]})),
            item(json!({"hash": 3, "itemCategoryHashes": [42]})),
        ];
        let cats = classify(&items);
        assert!(cats.ornaments().is_empty());
        assert_eq!(cats.weapon_mods().len(), 1);
        assert_eq!(cats.unmatched(), 1);
    }

    #[test]
    fn each_item_lands_in_at_most_one_bucket_deterministically() {
        let items: Vec<RawItem> = (0..40u32)
            .map(|i| {
                item(json!({
                    "hash": i,
                    "itemCategoryHashes": if i % 3 == 0 { json!([1]) } else { json!([610365472, 3124752623u32]) },
                    "itemSubType": if i % 5 == 0 { 20 } else { 0 },
                    "plug": {"plugCategoryIdentifier": "masterwork"}
                }))
            })
            .collect();
        let a = classify(&items);
        let b = classify(&items);
        let total: usize = Bucket::ALL.iter().map(|x| a.bucket(*x).len()).sum();
        assert_eq!(total + a.unmatched(), items.len());
        for bk in Bucket::ALL {
            let ha: Vec<Hash> = a.bucket(bk).items().iter().map(|i| i.hash).collect();
            let hb: Vec<Hash> = b.bucket(bk).items().iter().map(|i| i.hash).collect();
            assert_eq!(ha, hb);
            // bucket order follows input order
            assert!(ha.windows(2).all(|w| w[0] < w[1]));
        }
        for it in &items {
            let n = Bucket::ALL.iter().filter(|bk| a.bucket(**bk).contains(it.hash)).count();
            assert!(n <= 1);
        }
    }
}
