//! WeaponTransformer and the full manifest-to-tables run.

use std::collections::BTreeMap;

use kadi_core::{tables, Hash, PlugSetDefinition, RawItem, SandboxPerkDefinition, Weapon, WeaponLite, WeaponSockets};
use serde::Serialize;
use smallvec::SmallVec;
use tracing::{info, warn};

use crate::classify::{classify, Bucket, ItemCategories};
use crate::error::TransformError;
use crate::manifest::ManifestTables;
use crate::sockets::SocketExtractor;
use crate::stats::StatCatalog;

#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    /// Abort the run on the first per-weapon data-contract error; otherwise skip the weapon.
    pub strict: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self { Self { strict: true } }
}

impl PipelineOptions {
    /// `KADI_STRICT=0|false|no|off` selects lenient mode.
    pub fn from_env() -> Self {
        let strict = std::env::var("KADI_STRICT")
            .map(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off"))
            .unwrap_or(true);
        Self { strict }
    }
}

pub struct WeaponTransformer<'a> {
    sockets: SocketExtractor<'a>,
    stats: &'a StatCatalog<'a>,
}

impl<'a> WeaponTransformer<'a> {
    pub fn new(
        cats: &'a ItemCategories<'a>,
        stats: &'a StatCatalog<'a>,
        plug_sets: &'a [PlugSetDefinition],
        sandbox_perks: &'a [SandboxPerkDefinition],
    ) -> Self {
        Self { sockets: SocketExtractor::new(cats, stats, plug_sets, sandbox_perks), stats }
    }

    pub fn sockets(&self) -> &SocketExtractor<'a> { &self.sockets }

    pub fn transform(&self, item: &'a RawItem) -> Result<Weapon, TransformError> {
        let dp = &item.display_properties;
        Ok(Weapon {
            hash: item.hash,
            name: dp.name.clone(),
            description: dp.description.clone(),
            icon: dp.icon.clone(),
            screenshot: item.screenshot.clone(),
            icon_watermark: item.icon_watermark.clone(),
            icon_watermark_shelved: item.icon_watermark_shelved.clone(),
            flavour_text: item.flavor_text.clone(),
            item_type_and_tier_display_name: item.item_type_and_tier_display_name.clone(),
            intrinsic: self.sockets.intrinsic(item)?,
            perks: self.sockets.perk_columns(item)?,
            investment_stats: self.stats.with_interpolation(item),
            sockets: WeaponSockets {
                catalyst: self.sockets.catalyst(item)?,
                mod_: self.sockets.mods(item)?,
                masterwork: self.sockets.masterwork(item)?,
                ornament: self.sockets.ornament(item)?,
            },
        })
    }

    pub fn transform_lite(&self, item: &'a RawItem) -> Result<WeaponLite, TransformError> {
        let missing = |field| TransformError::MissingField { weapon: item.hash, field };
        let tier_type_hash = item.inventory.as_ref().ok_or_else(|| missing("inventory.tierTypeHash"))?.tier_type_hash;
        let equip = item.equipping_block.as_ref().ok_or_else(|| missing("equippingBlock"))?;
        let default_damage_type = item.default_damage_type_hash.ok_or_else(|| missing("defaultDamageTypeHash"))?;
        let mut stats = BTreeMap::new();
        for s in &item.investment_stats {
            stats.insert(s.stat_type_hash, s.value);
        }
        Ok(WeaponLite {
            hash: item.hash,
            name: item.display_properties.name.clone(),
            icon: item.display_properties.icon.clone(),
            collectible_hash: item.collectible_hash,
            summary_item_hash: item.summary_item_hash,
            icon_watermark: item.icon_watermark.clone(),
            icon_watermark_shelved: item.icon_watermark_shelved.clone(),
            flavour_text: item.flavor_text.clone(),
            item_type_and_tier_display_name: item.item_type_and_tier_display_name.clone(),
            ammo_type: equip.ammo_type,
            default_damage_type,
            equipment_slot_type_hash: equip.equipment_slot_type_hash,
            tier_type_hash,
            item_category: item.item_category_hashes.as_deref().map(SmallVec::from_slice).unwrap_or_default(),
            perks: self.sockets.perk_hashes(item)?,
            stats,
            investment_stats: self.stats.with_interpolation(item),
        })
    }
}

/// First stat group seen per category tag; later weapons never overwrite.
pub fn category_stat_groups<'a>(weapons: impl IntoIterator<Item = &'a RawItem>) -> BTreeMap<Hash, Hash> {
    let mut out = BTreeMap::new();
    for w in weapons {
        let Some(group) = w.stat_group_hash() else { continue };
        for cat in w.item_category_hashes.as_deref().unwrap_or(&[]) {
            out.entry(*cat).or_insert(group);
        }
    }
    out
}

pub struct PipelineOutput<'a> {
    pub categories: ItemCategories<'a>,
    pub weapons: Vec<Weapon>,
    pub weapons_lite: Vec<WeaponLite>,
    pub category_stat_groups: BTreeMap<Hash, Hash>,
    /// Weapons skipped in lenient mode.
    pub rejected: usize,
}

impl<'a> PipelineOutput<'a> {
    /// Every output table as `(name, json bytes)`, including raw buckets and pass-through stat tables.
    pub fn encode_tables(&self, manifest: &ManifestTables) -> Result<Vec<(&'static str, Vec<u8>)>, serde_json::Error> {
        fn enc<T: Serialize + ?Sized>(name: &'static str, v: &T) -> Result<(&'static str, Vec<u8>), serde_json::Error> {
            Ok((name, serde_json::to_vec(v)?))
        }
        let mut out = vec![
            enc(tables::WEAPONS_LITE, &self.weapons_lite)?,
            enc(tables::WEAPONS, &self.weapons)?,
            enc(tables::CATEGORY_STAT_GROUPS, &self.category_stat_groups)?,
        ];
        for b in Bucket::ALL.into_iter().filter(|b| *b != Bucket::Weapons) {
            out.push(enc(b.as_str(), self.categories.bucket(b).items())?);
        }
        out.push(enc(tables::STAT_DEFINITIONS, &manifest.stats)?);
        out.push(enc(tables::STAT_GROUP_DEFINITIONS, &manifest.stat_groups)?);
        Ok(out)
    }
}

pub fn run_pipeline<'a>(manifest: &'a ManifestTables, opts: &PipelineOptions) -> Result<PipelineOutput<'a>, TransformError> {
    let started = std::time::Instant::now();
    let categories = classify(&manifest.items);
    let stats = StatCatalog::new(&manifest.stats, &manifest.stat_groups);

    let (weapons, weapons_lite, rejected) = {
        let transformer = WeaponTransformer::new(&categories, &stats, &manifest.plug_sets, &manifest.sandbox_perks);
        let bucket = categories.weapons();
        let mut weapons = Vec::with_capacity(bucket.len());
        let mut lite = Vec::with_capacity(bucket.len());
        let mut rejected = 0usize;
        for item in bucket.items() {
            match transformer.transform(item).and_then(|w| Ok((w, transformer.transform_lite(item)?))) {
                Ok((w, l)) => {
                    weapons.push(w);
                    lite.push(l);
                }
                Err(e) if !opts.strict => {
                    rejected += 1;
                    warn!(weapon = item.hash, name = %item.name(), error = %e, "skipping weapon");
                    metrics::counter!("pipeline_weapons_rejected_total", 1u64, "reason" => e.kind());
                }
                Err(e) => {
                    warn!(weapon = item.hash, name = %item.name(), error = %e, "aborting pipeline run");
                    return Err(e);
                }
            }
        }
        (weapons, lite, rejected)
    };
    let category_stat_groups = category_stat_groups(categories.weapons().items().iter().copied());

    let took_ms = started.elapsed().as_secs_f64() * 1000.0;
    metrics::histogram!("pipeline_run_ms", took_ms);
    metrics::counter!("pipeline_weapons_total", weapons.len() as u64);
    info!(
        weapons = weapons.len(),
        rejected,
        categories = category_stat_groups.len(),
        unmatched = categories.unmatched(),
        strict = opts.strict,
        took_ms = took_ms as u64,
        "pipeline run complete"
    );
    Ok(PipelineOutput { categories, weapons, weapons_lite, category_stat_groups, rejected })
}
