//! Catalog identifiers the pipeline keys on. Stable across manifest versions.

use crate::Hash;

// ---------------- Item category tags ----------------
pub const CATEGORY_WEAPON: Hash = 1;
pub const CATEGORY_DUMMY: Hash = 3_109_687_656;
pub const CATEGORY_WEAPON_MOD: Hash = 610_365_472;
pub const CATEGORY_INTRINSIC_TRAIT: Hash = 2_237_038_328;
pub const CATEGORY_ORNAMENT: Hash = 3_124_752_623;

/// Item sub types that mark ornaments even without the ornament tag.
pub const ORNAMENT_SUB_TYPES: [i32; 2] = [20, 21];

// ---------------- Socket categories ----------------
pub const SOCKET_REUSABLE: Hash = 2_685_412_949;
pub const SOCKET_COSMETIC: Hash = 2_048_875_504;
pub const SOCKET_INTRINSIC: Hash = 3_956_125_808;
pub const SOCKET_PERKS: Hash = 4_241_085_061;

// ---------------- Sentinel plugs ----------------
pub const EMPTY_MOD_SOCKET: Hash = 2_323_986_101;
pub const NO_ORNAMENT: Hash = 4_248_210_736;
pub const TRACKER_SOCKET: Hash = 2_285_418_970;

// ---------------- Masterwork ----------------
/// Investment value carried by the stat a masterwork tier raises.
pub const MASTERWORK_PEAK_VALUE: i32 = 10;
pub const MASTERWORK_ITEM_NAME: &str = "Masterwork";
pub const DEFAULT_MASTERWORK_ICON: &str =
    "/common/destiny2_content/icons/b4d05ef69d0c3227a7d4f7f35bbc2848.png";

/// Placeholder plugs of reusable sockets that hold a tier-one masterwork.
pub const TIER_ONE_MASTERWORKS: [Hash; 27] = [
    518_224_747, 150_943_607, 1_486_919_755, 4_283_235_143, 2_942_552_113,
    1_590_375_901, 684_616_255, 4_105_787_909, 4_283_235_141, 2_203_506_848,
    0, 3_928_770_367, 2_674_077_375, 915_325_363, 2_357_520_979,
    892_374_263, 3_353_797_898, 150_943_605, 178_753_455, 654_849_177,
    1_431_498_388, 199_695_019, 3_444_329_767, 3_689_550_782, 1_590_375_903,
    4_105_787_911, 1_486_919_753,
];

pub fn is_tier_one_masterwork(hash: Hash) -> bool { TIER_ONE_MASTERWORKS.contains(&hash) }

// ---------------- Trait / plug markers ----------------
pub const TRAIT_EXOTIC_CATALYST: &str = "exotic_catalyst";
pub const PLUG_MASTERWORK: &str = "masterwork";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_one_list_is_fixed() {
        assert_eq!(TIER_ONE_MASTERWORKS.len(), 27);
        assert!(is_tier_one_masterwork(0));
        assert!(is_tier_one_masterwork(1_486_919_753));
        assert!(!is_tier_one_masterwork(EMPTY_MOD_SOCKET));
    }
}
