//! Argument parsing shared by `search` and `browse`.

use std::collections::BTreeMap;

use anyhow::{anyhow, bail, Result};
use kadi_core::{facets, Hash};
use kadi_search::{parse_threshold, FacetKey, Selection, SortSpec};

/// Values for one facet: labels or numeric ids, comma separated or repeated.
/// Stats take `STAT>VALUE` pairs.
pub fn selection<S: AsRef<str>>(key: FacetKey, inputs: &[S]) -> Result<Selection> {
    let tokens = inputs.iter().flat_map(|s| s.as_ref().split(',')).map(str::trim).filter(|t| !t.is_empty());
    if key.is_threshold() {
        let mut t = BTreeMap::new();
        for tok in tokens {
            let (stat, min) = parse_threshold(tok)?;
            t.insert(stat, min);
        }
        return Ok(Selection::Thresholds(t));
    }
    let mut values: Vec<Hash> = Vec::new();
    for tok in tokens {
        let v = match key.labels() {
            Some(table) => facets::parse_value(table, tok),
            None => tok.parse::<Hash>().ok(),
        }
        .ok_or_else(|| anyhow!("unknown {key} value {tok:?}"))?;
        if !values.contains(&v) {
            values.push(v);
        }
    }
    Ok(Selection::Values(values))
}

/// The empty selection of the right shape, which clears `key`.
pub fn cleared(key: FacetKey) -> Selection {
    if key.is_threshold() { Selection::Thresholds(BTreeMap::new()) } else { Selection::Values(Vec::new()) }
}

/// `STAT[:asc|desc]`, STAT an id or a basic stat name. Descending by default.
pub fn sort(input: &str) -> Result<SortSpec> {
    let (stat, dir) = match input.rsplit_once(':') {
        Some((s, d)) => (s.trim(), d.trim()),
        None => (input.trim(), "desc"),
    };
    let descending = match dir.to_ascii_lowercase().as_str() {
        "desc" | "d" => true,
        "asc" | "a" => false,
        other => bail!("sort direction must be asc or desc, got {other:?}"),
    };
    let stat = stat
        .parse::<Hash>()
        .ok()
        .or_else(|| facets::basic_stat_hash(stat))
        .ok_or_else(|| anyhow!("unknown stat {stat:?}"))?;
    Ok(SortSpec { stat, descending })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_ids_and_commas() {
        let sel = selection(FacetKey::ItemCategory, &["pulse_rifle,6", "hand-cannon"]).unwrap();
        assert_eq!(sel, Selection::Values(vec![7, 6]));
        let sel = selection(FacetKey::Perks, &["40", "41"]).unwrap();
        assert_eq!(sel, Selection::Values(vec![40, 41]));
        assert!(selection(FacetKey::Perks, &["outlaw"]).is_err());
    }

    #[test]
    fn stat_thresholds() {
        let sel = selection(FacetKey::Stats, &["range>40", "4043523819>10"]).unwrap();
        assert_eq!(sel, Selection::Thresholds(BTreeMap::from([(1_240_592_695, 40), (4_043_523_819, 10)])));
        assert!(cleared(FacetKey::Stats).is_empty());
    }

    #[test]
    fn sort_spec() {
        assert_eq!(sort("range").unwrap(), SortSpec { stat: 1_240_592_695, descending: true });
        assert_eq!(sort("4043523819:asc").unwrap(), SortSpec { stat: 4_043_523_819, descending: false });
        assert!(sort("range:up").is_err());
        assert!(sort("bogus").is_err());
    }
}
