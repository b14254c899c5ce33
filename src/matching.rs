//! Features that occur under more than one feature type.
//!
//! A value that shows up both as a string literal and as a symbol name is a
//! stronger fingerprint than either occurrence alone. This module finds such
//! values and groups them by their full location signature: which binaries
//! carry them, and as which feature types in each.

use crate::classify::Corpus;
use crate::features::FeatureType;
use rustc_hash::FxHashMap;
use serde::Serialize;

/// One location pattern: these binaries carry the value as exactly these
/// feature types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct MatchLocation {
    pub feature_types: Vec<FeatureType>,
    pub elfs: Vec<String>,
}

/// Values sharing one location signature.
#[derive(Debug, Clone, Serialize)]
pub struct MatchingEntry {
    pub instances: Vec<String>,
    pub locations: Vec<MatchLocation>,
}

// Per value: each binary it occurs in, with the feature types it occurs as,
// everything in first-seen order.
#[derive(Default)]
struct ValueLocations {
    elfs: Vec<(String, Vec<FeatureType>)>,
    elf_index: FxHashMap<String, usize>,
}

impl ValueLocations {
    fn add(&mut self, elf: &str, feature_type: FeatureType) {
        let idx = match self.elf_index.get(elf) {
            Some(&idx) => idx,
            None => {
                let idx = self.elfs.len();
                self.elfs.push((elf.to_string(), Vec::new()));
                self.elf_index.insert(elf.to_string(), idx);
                idx
            }
        };
        let types = &mut self.elfs[idx].1;
        if !types.contains(&feature_type) {
            types.push(feature_type);
        }
    }

    fn distinct_types(&self) -> Vec<FeatureType> {
        let mut types = Vec::new();
        for (_, elf_types) in &self.elfs {
            for &t in elf_types {
                if !types.contains(&t) {
                    types.push(t);
                }
            }
        }
        types
    }

    // Group this value's binaries by their feature-type pattern, keeping
    // first-seen order on both levels.
    fn signature(&self) -> Vec<MatchLocation> {
        let mut locations: Vec<MatchLocation> = Vec::new();
        let mut index: FxHashMap<Vec<FeatureType>, usize> = FxHashMap::default();
        for (elf, types) in &self.elfs {
            let idx = match index.get(types) {
                Some(&idx) => idx,
                None => {
                    let idx = locations.len();
                    index.insert(types.clone(), idx);
                    locations.push(MatchLocation {
                        feature_types: types.clone(),
                        elfs: Vec::new(),
                    });
                    idx
                }
            };
            locations[idx].elfs.push(elf.clone());
        }
        locations
    }
}

/// Find feature values present under more than one feature type, at least
/// once as a string, grouped by identical location signature. Groups with
/// the smallest binary footprint come first.
pub fn find_multi_type_features(corpus: &Corpus) -> Vec<MatchingEntry> {
    let mut values: Vec<(String, ValueLocations)> = Vec::new();
    let mut value_index: FxHashMap<String, usize> = FxHashMap::default();

    for (elf, features) in &corpus.binaries {
        let elf_str = elf.to_string();
        for (feature_type, instances) in features.iter() {
            for value in instances {
                let idx = match value_index.get(value) {
                    Some(&idx) => idx,
                    None => {
                        let idx = values.len();
                        value_index.insert(value.clone(), idx);
                        values.push((value.clone(), ValueLocations::default()));
                        idx
                    }
                };
                values[idx].1.add(&elf_str, feature_type);
            }
        }
    }

    let mut groups: Vec<(Vec<MatchLocation>, Vec<String>)> = Vec::new();
    let mut group_index: FxHashMap<Vec<MatchLocation>, usize> = FxHashMap::default();
    for (value, locations) in &values {
        let types = locations.distinct_types();
        if types.len() < 2 || !types.contains(&FeatureType::Strings) {
            continue;
        }
        let signature = locations.signature();
        let idx = match group_index.get(&signature) {
            Some(&idx) => idx,
            None => {
                let idx = groups.len();
                group_index.insert(signature.clone(), idx);
                groups.push((signature, Vec::new()));
                idx
            }
        };
        groups[idx].1.push(value.clone());
    }

    groups.sort_by_key(|(signature, _)| {
        signature.iter().map(|loc| loc.elfs.len()).sum::<usize>()
    });
    groups
        .into_iter()
        .map(|(locations, instances)| MatchingEntry { instances, locations })
        .collect()
}

/// The subset of entries where some binary carries the value *only* as a
/// string: places where a symbol name leaked into constant data on its own.
pub fn isolated_strings(entries: &[MatchingEntry]) -> Vec<MatchingEntry> {
    entries
        .iter()
        .filter(|entry| {
            entry
                .locations
                .iter()
                .any(|loc| loc.feature_types == [FeatureType::Strings])
        })
        .cloned()
        .collect()
}
