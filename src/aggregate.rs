//! Corpus-level aggregation of classification results.
//!
//! Re-expresses [`Classification`](crate::classify::Classification) output as
//! the report set consumed downstream: per-type per-class instance maps with
//! origin triples, the per-binary breakdown, not-unique instances grouped by
//! exact occurrence set, strings-by-length breakdowns, per-class count
//! summaries and origin-count histograms.

use crate::classify::{Classification, Mode, OriginCounts, UniqClass};
use crate::elf_path::ElfPath;
use crate::features::FeatureType;
use rustc_hash::FxHashMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// One slot per uniqueness class, serialized as a map in precedence order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClassBuckets<T> {
    pub elf_unique: T,
    pub binary_pkg_unique: T,
    pub source_pkg_unique: T,
    pub not_unique: T,
}

impl<T> ClassBuckets<T> {
    pub fn get(&self, class: UniqClass) -> &T {
        match class {
            UniqClass::ElfUnique => &self.elf_unique,
            UniqClass::BinaryPkgUnique => &self.binary_pkg_unique,
            UniqClass::SourcePkgUnique => &self.source_pkg_unique,
            UniqClass::NotUnique => &self.not_unique,
        }
    }

    pub fn get_mut(&mut self, class: UniqClass) -> &mut T {
        match class {
            UniqClass::ElfUnique => &mut self.elf_unique,
            UniqClass::BinaryPkgUnique => &mut self.binary_pkg_unique,
            UniqClass::SourcePkgUnique => &mut self.source_pkg_unique,
            UniqClass::NotUnique => &mut self.not_unique,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (UniqClass, &T)> + '_ {
        UniqClass::ALL.iter().map(move |&c| (c, self.get(c)))
    }
}

/// One slot per feature type, serialized as a map in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TypeBuckets<T> {
    pub strings: T,
    pub defined_functions: T,
    pub undefined_functions: T,
    pub defined_objects: T,
    pub undefined_objects: T,
}

impl<T> TypeBuckets<T> {
    pub fn get(&self, feature_type: FeatureType) -> &T {
        match feature_type {
            FeatureType::Strings => &self.strings,
            FeatureType::DefinedFunctions => &self.defined_functions,
            FeatureType::UndefinedFunctions => &self.undefined_functions,
            FeatureType::DefinedObjects => &self.defined_objects,
            FeatureType::UndefinedObjects => &self.undefined_objects,
        }
    }

    pub fn get_mut(&mut self, feature_type: FeatureType) -> &mut T {
        match feature_type {
            FeatureType::Strings => &mut self.strings,
            FeatureType::DefinedFunctions => &mut self.defined_functions,
            FeatureType::UndefinedFunctions => &mut self.undefined_functions,
            FeatureType::DefinedObjects => &mut self.defined_objects,
            FeatureType::UndefinedObjects => &mut self.undefined_objects,
        }
    }
}

/// Ordered value-to-origin-triple map; serialized as a JSON object in the
/// order the entries were inserted (most distinguishing first).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceMap(pub Vec<(String, OriginCounts)>);

impl Serialize for InstanceMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(value, counts)| (value, counts)))
    }
}

const TRIPLE_COMMENT: &str =
    "The meaning of the numbers is [num_source_pkgs, num_binary_pkgs, num_elfs]";

/// The classified-and-aggregated report: per type and class, every instance
/// with its origin triple, most widely spread first.
#[derive(Debug, Clone, Serialize)]
pub struct AggregatedFeatures {
    #[serde(rename = "$comment")]
    pub comment: String,
    #[serde(flatten)]
    pub features: TypeBuckets<ClassBuckets<InstanceMap>>,
}

/// Features that always co-occur across the identical set of binaries.
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateGroup {
    pub elfs: Vec<String>,
    #[serde(flatten)]
    pub features: TypeBuckets<Vec<String>>,
}

/// Per-class instance counts for one feature type, with the type's total.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AbsoluteCounts {
    #[serde(flatten)]
    pub classes: ClassBuckets<usize>,
    pub total: usize,
}

/// Count summary feeding the downstream charts: absolute per-class counts
/// and their ratios of each type's total.
#[derive(Debug, Clone, Serialize)]
pub struct CountsReport {
    pub absolute: TypeBuckets<AbsoluteCounts>,
    pub relative: TypeBuckets<ClassBuckets<f64>>,
}

/// How many instances span exactly N origins, per origin dimension.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OriginHistograms {
    pub by_source_pkgs: BTreeMap<usize, usize>,
    pub by_binary_pkgs: BTreeMap<usize, usize>,
    pub by_elfs: BTreeMap<usize, usize>,
}

/// Classification re-keyed by binary identity: for every binary, its feature
/// values bucketed by type and uniqueness class.
pub type PerBinaryReport =
    BTreeMap<String, BTreeMap<String, TypeBuckets<ClassBuckets<Vec<String>>>>>;

/// Everything the aggregation step produces for one run.
#[derive(Debug, Clone)]
pub struct Aggregates {
    pub mode: Mode,
    pub aggregated: AggregatedFeatures,
    pub per_binary: PerBinaryReport,
    pub duplicate_groups: Vec<DuplicateGroup>,
    pub strings_by_len: BTreeMap<usize, ClassBuckets<Vec<String>>>,
    pub strings_by_len_counts: BTreeMap<usize, ClassBuckets<usize>>,
    pub counts: CountsReport,
    pub histograms: TypeBuckets<OriginHistograms>,
}

/// Build the full report set from a classification.
pub fn aggregate(classification: &Classification) -> Aggregates {
    let mut features = TypeBuckets::<ClassBuckets<InstanceMap>>::default();
    let mut per_binary = PerBinaryReport::new();
    let mut histograms = TypeBuckets::<OriginHistograms>::default();

    // Every binary appears in the per-binary report, even with no features.
    for elf in &classification.binaries {
        per_binary
            .entry(elf.pkg_path())
            .or_default()
            .entry(elf.name.clone())
            .or_default();
    }

    // Not-unique instances grouped by their exact occurrence set, in
    // first-seen order.
    let mut group_index: FxHashMap<Vec<ElfPath>, usize> = FxHashMap::default();
    let mut groups: Vec<(Vec<ElfPath>, TypeBuckets<Vec<String>>)> = Vec::new();

    for (feature_type, instances) in &classification.by_type {
        for instance in instances {
            features
                .get_mut(*feature_type)
                .get_mut(instance.class)
                .0
                .push((instance.value.clone(), instance.counts));

            let histogram = histograms.get_mut(*feature_type);
            *histogram
                .by_source_pkgs
                .entry(instance.counts.source_pkgs)
                .or_default() += 1;
            *histogram
                .by_binary_pkgs
                .entry(instance.counts.binary_pkgs)
                .or_default() += 1;
            *histogram.by_elfs.entry(instance.counts.elfs).or_default() += 1;

            for elf in &instance.occurrences {
                let lists = per_binary
                    .get_mut(&elf.pkg_path())
                    .and_then(|pkg| pkg.get_mut(&elf.name))
                    .expect("occurrence lists only reference corpus binaries");
                lists
                    .get_mut(*feature_type)
                    .get_mut(instance.class)
                    .push(instance.value.clone());
            }

            if instance.class == UniqClass::NotUnique {
                let idx = match group_index.get(&instance.occurrences) {
                    Some(&idx) => idx,
                    None => {
                        let idx = groups.len();
                        group_index.insert(instance.occurrences.clone(), idx);
                        groups.push((instance.occurrences.clone(), TypeBuckets::default()));
                        idx
                    }
                };
                groups[idx]
                    .1
                    .get_mut(*feature_type)
                    .push(instance.value.clone());
            }
        }
    }

    // Most widely spread instances first within each class.
    for &feature_type in &FeatureType::ALL {
        for &class in &UniqClass::ALL {
            features
                .get_mut(feature_type)
                .get_mut(class)
                .0
                .sort_by(|a, b| b.1.cmp(&a.1));
        }
    }

    // Strings broken down by character length, in first-seen order per class.
    let mut strings_by_len: BTreeMap<usize, ClassBuckets<Vec<String>>> = BTreeMap::new();
    for instance in classification.instances(FeatureType::Strings) {
        strings_by_len
            .entry(instance.value.chars().count())
            .or_default()
            .get_mut(instance.class)
            .push(instance.value.clone());
    }
    let strings_by_len_counts = strings_by_len
        .iter()
        .map(|(&len, buckets)| {
            let mut counts = ClassBuckets::<usize>::default();
            for &class in &UniqClass::ALL {
                *counts.get_mut(class) = buckets.get(class).len();
            }
            (len, counts)
        })
        .collect();

    let mut absolute = TypeBuckets::<AbsoluteCounts>::default();
    let mut relative = TypeBuckets::<ClassBuckets<f64>>::default();
    for &feature_type in &FeatureType::ALL {
        let per_class = features.get(feature_type);
        let entry = absolute.get_mut(feature_type);
        for &class in &UniqClass::ALL {
            *entry.classes.get_mut(class) = per_class.get(class).0.len();
        }
        entry.total = UniqClass::ALL
            .iter()
            .map(|&c| *entry.classes.get(c))
            .sum();
        let ratios = relative.get_mut(feature_type);
        for &class in &UniqClass::ALL {
            *ratios.get_mut(class) = if entry.total == 0 {
                0.0
            } else {
                *entry.classes.get(class) as f64 / entry.total as f64
            };
        }
    }

    // Largest groups first.
    let mut duplicate_groups: Vec<DuplicateGroup> = groups
        .into_iter()
        .map(|(elfs, features)| DuplicateGroup {
            elfs: elfs.iter().map(ElfPath::to_string).collect(),
            features,
        })
        .collect();
    duplicate_groups.sort_by_key(|g| {
        std::cmp::Reverse(
            FeatureType::ALL
                .iter()
                .map(|&ft| g.features.get(ft).len())
                .sum::<usize>(),
        )
    });

    Aggregates {
        mode: classification.mode,
        aggregated: AggregatedFeatures {
            comment: TRIPLE_COMMENT.to_string(),
            features,
        },
        per_binary,
        duplicate_groups,
        strings_by_len,
        strings_by_len_counts,
        counts: CountsReport { absolute, relative },
        histograms,
    }
}
