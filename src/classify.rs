//! Uniqueness classification.
//!
//! Given the structural feature sets for a whole corpus, build every feature
//! instance's occurrence set (deduplicated per binary), count how many source
//! packages, binary packages and binaries it spans, and assign it to the
//! first uniqueness class whose condition holds.
//!
//! Two modes share the single classification primitive
//! [`classify_occurrences`] and differ only in which occurrence set they feed
//! it: `local` judges each feature type on its own, `global` judges each
//! feature value by its merged footprint across all types.

use crate::elf_path::ElfPath;
use crate::error::Result;
use crate::features::{CorpusFeatures, FeatureSet, FeatureType};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Serialize, Serializer};

/// How uniquely a feature instance pins down its origin. Precedence is
/// strict and checked in declaration order: an instance belongs to the first
/// class whose condition holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UniqClass {
    ElfUnique,
    BinaryPkgUnique,
    SourcePkgUnique,
    NotUnique,
}

impl UniqClass {
    pub const ALL: [UniqClass; 4] = [
        UniqClass::ElfUnique,
        UniqClass::BinaryPkgUnique,
        UniqClass::SourcePkgUnique,
        UniqClass::NotUnique,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UniqClass::ElfUnique => "elf_unique",
            UniqClass::BinaryPkgUnique => "binary_pkg_unique",
            UniqClass::SourcePkgUnique => "source_pkg_unique",
            UniqClass::NotUnique => "not_unique",
        }
    }
}

/// Which occurrence-set view classification uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Mode {
    /// Judge each feature type independently.
    Local,
    /// Judge each feature value by its occurrence sets merged across types.
    Global,
}

/// How many origins an occurrence set spans, counted after per-binary
/// deduplication. Serialized as the `[source_pkgs, binary_pkgs, elfs]`
/// triple the reports carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct OriginCounts {
    pub source_pkgs: usize,
    pub binary_pkgs: usize,
    pub elfs: usize,
}

impl Serialize for OriginCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        (self.source_pkgs, self.binary_pkgs, self.elfs).serialize(serializer)
    }
}

/// The classification primitive: span counts and uniqueness class for one
/// occurrence set. `occurrences` must already be deduplicated per binary.
pub fn classify_occurrences(occurrences: &[ElfPath]) -> (UniqClass, OriginCounts) {
    let num_elfs = occurrences.len();
    let num_binary_pkgs = occurrences
        .iter()
        .map(|e| e.binary_pkg.as_str())
        .collect::<FxHashSet<_>>()
        .len();
    let num_source_pkgs = occurrences
        .iter()
        .map(|e| e.source_pkg.as_str())
        .collect::<FxHashSet<_>>()
        .len();

    let class = if num_elfs == 1 {
        UniqClass::ElfUnique
    } else if num_binary_pkgs == 1 {
        UniqClass::BinaryPkgUnique
    } else if num_source_pkgs == 1 {
        UniqClass::SourcePkgUnique
    } else {
        UniqClass::NotUnique
    };

    (
        class,
        OriginCounts {
            source_pkgs: num_source_pkgs,
            binary_pkgs: num_binary_pkgs,
            elfs: num_elfs,
        },
    )
}

/// The parsed corpus: every binary's identity and feature set, in canonical
/// (sorted) order.
#[derive(Debug, Clone)]
pub struct Corpus {
    pub binaries: Vec<(ElfPath, FeatureSet)>,
}

impl Corpus {
    /// Parse the extractor output keys into identities. Key order (sorted
    /// strings) becomes the corpus order every occurrence list follows.
    pub fn from_features(features: &CorpusFeatures) -> Result<Self> {
        let binaries = features
            .iter()
            .map(|(path, set)| Ok((ElfPath::parse(path)?, set.clone())))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { binaries })
    }
}

/// One classified feature instance.
#[derive(Debug, Clone)]
pub struct ClassifiedFeature {
    pub value: String,
    /// Binaries this instance occurs in under its own feature type,
    /// deduplicated per binary, in corpus order.
    pub occurrences: Vec<ElfPath>,
    pub class: UniqClass,
    pub counts: OriginCounts,
}

/// Classification result for the whole corpus: per feature type, the
/// instances in first-seen order.
#[derive(Debug, Clone)]
pub struct Classification {
    pub mode: Mode,
    pub binaries: Vec<ElfPath>,
    pub by_type: Vec<(FeatureType, Vec<ClassifiedFeature>)>,
}

impl Classification {
    pub fn instances(&self, feature_type: FeatureType) -> &[ClassifiedFeature] {
        self.by_type
            .iter()
            .find(|(ft, _)| *ft == feature_type)
            .map(|(_, instances)| instances.as_slice())
            .unwrap_or(&[])
    }
}

// Value -> occurrence list in first-seen order, each binary at most once.
#[derive(Default)]
struct OccurrencePool {
    values: Vec<String>,
    occurrences: Vec<Vec<ElfPath>>,
    index: FxHashMap<String, usize>,
}

impl OccurrencePool {
    fn add(&mut self, value: &str, elf: &ElfPath) {
        let idx = match self.index.get(value) {
            Some(&idx) => idx,
            None => {
                let idx = self.values.len();
                self.values.push(value.to_string());
                self.occurrences.push(Vec::new());
                self.index.insert(value.to_string(), idx);
                idx
            }
        };
        self.occurrences[idx].push(elf.clone());
    }

    fn occurrences_of(&self, value: &str) -> &[ElfPath] {
        &self.occurrences[self.index[value]]
    }
}

/// Classify every feature instance of the corpus under the given mode.
pub fn classify_corpus(corpus: &Corpus, mode: Mode) -> Classification {
    // Per-type pools drive instance membership regardless of mode; the raw
    // extraction may list a value several times per binary, so each binary
    // contributes at most once per pool entry.
    let mut type_pools: Vec<OccurrencePool> = FeatureType::ALL
        .iter()
        .map(|_| OccurrencePool::default())
        .collect();
    for (elf, features) in &corpus.binaries {
        for (type_idx, &feature_type) in FeatureType::ALL.iter().enumerate() {
            let mut seen = FxHashSet::default();
            for value in features.get(feature_type) {
                if seen.insert(value.as_str()) {
                    type_pools[type_idx].add(value, elf);
                }
            }
        }
    }

    // In global mode a value's footprint is the union of its occurrence sets
    // across all feature types.
    let merged_pool = (mode == Mode::Global).then(|| {
        let mut pool = OccurrencePool::default();
        for (elf, features) in &corpus.binaries {
            let mut seen = FxHashSet::default();
            for (_, values) in features.iter() {
                for value in values {
                    if seen.insert(value.as_str()) {
                        pool.add(value, elf);
                    }
                }
            }
        }
        pool
    });

    let by_type = FeatureType::ALL
        .iter()
        .zip(&type_pools)
        .map(|(&feature_type, pool)| {
            let classified = pool
                .values
                .iter()
                .zip(&pool.occurrences)
                .map(|(value, occurrences)| {
                    let judged = match &merged_pool {
                        Some(merged) => merged.occurrences_of(value),
                        None => occurrences.as_slice(),
                    };
                    let (class, counts) = classify_occurrences(judged);
                    ClassifiedFeature {
                        value: value.clone(),
                        occurrences: occurrences.clone(),
                        class,
                        counts,
                    }
                })
                .collect();
            (feature_type, classified)
        })
        .collect();

    Classification {
        mode,
        binaries: corpus.binaries.iter().map(|(elf, _)| elf.clone()).collect(),
        by_type,
    }
}
