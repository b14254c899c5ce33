//! Feature model: the closed set of feature types and the per-binary feature
//! set produced by structural extraction.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The kinds of identifying features extracted from a binary.
///
/// The set is closed: new types are never invented at runtime, and every
/// report iterates them in this declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureType {
    Strings,
    DefinedFunctions,
    UndefinedFunctions,
    DefinedObjects,
    UndefinedObjects,
}

impl FeatureType {
    pub const ALL: [FeatureType; 5] = [
        FeatureType::Strings,
        FeatureType::DefinedFunctions,
        FeatureType::UndefinedFunctions,
        FeatureType::DefinedObjects,
        FeatureType::UndefinedObjects,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureType::Strings => "strings",
            FeatureType::DefinedFunctions => "defined_functions",
            FeatureType::UndefinedFunctions => "undefined_functions",
            FeatureType::DefinedObjects => "defined_objects",
            FeatureType::UndefinedObjects => "undefined_objects",
        }
    }
}

impl fmt::Display for FeatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// All features extracted from one binary by the structural pass.
///
/// Values are kept in discovery order and duplicates are permitted here;
/// deduplication happens when the classifier builds occurrence sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSet {
    pub strings: Vec<String>,
    pub defined_functions: Vec<String>,
    pub undefined_functions: Vec<String>,
    pub defined_objects: Vec<String>,
    pub undefined_objects: Vec<String>,
}

impl FeatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, feature_type: FeatureType) -> &[String] {
        match feature_type {
            FeatureType::Strings => &self.strings,
            FeatureType::DefinedFunctions => &self.defined_functions,
            FeatureType::UndefinedFunctions => &self.undefined_functions,
            FeatureType::DefinedObjects => &self.defined_objects,
            FeatureType::UndefinedObjects => &self.undefined_objects,
        }
    }

    pub fn push(&mut self, feature_type: FeatureType, value: String) {
        match feature_type {
            FeatureType::Strings => self.strings.push(value),
            FeatureType::DefinedFunctions => self.defined_functions.push(value),
            FeatureType::UndefinedFunctions => self.undefined_functions.push(value),
            FeatureType::DefinedObjects => self.defined_objects.push(value),
            FeatureType::UndefinedObjects => self.undefined_objects.push(value),
        }
    }

    /// Iterate feature lists in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (FeatureType, &[String])> + '_ {
        FeatureType::ALL.iter().map(move |&ft| (ft, self.get(ft)))
    }

    /// Total number of raw feature values across all types.
    pub fn len(&self) -> usize {
        FeatureType::ALL.iter().map(|&ft| self.get(ft).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Structural extraction output for a whole corpus, keyed by the canonical
/// identity string, sorted for deterministic report order.
pub type CorpusFeatures = BTreeMap<String, FeatureSet>;

/// Brute-force extraction output for a whole corpus: per binary, per section
/// name, the printable runs found in that section's byte range. The empty
/// section name buckets runs that fall outside every section.
pub type CorpusBlobStrings = BTreeMap<String, BTreeMap<String, Vec<String>>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_type_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&FeatureType::DefinedFunctions).unwrap(),
            "\"defined_functions\""
        );
        let ft: FeatureType = serde_json::from_str("\"undefined_objects\"").unwrap();
        assert_eq!(ft, FeatureType::UndefinedObjects);
    }

    #[test]
    fn feature_set_routes_by_type() {
        let mut set = FeatureSet::new();
        set.push(FeatureType::Strings, "hello".into());
        set.push(FeatureType::DefinedFunctions, "main".into());
        set.push(FeatureType::DefinedFunctions, "init".into());

        assert_eq!(set.get(FeatureType::Strings), ["hello"]);
        assert_eq!(set.get(FeatureType::DefinedFunctions), ["main", "init"]);
        assert!(set.get(FeatureType::UndefinedObjects).is_empty());
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn feature_set_json_shape() {
        let mut set = FeatureSet::new();
        set.push(FeatureType::Strings, "héllo wörld".into());
        let json = serde_json::to_string(&set).unwrap();
        // Non-ASCII content is preserved verbatim, never escaped.
        assert!(json.contains("héllo wörld"));
        let back: FeatureSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }
}
