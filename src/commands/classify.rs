//! Classification command.

use crate::aggregate::aggregate;
use crate::classify::{classify_corpus, Corpus, Mode};
use crate::elf_path::normalize_arch;
use crate::features::CorpusFeatures;
use crate::report;
use anyhow::{Context, Result};
use std::collections::btree_map::Entry;
use std::path::Path;

pub(crate) fn run(
    from_elfs: &Path,
    out_dir: &Path,
    mode: Mode,
    arch_wildcard: bool,
) -> Result<String> {
    let mut features: CorpusFeatures = report::read_json(from_elfs)
        .with_context(|| format!("reading {}", from_elfs.display()))?;

    if arch_wildcard {
        features = merge_architectures(features);
    }

    let corpus = Corpus::from_features(&features)
        .context("parsing binary identities from extraction output")?;
    let classification = classify_corpus(&corpus, mode);
    let aggregates = aggregate(&classification);

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("creating output directory {}", out_dir.display()))?;
    report::write_aggregates(out_dir, &aggregates)
        .with_context(|| format!("writing reports to {}", out_dir.display()))?;

    let total: usize = crate::features::FeatureType::ALL
        .iter()
        .map(|&ft| aggregates.counts.absolute.get(ft).total)
        .sum();
    Ok(format!(
        "classified {} feature instances from {} binaries ({} mode) to {}\n",
        total,
        corpus.binaries.len(),
        match mode {
            Mode::Local => "local",
            Mode::Global => "global",
        },
        out_dir.display()
    ))
}

/// Rewrite identity strings with the architecture wildcard, merging feature
/// sets of builds that only differ by architecture.
fn merge_architectures(features: CorpusFeatures) -> CorpusFeatures {
    let mut merged = CorpusFeatures::new();
    for (elf_path, set) in features {
        match merged.entry(normalize_arch(&elf_path)) {
            Entry::Vacant(slot) => {
                slot.insert(set);
            }
            Entry::Occupied(mut slot) => {
                let existing = slot.get_mut();
                for (feature_type, values) in set.iter() {
                    for value in values {
                        existing.push(feature_type, value.clone());
                    }
                }
            }
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureSet;

    #[test]
    fn merge_unifies_architectures() {
        let mut features = CorpusFeatures::new();
        let mut amd = FeatureSet::new();
        amd.strings.push("shared across arches".into());
        let mut arm = FeatureSet::new();
        arm.strings.push("shared across arches".into());
        arm.strings.push("arm only".into());
        features.insert("zlib/zlib1g_1.2_amd64.deb-libz.so.1".into(), amd);
        features.insert("zlib/zlib1g_1.2_arm64.deb-libz.so.1".into(), arm);

        let merged = merge_architectures(features);
        assert_eq!(merged.len(), 1);
        let set = &merged["zlib/zlib1g_1.2_{arch}.deb-libz.so.1"];
        // Raw values concatenate; the classifier dedups per binary.
        assert_eq!(
            set.strings,
            ["shared across arches", "shared across arches", "arm only"]
        );
    }
}
