//! Report serialization.
//!
//! All outputs are JSON, written once per run. String content is preserved
//! losslessly: serde_json never escapes non-ASCII text. The file names
//! follow the pipeline stages so downstream consumers (rule generation,
//! chart plotting) can find them.

use crate::aggregate::Aggregates;
use crate::corpus::CorpusExtraction;
use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;

pub const FROM_ELFS_FILE: &str = "from-elfs.json";
pub const FROM_BLOBS_FILE: &str = "from-blobs.json";
pub const EXTRACTION_FAILURES_FILE: &str = "extraction-failures.json";
pub const CLASSIFIED_AGGREGATED_FILE: &str = "from-elfs-classified-aggregated.json";
pub const STRINGS_BY_LEN_FILE: &str = "from-elfs-classified-aggregated-strings-by-len.json";
pub const STRINGS_BY_LEN_COUNTS_FILE: &str =
    "from-elfs-classified-aggregated-strings-by-len-counts.json";
pub const CLASSIFIED_COUNTS_FILE: &str = "from-elfs-classified-aggregated-counts.json";
pub const ORIGIN_HISTOGRAMS_FILE: &str = "from-elfs-classified-aggregated-origin-histograms.json";
pub const PER_PACKAGES_FILE: &str = "from-elfs-classified-per-packages.json";
pub const DUPLICATE_GROUPED_FILE: &str = "from-elfs-duplicate-grouped.json";
pub const MISSING_FROM_ELFS_FILE: &str = "from-blobs-missing-from-elfs.json";
pub const STRINGS_MATCHING_SYMBOLS_FILE: &str = "from-elfs-strings-matching-symbols.json";
pub const ISOLATED_STRINGS_MATCHING_SYMBOLS_FILE: &str =
    "from-elfs-isolated-strings-matching-symbols.json";

/// Write a report as pretty-printed JSON.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut rendered = serde_json::to_string_pretty(value)?;
    rendered.push('\n');
    fs::write(path, rendered)?;
    info!(path = %path.display(), "wrote report");
    Ok(())
}

/// Read a JSON report back.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

/// Write both extraction outputs, plus the failure list when the run was
/// incomplete.
pub fn write_extraction(out_dir: &Path, extraction: &CorpusExtraction) -> Result<()> {
    write_json(&out_dir.join(FROM_ELFS_FILE), &extraction.from_elfs)?;
    write_json(&out_dir.join(FROM_BLOBS_FILE), &extraction.from_blobs)?;
    if !extraction.failures.is_empty() {
        write_json(&out_dir.join(EXTRACTION_FAILURES_FILE), &extraction.failures)?;
    }
    Ok(())
}

/// Write the full classification report set.
pub fn write_aggregates(out_dir: &Path, aggregates: &Aggregates) -> Result<()> {
    write_json(&out_dir.join(CLASSIFIED_AGGREGATED_FILE), &aggregates.aggregated)?;
    write_json(&out_dir.join(STRINGS_BY_LEN_FILE), &aggregates.strings_by_len)?;
    write_json(
        &out_dir.join(STRINGS_BY_LEN_COUNTS_FILE),
        &aggregates.strings_by_len_counts,
    )?;
    write_json(&out_dir.join(CLASSIFIED_COUNTS_FILE), &aggregates.counts)?;
    write_json(&out_dir.join(ORIGIN_HISTOGRAMS_FILE), &aggregates.histograms)?;
    write_json(&out_dir.join(PER_PACKAGES_FILE), &aggregates.per_binary)?;
    write_json(&out_dir.join(DUPLICATE_GROUPED_FILE), &aggregates.duplicate_groups)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{CorpusFeatures, FeatureSet};

    #[test]
    fn json_round_trip_preserves_non_ascii() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.json");

        let mut corpus = CorpusFeatures::new();
        let mut set = FeatureSet::new();
        set.strings.push("können sie das lesen? ✓".into());
        corpus.insert("src/pkg_amd64.deb-bin".into(), set);

        write_json(&path, &corpus).unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("können sie das lesen? ✓"));

        let back: CorpusFeatures = read_json(&path).unwrap();
        assert_eq!(back, corpus);
    }
}
