//! Multi-type feature report command.

use crate::classify::Corpus;
use crate::features::CorpusFeatures;
use crate::matching::{find_multi_type_features, isolated_strings};
use crate::report;
use anyhow::{Context, Result};
use std::path::Path;

pub(crate) fn run(from_elfs: &Path, out_dir: &Path) -> Result<String> {
    let features: CorpusFeatures = report::read_json(from_elfs)
        .with_context(|| format!("reading {}", from_elfs.display()))?;
    let corpus = Corpus::from_features(&features)
        .context("parsing binary identities from extraction output")?;

    let entries = find_multi_type_features(&corpus);
    let isolated = isolated_strings(&entries);

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("creating output directory {}", out_dir.display()))?;
    report::write_json(&out_dir.join(report::STRINGS_MATCHING_SYMBOLS_FILE), &entries)?;
    report::write_json(
        &out_dir.join(report::ISOLATED_STRINGS_MATCHING_SYMBOLS_FILE),
        &isolated,
    )?;

    Ok(format!(
        "{} location signatures with multi-type feature values ({} with strings-only locations), written to {}\n",
        entries.len(),
        isolated.len(),
        out_dir.display()
    ))
}
