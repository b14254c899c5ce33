//! Reconciliation command: strings the brute-force pass sees that the
//! structural pass does not.

use crate::extract::reconcile;
use crate::features::{CorpusBlobStrings, CorpusFeatures};
use crate::report;
use anyhow::{Context, Result};
use std::path::Path;

pub(crate) fn run(from_elfs: &Path, from_blobs: &Path, out_dir: &Path) -> Result<String> {
    let features: CorpusFeatures = report::read_json(from_elfs)
        .with_context(|| format!("reading {}", from_elfs.display()))?;
    let blobs: CorpusBlobStrings = report::read_json(from_blobs)
        .with_context(|| format!("reading {}", from_blobs.display()))?;

    let missing = reconcile(&features, &blobs)
        .context("reconciling structural and brute-force extraction")?;

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("creating output directory {}", out_dir.display()))?;
    let out_path = out_dir.join(report::MISSING_FROM_ELFS_FILE);
    report::write_json(&out_path, &missing)
        .with_context(|| format!("writing {}", out_path.display()))?;

    let missing_strings: usize = missing
        .values()
        .flat_map(|sections| sections.values())
        .map(Vec::len)
        .sum();
    Ok(format!(
        "{} strings across {} binaries visible to the brute-force scan only, written to {}\n",
        missing_strings,
        missing.len(),
        out_path.display()
    ))
}
