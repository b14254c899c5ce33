//! Corpus extraction command.

use crate::corpus::{extract_corpus, ExtractConfig};
use crate::report;
use anyhow::{Context, Result};
use std::path::Path;

pub(crate) fn run(elfs_dir: &Path, out_dir: &Path, scan_min_length: usize) -> Result<String> {
    if !elfs_dir.is_dir() {
        anyhow::bail!("not a directory: {}", elfs_dir.display());
    }
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("creating output directory {}", out_dir.display()))?;

    let config = ExtractConfig { scan_min_length };
    let extraction = extract_corpus(elfs_dir, &config)
        .with_context(|| format!("extracting binaries from {}", elfs_dir.display()))?;
    report::write_extraction(out_dir, &extraction)
        .with_context(|| format!("writing extraction output to {}", out_dir.display()))?;

    let mut summary = format!(
        "extracted features from {} binaries to {}\n",
        extraction.from_elfs.len(),
        out_dir.display()
    );
    if !extraction.is_complete() {
        summary.push_str(&format!(
            "{} binaries failed, see {}:\n",
            extraction.failures.len(),
            report::EXTRACTION_FAILURES_FILE
        ));
        for failure in &extraction.failures {
            summary.push_str(&format!("  {}: {}\n", failure.elf_path, failure.error));
        }
    }
    Ok(summary)
}
