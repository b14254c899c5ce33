//! Corpus-wide extraction.
//!
//! Walks a directory of extracted binaries laid out as
//! `<source_pkg>/<binary_pkg>-<name>`, runs both extraction passes on every
//! binary in parallel, and collects immutable per-binary results. Extraction
//! of one binary never aborts the batch: failures are isolated into a
//! per-run list surfaced at the end. The classifier consumes the complete
//! result set only after this barrier.

use crate::elf::ElfReader;
use crate::elf_path::ElfPath;
use crate::error::Result;
use crate::extract::{blob_strings, structural_features};
use crate::features::{CorpusBlobStrings, CorpusFeatures, FeatureSet};
use crate::reader::BinaryReader;
use crate::strings::StringScanner;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};
use walkdir::WalkDir;

/// Configuration for a corpus extraction run.
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Minimum length for brute-force printable runs.
    pub scan_min_length: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self { scan_min_length: 4 }
    }
}

/// One binary the batch could not process.
#[derive(Debug, Clone, Serialize)]
pub struct BinaryFailure {
    pub elf_path: String,
    pub error: String,
}

/// Everything one extraction run produces.
#[derive(Debug, Clone)]
pub struct CorpusExtraction {
    pub from_elfs: CorpusFeatures,
    pub from_blobs: CorpusBlobStrings,
    pub failures: Vec<BinaryFailure>,
}

/// Run both extraction passes over one binary image.
pub fn extract_binary(
    data: &[u8],
    label: &str,
    scanner: &StringScanner,
) -> Result<(FeatureSet, BTreeMap<String, Vec<String>>)> {
    let reader = ElfReader::parse(data, label)?;
    let features = structural_features(&reader)?;
    let sections = reader.sections()?;
    let scanned = scanner.scan(data);
    let blobs = blob_strings(&sections, &scanned)?;
    Ok((features, blobs))
}

/// Extract every binary under `elfs_dir`, in parallel.
///
/// File paths relative to `elfs_dir` are the binaries' identity strings and
/// must parse as such; files that do not, and binaries that fail to read or
/// parse, end up in the failure list rather than aborting the run.
pub fn extract_corpus(elfs_dir: &Path, config: &ExtractConfig) -> Result<CorpusExtraction> {
    let mut targets: Vec<(String, std::path::PathBuf)> = WalkDir::new(elfs_dir)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let rel = e
                .path()
                .strip_prefix(elfs_dir)
                .expect("walkdir yields paths under its root")
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            (rel, e.into_path())
        })
        .collect();
    targets.sort_by(|a, b| a.0.cmp(&b.0));

    info!(count = targets.len(), dir = %elfs_dir.display(), "extracting corpus");

    let scanner = StringScanner::new().with_min_length(config.scan_min_length);
    let results: Vec<(String, Result<(FeatureSet, BTreeMap<String, Vec<String>>)>)> = targets
        .par_iter()
        .map(|(elf_path, file_path)| {
            let outcome = extract_target(elf_path, file_path, &scanner);
            (elf_path.clone(), outcome)
        })
        .collect();

    let mut extraction = CorpusExtraction {
        from_elfs: CorpusFeatures::new(),
        from_blobs: CorpusBlobStrings::new(),
        failures: Vec::new(),
    };
    for (elf_path, outcome) in results {
        match outcome {
            Ok((features, blobs)) => {
                extraction.from_elfs.insert(elf_path.clone(), features);
                extraction.from_blobs.insert(elf_path, blobs);
            }
            // Precondition violations indicate extraction-logic bugs, not bad
            // corpus data; they abort the run instead of joining the failure
            // list.
            Err(err) if err.is_precondition_violation() => return Err(err),
            Err(err) => {
                warn!(elf_path = %elf_path, error = %err, "failed to extract binary");
                extraction.failures.push(BinaryFailure {
                    elf_path,
                    error: err.to_string(),
                });
            }
        }
    }

    info!(
        extracted = extraction.from_elfs.len(),
        failed = extraction.failures.len(),
        "corpus extraction finished"
    );
    Ok(extraction)
}

fn extract_target(
    elf_path: &str,
    file_path: &Path,
    scanner: &StringScanner,
) -> Result<(FeatureSet, BTreeMap<String, Vec<String>>)> {
    // The relative path is the identity; reject layouts that cannot name
    // their binaries before doing any work.
    ElfPath::parse(elf_path)?;
    let data = std::fs::read(file_path)?;
    extract_binary(&data, elf_path, scanner)
}

impl CorpusExtraction {
    /// True when every binary in the corpus was extracted.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}
