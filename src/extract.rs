//! Feature extraction from one binary.
//!
//! Two independent passes over the same binary:
//!
//! - **Structural**: driven by parsed container metadata. String literals come
//!   from recognized read-only constant-data sections, symbol names from the
//!   dynamic symbol table.
//! - **Brute-force**: printable runs found anywhere in the file (see
//!   [`crate::strings`]), attributed to sections by file offset.
//!
//! [`reconcile`] computes what the brute-force pass sees that the structural
//! pass does not, which is the signal for imperfect section-name coverage.

use crate::error::{Result, SiftError};
use crate::features::{CorpusBlobStrings, CorpusFeatures, FeatureSet, FeatureType};
use crate::reader::{BinaryReader, Section, SectionKind, SymbolBinding, SymbolKind};
use crate::strings::ScannedString;
use rustc_hash::FxHashSet;
use std::borrow::Cow;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Minimum length, in characters, for an extracted string literal.
pub const STRING_CUTOFF_LENGTH: usize = 4;

/// Read-only constant-data section names recognized as string carriers.
pub const RODATA_SECTION_NAMES: [&str; 8] = [
    ".rodata",
    ".rodata.str1.1",
    ".rodata.str1.4",
    ".rodata.str1.8",
    ".rodata.cst4",
    ".rodata.cst8",
    ".rodata.cst16",
    "rodata",
];

// Relocation sections for .rodata carry no string data and are not unusual.
const RELOC_RODATA_NAMES: [&str; 2] = [".rel.rodata", ".rela.rodata"];

/// Run the structural extraction pass over one binary.
///
/// Returns the feature set in discovery order. Fails loudly on structural
/// preconditions: a recognized constant-data section with an unexpected type,
/// or a symbol entry whose name cannot be resolved.
pub fn structural_features<R: BinaryReader + ?Sized>(reader: &R) -> Result<FeatureSet> {
    let mut features = FeatureSet::new();

    for section in reader.sections()? {
        if RODATA_SECTION_NAMES.contains(&section.name.as_str()) {
            match section.kind {
                SectionKind::NoBits => continue,
                SectionKind::ProgBits => {}
                kind => {
                    return Err(SiftError::unexpected_section_type(
                        section.name,
                        kind.to_string(),
                    ))
                }
            }
            let body = section.body.as_deref().unwrap_or_default();
            split_constant_data(body, &mut features.strings);
        } else if section.name.contains("rodata")
            && !RELOC_RODATA_NAMES.contains(&section.name.as_str())
        {
            warn!(section = %section.name, "unusual name of rodata-like section, skipping");
        }
    }

    for entry in reader.dynamic_symbols()? {
        let feature_type = match (entry.kind, entry.undefined) {
            (SymbolKind::Func, false) => FeatureType::DefinedFunctions,
            (SymbolKind::Func, true) => FeatureType::UndefinedFunctions,
            (SymbolKind::Object, false) => FeatureType::DefinedObjects,
            (SymbolKind::Object, true) => FeatureType::UndefinedObjects,
            _ => continue,
        };
        if entry.binding != SymbolBinding::Global {
            continue;
        }
        match entry.name {
            Some(name) if !name.is_empty() => features.push(feature_type, name),
            _ => continue,
        }
    }

    Ok(features)
}

/// Split a constant-data section body into string literals.
///
/// The body mixes null-terminated literals with non-string constants. Each
/// null-delimited run is decoded and split on control characters; a run that
/// fails strict UTF-8 decoding is trusted only after its last decode failure.
fn split_constant_data(body: &[u8], out: &mut Vec<String>) {
    for run in body.split(|&b| b == 0) {
        let decoded = decode_run(run);
        for candidate in decoded.split(is_delimiter) {
            if accept_candidate(candidate) {
                out.push(candidate.to_string());
            }
        }
    }
}

/// Decode one null-delimited run. On a strict decode failure, decode
/// permissively and keep only the tail after the last replacement character:
/// the failure marks the run as dirty, and only what follows the final
/// failure is trusted as a genuine literal.
fn decode_run(run: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(run) {
        Ok(s) => Cow::Borrowed(s),
        Err(_) => {
            let lossy = String::from_utf8_lossy(run);
            let tail = match lossy.rfind('\u{fffd}') {
                Some(pos) => lossy[pos + '\u{fffd}'.len_utf8()..].to_string(),
                None => lossy.into_owned(),
            };
            Cow::Owned(tail)
        }
    }
}

// Control characters except tab, plus DEL and the replacement character.
fn is_delimiter(c: char) -> bool {
    matches!(c, '\u{00}'..='\u{08}' | '\u{0a}'..='\u{1f}' | '\u{7f}' | '\u{fffd}')
}

fn accept_candidate(candidate: &str) -> bool {
    if candidate.chars().count() < STRING_CUTOFF_LENGTH {
        return false;
    }
    if candidate.chars().all(char::is_whitespace) {
        return false;
    }
    if !candidate.is_ascii() {
        // Non-ASCII text is accepted as-is: legitimate non-English literals.
        return true;
    }
    // Printability is tested with tab mapped to plain space.
    let printable = candidate
        .bytes()
        .all(|b| b == b'\t' || (0x20..=0x7e).contains(&b));
    if !printable {
        debug!(value = ?candidate, "dropping non-printable ASCII candidate");
    }
    printable
}

/// Attribute brute-force scan hits to sections by file offset.
///
/// Sections are checked for overlap first: overlapping on-disk ranges would
/// make the attribution ambiguous and indicate an extraction bug. Hits
/// outside every section land under the empty section name.
pub fn blob_strings(
    sections: &[Section],
    scanned: &[ScannedString],
) -> Result<BTreeMap<String, Vec<String>>> {
    assert_no_overlap(sections)?;

    let mut by_section: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for hit in scanned {
        let section_name = sections
            .iter()
            .find(|s| s.file_range().contains(&hit.offset))
            .map(|s| s.name.as_str())
            .unwrap_or("");
        by_section
            .entry(section_name.to_string())
            .or_default()
            .push(hit.value.clone());
    }
    Ok(by_section)
}

fn assert_no_overlap(sections: &[Section]) -> Result<()> {
    let mut ranges: Vec<(&Section, std::ops::Range<u64>)> = sections
        .iter()
        .map(|s| (s, s.file_range()))
        .filter(|(_, r)| !r.is_empty())
        .collect();
    ranges.sort_by_key(|(_, r)| r.start);
    for pair in ranges.windows(2) {
        let (first, first_range) = &pair[0];
        let (second, second_range) = &pair[1];
        if second_range.start < first_range.end {
            return Err(SiftError::overlapping_sections(&first.name, &second.name));
        }
    }
    Ok(())
}

/// Strings visible to the brute-force pass but absent from the structural
/// feature set, per binary and per section.
///
/// Both extraction outputs must cover the same binary set; a binary present
/// on only one side is a consistency error, not a skippable condition.
pub fn reconcile(
    from_elfs: &CorpusFeatures,
    from_blobs: &CorpusBlobStrings,
) -> Result<CorpusBlobStrings> {
    for elf_path in from_elfs.keys() {
        if !from_blobs.contains_key(elf_path) {
            return Err(SiftError::BinaryMismatch {
                path: elf_path.clone(),
                present: "structural",
                missing: "brute-force",
            });
        }
    }

    let mut missing_corpus = CorpusBlobStrings::new();
    for (elf_path, sections) in from_blobs {
        let features = from_elfs.get(elf_path).ok_or_else(|| SiftError::BinaryMismatch {
            path: elf_path.clone(),
            present: "brute-force",
            missing: "structural",
        })?;

        let known: FxHashSet<&str> = features
            .iter()
            .flat_map(|(_, values)| values.iter().map(String::as_str))
            .collect();

        let mut missing_entry = BTreeMap::new();
        for (section_name, strings) in sections {
            let mut seen = FxHashSet::default();
            let missing: Vec<String> = strings
                .iter()
                .filter(|s| seen.insert(s.as_str()))
                .filter(|s| !known.contains(s.as_str()))
                .cloned()
                .collect();
            missing_entry.insert(section_name.clone(), missing);
        }
        missing_corpus.insert(elf_path.clone(), missing_entry);
    }
    Ok(missing_corpus)
}
