//! binsift - Identifying-feature extraction from packaged ELF binaries.
//!
//! This library extracts candidate identifying features (string literals
//! from read-only constant-data sections, global symbol names from the
//! dynamic symbol table) out of binaries unpacked from distribution
//! packages, then classifies how uniquely each feature pins down the binary,
//! its binary package, or its source package across a whole corpus. The
//! output feeds detection-rule generation and accuracy evaluation, both of
//! which live outside this crate.
//!
//! # Example
//!
//! ```no_run
//! use binsift::{classify_corpus, extract_corpus, Corpus, ExtractConfig, Mode};
//!
//! let extraction =
//!     extract_corpus("extracted-elfs".as_ref(), &ExtractConfig::default()).unwrap();
//! let corpus = Corpus::from_features(&extraction.from_elfs).unwrap();
//! let classification = classify_corpus(&corpus, Mode::Local);
//!
//! for (feature_type, instances) in &classification.by_type {
//!     println!("{feature_type}: {} distinct values", instances.len());
//! }
//! ```

pub mod aggregate;
pub mod classify;
pub mod cli;
pub mod corpus;
pub mod elf;
pub mod elf_path;
pub mod error;
pub mod extract;
pub mod features;
pub mod matching;
pub mod reader;
pub mod report;
pub mod strings;

// Re-export commonly used types at crate root
pub use aggregate::{aggregate, Aggregates};
pub use classify::{classify_corpus, classify_occurrences, Classification, Corpus, Mode, UniqClass};
pub use corpus::{extract_corpus, CorpusExtraction, ExtractConfig};
pub use elf::ElfReader;
pub use elf_path::ElfPath;
pub use error::{Result, SiftError};
pub use extract::{blob_strings, reconcile, structural_features};
pub use features::{CorpusBlobStrings, CorpusFeatures, FeatureSet, FeatureType};
pub use matching::{find_multi_type_features, isolated_strings};
pub use reader::{BinaryReader, Section, SectionKind, SymbolEntry};
pub use strings::{ScannedString, StringScanner};
