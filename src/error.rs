use thiserror::Error;

/// binsift's error types for extraction and classification failures.
///
/// Precondition violations (`UnexpectedSectionType`, `UnresolvedSymbolName`,
/// `OverlappingSections`, `BinaryMismatch`) signal extraction-logic bugs and
/// are never downgraded to warnings.
#[derive(Debug, Error)]
pub enum SiftError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed binary {path}: {message}")]
    Malformed { path: String, message: String },

    #[error("invalid ELF path {path:?}: expected <source_pkg>/<binary_pkg>-<name>")]
    InvalidElfPath { path: String },

    #[error("unexpected type {kind} for section {section:?}: expected program data")]
    UnexpectedSectionType { section: String, kind: String },

    #[error("symbol table entry {index} has an unresolvable name")]
    UnresolvedSymbolName { index: usize },

    #[error("sections {first:?} and {second:?} overlap")]
    OverlappingSections { first: String, second: String },

    #[error("binary {path} present in {present} output but missing from {missing} output")]
    BinaryMismatch {
        path: String,
        present: &'static str,
        missing: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, SiftError>;

impl SiftError {
    pub fn malformed<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::Malformed { path: path.into(), message: message.into() }
    }

    pub fn invalid_elf_path<S: Into<String>>(path: S) -> Self {
        Self::InvalidElfPath { path: path.into() }
    }

    pub fn unexpected_section_type<S: Into<String>, K: Into<String>>(section: S, kind: K) -> Self {
        Self::UnexpectedSectionType { section: section.into(), kind: kind.into() }
    }

    pub fn overlapping_sections<A: Into<String>, B: Into<String>>(first: A, second: B) -> Self {
        Self::OverlappingSections { first: first.into(), second: second.into() }
    }

    /// Returns true if the error indicates a bug in extraction logic rather
    /// than bad input data.
    pub fn is_precondition_violation(&self) -> bool {
        matches!(
            self,
            Self::UnexpectedSectionType { .. }
                | Self::UnresolvedSymbolName { .. }
                | Self::OverlappingSections { .. }
                | Self::BinaryMismatch { .. }
        )
    }
}
