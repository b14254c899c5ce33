//! Structural metadata model and the injected binary-reader capability.
//!
//! The extractor never parses container formats itself. It consumes an
//! implementation of [`BinaryReader`] exposing the section list and the
//! dynamic symbol table, backed by goblin in production (see [`crate::elf`])
//! and by synthetic fixtures in tests.

use crate::error::Result;
use std::fmt;
use std::ops::Range;

/// Section type tag, reduced to what extraction needs: program data with
/// on-disk bytes, zero-fill placeholders without, and everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    ProgBits,
    NoBits,
    Other(u32),
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SectionKind::ProgBits => f.write_str("progbits"),
            SectionKind::NoBits => f.write_str("nobits"),
            SectionKind::Other(t) => write!(f, "other({t:#x})"),
        }
    }
}

/// One section of a binary, in file order.
#[derive(Debug, Clone)]
pub struct Section {
    pub name: String,
    pub kind: SectionKind,
    /// File offset of the section's first byte.
    pub offset: u64,
    /// On-disk size in bytes; zero-fill sections report their virtual size
    /// here but occupy no file range.
    pub size: u64,
    /// Raw bytes, present for program-data sections.
    pub body: Option<Vec<u8>>,
}

impl Section {
    /// Byte range this section occupies in the file. Empty for sections with
    /// no on-disk bytes.
    pub fn file_range(&self) -> Range<u64> {
        match self.kind {
            SectionKind::NoBits => self.offset..self.offset,
            _ => self.offset..self.offset + self.size,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Func,
    Object,
    Other(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolBinding {
    Local,
    Global,
    Weak,
    Other(u8),
}

/// One dynamic symbol table entry.
#[derive(Debug, Clone)]
pub struct SymbolEntry {
    /// Resolved symbol name; `None` for nameless entries such as the initial
    /// null symbol.
    pub name: Option<String>,
    pub kind: SymbolKind,
    pub binding: SymbolBinding,
    /// True when the section-index field holds the undefined sentinel, i.e.
    /// the symbol is imported rather than exported.
    pub undefined: bool,
}

/// Capability exposing a binary's structural metadata to the extractor.
pub trait BinaryReader {
    /// The binary's sections, in file order.
    fn sections(&self) -> Result<Vec<Section>>;

    /// Entries of the dynamic symbol table, empty when the binary has none.
    fn dynamic_symbols(&self) -> Result<Vec<SymbolEntry>>;
}
