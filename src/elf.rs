//! goblin-backed [`BinaryReader`] for ELF binaries.

use crate::error::{Result, SiftError};
use crate::reader::{BinaryReader, Section, SectionKind, SymbolBinding, SymbolEntry, SymbolKind};
use goblin::elf::section_header::{SHT_NOBITS, SHT_PROGBITS};
use goblin::elf::sym::{STB_GLOBAL, STB_LOCAL, STB_WEAK, STT_FUNC, STT_OBJECT};
use goblin::elf::Elf;

/// Reads section and dynamic-symbol metadata out of a parsed ELF image.
pub struct ElfReader<'a> {
    elf: Elf<'a>,
    data: &'a [u8],
    path: String,
}

impl<'a> ElfReader<'a> {
    /// Parse `data` as an ELF image. `path` is only used in error messages.
    pub fn parse(data: &'a [u8], path: &str) -> Result<Self> {
        let elf = Elf::parse(data)
            .map_err(|e| SiftError::malformed(path, e.to_string()))?;
        Ok(Self { elf, data, path: path.to_string() })
    }
}

impl BinaryReader for ElfReader<'_> {
    fn sections(&self) -> Result<Vec<Section>> {
        let mut sections = Vec::with_capacity(self.elf.section_headers.len());
        for sh in &self.elf.section_headers {
            let name = self
                .elf
                .shdr_strtab
                .get_at(sh.sh_name)
                .unwrap_or("")
                .to_string();
            let kind = match sh.sh_type {
                SHT_PROGBITS => SectionKind::ProgBits,
                SHT_NOBITS => SectionKind::NoBits,
                other => SectionKind::Other(other),
            };
            let body = if kind == SectionKind::ProgBits {
                let start = sh.sh_offset as usize;
                let end = start.checked_add(sh.sh_size as usize);
                let bytes = end
                    .and_then(|end| self.data.get(start..end))
                    .ok_or_else(|| {
                        SiftError::malformed(
                            &self.path,
                            format!("section {name:?} extends past end of file"),
                        )
                    })?;
                Some(bytes.to_vec())
            } else {
                None
            };
            sections.push(Section { name, kind, offset: sh.sh_offset, size: sh.sh_size, body });
        }
        Ok(sections)
    }

    fn dynamic_symbols(&self) -> Result<Vec<SymbolEntry>> {
        let mut entries = Vec::with_capacity(self.elf.dynsyms.len());
        for (index, sym) in self.elf.dynsyms.iter().enumerate() {
            let name = if sym.st_name == 0 {
                None
            } else {
                // A nonzero name index that does not resolve means the string
                // table is inconsistent with the symbol table.
                Some(
                    self.elf
                        .dynstrtab
                        .get_at(sym.st_name)
                        .ok_or(SiftError::UnresolvedSymbolName { index })?
                        .to_string(),
                )
            };
            let kind = match sym.st_type() {
                STT_FUNC => SymbolKind::Func,
                STT_OBJECT => SymbolKind::Object,
                other => SymbolKind::Other(other),
            };
            let binding = match sym.st_bind() {
                STB_GLOBAL => SymbolBinding::Global,
                STB_LOCAL => SymbolBinding::Local,
                STB_WEAK => SymbolBinding::Weak,
                other => SymbolBinding::Other(other),
            };
            entries.push(SymbolEntry {
                name,
                kind,
                binding,
                undefined: sym.st_shndx == 0,
            });
        }
        Ok(entries)
    }
}
