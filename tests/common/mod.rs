//! Shared test fixtures: a minimal hand-assembled ELF64 image with a
//! .rodata section and an optional dynamic symbol table, good enough for
//! goblin to parse.

/// A dynamic symbol to place in the fixture's .dynsym.
pub struct SymbolSpec {
    pub name: &'static str,
    pub is_func: bool,
    pub undefined: bool,
}

impl SymbolSpec {
    pub fn func(name: &'static str, undefined: bool) -> Self {
        Self { name, is_func: true, undefined }
    }

    pub fn object(name: &'static str, undefined: bool) -> Self {
        Self { name, is_func: false, undefined }
    }
}

const EHDR_SIZE: usize = 64;
const PHDR_SIZE: usize = 56;
const SHDR_SIZE: usize = 64;
const SYM_SIZE: usize = 24;
const DYN_SIZE: usize = 16;

// goblin reads dynamic symbols out of the PT_DYNAMIC segment (DT_SYMTAB /
// DT_STRTAB / DT_HASH), not straight from the .dynsym section header, so the
// fixture carries a minimal _DYNAMIC array and a SysV hash table whose
// nchain field tells goblin how many symbols to read.
const PT_LOAD: u32 = 1;
const PT_DYNAMIC: u32 = 2;
const PHDR_COUNT: usize = 2;
const DT_NULL: u64 = 0;
const DT_HASH: u64 = 4;
const DT_STRTAB: u64 = 5;
const DT_SYMTAB: u64 = 6;
const DT_STRSZ: u64 = 10;
const DT_SYMENT: u64 = 11;

// "\0.rodata\0.dynstr\0.dynsym\0.shstrtab\0"
const SHSTRTAB: &[u8] = b"\0.rodata\0.dynstr\0.dynsym\0.shstrtab\0";
const NAME_RODATA: u32 = 1;
const NAME_DYNSTR: u32 = 9;
const NAME_DYNSYM: u32 = 17;
const NAME_SHSTRTAB: u32 = 25;

const SHT_PROGBITS: u32 = 1;
const SHT_STRTAB: u32 = 3;
const SHT_DYNSYM: u32 = 11;

/// Assemble a little-endian ELF64 with the given .rodata body and global
/// dynamic symbols.
pub fn build_elf(rodata: &[u8], symbols: &[SymbolSpec]) -> Vec<u8> {
    // .dynstr: null byte, then each name null-terminated.
    let mut dynstr = vec![0u8];
    let mut name_offsets = Vec::with_capacity(symbols.len());
    for sym in symbols {
        name_offsets.push(dynstr.len() as u32);
        dynstr.extend_from_slice(sym.name.as_bytes());
        dynstr.push(0);
    }

    // .dynsym: null entry first.
    let mut dynsym = vec![0u8; SYM_SIZE];
    for (sym, &name_offset) in symbols.iter().zip(&name_offsets) {
        let stt: u8 = if sym.is_func { 2 } else { 1 };
        let st_info: u8 = (1 << 4) | stt; // STB_GLOBAL
        let st_shndx: u16 = if sym.undefined { 0 } else { 1 };
        dynsym.extend_from_slice(&name_offset.to_le_bytes());
        dynsym.push(st_info);
        dynsym.push(0); // st_other
        dynsym.extend_from_slice(&st_shndx.to_le_bytes());
        dynsym.extend_from_slice(&0u64.to_le_bytes()); // st_value
        dynsym.extend_from_slice(&0u64.to_le_bytes()); // st_size
    }

    // Number of entries in .dynsym (the leading null entry plus one per symbol);
    // this is what goblin's DT_HASH nchain must report.
    let num_syms = 1 + symbols.len();

    // SysV hash table: nbucket, nchain. goblin only reads nchain to size the
    // dynamic symbol table, so a single bucket is enough.
    let mut hash = Vec::new();
    hash.extend_from_slice(&1u32.to_le_bytes()); // nbucket
    hash.extend_from_slice(&(num_syms as u32).to_le_bytes()); // nchain

    let phoff = EHDR_SIZE;
    let rodata_off = phoff + PHDR_COUNT * PHDR_SIZE;
    let dynstr_off = rodata_off + rodata.len();
    let dynsym_off = dynstr_off + dynstr.len();
    let hash_off = dynsym_off + dynsym.len();
    let dyn_off = hash_off + hash.len();

    // _DYNAMIC array. d_val fields hold raw file offsets, which goblin uses
    // directly (p_vaddr == p_offset below keeps that consistent).
    let dyn_entries: [(u64, u64); 6] = [
        (DT_HASH, hash_off as u64),
        (DT_STRTAB, dynstr_off as u64),
        (DT_SYMTAB, dynsym_off as u64),
        (DT_STRSZ, dynstr.len() as u64),
        (DT_SYMENT, SYM_SIZE as u64),
        (DT_NULL, 0),
    ];
    let mut dynamic = Vec::with_capacity(dyn_entries.len() * DYN_SIZE);
    for (tag, val) in dyn_entries {
        dynamic.extend_from_slice(&tag.to_le_bytes());
        dynamic.extend_from_slice(&val.to_le_bytes());
    }

    let shstrtab_off = dyn_off + dynamic.len();
    let shoff = shstrtab_off + SHSTRTAB.len();

    let mut image = Vec::with_capacity(shoff + 5 * SHDR_SIZE);

    // ELF header
    image.extend_from_slice(b"\x7fELF");
    image.push(2); // 64-bit
    image.push(1); // little-endian
    image.push(1); // EV_CURRENT
    image.push(0); // System V ABI
    image.extend_from_slice(&[0u8; 8]); // padding
    image.extend_from_slice(&2u16.to_le_bytes()); // ET_EXEC
    image.extend_from_slice(&0x3eu16.to_le_bytes()); // EM_X86_64
    image.extend_from_slice(&1u32.to_le_bytes()); // e_version
    image.extend_from_slice(&0u64.to_le_bytes()); // e_entry
    image.extend_from_slice(&(phoff as u64).to_le_bytes()); // e_phoff
    image.extend_from_slice(&(shoff as u64).to_le_bytes()); // e_shoff
    image.extend_from_slice(&0u32.to_le_bytes()); // e_flags
    image.extend_from_slice(&(EHDR_SIZE as u16).to_le_bytes()); // e_ehsize
    image.extend_from_slice(&(PHDR_SIZE as u16).to_le_bytes()); // e_phentsize
    image.extend_from_slice(&(PHDR_COUNT as u16).to_le_bytes()); // e_phnum
    image.extend_from_slice(&(SHDR_SIZE as u16).to_le_bytes()); // e_shentsize
    image.extend_from_slice(&5u16.to_le_bytes()); // e_shnum
    image.extend_from_slice(&4u16.to_le_bytes()); // e_shstrndx
    assert_eq!(image.len(), EHDR_SIZE);

    // PT_LOAD mapping the whole file with p_vaddr == p_offset, so goblin's
    // virtual-address -> file-offset translation for the dynamic table is the
    // identity and the DT_* file offsets below resolve directly.
    let total_len = (shoff + 5 * SHDR_SIZE) as u64;
    image.extend_from_slice(&PT_LOAD.to_le_bytes()); // p_type
    image.extend_from_slice(&5u32.to_le_bytes()); // p_flags (RX)
    image.extend_from_slice(&0u64.to_le_bytes()); // p_offset
    image.extend_from_slice(&0u64.to_le_bytes()); // p_vaddr
    image.extend_from_slice(&0u64.to_le_bytes()); // p_paddr
    image.extend_from_slice(&total_len.to_le_bytes()); // p_filesz
    image.extend_from_slice(&total_len.to_le_bytes()); // p_memsz
    image.extend_from_slice(&8u64.to_le_bytes()); // p_align

    // PT_DYNAMIC entry pointing at the _DYNAMIC array.
    image.extend_from_slice(&PT_DYNAMIC.to_le_bytes()); // p_type
    image.extend_from_slice(&6u32.to_le_bytes()); // p_flags (RW)
    image.extend_from_slice(&(dyn_off as u64).to_le_bytes()); // p_offset
    image.extend_from_slice(&(dyn_off as u64).to_le_bytes()); // p_vaddr == p_offset
    image.extend_from_slice(&(dyn_off as u64).to_le_bytes()); // p_paddr
    image.extend_from_slice(&(dynamic.len() as u64).to_le_bytes()); // p_filesz
    image.extend_from_slice(&(dynamic.len() as u64).to_le_bytes()); // p_memsz
    image.extend_from_slice(&8u64.to_le_bytes()); // p_align
    assert_eq!(image.len(), rodata_off);

    image.extend_from_slice(rodata);
    image.extend_from_slice(&dynstr);
    image.extend_from_slice(&dynsym);
    image.extend_from_slice(&hash);
    image.extend_from_slice(&dynamic);
    image.extend_from_slice(SHSTRTAB);

    // Section headers: null, .rodata, .dynstr, .dynsym, .shstrtab
    push_shdr(&mut image, 0, 0, 0, 0, 0, 0, 0, 0, 0);
    push_shdr(
        &mut image,
        NAME_RODATA,
        SHT_PROGBITS,
        2,
        rodata_off as u64,
        rodata.len() as u64,
        0,
        0,
        1,
        0,
    );
    push_shdr(
        &mut image,
        NAME_DYNSTR,
        SHT_STRTAB,
        2,
        dynstr_off as u64,
        dynstr.len() as u64,
        0,
        0,
        1,
        0,
    );
    push_shdr(
        &mut image,
        NAME_DYNSYM,
        SHT_DYNSYM,
        2,
        dynsym_off as u64,
        dynsym.len() as u64,
        2, // sh_link -> .dynstr
        1,
        8,
        SYM_SIZE as u64,
    );
    push_shdr(
        &mut image,
        NAME_SHSTRTAB,
        SHT_STRTAB,
        0,
        shstrtab_off as u64,
        SHSTRTAB.len() as u64,
        0,
        0,
        1,
        0,
    );

    image
}

#[allow(clippy::too_many_arguments)]
fn push_shdr(
    image: &mut Vec<u8>,
    name: u32,
    sh_type: u32,
    flags: u64,
    offset: u64,
    size: u64,
    link: u32,
    info: u32,
    addralign: u64,
    entsize: u64,
) {
    image.extend_from_slice(&name.to_le_bytes());
    image.extend_from_slice(&sh_type.to_le_bytes());
    image.extend_from_slice(&flags.to_le_bytes());
    image.extend_from_slice(&0u64.to_le_bytes()); // sh_addr
    image.extend_from_slice(&offset.to_le_bytes());
    image.extend_from_slice(&size.to_le_bytes());
    image.extend_from_slice(&link.to_le_bytes());
    image.extend_from_slice(&info.to_le_bytes());
    image.extend_from_slice(&addralign.to_le_bytes());
    image.extend_from_slice(&entsize.to_le_bytes());
}
