//! End-to-end scenarios over synthesized relocatable objects. Each test
//! assembles a minimal ET_REL image in memory with hand-encoded x86_64
//! machine code, writes it to a temporary file, loads it, and drives the
//! loaded code or inspects the patched bytes.

#![cfg(all(target_arch = "x86_64", target_os = "linux"))]
#![allow(clippy::unwrap_used)]

use std::{
    io::Write,
    sync::{Mutex, MutexGuard},
};

use objload::{last_error, Config, Error, Module};

const SHT_PROGBITS: u32 = 1;
const SHT_SYMTAB: u32 = 2;
const SHT_STRTAB: u32 = 3;
const SHT_RELA: u32 = 4;
const SHT_NOBITS: u32 = 8;
const SHT_REL: u32 = 9;

const SHF_WRITE: u64 = 0x1;
const SHF_ALLOC: u64 = 0x2;
const SHF_EXECINSTR: u64 = 0x4;

const STT_NOTYPE: u8 = 0;
const STT_OBJECT: u8 = 1;
const STT_FUNC: u8 = 2;
const STT_FILE: u8 = 4;
const STB_GLOBAL: u8 = 1;

const R_X86_64_64: u32 = 1;
const R_X86_64_PC32: u32 = 2;
const R_X86_64_PLT32: u32 = 4;
const R_X86_64_GOTPCREL: u32 = 9;
const R_X86_64_32: u32 = 10;

/// Serializes the tests in this binary: several of them assert against the
/// process-wide memory map and the process-wide last-error slot.
static TEST_LOCK: Mutex<()> = Mutex::new(());

fn lock() -> MutexGuard<'static, ()> {
    let _ = env_logger::builder().is_test(true).try_init();
    TEST_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn global(r#type: u8) -> u8 {
    (STB_GLOBAL << 4) | r#type
}

struct Section {
    r#type: u32,
    flags: u64,
    data: Vec<u8>,
    memory_size: u64,
    link: u32,
    info: u32,
    addralign: u64,
    entsize: u64,
}

struct Symbol {
    name: String,
    info: u8,
    section: u16,
    value: u64,
}

/// Assembles a minimal relocatable object image: user sections first, then
/// the symbol table, its string table, and one relocation section per target.
struct Object {
    sections: Vec<Section>,
    symbols: Vec<Symbol>,
    relas: Vec<(u16, Vec<(u64, u32, u32, i64)>)>,
    rels: Vec<(u16, Vec<(u64, u32, u32)>)>,
}

impl Object {
    fn new() -> Self {
        Self {
            sections: vec![Section {
                r#type: 0,
                flags: 0,
                data: Vec::new(),
                memory_size: 0,
                link: 0,
                info: 0,
                addralign: 0,
                entsize: 0,
            }],
            symbols: Vec::new(),
            relas: Vec::new(),
            rels: Vec::new(),
        }
    }

    fn add_section(&mut self, r#type: u32, flags: u64, data: Vec<u8>, addralign: u64) -> u16 {
        let memory_size = data.len() as u64;
        self.sections.push(Section {
            r#type,
            flags,
            data,
            memory_size,
            link: 0,
            info: 0,
            addralign,
            entsize: 0,
        });
        (self.sections.len() - 1) as u16
    }

    fn add_nobits(&mut self, size: u64, addralign: u64) -> u16 {
        let index = self.add_section(SHT_NOBITS, SHF_ALLOC | SHF_WRITE, Vec::new(), addralign);
        self.sections[usize::from(index)].memory_size = size;
        index
    }

    /// Returns the symbol's index in the final table, which starts with the
    /// mandatory null entry.
    fn add_symbol(&mut self, name: &str, info: u8, section: u16, value: u64) -> u32 {
        self.symbols.push(Symbol {
            name: name.to_string(),
            info,
            section,
            value,
        });
        self.symbols.len() as u32
    }

    fn add_rela(&mut self, target: u16, offset: u64, symbol: u32, kind: u32, addend: i64) {
        if let Some((_, entries)) = self.relas.iter_mut().find(|(t, _)| *t == target) {
            entries.push((offset, symbol, kind, addend));
        } else {
            self.relas
                .push((target, vec![(offset, symbol, kind, addend)]));
        }
    }

    fn add_rel(&mut self, target: u16, offset: u64, symbol: u32, kind: u32) {
        if let Some((_, entries)) = self.rels.iter_mut().find(|(t, _)| *t == target) {
            entries.push((offset, symbol, kind));
        } else {
            self.rels.push((target, vec![(offset, symbol, kind)]));
        }
    }

    fn build(&self) -> Vec<u8> {
        let mut strtab = vec![0u8];
        let mut symtab = vec![0u8; 24];

        for symbol in &self.symbols {
            let name_offset = strtab.len() as u32;
            strtab.extend_from_slice(symbol.name.as_bytes());
            strtab.push(0);

            symtab.extend_from_slice(&name_offset.to_le_bytes());
            symtab.push(symbol.info);
            symtab.push(0);
            symtab.extend_from_slice(&symbol.section.to_le_bytes());
            symtab.extend_from_slice(&symbol.value.to_le_bytes());
            symtab.extend_from_slice(&0u64.to_le_bytes());
        }

        let mut sections: Vec<Section> = self
            .sections
            .iter()
            .map(|s| Section {
                r#type: s.r#type,
                flags: s.flags,
                data: s.data.clone(),
                memory_size: s.memory_size,
                link: s.link,
                info: s.info,
                addralign: s.addralign,
                entsize: s.entsize,
            })
            .collect();

        let symtab_index = sections.len() as u32;
        let memory_size = symtab.len() as u64;
        sections.push(Section {
            r#type: SHT_SYMTAB,
            flags: 0,
            data: symtab,
            memory_size,
            link: symtab_index + 1,
            info: 0,
            addralign: 8,
            entsize: 24,
        });

        let memory_size = strtab.len() as u64;
        sections.push(Section {
            r#type: SHT_STRTAB,
            flags: 0,
            data: strtab,
            memory_size,
            link: 0,
            info: 0,
            addralign: 1,
            entsize: 0,
        });

        for (target, entries) in &self.relas {
            let mut data = Vec::new();
            for (offset, symbol, kind, addend) in entries {
                data.extend_from_slice(&offset.to_le_bytes());
                data.extend_from_slice(
                    &((u64::from(*symbol) << 32) | u64::from(*kind)).to_le_bytes(),
                );
                data.extend_from_slice(&addend.to_le_bytes());
            }
            let memory_size = data.len() as u64;
            sections.push(Section {
                r#type: SHT_RELA,
                flags: 0,
                data,
                memory_size,
                link: symtab_index,
                info: u32::from(*target),
                addralign: 8,
                entsize: 24,
            });
        }

        for (target, entries) in &self.rels {
            let mut data = Vec::new();
            for (offset, symbol, kind) in entries {
                data.extend_from_slice(&offset.to_le_bytes());
                data.extend_from_slice(
                    &((u64::from(*symbol) << 32) | u64::from(*kind)).to_le_bytes(),
                );
            }
            let memory_size = data.len() as u64;
            sections.push(Section {
                r#type: SHT_REL,
                flags: 0,
                data,
                memory_size,
                link: symtab_index,
                info: u32::from(*target),
                addralign: 8,
                entsize: 16,
            });
        }

        let mut image = vec![0u8; 64];
        let mut offsets = Vec::new();

        for section in &sections {
            while image.len() % 8 != 0 {
                image.push(0);
            }
            offsets.push(image.len() as u64);
            image.extend_from_slice(&section.data);
        }

        while image.len() % 8 != 0 {
            image.push(0);
        }
        let shoff = image.len() as u64;

        for (section, offset) in sections.iter().zip(&offsets) {
            image.extend_from_slice(&0u32.to_le_bytes());
            image.extend_from_slice(&section.r#type.to_le_bytes());
            image.extend_from_slice(&section.flags.to_le_bytes());
            image.extend_from_slice(&0u64.to_le_bytes());
            image.extend_from_slice(&offset.to_le_bytes());
            image.extend_from_slice(&section.memory_size.to_le_bytes());
            image.extend_from_slice(&section.link.to_le_bytes());
            image.extend_from_slice(&section.info.to_le_bytes());
            image.extend_from_slice(&section.addralign.to_le_bytes());
            image.extend_from_slice(&section.entsize.to_le_bytes());
        }

        image[0..4].copy_from_slice(&[0x7f, b'E', b'L', b'F']);
        image[4] = 2;
        image[5] = 1;
        image[6] = 1;
        image[16..18].copy_from_slice(&1u16.to_le_bytes());
        image[18..20].copy_from_slice(&62u16.to_le_bytes());
        image[20..24].copy_from_slice(&1u32.to_le_bytes());
        image[40..48].copy_from_slice(&shoff.to_le_bytes());
        image[52..54].copy_from_slice(&64u16.to_le_bytes());
        image[58..60].copy_from_slice(&64u16.to_le_bytes());
        image[60..62].copy_from_slice(&(sections.len() as u16).to_le_bytes());

        image
    }

    fn write(&self) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&self.build()).unwrap();
        file.flush().unwrap();
        file
    }

    fn open(&self) -> Result<(Module, tempfile::NamedTempFile), Error> {
        let file = self.write();
        Module::open(file.path()).map(|module| (module, file))
    }
}

/// Read `len` bytes at `address`, which must lie inside a loaded module's
/// arena.
unsafe fn read_bytes(address: usize, len: usize) -> Vec<u8> {
    std::slice::from_raw_parts(address as *const u8, len).to_vec()
}

fn rwx_mappings() -> Vec<String> {
    std::fs::read_to_string("/proc/self/maps")
        .unwrap()
        .lines()
        .filter(|line| line.contains("rwxp"))
        .map(|line| line.to_string())
        .collect()
}

fn mapping_covers(line: &str, range: &std::ops::Range<usize>) -> bool {
    let Some((span, _)) = line.split_once(' ') else {
        return false;
    };
    let Some((start, end)) = span.split_once('-') else {
        return false;
    };
    let (Ok(start), Ok(end)) = (
        usize::from_str_radix(start, 16),
        usize::from_str_radix(end, 16),
    ) else {
        return false;
    };

    start <= range.start && range.end <= end
}

#[test]
fn test_add_one() {
    let _guard = lock();

    let mut object = Object::new();
    // lea eax, [rdi + 1]; ret
    let text = object.add_section(
        SHT_PROGBITS,
        SHF_ALLOC | SHF_EXECINSTR,
        vec![0x8d, 0x47, 0x01, 0xc3],
        16,
    );
    object.add_symbol("add1", global(STT_FUNC), text, 0);

    let (module, _file) = object.open().unwrap();
    let add1: extern "C" fn(i32) -> i32 = unsafe { module.symbol_as("add1") }.unwrap();

    assert_eq!(add1(41), 42);
    assert!(module.symbol("missing").is_none());
}

#[test]
fn test_reopen_after_close() {
    let _guard = lock();

    let mut object = Object::new();
    let text = object.add_section(
        SHT_PROGBITS,
        SHF_ALLOC | SHF_EXECINSTR,
        vec![0x8d, 0x47, 0x01, 0xc3],
        16,
    );
    object.add_symbol("add1", global(STT_FUNC), text, 0);

    let file = object.write();

    let module = Module::open(file.path()).unwrap();
    let first = module.symbol("add1").unwrap();
    assert!(!first.is_null());
    module.close();

    let module = Module::open(file.path()).unwrap();
    let add1: extern "C" fn(i32) -> i32 = unsafe { module.symbol_as("add1") }.unwrap();
    assert_eq!(add1(-1), 0);
}

#[test]
fn test_cross_section_call() {
    let _guard = lock();

    let mut object = Object::new();
    // mov eax, 7; ret
    let callee = object.add_section(
        SHT_PROGBITS,
        SHF_ALLOC | SHF_EXECINSTR,
        vec![0xb8, 0x07, 0x00, 0x00, 0x00, 0xc3],
        16,
    );
    // call rel32; ret
    let caller = object.add_section(
        SHT_PROGBITS,
        SHF_ALLOC | SHF_EXECINSTR,
        vec![0xe8, 0x00, 0x00, 0x00, 0x00, 0xc3],
        16,
    );

    let seven = object.add_symbol("seven", global(STT_FUNC), callee, 0);
    object.add_symbol("call_seven", global(STT_FUNC), caller, 0);
    object.add_rela(caller, 1, seven, R_X86_64_PC32, -4);

    let (module, _file) = object.open().unwrap();
    let call_seven: extern "C" fn() -> i32 =
        unsafe { module.symbol_as("call_seven") }.unwrap();

    assert_eq!(call_seven(), 7);

    // The displacement written at the patch site, added to the end of the
    // call instruction, lands exactly on the callee.
    let site = module.symbol("call_seven").unwrap() as usize + 1;
    let displacement = i32::from_le_bytes(unsafe { read_bytes(site, 4) }.try_into().unwrap());
    let landing = (site as i64 + 4 + i64::from(displacement)) as usize;
    assert_eq!(landing, module.symbol("seven").unwrap() as usize);
}

#[test]
fn test_host_symbol_call_through_jump_slot() {
    let _guard = lock();

    let mut object = Object::new();
    // jmp rel32 (tail call into the host's strlen)
    let text = object.add_section(
        SHT_PROGBITS,
        SHF_ALLOC | SHF_EXECINSTR,
        vec![0xe9, 0x00, 0x00, 0x00, 0x00],
        16,
    );
    let strlen = object.add_symbol("strlen", STT_NOTYPE, 0, 0);
    object.add_symbol("length", global(STT_FUNC), text, 0);
    object.add_rela(text, 1, strlen, R_X86_64_PLT32, -4);

    let (module, _file) = object.open().unwrap();
    let length: extern "C" fn(*const libc::c_char) -> usize =
        unsafe { module.symbol_as("length") }.unwrap();

    assert_eq!(length(b"hello\0".as_ptr().cast()), 5);

    // The patched displacement lands on a jump slot inside the arena whose
    // embedded target is exactly the host address of strlen.
    let site = module.symbol("length").unwrap() as usize + 1;
    let displacement = i32::from_le_bytes(unsafe { read_bytes(site, 4) }.try_into().unwrap());
    let slot = (site as i64 + 4 + i64::from(displacement)) as usize;
    assert!(module.address_range().contains(&slot));

    let embedded = u64::from_le_bytes(unsafe { read_bytes(slot + 6, 8) }.try_into().unwrap());
    assert_eq!(embedded as usize, objload::host::resolve("strlen").unwrap());
}

#[test]
fn test_got_relative_load() {
    let _guard = lock();

    let mut object = Object::new();
    let data = object.add_section(
        SHT_PROGBITS,
        SHF_ALLOC | SHF_WRITE,
        42u64.to_le_bytes().to_vec(),
        16,
    );
    // mov rax, [rip + disp]; mov rax, [rax]; ret
    let text = object.add_section(
        SHT_PROGBITS,
        SHF_ALLOC | SHF_EXECINSTR,
        vec![
            0x48, 0x8b, 0x05, 0x00, 0x00, 0x00, 0x00, 0x48, 0x8b, 0x00, 0xc3,
        ],
        16,
    );

    let value = object.add_symbol("value", global(STT_OBJECT), data, 0);
    object.add_symbol("get_value", global(STT_FUNC), text, 0);
    object.add_rela(text, 3, value, R_X86_64_GOTPCREL, -4);

    let (module, _file) = object.open().unwrap();
    let get_value: extern "C" fn() -> u64 = unsafe { module.symbol_as("get_value") }.unwrap();

    assert_eq!(get_value(), 42);
}

#[test]
fn test_bss_is_zero_filled() {
    let _guard = lock();

    let mut object = Object::new();
    let bss = object.add_nobits(4096, 16);
    object.add_symbol("buffer", global(STT_OBJECT), bss, 0);

    let (module, _file) = object.open().unwrap();
    let buffer = module.symbol("buffer").unwrap() as usize;

    assert!(module.address_range().contains(&buffer));
    assert!(unsafe { read_bytes(buffer, 4096) }.iter().all(|b| *b == 0));
}

#[test]
fn test_absolute_relocation_in_data() {
    let _guard = lock();

    let mut object = Object::new();
    let target = object.add_section(SHT_PROGBITS, SHF_ALLOC | SHF_WRITE, vec![0u8; 16], 16);
    let pointers = object.add_section(SHT_PROGBITS, SHF_ALLOC | SHF_WRITE, vec![0u8; 8], 16);

    let cell = object.add_symbol("cell", global(STT_OBJECT), target, 0);
    object.add_symbol("pointer", global(STT_OBJECT), pointers, 0);
    object.add_rela(pointers, 0, cell, R_X86_64_64, 8);

    let (module, _file) = object.open().unwrap();
    let pointer = module.symbol("pointer").unwrap() as usize;
    let cell = module.symbol("cell").unwrap() as usize;

    let stored = u64::from_le_bytes(unsafe { read_bytes(pointer, 8) }.try_into().unwrap());
    assert_eq!(stored as usize, cell + 8);
}

#[test]
fn test_implicit_addend_survives_patching() {
    let _guard = lock();

    let mut object = Object::new();
    let target = object.add_section(SHT_PROGBITS, SHF_ALLOC | SHF_WRITE, vec![0u8; 16], 16);
    // The pre-stored five is the REL form's implicit addend.
    let pointers = object.add_section(
        SHT_PROGBITS,
        SHF_ALLOC | SHF_WRITE,
        5u64.to_le_bytes().to_vec(),
        16,
    );

    let cell = object.add_symbol("cell", global(STT_OBJECT), target, 0);
    object.add_symbol("pointer", global(STT_OBJECT), pointers, 0);
    object.add_rel(pointers, 0, cell, R_X86_64_64);

    let (module, _file) = object.open().unwrap();
    let pointer = module.symbol("pointer").unwrap() as usize;
    let cell = module.symbol("cell").unwrap() as usize;

    let stored = u64::from_le_bytes(unsafe { read_bytes(pointer, 8) }.try_into().unwrap());
    assert_eq!(stored as usize, cell + 5);
}

#[test]
fn test_placement_is_disjoint_and_aligned() {
    let _guard = lock();

    let mut object = Object::new();
    let mut names = Vec::new();

    for (index, size) in [7usize, 100, 16, 33].into_iter().enumerate() {
        let section = object.add_section(SHT_PROGBITS, SHF_ALLOC | SHF_WRITE, vec![0xaa; size], 1);
        let name = format!("section_{index}");
        object.add_symbol(&name, global(STT_OBJECT), section, 0);
        names.push((name, size));
    }

    let (module, _file) = object.open().unwrap();

    let mut ranges = Vec::new();
    for (name, size) in &names {
        let base = module.symbol(name).unwrap() as usize;
        assert_eq!(base % 16, 0, "{name} is underaligned");
        assert!(module.address_range().contains(&base));
        ranges.push(base..base + size);
    }

    for (i, a) in ranges.iter().enumerate() {
        for b in ranges.iter().skip(i + 1) {
            assert!(a.end <= b.start || b.end <= a.start, "{a:?} overlaps {b:?}");
        }
    }
}

#[test]
fn test_symbol_addresses_are_section_relative() {
    let _guard = lock();

    let mut object = Object::new();
    let data = object.add_section(SHT_PROGBITS, SHF_ALLOC | SHF_WRITE, (0u8..64).collect(), 16);
    object.add_symbol("base", global(STT_OBJECT), data, 0);
    object.add_symbol("offset_24", global(STT_OBJECT), data, 24);

    let (module, _file) = object.open().unwrap();
    let base = module.symbol("base").unwrap() as usize;
    let offset = module.symbol("offset_24").unwrap() as usize;

    assert_eq!(offset, base + 24);
    assert_eq!(module.symbols().count(), 2);
}

#[test]
fn test_unresolved_symbol_fails_and_is_reported() {
    let _guard = lock();

    let baseline = rwx_mappings();

    let mut object = Object::new();
    let text = object.add_section(
        SHT_PROGBITS,
        SHF_ALLOC | SHF_EXECINSTR,
        vec![0xe8, 0x00, 0x00, 0x00, 0x00, 0xc3],
        16,
    );
    let missing = object.add_symbol("definitely_missing_symbol", STT_NOTYPE, 0, 0);
    object.add_symbol("broken", global(STT_FUNC), text, 0);
    object.add_rela(text, 1, missing, R_X86_64_PLT32, -4);

    let error = object.open().err().unwrap();
    assert_eq!(
        error,
        Error::UnresolvedSymbol {
            name: "definitely_missing_symbol".to_string()
        }
    );
    assert!(last_error().unwrap().contains("definitely_missing_symbol"));

    // No executable mapping survives a failed load.
    assert_eq!(rwx_mappings(), baseline);
}

#[test]
fn test_resolver_override() {
    let _guard = lock();

    extern "C" fn nine() -> i32 {
        9
    }

    fn resolve(name: &str) -> Option<usize> {
        (name == "provided").then_some(nine as usize)
    }

    let mut object = Object::new();
    let text = object.add_section(
        SHT_PROGBITS,
        SHF_ALLOC | SHF_EXECINSTR,
        vec![0xe9, 0x00, 0x00, 0x00, 0x00],
        16,
    );
    let provided = object.add_symbol("provided", STT_NOTYPE, 0, 0);
    object.add_symbol("call_provided", global(STT_FUNC), text, 0);
    object.add_rela(text, 1, provided, R_X86_64_PLT32, -4);

    let file = object.write();
    let module =
        Module::open_with(file.path(), Config::builder().resolver(resolve).build()).unwrap();

    let call_provided: extern "C" fn() -> i32 =
        unsafe { module.symbol_as("call_provided") }.unwrap();
    assert_eq!(call_provided(), 9);
}

#[test]
fn test_unknown_relocation_kind_is_fatal() {
    let _guard = lock();

    let baseline = rwx_mappings();

    let mut object = Object::new();
    let text = object.add_section(SHT_PROGBITS, SHF_ALLOC | SHF_EXECINSTR, vec![0u8; 8], 16);
    let symbol = object.add_symbol("x", global(STT_FUNC), text, 0);
    object.add_rela(text, 0, symbol, 0xdead, 0);

    assert_eq!(
        object.open().err().unwrap(),
        Error::UnknownRelocation { value: 0xdead }
    );
    assert_eq!(rwx_mappings(), baseline);
}

#[test]
fn test_unsupported_symbol_type_is_fatal() {
    let _guard = lock();

    let mut object = Object::new();
    let text = object.add_section(SHT_PROGBITS, SHF_ALLOC | SHF_EXECINSTR, vec![0u8; 8], 16);
    let file_symbol = object.add_symbol("input.c", global(STT_FILE), text, 0);
    object.add_rela(text, 0, file_symbol, R_X86_64_32, 0);

    assert_eq!(
        object.open().err().unwrap(),
        Error::UnsupportedSymbolType { value: STT_FILE }
    );
}

#[test]
fn test_not_elf_is_reported() {
    let _guard = lock();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"definitely not an object").unwrap();
    file.flush().unwrap();

    let error = Module::open(file.path()).err().unwrap();
    assert!(matches!(error, Error::NotElf { .. }));
    assert!(last_error().unwrap().contains("Not an ELF"));
}

#[test]
fn test_missing_file_is_reported() {
    let _guard = lock();

    let error = Module::open("/nonexistent/definitely/missing.o")
        .err()
        .unwrap();
    assert!(matches!(error, Error::Io { .. }));
}

#[test]
fn test_truncated_section_table_is_fatal() {
    let _guard = lock();

    let mut object = Object::new();
    let text = object.add_section(SHT_PROGBITS, SHF_ALLOC | SHF_EXECINSTR, vec![0xc3], 16);
    object.add_symbol("stub", global(STT_FUNC), text, 0);

    let mut image = object.build();
    image.truncate(image.len() - 32);

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&image).unwrap();
    file.flush().unwrap();

    assert!(matches!(
        Module::open(file.path()).err().unwrap(),
        Error::Truncated { .. }
    ));
}

#[test]
fn test_close_releases_the_arena() {
    let _guard = lock();

    let mut object = Object::new();
    let text = object.add_section(
        SHT_PROGBITS,
        SHF_ALLOC | SHF_EXECINSTR,
        vec![0x8d, 0x47, 0x01, 0xc3],
        16,
    );
    object.add_symbol("add1", global(STT_FUNC), text, 0);

    let baseline = rwx_mappings();
    let (module, _file) = object.open().unwrap();
    let range = module.address_range();

    assert!(rwx_mappings().iter().any(|line| mapping_covers(line, &range)));

    module.close();
    assert!(!rwx_mappings().iter().any(|line| mapping_covers(line, &range)));
    assert_eq!(rwx_mappings(), baseline);
}
