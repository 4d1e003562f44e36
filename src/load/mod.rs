//! Placement, symbol indexing, and relocation of a module. One load walks the
//! object's sections, sizes the arena from the allocated sections plus the
//! linkage scratch the relocations will consume, places every allocated
//! section, publishes the defined symbols, and then patches every relocation
//! site. The [Module] handle ties the arena and the symbol index together and
//! releases them as a unit.

use std::{ffi::c_void, fs, io::Cursor, path::Path, sync::Mutex};

use log::{debug, trace};

use crate::{
    arch::{self, PatchKind, RelocationKind},
    arena::Arena,
    base::ElfAddr,
    error::{Error, Result},
    header::ElfHeader,
    host,
    reloc::RelocationTable,
    section::{SectionHeader, Sections},
    symbol::{StringTable, Symbol, SymbolTable, SymbolType},
    Config, FromReader,
};

static LAST_ERROR: Mutex<Option<String>> = Mutex::new(None);

/// The text of the most recent load failure, if any load has failed. The slot
/// is process-wide and overwritten on every failure; it is intended for human
/// diagnostics, not for control flow.
pub fn last_error() -> Option<String> {
    LAST_ERROR.lock().ok().and_then(|slot| slot.clone())
}

fn record_failure(error: &Error) {
    if let Ok(mut slot) = LAST_ERROR.lock() {
        *slot = Some(error.to_string());
    }
}

#[derive(Debug)]
/// A loaded relocatable module. The handle owns the executable arena holding
/// the module's code and data and an index of the module's defined symbols;
/// dropping it releases both. Calls into code obtained from the handle are
/// invalid once it is dropped; upholding that is the caller's contract.
pub struct Module {
    arena: Arena,
    index: Vec<(String, usize)>,
}

impl Module {
    /// Load the relocatable object at `path` with the default configuration
    pub fn open<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        Self::open_with(path, Config::default())
    }

    /// Load the relocatable object at `path`. On failure every partially
    /// acquired resource is released and the failure text is recorded for
    /// retrieval via [last_error].
    pub fn open_with<P>(path: P, config: Config) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let result = fs::read(path.as_ref())
            .map_err(Error::from)
            .and_then(|data| Self::load(&data, &config));

        if let Err(error) = &result {
            record_failure(error);
        }

        result
    }

    fn load(data: &[u8], config: &Config) -> Result<Self> {
        let header = ElfHeader::from_reader(&mut Cursor::new(data))?;
        let sections = Sections::parse(data, &header)?;

        let symtab = SymbolTable::find(&sections).ok_or(Error::MissingSymbolTable)?;
        let mut symbols = SymbolTable::parse(data, &sections, symtab)?;
        let strings = StringTable::new(sections.contents(data, symbols.string_table())?);

        let tables = RelocationTable::collect_placed(data, &sections)?;

        // Pass 1: size the arena before mapping it. The layout must be final
        // before any address is computed, because a grown arena would
        // invalidate every address already handed out.
        let layout = placement_size(&sections, config.min_align)?;
        let scratch = linkage_scratch(&tables)?;

        debug!(
            "sizing arena: {layout} bytes of placed sections, {scratch} bytes of linkage scratch"
        );

        let capacity = layout
            .checked_add(scratch)
            .ok_or(Error::MapFailed { errno: libc::ENOMEM })?;
        let mut arena = Arena::new(capacity)?;
        let addresses = place(&mut arena, data, &sections, config.min_align)?;
        let index = build_index(&mut symbols, &strings, &addresses)?;

        // Pass 2: resolve and patch.
        relocate(
            &mut arena, &sections, &symbols, &strings, &addresses, &tables, config,
        )?;

        debug!(
            "loaded module: {} symbols indexed, {}/{} arena bytes used",
            index.len(),
            arena.used(),
            arena.capacity()
        );

        Ok(Self { arena, index })
    }

    /// The address of the named symbol, callable for a function symbol and
    /// readable/writable for a data symbol, or `None` if the module does not
    /// define it. The match is exact and case-sensitive.
    pub fn symbol(&self, name: &str) -> Option<*mut c_void> {
        self.index
            .iter()
            .find(|(indexed, _)| indexed == name)
            .map(|(_, address)| *address as *mut c_void)
    }

    /// The named symbol reinterpreted as `T`, typically a function pointer
    /// type
    ///
    /// # Safety
    ///
    /// `T` must be a pointer-sized function or data pointer type matching the
    /// symbol's actual definition; calling through a mismatched type is
    /// undefined behavior.
    pub unsafe fn symbol_as<T>(&self, name: &str) -> Option<T>
    where
        T: Copy,
    {
        self.symbol(name)
            .map(|address| std::mem::transmute_copy(&address))
    }

    /// Iterate over the module's defined symbols and their addresses
    pub fn symbols(&self) -> impl Iterator<Item = (&str, usize)> {
        self.index
            .iter()
            .map(|(name, address)| (name.as_str(), *address))
    }

    /// The address range of the module's executable arena
    pub fn address_range(&self) -> std::ops::Range<usize> {
        self.arena.base()..self.arena.base() + self.arena.capacity()
    }

    /// Release the arena and the symbol index. Equivalent to dropping the
    /// handle; provided for symmetry with the classic three-call contract.
    pub fn close(self) {}
}

fn effective_align(section: &SectionHeader, min_align: usize) -> u64 {
    (section.addralign.0).max(min_align as u64).max(1)
}

/// Simulate the placement pass to learn how many bytes the allocated sections
/// will consume. The arena mapping is page-aligned, so a cursor simulated
/// from zero produces the same padding as the real pass.
fn placement_size(sections: &Sections, min_align: usize) -> Result<usize> {
    let mut cursor = 0u64;

    for (_, section) in sections.iter() {
        if !section.is_alloc() {
            continue;
        }

        cursor = cursor
            .checked_next_multiple_of(effective_align(section, min_align))
            .and_then(|aligned| aligned.checked_add(section.size.0))
            .ok_or(Error::MapFailed { errno: libc::ENOMEM })?;
    }

    usize::try_from(cursor).map_err(|_| Error::MapFailed { errno: libc::ENOMEM })
}

/// Sum the linkage scratch every relocation will consume. Nothing is resolved
/// and nothing is patched here; only the kind of each entry is interpreted,
/// so an unknown relocation kind fails the load before any memory is mapped.
fn linkage_scratch(tables: &[RelocationTable]) -> Result<usize> {
    let mut total = 0;

    for table in tables {
        for entry in &table.entries {
            total += RelocationKind::decode(entry.kind)?.scratch_size();
        }
    }

    Ok(total)
}

/// Walk the sections in index order and give every allocated section a base
/// address in the arena: program bits are copied in, zero-initialized
/// sections are left as the mapping's zero fill. Returns the placement map
/// from section index to base address.
fn place(
    arena: &mut Arena,
    data: &[u8],
    sections: &Sections,
    min_align: usize,
) -> Result<Vec<usize>> {
    let mut addresses = vec![0; sections.len()];

    for (index, section) in sections.iter() {
        if !section.is_alloc() {
            continue;
        }

        arena.align_to(effective_align(section, min_align) as usize);

        let size = usize::try_from(section.size.0)
            .map_err(|_| Error::MapFailed { errno: libc::ENOMEM })?;
        let address = arena.allocate(size)?;

        if section.has_file_contents() {
            let contents = sections.contents(data, index)?;

            // SAFETY: the destination range was just allocated from the live
            // arena mapping and the source slice is bounds-checked against
            // the input buffer.
            unsafe {
                std::ptr::copy_nonoverlapping(
                    contents.as_ptr(),
                    address as *mut u8,
                    contents.len(),
                );
            }
        }

        trace!("placed section {index} at {address:#x} ({size} bytes)");
        addresses[index] = address;
    }

    Ok(addresses)
}

/// Publish every defined function and data symbol: compute its absolute
/// address from the placement map, rewrite the symbol record's value field so
/// relocations can consume the record directly, and append an owned-name
/// entry to the index.
fn build_index(
    symbols: &mut SymbolTable,
    strings: &StringTable<'_>,
    addresses: &[usize],
) -> Result<Vec<(String, usize)>> {
    let mut index = Vec::new();

    for symbol in symbols.iter_mut() {
        if !matches!(
            symbol.symbol_type(),
            Some(SymbolType::Func) | Some(SymbolType::Object)
        ) {
            continue;
        }

        if symbol.is_undefined() || symbol.has_reserved_section() {
            continue;
        }

        let section = symbol.section();
        let base = addresses
            .get(section)
            .copied()
            .ok_or(Error::InvalidSectionIndex { index: section })?;
        let address = base.wrapping_add(symbol.value.0 as usize);

        symbol.value = ElfAddr(address as u64);

        let name = strings.get(u64::from(symbol.name.0))?;
        trace!("indexed {name} at {address:#x}");
        index.push((name.to_string(), address));
    }

    Ok(index)
}

/// Resolve the address a relocation's referent symbol contributes to the
/// patch value
fn resolve_symbol(
    symbol: &Symbol,
    strings: &StringTable<'_>,
    addresses: &[usize],
    config: &Config,
) -> Result<usize> {
    match symbol.symbol_type() {
        Some(SymbolType::Section) => section_base(symbol, addresses),
        // Defined function and data symbols already carry their absolute
        // address after the index pass.
        Some(SymbolType::Func) | Some(SymbolType::Object) => Ok(symbol.value.0 as usize),
        Some(SymbolType::NoType) if !symbol.is_undefined() => section_base(symbol, addresses),
        Some(SymbolType::NoType) => {
            let name = strings.get(u64::from(symbol.name.0))?;
            let resolve = config.resolver.unwrap_or(host::resolve);
            let address = resolve(name).ok_or_else(|| Error::UnresolvedSymbol {
                name: name.to_string(),
            })?;

            trace!("resolved {name} to host address {address:#x}");
            Ok(address)
        }
        _ => Err(Error::UnsupportedSymbolType {
            value: symbol.raw_type(),
        }),
    }
}

fn section_base(symbol: &Symbol, addresses: &[usize]) -> Result<usize> {
    let index = symbol.section();

    if symbol.has_reserved_section() {
        return Err(Error::InvalidSectionIndex { index });
    }

    addresses
        .get(index)
        .copied()
        .ok_or(Error::InvalidSectionIndex { index })
}

/// Pass 2: walk every relocation table whose target section was placed and
/// patch each site, synthesizing jump and address slots in the arena where a
/// PC-relative displacement could not otherwise reach its referent.
fn relocate(
    arena: &mut Arena,
    sections: &Sections,
    symbols: &SymbolTable,
    strings: &StringTable<'_>,
    addresses: &[usize],
    tables: &[RelocationTable],
    config: &Config,
) -> Result<()> {
    for table in tables {
        let target = sections.get(table.target)?;
        let base = addresses
            .get(table.target)
            .copied()
            .ok_or(Error::InvalidSectionIndex { index: table.target })?;

        for entry in &table.entries {
            let kind = RelocationKind::decode(entry.kind)?;
            let width = kind.patch_width() as u64;

            if entry.offset.saturating_add(width) > target.size.0 {
                return Err(Error::PatchSiteOutOfBounds {
                    offset: entry.offset,
                    size: width,
                    len: target.size.0,
                });
            }

            let site = base + entry.offset as usize;
            let symbol = symbols.get(entry.symbol)?;
            let resolved = resolve_symbol(symbol, strings, addresses, config)?;

            trace!(
                "relocating {kind:?} at {site:#x} against {resolved:#x}{:+}",
                entry.addend
            );

            apply(arena, kind, site, resolved, entry.addend)?;
        }
    }

    Ok(())
}

fn apply(
    arena: &mut Arena,
    kind: RelocationKind,
    site: usize,
    resolved: usize,
    addend: i64,
) -> Result<()> {
    match kind.patch_kind() {
        PatchKind::Absolute64 => {
            // SAFETY: the site was bounds-checked against its placed section.
            unsafe { patch64(site, (resolved as u64).wrapping_add(addend as u64)) };
        }
        PatchKind::Absolute32 => {
            // SAFETY: as above.
            unsafe { patch32(site, (resolved as u64).wrapping_add(addend as u64)) };
        }
        PatchKind::Relative32 => {
            // SAFETY: as above.
            unsafe { patch32(site, displacement(resolved, site, addend)) };
        }
        PatchKind::PltCall => {
            let slot = arena.allocate(arch::JUMP_SLOT_SIZE)?;

            // SAFETY: the slot was just allocated with the jump slot's size
            // and the site was bounds-checked against its placed section.
            unsafe {
                arch::emit_jump_slot(slot as *mut u8, resolved);
                patch32(site, displacement(slot, site, addend));
            }

            trace!("synthesized jump slot at {slot:#x} for {resolved:#x}");
        }
        PatchKind::GotLoad => {
            let slot = arena.allocate(arch::GOT_SLOT_SIZE)?;

            // SAFETY: the slot was just allocated with the address slot's
            // size and the site was bounds-checked against its placed
            // section.
            unsafe {
                std::ptr::write_unaligned(slot as *mut usize, resolved);
                patch32(site, displacement(slot, site, addend));
            }

            trace!("materialized address slot at {slot:#x} holding {resolved:#x}");
        }
    }

    Ok(())
}

fn displacement(to: usize, from: usize, addend: i64) -> u64 {
    (to as u64).wrapping_sub(from as u64).wrapping_add(addend as u64)
}

/// Add `value` to the 32-bit quantity at `site`, preserving any pre-stored
/// implicit addend.
///
/// # Safety
///
/// `site` must be valid for an unaligned 4-byte read and write.
unsafe fn patch32(site: usize, value: u64) {
    let site = site as *mut u32;
    let existing = std::ptr::read_unaligned(site);
    std::ptr::write_unaligned(site, existing.wrapping_add(value as u32));
}

/// Add `value` to the 64-bit quantity at `site`, preserving any pre-stored
/// implicit addend.
///
/// # Safety
///
/// `site` must be valid for an unaligned 8-byte read and write.
unsafe fn patch64(site: usize, value: u64) {
    let site = site as *mut u64;
    let existing = std::ptr::read_unaligned(site);
    std::ptr::write_unaligned(site, existing.wrapping_add(value));
}
