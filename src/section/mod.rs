//! Implementation of the ELF section header and the section header table.
//! Sections are the unit the loader works in: code and data sections are
//! placed into the arena, and the symbol, string, and relocation tables are
//! consulted in place from the input buffer.

use std::io::{Cursor, Read, Seek, SeekFrom};

use bitflags::bitflags;
use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::FromPrimitive;

use crate::{
    base::{ElfAddr, ElfOff, ElfSize, ElfWord},
    error::Error,
    header::ElfHeader,
    EncodedSize, FromReader,
};

#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[non_exhaustive]
/// The type of an ELF section
pub enum SectionType {
    /// Marks the section header as inactive; it does not have an associated
    /// section.
    Null = 0,
    /// Holds information defined by the program, whose format and meaning are
    /// determined solely by the program. Copied into the arena when the
    /// section is allocated.
    ProgramBits = 1,
    /// Holds a symbol table providing symbols for link editing. An object may
    /// have only one section of this type.
    SymbolTable = 2,
    /// Holds a string table. An object file may have multiple string table
    /// sections.
    StringTable = 3,
    /// Holds relocation entries with explicit addends (`Elf32_Rela` /
    /// `Elf64_Rela`). An object file may have multiple relocation sections.
    RelocationExplicit = 4,
    /// Holds a symbol hash table.
    Hash = 5,
    /// Holds information for dynamic linking.
    Dynamic = 6,
    /// Holds information that marks the file in some way.
    Note = 7,
    /// A section of this type occupies no space in the file but otherwise
    /// resembles [SectionType::ProgramBits]. Zero-filled in the arena when
    /// allocated.
    NoBits = 8,
    /// Holds relocation entries without explicit addends (`Elf32_Rel` /
    /// `Elf64_Rel`); the addend is pre-stored at the patch site.
    RelocationImplicit = 9,
    /// Reserved with unspecified semantics.
    SectionHeaderLibrary = 10,
    /// Holds the minimal set of dynamic linking symbols.
    DynamicSymbol = 11,
    /// Contains an array of pointers to initialization functions.
    InitializerArray = 14,
    /// Contains an array of pointers to termination functions.
    FinalizerArray = 15,
    /// Contains an array of pointers to functions invoked before all other
    /// initialization functions.
    PreInitializerArray = 16,
    /// Defines a section group, a set of sections that must be treated
    /// specially by the linker.
    Group = 17,
    /// Holds extended section indexes for an associated symbol table.
    SymbolTableSectionHeaderIndex = 18,
    /// RELR relative relocations.
    RelR = 19,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    /// One-bit attribute flags of an ELF section
    pub struct SectionFlags: u64 {
        /// The section contains data that should be writable during process
        /// execution
        const WRITE = 0x1;
        /// The section occupies memory during process execution; the loader
        /// places exactly the sections carrying this flag into the arena
        const ALLOC = 0x2;
        /// The section contains executable machine instructions
        const EXECINSTR = 0x4;
        /// The data in the section may be merged to eliminate duplication
        const MERGE = 0x10;
        /// The data in the section consists of null-terminated strings
        const STRINGS = 0x20;
        /// The `sh_info` field of this section header holds a section index
        const INFO_LINK = 0x40;
        /// Special ordering requirements for link editors
        const LINK_ORDER = 0x80;
        /// OS-specific processing is required beyond the standard rules
        const OS_NONCONFORMING = 0x100;
        /// The section is a member of a section group
        const GROUP = 0x200;
        /// The section holds thread-local storage
        const TLS = 0x400;
        /// The section contains compressed data
        const COMPRESSED = 0x800;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// An entry of the section header table
pub struct SectionHeader {
    /// The name of the section as an index into the section name string table
    pub name: ElfWord,
    /// The raw type of the section; see [SectionHeader::section_type]
    pub r#type: ElfWord,
    /// The raw attribute flags of the section; see [SectionHeader::flags]
    pub flags: ElfSize,
    /// The address of the section in the first byte of the section's memory
    /// image, zero in relocatable objects until the loader assigns one
    pub addr: ElfAddr,
    /// The file offset of the section's contents
    pub offset: ElfOff,
    /// The size of the section in bytes. A [SectionType::NoBits] section
    /// occupies no file space but still occupies `size` bytes of memory.
    pub size: ElfSize,
    /// A section header table index link whose interpretation depends on the
    /// section type; for a symbol table, the index of its string table
    pub link: ElfWord,
    /// Extra information whose interpretation depends on the section type;
    /// for a relocation section, the index of the section the relocations
    /// apply to
    pub info: ElfWord,
    /// The address alignment constraint of the section
    pub addralign: ElfSize,
    /// The size in bytes of each entry, for sections holding a table of
    /// fixed-size entries
    pub entsize: ElfSize,
}

impl SectionHeader {
    /// The type of the section, if it is a known type
    pub fn section_type(&self) -> Option<SectionType> {
        SectionType::from_u32(self.r#type.0)
    }

    /// The attribute flags of the section, retaining unknown bits
    pub fn flags(&self) -> SectionFlags {
        SectionFlags::from_bits_retain(self.flags.0)
    }

    /// Whether the section occupies memory during execution
    pub fn is_alloc(&self) -> bool {
        self.flags().contains(SectionFlags::ALLOC)
    }

    /// Whether the section's memory image is present in the file
    pub fn has_file_contents(&self) -> bool {
        self.section_type() != Some(SectionType::NoBits)
    }
}

impl<R> FromReader<R> for SectionHeader
where
    R: Read + Seek,
{
    type Error = Error;

    fn from_reader(reader: &mut R) -> Result<Self, Self::Error> {
        Ok(Self {
            name: ElfWord::from_reader(reader)?,
            r#type: ElfWord::from_reader(reader)?,
            flags: ElfSize::from_reader(reader)?,
            addr: ElfAddr::from_reader(reader)?,
            offset: ElfOff::from_reader(reader)?,
            size: ElfSize::from_reader(reader)?,
            link: ElfWord::from_reader(reader)?,
            info: ElfWord::from_reader(reader)?,
            addralign: ElfSize::from_reader(reader)?,
            entsize: ElfSize::from_reader(reader)?,
        })
    }
}

impl EncodedSize for SectionHeader {
    const SIZE: usize = ElfWord::SIZE * 2
        + ElfSize::SIZE
        + ElfAddr::SIZE
        + ElfOff::SIZE
        + ElfSize::SIZE
        + ElfWord::SIZE * 2
        + ElfSize::SIZE * 2;
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// The decoded section header table of an object
pub struct Sections {
    headers: Vec<SectionHeader>,
}

impl Sections {
    /// Decode the section header table described by `header` from the input
    /// buffer, validating that the whole table lies inside the buffer
    pub fn parse(data: &[u8], header: &ElfHeader) -> Result<Self, Error> {
        let count = usize::from(header.section_header_count.0);
        let offset = header.section_header_offset.0;
        let table_size = (count * SectionHeader::SIZE) as u64;

        if offset.saturating_add(table_size) > data.len() as u64 {
            return Err(Error::Truncated {
                offset,
                size: table_size,
                len: data.len() as u64,
            });
        }

        let mut reader = Cursor::new(data);
        reader
            .seek(SeekFrom::Start(offset))
            .map_err(|e| Error::Io { kind: e.kind() })?;

        let headers = (0..count)
            .map(|_| SectionHeader::from_reader(&mut reader))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { headers })
    }

    /// The number of entries in the table
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    /// Whether the table has no entries
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// The section header at `index`
    pub fn get(&self, index: usize) -> Result<&SectionHeader, Error> {
        self.headers
            .get(index)
            .ok_or(Error::InvalidSectionIndex { index })
    }

    /// Iterate over the section headers with their indexes
    pub fn iter(&self) -> impl Iterator<Item = (usize, &SectionHeader)> {
        self.headers.iter().enumerate()
    }

    /// The raw contents of the section at `index`, validated to lie inside
    /// the input buffer. A [SectionType::NoBits] section yields an empty
    /// slice because it has no file contents.
    pub fn contents<'d>(&self, data: &'d [u8], index: usize) -> Result<&'d [u8], Error> {
        let section = self.get(index)?;

        if !section.has_file_contents() {
            return Ok(&[]);
        }

        let offset = section.offset.0;
        let size = section.size.0;

        if offset.saturating_add(size) > data.len() as u64 {
            return Err(Error::Truncated {
                offset,
                size,
                len: data.len() as u64,
            });
        }

        Ok(&data[offset as usize..(offset + size) as usize])
    }
}
