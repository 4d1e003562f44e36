//! Implementation of the ELF symbol table and its associated string table.
//! The symbol table names everything the module defines and everything it
//! expects the host process to provide; after placement the loader rewrites
//! the value field of every defined function and object symbol with its final
//! absolute address so that relocations can consume the record directly.

use std::io::{Cursor, Read, Seek};

use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::FromPrimitive;

use crate::{
    base::{ElfAddr, ElfByte, ElfSectionIndex, ElfSize, ElfWord},
    error::Error,
    section::{SectionType, Sections},
    EncodedSize, FromReader,
};

/// The reserved section index marking an undefined symbol
pub const SHN_UNDEF: u16 = 0;

/// The first reserved section index; a symbol whose defining section index is
/// at or above this value is not defined relative to a placeable section
pub const SHN_LORESERVE: u16 = 0xff00;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[non_exhaustive]
/// The type of an ELF symbol
pub enum SymbolType {
    /// The symbol's type is not specified
    NoType = 0,
    /// The symbol is associated with a data object, such as a variable or an
    /// array
    Object = 1,
    /// The symbol is associated with a function or other executable code
    Func = 2,
    /// The symbol is associated with a section; symbol table entries of this
    /// type exist primarily for relocation
    Section = 3,
    /// The symbol's name gives the name of the source file associated with
    /// the object file
    File = 4,
    /// The symbol labels an uninitialized common block
    Common = 5,
    /// The symbol specifies a thread-local storage entity
    Tls = 6,
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[non_exhaustive]
/// The binding of an ELF symbol, determining its linkage visibility
pub enum SymbolBinding {
    /// The symbol is not visible outside the object file containing its
    /// definition
    Local = 0,
    /// The symbol is visible to all object files being combined
    Global = 1,
    /// The symbol resembles a global symbol but its definition has lower
    /// precedence
    Weak = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// An entry of the ELF symbol table
pub struct Symbol {
    /// The name of the symbol as an index into the linked string table
    pub name: ElfWord,
    /// The symbol's type and binding attributes, packed
    pub info: ElfByte,
    /// The symbol's visibility (not interpreted by the loader)
    pub other: ElfByte,
    /// The index of the section the symbol is defined relative to, or
    /// [SHN_UNDEF]
    pub section_index: ElfSectionIndex,
    /// The value of the symbol: a section-relative offset in a relocatable
    /// object, rewritten to the symbol's absolute arena address once its
    /// section has been placed
    pub value: ElfAddr,
    /// The size of the symbol's data, zero when unknown
    pub size: ElfSize,
}

impl Symbol {
    /// The raw type bits of the symbol
    pub fn raw_type(&self) -> u8 {
        self.info.0 & 0xf
    }

    /// The type of the symbol, if it is a known type
    pub fn symbol_type(&self) -> Option<SymbolType> {
        SymbolType::from_u8(self.raw_type())
    }

    /// The binding of the symbol, if it is a known binding
    pub fn binding(&self) -> Option<SymbolBinding> {
        SymbolBinding::from_u8(self.info.0 >> 4)
    }

    /// Whether the symbol is undefined and must be provided by the host
    pub fn is_undefined(&self) -> bool {
        self.section_index.0 == SHN_UNDEF
    }

    /// Whether the symbol's defining section index is a reserved value rather
    /// than an index into the section header table
    pub fn has_reserved_section(&self) -> bool {
        self.section_index.0 >= SHN_LORESERVE
    }

    /// The index of the defining section
    pub fn section(&self) -> usize {
        usize::from(self.section_index.0)
    }
}

#[cfg(target_pointer_width = "64")]
impl<R> FromReader<R> for Symbol
where
    R: Read + Seek,
{
    type Error = Error;

    fn from_reader(reader: &mut R) -> Result<Self, Self::Error> {
        Ok(Self {
            name: ElfWord::from_reader(reader)?,
            info: ElfByte::from_reader(reader)?,
            other: ElfByte::from_reader(reader)?,
            section_index: ElfSectionIndex::from_reader(reader)?,
            value: ElfAddr::from_reader(reader)?,
            size: ElfSize::from_reader(reader)?,
        })
    }
}

#[cfg(target_pointer_width = "32")]
impl<R> FromReader<R> for Symbol
where
    R: Read + Seek,
{
    type Error = Error;

    fn from_reader(reader: &mut R) -> Result<Self, Self::Error> {
        // The class 32 record orders the value and size fields first.
        let name = ElfWord::from_reader(reader)?;
        let value = ElfAddr::from_reader(reader)?;
        let size = ElfSize::from_reader(reader)?;
        let info = ElfByte::from_reader(reader)?;
        let other = ElfByte::from_reader(reader)?;
        let section_index = ElfSectionIndex::from_reader(reader)?;

        Ok(Self {
            name,
            info,
            other,
            section_index,
            value,
            size,
        })
    }
}

impl EncodedSize for Symbol {
    const SIZE: usize = ElfWord::SIZE
        + ElfByte::SIZE * 2
        + ElfSectionIndex::SIZE
        + ElfAddr::SIZE
        + ElfSize::SIZE;
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// The decoded symbol table of an object, together with the index of its
/// linked string table
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    string_table: usize,
}

impl SymbolTable {
    /// Decode the symbol table held by section `index`, validating its entry
    /// size and bounds
    pub fn parse(data: &[u8], sections: &Sections, index: usize) -> Result<Self, Error> {
        let section = sections.get(index)?;

        if section.entsize.0 != Symbol::SIZE as u64 {
            return Err(Error::InvalidEntrySize {
                size: section.entsize.0,
            });
        }

        if section.size.0 % section.entsize.0 != 0 {
            return Err(Error::InvalidEntrySize {
                size: section.entsize.0,
            });
        }

        let contents = sections.contents(data, index)?;
        let count = contents.len() / Symbol::SIZE;

        let mut reader = Cursor::new(contents);
        let symbols = (0..count)
            .map(|_| Symbol::from_reader(&mut reader))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            symbols,
            string_table: section.link.0 as usize,
        })
    }

    /// The number of entries in the table
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Whether the table has no entries
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// The symbol at `index`
    pub fn get(&self, index: usize) -> Result<&Symbol, Error> {
        self.symbols
            .get(index)
            .ok_or(Error::InvalidSymbolIndex { index })
    }

    /// Iterate over the symbols
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    /// Iterate mutably over the symbols, used to rewrite value fields after
    /// placement
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Symbol> {
        self.symbols.iter_mut()
    }

    /// The section index of the linked string table
    pub fn string_table(&self) -> usize {
        self.string_table
    }

    /// Find the first symbol table section of the object
    pub fn find(sections: &Sections) -> Option<usize> {
        sections
            .iter()
            .find(|(_, s)| s.section_type() == Some(SectionType::SymbolTable))
            .map(|(index, _)| index)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// A borrowed view of a string table section, giving bounds-checked access to
/// NUL-terminated names
pub struct StringTable<'d> {
    data: &'d [u8],
}

impl<'d> StringTable<'d> {
    /// Wrap the contents of a string table section
    pub fn new(data: &'d [u8]) -> Self {
        Self { data }
    }

    /// The string starting at `offset`, which must be NUL-terminated valid
    /// UTF-8 inside the table
    pub fn get(&self, offset: u64) -> Result<&'d str, Error> {
        let start = usize::try_from(offset).map_err(|_| Error::InvalidString { offset })?;

        if start >= self.data.len() {
            return Err(Error::InvalidString { offset });
        }

        let terminated = &self.data[start..];
        let end = terminated
            .iter()
            .position(|b| *b == 0)
            .ok_or(Error::InvalidString { offset })?;

        std::str::from_utf8(&terminated[..end]).map_err(|_| Error::InvalidString { offset })
    }
}
