//! Implementation of ELF relocation entries. A relocation instructs the
//! loader to patch a specific offset within a specific section with a value
//! derived from a symbol's resolved address and an addend. Both entry forms
//! are decoded behind one shape: `REL` entries pre-store their addend at the
//! patch site, so their decoded addend is zero and the patch arithmetic is
//! read-modify-write.

use std::io::{Cursor, Read, Seek};

use crate::{
    base::{ElfAddr, ElfSigned, ElfSize},
    error::Error,
    section::{SectionType, Sections},
    EncodedSize, FromReader,
};

/// Split a packed relocation info field into its symbol table index and
/// relocation kind
#[cfg(target_pointer_width = "64")]
fn split_info(info: u64) -> (usize, u32) {
    ((info >> 32) as usize, info as u32)
}

/// Split a packed relocation info field into its symbol table index and
/// relocation kind
#[cfg(target_pointer_width = "32")]
fn split_info(info: u64) -> (usize, u32) {
    ((info >> 8) as usize, (info & 0xff) as u32)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// A relocation entry without an explicit addend; the addend is pre-stored at
/// the patch site
pub struct Rel {
    /// The offset of the patch site within the target section
    pub offset: ElfAddr,
    /// The symbol table index and relocation kind, packed
    pub info: ElfSize,
}

impl<R> FromReader<R> for Rel
where
    R: Read + Seek,
{
    type Error = Error;

    fn from_reader(reader: &mut R) -> Result<Self, Self::Error> {
        Ok(Self {
            offset: ElfAddr::from_reader(reader)?,
            info: ElfSize::from_reader(reader)?,
        })
    }
}

impl EncodedSize for Rel {
    const SIZE: usize = ElfAddr::SIZE + ElfSize::SIZE;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// A relocation entry with an explicit addend
pub struct Rela {
    /// The offset of the patch site within the target section
    pub offset: ElfAddr,
    /// The symbol table index and relocation kind, packed
    pub info: ElfSize,
    /// The constant addend used to compute the value stored at the patch site
    pub addend: ElfSigned,
}

impl<R> FromReader<R> for Rela
where
    R: Read + Seek,
{
    type Error = Error;

    fn from_reader(reader: &mut R) -> Result<Self, Self::Error> {
        Ok(Self {
            offset: ElfAddr::from_reader(reader)?,
            info: ElfSize::from_reader(reader)?,
            addend: ElfSigned::from_reader(reader)?,
        })
    }
}

impl EncodedSize for Rela {
    const SIZE: usize = ElfAddr::SIZE + ElfSize::SIZE + ElfSigned::SIZE;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// A decoded relocation entry of either form
pub struct Relocation {
    /// The offset of the patch site within the target section
    pub offset: u64,
    /// The index of the referent symbol in the symbol table
    pub symbol: usize,
    /// The architecture-specific relocation kind
    pub kind: u32,
    /// The addend; zero for `REL` entries, whose addend is pre-stored at the
    /// patch site
    pub addend: i64,
}

impl From<Rel> for Relocation {
    fn from(value: Rel) -> Self {
        let (symbol, kind) = split_info(value.info.0);
        Self {
            offset: value.offset.0,
            symbol,
            kind,
            addend: 0,
        }
    }
}

impl From<Rela> for Relocation {
    fn from(value: Rela) -> Self {
        let (symbol, kind) = split_info(value.info.0);
        Self {
            offset: value.offset.0,
            symbol,
            kind,
            addend: value.addend.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// The decoded entries of one relocation section, together with the index of
/// the section they apply to
pub struct RelocationTable {
    /// The index of the section the relocations patch
    pub target: usize,
    /// The decoded relocation entries
    pub entries: Vec<Relocation>,
}

impl RelocationTable {
    /// Decode the relocation section at `index`, validating its entry size
    /// and bounds
    pub fn parse(data: &[u8], sections: &Sections, index: usize) -> Result<Self, Error> {
        let section = sections.get(index)?;

        let entry_size = match section.section_type() {
            Some(SectionType::RelocationImplicit) => Rel::SIZE,
            Some(SectionType::RelocationExplicit) => Rela::SIZE,
            _ => {
                return Err(Error::InvalidSectionIndex { index });
            }
        };

        if section.entsize.0 != entry_size as u64 || section.size.0 % entry_size as u64 != 0 {
            return Err(Error::InvalidEntrySize {
                size: section.entsize.0,
            });
        }

        let contents = sections.contents(data, index)?;
        let count = contents.len() / entry_size;
        let mut reader = Cursor::new(contents);

        let entries = (0..count)
            .map(|_| {
                Ok(match section.section_type() {
                    Some(SectionType::RelocationImplicit) => {
                        Relocation::from(Rel::from_reader(&mut reader)?)
                    }
                    _ => Relocation::from(Rela::from_reader(&mut reader)?),
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;

        Ok(Self {
            target: section.info.0 as usize,
            entries,
        })
    }

    /// Collect every relocation section whose target section is placed into
    /// the arena. Relocations against sections that do not occupy memory
    /// (debug information and the like) are skipped entirely.
    pub fn collect_placed(data: &[u8], sections: &Sections) -> Result<Vec<Self>, Error> {
        let mut tables = Vec::new();

        for (index, section) in sections.iter() {
            if !matches!(
                section.section_type(),
                Some(SectionType::RelocationImplicit) | Some(SectionType::RelocationExplicit)
            ) {
                continue;
            }

            let target = sections.get(section.info.0 as usize)?;

            if !target.is_alloc() {
                continue;
            }

            tables.push(Self::parse(data, sections, index)?);
        }

        Ok(tables)
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod test {
    use super::*;
    use crate::base::{RawAddr, RawSigned, RawSize};
    use std::io::Cursor;

    #[cfg(target_pointer_width = "64")]
    fn pack_info(symbol: usize, kind: u32) -> u64 {
        ((symbol as u64) << 32) | u64::from(kind)
    }

    #[cfg(target_pointer_width = "32")]
    fn pack_info(symbol: usize, kind: u32) -> u64 {
        ((symbol as u64) << 8) | u64::from(kind & 0xff)
    }

    #[test]
    fn test_rela_decode() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&(0x20 as RawAddr).to_ne_bytes());
        bytes.extend_from_slice(&(pack_info(3, 2) as RawSize).to_ne_bytes());
        bytes.extend_from_slice(&(-4 as RawSigned).to_ne_bytes());
        assert_eq!(bytes.len(), Rela::SIZE);

        let entry = Relocation::from(Rela::from_reader(&mut Cursor::new(&bytes)).unwrap());
        assert_eq!(entry.offset, 0x20);
        assert_eq!(entry.symbol, 3);
        assert_eq!(entry.kind, 2);
        assert_eq!(entry.addend, -4);
    }

    #[test]
    fn test_rel_decode_has_zero_addend() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&(0x8 as RawAddr).to_ne_bytes());
        bytes.extend_from_slice(&(pack_info(1, 1) as RawSize).to_ne_bytes());
        assert_eq!(bytes.len(), Rel::SIZE);

        let entry = Relocation::from(Rel::from_reader(&mut Cursor::new(&bytes)).unwrap());
        assert_eq!(entry.offset, 0x8);
        assert_eq!(entry.symbol, 1);
        assert_eq!(entry.kind, 1);
        assert_eq!(entry.addend, 0);
    }
}
