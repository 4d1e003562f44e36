//! Implementation of the ELF header. The header is located at the beginning
//! of the object file and is the only structure in the format which must be
//! located at a specific offset (0). The loader validates here that the file
//! is an unlinked relocatable module for the host machine before touching any
//! other table.

use std::io::{Read, Seek};

use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::FromPrimitive;

use crate::{
    base::{ElfAddr, ElfHalf, ElfOff, ElfWord},
    error::Error,
    section::SectionHeader,
    EncodedSize, FromReader,
};

use self::identification::Identification;

pub mod identification;

#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[non_exhaustive]
/// The ELF object type. Only [ElfType::Relocatable] objects can be loaded;
/// executables and shared objects carry program headers and dynamic linking
/// structures this loader does not process.
pub enum ElfType {
    /// No file type
    None = 0,
    /// Relocatable file type
    Relocatable = 1,
    /// Executable file type
    Executable = 2,
    /// Shared object file type
    Dynamic = 3,
    /// Core file
    Core = 4,
}

#[allow(non_camel_case_types)]
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[non_exhaustive]
/// The ELF object's machine. Only the machine matching the build target can
/// be loaded; the common values are listed for diagnostics.
pub enum ElfMachine {
    /// No machine
    NONE = 0,
    /// SPARC
    SPARC = 2,
    /// Intel 80386
    I386 = 3,
    /// MIPS I Architecture
    MIPS = 8,
    /// PowerPC
    PPC = 20,
    /// ARM 32-bit architecture (AARCH32)
    ARM = 40,
    /// AMD x86-64 architecture
    X86_64 = 62,
    /// ARM 64-bit architecture (AARCH64)
    AARCH64 = 183,
    /// RISC-V
    RISCV = 243,
}

impl ElfMachine {
    #[cfg(target_arch = "x86")]
    /// The machine accepted on this target
    pub const HOST: Self = Self::I386;
    #[cfg(target_arch = "x86_64")]
    /// The machine accepted on this target
    pub const HOST: Self = Self::X86_64;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// The ELF object file header
pub struct ElfHeader {
    /// The identifier at the beginning of the header
    pub ident: Identification,
    /// The object type, validated to be [ElfType::Relocatable]
    pub r#type: ElfType,
    /// The machine, validated to match the host
    pub machine: ElfMachine,
    /// The object file version
    pub version: ElfWord,
    /// The entry point virtual address (unused in relocatable objects)
    pub entry: ElfAddr,
    /// The file offset of the program header table (unused in relocatable
    /// objects)
    pub program_header_offset: ElfOff,
    /// The file offset of the section header table
    pub section_header_offset: ElfOff,
    /// Processor-specific flags
    pub flags: ElfWord,
    /// The size of this header
    pub header_size: ElfHalf,
    /// The size of one program header table entry
    pub program_header_entry_size: ElfHalf,
    /// The number of program header table entries
    pub program_header_count: ElfHalf,
    /// The size of one section header table entry, validated to match the
    /// target layout
    pub section_header_entry_size: ElfHalf,
    /// The number of section header table entries
    pub section_header_count: ElfHalf,
    /// The section index of the section name string table
    pub section_name_index: ElfHalf,
}

impl<R> FromReader<R> for ElfHeader
where
    R: Read + Seek,
{
    type Error = Error;

    fn from_reader(reader: &mut R) -> Result<Self, Self::Error> {
        let ident = Identification::from_reader(reader)?;

        let r#type = ElfHalf::from_reader(reader)?;
        let r#type = ElfType::from_u16(r#type.0)
            .filter(|t| *t == ElfType::Relocatable)
            .ok_or(Error::NotRelocatable { value: r#type.0 })?;

        let machine = ElfHalf::from_reader(reader)?;
        let machine = ElfMachine::from_u16(machine.0)
            .filter(|m| *m == ElfMachine::HOST)
            .ok_or(Error::WrongMachine { machine: machine.0 })?;

        let version = ElfWord::from_reader(reader)?;

        if version.0 != u32::from(identification::ELF_VERSION) {
            return Err(Error::InvalidVersion {
                version: version.0 as u8,
            });
        }

        let header = Self {
            ident,
            r#type,
            machine,
            version,
            entry: ElfAddr::from_reader(reader)?,
            program_header_offset: ElfOff::from_reader(reader)?,
            section_header_offset: ElfOff::from_reader(reader)?,
            flags: ElfWord::from_reader(reader)?,
            header_size: ElfHalf::from_reader(reader)?,
            program_header_entry_size: ElfHalf::from_reader(reader)?,
            program_header_count: ElfHalf::from_reader(reader)?,
            section_header_entry_size: ElfHalf::from_reader(reader)?,
            section_header_count: ElfHalf::from_reader(reader)?,
            section_name_index: ElfHalf::from_reader(reader)?,
        };

        if header.section_header_count.0 != 0
            && usize::from(header.section_header_entry_size.0) != SectionHeader::SIZE
        {
            return Err(Error::InvalidSectionHeaderSize {
                size: header.section_header_entry_size.0,
            });
        }

        Ok(header)
    }
}

impl EncodedSize for ElfHeader {
    const SIZE: usize = Identification::SIZE
        + ElfHalf::SIZE * 2
        + ElfWord::SIZE
        + ElfAddr::SIZE
        + ElfOff::SIZE * 2
        + ElfWord::SIZE
        + ElfHalf::SIZE * 6;
}
