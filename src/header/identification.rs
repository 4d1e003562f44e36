//! Implementation of the `ident` field of the ELF header. This field is
//! located at the beginning of an object file and specifies how the rest of
//! the file is to be decoded. The loader only accepts modules whose class and
//! data encoding match the process they are being loaded into.

use std::io::{Read, Seek};

use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::FromPrimitive;

use crate::{error::Error, EncodedSize, FromReader};

/// The four magic bytes that begin every ELF object
pub const ELF_MAGIC: [u8; 4] = [0x7f, b'E', b'L', b'F'];

/// The current ELF version, the only one in use
pub const ELF_VERSION: u8 = 1;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, FromPrimitive, ToPrimitive)]
#[non_exhaustive]
/// The file's class/capacity, i.e. whether it is 32-bit or 64-bit.
///
/// Class ELFCLASS32 files use objects that occupy 1, 2, and 4 bytes. Class
/// ELFCLASS64 files use objects that occupy 1, 2, 4, and 8 bytes. Only the
/// class matching the build target can be loaded.
pub enum ElfClass {
    /// Unspecified
    None = 0,
    /// 32-bit
    Elf32 = 1,
    /// 64-bit
    Elf64 = 2,
}

impl ElfClass {
    #[cfg(target_pointer_width = "32")]
    /// The class accepted on this target
    pub const HOST: Self = Self::Elf32;
    #[cfg(target_pointer_width = "64")]
    /// The class accepted on this target
    pub const HOST: Self = Self::Elf64;
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, FromPrimitive, ToPrimitive)]
#[non_exhaustive]
/// The file's data encoding, i.e. whether it is little-endian or big-endian.
///
/// Encoding ELFDATA2LSB specifies 2's complement values with the least
/// significant byte occupying the lowest address. Only the encoding matching
/// the build target can be loaded.
pub enum ElfDataEncoding {
    /// Unspecified or invalid data encoding
    None = 0,
    /// Little-endian
    LittleEndian = 1,
    /// Big-endian
    BigEndian = 2,
}

impl ElfDataEncoding {
    #[cfg(target_endian = "little")]
    /// The data encoding accepted on this target
    pub const HOST: Self = Self::LittleEndian;
    #[cfg(target_endian = "big")]
    /// The data encoding accepted on this target
    pub const HOST: Self = Self::BigEndian;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// The identifier at the beginning of the ELF header
pub struct Identification {
    /// The file's class, validated to match the host
    pub class: ElfClass,
    /// The file's data encoding, validated to match the host
    pub data_encoding: ElfDataEncoding,
    /// The file's identifier version
    pub version: u8,
    /// The operating system ABI the file targets (not interpreted)
    pub os_abi: u8,
    /// The version of the ABI named by `os_abi` (not interpreted)
    pub abi_version: u8,
}

impl<R> FromReader<R> for Identification
where
    R: Read + Seek,
{
    type Error = Error;

    fn from_reader(reader: &mut R) -> Result<Self, Self::Error> {
        let mut ident = [0; Self::SIZE];
        reader
            .read_exact(&mut ident)
            .map_err(|e| Error::Io { kind: e.kind() })?;

        let magic = [ident[0], ident[1], ident[2], ident[3]];

        if magic != ELF_MAGIC {
            return Err(Error::NotElf { magic });
        }

        let class = ElfClass::from_u8(ident[4])
            .filter(|c| *c == ElfClass::HOST)
            .ok_or(Error::InvalidClass { class: ident[4] })?;

        let data_encoding = ElfDataEncoding::from_u8(ident[5])
            .filter(|e| *e == ElfDataEncoding::HOST)
            .ok_or(Error::InvalidDataEncoding { encoding: ident[5] })?;

        if ident[6] != ELF_VERSION {
            return Err(Error::InvalidVersion { version: ident[6] });
        }

        Ok(Self {
            class,
            data_encoding,
            version: ident[6],
            os_abi: ident[7],
            abi_version: ident[8],
        })
    }
}

impl EncodedSize for Identification {
    const SIZE: usize = 16;
}
