//! Host-native primitive field types for the object byte-view
//!
//! A relocatable module is only loadable when its class and data encoding
//! match the process it is loaded into, so the build target selects the
//! on-disk width of each field once and the 32- and 64-bit layouts are
//! abstracted behind identical logical field names.

use std::{
    fmt::Display,
    io::{Read, Seek},
    mem::size_of,
};

use crate::{error::Error, EncodedSize, FromReader};

/// Raw representation of a half-word
pub type RawHalf = u16;
/// Raw representation of a word
pub type RawWord = u32;
/// Raw representation of a section index
pub type RawSectionIndex = u16;
#[cfg(target_pointer_width = "32")]
/// Raw representation of an address
pub type RawAddr = u32;
#[cfg(target_pointer_width = "64")]
/// Raw representation of an address
pub type RawAddr = u64;
#[cfg(target_pointer_width = "32")]
/// Raw representation of a file offset
pub type RawOff = u32;
#[cfg(target_pointer_width = "64")]
/// Raw representation of a file offset
pub type RawOff = u64;
#[cfg(target_pointer_width = "32")]
/// Raw representation of a size, flag set, or packed info field
pub type RawSize = u32;
#[cfg(target_pointer_width = "64")]
/// Raw representation of a size, flag set, or packed info field
pub type RawSize = u64;
#[cfg(target_pointer_width = "32")]
/// Raw representation of a signed field (relocation addends)
pub type RawSigned = i32;
#[cfg(target_pointer_width = "64")]
/// Raw representation of a signed field (relocation addends)
pub type RawSigned = i64;

macro_rules! field_type {
    (
        $(#[$attr:meta])*
        $name:ident, $raw:ty, $logical:ty
    ) => {
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
        $(#[$attr])*
        pub struct $name(pub(crate) $logical);

        impl<R> FromReader<R> for $name
        where
            R: Read + Seek,
        {
            type Error = Error;

            fn from_reader(reader: &mut R) -> Result<Self, Self::Error> {
                let mut buf = [0; size_of::<$raw>()];
                reader
                    .read_exact(&mut buf)
                    .map_err(|e| Error::Io { kind: e.kind() })?;
                // Class and encoding are validated against the host before any
                // field is decoded, so native byte order is the file's order.
                Ok(Self(<$raw>::from_ne_bytes(buf) as $logical))
            }
        }

        impl EncodedSize for $name {
            const SIZE: usize = size_of::<$raw>();
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$name> for $logical {
            fn from(val: $name) -> Self {
                val.0
            }
        }
    };
}

field_type! {
    /// A byte field. Always represented as a single byte.
    ElfByte, u8, u8
}

field_type! {
    /// A half-word field. Represented as 16 bits for both classes.
    ElfHalf, RawHalf, u16
}

field_type! {
    /// A word field. Represented as 32 bits for both classes.
    ElfWord, RawWord, u32
}

field_type! {
    /// A section index field. Represented as 16 bits for both classes.
    ElfSectionIndex, RawSectionIndex, u16
}

field_type! {
    /// An address field. Represented as 32 bits for class 32 and 64 bits for
    /// class 64.
    ElfAddr, RawAddr, u64
}

field_type! {
    /// A file offset field. Represented as 32 bits for class 32 and 64 bits
    /// for class 64.
    ElfOff, RawOff, u64
}

field_type! {
    /// A size, flag set, or packed info field. Represented as 32 bits for
    /// class 32 and 64 bits for class 64.
    ElfSize, RawSize, u64
}

field_type! {
    /// A signed field. Represented as 32 bits for class 32 and 64 bits for
    /// class 64.
    ElfSigned, RawSigned, i64
}
