//! A dlopen-like runtime loader for ELF relocatable object files
//!
//! A relocatable object is the unlinked intermediate a C/C++ toolchain
//! produces before static linking. This crate accepts a single such module,
//! places its sections into executable memory, resolves its internal
//! cross-references and its references to symbols already present in the host
//! process, and returns pointers to the named functions and data inside the
//! loaded module:
//!
//! ```no_run
//! # fn main() -> Result<(), objload::Error> {
//! let module = objload::Module::open("add1.o")?;
//!
//! if let Some(add1) = unsafe { module.symbol_as::<extern "C" fn(i32) -> i32>("add1") } {
//!     assert_eq!(add1(41), 42);
//! }
//! # Ok(())
//! # }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic, missing_docs)]

use std::io::{Read, Seek};

use typed_builder::TypedBuilder;

use crate::host::Resolver;

pub mod arch;
pub mod arena;
pub mod base;
pub mod error;
pub mod header;
pub mod host;
pub mod load;
pub mod reloc;
pub mod section;
pub mod symbol;

pub use error::Error;
pub use load::{last_error, Module};

/// The minimum alignment applied when placing a section, used whenever the
/// section does not declare a larger one of its own
pub const DEFAULT_MIN_ALIGN: usize = 16;

/// Decode an owned instance of a type from a reader
pub trait FromReader<R>
where
    R: Read + Seek,
    Self: Sized,
{
    /// The error type for this operation
    type Error;

    /// Decode an instance of this type from a reader
    fn from_reader(reader: &mut R) -> std::result::Result<Self, Self::Error>;
}

/// A type with a fixed size when encoded in an object file, used to validate
/// header-declared entry sizes and to step through tables
pub trait EncodedSize {
    /// The encoded size in bytes
    const SIZE: usize;
}

#[derive(Debug, Clone, Copy, TypedBuilder)]
/// A configuration for loading a module
pub struct Config {
    #[builder(default = DEFAULT_MIN_ALIGN)]
    /// The minimum alignment applied when placing sections; a section's own
    /// declared alignment is honored when larger
    min_align: usize,
    #[builder(default, setter(strip_option))]
    /// An override for host symbol resolution. When set, undefined symbols
    /// are resolved through this function instead of the process's dynamic
    /// symbol table.
    resolver: Option<Resolver>,
}

impl Default for Config {
    fn default() -> Self {
        Self::builder().build()
    }
}
