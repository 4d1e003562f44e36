//! Error type for failures during object loading

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
/// Error type for errors during object decoding, placement, and relocation
pub enum Error {
    #[error("An I/O error occurred: {kind}")]
    /// An underlying read of the object file failed
    Io {
        /// The kind of the underlying I/O error
        kind: std::io::ErrorKind,
    },
    #[error("Not an ELF object (magic {magic:02x?})")]
    /// The first four bytes of the input are not the ELF magic
    NotElf {
        /// The bytes found where the magic was expected
        magic: [u8; 4],
    },
    #[error("Invalid value {class} for ELF class on this target")]
    /// The object's class does not match the build target's word width
    InvalidClass {
        /// The value of the class field
        class: u8,
    },
    #[error("Invalid value {encoding} for ELF data encoding on this target")]
    /// The object's data encoding does not match the build target's byte order
    InvalidDataEncoding {
        /// The value of the data encoding field
        encoding: u8,
    },
    #[error("Invalid value {version} for ELF version")]
    /// The object's identifier version is not the current ELF version
    InvalidVersion {
        /// The value of the version field
        version: u8,
    },
    #[error("Object type {value} is not relocatable")]
    /// The object is not an unlinked relocatable (`ET_REL`) module
    NotRelocatable {
        /// The value of the object type field
        value: u16,
    },
    #[error("Object machine {machine} does not match the host")]
    /// The object targets a different instruction set than the host process
    WrongMachine {
        /// The value of the machine field
        machine: u16,
    },
    #[error("Section header entry size {size} does not match this target")]
    /// The section header table's entry size disagrees with the target layout
    InvalidSectionHeaderSize {
        /// The entry size recorded in the ELF header
        size: u16,
    },
    #[error("Table entry size {size} does not match its section's record size")]
    /// A symbol or relocation section's `sh_entsize` disagrees with its record
    InvalidEntrySize {
        /// The entry size recorded in the section header
        size: u64,
    },
    #[error("Range at offset {offset} with size {size} exceeds the {len}-byte input")]
    /// A header-declared range does not fit inside the input buffer
    Truncated {
        /// The start of the out-of-bounds range
        offset: u64,
        /// The size of the out-of-bounds range
        size: u64,
        /// The size of the buffer the range was checked against
        len: u64,
    },
    #[error("Object has no symbol table")]
    /// No `SYMTAB` section is present in the object
    MissingSymbolTable,
    #[error("String table offset {offset} is not a NUL-terminated string")]
    /// A name offset does not reach a terminated, valid string
    InvalidString {
        /// The offset into the string table
        offset: u64,
    },
    #[error("Section index {index} is out of bounds")]
    /// A section reference points outside the section header table
    InvalidSectionIndex {
        /// The out-of-bounds section index
        index: usize,
    },
    #[error("Symbol index {index} is out of bounds")]
    /// A relocation references a symbol outside the symbol table
    InvalidSymbolIndex {
        /// The out-of-bounds symbol index
        index: usize,
    },
    #[error("Patch site at offset {offset}+{size} exceeds its {len}-byte section")]
    /// A relocation's patch site does not fit inside its target section
    PatchSiteOutOfBounds {
        /// The relocation's offset within the target section
        offset: u64,
        /// The width of the patch site
        size: u64,
        /// The size of the target section
        len: u64,
    },
    #[error("Executable mapping failed (errno {errno})")]
    /// The anonymous read/write/execute mapping could not be created
    MapFailed {
        /// The operating system error number
        errno: i32,
    },
    #[error("Arena exhausted: {requested} bytes requested with {remaining} remaining")]
    /// A sub-allocation would overrun the arena sized during the first pass
    ArenaExhausted {
        /// The size of the failed sub-allocation
        requested: usize,
        /// The bytes left between the cursor and the arena's capacity
        remaining: usize,
    },
    #[error("Unresolved symbol {name}")]
    /// An undefined symbol was not provided by the host process
    UnresolvedSymbol {
        /// The name of the symbol that could not be resolved
        name: String,
    },
    #[error("Unsupported relocation symbol type {value}")]
    /// A relocation references a symbol whose type the loader cannot resolve
    UnsupportedSymbolType {
        /// The value of the symbol type field
        value: u8,
    },
    #[error("Unknown relocation kind {value}")]
    /// A relocation entry uses a kind outside the supported subset
    UnknownRelocation {
        /// The value of the relocation kind field
        value: u32,
    },
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::Io { kind: value.kind() }
    }
}

/// Result type for object loading operations
pub type Result<T> = std::result::Result<T, Error>;
