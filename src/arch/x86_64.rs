//! Architecture specific definitions for x86_64

use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::FromPrimitive;

use crate::{arch::PatchKind, error::Error};

/// The size of a synthesized jump slot: a 6-byte indirect jump through the
/// absolute target stored in the following 8 bytes
pub const JUMP_SLOT_SIZE: usize = 14;

/// The size of an arena-resident slot holding an absolute address for a
/// PC-relative load
pub const GOT_SLOT_SIZE: usize = 8;

#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[non_exhaustive]
/// The subset of x86_64 relocation kinds a position-dependent relocatable
/// module compiled for this loader can carry
pub enum RelocationKind {
    /// `R_X86_64_64`: direct 64-bit address
    Absolute64 = 1,
    /// `R_X86_64_PC32`: PC-relative 32-bit signed displacement
    Relative32 = 2,
    /// `R_X86_64_PLT32`: 32-bit displacement to the symbol's procedure
    /// linkage table entry. The loader synthesizes a jump slot in the arena
    /// so the displacement always fits, then patches against the slot.
    Plt32 = 4,
    /// `R_X86_64_GOTPCREL`: PC-relative 32-bit displacement to the symbol's
    /// global offset table entry. The loader materializes the entry as an
    /// arena-resident slot holding the resolved address.
    GotRelative32 = 9,
    /// `R_X86_64_32`: direct zero-extended 32-bit address
    Absolute32 = 10,
    /// `R_X86_64_32S`: direct sign-extended 32-bit address
    Absolute32Signed = 11,
    /// `R_X86_64_REX_GOTPCRELX`: a relaxable form of
    /// [RelocationKind::GotRelative32] emitted for REX-prefixed loads,
    /// handled identically
    RexGotRelative32 = 42,
}

impl RelocationKind {
    /// Interpret the raw kind field of a relocation entry
    pub fn decode(value: u32) -> Result<Self, Error> {
        Self::from_u32(value).ok_or(Error::UnknownRelocation { value })
    }

    /// How the relocator must treat the patch site
    pub fn patch_kind(&self) -> PatchKind {
        match self {
            Self::Absolute64 => PatchKind::Absolute64,
            Self::Relative32 => PatchKind::Relative32,
            Self::Plt32 => PatchKind::PltCall,
            Self::GotRelative32 | Self::RexGotRelative32 => PatchKind::GotLoad,
            Self::Absolute32 | Self::Absolute32Signed => PatchKind::Absolute32,
        }
    }

    /// The linkage scratch the kind consumes from the arena, counted by the
    /// sizing pass before the arena is mapped
    pub fn scratch_size(&self) -> usize {
        match self.patch_kind() {
            PatchKind::PltCall => JUMP_SLOT_SIZE,
            PatchKind::GotLoad => GOT_SLOT_SIZE,
            _ => 0,
        }
    }

    /// The width of the patch site in bytes
    pub fn patch_width(&self) -> usize {
        match self.patch_kind() {
            PatchKind::Absolute64 => 8,
            _ => 4,
        }
    }
}

/// Synthesize a jump slot at `slot` that transfers control to the absolute
/// address `target`: an indirect jump through the quadword stored immediately
/// after the instruction.
///
/// # Safety
///
/// `slot` must be valid for writes of [JUMP_SLOT_SIZE] bytes.
pub unsafe fn emit_jump_slot(slot: *mut u8, target: usize) {
    // jmp *0x0(%rip), then the target quadword the instruction reads.
    const JMP_INDIRECT: [u8; 6] = [0xff, 0x25, 0x00, 0x00, 0x00, 0x00];

    std::ptr::copy_nonoverlapping(JMP_INDIRECT.as_ptr(), slot, JMP_INDIRECT.len());
    std::ptr::write_unaligned(slot.add(JMP_INDIRECT.len()).cast::<u64>(), target as u64);
}
