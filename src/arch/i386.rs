//! Architecture specific definitions for i386
//!
//! Every host address fits in a 32-bit displacement on this target, so
//! procedure linkage table calls are patched as plain PC-relative
//! displacements and no linkage scratch is consumed.

use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::FromPrimitive;

use crate::{arch::PatchKind, error::Error};

/// The size of a synthesized jump slot: a 6-byte indirect jump through the
/// absolute cell stored in the following 4 bytes
pub const JUMP_SLOT_SIZE: usize = 10;

/// The size of an arena-resident slot holding an absolute address for a
/// PC-relative load
pub const GOT_SLOT_SIZE: usize = 4;

#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[non_exhaustive]
/// The subset of i386 relocation kinds a position-dependent relocatable
/// module compiled for this loader can carry
pub enum RelocationKind {
    /// `R_386_32`: direct 32-bit address
    Absolute32 = 1,
    /// `R_386_PC32`: PC-relative 32-bit displacement
    Relative32 = 2,
    /// `R_386_PLT32`: 32-bit displacement to the symbol's procedure linkage
    /// table entry; patched as a plain PC-relative displacement because every
    /// destination is reachable on this target
    Plt32 = 4,
}

impl RelocationKind {
    /// Interpret the raw kind field of a relocation entry
    pub fn decode(value: u32) -> Result<Self, Error> {
        Self::from_u32(value).ok_or(Error::UnknownRelocation { value })
    }

    /// How the relocator must treat the patch site
    pub fn patch_kind(&self) -> PatchKind {
        match self {
            Self::Absolute32 => PatchKind::Absolute32,
            Self::Relative32 | Self::Plt32 => PatchKind::Relative32,
        }
    }

    /// The linkage scratch the kind consumes from the arena, counted by the
    /// sizing pass before the arena is mapped
    pub fn scratch_size(&self) -> usize {
        0
    }

    /// The width of the patch site in bytes
    pub fn patch_width(&self) -> usize {
        4
    }
}

/// Synthesize a jump slot at `slot` that transfers control to the absolute
/// address `target`: an indirect jump through the doubleword cell stored
/// immediately after the instruction.
///
/// # Safety
///
/// `slot` must be valid for writes of [JUMP_SLOT_SIZE] bytes.
pub unsafe fn emit_jump_slot(slot: *mut u8, target: usize) {
    // jmp *cell, with the absolute address of the cell embedded in the
    // instruction's displacement.
    let cell = (slot as u32).wrapping_add(6);

    std::ptr::write(slot, 0xff);
    std::ptr::write(slot.add(1), 0x25);
    std::ptr::write_unaligned(slot.add(2).cast::<u32>(), cell);
    std::ptr::write_unaligned(slot.add(6).cast::<u32>(), target as u32);
}
