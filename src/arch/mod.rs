//! Architecture specific definitions. Each supported architecture interprets
//! the relocation kind field of a relocation entry, knows how much linkage
//! scratch each kind will consume from the arena, and knows how to
//! synthesize a jump slot for calls whose destination lies outside the reach
//! of a PC-relative displacement.

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
compile_error!(
    "no relocation kind table is defined for this architecture; \
     extend the arch module to support it"
);

#[cfg(target_arch = "x86")]
pub mod i386;
#[cfg(target_arch = "x86_64")]
pub mod x86_64;

#[cfg(target_arch = "x86")]
pub use i386::{emit_jump_slot, RelocationKind, GOT_SLOT_SIZE, JUMP_SLOT_SIZE};
#[cfg(target_arch = "x86_64")]
pub use x86_64::{emit_jump_slot, RelocationKind, GOT_SLOT_SIZE, JUMP_SLOT_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// How the relocator must treat a patch site once the referent symbol is
/// resolved
pub enum PatchKind {
    /// Add the resolved address and addend to the 32-bit patch site
    Absolute32,
    /// Add the resolved address and addend to the 64-bit patch site
    Absolute64,
    /// Add the displacement from the patch site to the resolved address, plus
    /// the addend, to the 32-bit patch site
    Relative32,
    /// Synthesize a jump slot to the resolved address in the arena, then
    /// patch as [PatchKind::Relative32] against the slot
    PltCall,
    /// Store the resolved address in an arena-resident slot, then patch as
    /// [PatchKind::Relative32] against the slot
    GotLoad,
}
