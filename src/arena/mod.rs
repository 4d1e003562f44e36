//! The executable arena backing a loaded module. One anonymous mapping that
//! is simultaneously readable, writable, and executable holds every placed
//! section and every synthesized jump and address slot; a bump cursor hands
//! out sub-ranges. The arena is sized once before it is mapped and never
//! grows, because growing would invalidate every address already handed out.

use crate::error::Error;

#[derive(Debug)]
/// A bump allocator over one anonymous read/write/execute mapping
pub struct Arena {
    base: *mut u8,
    mapped: usize,
    capacity: usize,
    cursor: usize,
}

impl Arena {
    /// Map a zero-filled read/write/execute region of at least `capacity`
    /// bytes
    pub fn new(capacity: usize) -> Result<Self, Error> {
        let page = page_size();
        let mapped = capacity
            .max(1)
            .checked_next_multiple_of(page)
            .ok_or(Error::MapFailed {
                errno: libc::ENOMEM,
            })?;

        // SAFETY: an anonymous private mapping with no requested address has
        // no preconditions; failure is reported as MAP_FAILED.
        let base = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                mapped,
                libc::PROT_READ | libc::PROT_WRITE | libc::PROT_EXEC,
                libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
                -1,
                0,
            )
        };

        if base == libc::MAP_FAILED {
            return Err(Error::MapFailed {
                errno: std::io::Error::last_os_error().raw_os_error().unwrap_or(0),
            });
        }

        Ok(Self {
            base: base.cast(),
            mapped,
            capacity,
            cursor: 0,
        })
    }

    /// Advance the cursor by `size` bytes and return the address the cursor
    /// held before advancing
    pub fn allocate(&mut self, size: usize) -> Result<usize, Error> {
        let remaining = self.capacity.saturating_sub(self.cursor);

        if size > remaining {
            return Err(Error::ArenaExhausted {
                requested: size,
                remaining,
            });
        }

        let address = self.base as usize + self.cursor;
        self.cursor += size;

        Ok(address)
    }

    /// Advance the cursor to the next multiple of `align`. The mapping is
    /// page-aligned, so cursor alignment is address alignment.
    pub fn align_to(&mut self, align: usize) {
        if align > 1 {
            self.cursor = self.cursor.next_multiple_of(align);
        }
    }

    /// The address of the first byte of the mapping
    pub fn base(&self) -> usize {
        self.base as usize
    }

    /// The usable capacity the arena was sized with
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The number of bytes consumed so far, including alignment padding
    pub fn used(&self) -> usize {
        self.cursor
    }

    /// Whether `address` lies inside the mapping
    pub fn contains(&self, address: usize) -> bool {
        address >= self.base as usize && address < self.base as usize + self.mapped
    }
}

impl Drop for Arena {
    fn drop(&mut self) {
        // SAFETY: base and mapped describe exactly the region mmap returned.
        unsafe {
            libc::munmap(self.base.cast(), self.mapped);
        }
    }
}

fn page_size() -> usize {
    // SAFETY: sysconf has no preconditions.
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };

    if size > 0 {
        size as usize
    } else {
        4096
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_bump_allocation() {
        let mut arena = Arena::new(128).unwrap();
        let first = arena.allocate(16).unwrap();
        let second = arena.allocate(16).unwrap();
        assert_eq!(first, arena.base());
        assert_eq!(second, first + 16);
        assert_eq!(arena.used(), 32);
    }

    #[test]
    fn test_alignment() {
        let mut arena = Arena::new(128).unwrap();
        arena.allocate(3).unwrap();
        arena.align_to(16);
        let aligned = arena.allocate(8).unwrap();
        assert_eq!(aligned % 16, 0);
        assert_eq!(aligned, arena.base() + 16);
    }

    #[test]
    fn test_exhaustion() {
        let mut arena = Arena::new(32).unwrap();
        arena.allocate(32).unwrap();
        assert_eq!(
            arena.allocate(1),
            Err(Error::ArenaExhausted {
                requested: 1,
                remaining: 0
            })
        );
    }

    #[test]
    fn test_mapping_is_zero_filled() {
        let mut arena = Arena::new(64).unwrap();
        let address = arena.allocate(64).unwrap();
        // SAFETY: the range was just allocated from a live mapping.
        let contents = unsafe { std::slice::from_raw_parts(address as *const u8, 64) };
        assert!(contents.iter().all(|b| *b == 0));
    }

    #[test]
    fn test_contains() {
        let arena = Arena::new(16).unwrap();
        assert!(arena.contains(arena.base()));
        assert!(!arena.contains(arena.base().wrapping_sub(1)));
    }
}
