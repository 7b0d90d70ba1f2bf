//! Target access layer for Tilck kernel inspection
//!
//! Everything above this crate only ever *reads* the inspected kernel: a
//! stopped machine or a static core snapshot, seen through [`TargetMemory`]
//! and [`SymbolTable`].
//!
//! # Feature flags
//!
//! - `elf`: Enables [`load_elf_symbols`] to read symbol addresses from the
//!   kernel image.

#![no_std]
#![deny(warnings, unsafe_code)]

extern crate alloc;

#[macro_use]
extern crate log;

#[cfg(test)]
#[macro_use]
extern crate std;

pub mod defs {
    use core::fmt;

    /// Virtual address in the inspected kernel.
    pub type VirtAddr = usize;

    /// The error type which is returned from raw target accesses.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum HalError {
        /// Some byte of `[vaddr, vaddr + len)` is not backed by the target.
        Unmapped { vaddr: VirtAddr, len: usize },
        /// Scalar reads and writes only come in 1, 2, 4 or 8 bytes.
        BadSize(usize),
        /// A new region would overlap an already mapped one.
        Overlap { vaddr: VirtAddr },
    }

    /// The result type returned by raw target accesses.
    pub type HalResult<T = ()> = core::result::Result<T, HalError>;

    impl fmt::Display for HalError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                HalError::Unmapped { vaddr, len } => {
                    write!(f, "cannot access memory at {:#x} ({} bytes)", vaddr, len)
                }
                HalError::BadSize(size) => write!(f, "unsupported scalar size {}", size),
                HalError::Overlap { vaddr } => {
                    write!(f, "region at {:#x} overlaps a mapped region", vaddr)
                }
            }
        }
    }
}

#[cfg(feature = "elf")]
mod elf;
mod mem;
mod snapshot;
mod symbols;

pub use self::defs::*;
#[cfg(feature = "elf")]
pub use self::elf::load_elf_symbols;
pub use self::mem::{TargetMemory, TargetMemoryExt};
pub use self::snapshot::MemorySnapshot;
pub use self::symbols::{SymbolMap, SymbolTable};
