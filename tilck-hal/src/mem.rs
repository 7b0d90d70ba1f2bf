//! Raw reads from the inspected kernel.

use crate::{HalError, HalResult, VirtAddr};

/// Read-only view of the target's virtual memory.
///
/// Multi-byte scalars are little-endian, as on every architecture Tilck
/// runs on.
pub trait TargetMemory {
    /// Copy `buf.len()` bytes starting at `vaddr` into `buf`.
    fn read(&self, vaddr: VirtAddr, buf: &mut [u8]) -> HalResult;
}

/// Scalar reads built on [`TargetMemory::read`].
pub trait TargetMemoryExt: TargetMemory {
    /// Read an unsigned integer of `size` bytes.
    fn read_uint(&self, vaddr: VirtAddr, size: usize) -> HalResult<u64> {
        check_size(size)?;
        let mut buf = [0u8; 8];
        self.read(vaddr, &mut buf[..size])?;
        Ok(u64::from_le_bytes(buf))
    }

    /// Read a signed integer of `size` bytes, sign-extended to 64 bits.
    fn read_int(&self, vaddr: VirtAddr, size: usize) -> HalResult<i64> {
        let raw = self.read_uint(vaddr, size)?;
        let shift = 64 - 8 * size as u32;
        Ok(((raw << shift) as i64) >> shift)
    }

    fn read_u8(&self, vaddr: VirtAddr) -> HalResult<u8> {
        self.read_uint(vaddr, 1).map(|v| v as u8)
    }

    fn read_u16(&self, vaddr: VirtAddr) -> HalResult<u16> {
        self.read_uint(vaddr, 2).map(|v| v as u16)
    }

    fn read_u32(&self, vaddr: VirtAddr) -> HalResult<u32> {
        self.read_uint(vaddr, 4).map(|v| v as u32)
    }

    fn read_u64(&self, vaddr: VirtAddr) -> HalResult<u64> {
        self.read_uint(vaddr, 8)
    }
}

impl<T: TargetMemory + ?Sized> TargetMemoryExt for T {}

pub(crate) fn check_size(size: usize) -> HalResult {
    match size {
        1 | 2 | 4 | 8 => Ok(()),
        _ => Err(HalError::BadSize(size)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Constant(u8);

    impl TargetMemory for Constant {
        fn read(&self, _vaddr: VirtAddr, buf: &mut [u8]) -> HalResult {
            buf.fill(self.0);
            Ok(())
        }
    }

    #[test]
    fn sign_extension() {
        let mem = Constant(0xff);
        assert_eq!(mem.read_int(0, 1), Ok(-1));
        assert_eq!(mem.read_int(0, 4), Ok(-1));
        assert_eq!(mem.read_uint(0, 2), Ok(0xffff));
        assert_eq!(mem.read_u32(0), Ok(0xffff_ffff));

        let mem = Constant(0x7f);
        assert_eq!(mem.read_int(0, 2), Ok(0x7f7f));
    }

    #[test]
    fn bad_size() {
        let mem = Constant(0);
        assert_eq!(mem.read_uint(0, 3), Err(HalError::BadSize(3)));
        assert_eq!(mem.read_int(0, 16), Err(HalError::BadSize(16)));
    }
}
