//! Sparse in-memory image of the target.

use alloc::{collections::BTreeMap, vec, vec::Vec};

use crate::mem::check_size;
use crate::{HalError, HalResult, TargetMemory, VirtAddr};

/// A frozen copy of (part of) the kernel's address space.
///
/// Regions never overlap. Reads may cross from one region into an adjacent
/// one; any byte not covered by a region fails with [`HalError::Unmapped`].
#[derive(Debug, Default, Clone)]
pub struct MemorySnapshot {
    regions: BTreeMap<VirtAddr, Vec<u8>>,
}

impl MemorySnapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `data` at `vaddr`.
    pub fn map(&mut self, vaddr: VirtAddr, data: Vec<u8>) -> HalResult {
        if data.is_empty() {
            return Ok(());
        }
        let end = vaddr
            .checked_add(data.len())
            .ok_or(HalError::Overlap { vaddr })?;
        if let Some((&start, prev)) = self.regions.range(..end).next_back() {
            if start + prev.len() > vaddr {
                return Err(HalError::Overlap { vaddr });
            }
        }
        debug!("snapshot: map [{:#x}, {:#x})", vaddr, end);
        self.regions.insert(vaddr, data);
        Ok(())
    }

    /// Map `len` zero bytes at `vaddr`.
    pub fn map_zeroed(&mut self, vaddr: VirtAddr, len: usize) -> HalResult {
        self.map(vaddr, vec![0; len])
    }

    /// Number of mapped regions.
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// Overwrite already mapped bytes at `vaddr`.
    pub fn write(&mut self, vaddr: VirtAddr, data: &[u8]) -> HalResult {
        let mut done = 0;
        while done < data.len() {
            let (chunk, offset) = self.locate_mut(vaddr + done, data.len())?;
            let n = (chunk.len() - offset).min(data.len() - done);
            chunk[offset..offset + n].copy_from_slice(&data[done..done + n]);
            done += n;
        }
        Ok(())
    }

    /// Store the low `size` bytes of `value` at `vaddr`, little-endian.
    pub fn write_uint(&mut self, vaddr: VirtAddr, size: usize, value: u64) -> HalResult {
        check_size(size)?;
        self.write(vaddr, &value.to_le_bytes()[..size])
    }

    fn locate(&self, vaddr: VirtAddr, len: usize) -> HalResult<(&[u8], usize)> {
        match self.regions.range(..=vaddr).next_back() {
            Some((&start, data)) if vaddr < start + data.len() => Ok((data, vaddr - start)),
            _ => Err(HalError::Unmapped { vaddr, len }),
        }
    }

    fn locate_mut(&mut self, vaddr: VirtAddr, len: usize) -> HalResult<(&mut [u8], usize)> {
        match self.regions.range_mut(..=vaddr).next_back() {
            Some((&start, data)) if vaddr < start + data.len() => Ok((data, vaddr - start)),
            _ => Err(HalError::Unmapped { vaddr, len }),
        }
    }
}

impl TargetMemory for MemorySnapshot {
    fn read(&self, vaddr: VirtAddr, buf: &mut [u8]) -> HalResult {
        trace!("snapshot read: vaddr={:#x}, len={:#x}", vaddr, buf.len());
        let len = buf.len();
        let mut done = 0;
        while done < len {
            let (chunk, offset) = self
                .locate(vaddr + done, len - done)
                .map_err(|_| HalError::Unmapped { vaddr, len })?;
            let n = (chunk.len() - offset).min(len - done);
            buf[done..done + n].copy_from_slice(&chunk[offset..offset + n]);
            done += n;
        }
        Ok(())
    }
}
