//! Symbol lookup.

use alloc::string::String;
use hashbrown::HashMap;

use crate::VirtAddr;

/// Resolves global kernel symbols to their addresses.
pub trait SymbolTable {
    fn lookup(&self, name: &str) -> Option<VirtAddr>;
}

/// A plain name to address map.
#[derive(Debug, Default, Clone)]
pub struct SymbolMap {
    map: HashMap<String, VirtAddr>,
}

impl SymbolMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace `name`.
    pub fn insert(&mut self, name: impl Into<String>, vaddr: VirtAddr) {
        self.map.insert(name.into(), vaddr);
    }

    /// Add every entry of `other`, replacing existing names.
    pub fn merge(&mut self, other: SymbolMap) {
        self.map.extend(other.map);
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl SymbolTable for SymbolMap {
    fn lookup(&self, name: &str) -> Option<VirtAddr> {
        self.map.get(name).copied()
    }
}
