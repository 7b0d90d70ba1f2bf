//! Symbol addresses from the kernel ELF image.

use xmas_elf::{
    sections::SectionData,
    symbol_table::{Entry, Entry32, Entry64},
    ElfFile,
};

use crate::SymbolMap;

/// Collect every named entry of every symbol table in the ELF `data`.
///
/// Tilck builds are usually ELF32 (i386), so both classes are accepted.
pub fn load_elf_symbols(data: &[u8]) -> Result<SymbolMap, &'static str> {
    let elf = ElfFile::new(data)?;
    let mut map = SymbolMap::new();
    for section in elf.section_iter() {
        match section.get_data(&elf) {
            Ok(SectionData::SymbolTable32(entries)) => collect::<Entry32>(&elf, entries, &mut map)?,
            Ok(SectionData::SymbolTable64(entries)) => collect::<Entry64>(&elf, entries, &mut map)?,
            Ok(_) => {}
            Err(err) => trace!("elf: skip section: {}", err),
        }
    }
    debug!("elf: {} symbols", map.len());
    Ok(map)
}

fn collect<E: Entry>(elf: &ElfFile, entries: &[E], map: &mut SymbolMap) -> Result<(), &'static str> {
    for e in entries {
        let name = e.get_name(elf)?;
        if !name.is_empty() {
            map.insert(name, e.value() as usize);
        }
    }
    Ok(())
}
