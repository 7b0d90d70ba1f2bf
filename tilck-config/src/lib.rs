//! Inspection targets described in TOML.
//!
//! One config file names everything the inspector needs about a kernel
//! build: the pointer size, where the memory image and symbols come from,
//! and the layout of the structs it reads. Relative paths are resolved
//! against the directory of the config file.

#![deny(warnings)]

#[macro_use]
extern crate log;

use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
};
use tilck_hal::{MemorySnapshot, SymbolMap};
use tilck_object::{layout::KernelLayout, object::Kernel};

mod raw;

/// A loaded inspection target.
#[derive(Debug)]
pub struct InspectConfig {
    pub layout: KernelLayout,
    pub symbols: SymbolMap,
    pub memory: MemorySnapshot,
}

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: io::Error },
    Parse(toml::de::Error),
    /// The layout is malformed or lacks something the inspector reads.
    Layout(String),
    Elf { path: PathBuf, reason: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => write!(f, "{}: {}", path.display(), source),
            ConfigError::Parse(e) => write!(f, "invalid config: {}", e),
            ConfigError::Layout(msg) => write!(f, "invalid layout: {}", msg),
            ConfigError::Elf { path, reason } => {
                write!(f, "{}: bad kernel image: {}", path.display(), reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

fn read(path: PathBuf) -> Result<Vec<u8>, ConfigError> {
    fs::read(&path).map_err(|source| ConfigError::Io { path, source })
}

impl InspectConfig {
    /// Load the config file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.into(),
            source,
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        info!("loading {}", path.display());
        Self::from_toml(&text, base)
    }

    /// Parse a config, resolving relative paths against `base_dir`.
    pub fn from_toml(text: &str, base_dir: &Path) -> Result<Self, ConfigError> {
        let raw = toml::from_str::<raw::RawConfig>(text).map_err(ConfigError::Parse)?;
        let layout = raw.layout()?;
        layout
            .validate()
            .map_err(|e| ConfigError::Layout(e.to_string()))?;

        let mut symbols = SymbolMap::new();
        if let Some(elf) = &raw.target.elf {
            let path = base_dir.join(elf);
            let data = read(path.clone())?;
            let found = tilck_hal::load_elf_symbols(&data)
                .map_err(|reason| ConfigError::Elf { path, reason })?;
            debug!("{} symbols from {}", found.len(), elf.display());
            symbols.merge(found);
        }
        for (name, vaddr) in &raw.symbols {
            symbols.insert(name.as_str(), *vaddr as usize);
        }

        let mut memory = MemorySnapshot::new();
        for region in &raw.target.regions {
            let data = read(base_dir.join(&region.file))?;
            let vaddr = region.vaddr as usize;
            debug!(
                "region {:#x}: {} bytes from {}",
                vaddr,
                data.len(),
                region.file.display()
            );
            memory
                .map(vaddr, data)
                .map_err(|e| ConfigError::Layout(format!("{}: {}", region.file.display(), e)))?;
        }
        info!(
            "{} symbols, {} memory regions, {}-bit pointers",
            symbols.len(),
            memory.region_count(),
            layout.ptr_size * 8
        );
        Ok(InspectConfig {
            layout,
            symbols,
            memory,
        })
    }

    pub fn kernel(&self) -> Kernel<'_> {
        Kernel::new(&self.memory, &self.symbols, &self.layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tilck_hal::{SymbolTable, TargetMemoryExt};
    use tilck_object::layout::FieldKind;

    const LAYOUT: &str = r#"
[structs.task]
size = 24
fields = [
    { name = "tid", offset = 0, kind = "i32" },
    { name = "pi", offset = 4, kind = "ptr", type = "process" },
    { name = "state", offset = 8, kind = "enum", type = "task_state" },
    { name = "wobj", offset = 12, kind = "struct", type = "wait_obj" },
]

[structs.process]
size = 20
fields = [
    { name = "pid", offset = 0, kind = "i32" },
    { name = "handles", offset = 4, kind = "array", elem = "ptr", elem-type = "fs_handle_base", len = 4 },
]

[structs.fs_handle_base]
size = 8
fields = [ { name = "pos", offset = 0, kind = "i64" } ]

[structs.wait_obj]
size = 12
fields = [
    { name = "__ptr", offset = 0, kind = "ptr" },
    { name = "__data", offset = 0, kind = "long" },
    { name = "extra", offset = 4, kind = "u16" },
    { name = "type", offset = 8, kind = "enum", type = "wo_type" },
]

[structs.mwobj_elem]
size = 20
fields = [
    { name = "wobj", offset = 0, kind = "struct", type = "wait_obj" },
    { name = "ti", offset = 12, kind = "ptr", type = "task" },
    { name = "type", offset = 16, kind = "enum", type = "wo_type" },
]

[structs.multi_obj_waiter]
size = 4
fields = [
    { name = "count", offset = 0, kind = "i32" },
    { name = "elems", offset = 4, kind = "array", elem = "struct", elem-type = "mwobj_elem", len = 0 },
]

[enums.task_state]
TASK_STATE_RUNNABLE = 1
TASK_STATE_SLEEPING = 3
"#;

    fn config(target: &str) -> String {
        format!("{}\n{}", target, LAYOUT)
    }

    #[test]
    fn layout_and_tables() {
        let text = config("[target]\nptr-size = 4\n[tables]\ntask-slots = 16\n");
        let cfg = InspectConfig::from_toml(&text, Path::new(".")).unwrap();
        assert_eq!(cfg.layout.ptr_size, 4);
        assert_eq!(cfg.layout.tables.task_slots, 16);
        assert_eq!(cfg.layout.tables.task_table, "tilck_tasks");
        assert_eq!(cfg.layout.tables.current_task, "__current");

        let process = cfg.layout.struct_layout("process").unwrap();
        assert_eq!(
            process.field("handles").unwrap().kind,
            FieldKind::Array {
                elem: Box::new(FieldKind::ptr_to("fs_handle_base")),
                len: 4
            }
        );
        let wait_obj = cfg.layout.struct_layout("wait_obj").unwrap();
        let names: Vec<_> = wait_obj.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["__ptr", "__data", "extra", "type"]);
        assert_eq!(
            wait_obj.field("__data").unwrap().kind,
            FieldKind::int(4, true)
        );
        let states = cfg.layout.enum_layout("task_state").unwrap();
        assert_eq!(states.name_of(3), Some("TASK_STATE_SLEEPING"));
    }

    #[test]
    fn regions_and_symbols() {
        let dir = tempfile::tempdir().unwrap();
        let mut f = fs::File::create(dir.path().join("low.bin")).unwrap();
        f.write_all(&[0x78, 0x56, 0x34, 0x12]).unwrap();
        let text = config(
            "[target]\nptr-size = 4\nregions = [ { vaddr = 0xc0001000, file = \"low.bin\" } ]\n\
             [symbols]\n__current = 0xc0001000\n",
        );
        fs::write(dir.path().join("tilck.toml"), text).unwrap();

        let cfg = InspectConfig::load(dir.path().join("tilck.toml")).unwrap();
        assert_eq!(cfg.symbols.lookup("__current"), Some(0xc000_1000));
        assert_eq!(cfg.memory.read_u32(0xc000_1000), Ok(0x1234_5678));
        assert_eq!(
            cfg.kernel().read_ptr(0xc000_1000),
            Ok(0x1234_5678)
        );
    }

    #[test]
    fn missing_region_file() {
        let dir = tempfile::tempdir().unwrap();
        let text = config(
            "[target]\nptr-size = 4\nregions = [ { vaddr = 0x1000, file = \"nope.bin\" } ]\n",
        );
        match InspectConfig::from_toml(&text, dir.path()) {
            Err(ConfigError::Io { path, .. }) => assert_eq!(path, dir.path().join("nope.bin")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn overlapping_regions() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.bin"), [0u8; 16]).unwrap();
        let text = config(
            "[target]\nptr-size = 4\nregions = [ { vaddr = 0x1000, file = \"a.bin\" }, \
             { vaddr = 0x1008, file = \"a.bin\" } ]\n",
        );
        assert!(matches!(
            InspectConfig::from_toml(&text, dir.path()),
            Err(ConfigError::Layout(_))
        ));
    }

    #[test]
    fn bad_layouts() {
        let err = |text: &str| InspectConfig::from_toml(text, Path::new(".")).unwrap_err();

        assert!(matches!(
            err(&config("[target]\nptr-size = 3\n")),
            ConfigError::Layout(_)
        ));
        assert!(matches!(err("[target]\nptr-size = \n"), ConfigError::Parse(_)));
        assert!(matches!(
            err("[target]\nptr-size = 4\ncolor = true\n"),
            ConfigError::Parse(_)
        ));

        // The required structs are missing.
        let e = err("[target]\nptr-size = 4\n");
        assert_eq!(e.to_string(), "invalid layout: no struct type named task");

        let text = config("[target]\nptr-size = 4\n").replace("kind = \"u16\"", "kind = \"short\"");
        assert_eq!(
            err(&text).to_string(),
            "invalid layout: wait_obj.extra: unknown field kind `short`"
        );

        let text = config("[target]\nptr-size = 4\n")
            .replace(", type = \"task_state\"", "");
        assert_eq!(
            err(&text).to_string(),
            "invalid layout: task.state: enum needs `type`"
        );
    }

    #[test]
    fn bad_elf() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("tilck"), b"not an elf").unwrap();
        let text = config("[target]\nptr-size = 4\nelf = \"tilck\"\n");
        assert!(matches!(
            InspectConfig::from_toml(&text, dir.path()),
            Err(ConfigError::Elf { .. })
        ));
    }
}
