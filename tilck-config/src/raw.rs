//! The on-disk format, before conversion.

use serde_derive::Deserialize;
use std::{collections::HashMap, path::PathBuf};
use tilck_object::layout::{EnumLayout, FieldKind, KernelLayout, KernelTables, StructLayout};

use crate::ConfigError;

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawConfig {
    pub target: RawTarget,
    #[serde(default)]
    pub symbols: HashMap<String, u64>,
    #[serde(default)]
    pub tables: RawTables,
    #[serde(default)]
    pub enums: HashMap<String, HashMap<String, i64>>,
    #[serde(default)]
    pub structs: HashMap<String, RawStruct>,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawTarget {
    #[serde(rename(deserialize = "ptr-size"))]
    pub ptr_size: usize,
    pub elf: Option<PathBuf>,
    #[serde(default)]
    pub regions: Vec<RawRegion>,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawRegion {
    pub vaddr: u64,
    pub file: PathBuf,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawTables {
    #[serde(rename(deserialize = "task-table"))]
    pub task_table: Option<String>,
    #[serde(rename(deserialize = "task-slots"))]
    pub task_slots: Option<usize>,
    #[serde(rename(deserialize = "current-task"))]
    pub current_task: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawStruct {
    pub size: usize,
    #[serde(default)]
    pub fields: Vec<RawField>,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawField {
    pub name: String,
    pub offset: usize,
    pub kind: String,
    #[serde(rename(deserialize = "type"))]
    pub ty: Option<String>,
    pub size: Option<usize>,
    pub len: Option<usize>,
    pub elem: Option<String>,
    #[serde(rename(deserialize = "elem-type"))]
    pub elem_type: Option<String>,
}

impl RawTables {
    fn convert(&self) -> KernelTables {
        let default = KernelTables::default();
        KernelTables {
            task_table: self.task_table.clone().unwrap_or(default.task_table),
            task_slots: self.task_slots.unwrap_or(default.task_slots),
            current_task: self.current_task.clone().unwrap_or(default.current_task),
        }
    }
}

impl RawConfig {
    /// Build the kernel layout. Struct fields keep their file order.
    pub fn layout(&self) -> Result<KernelLayout, ConfigError> {
        let ptr_size = self.target.ptr_size;
        if ptr_size != 4 && ptr_size != 8 {
            return Err(ConfigError::Layout(format!(
                "ptr-size must be 4 or 8, not {}",
                ptr_size
            )));
        }
        let mut layout = KernelLayout::new(ptr_size, self.tables.convert());
        for (name, raw) in &self.structs {
            let mut s = StructLayout::new(name, raw.size);
            for f in &raw.fields {
                let kind = field_kind(f, ptr_size)
                    .map_err(|e| ConfigError::Layout(format!("{}.{}: {}", name, f.name, e)))?;
                s = s.with_field(&f.name, f.offset, kind);
            }
            layout.add_struct(s);
        }
        for (name, values) in &self.enums {
            let mut values: Vec<_> = values.iter().collect();
            values.sort_by(|(an, av), (bn, bv)| av.cmp(bv).then_with(|| an.cmp(bn)));
            let e = values
                .into_iter()
                .fold(EnumLayout::new(name), |e, (n, v)| e.with_value(n, *v));
            layout.add_enum(e);
        }
        Ok(layout)
    }
}

fn field_kind(f: &RawField, ptr_size: usize) -> Result<FieldKind, String> {
    if f.kind == "array" {
        let elem = f.elem.as_deref().ok_or("array needs `elem`")?;
        if elem == "array" {
            return Err("nested arrays are not supported".into());
        }
        let len = f.len.ok_or("array needs `len`")?;
        let elem = scalar_kind(elem, f.elem_type.as_ref(), None, ptr_size)?;
        return Ok(FieldKind::Array {
            elem: Box::new(elem),
            len,
        });
    }
    scalar_kind(&f.kind, f.ty.as_ref(), f.size, ptr_size)
}

fn scalar_kind(
    kind: &str,
    ty: Option<&String>,
    size: Option<usize>,
    ptr_size: usize,
) -> Result<FieldKind, String> {
    let named = |what: &str| {
        ty.cloned()
            .ok_or_else(|| format!("{} needs `type`", what))
    };
    Ok(match kind {
        "bool" => FieldKind::Bool,
        "i8" => FieldKind::int(1, true),
        "u8" => FieldKind::int(1, false),
        "i16" => FieldKind::int(2, true),
        "u16" => FieldKind::int(2, false),
        "i32" => FieldKind::int(4, true),
        "u32" => FieldKind::int(4, false),
        "i64" => FieldKind::int(8, true),
        "u64" => FieldKind::int(8, false),
        "long" => FieldKind::int(ptr_size, true),
        "ulong" => FieldKind::int(ptr_size, false),
        "ptr" => FieldKind::Ptr { target: ty.cloned() },
        "enum" => FieldKind::Enum {
            name: named("enum")?,
            size: size.unwrap_or(4),
        },
        "struct" => FieldKind::Struct(named("struct")?),
        other => return Err(format!("unknown field kind `{}`", other)),
    })
}
