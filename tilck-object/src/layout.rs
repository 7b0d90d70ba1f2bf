//! Memory layout of the inspected kernel build.
//!
//! The layout plays the part of the debugger's type information: it names
//! the structs the inspector reads, the offset and kind of each of their
//! fields, the enums used to name raw values, and the global tables the
//! resolver walks. A layout is usually loaded from a config file generated
//! for one specific kernel build.

use alloc::{boxed::Box, format, string::String, vec::Vec};
use hashbrown::HashMap;

use crate::{sync, task, InspectError, InspectResult};

/// How a field is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Bool,
    Int { size: usize, signed: bool },
    /// A pointer, optionally to a struct known to the layout.
    Ptr { target: Option<String> },
    /// An integer whose values are named by the enum layout `name`.
    Enum { name: String, size: usize },
    /// An embedded struct.
    Struct(String),
    /// `len` consecutive elements; `len == 0` is a flexible array member.
    Array { elem: Box<FieldKind>, len: usize },
}

impl FieldKind {
    /// A pointer to struct `ty`.
    pub fn ptr_to(ty: &str) -> Self {
        FieldKind::Ptr {
            target: Some(ty.into()),
        }
    }

    pub fn int(size: usize, signed: bool) -> Self {
        FieldKind::Int { size, signed }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLayout {
    pub name: String,
    pub offset: usize,
    pub kind: FieldKind,
}

/// A struct as laid out in memory. Fields are kept in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructLayout {
    pub name: String,
    pub size: usize,
    pub fields: Vec<FieldLayout>,
}

impl StructLayout {
    pub fn new(name: &str, size: usize) -> Self {
        StructLayout {
            name: name.into(),
            size,
            fields: Vec::new(),
        }
    }

    /// Append a field.
    pub fn with_field(mut self, name: &str, offset: usize, kind: FieldKind) -> Self {
        self.fields.push(FieldLayout {
            name: name.into(),
            offset,
            kind,
        });
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldLayout> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Names for the values of a C enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumLayout {
    pub name: String,
    pub values: Vec<(String, i64)>,
}

impl EnumLayout {
    pub fn new(name: &str) -> Self {
        EnumLayout {
            name: name.into(),
            values: Vec::new(),
        }
    }

    pub fn with_value(mut self, name: &str, value: i64) -> Self {
        self.values.push((name.into(), value));
        self
    }

    /// The name of `raw`, if it has one.
    pub fn name_of(&self, raw: i64) -> Option<&str> {
        self.values
            .iter()
            .find(|(_, v)| *v == raw)
            .map(|(n, _)| n.as_str())
    }
}

/// Global tables walked by the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelTables {
    /// Symbol of the task table: `task_slots` pointers to `struct task`,
    /// null for a slot with no live task.
    pub task_table: String,
    pub task_slots: usize,
    /// Symbol of the pointer to the currently scheduled task.
    pub current_task: String,
}

impl Default for KernelTables {
    fn default() -> Self {
        KernelTables {
            task_table: "tilck_tasks".into(),
            task_slots: 64,
            current_task: "__current".into(),
        }
    }
}

/// The complete description of one kernel build.
#[derive(Debug, Clone)]
pub struct KernelLayout {
    pub ptr_size: usize,
    pub tables: KernelTables,
    structs: HashMap<String, StructLayout>,
    enums: HashMap<String, EnumLayout>,
}

impl KernelLayout {
    pub fn new(ptr_size: usize, tables: KernelTables) -> Self {
        KernelLayout {
            ptr_size,
            tables,
            structs: HashMap::new(),
            enums: HashMap::new(),
        }
    }

    /// Add or replace a struct layout.
    pub fn add_struct(&mut self, layout: StructLayout) {
        self.structs.insert(layout.name.clone(), layout);
    }

    /// Add or replace an enum layout.
    pub fn add_enum(&mut self, layout: EnumLayout) {
        self.enums.insert(layout.name.clone(), layout);
    }

    pub fn struct_layout(&self, name: &str) -> InspectResult<&StructLayout> {
        self.structs
            .get(name)
            .ok_or_else(|| InspectError::NoType(name.into()))
    }

    pub fn enum_layout(&self, name: &str) -> Option<&EnumLayout> {
        self.enums.get(name)
    }

    /// Size in bytes of a value of `kind`.
    pub fn size_of(&self, kind: &FieldKind) -> InspectResult<usize> {
        Ok(match kind {
            FieldKind::Bool => 1,
            FieldKind::Int { size, .. } | FieldKind::Enum { size, .. } => *size,
            FieldKind::Ptr { .. } => self.ptr_size,
            FieldKind::Struct(ty) => self.struct_layout(ty)?.size,
            FieldKind::Array { elem, len } => self.size_of(elem)? * len,
        })
    }

    /// Check that every type and field the inspector relies on is described.
    pub fn validate(&self) -> InspectResult {
        const REQUIRED: &[(&str, &[&str])] = &[
            (task::TASK, &[task::TID, task::PI]),
            (task::PROCESS, &[task::PID, task::HANDLES]),
            (task::HANDLE, &[]),
            (sync::WAIT_OBJ, &[sync::TYPE, sync::EXTRA, sync::PTR, sync::DATA]),
            (sync::MWOBJ_ELEM, &[sync::TYPE, sync::WOBJ]),
            (sync::MULTI_OBJ_WAITER, &[sync::COUNT, sync::ELEMS]),
        ];
        for (ty, fields) in REQUIRED {
            let layout = self.struct_layout(ty)?;
            for field in fields.iter() {
                if layout.field(field).is_none() {
                    return Err(InspectError::NoField {
                        ty: (*ty).into(),
                        field: (*field).into(),
                    });
                }
            }
        }
        if let Some(wo_type) = self.enum_layout(sync::WO_TYPE) {
            for kind in sync::WoType::ALL {
                let name = format!("{:?}", kind);
                if wo_type.name_of(kind as i64) != Some(name.as_str()) {
                    return Err(InspectError::EnumMismatch {
                        ty: sync::WO_TYPE.into(),
                        name,
                    });
                }
            }
        }
        Ok(())
    }
}
