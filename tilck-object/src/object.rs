//! Typed views over raw kernel memory.
//!
//! [`Kernel`] bundles the target's memory and symbols with the layout of the
//! build being inspected. Casting an address to a named struct gives a
//! [`StructView`], whose fields are then read by name with the accessor
//! matching their kind. Views are cheap to copy and never cache memory.

use alloc::string::String;
use tilck_hal::{SymbolTable, TargetMemory, TargetMemoryExt, VirtAddr};

use crate::layout::{FieldKind, FieldLayout, KernelLayout, StructLayout};
use crate::{InspectError, InspectResult};

/// Read-only access to one kernel image.
#[derive(Clone, Copy)]
pub struct Kernel<'a> {
    mem: &'a dyn TargetMemory,
    symbols: &'a dyn SymbolTable,
    layout: &'a KernelLayout,
}

impl<'a> Kernel<'a> {
    pub fn new(
        mem: &'a dyn TargetMemory,
        symbols: &'a dyn SymbolTable,
        layout: &'a KernelLayout,
    ) -> Self {
        Kernel {
            mem,
            symbols,
            layout,
        }
    }

    pub fn layout(&self) -> &'a KernelLayout {
        self.layout
    }

    pub fn mem(&self) -> &'a dyn TargetMemory {
        self.mem
    }

    /// Address of the global `name`.
    pub fn symbol(&self, name: &str) -> InspectResult<VirtAddr> {
        self.symbols
            .lookup(name)
            .ok_or_else(|| InspectError::NoSymbol(name.into()))
    }

    /// Read a pointer-sized value at `vaddr`.
    pub fn read_ptr(&self, vaddr: VirtAddr) -> InspectResult<VirtAddr> {
        Ok(self.mem.read_uint(vaddr, self.layout.ptr_size)? as VirtAddr)
    }

    /// Interpret `vaddr` as a `struct ty`. Nothing is read yet.
    pub fn cast(&self, vaddr: VirtAddr, ty: &str) -> InspectResult<StructView<'a>> {
        Ok(StructView {
            kernel: *self,
            layout: self.layout.struct_layout(ty)?,
            addr: vaddr,
        })
    }
}

/// A struct of known type at a known address.
#[derive(Clone, Copy)]
pub struct StructView<'a> {
    kernel: Kernel<'a>,
    layout: &'a StructLayout,
    addr: VirtAddr,
}

impl<'a> StructView<'a> {
    pub fn addr(&self) -> VirtAddr {
        self.addr
    }

    pub fn type_name(&self) -> &'a str {
        &self.layout.name
    }

    pub fn layout(&self) -> &'a StructLayout {
        self.layout
    }

    pub fn kernel(&self) -> Kernel<'a> {
        self.kernel
    }

    pub fn field(&self, name: &str) -> InspectResult<&'a FieldLayout> {
        self.layout.field(name).ok_or_else(|| InspectError::NoField {
            ty: self.layout.name.clone(),
            field: name.into(),
        })
    }

    pub fn field_addr(&self, name: &str) -> InspectResult<VirtAddr> {
        Ok(self.addr + self.field(name)?.offset)
    }

    /// Read an integer, enum or bool field, sign-extending signed integers.
    pub fn read_int(&self, name: &str) -> InspectResult<i64> {
        let field = self.field(name)?;
        let mem = self.kernel.mem;
        let vaddr = self.addr + field.offset;
        match &field.kind {
            FieldKind::Int { size, signed: true } | FieldKind::Enum { size, .. } => {
                Ok(mem.read_int(vaddr, *size)?)
            }
            FieldKind::Int { size, signed: false } => Ok(mem.read_uint(vaddr, *size)? as i64),
            FieldKind::Bool => Ok(mem.read_uint(vaddr, 1)? as i64),
            _ => Err(self.wrong_kind(name, "an integer")),
        }
    }

    /// Read an integer, enum or bool field as unsigned.
    pub fn read_uint(&self, name: &str) -> InspectResult<u64> {
        let field = self.field(name)?;
        let vaddr = self.addr + field.offset;
        match &field.kind {
            FieldKind::Int { size, .. } | FieldKind::Enum { size, .. } => {
                Ok(self.kernel.mem.read_uint(vaddr, *size)?)
            }
            FieldKind::Bool => Ok(self.kernel.mem.read_uint(vaddr, 1)?),
            _ => Err(self.wrong_kind(name, "an integer")),
        }
    }

    /// Read a pointer field.
    pub fn read_ptr(&self, name: &str) -> InspectResult<VirtAddr> {
        let field = self.field(name)?;
        match field.kind {
            FieldKind::Ptr { .. } => self.kernel.read_ptr(self.addr + field.offset),
            _ => Err(self.wrong_kind(name, "a pointer")),
        }
    }

    /// View an embedded struct field.
    pub fn member(&self, name: &str) -> InspectResult<StructView<'a>> {
        let field = self.field(name)?;
        match &field.kind {
            FieldKind::Struct(ty) => self.kernel.cast(self.addr + field.offset, ty),
            _ => Err(self.wrong_kind(name, "a struct")),
        }
    }

    /// Follow a typed pointer field. A null pointer gives `None`.
    pub fn deref(&self, name: &str) -> InspectResult<Option<StructView<'a>>> {
        let field = self.field(name)?;
        let ty = match &field.kind {
            FieldKind::Ptr { target: Some(ty) } => ty,
            _ => return Err(self.wrong_kind(name, "a typed pointer")),
        };
        match self.kernel.read_ptr(self.addr + field.offset)? {
            0 => Ok(None),
            target => self.kernel.cast(target, ty).map(Some),
        }
    }

    /// View an array field.
    pub fn array(&self, name: &str) -> InspectResult<ArrayView<'a>> {
        let field = self.field(name)?;
        match &field.kind {
            FieldKind::Array { elem, len } => Ok(ArrayView {
                kernel: self.kernel,
                elem,
                base: self.addr + field.offset,
                stride: self.kernel.layout.size_of(elem)?,
                capacity: *len,
            }),
            _ => Err(self.wrong_kind(name, "an array")),
        }
    }

    fn wrong_kind(&self, field: &str, expected: &'static str) -> InspectError {
        InspectError::WrongKind {
            ty: self.layout.name.clone(),
            field: String::from(field),
            expected,
        }
    }
}

/// An array field with its declared capacity.
#[derive(Clone, Copy)]
pub struct ArrayView<'a> {
    kernel: Kernel<'a>,
    elem: &'a FieldKind,
    base: VirtAddr,
    stride: usize,
    capacity: usize,
}

impl<'a> ArrayView<'a> {
    /// Declared number of elements; zero for a flexible array member.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Address of element `index`, if it is within the declared capacity.
    pub fn elem_addr(&self, index: usize) -> Option<VirtAddr> {
        (index < self.capacity).then(|| self.base + index * self.stride)
    }

    /// Read pointer element `index`.
    ///
    /// An index past the capacity and a null slot both give `None`.
    pub fn ptr_at(&self, index: usize) -> InspectResult<Option<VirtAddr>> {
        if !matches!(self.elem, FieldKind::Ptr { .. }) {
            return Err(InspectError::WrongKind {
                ty: String::from("array"),
                field: String::from("element"),
                expected: "a pointer",
            });
        }
        let vaddr = match self.elem_addr(index) {
            Some(vaddr) => vaddr,
            None => return Ok(None),
        };
        match self.kernel.read_ptr(vaddr)? {
            0 => Ok(None),
            ptr => Ok(Some(ptr)),
        }
    }

    /// Restrict the array to its first `count` elements.
    ///
    /// The count is taken as-is, also for fixed-size arrays: keeping it within
    /// the capacity is the kernel's invariant.
    pub fn active(self, count: usize) -> BoundedArray<'a> {
        BoundedArray { array: self, count }
    }
}

/// The meaningful prefix of an array: the storage beyond `len()` is never
/// exposed.
#[derive(Clone, Copy)]
pub struct BoundedArray<'a> {
    array: ArrayView<'a>,
    count: usize,
}

impl<'a> BoundedArray<'a> {
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Views of the active struct elements, in array order.
    pub fn structs(&self) -> InspectResult<impl Iterator<Item = StructView<'a>> + 'a> {
        let ty = match self.array.elem {
            FieldKind::Struct(ty) => ty,
            _ => {
                return Err(InspectError::WrongKind {
                    ty: String::from("array"),
                    field: String::from("element"),
                    expected: "a struct",
                })
            }
        };
        let kernel = self.array.kernel;
        let layout = kernel.layout.struct_layout(ty)?;
        let (base, stride) = (self.array.base, self.array.stride);
        Ok((0..self.count).map(move |i| StructView {
            kernel,
            layout,
            addr: base + i * stride,
        }))
    }
}
