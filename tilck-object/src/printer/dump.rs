use alloc::string::{String, ToString};
use alloc::vec::Vec;
use tilck_hal::TargetMemoryExt;

use super::{Composite, Field, Printers, Value};
use crate::layout::FieldKind;
use crate::object::{Kernel, StructView};
use crate::{InspectResult, VirtAddr};

/// Structural dump of kernel records.
///
/// Registered printers take over their types; any other struct is dumped
/// field by field in layout order. Pointers are shown, never followed.
pub struct Dumper<'a> {
    kernel: Kernel<'a>,
    printers: &'a Printers,
}

impl<'a> Dumper<'a> {
    pub fn new(kernel: Kernel<'a>, printers: &'a Printers) -> Self {
        Dumper { kernel, printers }
    }

    pub fn kernel(&self) -> Kernel<'a> {
        self.kernel
    }

    /// Dump the `struct ty` at `vaddr`.
    pub fn dump_at(&self, vaddr: VirtAddr, ty: &str) -> InspectResult<Value> {
        let view = self.kernel.cast(vaddr, ty)?;
        self.dump(&view)
    }

    pub fn dump(&self, view: &StructView<'a>) -> InspectResult<Value> {
        if let Some(printer) = self.printers.get(view.type_name()) {
            trace!("dump {} @ {:#x} with printer", view.type_name(), view.addr());
            return Ok(Value::Composite(Composite {
                header: printer.header(view),
                hint: printer.display_hint(),
                children: printer.children(self, view)?,
            }));
        }
        trace!("dump {} @ {:#x}", view.type_name(), view.addr());
        let children = view
            .layout()
            .fields
            .iter()
            .map(|f| {
                let value = self.dump_value(view.addr() + f.offset, &f.kind)?;
                Ok(Field::new(f.name.clone(), value))
            })
            .collect::<InspectResult<Vec<_>>>()?;
        Ok(Value::Composite(Composite::structure(children)))
    }

    /// Dump one value of `kind` at `vaddr`.
    pub fn dump_value(&self, vaddr: VirtAddr, kind: &FieldKind) -> InspectResult<Value> {
        let mem = self.kernel.mem();
        let layout = self.kernel.layout();
        Ok(match kind {
            FieldKind::Bool => Value::Bool(mem.read_uint(vaddr, 1)? != 0),
            FieldKind::Int { size, signed: true } => Value::Int(mem.read_int(vaddr, *size)?),
            FieldKind::Int {
                size,
                signed: false,
            } => Value::UInt(mem.read_uint(vaddr, *size)?),
            FieldKind::Ptr { .. } => Value::Ptr(self.kernel.read_ptr(vaddr)?),
            FieldKind::Enum { name, size } => {
                let raw = mem.read_int(vaddr, *size)?;
                let name = layout
                    .enum_layout(name)
                    .and_then(|e| e.name_of(raw))
                    .map(String::from);
                Value::Enum { name, raw }
            }
            FieldKind::Struct(ty) => self.dump_at(vaddr, ty)?,
            FieldKind::Array { elem, len } => {
                let stride = layout.size_of(elem)?;
                let children = (0..*len)
                    .map(|i| {
                        let value = self.dump_value(vaddr + i * stride, elem)?;
                        Ok(Field::new(i.to_string(), value))
                    })
                    .collect::<InspectResult<Vec<_>>>()?;
                Value::Composite(Composite::array(children))
            }
        })
    }
}
