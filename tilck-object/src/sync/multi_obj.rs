use alloc::string::{String, ToString};
use alloc::{format, vec, vec::Vec};

use super::{Tag, COUNT, ELEMS, EXTRA, MULTI_OBJ_WAITER, MWOBJ_ELEM, PTR, TYPE, WOBJ};
use crate::object::{BoundedArray, StructView};
use crate::printer::{DisplayHint, Dumper, Field, PrettyPrinter, Value};
use crate::{InspectResult, VirtAddr};

/// A `struct multi_obj_waiter`: `count` active elements in a flexible array.
#[derive(Clone, Copy)]
pub struct MultiObjWaiter<'a> {
    view: StructView<'a>,
    count: usize,
}

impl<'a> MultiObjWaiter<'a> {
    /// Read the waiter's count. The elements are read on demand, never
    /// past the count.
    pub fn read(view: StructView<'a>) -> InspectResult<Self> {
        let raw = view.read_int(COUNT)?;
        let count = usize::try_from(raw).unwrap_or_else(|_| {
            warn!(
                "multi_obj_waiter @ {:#x}: negative count {}, showing no elements",
                view.addr(),
                raw
            );
            0
        });
        Ok(MultiObjWaiter { view, count })
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn elems(&self) -> InspectResult<BoundedArray<'a>> {
        Ok(self.view.array(ELEMS)?.active(self.count))
    }

    /// Decode every active element.
    pub fn decode(&self) -> InspectResult<Vec<MwobjElem>> {
        self.elems()?
            .structs()?
            .map(|elem| MwobjElem::read(&elem))
            .collect()
    }
}

/// One watched object of a multi-object waiter.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct MwobjElem {
    pub addr: VirtAddr,
    pub tag: Tag,
    pub extra: u64,
    /// The watched object. Shown, never followed.
    pub ptr: VirtAddr,
}

impl MwobjElem {
    pub fn read(view: &StructView<'_>) -> InspectResult<Self> {
        let wobj = view.member(WOBJ)?;
        Ok(MwobjElem {
            addr: view.addr(),
            tag: Tag::from_raw(view.read_int(TYPE)?),
            extra: wobj.read_uint(EXTRA)?,
            ptr: wobj.read_ptr(PTR)?,
        })
    }

    pub fn fields(&self) -> Vec<Field> {
        vec![
            Field::new("type", self.tag.value()),
            Field::new("extra", Value::UInt(self.extra)),
            Field::new("ptr", Value::Ptr(self.ptr)),
        ]
    }
}

pub struct MultiObjWaiterPrinter;

impl PrettyPrinter for MultiObjWaiterPrinter {
    fn type_name(&self) -> &'static str {
        MULTI_OBJ_WAITER
    }

    fn display_hint(&self) -> DisplayHint {
        DisplayHint::Array
    }

    fn header(&self, view: &StructView<'_>) -> Option<String> {
        Some(format!("struct multi_obj_waiter @ {:#x}", view.addr()))
    }

    fn children(&self, dumper: &Dumper<'_>, view: &StructView<'_>) -> InspectResult<Vec<Field>> {
        let waiter = MultiObjWaiter::read(*view)?;
        waiter
            .elems()?
            .structs()?
            .enumerate()
            .map(|(i, elem)| Ok(Field::new(i.to_string(), dumper.dump(&elem)?)))
            .collect()
    }
}

pub struct MwobjElemPrinter;

impl PrettyPrinter for MwobjElemPrinter {
    fn type_name(&self) -> &'static str {
        MWOBJ_ELEM
    }

    fn header(&self, _view: &StructView<'_>) -> Option<String> {
        Some(String::from("mwobj_elem"))
    }

    fn children(&self, _dumper: &Dumper<'_>, view: &StructView<'_>) -> InspectResult<Vec<Field>> {
        Ok(MwobjElem::read(view)?.fields())
    }
}
