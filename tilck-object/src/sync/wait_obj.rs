use alloc::{format, string::String, vec, vec::Vec};
use core::fmt;

use super::{Tag, WoType, DATA, EXTRA, MULTI_OBJ_WAITER, PTR, TYPE, WAIT_OBJ};
use crate::object::StructView;
use crate::printer::{Dumper, Field, PrettyPrinter, Value};
use crate::{InspectResult, VirtAddr};

/// What a task blocked in `WOBJ_TASK` is waiting for, by the sign of the
/// stored id.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ChildWait {
    /// Any child in the process group `-id`.
    AnyChildInGroup(u64),
    /// Any child at all (`-1`).
    AnyChild,
    /// Any child in the waiter's own process group (`0`).
    AnyChildSameGroup,
    /// The task with this tid.
    Task(i64),
}

impl From<i64> for ChildWait {
    fn from(id: i64) -> Self {
        match id {
            id if id < -1 => ChildWait::AnyChildInGroup(id.unsigned_abs()),
            -1 => ChildWait::AnyChild,
            0 => ChildWait::AnyChildSameGroup,
            tid => ChildWait::Task(tid),
        }
    }
}

impl ChildWait {
    /// A specific tid is shown as a number, the wildcard classes as text.
    pub fn value(&self) -> Value {
        match self {
            ChildWait::Task(tid) => Value::Int(*tid),
            other => Value::Text(format!("{}", other)),
        }
    }
}

impl fmt::Display for ChildWait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChildWait::AnyChildInGroup(pgid) => write!(f, "<any child with pgid = {}>", pgid),
            ChildWait::AnyChild => f.write_str("<any child>"),
            ChildWait::AnyChildSameGroup => f.write_str("<any child with same pgid>"),
            ChildWait::Task(tid) => write!(f, "{}", tid),
        }
    }
}

/// The payload of a wait object, read the one way its tag selects.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum WaitPayload {
    /// `WOBJ_NONE`: the task waits on nothing.
    Empty,
    ChildWait(ChildWait),
    /// A `struct multi_obj_waiter`.
    Waiter(VirtAddr),
    /// An object the inspector does not look into.
    PointerTarget(VirtAddr),
}

/// A decoded `struct wait_obj`.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct WaitObj {
    pub tag: Tag,
    pub extra: u64,
    pub payload: WaitPayload,
}

impl WaitObj {
    pub fn read(view: &StructView<'_>) -> InspectResult<Self> {
        let tag = Tag::from_raw(view.read_int(TYPE)?);
        let payload = match tag.kind {
            Some(WoType::WOBJ_NONE) => {
                return Ok(WaitObj {
                    tag,
                    extra: 0,
                    payload: WaitPayload::Empty,
                })
            }
            Some(WoType::WOBJ_TASK) => WaitPayload::ChildWait(view.read_int(DATA)?.into()),
            Some(WoType::WOBJ_MWO_WAITER) => WaitPayload::Waiter(view.read_ptr(PTR)?),
            Some(
                WoType::WOBJ_KMUTEX | WoType::WOBJ_KCOND | WoType::WOBJ_SEM | WoType::WOBJ_MWO_ELEM,
            )
            | None => WaitPayload::PointerTarget(view.read_ptr(PTR)?),
        };
        let extra = view.read_uint(EXTRA)?;
        Ok(WaitObj {
            tag,
            extra,
            payload,
        })
    }

    pub fn is_waiting(&self) -> bool {
        self.payload != WaitPayload::Empty
    }

    /// Display fields: none for an empty wait object, else `type`, `extra`
    /// and the payload. A multi-object waiter is expanded one level.
    pub fn fields(&self, dumper: &Dumper<'_>) -> InspectResult<Vec<Field>> {
        let payload = match self.payload {
            WaitPayload::Empty => return Ok(Vec::new()),
            WaitPayload::ChildWait(wait) => Field::new("tid", wait.value()),
            WaitPayload::Waiter(ptr) => Field::new("ptr", dumper.dump_at(ptr, MULTI_OBJ_WAITER)?),
            WaitPayload::PointerTarget(ptr) => Field::new("ptr", Value::Ptr(ptr)),
        };
        Ok(vec![
            Field::new("type", self.tag.value()),
            Field::new("extra", Value::UInt(self.extra)),
            payload,
        ])
    }
}

pub struct WaitObjPrinter;

impl PrettyPrinter for WaitObjPrinter {
    fn type_name(&self) -> &'static str {
        WAIT_OBJ
    }

    fn header(&self, view: &StructView<'_>) -> Option<String> {
        Some(format!("struct wait_obj @ {:#x}", view.addr()))
    }

    fn children(&self, dumper: &Dumper<'_>, view: &StructView<'_>) -> InspectResult<Vec<Field>> {
        WaitObj::read(view)?.fields(dumper)
    }
}
