//! Synchronization wait-objects.
//!
//! A sleeping task records what it is blocked on in its `struct wait_obj`.
//! The object's `type` selects how the shared payload word is read: a signed
//! child-wait id for `WOBJ_TASK`, a pointer for every other tag. A task
//! waiting on several objects at once points at a `struct multi_obj_waiter`
//! holding one `struct mwobj_elem` per watched object.

use alloc::format;
use numeric_enum_macro::numeric_enum;

use crate::printer::{Printers, Value};

pub use self::multi_obj::*;
pub use self::wait_obj::*;

mod multi_obj;
mod wait_obj;

pub const WAIT_OBJ: &str = "wait_obj";
pub const MULTI_OBJ_WAITER: &str = "multi_obj_waiter";
pub const MWOBJ_ELEM: &str = "mwobj_elem";
pub const WO_TYPE: &str = "wo_type";

pub const TYPE: &str = "type";
pub const EXTRA: &str = "extra";
pub const PTR: &str = "__ptr";
pub const DATA: &str = "__data";
pub const WOBJ: &str = "wobj";
pub const COUNT: &str = "count";
pub const ELEMS: &str = "elems";

numeric_enum! {
    #[repr(u32)]
    #[allow(non_camel_case_types)]
    #[derive(Debug, Clone, Copy, Eq, PartialEq)]
    pub enum WoType {
        WOBJ_NONE = 0,
        WOBJ_KMUTEX = 1,
        WOBJ_KCOND = 2,
        WOBJ_TASK = 3,
        WOBJ_SEM = 4,
        // The pointer is a `struct multi_obj_waiter`.
        WOBJ_MWO_WAITER = 5,
        // The wait object is embedded in a `struct mwobj_elem`.
        WOBJ_MWO_ELEM = 6,
    }
}

impl WoType {
    pub const ALL: [WoType; 7] = [
        WoType::WOBJ_NONE,
        WoType::WOBJ_KMUTEX,
        WoType::WOBJ_KCOND,
        WoType::WOBJ_TASK,
        WoType::WOBJ_SEM,
        WoType::WOBJ_MWO_WAITER,
        WoType::WOBJ_MWO_ELEM,
    ];
}

/// A raw `enum wo_type` value, with its name when it has one.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Tag {
    pub raw: i64,
    pub kind: Option<WoType>,
}

impl Tag {
    pub fn from_raw(raw: i64) -> Self {
        let kind = u32::try_from(raw)
            .ok()
            .and_then(|v| WoType::try_from(v).ok());
        Tag { raw, kind }
    }

    pub fn value(&self) -> Value {
        Value::Enum {
            name: self.kind.map(|k| format!("{:?}", k)),
            raw: self.raw,
        }
    }
}

impl From<WoType> for Tag {
    fn from(kind: WoType) -> Self {
        Tag {
            raw: kind as u32 as i64,
            kind: Some(kind),
        }
    }
}

/// Register the printers for `wait_obj`, `multi_obj_waiter` and `mwobj_elem`.
pub fn register_printers(printers: &mut Printers) {
    printers.register(WaitObjPrinter);
    printers.register(MultiObjWaiterPrinter);
    printers.register(MwobjElemPrinter);
}
