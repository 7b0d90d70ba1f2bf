use crate::object::StructView;
use crate::{InspectResult, VirtAddr};

pub const PROCESS: &str = "process";
pub const PID: &str = "pid";
pub const HANDLES: &str = "handles";
pub const HANDLE: &str = "fs_handle_base";

/// A `struct process`.
#[derive(Clone, Copy)]
pub struct Process<'a> {
    view: StructView<'a>,
}

impl<'a> Process<'a> {
    pub fn new(view: StructView<'a>) -> Self {
        Process { view }
    }

    pub fn addr(&self) -> VirtAddr {
        self.view.addr()
    }

    pub fn view(&self) -> StructView<'a> {
        self.view
    }

    pub fn pid(&self) -> InspectResult<i64> {
        self.view.read_int(PID)
    }

    /// Size of the handle table.
    pub fn handle_slots(&self) -> InspectResult<usize> {
        Ok(self.view.array(HANDLES)?.capacity())
    }

    /// The handle in slot `index`, `None` past the table or for a null slot.
    pub fn handle(&self, index: usize) -> InspectResult<Option<Handle<'a>>> {
        let kernel = self.view.kernel();
        match self.view.array(HANDLES)?.ptr_at(index)? {
            Some(ptr) => Ok(Some(Handle::new(kernel.cast(ptr, HANDLE)?))),
            None => Ok(None),
        }
    }
}

/// An open handle, a `struct fs_handle_base`.
#[derive(Clone, Copy)]
pub struct Handle<'a> {
    view: StructView<'a>,
}

impl<'a> Handle<'a> {
    pub fn new(view: StructView<'a>) -> Self {
        Handle { view }
    }

    pub fn addr(&self) -> VirtAddr {
        self.view.addr()
    }

    pub fn view(&self) -> StructView<'a> {
        self.view
    }
}
