//! Tasks, processes and handles.
//!
//! The kernel keeps every live task in one global table of task pointers;
//! a null slot holds no task. Each task points at its process through `pi`,
//! and each process owns a fixed table of handle pointers. Lookups walk
//! these tables and report a missing record as `Ok(None)`.

use alloc::vec::Vec;

use crate::object::{Kernel, StructView};
use crate::sync::{WaitObj, WOBJ};
use crate::{InspectError, InspectResult, VirtAddr};

pub use self::process::*;

mod process;

pub const TASK: &str = "task";
pub const TID: &str = "tid";
pub const PI: &str = "pi";

/// A `struct task`.
#[derive(Clone, Copy)]
pub struct Task<'a> {
    view: StructView<'a>,
}

impl<'a> Task<'a> {
    pub fn new(view: StructView<'a>) -> Self {
        Task { view }
    }

    pub fn addr(&self) -> VirtAddr {
        self.view.addr()
    }

    pub fn view(&self) -> StructView<'a> {
        self.view
    }

    pub fn tid(&self) -> InspectResult<i64> {
        self.view.read_int(TID)
    }

    /// The owning process, `None` if `pi` is null.
    pub fn process(&self) -> InspectResult<Option<Process<'a>>> {
        Ok(self.view.deref(PI)?.map(Process::new))
    }

    /// What the task is blocked on.
    pub fn wait_obj(&self) -> InspectResult<WaitObj> {
        WaitObj::read(&self.view.member(WOBJ)?)
    }
}

impl<'a> Kernel<'a> {
    /// All live tasks, in table slot order.
    pub fn tasks(&self) -> InspectResult<Vec<Task<'a>>> {
        let tables = &self.layout().tables;
        let base = self.symbol(&tables.task_table)?;
        let ptr_size = self.layout().ptr_size;
        let mut tasks = Vec::new();
        for slot in 0..tables.task_slots {
            let ptr = self.read_ptr(base + slot * ptr_size)?;
            if ptr != 0 {
                trace!("task slot {}: {:#x}", slot, ptr);
                tasks.push(Task::new(self.cast(ptr, TASK)?));
            }
        }
        Ok(tasks)
    }

    /// Find the live task with id `tid`.
    pub fn get_task(&self, tid: i64) -> InspectResult<Option<Task<'a>>> {
        for task in self.tasks()? {
            if task.tid()? == tid {
                debug!("tid {} -> task @ {:#x}", tid, task.addr());
                return Ok(Some(task));
            }
        }
        debug!("tid {}: no such task", tid);
        Ok(None)
    }

    /// Find the process with id `pid`, through the processes of live tasks.
    pub fn get_process(&self, pid: i64) -> InspectResult<Option<Process<'a>>> {
        for task in self.tasks()? {
            if let Some(process) = task.process()? {
                if process.pid()? == pid {
                    debug!("pid {} -> process @ {:#x}", pid, process.addr());
                    return Ok(Some(process));
                }
            }
        }
        debug!("pid {}: no such process", pid);
        Ok(None)
    }

    /// Handle `hn` of `process`.
    ///
    /// A negative or out-of-range number and an empty slot are the same miss.
    pub fn get_handle(&self, process: &Process<'a>, hn: i64) -> InspectResult<Option<Handle<'a>>> {
        let handle = match usize::try_from(hn) {
            Ok(index) => process.handle(index)?,
            Err(_) => None,
        };
        match &handle {
            Some(h) => debug!("handle {} of process @ {:#x} -> {:#x}", hn, process.addr(), h.addr()),
            None => debug!("handle {}: no such handle", hn),
        }
        Ok(handle)
    }

    /// The currently scheduled task.
    pub fn current_task(&self) -> InspectResult<Task<'a>> {
        let sym = self.symbol(&self.layout().tables.current_task)?;
        match self.read_ptr(sym)? {
            0 => Err(InspectError::BadState("no current task")),
            ptr => Ok(Task::new(self.cast(ptr, TASK)?)),
        }
    }

    /// The process of the currently scheduled task.
    pub fn current_process(&self) -> InspectResult<Process<'a>> {
        self.current_task()?
            .process()?
            .ok_or(InspectError::BadState("current task has no process"))
    }
}
