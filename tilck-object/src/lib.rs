//! Tilck kernel objects, as seen from a debugger
//!
//! The crate never runs kernel code: it reads task, process and handle
//! records and the synchronization wait-objects through [`tilck_hal`], using a
//! [`layout::KernelLayout`] that describes the kernel build being inspected.
//!
//! - [`task`]: locate tasks, processes and handles by identifier.
//! - [`sync`]: decode `struct wait_obj` and `struct multi_obj_waiter`.
//! - [`printer`]: structural dumps, with type-specific printers.

#![no_std]
#![deny(warnings, unsafe_code)]

extern crate alloc;

#[macro_use]
extern crate log;

#[cfg(test)]
#[macro_use]
extern crate std;

mod error;
pub mod layout;
pub mod object;
pub mod printer;
pub mod sync;
pub mod task;

#[cfg(test)]
mod fixture;

pub use self::error::*;
pub use tilck_hal::VirtAddr;
