//! A compact 32-bit kernel image for unit tests.

use alloc::boxed::Box;
use tilck_hal::{MemorySnapshot, SymbolMap};

use crate::layout::{EnumLayout, FieldKind, KernelLayout, KernelTables, StructLayout};
use crate::object::Kernel;
use crate::printer::{Dumper, Printers};
use crate::sync::{self, WoType};
use crate::task::{self, HANDLE, PROCESS, TASK};
use crate::VirtAddr;

pub const MAX_HANDLES: usize = 4;
pub const TASK_SLOTS: usize = 4;

const TABLE: VirtAddr = 0x1000;
const CURRENT: VirtAddr = 0x1100;
const HEAP: VirtAddr = 0x10000;
const HEAP_SIZE: usize = 0x10000;

pub fn layout() -> KernelLayout {
    let tables = KernelTables {
        task_table: "tilck_tasks".into(),
        task_slots: TASK_SLOTS,
        current_task: "__current".into(),
    };
    let mut layout = KernelLayout::new(4, tables);
    let wo_type = || FieldKind::Enum {
        name: "wo_type".into(),
        size: 4,
    };
    layout.add_struct(
        StructLayout::new(TASK, 24)
            .with_field(task::TID, 0, FieldKind::int(4, true))
            .with_field(task::PI, 4, FieldKind::ptr_to(PROCESS))
            .with_field(
                "state",
                8,
                FieldKind::Enum {
                    name: "task_state".into(),
                    size: 4,
                },
            )
            .with_field(sync::WOBJ, 12, FieldKind::Struct(sync::WAIT_OBJ.into())),
    );
    layout.add_struct(
        StructLayout::new(PROCESS, 20)
            .with_field(task::PID, 0, FieldKind::int(4, true))
            .with_field(
                task::HANDLES,
                4,
                FieldKind::Array {
                    elem: Box::new(FieldKind::ptr_to(HANDLE)),
                    len: MAX_HANDLES,
                },
            ),
    );
    layout.add_struct(
        StructLayout::new(HANDLE, 12)
            .with_field("fs", 0, FieldKind::Ptr { target: None })
            .with_field("pos", 4, FieldKind::int(8, true)),
    );
    layout.add_struct(
        StructLayout::new(sync::WAIT_OBJ, 12)
            .with_field(sync::PTR, 0, FieldKind::Ptr { target: None })
            .with_field(sync::DATA, 0, FieldKind::int(4, true))
            .with_field(sync::EXTRA, 4, FieldKind::int(2, false))
            .with_field(sync::TYPE, 8, wo_type()),
    );
    layout.add_struct(
        StructLayout::new(sync::MWOBJ_ELEM, 20)
            .with_field(sync::WOBJ, 0, FieldKind::Struct(sync::WAIT_OBJ.into()))
            .with_field("ti", 12, FieldKind::ptr_to(TASK))
            .with_field(sync::TYPE, 16, wo_type()),
    );
    layout.add_struct(
        StructLayout::new(sync::MULTI_OBJ_WAITER, 4)
            .with_field(sync::COUNT, 0, FieldKind::int(4, true))
            .with_field(
                sync::ELEMS,
                4,
                FieldKind::Array {
                    elem: Box::new(FieldKind::Struct(sync::MWOBJ_ELEM.into())),
                    len: 0,
                },
            ),
    );
    layout.add_enum(
        EnumLayout::new("task_state")
            .with_value("TASK_STATE_INVALID", 0)
            .with_value("TASK_STATE_RUNNABLE", 1)
            .with_value("TASK_STATE_RUNNING", 2)
            .with_value("TASK_STATE_SLEEPING", 3)
            .with_value("TASK_STATE_ZOMBIE", 4),
    );
    let mut wo = EnumLayout::new("wo_type");
    for raw in 0..=6u32 {
        if let Ok(kind) = WoType::try_from(raw) {
            wo = wo.with_value(&format!("{:?}", kind), raw as i64);
        }
    }
    layout.add_enum(wo);
    layout
}

/// Kernel memory under construction.
pub struct Fixture {
    pub mem: MemorySnapshot,
    pub symbols: SymbolMap,
    pub layout: KernelLayout,
    pub printers: Printers,
    next: VirtAddr,
}

impl Fixture {
    pub fn new() -> Self {
        let mut mem = MemorySnapshot::new();
        mem.map_zeroed(TABLE, 0x200).unwrap();
        mem.map_zeroed(HEAP, HEAP_SIZE).unwrap();
        let mut symbols = SymbolMap::new();
        symbols.insert("tilck_tasks", TABLE);
        symbols.insert("__current", CURRENT);
        Fixture {
            mem,
            symbols,
            layout: layout(),
            printers: Printers::tilck(),
            next: HEAP,
        }
    }

    pub fn kernel(&self) -> Kernel<'_> {
        Kernel::new(&self.mem, &self.symbols, &self.layout)
    }

    pub fn dumper(&self) -> Dumper<'_> {
        Dumper::new(self.kernel(), &self.printers)
    }

    /// Reserve `size` zeroed bytes.
    pub fn alloc(&mut self, size: usize) -> VirtAddr {
        let addr = self.next;
        self.next = (addr + size + 7) & !7;
        assert!(self.next <= HEAP + HEAP_SIZE, "fixture heap exhausted");
        addr
    }

    pub fn alloc_struct(&mut self, ty: &str) -> VirtAddr {
        let size = self.layout.struct_layout(ty).unwrap().size;
        self.alloc(size)
    }

    /// Store `value` in field `field` of the `struct ty` at `addr`.
    pub fn set(&mut self, ty: &str, addr: VirtAddr, field: &str, value: i64) {
        let layout = self.layout.struct_layout(ty).unwrap();
        let f = layout.field(field).unwrap();
        let size = self.layout.size_of(&f.kind).unwrap();
        let vaddr = addr + f.offset;
        self.mem.write_uint(vaddr, size, value as u64).unwrap();
    }

    pub fn set_slot(&mut self, slot: usize, task: VirtAddr) {
        assert!(slot < TASK_SLOTS);
        self.mem.write_uint(TABLE + slot * 4, 4, task as u64).unwrap();
    }

    pub fn set_current(&mut self, task: VirtAddr) {
        self.mem.write_uint(CURRENT, 4, task as u64).unwrap();
    }

    pub fn add_process(&mut self, pid: i64) -> VirtAddr {
        let p = self.alloc_struct(PROCESS);
        self.set(PROCESS, p, task::PID, pid);
        p
    }

    /// A task in table slot `slot`, owned by the process at `pi` (may be 0).
    pub fn add_task(&mut self, slot: usize, tid: i64, pi: VirtAddr) -> VirtAddr {
        let t = self.alloc_struct(TASK);
        self.set(TASK, t, task::TID, tid);
        self.set(TASK, t, task::PI, pi as i64);
        self.set_slot(slot, t);
        t
    }

    /// A handle stored in slot `index` of `process`.
    pub fn add_handle(&mut self, process: VirtAddr, index: usize) -> VirtAddr {
        assert!(index < MAX_HANDLES);
        let h = self.alloc_struct(HANDLE);
        self.mem
            .write_uint(process + 4 + index * 4, 4, h as u64)
            .unwrap();
        h
    }

    /// Redeclare `wait_obj.extra` as a 32-bit field at the same offset.
    pub fn widen_extra(&mut self) {
        self.layout.add_struct(
            StructLayout::new(sync::WAIT_OBJ, 12)
                .with_field(sync::PTR, 0, FieldKind::Ptr { target: None })
                .with_field(sync::DATA, 0, FieldKind::int(4, true))
                .with_field(sync::EXTRA, 4, FieldKind::int(4, false))
                .with_field(
                    sync::TYPE,
                    8,
                    FieldKind::Enum {
                        name: "wo_type".into(),
                        size: 4,
                    },
                ),
        );
    }

    pub fn set_wait_obj(&mut self, addr: VirtAddr, tag: u32, extra: u16, payload: u64) {
        self.mem.write_uint(addr, 4, payload).unwrap();
        self.mem.write_uint(addr + 4, 2, extra.into()).unwrap();
        self.mem.write_uint(addr + 8, 4, tag.into()).unwrap();
    }

    pub fn set_task_wait(&mut self, task: VirtAddr, tag: u32, extra: u16, payload: u64) {
        self.set_wait_obj(task + 12, tag, extra, payload);
    }

    /// A waiter with `capacity` element slots, the first `elems.len()` of
    /// them active. Inactive slots are filled with garbage.
    pub fn add_waiter(&mut self, elems: &[(u32, u16, VirtAddr)], capacity: usize) -> VirtAddr {
        assert!(elems.len() <= capacity);
        let w = self.alloc(4 + capacity * 20);
        self.set(sync::MULTI_OBJ_WAITER, w, sync::COUNT, elems.len() as i64);
        let garbage = vec![0xa5; (capacity - elems.len()) * 20];
        self.mem.write(w + 4 + elems.len() * 20, &garbage).unwrap();
        for (i, &(tag, extra, ptr)) in elems.iter().enumerate() {
            let e = w + 4 + i * 20;
            self.set_wait_obj(e, tag, extra, ptr as u64);
            self.mem.write_uint(e + 16, 4, tag.into()).unwrap();
        }
        w
    }
}
