// truststore-rs: X.509 trust store and chain validation
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Reserved-slot object pool for latency-sensitive call paths.
//!
//! Chain validation may run on a real-time-constrained thread where heap
//! allocation latency is unacceptable. Callers reserve fixed-capacity slots
//! up front, then place parsed objects either on the heap or into a slot by
//! index. Each slot's backing buffer is allocated at reservation time, so
//! placing into a slot never touches the allocator. While a thread is in
//! real-time mode every heap path is rejected with a hard error instead of
//! silently falling back.

use crate::{Error, Result};
use std::alloc::{Layout, alloc, dealloc};
use std::any::{Any, TypeId};
use std::cell::Cell;
use std::mem;
use std::ptr::NonNull;

/// Default byte capacity of a generically-sized slot.
pub const DEFAULT_SLOT_CAPACITY: usize = 4 * 1024;

/// Upper bound on slots a single pool will reserve.
const MAX_SLOTS: usize = 4096;
/// Upper bound on a single slot's byte capacity.
const MAX_SLOT_CAPACITY: usize = 1024 * 1024;
/// Alignment every slot buffer provides. Objects with a stricter alignment
/// requirement cannot be slot-placed.
const SLOT_ALIGN: usize = 16;

thread_local! {
    static REAL_TIME_DEPTH: Cell<u32> = const { Cell::new(0) };
}

/// Switches the calling thread into real-time mode. Calls nest.
pub fn enter_real_time_mode() {
    REAL_TIME_DEPTH.with(|depth| depth.set(depth.get() + 1));
}

/// Leaves real-time mode; the thread stays in the mode until the outermost
/// enter has been matched.
pub fn leave_real_time_mode() {
    REAL_TIME_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
}

/// Whether the calling thread is currently in real-time mode.
pub fn real_time_mode() -> bool {
    REAL_TIME_DEPTH.with(|depth| depth.get() > 0)
}

/// Scope guard that holds the calling thread in real-time mode.
pub struct RealTimeSection(());

impl RealTimeSection {
    pub fn enter() -> Self {
        enter_real_time_mode();
        RealTimeSection(())
    }
}

impl Drop for RealTimeSection {
    fn drop(&mut self) {
        leave_real_time_mode();
    }
}

/// Placement target for a pool allocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotHandle {
    /// Ordinary dynamic allocation, rejected in real-time mode.
    Heap,
    /// A previously reserved slot, addressed by index.
    Slot(usize),
}

/// Result of placing a value through the pool.
#[derive(Debug)]
pub enum Placed<T> {
    /// The value lives on the heap, owned by the caller.
    Heap(Box<T>),
    /// The value lives in the pool slot with this index.
    Slot(usize),
}

/// Owned raw buffer backing one slot, allocated once at reservation.
struct SlotBuf {
    ptr: NonNull<u8>,
    layout: Layout,
}

impl SlotBuf {
    fn new(capacity: usize) -> Result<Self> {
        let layout = Layout::from_size_align(capacity, SLOT_ALIGN).map_err(|_| {
            Error::BadAlloc {
                details: format!("cannot lay out a {capacity}-byte slot buffer"),
            }
        })?;
        // SAFETY: capacity is validated non-zero before reservation, so the
        // layout has a non-zero size.
        let ptr = unsafe { alloc(layout) };
        let ptr = NonNull::new(ptr).ok_or_else(|| Error::BadAlloc {
            details: format!("allocation of a {capacity}-byte slot buffer failed"),
        })?;
        Ok(Self { ptr, layout })
    }
}

impl Drop for SlotBuf {
    fn drop(&mut self) {
        // SAFETY: the pointer was allocated with exactly this layout.
        unsafe { dealloc(self.ptr.as_ptr(), self.layout) }
    }
}

/// Type identity and destructor of the value currently in a slot buffer.
struct Occupant {
    type_id: TypeId,
    drop_in_place: unsafe fn(*mut u8),
}

unsafe fn drop_slot_value<T>(ptr: *mut u8) {
    // SAFETY: the caller guarantees `ptr` holds an initialized `T`.
    unsafe { std::ptr::drop_in_place(ptr.cast::<T>()) }
}

struct Slot {
    buf: SlotBuf,
    occupant: Option<Occupant>,
}

impl Slot {
    fn capacity(&self) -> usize {
        self.buf.layout.size()
    }
}

impl Drop for Slot {
    fn drop(&mut self) {
        if let Some(occupant) = self.occupant.take() {
            // SAFETY: the buffer holds an initialized value of the
            // occupant's recorded type.
            unsafe { (occupant.drop_in_place)(self.buf.ptr.as_ptr()) }
        }
    }
}

/// A pool of pre-reserved, fixed-capacity object slots.
///
/// The pool is not internally synchronized; callers serialize mutation the
/// same way they do for the trust store.
#[derive(Default)]
pub struct ObjectPool {
    slots: Vec<Slot>,
}

impl ObjectPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves `n` additional generically-sized slots, allocating each
    /// slot's backing buffer up front.
    ///
    /// Reservation itself allocates and is therefore rejected in real-time
    /// mode; reserve before entering the constrained section.
    pub fn reserve_objects(&mut self, n: usize) -> Result<()> {
        self.reserve_inner(n, |_| DEFAULT_SLOT_CAPACITY)
    }

    /// Reserves one slot per entry of `sizes`, each sized exactly for the
    /// declared object.
    pub fn reserve_sized(&mut self, sizes: &[usize]) -> Result<()> {
        for (i, &size) in sizes.iter().enumerate() {
            if size == 0 || size > MAX_SLOT_CAPACITY {
                return Err(Error::BadAlloc {
                    details: format!("requested slot size {size} at entry {i} is unsupported"),
                });
            }
        }
        self.reserve_inner(sizes.len(), |i| sizes[i])
    }

    fn reserve_inner(&mut self, n: usize, capacity: impl Fn(usize) -> usize) -> Result<()> {
        if real_time_mode() {
            return Err(Error::BadAlloc {
                details: "slot reservation is not permitted in real-time mode".into(),
            });
        }
        if self.slots.len() + n > MAX_SLOTS {
            return Err(Error::BadAlloc {
                details: format!(
                    "reservation of {n} slots exceeds the pool limit of {MAX_SLOTS}"
                ),
            });
        }
        for i in 0..n {
            self.slots.push(Slot {
                buf: SlotBuf::new(capacity(i))?,
                occupant: None,
            });
        }
        Ok(())
    }

    /// Number of reserved slots.
    pub fn reserved(&self) -> usize {
        self.slots.len()
    }

    /// Whether the slot at `index` currently holds an object.
    pub fn is_occupied(&self, index: usize) -> Result<bool> {
        Ok(self.slot(index)?.occupant.is_some())
    }

    /// Places `value` either on the heap or into a reserved slot.
    ///
    /// Heap placement fails with `BadAlloc` while the calling thread is in
    /// real-time mode. Slot placement fails with `UnreservedResource`,
    /// `BusyResource` or `InsufficientResource` per the slot's state.
    pub fn place<T: Any>(&mut self, target: SlotHandle, value: T) -> Result<Placed<T>> {
        match target {
            SlotHandle::Heap => {
                if real_time_mode() {
                    return Err(Error::BadAlloc {
                        details: "heap allocation rejected in real-time mode".into(),
                    });
                }
                Ok(Placed::Heap(Box::new(value)))
            }
            SlotHandle::Slot(index) => {
                let required = mem::size_of::<T>();
                let slot = self.slot_mut(index)?;
                if slot.occupant.is_some() {
                    return Err(Error::BusyResource { index });
                }
                if required > slot.capacity() {
                    return Err(Error::InsufficientResource {
                        index,
                        capacity: slot.capacity(),
                        required,
                    });
                }
                if mem::align_of::<T>() > SLOT_ALIGN {
                    return Err(Error::IncompatibleObject {
                        details: format!(
                            "object alignment {} exceeds the slot alignment {SLOT_ALIGN}",
                            mem::align_of::<T>()
                        ),
                    });
                }
                // SAFETY: the buffer is vacant, large enough and sufficiently
                // aligned for T; writing in place performs no allocation.
                unsafe { slot.buf.ptr.as_ptr().cast::<T>().write(value) };
                slot.occupant = Some(Occupant {
                    type_id: TypeId::of::<T>(),
                    drop_in_place: drop_slot_value::<T>,
                });
                Ok(Placed::Slot(index))
            }
        }
    }

    /// Borrows the object in the slot at `index`.
    pub fn get<T: Any>(&self, index: usize) -> Result<&T> {
        let slot = self.slot(index)?;
        check_occupant_type::<T>(&slot.occupant, index)?;
        // SAFETY: the occupant's recorded type is T, so the buffer holds an
        // initialized T.
        Ok(unsafe { &*slot.buf.ptr.as_ptr().cast::<T>() })
    }

    /// Mutably borrows the object in the slot at `index`.
    pub fn get_mut<T: Any>(&mut self, index: usize) -> Result<&mut T> {
        let slot = self.slot_mut(index)?;
        check_occupant_type::<T>(&slot.occupant, index)?;
        // SAFETY: as in `get`, plus exclusive access through &mut self.
        Ok(unsafe { &mut *slot.buf.ptr.as_ptr().cast::<T>() })
    }

    /// Moves the object out of the slot at `index`, leaving it vacant.
    pub fn take<T: Any>(&mut self, index: usize) -> Result<T> {
        let slot = self.slot_mut(index)?;
        check_occupant_type::<T>(&slot.occupant, index)?;
        slot.occupant = None;
        // SAFETY: the slot held an initialized T and is marked vacant before
        // the value is moved out, so it cannot be dropped twice.
        Ok(unsafe { slot.buf.ptr.as_ptr().cast::<T>().read() })
    }

    /// Drops the slot's occupant, keeping the reservation. Releasing an
    /// already-vacant slot is a no-op.
    pub fn release(&mut self, index: usize) -> Result<()> {
        let slot = self.slot_mut(index)?;
        if let Some(occupant) = slot.occupant.take() {
            // SAFETY: the buffer holds an initialized value of the
            // occupant's recorded type.
            unsafe { (occupant.drop_in_place)(slot.buf.ptr.as_ptr()) }
        }
        Ok(())
    }

    fn slot(&self, index: usize) -> Result<&Slot> {
        self.slots
            .get(index)
            .ok_or(Error::UnreservedResource { index })
    }

    fn slot_mut(&mut self, index: usize) -> Result<&mut Slot> {
        self.slots
            .get_mut(index)
            .ok_or(Error::UnreservedResource { index })
    }
}

fn check_occupant_type<T: Any>(occupant: &Option<Occupant>, index: usize) -> Result<()> {
    let occupant = occupant
        .as_ref()
        .ok_or_else(|| Error::invalid(format!("slot {index} is empty")))?;
    if occupant.type_id != TypeId::of::<T>() {
        return Err(Error::IncompatibleObject {
            details: format!("slot {index} holds a different type"),
        });
    }
    Ok(())
}
