//! Shared resource slots: medical beds, garage bays, workstations, repair
//! work on a malfunction, vehicles, airlocks and robot chargers.
//!
//! Scorers only ever read a [`SlotState`]; the claim itself happens when the
//! chosen task executes. The committed count is atomic and claims go through
//! a compare-and-swap, so the capacity invariant also holds if workers are
//! ever scheduled from several threads.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::SlotError;
use crate::oracle::{BuildingId, MalfunctionId, VehicleId};

/// Identity of a contended resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SlotKey {
    Bed(BuildingId),
    GarageBay(BuildingId),
    Workstation(BuildingId),
    RepairWork(MalfunctionId),
    Vehicle(VehicleId),
    Airlock(BuildingId),
    Charger(BuildingId),
}

/// Point-in-time view of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotState {
    pub capacity: u32,
    pub committed: u32,
    pub reserved: bool,
}

impl SlotState {
    /// Free places; a reserved slot has none.
    pub fn remaining(&self) -> u32 {
        if self.reserved {
            0
        } else {
            self.capacity.saturating_sub(self.committed)
        }
    }

    pub fn has_room(&self) -> bool {
        self.remaining() > 0
    }

    /// Committed fraction of capacity; a zero-capacity slot counts as full.
    pub fn occupancy(&self) -> f64 {
        if self.capacity == 0 {
            1.0
        } else {
            self.committed as f64 / self.capacity as f64
        }
    }
}

/// A slot owned by the resource subsystem.
#[derive(Debug)]
pub struct ResourceSlot {
    capacity: u32,
    committed: AtomicU32,
    reserved: AtomicBool,
}

impl ResourceSlot {
    pub fn new(capacity: u32) -> Self {
        Self {
            capacity,
            committed: AtomicU32::new(0),
            reserved: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> SlotState {
        SlotState {
            capacity: self.capacity,
            committed: self.committed.load(Ordering::Acquire),
            reserved: self.reserved.load(Ordering::Acquire),
        }
    }

    /// Take one place. Returns the new committed count.
    pub fn try_claim(&self) -> Result<u32, SlotError> {
        let mut current = self.committed.load(Ordering::Acquire);
        loop {
            if self.reserved.load(Ordering::Acquire) || current >= self.capacity {
                return Err(SlotError::Full);
            }
            match self.committed.compare_exchange_weak(
                current,
                current + 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Ok(current + 1),
                Err(actual) => current = actual,
            }
        }
    }

    /// Give one place back. Returns the new committed count.
    pub fn release(&self) -> Result<u32, SlotError> {
        let mut current = self.committed.load(Ordering::Acquire);
        loop {
            if current == 0 {
                return Err(SlotError::NotClaimed);
            }
            match self.committed.compare_exchange_weak(
                current,
                current - 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Ok(current - 1),
                Err(actual) => current = actual,
            }
        }
    }

    /// Reserve the whole slot, e.g. a vehicle held for a mission.
    pub fn set_reserved(&self, reserved: bool) {
        self.reserved.store(reserved, Ordering::Release);
    }
}

impl Clone for ResourceSlot {
    fn clone(&self) -> Self {
        let state = self.state();
        Self {
            capacity: state.capacity,
            committed: AtomicU32::new(state.committed),
            reserved: AtomicBool::new(state.reserved),
        }
    }
}
