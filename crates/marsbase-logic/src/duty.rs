//! Mars clock, work shifts, meal and sleep windows.
//!
//! Time of day is measured in millisols (1000 per sol). A tick is identified
//! by its [`TickStamp`]: the sol plus the whole millisol.

use serde::{Deserialize, Serialize};

/// Millisols in one sol.
pub const MILLISOLS_PER_SOL: f64 = 1000.0;

/// Simulation time.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MarsClock {
    pub sol: u32,
    /// Time of day, 0.0..1000.0.
    pub millisol: f64,
}

/// Identity of a scheduling tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TickStamp {
    pub sol: u32,
    pub millisol: u32,
}

impl MarsClock {
    /// Create a clock, rolling excess millisols over into later sols.
    pub fn new(sol: u32, millisol: f64) -> Self {
        let mut clock = Self { sol, millisol: 0.0 };
        clock.advance(millisol);
        clock
    }

    /// Move the clock forward. Negative or non-finite amounts are ignored.
    pub fn advance(&mut self, millisols: f64) {
        if !millisols.is_finite() || millisols <= 0.0 {
            return;
        }
        let total = self.millisol + millisols;
        let whole_sols = (total / MILLISOLS_PER_SOL).floor();
        self.sol += whole_sols as u32;
        self.millisol = total - whole_sols * MILLISOLS_PER_SOL;
    }

    /// The tick this time falls in.
    pub fn stamp(&self) -> TickStamp {
        TickStamp {
            sol: self.sol,
            millisol: self.millisol.floor() as u32,
        }
    }
}

/// Work shift of a person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShiftType {
    /// Day shift, 0..500.
    A,
    /// Evening shift, 500..1000.
    B,
    /// Night shift, 750..250 across midnight.
    Z,
    /// Always on duty.
    On,
    /// Never on duty.
    Off,
}

impl ShiftType {
    /// Whether this shift is working at the given time of day.
    pub fn is_on_duty(self, millisol: f64) -> bool {
        match self {
            ShiftType::A => (0.0..500.0).contains(&millisol),
            ShiftType::B => (500.0..1000.0).contains(&millisol),
            ShiftType::Z => !(250.0..750.0).contains(&millisol),
            ShiftType::On => true,
            ShiftType::Off => false,
        }
    }

    /// Sleep window `(start, end)` in millisols, furthest from the shift.
    pub fn sleep_window(self) -> (f64, f64) {
        match self {
            ShiftType::A => (700.0, 950.0),
            ShiftType::B => (150.0, 400.0),
            ShiftType::Z => (400.0, 650.0),
            ShiftType::On | ShiftType::Off => (900.0, 150.0),
        }
    }
}

/// Whether it is sleep time for the given shift.
pub fn is_sleep_time(shift: ShiftType, millisol: f64) -> bool {
    let (start, end) = shift.sleep_window();
    if start < end {
        (start..end).contains(&millisol)
    } else {
        // Wraps midnight
        !(end..start).contains(&millisol)
    }
}

/// Breakfast, lunch and dinner windows.
pub fn is_meal_time(millisol: f64) -> bool {
    (250.0..300.0).contains(&millisol)
        || (500.0..550.0).contains(&millisol)
        || (750.0..800.0).contains(&millisol)
}

/// Night on the settlement's local clock, 900..100 across midnight.
pub fn is_night(millisol: f64) -> bool {
    !(100.0..900.0).contains(&millisol)
}
