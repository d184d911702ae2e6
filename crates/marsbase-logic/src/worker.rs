//! Worker model: people and robots behind one capability surface.
//!
//! Scorers see a [`Worker`] and ask it for what they need (location,
//! performance, duty state). Person-only details such as the physical
//! condition, job and preferences are reached through [`Worker::as_person`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::constants::{FavoriteType, JobType, RobotType, RoleType, TaskTrait};
use crate::duty::{MarsClock, ShiftType};
use crate::health::PhysicalCondition;
use crate::oracle::{BuildingId, SettlementId};

pub type WorkerId = u32;

/// Preference scores are clamped to this magnitude.
pub const MAX_PREFERENCE: i32 = 5;

/// Aptitude assumed for traits a person has no recorded value for.
pub const DEFAULT_APTITUDE: f64 = 50.0;

/// Battery level below which a robot stops taking on work.
pub const ROBOT_LOW_BATTERY: f64 = 0.2;

/// Which kind of worker a task applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkerType {
    Person,
    Robot,
    Both,
}

impl WorkerType {
    /// Whether a task declared for `self` accepts a worker of `kind`.
    pub fn accepts(self, kind: WorkerType) -> bool {
        match self {
            WorkerType::Both => true,
            declared => declared == kind,
        }
    }
}

/// Where a worker physically is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LocationCategory {
    Outside,
    InSettlement,
    InVehicle,
    /// Inside a vehicle parked in a settlement garage.
    InGarage,
}

impl LocationCategory {
    pub fn is_inside(self) -> bool {
        !matches!(self, LocationCategory::Outside)
    }

    /// Inside the settlement proper or its garage.
    pub fn is_in_settlement(self) -> bool {
        matches!(
            self,
            LocationCategory::InSettlement | LocationCategory::InGarage
        )
    }
}

/// A colonist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    pub id: WorkerId,
    pub name: String,
    pub settlement: SettlementId,
    pub location: LocationCategory,
    pub building: Option<BuildingId>,
    pub condition: PhysicalCondition,
    pub job: JobType,
    pub role: Option<RoleType>,
    pub shift: ShiftType,
    pub favorite: Option<FavoriteType>,
    /// Natural aptitude per trait, 0..100.
    pub aptitudes: HashMap<TaskTrait, f64>,
    /// Liking for individual tasks by name, -5..=5.
    pub preferences: HashMap<String, i32>,
    /// Has a working suit and the training to go outside.
    pub eva_ready: bool,
}

impl Person {
    pub fn new(id: WorkerId, name: &str, settlement: SettlementId, job: JobType) -> Self {
        Self {
            id,
            name: name.to_string(),
            settlement,
            location: LocationCategory::InSettlement,
            building: None,
            condition: PhysicalCondition::default(),
            job,
            role: None,
            shift: ShiftType::A,
            favorite: None,
            aptitudes: HashMap::new(),
            preferences: HashMap::new(),
            eva_ready: true,
        }
    }

    /// Preference for a task, clamped to ±[`MAX_PREFERENCE`].
    pub fn preference(&self, task: &str) -> i32 {
        self.preferences
            .get(task)
            .copied()
            .unwrap_or(0)
            .clamp(-MAX_PREFERENCE, MAX_PREFERENCE)
    }

    pub fn aptitude(&self, t: TaskTrait) -> f64 {
        self.aptitudes
            .get(&t)
            .copied()
            .unwrap_or(DEFAULT_APTITUDE)
            .clamp(0.0, 100.0)
    }
}

/// A robot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Robot {
    pub id: WorkerId,
    pub name: String,
    pub settlement: SettlementId,
    pub location: LocationCategory,
    pub building: Option<BuildingId>,
    pub robot_type: RobotType,
    /// Charge level, 0..1.
    pub battery: f64,
    pub performance: f64,
}

impl Robot {
    pub fn new(id: WorkerId, name: &str, settlement: SettlementId, robot_type: RobotType) -> Self {
        Self {
            id,
            name: name.to_string(),
            settlement,
            location: LocationCategory::InSettlement,
            building: None,
            robot_type,
            battery: 1.0,
            performance: 1.0,
        }
    }

    pub fn is_low_battery(&self) -> bool {
        self.battery < ROBOT_LOW_BATTERY
    }
}

/// Anything that picks tasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Worker {
    Person(Person),
    Robot(Robot),
}

impl Worker {
    pub fn id(&self) -> WorkerId {
        match self {
            Worker::Person(p) => p.id,
            Worker::Robot(r) => r.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Worker::Person(p) => &p.name,
            Worker::Robot(r) => &r.name,
        }
    }

    /// [`WorkerType::Person`] or [`WorkerType::Robot`], never `Both`.
    pub fn kind(&self) -> WorkerType {
        match self {
            Worker::Person(_) => WorkerType::Person,
            Worker::Robot(_) => WorkerType::Robot,
        }
    }

    pub fn settlement(&self) -> SettlementId {
        match self {
            Worker::Person(p) => p.settlement,
            Worker::Robot(r) => r.settlement,
        }
    }

    pub fn location(&self) -> LocationCategory {
        match self {
            Worker::Person(p) => p.location,
            Worker::Robot(r) => r.location,
        }
    }

    pub fn building(&self) -> Option<BuildingId> {
        match self {
            Worker::Person(p) => p.building,
            Worker::Robot(r) => r.building,
        }
    }

    /// Work performance, 0..1.
    pub fn performance(&self) -> f64 {
        let raw = match self {
            Worker::Person(p) => p.condition.performance,
            Worker::Robot(r) => r.performance,
        };
        raw.clamp(0.0, 1.0)
    }

    /// Robots are always on duty; people follow their shift.
    pub fn is_on_duty(&self, clock: &MarsClock) -> bool {
        match self {
            Worker::Person(p) => p.shift.is_on_duty(clock.millisol),
            Worker::Robot(_) => true,
        }
    }

    pub fn as_person(&self) -> Option<&Person> {
        match self {
            Worker::Person(p) => Some(p),
            Worker::Robot(_) => None,
        }
    }

    pub fn as_robot(&self) -> Option<&Robot> {
        match self {
            Worker::Robot(r) => Some(r),
            Worker::Person(_) => None,
        }
    }
}

impl From<Person> for Worker {
    fn from(p: Person) -> Self {
        Worker::Person(p)
    }
}

impl From<Robot> for Worker {
    fn from(r: Robot) -> Self {
        Worker::Robot(r)
    }
}
