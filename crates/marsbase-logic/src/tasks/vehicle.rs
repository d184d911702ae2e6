//! Vehicle logistics, scanned once per settlement per tick.
//!
//! All three tasks claim the vehicle's own slot, so nobody loads a rover
//! someone else is servicing. Work on a vehicle parked outside is EVA work;
//! see [`crate::settlement::person_modifier`].

use crate::constants::{BuildingFunction, FavoriteType, JobType, RobotType, RoleType};
use crate::descriptor::{TaskDescriptor, TaskScope};
use crate::meta::{JobTarget, MetaTask, ScoringContext};
use crate::oracle::{SettlementId, VehicleInfo};
use crate::rating::ScoreBuilder;
use crate::settlement::{SettlementJob, SettlementMetaTask};
use crate::slot::SlotKey;
use crate::worker::WorkerType;

/// Base score with the whole manifest still to load.
pub const LOAD_WEIGHT: f64 = 500.0;
/// Base score per kg of cargo left aboard.
pub const UNLOAD_PER_KG: f64 = 0.1;
/// Maintenance ratio at which a vehicle is due.
pub const VEHICLE_MAINTENANCE_DUE: f64 = 1.0;
const VEHICLE_MAINTENANCE_WEIGHT: f64 = 100.0;

fn job(
    vehicle: &VehicleInfo,
    verb: &str,
    base: f64,
    outdoor: bool,
    ctx: &ScoringContext<'_>,
) -> SettlementJob {
    SettlementJob {
        target: JobTarget::Vehicle(vehicle.id),
        claim: Some(SlotKey::Vehicle(vehicle.id)),
        base: ScoreBuilder::new()
            .base("cargo", base, ctx.tuning.score_cap)
            .finish(),
        label: format!("{verb} {}", vehicle.name),
        outdoor,
    }
}

/// Nobody holds or reserves the vehicle's slot.
fn is_free(vehicle: &VehicleInfo, ctx: &ScoringContext<'_>) -> bool {
    ctx.colony.has_room(SlotKey::Vehicle(vehicle.id))
}

/// Parked at home with no mission under way.
fn is_idle_at_home(vehicle: &VehicleInfo, settlement: SettlementId) -> bool {
    vehicle.settlement == settlement && !vehicle.on_mission && vehicle.loading.is_none()
}

/// Load a vehicle for its upcoming mission.
pub struct LoadVehicle {
    descriptor: TaskDescriptor,
}

impl LoadVehicle {
    pub fn new() -> Self {
        Self {
            descriptor: TaskDescriptor::new("LoadVehicle", WorkerType::Both, TaskScope::WorkHour)
                .with_favorites(&[FavoriteType::Operation])
                .with_jobs(&[JobType::Pilot, JobType::Trader, JobType::Technician])
                .with_roles(&[RoleType::ChiefOfLogistics, RoleType::LogisticSpecialist])
                .with_robots(&[RobotType::DeliveryBot]),
        }
    }
}

impl Default for LoadVehicle {
    fn default() -> Self {
        Self::new()
    }
}

impl MetaTask for LoadVehicle {
    fn descriptor(&self) -> &TaskDescriptor {
        &self.descriptor
    }

    fn as_settlement(&self) -> Option<&dyn SettlementMetaTask> {
        Some(self)
    }
}

impl SettlementMetaTask for LoadVehicle {
    fn scan(&self, settlement: SettlementId, ctx: &ScoringContext<'_>) -> Vec<SettlementJob> {
        ctx.colony
            .vehicles(settlement)
            .into_iter()
            .filter(|v| v.settlement == settlement && !v.on_mission)
            .filter(|v| is_free(v, ctx))
            .filter_map(|v| {
                let remaining = v.loading.filter(|f| *f > 0.0)?;
                Some(job(v, "Load", remaining.min(1.0) * LOAD_WEIGHT, v.garage.is_none(), ctx))
            })
            .collect()
    }
}

/// Empty a vehicle back from a mission.
pub struct UnloadVehicle {
    descriptor: TaskDescriptor,
}

impl UnloadVehicle {
    pub fn new() -> Self {
        Self {
            descriptor: TaskDescriptor::new("UnloadVehicle", WorkerType::Both, TaskScope::WorkHour)
                .with_favorites(&[FavoriteType::Operation])
                .with_jobs(&[JobType::Pilot, JobType::Trader, JobType::Technician])
                .with_roles(&[RoleType::ChiefOfLogistics, RoleType::LogisticSpecialist])
                .with_robots(&[RobotType::DeliveryBot]),
        }
    }
}

impl Default for UnloadVehicle {
    fn default() -> Self {
        Self::new()
    }
}

impl MetaTask for UnloadVehicle {
    fn descriptor(&self) -> &TaskDescriptor {
        &self.descriptor
    }

    fn as_settlement(&self) -> Option<&dyn SettlementMetaTask> {
        Some(self)
    }
}

impl SettlementMetaTask for UnloadVehicle {
    fn scan(&self, settlement: SettlementId, ctx: &ScoringContext<'_>) -> Vec<SettlementJob> {
        ctx.colony
            .vehicles(settlement)
            .into_iter()
            .filter(|v| is_idle_at_home(v, settlement) && v.cargo_to_unload > 0.0)
            .filter(|v| is_free(v, ctx))
            .map(|v| job(v, "Unload", v.cargo_to_unload * UNLOAD_PER_KG, v.garage.is_none(), ctx))
            .collect()
    }
}

/// Service a vehicle past its maintenance interval, in a garage bay if one
/// is free.
pub struct MaintainVehicle {
    descriptor: TaskDescriptor,
}

impl MaintainVehicle {
    pub fn new() -> Self {
        Self {
            descriptor: TaskDescriptor::new("MaintainVehicle", WorkerType::Both, TaskScope::WorkHour)
                .with_favorites(&[FavoriteType::Tinkering])
                .with_jobs(&[JobType::Engineer, JobType::Technician])
                .with_roles(&[RoleType::EngineeringSpecialist])
                .with_robots(&[RobotType::RepairBot]),
        }
    }
}

impl Default for MaintainVehicle {
    fn default() -> Self {
        Self::new()
    }
}

impl MetaTask for MaintainVehicle {
    fn descriptor(&self) -> &TaskDescriptor {
        &self.descriptor
    }

    fn as_settlement(&self) -> Option<&dyn SettlementMetaTask> {
        Some(self)
    }
}

impl SettlementMetaTask for MaintainVehicle {
    fn scan(&self, settlement: SettlementId, ctx: &ScoringContext<'_>) -> Vec<SettlementJob> {
        let colony = ctx.colony;
        let bay_free = colony
            .buildings(settlement, BuildingFunction::Garage)
            .into_iter()
            .any(|b| colony.has_room(SlotKey::GarageBay(b.id)));
        colony
            .vehicles(settlement)
            .into_iter()
            .filter(|v| is_idle_at_home(v, settlement))
            .filter(|v| v.maintenance_due >= VEHICLE_MAINTENANCE_DUE)
            .filter(|v| is_free(v, ctx))
            .map(|v| {
                let outdoor = v.garage.is_none() && !bay_free;
                job(v, "Service", v.maintenance_due * VEHICLE_MAINTENANCE_WEIGHT, outdoor, ctx)
            })
            .collect()
    }
}
