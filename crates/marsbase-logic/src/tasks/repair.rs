//! Keeping buildings running: malfunction repair and scheduled maintenance.

use std::cmp::Reverse;

use crate::constants::{FavoriteType, JobType, RobotType, RoleType, TaskTrait};
use crate::descriptor::{TaskDescriptor, TaskScope};
use crate::error::ScoringFault;
use crate::meta::{JobTarget, MetaTask, Offer, ScoringContext};
use crate::modifiers::{radiation_modifier, shift_modifier};
use crate::oracle::{BuildingInfo, MaintenanceInfo};
use crate::rating::ScoreBuilder;
use crate::slot::SlotKey;
use crate::worker::{Worker, WorkerType};

use super::{in_settlement, is_fit, social};

/// Base score per point of malfunction severity (1..100).
pub const REPAIR_SEVERITY_WEIGHT: f64 = 30.0;

/// Buildings less than this far through their inspection window are skipped.
pub const MIN_OVERDUE_RATIO: f64 = 0.5;
const MAINTENANCE_WEIGHT: f64 = 100.0;

/// Fix the most severe malfunction that still has room for a repairer.
///
/// Any-hour: emergencies pull people in off shift too, at a discount.
pub struct RepairMalfunction {
    descriptor: TaskDescriptor,
}

impl RepairMalfunction {
    pub fn new() -> Self {
        Self {
            descriptor: TaskDescriptor::new(
                "RepairMalfunction",
                WorkerType::Both,
                TaskScope::AnyHour,
            )
            .with_favorites(&[FavoriteType::Tinkering])
            .with_traits(&[TaskTrait::Strength])
            .with_jobs(&[JobType::Engineer, JobType::Technician])
            .with_roles(&[RoleType::ChiefOfEngineering, RoleType::EngineeringSpecialist])
            .with_robots(&[RobotType::RepairBot]),
        }
    }
}

impl Default for RepairMalfunction {
    fn default() -> Self {
        Self::new()
    }
}

impl MetaTask for RepairMalfunction {
    fn descriptor(&self) -> &TaskDescriptor {
        &self.descriptor
    }

    fn rate(&self, worker: &Worker, ctx: &ScoringContext<'_>) -> Result<Offer, ScoringFault> {
        let gates = ScoreBuilder::new()
            .gate("in settlement", in_settlement(worker))
            .gate("fit", is_fit(worker, ctx));
        if gates.is_rejected() {
            return Ok(Offer::new(gates.finish()));
        }

        let colony = ctx.colony;
        let settlement = worker.settlement();
        let hazard = colony.radiation(settlement);
        let can_go_out =
            worker.as_person().is_some_and(|p| p.eva_ready) && !hazard.is_lethal_outside();

        let malfunctions = colony.malfunctions(settlement);
        let worst = malfunctions.iter().map(|m| m.severity).max().unwrap_or(0);
        let best = malfunctions
            .iter()
            .filter(|m| !m.needs_eva || can_go_out)
            .filter(|m| colony.has_room(SlotKey::RepairWork(m.id)))
            .max_by_key(|m| (m.severity, Reverse(m.id)))
            .copied();
        let severity = best.map_or(worst, |m| m.severity);
        let outdoor = best.is_some_and(|m| m.needs_eva);
        let site = best.and_then(|m| colony.building(m.building));

        let m = gates
            .gate("malfunction", !malfunctions.is_empty())
            .base("severity", f64::from(severity) * REPAIR_SEVERITY_WEIGHT, ctx.tuning.score_cap)
            .require("repair slot", best.is_some())
            .multiply("shift", shift_modifier(worker.is_on_duty(&ctx.clock()), ctx.tuning))
            .multiply("radiation", radiation_modifier(hazard, outdoor, ctx.tuning));
        let rating = social(m, &self.descriptor, worker, site, ctx)
            .cap(ctx.tuning.score_cap)
            .finish();

        let offer = Offer::new(rating);
        Ok(match best {
            Some(m) => offer
                .with_target(JobTarget::Malfunction(m.id))
                .with_claim(SlotKey::RepairWork(m.id)),
            None => offer,
        })
    }
}

/// Inspect the building furthest past its maintenance window.
pub struct MaintainBuilding {
    descriptor: TaskDescriptor,
}

impl MaintainBuilding {
    pub fn new() -> Self {
        Self {
            descriptor: TaskDescriptor::new("MaintainBuilding", WorkerType::Both, TaskScope::WorkHour)
                .with_favorites(&[FavoriteType::Tinkering])
                .with_jobs(&[JobType::Engineer, JobType::Technician])
                .with_roles(&[RoleType::EngineeringSpecialist])
                .with_robots(&[RobotType::RepairBot, RobotType::MakerBot]),
        }
    }
}

impl Default for MaintainBuilding {
    fn default() -> Self {
        Self::new()
    }
}

impl MetaTask for MaintainBuilding {
    fn descriptor(&self) -> &TaskDescriptor {
        &self.descriptor
    }

    fn rate(&self, worker: &Worker, ctx: &ScoringContext<'_>) -> Result<Offer, ScoringFault> {
        let gates = ScoreBuilder::new()
            .gate("in settlement", in_settlement(worker))
            .gate("fit", is_fit(worker, ctx));
        if gates.is_rejected() {
            return Ok(Offer::new(gates.finish()));
        }

        let colony = ctx.colony;
        let due: Vec<(&MaintenanceInfo, &BuildingInfo)> = colony
            .maintenance(worker.settlement())
            .into_iter()
            .filter(|m| m.overdue_ratio() >= MIN_OVERDUE_RATIO)
            .filter_map(|m| colony.building(m.building).map(|b| (m, b)))
            .collect();
        let most = due.iter().map(|(m, _)| m.overdue_ratio()).fold(0.0, f64::max);
        let mut best: Option<(&MaintenanceInfo, &BuildingInfo)> = None;
        for &(m, b) in &due {
            if b.malfunctioning || !colony.has_room(SlotKey::Workstation(b.id)) {
                continue;
            }
            let better = match best {
                None => true,
                Some((bm, _)) => m.overdue_ratio() > bm.overdue_ratio(),
            };
            if better {
                best = Some((m, b));
            }
        }
        let ratio = best.map_or(most, |(m, _)| m.overdue_ratio());
        let building = best.map(|(_, b)| b);

        let m = gates
            .gate("overdue", !due.is_empty())
            .base("overdue", ratio * MAINTENANCE_WEIGHT, ctx.tuning.score_cap)
            .require("building free", building.is_some())
            .modifiers();
        let rating = social(m, &self.descriptor, worker, building, ctx).finish();

        let offer = Offer::new(rating);
        Ok(match building {
            Some(b) => offer
                .with_target(JobTarget::Building(b.id))
                .with_claim(SlotKey::Workstation(b.id)),
            None => offer,
        })
    }
}
