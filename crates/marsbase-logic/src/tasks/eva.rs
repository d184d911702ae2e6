//! Outdoor work through an airlock.

use crate::constants::{BuildingFunction, FavoriteType, JobType, RoleType, TaskTrait};
use crate::descriptor::{TaskDescriptor, TaskScope};
use crate::error::ScoringFault;
use crate::meta::{JobTarget, MetaTask, Offer, ScoringContext};
use crate::modifiers::radiation_modifier;
use crate::rating::ScoreBuilder;
use crate::slot::SlotKey;
use crate::worker::{Worker, WorkerType};

use super::{in_settlement, is_fit, social};

/// Base score at full regolith demand.
pub const REGOLITH_DEMAND_WEIGHT: f64 = 300.0;

/// Collect regolith outside in daylight.
pub struct DigRegolith {
    descriptor: TaskDescriptor,
}

impl DigRegolith {
    pub fn new() -> Self {
        Self {
            descriptor: TaskDescriptor::new("DigRegolith", WorkerType::Person, TaskScope::WorkHour)
                .with_favorites(&[FavoriteType::FieldWork, FavoriteType::Operation])
                .with_traits(&[TaskTrait::Strength, TaskTrait::Agility])
                .with_jobs(&[JobType::Areologist, JobType::Architect])
                .with_roles(&[RoleType::ResourceSpecialist]),
        }
    }
}

impl Default for DigRegolith {
    fn default() -> Self {
        Self::new()
    }
}

impl MetaTask for DigRegolith {
    fn descriptor(&self) -> &TaskDescriptor {
        &self.descriptor
    }

    fn rate(&self, worker: &Worker, ctx: &ScoringContext<'_>) -> Result<Offer, ScoringFault> {
        let Some(person) = worker.as_person() else {
            return Ok(Offer::zero("not a person"));
        };
        let gates = ScoreBuilder::new()
            .gate("in settlement", in_settlement(worker))
            .gate("eva ready", person.eva_ready)
            .gate("fit", is_fit(worker, ctx));
        if gates.is_rejected() {
            return Ok(Offer::new(gates.finish()));
        }

        let colony = ctx.colony;
        let settlement = person.settlement;
        let hazard = colony.radiation(settlement);

        let mut airlock = None;
        let m = gates
            .gate("radiation", !hazard.is_lethal_outside())
            .gate_with("daylight", || colony.is_daylight(settlement))
            .base_with("demand", ctx.tuning.score_cap, || {
                colony.regolith_demand(settlement).clamp(0.0, 1.0) * REGOLITH_DEMAND_WEIGHT
            })
            .require_with("airlock", || {
                airlock = colony
                    .buildings(settlement, BuildingFunction::Eva)
                    .into_iter()
                    .find(|b| !b.malfunctioning && colony.has_room(SlotKey::Airlock(b.id)));
                airlock.is_some()
            })
            .multiply("radiation", radiation_modifier(hazard, true, ctx.tuning));
        let rating = social(m, &self.descriptor, worker, None, ctx).finish();

        let offer = Offer::new(rating);
        Ok(match airlock {
            Some(b) => offer
                .with_target(JobTarget::Building(b.id))
                .with_claim(SlotKey::Airlock(b.id)),
            None => offer,
        })
    }
}
