//! Robot upkeep.

use crate::constants::BuildingFunction;
use crate::descriptor::{TaskDescriptor, TaskScope};
use crate::error::ScoringFault;
use crate::meta::{JobTarget, MetaTask, Offer, ScoringContext};
use crate::rating::ScoreBuilder;
use crate::slot::SlotKey;
use crate::worker::{Worker, WorkerType};

use super::in_settlement;

/// Robots below this charge look for a charger.
pub const CHARGE_THRESHOLD: f64 = 0.5;
const CHARGE_WEIGHT: f64 = 1000.0;

/// Dock at a free charger in a robot station.
pub struct Charge {
    descriptor: TaskDescriptor,
}

impl Charge {
    pub fn new() -> Self {
        Self {
            descriptor: TaskDescriptor::new("Charge", WorkerType::Robot, TaskScope::AnyHour),
        }
    }
}

impl Default for Charge {
    fn default() -> Self {
        Self::new()
    }
}

impl MetaTask for Charge {
    fn descriptor(&self) -> &TaskDescriptor {
        &self.descriptor
    }

    fn rate(&self, worker: &Worker, ctx: &ScoringContext<'_>) -> Result<Offer, ScoringFault> {
        let Some(robot) = worker.as_robot() else {
            return Ok(Offer::zero("not a robot"));
        };
        let colony = ctx.colony;
        let mut station = None;
        let rating = ScoreBuilder::new()
            .gate("in settlement", in_settlement(worker))
            .gate("battery low", robot.battery < CHARGE_THRESHOLD)
            .base("drain", (1.0 - robot.battery) * CHARGE_WEIGHT, ctx.tuning.score_cap)
            .require_with("charger", || {
                station = colony
                    .buildings(robot.settlement, BuildingFunction::RobotStation)
                    .into_iter()
                    .find(|b| colony.has_room(SlotKey::Charger(b.id)));
                station.is_some()
            })
            .finish();

        let offer = Offer::new(rating);
        Ok(match station {
            Some(b) => offer
                .with_target(JobTarget::Building(b.id))
                .with_claim(SlotKey::Charger(b.id)),
            None => offer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Tuning;
    use crate::constants::RobotType;
    use crate::oracle::BuildingInfo;
    use crate::snapshot::ColonySnapshot;
    use crate::worker::Robot;

    #[test]
    fn test_charge_when_drained() {
        let tuning = Tuning::default();
        let colony = ColonySnapshot::new()
            .with_building(BuildingInfo::new(2, 1, "Robot Station", &[BuildingFunction::RobotStation], 2))
            .with_chargers(2, 1);
        let ctx = ScoringContext::new(&colony, &tuning);
        let task = Charge::new();
        let mut bot = Robot::new(5, "R1", 1, RobotType::RepairBot);

        assert_eq!(task.rate(&bot.clone().into(), &ctx).unwrap().score(), 0.0);

        bot.battery = 0.25;
        let offer = task.rate(&bot.clone().into(), &ctx).unwrap();
        assert!((offer.score() - 750.0).abs() < 1e-9);
        assert_eq!(offer.claim, Some(SlotKey::Charger(2)));

        colony.claim(SlotKey::Charger(2)).unwrap();
        let offer = task.rate(&bot.into(), &ctx).unwrap();
        assert_eq!(offer.rating.rejected_by(), Some("charger"));
    }
}
