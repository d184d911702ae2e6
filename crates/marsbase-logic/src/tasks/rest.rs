//! Personal needs and off-duty activities, plus the idle fallback.

use crate::constants::{BuildingFunction, FavoriteType, TaskTrait};
use crate::descriptor::{TaskDescriptor, TaskScope};
use crate::duty::{is_meal_time, is_sleep_time};
use crate::error::ScoringFault;
use crate::meta::{JobTarget, MetaTask, Offer, ScoringContext};
use crate::rating::ScoreBuilder;
use crate::slot::SlotKey;
use crate::worker::{Worker, WorkerType};

use super::{here, in_settlement, is_fit, roomiest, social};

/// Fatigue below which nobody wants to sleep outside their sleep window.
pub const SLEEP_FATIGUE_ONSET: f64 = 250.0;
const SLEEP_FATIGUE_WEIGHT: f64 = 0.5;
/// Base need added during the shift's sleep window.
const SLEEP_TIME_BASE: f64 = 50.0;
const SLEEP_TIME_BONUS: f64 = 2.0;
const SLEEP_ON_DUTY_PENALTY: f64 = 0.5;

pub const HUNGER_ONSET: f64 = 250.0;
pub const THIRST_ONSET: f64 = 150.0;
const APPETITE_WEIGHT: f64 = 0.5;
const MEAL_TIME_BONUS: f64 = 1.5;

const RELAX_BASE: f64 = 10.0;
const RELAX_STRESS_WEIGHT: f64 = 0.5;

const WORKOUT_BASE: f64 = 20.0;
const WORKOUT_STRESS_WEIGHT: f64 = 0.3;

/// Per other occupant, up to [`CONVERSE_MAX_PARTNERS`].
const CONVERSE_PER_PARTNER: f64 = 8.0;
const CONVERSE_MAX_PARTNERS: u32 = 5;

/// Sleep in quarters, or wherever the person is if there are none.
pub struct Sleep {
    descriptor: TaskDescriptor,
}

impl Sleep {
    pub fn new() -> Self {
        Self {
            descriptor: TaskDescriptor::new("Sleep", WorkerType::Person, TaskScope::AnyHour)
                .with_traits(&[TaskTrait::Relaxation]),
        }
    }
}

impl Default for Sleep {
    fn default() -> Self {
        Self::new()
    }
}

impl MetaTask for Sleep {
    fn descriptor(&self) -> &TaskDescriptor {
        &self.descriptor
    }

    fn rate(&self, worker: &Worker, ctx: &ScoringContext<'_>) -> Result<Offer, ScoringFault> {
        let Some(person) = worker.as_person() else {
            return Ok(Offer::zero("not a person"));
        };
        let clock = ctx.clock();
        let fatigue = person.condition.fatigue;
        let sleep_time = is_sleep_time(person.shift, clock.millisol);

        let m = ScoreBuilder::new()
            .gate("inside", worker.location().is_inside())
            .gate("tired", fatigue > SLEEP_FATIGUE_ONSET || sleep_time)
            .base(
                "fatigue",
                (fatigue - SLEEP_FATIGUE_ONSET).max(0.0) * SLEEP_FATIGUE_WEIGHT
                    + if sleep_time { SLEEP_TIME_BASE } else { 0.0 },
                ctx.tuning.score_cap,
            )
            .modifiers()
            .multiply_if("sleep time", sleep_time, SLEEP_TIME_BONUS)
            .multiply_if("on duty", worker.is_on_duty(&clock), SLEEP_ON_DUTY_PENALTY);
        let quarters = if !m.is_rejected() && in_settlement(worker) {
            roomiest(ctx, person.settlement, BuildingFunction::LivingAccommodation)
        } else {
            None
        };
        let rating = social(m, &self.descriptor, worker, quarters, ctx)
            .cap(ctx.tuning.score_cap)
            .finish();

        let offer = Offer::new(rating);
        Ok(match quarters {
            Some(b) => offer.with_target(JobTarget::Building(b.id)),
            None => offer,
        })
    }
}

/// Eat a meal or drink from stores.
pub struct EatDrink {
    descriptor: TaskDescriptor,
}

impl EatDrink {
    pub fn new() -> Self {
        Self {
            descriptor: TaskDescriptor::new("EatDrink", WorkerType::Person, TaskScope::AnyHour),
        }
    }
}

impl Default for EatDrink {
    fn default() -> Self {
        Self::new()
    }
}

impl MetaTask for EatDrink {
    fn descriptor(&self) -> &TaskDescriptor {
        &self.descriptor
    }

    fn rate(&self, worker: &Worker, ctx: &ScoringContext<'_>) -> Result<Offer, ScoringFault> {
        let Some(person) = worker.as_person() else {
            return Ok(Offer::zero("not a person"));
        };
        let c = &person.condition;

        let m = ScoreBuilder::new()
            .gate("inside", worker.location().is_inside())
            .gate("hungry or thirsty", c.hunger > HUNGER_ONSET || c.thirst > THIRST_ONSET)
            .base(
                "appetite",
                ((c.hunger - HUNGER_ONSET).max(0.0) + (c.thirst - THIRST_ONSET).max(0.0))
                    * APPETITE_WEIGHT,
                ctx.tuning.score_cap,
            )
            .modifiers()
            .multiply_if("meal time", is_meal_time(ctx.clock().millisol), MEAL_TIME_BONUS);
        let dining = if !m.is_rejected() && in_settlement(worker) {
            roomiest(ctx, person.settlement, BuildingFunction::Dining)
        } else {
            None
        };
        let rating = social(m, &self.descriptor, worker, dining, ctx)
            .cap(ctx.tuning.score_cap)
            .finish();

        let offer = Offer::new(rating);
        Ok(match dining {
            Some(b) => offer.with_target(JobTarget::Building(b.id)),
            None => offer,
        })
    }
}

/// Unwind in a recreation building, or in place.
pub struct Relax {
    descriptor: TaskDescriptor,
}

impl Relax {
    pub fn new() -> Self {
        Self {
            descriptor: TaskDescriptor::new("Relax", WorkerType::Person, TaskScope::NonWorkHour)
                .with_favorites(&[FavoriteType::Gaming])
                .with_traits(&[TaskTrait::Relaxation]),
        }
    }
}

impl Default for Relax {
    fn default() -> Self {
        Self::new()
    }
}

impl MetaTask for Relax {
    fn descriptor(&self) -> &TaskDescriptor {
        &self.descriptor
    }

    fn rate(&self, worker: &Worker, ctx: &ScoringContext<'_>) -> Result<Offer, ScoringFault> {
        let Some(person) = worker.as_person() else {
            return Ok(Offer::zero("not a person"));
        };
        let m = ScoreBuilder::new()
            .gate("inside", worker.location().is_inside())
            .gate("fit", is_fit(worker, ctx))
            .base(
                "stress",
                RELAX_BASE + person.condition.stress * RELAX_STRESS_WEIGHT,
                ctx.tuning.score_cap,
            )
            .modifiers();
        let lounge = if !m.is_rejected() && in_settlement(worker) {
            roomiest(ctx, person.settlement, BuildingFunction::Recreation)
        } else {
            None
        };
        let rating = social(m, &self.descriptor, worker, lounge, ctx).finish();

        let offer = Offer::new(rating);
        Ok(match lounge {
            Some(b) => offer.with_target(JobTarget::Building(b.id)),
            None => offer,
        })
    }
}

/// Exercise in a gym.
pub struct Workout {
    descriptor: TaskDescriptor,
}

impl Workout {
    pub fn new() -> Self {
        Self {
            descriptor: TaskDescriptor::new("Workout", WorkerType::Person, TaskScope::NonWorkHour)
                .with_favorites(&[FavoriteType::Sport])
                .with_traits(&[TaskTrait::Agility, TaskTrait::Strength]),
        }
    }
}

impl Default for Workout {
    fn default() -> Self {
        Self::new()
    }
}

impl MetaTask for Workout {
    fn descriptor(&self) -> &TaskDescriptor {
        &self.descriptor
    }

    fn rate(&self, worker: &Worker, ctx: &ScoringContext<'_>) -> Result<Offer, ScoringFault> {
        let Some(person) = worker.as_person() else {
            return Ok(Offer::zero("not a person"));
        };
        let mut gym = None;
        let base = ScoreBuilder::new()
            .gate("in settlement", in_settlement(worker))
            .gate("fit", is_fit(worker, ctx))
            .base(
                "stress",
                WORKOUT_BASE + person.condition.stress * WORKOUT_STRESS_WEIGHT,
                ctx.tuning.score_cap,
            )
            .require_with("gym", || {
                gym = roomiest(ctx, person.settlement, BuildingFunction::Exercise);
                gym.is_some()
            });
        let rating = social(base.modifiers(), &self.descriptor, worker, gym, ctx).finish();

        let offer = Offer::new(rating);
        Ok(match gym {
            Some(b) => offer
                .with_target(JobTarget::Building(b.id))
                .with_claim(SlotKey::Workstation(b.id)),
            None => offer,
        })
    }
}

/// Chat with whoever else is in the building.
pub struct Converse {
    descriptor: TaskDescriptor,
}

impl Converse {
    pub fn new() -> Self {
        Self {
            descriptor: TaskDescriptor::new("Converse", WorkerType::Person, TaskScope::NonWorkHour)
                .with_traits(&[TaskTrait::People]),
        }
    }
}

impl Default for Converse {
    fn default() -> Self {
        Self::new()
    }
}

impl MetaTask for Converse {
    fn descriptor(&self) -> &TaskDescriptor {
        &self.descriptor
    }

    fn rate(&self, worker: &Worker, ctx: &ScoringContext<'_>) -> Result<Offer, ScoringFault> {
        let gates = ScoreBuilder::new()
            .gate("person", worker.as_person().is_some())
            .gate("fit", is_fit(worker, ctx));
        if gates.is_rejected() {
            return Ok(Offer::new(gates.finish()));
        }

        let room = here(worker, ctx);
        // The worker is one of the occupants.
        let partners = room.map_or(0, |b| b.occupants.saturating_sub(1));

        let m = gates
            .gate("company", partners > 0)
            .base(
                "company",
                f64::from(partners.min(CONVERSE_MAX_PARTNERS)) * CONVERSE_PER_PARTNER,
                ctx.tuning.score_cap,
            )
            .modifiers();
        let rating = social(m, &self.descriptor, worker, room, ctx).finish();

        let offer = Offer::new(rating);
        Ok(match room {
            Some(b) => offer.with_target(JobTarget::Building(b.id)),
            None => offer,
        })
    }
}

/// Do nothing in particular. The registry fallback; always scores.
pub struct Idle {
    descriptor: TaskDescriptor,
}

impl Idle {
    pub fn new() -> Self {
        Self {
            descriptor: TaskDescriptor::new("Idle", WorkerType::Both, TaskScope::AnyHour),
        }
    }
}

impl Default for Idle {
    fn default() -> Self {
        Self::new()
    }
}

impl MetaTask for Idle {
    fn descriptor(&self) -> &TaskDescriptor {
        &self.descriptor
    }

    fn rate(&self, _worker: &Worker, ctx: &ScoringContext<'_>) -> Result<Offer, ScoringFault> {
        let rating = ScoreBuilder::new()
            .base("idle", ctx.tuning.idle_weight, ctx.tuning.score_cap)
            .finish();
        Ok(Offer::new(rating))
    }
}
