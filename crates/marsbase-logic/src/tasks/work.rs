//! Productive settlement work: food, farming and science.

use std::cmp::Reverse;

use crate::constants::{BuildingFunction, FavoriteType, JobType, RobotType, RoleType, TaskTrait};
use crate::descriptor::{TaskDescriptor, TaskScope};
use crate::duty::{is_meal_time, is_night};
use crate::error::ScoringFault;
use crate::meta::{JobTarget, MetaTask, Offer, ScoringContext};
use crate::oracle::{SettlementId, StudyRole};
use crate::rating::ScoreBuilder;
use crate::settlement::{SettlementJob, SettlementMetaTask};
use crate::slot::SlotKey;
use crate::worker::{Worker, WorkerType};

use super::{in_settlement, is_fit, roomiest, social};

const COOK_PER_HUNGRY: f64 = 20.0;
const COOK_MEAL_TIME_BONUS: f64 = 1.5;

/// Base score per crop needing attention in the chosen greenhouse.
pub const CROP_TENDING_WEIGHT: f64 = 10.0;

/// Ponds closer than this to ideal are left alone.
pub const POND_DEVIATION_THRESHOLD: f64 = 0.1;
const POND_DEVIATION_WEIGHT: f64 = 300.0;

const RESEARCH_PRIMARY: f64 = 50.0;
const RESEARCH_COLLABORATOR: f64 = 25.0;

const OBSERVE_BASE: f64 = 50.0;

const SCIENTISTS: [JobType; 9] = [
    JobType::Areologist,
    JobType::Astronomer,
    JobType::Biologist,
    JobType::Botanist,
    JobType::Chemist,
    JobType::Mathematician,
    JobType::Meteorologist,
    JobType::Physicist,
    JobType::Psychologist,
];

/// Cook meals for hungry settlers in a free kitchen.
pub struct Cook {
    descriptor: TaskDescriptor,
}

impl Cook {
    pub fn new() -> Self {
        Self {
            descriptor: TaskDescriptor::new("Cook", WorkerType::Both, TaskScope::WorkHour)
                .with_favorites(&[FavoriteType::Cooking])
                .with_traits(&[TaskTrait::Artistic])
                .with_jobs(&[JobType::Chef])
                .with_robots(&[RobotType::ChefBot]),
        }
    }
}

impl Default for Cook {
    fn default() -> Self {
        Self::new()
    }
}

impl MetaTask for Cook {
    fn descriptor(&self) -> &TaskDescriptor {
        &self.descriptor
    }

    fn rate(&self, worker: &Worker, ctx: &ScoringContext<'_>) -> Result<Offer, ScoringFault> {
        let settlement = worker.settlement();
        let mut kitchen = None;
        let base = ScoreBuilder::new()
            .gate("in settlement", in_settlement(worker))
            .gate("fit", is_fit(worker, ctx))
            .base_with("hungry people", ctx.tuning.score_cap, || {
                f64::from(ctx.colony.hungry_people(settlement)) * COOK_PER_HUNGRY
            })
            .require_with("kitchen", || {
                kitchen = roomiest(ctx, settlement, BuildingFunction::Cooking);
                kitchen.is_some()
            });
        let m = base
            .modifiers()
            .multiply_if("meal time", is_meal_time(ctx.clock().millisol), COOK_MEAL_TIME_BONUS);
        let rating = social(m, &self.descriptor, worker, kitchen, ctx)
            .cap(ctx.tuning.score_cap)
            .finish();

        let offer = Offer::new(rating);
        Ok(match kitchen {
            Some(b) => offer
                .with_target(JobTarget::Building(b.id))
                .with_claim(SlotKey::Workstation(b.id)),
            None => offer,
        })
    }
}

/// Tend the greenhouse with the most crops needing attention.
pub struct TendGreenhouse {
    descriptor: TaskDescriptor,
}

impl TendGreenhouse {
    pub fn new() -> Self {
        Self {
            descriptor: TaskDescriptor::new("TendGreenhouse", WorkerType::Both, TaskScope::WorkHour)
                .with_favorites(&[FavoriteType::TendingGarden])
                .with_jobs(&[JobType::Botanist, JobType::Biologist])
                .with_roles(&[RoleType::ChiefOfAgriculture, RoleType::AgricultureSpecialist])
                .with_robots(&[RobotType::GardenBot]),
        }
    }
}

impl Default for TendGreenhouse {
    fn default() -> Self {
        Self::new()
    }
}

impl MetaTask for TendGreenhouse {
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
        let mut needy = Vec::new();
        for g in colony.greenhouses(worker.settlement()) {
            if g.crops_needing_tending == 0 {
                continue;
            }
            let building = colony.building(g.building).ok_or_else(|| {
                ScoringFault::new(self.name(), format!("greenhouse building {} missing", g.building))
            })?;
            needy.push((g.crops_needing_tending, building));
        }
        let most = needy.iter().map(|(crops, _)| *crops).max().unwrap_or(0);
        let free = needy
            .iter()
            .filter(|(_, b)| !b.malfunctioning && colony.has_room(SlotKey::Workstation(b.id)))
            .max_by_key(|(crops, b)| (*crops, Reverse(b.id)))
            .copied();
        let crops = free.map_or(most, |(crops, _)| crops);
        let greenhouse = free.map(|(_, b)| b);

        let m = gates
            .base("crops", f64::from(crops) * CROP_TENDING_WEIGHT, ctx.tuning.score_cap)
            .require("free greenhouse", greenhouse.is_some())
            .modifiers();
        let rating = social(m, &self.descriptor, worker, greenhouse, ctx).finish();

        let offer = Offer::new(rating);
        Ok(match greenhouse {
            Some(b) => offer
                .with_target(JobTarget::Building(b.id))
                .with_claim(SlotKey::Workstation(b.id)),
            None => offer,
        })
    }
}

/// Rebalance algae ponds drifting from their ideal levels.
pub struct TendAlgaePond {
    descriptor: TaskDescriptor,
}

impl TendAlgaePond {
    pub fn new() -> Self {
        Self {
            descriptor: TaskDescriptor::new("TendAlgaePond", WorkerType::Both, TaskScope::WorkHour)
                .with_favorites(&[FavoriteType::TendingGarden])
                .with_jobs(&[JobType::Biologist, JobType::Botanist])
                .with_robots(&[RobotType::GardenBot]),
        }
    }
}

impl Default for TendAlgaePond {
    fn default() -> Self {
        Self::new()
    }
}

impl MetaTask for TendAlgaePond {
    fn descriptor(&self) -> &TaskDescriptor {
        &self.descriptor
    }

    fn as_settlement(&self) -> Option<&dyn SettlementMetaTask> {
        Some(self)
    }
}

impl SettlementMetaTask for TendAlgaePond {
    fn scan(&self, settlement: SettlementId, ctx: &ScoringContext<'_>) -> Vec<SettlementJob> {
        let colony = ctx.colony;
        colony
            .algae_ponds(settlement)
            .into_iter()
            .filter(|p| p.deviation > POND_DEVIATION_THRESHOLD)
            .filter(|p| colony.building(p.building).is_some_and(|b| !b.malfunctioning))
            .filter(|p| colony.has_room(SlotKey::Workstation(p.building)))
            .map(|p| SettlementJob {
                target: JobTarget::Building(p.building),
                claim: Some(SlotKey::Workstation(p.building)),
                base: ScoreBuilder::new()
                    .base(
                        "deviation",
                        p.deviation.min(1.0) * POND_DEVIATION_WEIGHT,
                        ctx.tuning.score_cap,
                    )
                    .finish(),
                label: format!("Tend {}", p.name),
                outdoor: false,
            })
            .collect()
    }
}

/// Work on the person's active scientific studies.
pub struct Research {
    descriptor: TaskDescriptor,
}

impl Research {
    pub fn new() -> Self {
        Self {
            descriptor: TaskDescriptor::new("Research", WorkerType::Person, TaskScope::WorkHour)
                .with_favorites(&[FavoriteType::Research, FavoriteType::LabExperimentation])
                .with_traits(&[TaskTrait::Academic])
                .with_jobs(&SCIENTISTS),
        }
    }
}

impl Default for Research {
    fn default() -> Self {
        Self::new()
    }
}

impl MetaTask for Research {
    fn descriptor(&self) -> &TaskDescriptor {
        &self.descriptor
    }

    fn rate(&self, worker: &Worker, ctx: &ScoringContext<'_>) -> Result<Offer, ScoringFault> {
        let Some(person) = worker.as_person() else {
            return Ok(Offer::zero("not a person"));
        };
        let gates = ScoreBuilder::new()
            .gate("in settlement", in_settlement(worker))
            .gate("fit", is_fit(worker, ctx));
        if gates.is_rejected() {
            return Ok(Offer::new(gates.finish()));
        }

        let studies: Vec<_> = ctx
            .colony
            .studies(person.id)
            .into_iter()
            .filter(|s| s.phase.is_active() && s.work_remaining > 0.0)
            .collect();
        let need = studies
            .iter()
            .map(|s| match s.role {
                StudyRole::Primary => RESEARCH_PRIMARY,
                StudyRole::Collaborator => RESEARCH_COLLABORATOR,
            })
            .sum::<f64>();
        let needs_lab = studies.iter().any(|s| s.needs_lab);
        // Primary studies first.
        let focus = studies
            .iter()
            .find(|s| s.role == StudyRole::Primary)
            .or_else(|| studies.first());

        let mut lab = None;
        let base = gates
            .gate("active study", focus.is_some())
            .base("studies", need, ctx.tuning.score_cap)
            .require_with("lab", || {
                if !needs_lab {
                    return true;
                }
                lab = roomiest(ctx, person.settlement, BuildingFunction::Research);
                lab.is_some()
            });
        let rating = social(base.modifiers(), &self.descriptor, worker, lab, ctx).finish();

        let mut offer = Offer::new(rating);
        if let Some(study) = focus {
            offer = offer.with_target(JobTarget::Study(study.id));
        }
        if let Some(b) = lab {
            offer = offer.with_claim(SlotKey::Workstation(b.id));
        }
        Ok(offer)
    }
}

/// Stargazing from an observatory after dark.
pub struct ObserveAstronomicalObjects {
    descriptor: TaskDescriptor,
}

impl ObserveAstronomicalObjects {
    pub fn new() -> Self {
        Self {
            descriptor: TaskDescriptor::new(
                "ObserveAstronomicalObjects",
                WorkerType::Person,
                TaskScope::NonWorkHour,
            )
            .with_favorites(&[FavoriteType::Astronomy])
            .with_traits(&[TaskTrait::Academic])
            .with_jobs(&[JobType::Astronomer]),
        }
    }
}

impl Default for ObserveAstronomicalObjects {
    fn default() -> Self {
        Self::new()
    }
}

impl MetaTask for ObserveAstronomicalObjects {
    fn descriptor(&self) -> &TaskDescriptor {
        &self.descriptor
    }

    fn rate(&self, worker: &Worker, ctx: &ScoringContext<'_>) -> Result<Offer, ScoringFault> {
        let settlement = worker.settlement();
        let mut observatory = None;
        let base = ScoreBuilder::new()
            .gate("person", worker.as_person().is_some())
            .gate("in settlement", in_settlement(worker))
            .gate("fit", is_fit(worker, ctx))
            .gate_with("dark", || {
                is_night(ctx.clock().millisol) || !ctx.colony.is_daylight(settlement)
            })
            .base("observe", OBSERVE_BASE, ctx.tuning.score_cap)
            .require_with("observatory", || {
                observatory =
                    roomiest(ctx, settlement, BuildingFunction::AstronomicalObservation);
                observatory.is_some()
            });
        let rating = social(base.modifiers(), &self.descriptor, worker, observatory, ctx).finish();

        let offer = Offer::new(rating);
        Ok(match observatory {
            Some(b) => offer
                .with_target(JobTarget::Building(b.id))
                .with_claim(SlotKey::Workstation(b.id)),
            None => offer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Tuning;
    use crate::duty::MarsClock;
    use crate::oracle::{BuildingInfo, GreenhouseInfo, PondInfo, StudyInfo, StudyPhase};
    use crate::snapshot::ColonySnapshot;
    use crate::worker::{Person, Robot};

    fn greenhouse(id: u32, crops_needing_tending: u32) -> GreenhouseInfo {
        GreenhouseInfo {
            building: id,
            crops: 10,
            crops_needing_tending,
        }
    }

    fn farm() -> ColonySnapshot {
        ColonySnapshot::new()
            .with_clock(MarsClock::new(1, 200.0))
            .with_building(BuildingInfo::new(1, 1, "Greenhouse A", &[BuildingFunction::Farming], 1))
            .with_building(BuildingInfo::new(2, 1, "Greenhouse B", &[BuildingFunction::Farming], 1))
            .with_greenhouse(1, greenhouse(1, 3))
            .with_greenhouse(1, greenhouse(2, 5))
    }

    #[test]
    fn test_tend_greenhouse_picks_neediest_free() {
        let tuning = Tuning::default();
        let colony = farm();
        let ctx = ScoringContext::new(&colony, &tuning);
        let task = TendGreenhouse::new();
        let p: Worker = Person::new(1, "Ana", 1, JobType::Engineer).into();

        let offer = task.rate(&p, &ctx).unwrap();
        assert!((offer.score() - 50.0).abs() < 1e-9);
        assert_eq!(offer.claim, Some(SlotKey::Workstation(2)));

        colony.claim(SlotKey::Workstation(2)).unwrap();
        let offer = task.rate(&p, &ctx).unwrap();
        assert!((offer.score() - 30.0).abs() < 1e-9);
        assert_eq!(offer.target, Some(JobTarget::Building(1)));

        colony.claim(SlotKey::Workstation(1)).unwrap();
        let offer = task.rate(&p, &ctx).unwrap();
        assert_eq!(offer.rating.rejected_by(), Some("free greenhouse"));
    }

    #[test]
    fn test_tend_greenhouse_missing_building_is_a_fault() {
        let tuning = Tuning::default();
        let colony = ColonySnapshot::new().with_greenhouse(1, greenhouse(42, 2));
        let ctx = ScoringContext::new(&colony, &tuning);
        let p: Worker = Person::new(1, "Ana", 1, JobType::Botanist).into();
        let err = TendGreenhouse::new().rate(&p, &ctx).unwrap_err();
        assert_eq!(err.task, "TendGreenhouse");
    }

    #[test]
    fn test_botanist_prefers_greenhouse() {
        let tuning = Tuning::default();
        let colony = farm();
        let ctx = ScoringContext::new(&colony, &tuning);
        let task = TendGreenhouse::new();
        let engineer: Worker = Person::new(1, "Ana", 1, JobType::Engineer).into();
        let botanist: Worker = Person::new(2, "Bo", 1, JobType::Botanist).into();
        let bot: Worker = Robot::new(3, "G1", 1, RobotType::GardenBot).into();
        let e = task.rate(&engineer, &ctx).unwrap().score();
        assert!(task.rate(&botanist, &ctx).unwrap().score() > e);
        assert!(task.rate(&bot, &ctx).unwrap().score() > e);
    }

    #[test]
    fn test_cook_scales_with_hungry_people() {
        let tuning = Tuning::default();
        let colony = ColonySnapshot::new()
            .with_clock(MarsClock::new(1, 100.0))
            .with_building(BuildingInfo::new(4, 1, "Kitchen", &[BuildingFunction::Cooking], 2))
            .with_hungry_people(1, 3);
        let ctx = ScoringContext::new(&colony, &tuning);
        let p: Worker = Person::new(1, "Ana", 1, JobType::Pilot).into();
        let offer = Cook::new().rate(&p, &ctx).unwrap();
        assert!((offer.score() - 60.0).abs() < 1e-9);
        assert_eq!(offer.claim, Some(SlotKey::Workstation(4)));

        let empty = ColonySnapshot::new().with_hungry_people(1, 3);
        let ctx = ScoringContext::new(&empty, &tuning);
        assert_eq!(
            Cook::new().rate(&p, &ctx).unwrap().rating.rejected_by(),
            Some("kitchen")
        );
    }

    #[test]
    fn test_pond_scan() {
        let tuning = Tuning::default();
        let colony = ColonySnapshot::new()
            .with_building(BuildingInfo::new(5, 1, "Algae Pond", &[BuildingFunction::Farming], 2))
            .with_pond(
                1,
                PondInfo {
                    building: 5,
                    name: "Pond 1".into(),
                    deviation: 0.5,
                },
            )
            .with_pond(
                1,
                PondInfo {
                    building: 5,
                    name: "Pond 2".into(),
                    deviation: 0.05,
                },
            );
        let ctx = ScoringContext::new(&colony, &tuning);
        let jobs = TendAlgaePond::new().scan(1, &ctx);
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].label, "Tend Pond 1");
        assert!((jobs[0].base.score() - 150.0).abs() < 1e-9);

        colony.set_reserved(SlotKey::Workstation(5), true).unwrap();
        assert!(TendAlgaePond::new().scan(1, &ctx).is_empty());
    }

    #[test]
    fn test_unfit_worker_skips_greenhouse_scan() {
        let tuning = Tuning::default();
        let colony = ColonySnapshot::new().with_greenhouse(1, greenhouse(99, 2));
        let ctx = ScoringContext::new(&colony, &tuning);
        let mut p = Person::new(1, "Ana", 1, JobType::Botanist);
        p.condition.fatigue = 1500.0;
        let offer = TendGreenhouse::new().rate(&p.into(), &ctx).unwrap();
        assert_eq!(offer.score(), 0.0);
        assert_eq!(offer.rating.rejected_by(), Some("fit"));
    }

    #[test]
    fn test_research_needs_study_and_lab() {
        let tuning = Tuning::default();
        let study = StudyInfo {
            id: 8,
            name: "Perchlorate uptake".into(),
            phase: StudyPhase::Research,
            role: StudyRole::Primary,
            needs_lab: true,
            work_remaining: 40.0,
        };
        let p: Worker = Person::new(1, "Ana", 1, JobType::Chemist).into();

        let no_study = ColonySnapshot::new();
        let ctx = ScoringContext::new(&no_study, &tuning);
        assert_eq!(
            Research::new().rate(&p, &ctx).unwrap().rating.rejected_by(),
            Some("active study")
        );

        let no_lab = ColonySnapshot::new().with_study(1, study.clone());
        let ctx = ScoringContext::new(&no_lab, &tuning);
        assert_eq!(
            Research::new().rate(&p, &ctx).unwrap().rating.rejected_by(),
            Some("lab")
        );

        let lab = no_lab.with_building(BuildingInfo::new(3, 1, "Lab", &[BuildingFunction::Research], 2));
        let ctx = ScoringContext::new(&lab, &tuning);
        let offer = Research::new().rate(&p, &ctx).unwrap();
        assert!(offer.score() > 0.0);
        assert_eq!(offer.target, Some(JobTarget::Study(8)));
        assert_eq!(offer.claim, Some(SlotKey::Workstation(3)));
    }

    #[test]
    fn test_observe_only_after_dark() {
        let tuning = Tuning::default();
        let observatory =
            BuildingInfo::new(6, 1, "Observatory", &[BuildingFunction::AstronomicalObservation], 1);
        let p: Worker = Person::new(1, "Ana", 1, JobType::Astronomer).into();
        let task = ObserveAstronomicalObjects::new();

        let day = ColonySnapshot::new()
            .with_clock(MarsClock::new(1, 500.0))
            .with_daylight(1, true)
            .with_building(observatory);
        let ctx = ScoringContext::new(&day, &tuning);
        assert_eq!(task.rate(&p, &ctx).unwrap().rating.rejected_by(), Some("dark"));

        let night = day.with_clock(MarsClock::new(1, 950.0));
        let ctx = ScoringContext::new(&night, &tuning);
        assert!(task.rate(&p, &ctx).unwrap().score() > 0.0);
    }
}
