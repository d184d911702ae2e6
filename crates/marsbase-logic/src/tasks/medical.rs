//! Sick bay: patients asking for a bed, medics treating them.

use std::cmp::Reverse;

use crate::constants::{BuildingFunction, JobType, RobotType, RoleType, TaskTrait};
use crate::descriptor::{TaskDescriptor, TaskScope};
use crate::error::ScoringFault;
use crate::health::MedicalSeverity;
use crate::meta::{JobTarget, MetaTask, Offer, ScoringContext};
use crate::modifiers::shift_modifier;
use crate::rating::ScoreBuilder;
use crate::slot::SlotKey;
use crate::worker::{Worker, WorkerType};

use super::{in_settlement, is_fit, social};

const SERIOUS_NEED: f64 = 500.0;
const CRITICAL_NEED: f64 = 1500.0;
const RADIATION_SICKNESS_NEED: f64 = 500.0;

/// Base score per patient waiting in the chosen sick bay's settlement.
pub const TREAT_PER_PATIENT: f64 = 100.0;

/// Go lie in a medical bed. Ignores the fitness gate: the sick are its users.
pub struct RequestTreatment {
    descriptor: TaskDescriptor,
}

impl RequestTreatment {
    pub fn new() -> Self {
        Self {
            descriptor: TaskDescriptor::new(
                "RequestTreatment",
                WorkerType::Person,
                TaskScope::AnyHour,
            ),
        }
    }
}

impl Default for RequestTreatment {
    fn default() -> Self {
        Self::new()
    }
}

impl MetaTask for RequestTreatment {
    fn descriptor(&self) -> &TaskDescriptor {
        &self.descriptor
    }

    fn rate(&self, worker: &Worker, ctx: &ScoringContext<'_>) -> Result<Offer, ScoringFault> {
        let Some(person) = worker.as_person() else {
            return Ok(Offer::zero("not a person"));
        };
        let c = &person.condition;
        let need = match c.medical_severity() {
            MedicalSeverity::Serious => SERIOUS_NEED,
            MedicalSeverity::Critical => CRITICAL_NEED,
            MedicalSeverity::None | MedicalSeverity::Minor => 0.0,
        } + if c.radiation_sick { RADIATION_SICKNESS_NEED } else { 0.0 };

        let colony = ctx.colony;
        let mut bed = None;
        let rating = ScoreBuilder::new()
            .gate("in settlement", in_settlement(worker))
            .gate("medical problem", c.has_serious_medical_problem())
            .base("condition", need, ctx.tuning.score_cap)
            .require_with("medical bed", || {
                bed = colony
                    .buildings(person.settlement, BuildingFunction::Medical)
                    .into_iter()
                    .find(|b| !b.malfunctioning && colony.has_room(SlotKey::Bed(b.id)));
                bed.is_some()
            })
            .finish();

        let offer = Offer::new(rating);
        Ok(match bed {
            Some(b) => offer
                .with_target(JobTarget::Building(b.id))
                .with_claim(SlotKey::Bed(b.id)),
            None => offer,
        })
    }
}

/// Treat patients waiting at a sick bay.
pub struct TreatPatient {
    descriptor: TaskDescriptor,
}

impl TreatPatient {
    pub fn new() -> Self {
        Self {
            descriptor: TaskDescriptor::new("TreatPatient", WorkerType::Both, TaskScope::AnyHour)
                .with_traits(&[TaskTrait::Medical, TaskTrait::Treatment])
                .with_jobs(&[JobType::Doctor])
                .with_roles(&[RoleType::ChiefOfSafetyAndHealth, RoleType::SafetySpecialist])
                .with_robots(&[RobotType::MedicBot]),
        }
    }
}

impl Default for TreatPatient {
    fn default() -> Self {
        Self::new()
    }
}

impl MetaTask for TreatPatient {
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
        let mut waiting = Vec::new();
        for aid in colony.medical_aids(worker.settlement()) {
            if aid.patients_waiting == 0 {
                continue;
            }
            let building = colony.building(aid.building).ok_or_else(|| {
                ScoringFault::new(self.name(), format!("sick bay building {} missing", aid.building))
            })?;
            waiting.push((aid.patients_waiting, building));
        }
        let patients: u32 = waiting.iter().map(|(n, _)| n).sum();
        let sick_bay = waiting
            .iter()
            .filter(|(_, b)| !b.malfunctioning && colony.has_room(SlotKey::Workstation(b.id)))
            .max_by_key(|(n, b)| (*n, Reverse(b.id)))
            .map(|(_, b)| *b);

        let m = gates
            .gate("patients", patients > 0)
            .base("patients", f64::from(patients) * TREAT_PER_PATIENT, ctx.tuning.score_cap)
            .require("sick bay", sick_bay.is_some())
            .multiply("shift", shift_modifier(worker.is_on_duty(&ctx.clock()), ctx.tuning));
        let rating = social(m, &self.descriptor, worker, sick_bay, ctx)
            .cap(ctx.tuning.score_cap)
            .finish();

        let offer = Offer::new(rating);
        Ok(match sick_bay {
            Some(b) => offer
                .with_target(JobTarget::Building(b.id))
                .with_claim(SlotKey::Workstation(b.id)),
            None => offer,
        })
    }
}
