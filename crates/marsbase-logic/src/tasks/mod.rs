//! The concrete task catalog.
//!
//! Every scorer here follows the same pipeline (see [`crate::rating`]):
//! cheap gates, a capped base need, a hard veto on the shared resource it
//! needs, then the social and personal modifiers in [`social`].
//!
//! | Module | Tasks |
//! |--------|-------|
//! | [`rest`] | Sleep, EatDrink, Relax, Workout, Converse, Idle (fallback) |
//! | [`work`] | Cook, TendGreenhouse, TendAlgaePond, Research, ObserveAstronomicalObjects |
//! | [`repair`] | RepairMalfunction, MaintainBuilding |
//! | [`medical`] | RequestTreatment, TreatPatient |
//! | [`eva`] | DigRegolith |
//! | [`robot`] | Charge |
//! | [`vehicle`] | LoadVehicle, UnloadVehicle, MaintainVehicle |

pub mod eva;
pub mod medical;
pub mod repair;
pub mod rest;
pub mod robot;
pub mod vehicle;
pub mod work;

use std::sync::Arc;

use crate::constants::BuildingFunction;
use crate::descriptor::TaskDescriptor;
use crate::meta::{MetaTask, ScoringContext};
use crate::modifiers::{
    affinity_modifier, crowding_modifier, overcrowding_factor, preference_modifier,
    relationship_modifier,
};
use crate::oracle::{BuildingInfo, SettlementId};
use crate::rating::Modifiers;
use crate::registry::TaskRegistry;
use crate::slot::SlotKey;
use crate::worker::Worker;

/// Every selectable task, in registration order.
pub fn catalog() -> Vec<Arc<dyn MetaTask>> {
    vec![
        Arc::new(rest::Sleep::new()),
        Arc::new(rest::EatDrink::new()),
        Arc::new(rest::Relax::new()),
        Arc::new(rest::Workout::new()),
        Arc::new(rest::Converse::new()),
        Arc::new(work::ObserveAstronomicalObjects::new()),
        Arc::new(work::Cook::new()),
        Arc::new(work::TendGreenhouse::new()),
        Arc::new(work::TendAlgaePond::new()),
        Arc::new(work::Research::new()),
        Arc::new(repair::RepairMalfunction::new()),
        Arc::new(repair::MaintainBuilding::new()),
        Arc::new(medical::RequestTreatment::new()),
        Arc::new(medical::TreatPatient::new()),
        Arc::new(eva::DigRegolith::new()),
        Arc::new(robot::Charge::new()),
        Arc::new(vehicle::LoadVehicle::new()),
        Arc::new(vehicle::UnloadVehicle::new()),
        Arc::new(vehicle::MaintainVehicle::new()),
    ]
}

/// Registry over [`catalog`] with [`rest::Idle`] as the fallback.
pub fn default_registry() -> TaskRegistry {
    TaskRegistry::new(catalog(), Arc::new(rest::Idle::new()))
}

/// Person: passes the standard fitness gate. Robot: has charge left.
pub(crate) fn is_fit(worker: &Worker, ctx: &ScoringContext<'_>) -> bool {
    match worker {
        Worker::Person(p) => p.condition.passes(&ctx.tuning.fitness),
        Worker::Robot(r) => !r.is_low_battery(),
    }
}

/// Inside the worker's own settlement (or its garage).
pub(crate) fn in_settlement(worker: &Worker) -> bool {
    worker.location().is_in_settlement()
}

/// The building the worker is standing in.
pub(crate) fn here<'a>(worker: &Worker, ctx: &ScoringContext<'a>) -> Option<&'a BuildingInfo> {
    let colony = ctx.colony;
    worker.building().and_then(|id| colony.building(id))
}

/// Least crowded working building with the function and a free workstation.
pub(crate) fn roomiest<'a>(
    ctx: &ScoringContext<'a>,
    settlement: SettlementId,
    function: BuildingFunction,
) -> Option<&'a BuildingInfo> {
    let colony = ctx.colony;
    colony
        .buildings(settlement, function)
        .into_iter()
        .filter(|b| !b.malfunctioning && colony.has_room(SlotKey::Workstation(b.id)))
        .min_by(|a, b| {
            overcrowding_factor(a.occupants, a.capacity)
                .total_cmp(&overcrowding_factor(b.occupants, b.capacity))
        })
}

/// Affinity, preference, crowding and relationship modifiers. A rejected
/// pipeline is passed through without querying the colony.
pub(crate) fn social(
    m: Modifiers,
    descriptor: &TaskDescriptor,
    worker: &Worker,
    destination: Option<&BuildingInfo>,
    ctx: &ScoringContext<'_>,
) -> Modifiers {
    if m.is_rejected() {
        return m;
    }
    let tuning = ctx.tuning;
    let m = m
        .multiply("affinity", affinity_modifier(descriptor, worker, tuning))
        .multiply(
            "crowding",
            crowding_modifier(here(worker, ctx), destination, tuning.crowding_weight),
        );
    let Some(person) = worker.as_person() else {
        return m;
    };
    let m = m.multiply(
        "preference",
        preference_modifier(person.preference(descriptor.name()), tuning),
    );
    match destination {
        Some(b) => m.multiply(
            "relationship",
            relationship_modifier(
                &ctx.colony.opinions(person.id, b.id),
                tuning.relationship_weight,
            ),
        ),
        None => m,
    }
}
