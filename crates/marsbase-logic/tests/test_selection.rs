//! Integration tests for task selection over the full catalog.
//!
//! Exercises: TaskRegistry → TaskSelector::rate_tasks → weighted draw
//! → create_task → ActivityLog, against an in-memory ColonySnapshot.
//!
//! All tests are pure logic: no simulation engine, no threads except where
//! slot claims are raced on purpose.

use std::sync::Arc;

use marsbase_logic::activity::ActivityLog;
use marsbase_logic::config::Tuning;
use marsbase_logic::constants::{BuildingFunction, FavoriteType, JobType, RobotType};
use marsbase_logic::descriptor::{TaskDescriptor, TaskScope};
use marsbase_logic::duty::{MarsClock, ShiftType};
use marsbase_logic::error::ScoringFault;
use marsbase_logic::meta::{JobTarget, MetaTask, Offer, ScoringContext};
use marsbase_logic::oracle::{
    BuildingInfo, ColonyOracle, GreenhouseInfo, PondInfo, RadiationHazard, VehicleInfo,
};
use marsbase_logic::rating::ScoreBuilder;
use marsbase_logic::registry::TaskRegistry;
use marsbase_logic::selector::{Outcome, PendingTasks, TaskSelector};
use marsbase_logic::slot::SlotKey;
use marsbase_logic::snapshot::ColonySnapshot;
use marsbase_logic::tasks::{default_registry, rest::Idle, work::Cook};
use marsbase_logic::worker::{Person, Robot, Worker, WorkerType};
use rand::rngs::StdRng;
use rand::SeedableRng;

// ── Helpers ────────────────────────────────────────────────────────────

const GREENHOUSE: u32 = 1;
const QUARTERS: u32 = 2;
const INFIRMARY: u32 = 3;

fn selector() -> TaskSelector {
    TaskSelector::new(default_registry(), Tuning::default())
}

/// Settlement 1 at sol 10, millisol 200: shift A is on duty.
fn outpost() -> ColonySnapshot {
    ColonySnapshot::new()
        .with_clock(MarsClock::new(10, 200.0))
        .with_building(BuildingInfo::new(
            GREENHOUSE,
            1,
            "Greenhouse",
            &[BuildingFunction::Farming],
            1,
        ))
        .with_greenhouse(
            1,
            GreenhouseInfo {
                building: GREENHOUSE,
                crops: 12,
                crops_needing_tending: 3,
            },
        )
}

fn settler(id: u32, job: JobType) -> Person {
    let mut p = Person::new(id, &format!("Settler {id}"), 1, job);
    p.condition.fatigue = 50.0;
    p.condition.stress = 10.0;
    p.condition.hunger = 100.0;
    p
}

struct Weighted {
    descriptor: TaskDescriptor,
    weight: f64,
}

impl MetaTask for Weighted {
    fn descriptor(&self) -> &TaskDescriptor {
        &self.descriptor
    }

    fn rate(&self, _worker: &Worker, _ctx: &ScoringContext<'_>) -> Result<Offer, ScoringFault> {
        Ok(Offer::new(
            ScoreBuilder::new().base("weight", self.weight, 3000.0).finish(),
        ))
    }
}

fn weighted(name: &str, weight: f64) -> Arc<dyn MetaTask> {
    Arc::new(Weighted {
        descriptor: TaskDescriptor::new(name, WorkerType::Both, TaskScope::AnyHour),
        weight,
    })
}

// ── Registry ───────────────────────────────────────────────────────────

#[test]
fn registry_pools_partition_catalog() {
    let registry = default_registry();
    for task in registry.all_tasks() {
        let scope = task.descriptor().scope();
        let in_pool =
            |s: TaskScope| registry.tasks_for(s).iter().any(|t| t.name() == task.name());
        assert_eq!(in_pool(TaskScope::WorkHour), scope != TaskScope::NonWorkHour);
        assert_eq!(in_pool(TaskScope::NonWorkHour), scope != TaskScope::WorkHour);
        assert_eq!(in_pool(TaskScope::AnyHour), scope == TaskScope::AnyHour);
    }
    let fallback = registry.fallback().name().to_string();
    assert!(registry.by_name(&fallback).is_err());
    assert!(registry.by_name("TendGreenhouse").is_ok());
}

// ── Scenarios ──────────────────────────────────────────────────────────

#[test]
fn only_candidate_is_always_chosen() {
    let colony = outpost();
    let worker: Worker = settler(1, JobType::Engineer).into();
    let mut s = selector();

    let cache = s.rate_tasks(&worker, &colony);
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.jobs()[0].name(), "TendGreenhouse");
    assert!((cache.total() - 30.0).abs() < 1e-9);

    for seed in 0..50 {
        let mut rng = StdRng::seed_from_u64(seed);
        let sel = s.choose_task(&worker, &colony, &mut rng);
        assert_eq!(sel.outcome, Outcome::Drawn);
        assert_eq!(sel.handle.task, "TendGreenhouse");
        assert_eq!(sel.handle.target, Some(JobTarget::Building(GREENHOUSE)));
        assert_eq!(sel.handle.claim, Some(SlotKey::Workstation(GREENHOUSE)));
    }
}

#[test]
fn exhausted_settler_sleeps() {
    let colony = outpost().with_building(BuildingInfo::new(
        QUARTERS,
        1,
        "Quarters",
        &[BuildingFunction::LivingAccommodation],
        4,
    ));
    let mut p = settler(1, JobType::Botanist);
    p.condition.fatigue = 1200.0;
    let worker: Worker = p.into();
    let mut s = selector();

    let cache = s.rate_tasks(&worker, &colony);
    let sleep = cache.jobs().iter().find(|j| j.name() == "Sleep").map(|j| j.score);
    assert!(sleep.is_some_and(|w| w / cache.total() > 0.9), "{cache}");

    let mut rng = StdRng::seed_from_u64(7);
    let sel = s.choose_task(&worker, &colony, &mut rng);
    assert_eq!(sel.handle.task, "Sleep");
    assert_eq!(sel.handle.target, Some(JobTarget::Building(QUARTERS)));
}

#[test]
fn hard_gate_beats_favorite_and_preference() {
    let colony = outpost()
        .with_building(BuildingInfo::new(4, 1, "Kitchen", &[BuildingFunction::Cooking], 2))
        .with_hungry_people(1, 10);
    let tuning = Tuning::default();
    let ctx = ScoringContext::new(&colony, &tuning);

    let mut chef = settler(1, JobType::Chef);
    chef.favorite = Some(FavoriteType::Cooking);
    chef.preferences.insert("Cook".into(), 5);
    let rested: Worker = chef.clone().into();
    assert!(Cook::new().rate(&rested, &ctx).unwrap().score() > 0.0);

    chef.condition.fatigue = 1200.0;
    let exhausted: Worker = chef.into();
    let offer = Cook::new().rate(&exhausted, &ctx).unwrap();
    assert_eq!(offer.score(), 0.0);
    assert_eq!(offer.rating.rejected_by(), Some("fit"));

    let cache = selector().rate_tasks(&exhausted, &colony);
    assert!(cache.jobs().iter().all(|j| j.name() != "Cook"));
}

#[test]
fn full_bed_vetoes_second_patient() {
    let colony = outpost()
        .with_building(BuildingInfo::new(
            INFIRMARY,
            1,
            "Infirmary",
            &[BuildingFunction::Medical],
            2,
        ))
        .with_beds(INFIRMARY, 1);
    let mut s = selector();
    let mut rng = StdRng::seed_from_u64(3);

    let patient = |id| {
        let mut p = settler(id, JobType::Pilot);
        p.condition.health = 0.1;
        Worker::from(p)
    };

    let first = s.choose_task(&patient(1), &colony, &mut rng);
    assert_eq!(first.handle.task, "RequestTreatment");
    let bed = first.handle.claim.unwrap();
    colony.claim(bed).unwrap();

    let second = s.choose_task(&patient(2), &colony, &mut rng);
    assert_eq!(second.outcome, Outcome::Idle);
    assert_eq!(second.handle.task, "Idle");

    colony.release(bed).unwrap();
    let third = s.choose_task(&patient(2), &colony, &mut rng);
    assert_eq!(third.handle.task, "RequestTreatment");
}

#[test]
fn slot_taken_after_scoring_is_unavailable() {
    let colony = outpost();
    let worker: Worker = settler(1, JobType::Engineer).into();
    let mut s = selector();
    let cache = s.rate_tasks(&worker, &colony);
    let job = &cache.jobs()[0];

    // Someone else gets to the greenhouse first.
    colony.claim(SlotKey::Workstation(GREENHOUSE)).unwrap();
    let ctx = ScoringContext::new(&colony, s.tuning());
    let err = job.task.create_task(&worker, job, &ctx).unwrap_err();
    assert_eq!(err.task, "TendGreenhouse");

    let mut rng = StdRng::seed_from_u64(1);
    let sel = s.choose_task(&worker, &colony, &mut rng);
    assert_eq!(sel.outcome, Outcome::Idle);
}

#[test]
fn concurrent_claims_respect_capacity() {
    let colony = ColonySnapshot::new().with_beds(INFIRMARY, 3);
    let granted = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| colony.claim(SlotKey::Bed(INFIRMARY)).is_ok()))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count()
    });
    assert_eq!(granted, 3);
    let state = colony.slot_states()[0].1;
    assert_eq!(state.committed, 3);
}

#[test]
fn solar_flare_removes_outdoor_work() {
    let base = outpost()
        .with_building(BuildingInfo::new(5, 1, "Airlock", &[BuildingFunction::Eva], 2))
        .with_airlock(5, 2)
        .with_regolith_demand(1, 1.0);
    let worker: Worker = settler(1, JobType::Areologist).into();
    let mut s = selector();

    let clear = s.rate_tasks(&worker, &base);
    assert!(clear.jobs().iter().any(|j| j.name() == "DigRegolith"));

    let flare = base.with_radiation(1, RadiationHazard::Severe);
    let cache = s.rate_tasks(&worker, &flare);
    assert!(cache.jobs().iter().all(|j| j.name() != "DigRegolith"));
    assert!(cache.jobs().iter().any(|j| j.name() == "TendGreenhouse"));
}

#[test]
fn drained_robot_goes_to_charger() {
    let colony = outpost()
        .with_building(BuildingInfo::new(
            6,
            1,
            "Robot Station",
            &[BuildingFunction::RobotStation],
            2,
        ))
        .with_chargers(6, 1);
    let mut bot = Robot::new(20, "GardenBot 1", 1, RobotType::GardenBot);
    bot.battery = 0.1;
    let mut rng = StdRng::seed_from_u64(5);
    let sel = selector().choose_task(&bot.into(), &colony, &mut rng);
    assert_eq!(sel.handle.task, "Charge");
    assert_eq!(sel.handle.claim, Some(SlotKey::Charger(6)));
}

// ── Fairness ───────────────────────────────────────────────────────────

#[test]
fn draw_frequency_tracks_weights() {
    let registry = TaskRegistry::new(
        vec![weighted("Heavy", 3.0), weighted("Light", 1.0)],
        Arc::new(Idle::new()),
    );
    let mut s = TaskSelector::new(registry, Tuning::default());
    let colony = ColonySnapshot::new();
    let mut p = Person::new(1, "Ana", 1, JobType::Pilot);
    p.shift = ShiftType::On;
    let worker: Worker = p.into();
    let mut rng = StdRng::seed_from_u64(2024);

    let draws = 20_000;
    let heavy = (0..draws)
        .filter(|_| s.choose_task(&worker, &colony, &mut rng).handle.task == "Heavy")
        .count();
    let share = heavy as f64 / draws as f64;
    assert!((share - 0.75).abs() < 0.02, "heavy share {share}");
}

// ── Pending orders ─────────────────────────────────────────────────────

#[test]
fn pending_order_taken_before_draw() {
    let colony = outpost();
    let worker: Worker = settler(1, JobType::Engineer).into();
    let mut s = selector();
    let mut rng = StdRng::seed_from_u64(11);
    let mut orders = PendingTasks::new();

    assert!(orders.add("TendGreenhouse", false));
    assert!(!orders.add("TendGreenhouse", false));
    let sel = s.choose_task_with_orders(&worker, &mut orders, &colony, &mut rng);
    assert_eq!(sel.outcome, Outcome::Ordered);
    assert_eq!(sel.handle.claim, Some(SlotKey::Workstation(GREENHOUSE)));
    assert!(orders.is_empty());
}

#[test]
fn impossible_order_is_dropped() {
    let colony = outpost();
    let worker: Worker = settler(1, JobType::Engineer).into();
    let mut s = selector();
    let mut rng = StdRng::seed_from_u64(11);
    let mut orders = PendingTasks::new();

    orders.add("Dance", false);
    orders.add("Workout", false);
    let first = s.choose_task_with_orders(&worker, &mut orders, &colony, &mut rng);
    assert_eq!(first.outcome, Outcome::Drawn);
    // Off-duty tasks cannot be ordered during a shift.
    let second = s.choose_task_with_orders(&worker, &mut orders, &colony, &mut rng);
    assert_eq!(second.outcome, Outcome::Drawn);
    assert!(orders.is_empty());
}

#[test]
fn order_without_free_bed_is_dropped() {
    let colony = outpost()
        .with_building(BuildingInfo::new(
            INFIRMARY,
            1,
            "Infirmary",
            &[BuildingFunction::Medical],
            2,
        ))
        .with_beds(INFIRMARY, 1);
    colony.claim(SlotKey::Bed(INFIRMARY)).unwrap();
    let mut p = settler(1, JobType::Pilot);
    p.condition.health = 0.1;
    let worker: Worker = p.into();
    let mut s = selector();
    let mut rng = StdRng::seed_from_u64(5);
    let mut orders = PendingTasks::new();

    orders.add("RequestTreatment", false);
    let sel = s.choose_task_with_orders(&worker, &mut orders, &colony, &mut rng);
    assert_ne!(sel.outcome, Outcome::Ordered);
    assert_ne!(sel.handle.task, "RequestTreatment");
    assert!(orders.is_empty());

    colony.release(SlotKey::Bed(INFIRMARY)).unwrap();
    orders.add("RequestTreatment", false);
    let sel = s.choose_task_with_orders(&worker, &mut orders, &colony, &mut rng);
    assert_eq!(sel.outcome, Outcome::Ordered);
    assert_eq!(sel.handle.claim, Some(SlotKey::Bed(INFIRMARY)));
}

// ── Settlement scans ───────────────────────────────────────────────────

#[test]
fn settlement_scans_shared_within_a_tick() {
    let mut rover = VehicleInfo::new(1, "Rover 1", 1);
    rover.loading = Some(0.8);
    let mut colony = outpost()
        .with_vehicle(rover)
        .with_building(BuildingInfo::new(7, 1, "Algae Pond", &[BuildingFunction::Farming], 2))
        .with_pond(
            1,
            PondInfo {
                building: 7,
                name: "Pond A".into(),
                deviation: 0.4,
            },
        );
    let mut s = selector();
    let a: Worker = settler(1, JobType::Pilot).into();
    let b: Worker = settler(2, JobType::Biologist).into();

    let cache = s.rate_tasks(&a, &colony);
    assert!(cache.jobs().iter().any(|j| j.label == "Load Rover 1"));
    assert!(cache.jobs().iter().any(|j| j.label == "Tend Pond A"));
    s.rate_tasks(&b, &colony);
    // Load, unload and service vehicle plus tend pond.
    assert_eq!(s.scan_cache().stats(), (4, 4));

    colony.advance(1.0);
    s.rate_tasks(&a, &colony);
    assert_eq!(s.scan_cache().stats(), (8, 4));
}

#[test]
fn claimed_vehicle_drops_out_for_later_workers() {
    let mut rover = VehicleInfo::new(1, "Rover 1", 1);
    rover.loading = Some(0.8);
    let colony = outpost().with_vehicle(rover);
    let mut s = selector();

    let a: Worker = settler(1, JobType::Pilot).into();
    assert!(s.rate_tasks(&a, &colony).jobs().iter().any(|j| j.name() == "LoadVehicle"));
    colony.claim(SlotKey::Vehicle(1)).unwrap();

    let b: Worker = settler(2, JobType::Pilot).into();
    assert!(s.rate_tasks(&b, &colony).jobs().iter().all(|j| j.name() != "LoadVehicle"));
}

// ── Activity log ───────────────────────────────────────────────────────

#[test]
fn a_sol_of_choices_is_logged_without_repeats() {
    let mut colony = outpost().with_building(BuildingInfo::new(
        QUARTERS,
        1,
        "Quarters",
        &[BuildingFunction::LivingAccommodation],
        4,
    ));
    let worker: Worker = settler(1, JobType::Botanist).into();
    let mut s = selector();
    let mut rng = StdRng::seed_from_u64(99);
    let mut log = ActivityLog::default();

    for _ in 0..20 {
        let sel = s.choose_task(&worker, &colony, &mut rng);
        log.record(&colony.clock(), &sel.handle);
        colony.advance(50.0);
    }

    assert_eq!(log.sols_kept(), 2);
    for (_, day) in log.history() {
        assert!(!day.is_empty());
        assert!(day
            .windows(2)
            .all(|w| w[0].task != w[1].task || w[0].description != w[1].description));
    }
}
