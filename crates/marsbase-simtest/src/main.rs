//! Marsbase Headless Scheduling Harness
//!
//! Drives the task selector over a small outpost for a full sol and checks
//! the colony-level behavior: shared slots never overfill, people sleep and
//! eat, robots recharge, hazards keep crews indoors. Runs entirely
//! in-process against an in-memory colony snapshot.
//!
//! Usage:
//!   cargo run -p marsbase-simtest
//!   cargo run -p marsbase-simtest -- --verbose
//!   RUST_LOG=debug cargo run -p marsbase-simtest

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use log::{info, warn};
use marsbase_logic::activity::ActivityLog;
use marsbase_logic::cache::{ScoredJob, TaskCache};
use marsbase_logic::config::Tuning;
use marsbase_logic::constants::{BuildingFunction, FavoriteType, JobType, RobotType, RoleType};
use marsbase_logic::descriptor::{TaskDescriptor, TaskScope};
use marsbase_logic::duty::{self, MarsClock, ShiftType};
use marsbase_logic::error::{ScoringFault, TaskUnavailable};
use marsbase_logic::meta::{MetaTask, Offer, ScoringContext, TaskHandle};
use marsbase_logic::oracle::{
    BuildingId, BuildingInfo, ColonyOracle, GreenhouseInfo, MaintenanceInfo, MalfunctionInfo,
    RadiationHazard, SettlementId, VehicleInfo,
};
use marsbase_logic::rating::ScoreBuilder;
use marsbase_logic::registry::TaskRegistry;
use marsbase_logic::selector::{Outcome, PendingTasks, TaskSelector};
use marsbase_logic::slot::SlotKey;
use marsbase_logic::snapshot::ColonySnapshot;
use marsbase_logic::tasks::{self, rest::Idle, work::TendGreenhouse};
use marsbase_logic::worker::{LocationCategory, Person, Robot, Worker, WorkerId, WorkerType};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

// ── Data files (same JSON a host simulation would ship) ─────────────────
const TUNING_JSON: &str = include_str!("../../../data/colony_tuning.json");
const OUTPOST_JSON: &str = include_str!("../../../data/outpost.json");

const SEED: u64 = 0x4d41_5253;
const TICK: f64 = 25.0;

#[derive(Debug, Deserialize)]
struct Places {
    building: BuildingId,
    places: u32,
}

#[derive(Debug, Deserialize)]
struct Breakdown {
    #[serde(flatten)]
    info: MalfunctionInfo,
    repairers: u32,
}

#[derive(Debug, Deserialize)]
struct CrewMember {
    id: WorkerId,
    name: String,
    job: JobType,
    role: Option<RoleType>,
    shift: ShiftType,
    favorite: Option<FavoriteType>,
}

#[derive(Debug, Deserialize)]
struct RobotUnit {
    id: WorkerId,
    name: String,
    robot_type: RobotType,
}

#[derive(Debug, Deserialize)]
struct Outpost {
    settlement: SettlementId,
    sol: u32,
    millisol: f64,
    hungry_people: u32,
    regolith_demand: f64,
    buildings: Vec<BuildingInfo>,
    beds: Vec<Places>,
    airlocks: Vec<Places>,
    chargers: Vec<Places>,
    garage_bays: Vec<Places>,
    greenhouses: Vec<GreenhouseInfo>,
    maintenance: Vec<MaintenanceInfo>,
    malfunctions: Vec<Breakdown>,
    vehicles: Vec<VehicleInfo>,
    crew: Vec<CrewMember>,
    robots: Vec<RobotUnit>,
}

impl Outpost {
    fn snapshot(&self) -> ColonySnapshot {
        let s = self.settlement;
        let mut colony = ColonySnapshot::new()
            .with_clock(MarsClock::new(self.sol, self.millisol))
            .with_hungry_people(s, self.hungry_people)
            .with_regolith_demand(s, self.regolith_demand);
        for b in &self.buildings {
            colony = colony.with_building(b.clone());
        }
        for p in &self.beds {
            colony = colony.with_beds(p.building, p.places);
        }
        for p in &self.airlocks {
            colony = colony.with_airlock(p.building, p.places);
        }
        for p in &self.chargers {
            colony = colony.with_chargers(p.building, p.places);
        }
        for p in &self.garage_bays {
            colony = colony.with_garage_bays(p.building, p.places);
        }
        for g in &self.greenhouses {
            colony = colony.with_greenhouse(s, g.clone());
        }
        for m in &self.maintenance {
            colony = colony.with_maintenance(s, m.clone());
        }
        for m in &self.malfunctions {
            colony = colony.with_malfunction(s, m.info.clone(), m.repairers);
        }
        for v in &self.vehicles {
            colony = colony.with_vehicle(v.clone());
        }
        colony
    }

    fn workers(&self) -> Vec<Worker> {
        let people = self.crew.iter().map(|c| {
            let mut p = Person::new(c.id, &c.name, self.settlement, c.job);
            p.role = c.role;
            p.shift = c.shift;
            p.favorite = c.favorite;
            p.building = Some(1);
            Worker::from(p)
        });
        let robots = self.robots.iter().map(|r| {
            let mut bot = Robot::new(r.id, &r.name, self.settlement, r.robot_type);
            bot.building = Some(7);
            Worker::from(bot)
        });
        people.chain(robots).collect()
    }
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
    println!("=== Marsbase Scheduling Harness ===\n");

    let mut results = Vec::new();

    // 1. Tuning file
    let tuning = match Tuning::from_json(TUNING_JSON) {
        Ok(t) => t,
        Err(e) => {
            println!("  ✗ tuning_parse: {e}");
            std::process::exit(1);
        }
    };
    results.extend(validate_tuning(&tuning, verbose));

    // 2. Catalog & registry
    results.extend(validate_registry(verbose));

    // 3. Outpost scenario
    let outpost: Outpost = match serde_json::from_str(OUTPOST_JSON) {
        Ok(o) => o,
        Err(e) => {
            println!("  ✗ outpost_parse: {e}");
            std::process::exit(1);
        }
    };
    results.extend(validate_outpost_sol(&outpost, &tuning, verbose));

    // 4. Radiation hazards
    results.extend(validate_hazards(&outpost, &tuning, verbose));

    // 5. Weighted draw
    results.extend(validate_draw(verbose));

    // 6. Pending orders
    results.extend(validate_orders(&outpost, &tuning, verbose));

    // 7. Scoring properties over random workers
    results.extend(validate_score_properties(&outpost, &tuning, verbose));

    // 8. Selection edge cases
    results.extend(validate_selection_edges(&tuning, verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Tuning ───────────────────────────────────────────────────────────

fn validate_tuning(tuning: &Tuning, _verbose: bool) -> Vec<TestResult> {
    println!("--- Tuning ---");
    let mut results = Vec::new();

    results.push(TestResult {
        name: "tuning_matches_defaults".into(),
        passed: *tuning == Tuning::default(),
        detail: format!("score cap {}, idle weight {}", tuning.score_cap, tuning.idle_weight),
    });

    let partial = Tuning::from_json(r#"{ "score_cap": 1200.0 }"#);
    results.push(TestResult {
        name: "tuning_partial_fills_defaults".into(),
        passed: partial
            .as_ref()
            .is_ok_and(|t| t.score_cap == 1200.0 && t.idle_weight == tuning.idle_weight),
        detail: format!("{:?}", partial.map(|t| t.score_cap)),
    });

    let bad = [
        r#"{ "score_cap": -1.0 }"#,
        r#"{ "preference_scale": 0.5 }"#,
        r#"{ "crowding_weight": 2.0 }"#,
        r#"{ "score_cap": "lots" }"#,
    ];
    let rejected = bad.iter().filter(|json| Tuning::from_json(json).is_err()).count();
    results.push(TestResult {
        name: "tuning_rejects_invalid".into(),
        passed: rejected == bad.len(),
        detail: format!("{}/{} invalid documents rejected", rejected, bad.len()),
    });

    results
}

// ── 2. Registry ─────────────────────────────────────────────────────────

fn validate_registry(verbose: bool) -> Vec<TestResult> {
    println!("--- Catalog & Registry ---");
    let mut results = Vec::new();

    let registry = tasks::default_registry();
    registry.build();
    let all = registry.all_tasks();
    results.push(TestResult {
        name: "registry_catalog_size".into(),
        passed: all.len() == tasks::catalog().len() && registry.is_built(),
        detail: format!("{} tasks registered", all.len()),
    });

    let work = registry.tasks_for(TaskScope::WorkHour);
    let off = registry.tasks_for(TaskScope::NonWorkHour);
    let uncovered: Vec<_> = all
        .iter()
        .filter(|t| !work.iter().chain(off).any(|p| p.name() == t.name()))
        .map(|t| t.name().to_string())
        .collect();
    results.push(TestResult {
        name: "registry_pools_cover_catalog".into(),
        passed: uncovered.is_empty(),
        detail: if uncovered.is_empty() {
            format!("work {} / off-duty {}", work.len(), off.len())
        } else {
            format!("not in any pool: {}", uncovered.join(", "))
        },
    });

    let names = |pool: &[Arc<dyn MetaTask>]| -> BTreeSet<String> {
        pool.iter().map(|t| t.name().to_string()).collect()
    };
    let shared: BTreeSet<_> = names(work).intersection(&names(off)).cloned().collect();
    let any_hour = names(registry.tasks_for(TaskScope::AnyHour));
    results.push(TestResult {
        name: "registry_pools_share_any_hour".into(),
        passed: shared == any_hour,
        detail: format!("{} any-hour tasks in both pools", shared.len()),
    });

    let idle = registry.fallback().name().to_string();
    results.push(TestResult {
        name: "registry_fallback_outside_pools".into(),
        passed: registry.by_name(&idle).is_err()
            && !work.iter().chain(off).any(|t| t.name() == idle),
        detail: format!("fallback '{idle}'"),
    });

    if verbose {
        for t in all {
            let d = t.descriptor();
            println!("    {:<28} {:?} {:?}", t.name(), d.worker_type(), d.scope());
        }
    }

    results
}

// ── 3. Outpost Sol ──────────────────────────────────────────────────────

/// Crude physiology so needs build up and get satisfied over the sol.
fn live(worker: &mut Worker, task: &str) {
    match worker {
        Worker::Person(p) => {
            let c = &mut p.condition;
            match task {
                "Sleep" => c.fatigue = (c.fatigue - 120.0).max(0.0),
                "EatDrink" => {
                    c.hunger = 0.0;
                    c.thirst = 0.0;
                }
                "Relax" | "Converse" => c.stress = (c.stress - 10.0).max(0.0),
                _ => {}
            }
            c.fatigue += 12.0;
            c.hunger += 8.0;
            c.thirst += 6.0;
            c.stress = (c.stress + 1.0).min(100.0);
        }
        Worker::Robot(r) => {
            if task == "Charge" {
                r.battery = 1.0;
            } else {
                r.battery = (r.battery - 0.04).max(0.0);
            }
        }
    }
}

fn validate_outpost_sol(outpost: &Outpost, tuning: &Tuning, verbose: bool) -> Vec<TestResult> {
    println!("--- Outpost Sol ---");
    let mut results = Vec::new();

    let mut colony = outpost.snapshot();
    let mut workers = outpost.workers();
    let mut selector = TaskSelector::new(tasks::default_registry(), tuning.clone());
    let mut rng = StdRng::seed_from_u64(SEED);
    let mut logs: HashMap<WorkerId, ActivityLog> = HashMap::new();
    let mut held: HashMap<WorkerId, TaskHandle> = HashMap::new();
    let mut counts: BTreeMap<String, u32> = BTreeMap::new();
    let mut overfull = Vec::new();
    let mut mismatched = Vec::new();
    let mut stale = 0;
    let mut slept_on_time = false;
    let mut idle = 0;
    let ticks = (duty::MILLISOLS_PER_SOL / TICK) as u32;

    for _ in 0..ticks {
        let clock = colony.clock();
        for worker in workers.iter_mut() {
            // Finish the previous task before choosing the next.
            if let Some(key) = held.remove(&worker.id()).and_then(|h| h.claim) {
                if let Err(e) = colony.release(key) {
                    warn!("{}: {e}", worker.name());
                }
            }

            let selection = selector.choose_task(worker, &colony, &mut rng);
            let handle = selection.handle;
            if selection.outcome == Outcome::Idle {
                idle += 1;
            }
            if handle.issued != clock.stamp() {
                stale += 1;
            }
            if let Ok(task) = selector.registry().by_name(&handle.task) {
                if !task.descriptor().worker_type().accepts(worker.kind()) {
                    mismatched.push(format!("{} → {}", worker.name(), handle.task));
                }
            }
            if let Worker::Person(p) = &*worker {
                if handle.task == "Sleep" && duty::is_sleep_time(p.shift, clock.millisol) {
                    slept_on_time = true;
                }
            }

            let started = match handle.claim {
                Some(key) => colony.claim(key).is_ok(),
                None => true,
            };
            if !started {
                warn!("{}: {} lost its slot", worker.name(), handle.task);
                continue;
            }
            info!(
                "{} {:>6.1} {} → {}",
                clock.sol,
                clock.millisol,
                worker.name(),
                handle.description
            );
            logs.entry(worker.id()).or_default().record(&clock, &handle);
            *counts.entry(handle.task.clone()).or_default() += 1;
            live(worker, &handle.task);
            held.insert(worker.id(), handle);
        }

        for (key, state) in colony.slot_states() {
            if state.committed > state.capacity {
                overfull.push(format!("{key:?} {}/{}", state.committed, state.capacity));
            }
        }
        colony.advance(TICK);
    }

    results.push(TestResult {
        name: "sol_slots_never_overfill".into(),
        passed: overfull.is_empty(),
        detail: if overfull.is_empty() {
            format!("{} slots checked over {} ticks", colony.slot_states().len(), ticks)
        } else {
            overfull.join(", ")
        },
    });

    results.push(TestResult {
        name: "sol_worker_types_respected".into(),
        passed: mismatched.is_empty(),
        detail: if mismatched.is_empty() {
            format!("{} workers", workers.len())
        } else {
            mismatched.join(", ")
        },
    });

    results.push(TestResult {
        name: "sol_handles_issued_this_tick".into(),
        passed: stale == 0,
        detail: format!("{stale} stale handles"),
    });

    results.push(TestResult {
        name: "sol_crew_sleeps_in_window".into(),
        passed: slept_on_time,
        detail: format!("{} sleep choices", counts.get("Sleep").copied().unwrap_or(0)),
    });

    results.push(TestResult {
        name: "sol_crew_eats".into(),
        passed: counts.contains_key("EatDrink"),
        detail: format!("{} meals", counts.get("EatDrink").copied().unwrap_or(0)),
    });

    results.push(TestResult {
        name: "sol_robots_recharge".into(),
        passed: counts.contains_key("Charge"),
        detail: format!("{} charges", counts.get("Charge").copied().unwrap_or(0)),
    });

    let variety = counts.len();
    results.push(TestResult {
        name: "sol_task_variety".into(),
        passed: variety >= 6,
        detail: format!("{variety} distinct tasks, {idle} idle picks"),
    });

    let logged_sols = logs.values().map(|l| l.sols_kept()).max().unwrap_or(0);
    results.push(TestResult {
        name: "sol_activity_logged".into(),
        passed: logs.len() == workers.len() && logged_sols >= 1,
        detail: format!("{} logs, up to {} sols each", logs.len(), logged_sols),
    });

    if verbose {
        for (task, n) in &counts {
            println!("    {task:<28} {n}");
        }
    }

    results
}

// ── 4. Hazards ──────────────────────────────────────────────────────────

fn validate_hazards(outpost: &Outpost, tuning: &Tuning, _verbose: bool) -> Vec<TestResult> {
    println!("--- Radiation Hazards ---");
    let mut results = Vec::new();

    let Some(digger) = outpost
        .workers()
        .into_iter()
        .find(|w| w.as_person().is_some_and(|p| p.job == JobType::Areologist))
    else {
        results.push(TestResult {
            name: "hazard_digger_present".into(),
            passed: false,
            detail: "outpost has no areologist".into(),
        });
        return results;
    };

    let mut outdoor_offers = Vec::new();
    for hazard in [RadiationHazard::Clear, RadiationHazard::Moderate, RadiationHazard::Severe] {
        let colony = outpost
            .snapshot()
            .with_clock(MarsClock::new(outpost.sol, 200.0))
            .with_radiation(outpost.settlement, hazard);
        let mut selector = TaskSelector::new(tasks::default_registry(), tuning.clone());
        let cache = selector.rate_tasks(&digger, &colony);
        let score = |name: &str| {
            cache
                .jobs()
                .iter()
                .filter(|j| j.name() == name)
                .map(|j| j.score)
                .fold(0.0, f64::max)
        };
        outdoor_offers.push((hazard, score("DigRegolith"), score("RepairMalfunction")));
    }

    let clear = outdoor_offers[0];
    let moderate = outdoor_offers[1];
    let severe = outdoor_offers[2];
    results.push(TestResult {
        name: "hazard_moderate_discounts_eva".into(),
        passed: clear.1 > 0.0 && moderate.1 > 0.0 && moderate.1 < clear.1,
        detail: format!("dig {:.1} → {:.1}", clear.1, moderate.1),
    });
    results.push(TestResult {
        name: "hazard_flare_grounds_eva".into(),
        passed: severe.1 == 0.0 && severe.2 == 0.0,
        detail: format!("dig {:.1}, airlock repair {:.1} during flare", severe.1, severe.2),
    });

    results
}

// ── 5. Weighted Draw ────────────────────────────────────────────────────

fn validate_draw(_verbose: bool) -> Vec<TestResult> {
    println!("--- Weighted Draw ---");
    let mut results = Vec::new();

    let registry: TaskRegistry = tasks::default_registry();
    let weighted = |name: &str, weight: f64| {
        registry.by_name(name).ok().map(|task| {
            let rating = ScoreBuilder::new().base("weight", weight, 3000.0).finish();
            ScoredJob::from_offer(task, Offer::new(rating))
        })
    };
    let mut cache = TaskCache::new("draw");
    for job in [weighted("Relax", 3.0), weighted("Workout", 1.0), weighted("Converse", 0.0)]
        .into_iter()
        .flatten()
    {
        cache.add(job);
    }

    let mut rng = StdRng::seed_from_u64(SEED);
    let draws = 20_000;
    let mut hits = [0u32; 2];
    for _ in 0..draws {
        if let Some(i) = cache.random_selection(&mut rng) {
            if i < 2 {
                hits[i] += 1;
            }
        }
    }
    let share = f64::from(hits[0]) / f64::from(draws);
    results.push(TestResult {
        name: "draw_zero_weight_excluded".into(),
        passed: cache.len() == 2,
        detail: format!("{} candidates kept", cache.len()),
    });
    results.push(TestResult {
        name: "draw_tracks_weights".into(),
        passed: (share - 0.75).abs() < 0.02,
        detail: format!("3:1 weights drew {share:.3}"),
    });

    let empty = TaskCache::new("empty");
    results.push(TestResult {
        name: "draw_empty_returns_none".into(),
        passed: empty.random_selection(&mut rng).is_none(),
        detail: "no candidates, no draw".into(),
    });

    results
}

// ── 6. Pending Orders ───────────────────────────────────────────────────

fn validate_orders(outpost: &Outpost, tuning: &Tuning, _verbose: bool) -> Vec<TestResult> {
    println!("--- Pending Orders ---");
    let mut results = Vec::new();

    let colony = outpost.snapshot().with_clock(MarsClock::new(outpost.sol, 100.0));
    let mut selector = TaskSelector::new(tasks::default_registry(), tuning.clone());
    let mut rng = StdRng::seed_from_u64(SEED);
    let Some(engineer) = outpost.workers().into_iter().next() else {
        return results;
    };

    let mut orders = PendingTasks::new();
    orders.add("MaintainBuilding", false);
    let duplicate = orders.add("MaintainBuilding", false);
    let sel = selector.choose_task_with_orders(&engineer, &mut orders, &colony, &mut rng);
    results.push(TestResult {
        name: "orders_taken_first".into(),
        passed: sel.outcome == Outcome::Ordered
            && sel.handle.task == "MaintainBuilding"
            && !duplicate,
        detail: format!("{:?} {}", sel.outcome, sel.handle.description),
    });

    orders.add("Dance", false);
    let sel = selector.choose_task_with_orders(&engineer, &mut orders, &colony, &mut rng);
    results.push(TestResult {
        name: "orders_unknown_dropped".into(),
        passed: sel.outcome != Outcome::Ordered && orders.is_empty(),
        detail: format!("fell through to {} ({:?})", sel.handle.task, sel.outcome),
    });

    results
}

// ── 7. Scoring Properties ───────────────────────────────────────────────

const JOBS: [JobType; 8] = [
    JobType::Areologist,
    JobType::Botanist,
    JobType::Chef,
    JobType::Doctor,
    JobType::Engineer,
    JobType::Pilot,
    JobType::Physicist,
    JobType::Technician,
];

const LOCATIONS: [LocationCategory; 4] = [
    LocationCategory::Outside,
    LocationCategory::InSettlement,
    LocationCategory::InVehicle,
    LocationCategory::InGarage,
];

const HAZARDS: [RadiationHazard; 4] = [
    RadiationHazard::Clear,
    RadiationHazard::Mild,
    RadiationHazard::Moderate,
    RadiationHazard::Severe,
];

fn random_worker<R: Rng>(rng: &mut R, id: WorkerId, settlement: SettlementId) -> Worker {
    let location = LOCATIONS[rng.gen_range(0..LOCATIONS.len())];
    if rng.gen_bool(0.25) {
        let mut bot = Robot::new(id, &format!("Bot {id}"), settlement, RobotType::RepairBot);
        bot.battery = rng.gen_range(0.0..=1.0);
        bot.location = location;
        return bot.into();
    }
    let job = JOBS[rng.gen_range(0..JOBS.len())];
    let mut p = Person::new(id, &format!("Settler {id}"), settlement, job);
    let c = &mut p.condition;
    c.fatigue = rng.gen_range(0.0..1500.0);
    c.stress = rng.gen_range(0.0..100.0);
    c.hunger = rng.gen_range(0.0..1500.0);
    c.thirst = rng.gen_range(0.0..800.0);
    c.health = rng.gen_range(0.0..=1.0);
    c.radiation_sick = rng.gen_bool(0.1);
    p.location = location;
    p.building = Some(rng.gen_range(1..=8));
    p.eva_ready = rng.gen_bool(0.8);
    p.preferences.insert("Research".into(), rng.gen_range(-5..=5));
    p.into()
}

fn validate_score_properties(
    outpost: &Outpost,
    tuning: &Tuning,
    _verbose: bool,
) -> Vec<TestResult> {
    println!("--- Scoring Properties ---");
    let mut results = Vec::new();

    let registry = tasks::default_registry();
    let mut rng = StdRng::seed_from_u64(SEED);
    let samples = 300;
    let mut negative = Vec::new();
    let mut faults = 0;
    let mut scored = 0;

    for i in 0..samples {
        let hazard = HAZARDS[rng.gen_range(0..HAZARDS.len())];
        let colony = outpost
            .snapshot()
            .with_clock(MarsClock::new(outpost.sol, rng.gen_range(0.0..1000.0)))
            .with_radiation(outpost.settlement, hazard);
        let ctx = ScoringContext::new(&colony, tuning);
        let worker = random_worker(&mut rng, 1000 + i, outpost.settlement);

        for task in registry.all_tasks() {
            if let Some(st) = task.as_settlement() {
                for job in st.scan(worker.settlement(), &ctx) {
                    let m = st.worker_modifier(&job, &worker, &ctx);
                    scored += 1;
                    if job.base.score() < 0.0 || m.is_nan() || m < 0.0 {
                        negative.push(format!("{} {} ×{m}", job.label, job.base.score()));
                    }
                }
                continue;
            }
            match task.rate(&worker, &ctx) {
                Ok(offer) => {
                    scored += 1;
                    let score = offer.score();
                    if !score.is_finite() || score < 0.0 {
                        negative.push(format!("{} {score}", task.name()));
                    }
                }
                Err(_) => faults += 1,
            }
        }
    }

    results.push(TestResult {
        name: "scores_never_negative".into(),
        passed: negative.is_empty(),
        detail: if negative.is_empty() {
            format!("{scored} scores over {samples} random workers")
        } else {
            negative.join(", ")
        },
    });
    results.push(TestResult {
        name: "scores_no_faults_on_consistent_colony".into(),
        passed: faults == 0,
        detail: format!("{faults} scoring faults"),
    });

    // A failed hard gate zeroes the score however favorable the rest is.
    let colony = outpost.snapshot().with_clock(MarsClock::new(outpost.sol, 100.0));
    let ctx = ScoringContext::new(&colony, tuning);
    let mut engineer = Person::new(1, "Gate", outpost.settlement, JobType::Engineer);
    engineer.favorite = Some(FavoriteType::Tinkering);
    engineer.preferences.insert("MaintainBuilding".into(), 5);
    let maintain = registry.by_name("MaintainBuilding");
    let scores: Vec<f64> = [tuning.fitness.stress_max - 1.0, tuning.fitness.stress_max + 1.0]
        .into_iter()
        .map(|stress| {
            let mut p = engineer.clone();
            p.condition.stress = stress;
            maintain
                .as_ref()
                .ok()
                .and_then(|t| t.rate(&p.into(), &ctx).ok())
                .map_or(-1.0, |o| o.score())
        })
        .collect();
    results.push(TestResult {
        name: "scores_hard_gate_precedence".into(),
        passed: scores[0] > 0.0 && scores[1] == 0.0,
        detail: format!("stress below/above gate → {:.1} / {:.1}", scores[0], scores[1]),
    });

    results
}

// ── 8. Selection Edges ──────────────────────────────────────────────────

/// Scores well, then fails every time it is materialized.
struct Vanishing {
    descriptor: TaskDescriptor,
}

impl Vanishing {
    fn new() -> Self {
        Self {
            descriptor: TaskDescriptor::new("Vanishing", WorkerType::Both, TaskScope::AnyHour),
        }
    }
}

impl MetaTask for Vanishing {
    fn descriptor(&self) -> &TaskDescriptor {
        &self.descriptor
    }

    fn rate(&self, _worker: &Worker, ctx: &ScoringContext<'_>) -> Result<Offer, ScoringFault> {
        let rating = ScoreBuilder::new()
            .base("bait", ctx.tuning.score_cap, ctx.tuning.score_cap)
            .finish();
        Ok(Offer::new(rating))
    }

    fn create_task(
        &self,
        _worker: &Worker,
        _job: &ScoredJob,
        _ctx: &ScoringContext<'_>,
    ) -> Result<TaskHandle, TaskUnavailable> {
        Err(TaskUnavailable::new(self.name(), "taken by someone faster"))
    }
}

fn greenhouse_colony() -> ColonySnapshot {
    ColonySnapshot::new()
        .with_clock(MarsClock::new(10, 200.0))
        .with_building(BuildingInfo::new(1, 1, "Greenhouse", &[BuildingFunction::Farming], 1))
        .with_greenhouse(
            1,
            GreenhouseInfo {
                building: 1,
                crops: 12,
                crops_needing_tending: 3,
            },
        )
}

fn settler(id: WorkerId, job: JobType) -> Person {
    let mut p = Person::new(id, &format!("Settler {id}"), 1, job);
    p.condition.fatigue = 50.0;
    p.condition.stress = 10.0;
    p.condition.hunger = 100.0;
    p
}

fn validate_selection_edges(tuning: &Tuning, _verbose: bool) -> Vec<TestResult> {
    println!("--- Selection Edges ---");
    let mut results = Vec::new();
    let mut rng = StdRng::seed_from_u64(SEED);
    let mut selector = TaskSelector::new(tasks::default_registry(), tuning.clone());

    // Greenhouse: the only candidate, chosen every time.
    let colony = greenhouse_colony();
    let engineer: Worker = settler(1, JobType::Engineer).into();
    let cache = selector.rate_tasks(&engineer, &colony);
    let always = (0..50).all(|_| {
        selector.choose_task(&engineer, &colony, &mut rng).handle.task == "TendGreenhouse"
    });
    results.push(TestResult {
        name: "edge_single_candidate_always_chosen".into(),
        passed: cache.len() == 1 && (cache.total() - 30.0).abs() < 1e-9 && always,
        detail: format!("{} candidates, total {:.1}", cache.len(), cache.total()),
    });

    // Exhaustion: sleep is the only option.
    let quarters = greenhouse_colony().with_building(BuildingInfo::new(
        2,
        1,
        "Quarters",
        &[BuildingFunction::LivingAccommodation],
        4,
    ));
    let mut tired = settler(2, JobType::Engineer);
    tired.condition.fatigue = 1200.0;
    let tired: Worker = tired.into();
    let cache = selector.rate_tasks(&tired, &quarters);
    let names: Vec<_> = cache.jobs().iter().map(|j| j.name().to_string()).collect();
    results.push(TestResult {
        name: "edge_exhausted_only_sleeps".into(),
        passed: names == ["Sleep"],
        detail: format!("candidates {names:?}"),
    });

    // Resource veto: a taken greenhouse is gone for everybody.
    let taken = greenhouse_colony();
    let claimed = taken.claim(SlotKey::Workstation(1)).is_ok();
    let botanist: Worker = settler(3, JobType::Botanist).into();
    let vetoed = [&engineer, &botanist].into_iter().all(|w| {
        selector
            .rate_tasks(w, &taken)
            .jobs()
            .iter()
            .all(|j| j.name() != "TendGreenhouse")
    });
    results.push(TestResult {
        name: "edge_full_slot_vetoes".into(),
        passed: claimed && vetoed,
        detail: "workstation taken, greenhouse dropped for all workers".into(),
    });

    // Nothing to do anywhere: the fallback, never an error.
    let empty = ColonySnapshot::new().with_clock(MarsClock::new(1, 100.0));
    let sel = selector.choose_task(&engineer, &empty, &mut rng);
    results.push(TestResult {
        name: "edge_no_candidates_idles".into(),
        passed: sel.outcome == Outcome::Idle && sel.candidates == 0 && sel.handle.task == "Idle",
        detail: format!("{:?} → {}", sel.outcome, sel.handle.task),
    });

    // Materialization races: redraw from the rest, idle if nothing is left.
    let contested: Vec<Arc<dyn MetaTask>> =
        vec![Arc::new(Vanishing::new()), Arc::new(TendGreenhouse::new())];
    let racing = TaskRegistry::new(contested, Arc::new(Idle::new()));
    let mut race = TaskSelector::new(racing, tuning.clone());
    let sel = race.choose_task(&engineer, &colony, &mut rng);
    results.push(TestResult {
        name: "edge_race_redraws".into(),
        passed: sel.outcome == Outcome::Drawn && sel.handle.task == "TendGreenhouse",
        detail: format!("{} after {} redraws", sel.handle.task, sel.redraws),
    });

    let bait: Vec<Arc<dyn MetaTask>> = vec![Arc::new(Vanishing::new())];
    let lonely = TaskRegistry::new(bait, Arc::new(Idle::new()));
    let mut race = TaskSelector::new(lonely, tuning.clone());
    let sel = race.choose_task(&engineer, &colony, &mut rng);
    results.push(TestResult {
        name: "edge_race_exhausted_idles".into(),
        passed: sel.outcome == Outcome::Idle && sel.redraws == 1,
        detail: format!("{:?} after {} redraws", sel.outcome, sel.redraws),
    });

    results
}
