//! Settlement-scan tasks and the per-tick scan cache.
//!
//! Tasks like loading a vehicle or tending an algae pond are about a shared
//! target, not about the worker. They [`scan`](SettlementMetaTask::scan) the
//! settlement once per tick to list every eligible (target, base score) job,
//! and the selector then applies a per-worker modifier to each job. The scan
//! result is shared by every worker scheduled in that tick through
//! [`ScanCache`].

use std::collections::HashMap;
use std::sync::Arc;

use crate::duty::TickStamp;
use crate::meta::{JobTarget, MetaTask, ScoringContext};
use crate::modifiers::{
    affinity_modifier, performance_modifier, preference_modifier, radiation_modifier,
};
use crate::oracle::SettlementId;
use crate::rating::Rating;
use crate::slot::SlotKey;
use crate::worker::{Person, Robot, Worker};

/// One target found by a settlement scan.
#[derive(Debug, Clone, PartialEq)]
pub struct SettlementJob {
    pub target: JobTarget,
    /// Slot claimed when the job starts; re-checked per worker.
    pub claim: Option<SlotKey>,
    /// Score from the target's state alone.
    pub base: Rating,
    pub label: String,
    /// Done outside, in a suit.
    pub outdoor: bool,
}

/// A task whose jobs come from a settlement-wide scan.
pub trait SettlementMetaTask: MetaTask {
    /// Every eligible job in the settlement. Reads state only: two calls in
    /// the same tick with no claim in between return the same jobs.
    fn scan(&self, settlement: SettlementId, ctx: &ScoringContext<'_>) -> Vec<SettlementJob>;

    fn person_modifier(
        &self,
        job: &SettlementJob,
        worker: &Worker,
        person: &Person,
        ctx: &ScoringContext<'_>,
    ) -> f64 {
        person_modifier(self.name(), job, worker, person, ctx)
            * affinity_modifier(self.descriptor(), worker, ctx.tuning)
    }

    fn robot_modifier(
        &self,
        job: &SettlementJob,
        worker: &Worker,
        robot: &Robot,
        ctx: &ScoringContext<'_>,
    ) -> f64 {
        robot_modifier(job, worker, robot)
            * affinity_modifier(self.descriptor(), worker, ctx.tuning)
    }

    /// Multiplier for one worker taking one job; 0 removes the pairing for
    /// this worker only.
    fn worker_modifier(
        &self,
        job: &SettlementJob,
        worker: &Worker,
        ctx: &ScoringContext<'_>,
    ) -> f64 {
        match worker {
            Worker::Person(p) => self.person_modifier(job, worker, p, ctx),
            Worker::Robot(r) => self.robot_modifier(job, worker, r, ctx),
        }
    }
}

/// Fitness, EVA suitability, radiation, performance and preference.
pub fn person_modifier(
    task: &str,
    job: &SettlementJob,
    worker: &Worker,
    person: &Person,
    ctx: &ScoringContext<'_>,
) -> f64 {
    if !worker.location().is_in_settlement() {
        return 0.0;
    }
    if !person.condition.passes(&ctx.tuning.fitness) {
        return 0.0;
    }
    let mut m = 1.0;
    if job.outdoor {
        if !person.eva_ready {
            return 0.0;
        }
        m *= radiation_modifier(ctx.colony.radiation(person.settlement), true, ctx.tuning);
    }
    m * performance_modifier(worker) * preference_modifier(person.preference(task), ctx.tuning)
}

/// Robots stay indoors and need charge.
pub fn robot_modifier(job: &SettlementJob, worker: &Worker, robot: &Robot) -> f64 {
    if !worker.location().is_in_settlement() || job.outdoor || robot.is_low_battery() {
        return 0.0;
    }
    performance_modifier(worker)
}

/// Scan results for the current tick, keyed by settlement and task name.
#[derive(Debug, Default)]
pub struct ScanCache {
    stamp: Option<TickStamp>,
    entries: HashMap<(SettlementId, String), Arc<Vec<SettlementJob>>>,
    scans: u64,
    hits: u64,
}

impl ScanCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a tick. Entries from an earlier tick are dropped. Returns true
    /// if the cache was invalidated.
    pub fn begin_tick(&mut self, stamp: TickStamp) -> bool {
        if self.stamp == Some(stamp) {
            return false;
        }
        self.stamp = Some(stamp);
        self.entries.clear();
        true
    }

    /// Jobs for a task in a settlement, scanning only on the first request
    /// this tick.
    pub fn jobs(
        &mut self,
        task: &dyn SettlementMetaTask,
        settlement: SettlementId,
        ctx: &ScoringContext<'_>,
    ) -> Arc<Vec<SettlementJob>> {
        let key = (settlement, task.name().to_string());
        if let Some(jobs) = self.entries.get(&key) {
            self.hits += 1;
            return Arc::clone(jobs);
        }
        self.scans += 1;
        let jobs = Arc::new(task.scan(settlement, ctx));
        self.entries.insert(key, Arc::clone(&jobs));
        jobs
    }

    /// Drop every cached scan, e.g. after a claim that changes targets.
    pub fn invalidate(&mut self) {
        self.entries.clear();
    }

    pub fn stamp(&self) -> Option<TickStamp> {
        self.stamp
    }

    /// (scans run, cache hits) since creation.
    pub fn stats(&self) -> (u64, u64) {
        (self.scans, self.hits)
    }
}
