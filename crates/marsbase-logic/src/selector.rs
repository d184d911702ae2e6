//! Per-worker task choice.
//!
//! One call to [`TaskSelector::choose_task`] picks exactly one task for one
//! worker:
//!
//! 1. Pick the pool from the worker's duty state.
//! 2. Rate every eligible task. Settlement-scan tasks come from the per-tick
//!    [`ScanCache`] and get the per-worker modifier. Jobs whose slot is full
//!    are dropped here, so a full resource never reaches the draw.
//! 3. Weighted draw over positive scores.
//! 4. Materialize. A [`TaskUnavailable`](crate::error::TaskUnavailable)
//!    removes the candidate and the draw is repeated over the rest.
//! 5. Nothing left: the registry's fallback (idle).
//!
//! The selector performs no locking. Callers interleave scheduling with task
//! execution (schedule one worker, let its task claim, schedule the next) so
//! every pass sees the claims made before it.

use std::collections::VecDeque;
use std::sync::Arc;

use log::{debug, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::cache::{ScoredJob, TaskCache};
use crate::config::Tuning;
use crate::descriptor::TaskScope;
use crate::duty::MarsClock;
use crate::error::SelectError;
use crate::meta::{MetaTask, Offer, ScoringContext, TaskHandle};
use crate::oracle::ColonyOracle;
use crate::registry::TaskRegistry;
use crate::settlement::{ScanCache, SettlementJob, SettlementMetaTask};
use crate::worker::Worker;

/// How the returned task was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Won the weighted draw.
    Drawn,
    /// Taken from the worker's pending orders.
    Ordered,
    /// Nothing could be done; the fallback activity.
    Idle,
}

/// Result of one scheduling pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub handle: TaskHandle,
    pub outcome: Outcome,
    /// Positive-weight candidates before any redraw.
    pub candidates: usize,
    /// Candidates that failed to materialize.
    pub redraws: u32,
}

/// Task names queued for a worker by an outside authority.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTasks {
    queue: VecDeque<String>,
}

impl PendingTasks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an order. Returns false if it was already queued and duplicates
    /// are not allowed.
    pub fn add(&mut self, task: &str, allow_duplicate: bool) -> bool {
        if !allow_duplicate && self.queue.iter().any(|t| t == task) {
            return false;
        }
        self.queue.push_back(task.to_string());
        true
    }

    pub fn pop(&mut self) -> Option<String> {
        self.queue.pop_front()
    }

    /// Drop every queued order for a task. Returns how many were dropped.
    pub fn remove(&mut self, task: &str) -> usize {
        let before = self.queue.len();
        self.queue.retain(|t| t != task);
        before - self.queue.len()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.queue.iter().map(String::as_str)
    }
}

/// The pool a worker draws from right now.
pub fn time_scope_for(worker: &Worker, clock: &MarsClock) -> TaskScope {
    if worker.is_on_duty(clock) {
        TaskScope::WorkHour
    } else {
        TaskScope::NonWorkHour
    }
}

/// Weighted-random task chooser.
pub struct TaskSelector {
    registry: TaskRegistry,
    tuning: Tuning,
    scans: ScanCache,
}

impl TaskSelector {
    pub fn new(registry: TaskRegistry, tuning: Tuning) -> Self {
        Self {
            registry,
            tuning,
            scans: ScanCache::new(),
        }
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut TaskRegistry {
        &mut self.registry
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn scan_cache(&self) -> &ScanCache {
        &self.scans
    }

    /// Drop cached scans mid-tick, after an action that changes scan targets.
    pub fn invalidate_scans(&mut self) {
        self.scans.invalidate();
    }

    /// Score every eligible task for a worker.
    pub fn rate_tasks(&mut self, worker: &Worker, colony: &dyn ColonyOracle) -> TaskCache {
        let clock = colony.clock();
        self.scans.begin_tick(clock.stamp());
        let ctx = ScoringContext::new(colony, &self.tuning);
        let scope = time_scope_for(worker, &clock);
        let mut cache = TaskCache::new(format!("{} @ {:?}", worker.name(), scope));

        for task in self.registry.tasks_for(scope) {
            if !task.descriptor().matches_scope(worker.kind(), scope) {
                continue;
            }
            if let Some(st) = task.as_settlement() {
                let jobs = self.scans.jobs(st, worker.settlement(), &ctx);
                add_settlement_jobs(&mut cache, task, st, &jobs, worker, &ctx);
                continue;
            }
            match task.rate(worker, &ctx) {
                Ok(offer) => {
                    if offer.claim.is_some_and(|key| !ctx.has_room(key)) {
                        continue;
                    }
                    cache.add(ScoredJob::from_offer(Arc::clone(task), offer));
                }
                Err(fault) => warn!("{fault}; skipped for {}", worker.name()),
            }
        }
        cache
    }

    /// Pick one task for a worker. Always returns a handle.
    pub fn choose_task<R: Rng + ?Sized>(
        &mut self,
        worker: &Worker,
        colony: &dyn ColonyOracle,
        rng: &mut R,
    ) -> Selection {
        let mut cache = self.rate_tasks(worker, colony);
        if self.tuning.diagnostics {
            debug!("{cache}");
        }
        let candidates = cache.len();
        let ctx = ScoringContext::new(colony, &self.tuning);
        let mut redraws = 0;

        loop {
            let index = match draw(&cache, rng) {
                Ok(index) => index,
                Err(SelectError::NoCandidates) => break,
            };
            let Some(job) = cache.remove(index) else {
                break;
            };
            match job.task.create_task(worker, &job, &ctx) {
                Ok(handle) => {
                    return Selection {
                        handle,
                        outcome: Outcome::Drawn,
                        candidates,
                        redraws,
                    };
                }
                Err(e) => {
                    debug!("{}: {e}, redrawing from {} left", worker.name(), cache.len());
                    redraws += 1;
                }
            }
        }

        debug!("{} has nothing to do, idling", worker.name());
        Selection {
            handle: self.idle(worker, &ctx),
            outcome: Outcome::Idle,
            candidates,
            redraws,
        }
    }

    /// Like [`choose_task`](Self::choose_task), but the first pending order
    /// is tried before the draw.
    pub fn choose_task_with_orders<R: Rng + ?Sized>(
        &mut self,
        worker: &Worker,
        orders: &mut PendingTasks,
        colony: &dyn ColonyOracle,
        rng: &mut R,
    ) -> Selection {
        if let Some(name) = orders.pop() {
            match self.fulfil_order(&name, worker, colony) {
                Ok(handle) => {
                    return Selection {
                        handle,
                        outcome: Outcome::Ordered,
                        candidates: 0,
                        redraws: 0,
                    };
                }
                Err(reason) => warn!("order '{name}' for {} dropped: {reason}", worker.name()),
            }
        }
        self.choose_task(worker, colony, rng)
    }

    fn fulfil_order(
        &mut self,
        name: &str,
        worker: &Worker,
        colony: &dyn ColonyOracle,
    ) -> Result<TaskHandle, String> {
        let task = self.registry.by_name(name).map_err(|e| e.to_string())?;
        let clock = colony.clock();
        let scope = time_scope_for(worker, &clock);
        if !task.descriptor().matches_scope(worker.kind(), scope) {
            return Err(format!("not applicable at {scope:?}"));
        }
        self.scans.begin_tick(clock.stamp());
        let ctx = ScoringContext::new(colony, &self.tuning);

        let job = if let Some(st) = task.as_settlement() {
            // Best job this worker can take.
            let jobs = self.scans.jobs(st, worker.settlement(), &ctx);
            let mut cache = TaskCache::new(name);
            add_settlement_jobs(&mut cache, &task, st, &jobs, worker, &ctx);
            cache.best().cloned().ok_or("no target available")?
        } else {
            let offer = task.rate(worker, &ctx).map_err(|e| e.to_string())?;
            if let Some(stage) = offer.rating.rejected_by() {
                return Err(format!("rejected by '{stage}'"));
            }
            ScoredJob::from_offer(Arc::clone(&task), offer)
        };
        task.create_task(worker, &job, &ctx).map_err(|e| e.to_string())
    }

    fn idle(&self, worker: &Worker, ctx: &ScoringContext<'_>) -> TaskHandle {
        let fallback = self.registry.fallback();
        let offer = match fallback.rate(worker, ctx) {
            Ok(offer) => offer,
            Err(fault) => {
                warn!("{fault}");
                Offer::zero("fallback fault")
            }
        };
        let job = ScoredJob::from_offer(Arc::clone(fallback), offer);
        match fallback.create_task(worker, &job, ctx) {
            Ok(handle) => handle,
            Err(e) => {
                warn!("{e}; issuing a bare {} handle", fallback.name());
                TaskHandle::untargeted(fallback.name(), worker, &ctx.clock())
            }
        }
    }
}

fn draw<R: Rng + ?Sized>(cache: &TaskCache, rng: &mut R) -> Result<usize, SelectError> {
    cache.random_selection(rng).ok_or(SelectError::NoCandidates)
}

/// Apply the per-worker modifier to scanned jobs and admit those with a
/// free slot.
fn add_settlement_jobs(
    cache: &mut TaskCache,
    task: &Arc<dyn MetaTask>,
    st: &dyn SettlementMetaTask,
    jobs: &[SettlementJob],
    worker: &Worker,
    ctx: &ScoringContext<'_>,
) {
    for job in jobs {
        let m = st.worker_modifier(job, worker, ctx);
        if m.is_nan() || m <= 0.0 {
            continue;
        }
        if job.claim.is_some_and(|key| !ctx.has_room(key)) {
            continue;
        }
        let rating = job.base.clone().scaled("worker", m);
        cache.add(ScoredJob {
            task: Arc::clone(task),
            score: rating.score(),
            target: Some(job.target),
            claim: job.claim,
            label: job.label.clone(),
            rating,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{JobType, RobotType};
    use crate::descriptor::TaskDescriptor;
    use crate::duty::ShiftType;
    use crate::error::{ScoringFault, TaskUnavailable};
    use crate::rating::ScoreBuilder;
    use crate::snapshot::ColonySnapshot;
    use crate::worker::{Person, Robot, WorkerType};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct Fixed {
        descriptor: TaskDescriptor,
        score: f64,
    }

    impl MetaTask for Fixed {
        fn descriptor(&self) -> &TaskDescriptor {
            &self.descriptor
        }

        fn rate(&self, _worker: &Worker, _ctx: &ScoringContext<'_>) -> Result<Offer, ScoringFault> {
            Ok(Offer::new(ScoreBuilder::new().base("fixed", self.score, 3000.0).finish()))
        }
    }

    struct Vetoed(TaskDescriptor);

    impl MetaTask for Vetoed {
        fn descriptor(&self) -> &TaskDescriptor {
            &self.0
        }

        fn rate(&self, _worker: &Worker, _ctx: &ScoringContext<'_>) -> Result<Offer, ScoringFault> {
            let rating = ScoreBuilder::new()
                .base("need", 500.0, 3000.0)
                .require("bed", false)
                .finish();
            Ok(Offer::new(rating))
        }
    }

    struct Faulty(TaskDescriptor);

    impl MetaTask for Faulty {
        fn descriptor(&self) -> &TaskDescriptor {
            &self.0
        }

        fn rate(&self, _worker: &Worker, _ctx: &ScoringContext<'_>) -> Result<Offer, ScoringFault> {
            Err(ScoringFault::new(self.name(), "building vanished"))
        }
    }

    struct Vanishing(TaskDescriptor);

    impl MetaTask for Vanishing {
        fn descriptor(&self) -> &TaskDescriptor {
            &self.0
        }

        fn rate(&self, _worker: &Worker, _ctx: &ScoringContext<'_>) -> Result<Offer, ScoringFault> {
            Ok(Offer::new(ScoreBuilder::new().base("fixed", 1000.0, 3000.0).finish()))
        }

        fn create_task(
            &self,
            _worker: &Worker,
            _job: &ScoredJob,
            _ctx: &ScoringContext<'_>,
        ) -> Result<TaskHandle, TaskUnavailable> {
            Err(TaskUnavailable::new(self.name(), "gone"))
        }
    }

    fn fixed(name: &str, scope: TaskScope, score: f64) -> Arc<dyn MetaTask> {
        Arc::new(Fixed {
            descriptor: TaskDescriptor::new(name, WorkerType::Both, scope),
            score,
        })
    }

    fn selector(catalog: Vec<Arc<dyn MetaTask>>) -> TaskSelector {
        let registry = TaskRegistry::new(catalog, fixed("Idle", TaskScope::AnyHour, 1.0));
        TaskSelector::new(registry, Tuning::default())
    }

    fn on_shift_person() -> Worker {
        let mut p = Person::new(1, "Ana", 1, JobType::Engineer);
        p.shift = ShiftType::On;
        p.into()
    }

    #[test]
    fn test_time_scope() {
        let clock = MarsClock::new(1, 600.0);
        let mut p = Person::new(1, "Ana", 1, JobType::Engineer);
        p.shift = ShiftType::A;
        assert_eq!(time_scope_for(&p.clone().into(), &clock), TaskScope::NonWorkHour);
        p.shift = ShiftType::B;
        assert_eq!(time_scope_for(&p.into(), &clock), TaskScope::WorkHour);
        let r: Worker = Robot::new(2, "R", 1, RobotType::RepairBot).into();
        assert_eq!(time_scope_for(&r, &clock), TaskScope::WorkHour);
    }

    #[test]
    fn test_single_candidate_chosen() {
        let mut s = selector(vec![
            fixed("Cook", TaskScope::WorkHour, 50.0),
            fixed("Relax", TaskScope::NonWorkHour, 50.0),
            fixed("Zero", TaskScope::WorkHour, 0.0),
        ]);
        let colony = ColonySnapshot::new();
        let mut rng = StdRng::seed_from_u64(1);
        let sel = s.choose_task(&on_shift_person(), &colony, &mut rng);
        assert_eq!(sel.handle.task, "Cook");
        assert_eq!(sel.outcome, Outcome::Drawn);
        assert_eq!(sel.candidates, 1);
    }

    #[test]
    fn test_empty_falls_back_to_idle() {
        let mut s = selector(vec![fixed("Zero", TaskScope::AnyHour, 0.0)]);
        let colony = ColonySnapshot::new();
        let mut rng = StdRng::seed_from_u64(1);
        let sel = s.choose_task(&on_shift_person(), &colony, &mut rng);
        assert_eq!(sel.handle.task, "Idle");
        assert_eq!(sel.outcome, Outcome::Idle);
        assert_eq!(sel.candidates, 0);
    }

    #[test]
    fn test_fault_skips_only_that_task() {
        let mut s = selector(vec![
            Arc::new(Faulty(TaskDescriptor::new("Broken", WorkerType::Both, TaskScope::AnyHour))),
            fixed("Cook", TaskScope::WorkHour, 10.0),
        ]);
        let colony = ColonySnapshot::new();
        let cache = s.rate_tasks(&on_shift_person(), &colony);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.jobs()[0].name(), "Cook");
    }

    #[test]
    fn test_unavailable_redraws() {
        let mut s = selector(vec![
            Arc::new(Vanishing(TaskDescriptor::new("Gone", WorkerType::Both, TaskScope::WorkHour))),
            fixed("Cook", TaskScope::WorkHour, 1.0),
        ]);
        let colony = ColonySnapshot::new();
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let sel = s.choose_task(&on_shift_person(), &colony, &mut rng);
            assert_eq!(sel.handle.task, "Cook");
            assert_eq!(sel.candidates, 2);
        }
    }

    #[test]
    fn test_all_unavailable_idles() {
        let mut s = selector(vec![Arc::new(Vanishing(TaskDescriptor::new(
            "Gone",
            WorkerType::Both,
            TaskScope::AnyHour,
        )))]);
        let colony = ColonySnapshot::new();
        let mut rng = StdRng::seed_from_u64(9);
        let sel = s.choose_task(&on_shift_person(), &colony, &mut rng);
        assert_eq!(sel.outcome, Outcome::Idle);
        assert_eq!(sel.redraws, 1);
    }

    #[test]
    fn test_pending_orders_queue() {
        let mut orders = PendingTasks::new();
        assert!(orders.add("Cook", false));
        assert!(!orders.add("Cook", false));
        assert!(orders.add("Cook", true));
        assert!(orders.add("Relax", false));
        assert_eq!(orders.remove("Cook"), 2);
        assert_eq!(orders.iter().collect::<Vec<_>>(), vec!["Relax"]);
        assert_eq!(orders.pop().as_deref(), Some("Relax"));
        assert!(orders.is_empty());
    }

    #[test]
    fn test_order_taken_before_draw() {
        let mut s = selector(vec![
            fixed("Cook", TaskScope::WorkHour, 3000.0),
            fixed("Sweep", TaskScope::WorkHour, 1.0),
        ]);
        let colony = ColonySnapshot::new();
        let mut rng = StdRng::seed_from_u64(4);
        let mut orders = PendingTasks::new();
        orders.add("Sweep", false);
        let sel = s.choose_task_with_orders(&on_shift_person(), &mut orders, &colony, &mut rng);
        assert_eq!(sel.outcome, Outcome::Ordered);
        assert_eq!(sel.handle.task, "Sweep");
        assert!(orders.is_empty());
    }

    #[test]
    fn test_bad_order_dropped() {
        let mut s = selector(vec![
            fixed("Cook", TaskScope::WorkHour, 10.0),
            fixed("Relax", TaskScope::NonWorkHour, 10.0),
        ]);
        let colony = ColonySnapshot::new();
        let mut rng = StdRng::seed_from_u64(4);
        let mut orders = PendingTasks::new();
        orders.add("Relax", false);
        orders.add("Nope", false);
        let worker = on_shift_person();

        let sel = s.choose_task_with_orders(&worker, &mut orders, &colony, &mut rng);
        assert_eq!(sel.outcome, Outcome::Drawn);
        assert_eq!(sel.handle.task, "Cook");

        let sel = s.choose_task_with_orders(&worker, &mut orders, &colony, &mut rng);
        assert_eq!(sel.outcome, Outcome::Drawn);
        assert!(orders.is_empty());
    }

    #[test]
    fn test_vetoed_order_dropped() {
        let mut s = selector(vec![
            Arc::new(Vetoed(TaskDescriptor::new("Treat", WorkerType::Both, TaskScope::AnyHour))),
            fixed("Cook", TaskScope::WorkHour, 10.0),
        ]);
        let colony = ColonySnapshot::new();
        let mut rng = StdRng::seed_from_u64(4);
        let mut orders = PendingTasks::new();
        orders.add("Treat", false);

        let sel = s.choose_task_with_orders(&on_shift_person(), &mut orders, &colony, &mut rng);
        assert_eq!(sel.outcome, Outcome::Drawn);
        assert_eq!(sel.handle.task, "Cook");
        assert!(orders.is_empty());
    }
}
