//! The `MetaTask` trait: one implementation per selectable activity.
//!
//! A meta task scores itself for a worker ([`MetaTask::rate`]) and, once
//! drawn, produces the concrete [`TaskHandle`] the worker's control loop
//! executes ([`MetaTask::create_task`]). Tasks whose targets are shared
//! settlement resources also implement
//! [`SettlementMetaTask`](crate::settlement::SettlementMetaTask) and expose
//! it through [`MetaTask::as_settlement`].

use serde::{Deserialize, Serialize};

use crate::cache::ScoredJob;
use crate::config::Tuning;
use crate::descriptor::TaskDescriptor;
use crate::duty::{MarsClock, TickStamp};
use crate::error::{ScoringFault, TaskUnavailable};
use crate::oracle::{BuildingId, ColonyOracle, MalfunctionId, StudyId, VehicleId};
use crate::rating::Rating;
use crate::settlement::SettlementMetaTask;
use crate::slot::SlotKey;
use crate::worker::{Worker, WorkerId};

/// What a scorer can see during one scheduling pass.
#[derive(Clone, Copy)]
pub struct ScoringContext<'a> {
    pub colony: &'a dyn ColonyOracle,
    pub tuning: &'a Tuning,
}

impl<'a> ScoringContext<'a> {
    pub fn new(colony: &'a dyn ColonyOracle, tuning: &'a Tuning) -> Self {
        Self { colony, tuning }
    }

    pub fn clock(&self) -> MarsClock {
        self.colony.clock()
    }

    pub fn has_room(&self, key: SlotKey) -> bool {
        self.colony.has_room(key)
    }
}

/// The physical thing a job is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobTarget {
    Building(BuildingId),
    Vehicle(VehicleId),
    Malfunction(MalfunctionId),
    Study(StudyId),
}

/// A scorer's answer for one worker.
#[derive(Debug, Clone, PartialEq)]
pub struct Offer {
    pub rating: Rating,
    pub target: Option<JobTarget>,
    /// Slot the task will claim when it starts.
    pub claim: Option<SlotKey>,
}

impl Offer {
    pub fn new(rating: Rating) -> Self {
        Self {
            rating,
            target: None,
            claim: None,
        }
    }

    pub fn zero(reason: &'static str) -> Self {
        Self::new(Rating::zero(reason))
    }

    pub fn with_target(mut self, target: JobTarget) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_claim(mut self, claim: SlotKey) -> Self {
        self.claim = Some(claim);
        self
    }

    pub fn score(&self) -> f64 {
        self.rating.score()
    }
}

/// A concrete task handed back to the worker's control loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskHandle {
    pub task: String,
    pub description: String,
    pub worker: WorkerId,
    pub target: Option<JobTarget>,
    pub claim: Option<SlotKey>,
    pub issued: TickStamp,
}

impl TaskHandle {
    /// Handle for a drawn job, issued at the current tick.
    pub fn for_job(worker: &Worker, job: &ScoredJob, clock: &MarsClock) -> Self {
        Self {
            task: job.name().to_string(),
            description: job.label.clone(),
            worker: worker.id(),
            target: job.target,
            claim: job.claim,
            issued: clock.stamp(),
        }
    }

    /// Bare handle for a named activity without a target.
    pub fn untargeted(task: &str, worker: &Worker, clock: &MarsClock) -> Self {
        Self {
            task: task.to_string(),
            description: task.to_string(),
            worker: worker.id(),
            target: None,
            claim: None,
            issued: clock.stamp(),
        }
    }
}

/// A selectable activity.
pub trait MetaTask: Send + Sync {
    fn descriptor(&self) -> &TaskDescriptor;

    fn name(&self) -> &str {
        self.descriptor().name()
    }

    /// Score this task for one worker. Settlement-scan tasks are rated per
    /// job instead and keep this default.
    fn rate(&self, _worker: &Worker, _ctx: &ScoringContext<'_>) -> Result<Offer, ScoringFault> {
        Ok(Offer::zero("rated per settlement job"))
    }

    fn as_settlement(&self) -> Option<&dyn SettlementMetaTask> {
        None
    }

    /// Materialize a drawn job. Fails if the slot the job needs was taken
    /// since scoring.
    fn create_task(
        &self,
        worker: &Worker,
        job: &ScoredJob,
        ctx: &ScoringContext<'_>,
    ) -> Result<TaskHandle, TaskUnavailable> {
        if let Some(key) = job.claim {
            if !ctx.has_room(key) {
                return Err(TaskUnavailable::new(self.name(), format!("{key:?} is taken")));
            }
        }
        Ok(TaskHandle::for_job(worker, job, &ctx.clock()))
    }
}
