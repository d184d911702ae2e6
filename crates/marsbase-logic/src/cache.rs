//! Per-worker candidate set and the weighted draw.
//!
//! A [`TaskCache`] is rebuilt on every scheduling pass and dropped right
//! after the draw. Only strictly positive, finite weights are admitted, so
//! the draw never divides by zero and zero-weight entries never take up room.

use std::fmt;
use std::sync::Arc;

use rand::Rng;

use crate::meta::{JobTarget, MetaTask, Offer};
use crate::rating::Rating;
use crate::slot::SlotKey;

/// One scored candidate for this tick.
#[derive(Clone)]
pub struct ScoredJob {
    pub task: Arc<dyn MetaTask>,
    pub score: f64,
    pub target: Option<JobTarget>,
    pub claim: Option<SlotKey>,
    pub label: String,
    pub rating: Rating,
}

impl ScoredJob {
    /// Candidate for a plain per-worker task, labelled with the task name.
    pub fn from_offer(task: Arc<dyn MetaTask>, offer: Offer) -> Self {
        let label = task.name().to_string();
        Self {
            score: offer.rating.score(),
            target: offer.target,
            claim: offer.claim,
            label,
            rating: offer.rating,
            task,
        }
    }

    pub fn name(&self) -> &str {
        self.task.name()
    }
}

impl fmt::Debug for ScoredJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScoredJob")
            .field("task", &self.name())
            .field("score", &self.score)
            .field("target", &self.target)
            .field("claim", &self.claim)
            .field("label", &self.label)
            .finish()
    }
}

/// Candidates for one worker.
#[derive(Debug, Default)]
pub struct TaskCache {
    context: String,
    jobs: Vec<ScoredJob>,
    total: f64,
}

fn sum(jobs: &[ScoredJob]) -> f64 {
    jobs.iter().fold(0.0, |acc, j| acc + j.score)
}

impl TaskCache {
    pub fn new(context: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            jobs: Vec::new(),
            total: 0.0,
        }
    }

    /// Admit a candidate. Returns false if its weight is not positive.
    pub fn add(&mut self, job: ScoredJob) -> bool {
        if !(job.score.is_finite() && job.score > 0.0) {
            return false;
        }
        self.total += job.score;
        self.jobs.push(job);
        true
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn jobs(&self) -> &[ScoredJob] {
        &self.jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    /// Highest-weight candidate.
    pub fn best(&self) -> Option<&ScoredJob> {
        self.jobs.iter().max_by(|a, b| a.score.total_cmp(&b.score))
    }

    /// Single-pass weighted draw. Returns the index of the winner.
    ///
    /// The running sum is accumulated in insertion order, the same order the
    /// total was built in, and the last candidate catches any draw that lands
    /// on the total through rounding.
    pub fn random_selection<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        match self.jobs.len() {
            0 => None,
            1 => Some(0),
            n => {
                let r = rng.gen::<f64>() * self.total;
                let mut acc = 0.0;
                for (i, job) in self.jobs.iter().enumerate() {
                    acc += job.score;
                    if r < acc {
                        return Some(i);
                    }
                }
                Some(n - 1)
            }
        }
    }

    /// Take a candidate out and renormalize.
    pub fn remove(&mut self, index: usize) -> Option<ScoredJob> {
        if index >= self.jobs.len() {
            return None;
        }
        let job = self.jobs.remove(index);
        self.total = sum(&self.jobs);
        Some(job)
    }
}

impl fmt::Display for TaskCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: {} candidates, total {:.1}",
            self.context,
            self.jobs.len(),
            self.total
        )?;
        for job in &self.jobs {
            let share = if self.total > 0.0 {
                100.0 * job.score / self.total
            } else {
                0.0
            };
            writeln!(f, "  {:<36} {:>9.1} {:>5.1}%  {}", job.label, job.score, share, job.rating)?;
        }
        Ok(())
    }
}
