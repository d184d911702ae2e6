//! Task descriptors: the registration unit of the catalog.
//!
//! A descriptor names a task, says who may do it and when, and carries the
//! static affinity tags that [`crate::modifiers::affinity_modifier`] turns
//! into score multipliers. The descriptor never interprets its own tags.

use serde::{Deserialize, Serialize};

use crate::constants::{FavoriteType, JobType, RobotType, RoleType, TaskTrait};
use crate::worker::WorkerType;

/// When during a worker's day a task may be considered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskScope {
    WorkHour,
    NonWorkHour,
    /// Folded into both the work-hour and non-work-hour pools.
    AnyHour,
}

impl TaskScope {
    /// Whether a task declared for `self` is eligible at `current`.
    pub fn accepts(self, current: TaskScope) -> bool {
        self == TaskScope::AnyHour || self == current
    }
}

/// Eligibility envelope and static affinities of one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDescriptor {
    name: String,
    worker_type: WorkerType,
    scope: TaskScope,
    favorites: Vec<FavoriteType>,
    traits: Vec<TaskTrait>,
    jobs: Vec<JobType>,
    roles: Vec<RoleType>,
    robots: Vec<RobotType>,
}

fn push_unique<T: PartialEq + Copy>(list: &mut Vec<T>, items: &[T]) {
    for item in items {
        if !list.contains(item) {
            list.push(*item);
        }
    }
}

impl TaskDescriptor {
    pub fn new(name: &str, worker_type: WorkerType, scope: TaskScope) -> Self {
        Self {
            name: name.to_string(),
            worker_type,
            scope,
            favorites: Vec::new(),
            traits: Vec::new(),
            jobs: Vec::new(),
            roles: Vec::new(),
            robots: Vec::new(),
        }
    }

    pub fn with_favorites(mut self, favorites: &[FavoriteType]) -> Self {
        push_unique(&mut self.favorites, favorites);
        self
    }

    pub fn with_traits(mut self, traits: &[TaskTrait]) -> Self {
        push_unique(&mut self.traits, traits);
        self
    }

    pub fn with_jobs(mut self, jobs: &[JobType]) -> Self {
        push_unique(&mut self.jobs, jobs);
        self
    }

    pub fn with_roles(mut self, roles: &[RoleType]) -> Self {
        push_unique(&mut self.roles, roles);
        self
    }

    pub fn with_robots(mut self, robots: &[RobotType]) -> Self {
        push_unique(&mut self.robots, robots);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn worker_type(&self) -> WorkerType {
        self.worker_type
    }

    pub fn scope(&self) -> TaskScope {
        self.scope
    }

    pub fn favorites(&self) -> &[FavoriteType] {
        &self.favorites
    }

    pub fn traits(&self) -> &[TaskTrait] {
        &self.traits
    }

    pub fn jobs(&self) -> &[JobType] {
        &self.jobs
    }

    pub fn roles(&self) -> &[RoleType] {
        &self.roles
    }

    pub fn robots(&self) -> &[RobotType] {
        &self.robots
    }

    /// Eligible for a worker of `worker_type` during `scope`.
    pub fn matches_scope(&self, worker_type: WorkerType, scope: TaskScope) -> bool {
        self.worker_type.accepts(worker_type) && self.scope.accepts(scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_scope() {
        let cook = TaskDescriptor::new("Cook", WorkerType::Both, TaskScope::WorkHour);
        assert!(cook.matches_scope(WorkerType::Person, TaskScope::WorkHour));
        assert!(cook.matches_scope(WorkerType::Robot, TaskScope::WorkHour));
        assert!(!cook.matches_scope(WorkerType::Person, TaskScope::NonWorkHour));

        let sleep = TaskDescriptor::new("Sleep", WorkerType::Person, TaskScope::AnyHour);
        assert!(sleep.matches_scope(WorkerType::Person, TaskScope::WorkHour));
        assert!(sleep.matches_scope(WorkerType::Person, TaskScope::NonWorkHour));
        assert!(!sleep.matches_scope(WorkerType::Robot, TaskScope::NonWorkHour));
    }

    #[test]
    fn test_affinities_deduplicated() {
        let d = TaskDescriptor::new("Research", WorkerType::Person, TaskScope::WorkHour)
            .with_traits(&[TaskTrait::Academic, TaskTrait::Academic])
            .with_jobs(&[JobType::Chemist])
            .with_jobs(&[JobType::Chemist, JobType::Physicist]);
        assert_eq!(d.traits(), &[TaskTrait::Academic]);
        assert_eq!(d.jobs(), &[JobType::Chemist, JobType::Physicist]);
    }
}
