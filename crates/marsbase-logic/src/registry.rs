//! The task catalog, partitioned by time scope.
//!
//! Pools are built on first use and cached. Any-hour tasks are referenced
//! (not copied) from both the work-hour and the non-work-hour pool, so one
//! lookup per scope gives the full candidate list. The fallback task is held
//! apart and never enters a pool.
//!
//! | Pool | Contents |
//! |------|----------|
//! | work-hour | `WorkHour` + `AnyHour` tasks |
//! | non-work-hour | `NonWorkHour` + `AnyHour` tasks |
//! | any-hour | `AnyHour` tasks only |

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock};

use log::{info, warn};

use crate::descriptor::TaskScope;
use crate::error::RegistryError;
use crate::meta::MetaTask;

#[derive(Default)]
struct Pools {
    all: Vec<Arc<dyn MetaTask>>,
    work: Vec<Arc<dyn MetaTask>>,
    non_work: Vec<Arc<dyn MetaTask>>,
    any: Vec<Arc<dyn MetaTask>>,
    by_name: HashMap<String, usize>,
}

/// Catalog of selectable tasks.
pub struct TaskRegistry {
    catalog: Vec<Arc<dyn MetaTask>>,
    fallback: Arc<dyn MetaTask>,
    pools: OnceLock<Pools>,
}

impl TaskRegistry {
    pub fn new(catalog: Vec<Arc<dyn MetaTask>>, fallback: Arc<dyn MetaTask>) -> Self {
        Self {
            catalog,
            fallback,
            pools: OnceLock::new(),
        }
    }

    fn pools(&self) -> &Pools {
        self.pools.get_or_init(|| self.partition())
    }

    fn partition(&self) -> Pools {
        let mut pools = Pools::default();
        let mut seen = HashSet::new();
        seen.insert(self.fallback.name().to_string());

        for task in &self.catalog {
            let name = task.name();
            if !seen.insert(name.to_string()) {
                warn!("duplicate task registration '{name}' dropped");
                continue;
            }
            pools.by_name.insert(name.to_string(), pools.all.len());
            pools.all.push(Arc::clone(task));
            match task.descriptor().scope() {
                TaskScope::WorkHour => pools.work.push(Arc::clone(task)),
                TaskScope::NonWorkHour => pools.non_work.push(Arc::clone(task)),
                TaskScope::AnyHour => {
                    pools.any.push(Arc::clone(task));
                    pools.work.push(Arc::clone(task));
                    pools.non_work.push(Arc::clone(task));
                }
            }
        }

        info!(
            "task registry built: {} tasks ({} work-hour, {} non-work-hour, {} any-hour)",
            pools.all.len(),
            pools.work.len(),
            pools.non_work.len(),
            pools.any.len()
        );
        pools
    }

    /// Build the pools now instead of on first query.
    pub fn build(&self) {
        self.pools();
    }

    pub fn is_built(&self) -> bool {
        self.pools.get().is_some()
    }

    /// Clear the pools; the next query rebuilds them from the catalog.
    pub fn reset(&mut self) {
        self.pools = OnceLock::new();
    }

    /// Add a task to the catalog. Takes effect on the next build.
    pub fn register(&mut self, task: Arc<dyn MetaTask>) {
        self.catalog.push(task);
        self.reset();
    }

    /// Every task once, in registration order.
    pub fn all_tasks(&self) -> &[Arc<dyn MetaTask>] {
        &self.pools().all
    }

    /// The pool for a scope. Work and non-work pools include any-hour tasks.
    pub fn tasks_for(&self, scope: TaskScope) -> &[Arc<dyn MetaTask>] {
        let pools = self.pools();
        match scope {
            TaskScope::WorkHour => &pools.work,
            TaskScope::NonWorkHour => &pools.non_work,
            TaskScope::AnyHour => &pools.any,
        }
    }

    pub fn by_name(&self, name: &str) -> Result<Arc<dyn MetaTask>, RegistryError> {
        let pools = self.pools();
        pools
            .by_name
            .get(name)
            .map(|&i| Arc::clone(&pools.all[i]))
            .ok_or_else(|| RegistryError::TaskNotFound(name.to_string()))
    }

    /// The always-available activity used when nothing else scores.
    pub fn fallback(&self) -> &Arc<dyn MetaTask> {
        &self.fallback
    }
}
