//! Per-sol log of what each worker chose to do.
//!
//! Consecutive repeats are collapsed, the activity running at the end of a
//! sol is carried over to millisol 0 of the next one, and only the most
//! recent sols are kept.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::duty::MarsClock;
use crate::meta::TaskHandle;

/// Sols of history kept by default.
pub const DEFAULT_MAX_SOLS: usize = 7;

/// One entry in the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneActivity {
    /// Whole millisol the activity started at.
    pub millisol: u32,
    pub task: String,
    pub description: String,
    /// Still running from the previous sol.
    #[serde(default)]
    pub carried: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityLog {
    sols: BTreeMap<u32, Vec<OneActivity>>,
    max_sols: usize,
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SOLS)
    }
}

impl ActivityLog {
    pub fn new(max_sols: usize) -> Self {
        Self {
            sols: BTreeMap::new(),
            max_sols: max_sols.max(1),
        }
    }

    /// Record the start of a task. Returns false if it repeats the last entry.
    pub fn record(&mut self, clock: &MarsClock, handle: &TaskHandle) -> bool {
        self.record_activity(clock, &handle.task, &handle.description)
    }

    pub fn record_activity(&mut self, clock: &MarsClock, task: &str, description: &str) -> bool {
        let sol = clock.sol;
        if !self.sols.contains_key(&sol) {
            let carried = self.last().cloned();
            let today = self.sols.entry(sol).or_default();
            if let Some(prev) = carried {
                today.push(OneActivity {
                    millisol: 0,
                    carried: true,
                    ..prev
                });
            }
        }

        if self
            .last()
            .is_some_and(|a| a.task == task && a.description == description)
        {
            return false;
        }

        let entry = OneActivity {
            millisol: clock.millisol.floor() as u32,
            task: task.to_string(),
            description: description.to_string(),
            carried: false,
        };
        let today = self.sols.entry(sol).or_default();
        // A carried-over entry is replaced by something starting at 0.
        if today.len() == 1 && today[0].carried && entry.millisol == 0 {
            today.clear();
        }
        today.push(entry);
        self.prune();
        true
    }

    /// Latest entry across all sols.
    pub fn last(&self) -> Option<&OneActivity> {
        self.sols.values().next_back().and_then(|v| v.last())
    }

    pub fn today(&self, sol: u32) -> &[OneActivity] {
        self.sols.get(&sol).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All kept sols, oldest first.
    pub fn history(&self) -> impl Iterator<Item = (u32, &[OneActivity])> {
        self.sols.iter().map(|(sol, v)| (*sol, v.as_slice()))
    }

    pub fn sols_kept(&self) -> usize {
        self.sols.len()
    }

    fn prune(&mut self) {
        while self.sols.len() > self.max_sols {
            self.sols.pop_first();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skips_consecutive_duplicates() {
        let mut log = ActivityLog::default();
        assert!(log.record_activity(&MarsClock::new(1, 100.0), "Cook", "Cook"));
        assert!(!log.record_activity(&MarsClock::new(1, 150.0), "Cook", "Cook"));
        assert!(log.record_activity(&MarsClock::new(1, 200.0), "Relax", "Relax"));
        assert!(log.record_activity(&MarsClock::new(1, 250.0), "Cook", "Cook"));
        assert_eq!(log.today(1).len(), 3);
    }

    #[test]
    fn test_carry_over_to_new_sol() {
        let mut log = ActivityLog::default();
        log.record_activity(&MarsClock::new(1, 900.0), "Sleep", "Sleep");
        log.record_activity(&MarsClock::new(2, 150.0), "EatDrink", "EatDrink");
        let sol2 = log.today(2);
        assert_eq!(sol2.len(), 2);
        assert_eq!(sol2[0].millisol, 0);
        assert_eq!(sol2[0].task, "Sleep");
        assert_eq!(sol2[1].task, "EatDrink");
    }

    #[test]
    fn test_carried_entry_replaced_at_midnight() {
        let mut log = ActivityLog::default();
        log.record_activity(&MarsClock::new(1, 900.0), "Sleep", "Sleep");
        log.record_activity(&MarsClock::new(2, 0.0), "EatDrink", "EatDrink");
        let sol2 = log.today(2);
        assert_eq!(sol2.len(), 1);
        assert_eq!(sol2[0].task, "EatDrink");
        assert!(!sol2[0].carried);
    }

    #[test]
    fn test_first_entry_at_midnight_kept() {
        let mut log = ActivityLog::default();
        log.record_activity(&MarsClock::new(1, 0.0), "Sleep", "Sleep");
        log.record_activity(&MarsClock::new(1, 0.4), "EatDrink", "EatDrink");
        let sol1 = log.today(1);
        assert_eq!(sol1.len(), 2);
        assert_eq!(sol1[0].task, "Sleep");
        assert_eq!(sol1[1].task, "EatDrink");
    }

    #[test]
    fn test_same_task_across_midnight_not_duplicated() {
        let mut log = ActivityLog::default();
        log.record_activity(&MarsClock::new(1, 900.0), "Sleep", "Sleep");
        assert!(!log.record_activity(&MarsClock::new(2, 50.0), "Sleep", "Sleep"));
        assert_eq!(log.today(2).len(), 1);
    }

    #[test]
    fn test_prunes_old_sols() {
        let mut log = ActivityLog::new(3);
        for sol in 1..=5 {
            log.record_activity(&MarsClock::new(sol, 10.0), &format!("T{sol}"), "x");
        }
        assert_eq!(log.sols_kept(), 3);
        let sols: Vec<u32> = log.history().map(|(s, _)| s).collect();
        assert_eq!(sols, vec![3, 4, 5]);
    }

    #[test]
    fn test_serializes() {
        let mut log = ActivityLog::default();
        log.record_activity(&MarsClock::new(1, 10.0), "Cook", "Cook");
        let json = serde_json::to_string(&log).unwrap();
        let back: ActivityLog = serde_json::from_str(&json).unwrap();
        assert_eq!(back, log);
    }
}
