//! Task selection logic for a Mars colony simulation.
//!
//! Every worker (person or robot) repeatedly picks its next activity from a
//! catalog of candidate tasks. Each candidate scores itself against the
//! worker's condition and the colony's shared resources, and the selector
//! makes a weighted random draw over the positive scores. Functions take plain
//! data and read-only oracles, so the whole pipeline is unit-testable without
//! an engine.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`activity`] | Per-sol activity log of chosen tasks |
//! | [`cache`] | Candidate set, diagnostics dump, single-pass weighted draw |
//! | [`config`] | Cross-task tuning values, JSON loading and validation |
//! | [`constants`] | Favorite activities, task traits, jobs, roles, robot types, building functions |
//! | [`descriptor`] | Task descriptors: worker type, time scope, static affinities |
//! | [`duty`] | Mars clock, work shifts, meal and sleep windows |
//! | [`error`] | Error taxonomy (`TaskUnavailable`, `ScoringFault`, ...) |
//! | [`health`] | Physical condition, fitness gates, medical severity |
//! | [`meta`] | The `MetaTask` trait, offers and concrete task handles |
//! | [`modifiers`] | Crowding, relationship, shift, radiation, preference, affinity modifiers |
//! | [`oracle`] | Read-only colony queries consumed by scorers |
//! | [`rating`] | Staged scoring pipeline (gate → base → veto → modifiers → clamp) |
//! | [`registry`] | Scope-partitioned task pools with lazy build and reset |
//! | [`selector`] | Per-worker task choice, pending orders, idle fallback |
//! | [`settlement`] | Settlement-scan tasks, per-worker modifiers, per-tick scan cache |
//! | [`slot`] | Shared resource slots (beds, bays, workstations, repair work) |
//! | [`snapshot`] | In-memory colony oracle used by the harness and tests |
//! | [`tasks`] | The concrete task catalog and the idle fallback |
//! | [`worker`] | Person/robot worker model |

pub mod activity;
pub mod cache;
pub mod config;
pub mod constants;
pub mod descriptor;
pub mod duty;
pub mod error;
pub mod health;
pub mod meta;
pub mod modifiers;
pub mod oracle;
pub mod rating;
pub mod registry;
pub mod selector;
pub mod settlement;
pub mod slot;
pub mod snapshot;
pub mod tasks;
pub mod worker;
