//! Staged scoring pipeline.
//!
//! Every scorer follows the same shape, and the types make the order
//! impossible to get wrong:
//!
//! | Stage | Type | Effect |
//! |-------|------|--------|
//! | gates | [`ScoreBuilder`] | cheap boolean checks, any failure rejects |
//! | base | [`ScoreBuilder::base`] | task-specific need, clamped to a cap |
//! | vetoes | [`BaseScore::require`] | missing shared resource rejects |
//! | modifiers | [`Modifiers`] | multiply/add, re-clamped at 0 after each |
//! | finish | [`Rating`] | final non-negative score plus a trace |
//!
//! Once rejected, later stages are skipped and lazy closures
//! (`gate_with`, `base_with`, `require_with`) are never called, so resource
//! scans placed behind a gate cost nothing for workers who fail it.
//!
//! ```
//! use marsbase_logic::rating::ScoreBuilder;
//!
//! let rating = ScoreBuilder::new()
//!     .gate("inside", true)
//!     .base("crops", 3.0 * 10.0, 3000.0)
//!     .require("workstation", true)
//!     .multiply("favorite", 1.5)
//!     .add("preference", -100.0)
//!     .finish();
//! assert_eq!(rating.score(), 0.0);
//! assert!(!rating.is_rejected());
//! ```

use std::fmt;

/// What a pipeline stage did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    Gate,
    Base,
    Veto,
    Multiply,
    Add,
    Cap,
}

/// One recorded step: its input value and the running score after it.
#[derive(Debug, Clone, PartialEq)]
pub struct Stage {
    pub name: &'static str,
    pub kind: StageKind,
    pub value: f64,
    pub score: f64,
}

/// Outcome of scoring one task for one worker.
#[derive(Debug, Clone, PartialEq)]
pub struct Rating {
    score: f64,
    stages: Vec<Stage>,
    rejected: Option<&'static str>,
}

impl Rating {
    /// A zero rating rejected at the named stage.
    pub fn zero(reason: &'static str) -> Self {
        Self {
            score: 0.0,
            stages: Vec::new(),
            rejected: Some(reason),
        }
    }

    /// Always finite and >= 0.
    pub fn score(&self) -> f64 {
        if self.rejected.is_some() {
            0.0
        } else {
            self.score
        }
    }

    pub fn is_offered(&self) -> bool {
        self.score() > 0.0
    }

    pub fn is_rejected(&self) -> bool {
        self.rejected.is_some()
    }

    /// Name of the gate or veto that rejected the task.
    pub fn rejected_by(&self) -> Option<&'static str> {
        self.rejected
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Scale an already finished rating, e.g. by a per-worker modifier.
    pub fn scaled(mut self, name: &'static str, factor: f64) -> Self {
        if self.rejected.is_none() {
            self.score = clamp(self.score * factor);
            self.stages.push(Stage {
                name,
                kind: StageKind::Multiply,
                value: factor,
                score: self.score,
            });
        }
        self
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(reason) = self.rejected {
            return write!(f, "0 (rejected: {reason})");
        }
        write!(f, "{:.1}", self.score)?;
        let mut first = true;
        for stage in &self.stages {
            let part = match stage.kind {
                StageKind::Gate | StageKind::Veto => continue,
                StageKind::Base => format!("{} {:.1}", stage.name, stage.value),
                StageKind::Multiply => format!("x{:.2} {}", stage.value, stage.name),
                StageKind::Add => format!("{:+.1} {}", stage.value, stage.name),
                StageKind::Cap => format!("cap {:.0}", stage.value),
            };
            f.write_str(if first { " (" } else { ", " })?;
            f.write_str(&part)?;
            first = false;
        }
        if !first {
            f.write_str(")")?;
        }
        Ok(())
    }
}

/// Scores are floored at 0; NaN and infinities collapse to 0.
fn clamp(value: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

#[derive(Debug, Default)]
struct Trace {
    score: f64,
    stages: Vec<Stage>,
    rejected: Option<&'static str>,
}

impl Trace {
    fn push(&mut self, name: &'static str, kind: StageKind, value: f64) {
        self.stages.push(Stage {
            name,
            kind,
            value,
            score: self.score,
        });
    }

    fn reject(&mut self, name: &'static str, kind: StageKind) {
        self.score = 0.0;
        self.rejected = Some(name);
        self.push(name, kind, 0.0);
    }

    fn multiply(&mut self, name: &'static str, factor: f64) {
        if self.rejected.is_none() {
            self.score = clamp(self.score * factor);
            self.push(name, StageKind::Multiply, factor);
        }
    }

    fn add(&mut self, name: &'static str, term: f64) {
        if self.rejected.is_none() {
            self.score = clamp(self.score + term);
            self.push(name, StageKind::Add, term);
        }
    }

    fn finish(self) -> Rating {
        Rating {
            score: self.score,
            stages: self.stages,
            rejected: self.rejected,
        }
    }
}

/// Gate stage.
#[derive(Debug, Default)]
#[must_use]
pub struct ScoreBuilder {
    trace: Trace,
}

impl ScoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject unless `pass`.
    pub fn gate(mut self, name: &'static str, pass: bool) -> Self {
        if self.trace.rejected.is_none() {
            if pass {
                self.trace.push(name, StageKind::Gate, 1.0);
            } else {
                self.trace.reject(name, StageKind::Gate);
            }
        }
        self
    }

    /// Like [`gate`](Self::gate), evaluated only if nothing rejected yet.
    pub fn gate_with(self, name: &'static str, check: impl FnOnce() -> bool) -> Self {
        if self.trace.rejected.is_some() {
            return self;
        }
        let pass = check();
        self.gate(name, pass)
    }

    /// Set the base need, clamped to `0..=cap`. NaN counts as no need.
    pub fn base(mut self, name: &'static str, value: f64, cap: f64) -> BaseScore {
        if self.trace.rejected.is_none() {
            self.trace.score = if value.is_nan() {
                0.0
            } else {
                value.clamp(0.0, cap.max(0.0))
            };
            self.trace.push(name, StageKind::Base, value);
        }
        BaseScore { trace: self.trace }
    }

    /// Like [`base`](Self::base), computed only if no gate rejected.
    pub fn base_with(self, name: &'static str, cap: f64, value: impl FnOnce() -> f64) -> BaseScore {
        if self.trace.rejected.is_some() {
            return BaseScore { trace: self.trace };
        }
        let value = value();
        self.base(name, value, cap)
    }

    pub fn is_rejected(&self) -> bool {
        self.trace.rejected.is_some()
    }

    /// Close the pipeline after the gates. Scorers whose scans can fail
    /// return this as soon as a gate rejects, before touching the colony.
    pub fn finish(self) -> Rating {
        self.trace.finish()
    }
}

/// Veto stage.
#[derive(Debug)]
#[must_use]
pub struct BaseScore {
    trace: Trace,
}

impl BaseScore {
    /// Hard veto: reject unless the resource is there.
    pub fn require(mut self, name: &'static str, available: bool) -> Self {
        if self.trace.rejected.is_none() {
            if available {
                self.trace.push(name, StageKind::Veto, 1.0);
            } else {
                self.trace.reject(name, StageKind::Veto);
            }
        }
        self
    }

    pub fn require_with(self, name: &'static str, check: impl FnOnce() -> bool) -> Self {
        if self.trace.rejected.is_some() {
            return self;
        }
        let available = check();
        self.require(name, available)
    }

    pub fn multiply(self, name: &'static str, factor: f64) -> Modifiers {
        Modifiers { trace: self.trace }.multiply(name, factor)
    }

    pub fn add(self, name: &'static str, term: f64) -> Modifiers {
        Modifiers { trace: self.trace }.add(name, term)
    }

    /// Enter the modifier stage without applying one yet.
    pub fn modifiers(self) -> Modifiers {
        Modifiers { trace: self.trace }
    }

    pub fn finish(self) -> Rating {
        self.trace.finish()
    }
}

/// Modifier stage.
#[derive(Debug)]
#[must_use]
pub struct Modifiers {
    trace: Trace,
}

impl Modifiers {
    pub fn multiply(mut self, name: &'static str, factor: f64) -> Self {
        self.trace.multiply(name, factor);
        self
    }

    pub fn add(mut self, name: &'static str, term: f64) -> Self {
        self.trace.add(name, term);
        self
    }

    /// Apply `modifier` only when `condition` holds.
    pub fn multiply_if(self, name: &'static str, condition: bool, factor: f64) -> Self {
        if condition {
            self.multiply(name, factor)
        } else {
            self
        }
    }

    pub fn is_rejected(&self) -> bool {
        self.trace.rejected.is_some()
    }

    /// Upper bound on the modified score.
    pub fn cap(mut self, max: f64) -> Self {
        if self.trace.rejected.is_none() && self.trace.score > max {
            self.trace.score = max.max(0.0);
            self.trace.push("cap", StageKind::Cap, max);
        }
        self
    }

    pub fn finish(self) -> Rating {
        self.trace.finish()
    }
}
