//! Cross-task tuning values.
//!
//! Per-task constants (weight per crop, per patient, per kg of cargo) live
//! next to the scorer that uses them. What is here is shared by every scorer:
//! the score cap, the standard fitness gate, and the multipliers applied by
//! the modifier functions in [`crate::modifiers`].
//!
//! # Usage
//!
//! ```
//! use marsbase_logic::config::Tuning;
//!
//! let tuning = Tuning::from_json(r#"{ "score_cap": 2500.0 }"#).unwrap();
//! assert_eq!(tuning.score_cap, 2500.0);
//! assert_eq!(tuning.idle_weight, Tuning::default().idle_weight);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::health::FitnessGate;

/// Multipliers for matches between a worker and a task descriptor's affinities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AffinityTuning {
    /// Task matches the person's favorite activity.
    pub favorite: f64,
    /// Task lists the person's job.
    pub job: f64,
    /// Task lists the person's role.
    pub role: f64,
    /// Task lists the robot's type.
    pub robot: f64,
    /// How strongly trait aptitude (centered on 50) bends the score.
    pub trait_weight: f64,
}

impl Default for AffinityTuning {
    fn default() -> Self {
        Self {
            favorite: 1.5,
            job: 1.5,
            role: 1.25,
            robot: 2.0,
            trait_weight: 0.5,
        }
    }
}

/// Divisors applied to outdoor scores during radiation events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadiationTuning {
    pub mild: f64,
    /// Severe events veto outdoor work outright.
    pub moderate: f64,
}

impl Default for RadiationTuning {
    fn default() -> Self {
        Self {
            mild: 2.0,
            moderate: 5.0,
        }
    }
}

/// All cross-task tuning values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Upper bound for any unbounded base accumulation.
    pub score_cap: f64,
    /// Weight of the idle fallback.
    pub idle_weight: f64,
    /// Gate used by ordinary work and leisure tasks.
    pub fitness: FitnessGate,
    pub radiation: RadiationTuning,
    /// Strength of the crowding penalty/bonus, 0..1.
    pub crowding_weight: f64,
    /// Strength of the co-occupant opinion modifier, 0..1.
    pub relationship_weight: f64,
    /// Score change per preference point; must keep 5 points above -1.
    pub preference_scale: f64,
    pub affinity: AffinityTuning,
    /// Work-hour tasks while on shift.
    pub on_shift_bonus: f64,
    /// Work-hour tasks while off shift (used by any-hour work like repairs).
    pub off_shift_penalty: f64,
    /// Dump each worker's candidate list at debug level.
    pub diagnostics: bool,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            score_cap: 3000.0,
            idle_weight: 1.0,
            fitness: FitnessGate::default(),
            radiation: RadiationTuning::default(),
            crowding_weight: 0.5,
            relationship_weight: 0.5,
            preference_scale: 0.2,
            affinity: AffinityTuning::default(),
            on_shift_bonus: 1.5,
            off_shift_penalty: 0.25,
            diagnostics: false,
        }
    }
}

impl Tuning {
    /// Parse and validate. Missing fields take their default value.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("score_cap", self.score_cap),
            ("idle_weight", self.idle_weight),
            ("fitness.fatigue_max", self.fitness.fatigue_max),
            ("fitness.stress_max", self.fitness.stress_max),
            ("fitness.hunger_max", self.fitness.hunger_max),
            ("affinity.favorite", self.affinity.favorite),
            ("affinity.job", self.affinity.job),
            ("affinity.role", self.affinity.role),
            ("affinity.robot", self.affinity.robot),
            ("on_shift_bonus", self.on_shift_bonus),
            ("off_shift_penalty", self.off_shift_penalty),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")));
            }
        }

        let divisors = [
            ("radiation.mild", self.radiation.mild),
            ("radiation.moderate", self.radiation.moderate),
        ];
        for (name, value) in divisors {
            if !(value.is_finite() && value >= 1.0) {
                return Err(ConfigError::Invalid(format!("{name} must be >= 1, got {value}")));
            }
        }

        let fractions = [
            ("crowding_weight", self.crowding_weight),
            ("relationship_weight", self.relationship_weight),
            ("affinity.trait_weight", self.affinity.trait_weight),
        ];
        for (name, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!("{name} must be in 0..=1, got {value}")));
            }
        }

        // Five points of dislike must not drive the multiplier negative.
        if !(0.0..0.2 + f64::EPSILON).contains(&self.preference_scale) {
            return Err(ConfigError::Invalid(format!(
                "preference_scale must be in 0..=0.2, got {}",
                self.preference_scale
            )));
        }
        Ok(())
    }
}
