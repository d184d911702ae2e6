//! Physical condition and fitness gates.
//!
//! Fatigue is measured in millisols awake, stress on a 0..100 scale and
//! hunger/thirst in millisols since the last meal or drink. Health is 0..1
//! and maps onto [`MedicalSeverity`] tiers.

use serde::{Deserialize, Serialize};

/// Medical severity tiers based on health value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MedicalSeverity {
    /// Health >= 0.7.
    None,
    /// Health 0.4..0.7, recovers on its own.
    Minor,
    /// Health 0.2..0.4, needs a medical bed.
    Serious,
    /// Health < 0.2.
    Critical,
}

impl MedicalSeverity {
    pub fn from_health(health: f64) -> Self {
        if health >= 0.7 {
            Self::None
        } else if health >= 0.4 {
            Self::Minor
        } else if health >= 0.2 {
            Self::Serious
        } else {
            Self::Critical
        }
    }

    /// Whether this person should be lying in a medical bed.
    pub fn needs_bed(self) -> bool {
        matches!(self, Self::Serious | Self::Critical)
    }
}

/// Maximum physiological levels a task tolerates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessGate {
    pub fatigue_max: f64,
    pub stress_max: f64,
    pub hunger_max: f64,
}

impl FitnessGate {
    pub const fn new(fatigue_max: f64, stress_max: f64, hunger_max: f64) -> Self {
        Self {
            fatigue_max,
            stress_max,
            hunger_max,
        }
    }
}

impl Default for FitnessGate {
    fn default() -> Self {
        Self::new(1000.0, 75.0, 1000.0)
    }
}

/// Physiological state of a person.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalCondition {
    pub fatigue: f64,
    pub stress: f64,
    pub hunger: f64,
    pub thirst: f64,
    /// Stored energy in kJ.
    pub energy: f64,
    /// Work performance, 0..1.
    pub performance: f64,
    /// Overall health, 0..1.
    pub health: f64,
    pub radiation_sick: bool,
}

impl Default for PhysicalCondition {
    fn default() -> Self {
        Self {
            fatigue: 0.0,
            stress: 0.0,
            hunger: 0.0,
            thirst: 0.0,
            energy: 3000.0,
            performance: 1.0,
            health: 1.0,
            radiation_sick: false,
        }
    }
}

impl PhysicalCondition {
    pub fn medical_severity(&self) -> MedicalSeverity {
        MedicalSeverity::from_health(self.health)
    }

    /// Serious injury, illness or radiation sickness.
    pub fn has_serious_medical_problem(&self) -> bool {
        self.radiation_sick || self.medical_severity().needs_bed()
    }

    pub fn is_unfit_by_level(
        &self,
        fatigue_max: f64,
        stress_max: f64,
        hunger_max: f64,
        thirst_max: f64,
    ) -> bool {
        self.fatigue > fatigue_max
            || self.stress > stress_max
            || self.hunger > hunger_max
            || self.thirst > thirst_max
            || self.has_serious_medical_problem()
    }

    /// Fit for a task tolerating the given levels. Thirst tolerance is half
    /// the hunger tolerance.
    pub fn is_fit_by_level(&self, fatigue_max: f64, stress_max: f64, hunger_max: f64) -> bool {
        !self.is_unfit_by_level(fatigue_max, stress_max, hunger_max, hunger_max / 2.0)
    }

    pub fn passes(&self, gate: &FitnessGate) -> bool {
        self.is_fit_by_level(gate.fatigue_max, gate.stress_max, gate.hunger_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_tiers() {
        assert_eq!(MedicalSeverity::from_health(1.0), MedicalSeverity::None);
        assert_eq!(MedicalSeverity::from_health(0.7), MedicalSeverity::None);
        assert_eq!(MedicalSeverity::from_health(0.69), MedicalSeverity::Minor);
        assert_eq!(MedicalSeverity::from_health(0.39), MedicalSeverity::Serious);
        assert_eq!(MedicalSeverity::from_health(0.19), MedicalSeverity::Critical);
    }

    #[test]
    fn test_needs_bed() {
        assert!(!MedicalSeverity::None.needs_bed());
        assert!(!MedicalSeverity::Minor.needs_bed());
        assert!(MedicalSeverity::Serious.needs_bed());
        assert!(MedicalSeverity::Critical.needs_bed());
    }

    #[test]
    fn test_default_condition_is_fit() {
        let c = PhysicalCondition::default();
        assert!(c.passes(&FitnessGate::default()));
    }

    #[test]
    fn test_fatigue_gate_boundary() {
        let gate = FitnessGate::default();
        let mut c = PhysicalCondition {
            fatigue: 1000.0,
            ..Default::default()
        };
        assert!(c.passes(&gate)); // at the limit is still fit
        c.fatigue = 1000.1;
        assert!(!c.passes(&gate));
    }

    #[test]
    fn test_thirst_uses_half_hunger_limit() {
        let c = PhysicalCondition {
            thirst: 600.0,
            ..Default::default()
        };
        assert!(!c.is_fit_by_level(1000.0, 75.0, 1000.0));
        assert!(c.is_fit_by_level(1000.0, 75.0, 1300.0));
    }

    #[test]
    fn test_serious_problem_is_unfit() {
        let c = PhysicalCondition {
            health: 0.3,
            ..Default::default()
        };
        assert!(c.has_serious_medical_problem());
        assert!(!c.passes(&FitnessGate::default()));

        let sick = PhysicalCondition {
            radiation_sick: true,
            ..Default::default()
        };
        assert!(sick.has_serious_medical_problem());
    }
}
