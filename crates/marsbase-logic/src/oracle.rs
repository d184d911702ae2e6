//! Read-only colony queries consumed by scoring functions.
//!
//! The scheduler never owns buildings, vehicles or studies. It sees them
//! through [`ColonyOracle`], which the simulation implements over its own
//! state (see [`crate::snapshot::ColonySnapshot`] for the in-memory one).
//! Every query answers "nothing" rather than failing: a missing building, an
//! empty malfunction list or an unknown slot all mean the task is not
//! applicable this tick.

use serde::{Deserialize, Serialize};

use crate::constants::BuildingFunction;
use crate::duty::MarsClock;
use crate::slot::{SlotKey, SlotState};
use crate::worker::WorkerId;

pub type SettlementId = u32;
pub type BuildingId = u32;
pub type VehicleId = u32;
pub type MalfunctionId = u32;
pub type StudyId = u32;

/// Current radiation event level at a settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum RadiationHazard {
    #[default]
    Clear,
    /// Galactic cosmic ray uptick.
    Mild,
    /// Solar energetic particle event.
    Moderate,
    /// Flare in progress. Lethal outside.
    Severe,
}

impl RadiationHazard {
    pub fn is_lethal_outside(self) -> bool {
        self == RadiationHazard::Severe
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingInfo {
    pub id: BuildingId,
    pub settlement: SettlementId,
    pub name: String,
    pub functions: Vec<BuildingFunction>,
    pub occupants: u32,
    /// Comfortable occupant capacity.
    pub capacity: u32,
    pub malfunctioning: bool,
}

impl BuildingInfo {
    /// An empty, working building.
    pub fn new(
        id: BuildingId,
        settlement: SettlementId,
        name: &str,
        functions: &[BuildingFunction],
        capacity: u32,
    ) -> Self {
        Self {
            id,
            settlement,
            name: name.to_string(),
            functions: functions.to_vec(),
            occupants: 0,
            capacity,
            malfunctioning: false,
        }
    }

    pub fn has_function(&self, function: BuildingFunction) -> bool {
        self.functions.contains(&function)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MalfunctionInfo {
    pub id: MalfunctionId,
    pub building: BuildingId,
    pub name: String,
    /// 1..100.
    pub severity: u32,
    /// Millisols of work left.
    pub work_remaining: f64,
    /// Repair has to be done from outside.
    pub needs_eva: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceInfo {
    pub building: BuildingId,
    /// Millisols since the last inspection.
    pub effective_time: f64,
    /// Millisols between scheduled inspections.
    pub inspection_window: f64,
}

impl MaintenanceInfo {
    /// How far through its inspection window the building is; above 1.0 is overdue.
    pub fn overdue_ratio(&self) -> f64 {
        if self.inspection_window <= 0.0 {
            return 0.0;
        }
        (self.effective_time / self.inspection_window).max(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GreenhouseInfo {
    pub building: BuildingId,
    pub crops: u32,
    pub crops_needing_tending: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PondInfo {
    pub building: BuildingId,
    pub name: String,
    /// Relative deviation from ideal nutrient and light levels, 0..1.
    pub deviation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicalAidInfo {
    pub building: BuildingId,
    pub patients_waiting: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleInfo {
    pub id: VehicleId,
    pub name: String,
    pub settlement: SettlementId,
    /// Fraction of the mission manifest still to load, if a mission is loading.
    pub loading: Option<f64>,
    /// Cargo left aboard after a mission, in kg.
    pub cargo_to_unload: f64,
    /// Maintenance overdue ratio; above 1.0 the vehicle is due.
    pub maintenance_due: f64,
    pub garage: Option<BuildingId>,
    pub on_mission: bool,
}

impl VehicleInfo {
    /// A parked vehicle with nothing to do.
    pub fn new(id: VehicleId, name: &str, settlement: SettlementId) -> Self {
        Self {
            id,
            name: name.to_string(),
            settlement,
            loading: None,
            cargo_to_unload: 0.0,
            maintenance_due: 0.0,
            garage: None,
            on_mission: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StudyPhase {
    Proposal,
    InvitingCollaborators,
    Research,
    PaperWriting,
    PeerReview,
    Completed,
}

impl StudyPhase {
    /// Phases where a researcher has something to do.
    pub fn is_active(self) -> bool {
        matches!(
            self,
            StudyPhase::Proposal | StudyPhase::Research | StudyPhase::PaperWriting
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StudyRole {
    Primary,
    Collaborator,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyInfo {
    pub id: StudyId,
    pub name: String,
    pub phase: StudyPhase,
    pub role: StudyRole,
    pub needs_lab: bool,
    /// Millisols of work left in the current phase for this researcher.
    pub work_remaining: f64,
}

/// Everything scoring functions may ask about the colony.
pub trait ColonyOracle {
    fn clock(&self) -> MarsClock;
    fn radiation(&self, settlement: SettlementId) -> RadiationHazard;
    fn is_daylight(&self, settlement: SettlementId) -> bool;

    /// Buildings in a settlement offering a function, in id order.
    fn buildings(&self, settlement: SettlementId, function: BuildingFunction) -> Vec<&BuildingInfo>;
    fn building(&self, id: BuildingId) -> Option<&BuildingInfo>;

    fn malfunctions(&self, settlement: SettlementId) -> Vec<&MalfunctionInfo>;
    fn maintenance(&self, settlement: SettlementId) -> Vec<&MaintenanceInfo>;
    fn greenhouses(&self, settlement: SettlementId) -> Vec<&GreenhouseInfo>;
    fn algae_ponds(&self, settlement: SettlementId) -> Vec<&PondInfo>;
    fn medical_aids(&self, settlement: SettlementId) -> Vec<&MedicalAidInfo>;
    fn vehicles(&self, settlement: SettlementId) -> Vec<&VehicleInfo>;

    /// Studies a worker leads or collaborates on.
    fn studies(&self, worker: WorkerId) -> Vec<&StudyInfo>;

    /// Opinions (0..100) the worker holds of the other occupants of a building.
    fn opinions(&self, worker: WorkerId, building: BuildingId) -> Vec<f64>;

    /// People in the settlement waiting on a cooked meal.
    fn hungry_people(&self, settlement: SettlementId) -> u32;

    /// How badly the settlement needs regolith, 0..1.
    fn regolith_demand(&self, settlement: SettlementId) -> f64;

    /// Availability of a shared resource; `None` when it does not exist.
    fn slot(&self, key: SlotKey) -> Option<SlotState>;

    /// Whether a slot exists and has a free place.
    fn has_room(&self, key: SlotKey) -> bool {
        self.slot(key).is_some_and(|s| s.has_room())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overdue_ratio() {
        let m = MaintenanceInfo {
            building: 1,
            effective_time: 1500.0,
            inspection_window: 1000.0,
        };
        assert!((m.overdue_ratio() - 1.5).abs() < 1e-9);

        let broken = MaintenanceInfo {
            inspection_window: 0.0,
            ..m
        };
        assert_eq!(broken.overdue_ratio(), 0.0);
    }

    #[test]
    fn test_radiation_ordering() {
        assert!(RadiationHazard::Severe > RadiationHazard::Moderate);
        assert!(RadiationHazard::Severe.is_lethal_outside());
        assert!(!RadiationHazard::Moderate.is_lethal_outside());
    }

    #[test]
    fn test_active_study_phases() {
        assert!(StudyPhase::Research.is_active());
        assert!(!StudyPhase::PeerReview.is_active());
        assert!(!StudyPhase::Completed.is_active());
    }
}
