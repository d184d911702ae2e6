//! In-memory colony used by the harness and the tests.
//!
//! Built with consuming `with_*` calls, then mutated between scheduling
//! passes to simulate task execution: [`ColonySnapshot::claim`] and
//! [`ColonySnapshot::release`] go through the atomic [`ResourceSlot`]s, so
//! they work through a shared reference.
//!
//! Registering a building also registers a workstation slot sized to its
//! capacity; registering a vehicle registers a single-place vehicle slot;
//! registering a malfunction registers its repair-work slot.

use std::collections::{BTreeMap, HashMap};

use crate::constants::BuildingFunction;
use crate::duty::MarsClock;
use crate::error::SlotError;
use crate::oracle::{
    BuildingId, BuildingInfo, ColonyOracle, GreenhouseInfo, MaintenanceInfo, MalfunctionId,
    MalfunctionInfo, MedicalAidInfo, PondInfo, RadiationHazard, SettlementId, StudyInfo,
    VehicleInfo,
};
use crate::slot::{ResourceSlot, SlotKey, SlotState};
use crate::worker::WorkerId;

/// Opinion assumed when a worker has no recorded opinion of a building's occupants.
pub const NEUTRAL_OPINION: f64 = 50.0;

/// Per-settlement state.
#[derive(Debug, Clone)]
pub struct SettlementState {
    pub radiation: RadiationHazard,
    pub daylight: bool,
    pub malfunctions: Vec<MalfunctionInfo>,
    pub maintenance: Vec<MaintenanceInfo>,
    pub greenhouses: Vec<GreenhouseInfo>,
    pub ponds: Vec<PondInfo>,
    pub medical: Vec<MedicalAidInfo>,
    pub vehicles: Vec<VehicleInfo>,
    pub hungry_people: u32,
    pub regolith_demand: f64,
}

impl Default for SettlementState {
    fn default() -> Self {
        Self {
            radiation: RadiationHazard::Clear,
            daylight: true,
            malfunctions: Vec::new(),
            maintenance: Vec::new(),
            greenhouses: Vec::new(),
            ponds: Vec::new(),
            medical: Vec::new(),
            vehicles: Vec::new(),
            hungry_people: 0,
            regolith_demand: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ColonySnapshot {
    clock: MarsClock,
    settlements: BTreeMap<SettlementId, SettlementState>,
    buildings: BTreeMap<BuildingId, BuildingInfo>,
    studies: HashMap<WorkerId, Vec<StudyInfo>>,
    opinions: HashMap<(WorkerId, BuildingId), Vec<f64>>,
    slots: HashMap<SlotKey, ResourceSlot>,
}

impl ColonySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Builders ──

    pub fn with_clock(mut self, clock: MarsClock) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_radiation(mut self, settlement: SettlementId, hazard: RadiationHazard) -> Self {
        self.settlement_mut(settlement).radiation = hazard;
        self
    }

    pub fn with_daylight(mut self, settlement: SettlementId, daylight: bool) -> Self {
        self.settlement_mut(settlement).daylight = daylight;
        self
    }

    /// Add a building and a workstation slot for its capacity.
    pub fn with_building(mut self, building: BuildingInfo) -> Self {
        self.settlement_mut(building.settlement);
        self.slots
            .insert(SlotKey::Workstation(building.id), ResourceSlot::new(building.capacity));
        self.buildings.insert(building.id, building);
        self
    }

    pub fn with_slot(mut self, key: SlotKey, capacity: u32) -> Self {
        self.slots.insert(key, ResourceSlot::new(capacity));
        self
    }

    pub fn with_beds(self, building: BuildingId, beds: u32) -> Self {
        self.with_slot(SlotKey::Bed(building), beds)
    }

    pub fn with_garage_bays(self, building: BuildingId, bays: u32) -> Self {
        self.with_slot(SlotKey::GarageBay(building), bays)
    }

    pub fn with_airlock(self, building: BuildingId, capacity: u32) -> Self {
        self.with_slot(SlotKey::Airlock(building), capacity)
    }

    pub fn with_chargers(self, building: BuildingId, chargers: u32) -> Self {
        self.with_slot(SlotKey::Charger(building), chargers)
    }

    /// Add a malfunction with room for `repairers` workers at once.
    pub fn with_malfunction(
        mut self,
        settlement: SettlementId,
        malfunction: MalfunctionInfo,
        repairers: u32,
    ) -> Self {
        self.slots
            .insert(SlotKey::RepairWork(malfunction.id), ResourceSlot::new(repairers));
        self.settlement_mut(settlement).malfunctions.push(malfunction);
        self
    }

    pub fn with_maintenance(mut self, settlement: SettlementId, info: MaintenanceInfo) -> Self {
        self.settlement_mut(settlement).maintenance.push(info);
        self
    }

    pub fn with_greenhouse(mut self, settlement: SettlementId, info: GreenhouseInfo) -> Self {
        self.settlement_mut(settlement).greenhouses.push(info);
        self
    }

    pub fn with_pond(mut self, settlement: SettlementId, info: PondInfo) -> Self {
        self.settlement_mut(settlement).ponds.push(info);
        self
    }

    pub fn with_medical_aid(mut self, settlement: SettlementId, info: MedicalAidInfo) -> Self {
        self.settlement_mut(settlement).medical.push(info);
        self
    }

    /// Add a vehicle and its single-place slot.
    pub fn with_vehicle(mut self, vehicle: VehicleInfo) -> Self {
        self.slots.insert(SlotKey::Vehicle(vehicle.id), ResourceSlot::new(1));
        self.settlement_mut(vehicle.settlement).vehicles.push(vehicle);
        self
    }

    pub fn with_study(mut self, worker: WorkerId, study: StudyInfo) -> Self {
        self.studies.entry(worker).or_default().push(study);
        self
    }

    pub fn with_opinions(mut self, worker: WorkerId, building: BuildingId, opinions: Vec<f64>) -> Self {
        self.opinions.insert((worker, building), opinions);
        self
    }

    pub fn with_hungry_people(mut self, settlement: SettlementId, people: u32) -> Self {
        self.settlement_mut(settlement).hungry_people = people;
        self
    }

    pub fn with_regolith_demand(mut self, settlement: SettlementId, demand: f64) -> Self {
        self.settlement_mut(settlement).regolith_demand = demand.clamp(0.0, 1.0);
        self
    }

    // ── Mutation between passes ──

    pub fn settlement_mut(&mut self, settlement: SettlementId) -> &mut SettlementState {
        self.settlements.entry(settlement).or_default()
    }

    pub fn building_mut(&mut self, id: BuildingId) -> Option<&mut BuildingInfo> {
        self.buildings.get_mut(&id)
    }

    pub fn set_clock(&mut self, clock: MarsClock) {
        self.clock = clock;
    }

    pub fn advance(&mut self, millisols: f64) {
        self.clock.advance(millisols);
    }

    /// Take one place in a slot, as a starting task would.
    pub fn claim(&self, key: SlotKey) -> Result<u32, SlotError> {
        self.slots.get(&key).ok_or(SlotError::Unknown(key))?.try_claim()
    }

    pub fn release(&self, key: SlotKey) -> Result<u32, SlotError> {
        self.slots.get(&key).ok_or(SlotError::Unknown(key))?.release()
    }

    pub fn set_reserved(&self, key: SlotKey, reserved: bool) -> Result<(), SlotError> {
        self.slots
            .get(&key)
            .ok_or(SlotError::Unknown(key))?
            .set_reserved(reserved);
        Ok(())
    }

    /// Remove a fixed malfunction and its repair slot.
    pub fn resolve_malfunction(&mut self, id: MalfunctionId) -> bool {
        self.slots.remove(&SlotKey::RepairWork(id));
        let mut found = false;
        for state in self.settlements.values_mut() {
            let before = state.malfunctions.len();
            state.malfunctions.retain(|m| m.id != id);
            found |= state.malfunctions.len() != before;
        }
        found
    }

    /// Every slot and its state, in key order.
    pub fn slot_states(&self) -> Vec<(SlotKey, SlotState)> {
        let mut states: Vec<_> = self.slots.iter().map(|(k, s)| (*k, s.state())).collect();
        states.sort_by_key(|(k, _)| *k);
        states
    }

    fn settlement(&self, settlement: SettlementId) -> Option<&SettlementState> {
        self.settlements.get(&settlement)
    }
}

impl ColonyOracle for ColonySnapshot {
    fn clock(&self) -> MarsClock {
        self.clock
    }

    fn radiation(&self, settlement: SettlementId) -> RadiationHazard {
        self.settlement(settlement).map_or(RadiationHazard::Clear, |s| s.radiation)
    }

    fn is_daylight(&self, settlement: SettlementId) -> bool {
        self.settlement(settlement).is_some_and(|s| s.daylight)
    }

    fn buildings(&self, settlement: SettlementId, function: BuildingFunction) -> Vec<&BuildingInfo> {
        self.buildings
            .values()
            .filter(|b| b.settlement == settlement && b.has_function(function))
            .collect()
    }

    fn building(&self, id: BuildingId) -> Option<&BuildingInfo> {
        self.buildings.get(&id)
    }

    fn malfunctions(&self, settlement: SettlementId) -> Vec<&MalfunctionInfo> {
        self.settlement(settlement)
            .map(|s| s.malfunctions.iter().collect())
            .unwrap_or_default()
    }

    fn maintenance(&self, settlement: SettlementId) -> Vec<&MaintenanceInfo> {
        self.settlement(settlement)
            .map(|s| s.maintenance.iter().collect())
            .unwrap_or_default()
    }

    fn greenhouses(&self, settlement: SettlementId) -> Vec<&GreenhouseInfo> {
        self.settlement(settlement)
            .map(|s| s.greenhouses.iter().collect())
            .unwrap_or_default()
    }

    fn algae_ponds(&self, settlement: SettlementId) -> Vec<&PondInfo> {
        self.settlement(settlement)
            .map(|s| s.ponds.iter().collect())
            .unwrap_or_default()
    }

    fn medical_aids(&self, settlement: SettlementId) -> Vec<&MedicalAidInfo> {
        self.settlement(settlement)
            .map(|s| s.medical.iter().collect())
            .unwrap_or_default()
    }

    fn vehicles(&self, settlement: SettlementId) -> Vec<&VehicleInfo> {
        self.settlement(settlement)
            .map(|s| s.vehicles.iter().collect())
            .unwrap_or_default()
    }

    fn studies(&self, worker: WorkerId) -> Vec<&StudyInfo> {
        self.studies
            .get(&worker)
            .map(|v| v.iter().collect())
            .unwrap_or_default()
    }

    fn opinions(&self, worker: WorkerId, building: BuildingId) -> Vec<f64> {
        if let Some(recorded) = self.opinions.get(&(worker, building)) {
            return recorded.clone();
        }
        // Strangers: one neutral opinion per other occupant.
        let others = self
            .buildings
            .get(&building)
            .map_or(0, |b| b.occupants as usize);
        vec![NEUTRAL_OPINION; others]
    }

    fn hungry_people(&self, settlement: SettlementId) -> u32 {
        self.settlement(settlement).map_or(0, |s| s.hungry_people)
    }

    fn regolith_demand(&self, settlement: SettlementId) -> f64 {
        self.settlement(settlement).map_or(0.0, |s| s.regolith_demand)
    }

    fn slot(&self, key: SlotKey) -> Option<SlotState> {
        self.slots.get(&key).map(ResourceSlot::state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn colony() -> ColonySnapshot {
        ColonySnapshot::new()
            .with_building(BuildingInfo::new(
                1,
                1,
                "Lab A",
                &[BuildingFunction::Research],
                2,
            ))
            .with_building(BuildingInfo::new(
                2,
                1,
                "Kitchen",
                &[BuildingFunction::Cooking, BuildingFunction::Dining],
                4,
            ))
            .with_building(BuildingInfo::new(
                3,
                2,
                "Lab B",
                &[BuildingFunction::Research],
                2,
            ))
            .with_beds(4, 1)
    }

    #[test]
    fn test_buildings_by_function_and_settlement() {
        let c = colony();
        let labs: Vec<_> = c
            .buildings(1, BuildingFunction::Research)
            .iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(labs, vec![1]);
        assert!(c.buildings(1, BuildingFunction::Medical).is_empty());
    }

    #[test]
    fn test_workstation_slot_registered() {
        let c = colony();
        let s = c.slot(SlotKey::Workstation(2)).unwrap();
        assert_eq!(s.capacity, 4);
        assert!(c.has_room(SlotKey::Workstation(2)));
    }

    #[test]
    fn test_claim_and_release() {
        let c = colony();
        assert_eq!(c.claim(SlotKey::Bed(4)), Ok(1));
        assert!(!c.has_room(SlotKey::Bed(4)));
        assert_eq!(c.claim(SlotKey::Bed(4)), Err(SlotError::Full));
        assert_eq!(c.release(SlotKey::Bed(4)), Ok(0));
        assert_eq!(
            c.claim(SlotKey::Bed(99)),
            Err(SlotError::Unknown(SlotKey::Bed(99)))
        );
    }

    #[test]
    fn test_missing_settlement_answers_nothing() {
        let c = ColonySnapshot::new();
        assert!(c.malfunctions(7).is_empty());
        assert!(c.vehicles(7).is_empty());
        assert_eq!(c.radiation(7), RadiationHazard::Clear);
        assert_eq!(c.hungry_people(7), 0);
        assert!(c.slot(SlotKey::Airlock(1)).is_none());
        assert!(!c.has_room(SlotKey::Airlock(1)));
    }

    #[test]
    fn test_malfunction_lifecycle() {
        let m = MalfunctionInfo {
            id: 10,
            building: 1,
            name: "Leak".into(),
            severity: 40,
            work_remaining: 100.0,
            needs_eva: false,
        };
        let mut c = colony().with_malfunction(1, m, 2);
        assert_eq!(c.malfunctions(1).len(), 1);
        assert_eq!(c.slot(SlotKey::RepairWork(10)).unwrap().capacity, 2);
        assert!(c.resolve_malfunction(10));
        assert!(c.malfunctions(1).is_empty());
        assert!(c.slot(SlotKey::RepairWork(10)).is_none());
        assert!(!c.resolve_malfunction(10));
    }

    #[test]
    fn test_default_opinions_neutral() {
        let mut c = colony();
        if let Some(b) = c.building_mut(2) {
            b.occupants = 3;
        }
        assert_eq!(c.opinions(1, 2), vec![NEUTRAL_OPINION; 3]);
        let c = c.with_opinions(1, 2, vec![90.0]);
        assert_eq!(c.opinions(1, 2), vec![90.0]);
    }

    #[test]
    fn test_vehicle_slot_reservation() {
        let c = ColonySnapshot::new().with_vehicle(VehicleInfo::new(5, "Rover", 1));
        assert!(c.has_room(SlotKey::Vehicle(5)));
        c.set_reserved(SlotKey::Vehicle(5), true).unwrap();
        assert!(!c.has_room(SlotKey::Vehicle(5)));
    }
}
