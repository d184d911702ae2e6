//! Static vocabularies shared by descriptors, workers and oracles.
//!
//! Favorite activities, task traits, jobs, roles and robot types are the
//! affinity tags a task descriptor carries. Building functions are what the
//! colony oracle filters buildings by.

use serde::{Deserialize, Serialize};

/// Activity categories a person can list as their favorite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FavoriteType {
    Astronomy,
    Cooking,
    FieldWork,
    Gaming,
    LabExperimentation,
    Operation,
    Research,
    Sport,
    TendingGarden,
    Tinkering,
}

/// Personal qualities a task draws on. A person's aptitude for each trait
/// scales how attractive the task is to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskTrait {
    Academic,
    Agility,
    Artistic,
    Leadership,
    Medical,
    People,
    Relaxation,
    Strength,
    Teaching,
    Treatment,
}

impl TaskTrait {
    pub const ALL: [TaskTrait; 10] = [
        TaskTrait::Academic,
        TaskTrait::Agility,
        TaskTrait::Artistic,
        TaskTrait::Leadership,
        TaskTrait::Medical,
        TaskTrait::People,
        TaskTrait::Relaxation,
        TaskTrait::Strength,
        TaskTrait::Teaching,
        TaskTrait::Treatment,
    ];
}

/// A person's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobType {
    Architect,
    Areologist,
    Astronomer,
    Biologist,
    Botanist,
    Chef,
    Chemist,
    Doctor,
    Engineer,
    Mathematician,
    Meteorologist,
    Physicist,
    Pilot,
    Psychologist,
    Reporter,
    Technician,
    Trader,
}

impl JobType {
    /// Jobs that run scientific studies.
    pub fn is_scientist(self) -> bool {
        matches!(
            self,
            JobType::Areologist
                | JobType::Astronomer
                | JobType::Biologist
                | JobType::Botanist
                | JobType::Chemist
                | JobType::Mathematician
                | JobType::Meteorologist
                | JobType::Physicist
                | JobType::Psychologist
        )
    }
}

/// A person's organizational role within the settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoleType {
    Commander,
    SubCommander,
    ChiefOfAgriculture,
    ChiefOfEngineering,
    ChiefOfLogistics,
    ChiefOfSafetyAndHealth,
    ChiefOfScience,
    AgricultureSpecialist,
    EngineeringSpecialist,
    LogisticSpecialist,
    MissionSpecialist,
    ResourceSpecialist,
    SafetySpecialist,
    ScienceSpecialist,
}

impl RoleType {
    /// Commander, sub-commander and the chiefs.
    pub fn is_leadership(self) -> bool {
        matches!(
            self,
            RoleType::Commander
                | RoleType::SubCommander
                | RoleType::ChiefOfAgriculture
                | RoleType::ChiefOfEngineering
                | RoleType::ChiefOfLogistics
                | RoleType::ChiefOfSafetyAndHealth
                | RoleType::ChiefOfScience
        )
    }
}

/// Robot models. Each is built for a narrow set of tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RobotType {
    ChefBot,
    ConstructionBot,
    DeliveryBot,
    GardenBot,
    MakerBot,
    MedicBot,
    RepairBot,
}

/// What a building can be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildingFunction {
    AstronomicalObservation,
    Cooking,
    Dining,
    Eva,
    Exercise,
    Farming,
    Garage,
    LivingAccommodation,
    Medical,
    Recreation,
    Research,
    RobotStation,
}
