//! Social, contextual and personal modifiers shared by scorers.
//!
//! All functions return a non-negative multiplier (1.0 = neutral) so they can
//! be chained through [`crate::rating::Modifiers::multiply`].

use crate::config::Tuning;
use crate::descriptor::TaskDescriptor;
use crate::oracle::{BuildingInfo, RadiationHazard};
use crate::worker::Worker;

/// Compute the overcrowding stress factor for a building.
/// Returns 0.0 (comfortable) to 1.0+ (severely overcrowded).
pub fn overcrowding_factor(occupants: u32, capacity: u32) -> f64 {
    if capacity == 0 {
        return 1.0;
    }
    let ratio = occupants as f64 / capacity as f64;
    if ratio <= 0.7 {
        0.0
    } else if ratio <= 1.0 {
        (ratio - 0.7) / 0.3
    } else {
        1.0 + (ratio - 1.0)
    }
}

/// Penalize moving into a crowded building, reward leaving one.
///
/// `here` is where the worker is now, `there` the task's destination.
pub fn crowding_modifier(
    here: Option<&BuildingInfo>,
    there: Option<&BuildingInfo>,
    weight: f64,
) -> f64 {
    let crowd = |b: Option<&BuildingInfo>| {
        b.map_or(0.0, |b| overcrowding_factor(b.occupants, b.capacity))
    };
    let (from, to) = match (here, there) {
        (Some(h), Some(t)) if h.id == t.id => return 1.0,
        (h, t) => (crowd(h), crowd(t)),
    };
    (1.0 + weight * (from - to)).max(0.0)
}

/// Average opinion (0..100) of the people the worker would be working with.
/// Nobody else there is neutral.
pub fn relationship_modifier(opinions: &[f64], weight: f64) -> f64 {
    if opinions.is_empty() {
        return 1.0;
    }
    let mean = opinions.iter().map(|o| o.clamp(0.0, 100.0)).sum::<f64>() / opinions.len() as f64;
    (1.0 + weight * (mean - 50.0) / 50.0).max(0.0)
}

/// Work done on shift is favoured, work done off shift is discouraged.
pub fn shift_modifier(on_duty: bool, tuning: &Tuning) -> f64 {
    if on_duty {
        tuning.on_shift_bonus
    } else {
        tuning.off_shift_penalty
    }
}

/// Partial penalty for outdoor work during radiation events.
///
/// Severe events return 0; scorers gate on them before any scan, this is the
/// backstop. Indoor work is unaffected.
pub fn radiation_modifier(hazard: RadiationHazard, outdoor: bool, tuning: &Tuning) -> f64 {
    if !outdoor {
        return 1.0;
    }
    match hazard {
        RadiationHazard::Clear => 1.0,
        RadiationHazard::Mild => 1.0 / tuning.radiation.mild,
        RadiationHazard::Moderate => 1.0 / tuning.radiation.moderate,
        RadiationHazard::Severe => 0.0,
    }
}

/// Multiplier for a -5..=5 preference; never negative.
pub fn preference_modifier(preference: i32, tuning: &Tuning) -> f64 {
    (1.0 + preference as f64 * tuning.preference_scale).max(0.0)
}

/// Match between a worker and a descriptor's static affinities.
///
/// People: favorite activity, listed job, listed role, and their mean aptitude
/// for the task's traits. Robots: listed robot type.
pub fn affinity_modifier(descriptor: &TaskDescriptor, worker: &Worker, tuning: &Tuning) -> f64 {
    let a = &tuning.affinity;
    match worker {
        Worker::Person(p) => {
            let mut m = 1.0;
            if p.favorite.is_some_and(|f| descriptor.favorites().contains(&f)) {
                m *= a.favorite;
            }
            if descriptor.jobs().contains(&p.job) {
                m *= a.job;
            }
            if p.role.is_some_and(|r| descriptor.roles().contains(&r)) {
                m *= a.role;
            }
            let traits = descriptor.traits();
            if !traits.is_empty() {
                let mean = traits.iter().map(|t| p.aptitude(*t)).sum::<f64>() / traits.len() as f64;
                m *= 1.0 + a.trait_weight * (mean - 50.0) / 50.0;
            }
            m.max(0.0)
        }
        Worker::Robot(r) => {
            if descriptor.robots().contains(&r.robot_type) {
                a.robot
            } else {
                1.0
            }
        }
    }
}

/// Better performers are likelier to take on skilled work.
pub fn performance_modifier(worker: &Worker) -> f64 {
    worker.performance()
}
