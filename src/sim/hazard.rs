//! Hazard field for the event-driven outcome strategy
//!
//! Obstacles live in a plane where x is the lateral offset across the lane
//! and y is the approach distance to the player, who sits at y = 0. Each
//! hazard closes in along y; the player dodges by moving its evasive offset
//! along x. The first overlap latches and ends the round.

use glam::DVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::HazardTuning;
use crate::consts::HAZARD_DT;

const STEP_EPSILON: f64 = 1e-9;

/// A moving obstacle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hazard {
    pub id: u32,
    /// (lateral offset, approach distance)
    pub pos: DVec2,
    /// Closing speed along the approach axis (units/s)
    pub speed: f64,
}

/// Spawn interval at a given multiplier: shrinks as the round heats up
pub fn spawn_interval(multiplier: f64, tuning: &HazardTuning) -> f64 {
    (tuning.base_interval - multiplier * tuning.interval_slope).max(tuning.min_interval)
}

/// Owns all hazards plus the player's evasive offset
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HazardField {
    /// Active hazards (sorted by id)
    pub hazards: Vec<Hazard>,
    /// Player's lateral offset used for overlap tests
    pub evasive_offset: f64,
    /// Seconds until the next spawn
    spawn_timer: f64,
    /// Fixed steps integrated this round
    steps: u64,
    /// Set by the first hit of the round
    latched: bool,
    next_id: u32,
}

impl HazardField {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Self::default()
        }
    }

    /// Clear the field for a new round (evasive offset is kept)
    pub fn reset(&mut self, tuning: &HazardTuning) {
        self.hazards.clear();
        self.steps = 0;
        self.latched = false;
        self.spawn_timer = spawn_interval(1.0, tuning);
    }

    /// Move the evasive offset, clamped to the lane
    pub fn steer(&mut self, offset: f64, tuning: &HazardTuning) {
        if offset.is_finite() {
            self.evasive_offset = offset.clamp(-tuning.lane_half_width, tuning.lane_half_width);
        }
    }

    pub fn is_latched(&self) -> bool {
        self.latched
    }

    /// Latch a hit. Returns false if this round was already latched.
    pub fn latch(&mut self) -> bool {
        if self.latched {
            return false;
        }
        self.latched = true;
        true
    }

    /// Flight time integrated so far
    pub fn sim_time(&self) -> f64 {
        self.steps as f64 * HAZARD_DT
    }

    /// Integrate in fixed steps up to `flight_time` seconds into the flight.
    /// `multiplier_at` gives the multiplier at a flight time, so the result
    /// does not depend on how the caller slices its ticks. Returns the
    /// flight time of the step that latched a hit.
    pub fn advance_to<R, F>(
        &mut self,
        flight_time: f64,
        multiplier_at: F,
        tuning: &HazardTuning,
        rng: &mut R,
    ) -> Option<f64>
    where
        R: Rng + ?Sized,
        F: Fn(f64) -> f64,
    {
        if self.latched {
            return None;
        }
        // Tolerate rounding on a step that lands exactly on `flight_time`
        while (self.steps + 1) as f64 * HAZARD_DT <= flight_time + STEP_EPSILON {
            let multiplier = multiplier_at(self.sim_time());
            self.steps += 1;
            if self.step(HAZARD_DT, multiplier, tuning, rng) {
                return Some(self.sim_time());
            }
        }
        None
    }

    /// One fixed step: spawn, move, test overlap, cull
    fn step<R: Rng + ?Sized>(
        &mut self,
        dt: f64,
        multiplier: f64,
        tuning: &HazardTuning,
        rng: &mut R,
    ) -> bool {
        self.spawn_timer -= dt;
        if self.spawn_timer <= 0.0 {
            self.spawn(multiplier, tuning, rng);
            self.spawn_timer += spawn_interval(multiplier, tuning);
        }

        let mut hit_id = None;
        for hazard in &mut self.hazards {
            let old_y = hazard.pos.y;
            hazard.pos.y -= hazard.speed * dt;

            // Swept test so a fast hazard can't tunnel through the hit band
            let crosses_band = hazard.pos.y <= tuning.hit_depth && old_y >= -tuning.hit_depth;
            let lateral = (hazard.pos.x - self.evasive_offset).abs();
            if hit_id.is_none() && crosses_band && lateral < tuning.hit_radius {
                hit_id = Some(hazard.id);
            }
        }

        if let Some(id) = hit_id {
            self.hazards.retain(|h| h.id != id);
            log::debug!("Hazard {} hit at offset {:.2}", id, self.evasive_offset);
            return self.latch();
        }

        let before = self.hazards.len();
        self.hazards.retain(|h| h.pos.y >= -tuning.trailing_bound);
        if self.hazards.len() != before {
            log::trace!("Culled {} hazards past trailing bound", before - self.hazards.len());
        }
        false
    }

    fn spawn<R: Rng + ?Sized>(&mut self, multiplier: f64, tuning: &HazardTuning, rng: &mut R) {
        let half = tuning.lane_half_width;
        let lateral = if rng.random_bool(tuning.opposite_bias) {
            let side = if self.evasive_offset > 0.0 {
                -1.0
            } else if self.evasive_offset < 0.0 {
                1.0
            } else if rng.random_bool(0.5) {
                1.0
            } else {
                -1.0
            };
            side * rng.random_range(0.0..half)
        } else {
            rng.random_range(-half..half)
        };
        let speed =
            tuning.base_speed + multiplier * tuning.speed_slope + rng.random::<f64>() * tuning.speed_noise;
        self.spawn_at(lateral, tuning.spawn_distance, speed);
    }

    fn spawn_at(&mut self, lateral: f64, distance: f64, speed: f64) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.hazards.push(Hazard {
            id,
            pos: DVec2::new(lateral, distance),
            speed,
        });
        id
    }
}
