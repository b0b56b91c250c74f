//! Core state types for the disk simulation.
//!
//! Defines the 2D disk `Body` and the `System` that owns every body together
//! with the accumulated simulated time `t`.

use std::hash::{Hash, Hasher};

use nalgebra::Vector2;

use crate::error::{SimError, SimResult};

pub type NVec2 = Vector2<f64>;

/// Mass per unit of radius. Mass is always derived from the radius.
pub const MASS_PER_RADIUS: f64 = 10.0;

#[derive(Debug, Clone)]
pub struct Body {
    pub id: usize, // stable identity, used for equality and hashing
    pub x: NVec2, // position of the center
    pub v: NVec2, // velocity per unit of time scale
    radius: f64,
    m: f64,
    pub collisions: u32, // wall + body collisions recorded so far
    pub collided: bool, // flips on every recorded collision
}

impl Body {
    /// Build a body, rejecting radii and states that would poison the solver.
    pub fn new(id: usize, x: NVec2, v: NVec2, radius: f64) -> SimResult<Self> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(SimError::InvalidRadius { id, radius });
        }
        if !(x.x.is_finite() && x.y.is_finite()) {
            return Err(SimError::NonFiniteState { id, field: "position" });
        }
        if !(v.x.is_finite() && v.y.is_finite()) {
            return Err(SimError::NonFiniteState { id, field: "velocity" });
        }

        Ok(Self {
            id,
            x,
            v,
            radius,
            m: radius * MASS_PER_RADIUS,
            collisions: 0,
            collided: false,
        })
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn mass(&self) -> f64 {
        self.m
    }

    /// Book-keeping shared by wall and body collisions.
    ///
    /// Running time forward counts a collision, running it backwards
    /// un-counts it so a reversed replay drains the counter again.
    pub fn record_collision(&mut self, time_scale: f64) {
        self.collided = !self.collided;
        if time_scale > 0.0 {
            self.collisions = self.collisions.saturating_add(1);
        } else {
            self.collisions = self.collisions.saturating_sub(1);
        }
    }

    /// Fraction of `cap` collisions reached, clamped to `[0, 1]`.
    /// Renderers use it to blend between the base and the "hot" color.
    pub fn collision_progress(&self, cap: u32) -> f64 {
        if cap == 0 {
            return 1.0;
        }
        (f64::from(self.collisions) / f64::from(cap)).min(1.0)
    }
}

impl PartialEq for Body {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Body {}

impl Hash for Body {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[derive(Debug, Clone, Default)]
pub struct System {
    pub bodies: Vec<Body>, // every live disk, indexed by position in this vec
    pub t: f64, // simulated time, runs backwards with a negative time scale
}

impl System {
    pub fn new(bodies: Vec<Body>) -> Self {
        Self { bodies, t: 0.0 }
    }

    /// Id for the next spawned body. Bodies are only ever popped from the
    /// back, so the length never collides with a live id.
    pub fn next_id(&self) -> usize {
        self.bodies.len()
    }
}
