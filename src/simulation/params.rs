//! Numerical and world parameters for the simulation
//!
//! `Parameters` holds runtime settings:
//! - world size (the walls sit at `0` and `width` / `height`),
//! - quadtree node capacity and the minimum region size that may still split,
//! - the global time scale (negative runs time backwards),
//! - the collision count at which renderers saturate the body color

use crate::error::{SimError, SimResult};
use crate::simulation::quadtree::validate_split_limits;
use crate::simulation::region::BoundingRegion;

#[derive(Debug, Clone)]
pub struct Parameters {
    pub width: f64, // world width
    pub height: f64, // world height
    pub node_capacity: usize, // bodies per node before it splits
    pub min_region_size: f64, // regions with a shorter longest side never split
    pub time_scale: f64, // displacement multiplier per tick
    pub max_collisions: u32, // presentation only
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            node_capacity: 2,
            min_region_size: 10.0,
            time_scale: 1.0,
            max_collisions: 50,
        }
    }
}

impl Parameters {
    pub fn bounds(&self) -> BoundingRegion {
        BoundingRegion::world(self.width, self.height)
    }

    /// Reject parameters that would make the tree or the integrator misbehave.
    ///
    /// `min_region_size` must be positive: quartering eventually produces
    /// zero-sized regions, and only the size threshold stops the recursion
    /// when more than `node_capacity` disks share one spot.
    pub fn validate(&self) -> SimResult<()> {
        if !(self.width.is_finite() && self.width > 0.0 && self.height.is_finite() && self.height > 0.0) {
            return Err(SimError::invalid_params(format!(
                "world size must be finite and positive, got {}x{}",
                self.width, self.height
            )));
        }
        validate_split_limits(self.node_capacity, self.min_region_size)?;
        validate_time_scale(self.time_scale)
    }
}

pub fn validate_time_scale(time_scale: f64) -> SimResult<()> {
    if !time_scale.is_finite() {
        return Err(SimError::invalid_params(format!("time_scale must be finite, got {time_scale}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let p = Parameters::default();
        assert!(p.validate().is_ok());
        assert_eq!(p.bounds(), BoundingRegion::new(0.0, 0.0, 800.0, 600.0));
    }

    #[test]
    fn rejects_degenerate_values() {
        let mut p = Parameters::default();
        p.node_capacity = 0;
        assert!(p.validate().is_err());

        let mut p = Parameters::default();
        p.min_region_size = 0.0;
        assert!(p.validate().is_err());

        let mut p = Parameters::default();
        p.width = -1.0;
        assert!(p.validate().is_err());

        let mut p = Parameters::default();
        p.min_region_size = f64::NAN;
        assert!(p.validate().is_err());

        let mut p = Parameters::default();
        p.time_scale = f64::NAN;
        assert!(p.validate().is_err());
        assert!(validate_time_scale(f64::INFINITY).is_err());
        assert!(validate_time_scale(-0.5).is_ok());
    }
}
