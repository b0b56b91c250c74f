//! Fixed-step motion for the disk system
//!
//! Moves every body by its velocity scaled with the global time scale and
//! reflects it off the world walls. Negative time scales run the motion
//! backwards.

use super::region::BoundingRegion;
use super::states::{Body, System};

impl Body {
    /// Drift: x += v * time_scale
    pub fn advance(&mut self, time_scale: f64) {
        self.x += self.v * time_scale;
    }

    /// Clamp the body back inside `bounds` and reflect its velocity.
    ///
    /// Each axis is handled on its own, so a body pushed into a corner
    /// records two collisions. Returns the number of walls hit.
    pub fn resolve_wall_bounds(&mut self, bounds: &BoundingRegion, time_scale: f64) -> u32 {
        let r = self.radius();
        let mut hits = 0;

        // x axis
        let (min_x, max_x) = (bounds.x, bounds.x + bounds.width);
        if !(min_x + r <= self.x.x && self.x.x <= max_x - r) {
            if self.x.x - r < min_x {
                self.x.x = min_x + r;
            } else if self.x.x + r > max_x {
                self.x.x = max_x - r;
            }
            self.record_collision(time_scale);
            self.v.x = -self.v.x;
            hits += 1;
        }

        // y axis
        let (min_y, max_y) = (bounds.y, bounds.y + bounds.height);
        if !(min_y + r <= self.x.y && self.x.y <= max_y - r) {
            if self.x.y - r < min_y {
                self.x.y = min_y + r;
            } else if self.x.y + r > max_y {
                self.x.y = max_y - r;
            }
            self.record_collision(time_scale);
            self.v.y = -self.v.y;
            hits += 1;
        }

        hits
    }
}

/// Advance every body by one tick and resolve wall collisions.
/// Returns the total number of wall hits this tick.
pub fn integrate_tick(bodies: &mut [Body], bounds: &BoundingRegion, time_scale: f64) -> u32 {
    let mut hits = 0;
    for b in bodies.iter_mut() {
        b.advance(time_scale);
        hits += b.resolve_wall_bounds(bounds, time_scale);
    }
    hits
}

/// Same as [`integrate_tick`] but also advances the system clock.
pub fn integrate_system(sys: &mut System, bounds: &BoundingRegion, time_scale: f64) -> u32 {
    let hits = integrate_tick(&mut sys.bodies, bounds, time_scale);
    sys.t += time_scale;
    hits
}
