//! Random initial bodies
//!
//! Scatters `count` disks over the world with integer radii and positions,
//! a uniformly random heading and speed components drawn from the configured
//! range. Seeded, so the same scenario always starts the same way.

use std::f64::consts::TAU;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::configuration::config::GeneratorConfig;
use crate::error::{SimError, SimResult};
use crate::simulation::states::{Body, NVec2};

/// Generate bodies with ids `0..cfg.count` inside a `width` x `height` world.
pub fn generate_bodies(cfg: &GeneratorConfig, width: f64, height: f64) -> SimResult<Vec<Body>> {
    validate(cfg, width, height)?;

    let mut rng = StdRng::seed_from_u64(cfg.seed);
    (0..cfg.count)
        .map(|id| random_body(&mut rng, id, cfg, width, height))
        .collect()
}

fn random_body(rng: &mut StdRng, id: usize, cfg: &GeneratorConfig, width: f64, height: f64) -> SimResult<Body> {
    let radius = rng.gen_range(cfg.min_radius..=cfg.max_radius);
    let r = f64::from(radius);

    let x = rng.gen_range(i64::from(radius)..=(width - r).floor() as i64) as f64;
    let y = rng.gen_range(i64::from(radius)..=(height - r).floor() as i64) as f64;

    // heading and the two speed components are drawn independently
    let angle = rng.gen_range(0.0..TAU);
    let vx = angle.cos() * rng.gen_range(cfg.min_velocity..=cfg.max_velocity);
    let vy = angle.sin() * rng.gen_range(cfg.min_velocity..=cfg.max_velocity);

    Body::new(id, NVec2::new(x, y), NVec2::new(vx, vy), r)
}

fn validate(cfg: &GeneratorConfig, width: f64, height: f64) -> SimResult<()> {
    if cfg.min_radius == 0 || cfg.min_radius > cfg.max_radius {
        return Err(SimError::invalid_scenario(format!(
            "generator radius range {}..={} is empty or starts at zero",
            cfg.min_radius, cfg.max_radius
        )));
    }
    let diameter = 2.0 * f64::from(cfg.max_radius);
    if diameter > width || diameter > height {
        return Err(SimError::invalid_scenario(format!(
            "generator max_radius {} does not fit a {}x{} world",
            cfg.max_radius, width, height
        )));
    }
    if !(cfg.min_velocity.is_finite() && cfg.max_velocity.is_finite()) || cfg.min_velocity > cfg.max_velocity {
        return Err(SimError::invalid_scenario(format!(
            "generator velocity range {}..={} is invalid",
            cfg.min_velocity, cfg.max_velocity
        )));
    }
    Ok(())
}
