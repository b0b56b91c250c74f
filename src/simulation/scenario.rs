//! Build a fully-initialized simulation scenario from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces the runtime bundle
//! `Scenario` containing:
//! - numerical parameters (`Parameters`)
//! - system state (`System` with bodies at t = 0)
//! - the quadtree from the most recent rebuild
//!
//! `Scenario` is also the driver a front end talks to between ticks: it can
//! pause, change the time scale, launch new bodies and remove the newest one.
//! Parameters are only reachable through setters that re-validate them.

use tracing::{info, warn};

use crate::configuration::config::{BodyConfig, ScenarioConfig};
use crate::error::{SimError, SimResult};
use crate::simulation::engine::{rebuild_index, step, TickReport};
use crate::simulation::generator::generate_bodies;
use crate::simulation::params::{validate_time_scale, Parameters};
use crate::simulation::quadtree::SpatialIndex;
use crate::simulation::states::{Body, NVec2, System};

/// Runtime bundle for one simulation run
pub struct Scenario {
    parameters: Parameters,
    pub system: System,
    pub ticks: u64, // ticks requested by the configuration
    pub paused: bool,
    index: SpatialIndex,
    indexed_bodies: usize, // body count at the last rebuild
}

impl Scenario {
    pub fn build_scenario(cfg: ScenarioConfig) -> SimResult<Self> {
        // Parameters (runtime) from WorldConfig + ParametersConfig
        let p_cfg = &cfg.parameters;
        let parameters = Parameters {
            width: cfg.world.width,
            height: cfg.world.height,
            node_capacity: p_cfg.node_capacity,
            min_region_size: p_cfg.min_region_size,
            time_scale: p_cfg.time_scale,
            max_collisions: p_cfg.max_collisions,
        };
        parameters.validate()?;

        // Bodies: generated ones first, explicit ones take the following ids
        let mut bodies = match &cfg.generator {
            Some(g_cfg) => generate_bodies(g_cfg, parameters.width, parameters.height)?,
            None => Vec::new(),
        };
        for bc in &cfg.bodies {
            let body = body_from_config(bodies.len(), bc)?;
            bodies.push(body);
        }

        for b in &bodies {
            if 2.0 * b.radius() > parameters.width.min(parameters.height) {
                warn!(body = b.id, radius = b.radius(), "body is larger than the world and can never rest inside it");
            }
        }

        info!(
            bodies = bodies.len(),
            width = parameters.width,
            height = parameters.height,
            capacity = parameters.node_capacity,
            "built scenario"
        );

        Self::new(parameters, System::new(bodies), cfg.parameters.ticks)
    }

    /// Wrap an existing system; the index is built right away.
    pub fn new(parameters: Parameters, system: System, ticks: u64) -> SimResult<Self> {
        parameters.validate()?;
        let index = rebuild_index(&system.bodies, parameters.bounds(), parameters.node_capacity, parameters.min_region_size)?;
        let indexed_bodies = system.bodies.len();
        Ok(Self {
            parameters,
            system,
            ticks,
            paused: false,
            index,
            indexed_bodies,
        })
    }

    /// Advance one tick.
    ///
    /// While paused nothing moves; the index is only rebuilt if bodies were
    /// added or removed since the last rebuild, so overlays stay current.
    pub fn tick(&mut self) -> SimResult<TickReport> {
        if self.paused {
            if self.system.bodies.len() != self.indexed_bodies {
                self.rebuild()?;
            }
            return Ok(TickReport {
                bodies: self.system.bodies.len(),
                nodes: self.index.nodes.len(),
                leaves: self.index.leaves().len(),
                ..TickReport::default()
            });
        }

        let (index, report) = step(&mut self.system, &self.parameters)?;
        self.index = index;
        self.indexed_bodies = self.system.bodies.len();
        Ok(report)
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Swap in new parameters and rebuild the index over the new bounds.
    /// On error the old parameters stay in place.
    pub fn set_parameters(&mut self, parameters: Parameters) -> SimResult<()> {
        parameters.validate()?;
        self.parameters = parameters;
        self.rebuild()
    }

    pub fn set_time_scale(&mut self, time_scale: f64) -> SimResult<()> {
        validate_time_scale(time_scale)?;
        self.parameters.time_scale = time_scale;
        Ok(())
    }

    /// Quadtree from the most recent rebuild.
    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Nudge the time scale; crossing zero reverses the simulation.
    pub fn adjust_time_scale(&mut self, delta: f64) -> SimResult<()> {
        self.set_time_scale(self.parameters.time_scale + delta)
    }

    /// Launch a body from a drag gesture.
    ///
    /// The body sits at `start`; its velocity is the drag vector divided by a
    /// tenth of the world size on each axis (integer division, as in screen
    /// pixels). Returns the new body's index.
    pub fn spawn_body(&mut self, start: NVec2, end: NVec2, radius: f64) -> SimResult<usize> {
        let drag = end - start;
        let sx = (self.parameters.width / 10.0).floor().max(1.0);
        let sy = (self.parameters.height / 10.0).floor().max(1.0);
        let v = NVec2::new(drag.x / sx, drag.y / sy);

        let body = Body::new(self.system.next_id(), start, v, radius)?;
        self.system.bodies.push(body);
        Ok(self.system.bodies.len() - 1)
    }

    /// Remove the most recently added body.
    pub fn remove_last_body(&mut self) -> Option<Body> {
        self.system.bodies.pop()
    }

    fn rebuild(&mut self) -> SimResult<()> {
        let p = &self.parameters;
        self.index = rebuild_index(&self.system.bodies, p.bounds(), p.node_capacity, p.min_region_size)?;
        self.indexed_bodies = self.system.bodies.len();
        Ok(())
    }
}

fn body_from_config(id: usize, bc: &BodyConfig) -> SimResult<Body> {
    let (x, v) = match (bc.x.as_slice(), bc.v.as_slice()) {
        ([x0, x1], [v0, v1]) => (NVec2::new(*x0, *x1), NVec2::new(*v0, *v1)),
        _ => {
            return Err(SimError::invalid_scenario(format!(
                "body {id}: `x` and `v` need exactly two components"
            )))
        }
    };
    Body::new(id, x, v, bc.radius)
}
