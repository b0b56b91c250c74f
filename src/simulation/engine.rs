//! Per-tick pipeline
//!
//! One tick is: move + wall bounce → rebuild the quadtree → collect candidate
//! groups → resolve overlapping pairs. Each phase runs to completion before
//! the next starts.

use tracing::debug;

use crate::error::SimResult;
use crate::simulation::collision::{find_intersections, CandidateGroup};
use crate::simulation::integrator::integrate_system;
use crate::simulation::params::Parameters;
use crate::simulation::quadtree::SpatialIndex;
use crate::simulation::region::BoundingRegion;
use crate::simulation::states::{Body, System};

/// What happened during one tick, for logs and diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub bodies: usize,
    pub nodes: usize,
    pub leaves: usize,
    pub groups: usize,
    pub resolved_pairs: usize,
    pub wall_hits: u32,
}

/// Build a fresh quadtree over `bounds` holding every body.
///
/// Errors if `capacity` or `min_region_size` cannot bound the tree depth.
pub fn rebuild_index(
    bodies: &[Body],
    bounds: BoundingRegion,
    capacity: usize,
    min_region_size: f64,
) -> SimResult<SpatialIndex> {
    SpatialIndex::build(bodies, bounds, capacity, min_region_size)
}

/// Resolve every overlapping pair the index proposes.
/// Returns the candidate groups that were processed.
pub fn resolve_collisions(index: &SpatialIndex, bodies: &mut [Body], time_scale: f64) -> Vec<CandidateGroup> {
    find_intersections(index, bodies, time_scale).0
}

/// Run one full tick on `sys` and return the index it ended with.
///
/// `params` is validated before anything moves, so a rejected tick leaves
/// `sys` untouched.
pub fn step(sys: &mut System, params: &Parameters) -> SimResult<(SpatialIndex, TickReport)> {
    params.validate()?;
    let bounds = params.bounds();
    let wall_hits = integrate_system(sys, &bounds, params.time_scale);

    let index = rebuild_index(&sys.bodies, bounds, params.node_capacity, params.min_region_size)?;
    let (groups, resolved_pairs) = find_intersections(&index, &mut sys.bodies, params.time_scale);

    let report = TickReport {
        bodies: sys.bodies.len(),
        nodes: index.nodes.len(),
        leaves: index.leaves().len(),
        groups: groups.len(),
        resolved_pairs,
        wall_hits,
    };
    debug!(t = sys.t, ?report, "tick");
    Ok((index, report))
}
