use std::time::Instant;

use crate::error::SimResult;
use crate::simulation::collision::{candidate_groups, overlapping};
use crate::simulation::engine::step;
use crate::simulation::params::Parameters;
use crate::simulation::quadtree::SpatialIndex;
use crate::simulation::states::{Body, NVec2, System};

/// Compare the quadtree broad phase with a plain all-pairs scan.
///
/// Both sides only *find* overlapping pairs, nothing is resolved, so the two
/// counts should agree.
pub fn bench_broad_phase() -> SimResult<()> {
    // Different system sizes to test
    let ns = [200, 400, 800, 1600, 3200, 6400];

    for n in ns {
        let params = make_params(n);
        let sys = make_system(n, &params);

        // Warm up
        let _ = quadtree_overlaps(&sys.bodies, &params)?;
        let _ = brute_force_overlaps(&sys.bodies);

        // Time all-pairs
        let t0 = Instant::now();
        let direct = brute_force_overlaps(&sys.bodies);
        let dt_direct = t0.elapsed().as_secs_f64();

        // Time quadtree
        let t1 = Instant::now();
        let (tree_pairs, candidates) = quadtree_overlaps(&sys.bodies, &params)?;
        let dt_tree = t1.elapsed().as_secs_f64();

        println!(
            "N = {n:5}, all-pairs = {dt_direct:8.6} s ({direct} hits), quadtree = {dt_tree:8.6} s ({tree_pairs} hits, {candidates} candidate pairs)"
        );
    }
    Ok(())
}

/// Time full ticks for a range of n, CSV output.
pub fn bench_tick_curve() -> SimResult<()> {
    println!("N,tick_ms");

    for n in (200..=6400).step_by(200) {
        let steps = if n <= 1600 { 5 } else { 1 };
        let params = make_params(n);
        let mut sys = make_system(n, &params);

        let t0 = Instant::now();
        for _ in 0..steps {
            step(&mut sys, &params)?;
        }
        let ms = t0.elapsed().as_secs_f64() * 1000.0 / steps as f64;

        println!("{},{:.6}", n, ms);
    }
    Ok(())
}

/// World grows with n so the density stays roughly constant
fn make_params(n: usize) -> Parameters {
    let side = (n as f64 * 400.0).sqrt().ceil().max(100.0);
    Parameters {
        width: side,
        height: side,
        ..Parameters::default()
    }
}

/// Helper to build a manual System of size `n`
fn make_system(n: usize, params: &Parameters) -> System {
    let mut bodies = Vec::with_capacity(n);

    for i in 0..n {
        let i_f = i as f64;
        // deterministic positions, no rand needed
        let r = 2.0 + (i_f * 0.31).sin().abs() * 3.0;
        let x = NVec2::new(
            r + ((i_f * 0.37).sin() * 0.5 + 0.5) * (params.width - 2.0 * r),
            r + ((i_f * 0.13).cos() * 0.5 + 0.5) * (params.height - 2.0 * r),
        );
        let v = NVec2::new((i_f * 0.07).sin() * 3.0, (i_f * 0.11).cos() * 3.0);

        if let Ok(body) = Body::new(i, x, v, r) {
            bodies.push(body);
        }
    }

    System::new(bodies)
}

fn brute_force_overlaps(bodies: &[Body]) -> usize {
    let mut hits = 0;
    for i in 0..bodies.len() {
        for j in (i + 1)..bodies.len() {
            if overlapping(&bodies[i], &bodies[j]) {
                hits += 1;
            }
        }
    }
    hits
}

/// Distinct overlapping pairs seen by the quadtree, plus the number of
/// candidate pairs it had to test.
fn quadtree_overlaps(bodies: &[Body], params: &Parameters) -> SimResult<(usize, usize)> {
    let tree = SpatialIndex::build(bodies, params.bounds(), params.node_capacity, params.min_region_size)?;
    let mut seen = std::collections::HashSet::new();
    let mut candidates = 0;

    for group in candidate_groups(&tree) {
        for (i, j) in group.pairs() {
            candidates += 1;
            if overlapping(&bodies[i], &bodies[j]) {
                seen.insert((i.min(j), i.max(j)));
            }
        }
    }
    Ok((seen.len(), candidates))
}
