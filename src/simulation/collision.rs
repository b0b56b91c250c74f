//! Candidate collection and elastic disk-disk response
//!
//! The broad phase walks every non-empty leaf of a [`SpatialIndex`] back to
//! the root and gathers the bodies stored along the way into a candidate
//! group. Disks that straddle quadrant lines are kept higher up in the tree,
//! so the chain holds every disk that may touch one in the leaf.
//!
//! Groups from different leaves share their ancestors' bodies, so a pair can
//! be looked at more than once per tick. That is harmless: the narrow phase
//! tests live distances and a pair that was already pushed apart is skipped.

use std::collections::HashSet;

use tracing::debug;

use super::quadtree::SpatialIndex;
use super::states::{Body, NVec2};

/// Relative penetration below which two disks count as merely touching.
/// `collide` leaves its pair exactly at contact, so a second call on the same
/// pair must not see an overlap again.
pub const CONTACT_TOLERANCE: f64 = 1e-9;

/// Bodies gathered from one leaf up to the root, leaf first.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CandidateGroup {
    pub leaf: usize, // node index of the leaf the walk started from
    pub members: Vec<usize>, // body indices
}

impl CandidateGroup {
    /// Every unordered pair of distinct members, in member order.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.members.iter().enumerate().flat_map(move |(k, &i)| {
            self.members[k + 1..]
                .iter()
                .filter(move |&&j| j != i)
                .map(move |&j| (i, j))
        })
    }
}

/// Build one candidate group per non-empty leaf and drop repeated groups.
///
/// Two groups are repeats when their member sequences are equal; the first
/// one (in leaf order) is kept, so the result is deterministic.
pub fn candidate_groups(tree: &SpatialIndex) -> Vec<CandidateGroup> {
    let mut seen: HashSet<Vec<usize>> = HashSet::new();
    let mut groups = Vec::new();

    for leaf in tree.leaves() {
        let members: Vec<usize> = tree
            .ancestors(leaf)
            .flat_map(|node| node.bodies.iter().copied())
            .collect();

        if seen.insert(members.clone()) {
            groups.push(CandidateGroup { leaf, members });
        }
    }
    groups
}

/// Run the narrow phase over every pair of every group.
/// Returns how many pairs were actually resolved.
pub fn resolve_groups(groups: &[CandidateGroup], bodies: &mut [Body], time_scale: f64) -> usize {
    let mut resolved = 0;
    for group in groups {
        for (i, j) in group.pairs() {
            let (a, b) = pair_mut(bodies, i, j);
            if collide(a, b, time_scale) {
                resolved += 1;
            }
        }
    }
    resolved
}

/// Broad phase plus narrow phase over a freshly built index.
///
/// Returns the processed candidate groups and the number of resolved pairs.
pub fn find_intersections(tree: &SpatialIndex, bodies: &mut [Body], time_scale: f64) -> (Vec<CandidateGroup>, usize) {
    let groups = candidate_groups(tree);
    let resolved = resolve_groups(&groups, bodies, time_scale);
    debug!(groups = groups.len(), resolved, "resolved collisions");
    (groups, resolved)
}

/// True if the two disks overlap by more than the contact tolerance.
pub fn overlapping(a: &Body, b: &Body) -> bool {
    let dist = (a.x - b.x).norm();
    let reach = a.radius() + b.radius();
    dist > 0.0 && reach - dist > CONTACT_TOLERANCE * reach
}

/// Resolve one disk-disk collision in place.
///
/// 1. Separation: both disks move half the penetration depth apart along the
///    center line, leaving them exactly in contact.
/// 2. Impulse: the velocity components along the center line follow the 1D
///    elastic collision of masses `m1`, `m2`; the tangential components are
///    kept (no friction).
/// 3. Both bodies record the collision.
///
/// Disks that do not overlap, and disks with coincident centers, are left
/// untouched. Returns whether anything changed.
pub fn collide(a: &mut Body, b: &mut Body, time_scale: f64) -> bool {
    if !overlapping(a, b) {
        return false;
    }

    // separation
    let delta = a.x - b.x;
    let dist = delta.norm();
    let reach = a.radius() + b.radius();
    let push = delta * ((reach - dist) * 0.5 / dist);
    a.x += push;
    b.x -= push;

    // unit normal from a to b, unit tangent perpendicular to it
    let normal = (b.x - a.x) / reach;
    let tangent = NVec2::new(-normal.y, normal.x);

    let (m1, m2) = (a.mass(), b.mass());
    let (t1, t2) = (a.v.dot(&tangent), b.v.dot(&tangent));
    let (n1, n2) = (a.v.dot(&normal), b.v.dot(&normal));

    let n1_new = (n1 * (m1 - m2) + 2.0 * m2 * n2) / (m1 + m2);
    let n2_new = (n2 * (m2 - m1) + 2.0 * m1 * n1) / (m1 + m2);

    a.v = tangent * t1 + normal * n1_new;
    b.v = tangent * t2 + normal * n2_new;

    a.record_collision(time_scale);
    b.record_collision(time_scale);
    true
}

/// Two distinct mutable bodies out of one slice.
fn pair_mut(bodies: &mut [Body], i: usize, j: usize) -> (&mut Body, &mut Body) {
    debug_assert_ne!(i, j);
    if i < j {
        let (lo, hi) = bodies.split_at_mut(j);
        (&mut lo[i], &mut hi[0])
    } else {
        let (lo, hi) = bodies.split_at_mut(i);
        (&mut hi[0], &mut lo[j])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::region::BoundingRegion;
    use approx::assert_relative_eq;

    fn disk(id: usize, x: f64, y: f64, vx: f64, vy: f64, r: f64) -> Body {
        Body::new(id, NVec2::new(x, y), NVec2::new(vx, vy), r).unwrap()
    }

    #[test]
    fn separation_leaves_disks_in_contact() {
        let mut a = disk(0, 0.0, 0.0, 0.0, 0.0, 5.0);
        let mut b = disk(1, 6.0, 0.0, 0.0, 0.0, 5.0);
        assert!(collide(&mut a, &mut b, 1.0));

        assert_relative_eq!((a.x - b.x).norm(), 10.0, epsilon = 1e-12);
        assert_relative_eq!(a.x.x, -2.0, epsilon = 1e-12);
        assert_relative_eq!(b.x.x, 8.0, epsilon = 1e-12);
    }

    #[test]
    fn equal_masses_swap_normal_velocity() {
        let mut a = disk(0, 0.0, 0.0, 3.0, 1.0, 5.0);
        let mut b = disk(1, 9.0, 0.0, -2.0, 0.0, 5.0);
        collide(&mut a, &mut b, 1.0);

        assert_relative_eq!(a.v.x, -2.0, epsilon = 1e-12);
        assert_relative_eq!(a.v.y, 1.0, epsilon = 1e-12);
        assert_relative_eq!(b.v.x, 3.0, epsilon = 1e-12);
        assert_relative_eq!(b.v.y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn second_call_is_a_no_op() {
        let mut a = disk(0, 0.0, 0.0, 1.0, 0.5, 5.0);
        let mut b = disk(1, 6.0, 1.0, -1.0, 0.0, 3.0);
        assert!(collide(&mut a, &mut b, 1.0));
        let (ax, av, bx, bv) = (a.x, a.v, b.x, b.v);

        assert!(!collide(&mut a, &mut b, 1.0));
        assert_eq!(a.x, ax);
        assert_eq!(a.v, av);
        assert_eq!(b.x, bx);
        assert_eq!(b.v, bv);
        assert_eq!(a.collisions, 1);
    }

    #[test]
    fn apart_and_coincident_pairs_are_skipped() {
        let mut a = disk(0, 0.0, 0.0, 1.0, 0.0, 1.0);
        let mut b = disk(1, 5.0, 0.0, -1.0, 0.0, 1.0);
        assert!(!collide(&mut a, &mut b, 1.0));
        assert_relative_eq!(a.v.x, 1.0);

        let mut c = disk(2, 3.0, 3.0, 1.0, 0.0, 2.0);
        let mut d = disk(3, 3.0, 3.0, -1.0, 0.0, 2.0);
        assert!(!collide(&mut c, &mut d, 1.0));
        assert_eq!(c.x, d.x);
        assert_eq!(c.collisions, 0);
    }

    #[test]
    fn reversed_time_uncounts_body_hits() {
        let mut a = disk(0, 0.0, 0.0, 0.0, 0.0, 5.0);
        let mut b = disk(1, 6.0, 0.0, 0.0, 0.0, 5.0);
        a.collisions = 2;
        collide(&mut a, &mut b, -1.0);
        assert_eq!(a.collisions, 1);
        assert_eq!(b.collisions, 0);
        assert!(a.collided && b.collided);
    }

    #[test]
    fn pairs_skip_self_and_keep_order() {
        let group = CandidateGroup {
            leaf: 0,
            members: vec![4, 1, 7],
        };
        let pairs: Vec<_> = group.pairs().collect();
        assert_eq!(pairs, vec![(4, 1), (4, 7), (1, 7)]);
    }

    #[test]
    fn pair_mut_handles_both_orders() {
        let mut bodies = vec![disk(0, 0.0, 0.0, 0.0, 0.0, 1.0), disk(1, 5.0, 0.0, 0.0, 0.0, 1.0)];
        let (a, b) = pair_mut(&mut bodies, 1, 0);
        assert_eq!((a.id, b.id), (1, 0));
        let (a, b) = pair_mut(&mut bodies, 0, 1);
        assert_eq!((a.id, b.id), (0, 1));
    }

    #[test]
    fn repeated_groups_are_dropped() {
        // root keeps 0 and 1; disk 2 sits on the center and lands in all
        // four quadrants, which would give four identical chains
        let bodies = vec![
            disk(0, 10.0, 10.0, 0.0, 0.0, 1.0),
            disk(1, 790.0, 590.0, 0.0, 0.0, 1.0),
            disk(2, 400.0, 300.0, 0.0, 0.0, 4.0),
        ];
        let tree = SpatialIndex::build(&bodies, BoundingRegion::world(800.0, 600.0), 2, 10.0).unwrap();
        assert_eq!(tree.leaves().len(), 4);

        let groups = candidate_groups(&tree);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].members, vec![2, 0, 1]);
        assert_eq!(groups[0].leaf, tree.leaves()[0]);
    }

    #[test]
    fn find_intersections_resolves_only_touching_pairs() {
        let mut bodies = vec![
            disk(0, 100.0, 100.0, 1.0, 0.0, 10.0),
            disk(1, 115.0, 100.0, -1.0, 0.0, 10.0),
            disk(2, 500.0, 400.0, 2.0, 2.0, 10.0),
        ];
        let tree = SpatialIndex::build(&bodies, BoundingRegion::world(800.0, 600.0), 2, 10.0).unwrap();
        let (groups, resolved) = find_intersections(&tree, &mut bodies, 1.0);

        assert!(!groups.is_empty());
        assert_eq!(resolved, 1);
        assert_relative_eq!((bodies[0].x - bodies[1].x).norm(), 20.0, epsilon = 1e-9);
        assert_relative_eq!(bodies[0].v.x, -1.0, epsilon = 1e-12);
        assert_relative_eq!(bodies[1].v.x, 1.0, epsilon = 1e-12);
        assert_eq!(bodies[2].x, NVec2::new(500.0, 400.0));
        assert_eq!(bodies[2].v, NVec2::new(2.0, 2.0));
        assert_eq!(bodies[2].collisions, 0);
    }
}
