//! # Collision Quadtree (2D)
//!
//! Broad-phase spatial index over the disks of a [`System`]. The tree is
//! thrown away and rebuilt from scratch every tick, so nodes never need to
//! be moved, merged or rebalanced.
//!
//! ## Layout
//!
//! - All nodes live in one arena (`SpatialIndex::nodes`) and refer to each
//!   other by index. Parents are plain indices, so walking from a leaf back
//!   to the root needs no shared ownership.
//! - A node starts as an empty leaf, fills up to `capacity` bodies, and on
//!   the next insertion grows exactly four children.
//! - A node that has been split keeps the bodies it already stored. Only
//!   later arrivals are pushed down, into *every* child whose region the
//!   disk touches. Large disks that straddle quadrant lines therefore end up
//!   high in the tree, or in several siblings at once.
//! - Regions whose longest side is below `min_region_size` never split, which
//!   stops runaway subdivision when many disks pile up in one spot.
//!
//! [`System`]: crate::simulation::states::System

use std::fmt::Write as _;

use tracing::{debug, trace};

use crate::error::{SimError, SimResult};
use crate::simulation::region::BoundingRegion;
use crate::simulation::states::Body;

/// Check the two knobs that bound the depth of the tree.
///
/// A zero `capacity` or a `min_region_size` that is not finite and positive
/// lets stacked disks split zero-sized regions without end.
pub fn validate_split_limits(capacity: usize, min_region_size: f64) -> SimResult<()> {
    if capacity == 0 {
        return Err(SimError::invalid_params("node_capacity must be at least 1"));
    }
    if !(min_region_size.is_finite() && min_region_size > 0.0) {
        return Err(SimError::invalid_params(format!(
            "min_region_size must be finite and positive, got {min_region_size}"
        )));
    }
    Ok(())
}

/// A single node of the quadtree.
#[derive(Debug, Clone)]
pub struct QuadNode {
    pub region: BoundingRegion,
    pub parent: Option<usize>, // index into SpatialIndex::nodes, None for the root
    pub children: Option<[usize; 4]>, // tl, tr, bl, br
    pub bodies: Vec<usize>, // indices into the body slice the tree was built from
}

impl QuadNode {
    fn new(region: BoundingRegion, parent: Option<usize>) -> Self {
        Self {
            region,
            parent,
            children: None,
            bodies: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }
}

/// Quadtree over the world bounds, rebuilt every tick.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    pub nodes: Vec<QuadNode>,
    pub root: usize,
    capacity: usize,
    min_region_size: f64,
}

impl SpatialIndex {
    /// Create an index holding only an empty root over `bounds`.
    ///
    /// # Parameters
    /// - `bounds`: region of the root node, normally the whole world.
    /// - `capacity`: bodies a node stores before it splits.
    /// - `min_region_size`: regions with a longest side below this never
    ///   split and keep accepting bodies.
    ///
    /// Fails with [`SimError::InvalidParams`] when the limits could not stop
    /// subdivision (see [`validate_split_limits`]).
    pub fn new(bounds: BoundingRegion, capacity: usize, min_region_size: f64) -> SimResult<Self> {
        validate_split_limits(capacity, min_region_size)?;
        Ok(Self {
            nodes: vec![QuadNode::new(bounds, None)],
            root: 0,
            capacity,
            min_region_size,
        })
    }

    /// Build a fresh index over `bounds` and insert every body in order.
    ///
    /// Bodies that fall entirely outside `bounds`, or only into the strip a
    /// truncated split leaves uncovered, are not stored anywhere.
    pub fn build(bodies: &[Body], bounds: BoundingRegion, capacity: usize, min_region_size: f64) -> SimResult<Self> {
        let mut tree = Self::new(bounds, capacity, min_region_size)?;
        let mut dropped = 0usize;

        for i in 0..bodies.len() {
            if !tree.insert(bodies, i) {
                dropped += 1;
            }
        }

        debug!(
            bodies = bodies.len(),
            nodes = tree.nodes.len(),
            dropped,
            "rebuilt spatial index"
        );
        Ok(tree)
    }

    /// Insert body `body_idx` of `bodies`, starting at the root.
    ///
    /// Returns `false` if the body was rejected at the root or ended up in no
    /// node at all.
    pub fn insert(&mut self, bodies: &[Body], body_idx: usize) -> bool {
        let stored = self.insert_at(self.root, bodies, body_idx);
        if !stored {
            trace!(body = bodies[body_idx].id, "body not stored in spatial index");
        }
        stored
    }

    /// Bounds covered by the root node.
    pub fn bounds(&self) -> BoundingRegion {
        self.nodes[self.root].region
    }

    /// Indices of every leaf that stores at least one body, depth-first in
    /// quadrant order (tl, tr, bl, br). Stable for equal input.
    pub fn leaves(&self) -> Vec<usize> {
        let mut out = Vec::new();
        self.collect_leaves(self.root, &mut out);
        out
    }

    /// Walk from `node_idx` up to and including the root.
    pub fn ancestors(&self, node_idx: usize) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: Some(node_idx),
        }
    }

    /// Region of every node, parents before children. Used for tree overlays.
    pub fn regions(&self) -> impl Iterator<Item = &BoundingRegion> + '_ {
        self.nodes.iter().map(|n| &n.region)
    }

    /// True if `body_idx` is stored in some node's body list.
    pub fn stores(&self, body_idx: usize) -> bool {
        self.nodes.iter().any(|n| n.bodies.contains(&body_idx))
    }

    /// Indented, one-line-per-node listing of the tree.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_node(self.root, 0, &mut out);
        out
    }

    // helpers ==============================================================================

    /// Recursive insertion.
    ///
    /// - Not touching this node's region: reject.
    /// - Room left, or the region is too small to split: store here.
    /// - Otherwise split (once) and forward into every child the disk
    ///   touches. A disk touching no child is silently lost for this branch.
    fn insert_at(&mut self, node_idx: usize, bodies: &[Body], body_idx: usize) -> bool {
        let region = self.nodes[node_idx].region;
        if !region.contains(&bodies[body_idx]) {
            return false;
        }

        let stored = self.nodes[node_idx].bodies.len();
        if stored < self.capacity || region.max_side() < self.min_region_size {
            self.nodes[node_idx].bodies.push(body_idx);
            return true;
        }

        let children = match self.nodes[node_idx].children {
            Some(children) => children,
            None => self.subdivide(node_idx),
        };

        let mut any = false;
        for child_idx in children {
            if self.nodes[child_idx].region.contains(&bodies[body_idx]) {
                any |= self.insert_at(child_idx, bodies, body_idx);
            }
        }
        any
    }

    /// Give `node_idx` its four children and return their indices.
    fn subdivide(&mut self, node_idx: usize) -> [usize; 4] {
        let quadrants = self.nodes[node_idx].region.quarter();
        let first = self.nodes.len();
        for region in quadrants {
            self.nodes.push(QuadNode::new(region, Some(node_idx)));
        }
        let children = [first, first + 1, first + 2, first + 3];
        self.nodes[node_idx].children = Some(children);
        children
    }

    fn collect_leaves(&self, node_idx: usize, out: &mut Vec<usize>) {
        let node = &self.nodes[node_idx];
        match node.children {
            None => {
                if !node.bodies.is_empty() {
                    out.push(node_idx);
                }
            }
            Some(children) => {
                for child in children {
                    self.collect_leaves(child, out);
                }
            }
        }
    }

    fn dump_node(&self, node_idx: usize, depth: usize, out: &mut String) {
        let node = &self.nodes[node_idx];
        let r = node.region;
        // writing into a String cannot fail
        let _ = writeln!(
            out,
            "{}Node(box=({}, {}, {}, {}), bodies={:?})",
            "\t".repeat(depth),
            r.x,
            r.y,
            r.width,
            r.height,
            node.bodies
        );
        if let Some(children) = node.children {
            for child in children {
                self.dump_node(child, depth + 1, out);
            }
        }
    }
}

/// Iterator over a node and its ancestors, ending at the root.
pub struct Ancestors<'a> {
    tree: &'a SpatialIndex,
    next: Option<usize>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a QuadNode;

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.next?;
        let node = &self.tree.nodes[idx];
        self.next = node.parent;
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::states::NVec2;

    fn disk(id: usize, x: f64, y: f64, r: f64) -> Body {
        Body::new(id, NVec2::new(x, y), NVec2::zeros(), r).unwrap()
    }

    #[test]
    fn empty_tree_is_a_single_root() {
        let tree = SpatialIndex::build(&[], BoundingRegion::world(800.0, 600.0), 2, 10.0).unwrap();
        assert_eq!(tree.nodes.len(), 1);
        assert!(tree.nodes[tree.root].is_leaf());
        assert!(tree.leaves().is_empty());
    }

    #[test]
    fn fills_root_before_splitting() {
        let bodies = vec![disk(0, 100.0, 100.0, 5.0), disk(1, 700.0, 500.0, 5.0)];
        let tree = SpatialIndex::build(&bodies, BoundingRegion::world(800.0, 600.0), 2, 10.0).unwrap();
        assert_eq!(tree.nodes.len(), 1);
        assert_eq!(tree.nodes[0].bodies, vec![0, 1]);
        assert_eq!(tree.leaves(), vec![0]);
    }

    #[test]
    fn overflow_splits_and_keeps_stored_bodies() {
        let bodies = vec![
            disk(0, 100.0, 100.0, 5.0),
            disk(1, 700.0, 500.0, 5.0),
            disk(2, 700.0, 100.0, 5.0),
        ];
        let tree = SpatialIndex::build(&bodies, BoundingRegion::world(800.0, 600.0), 2, 10.0).unwrap();

        assert_eq!(tree.nodes.len(), 5);
        let children = tree.nodes[0].children.unwrap();
        assert_eq!(tree.nodes[0].bodies, vec![0, 1]);
        // third disk lands in the top-right quadrant only
        assert_eq!(tree.nodes[children[1]].bodies, vec![2]);
        assert_eq!(tree.leaves(), vec![children[1]]);
    }

    #[test]
    fn straddling_body_goes_into_every_touching_child() {
        let bodies = vec![
            disk(0, 10.0, 10.0, 1.0),
            disk(1, 20.0, 20.0, 1.0),
            disk(2, 400.0, 300.0, 8.0),
        ];
        let tree = SpatialIndex::build(&bodies, BoundingRegion::world(800.0, 600.0), 2, 10.0).unwrap();
        let children = tree.nodes[0].children.unwrap();
        for child in children {
            assert_eq!(tree.nodes[child].bodies, vec![2]);
        }
        assert_eq!(tree.leaves(), children.to_vec());
    }

    #[test]
    fn small_regions_stop_splitting() {
        // five disks on one spot in a region already below the threshold
        let bodies: Vec<Body> = (0..5).map(|i| disk(i, 4.0, 4.0, 1.0)).collect();
        let tree = SpatialIndex::build(&bodies, BoundingRegion::world(8.0, 8.0), 2, 10.0).unwrap();
        assert_eq!(tree.nodes.len(), 1);
        assert_eq!(tree.nodes[0].bodies.len(), 5);
    }

    #[test]
    fn ancestors_walk_to_root() {
        let bodies: Vec<Body> = vec![
            disk(0, 10.0, 10.0, 1.0),
            disk(1, 12.0, 12.0, 1.0),
            disk(2, 14.0, 14.0, 1.0),
            disk(3, 16.0, 16.0, 1.0),
            disk(4, 18.0, 18.0, 1.0),
        ];
        let tree = SpatialIndex::build(&bodies, BoundingRegion::world(800.0, 600.0), 2, 10.0).unwrap();
        let leaves = tree.leaves();
        assert_eq!(leaves.len(), 1);

        let chain: Vec<BoundingRegion> = tree.ancestors(leaves[0]).map(|n| n.region).collect();
        assert_eq!(chain.first(), Some(&tree.nodes[leaves[0]].region));
        assert_eq!(chain.last(), Some(&BoundingRegion::world(800.0, 600.0)));
        assert_eq!(chain.len(), 3);
    }

    #[test]
    fn dump_lists_every_node() {
        let bodies = vec![
            disk(0, 100.0, 100.0, 5.0),
            disk(1, 700.0, 500.0, 5.0),
            disk(2, 700.0, 100.0, 5.0),
        ];
        let tree = SpatialIndex::build(&bodies, BoundingRegion::world(800.0, 600.0), 2, 10.0).unwrap();
        let dump = tree.dump();
        assert_eq!(dump.lines().count(), 5);
        assert!(dump.starts_with("Node(box=(0, 0, 800, 600), bodies=[0, 1])"));
        assert!(dump.contains("\tNode(box=(400, 0, 400, 300), bodies=[2])"));
        assert_eq!(tree.regions().count(), 5);
    }

    #[test]
    fn split_limits_are_checked_up_front() {
        let bounds = BoundingRegion::world(128.0, 128.0);
        assert!(matches!(SpatialIndex::new(bounds, 0, 10.0), Err(SimError::InvalidParams(_))));
        assert!(matches!(SpatialIndex::new(bounds, 2, 0.0), Err(SimError::InvalidParams(_))));
        assert!(matches!(SpatialIndex::new(bounds, 2, -1.0), Err(SimError::InvalidParams(_))));
        assert!(matches!(SpatialIndex::new(bounds, 2, f64::NAN), Err(SimError::InvalidParams(_))));
        assert!(SpatialIndex::new(bounds, 1, 0.5).is_ok());
    }
}
