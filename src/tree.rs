//! Vantage-point tree: construction and best-first nearest-neighbor search.
//!
//! Each node picks a random vantage point from its elements and splits them
//! by the median distance `mu`: elements at distance `<= mu` go to the inner
//! child, the rest to the outer child. Leaves hold exactly one point.
//!
//! Search is a **heuristic ranking, not a pruned tree search**: every node
//! is visited, scored by `(1 / (1 + d)) / elements_count` (closer vantage
//! point and smaller subtree both score higher), and results are extracted
//! from the score ranking leaf-first. Runtime per query is therefore linear
//! in tree size; the payoff is the ranking, not asymptotics.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicUsize, Ordering::Relaxed};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{Result, VpTreeError};
use crate::median::median;
use crate::point::Point;

/// One node of the vantage-point tree.
///
/// The root owns the whole tree; children are exclusively owned and there
/// are no parent references. A node is a *leaf* iff it holds exactly one
/// element, otherwise it is a *branch* with at least one child. Nothing is
/// mutated after construction (the search-cycle diagnostic aside), so a
/// built tree can serve concurrent read-only queries.
pub struct Node {
    level: usize,
    elements: Vec<Point>,
    vantage_point: Point,
    mu: f64,
    inner: Option<Box<Node>>,
    outer: Option<Box<Node>>,
    last_search_cycles: AtomicUsize,
}

impl Node {
    /// Build a tree from `points`, seeding vantage-point selection from the
    /// thread RNG.
    ///
    /// Exact structural duplicates are removed before construction; the
    /// first occurrence of each point is kept.
    pub fn new(points: Vec<Point>) -> Result<Self> {
        let seed = rand::rng().random();
        Self::with_seed(points, seed)
    }

    /// Build a tree with a fixed seed, for reproducible shapes.
    ///
    /// Randomness is consumed only during construction; two trees built from
    /// the same points and seed are structurally identical.
    pub fn with_seed(points: Vec<Point>, seed: u64) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::build(dedup(points), 0, &mut rng)
    }

    fn build(elements: Vec<Point>, level: usize, rng: &mut StdRng) -> Result<Self> {
        if elements.is_empty() {
            return Err(VpTreeError::EmptyInput);
        }

        let vantage_point = elements[rng.random_range(0..elements.len())].clone();

        // Distances from the vantage point to every element, the vantage
        // point itself included (distance 0).
        let mut distances = Vec::with_capacity(elements.len());
        for element in &elements {
            distances.push(element.distance_to(&vantage_point)?);
        }
        let mu = median(&distances);

        let mut node = Node {
            level,
            elements,
            vantage_point,
            mu,
            inner: None,
            outer: None,
            last_search_cycles: AtomicUsize::new(0),
        };

        if node.is_branch() {
            let (inner, outer) = node.partition(&distances);
            if !inner.is_empty() {
                node.inner = Some(Box::new(Self::build(inner, level + 1, rng)?));
            }
            if !outer.is_empty() {
                node.outer = Some(Box::new(Self::build(outer, level + 1, rng)?));
            }
        }

        Ok(node)
    }

    /// Split the elements into inner (`d <= mu`) and outer (`d > mu`) sets.
    ///
    /// When every distance ties at or below `mu` (all non-vantage elements
    /// equidistant from the vantage point), the inner set would equal the
    /// whole element set and the recursion would never shrink. That case
    /// falls back to a strict split at `mu`, which always separates the
    /// vantage point from the farthest elements.
    fn partition(&self, distances: &[f64]) -> (Vec<Point>, Vec<Point>) {
        let split = |inner_bound: fn(f64, f64) -> bool| {
            let mut inner = Vec::new();
            let mut outer = Vec::new();
            for (element, &d) in self.elements.iter().zip(distances) {
                if inner_bound(d, self.mu) {
                    inner.push(element.clone());
                } else {
                    outer.push(element.clone());
                }
            }
            (inner, outer)
        };

        let (inner, outer) = split(|d, mu| d <= mu);
        if outer.is_empty() {
            return split(|d, mu| d < mu);
        }
        (inner, outer)
    }

    /// The elements owned by this node's subtree.
    pub fn elements(&self) -> &[Point] {
        &self.elements
    }

    /// The sole element, if this node is a leaf.
    pub fn element(&self) -> Option<&Point> {
        if self.is_leaf() {
            self.elements.first()
        } else {
            None
        }
    }

    /// The vantage point chosen for this node.
    pub fn vantage_point(&self) -> &Point {
        &self.vantage_point
    }

    /// Median distance from the vantage point to this node's elements.
    pub fn mu(&self) -> f64 {
        self.mu
    }

    /// Depth of this node; 0 at the root.
    pub fn level(&self) -> usize {
        self.level
    }

    /// True iff this node holds exactly one element.
    pub fn is_leaf(&self) -> bool {
        self.elements.len() == 1
    }

    pub fn is_branch(&self) -> bool {
        !self.is_leaf()
    }

    pub fn has_inner_child(&self) -> bool {
        self.inner.is_some()
    }

    pub fn inner_child(&self) -> Option<&Node> {
        self.inner.as_deref()
    }

    pub fn has_outer_child(&self) -> bool {
        self.outer.is_some()
    }

    pub fn outer_child(&self) -> Option<&Node> {
        self.outer.as_deref()
    }

    pub fn elements_count(&self) -> usize {
        self.elements.len()
    }

    /// Nodes visited by the most recent search on this node.
    ///
    /// Since the search never prunes, this equals the total node count of
    /// the subtree after any completed query.
    pub fn last_search_cycles(&self) -> usize {
        self.last_search_cycles.load(Relaxed)
    }

    /// The single best-ranked point for `query`.
    ///
    /// Equivalent to taking the first result of [`find_nearest`] with a
    /// count of 1: only leaves are extracted from the ranking.
    ///
    /// [`find_nearest`]: Node::find_nearest
    pub fn find_nearest_one(&self, query: &Point) -> Result<Point> {
        self.find_nearest(query, 1)?
            .into_iter()
            .next()
            // A built tree holds at least one element, so at least one leaf
            // is always ranked.
            .ok_or(VpTreeError::EmptyInput)
    }

    /// Up to `count` points ranked best-first for `query`.
    ///
    /// Results are ordered by descending heuristic score at extraction time,
    /// not by true distance; ties break by ranking insertion order. Fewer
    /// than `count` points are returned only when the tree holds fewer.
    ///
    /// Fails with [`VpTreeError::InvalidCount`] when `count` is zero and
    /// propagates [`VpTreeError::DimensionMismatch`] when `query` does not
    /// match the tree's dimension labels.
    pub fn find_nearest(&self, query: &Point, count: usize) -> Result<Vec<Point>> {
        if count == 0 {
            return Err(VpTreeError::InvalidCount(count));
        }

        let mut ranking = self.rank_nodes(query)?;
        let mut found = Vec::with_capacity(count.min(self.elements_count()));
        while found.len() < count {
            let Some(ranked) = ranking.pop() else { break };
            // Branch nodes are ranked too, but only leaves yield results.
            if let Some(element) = ranked.node.element() {
                found.push(element.clone());
            }
        }
        Ok(found)
    }

    /// Visit every node best-first and rank it for extraction.
    ///
    /// The frontier dequeues the deepest pending node first; children are
    /// enqueued with their parent's frontier priority. No subtree is ever
    /// skipped, so the visit counter ends at the subtree's node count.
    fn rank_nodes(&self, query: &Point) -> Result<BinaryHeap<Ranked<'_>>> {
        self.last_search_cycles.store(0, Relaxed);

        let mut seq = 0_usize;
        let mut next_seq = || {
            seq += 1;
            seq
        };

        let mut frontier = BinaryHeap::new();
        let mut ranking = BinaryHeap::new();
        frontier.push(Pending {
            level: self.level,
            seq: next_seq(),
            node: self,
        });

        while let Some(pending) = frontier.pop() {
            self.last_search_cycles.fetch_add(1, Relaxed);

            let node = pending.node;
            let distance = query.distance_to(&node.vantage_point)?;
            let score = (1.0 / (1.0 + distance)) / node.elements_count() as f64;
            ranking.push(Ranked {
                score,
                seq: next_seq(),
                node,
            });

            for child in [node.inner.as_deref(), node.outer.as_deref()]
                .into_iter()
                .flatten()
            {
                frontier.push(Pending {
                    level: node.level,
                    seq: next_seq(),
                    node: child,
                });
            }
        }

        Ok(ranking)
    }
}

/// Frontier entry: deepest level first, then FIFO among equals.
struct Pending<'a> {
    level: usize,
    seq: usize,
    node: &'a Node,
}

impl Ord for Pending<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.level
            .cmp(&other.level)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Pending<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Pending<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Pending<'_> {}

/// Ranking entry: highest score first, then FIFO among equals.
struct Ranked<'a> {
    score: f64,
    seq: usize,
    node: &'a Node,
}

impl Ord for Ranked<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Ranked<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Ranked<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranked<'_> {}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("level", &self.level)
            .field("elements", &self.elements.len())
            .field("vantage_point", &self.vantage_point)
            .field("mu", &self.mu)
            .field("inner", &self.inner)
            .field("outer", &self.outer)
            .finish()
    }
}

/// Keep the first occurrence of each structurally equal point.
fn dedup(points: Vec<Point>) -> Vec<Point> {
    let mut unique: Vec<Point> = Vec::with_capacity(points.len());
    for point in points {
        if !unique.contains(&point) {
            unique.push(point);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(values: &[&[f64]]) -> Vec<Point> {
        values.iter().map(|v| Point::from_values(v)).collect()
    }

    fn count_nodes(node: &Node) -> usize {
        1 + node.inner_child().map_or(0, count_nodes) + node.outer_child().map_or(0, count_nodes)
    }

    #[test]
    fn empty_input_is_rejected() {
        assert_eq!(Node::new(Vec::new()).unwrap_err(), VpTreeError::EmptyInput);
    }

    #[test]
    fn single_point_builds_a_leaf() {
        let tree = Node::new(points(&[&[1.0, 2.0]])).unwrap();
        assert!(tree.is_leaf());
        assert!(!tree.is_branch());
        assert_eq!(tree.level(), 0);
        assert_eq!(tree.mu(), 0.0);
        assert_eq!(tree.element(), Some(&Point::from_values(&[1.0, 2.0])));
        assert!(!tree.has_inner_child());
        assert!(!tree.has_outer_child());
    }

    #[test]
    fn branch_has_no_single_element() {
        let tree = Node::new(points(&[&[0.0], &[1.0], &[2.0]])).unwrap();
        assert!(tree.is_branch());
        assert_eq!(tree.element(), None);
        assert_eq!(tree.elements().len(), 3);
    }

    #[test]
    fn root_deduplicates_structural_duplicates() {
        let tree = Node::new(points(&[&[1.0, 1.0], &[2.0, 2.0], &[1.0, 1.0], &[1.0, 1.0]])).unwrap();
        assert_eq!(tree.elements_count(), 2);
    }

    #[test]
    fn child_levels_increase_by_one() {
        let tree = Node::with_seed(points(&[&[0.0], &[3.0], &[9.0], &[27.0]]), 7).unwrap();
        assert_eq!(tree.level(), 0);
        for child in [tree.inner_child(), tree.outer_child()].into_iter().flatten() {
            assert_eq!(child.level(), 1);
        }
    }

    #[test]
    fn branch_partition_is_complete() {
        fn check(node: &Node) {
            if node.is_branch() {
                let inner = node.inner_child().map_or(0, Node::elements_count);
                let outer = node.outer_child().map_or(0, Node::elements_count);
                assert_eq!(inner + outer, node.elements_count());
                assert!(node.has_inner_child() || node.has_outer_child());
            }
            assert!(node.mu() >= 0.0);
            for child in [node.inner_child(), node.outer_child()].into_iter().flatten() {
                check(child);
            }
        }

        let tree = Node::with_seed(
            points(&[&[0.0, 0.0], &[1.0, 5.0], &[2.0, 2.0], &[8.0, 1.0], &[4.0, 4.0]]),
            99,
        )
        .unwrap();
        check(&tree);
    }

    #[test]
    fn equidistant_elements_still_terminate() {
        // All pairwise distances are sqrt(2); naive median splitting would
        // put every element inside every split.
        let tree = Node::with_seed(
            points(&[&[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0], &[0.0, 0.0, 1.0]]),
            3,
        )
        .unwrap();
        assert_eq!(count_nodes(&tree), 5);
        assert_eq!(tree.find_nearest(&Point::from_values(&[0.0, 0.0, 0.9]), 3).unwrap().len(), 3);
    }

    #[test]
    fn same_seed_builds_the_same_shape() {
        fn shape(node: &Node) -> Vec<(usize, usize)> {
            let mut out = vec![(node.level(), node.elements_count())];
            for child in [node.inner_child(), node.outer_child()].into_iter().flatten() {
                out.extend(shape(child));
            }
            out
        }

        let pts = points(&[&[0.0], &[1.0], &[4.0], &[9.0], &[16.0], &[25.0]]);
        let a = Node::with_seed(pts.clone(), 1234).unwrap();
        let b = Node::with_seed(pts, 1234).unwrap();
        assert_eq!(shape(&a), shape(&b));
        assert_eq!(a.vantage_point(), b.vantage_point());
    }

    #[test]
    fn find_nearest_one_returns_true_nearest_in_planar_scenario() {
        // A(1,1), B(2,1), D(5,3), E(5,7); query C(2,3) is nearest to B.
        let tree = Node::new(points(&[&[1.0, 1.0], &[2.0, 1.0], &[5.0, 3.0], &[5.0, 7.0]])).unwrap();
        let nearest = tree.find_nearest_one(&Point::from_values(&[2.0, 3.0])).unwrap();
        assert_eq!(nearest, Point::from_values(&[2.0, 1.0]));
    }

    #[test]
    fn find_nearest_rejects_zero_count() {
        let tree = Node::new(points(&[&[1.0]])).unwrap();
        let query = Point::from_values(&[0.0]);
        assert_eq!(
            tree.find_nearest(&query, 0),
            Err(VpTreeError::InvalidCount(0))
        );
    }

    #[test]
    fn find_nearest_with_excess_count_returns_all_elements() {
        let pts = points(&[&[0.0, 1.0], &[3.0, 3.0], &[7.0, 0.0]]);
        let tree = Node::with_seed(pts.clone(), 11).unwrap();
        let found = tree.find_nearest(&Point::from_values(&[1.0, 1.0]), 10).unwrap();
        assert_eq!(found.len(), 3);
        for p in &pts {
            assert!(found.contains(p));
        }
    }

    #[test]
    fn dimension_mismatch_propagates_through_search() {
        let tree = Node::new(points(&[&[1.0, 1.0], &[2.0, 2.0]])).unwrap();
        let query = Point::from_values(&[1.0]);
        assert!(matches!(
            tree.find_nearest(&query, 1),
            Err(VpTreeError::DimensionMismatch { .. })
        ));
        assert!(matches!(
            tree.find_nearest_one(&query),
            Err(VpTreeError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn dimension_mismatch_aborts_construction() {
        let pts = vec![
            Point::from_values(&[1.0, 1.0]),
            Point::new(vec![("x".into(), 2.0), ("y".into(), 2.0)]),
        ];
        assert!(matches!(
            Node::new(pts),
            Err(VpTreeError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn search_visits_every_node() {
        let tree = Node::with_seed(
            points(&[&[0.0], &[1.0], &[2.0], &[5.0], &[8.0], &[13.0], &[21.0]]),
            5,
        )
        .unwrap();
        assert_eq!(tree.last_search_cycles(), 0);
        tree.find_nearest(&Point::from_values(&[3.0]), 2).unwrap();
        assert_eq!(tree.last_search_cycles(), count_nodes(&tree));
    }

    #[test]
    fn repeated_queries_are_idempotent() {
        let tree = Node::with_seed(
            points(&[&[0.0, 0.0], &[1.0, 3.0], &[4.0, 4.0], &[9.0, 1.0], &[2.0, 8.0]]),
            21,
        )
        .unwrap();
        let query = Point::from_values(&[3.0, 3.0]);
        let first = tree.find_nearest(&query, 4).unwrap();
        let second = tree.find_nearest(&query, 4).unwrap();
        assert_eq!(first, second);
    }
}
