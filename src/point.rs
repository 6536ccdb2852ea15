//! Labeled points and the Euclidean metric.
//!
//! A [`Point`] is an immutable, insertion-ordered mapping from dimension
//! label to coordinate. Labels may be integer indices or string names, and
//! may be mixed within one point. Two points are metric-comparable only if
//! their label sequences are identical — same labels, same order. Comparing
//! points whose labels agree as a *set* but not as a *sequence* is an error;
//! callers that want order-insensitive behavior must normalize label order
//! themselves before building a tree.

use serde::{Deserialize, Serialize};

use crate::error::{Result, VpTreeError};

/// Dimension key: an integer index or a string name.
///
/// Treated as an opaque comparable key; the metric never interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    /// Positional dimension, e.g. the axes of a plain feature vector.
    Index(u64),
    /// Named dimension, e.g. `"lat"` / `"lon"`.
    Name(String),
}

impl From<u64> for Label {
    fn from(index: u64) -> Self {
        Label::Index(index)
    }
}

impl From<usize> for Label {
    fn from(index: usize) -> Self {
        Label::Index(index as u64)
    }
}

impl From<&str> for Label {
    fn from(name: &str) -> Self {
        Label::Name(name.to_string())
    }
}

impl From<String> for Label {
    fn from(name: String) -> Self {
        Label::Name(name)
    }
}

/// An immutable point in a labeled coordinate space.
///
/// Equality is structural and order-sensitive: two points are equal iff
/// their `(label, value)` sequences are identical. Root-level deduplication
/// during tree construction uses exactly this equality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    coords: Vec<(Label, f64)>,
}

impl Point {
    /// Create a point from `(label, value)` pairs in insertion order.
    pub fn new(coords: Vec<(Label, f64)>) -> Self {
        Point { coords }
    }

    /// Create a point from plain values, labeled positionally `0..n`.
    pub fn from_values(values: &[f64]) -> Self {
        Point {
            coords: values
                .iter()
                .enumerate()
                .map(|(i, &v)| (Label::from(i), v))
                .collect(),
        }
    }

    /// The `(label, value)` pairs in insertion order.
    pub fn coordinates(&self) -> &[(Label, f64)] {
        &self.coords
    }

    /// The dimension labels in insertion order.
    pub fn dimensions(&self) -> impl Iterator<Item = &Label> {
        self.coords.iter().map(|(label, _)| label)
    }

    /// Number of dimensions.
    pub fn dimension_count(&self) -> usize {
        self.coords.len()
    }

    /// Coordinate for `label`, or `None` if the label is absent.
    pub fn coordinate(&self, label: &Label) -> Option<f64> {
        self.coords
            .iter()
            .find(|(l, _)| l == label)
            .map(|&(_, v)| v)
    }

    /// Euclidean distance to `other`.
    ///
    /// Fails with [`VpTreeError::DimensionMismatch`] when the two label
    /// sequences differ by value or by order.
    pub fn distance_to(&self, other: &Point) -> Result<f64> {
        let mismatch = self.coords.len() != other.coords.len()
            || self
                .coords
                .iter()
                .zip(&other.coords)
                .any(|((a, _), (b, _))| a != b);
        if mismatch {
            return Err(VpTreeError::DimensionMismatch {
                left: self.dimensions().cloned().collect(),
                right: other.dimensions().cloned().collect(),
            });
        }

        let sum: f64 = self
            .coords
            .iter()
            .zip(&other.coords)
            .map(|(&(_, a), &(_, b))| (a - b) * (a - b))
            .sum();
        Ok(sum.sqrt())
    }
}
