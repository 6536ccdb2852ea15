//! vantage: vantage-point tree for metric-space nearest-neighbor search.
//!
//! Builds a binary partition tree over a fixed set of labeled points: each
//! node draws a random vantage point from its elements and splits them at
//! the median distance `mu` into an inner (`<= mu`) and an outer (`> mu`)
//! child. The tree is built eagerly, is immutable afterwards, and supports
//! two query entry points, [`Node::find_nearest_one`] and
//! [`Node::find_nearest`].
//!
//! # Heuristic search, not exact search
//!
//! Queries perform a best-first traversal that visits **every** node,
//! scoring each by `(1 / (1 + d)) / elements_count` where `d` is the
//! query-to-vantage-point distance, and extract results leaf-first from
//! that ranking. There is no `mu`-based branch pruning, so per-query cost
//! is linear in tree size and results are a heuristic ranking rather than
//! guaranteed exact nearest neighbors. For moderate dimensionality and
//! well-spread data the top-ranked leaf is usually the true nearest
//! neighbor, but treat the output as approximate.
//!
//! # Example
//!
//! ```
//! use vantage::{Node, Point};
//!
//! let points = vec![
//!     Point::from_values(&[1.0, 1.0]),
//!     Point::from_values(&[2.0, 1.0]),
//!     Point::from_values(&[5.0, 3.0]),
//!     Point::from_values(&[5.0, 7.0]),
//! ];
//! let tree = Node::with_seed(points, 42)?;
//!
//! let nearest = tree.find_nearest_one(&Point::from_values(&[2.0, 3.0]))?;
//! assert_eq!(nearest, Point::from_values(&[2.0, 1.0]));
//! # Ok::<(), vantage::VpTreeError>(())
//! ```
//!
//! Construction consumes randomness once per node (seedable via
//! [`Node::with_seed`] for reproducible shapes); queries consume none and
//! take `&self`, so a built tree can be shared across threads.

pub mod error;
pub mod median;
pub mod point;
pub mod tree;

pub use error::{Result, VpTreeError};
pub use median::median;
pub use point::{Label, Point};
pub use tree::Node;
