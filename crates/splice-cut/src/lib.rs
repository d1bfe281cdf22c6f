//! splice-cut - Minimum-energy seam search for boundary refinement
//!
//! Given an object mask and a user stroke around it, finds the closed
//! boundary inside the band between them along which source and target
//! differ most uniformly, so the pasted object blends in with the least
//! visible seam.
//!
//! - [`shortest_cut`] opens the band between two contours
//! - [`CostFrontier`] / [`PredecessorGrid`] back the graph search
//! - [`SeamField`] measures the per-pixel difference and seam energy
//! - [`BoundaryCutSolver`] iterates search and rebuild until convergence
//!
//! # Example
//!
//! ```
//! use splice_core::Point;
//! use splice_cut::shortest_cut;
//!
//! let outer = [Point::new(2, 5)];
//! let inner = [Point::new(6, 5)];
//! let cut = shortest_cut(&outer, &inner, 20, 20);
//! assert_eq!(cut.seeds.len(), 5);
//! assert!(!cut.targets.is_empty());
//! ```

pub mod cut;
pub mod energy;
mod error;
pub mod frontier;
pub mod solver;

pub use error::{CutError, CutResult};

// Re-export cut construction and search structures
pub use cut::{Cut, shortest_cut};
pub use energy::{SeamField, SeamMetric};
pub use frontier::{CostFrontier, PredecessorGrid};

// Re-export the solver
pub use solver::{
    BoundaryCutSolver, DEFAULT_MAX_STALLS, DEFAULT_MIN_LENGTH, DEFAULT_STALL_RATIO,
    RefineOutcome, Refinement, SolverOptions,
};
