//! Iterative minimum-energy boundary search
//!
//! Starting from the outline of a user stroke, repeatedly reroutes the
//! boundary through the band between that outline and the current object
//! contour, along the closed path whose color difference stays closest to
//! the mean difference of the current boundary.
//!
//! Each iteration:
//!
//! 1. cuts the band open between the nearest outline/contour points;
//! 2. runs a multi-source Dijkstra from the cut seeds over the band;
//! 3. keeps the cheapest closed loop of at least `min_length` points;
//! 4. fills the loop into the new mask and recomputes the energy.
//!
//! A loop is only committed when it is cheaper than the current boundary.
//! The search ends when none is, after `max_stalls` consecutive iterations
//! that fail to lower the energy by the stall ratio, or when a step
//! degenerates.

use crate::cut::{Cut, shortest_cut};
use crate::energy::{SeamField, SeamMetric};
use crate::error::{CutError, CutResult};
use crate::frontier::{CostFrontier, PredecessorGrid};
use splice_core::{Mask, Point, RgbRaster};
use splice_morph::{contour, list_points, or, plot, xor};
use splice_region::fill_inside;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, trace, warn};

/// Default minimum number of points in an accepted loop
pub const DEFAULT_MIN_LENGTH: usize = 50;

/// Default energy ratio below which an iteration counts as a stall
pub const DEFAULT_STALL_RATIO: f64 = 1.05;

/// Default number of consecutive stalls that ends the refinement
pub const DEFAULT_MAX_STALLS: u32 = 2;

/// Options for [`BoundaryCutSolver`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverOptions {
    /// Shortest loop accepted as a boundary
    pub min_length: usize,
    /// Difference measure between source and target
    pub metric: SeamMetric,
    /// An iteration stalls when `old_energy / energy` is below this
    pub stall_ratio: f64,
    /// Consecutive stalls before stopping
    pub max_stalls: u32,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            min_length: DEFAULT_MIN_LENGTH,
            metric: SeamMetric::default(),
            stall_ratio: DEFAULT_STALL_RATIO,
            max_stalls: DEFAULT_MAX_STALLS,
        }
    }
}

impl SolverOptions {
    /// Set the minimum loop length
    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_length = min_length;
        self
    }

    /// Set the seam metric
    pub fn with_metric(mut self, metric: SeamMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Set the stall ratio
    pub fn with_stall_ratio(mut self, stall_ratio: f64) -> Self {
        self.stall_ratio = stall_ratio;
        self
    }

    /// Set the number of consecutive stalls that ends the search
    pub fn with_max_stalls(mut self, max_stalls: u32) -> Self {
        self.max_stalls = max_stalls;
        self
    }
}

/// Why a refinement stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefineOutcome {
    /// Energy stopped improving
    Converged,
    /// The cancellation flag was raised
    Cancelled,
    /// Outline or contour had no points to cut between
    EmptyCut,
    /// No target was reached by a path closing on its own start
    NoClosedLoop,
    /// Every closed loop was shorter than the minimum length
    LoopTooShort,
}

/// Result of [`BoundaryCutSolver::refine`]
#[derive(Debug, Clone)]
pub struct Refinement {
    /// Last committed mask
    pub mask: Mask,
    /// Contour of `mask`
    pub contour: Mask,
    /// Seam energy of `contour`
    pub energy: f64,
    /// Number of accepted loops
    pub iterations: u32,
    /// Why the search stopped
    pub outcome: RefineOutcome,
}

/// Per-search scratch buffers, reused across iterations
struct SearchState {
    width: u32,
    links: PredecessorGrid,
    best: Vec<f64>,
    settled: Vec<bool>,
}

impl SearchState {
    fn new(width: u32, height: u32) -> Self {
        let n = (width as usize) * (height as usize);
        Self {
            width,
            links: PredecessorGrid::new(width, height),
            best: vec![f64::INFINITY; n],
            settled: vec![false; n],
        }
    }

    fn reset(&mut self) {
        self.links.reset();
        self.best.fill(f64::INFINITY);
        self.settled.fill(false);
    }

    #[inline]
    fn index(&self, p: Point) -> usize {
        p.y as usize * self.width as usize + p.x as usize
    }
}

/// Boundary refinement between a stroke outline and an object contour
#[derive(Debug, Clone)]
pub struct BoundaryCutSolver {
    field: SeamField,
    options: SolverOptions,
}

impl BoundaryCutSolver {
    /// Create a solver for aligned source and target images
    ///
    /// # Errors
    ///
    /// Returns an error if the images differ in size or `min_length` is 0.
    pub fn new(source: &RgbRaster, target: &RgbRaster, options: SolverOptions) -> CutResult<Self> {
        if options.min_length == 0 {
            return Err(CutError::InvalidParameters(
                "min_length must be at least 1".to_string(),
            ));
        }
        let field = SeamField::new(source, target, options.metric)?;
        Ok(Self { field, options })
    }

    /// Solver options
    pub fn options(&self) -> &SolverOptions {
        &self.options
    }

    /// The difference field the seam cost is measured on
    pub fn field(&self) -> &SeamField {
        &self.field
    }

    /// Refine the boundary drawn by `stroke` against the object `mask`
    ///
    /// # Arguments
    ///
    /// * `mask` - Current object mask
    /// * `stroke` - User stroke; its filled outline is the starting boundary
    /// * `cancel` - Polled once per iteration and once per frontier pop
    ///
    /// # Returns
    ///
    /// The last committed mask and contour. A blank stroke returns `mask`
    /// unchanged with [`RefineOutcome::EmptyCut`].
    ///
    /// # Errors
    ///
    /// Returns an error if `mask` or `stroke` do not match the image size.
    pub fn refine(&self, mask: &Mask, stroke: &Mask, cancel: &AtomicBool) -> CutResult<Refinement> {
        self.field.check_same_size(mask)?;
        mask.check_same_size(stroke)?;
        let (w, h) = mask.dimensions();

        if stroke.is_blank() {
            let outline = contour(mask);
            let omega = list_points(&outline);
            let k = self.field.reference_level(&omega);
            return Ok(Refinement {
                mask: mask.clone(),
                energy: self.field.energy(&omega, k),
                contour: outline,
                iterations: 0,
                outcome: RefineOutcome::EmptyCut,
            });
        }

        let inner = list_points(&contour(mask));
        let mut outline = contour(&fill_inside(stroke));
        let mut current = fill_inside(&outline);
        let mut band = or(&xor(&current, mask), &outline);
        let mut omega = list_points(&outline);
        let mut k = self.field.reference_level(&omega);
        let mut energy = self.field.energy(&omega, k);
        debug!(k, energy, points = omega.len(), "initial boundary");

        let mut state = SearchState::new(w, h);
        let mut iterations = 0u32;
        let mut stalls = 0u32;

        let outcome = loop {
            if cancel.load(Ordering::Relaxed) {
                break RefineOutcome::Cancelled;
            }

            let cut = shortest_cut(&omega, &inner, w, h);
            if cut.is_empty() {
                break RefineOutcome::EmptyCut;
            }

            if !self.search(&cut, &band, k, &mut state, cancel) {
                break RefineOutcome::Cancelled;
            }

            let (loop_energy, boundary) = match self.select_loop(&cut, &state.links, k) {
                Ok(found) => found,
                Err(outcome) => break outcome,
            };
            // Rerunning from an unchanged boundary finds the same loop
            if loop_energy >= energy {
                debug!(loop_energy, energy, "no cheaper loop, keeping boundary");
                break RefineOutcome::Converged;
            }

            let loop_mask = plot(&boundary, w, h)?;
            let inside = fill_inside(&loop_mask);
            outline = contour(&inside);
            band = or(&xor(&inside, mask), &loop_mask);
            current = inside;
            omega = list_points(&outline);

            let old_energy = energy;
            k = self.field.reference_level(&omega);
            energy = self.field.energy(&omega, k);
            iterations += 1;
            debug!(
                iteration = iterations,
                k,
                energy,
                loop_len = boundary.len(),
                "boundary rerouted"
            );

            if old_energy - energy <= 0.0 || old_energy / energy < self.options.stall_ratio {
                stalls += 1;
            } else {
                stalls = 0;
            }
            if stalls >= self.options.max_stalls {
                break RefineOutcome::Converged;
            }
        };

        debug!(?outcome, iterations, energy, "refinement finished");
        Ok(Refinement {
            mask: current,
            contour: outline,
            energy,
            iterations,
            outcome,
        })
    }

    /// Multi-source Dijkstra from the cut seeds over `band`
    ///
    /// Returns false if cancelled.
    fn search(
        &self,
        cut: &Cut,
        band: &Mask,
        k: f64,
        state: &mut SearchState,
        cancel: &AtomicBool,
    ) -> bool {
        state.reset();
        let mut targets = Mask::new_like(band);
        for &t in &cut.targets {
            targets.put(t, 1);
        }

        let mut frontier = CostFrontier::new();
        for &s in &cut.seeds {
            if !band.contains(s.x, s.y) {
                continue;
            }
            let cost = self.field.cost(s, k);
            let i = state.index(s);
            state.best[i] = cost;
            state.links.set_root(s);
            frontier.push(s, cost);
        }

        let mut pops = 0usize;
        while let Some((p, cost)) = frontier.pop() {
            if cancel.load(Ordering::Relaxed) {
                return false;
            }
            let i = state.index(p);
            if state.settled[i] || cost > state.best[i] {
                continue;
            }
            state.settled[i] = true;
            pops += 1;

            for (dir, q) in p.neighbors8().into_iter().enumerate() {
                if !band.is_set(q.x, q.y) {
                    continue;
                }
                let j = state.index(q);
                if state.settled[j] {
                    continue;
                }
                let arrived = targets.is_set(q.x, q.y);
                // A path may only land on the target side once it went around
                if arrived && !state.links.is_long_path(p, self.options.min_length) {
                    continue;
                }

                let mut next = cost + self.field.cost(q, k);
                if arrived && state.links.first_point(p).distance_sq(q) > 2 {
                    next = f64::INFINITY;
                }
                if !state.links.is_reached(q) || next < state.best[j] {
                    state.best[j] = next;
                    state.links.link(q, dir);
                    frontier.push(q, next);
                }
            }
        }
        trace!(settled = pops, "frontier exhausted");
        true
    }

    /// Cheapest closed loop ending on a target
    fn select_loop(
        &self,
        cut: &Cut,
        links: &PredecessorGrid,
        k: f64,
    ) -> Result<(f64, Vec<Point>), RefineOutcome> {
        let mut best: Option<(f64, Vec<Point>)> = None;
        let mut closed = 0usize;
        for &t in &cut.targets {
            if !links.is_reached(t) || links.first_point(t).distance_sq(t) > 2 {
                continue;
            }
            closed += 1;
            let points = links.point_list(t);
            let e = self.field.energy(&points, k);
            if points.len() >= self.options.min_length && best.as_ref().is_none_or(|(be, _)| e < *be)
            {
                best = Some((e, points));
            }
        }

        match best {
            Some(found) => Ok(found),
            None if closed > 0 => {
                warn!(
                    closed,
                    min_length = self.options.min_length,
                    "every closed loop is too short"
                );
                Err(RefineOutcome::LoopTooShort)
            }
            None => Err(RefineOutcome::NoClosedLoop),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use splice_core::Rgb;

    fn disk(w: u32, h: u32, cx: i32, cy: i32, r: i32) -> Mask {
        let mut m = Mask::new(w, h).unwrap();
        for y in 0..h as i32 {
            for x in 0..w as i32 {
                if (x - cx).pow(2) + (y - cy).pow(2) <= r * r {
                    m.set_pixel_unchecked(x as u32, y as u32, 1);
                }
            }
        }
        m
    }

    fn flat_images() -> (RgbRaster, RgbRaster) {
        let img = RgbRaster::filled(60, 60, Rgb::gray(90)).unwrap();
        (img.clone(), img)
    }

    #[test]
    fn test_options_builders() {
        let o = SolverOptions::default()
            .with_min_length(10)
            .with_metric(SeamMetric::GradientMagnitude)
            .with_stall_ratio(1.1)
            .with_max_stalls(3);
        assert_eq!(o.min_length, 10);
        assert_eq!(o.metric, SeamMetric::GradientMagnitude);
        assert_eq!(o.max_stalls, 3);
        assert_eq!(SolverOptions::default().min_length, 50);
    }

    #[test]
    fn test_rejects_zero_min_length() {
        let (s, t) = flat_images();
        let opts = SolverOptions::default().with_min_length(0);
        assert!(BoundaryCutSolver::new(&s, &t, opts).is_err());
    }

    #[test]
    fn test_identical_images_settle_quickly() {
        let (s, t) = flat_images();
        let solver = BoundaryCutSolver::new(&s, &t, SolverOptions::default()).unwrap();
        let mask = disk(60, 60, 30, 30, 10);
        let stroke = disk(60, 60, 30, 30, 15);
        let cancel = AtomicBool::new(false);
        let r = solver.refine(&mask, &stroke, &cancel).unwrap();

        assert!(r.iterations <= 1);
        assert_eq!(r.outcome, RefineOutcome::Converged);
        assert_eq!(r.energy, 0.0);
        assert_eq!(r.mask, stroke);
        assert_eq!(r.contour, contour(&stroke));
    }

    #[test]
    fn test_identical_textured_images_keep_outline() {
        let mut img = RgbRaster::filled(60, 60, Rgb::gray(0)).unwrap();
        for y in 0..60u32 {
            for x in 0..60u32 {
                let v = ((x * 37 + y * 91) % 251) as u8;
                img.set_pixel_unchecked(x, y, Rgb::new(v, v / 2, 255 - v));
            }
        }
        let solver = BoundaryCutSolver::new(&img, &img, SolverOptions::default()).unwrap();
        let mask = disk(60, 60, 30, 30, 10);
        let stroke = disk(60, 60, 30, 30, 15);
        let r = solver.refine(&mask, &stroke, &AtomicBool::new(false)).unwrap();

        assert!(r.iterations <= 1);
        assert_eq!(r.mask, stroke);
        assert_eq!(r.contour, contour(&stroke));
    }

    #[test]
    fn test_short_loops_rejected() {
        let (s, t) = flat_images();
        let opts = SolverOptions::default().with_min_length(500);
        let solver = BoundaryCutSolver::new(&s, &t, opts).unwrap();
        let mask = disk(60, 60, 30, 30, 10);
        let stroke = disk(60, 60, 30, 30, 15);
        let r = solver.refine(&mask, &stroke, &AtomicBool::new(false)).unwrap();
        assert_eq!(r.iterations, 0);
        assert!(matches!(
            r.outcome,
            RefineOutcome::LoopTooShort | RefineOutcome::NoClosedLoop
        ));
        // Falls back to the filled stroke outline
        assert_eq!(r.mask, stroke);
    }

    #[test]
    fn test_single_pixel_stroke() {
        let (s, t) = flat_images();
        let solver = BoundaryCutSolver::new(&s, &t, SolverOptions::default()).unwrap();
        let mask = disk(60, 60, 30, 30, 10);
        let mut stroke = Mask::new(60, 60).unwrap();
        stroke.set_pixel_unchecked(30, 20, 1);
        let r = solver.refine(&mask, &stroke, &AtomicBool::new(false)).unwrap();
        assert_eq!(r.iterations, 0);
        assert_ne!(r.outcome, RefineOutcome::Converged);
        assert_eq!(r.mask.count_set(), 1);
    }

    #[test]
    fn test_blank_stroke_keeps_mask() {
        let (s, t) = flat_images();
        let solver = BoundaryCutSolver::new(&s, &t, SolverOptions::default()).unwrap();
        let mask = disk(60, 60, 30, 30, 10);
        let stroke = Mask::new(60, 60).unwrap();
        let r = solver.refine(&mask, &stroke, &AtomicBool::new(false)).unwrap();
        assert_eq!(r.outcome, RefineOutcome::EmptyCut);
        assert_eq!(r.mask, mask);
    }

    #[test]
    fn test_cancelled_before_start() {
        let (s, t) = flat_images();
        let solver = BoundaryCutSolver::new(&s, &t, SolverOptions::default()).unwrap();
        let mask = disk(60, 60, 30, 30, 10);
        let stroke = disk(60, 60, 30, 30, 15);
        let r = solver.refine(&mask, &stroke, &AtomicBool::new(true)).unwrap();
        assert_eq!(r.outcome, RefineOutcome::Cancelled);
        assert_eq!(r.iterations, 0);
        assert_eq!(r.mask, stroke);
    }

    #[test]
    fn test_size_mismatch() {
        let (s, t) = flat_images();
        let solver = BoundaryCutSolver::new(&s, &t, SolverOptions::default()).unwrap();
        let mask = Mask::new(10, 10).unwrap();
        assert!(solver.refine(&mask, &mask, &AtomicBool::new(false)).is_err());
    }
}
