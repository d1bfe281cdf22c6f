//! Boundary controller
//!
//! Drives one pasted object through its lifecycle: a rough mask is shown
//! immediately, user strokes start a background refinement, and every
//! refinement ends by feathering, compositing and optionally blending.
//!
//! At most one worker runs at a time. Every operation that starts work joins
//! the previous worker first; repositioning raises the moved flag so a
//! running boundary search stops at its next poll.

use crate::composite::{Composite, aligned_target};
use crate::config::{MattingConfig, RefineMethod};
use crate::error::{MattingError, MattingResult};
use crate::event::MattingEvent;
use crate::segment::{SegmentOptions, enclosed_by, hard_segmentation, label_band, stroke_region};
use splice_blend::poisson_blend;
use parking_lot::Mutex;
use splice_core::{Mask, Point, Rect, Rgb, RgbRaster};
use splice_cut::{BoundaryCutSolver, RefineOutcome};
use splice_filter::feather;
use splice_morph::{BoundaryPolicy, Sel, bounding_box, contour, dilate, erode};
use splice_region::connect_regions;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

/// Where the controller is in the lifecycle of the pasted object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControllerState {
    /// Nothing to show yet
    #[default]
    Idle,
    /// The rough segmentation is displayed
    RoughMask,
    /// A worker is refining or compositing
    Refining,
    /// The composite reflects the latest request
    Settled,
}

/// Event callback
pub type Listener = Arc<dyn Fn(MattingEvent) + Send + Sync>;

/// Everything a worker reads and commits
#[derive(Debug, Default)]
struct CompositeState {
    source: Option<RgbRaster>,
    target: Option<RgbRaster>,
    offset: Point,
    palette: Vec<Rgb>,
    rough: Option<Mask>,
    mask: Option<Mask>,
    contour: Option<Mask>,
    composite: Option<Composite>,
    state: ControllerState,
}

/// Work handed to the refinement thread
#[derive(Debug)]
enum Job {
    /// Relabel the rough mask against the palette
    Rough,
    /// Refine a user stroke with the configured method
    Correction(Mask),
    /// Paste the rough mask as is
    WholeObject,
    /// Composite the current mask again
    Recomposite,
}

/// Inputs copied out of the shared state when a worker starts
struct Snapshot {
    source: RgbRaster,
    target: RgbRaster,
    offset: Point,
    palette: Vec<Rgb>,
    rough: Option<Mask>,
    mask: Option<Mask>,
}

/// Orchestrates refinement and compositing of one pasted object
///
/// # Example
///
/// ```
/// use splice_core::{Mask, Point, Rgb, RgbRaster};
/// use splice_matting::{BoundaryController, ControllerState, MattingConfig};
///
/// let mut controller = BoundaryController::new(
///     MattingConfig::default().with_blend_mode(None).with_alpha_matting(false),
/// )
/// .unwrap();
/// controller.set_source(RgbRaster::filled(20, 20, Rgb::WHITE).unwrap());
/// controller.set_target(RgbRaster::filled(30, 30, Rgb::BLACK).unwrap());
/// controller.set_offset(Point::new(5, 5));
///
/// let mut rough = Mask::new(20, 20).unwrap();
/// rough.set_pixel(10, 10, 1).unwrap();
/// controller.transfer_whole_object().unwrap_err();
/// controller.set_rough_mask(rough).unwrap();
/// controller.transfer_whole_object().unwrap();
/// controller.wait().unwrap();
///
/// assert_eq!(controller.state(), ControllerState::Settled);
/// let out = controller.render().unwrap();
/// assert_eq!(out.get_pixel(15, 15), Some(Rgb::WHITE));
/// ```
pub struct BoundaryController {
    config: MattingConfig,
    shared: Arc<Mutex<CompositeState>>,
    listener: Arc<Mutex<Option<Listener>>>,
    moved: Arc<AtomicBool>,
    worker: Option<JoinHandle<MattingResult<()>>>,
}

impl BoundaryController {
    /// Create an idle controller
    ///
    /// # Errors
    ///
    /// Returns [`MattingError::InvalidConfig`] for an unusable configuration.
    pub fn new(config: MattingConfig) -> MattingResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            shared: Arc::new(Mutex::new(CompositeState::default())),
            listener: Arc::new(Mutex::new(None)),
            moved: Arc::new(AtomicBool::new(false)),
            worker: None,
        })
    }

    /// Current configuration
    pub fn config(&self) -> &MattingConfig {
        &self.config
    }

    /// Replace the configuration; applies to work started afterwards
    ///
    /// # Errors
    ///
    /// Returns [`MattingError::InvalidConfig`] for an unusable configuration.
    pub fn set_config(&mut self, config: MattingConfig) -> MattingResult<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Image the object is cut from
    pub fn set_source(&mut self, source: RgbRaster) {
        self.shared.lock().source = Some(source);
    }

    /// Image the object is pasted into
    pub fn set_target(&mut self, target: RgbRaster) {
        self.shared.lock().target = Some(target);
    }

    /// Position of the source origin in target coordinates
    pub fn set_offset(&mut self, offset: Point) {
        self.shared.lock().offset = offset;
    }

    /// Current paste offset
    pub fn offset(&self) -> Point {
        self.shared.lock().offset
    }

    /// Colors the source is quantized against by hard segmentation
    pub fn set_palette(&mut self, palette: Vec<Rgb>) {
        self.shared.lock().palette = palette;
    }

    /// Register the callback receiving lifecycle events
    ///
    /// Events may be delivered from the worker thread.
    pub fn set_listener<F>(&mut self, listener: F)
    where
        F: Fn(MattingEvent) + Send + Sync + 'static,
    {
        *self.listener.lock() = Some(Arc::new(listener));
    }

    /// Current lifecycle state
    pub fn state(&self) -> ControllerState {
        self.shared.lock().state
    }

    /// Current object mask in source coordinates
    pub fn mask(&self) -> Option<Mask> {
        self.shared.lock().mask.clone()
    }

    /// Contour of the current mask
    pub fn contour(&self) -> Option<Mask> {
        self.shared.lock().contour.clone()
    }

    /// Current object layer
    pub fn composite(&self) -> Option<Composite> {
        self.shared.lock().composite.clone()
    }

    /// The target with the current layer drawn over it
    pub fn render(&self) -> Option<RgbRaster> {
        let state = self.shared.lock();
        match (&state.target, &state.composite) {
            (Some(target), Some(composite)) => Some(composite.flatten(target)),
            (Some(target), None) => Some(target.clone()),
            _ => None,
        }
    }

    /// The cancellation flag polled by the boundary search
    pub fn moved_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.moved)
    }

    /// Whether a worker is still running
    pub fn is_busy(&self) -> bool {
        self.worker.as_ref().is_some_and(|w| !w.is_finished())
    }

    /// Show a segmentation-derived mask and start relabeling it
    ///
    /// The mask is composited right away with a hard edge; the worker then
    /// refines it against the palette when one is set.
    ///
    /// # Errors
    ///
    /// Returns [`MattingError::MissingInput`] before the source and target
    /// are set, or an error if the mask does not match the source.
    pub fn set_rough_mask(&mut self, rough: Mask) -> MattingResult<()> {
        self.settle_previous();
        let rough = rough.map(|v| (v != 0) as u8);
        {
            let mut state = self.shared.lock();
            let source = state.source.as_ref().ok_or(MattingError::MissingInput("source"))?;
            source.check_same_size(&rough)?;
            let target = state.target.as_ref().ok_or(MattingError::MissingInput("target"))?;

            let frame = bounding_box(&dilate(&rough, &Sel::cross()));
            let composite = Composite::from_mask(
                source.crop(frame)?,
                &rough.crop(frame)?,
                frame.origin().offset(state.offset.x, state.offset.y),
            )?;
            debug!(target = ?target.dimensions(), ?frame, "showing rough mask");

            state.contour = Some(contour(&rough));
            state.mask = Some(rough.clone());
            state.rough = Some(rough);
            state.composite = Some(composite);
            state.state = ControllerState::RoughMask;
        }
        info!("rough mask shown");
        self.spawn(Job::Rough)
    }

    /// Refine the object from a correction stroke
    ///
    /// `stroke` is the overlay the user drew in source coordinates: any
    /// nonzero pixel is part of the stroke. Waits for the previous worker,
    /// emits [`MattingEvent::CorrectionApplied`] and starts the refinement.
    ///
    /// # Errors
    ///
    /// Returns [`MattingError::MissingInput`] when the source, target or (for
    /// palette methods) palette is missing, or an error if the stroke does
    /// not match the source.
    pub fn apply_correction(&mut self, stroke: &Mask) -> MattingResult<()> {
        self.settle_previous();
        {
            let state = self.shared.lock();
            let source = state.source.as_ref().ok_or(MattingError::MissingInput("source"))?;
            source.check_same_size(stroke)?;
            if state.target.is_none() {
                return Err(MattingError::MissingInput("target"));
            }
            if self.config.method.needs_palette() && state.palette.is_empty() {
                return Err(MattingError::MissingInput("palette"));
            }
        }
        info!(method = ?self.config.method, "correction applied");
        self.emit(MattingEvent::CorrectionApplied);
        self.spawn(Job::Correction(stroke.clone()))
    }

    /// Paste the rough mask without refinement
    ///
    /// # Errors
    ///
    /// Returns [`MattingError::MissingInput`] when no rough mask is set.
    pub fn transfer_whole_object(&mut self) -> MattingResult<()> {
        self.settle_previous();
        if self.shared.lock().rough.is_none() {
            return Err(MattingError::MissingInput("rough mask"));
        }
        info!("full object transfer");
        self.emit(MattingEvent::FullObjectTransfer);
        self.spawn(Job::WholeObject)
    }

    /// Move the object and composite it again at `offset`
    ///
    /// A running boundary search is cancelled and keeps its last committed
    /// mask.
    ///
    /// # Errors
    ///
    /// Returns [`MattingError::MissingInput`] if the images were cleared
    /// while a mask was set.
    pub fn reposition(&mut self, offset: Point) -> MattingResult<()> {
        self.moved.store(true, Ordering::SeqCst);
        self.settle_previous();
        self.moved.store(false, Ordering::SeqCst);

        let has_mask = {
            let mut state = self.shared.lock();
            state.offset = offset;
            state.mask.is_some()
        };
        info!(x = offset.x, y = offset.y, "object repositioned");
        self.emit(MattingEvent::ObjectRepositioned);
        if has_mask {
            self.spawn(Job::Recomposite)?;
        }
        Ok(())
    }

    /// Block until the running worker, if any, has finished
    ///
    /// # Errors
    ///
    /// Returns the worker's error, or [`MattingError::WorkerPanicked`].
    pub fn wait(&mut self) -> MattingResult<()> {
        match self.worker.take() {
            Some(handle) => handle.join().map_err(|_| MattingError::WorkerPanicked)?,
            None => Ok(()),
        }
    }

    /// Join the previous worker; its failure was already reported
    fn settle_previous(&mut self) {
        if let Err(e) = self.wait() {
            debug!("previous refinement discarded: {e}");
        }
    }

    fn emit(&self, event: MattingEvent) {
        emit(&self.listener, event);
    }

    fn spawn(&mut self, job: Job) -> MattingResult<()> {
        let snapshot = {
            let mut state = self.shared.lock();
            let source = state.source.clone().ok_or(MattingError::MissingInput("source"))?;
            let target = state.target.clone().ok_or(MattingError::MissingInput("target"))?;
            if !matches!(job, Job::Rough) {
                state.state = ControllerState::Refining;
            }
            Snapshot {
                source,
                target,
                offset: state.offset,
                palette: state.palette.clone(),
                rough: state.rough.clone(),
                mask: state.mask.clone(),
            }
        };

        let worker = Worker {
            config: self.config.clone(),
            shared: Arc::clone(&self.shared),
            listener: Arc::clone(&self.listener),
            moved: Arc::clone(&self.moved),
        };
        self.worker = Some(thread::spawn(move || worker.run(job, snapshot)));
        Ok(())
    }
}

impl Drop for BoundaryController {
    fn drop(&mut self) {
        self.moved.store(true, Ordering::SeqCst);
        self.settle_previous();
    }
}

fn emit(listener: &Mutex<Option<Listener>>, event: MattingEvent) {
    let callback = listener.lock().clone();
    if let Some(callback) = callback {
        callback(event);
    }
}

/// The refinement thread's view of the controller
struct Worker {
    config: MattingConfig,
    shared: Arc<Mutex<CompositeState>>,
    listener: Arc<Mutex<Option<Listener>>>,
    moved: Arc<AtomicBool>,
}

impl Worker {
    fn run(self, job: Job, snapshot: Snapshot) -> MattingResult<()> {
        let result = self.process(job, &snapshot);
        if let Err(e) = &result {
            warn!("refinement failed: {e}");
        }
        self.shared.lock().state = ControllerState::Settled;
        info!("refinement settled");
        emit(&self.listener, MattingEvent::RefinementSettled);
        result
    }

    fn process(&self, job: Job, snapshot: &Snapshot) -> MattingResult<()> {
        let refined = match job {
            Job::Rough => match &snapshot.rough {
                Some(rough) => Some(self.refine_rough(snapshot, rough)?),
                None => None,
            },
            Job::Correction(stroke) => Some(self.refine_stroke(snapshot, &stroke)?),
            Job::WholeObject => snapshot.rough.clone(),
            Job::Recomposite => None,
        };

        let mask = match refined {
            Some(mask) => {
                let mut state = self.shared.lock();
                state.contour = Some(contour(&mask));
                state.mask = Some(mask.clone());
                mask
            }
            None => match &snapshot.mask {
                Some(mask) => mask.clone(),
                None => return Ok(()),
            },
        };
        self.finish(snapshot, &mask)
    }

    fn refine_rough(&self, snapshot: &Snapshot, rough: &Mask) -> MattingResult<Mask> {
        if snapshot.palette.is_empty() {
            debug!("no palette, keeping the rough mask");
            return Ok(rough.clone());
        }
        self.shared.lock().state = ControllerState::Refining;
        let options = SegmentOptions {
            line: self.config.segmentation_line,
            discard_threshold: self.config.discard_threshold,
            fallback_ratio: self.config.fallback_ratio,
        };
        let (frame, local) = hard_segmentation(&snapshot.source, rough, &snapshot.palette, &options)?;
        Ok(to_source_frame(&local, frame, rough))
    }

    fn refine_stroke(&self, snapshot: &Snapshot, stroke: &Mask) -> MattingResult<Mask> {
        let region = stroke_region(stroke);
        if region.is_blank() {
            debug!("blank stroke");
            return Ok(snapshot.mask.clone().unwrap_or(region));
        }
        let grown = dilate(&region, &Sel::cross());
        let frame = bounding_box(&grown);
        let local_region = region.crop(frame)?;

        let initial = match self.config.method {
            RefineMethod::None => return Ok(region),
            RefineMethod::HardSegmentation | RefineMethod::Scissors => {
                let source = snapshot.source.crop(frame)?;
                let labeled = label_band(
                    &source,
                    &snapshot.palette,
                    &grown.crop(frame)?,
                    &local_region,
                    self.config.discard_threshold,
                )?;
                if self.config.method == RefineMethod::HardSegmentation {
                    return Ok(to_source_frame(&labeled, frame, &region));
                }
                // The solver needs a single region to wrap
                connect_regions(&labeled)?
            }
            RefineMethod::Erode => enclosed_by(stroke).crop(frame)?,
        };

        let source = snapshot.source.crop(frame)?;
        let target = aligned_target(&snapshot.target, frame, snapshot.offset)?;
        let solver = BoundaryCutSolver::new(&source, &target, self.config.solver_options())?;
        let refinement = solver.refine(&initial, &local_region, &self.moved)?;
        info!(
            outcome = ?refinement.outcome,
            iterations = refinement.iterations,
            energy = refinement.energy,
            "boundary refined"
        );
        if refinement.outcome == RefineOutcome::Cancelled {
            debug!("boundary search cancelled");
        }
        Ok(to_source_frame(&refinement.mask, frame, &region))
    }

    /// Feather, composite and optionally blend `mask`
    fn finish(&self, snapshot: &Snapshot, mask: &Mask) -> MattingResult<()> {
        if mask.is_blank() {
            self.shared.lock().composite = None;
            return Ok(());
        }
        let frame = bounding_box(&dilate(mask, &Sel::cross()));
        let local = mask.crop(frame)?;
        let source = snapshot.source.crop(frame)?;
        let origin = frame.origin().offset(snapshot.offset.x, snapshot.offset.y);

        let mut composite = if self.config.alpha_matting {
            Composite::new(source.clone(), feather(&local, &self.config.feather)?, origin)?
        } else {
            Composite::from_mask(source.clone(), &local, origin)?
        };
        self.shared.lock().composite = Some(composite.clone());

        let Some(options) = self.config.poisson_options() else {
            return Ok(());
        };
        if self.moved.load(Ordering::SeqCst) {
            debug!("object moved, skipping gradient blending");
            return Ok(());
        }
        let target = aligned_target(&snapshot.target, frame, snapshot.offset)?;
        let blended = poisson_blend(&source, &target, &local, Some(&composite.alpha), &options)?;
        let interior = erode(&local, &Sel::cross(), BoundaryPolicy::ZeroPadding);
        composite.overlay(&blended, &interior)?;
        self.shared.lock().composite = Some(composite);
        Ok(())
    }
}

/// Paste a frame-local mask back into a blank mask shaped like `like`
fn to_source_frame(local: &Mask, frame: Rect, like: &Mask) -> Mask {
    let mut full = Mask::new_like(like);
    full.paste(local, frame.x, frame.y);
    full
}

#[cfg(test)]
mod tests {
    use super::*;
    use splice_morph::subtract;

    fn disk(size: u32, r: i32) -> Mask {
        let c = size as i32 / 2;
        let mut m = Mask::new(size, size).unwrap();
        for y in 0..size as i32 {
            for x in 0..size as i32 {
                if (x - c).pow(2) + (y - c).pow(2) <= r * r {
                    m.set_pixel_unchecked(x as u32, y as u32, 1);
                }
            }
        }
        m
    }

    fn create_controller(config: MattingConfig) -> BoundaryController {
        let mut c = BoundaryController::new(config).unwrap();
        c.set_source(RgbRaster::filled(40, 40, Rgb::gray(90)).unwrap());
        c.set_target(RgbRaster::filled(40, 40, Rgb::gray(90)).unwrap());
        c
    }

    #[test]
    fn test_events_in_order() {
        let config = MattingConfig::default()
            .with_method(RefineMethod::None)
            .with_blend_mode(None);
        let mut c = create_controller(config);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        c.set_listener(move |e| sink.lock().push(e));

        assert_eq!(c.state(), ControllerState::Idle);
        c.set_rough_mask(disk(40, 6)).unwrap();
        c.wait().unwrap();
        c.apply_correction(&subtract(&disk(40, 12), &disk(40, 10))).unwrap();
        c.wait().unwrap();
        c.reposition(Point::new(2, 3)).unwrap();
        c.wait().unwrap();

        use MattingEvent::*;
        assert_eq!(
            *seen.lock(),
            vec![
                RefinementSettled,
                CorrectionApplied,
                RefinementSettled,
                ObjectRepositioned,
                RefinementSettled
            ]
        );
        assert_eq!(c.state(), ControllerState::Settled);
        assert_eq!(c.mask().unwrap(), disk(40, 12));
        assert_eq!(c.offset(), Point::new(2, 3));
    }

    #[test]
    fn test_rough_mask_shown_immediately() {
        let mut c = create_controller(MattingConfig::default().with_blend_mode(None));
        c.set_rough_mask(disk(40, 6)).unwrap();
        // The hard-edged estimate is available before the worker finishes
        assert!(c.composite().is_some());
        assert_eq!(c.mask().unwrap(), disk(40, 6));
        c.wait().unwrap();
        // No palette: the rough mask is kept
        assert_eq!(c.mask().unwrap(), disk(40, 6));
        assert_eq!(c.contour().unwrap(), contour(&disk(40, 6)));
    }

    #[test]
    fn test_missing_inputs() {
        let mut c = BoundaryController::new(MattingConfig::default()).unwrap();
        let stroke = disk(40, 5);
        assert!(matches!(
            c.apply_correction(&stroke),
            Err(MattingError::MissingInput("source"))
        ));
        c.set_source(RgbRaster::filled(40, 40, Rgb::WHITE).unwrap());
        assert!(matches!(
            c.apply_correction(&stroke),
            Err(MattingError::MissingInput("target"))
        ));
        c.set_target(RgbRaster::filled(40, 40, Rgb::WHITE).unwrap());
        assert!(matches!(
            c.apply_correction(&stroke),
            Err(MattingError::MissingInput("palette"))
        ));
        assert!(c.apply_correction(&Mask::new(10, 10).unwrap()).is_err());
        assert!(matches!(
            c.transfer_whole_object(),
            Err(MattingError::MissingInput("rough mask"))
        ));
        assert!(!c.is_busy());
    }

    #[test]
    fn test_cancelled_search_keeps_stroke() {
        let config = MattingConfig::default().with_method(RefineMethod::Erode);
        let mut c = create_controller(config);
        c.moved_flag().store(true, Ordering::SeqCst);
        c.apply_correction(&subtract(&disk(40, 14), &disk(40, 12))).unwrap();
        c.wait().unwrap();
        c.moved_flag().store(false, Ordering::SeqCst);
        // The search stopped before its first commit
        assert_eq!(c.mask().unwrap(), disk(40, 14));
        // Blending was skipped: the layer is the feathered source only
        let layer = c.composite().unwrap();
        assert!(layer.alpha.data().iter().any(|&a| a > 0 && a < 255));
    }

    #[test]
    fn test_worker_error_reported() {
        let config = MattingConfig::default().with_method(RefineMethod::HardSegmentation);
        let mut c = create_controller(config);
        c.set_palette(vec![Rgb::WHITE; 300]);
        c.apply_correction(&disk(40, 8)).unwrap();
        assert!(matches!(c.wait(), Err(MattingError::Filter(_))));
        assert_eq!(c.state(), ControllerState::Settled);
        // The failed request leaves nothing behind
        assert!(c.wait().is_ok());
    }

    #[test]
    fn test_failed_job_does_not_block_next_correction() {
        let config = MattingConfig::default()
            .with_method(RefineMethod::HardSegmentation)
            .with_blend_mode(None);
        let mut c = create_controller(config);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        c.set_listener(move |e| sink.lock().push(e));

        c.set_palette(vec![Rgb::WHITE; 300]);
        c.apply_correction(&disk(40, 8)).unwrap();
        // The failure is left unread; the retry must still go through
        c.set_palette(vec![Rgb::gray(90), Rgb::WHITE]);
        c.apply_correction(&disk(40, 8)).unwrap();
        assert!(c.wait().is_ok());

        let corrections = seen
            .lock()
            .iter()
            .filter(|&&e| e == MattingEvent::CorrectionApplied)
            .count();
        assert_eq!(corrections, 2);
        assert_eq!(c.state(), ControllerState::Settled);
        assert!(c.mask().is_some());
    }

    #[test]
    fn test_failed_job_does_not_block_reposition() {
        let config = MattingConfig::default().with_method(RefineMethod::HardSegmentation);
        let mut c = create_controller(config);
        c.set_palette(vec![Rgb::WHITE; 300]);
        c.apply_correction(&disk(40, 8)).unwrap();
        c.reposition(Point::new(4, 0)).unwrap();
        assert!(c.wait().is_ok());
        assert_eq!(c.offset(), Point::new(4, 0));
    }

    #[test]
    fn test_invalid_config() {
        assert!(BoundaryController::new(MattingConfig::default().with_min_length(0)).is_err());
        let mut c = BoundaryController::new(MattingConfig::default()).unwrap();
        assert!(c.set_config(MattingConfig::default().with_accuracy(0.0)).is_err());
        assert!(c.set_config(MattingConfig::default().with_method(RefineMethod::Erode)).is_ok());
        assert_eq!(c.config().method, RefineMethod::Erode);
    }
}
