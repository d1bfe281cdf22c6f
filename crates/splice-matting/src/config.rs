//! Controller configuration

use crate::error::{MattingError, MattingResult};
use splice_blend::{BlendMode, DEFAULT_ACCURACY, DEFAULT_SOURCE_WEIGHT, PoissonOptions};
use splice_cut::{DEFAULT_MIN_LENGTH, SeamMetric, SolverOptions};
use splice_filter::FeatherOptions;
use splice_region::DEFAULT_MIN_VOLUME;

/// Length of the line element used to grow a rough mask before relabeling
pub const DEFAULT_SEGMENTATION_LINE: u32 = 31;

/// Relabeling is rejected when it keeps less than this share of the object
pub const DEFAULT_FALLBACK_RATIO: f64 = 0.5;

/// How a user stroke turns into an object mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefineMethod {
    /// Take the filled stroke as the mask
    None,
    /// Relabel the palette-quantized source inside the stroke
    HardSegmentation,
    /// Hard segmentation, connected into one region, then boundary search
    #[default]
    Scissors,
    /// Boundary search from the inside of the stroke lines
    Erode,
}

impl RefineMethod {
    /// Whether the method quantizes the source against a palette
    pub fn needs_palette(self) -> bool {
        matches!(self, RefineMethod::HardSegmentation | RefineMethod::Scissors)
    }

    /// Whether the method runs the boundary cut solver
    pub fn runs_solver(self) -> bool {
        matches!(self, RefineMethod::Scissors | RefineMethod::Erode)
    }
}

/// Settings for [`BoundaryController`](crate::BoundaryController)
#[derive(Debug, Clone, PartialEq)]
pub struct MattingConfig {
    /// Stroke refinement method
    pub method: RefineMethod,
    /// Difference measure for the boundary search
    pub metric: SeamMetric,
    /// Gradient blending applied after compositing; `None` turns it off
    pub blend_mode: Option<BlendMode>,
    /// Feather the mask edge into a soft alpha ring
    pub alpha_matting: bool,
    /// Feathering parameters
    pub feather: FeatherOptions,
    /// Gauss-Seidel accuracy
    pub accuracy: f64,
    /// Source weight for weighted blending
    pub source_weight: f64,
    /// Optional cap on Gauss-Seidel sweeps
    pub max_sweeps: Option<u32>,
    /// Shortest boundary loop the solver accepts
    pub min_length: usize,
    /// Regions at or below this share of the frame are discarded
    pub discard_threshold: f64,
    /// Brick size used to grow a rough mask for relabeling
    pub segmentation_line: u32,
    /// Minimum share of the rough mask relabeling must keep
    pub fallback_ratio: f64,
}

impl Default for MattingConfig {
    fn default() -> Self {
        Self {
            method: RefineMethod::default(),
            metric: SeamMetric::default(),
            blend_mode: Some(BlendMode::Import),
            alpha_matting: true,
            feather: FeatherOptions::default(),
            accuracy: DEFAULT_ACCURACY,
            source_weight: DEFAULT_SOURCE_WEIGHT,
            max_sweeps: None,
            min_length: DEFAULT_MIN_LENGTH,
            discard_threshold: DEFAULT_MIN_VOLUME,
            segmentation_line: DEFAULT_SEGMENTATION_LINE,
            fallback_ratio: DEFAULT_FALLBACK_RATIO,
        }
    }
}

impl MattingConfig {
    /// Set the refinement method
    pub fn with_method(mut self, method: RefineMethod) -> Self {
        self.method = method;
        self
    }

    /// Set the seam metric
    pub fn with_metric(mut self, metric: SeamMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Set the blend mode, `None` to skip gradient blending
    pub fn with_blend_mode(mut self, mode: Option<BlendMode>) -> Self {
        self.blend_mode = mode;
        self
    }

    /// Enable or disable edge feathering
    pub fn with_alpha_matting(mut self, enabled: bool) -> Self {
        self.alpha_matting = enabled;
        self
    }

    /// Set the feathering parameters
    pub fn with_feather(mut self, feather: FeatherOptions) -> Self {
        self.feather = feather;
        self
    }

    /// Set the Gauss-Seidel accuracy
    pub fn with_accuracy(mut self, accuracy: f64) -> Self {
        self.accuracy = accuracy;
        self
    }

    /// Set the source weight used by weighted blending
    pub fn with_source_weight(mut self, weight: f64) -> Self {
        self.source_weight = weight;
        self
    }

    /// Cap the number of Gauss-Seidel sweeps
    pub fn with_max_sweeps(mut self, max_sweeps: u32) -> Self {
        self.max_sweeps = Some(max_sweeps);
        self
    }

    /// Set the minimum boundary loop length
    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_length = min_length;
        self
    }

    /// Set the region discard threshold
    pub fn with_discard_threshold(mut self, threshold: f64) -> Self {
        self.discard_threshold = threshold;
        self
    }

    /// Set the brick size used to grow a rough mask
    pub fn with_segmentation_line(mut self, line: u32) -> Self {
        self.segmentation_line = line;
        self
    }

    /// Options for the boundary cut solver
    pub fn solver_options(&self) -> SolverOptions {
        SolverOptions::default()
            .with_min_length(self.min_length)
            .with_metric(self.metric)
    }

    /// Options for the Poisson compositor, `None` when blending is off
    pub fn poisson_options(&self) -> Option<PoissonOptions> {
        self.blend_mode.map(|mode| {
            let options = PoissonOptions::default()
                .with_mode(mode)
                .with_accuracy(self.accuracy)
                .with_source_weight(self.source_weight);
            match self.max_sweeps {
                Some(max) => options.with_max_sweeps(max),
                None => options,
            }
        })
    }

    /// Check the configuration for values the pipeline cannot run with
    ///
    /// # Errors
    ///
    /// Returns [`MattingError::InvalidConfig`] describing the first bad value.
    pub fn validate(&self) -> MattingResult<()> {
        if self.min_length == 0 {
            return Err(MattingError::InvalidConfig(
                "minimum loop length must be positive".into(),
            ));
        }
        if !(self.accuracy > 0.0) {
            return Err(MattingError::InvalidConfig(format!(
                "accuracy must be positive, got {}",
                self.accuracy
            )));
        }
        if !(self.feather.sigma > 0.0) {
            return Err(MattingError::InvalidConfig(format!(
                "feather sigma must be positive, got {}",
                self.feather.sigma
            )));
        }
        if self.segmentation_line == 0 {
            return Err(MattingError::InvalidConfig(
                "segmentation line must be positive".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.discard_threshold) {
            return Err(MattingError::InvalidConfig(format!(
                "discard threshold must lie in [0, 1], got {}",
                self.discard_threshold
            )));
        }
        Ok(())
    }
}
