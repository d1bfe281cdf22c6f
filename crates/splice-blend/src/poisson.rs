//! Poisson blending by Gauss-Seidel relaxation
//!
//! Inside the interior of the domain mask each channel `f` solves
//!
//! ```text
//! n·f(p) - Σ f(q) = d(p)        q: in-bounds 4-neighbors of p
//! ```
//!
//! where `d(p)` sums the guidance differences chosen by [`BlendMode`] and
//! neighbors outside the interior contribute the target value. The solve
//! starts from the target, sweeps in row-major order updating values in
//! place, and stops once the mean absolute change per interior pixel drops
//! to the accuracy threshold.
//!
//! Channels are independent and can be solved concurrently.

use crate::error::{BlendError, BlendResult};
use rayon::prelude::*;
use splice_core::{Mask, Raster, RgbRaster, channel};
use splice_morph::{BoundaryPolicy, Sel, erode};
use tracing::{debug, trace, warn};

/// Default mean absolute change per pixel at which iteration stops
pub const DEFAULT_ACCURACY: f64 = 0.05;

/// Default source weight for [`BlendMode::Weighted`]
pub const DEFAULT_SOURCE_WEIGHT: f64 = 0.5;

/// Guidance field for the interior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// Source gradients
    #[default]
    Import,
    /// Whichever of source or target gradient is larger in magnitude
    Mix,
    /// Weighted sum of source and target gradients
    Weighted,
    /// Source gradients mixed with target values by a fixed alpha plane
    Alpha,
}

impl BlendMode {
    fn name(self) -> &'static str {
        match self {
            BlendMode::Import => "Import",
            BlendMode::Mix => "Mix",
            BlendMode::Weighted => "Weighted",
            BlendMode::Alpha => "Alpha",
        }
    }
}

/// How the three channel solves are scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Parallelism {
    /// One rayon task per channel
    #[default]
    Channels,
    /// One channel after the other on the calling thread
    Sequential,
}

/// Options for [`poisson_blend`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoissonOptions {
    /// Guidance field
    pub mode: BlendMode,
    /// Stop when the mean absolute change per pixel is at most this
    pub accuracy: f64,
    /// Source weight for [`BlendMode::Weighted`]
    pub source_weight: f64,
    /// Channel scheduling
    pub parallelism: Parallelism,
    /// Optional cap on the number of sweeps per channel
    pub max_sweeps: Option<u32>,
}

impl Default for PoissonOptions {
    fn default() -> Self {
        Self {
            mode: BlendMode::default(),
            accuracy: DEFAULT_ACCURACY,
            source_weight: DEFAULT_SOURCE_WEIGHT,
            parallelism: Parallelism::default(),
            max_sweeps: None,
        }
    }
}

impl PoissonOptions {
    /// Set the guidance mode
    pub fn with_mode(mut self, mode: BlendMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the convergence threshold
    pub fn with_accuracy(mut self, accuracy: f64) -> Self {
        self.accuracy = accuracy;
        self
    }

    /// Set the source weight used by [`BlendMode::Weighted`]
    pub fn with_source_weight(mut self, weight: f64) -> Self {
        self.source_weight = weight;
        self
    }

    /// Set the channel scheduling
    pub fn with_parallelism(mut self, parallelism: Parallelism) -> Self {
        self.parallelism = parallelism;
        self
    }

    /// Cap the number of sweeps per channel
    pub fn with_max_sweeps(mut self, max_sweeps: u32) -> Self {
        self.max_sweeps = Some(max_sweeps);
        self
    }

    /// Target weight for [`BlendMode::Weighted`]: `1 - s`, or 0 once `s >= 1`
    pub fn target_weight(&self) -> f64 {
        if self.source_weight >= 1.0 {
            0.0
        } else {
            1.0 - self.source_weight
        }
    }

    fn validate(&self) -> BlendResult<()> {
        if !(self.accuracy > 0.0) {
            return Err(BlendError::InvalidParameters(format!(
                "accuracy must be positive, got {}",
                self.accuracy
            )));
        }
        if !self.source_weight.is_finite() {
            return Err(BlendError::InvalidParameters(format!(
                "source weight must be finite, got {}",
                self.source_weight
            )));
        }
        Ok(())
    }
}

/// In-bounds 4-neighbors of `(x, y)` as flat indices: up, left, right, down
#[inline]
fn neighbors4(x: usize, y: usize, w: usize, h: usize) -> [Option<usize>; 4] {
    let p = y * w + x;
    [
        (y > 0).then(|| p - w),
        (x > 0).then(|| p - 1),
        (x + 1 < w).then(|| p + 1),
        (y + 1 < h).then(|| p + w),
    ]
}

/// Fixed inputs shared by the channel solves
struct Problem<'a> {
    width: usize,
    height: usize,
    interior: Vec<bool>,
    area: usize,
    alpha: Option<&'a [u8]>,
    options: &'a PoissonOptions,
}

impl Problem<'_> {
    /// Guidance term `d(p)` for every pixel
    fn guidance(&self, g: &[f64], t: &[f64]) -> Vec<f64> {
        let (w, h) = (self.width, self.height);
        let sw = self.options.source_weight;
        let tw = self.options.target_weight();
        let mut d = vec![0.0; w * h];

        for y in 0..h {
            for x in 0..w {
                let p = y * w + x;
                let mut sum = 0.0;
                for q in neighbors4(x, y, w, h).into_iter().flatten() {
                    let gg = g[p] - g[q];
                    sum += match self.options.mode {
                        BlendMode::Import => gg,
                        BlendMode::Mix => {
                            let tt = t[p] - t[q];
                            if tt.abs() > gg.abs() { tt } else { gg }
                        }
                        BlendMode::Weighted => sw * gg + tw * (t[p] - t[q]),
                        BlendMode::Alpha => match self.alpha {
                            Some(alpha) => {
                                let ap = alpha[p] as f64 / 255.0;
                                let aq = alpha[q] as f64 / 255.0;
                                if ap < 1.0 && aq < 1.0 {
                                    ap * g[q] - aq * g[q] + (1.0 - ap) * t[p] - (1.0 - aq) * t[q]
                                } else {
                                    gg
                                }
                            }
                            None => gg,
                        },
                    };
                }
                d[p] = sum;
            }
        }
        d
    }

    /// Solve one channel; returns the new plane and the sweep count
    fn solve(&self, c: usize, source: &Raster<u8>, target: &Raster<u8>) -> (Raster<u8>, u32) {
        let (w, h) = (self.width, self.height);
        let g: Vec<f64> = source.data().iter().map(|&v| v as f64).collect();
        let t: Vec<f64> = target.data().iter().map(|&v| v as f64).collect();
        let d = self.guidance(&g, &t);
        let mut f = t.clone();

        let mut sweeps = 0u32;
        loop {
            let mut change = 0.0;
            for y in 0..h {
                for x in 0..w {
                    let p = y * w + x;
                    if !self.interior[p] {
                        continue;
                    }
                    let mut sum = d[p];
                    let mut n = 0u32;
                    for q in neighbors4(x, y, w, h).into_iter().flatten() {
                        n += 1;
                        // Up and left were already updated this sweep
                        sum += if self.interior[q] { f[q] } else { t[q] };
                    }
                    let value = (sum / n as f64).clamp(0.0, 255.0);
                    change += (value - f[p]).abs();
                    f[p] = value;
                }
            }
            sweeps += 1;
            let mean_change = change / self.area as f64;
            trace!(channel = c, sweep = sweeps, mean_change, "gauss-seidel sweep");

            if mean_change <= self.options.accuracy {
                break;
            }
            if self.options.max_sweeps.is_some_and(|max| sweeps >= max) {
                debug!(channel = c, sweeps, mean_change, "sweep limit reached");
                break;
            }
        }
        debug!(channel = c, sweeps, "channel solved");

        let data = f.iter().map(|&v| v.round() as u8).collect();
        let plane = Raster::from_vec(w as u32, h as u32, data)
            .unwrap_or_else(|_| target.clone());
        (plane, sweeps)
    }
}

/// Blend `source` into `target` over the interior of `domain`
///
/// # Arguments
///
/// * `source` - Image whose gradients guide the interior
/// * `target` - Image providing the boundary values and everything outside
/// * `domain` - Pixels to synthesize; its contour acts as fixed boundary
/// * `alpha` - Opacity plane, read by [`BlendMode::Alpha`] only
/// * `options` - Mode, accuracy and scheduling
///
/// # Returns
///
/// A copy of `target` whose interior pixels hold the solved values. When
/// the sizes differ a warning is logged and the target is returned as is.
///
/// # Errors
///
/// Returns [`BlendError::MissingAlpha`] in alpha mode without an alpha
/// plane and [`BlendError::InvalidParameters`] for a non-positive accuracy.
pub fn poisson_blend(
    source: &RgbRaster,
    target: &RgbRaster,
    domain: &Mask,
    alpha: Option<&Raster<u8>>,
    options: &PoissonOptions,
) -> BlendResult<RgbRaster> {
    options.validate()?;
    if options.mode == BlendMode::Alpha && alpha.is_none() {
        return Err(BlendError::MissingAlpha(options.mode.name()));
    }

    let sizes_match = source.same_size(target)
        && domain.same_size(target)
        && alpha.is_none_or(|a| a.same_size(target));
    if !sizes_match {
        warn!(
            source = ?source.dimensions(),
            target = ?target.dimensions(),
            domain = ?domain.dimensions(),
            "poisson blend of mismatched rasters"
        );
        return Ok(target.clone());
    }

    let interior_mask = erode(domain, &Sel::cross(), BoundaryPolicy::ZeroPadding);
    let interior: Vec<bool> = interior_mask.data().iter().map(|&v| v != 0).collect();
    let area = interior.iter().filter(|&&v| v).count();
    if area == 0 {
        debug!("empty blend domain");
        return Ok(target.clone());
    }

    let (w, h) = target.dimensions();
    let problem = Problem {
        width: w as usize,
        height: h as usize,
        interior,
        area,
        alpha: alpha.map(|a| a.data()),
        options,
    };

    let solve = |c: usize| {
        problem.solve(c, &source.channel_plane(c), &target.channel_plane(c))
    };
    let solved: Vec<(Raster<u8>, u32)> = match options.parallelism {
        Parallelism::Channels => (0..channel::COUNT).into_par_iter().map(solve).collect(),
        Parallelism::Sequential => (0..channel::COUNT).map(solve).collect(),
    };

    debug!(
        area,
        mode = options.mode.name(),
        sweeps = ?solved.iter().map(|(_, s)| *s).collect::<Vec<_>>(),
        "poisson blend done"
    );
    let [r, g, b]: [Raster<u8>; 3] = match solved
        .into_iter()
        .map(|(plane, _)| plane)
        .collect::<Vec<_>>()
        .try_into()
    {
        Ok(planes) => planes,
        Err(_) => return Ok(target.clone()),
    };
    Ok(RgbRaster::from_planes(&[r, g, b])?)
}
