//! Helper module with the options for building the lightness table and
//! searching for the minimum separation.
//!
//! This module provides the options and the corresponding builder. The
//! options are immutable once built and passed by reference to every
//! component that needs them.
//!
//!
//! # Example
//!
//! ```
//! # use oksep::opt::Options;
//! let options = Options::builder()
//!     .initial_distance(1)
//!     .pass_target(500)
//!     .build();
//!
//! assert_eq!(options.initial_distance(), 1);
//! assert_eq!(options.min_contrast(), 4.5);
//! ```

use crate::Float;

/// The diagnostic logging volume.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Volume {
    /// No diagnostic output.
    Silent,
    /// Escalations and summary.
    #[default]
    Regular,
    /// Escalations, summary, and periodic progress.
    Detailed,
}

#[derive(Clone, Debug)]
struct OptionData {
    volume: Volume,
    max_step: usize,
    max_contrast: Float,
    reference_luminance: Float,
    initial_distance: usize,
    min_contrast: Float,
    pass_target: u64,
    false_positive_rate: Float,
    stall_limit: u64,
    max_tests: Option<u64>,
    progress_interval: u64,
}

impl OptionData {
    pub const fn new() -> Self {
        Self {
            volume: Volume::Regular,
            max_step: 1_000,
            max_contrast: 21.0,
            reference_luminance: 1.0,
            initial_distance: 400,
            min_contrast: 4.5,
            pass_target: 1_000_000,
            false_positive_rate: 0.001,
            stall_limit: 1_000_000,
            max_tests: None,
            progress_interval: 100_000,
        }
    }
}

/// A builder of options objects.
#[derive(Debug)]
pub struct OptionBuilder(OptionData);

impl OptionBuilder {
    /// Set the volume.
    pub fn volume(&mut self, volume: Volume) -> &mut Self {
        self.0.volume = volume;
        self
    }

    /// Set the largest step of the scale, which must be at least one.
    pub fn max_step(&mut self, step: usize) -> &mut Self {
        self.0.max_step = step.max(1);
        self
    }

    /// Set the contrast ratio reached at the largest step.
    ///
    /// The value is clamped to `1..=21`.
    pub fn max_contrast(&mut self, contrast: Float) -> &mut Self {
        self.0.max_contrast = contrast.clamp(1.0, 21.0);
        self
    }

    /// Set the luminance of the reference color the lightness table measures
    /// contrast against.
    pub fn reference_luminance(&mut self, luminance: Float) -> &mut Self {
        self.0.reference_luminance = luminance;
        self
    }

    /// Set the distance to start searching at, which must be at least one.
    pub fn initial_distance(&mut self, distance: usize) -> &mut Self {
        self.0.initial_distance = distance.max(1);
        self
    }

    /// Set the minimum contrast ratio every tested pair must meet.
    pub fn min_contrast(&mut self, contrast: Float) -> &mut Self {
        self.0.min_contrast = contrast;
        self
    }

    /// Set the number of passing tests that declare a distance safe, which
    /// must be at least one.
    ///
    /// The seen-set for each distance is sized for this many pairs.
    pub fn pass_target(&mut self, target: u64) -> &mut Self {
        self.0.pass_target = target.max(1);
        self
    }

    /// Set the seen-set's target false positive rate.
    ///
    /// The rate is clamped to `0.000_001..=0.5`.
    pub fn false_positive_rate(&mut self, rate: Float) -> &mut Self {
        self.0.false_positive_rate = if rate.is_nan() {
            0.001
        } else {
            rate.clamp(0.000_001, 0.5)
        };
        self
    }

    /// Set the number of consecutive wasted draws after which a distance
    /// counts as exhausted, which must be at least one.
    pub fn stall_limit(&mut self, limit: u64) -> &mut Self {
        self.0.stall_limit = limit.max(1);
        self
    }

    /// Set the total number of tests after which the search gives up.
    pub fn max_tests(&mut self, limit: Option<u64>) -> &mut Self {
        self.0.max_tests = limit;
        self
    }

    /// Set the number of tests between progress reports, which must be at
    /// least one.
    pub fn progress_interval(&mut self, interval: u64) -> &mut Self {
        self.0.progress_interval = interval.max(1);
        self
    }

    /// Instantiate the options.
    pub fn build(&self) -> Options {
        Options(self.0.clone())
    }
}

/// An options object.
#[derive(Clone, Debug)]
pub struct Options(OptionData);

impl Default for Options {
    fn default() -> Self {
        Options(OptionData::new())
    }
}

impl Options {
    /// Create a new builder with the default option values.
    pub fn builder() -> OptionBuilder {
        OptionBuilder(OptionData::new())
    }

    /// Instantiate the default options but without diagnostic output.
    pub fn silent() -> Options {
        Self::builder().volume(Volume::Silent).build()
    }

    /// Instantiate the default options but with detailed diagnostic output.
    pub fn with_detailed_log() -> Options {
        Self::builder().volume(Volume::Detailed).build()
    }

    /// Get the volume.
    pub fn volume(&self) -> Volume {
        self.0.volume
    }

    /// Get the largest step of the scale.
    pub fn max_step(&self) -> usize {
        self.0.max_step
    }

    /// Get the contrast ratio at the largest step.
    pub fn max_contrast(&self) -> Float {
        self.0.max_contrast
    }

    /// Get the reference luminance.
    pub fn reference_luminance(&self) -> Float {
        self.0.reference_luminance
    }

    /// Get the initial distance.
    pub fn initial_distance(&self) -> usize {
        self.0.initial_distance
    }

    /// Get the minimum contrast ratio.
    pub fn min_contrast(&self) -> Float {
        self.0.min_contrast
    }

    /// Get the pass target.
    pub fn pass_target(&self) -> u64 {
        self.0.pass_target
    }

    /// Get the seen-set's false positive rate.
    pub fn false_positive_rate(&self) -> Float {
        self.0.false_positive_rate
    }

    /// Get the stall limit.
    pub fn stall_limit(&self) -> u64 {
        self.0.stall_limit
    }

    /// Get the test budget.
    pub fn max_tests(&self) -> Option<u64> {
        self.0.max_tests
    }

    /// Get the progress interval.
    pub fn progress_interval(&self) -> u64 {
        self.0.progress_interval
    }
}
