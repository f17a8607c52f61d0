//! # OK Separation
//!
//! Oksep determines how far apart two colors' OKHSL lightness must be, so that
//! the pair is guaranteed to meet a minimum WCAG 2.x contrast ratio, no matter
//! the colors' hues and chroma. It answers that question empirically: It
//! draws random pairs of sRGB colors whose lightness levels are a hypothesized
//! distance apart and raises the distance whenever a pair falls short.
//!
//!
//! ## 1. Overview
//!
//! Oksep's main abstractions are:
//!
//!   * [`LightnessTable`](table::LightnessTable) implements the **lightness
//!     scale**, which maps each of 1001 steps to an OKHSL lightness rounded to
//!     two decimals. Since contrast grows exponentially along the scale, equal
//!     step differences correspond to equal contrast ratios.
//!   * The [`catalog`] module enumerates **all 2<sup>24</sup> 24-bit sRGB
//!     colors** with their relative luminance and lightness [`Level`], persists
//!     them in a compact binary format, and partitions them into
//!     [`ColorBuckets`](catalog::ColorBuckets) by level.
//!   * The [`seen`] module tracks **already tested pairs**, exactly with
//!     [`ExactSet`](seen::ExactSet) or probabilistically and compactly with
//!     [`BloomSet`](seen::BloomSet).
//!   * [`Search`](search::Search) implements the **adaptive search** for the
//!     minimum safe distance.
//!
//! [`Options`](opt::Options) configure all of the above and [`log::Log`] reports
//! on progress.
//!
//!
//! ## 2. One-Two-Three: Separation!
//!
//! A complete run builds the table, partitions the colors, and searches:
//!
//! ```no_run
//! # use std::io::Result;
//! # use oksep::catalog::{partition, CatalogReader};
//! # use oksep::log::Log;
//! # use oksep::opt::Options;
//! # use oksep::search::Search;
//! # use oksep::seen::BloomSet;
//! # use oksep::table::LightnessTable;
//! # use rand::SeedableRng;
//! # fn main() -> Result<()> {
//! let options = Options::default();
//! let table = LightnessTable::build(&options)?;
//! let buckets = partition(CatalogReader::open("colors.oksep")?)?;
//!
//! let seen = BloomSet::new(options.pass_target(), options.false_positive_rate());
//! let mut search = Search::new(&table, &buckets, &options, seen);
//! let mut rng = rand::rngs::StdRng::seed_from_u64(42);
//! let outcome = search.run(&mut rng, &mut Log::stderr(options.volume()))?;
//! assert!(outcome.distance <= table.max_step());
//! # Ok(())
//! # }
//! ```
//!
//! The `oksep-table`, `oksep-catalog`, and `oksep` command line tools wrap
//! these steps, with the former two writing the lightness table and color
//! catalog to disk and the latter reading them back.
//!
//!
//! ## 3. Optional Features
//!
//! Oksep supports one feature flag:
//!
//!   - **`f64`** selects the eponymous type as floating point type [`Float`]
//!     and `u64` as [`Bits`] instead of `f32` as [`Float`] and `u32` as
//!     [`Bits`]. This feature is enabled by default.
//!
//!
//! ## 4. Acknowledgements
//!
//! Oksep reuses [Color.js](https://colorjs.io)' formulae for conversion to
//! Oklab and [Björn Ottosson](https://bottosson.github.io/posts/colorpicker/)'s
//! lightness estimate for OKHSL. Thank you! 🌸
//!

/// The floating point type in use.
#[cfg(feature = "f64")]
pub type Float = f64;
/// The floating point type in use.
#[cfg(not(feature = "f64"))]
pub type Float = f32;

/// [`Float`]'s bits.
#[cfg(feature = "f64")]
pub type Bits = u64;
/// [`Float`]'s bits.
#[cfg(not(feature = "f64"))]
pub type Bits = u32;

pub mod catalog;
mod core;
pub mod error;
pub mod log;
pub mod opt;
pub mod search;
pub mod seen;
pub mod table;

#[doc(hidden)]
pub use core::to_eq_bits;

pub use core::{
    contrast_ratio, luminance_for_contrast, round_lightness, toe, toe_inverse, Level,
    MAX_CONTRAST, MIN_CONTRAST,
};
