use crate::error::DomainError;
use crate::Float;

/// Round a raw OKHSL lightness to two decimals.
///
/// Raw values in `0.995..1.0` round down to `0.99`, so that only white itself
/// has lightness `1.00`. Raw values within 1e-9 of one count as white, since
/// the conversion of pure white does not quite land on one. Not-a-number and
/// negative values become zero.
pub fn round_lightness(raw: Float) -> Float {
    if raw.is_nan() || raw <= 0.0 {
        0.0
    } else if 1.0 - 1e-9 <= raw {
        1.0
    } else if 0.995 <= raw {
        0.99
    } else {
        (raw * 100.0).round() / 100.0
    }
}

/// A quantized OKHSL lightness.
///
/// Levels count the hundredths of lightness, i.e., range `0..=100`. They are
/// the keys for grouping colors by lightness, which floating point numbers
/// cannot be.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Level(u8);

impl Level {
    /// The level of black.
    pub const BLACK: Level = Level(0);

    /// The level of white.
    pub const WHITE: Level = Level(100);

    /// The number of distinct levels.
    pub const COUNT: usize = 101;

    /// Create a new level from the given hundredths.
    ///
    /// # Errors
    ///
    /// This function fails if the hundredths exceed 100.
    pub fn new(hundredths: u8) -> Result<Self, DomainError> {
        if hundredths <= Self::WHITE.0 {
            Ok(Self(hundredths))
        } else {
            Err(DomainError::new(
                "lightness level",
                hundredths as Float,
                0.0..=100.0,
            ))
        }
    }

    /// Quantize the given raw lightness with [`round_lightness`].
    pub fn from_lightness(raw: Float) -> Self {
        let hundredths = (round_lightness(raw) * 100.0).round();
        Self(hundredths.clamp(0.0, 100.0) as u8)
    }

    /// Get the hundredths.
    pub fn hundredths(&self) -> u8 {
        self.0
    }

    /// Get the level as index.
    pub fn index(&self) -> usize {
        self.0 as usize
    }

    /// Get the lightness.
    pub fn lightness(&self) -> Float {
        self.0 as Float / 100.0
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}
