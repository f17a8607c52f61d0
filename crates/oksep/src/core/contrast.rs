use crate::error::DomainError;
use crate::Float;

/// The flare offset added to both luminance values of the WCAG contrast ratio.
const FLARE: Float = 0.05;

/// The luminance above which a reference color counts as light.
const LIGHT_REFERENCE: Float = 0.18;

/// The smallest possible contrast ratio, i.e., of a color against itself.
pub const MIN_CONTRAST: Float = 1.0;

/// The largest possible contrast ratio, i.e., of black against white.
pub const MAX_CONTRAST: Float = 21.0;

/// Compute the WCAG 2 contrast ratio between two relative luminance values.
///
/// The ratio is symmetric in its arguments and ranges from 1 (same luminance)
/// to 21 (black and white).
#[inline]
pub fn contrast_ratio(luminance1: Float, luminance2: Float) -> Float {
    let (lighter, darker) = if luminance1 < luminance2 {
        (luminance2, luminance1)
    } else {
        (luminance1, luminance2)
    };

    (lighter + FLARE) / (darker + FLARE)
}

/// Determine the relative luminance that has the given contrast ratio against
/// the reference luminance.
///
/// For a light reference, the result is the darker color, otherwise it is the
/// lighter color. Either way, the result is clamped to `0..=1`.
///
/// # Errors
///
/// This function fails with a [`DomainError`] if the reference luminance is
/// outside `0..=1` or the contrast is outside `1..=21`.
pub fn luminance_for_contrast(reference: Float, contrast: Float) -> Result<Float, DomainError> {
    if !(0.0..=1.0).contains(&reference) {
        return Err(DomainError::new("luminance", reference, 0.0..=1.0));
    }
    if !(MIN_CONTRAST..=MAX_CONTRAST).contains(&contrast) {
        return Err(DomainError::new("contrast", contrast, MIN_CONTRAST..=MAX_CONTRAST));
    }

    let luminance = if LIGHT_REFERENCE < reference {
        (reference + FLARE) / contrast - FLARE
    } else {
        contrast.mul_add(reference + FLARE, -FLARE)
    };

    Ok(luminance.clamp(0.0, 1.0))
}
