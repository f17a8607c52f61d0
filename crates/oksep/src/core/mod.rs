mod contrast;
mod conversion;
mod equality;
mod lightness;

// contrast
pub use contrast::{contrast_ratio, luminance_for_contrast, MAX_CONTRAST, MIN_CONTRAST};

// conversion
pub use conversion::{toe, toe_inverse};
pub(crate) use conversion::{
    from_24bit, srgb_to_xyz, xyz_from_luminance, xyz_to_okhsl_lightness,
};

// equality
pub use equality::to_eq_bits;

// lightness
pub use lightness::{round_lightness, Level};
