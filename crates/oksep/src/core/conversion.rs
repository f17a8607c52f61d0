use crate::Float;

/// Convert the given 24-bit RGB coordinates to floating point coordinates.
#[inline]
pub(crate) fn from_24bit(r: u8, g: u8, b: u8) -> [Float; 3] {
    [r as Float / 255.0, g as Float / 255.0, b as Float / 255.0]
}

// --------------------------------------------------------------------------------------------------------------------

/// Multiply the 3 by 3 matrix and 3-element vector with each other, producing a
/// new 3-element vector.
#[inline]
fn multiply(matrix: &[[Float; 3]; 3], vector: &[Float; 3]) -> [Float; 3] {
    let [row1, row2, row3] = matrix;

    [
        row1[0].mul_add(vector[0], row1[1].mul_add(vector[1], row1[2] * vector[2])),
        row2[0].mul_add(vector[0], row2[1].mul_add(vector[1], row2[2] * vector[2])),
        row3[0].mul_add(vector[0], row3[1].mul_add(vector[1], row3[2] * vector[2])),
    ]
}

// --------------------------------------------------------------------------------------------------------------------

/// Convert coordinates from gamma-corrected sRGB to linear sRGB. This is a
/// one-hop, direct conversion.
fn rgb_to_linear_rgb(value: &[Float; 3]) -> [Float; 3] {
    #[inline]
    fn convert(value: Float) -> Float {
        let magnitude = value.abs();
        if magnitude <= 0.04045 {
            value / 12.92
        } else {
            ((magnitude + 0.055) / 1.055).powf(2.4).copysign(value)
        }
    }

    [convert(value[0]), convert(value[1]), convert(value[2])]
}

// https://github.com/color-js/color.js/blob/a77e080a070039c534dda3965a769675aac5f75e/src/spaces/srgb-linear.js

#[rustfmt::skip]
#[allow(clippy::excessive_precision)]
const LINEAR_SRGB_TO_XYZ: [[Float; 3]; 3] = [
    [ 0.41239079926595934, 0.357584339383878,   0.1804807884018343  ],
    [ 0.21263900587151027, 0.715168678767756,   0.07219231536073371 ],
    [ 0.01933081871559182, 0.11919477979462598, 0.9505321522496607  ],
];

/// Convert coordinates for linear sRGB to XYZ. This is a one-hop, direct conversion.
fn linear_srgb_to_xyz(value: &[Float; 3]) -> [Float; 3] {
    multiply(&LINEAR_SRGB_TO_XYZ, value)
}

/// Convert coordinates for sRGB to XYZ. This is a two-hop conversion.
#[inline]
pub(crate) fn srgb_to_xyz(value: &[Float; 3]) -> [Float; 3] {
    let linear_srgb = rgb_to_linear_rgb(value);
    linear_srgb_to_xyz(&linear_srgb)
}

// --------------------------------------------------------------------------------------------------------------------

/// The xy chromaticity of the D65 standard illuminant, as used by sRGB.
const D65_CHROMATICITY: (Float, Float) = (0.3127, 0.3290);

/// Determine the XYZ coordinates of the neutral color with the given relative
/// luminance.
///
/// The color has the chromaticity of D65, i.e., it is the gray tone an sRGB
/// display shows for that luminance.
pub(crate) fn xyz_from_luminance(luminance: Float) -> [Float; 3] {
    let (x, y) = D65_CHROMATICITY;
    [
        x / y * luminance,
        luminance,
        (1.0 - x - y) / y * luminance,
    ]
}

// --------------------------------------------------------------------------------------------------------------------
// https://github.com/color-js/color.js/blob/a77e080a070039c534dda3965a769675aac5f75e/src/spaces/oklab.js

#[rustfmt::skip]
#[allow(clippy::excessive_precision)]
const XYZ_TO_OKLMS: [[Float; 3]; 3] = [
    [ 0.8190224379967030, 0.3619062600528904, -0.1288737815209879 ],
    [ 0.0329836539323885, 0.9292868615863434,  0.0361446663506424 ],
    [ 0.0481771893596242, 0.2642395317527308,  0.6335478284694309 ],
];

#[rustfmt::skip]
#[allow(clippy::excessive_precision)]
const OKLMS_TO_OKLAB: [[Float; 3]; 3] = [
    [ 0.2104542683093140,  0.7936177747023054, -0.0040720430116193 ],
    [ 1.9779985324311684, -2.4285922420485799,  0.4505937096174110 ],
    [ 0.0259040424655478,  0.7827717124575296, -0.8086757549230774 ],
];

/// Convert coordinates for XYZ to Oklab. This is a one-hop, direct conversion,
/// even though it requires two matrix multiplications and a coordinate-wise
/// cube root. Negative cone responses are treated as zero.
pub(crate) fn xyz_to_oklab(value: &[Float; 3]) -> [Float; 3] {
    let [l, m, s] = multiply(&XYZ_TO_OKLMS, value);
    multiply(
        &OKLMS_TO_OKLAB,
        &[l.max(0.0).cbrt(), m.max(0.0).cbrt(), s.max(0.0).cbrt()],
    )
}

// --------------------------------------------------------------------------------------------------------------------

const K1: Float = 0.206;
const K2: Float = 0.03;
const K3: Float = (1.0 + K1) / (1.0 + K2);

/// Apply the toe to Oklab's lightness L, producing OKHSL's lightness.
///
/// The toe is Björn Ottosson's [improved lightness
/// estimate](https://bottosson.github.io/posts/colorpicker/#intermission---a-new-lightness-estimate-for-oklab),
/// which brightens dark tones so that they are spaced about as evenly as in
/// CIELAB.
#[inline]
pub fn toe(lightness: Float) -> Float {
    let k3lk1 = K3.mul_add(lightness, -K1);
    0.5 * (k3lk1 + k3lk1.mul_add(k3lk1, 4.0 * K2 * K3 * lightness).sqrt())
}

/// Undo the toe, turning OKHSL's lightness back into Oklab's lightness L.
#[inline]
pub fn toe_inverse(lightness: Float) -> Float {
    (lightness * (lightness + K1)) / (K3 * (lightness + K2))
}

/// Compute the OKHSL lightness for the given XYZ coordinates.
#[inline]
pub(crate) fn xyz_to_okhsl_lightness(value: &[Float; 3]) -> Float {
    let [l, _, _] = xyz_to_oklab(value);
    toe(l)
}

#[cfg(test)]
#[allow(clippy::excessive_precision)]
mod test {
    use super::*;
    use crate::assert_close_enough;
    use crate::Float;

    struct Representations {
        srgb: [Float; 3],
        xyz: [Float; 3],
        oklab: [Float; 3],
        okhsl_lightness: Float,
    }

    const BLACK: Representations = Representations {
        // #000000
        srgb: [0.0, 0.0, 0.0],
        xyz: [0.0, 0.0, 0.0],
        oklab: [0.0, 0.0, 0.0],
        okhsl_lightness: 0.0,
    };

    const YELLOW: Representations = Representations {
        // #ffca00
        srgb: [1.0, 0.792156862745098, 0.0],
        xyz: [0.6235868473237722, 0.635031101987136, 0.08972950140152941],
        oklab: [
            0.8613332073307732,
            0.0017175723640959761,
            0.17600139371700052,
        ],
        okhsl_lightness: 0.8385912822460642,
    };

    const BLUE: Representations = Representations {
        // #3178ea
        srgb: [0.19215686274509805, 0.47058823529411764, 0.9176470588235294],
        xyz: [0.22832473003420622, 0.20025321836938534, 0.80506528557483],
        oklab: [
            0.5909012953108558,
            -0.03348086515869664,
            -0.1836287492414715,
        ],
        okhsl_lightness: 0.5253778775789848,
    };

    #[test]
    fn test_conversions() {
        for &color in [&BLACK, &YELLOW, &BLUE].iter() {
            let xyz = srgb_to_xyz(&color.srgb);
            for (actual, expected) in xyz.iter().zip(color.xyz.iter()) {
                assert_close_enough!(*actual, *expected);
            }

            let oklab = xyz_to_oklab(&xyz);
            for (actual, expected) in oklab.iter().zip(color.oklab.iter()) {
                assert_close_enough!(*actual, *expected);
            }

            assert_close_enough!(xyz_to_okhsl_lightness(&xyz), color.okhsl_lightness);
            assert_close_enough!(toe_inverse(toe(oklab[0])), oklab[0]);
        }
    }

    #[test]
    fn test_primaries() {
        // Based on https://github.com/color-js/color.js/pull/511
        for (srgb, lightness) in [
            ([1.0, 0.0, 0.0], 0.5680846563197034),
            ([0.0, 1.0, 0.0], 0.8445289714936317),
            ([0.0, 0.0, 1.0], 0.3665653391870817),
        ] {
            assert_close_enough!(xyz_to_okhsl_lightness(&srgb_to_xyz(&srgb)), lightness);
        }
    }

    #[test]
    fn test_neutral_luminance() {
        let white = xyz_from_luminance(1.0);
        assert_close_enough!(white[0], 0.9504559270516717);
        assert_close_enough!(white[1], 1.0);
        assert_close_enough!(white[2], 1.0890577507598784);

        // White is white and black is black, no matter the path there.
        assert!((xyz_to_okhsl_lightness(&white) - 1.0).abs() < 1e-9);
        assert_close_enough!(xyz_to_okhsl_lightness(&xyz_from_luminance(0.0)), 0.0);

        // A neutral gray's luminance matches that of the sRGB gray.
        let gray = srgb_to_xyz(&from_24bit(128, 128, 128));
        let also_gray = xyz_from_luminance(gray[1]);
        assert!((xyz_to_okhsl_lightness(&gray) - xyz_to_okhsl_lightness(&also_gray)).abs() < 1e-4);
    }
}
