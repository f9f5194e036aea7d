//! Colour space conversion between sRGB and linear light.
//!
//! Implements the IEC 61966-2-1 sRGB transfer function. Byte inputs go
//! through a lookup table built at compile time; float samples use the
//! piecewise formula directly.
//!
//! Inputs are expected to be in range already. Out-of-range floats are
//! clamped where a byte has to be produced and passed through the formula
//! otherwise.

/// Linear segment threshold on the encoded side.
const SRGB_KNEE: f64 = 0.04045;

/// Linear segment threshold on the linear side.
const LINEAR_KNEE: f64 = 0.003_130_8;

const fn build_srgb_to_linear_lut() -> [f64; 256] {
    let mut lut = [0.0f64; 256];
    let mut i = 0usize;
    while i < 256 {
        let value = i as f64 / 255.0;
        lut[i] = if value <= SRGB_KNEE {
            value / 12.92
        } else {
            const_pow_2_4((value + 0.055) / 1.055)
        };
        i += 1;
    }
    lut
}

/// `base^2.4` in const context, as `x^2 * (x^2)^(1/5)`.
const fn const_pow_2_4(base: f64) -> f64 {
    if base <= 0.0 {
        return 0.0;
    }
    let x2 = base * base;
    x2 * const_fifth_root(x2)
}

/// Fifth root by Newton iteration; converges to within 1e-15 for inputs in (0, 1].
const fn const_fifth_root(value: f64) -> f64 {
    if value <= 0.0 {
        return 0.0;
    }
    if value == 1.0 {
        return 1.0;
    }
    let mut x = if value < 1.0 { 1.0 } else { value };
    let mut iter = 0;
    while iter < 100 {
        let x4 = x * x * x * x;
        let next = (4.0 * x + value / x4) / 5.0;
        let diff = if next > x { next - x } else { x - next };
        if diff < 1e-15 {
            return next;
        }
        x = next;
        iter += 1;
    }
    x
}

static SRGB_TO_LINEAR_LUT: [f64; 256] = build_srgb_to_linear_lut();

/// Convert an sRGB byte value (0..=255) to linear light (0.0..=1.0).
///
/// # Examples
///
/// ```
/// use blurhash_generic::color::srgb_to_linear;
/// assert!((srgb_to_linear(0) - 0.0).abs() < 1e-10);
/// assert!((srgb_to_linear(255) - 1.0).abs() < 1e-10);
/// ```
#[inline]
pub fn srgb_to_linear(value: u8) -> f64 {
    SRGB_TO_LINEAR_LUT[value as usize]
}

/// Convert a gamma-encoded float sample (0.0..=1.0) to linear light.
#[inline]
pub fn srgb_to_linear_f64(value: f64) -> f64 {
    if value <= SRGB_KNEE {
        value / 12.92
    } else {
        ((value + 0.055) / 1.055).powf(2.4)
    }
}

/// Convert a linear value (0.0..=1.0) to an sRGB byte, rounding half up.
///
/// Values outside \[0.0, 1.0\] are clamped.
///
/// # Examples
///
/// ```
/// use blurhash_generic::color::linear_to_srgb;
/// assert_eq!(linear_to_srgb(0.0), 0);
/// assert_eq!(linear_to_srgb(1.0), 255);
/// ```
#[inline]
pub fn linear_to_srgb(value: f64) -> u8 {
    let v = value.clamp(0.0, 1.0);
    let encoded = if v <= LINEAR_KNEE {
        v * 12.92 * 255.0 + 0.5
    } else {
        (1.055 * v.powf(1.0 / 2.4) - 0.055) * 255.0 + 0.5
    };
    encoded as u8
}

/// Compute `sign(value) * |value|^exp`.
///
/// # Examples
///
/// ```
/// use blurhash_generic::color::sign_pow;
/// assert!((sign_pow(4.0, 0.5) - 2.0).abs() < 1e-10);
/// assert!((sign_pow(-4.0, 0.5) - (-2.0)).abs() < 1e-10);
/// ```
#[inline]
pub fn sign_pow(value: f64, exp: f64) -> f64 {
    value.abs().powf(exp).copysign(value)
}
