//! The `"base83"` base: classical BlurHash strings.
//!
//! Only the colour channels are encoded; an alpha channel, if present, is
//! ignored. The DC component is stored gamma-encoded as 8-bit sRGB and every
//! AC channel as one of 19 levels on a square-root curve, giving
//! `4 + 2 * components_x * components_y` characters of the alphabet below.

use std::ops::RangeInclusive;

use crate::color::{linear_to_srgb, sign_pow};
use crate::error::BlurhashError;
use crate::normalize::NormalizedGrid;
use crate::quantize::{Quantized, QuantizedHeader};
use crate::registry::Packer;

/// Registry id of this base.
pub const ID: &str = "base83";

/// Largest component count per axis.
pub const MAX_COMPONENTS: u32 = 9;

const COLOR_CHANNELS: usize = 3;
const AC_LEVELS: i32 = 19;

/// The 83-character alphabet used by BlurHash.
const ALPHABET: &[u8; 83] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz#$%*+,-.:;=?@[]^_{|}~";

/// Maps ASCII bytes to their digit value; invalid characters map to `255`.
const fn build_decode_lut() -> [u8; 128] {
    let mut lut = [255u8; 128];
    let mut i = 0;
    while i < 83 {
        lut[ALPHABET[i] as usize] = i as u8;
        i += 1;
    }
    lut
}

static DECODE_LUT: [u8; 128] = build_decode_lut();

/// Length of a hash with the given component counts.
pub fn encoded_len(components_x: u32, components_y: u32) -> usize {
    4 + 2 * (components_x * components_y) as usize
}

/// Decode a base83 string into an integer.
///
/// # Errors
///
/// Returns [`BlurhashError::InvalidBase83Character`] for characters outside
/// the alphabet.
///
/// # Examples
///
/// ```
/// use blurhash_generic::base83::decode;
/// assert_eq!(decode("0").unwrap(), 0);
/// assert_eq!(decode("~").unwrap(), 82);
/// ```
pub fn decode(digits: &str) -> Result<u64, BlurhashError> {
    let mut value: u64 = 0;
    for ch in digits.chars() {
        let digit = u8::try_from(ch)
            .ok()
            .filter(u8::is_ascii)
            .map(|b| DECODE_LUT[b as usize])
            .filter(|&d| d != 255)
            .ok_or(BlurhashError::InvalidBase83Character(ch))?;
        value = value
            .checked_mul(83)
            .and_then(|v| v.checked_add(digit.into()))
            .ok_or_else(|| {
                BlurhashError::EncodingError(format!("base83 value overflow decoding {digits:?}"))
            })?;
    }
    Ok(value)
}

/// Append `value` to `out` as exactly `length` base83 digits.
fn encode_into(value: u64, length: usize, out: &mut String) -> Result<(), BlurhashError> {
    // 83^length is the first value that does not fit.
    let limit = 83u64.checked_pow(length as u32).unwrap_or(u64::MAX);
    if value >= limit {
        return Err(BlurhashError::EncodingError(format!(
            "value {value} is too large for {length} base83 digits"
        )));
    }
    let mut divisor = limit / 83;
    for _ in 0..length {
        let digit = (value / divisor) % 83;
        out.push(ALPHABET[digit as usize] as char);
        divisor = (divisor / 83).max(1);
    }
    Ok(())
}

/// Encode an integer as a base83 string of exactly `length` digits.
///
/// # Errors
///
/// Returns [`BlurhashError::EncodingError`] if `value` needs more digits.
///
/// # Examples
///
/// ```
/// use blurhash_generic::base83::encode;
/// assert_eq!(encode(0, 1).unwrap(), "0");
/// assert_eq!(encode(83, 2).unwrap(), "10");
/// ```
pub fn encode(value: u64, length: usize) -> Result<String, BlurhashError> {
    let mut out = String::with_capacity(length);
    encode_into(value, length, &mut out)?;
    Ok(out)
}

/// Read the component counts from the size flag of a classical hash.
///
/// # Errors
///
/// Returns [`BlurhashError::InvalidLength`] if the hash is shorter than six
/// characters or its length disagrees with the counts, and
/// [`BlurhashError::InvalidBase83Character`] for a bad size flag.
///
/// # Examples
///
/// ```
/// use blurhash_generic::base83::components;
/// assert_eq!(components("LEHV6nWB2yk8pyo0adR*.7kCMdnj").unwrap(), (4, 3));
/// ```
pub fn components(hash: &str) -> Result<(u32, u32), BlurhashError> {
    if hash.len() < 6 {
        return Err(BlurhashError::InvalidLength {
            expected: 6,
            actual: hash.len(),
        });
    }
    let flag_len = hash.chars().next().map_or(1, char::len_utf8);
    let size_flag = decode(&hash[..flag_len])? as u32;
    let components_x = size_flag % 9 + 1;
    let components_y = size_flag / 9 + 1;

    let expected = encoded_len(components_x, components_y);
    if hash.len() != expected {
        return Err(BlurhashError::InvalidLength {
            expected,
            actual: hash.len(),
        });
    }
    Ok((components_x, components_y))
}

/// Quantize normalized components the way classical BlurHash does.
///
/// The AC bound is recomputed over the colour channels only, then stored as
/// `floor(max * 166 - 0.5)` in 0..=82. Each AC channel becomes
/// `floor(sign_pow(v / bound, 0.5) * 9 + 9.5)` in 0..=18, where `bound` is the
/// dequantized AC maximum.
///
/// # Errors
///
/// Returns [`BlurhashError::UnsupportedChannelCount`] for fewer than three
/// channels.
pub fn quantize(normalized: &NormalizedGrid) -> Result<Quantized, BlurhashError> {
    if normalized.channels() < COLOR_CHANNELS {
        return Err(BlurhashError::UnsupportedChannelCount {
            channels: normalized.channels(),
            min: COLOR_CHANNELS,
            max: COLOR_CHANNELS + 1,
        });
    }

    let scale = normalized.ac_max();
    let colour_max = normalized
        .ac()
        .iter()
        .flat_map(|cell| &cell[..COLOR_CHANNELS])
        .fold(0.0f64, |acc, &v| acc.max((v * scale).abs()));

    let ac_max = (colour_max * 166.0 - 0.5).floor().clamp(0.0, 82.0);
    let bound = (ac_max + 1.0) / 166.0;

    let ac = normalized
        .ac()
        .iter()
        .map(|cell| {
            cell[..COLOR_CHANNELS]
                .iter()
                .map(|&v| {
                    (sign_pow(v * scale / bound, 0.5) * 9.0 + 9.5)
                        .floor()
                        .clamp(0.0, 18.0) as i32
                })
                .collect()
        })
        .collect();

    let dc = normalized.dc()[..COLOR_CHANNELS]
        .iter()
        .map(|&v| linear_to_srgb(v).into())
        .collect();

    Ok(Quantized {
        header: QuantizedHeader {
            components_x: normalized.components_x(),
            components_y: normalized.components_y(),
            dc,
            ac_max: ac_max as u32,
        },
        ac,
    })
}

/// Packer for the `"base83"` base.
#[derive(Debug, Clone, Copy, Default)]
pub struct Base83Packer;

impl Packer for Base83Packer {
    fn max_components(&self) -> u32 {
        MAX_COMPONENTS
    }

    fn channels(&self) -> RangeInclusive<usize> {
        COLOR_CHANNELS..=COLOR_CHANNELS + 1
    }

    fn pack(&self, quantized: &Quantized) -> Result<String, BlurhashError> {
        let header = &quantized.header;
        for (component, value) in [("x", header.components_x), ("y", header.components_y)] {
            if !(1..=MAX_COMPONENTS).contains(&value) {
                return Err(BlurhashError::InvalidComponentCount {
                    component,
                    value,
                    max: MAX_COMPONENTS,
                });
            }
        }
        if header.dc.len() != COLOR_CHANNELS
            || quantized.ac.len() + 1 != quantized.component_count()
        {
            return Err(BlurhashError::EncodingError(format!(
                "expected {} AC cells of RGB, got {} cells and {} DC channels",
                quantized.component_count() - 1,
                quantized.ac.len(),
                header.dc.len()
            )));
        }

        let mut hash = String::with_capacity(encoded_len(header.components_x, header.components_y));
        let size_flag = (header.components_x - 1) + (header.components_y - 1) * 9;
        encode_into(size_flag.into(), 1, &mut hash)?;
        encode_into(header.ac_max.into(), 1, &mut hash)?;

        let mut dc_value = 0u64;
        for (&channel, field) in header.dc.iter().zip(["dc.r", "dc.g", "dc.b"]) {
            if channel > 0xff {
                return Err(BlurhashError::ValueOutOfRange {
                    field,
                    value: channel.into(),
                    bits: 8,
                });
            }
            dc_value = (dc_value << 8) | u64::from(channel);
        }
        encode_into(dc_value, 4, &mut hash)?;

        for cell in &quantized.ac {
            let mut value = 0u64;
            for &level in cell {
                if !(0..AC_LEVELS).contains(&level) {
                    return Err(BlurhashError::EncodingError(format!(
                        "AC level {level} outside 0..{AC_LEVELS}"
                    )));
                }
                value = value * AC_LEVELS as u64 + level as u64;
            }
            encode_into(value, 2, &mut hash)?;
        }

        Ok(hash)
    }
}
