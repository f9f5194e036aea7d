//! The `"base64-url"` base: RGBA, 6-bit fields, URL-safe base64 without padding.
//!
//! Every 24-bit word becomes four symbols of the alphabet `A-Z a-z 0-9 - _`.
//! Fields, most significant first:
//!
//! ```text
//! word 0   escape (6) = 0 | type (6) = 0x17 | cx - 1 (3) | cy - 1 (3) | ac_max (6)
//! word 1   DC as RGBA 5-6-5-8
//! word 2.. one word per AC cell, 6 bits per channel, R G B A
//! ```
//!
//! The escape field is 0 because a zero size is meaningless in the classical
//! format, which lets a reader tell the two apart. AC values are quantized as
//! signed `trunc(v * 31)` and stored offset by 32, so zero detail packs as 32.
//!
//! With samples in \[0.0, 1.0\] no AC term exceeds 2.0 in magnitude: the
//! unshifted basis makes every odd term of a one pixel wide (or tall) image
//! twice the pixel mean. The header therefore stores `trunc(ac_max / 2 * 63)`,
//! and a reader recovers the bound as `stored * 2 / 63` and each AC value as
//! `(stored - 32) / 31` times that bound. Out-of-range linear input that pushes
//! the bound past 2.0 is rejected rather than clamped.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use std::ops::RangeInclusive;

use crate::error::BlurhashError;
use crate::normalize::NormalizedGrid;
use crate::quantize::{Quantized, QuantizedHeader};
use crate::registry::Packer;

/// Registry id of this base.
pub const ID: &str = "base64-url";

/// Type tag identifying this packing.
pub const TYPE_TAG: u8 = 0x17;

const ESCAPE: u8 = 0;

/// Largest component count per axis (3-bit field storing `count - 1`).
pub const MAX_COMPONENTS: u32 = 8;

/// Channels per pixel (RGBA).
pub const CHANNELS: usize = 4;

/// Symbols in the header.
pub const HEADER_LEN: usize = 8;

/// Symbols per AC cell.
pub const GROUP_LEN: usize = 4;

/// Stored value of an AC channel with no detail.
pub const AC_ZERO: u32 = 32;

const DC_LEVELS: [f64; CHANNELS] = [31.0, 63.0, 31.0, 255.0];
const DC_BITS: [u32; CHANNELS] = [5, 6, 5, 8];
const DC_FIELDS: [&str; CHANNELS] = ["dc.r", "dc.g", "dc.b", "dc.a"];
const AC_BITS: u32 = 6;
const AC_SCALE: f64 = 31.0;
const AC_MAX_LEVELS: f64 = 63.0;

/// Largest AC magnitude an image with samples in \[0.0, 1.0\] can produce.
pub const AC_MAX_RANGE: f64 = 2.0;

/// Length of a hash with the given component counts.
pub fn encoded_len(components_x: u32, components_y: u32) -> usize {
    HEADER_LEN + GROUP_LEN * (components_x * components_y).saturating_sub(1) as usize
}

fn check_channels(channels: usize) -> Result<(), BlurhashError> {
    if channels == CHANNELS {
        Ok(())
    } else {
        Err(BlurhashError::UnsupportedChannelCount {
            channels,
            min: CHANNELS,
            max: CHANNELS,
        })
    }
}

/// Quantize normalized components for this base.
///
/// DC channels are truncated to 5-6-5-8 bit levels, `ac_max / AC_MAX_RANGE`
/// to 0..=63 and every AC value to -31..=31.
///
/// # Errors
///
/// Returns [`BlurhashError::UnsupportedChannelCount`] unless the grid is RGBA,
/// and [`BlurhashError::ValueOutOfRange`] naming `ac_max` if the AC bound
/// exceeds [`AC_MAX_RANGE`].
pub fn quantize(normalized: &NormalizedGrid) -> Result<Quantized, BlurhashError> {
    check_channels(normalized.channels())?;

    let dc = normalized
        .dc()
        .iter()
        .zip(DC_LEVELS)
        .map(|(&v, levels)| (v.clamp(0.0, 1.0) * levels) as u32)
        .collect();
    let ac_max = (normalized.ac_max() / AC_MAX_RANGE * AC_MAX_LEVELS).trunc();
    if !(0.0..=AC_MAX_LEVELS).contains(&ac_max) {
        return Err(BlurhashError::ValueOutOfRange {
            field: "ac_max",
            value: ac_max as i64,
            bits: AC_BITS,
        });
    }
    let ac = normalized
        .ac()
        .iter()
        .map(|cell| cell.iter().map(|&v| (v * AC_SCALE) as i32).collect())
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

/// Shift `word` left by `bits` and store `value` in the freed bits.
fn push_field(
    word: u32,
    value: i64,
    bits: u32,
    field: &'static str,
) -> Result<u32, BlurhashError> {
    if !(0..1i64 << bits).contains(&value) {
        return Err(BlurhashError::ValueOutOfRange { field, value, bits });
    }
    Ok((word << bits) | value as u32)
}

fn push_word(bytes: &mut Vec<u8>, word: u32) {
    bytes.extend_from_slice(&word.to_be_bytes()[1..]);
}

/// Packer for the `"base64-url"` base.
#[derive(Debug, Clone, Copy, Default)]
pub struct Base64UrlPacker;

impl Packer for Base64UrlPacker {
    fn max_components(&self) -> u32 {
        MAX_COMPONENTS
    }

    fn channels(&self) -> RangeInclusive<usize> {
        CHANNELS..=CHANNELS
    }

    fn pack(&self, quantized: &Quantized) -> Result<String, BlurhashError> {
        let header = &quantized.header;
        check_channels(header.dc.len())?;
        if quantized.ac.len() + 1 != quantized.component_count() {
            return Err(BlurhashError::EncodingError(format!(
                "header declares {} components but {} AC cells were given",
                quantized.component_count(),
                quantized.ac.len()
            )));
        }

        let mut bytes = Vec::with_capacity(3 * (quantized.ac.len() + 2));

        let mut word = push_field(0, ESCAPE.into(), 6, "escape")?;
        word = push_field(word, TYPE_TAG.into(), 6, "type")?;
        word = push_field(word, i64::from(header.components_x) - 1, 3, "components_x - 1")?;
        word = push_field(word, i64::from(header.components_y) - 1, 3, "components_y - 1")?;
        word = push_field(word, header.ac_max.into(), 6, "ac_max")?;
        push_word(&mut bytes, word);

        let mut dc_word = 0;
        for ((&value, bits), field) in header.dc.iter().zip(DC_BITS).zip(DC_FIELDS) {
            dc_word = push_field(dc_word, value.into(), bits, field)?;
        }
        push_word(&mut bytes, dc_word);

        for cell in &quantized.ac {
            check_channels(cell.len())?;
            let mut ac_word = 0;
            for &value in cell {
                let stored = i64::from(value) + i64::from(AC_ZERO);
                ac_word = push_field(ac_word, stored, AC_BITS, "ac")?;
            }
            push_word(&mut bytes, ac_word);
        }

        // Whole 3-byte words encode to whole 4-symbol groups, so no bits are
        // shared between cells.
        Ok(URL_SAFE_NO_PAD.encode(bytes))
    }
}

/// Header fields of a `"base64-url"` hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Base64UrlHeader {
    /// Horizontal component count.
    pub components_x: u32,
    /// Vertical component count.
    pub components_y: u32,
    /// Quantized AC bound (0..=63).
    pub ac_max: u32,
    /// Quantized DC as RGBA 5-6-5-8.
    pub dc: [u32; CHANNELS],
}

fn word_at(bytes: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([0, bytes[offset], bytes[offset + 1], bytes[offset + 2]])
}

/// Parse and validate the header of a `"base64-url"` hash.
///
/// # Errors
///
/// Returns [`BlurhashError::InvalidLength`] if the hash is shorter than the
/// header or its length disagrees with the declared component counts,
/// [`BlurhashError::InvalidBase64`] for characters outside the alphabet, and
/// [`BlurhashError::UnknownFormat`] if the escape or type field is wrong.
///
/// # Examples
///
/// ```
/// use blurhash_generic::base64url::parse_header;
/// let header = parse_header("AXAA-AD_").unwrap();
/// assert_eq!((header.components_x, header.components_y), (1, 1));
/// assert_eq!(header.dc, [31, 0, 0, 255]);
/// ```
pub fn parse_header(hash: &str) -> Result<Base64UrlHeader, BlurhashError> {
    if hash.len() < HEADER_LEN {
        return Err(BlurhashError::InvalidLength {
            expected: HEADER_LEN,
            actual: hash.len(),
        });
    }
    let bytes = URL_SAFE_NO_PAD.decode(&hash.as_bytes()[..HEADER_LEN])?;
    let first = word_at(&bytes, 0);
    let second = word_at(&bytes, 3);

    let escape = ((first >> 18) & 0x3f) as u8;
    let tag = ((first >> 12) & 0x3f) as u8;
    if escape != ESCAPE || tag != TYPE_TAG {
        return Err(BlurhashError::UnknownFormat { escape, tag });
    }

    let header = Base64UrlHeader {
        components_x: ((first >> 9) & 0x7) + 1,
        components_y: ((first >> 6) & 0x7) + 1,
        ac_max: first & 0x3f,
        dc: [
            (second >> 19) & 0x1f,
            (second >> 13) & 0x3f,
            (second >> 8) & 0x1f,
            second & 0xff,
        ],
    };

    let expected = encoded_len(header.components_x, header.components_y);
    if hash.len() != expected {
        return Err(BlurhashError::InvalidLength {
            expected,
            actual: hash.len(),
        });
    }
    Ok(header)
}
