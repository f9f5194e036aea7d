//! Error types for the encoding pipeline and header inspection.

use thiserror::Error;

/// Errors that can occur while encoding an image or inspecting a hash.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlurhashError {
    /// No quantizer/packer pair is registered under the requested id.
    #[error("unsupported base: {0:?}")]
    UnsupportedBase(String),

    /// The image dimensions are invalid (zero, too large, or not matching the buffer).
    #[error("invalid dimensions: {width}x{height} ({reason})")]
    InvalidDimensions {
        /// The width value.
        width: usize,
        /// The height value.
        height: usize,
        /// Why the dimensions are invalid.
        reason: &'static str,
    },

    /// A row of the image grid has a different width than the first row.
    #[error("ragged image: row {row} has {actual} pixels, expected {expected}")]
    RaggedRow {
        /// Index of the offending row.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        actual: usize,
    },

    /// A pixel has a different channel count than the first pixel.
    #[error("ragged image: pixel ({row}, {col}) has {actual} channels, expected {expected}")]
    RaggedPixel {
        /// Row of the offending pixel.
        row: usize,
        /// Column of the offending pixel.
        col: usize,
        /// Channel count of the first pixel.
        expected: usize,
        /// Channel count of the offending pixel.
        actual: usize,
    },

    /// The component count is outside the range the target base can encode.
    #[error("component count out of range: {component} = {value} (must be 1..={max})")]
    InvalidComponentCount {
        /// Which component axis ("x" or "y").
        component: &'static str,
        /// The invalid value.
        value: u32,
        /// Largest count the base can encode.
        max: u32,
    },

    /// The image channel count is not accepted by the target base.
    #[error("unsupported channel count {channels} (base accepts {min}..={max})")]
    UnsupportedChannelCount {
        /// Channels per pixel in the image.
        channels: usize,
        /// Fewest channels the base accepts.
        min: usize,
        /// Most channels the base accepts.
        max: usize,
    },

    /// A component grid built from parts is not shaped as its counts declare.
    #[error("invalid component grid: {reason} (expected {expected}, got {actual})")]
    InvalidComponentGrid {
        /// The expected cell or channel count.
        expected: usize,
        /// The count that was given.
        actual: usize,
        /// What does not match.
        reason: &'static str,
    },

    /// A quantized value does not fit the bit field its packer reserves for it.
    #[error("value out of range: {field} = {value} does not fit in {bits} bits")]
    ValueOutOfRange {
        /// Name of the packed field.
        field: &'static str,
        /// The offending value.
        value: i64,
        /// Width of the field.
        bits: u32,
    },

    /// The hash has an invalid length for its header.
    #[error("invalid hash length: expected {expected}, got {actual}")]
    InvalidLength {
        /// The expected length.
        expected: usize,
        /// The actual length.
        actual: usize,
    },

    /// An invalid character was encountered during base83 decoding.
    #[error("invalid base83 character: {0:?}")]
    InvalidBase83Character(char),

    /// The hash is not valid padding-free URL-safe base64.
    #[error("invalid base64url data: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    /// The escape or type field of a base64url header is not recognised.
    #[error("unknown hash format: escape {escape}, type {tag}")]
    UnknownFormat {
        /// Value of the leading escape field.
        escape: u8,
        /// Value of the type field.
        tag: u8,
    },

    /// A general encoding error.
    #[error("encoding error: {0}")]
    EncodingError(String),
}

/// Coarse classification of [`BlurhashError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The requested base has no registered quantizer/packer.
    UnsupportedBase,
    /// The image grid or the component counts are unusable.
    Dimension,
    /// A quantized value does not fit its packed bit width.
    Range,
    /// An existing hash could not be parsed.
    Format,
}

impl BlurhashError {
    /// Returns the kind of failure this error represents.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedBase(_) => ErrorKind::UnsupportedBase,
            Self::InvalidDimensions { .. }
            | Self::RaggedRow { .. }
            | Self::RaggedPixel { .. }
            | Self::InvalidComponentCount { .. }
            | Self::UnsupportedChannelCount { .. }
            | Self::InvalidComponentGrid { .. } => ErrorKind::Dimension,
            Self::ValueOutOfRange { .. } => ErrorKind::Range,
            Self::InvalidLength { .. }
            | Self::InvalidBase83Character(_)
            | Self::InvalidBase64(_)
            | Self::UnknownFormat { .. }
            | Self::EncodingError(_) => ErrorKind::Format,
        }
    }
}
