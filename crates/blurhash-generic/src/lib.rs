//! # blurhash-generic
//!
//! BlurHash encoding with pluggable output formats.
//!
//! An image is linearized, projected onto a small grid of cosine components,
//! normalized, and then handed to a *base*: a quantizer that turns the
//! components into integers plus a packer that lays those integers out as a
//! string. Bases live in a [`Registry`] keyed by name. Two are built in:
//!
//! - `"base64-url"`: RGBA, up to 8x8 components, URL-safe base64 symbols.
//! - `"base83"`: classical BlurHash, RGB, up to 9x9 components.
//!
//! ## Quick Start
//!
//! ```
//! use blurhash_generic::{encode, Image};
//!
//! // 2x2 opaque red image
//! let pixels = [255, 0, 0, 255].repeat(4);
//! let image = Image::from_rgba8(&pixels, 2, 2).unwrap();
//!
//! let hash = encode(&image, 4, 3, false, "base64-url").unwrap();
//! assert_eq!(hash.len(), 8 + 4 * 11);
//!
//! let classic = encode(&image, 4, 3, false, "base83").unwrap();
//! assert_eq!(classic.len(), 28);
//! ```
//!
//! ## Features
//!
//! - `parallel`: compute components on the rayon thread pool.

pub mod bases;
pub mod color;
pub mod error;
pub mod image;
pub mod normalize;
pub mod quantize;
pub mod registry;
pub mod transform;

pub use bases::{base64url, base83};
pub use color::{linear_to_srgb, sign_pow, srgb_to_linear, srgb_to_linear_f64};
pub use error::{BlurhashError, ErrorKind};
pub use image::{Image, MAX_DIMENSION};
pub use normalize::{normalize, NormalizedGrid};
pub use quantize::{Quantized, QuantizedHeader};
pub use registry::{
    encode, encode_with, encode_with_options, register_base, registered_bases, Base,
    EncodeOptions, Packer, Quantizer, Registry,
};
pub use transform::{transform, ComponentGrid};
