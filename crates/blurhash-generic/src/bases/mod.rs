//! Built-in bases: quantizer and packer pairs registered by default.

pub mod base64url;
pub mod base83;
