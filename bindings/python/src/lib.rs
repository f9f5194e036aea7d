use pyo3::exceptions::{PyKeyError, PyValueError};
use pyo3::prelude::*;

use blurhash_generic::{BlurhashError, ErrorKind, Image};

/// Convert a `BlurhashError` into a Python exception.
///
/// Unknown bases raise `KeyError`; everything else raises `ValueError`.
fn to_py_err(e: BlurhashError) -> PyErr {
    match e.kind() {
        ErrorKind::UnsupportedBase => PyKeyError::new_err(e.to_string()),
        _ => PyValueError::new_err(e.to_string()),
    }
}

/// Encode 8-bit sRGB RGBA pixel data into a hash string.
///
/// Args:
///     data: Raw pixel bytes in RGBA order (length must be width * height * 4).
///     width: Image width in pixels.
///     height: Image height in pixels.
///     components_x: Number of horizontal components.
///     components_y: Number of vertical components.
///     base: Registered base to pack with ("base64-url" or "base83").
///
/// Returns:
///     The hash string.
#[pyfunction]
#[pyo3(signature = (data, width, height, components_x = 4, components_y = 3, base = "base64-url"))]
fn encode(
    py: Python<'_>,
    data: &[u8],
    width: u32,
    height: u32,
    components_x: u32,
    components_y: u32,
    base: &str,
) -> PyResult<String> {
    let image = Image::from_rgba8(data, width, height).map_err(to_py_err)?;
    py.allow_threads(|| {
        blurhash_generic::encode(&image, components_x, components_y, false, base)
    })
    .map_err(to_py_err)
}

/// Names of the registered bases.
#[pyfunction]
fn bases() -> Vec<String> {
    blurhash_generic::registered_bases()
}

/// Extract the number of X and Y components from a hash.
///
/// Args:
///     hash: A "base64-url" or "base83" hash.
///
/// Returns:
///     A tuple (components_x, components_y).
#[pyfunction]
fn components(hash: &str) -> PyResult<(u32, u32)> {
    match blurhash_generic::base64url::parse_header(hash) {
        Ok(header) => Ok((header.components_x, header.components_y)),
        Err(_) => blurhash_generic::base83::components(hash).map_err(to_py_err),
    }
}

/// Convert an sRGB byte value (0-255) to linear RGB (0.0-1.0).
#[pyfunction]
fn srgb_to_linear(value: u8) -> f64 {
    blurhash_generic::color::srgb_to_linear(value)
}

/// Convert a linear RGB value (0.0-1.0) to an sRGB byte value (0-255).
#[pyfunction]
fn linear_to_srgb(value: f64) -> u8 {
    blurhash_generic::color::linear_to_srgb(value)
}

/// BlurHash encoding with pluggable output formats (Rust-powered).
#[pymodule]
fn blurhash(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(encode, m)?)?;
    m.add_function(wrap_pyfunction!(bases, m)?)?;
    m.add_function(wrap_pyfunction!(components, m)?)?;
    m.add_function(wrap_pyfunction!(srgb_to_linear, m)?)?;
    m.add_function(wrap_pyfunction!(linear_to_srgb, m)?)?;
    Ok(())
}
