//! Forward DCT: project a linear-light image onto a small cosine basis.
//!
//! Each component (i, j) holds, per channel,
//! `(1 / (W * H)) * sum_y sum_x norm * cos(PI * i * x / W) * cos(PI * j * y / H) * sample`
//! where `norm` is 1 for the (0, 0) term and 2 otherwise. Cosine factors are
//! tabulated once per axis; with the `parallel` feature, components are
//! computed on the rayon pool and gathered in order.

use std::f64::consts::PI;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::BlurhashError;
use crate::image::{Image, MAX_DIMENSION};

/// Largest component count per axis [`transform`] accepts.
///
/// Bases declare tighter limits of their own; this one bounds the size of the
/// cosine tables.
pub const MAX_COMPONENTS: u32 = MAX_DIMENSION as u32;

#[cfg(test)]
thread_local! {
    static TRANSFORM_CALLS: std::cell::Cell<usize> = const { std::cell::Cell::new(0) };
}

/// Number of times [`transform`] ran on the current thread.
#[cfg(test)]
pub(crate) fn transform_calls() -> usize {
    TRANSFORM_CALLS.with(|calls| calls.get())
}

/// Frequency components of an image, row-major in (j, i) order.
///
/// Cell (0, 0) is the DC component (per-channel average); all other cells are
/// AC components.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentGrid {
    components_x: u32,
    components_y: u32,
    channels: usize,
    cells: Vec<Vec<f64>>,
}

impl ComponentGrid {
    /// Horizontal component count.
    pub fn components_x(&self) -> u32 {
        self.components_x
    }

    /// Vertical component count.
    pub fn components_y(&self) -> u32 {
        self.components_y
    }

    /// Channels per component.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Component for horizontal frequency `i` and vertical frequency `j`.
    pub fn get(&self, i: u32, j: u32) -> &[f64] {
        &self.cells[(j * self.components_x + i) as usize]
    }

    /// The DC component.
    pub fn dc(&self) -> &[f64] {
        &self.cells[0]
    }

    /// The AC components in row-major order.
    pub fn ac(&self) -> impl ExactSizeIterator<Item = &[f64]> + '_ {
        self.cells[1..].iter().map(Vec::as_slice)
    }

    /// All components, DC first.
    pub fn cells(&self) -> &[Vec<f64>] {
        &self.cells
    }
}

/// `table[k][n] = cos(PI * k * n / len)`.
fn cosine_table(components: u32, len: usize) -> Vec<Vec<f64>> {
    let lenf = len as f64;
    (0..components)
        .map(|k| {
            (0..len)
                .map(|n| (PI * k as f64 * n as f64 / lenf).cos())
                .collect()
        })
        .collect()
}

pub(crate) fn check_components(
    component: &'static str,
    value: u32,
    max: u32,
) -> Result<(), BlurhashError> {
    if (1..=max).contains(&value) {
        Ok(())
    } else {
        Err(BlurhashError::InvalidComponentCount {
            component,
            value,
            max,
        })
    }
}

/// Compute the `components_x * components_y` frequency components of `image`.
///
/// The image is expected to be in linear light.
///
/// # Errors
///
/// Returns [`BlurhashError::InvalidComponentCount`] unless both counts are in
/// `1..=MAX_COMPONENTS`.
///
/// # Examples
///
/// ```
/// use blurhash_generic::{transform, Image};
/// let image = Image::new(vec![vec![vec![0.2], vec![0.6]]]).unwrap();
/// let grid = transform(&image, 2, 1).unwrap();
/// assert!((grid.dc()[0] - 0.4).abs() < 1e-12);
/// assert!(transform(&image, 0, 1).is_err());
/// ```
pub fn transform(
    image: &Image,
    components_x: u32,
    components_y: u32,
) -> Result<ComponentGrid, BlurhashError> {
    check_components("x", components_x, MAX_COMPONENTS)?;
    check_components("y", components_y, MAX_COMPONENTS)?;

    #[cfg(test)]
    TRANSFORM_CALLS.with(|calls| calls.set(calls.get() + 1));

    let width = image.width();
    let height = image.height();
    let channels = image.channels();
    let cos_x = cosine_table(components_x, width);
    let cos_y = cosine_table(components_y, height);
    let scale = 1.0 / (width as f64 * height as f64);

    let component = |index: u32| -> Vec<f64> {
        let i = (index % components_x) as usize;
        let j = (index / components_x) as usize;
        let norm_factor = if i == 0 && j == 0 { 1.0 } else { 2.0 };
        let mut sums = vec![0.0f64; channels];

        for (y, &cy) in cos_y[j].iter().enumerate() {
            let row = image.row(y);
            for (pixel, &cx) in row.chunks_exact(channels).zip(&cos_x[i]) {
                let basis = norm_factor * cx * cy;
                for (sum, &sample) in sums.iter_mut().zip(pixel) {
                    *sum += basis * sample;
                }
            }
        }

        for sum in &mut sums {
            *sum *= scale;
        }
        sums
    };

    let count = components_x * components_y;
    #[cfg(feature = "parallel")]
    let cells: Vec<Vec<f64>> = (0..count).into_par_iter().map(component).collect();
    #[cfg(not(feature = "parallel"))]
    let cells: Vec<Vec<f64>> = (0..count).map(component).collect();

    Ok(ComponentGrid {
        components_x,
        components_y,
        channels,
        cells,
    })
}
