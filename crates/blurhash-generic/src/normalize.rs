//! Split DC from AC and rescale the AC components to \[-1.0, 1.0\].

use tracing::debug;

use crate::error::BlurhashError;
use crate::transform::{check_components, ComponentGrid, MAX_COMPONENTS};

/// Components after normalization.
///
/// The DC component keeps its original domain. AC values are divided by
/// [`ac_max`](NormalizedGrid::ac_max), the largest absolute AC value across
/// all cells and channels, so the largest magnitude becomes exactly 1.0. When
/// every AC value is zero, `ac_max` is 0 and the AC values stay zero.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedGrid {
    components_x: u32,
    components_y: u32,
    ac_max: f64,
    dc: Vec<f64>,
    ac: Vec<Vec<f64>>,
}

impl NormalizedGrid {
    /// Build a grid from already-normalized parts.
    ///
    /// # Errors
    ///
    /// Returns [`BlurhashError::InvalidComponentCount`] for a zero count and
    /// [`BlurhashError::InvalidComponentGrid`] unless `ac` holds
    /// `components_x * components_y - 1` cells, each with as many channels as
    /// `dc`.
    ///
    /// # Examples
    ///
    /// ```
    /// use blurhash_generic::NormalizedGrid;
    /// let grid = NormalizedGrid::from_parts(2, 1, 0.5, vec![0.2], vec![vec![1.0]]).unwrap();
    /// assert_eq!(grid.channels(), 1);
    /// assert!(NormalizedGrid::from_parts(2, 1, 0.5, vec![0.2, 0.3], vec![vec![1.0]]).is_err());
    /// ```
    pub fn from_parts(
        components_x: u32,
        components_y: u32,
        ac_max: f64,
        dc: Vec<f64>,
        ac: Vec<Vec<f64>>,
    ) -> Result<Self, BlurhashError> {
        check_components("x", components_x, MAX_COMPONENTS)?;
        check_components("y", components_y, MAX_COMPONENTS)?;
        let cells = (components_x * components_y) as usize - 1;
        if ac.len() != cells {
            return Err(BlurhashError::InvalidComponentGrid {
                expected: cells,
                actual: ac.len(),
                reason: "AC cell count",
            });
        }
        if let Some(cell) = ac.iter().find(|cell| cell.len() != dc.len()) {
            return Err(BlurhashError::InvalidComponentGrid {
                expected: dc.len(),
                actual: cell.len(),
                reason: "AC cell channel count",
            });
        }
        Ok(Self {
            components_x,
            components_y,
            ac_max,
            dc,
            ac,
        })
    }

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
        self.dc.len()
    }

    /// The pre-rescale bound on AC magnitudes.
    pub fn ac_max(&self) -> f64 {
        self.ac_max
    }

    /// The unnormalized DC component.
    pub fn dc(&self) -> &[f64] {
        &self.dc
    }

    /// Normalized AC components in row-major order, DC cell excluded.
    pub fn ac(&self) -> &[Vec<f64>] {
        &self.ac
    }
}

/// Normalize the AC components of `components` by their largest magnitude.
///
/// # Examples
///
/// ```
/// use blurhash_generic::{normalize, transform, Image};
/// let image = Image::new(vec![vec![vec![0.5], vec![0.0]]]).unwrap();
/// let normalized = normalize(&transform(&image, 2, 1).unwrap());
/// assert!((normalized.ac_max() - 0.5).abs() < 1e-12);
/// assert!((normalized.ac()[0][0] - 1.0).abs() < 1e-12);
/// ```
pub fn normalize(components: &ComponentGrid) -> NormalizedGrid {
    // max(value) and -min(value) over every AC channel value
    let (hi, lo) = components
        .ac()
        .flatten()
        .fold((0.0f64, 0.0f64), |(hi, lo), &v| (hi.max(v), lo.min(v)));
    let ac_max = hi.max(-lo);

    let ac = if ac_max > 0.0 {
        components
            .ac()
            .map(|cell| cell.iter().map(|&v| v / ac_max).collect())
            .collect()
    } else {
        debug!("all AC components are zero");
        components
            .ac()
            .map(|cell| vec![0.0; cell.len()])
            .collect()
    };

    NormalizedGrid {
        components_x: components.components_x(),
        components_y: components.components_y(),
        ac_max,
        dc: components.dc().to_vec(),
        ac,
    }
}
