//! Decoded image grid consumed by the encoding pipeline.
//!
//! An [`Image`] is a validated `[row][col][channel]` grid of float samples in
//! \[0.0, 1.0\], stored flat in row-major order.

use crate::color::{srgb_to_linear, srgb_to_linear_f64};
use crate::error::BlurhashError;

/// Largest accepted width or height, to bound the transform's CPU and memory use.
pub const MAX_DIMENSION: usize = 10_000;

/// Number of leading channels that carry gamma-encoded colour.
const COLOR_CHANNELS: usize = 3;

/// A rectangular grid of per-pixel channel samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    width: usize,
    height: usize,
    channels: usize,
    samples: Vec<f64>,
}

impl Image {
    /// Build an image from a nested `[row][col][channel]` grid.
    ///
    /// # Errors
    ///
    /// Returns a dimension error if the grid is empty, if rows differ in
    /// width, or if pixels differ in channel count.
    ///
    /// # Examples
    ///
    /// ```
    /// use blurhash_generic::Image;
    /// let image = Image::new(vec![vec![vec![1.0, 0.0, 0.0, 1.0]]]).unwrap();
    /// assert_eq!((image.width(), image.height(), image.channels()), (1, 1, 4));
    /// ```
    pub fn new(rows: Vec<Vec<Vec<f64>>>) -> Result<Self, BlurhashError> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        let channels = rows
            .first()
            .and_then(|row| row.first())
            .map_or(0, Vec::len);
        check_dimensions(width, height)?;
        if channels == 0 {
            return Err(BlurhashError::InvalidDimensions {
                width,
                height,
                reason: "pixels must have at least one channel",
            });
        }

        let mut samples = Vec::with_capacity(width * height * channels);
        for (y, row) in rows.into_iter().enumerate() {
            if row.len() != width {
                return Err(BlurhashError::RaggedRow {
                    row: y,
                    expected: width,
                    actual: row.len(),
                });
            }
            for (x, pixel) in row.into_iter().enumerate() {
                if pixel.len() != channels {
                    return Err(BlurhashError::RaggedPixel {
                        row: y,
                        col: x,
                        expected: channels,
                        actual: pixel.len(),
                    });
                }
                samples.extend(pixel);
            }
        }

        Ok(Self {
            width,
            height,
            channels,
            samples,
        })
    }

    /// Build an image from a flat row-major sample buffer.
    ///
    /// # Errors
    ///
    /// Returns [`BlurhashError::InvalidDimensions`] if a dimension is zero or
    /// too large, or if `samples.len() != width * height * channels`.
    pub fn from_samples(
        samples: Vec<f64>,
        width: usize,
        height: usize,
        channels: usize,
    ) -> Result<Self, BlurhashError> {
        check_dimensions(width, height)?;
        if channels == 0 {
            return Err(BlurhashError::InvalidDimensions {
                width,
                height,
                reason: "pixels must have at least one channel",
            });
        }
        if samples.len() != width * height * channels {
            return Err(BlurhashError::InvalidDimensions {
                width,
                height,
                reason: "sample buffer length does not match width * height * channels",
            });
        }
        Ok(Self {
            width,
            height,
            channels,
            samples,
        })
    }

    /// Build an image from 8-bit RGBA bytes, scaled to \[0.0, 1.0\].
    ///
    /// The samples stay gamma-encoded; encode the result with `is_linear = false`.
    ///
    /// # Examples
    ///
    /// ```
    /// use blurhash_generic::Image;
    /// let image = Image::from_rgba8(&[255, 0, 0, 255], 1, 1).unwrap();
    /// assert_eq!(image.pixel(0, 0), &[1.0, 0.0, 0.0, 1.0]);
    /// ```
    pub fn from_rgba8(pixels: &[u8], width: u32, height: u32) -> Result<Self, BlurhashError> {
        let (w, h) = rgba8_dimensions(pixels, width, height)?;
        let samples = pixels.iter().map(|&b| b as f64 / 255.0).collect();
        Self::from_samples(samples, w, h, 4)
    }

    /// Build a linear-light image from 8-bit sRGB RGBA bytes.
    ///
    /// Colour channels go through the sRGB lookup table; alpha is only scaled.
    /// Encode the result with `is_linear = true`.
    pub fn linear_from_rgba8(
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Self, BlurhashError> {
        let (w, h) = rgba8_dimensions(pixels, width, height)?;
        let samples = pixels
            .chunks_exact(4)
            .flat_map(|px| {
                [
                    srgb_to_linear(px[0]),
                    srgb_to_linear(px[1]),
                    srgb_to_linear(px[2]),
                    px[3] as f64 / 255.0,
                ]
            })
            .collect();
        Self::from_samples(samples, w, h, 4)
    }

    /// Image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Channels per pixel.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// All samples of row `y`, `width * channels` long.
    #[inline]
    pub fn row(&self, y: usize) -> &[f64] {
        let stride = self.width * self.channels;
        &self.samples[y * stride..(y + 1) * stride]
    }

    /// The channel samples of pixel (`x`, `y`).
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> &[f64] {
        let start = (y * self.width + x) * self.channels;
        &self.samples[start..start + self.channels]
    }

    /// Flat row-major samples.
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Return a copy with the sRGB transfer function removed from the colour
    /// channels. Channels past the third (alpha) are stored linearly already
    /// and are copied unchanged.
    pub fn linearize(&self) -> Self {
        let samples = self
            .samples
            .chunks_exact(self.channels)
            .flat_map(|px| {
                px.iter().enumerate().map(|(c, &v)| {
                    if c < COLOR_CHANNELS {
                        srgb_to_linear_f64(v)
                    } else {
                        v
                    }
                })
            })
            .collect();
        Self {
            width: self.width,
            height: self.height,
            channels: self.channels,
            samples,
        }
    }
}

fn check_dimensions(width: usize, height: usize) -> Result<(), BlurhashError> {
    if width == 0 || height == 0 {
        return Err(BlurhashError::InvalidDimensions {
            width,
            height,
            reason: "width and height must be > 0",
        });
    }
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(BlurhashError::InvalidDimensions {
            width,
            height,
            reason: "dimensions must be <= 10000",
        });
    }
    Ok(())
}

fn rgba8_dimensions(
    pixels: &[u8],
    width: u32,
    height: u32,
) -> Result<(usize, usize), BlurhashError> {
    let (w, h) = (width as usize, height as usize);
    check_dimensions(w, h)?;
    if pixels.len() != w * h * 4 {
        return Err(BlurhashError::InvalidDimensions {
            width: w,
            height: h,
            reason: "pixel buffer length does not match width * height * 4",
        });
    }
    Ok((w, h))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_new_flattens_row_major() {
        let image = Image::new(vec![
            vec![vec![0.1, 0.2], vec![0.3, 0.4]],
            vec![vec![0.5, 0.6], vec![0.7, 0.8]],
        ])
        .unwrap();
        assert_eq!(image.width(), 2);
        assert_eq!(image.height(), 2);
        assert_eq!(image.channels(), 2);
        assert_eq!(image.pixel(1, 0), &[0.3, 0.4]);
        assert_eq!(image.row(1), &[0.5, 0.6, 0.7, 0.8]);
    }

    #[test]
    fn test_new_rejects_empty() {
        let err = Image::new(vec![]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Dimension);
        assert!(Image::new(vec![vec![]]).is_err());
        assert!(Image::new(vec![vec![vec![]]]).is_err());
    }

    #[test]
    fn test_new_rejects_ragged_rows() {
        let err = Image::new(vec![
            vec![vec![0.0; 4], vec![0.0; 4]],
            vec![vec![0.0; 4]],
        ])
        .unwrap_err();
        assert_eq!(
            err,
            BlurhashError::RaggedRow {
                row: 1,
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn test_new_rejects_ragged_pixels() {
        let err = Image::new(vec![vec![vec![0.0; 4], vec![0.0; 3]]]).unwrap_err();
        assert_eq!(
            err,
            BlurhashError::RaggedPixel {
                row: 0,
                col: 1,
                expected: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn test_from_rgba8_validates_length() {
        assert!(Image::from_rgba8(&[0u8; 15], 2, 2).is_err());
        assert!(Image::from_rgba8(&[0u8; 16], 2, 2).is_ok());
        assert!(Image::from_rgba8(&[], 0, 0).is_err());
    }

    #[test]
    fn test_linearize_leaves_alpha() {
        let image = Image::from_rgba8(&[128, 128, 128, 128], 1, 1).unwrap();
        let linear = image.linearize();
        let px = linear.pixel(0, 0);
        assert_abs_diff_eq!(px[0], srgb_to_linear(128), epsilon = 1e-12);
        assert_abs_diff_eq!(px[3], 128.0 / 255.0, epsilon = 1e-12);
    }

    #[test]
    fn test_linear_from_rgba8_matches_linearize() {
        let bytes: Vec<u8> = (0..64u8).map(|v| v * 4).collect();
        let direct = Image::linear_from_rgba8(&bytes, 4, 4).unwrap();
        let via_float = Image::from_rgba8(&bytes, 4, 4).unwrap().linearize();
        for (a, b) in direct.samples().iter().zip(via_float.samples()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-12);
        }
    }
}
