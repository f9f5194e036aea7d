use blurhash_generic::{
    base64url, base83, encode, encode_with_options, register_base, registered_bases,
    BlurhashError, EncodeOptions, ErrorKind, Image, NormalizedGrid, Packer, Quantized,
    QuantizedHeader, Registry,
};
use std::ops::RangeInclusive;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn rgba_image(width: u32, height: u32, pixel: impl Fn(u32, u32) -> [u8; 4]) -> Image {
    let mut pixels = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            pixels.extend_from_slice(&pixel(x, y));
        }
    }
    Image::from_rgba8(&pixels, width, height).unwrap()
}

fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Image {
    rgba_image(width, height, |_, _| rgba)
}

fn gradient(width: u32, height: u32) -> Image {
    rgba_image(width, height, |x, y| {
        [
            (x * 255 / width) as u8,
            (y * 255 / height) as u8,
            128,
            255 - (x * 100 / width) as u8,
        ]
    })
}

/// The 4-symbol groups after the header.
fn groups(hash: &str) -> Vec<&str> {
    hash.as_bytes()[base64url::HEADER_LEN..]
        .chunks(base64url::GROUP_LEN)
        .map(|chunk| std::str::from_utf8(chunk).unwrap())
        .collect()
}

// ===========================================================================
// base64-url
// ===========================================================================

#[test]
fn base64url_single_red_pixel() {
    let hash = encode(&solid(1, 1, [255, 0, 0, 255]), 1, 1, false, "base64-url").unwrap();
    assert_eq!(hash, "AXAA-AD_");
}

#[test]
fn base64url_flat_gray() {
    let hash = encode(&solid(4, 4, [128, 128, 128, 255]), 3, 1, false, "base64-url").unwrap();
    assert_eq!(hash, "AXQPMab_mmm_gggg");
}

#[test]
fn base64url_transparent_black_has_no_detail() {
    let hash = encode(&solid(5, 3, [0, 0, 0, 0]), 4, 3, false, "base64-url").unwrap();
    let header = base64url::parse_header(&hash).unwrap();
    assert_eq!(header.ac_max, 0);
    assert_eq!(header.dc, [0, 0, 0, 0]);
    assert!(groups(&hash).iter().all(|g| *g == "gggg"));
}

#[test]
fn base64url_flat_image_leaks_only_into_odd_terms() {
    // Sums of cos(PI * i * x / W) vanish for even i but are 1 for odd i.
    let hash = encode(&solid(6, 1, [40, 200, 90, 255]), 4, 1, false, "base64-url").unwrap();
    let body = groups(&hash);
    assert_eq!(body.len(), 3);
    assert_ne!(body[0], "gggg");
    assert_eq!(body[1], "gggg");
    assert_ne!(body[2], "gggg");
}

#[test]
fn base64url_alternating_columns() {
    let image = rgba_image(4, 1, |x, _| [255 * (x % 2) as u8, 0, 0, 255]);
    let hash = encode(&image, 2, 1, false, "base64-url").unwrap();
    assert_eq!(hash, "AXIPeAD_ggg_");
}

fn linear_gray(width: usize, height: usize, level: f64) -> Image {
    Image::new(vec![vec![vec![level, level, level, 1.0]; width]; height]).unwrap()
}

#[test]
fn base64url_one_pixel_wide_image_keeps_its_ac_bound() {
    // Every odd horizontal term of a one pixel wide image is twice its mean,
    // so opaque alpha alone reaches the largest bound of 2.0.
    let hash = encode(&linear_gray(1, 4, 0.5), 2, 1, true, "base64-url").unwrap();
    assert_eq!(hash, "AXI_e-__vvv_");
    assert_eq!(base64url::parse_header(&hash).unwrap().ac_max, 63);

    // Wider images leak less: 2/3 at width 3 and 1/2 at width 4.
    for (width, ac_max) in [(3, 21), (4, 15)] {
        let hash = encode(&linear_gray(width, 4, 0.5), 2, 1, true, "base64-url").unwrap();
        assert_eq!(base64url::parse_header(&hash).unwrap().ac_max, ac_max);
    }
}

#[test]
fn base64url_rejects_ac_bound_beyond_unit_samples() {
    let err = encode(&linear_gray(1, 4, 2.0), 2, 1, true, "base64-url").unwrap_err();
    assert!(matches!(
        err,
        BlurhashError::ValueOutOfRange {
            field: "ac_max",
            ..
        }
    ));
    assert_eq!(err.kind(), ErrorKind::Range);
}

#[test]
fn base64url_length_depends_only_on_components() {
    let images = [
        solid(1, 1, [0, 0, 0, 255]),
        gradient(7, 3),
        gradient(32, 32),
        solid(13, 2, [10, 20, 30, 40]),
    ];
    for (cx, cy) in [(1, 1), (4, 3), (8, 8), (1, 8), (5, 2)] {
        for image in &images {
            let hash = encode(image, cx, cy, false, "base64-url").unwrap();
            assert_eq!(hash.len(), 8 + 4 * (cx * cy - 1) as usize);
            assert_eq!(hash.len(), base64url::encoded_len(cx, cy));
            assert!(hash
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_'));
        }
    }
}

#[test]
fn base64url_header_reports_components() {
    let hash = encode(&gradient(16, 16), 6, 2, false, "base64-url").unwrap();
    let header = base64url::parse_header(&hash).unwrap();
    assert_eq!((header.components_x, header.components_y), (6, 2));
    assert!(header.ac_max > 0);
}

#[test]
fn base64url_normalized_extreme_is_saturated() {
    // The largest normalized magnitude is exactly 1.0, stored as 63 or 1.
    let hash = encode(&gradient(9, 9), 4, 4, false, "base64-url").unwrap();
    let body = &hash[base64url::HEADER_LEN..];
    assert!(body.contains('_') || body.contains('B'));
}

#[test]
fn base64url_rejects_nine_components() {
    let err = encode(&gradient(4, 4), 9, 1, false, "base64-url").unwrap_err();
    assert_eq!(
        err,
        BlurhashError::InvalidComponentCount {
            component: "x",
            value: 9,
            max: 8
        }
    );
}

#[test]
fn base64url_requires_alpha() {
    let rgb = Image::new(vec![vec![vec![0.1, 0.2, 0.3]]]).unwrap();
    let err = encode(&rgb, 1, 1, false, "base64-url").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Dimension);
}

// ===========================================================================
// base83
// ===========================================================================

#[test]
fn base83_solid_red() {
    let hash = encode(&solid(3, 3, [255, 0, 0, 255]), 1, 1, false, "base83").unwrap();
    assert_eq!(hash, "00TI:j");
}

#[test]
fn base83_lengths_and_components() {
    let image = gradient(20, 10);
    for (cx, cy) in [(1, 1), (4, 3), (9, 9), (3, 7)] {
        let hash = encode(&image, cx, cy, false, "base83").unwrap();
        assert_eq!(hash.len(), 4 + 2 * (cx * cy) as usize);
        assert_eq!(base83::components(&hash).unwrap(), (cx, cy));
    }
}

#[test]
fn base83_accepts_rgb_images() {
    let rgb = Image::new(vec![vec![vec![1.0, 0.0, 0.0]]]).unwrap();
    assert_eq!(encode(&rgb, 1, 1, false, "base83").unwrap(), "00TI:j");
}

#[test]
fn base83_rejects_ten_components() {
    let err = encode(&gradient(4, 4), 1, 10, false, "base83").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Dimension);
}

// ===========================================================================
// Pipeline behaviour
// ===========================================================================

#[test]
fn encoding_is_deterministic() {
    let image = gradient(24, 17);
    for base in ["base64-url", "base83"] {
        let first = encode(&image, 4, 3, false, base).unwrap();
        let second = encode(&image, 4, 3, false, base).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn linear_flag_skips_linearization() {
    let image = solid(2, 2, [128, 128, 128, 255]);
    let gamma = encode(&image, 1, 1, false, "base64-url").unwrap();
    let raw = encode(&image, 1, 1, true, "base64-url").unwrap();
    assert_eq!(base64url::parse_header(&gamma).unwrap().dc[0], 6);
    assert_eq!(base64url::parse_header(&raw).unwrap().dc[0], 15);
}

#[test]
fn unknown_base_is_rejected() {
    let err = encode(&gradient(4, 4), 4, 3, false, "base85").unwrap_err();
    assert_eq!(err, BlurhashError::UnsupportedBase("base85".to_string()));
    assert_eq!(err.kind(), ErrorKind::UnsupportedBase);
}

#[test]
fn ragged_images_are_rejected() {
    let err = Image::new(vec![vec![vec![0.0; 4]; 3], vec![vec![0.0; 4]; 2]]).unwrap_err();
    assert!(matches!(
        err,
        BlurhashError::RaggedRow {
            row: 1,
            expected: 3,
            actual: 2
        }
    ));

    let err = Image::new(vec![vec![vec![0.0; 4], vec![0.0; 3]]]).unwrap_err();
    assert!(matches!(err, BlurhashError::RaggedPixel { row: 0, col: 1, .. }));

    assert_eq!(Image::new(vec![]).unwrap_err().kind(), ErrorKind::Dimension);
}

#[test]
fn options_select_base_and_components() {
    let image = gradient(10, 10);
    let options = EncodeOptions::default().base("base83").components(3, 2);
    let hash = encode_with_options(&image, &options).unwrap();
    assert_eq!(hash, encode(&image, 3, 2, false, "base83").unwrap());

    let default_hash = encode_with_options(&image, &EncodeOptions::default()).unwrap();
    assert_eq!(default_hash.len(), base64url::encoded_len(4, 3));
}

// ===========================================================================
// Custom bases
// ===========================================================================

struct DigitPacker;

impl Packer for DigitPacker {
    fn max_components(&self) -> u32 {
        3
    }

    fn channels(&self) -> RangeInclusive<usize> {
        1..=4
    }

    fn pack(&self, quantized: &Quantized) -> Result<String, BlurhashError> {
        let mut out = format!(
            "{}{}",
            quantized.header.components_x, quantized.header.components_y
        );
        for level in quantized.ac.iter().flatten() {
            out.push(char::from_digit(*level as u32, 10).ok_or_else(|| {
                BlurhashError::EncodingError(format!("level {level} is not a digit"))
            })?);
        }
        Ok(out)
    }
}

fn digit_quantize(normalized: &NormalizedGrid) -> Result<Quantized, BlurhashError> {
    Ok(Quantized {
        header: QuantizedHeader {
            components_x: normalized.components_x(),
            components_y: normalized.components_y(),
            dc: Vec::new(),
            ac_max: 0,
        },
        ac: normalized
            .ac()
            .iter()
            .map(|cell| cell.iter().map(|v| ((v + 1.0) * 4.5) as i32).collect())
            .collect(),
    })
}

#[test]
fn custom_base_in_local_registry() {
    let mut registry = Registry::new();
    assert!(registry.encode(&gradient(2, 2), 1, 1, false, "digits").is_err());

    registry.register("digits", blurhash_generic::Base::new(digit_quantize, DigitPacker));
    let gray = Image::new(vec![vec![vec![0.25], vec![0.0]]]).unwrap();
    // AC = 0.25 normalizes to 1.0 -> level 9.
    assert_eq!(registry.encode(&gray, 2, 1, true, "digits").unwrap(), "219");

    let err = registry.encode(&gray, 4, 1, true, "digits").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Dimension);
}

#[test]
fn custom_base_in_global_registry() {
    let id = "integration-digits";
    assert!(register_base(id, digit_quantize, DigitPacker).is_none());
    assert!(registered_bases().iter().any(|b| b == id));

    let gray = Image::new(vec![vec![vec![0.0], vec![0.5]]]).unwrap();
    // cos(PI * x / 2) vanishes on the bright pixel while cos(PI * x) flips it:
    // AC (1, 0) is level 4 and AC (2, 0) = -0.5 normalizes to level 0.
    assert_eq!(encode(&gray, 3, 1, true, id).unwrap(), "3140");

    assert!(register_base(id, digit_quantize, DigitPacker).is_some());
}
