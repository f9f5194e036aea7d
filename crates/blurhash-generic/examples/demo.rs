//! Demo: encode one image with every registered base, then plug in a new one.
//!
//! Run with: cargo run --example demo

use std::ops::RangeInclusive;

use blurhash_generic::{
    base64url, base83, encode, register_base, registered_bases, BlurhashError, Image,
    NormalizedGrid, Packer, Quantized, QuantizedHeader,
};

/// Packs each AC cell as two hex digits of its first channel.
struct HexPacker;

impl Packer for HexPacker {
    fn max_components(&self) -> u32 {
        16
    }

    fn channels(&self) -> RangeInclusive<usize> {
        1..=4
    }

    fn pack(&self, quantized: &Quantized) -> Result<String, BlurhashError> {
        Ok(quantized
            .ac
            .iter()
            .map(|cell| format!("{:02x}", cell[0]))
            .collect())
    }
}

fn hex_quantize(normalized: &NormalizedGrid) -> Result<Quantized, BlurhashError> {
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
            .map(|cell| cell.iter().map(|v| ((v + 1.0) * 127.5) as i32).collect())
            .collect(),
    })
}

fn main() {
    println!("=== BlurHash Demo ===\n");

    // Top-left: red, top-right: green, bottom-left: blue, bottom-right: white.
    let width = 4u32;
    let height = 4u32;
    let mut pixels = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            let r = (x * 255 / (width - 1)) as u8;
            let g = (y * 255 / (height - 1)) as u8;
            pixels.extend_from_slice(&[r, g, 128, 255]);
        }
    }
    let image = Image::from_rgba8(&pixels, width, height).expect("Failed to build image");
    println!("1. Created a {}x{} gradient image\n", width, height);

    let (components_x, components_y) = (4, 3);
    println!("2. Encoded with {}x{} components:", components_x, components_y);
    for base in registered_bases() {
        let hash = encode(&image, components_x, components_y, false, &base)
            .expect("Failed to encode");
        println!("   {:<12} {} ({} characters)", base, hash, hash.len());
    }

    let hash = encode(&image, components_x, components_y, false, base64url::ID)
        .expect("Failed to encode");
    let header = base64url::parse_header(&hash).expect("Failed to parse header");
    println!(
        "\n3. base64-url header: {}x{} components, ac_max {}, DC {:?}",
        header.components_x, header.components_y, header.ac_max, header.dc
    );

    let classic = encode(&image, components_x, components_y, false, base83::ID)
        .expect("Failed to encode");
    let (cx, cy) = base83::components(&classic).expect("Failed to get components");
    println!("   base83 size flag: {}x{} components", cx, cy);

    register_base("hex", hex_quantize, HexPacker);
    let hex = encode(&image, components_x, components_y, false, "hex").expect("Failed to encode");
    println!("\n4. Custom \"hex\" base: {}", hex);

    match encode(&image, components_x, components_y, false, "base85") {
        Ok(hash) => println!("   unexpected hash {}", hash),
        Err(e) => println!("   base85: {}", e),
    }

    println!("\n=== Demo Complete ===");
}
