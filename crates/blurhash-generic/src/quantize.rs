//! Integer representation handed from a base's quantizer to its packer.

/// Header values of a quantized hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantizedHeader {
    /// Horizontal component count (1-based).
    pub components_x: u32,
    /// Vertical component count (1-based).
    pub components_y: u32,
    /// DC channels, each sized to its field in the target packing.
    pub dc: Vec<u32>,
    /// Quantized AC magnitude bound.
    pub ac_max: u32,
}

/// Output of a quantizer: the header plus one integer vector per AC cell.
///
/// AC cells follow the row-major (j, i) order of the component grid with the
/// DC cell left out. How AC integers are signed or offset is up to the base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quantized {
    /// Header values.
    pub header: QuantizedHeader,
    /// Quantized AC cells.
    pub ac: Vec<Vec<i32>>,
}

impl Quantized {
    /// Total number of components, DC included.
    pub fn component_count(&self) -> usize {
        (self.header.components_x * self.header.components_y) as usize
    }
}
