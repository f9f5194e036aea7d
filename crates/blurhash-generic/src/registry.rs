//! Base registry: maps a base id to its quantizer/packer pair and runs the
//! encoding pipeline.
//!
//! The transform and normalizer are shared by every base. A base only
//! contributes a [`Quantizer`], which turns normalized floats into integers
//! sized for its fields, and a [`Packer`], which serializes those integers
//! into its alphabet. Adding a base means registering one more pair.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::RangeInclusive;
use std::sync::{Arc, OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, debug_span, trace};

use crate::bases::{base64url, base83};
use crate::error::BlurhashError;
use crate::image::Image;
use crate::normalize::{normalize, NormalizedGrid};
use crate::quantize::Quantized;
use crate::transform::{check_components, transform};

/// Maps normalized components to the integer domain of one base.
pub trait Quantizer: Send + Sync {
    /// Quantize the DC component, the AC bound and every AC cell.
    fn quantize(&self, normalized: &NormalizedGrid) -> Result<Quantized, BlurhashError>;
}

impl<F> Quantizer for F
where
    F: Fn(&NormalizedGrid) -> Result<Quantized, BlurhashError> + Send + Sync,
{
    fn quantize(&self, normalized: &NormalizedGrid) -> Result<Quantized, BlurhashError> {
        self(normalized)
    }
}

/// Serializes quantized values into the alphabet of one base.
pub trait Packer: Send + Sync {
    /// Largest component count per axis the header can represent.
    fn max_components(&self) -> u32;

    /// Channel counts the format accepts.
    fn channels(&self) -> RangeInclusive<usize>;

    /// Pack the header and AC cells into the final string.
    ///
    /// # Errors
    ///
    /// Returns [`BlurhashError::ValueOutOfRange`] if a value does not fit its field.
    fn pack(&self, quantized: &Quantized) -> Result<String, BlurhashError>;
}

/// A registered quantizer/packer pair.
pub struct Base {
    quantizer: Box<dyn Quantizer>,
    packer: Box<dyn Packer>,
}

impl Base {
    /// Pair a quantizer with a packer.
    pub fn new(quantizer: impl Quantizer + 'static, packer: impl Packer + 'static) -> Self {
        Self {
            quantizer: Box::new(quantizer),
            packer: Box::new(packer),
        }
    }

    /// The quantizer half of the pair.
    pub fn quantizer(&self) -> &dyn Quantizer {
        self.quantizer.as_ref()
    }

    /// The packer half of the pair.
    pub fn packer(&self) -> &dyn Packer {
        self.packer.as_ref()
    }

    /// Run the pipeline with this base. See [`encode_with`].
    pub fn encode(
        &self,
        image: &Image,
        components_x: u32,
        components_y: u32,
        is_linear: bool,
    ) -> Result<String, BlurhashError> {
        encode_with(
            image,
            components_x,
            components_y,
            is_linear,
            self.quantizer(),
            self.packer(),
        )
    }
}

impl fmt::Debug for Base {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Base")
            .field("max_components", &self.packer.max_components())
            .field("channels", &self.packer.channels())
            .finish_non_exhaustive()
    }
}

/// Encode `image` with an explicit quantizer/packer pair.
///
/// Component counts and the channel count are checked against the packer
/// before any transform work. Unless `is_linear` is set, the image's colour
/// channels are linearized first.
///
/// # Errors
///
/// Returns a dimension error for component or channel counts the packer
/// cannot represent, and propagates quantizer and packer errors.
pub fn encode_with<Q, P>(
    image: &Image,
    components_x: u32,
    components_y: u32,
    is_linear: bool,
    quantizer: &Q,
    packer: &P,
) -> Result<String, BlurhashError>
where
    Q: Quantizer + ?Sized,
    P: Packer + ?Sized,
{
    let max = packer.max_components();
    check_components("x", components_x, max)?;
    check_components("y", components_y, max)?;
    let accepted = packer.channels();
    if !accepted.contains(&image.channels()) {
        return Err(BlurhashError::UnsupportedChannelCount {
            channels: image.channels(),
            min: *accepted.start(),
            max: *accepted.end(),
        });
    }

    debug!(
        width = image.width(),
        height = image.height(),
        channels = image.channels(),
        is_linear,
        "transforming image"
    );
    let linearized;
    let source = if is_linear {
        image
    } else {
        linearized = image.linearize();
        &linearized
    };

    let components = transform(source, components_x, components_y)?;
    let normalized = normalize(&components);
    trace!(ac_max = normalized.ac_max(), "normalized components");

    let quantized = quantizer.quantize(&normalized)?;
    packer.pack(&quantized)
}

/// Options for [`Registry::encode_with_options`] and [`encode_with_options`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Horizontal component count.
    pub components_x: u32,
    /// Vertical component count.
    pub components_y: u32,
    /// Whether the samples are already in linear light.
    pub is_linear: bool,
    /// Id of the base to encode with.
    pub base: String,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            components_x: 4,
            components_y: 3,
            is_linear: false,
            base: base64url::ID.to_string(),
        }
    }
}

impl EncodeOptions {
    /// Set both component counts.
    pub fn components(mut self, components_x: u32, components_y: u32) -> Self {
        self.components_x = components_x;
        self.components_y = components_y;
        self
    }

    /// Mark the input as linear (or sRGB-encoded).
    pub fn linear(mut self, is_linear: bool) -> Self {
        self.is_linear = is_linear;
        self
    }

    /// Select the base by id.
    pub fn base(mut self, base: impl Into<String>) -> Self {
        self.base = base.into();
        self
    }
}

/// A table of bases keyed by id.
#[derive(Debug, Default)]
pub struct Registry {
    bases: BTreeMap<String, Arc<Base>>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in `"base64-url"` and `"base83"` bases.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(
            base64url::ID,
            Base::new(base64url::quantize, base64url::Base64UrlPacker),
        );
        registry.register(base83::ID, Base::new(base83::quantize, base83::Base83Packer));
        registry
    }

    /// Register `base` under `id`, returning the base it replaced, if any.
    pub fn register(&mut self, id: impl Into<String>, base: Base) -> Option<Arc<Base>> {
        let id = id.into();
        debug!(base = %id, "registering base");
        self.bases.insert(id, Arc::new(base))
    }

    /// Look up a base.
    ///
    /// # Errors
    ///
    /// Returns [`BlurhashError::UnsupportedBase`] if `id` is not registered.
    pub fn get(&self, id: &str) -> Result<Arc<Base>, BlurhashError> {
        self.bases
            .get(id)
            .cloned()
            .ok_or_else(|| BlurhashError::UnsupportedBase(id.to_string()))
    }

    /// Whether `id` is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.bases.contains_key(id)
    }

    /// Registered ids in sorted order.
    pub fn bases(&self) -> impl Iterator<Item = &str> + '_ {
        self.bases.keys().map(String::as_str)
    }

    /// Encode `image` with the base registered under `base`.
    ///
    /// # Errors
    ///
    /// Returns [`BlurhashError::UnsupportedBase`] before any transform work if
    /// the base is unknown; otherwise see [`encode_with`].
    ///
    /// # Examples
    ///
    /// ```
    /// use blurhash_generic::{Image, Registry};
    /// let registry = Registry::with_defaults();
    /// let image = Image::from_rgba8(&[255, 0, 0, 255], 1, 1).unwrap();
    /// let hash = registry.encode(&image, 1, 1, false, "base64-url").unwrap();
    /// assert_eq!(hash, "AXAA-AD_");
    /// ```
    pub fn encode(
        &self,
        image: &Image,
        components_x: u32,
        components_y: u32,
        is_linear: bool,
        base: &str,
    ) -> Result<String, BlurhashError> {
        let _span = debug_span!("encode", base, components_x, components_y).entered();
        self.get(base)?
            .encode(image, components_x, components_y, is_linear)
    }

    /// Encode `image` as described by `options`.
    pub fn encode_with_options(
        &self,
        image: &Image,
        options: &EncodeOptions,
    ) -> Result<String, BlurhashError> {
        self.encode(
            image,
            options.components_x,
            options.components_y,
            options.is_linear,
            &options.base,
        )
    }
}

static DEFAULT_REGISTRY: OnceLock<RwLock<Registry>> = OnceLock::new();

fn default_registry() -> &'static RwLock<Registry> {
    DEFAULT_REGISTRY.get_or_init(|| RwLock::new(Registry::with_defaults()))
}

fn read_registry() -> RwLockReadGuard<'static, Registry> {
    default_registry()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
}

fn write_registry() -> RwLockWriteGuard<'static, Registry> {
    default_registry()
        .write()
        .unwrap_or_else(PoisonError::into_inner)
}

/// Encode `image` with a base from the process-wide registry.
///
/// # Errors
///
/// See [`Registry::encode`].
///
/// # Examples
///
/// ```
/// use blurhash_generic::{encode, Image};
/// let pixels = vec![128u8; 8 * 8 * 4];
/// let image = Image::from_rgba8(&pixels, 8, 8).unwrap();
/// let hash = encode(&image, 4, 3, false, "base64-url").unwrap();
/// assert_eq!(hash.len(), 8 + 4 * (4 * 3 - 1));
/// ```
pub fn encode(
    image: &Image,
    components_x: u32,
    components_y: u32,
    is_linear: bool,
    base: &str,
) -> Result<String, BlurhashError> {
    let _span = debug_span!("encode", base, components_x, components_y).entered();
    // The lock is released before the transform runs.
    let selected = read_registry().get(base)?;
    selected.encode(image, components_x, components_y, is_linear)
}

/// Encode `image` from the process-wide registry as described by `options`.
pub fn encode_with_options(
    image: &Image,
    options: &EncodeOptions,
) -> Result<String, BlurhashError> {
    encode(
        image,
        options.components_x,
        options.components_y,
        options.is_linear,
        &options.base,
    )
}

/// Register a quantizer/packer pair in the process-wide registry.
///
/// Registering an existing id replaces it; the previous base is returned.
pub fn register_base(
    id: impl Into<String>,
    quantizer: impl Quantizer + 'static,
    packer: impl Packer + 'static,
) -> Option<Arc<Base>> {
    write_registry().register(id, Base::new(quantizer, packer))
}

/// Ids registered in the process-wide registry, sorted.
pub fn registered_bases() -> Vec<String> {
    read_registry().bases().map(str::to_string).collect()
}
