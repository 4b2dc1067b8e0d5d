//! Hashed linear model: weight table plus configuration.

use crate::data::Feature;
use crate::hash::hash_str;
use crate::io::LoadError;

use super::config::OptionConfig;
use super::meta::ModelHeader;

/// Widest supported weight table; larger tables come from 64-bit indexed
/// models.
pub const MAX_NUM_BITS: u32 = 30;

/// A loaded VW linear model.
///
/// Stores a flat table of `2^num_bits` weights. A feature's weight for class
/// `k` lives at:
///
/// ```text
/// bucket = ((feature_hash << multiclass_bits) | k) & mask
/// ```
///
/// The model is immutable once built and is `Send + Sync`; share it behind an
/// `Arc` across scoring threads.
#[derive(Debug, Clone)]
pub struct Model {
    header: ModelHeader,
    config: OptionConfig,
    weights: Box<[f32]>,
    mask: u32,
}

impl Model {
    /// Build a model, parsing the options stored in `header`.
    ///
    /// `weights` must hold exactly `2^header.num_bits` entries.
    pub fn new(header: ModelHeader, weights: Vec<f32>) -> Result<Self, LoadError> {
        let config = OptionConfig::parse(&header.options)?;
        Self::with_config(header, config, weights)
    }

    /// Build a model from an already parsed configuration.
    pub fn with_config(
        header: ModelHeader,
        config: OptionConfig,
        weights: Vec<f32>,
    ) -> Result<Self, LoadError> {
        check_num_bits(header.num_bits)?;

        let expected = header.table_size();
        if weights.len() != expected {
            return Err(LoadError::MalformedHeader(format!(
                "weight table has {} entries, expected 2^{} = {}",
                weights.len(),
                header.num_bits,
                expected
            )));
        }

        let mask = (expected - 1) as u32;
        Ok(Self {
            header,
            config,
            weights: weights.into_boxed_slice(),
            mask,
        })
    }

    /// Load a model in VW's binary format with default options.
    pub fn load_binary(bytes: &[u8]) -> Result<Self, LoadError> {
        crate::io::load_binary(bytes)
    }

    /// Load a model in VW's `--readable_model` text format.
    pub fn load_text(text: &str) -> Result<Self, LoadError> {
        crate::io::load_text(text.lines())
    }

    #[inline]
    pub fn header(&self) -> &ModelHeader {
        &self.header
    }

    #[inline]
    pub fn config(&self) -> &OptionConfig {
        &self.config
    }

    #[inline]
    pub fn version(&self) -> &str {
        &self.header.version
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.header.id
    }

    /// Raw options string the model was trained with.
    #[inline]
    pub fn options(&self) -> &str {
        &self.header.options
    }

    #[inline]
    pub fn num_bits(&self) -> u32 {
        self.header.num_bits
    }

    #[inline]
    pub fn mask(&self) -> u32 {
        self.mask
    }

    #[inline]
    pub fn min_label(&self) -> f32 {
        self.header.min_label
    }

    #[inline]
    pub fn max_label(&self) -> f32 {
        self.header.max_label
    }

    /// Number of output classes.
    #[inline]
    pub fn classes(&self) -> usize {
        self.config.classes() as usize
    }

    /// Raw access to the weight table.
    #[inline]
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    #[inline]
    pub fn weight(&self, bucket: usize) -> f32 {
        self.weights[bucket]
    }

    /// Non-zero weights in ascending bucket order.
    pub fn non_zero_weights(&self) -> impl Iterator<Item = (u32, f32)> + '_ {
        self.weights
            .iter()
            .enumerate()
            .filter(|(_, &w)| w != 0.0)
            .map(|(bucket, &w)| (bucket as u32, w))
    }

    /// Zeroed output buffer with one slot per class.
    pub fn output_buffer(&self) -> Vec<f32> {
        vec![0.0; self.classes()]
    }

    /// Weight table index of `hash` for `class`.
    ///
    /// Always below `weights().len()` because of the mask.
    #[inline]
    pub fn bucket(&self, hash: i32, class: u32) -> usize {
        let shifted = (hash as u32) << self.config.multiclass_bits();
        ((shifted | class) & self.mask) as usize
    }

    /// Hash of a namespace name under this model's seed.
    ///
    /// The unnamed namespace always hashes to 0.
    #[inline]
    pub fn namespace_hash(&self, name: &str) -> i32 {
        if name.is_empty() {
            0
        } else {
            hash_str(name, self.config.hash_seed())
        }
    }

    /// Hash of `feature` inside a namespace hashing to `namespace_hash`.
    ///
    /// Integer-named features are offset from the namespace hash unless the
    /// model was trained with `--hash all`.
    #[inline]
    pub fn feature_hash_of(&self, namespace_hash: i32, feature: &Feature) -> i32 {
        match feature.integer_id() {
            Some(id) if !self.config.hash_all() => id.wrapping_add(namespace_hash),
            _ => hash_str(feature.name(), namespace_hash),
        }
    }
}

pub(crate) fn check_num_bits(num_bits: u32) -> Result<(), LoadError> {
    if num_bits > MAX_NUM_BITS {
        return Err(LoadError::unsupported(format!(
            "{num_bits}-bit weight table (64-bit indexed models)"
        )));
    }
    Ok(())
}
