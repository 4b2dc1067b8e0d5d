//! Model header metadata.

use serde::{Deserialize, Serialize};

/// Header fields common to both model formats.
///
/// `options` holds the raw training options verbatim; the typed view lives in
/// [`OptionConfig`](super::OptionConfig).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelHeader {
    /// VW version that wrote the model (e.g. "8.6.1").
    pub version: String,
    /// Free-form model id (`--id`), often empty.
    pub id: String,
    /// Lower clipping bound for predictions.
    pub min_label: f32,
    /// Upper clipping bound for predictions.
    pub max_label: f32,
    /// log2 of the weight table size.
    pub num_bits: u32,
    /// Training options string.
    pub options: String,
}

impl Default for ModelHeader {
    fn default() -> Self {
        Self {
            version: String::new(),
            id: String::new(),
            min_label: f32::NEG_INFINITY,
            max_label: f32::INFINITY,
            num_bits: 18,
            options: String::new(),
        }
    }
}

impl ModelHeader {
    /// Header for a `2^num_bits` table with no clipping and no options.
    pub fn new(num_bits: u32) -> Self {
        Self {
            num_bits,
            ..Default::default()
        }
    }

    pub fn with_labels(mut self, min_label: f32, max_label: f32) -> Self {
        self.min_label = min_label;
        self.max_label = max_label;
        self
    }

    pub fn with_options(mut self, options: impl Into<String>) -> Self {
        self.options = options.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Number of entries in the weight table.
    #[inline]
    pub fn table_size(&self) -> usize {
        1usize << self.num_bits
    }
}
