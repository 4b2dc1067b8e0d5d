//! Per-lookup scoring log.

use std::fmt;

use serde::Serialize;

/// Label used for the intercept lookup.
pub const CONSTANT_LABEL: &str = "Constant";

/// One weight lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplanationEntry {
    /// `ns^feature`, `ns^a*ns^b` for an interaction, or `Constant`.
    pub label: String,
    pub bucket: usize,
    /// 1-based class index.
    pub class: u32,
    pub weight: f32,
}

impl fmt::Display for ExplanationEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}:{:.6}", self.label, self.bucket, self.class, self.weight)
    }
}

/// Diagnostic sidecar filled by [`predict_explained`](crate::inference::predict_explained).
///
/// Never affects the returned scores. An explanation accumulates across calls
/// until [`clear`](Self::clear)ed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Explanation {
    entries: Vec<ExplanationEntry>,
    features_looked_up: usize,
    missing_features: usize,
    raw_predictions: Vec<Vec<f32>>,
}

impl Explanation {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn entries(&self) -> &[ExplanationEntry] {
        &self.entries
    }

    /// Number of weight lookups performed.
    #[inline]
    pub fn features_looked_up(&self) -> usize {
        self.features_looked_up
    }

    /// Number of lookups that hit a zero weight.
    #[inline]
    pub fn missing_features(&self) -> usize {
        self.missing_features
    }

    /// Unclipped, unlinked per-class scores, one vector per explained call.
    #[inline]
    pub fn raw_predictions(&self) -> &[Vec<f32>] {
        &self.raw_predictions
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.raw_predictions.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.features_looked_up = 0;
        self.missing_features = 0;
        self.raw_predictions.clear();
    }

    /// Log a lookup of `bucket` for 0-based `class`.
    pub(crate) fn record(&mut self, label: String, bucket: usize, class: u32, weight: f32) {
        self.features_looked_up += 1;
        if weight == 0.0 {
            self.missing_features += 1;
        }
        self.entries.push(ExplanationEntry {
            label,
            bucket,
            class: class + 1,
            weight,
        });
    }

    pub(crate) fn record_raw(&mut self, scores: &[f32]) {
        self.raw_predictions.push(scores.to_vec());
    }
}

impl fmt::Display for Explanation {
    /// One entry per line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{entry}")?;
        }
        Ok(())
    }
}
