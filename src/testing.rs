//! Testing utilities for vw-slim.
//!
//! Assertion helpers plus [`SyntheticModel`], which places weights at exactly
//! the buckets a request will touch, so tests do not need trained model files.
//!
//! # Usage
//!
//! ```
//! use vw_slim::data::Request;
//! use vw_slim::inference::predict;
//! use vw_slim::testing::SyntheticModel;
//!
//! let model = SyntheticModel::new(18, "")
//!     .unwrap()
//!     .feature("a", "x", 0, 0.25)
//!     .intercept(0, 0.5)
//!     .build()
//!     .unwrap();
//!
//! let request: Request = "|a x".parse().unwrap();
//! let scores = predict(&model, &request);
//! vw_slim::assert_approx_eq!(scores[0], 0.75, 1e-6);
//! ```

use approx::AbsDiffEq;

use crate::data::Feature;
use crate::hash::{interaction_hash, INTERCEPT_HASH};
use crate::io::LoadError;
use crate::model::{check_num_bits, Model, ModelHeader};

// =============================================================================
// Constants
// =============================================================================

/// Default tolerance for floating point comparisons.
/// This is appropriate for most predictions where values are O(1).
pub const DEFAULT_TOLERANCE: f32 = 1e-5;

/// Tolerance for comparing predictions of the same model loaded from the
/// binary and the text format; text weights are rounded to six decimals.
pub const CROSS_FORMAT_TOLERANCE: f32 = 1e-2;

// =============================================================================
// Floating Point Assertions
// =============================================================================

/// Assert that two f32 values are approximately equal.
///
/// Uses absolute difference comparison with the given tolerance.
///
/// # Examples
///
/// ```
/// # use vw_slim::assert_approx_eq;
/// assert_approx_eq!(1.0f32, 1.0001f32, 0.001);
/// ```
///
/// # Panics
///
/// Panics if the absolute difference exceeds tolerance.
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $tolerance:expr) => {{
        let left_val = $left;
        let right_val = $right;
        let tol = $tolerance;
        let diff = (left_val - right_val).abs();
        if !(diff <= tol) {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`\n right: `{:?}`\n  diff: `{:?}` > tolerance `{:?}`",
                left_val, right_val, diff, tol
            );
        }
    }};
    ($left:expr, $right:expr, $tolerance:expr, $($arg:tt)+) => {{
        let left_val = $left;
        let right_val = $right;
        let tol = $tolerance;
        let diff = (left_val - right_val).abs();
        if !(diff <= tol) {
            panic!(
                "assertion failed: `(left ≈ right)` - {}\n  left: `{:?}`\n right: `{:?}`\n  diff: `{:?}` > tolerance `{:?}`",
                format_args!($($arg)+), left_val, right_val, diff, tol
            );
        }
    }};
}

/// Assert that two slices of f32 values are approximately equal element-wise.
///
/// # Panics
///
/// Panics if lengths differ or any element differs by more than tolerance.
pub fn assert_slice_approx_eq(actual: &[f32], expected: &[f32], tolerance: f32, context: &str) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "{context}: length mismatch - got {}, expected {}",
        actual.len(),
        expected.len()
    );

    for (i, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        assert!(
            a.abs_diff_eq(e, tolerance),
            "{context}[{i}]: {a} ≠ {e} (diff={}, tolerance={tolerance})",
            (a - e).abs()
        );
    }
}

// =============================================================================
// Prediction Assertions
// =============================================================================

/// Git-style diff of the requests whose scores differ.
fn diff_predictions(actual: &[Vec<f32>], expected: &[Vec<f32>], epsilon: f32) -> String {
    let mut result = format!("Epsilon: {epsilon:.0e}\n\n");
    for (i, (act, exp)) in actual.iter().zip(expected).enumerate() {
        let differs = act.len() != exp.len()
            || act.iter().zip(exp).any(|(a, e)| !a.abs_diff_eq(e, epsilon));
        if !differs {
            continue;
        }
        result.push_str(&format!("[{i:3}] -"));
        for val in exp {
            result.push_str(&format!(" {val:>12.6}"));
        }
        result.push_str("  (expected)\n      +");
        for val in act {
            result.push_str(&format!(" {val:>12.6}"));
        }
        result.push_str("  (actual)\n");
    }
    result
}

/// Assert that two batches of per-class scores are approximately equal.
///
/// On failure, shows a diff of the differing requests.
pub fn assert_predictions_eq(actual: &[Vec<f32>], expected: &[Vec<f32>], epsilon: f32, context: &str) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "{context}: batch size mismatch - got {}, expected {}",
        actual.len(),
        expected.len()
    );
    let all_close = actual.iter().zip(expected).all(|(a, e)| {
        a.len() == e.len() && a.iter().zip(e).all(|(x, y)| x.abs_diff_eq(y, epsilon))
    });
    if !all_close {
        panic!(
            "{context}: predictions differ\n{}",
            diff_predictions(actual, expected, epsilon)
        );
    }
}

// =============================================================================
// Synthetic Models
// =============================================================================

/// Builds a model by assigning weights to the buckets specific features map to.
///
/// Buckets are computed with the crate's own hashing under the given options,
/// so the model scores exactly as a trained model with those weights would.
/// Weights added to the same bucket accumulate.
#[derive(Debug, Clone)]
pub struct SyntheticModel {
    header: ModelHeader,
    probe: Model,
    weights: Vec<f32>,
}

impl SyntheticModel {
    pub fn new(num_bits: u32, options: &str) -> Result<Self, LoadError> {
        check_num_bits(num_bits)?;
        let header = ModelHeader::new(num_bits).with_options(options);
        let weights = vec![0.0; header.table_size()];
        let probe = Model::new(header.clone(), weights.clone())?;
        Ok(Self {
            header,
            probe,
            weights,
        })
    }

    /// Set the clipping range.
    pub fn labels(mut self, min: f32, max: f32) -> Self {
        self.header = self.header.with_labels(min, max);
        self
    }

    /// Model used to compute buckets.
    pub fn probe(&self) -> &Model {
        &self.probe
    }

    /// Bucket of `feature` in `namespace` for `class`.
    pub fn feature_bucket(&self, namespace: &str, feature: &str, class: u32) -> usize {
        let ns_hash = self.probe.namespace_hash(namespace);
        let hash = self.probe.feature_hash_of(ns_hash, &Feature::new(feature));
        self.probe.bucket(hash, class)
    }

    /// Bucket of the interaction of `ns_a^a` with `ns_b^b` for `class`.
    pub fn interaction_bucket(&self, ns_a: &str, a: &str, ns_b: &str, b: &str, class: u32) -> usize {
        let hash_a = self
            .probe
            .feature_hash_of(self.probe.namespace_hash(ns_a), &Feature::new(a));
        let hash_b = self
            .probe
            .feature_hash_of(self.probe.namespace_hash(ns_b), &Feature::new(b));
        self.probe.bucket(interaction_hash(hash_a, hash_b), class)
    }

    pub fn feature(mut self, namespace: &str, feature: &str, class: u32, weight: f32) -> Self {
        let bucket = self.feature_bucket(namespace, feature, class);
        self.weights[bucket] += weight;
        self
    }

    pub fn interaction(
        mut self,
        (ns_a, a): (&str, &str),
        (ns_b, b): (&str, &str),
        class: u32,
        weight: f32,
    ) -> Self {
        let bucket = self.interaction_bucket(ns_a, a, ns_b, b, class);
        self.weights[bucket] += weight;
        self
    }

    pub fn intercept(mut self, class: u32, weight: f32) -> Self {
        let bucket = self.probe.bucket(INTERCEPT_HASH, class);
        self.weights[bucket] += weight;
        self
    }

    pub fn build(self) -> Result<Model, LoadError> {
        Model::with_config(self.header, self.probe.config().clone(), self.weights)
    }
}
