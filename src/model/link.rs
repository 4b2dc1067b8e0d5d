//! Output transformation for inference.
//!
//! The [`LinkKind`] enum selects the nonlinearity VW applies to the clipped
//! raw score (`--link` on the training command line). It is parsed once from
//! the model options and applied at a single point in the scorer.
//!
//! # Variants
//!
//! - [`Identity`](LinkKind::Identity): output = margin
//! - [`Logistic`](LinkKind::Logistic): 1 / (1 + exp(-margin))
//! - [`Poisson`](LinkKind::Poisson): exp(margin)
//! - [`Glf1`](LinkKind::Glf1): 2 / (1 + exp(-margin)) - 1

use serde::{Deserialize, Serialize};

/// Link function applied to each class score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    /// No transformation.
    #[default]
    Identity,
    /// Logistic sigmoid.
    Logistic,
    /// Exponential, for Poisson regression.
    Poisson,
    /// Generalized logistic with range (-1, 1).
    Glf1,
}

impl LinkKind {
    /// Parse the value of a `--link` option.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "identity" => Some(LinkKind::Identity),
            "logistic" => Some(LinkKind::Logistic),
            "poisson" => Some(LinkKind::Poisson),
            "glf1" => Some(LinkKind::Glf1),
            _ => None,
        }
    }

    /// Name as written in VW options.
    pub fn as_str(self) -> &'static str {
        match self {
            LinkKind::Identity => "identity",
            LinkKind::Logistic => "logistic",
            LinkKind::Poisson => "poisson",
            LinkKind::Glf1 => "glf1",
        }
    }

    /// Apply the link to a single value.
    ///
    /// Evaluated in `f64` and narrowed afterwards, which is how the reference
    /// runtime rounds.
    #[inline]
    pub fn apply(self, x: f32) -> f32 {
        let x = x as f64;
        let y = match self {
            LinkKind::Identity => x,
            LinkKind::Logistic => 1.0 / (1.0 + (-x).exp()),
            LinkKind::Poisson => x.exp(),
            LinkKind::Glf1 => 2.0 / (1.0 + (-x).exp()) - 1.0,
        };
        y as f32
    }

    /// Apply the link in place to every class score.
    #[inline]
    pub fn apply_inplace(self, scores: &mut [f32]) {
        if self == LinkKind::Identity {
            return;
        }
        for x in scores.iter_mut() {
            *x = self.apply(*x);
        }
    }
}

impl std::fmt::Display for LinkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Clamp every score into `[min, max]`.
///
/// NaN is passed through unchanged.
#[inline]
pub fn clip_inplace(scores: &mut [f32], min: f32, max: f32) {
    for x in scores.iter_mut() {
        if *x > max {
            *x = max;
        } else if *x < min {
            *x = min;
        }
    }
}

/// Divide every score by the sum of all scores.
///
/// Used on one-vs-all probabilities, which are independent sigmoids and do not
/// sum to one on their own.
#[inline]
pub fn normalize_inplace(scores: &mut [f32]) {
    let sum: f32 = scores.iter().sum();
    for x in scores.iter_mut() {
        *x /= sum;
    }
}
