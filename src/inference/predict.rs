//! Sparse hashed dot product with quadratic interactions.

use crate::data::{Feature, Namespace, Request};
use crate::explainability::{Explanation, CONSTANT_LABEL};
use crate::hash::{interaction_hash, INTERCEPT_HASH};
use crate::model::link::{clip_inplace, normalize_inplace};
use crate::model::{LinkKind, Model};
use crate::utils::Parallelism;

/// Score `request`, returning one value per class.
///
/// # Hash caches
///
/// Scoring caches each namespace and feature hash on `request`. Those hashes
/// depend on the model's `--hash_seed` and `--hash all` setting but are not
/// tagged with them, so a request scored against one model gives wrong
/// scores against a differently configured one until
/// [`Request::reset_hashes`] is called. Models sharing the same seed and
/// hash mode can reuse the caches.
///
/// ```
/// use vw_slim::{predict, Model, ModelHeader, Request};
///
/// let seeded = Model::new(ModelHeader::new(8).with_options("--hash_seed 7"), vec![0.0; 256]).unwrap();
/// let plain = Model::new(ModelHeader::new(8), vec![0.0; 256]).unwrap();
/// let request: Request = "|a x".parse().unwrap();
///
/// predict(&seeded, &request);
/// request.reset_hashes();
/// predict(&plain, &request);
/// ```
pub fn predict(model: &Model, request: &Request) -> Vec<f32> {
    let mut out = model.output_buffer();
    predict_into(model, request, &mut out, None);
    out
}

/// Score `request` and log every weight lookup into `explanation`.
pub fn predict_explained(model: &Model, request: &Request, explanation: &mut Explanation) -> Vec<f32> {
    let mut out = model.output_buffer();
    predict_into(model, request, &mut out, Some(explanation));
    out
}

/// Score `request` into a caller-owned buffer.
///
/// # Panics
///
/// Panics if `out.len()` differs from the model's class count.
pub fn predict_into(
    model: &Model,
    request: &Request,
    out: &mut [f32],
    mut explanation: Option<&mut Explanation>,
) {
    assert_eq!(
        out.len(),
        model.classes(),
        "output buffer has {} slots, model has {} classes",
        out.len(),
        model.classes()
    );
    out.fill(0.0);

    let mut acc = Accumulator {
        model,
        scores: &mut *out,
        explanation: explanation.as_deref_mut(),
    };
    acc.linear(request.namespaces());
    acc.quadratic(request.namespaces());
    if model.config().has_intercept() {
        acc.add(INTERCEPT_HASH, 1.0, || CONSTANT_LABEL.to_string());
    }

    if let Some(explanation) = explanation {
        explanation.record_raw(out);
    }

    clip_inplace(out, model.min_label(), model.max_label());
    if request.wants_probabilities() {
        LinkKind::Logistic.apply_inplace(out);
        if out.len() > 1 {
            normalize_inplace(out);
        }
    } else {
        model.config().link().apply_inplace(out);
    }
}

/// Score many requests, optionally on the rayon pool.
///
/// Results are in request order. The same hash-cache caveat as [`predict`]
/// applies to every request in the batch.
pub fn predict_batch(model: &Model, requests: &[Request], parallelism: Parallelism) -> Vec<Vec<f32>> {
    parallelism.maybe_par_map(requests, |request| predict(model, request))
}

// =============================================================================
// Accumulation
// =============================================================================

struct Accumulator<'a> {
    model: &'a Model,
    scores: &'a mut [f32],
    explanation: Option<&'a mut Explanation>,
}

impl Accumulator<'_> {
    /// Add `value * w[bucket(hash, k)]` to every class `k`.
    #[inline]
    fn add(&mut self, hash: i32, value: f32, label: impl Fn() -> String) {
        for (class, score) in self.scores.iter_mut().enumerate() {
            let bucket = self.model.bucket(hash, class as u32);
            debug_assert!(bucket < self.model.weights().len());
            let weight = self.model.weight(bucket);
            if let Some(explanation) = self.explanation.as_deref_mut() {
                explanation.record(label(), bucket, class as u32, weight);
            }
            *score += value * weight;
        }
    }

    #[inline]
    fn namespace_hash(&self, namespace: &Namespace) -> i32 {
        namespace
            .hash_cache()
            .get_or_compute(|| self.model.namespace_hash(namespace.name()))
    }

    #[inline]
    fn feature_hash(&self, namespace_hash: i32, feature: &Feature) -> i32 {
        feature
            .hash_cache()
            .get_or_compute(|| self.model.feature_hash_of(namespace_hash, feature))
    }

    fn linear(&mut self, namespaces: &[Namespace]) {
        for namespace in namespaces {
            let ns_hash = self.namespace_hash(namespace);
            for feature in namespace.features() {
                let hash = self.feature_hash(ns_hash, feature);
                self.add(hash, feature.value(), || {
                    format!("{}^{}", namespace.name(), feature.name())
                });
            }
        }
    }

    fn quadratic(&mut self, namespaces: &[Namespace]) {
        let model = self.model;
        let interactions = model.config().interactions();
        if interactions.is_any_to_any() {
            for left in namespaces {
                for right in namespaces {
                    self.interact(left, right);
                }
            }
            return;
        }

        for left in namespaces {
            let Some(partners) = interactions.partners(left.interaction_key()) else {
                continue;
            };
            for &partner in partners {
                for right in namespaces.iter().filter(|ns| ns.interaction_key() == partner) {
                    self.interact(left, right);
                }
            }
        }
    }

    fn interact(&mut self, left: &Namespace, right: &Namespace) {
        let left_hash = self.namespace_hash(left);
        let right_hash = self.namespace_hash(right);
        for a in left.features() {
            let a_hash = self.feature_hash(left_hash, a);
            for b in right.features() {
                let b_hash = self.feature_hash(right_hash, b);
                self.add(interaction_hash(a_hash, b_hash), a.value() * b.value(), || {
                    format!("{}^{}*{}^{}", left.name(), a.name(), right.name(), b.name())
                });
            }
        }
    }
}
