//! Property-based tests for hashing, bucket addressing and the codecs.

use proptest::collection::vec as prop_vec;
use proptest::prelude::*;

use vw_slim::data::{Feature, Namespace, Request};
use vw_slim::hash::{hash32, hash_str};
use vw_slim::inference::predict;
use vw_slim::io::{load_binary, load_binary_with, load_text, write_binary, write_text, BinaryReadOptions};
use vw_slim::model::{Model, ModelHeader};

// =============================================================================
// Strategies
// =============================================================================

fn arb_name() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z]{1,6}",
        "[0-9]{1,4}",
        "[a-z0-9_=-]{1,8}",
    ]
}

fn arb_namespace() -> impl Strategy<Value = Namespace> {
    ("[a-d][a-z]{0,3}", prop_vec((arb_name(), -4.0f32..4.0), 0..5)).prop_map(|(name, features)| {
        Namespace::new(
            name,
            features.into_iter().map(|(f, v)| Feature::with_value(f, v)),
        )
    })
}

fn arb_request() -> impl Strategy<Value = Request> {
    prop_vec(arb_namespace(), 0..4).prop_map(Request::new)
}

fn arb_options() -> impl Strategy<Value = String> {
    (
        prop_oneof![Just(""), Just("--oaa 2"), Just("--oaa 5")],
        prop_oneof![Just(""), Just("-q ab"), Just("-q :: "), Just("-q ab -q ca")],
        prop_oneof![Just(""), Just("--noconstant"), Just("--hash all"), Just("--hash_seed 17")],
        prop_oneof![Just(""), Just("--link logistic"), Just("--link glf1")],
    )
        .prop_map(|(a, b, c, d)| format!("{a} {b} {c} {d}"))
}

/// Small model with a sparse, arbitrary set of non-zero weights.
fn arb_model() -> impl Strategy<Value = Model> {
    (6u32..12, arb_options(), prop_vec((any::<u32>(), -2.0f32..2.0), 0..64)).prop_map(
        |(bits, options, entries)| {
            let mut weights = vec![0.0; 1 << bits];
            let mask = (1u32 << bits) - 1;
            for (bucket, w) in entries {
                weights[(bucket & mask) as usize] = w;
            }
            let header = ModelHeader::new(bits).with_labels(-5.0, 5.0).with_options(options);
            Model::new(header, weights).unwrap()
        },
    )
}

fn le_u32(bytes: &[u8], at: usize) -> Option<u32> {
    let word = bytes.get(at..at.checked_add(4)?)?;
    Some(u32::from_le_bytes([word[0], word[1], word[2], word[3]]))
}

/// `num_bits` of a binary model: after two length-prefixed strings, the model
/// character and both labels.
fn stored_num_bits(bytes: &[u8]) -> Option<u32> {
    let mut at = 0usize;
    for _ in 0..2 {
        let len = le_u32(bytes, at)? as usize;
        at = at.checked_add(4)?.checked_add(len)?;
    }
    le_u32(bytes, at.checked_add(9)?)
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn hash_is_deterministic(data in prop_vec(any::<u8>(), 0..64), seed in any::<i32>()) {
        prop_assert_eq!(hash32(&data, seed), hash32(&data, seed));
    }

    #[test]
    fn hash_str_is_hash_of_utf8(s in "\\PC{0,16}", seed in any::<i32>()) {
        prop_assert_eq!(hash_str(&s, seed), hash32(s.as_bytes(), seed));
    }

    #[test]
    fn buckets_stay_in_table(
        bits in 1u32..=18,
        classes in 1u32..=16,
        hash in any::<i32>(),
    ) {
        let header = ModelHeader::new(bits).with_options(format!("--oaa {classes}"));
        let model = Model::new(header, vec![0.0; 1 << bits]).unwrap();
        for class in 0..classes {
            prop_assert!(model.bucket(hash, class) < model.weights().len());
        }
    }

    #[test]
    fn scoring_is_repeatable(model in arb_model(), request in arb_request()) {
        let first = predict(&model, &request);
        prop_assert_eq!(first.len(), model.classes());
        // Second call reuses the cached hashes.
        let second = predict(&model, &request);
        prop_assert_eq!(&first, &second);
        // Recomputing from scratch agrees with the cached run.
        request.reset_hashes();
        prop_assert_eq!(&first, &predict(&model, &request));
    }

    #[test]
    fn scores_respect_label_range(model in arb_model(), request in arb_request()) {
        if model.config().link() == vw_slim::LinkKind::Identity {
            for score in predict(&model, &request) {
                prop_assert!((-5.0..=5.0).contains(&score));
            }
        }
    }

    #[test]
    fn probabilities_sum_to_one(model in arb_model(), request in arb_request()) {
        let scores = predict(&model, &request.with_probabilities(true));
        if scores.len() > 1 {
            let sum: f32 = scores.iter().sum();
            prop_assert!((sum - 1.0).abs() < 1e-4, "sum = {}", sum);
        }
    }

    #[test]
    fn formats_agree(model in arb_model(), request in arb_request()) {
        let binary = load_binary_with(&write_binary(&model), &BinaryReadOptions::verified()).unwrap();

        let mut text = Vec::new();
        write_text(&model, &mut text).unwrap();
        let text = String::from_utf8(text).unwrap();
        let text = load_text(text.lines()).unwrap();

        prop_assert_eq!(binary.weights(), model.weights());
        prop_assert_eq!(text.weights(), model.weights());
        prop_assert_eq!(binary.config(), text.config());

        let expected = predict(&model, &request);
        request.reset_hashes();
        prop_assert_eq!(&predict(&binary, &request), &expected);
        request.reset_hashes();
        prop_assert_eq!(&predict(&text, &request), &expected);
    }

    #[test]
    fn damaged_binary_never_panics(
        cut in 0usize..200,
        flips in prop_vec((0usize..200, any::<u8>()), 0..4),
    ) {
        let model = Model::new(
            ModelHeader::new(8).with_options("--oaa 3 -q ab"),
            (0..256).map(|i| if i % 7 == 0 { i as f32 / 10.0 } else { 0.0 }).collect(),
        ).unwrap();
        let mut bytes = write_binary(&model);
        for (pos, value) in flips {
            let pos = pos % bytes.len();
            bytes[pos] = value;
        }
        bytes.truncate(cut.min(bytes.len()));
        // A flip may land in num_bits or shift it; skip huge tables.
        if stored_num_bits(&bytes).is_some_and(|bits| bits > 20) {
            return Ok(());
        }
        let _ = load_binary(&bytes);
    }
}
