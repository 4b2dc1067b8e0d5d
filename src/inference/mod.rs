//! Scoring requests against a loaded model.
//!
//! Each class score is a sparse dot product over hashed buckets:
//!
//! ```text
//! score[k] = Σ_ns Σ_f  f.value · w[bucket(hash(f), k)]
//!          + Σ_(A,B) Σ_a∈A Σ_b∈B  a.value · b.value · w[bucket(hash(a) · P ⊕ hash(b), k)]
//!          + w[bucket(CONSTANT, k)]
//! ```
//!
//! followed by clipping to the model's label range and the link function.
//!
//! # Quick Start
//!
//! ```
//! use vw_slim::data::Request;
//! use vw_slim::inference::{predict, predict_batch};
//! use vw_slim::model::{Model, ModelHeader};
//! use vw_slim::utils::Parallelism;
//!
//! let model = Model::new(ModelHeader::new(8).with_options("--oaa 2"), vec![0.0; 256]).unwrap();
//! let request: Request = "|a x y:0.5".parse().unwrap();
//!
//! assert_eq!(predict(&model, &request), vec![0.0, 0.0]);
//!
//! let batch = vec![request.clone(), request];
//! assert_eq!(predict_batch(&model, &batch, Parallelism::Parallel).len(), 2);
//! ```

mod predict;

pub use predict::{predict, predict_batch, predict_explained, predict_into};
