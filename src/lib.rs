//! vw-slim: a scoring runtime for Vowpal Wabbit linear models.
//!
//! Loads models written by VW (binary `-f` files or `--readable_model` text
//! dumps) and reproduces VW's predictions bit for bit: the same Murmur3 hash,
//! the same bucket arithmetic, the same interaction order.
//!
//! # Key Types
//!
//! - [`Model`] - Immutable weight table plus parsed training options
//! - [`Request`] / [`Namespace`] / [`Feature`] - An example to score
//! - [`Explanation`] - Optional per-lookup scoring log
//! - [`LoadError`] - Everything that can go wrong while loading
//!
//! # Scoring
//!
//! ```
//! use vw_slim::{predict, Model, ModelHeader, Request};
//!
//! let model = Model::new(ModelHeader::new(18).with_options("--link logistic"), vec![0.0; 1 << 18])
//!     .unwrap();
//! let request: Request = "1 |user age:0.3 premium |item shoes".parse().unwrap();
//!
//! let scores = predict(&model, &request);
//! assert_eq!(scores, vec![0.5]);
//! ```
//!
//! A [`Model`] is `Send + Sync`; load it once and share it across threads.

// Re-export approx traits for users who want to compare predictions
pub use approx;

pub mod data;
pub mod explainability;
pub mod hash;
pub mod inference;
pub mod io;
pub mod model;
pub mod testing;
pub mod utils;

// =============================================================================
// Convenience Re-exports
// =============================================================================

pub use data::{Feature, Namespace, Request, RequestError};
pub use explainability::Explanation;
pub use inference::{predict, predict_batch, predict_explained, predict_into};
pub use io::{load_binary, load_text, BinaryReadOptions, LoadError};
pub use model::{LinkKind, Model, ModelHeader, OptionConfig};
pub use utils::Parallelism;
