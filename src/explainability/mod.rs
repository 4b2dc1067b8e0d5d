//! Explainability module.
//!
//! Records every weight lookup a scoring call performs, for debugging models
//! against reference predictions.
//!
//! # Example
//!
//! ```
//! use vw_slim::data::Request;
//! use vw_slim::explainability::Explanation;
//! use vw_slim::inference::predict_explained;
//! use vw_slim::model::{Model, ModelHeader};
//!
//! let model = Model::new(ModelHeader::new(4), vec![0.0; 16]).unwrap();
//! let request: Request = "|a x".parse().unwrap();
//!
//! let mut explanation = Explanation::new();
//! predict_explained(&model, &request, &mut explanation);
//!
//! // One linear lookup plus the intercept, both empty.
//! assert_eq!(explanation.features_looked_up(), 2);
//! assert_eq!(explanation.missing_features(), 2);
//! ```

mod explanation;

pub use explanation::{Explanation, ExplanationEntry, CONSTANT_LABEL};
