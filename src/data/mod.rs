//! Request-side data types.
//!
//! A [`Request`] is an ordered list of [`Namespace`]s, each an ordered list of
//! [`Feature`]s. Features and namespaces carry a [`HashCache`] slot that the
//! scorer fills on first use, so scoring the same request repeatedly only
//! hashes names once.

mod cache;
mod feature;
mod request;

pub use cache::HashCache;
pub use feature::{Feature, Namespace};
pub use request::Request;

/// Errors from parsing the textual request form.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RequestError {
    /// A `name:value` token whose value is not a number.
    #[error("invalid feature weight in {token:?}: {message}")]
    InvalidWeight { token: String, message: String },
}
