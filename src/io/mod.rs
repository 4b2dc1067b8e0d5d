//! Model file formats.
//!
//! - [`binary`]: VW's packed binary model (`-f model.vw`)
//! - [`text`]: VW's `--readable_model` text dump
//!
//! Both readers produce a fully built [`Model`] or a [`LoadError`]; nothing
//! partially populated escapes a failed load.

pub mod binary;
mod error;
pub mod text;

pub use binary::{load_binary, load_binary_with, read_binary, write_binary, BinaryReadOptions};
pub use error::LoadError;
pub use text::{load_text, read_text, write_text};

use tracing::debug;

use crate::model::Model;

/// Summary event emitted once per successful load.
fn log_loaded(format: &'static str, model: &Model) {
    let config = model.config();
    debug!(
        format,
        num_bits = model.num_bits(),
        classes = config.classes(),
        link = %config.link(),
        intercept = config.has_intercept(),
        interactions = config.interactions().is_enabled(),
        non_zero = model.non_zero_weights().count(),
        "loaded model"
    );
}
