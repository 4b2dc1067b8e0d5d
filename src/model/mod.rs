//! Model types: configuration, link functions, header metadata and the
//! weight table.

pub mod config;
pub mod link;
mod linear;
mod meta;

pub use config::{Interactions, OptionConfig, DEFAULT_NAMESPACE, MAX_CLASSES};
pub use linear::{Model, MAX_NUM_BITS};
pub use link::LinkKind;
pub use meta::ModelHeader;

pub(crate) use linear::check_num_bits;
