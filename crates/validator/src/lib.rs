#![cfg_attr(test, allow(clippy::unwrap_used))]

mod error;

pub use error::*;
pub mod extras;

/// Form types implement this to report what is wrong with the
/// data a client submitted.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidateError>;
}
