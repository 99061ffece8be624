//! Configuration source implementations.

mod env;

pub use env::{EnvSource, RawSettings};
