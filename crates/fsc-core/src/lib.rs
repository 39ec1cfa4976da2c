//! fsc-core: shared foundation for the fan-speed control crates.
//!
//! Contains:
//! - numeric (float guards for configuration and inputs)
//! - error (shared error types)

pub mod error;
pub mod numeric;

pub use error::{FscError, FscResult};
pub use numeric::*;
