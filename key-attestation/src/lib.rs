#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod attestation;
#[cfg(test)]
mod tests;
mod types;

pub use attestation::error::*;
pub use attestation::*;
pub use types::*;

/// Target used for all log output of this crate.
pub(crate) const LOG_TARGET: &str = "key_attestation";
