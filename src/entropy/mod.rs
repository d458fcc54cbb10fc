//! Entropy primitives.
//!
//! Binary payloads that survive no decode step are summarised by their
//! Shannon entropy in bits per byte.

pub mod core;

pub use self::core::shannon_entropy;
