//! Core data types for bareblocks image inspection.
//!
//! Everything produced by an inspection run lives here: container
//! descriptors, structural records, payload records, pattern and anomaly
//! results, and the assembled report. The runtime that produces these values
//! lives in [`crate::inspect`].

pub mod inspect;
