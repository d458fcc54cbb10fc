//! Common test utilities and helpers.
//!
//! Synthetic image builders live in [`images`]; temporary-file helpers in
//! [`test_utils`].

#![allow(dead_code)]

pub mod images;
pub mod test_utils;
