//! Image inspection pipeline.
//!
//! Stage modules in execution order: [`io`] and [`sniffers`] (intake and
//! container identification), [`structure`], [`metadata`], [`payloads`],
//! [`patterns`] and [`score`]. [`api`] wires them together.

pub mod api;
pub mod config;
pub mod io;
pub mod metadata;
pub mod patterns;
pub mod payloads;
pub mod score;
pub mod sniffers;
pub mod structure;

pub use api::{inspect_bytes, inspect_path, Inspector};
pub use config::{AnomalyConfig, IOConfig, InspectConfig, PayloadConfig, StructureConfig};
pub use io::{read_range, ByteSource, IOUtils};
pub use metadata::{HeaderMetadataReader, MetadataExtractor};
