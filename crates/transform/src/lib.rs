//! Kadi transform: manifest snapshot to weapon tables.
//!
//! classify -> extract sockets and stats -> Weapon / WeaponLite / category index.

#![forbid(unsafe_code)]

pub mod classify;
pub mod error;
pub mod manifest;
pub mod pipeline;
pub mod sockets;
pub mod stats;

pub use classify::{classify, Bucket, ItemBucket, ItemCategories};
pub use error::{ManifestError, TransformError};
pub use manifest::ManifestTables;
pub use pipeline::{category_stat_groups, run_pipeline, PipelineOptions, PipelineOutput, WeaponTransformer};
pub use sockets::{is_adept, SocketExtractor};
pub use stats::StatCatalog;
