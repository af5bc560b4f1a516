//! Ingest pipeline for mediabase.
//!
//! Streams the denormalized CSV export and loads it into the normalized
//! catalog defined by `mediabase-core`.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod config;
pub mod error;
pub mod ingest;
pub mod source;

pub use config::Config;
pub use error::{IngestError, IngestResult};
pub use ingest::{Atomicity, DimensionCounts, IngestOptions, IngestReport, Ingestor};
pub use source::{CsvSource, SourceRow};
