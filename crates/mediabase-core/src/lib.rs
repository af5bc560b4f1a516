//! Core domain model for mediabase.
//!
//! This crate defines the normalized media catalog: the media and dimension
//! types, the SQLite schema with its lookup and junction tables, parsing of
//! the export's multi-value fields, and the read-only aggregate queries.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod error;
pub mod model;
pub mod parse;
pub mod query;
pub mod schema;

pub use error::{Error, Result};
pub use model::{Dimension, DimensionValueId, Media, MediaId};
pub use parse::{parse_dimension_field, parse_multivalue};
pub use schema::Database;
