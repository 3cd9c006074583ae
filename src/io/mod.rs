//! IO module for format-specific reading and writing operations.
//!
//! - `csv` - CSV tables for region inputs and plan assignments

pub(crate) mod csv;
