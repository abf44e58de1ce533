//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - parameter CSV export (`export`)
//! - curve JSON read/write (`curve`)

pub mod curve;
pub mod export;
pub mod ingest;

pub use curve::*;
pub use export::*;
pub use ingest::*;
