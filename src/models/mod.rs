//! Models module
//!
//! Defines the hierarchy enums, the twelve record shapes, the decoded
//! hierarchy address of a dataset file and the flat records extracted from
//! its payload.

pub mod address;
pub mod enums;
pub mod record;
pub mod shape;

pub use address::HierarchyAddress;
pub use enums::*;
pub use record::{FlatRecord, Measures, RecordKey, SqlValue};
pub use shape::Shape;
