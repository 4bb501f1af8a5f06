//! Entity metadata: static mapping declarations and resolved descriptors.
//!
//! # Responsibility
//! - Define the compile-time mapping contract persisted types implement.
//! - Resolve declarations into validated, immutable table descriptors.
//!
//! # Invariants
//! - A resolved descriptor always has exactly one identifier column.
//! - Configuration gaps fail at descriptor resolution, never at call time.

mod descriptor;
mod entity;
mod value;

pub use descriptor::{ColumnMapping, ConfigError, EntityDescriptor};
pub use entity::{Entity, FieldRole, FieldSpec};
pub use value::{CoerceError, FromValue, ToValue};
