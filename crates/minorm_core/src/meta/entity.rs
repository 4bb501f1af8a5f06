//! Static entity mapping declarations.
//!
//! # Responsibility
//! - Define the trait every table-backed type implements by hand.
//! - Keep field access generic so repository code never inspects entity
//!   internals directly.
//!
//! # Invariants
//! - `fields()` order is the column order used by generated statements.
//! - `read_field`/`write_field` answer exactly the names listed in
//!   `fields()` and nothing else.

use crate::meta::value::CoerceError;
use rusqlite::types::Value;

/// Role of one mapped field within its entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRole {
    /// Plain data column.
    Data,
    /// Row identifier, optionally produced by the store on insert.
    Identifier {
        /// Whether the store generates the value on insert.
        auto_generated: bool,
    },
}

/// One declared field-to-column mapping.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Field name as declared on the Rust type.
    pub field: &'static str,
    /// Explicit column name; `None` falls back to the field name.
    pub column: Option<&'static str>,
    /// Data or identifier role.
    pub role: FieldRole,
}

impl FieldSpec {
    /// Declares a data field mapped to a column of the same name.
    pub const fn data(field: &'static str) -> Self {
        Self {
            field,
            column: None,
            role: FieldRole::Data,
        }
    }

    /// Declares a data field with an explicit column name.
    pub const fn data_as(field: &'static str, column: &'static str) -> Self {
        Self {
            field,
            column: Some(column),
            role: FieldRole::Data,
        }
    }

    /// Declares the identifier field.
    pub const fn identifier(field: &'static str, auto_generated: bool) -> Self {
        Self {
            field,
            column: None,
            role: FieldRole::Identifier { auto_generated },
        }
    }

    /// Declares the identifier field with an explicit column name.
    pub const fn identifier_as(
        field: &'static str,
        column: &'static str,
        auto_generated: bool,
    ) -> Self {
        Self {
            field,
            column: Some(column),
            role: FieldRole::Identifier { auto_generated },
        }
    }
}

/// Compile-time mapping contract for one table-backed type.
///
/// Implementations are plain hand-written declarations; there is no runtime
/// introspection anywhere in the mapping path.
pub trait Entity: Default + Clone + Send + Sync + 'static {
    /// Simple type name; the table name falls back to its lower-cased form.
    fn entity_name() -> &'static str;

    /// Explicit table name, when the declaration overrides the default.
    fn table_name() -> Option<&'static str> {
        None
    }

    /// Declared mappings in field declaration order.
    fn fields() -> &'static [FieldSpec];

    /// Reads one declared field as a driver value.
    ///
    /// Returns `None` for names not listed in `fields()`.
    fn read_field(&self, field: &str) -> Option<Value>;

    /// Writes one declared field from a driver value.
    ///
    /// # Errors
    /// - `CoerceError::UnknownField` for names not listed in `fields()`.
    /// - `CoerceError::Incompatible` when the value cannot represent the
    ///   declared field type.
    fn write_field(&mut self, field: &str, value: Value) -> Result<(), CoerceError>;
}
