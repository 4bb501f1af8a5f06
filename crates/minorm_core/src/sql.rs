//! Parameterized statement construction from entity descriptors.
//!
//! # Responsibility
//! - Build INSERT / SELECT / DELETE text plus ordered bind values.
//! - Validate ad-hoc filter input before any text is assembled.
//!
//! # Invariants
//! - Statement text only ever interpolates names validated at descriptor
//!   resolution, or the resolved column of a validated filter field.
//! - Filter operators come from `ALLOWED_FILTER_OPERATORS`; everything else
//!   is rejected without building a statement.

use crate::meta::{Entity, EntityDescriptor};
use rusqlite::types::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Operators accepted by the pushed-down filter path.
pub const ALLOWED_FILTER_OPERATORS: &[&str] = &["=", "<>", "<", ">", "<=", ">=", "LIKE"];

/// Invalid ad-hoc filter input, rejected before any statement executes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// The filter names a field/column the entity does not declare.
    UnknownField {
        entity: &'static str,
        field: String,
    },
    /// The operator is outside the allow-list.
    DisallowedOperator { operator: String },
}

impl Display for FilterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownField { entity, field } => {
                write!(f, "entity `{entity}` has no mapped field `{field}`")
            }
            Self::DisallowedOperator { operator } => {
                write!(f, "filter operator `{operator}` is not allowed")
            }
        }
    }
}

impl Error for FilterError {}

/// A declared field could not be read off an entity instance.
///
/// The descriptor and the instance come from the same type, so this is a
/// programming error in the entity's `read_field`, not a store failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementError {
    UnreadableField {
        entity: &'static str,
        field: &'static str,
    },
}

impl Display for StatementError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnreadableField { entity, field } => write!(
                f,
                "entity `{entity}` did not answer for declared field `{field}`"
            ),
        }
    }
}

impl Error for StatementError {}

/// Statement text with positional bind values in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlStatement {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Builds the insert statement for one entity instance.
///
/// Includes every non-identifier column plus the identifier unless it is
/// auto-generated, in declaration order.
pub fn insert<E: Entity>(
    descriptor: &EntityDescriptor,
    entity: &E,
) -> Result<SqlStatement, StatementError> {
    let mut columns = Vec::new();
    let mut params = Vec::new();
    for mapping in descriptor.insertable_columns() {
        let value = entity
            .read_field(mapping.field)
            .ok_or(StatementError::UnreadableField {
                entity: descriptor.entity_name(),
                field: mapping.field,
            })?;
        columns.push(mapping.column);
        params.push(value);
    }

    // Descriptor resolution guarantees at least one insertable column.
    let placeholders = vec!["?"; columns.len()].join(", ");
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        descriptor.table(),
        columns.join(", "),
        placeholders
    );
    Ok(SqlStatement { sql, params })
}

/// Builds the delete statement keyed on the entity's current identifier.
pub fn delete_by_id<E: Entity>(
    descriptor: &EntityDescriptor,
    entity: &E,
) -> Result<SqlStatement, StatementError> {
    let identifier = descriptor.identifier();
    let id = entity
        .read_field(identifier.field)
        .ok_or(StatementError::UnreadableField {
            entity: descriptor.entity_name(),
            field: identifier.field,
        })?;
    Ok(SqlStatement {
        sql: format!(
            "DELETE FROM {} WHERE {} = ?",
            descriptor.table(),
            identifier.column
        ),
        params: vec![id],
    })
}

/// Builds the select-by-identifier statement for a caller-supplied id.
pub fn find_by_id(descriptor: &EntityDescriptor, id: Value) -> SqlStatement {
    SqlStatement {
        sql: format!(
            "SELECT * FROM {} WHERE {} = ?",
            descriptor.table(),
            descriptor.identifier().column
        ),
        params: vec![id],
    }
}

/// Builds the unfiltered select statement.
pub fn find_all(descriptor: &EntityDescriptor) -> SqlStatement {
    SqlStatement {
        sql: format!("SELECT * FROM {}", descriptor.table()),
        params: Vec::new(),
    }
}

/// Builds the pushed-down filter statement after validating its input.
///
/// The field name must resolve against the descriptor and the operator must
/// normalize into [`ALLOWED_FILTER_OPERATORS`]; the statement interpolates
/// only the resolved column name and the normalized operator, never caller
/// text.
pub fn filter(
    descriptor: &EntityDescriptor,
    field: &str,
    operator: &str,
    value: Value,
) -> Result<SqlStatement, FilterError> {
    let mapping = descriptor
        .lookup(field)
        .ok_or_else(|| FilterError::UnknownField {
            entity: descriptor.entity_name(),
            field: field.to_string(),
        })?;
    let operator = normalize_operator(operator).ok_or_else(|| FilterError::DisallowedOperator {
        operator: operator.to_string(),
    })?;

    Ok(SqlStatement {
        sql: format!(
            "SELECT * FROM {} WHERE {} {} ?",
            descriptor.table(),
            mapping.column,
            operator
        ),
        params: vec![value],
    })
}

fn normalize_operator(operator: &str) -> Option<&'static str> {
    let trimmed = operator.trim();
    if trimmed.eq_ignore_ascii_case("LIKE") {
        return Some("LIKE");
    }
    ALLOWED_FILTER_OPERATORS
        .iter()
        .find(|allowed| **allowed == trimmed)
        .copied()
}
