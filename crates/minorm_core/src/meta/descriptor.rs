//! Resolved table descriptors built from static entity declarations.
//!
//! # Responsibility
//! - Turn `Entity::fields()` declarations into a validated descriptor.
//! - Fail on configuration gaps at resolution time, not at call time.
//!
//! # Invariants
//! - Every descriptor has exactly one identifier column.
//! - Table and column names match `[A-Za-z_][A-Za-z0-9_]*`, so interpolating
//!   them into statement text cannot change statement structure.

use crate::meta::entity::{Entity, FieldRole, FieldSpec};
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

static SQL_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new("^[A-Za-z_][A-Za-z0-9_]*$").expect("static pattern"));

/// Entity declaration error, raised once at repository construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The declaration lists no fields at all.
    NoMappedFields { entity: &'static str },
    /// No field carries the identifier role.
    MissingIdentifier { entity: &'static str },
    /// Table name is unusable in statement text.
    InvalidTableName {
        entity: &'static str,
        table: String,
    },
    /// Column name is unusable in statement text.
    InvalidColumnName {
        entity: &'static str,
        field: &'static str,
        column: String,
    },
    /// Auto-generated identifier with no data columns: an insert statement
    /// would have zero columns.
    NoInsertableColumns { entity: &'static str },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoMappedFields { entity } => {
                write!(f, "entity `{entity}` declares no mapped fields")
            }
            Self::MissingIdentifier { entity } => {
                write!(f, "entity `{entity}` has no identifier field")
            }
            Self::InvalidTableName { entity, table } => {
                write!(f, "entity `{entity}` has invalid table name `{table}`")
            }
            Self::InvalidColumnName {
                entity,
                field,
                column,
            } => write!(
                f,
                "entity `{entity}` field `{field}` has invalid column name `{column}`"
            ),
            Self::NoInsertableColumns { entity } => write!(
                f,
                "entity `{entity}` has no insertable columns (auto-generated identifier only)"
            ),
        }
    }
}

impl Error for ConfigError {}

/// One resolved column with identifier metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    /// Field name on the Rust type.
    pub field: &'static str,
    /// Column name in the table.
    pub column: &'static str,
    /// Whether this column is the row identifier.
    pub is_identifier: bool,
    /// Whether the store generates the value on insert. Only ever `true`
    /// on the identifier column.
    pub auto_generated: bool,
}

/// Immutable table mapping for one entity type.
///
/// Built once per type at repository construction and shared afterwards.
#[derive(Debug, Clone)]
pub struct EntityDescriptor {
    entity: &'static str,
    table: String,
    columns: Vec<ColumnMapping>,
    identifier_index: usize,
}

impl EntityDescriptor {
    /// Resolves the descriptor for one entity type.
    ///
    /// # Errors
    /// Returns a `ConfigError` for declarations without fields, without an
    /// identifier, with names unusable in statement text, or whose insert
    /// statement would carry zero columns.
    pub fn resolve<E: Entity>() -> Result<Self, ConfigError> {
        resolve_from(E::entity_name(), E::table_name(), E::fields())
    }

    /// Entity type name the descriptor was resolved from.
    pub fn entity_name(&self) -> &'static str {
        self.entity
    }

    /// Mapped table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// All resolved columns in declaration order, identifier included.
    pub fn columns(&self) -> &[ColumnMapping] {
        &self.columns
    }

    /// The identifier column.
    pub fn identifier(&self) -> &ColumnMapping {
        &self.columns[self.identifier_index]
    }

    /// Columns included in insert statements: everything except an
    /// auto-generated identifier.
    pub fn insertable_columns(&self) -> impl Iterator<Item = &ColumnMapping> {
        self.columns
            .iter()
            .filter(|mapping| !(mapping.is_identifier && mapping.auto_generated))
    }

    /// Looks one column up by field name first, then by column name.
    pub fn lookup(&self, name: &str) -> Option<&ColumnMapping> {
        self.columns
            .iter()
            .find(|mapping| mapping.field == name)
            .or_else(|| self.columns.iter().find(|mapping| mapping.column == name))
    }
}

fn resolve_from(
    entity: &'static str,
    explicit_table: Option<&'static str>,
    fields: &'static [FieldSpec],
) -> Result<EntityDescriptor, ConfigError> {
    if fields.is_empty() {
        return Err(ConfigError::NoMappedFields { entity });
    }

    let table = match explicit_table.map(str::trim).filter(|name| !name.is_empty()) {
        Some(name) => name.to_string(),
        None => entity.to_lowercase(),
    };
    if !SQL_NAME_RE.is_match(&table) {
        return Err(ConfigError::InvalidTableName { entity, table });
    }

    let mut columns = Vec::with_capacity(fields.len());
    let mut identifier_index = None;
    for spec in fields {
        let column = match spec.column.map(str::trim).filter(|name| !name.is_empty()) {
            Some(name) => name,
            None => spec.field,
        };
        if !SQL_NAME_RE.is_match(column) {
            return Err(ConfigError::InvalidColumnName {
                entity,
                field: spec.field,
                column: column.to_string(),
            });
        }

        let (is_identifier, auto_generated) = match spec.role {
            FieldRole::Identifier { auto_generated } if identifier_index.is_none() => {
                identifier_index = Some(columns.len());
                (true, auto_generated)
            }
            FieldRole::Identifier { .. } => {
                // First identifier wins; later ones map as plain data.
                warn!(
                    "event=meta_resolve module=meta status=warn entity={} field={} reason=extra_identifier_demoted",
                    entity, spec.field
                );
                (false, false)
            }
            FieldRole::Data => (false, false),
        };

        columns.push(ColumnMapping {
            field: spec.field,
            column,
            is_identifier,
            auto_generated,
        });
    }

    let identifier_index = identifier_index.ok_or(ConfigError::MissingIdentifier { entity })?;

    let identifier = &columns[identifier_index];
    if identifier.auto_generated && columns.len() == 1 {
        return Err(ConfigError::NoInsertableColumns { entity });
    }

    let mut seen = HashSet::new();
    for mapping in &columns {
        if !seen.insert(mapping.column) {
            // Uniqueness is assumed, not enforced.
            warn!(
                "event=meta_resolve module=meta status=warn entity={} column={} reason=duplicate_column_name",
                entity, mapping.column
            );
        }
    }

    Ok(EntityDescriptor {
        entity,
        table,
        columns,
        identifier_index,
    })
}
