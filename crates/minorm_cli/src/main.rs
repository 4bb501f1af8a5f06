//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `minorm_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use minorm_core::{
    CoerceError, ConnectionProvider, Entity, FieldSpec, FromValue, RepoError, Repository,
    SharedConnection, SqlRepository, ToValue,
};
use rusqlite::types::Value;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq)]
struct Probe {
    id: i64,
    body: String,
}

impl Entity for Probe {
    fn entity_name() -> &'static str {
        "Probe"
    }

    fn fields() -> &'static [FieldSpec] {
        const FIELDS: &[FieldSpec] = &[
            FieldSpec::identifier("id", true),
            FieldSpec::data("body"),
        ];
        FIELDS
    }

    fn read_field(&self, field: &str) -> Option<Value> {
        match field {
            "id" => Some(self.id.to_value()),
            "body" => Some(self.body.to_value()),
            _ => None,
        }
    }

    fn write_field(&mut self, field: &str, value: Value) -> Result<(), CoerceError> {
        match field {
            "id" => self.id = i64::from_value(value)?,
            "body" => self.body = String::from_value(value)?,
            _ => return Err(CoerceError::UnknownField(field.to_string())),
        }
        Ok(())
    }
}

fn smoke() -> Result<Probe, RepoError> {
    let provider = SharedConnection::open_in_memory()?;
    provider.connection()?.execute_batch(
        "CREATE TABLE probe (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            body TEXT NOT NULL
        );",
    )?;

    let repo = SqlRepository::<Probe, _>::try_new(Arc::new(provider))?;
    let saved = repo.save(Probe {
        id: 0,
        body: "hello".to_string(),
    })?;
    match repo.find_by_id(&saved.id)? {
        Some(loaded) => Ok(loaded),
        None => Err(RepoError::Db(minorm_core::DbError::Unavailable(
            "saved row not found".to_string(),
        ))),
    }
}

fn main() -> ExitCode {
    println!("minorm_core version={}", minorm_core::core_version());
    match smoke() {
        Ok(probe) => {
            println!("smoke round_trip=ok id={} body={}", probe.id, probe.body);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("smoke round_trip=error error={err}");
            ExitCode::FAILURE
        }
    }
}
