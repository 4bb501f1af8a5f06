use minorm_core::{
    CoerceError, ConnectionProvider, Entity, FieldSpec, FromValue, RepoError, Repository,
    SharedConnection, SqlRepository, ToValue,
};
use rusqlite::types::Value;
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq)]
struct User {
    id: i64,
    name: String,
    email: String,
}

impl Entity for User {
    fn entity_name() -> &'static str {
        "User"
    }

    fn fields() -> &'static [FieldSpec] {
        const FIELDS: &[FieldSpec] = &[
            FieldSpec::identifier("id", true),
            FieldSpec::data("name"),
            FieldSpec::data("email"),
        ];
        FIELDS
    }

    fn read_field(&self, field: &str) -> Option<Value> {
        match field {
            "id" => Some(self.id.to_value()),
            "name" => Some(self.name.to_value()),
            "email" => Some(self.email.to_value()),
            _ => None,
        }
    }

    fn write_field(&mut self, field: &str, value: Value) -> Result<(), CoerceError> {
        match field {
            "id" => self.id = i64::from_value(value)?,
            "name" => self.name = String::from_value(value)?,
            "email" => self.email = String::from_value(value)?,
            _ => return Err(CoerceError::UnknownField(field.to_string())),
        }
        Ok(())
    }
}

fn user(name: &str, email: &str) -> User {
    User {
        id: 0,
        name: name.to_string(),
        email: email.to_string(),
    }
}

fn user_repo() -> SqlRepository<User, SharedConnection> {
    let provider = SharedConnection::open_in_memory().unwrap();
    provider
        .connection()
        .unwrap()
        .execute_batch(
            "CREATE TABLE user (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE
            );",
        )
        .unwrap();
    SqlRepository::try_new(Arc::new(provider)).unwrap()
}

#[test]
fn save_populates_generated_identifier() {
    let repo = user_repo();
    let saved = repo.save(user("Ana", "a@x.com")).unwrap();
    assert!(saved.id > 0);
    assert_eq!(saved.name, "Ana");
    assert_eq!(saved.email, "a@x.com");
}

#[test]
fn save_and_find_round_trip() {
    let repo = user_repo();
    let saved = repo.save(user("Ana", "a@x.com")).unwrap();

    let loaded = repo.find_by_id(&saved.id).unwrap().unwrap();
    assert_eq!(loaded, saved);
}

#[test]
fn find_by_id_returns_none_for_missing_row() {
    let repo = user_repo();
    assert!(repo.find_by_id(&42_i64).unwrap().is_none());
}

#[test]
fn find_all_is_idempotent_without_writes() {
    let repo = user_repo();
    repo.save(user("Ana", "a@x.com")).unwrap();
    repo.save(user("Ben", "b@x.com")).unwrap();

    let mut first = repo.find_all().unwrap();
    let mut second = repo.find_all().unwrap();
    first.sort_by_key(|u| u.id);
    second.sort_by_key(|u| u.id);
    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
}

#[test]
fn save_all_keeps_input_order() {
    let repo = user_repo();
    let saved = repo
        .save_all(vec![user("Ana", "a@x.com"), user("Ben", "b@x.com")])
        .unwrap();
    assert_eq!(saved.len(), 2);
    assert_eq!(saved[0].name, "Ana");
    assert_eq!(saved[1].name, "Ben");
    assert!(saved[0].id < saved[1].id);
}

#[test]
fn save_all_stops_at_first_failure_keeping_prior_rows() {
    let repo = user_repo();
    repo.save(user("Ana", "a@x.com")).unwrap();

    // The middle element violates the unique email constraint.
    let result = repo.save_all(vec![
        user("Ben", "b@x.com"),
        user("Copy", "a@x.com"),
        user("Cid", "c@x.com"),
    ]);
    assert!(matches!(result, Err(RepoError::Db(_))));

    let all = repo.find_all().unwrap();
    let names: Vec<&str> = all.iter().map(|u| u.name.as_str()).collect();
    assert!(names.contains(&"Ana"));
    assert!(names.contains(&"Ben"));
    assert!(!names.contains(&"Copy"));
    assert!(!names.contains(&"Cid"));
}

#[test]
fn delete_removes_row() {
    let repo = user_repo();
    let saved = repo.save(user("Ana", "a@x.com")).unwrap();

    repo.delete(&saved).unwrap();
    assert!(repo.find_by_id(&saved.id).unwrap().is_none());
}

#[test]
fn delete_of_absent_row_is_silent() {
    let repo = user_repo();
    let never_saved = User {
        id: 999,
        ..user("Ghost", "g@x.com")
    };
    repo.delete(&never_saved).unwrap();
    repo.delete_by_id(&never_saved).unwrap();
}

#[test]
fn deleting_one_row_leaves_others() {
    let repo = user_repo();
    let ana = repo.save(user("Ana", "a@x.com")).unwrap();
    let ben = repo.save(user("Ben", "b@x.com")).unwrap();

    repo.delete_by_id(&ana).unwrap();

    let all = repo.find_all().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, ben.id);
}
