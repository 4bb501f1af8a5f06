use minorm_core::{
    CoerceError, ConnectionProvider, Entity, FieldSpec, FilterError, FromValue, RepoError,
    Repository, SharedConnection, SqlRepository, ToValue,
};
use rusqlite::types::Value;
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq)]
struct Task {
    id: i64,
    title: String,
    priority: i64,
    done: bool,
}

impl Entity for Task {
    fn entity_name() -> &'static str {
        "Task"
    }

    fn fields() -> &'static [FieldSpec] {
        const FIELDS: &[FieldSpec] = &[
            FieldSpec::identifier("id", true),
            FieldSpec::data("title"),
            FieldSpec::data("priority"),
            FieldSpec::data("done"),
        ];
        FIELDS
    }

    fn read_field(&self, field: &str) -> Option<Value> {
        match field {
            "id" => Some(self.id.to_value()),
            "title" => Some(self.title.to_value()),
            "priority" => Some(self.priority.to_value()),
            "done" => Some(self.done.to_value()),
            _ => None,
        }
    }

    fn write_field(&mut self, field: &str, value: Value) -> Result<(), CoerceError> {
        match field {
            "id" => self.id = i64::from_value(value)?,
            "title" => self.title = String::from_value(value)?,
            "priority" => self.priority = i64::from_value(value)?,
            "done" => self.done = bool::from_value(value)?,
            _ => return Err(CoerceError::UnknownField(field.to_string())),
        }
        Ok(())
    }
}

fn task(title: &str, priority: i64, done: bool) -> Task {
    Task {
        id: 0,
        title: title.to_string(),
        priority,
        done,
    }
}

fn seeded_repo() -> SqlRepository<Task, SharedConnection> {
    let provider = SharedConnection::open_in_memory().unwrap();
    provider
        .connection()
        .unwrap()
        .execute_batch(
            "CREATE TABLE task (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                priority INTEGER NOT NULL,
                done INTEGER NOT NULL
            );",
        )
        .unwrap();
    let repo = SqlRepository::try_new(Arc::new(provider)).unwrap();
    repo.save_all(vec![
        task("write report", 2, false),
        task("review patch", 1, true),
        task("write tests", 2, false),
        task("file expenses", 3, true),
    ])
    .unwrap();
    repo
}

fn id_set(tasks: &[Task]) -> HashSet<i64> {
    tasks.iter().map(|t| t.id).collect()
}

#[test]
fn equality_filter_matches_in_memory_subset() {
    let repo = seeded_repo();

    let pushed_down = repo.filter("priority", "=", &2_i64).unwrap();
    let in_memory: Vec<Task> = repo
        .find_all()
        .unwrap()
        .into_iter()
        .filter(|t| t.priority == 2)
        .collect();

    assert_eq!(pushed_down.len(), 2);
    assert_eq!(id_set(&pushed_down), id_set(&in_memory));
}

#[test]
fn comparison_operators_are_pushed_down() {
    let repo = seeded_repo();

    let low = repo.filter("priority", "<=", &2_i64).unwrap();
    assert_eq!(low.len(), 3);

    let high = repo.filter("priority", ">", &2_i64).unwrap();
    assert_eq!(high.len(), 1);
    assert_eq!(high[0].title, "file expenses");

    let not_one = repo.filter("priority", "<>", &1_i64).unwrap();
    assert_eq!(not_one.len(), 3);
}

#[test]
fn like_filter_accepts_any_operator_case() {
    let repo = seeded_repo();

    let upper = repo.filter("title", "LIKE", &"write%").unwrap();
    let lower = repo.filter("title", "like", &"write%").unwrap();
    assert_eq!(upper.len(), 2);
    assert_eq!(id_set(&upper), id_set(&lower));
}

#[test]
fn disallowed_operator_is_rejected_before_querying() {
    let repo = seeded_repo();

    for operator in ["IN", "BETWEEN", "= 1 OR 1 =", "==", "; DROP TABLE task"] {
        let err = repo.filter("title", operator, &"x").unwrap_err();
        assert!(matches!(
            err,
            RepoError::Filter(FilterError::DisallowedOperator { .. })
        ));
    }
}

#[test]
fn unknown_field_is_rejected_before_querying() {
    let repo = seeded_repo();

    let err = repo.filter("owner", "=", &"x").unwrap_err();
    assert!(matches!(
        err,
        RepoError::Filter(FilterError::UnknownField { .. })
    ));
}

#[test]
fn predicate_filter_runs_in_memory_over_all_rows() {
    let repo = seeded_repo();

    let open_and_urgent = repo
        .find_where(&|t: &Task| !t.done && t.priority <= 2)
        .unwrap();
    assert_eq!(open_and_urgent.len(), 2);
    assert!(open_and_urgent.iter().all(|t| !t.done));
}

#[test]
fn predicate_filter_is_idempotent_without_writes() {
    let repo = seeded_repo();

    let first = repo.find_where(&|t: &Task| t.done).unwrap();
    let second = repo.find_where(&|t: &Task| t.done).unwrap();
    assert_eq!(id_set(&first), id_set(&second));
}
