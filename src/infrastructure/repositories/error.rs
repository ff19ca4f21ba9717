use crate::domain::errors::DomainError;

// Extended SQLite result codes.
const SQLITE_BUSY: &str = "5";
const SQLITE_LOCKED: &str = "6";
const SQLITE_BUSY_SNAPSHOT: &str = "517";
const SQLITE_CONSTRAINT_CHECK: &str = "275";

#[allow(clippy::needless_pass_by_value)]
pub fn map_sqlx(err: sqlx::Error) -> DomainError {
    match &err {
        sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
            // A concurrent writer holds the database; the save can be retried.
            Some(SQLITE_BUSY | SQLITE_LOCKED | SQLITE_BUSY_SNAPSHOT) => {
                DomainError::Conflict("database is busy".into())
            }
            // json_valid checks on the `lineage` and `fields` columns
            Some(SQLITE_CONSTRAINT_CHECK) => {
                DomainError::Validation("check constraint violated".into())
            }
            _ => DomainError::Persistence(db_err.message().to_string()),
        },
        _ => DomainError::Persistence(err.to_string()),
    }
}
