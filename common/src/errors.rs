// Error handling framework

use thiserror::Error;

/// Validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid field value for {field}: {reason}")]
    InvalidFieldValue { field: String, reason: String },

    #[error("Invalid group configuration: {0}")]
    InvalidGroupConfig(String),
}

/// Database-specific errors
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Database health check failed: {0}")]
    HealthCheckFailed(String),

    #[error("Query execution failed: {0}")]
    QueryFailed(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Duplicate key violation: {0}")]
    DuplicateKey(String),

    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),
}

/// Errors raised by the table numbering and judge rotation operations.
///
/// Every data layer failure is wrapped with the step that failed, so the
/// message reads like "error getting projects from database: ...".
#[derive(Error, Debug)]
pub enum NumberingError {
    #[error("error starting transaction: {0}")]
    BeginTransaction(#[source] DatabaseError),

    #[error("error committing transaction: {0}")]
    CommitTransaction(#[source] DatabaseError),

    #[error("error getting projects from database: {0}")]
    LoadProjects(#[source] DatabaseError),

    #[error("error getting judges from database: {0}")]
    LoadJudges(#[source] DatabaseError),

    #[error("error getting options from database: {0}")]
    LoadOptions(#[source] DatabaseError),

    #[error("error updating options in database: {0}")]
    UpdateOptions(#[source] DatabaseError),

    #[error("error updating projects in database: {0}")]
    UpdateProjects(#[source] DatabaseError),

    #[error("error inserting project into database: {0}")]
    InsertProject(#[source] DatabaseError),

    #[error("error updating judges in database: {0}")]
    UpdateJudges(#[source] DatabaseError),

    #[error("error incrementing manual switches in database: {0}")]
    IncrementManualSwitches(#[source] DatabaseError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl NumberingError {
    /// True when the failure came from bad input or configuration rather
    /// than from the data layer.
    pub fn is_validation(&self) -> bool {
        matches!(self, NumberingError::Validation(_))
    }
}

// Implement From for common external errors
impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DatabaseError::NotFound("Record not found".to_string()),
            sqlx::Error::Database(db_err) => {
                // Check for specific database error codes
                if let Some(code) = db_err.code() {
                    match code.as_ref() {
                        "23505" => DatabaseError::DuplicateKey(db_err.message().to_string()),
                        "23503" => DatabaseError::ForeignKeyViolation(db_err.message().to_string()),
                        _ => DatabaseError::QueryFailed(db_err.message().to_string()),
                    }
                } else {
                    DatabaseError::QueryFailed(db_err.message().to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DatabaseError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DatabaseError::MigrationFailed(err.to_string())
    }
}
