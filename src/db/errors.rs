use thiserror::Error;

/// Errors the record service reports to its callers.
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("Employee not found")]
    NotFound,

    /// Unique constraint violation (the only unique column is email)
    #[error("Unique constraint violation")]
    Conflict { constraint: Option<String>, message: String },

    #[error(transparent)]
    Store(sqlx::Error),
}

impl From<sqlx::Error> for RecordError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => RecordError::NotFound,
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => RecordError::Conflict {
                constraint: db_err.constraint().map(|s| s.to_string()),
                message: db_err.message().to_string(),
            },
            _ => RecordError::Store(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, RecordError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_maps_to_not_found() {
        assert!(matches!(RecordError::from(sqlx::Error::RowNotFound), RecordError::NotFound));
    }

    #[test]
    fn other_errors_are_store_errors() {
        assert!(matches!(RecordError::from(sqlx::Error::PoolTimedOut), RecordError::Store(_)));
    }
}
