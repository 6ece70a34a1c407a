//! Persistence error type

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error("{resource} with {field} '{value}' already exists")]
    Conflict {
        resource: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("database unavailable: {0}")]
    Unavailable(String),
}

impl DbError {
    pub(crate) fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    /// Map a unique-constraint violation to `Conflict`, anything else to `Sqlx`.
    pub(crate) fn unique_or_sqlx(
        err: sqlx::Error,
        resource: &'static str,
        field: &'static str,
        value: &str,
    ) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => Self::Conflict {
                resource,
                field,
                value: value.to_owned(),
            },
            _ => Self::Sqlx(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_message_names_the_field() {
        let err = DbError::Conflict {
            resource: "course",
            field: "name",
            value: "Maths".into(),
        };
        assert_eq!(err.to_string(), "course with name 'Maths' already exists");
    }

    #[test]
    fn non_database_errors_stay_sqlx() {
        let err = DbError::unique_or_sqlx(sqlx::Error::RowNotFound, "course", "name", "Maths");
        assert!(matches!(err, DbError::Sqlx(sqlx::Error::RowNotFound)));
    }
}
