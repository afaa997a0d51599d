use std::fmt;

use serde::Serialize;

/// What is wrong with a single submitted field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum FieldIssue {
    /// Empty or whitespace-only.
    Blank,
    /// Longer than the column allows.
    TooLong { max: usize },
    /// Not one of the known access levels.
    UnknownAccessLevel { value: String },
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldIssue::Blank => f.write_str("must not be blank"),
            FieldIssue::TooLong { max } => write!(f, "must be at most {} characters", max),
            FieldIssue::UnknownAccessLevel { value } => write!(f, "unknown access level '{}'", value),
        }
    }
}

/// A rejected field and the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    #[serde(flatten)]
    pub issue: FieldIssue,
}

/// One or more submitted fields failed validation. Nothing was written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationError {
    errors: Vec<FieldError>,
}

impl ValidationError {
    pub(crate) fn push(&mut self, field: &'static str, issue: FieldIssue) {
        self.errors.push(FieldError { field, issue });
    }

    pub(crate) fn extend(&mut self, other: ValidationError) {
        self.errors.extend(other.errors);
    }

    pub(crate) fn into_result(self) -> Result<(), ValidationError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Names of the offending fields, in the order they were checked.
    pub fn field_names(&self) -> Vec<&'static str> {
        self.errors.iter().map(|e| e.field).collect()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Invalid agent fields: ")?;
        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{} {}", err.field, err.issue)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Errors returned by the agent store.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StoreError {
    /// No agent has this id.
    #[error("Agent not found: {0}")]
    NotFound(i64),

    /// Submitted fields were rejected before touching the database.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A unique column already holds this value.
    #[error("An agent with this {field} already exists")]
    Constraint { field: String },

    /// The connection lock was poisoned by a panicking thread.
    #[error("Store lock poisoned")]
    Poisoned,

    /// Any other database failure.
    #[error("Storage error: {0}")]
    Storage(rusqlite::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match unique_violation_column(&err) {
            Some(field) => StoreError::Constraint { field },
            None => StoreError::Storage(err),
        }
    }
}

/// Column named by a `UNIQUE constraint failed: agents.<column>` error.
fn unique_violation_column(err: &rusqlite::Error) -> Option<String> {
    let rusqlite::Error::SqliteFailure(e, Some(msg)) = err else {
        return None;
    };
    if e.extended_code != rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE {
        return None;
    }
    let columns = msg.strip_prefix("UNIQUE constraint failed: ")?;
    let first = columns.split(',').next()?.trim();
    Some(first.rsplit('.').next().unwrap_or(first).to_string())
}

impl StoreError {
    /// Returns true if the caller can fix the request and resubmit.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            StoreError::Validation(_) | StoreError::Constraint { .. } | StoreError::NotFound(_)
        )
    }
}
