//! Translation of storage constraint violations into domain errors
//!
//! Every catalog mutation runs inside a transaction and hands its raw result
//! to [`settle`]. On success the transaction commits. On failure it is rolled
//! back first, then the error is classified by the identity of the violated
//! constraint and mapped to a stable client error:
//!
//! | violation | outcome |
//! |---|---|
//! | unique `accounts.username` | 409 username conflict |
//! | unique `accounts.email` | 409 email conflict |
//! | unique `novelists.name` | 409 novelist conflict |
//! | foreign key `books.novelist_id` | 404 novelist not found |
//! | any other integrity violation | 400 with engine detail |
//!
//! Non-integrity failures pass through as database errors.

use std::fmt;

use sqlx::{error::ErrorKind, Sqlite, Transaction};

use crate::error::{Error, Result};
use crate::messages;

/// Constraints the catalog schema declares and the service knows by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Constraint {
    AccountUsername,
    AccountEmail,
    NovelistName,
    BookNovelist,
}

impl Constraint {
    /// Resolve a constraint from the identity the engine reports.
    ///
    /// Accepts the `table.column` form SQLite puts in its messages as well as
    /// the index and key names declared in the migrations.
    pub fn from_identity(identity: &str) -> Option<Self> {
        match identity.trim() {
            "accounts.username" | "ux_accounts_username" => Some(Self::AccountUsername),
            "accounts.email" | "ux_accounts_email" => Some(Self::AccountEmail),
            "novelists.name" | "ux_novelists_name" => Some(Self::NovelistName),
            "books.novelist_id" | "fk_books_novelist_id" => Some(Self::BookNovelist),
            _ => None,
        }
    }

    /// The domain error this constraint maps to when violated
    pub fn to_error(self) -> Error {
        match self {
            Self::AccountUsername => {
                Error::Conflict(messages::ACCOUNT_USERNAME_CONFLICT.to_string())
            }
            Self::AccountEmail => Error::Conflict(messages::ACCOUNT_EMAIL_CONFLICT.to_string()),
            Self::NovelistName => Error::Conflict(messages::NOVELIST_CONFLICT.to_string()),
            Self::BookNovelist => Error::NotFound(messages::NOVELIST_NOT_FOUND.to_string()),
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AccountUsername => write!(f, "accounts.username"),
            Self::AccountEmail => write!(f, "accounts.email"),
            Self::NovelistName => write!(f, "novelists.name"),
            Self::BookNovelist => write!(f, "books.novelist_id"),
        }
    }
}

/// Kind of integrity violation reported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    Unique,
    ForeignKey,
    NotNull,
    Check,
}

/// A classified integrity violation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub kind: ViolationKind,
    pub constraint: Option<Constraint>,
    pub detail: String,
}

impl Violation {
    /// Map the violation to the error returned to the client
    pub fn into_error(self) -> Error {
        match (self.kind, self.constraint) {
            (ViolationKind::Unique, Some(c @ Constraint::AccountUsername))
            | (ViolationKind::Unique, Some(c @ Constraint::AccountEmail))
            | (ViolationKind::Unique, Some(c @ Constraint::NovelistName))
            | (ViolationKind::ForeignKey, Some(c @ Constraint::BookNovelist)) => c.to_error(),
            _ => Error::BadRequest(messages::integrity_failure(&self.detail)),
        }
    }
}

/// Classify an engine error, or `None` when it is not an integrity violation
pub fn classify(err: &sqlx::Error) -> Option<Violation> {
    let sqlx::Error::Database(db_err) = err else {
        return None;
    };

    let kind = match db_err.kind() {
        ErrorKind::UniqueViolation => ViolationKind::Unique,
        ErrorKind::ForeignKeyViolation => ViolationKind::ForeignKey,
        ErrorKind::NotNullViolation => ViolationKind::NotNull,
        ErrorKind::CheckViolation => ViolationKind::Check,
        _ => return None,
    };

    let message = db_err.message();
    let constraint = match db_err.constraint() {
        Some(name) => Constraint::from_identity(name),
        None => match kind {
            ViolationKind::Unique => unique_target(message),
            // SQLite does not name the failing key; books.novelist_id is the
            // only foreign key in the schema.
            ViolationKind::ForeignKey => Some(Constraint::BookNovelist),
            _ => None,
        },
    };

    Some(Violation {
        kind,
        constraint,
        detail: message.to_string(),
    })
}

/// Extract the constraint from "UNIQUE constraint failed: table.column".
///
/// Composite keys list several columns; those never map to a single known
/// constraint.
fn unique_target(message: &str) -> Option<Constraint> {
    let (_, columns) = message.split_once("constraint failed:")?;
    if columns.contains(',') {
        return None;
    }
    Constraint::from_identity(columns)
}

/// Map a failed mutation to its client error
pub fn resolve(err: sqlx::Error) -> Error {
    match classify(&err) {
        Some(violation) => {
            tracing::debug!(
                kind = ?violation.kind,
                constraint = ?violation.constraint,
                "Integrity violation"
            );
            violation.into_error()
        }
        None => err.into(),
    }
}

/// Commit on success, roll back and resolve on failure
pub async fn settle<T>(
    tx: Transaction<'static, Sqlite>,
    result: std::result::Result<T, sqlx::Error>,
) -> Result<T> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::error!("Rollback failed: {}", rollback_err);
            }
            Err(resolve(err))
        }
    }
}
