//! Folding of pool and Diesel failures into the marketplace port errors.
//!
//! The user, service and event port error enums all carry `Connection` and
//! `Query` variants. [`DieselFailure`] sorts a Diesel error once; each
//! repository then either reacts to a specific class (duplicate emails) or
//! lets [`DieselFailure::into_port`] pick the generic variant.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::{debug, warn};

use crate::domain::ports::{EventRepositoryError, ServiceRepositoryError, UserPersistenceError};

use super::pool::PoolError;

/// Port error enums the Diesel repositories report through.
pub(super) trait RepositoryFailure {
    fn from_connection(message: String) -> Self;
    fn from_query(message: String) -> Self;
}

macro_rules! repository_failure {
    ($($port:ty),* $(,)?) => {
        $(
            impl RepositoryFailure for $port {
                fn from_connection(message: String) -> Self {
                    Self::connection(message)
                }

                fn from_query(message: String) -> Self {
                    Self::query(message)
                }
            }
        )*
    };
}

repository_failure!(UserPersistenceError, ServiceRepositoryError, EventRepositoryError);

/// A Diesel error sorted by how a repository should react to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum DieselFailure {
    /// The server closed the connection mid-statement.
    Connection,
    /// A unique index rejected the row.
    UniqueViolation { constraint: Option<String> },
    /// A CHECK constraint rejected the row, e.g. a negative price.
    CheckViolation { constraint: Option<String> },
    /// Any other failure, summarised without database detail.
    Query(&'static str),
}

impl From<DieselError> for DieselFailure {
    fn from(error: DieselError) -> Self {
        match error {
            DieselError::NotFound => Self::Query("record not found"),
            DieselError::QueryBuilderError(_) => Self::Query("database query error"),
            DieselError::DeserializationError(_) => Self::Query("stored row could not be decoded"),
            DieselError::DatabaseError(kind, info) => {
                debug!(
                    ?kind,
                    message = info.message(),
                    table = ?info.table_name(),
                    constraint = ?info.constraint_name(),
                    "database rejected statement"
                );
                let constraint = info.constraint_name().map(str::to_owned);
                match kind {
                    DatabaseErrorKind::ClosedConnection => Self::Connection,
                    DatabaseErrorKind::UniqueViolation => Self::UniqueViolation { constraint },
                    DatabaseErrorKind::CheckViolation => Self::CheckViolation { constraint },
                    _ => Self::Query("database error"),
                }
            }
            other => {
                debug!(error = %other, "diesel operation failed");
                Self::Query("database error")
            }
        }
    }
}

impl DieselFailure {
    /// Generic port error for this failure. Constraint violations become
    /// query errors naming the constraint.
    pub(super) fn into_port<E: RepositoryFailure>(self) -> E {
        match self {
            Self::Connection => E::from_connection("database connection error".to_owned()),
            Self::UniqueViolation { constraint } => E::from_query(format!(
                "duplicate value rejected by {}",
                constraint.as_deref().unwrap_or("a unique index")
            )),
            Self::CheckViolation { constraint } => E::from_query(format!(
                "row rejected by {}",
                constraint.as_deref().unwrap_or("a check constraint")
            )),
            Self::Query(message) => E::from_query(message.to_owned()),
        }
    }
}

/// Map a pool checkout or build failure to the port's connection error.
pub(super) fn pool_failure<E: RepositoryFailure>(error: PoolError) -> E {
    warn!(%error, "database pool unavailable");
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    E::from_connection(message)
}

/// Map a Diesel error with no repository-specific handling.
pub(super) fn diesel_failure<E: RepositoryFailure>(error: DieselError) -> E {
    DieselFailure::from(error).into_port()
}
