//! Diesel and pool error mapping shared by the repository adapters.
//!
//! Each port error type gets a [`PersistenceError`] impl so adapters can use
//! the generic mappers with `map_err`.

use tracing::debug;

use crate::domain::ports::{
    ClinicRepositoryError, NotificationRepositoryError, PatientRepositoryError,
    PermissionRepositoryError, ReservationRepositoryError, StaffRepositoryError,
    VisitRepositoryError,
};

use super::pool::PoolError;

/// Port error with connection and query categories.
pub(crate) trait PersistenceError: Sized {
    fn connection_failure(message: String) -> Self;
    fn query_failure(message: String) -> Self;
}

macro_rules! impl_persistence_error {
    ($($error:ty),* $(,)?) => {
        $(
            impl PersistenceError for $error {
                fn connection_failure(message: String) -> Self {
                    Self::connection(message)
                }

                fn query_failure(message: String) -> Self {
                    Self::query(message)
                }
            }
        )*
    };
}

impl_persistence_error!(
    ClinicRepositoryError,
    NotificationRepositoryError,
    PatientRepositoryError,
    PermissionRepositoryError,
    ReservationRepositoryError,
    StaffRepositoryError,
    VisitRepositoryError,
);

/// Message carried by a pool error.
pub(crate) fn pool_error_message(error: PoolError) -> String {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    }
}

/// Pool failures always mean the database is unreachable.
pub(crate) fn map_pool_error<E: PersistenceError>(error: PoolError) -> E {
    E::connection_failure(pool_error_message(error))
}

/// Whether a Diesel error means the connection itself is gone.
pub(crate) fn is_connection_error(error: &diesel::result::Error) -> bool {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    matches!(
        error,
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _)
            | DieselError::BrokenTransactionManager
    )
}

/// Map a Diesel error, keeping driver details out of the message.
pub(crate) fn map_diesel_error<E: PersistenceError>(error: diesel::result::Error) -> E {
    use diesel::result::Error as DieselError;

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    if is_connection_error(&error) {
        return E::connection_failure("database connection error".to_owned());
    }
    match error {
        DieselError::NotFound => E::query_failure("record not found".to_owned()),
        DieselError::QueryBuilderError(_) => E::query_failure("database query error".to_owned()),
        DieselError::DeserializationError(_) => {
            E::query_failure("unexpected column value".to_owned())
        }
        _ => E::query_failure("database error".to_owned()),
    }
}

/// Convert rows, failing with a query error on the first bad row.
pub(crate) fn convert_rows<R, T, E>(rows: Vec<R>) -> Result<Vec<T>, E>
where
    T: TryFrom<R, Error = String>,
    E: PersistenceError,
{
    rows.into_iter()
        .map(T::try_from)
        .collect::<Result<Vec<_>, _>>()
        .map_err(E::query_failure)
}
