//! PostgreSQL-backed `AuditLog` writing to `access_audit_logs`.

use async_trait::async_trait;
use diesel_async::RunQueryDsl;

use crate::domain::AuditRecord;
use crate::domain::ports::{AuditLog, AuditLogError};

use super::error_mapping::{is_connection_error, pool_error_message};
use super::models::NewAuditLogRow;
use super::pool::DbPool;
use super::schema::access_audit_logs;

#[derive(Clone)]
pub struct DieselAuditLog {
    pool: DbPool,
}

impl DieselAuditLog {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_write_error(error: diesel::result::Error) -> AuditLogError {
    if is_connection_error(&error) {
        AuditLogError::connection("database connection error")
    } else {
        AuditLogError::write(error.to_string())
    }
}

#[async_trait]
impl AuditLog for DieselAuditLog {
    async fn record(&self, record: &AuditRecord) -> Result<(), AuditLogError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| AuditLogError::connection(pool_error_message(err)))?;

        diesel::insert_into(access_audit_logs::table)
            .values(NewAuditLogRow::from(record))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_write_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::result::{DatabaseErrorKind, Error as DieselError};
    use rstest::rstest;

    #[rstest]
    fn closed_connections_map_to_connection_errors() {
        let err = map_write_error(DieselError::DatabaseError(
            DatabaseErrorKind::ClosedConnection,
            Box::new("gone".to_owned()),
        ));
        assert!(matches!(err, AuditLogError::Connection { .. }));
    }

    #[rstest]
    fn other_failures_map_to_write_errors() {
        let err = map_write_error(DieselError::NotFound);
        assert!(matches!(err, AuditLogError::Write { .. }));
    }
}
