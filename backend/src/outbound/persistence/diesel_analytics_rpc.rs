//! `AnalyticsRpc` adapter calling the scoring functions installed in
//! PostgreSQL.
//!
//! Each call is a single `SELECT fn($1)`; results are cast in SQL so the
//! column types stay fixed regardless of the function's declared return type.

use async_trait::async_trait;
use diesel::QueryableByName;
use diesel::sql_types::{BigInt, Integer, Uuid as SqlUuid};
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::PatientId;
use crate::domain::ports::{AnalyticsRpc, AnalyticsRpcError};

use super::error_mapping::{is_connection_error, pool_error_message};
use super::pool::DbPool;

const LTV_PROCEDURE: &str = "calculate_patient_ltv";
const CHURN_PROCEDURE: &str = "calculate_churn_risk";

#[derive(QueryableByName)]
struct LtvValue {
    #[diesel(sql_type = BigInt)]
    value: i64,
}

#[derive(QueryableByName)]
struct ChurnValue {
    #[diesel(sql_type = Integer)]
    value: i32,
}

#[derive(Clone)]
pub struct DieselAnalyticsRpc {
    pool: DbPool,
}

impl DieselAnalyticsRpc {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_procedure_error(name: &str, error: diesel::result::Error) -> AnalyticsRpcError {
    debug!(procedure = name, error = %error, "analytics procedure failed");
    if is_connection_error(&error) {
        AnalyticsRpcError::connection("database connection error")
    } else {
        AnalyticsRpcError::procedure(name, error.to_string())
    }
}

#[async_trait]
impl AnalyticsRpc for DieselAnalyticsRpc {
    async fn patient_ltv(&self, patient_id: &PatientId) -> Result<i64, AnalyticsRpcError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| AnalyticsRpcError::connection(pool_error_message(err)))?;

        let row: LtvValue =
            diesel::sql_query("SELECT calculate_patient_ltv($1)::bigint AS value")
                .bind::<SqlUuid, _>(*patient_id.as_uuid())
                .get_result(&mut conn)
                .await
                .map_err(|err| map_procedure_error(LTV_PROCEDURE, err))?;
        Ok(row.value)
    }

    async fn churn_risk(&self, patient_id: &PatientId) -> Result<i32, AnalyticsRpcError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| AnalyticsRpcError::connection(pool_error_message(err)))?;

        let row: ChurnValue = diesel::sql_query("SELECT calculate_churn_risk($1)::int4 AS value")
            .bind::<SqlUuid, _>(*patient_id.as_uuid())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_procedure_error(CHURN_PROCEDURE, err))?;
        Ok(row.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn procedure_failures_carry_the_function_name() {
        let err = map_procedure_error(LTV_PROCEDURE, diesel::result::Error::NotFound);
        match err {
            AnalyticsRpcError::Procedure { name, .. } => assert_eq!(name, LTV_PROCEDURE),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[rstest]
    fn broken_transactions_are_connection_failures() {
        let err = map_procedure_error(
            CHURN_PROCEDURE,
            diesel::result::Error::BrokenTransactionManager,
        );
        assert!(matches!(err, AnalyticsRpcError::Connection { .. }));
    }
}
