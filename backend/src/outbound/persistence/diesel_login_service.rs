//! Diesel-backed `LoginService` verifying Argon2 hashes stored in
//! `auth_users`.
//!
//! Unknown accounts, inactive accounts, wrong passwords and unparsable
//! hashes all produce the same `unauthorized` error.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::LoginService;
use crate::domain::{Error, LoginCredentials, Principal, UserId};

use super::error_mapping::{is_connection_error, pool_error_message};
use super::models::AuthUserRow;
use super::pool::DbPool;
use super::schema::auth_users;

const INVALID_CREDENTIALS: &str = "invalid credentials";

#[derive(Clone)]
pub struct DieselLoginService {
    pool: DbPool,
}

impl DieselLoginService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Check `password` against an account row.
fn verify_account(row: AuthUserRow, password: &str) -> Result<Principal, Error> {
    if !row.is_active {
        return Err(Error::unauthorized(INVALID_CREDENTIALS));
    }
    let parsed = PasswordHash::new(&row.password_hash).map_err(|err| {
        warn!(user_id = %row.id, error = %err, "stored password hash is malformed");
        Error::unauthorized(INVALID_CREDENTIALS)
    })?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| Error::unauthorized(INVALID_CREDENTIALS))?;
    Ok(Principal::new(UserId::from_uuid(row.id), Some(row.email)))
}

fn map_lookup_error(error: diesel::result::Error) -> Error {
    if is_connection_error(&error) {
        Error::service_unavailable("database connection error")
    } else {
        Error::internal(format!("account lookup failed: {error}"))
    }
}

#[async_trait]
impl LoginService for DieselLoginService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Principal, Error> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| Error::service_unavailable(pool_error_message(err)))?;

        let row: Option<AuthUserRow> = auth_users::table
            .filter(auth_users::email.eq(credentials.email()))
            .select(AuthUserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_lookup_error)?;

        match row {
            Some(row) => verify_account(row, credentials.password()),
            None => Err(Error::unauthorized(INVALID_CREDENTIALS)),
        }
    }
}
