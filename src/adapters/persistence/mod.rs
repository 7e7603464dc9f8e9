pub mod ledger;
pub mod subscription;

use sqlx::PgPool;

use crate::app_error::AppError;

/// Postgres-backed implementation of the store traits.
#[derive(Clone)]
pub struct PostgresPersistence {
    pub(crate) pool: PgPool,
}

impl PostgresPersistence {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => AppError::NotFound,
            other => AppError::Database(other.to_string()),
        }
    }
}
