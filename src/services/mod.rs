//! Business services, one per resource area.
//!
//! Services own all database access. Mutations run inside a transaction and
//! lock the rows they change with `SELECT ... FOR UPDATE`; dropping the
//! transaction on an error path rolls everything back.

pub mod assembly;
pub mod dashboard;
pub mod export;
pub mod import;
pub mod inventory;
pub mod orders;
pub mod production;
pub mod production_stages;
pub mod quality_checks;
pub mod receiving;
pub mod sub_products;
pub mod warehouses;

use sea_orm::{DbErr, SqlErr};

use crate::errors::ServiceError;

/// Maps a unique-constraint violation to 409 and anything else to a database error.
pub(crate) fn map_unique_violation(err: DbErr, message: impl FnOnce() -> String) -> ServiceError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => ServiceError::Conflict(message()),
        _ => err.into(),
    }
}
