/*!
 * # Roles
 *
 * Warehouse users carry exactly one role. Route groups declare the set of
 * roles they admit; a user passes when their role is listed, when they are
 * `operator_full` and the set lists `operator`, or when their priority is at
 * least the highest priority in the set.
 */

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    AsRefStr,
    EnumString,
    EnumIter,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    Admin,
    Operator,
    OperatorFull,
    OperatorLimited,
    Viewer,
}

impl Role {
    pub fn priority(self) -> u8 {
        match self {
            Role::Admin => 4,
            Role::Operator | Role::OperatorFull => 3,
            Role::OperatorLimited => 2,
            Role::Viewer => 1,
        }
    }

    /// Role given to self-registered accounts that don't ask for one.
    pub fn default_for_registration() -> Self {
        Role::Operator
    }
}

/// Every role, used by read-only routes.
pub const ANY_ROLE: &[Role] = &[Role::Admin, Role::Operator, Role::OperatorLimited, Role::Viewer];
/// Stock handling: orders, receiving, moves, consumption, import.
pub const STOCK_WRITERS: &[Role] = &[Role::Admin, Role::Operator, Role::OperatorLimited];
/// Production floor writes: work orders, stages, sub-products, quality, positions.
pub const OPERATORS: &[Role] = &[Role::Admin, Role::Operator];
pub const ADMIN_ONLY: &[Role] = &[Role::Admin];

/// Returns true when `role` may access a route admitting `allowed`.
pub fn authorize(role: Role, allowed: &[Role]) -> bool {
    if allowed.contains(&role) {
        return true;
    }
    if role == Role::OperatorFull && allowed.contains(&Role::Operator) {
        return true;
    }
    match allowed.iter().map(|r| r.priority()).max() {
        Some(required) => role.priority() >= required,
        None => false,
    }
}
