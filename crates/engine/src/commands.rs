//! Command structs for engine write operations.
//!
//! These types group parameters for create/update calls, keeping call sites
//! readable and avoiding long argument lists.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::TransactionKind;

/// Rename a user and/or change their password.
#[derive(Clone, Debug)]
pub struct UpdateUserCmd {
    pub user_id: Uuid,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Create a category owned by `user_id`.
#[derive(Clone, Debug)]
pub struct CategoryCmd {
    pub user_id: Uuid,
    pub name: String,
    pub kind: TransactionKind,
}

/// Rename and/or re-kind a category.
///
/// Existing transactions keep the kind they were written with.
#[derive(Clone, Debug)]
pub struct UpdateCategoryCmd {
    pub user_id: Uuid,
    pub category_id: Uuid,
    pub name: Option<String>,
    pub kind: Option<TransactionKind>,
}

/// Create a transaction. The kind is taken from the category.
#[derive(Clone, Debug)]
pub struct TransactionCmd {
    pub user_id: Uuid,
    pub amount: i64,
    pub description: Option<String>,
    pub category_id: Uuid,
    pub date: NaiveDate,
}

impl TransactionCmd {
    #[must_use]
    pub fn new(user_id: Uuid, category_id: Uuid, amount: i64, date: NaiveDate) -> Self {
        Self {
            user_id,
            amount,
            description: None,
            category_id,
            date,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Replace every editable field of a transaction.
#[derive(Clone, Debug)]
pub struct UpdateTransactionCmd {
    pub user_id: Uuid,
    pub transaction_id: Uuid,
    pub amount: i64,
    pub description: String,
    pub category_id: Uuid,
    pub date: NaiveDate,
}
