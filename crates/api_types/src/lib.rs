use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Uniform reply wrapper used by every endpoint.
///
/// Failures carry no `data`.
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }
}

/// Income or expense classification, owned by a category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
}

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserRegister {
        pub username: String,
        pub password: String,
    }

    /// Request body for `PUT /users/me`. At least one field is required.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct UserUpdate {
        pub username: Option<String>,
        pub password: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct UserView {
        pub id: Uuid,
        pub username: String,
        pub created_at: DateTime<Utc>,
    }
}

pub mod category {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryCreate {
        pub name: String,
        #[serde(rename = "type")]
        pub kind: TransactionKind,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryUpdate {
        pub name: Option<String>,
        #[serde(rename = "type")]
        pub kind: Option<TransactionKind>,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CategoryView {
        pub id: Uuid,
        pub name: String,
        #[serde(rename = "type")]
        pub kind: TransactionKind,
        pub created_by: Uuid,
        pub created_at: DateTime<Utc>,
    }
}

pub mod transaction {
    use super::*;
    use crate::category::CategoryView;

    /// Query string of `GET /transactions`.
    ///
    /// Both bounds are kept raw: the engine decides how to read them.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionListQuery {
        pub start_date: Option<String>,
        pub end_date: Option<String>,
    }

    /// Request body for creating a transaction.
    ///
    /// `amount` is in minor units and must be > 0; the sign comes from the
    /// category type. `date` is `YYYY-MM-DD` or RFC 3339.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionNew {
        pub amount: i64,
        pub description: Option<String>,
        pub category_id: Uuid,
        pub date: String,
    }

    /// Request body for updating a transaction. Every field is required.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionUpdate {
        pub amount: Option<i64>,
        pub description: Option<String>,
        pub category_id: Option<Uuid>,
        pub date: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionView {
        pub id: Uuid,
        pub amount: i64,
        pub description: String,
        pub category_id: Uuid,
        /// Category resolved at read time. Absent only if it vanished.
        pub category: Option<CategoryView>,
        pub date: NaiveDate,
        #[serde(rename = "type")]
        pub kind: TransactionKind,
        pub created_by: Uuid,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DateGroupView {
        pub date: NaiveDate,
        pub transactions: Vec<TransactionView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionListResponse {
        /// Newest date first, each group newest-created first.
        pub list_group: Vec<DateGroupView>,
        pub total_income: i64,
        pub total_expense: i64,
        pub remaining_balance: i64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use transaction::{TransactionListQuery, TransactionListResponse};

    #[test]
    fn failure_envelope_omits_data() {
        let json = serde_json::to_value(Envelope::<()>::failure("boom")).unwrap();
        assert_eq!(json, serde_json::json!({ "success": false, "message": "boom" }));
    }

    #[test]
    fn list_response_uses_camel_case_keys() {
        let body = Envelope::ok(
            "ok",
            TransactionListResponse {
                list_group: Vec::new(),
                total_income: 100,
                total_expense: 40,
                remaining_balance: 60,
            },
        );
        let json = serde_json::to_value(body).unwrap();
        let data = &json["data"];
        assert_eq!(data["listGroup"], serde_json::json!([]));
        assert_eq!(data["totalIncome"], 100);
        assert_eq!(data["totalExpense"], 40);
        assert_eq!(data["remainingBalance"], 60);
    }

    #[test]
    fn list_query_reads_camel_case_params() {
        let query: TransactionListQuery =
            serde_json::from_str(r#"{"startDate":"2024-01-01"}"#).unwrap();
        assert_eq!(query.start_date.as_deref(), Some("2024-01-01"));
        assert!(query.end_date.is_none());
    }

    #[test]
    fn kind_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&TransactionKind::Expense).unwrap(),
            "\"expense\""
        );
    }
}
