//! Transactions API endpoints

use api_types::{
    Envelope,
    transaction::{
        DateGroupView, TransactionListQuery, TransactionListResponse, TransactionNew,
        TransactionUpdate, TransactionView,
    },
};
use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
};
use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    ServerError,
    categories::{map_category, map_kind},
    extract::{JsonBody, PathParam},
    server::ServerState,
};

fn map_transaction(tx: engine::Transaction) -> TransactionView {
    TransactionView {
        id: tx.id,
        amount: tx.amount,
        description: tx.description,
        category_id: tx.category_id,
        category: tx.category.map(map_category),
        date: tx.date,
        kind: map_kind(tx.kind),
        created_by: tx.created_by,
        created_at: tx.created_at,
    }
}

fn map_group(group: engine::DateGroup) -> DateGroupView {
    DateGroupView {
        date: group.date,
        transactions: group.transactions.into_iter().map(map_transaction).collect(),
    }
}

const NOT_FOUND: &str = "Transaction not found or you do not have permission to access";

/// Like [`ServerError::failed`], but a missing or foreign transaction gets a
/// fixed 404 message.
fn failed_on_transaction(
    failure: &'static str,
) -> impl FnOnce(engine::EngineError) -> ServerError {
    move |err| match err {
        engine::EngineError::KeyNotFound(_) => ServerError::NotFound(NOT_FOUND),
        other => ServerError::failed(failure)(other),
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, ServerError> {
    engine::parse_calendar_date(raw)
        .ok_or_else(|| ServerError::Generic(format!("invalid date: {}", raw.trim())))
}

/// Lists the caller's transactions grouped by date, with totals.
///
/// `startDate`/`endDate` only filter when both are present.
pub async fn list(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Query(query): Query<TransactionListQuery>,
) -> Result<Json<Envelope<TransactionListResponse>>, ServerError> {
    let range =
        engine::DateRange::from_query(query.start_date.as_deref(), query.end_date.as_deref());

    let summary = state
        .engine
        .list_transactions(user.id, range)
        .await
        .map_err(ServerError::failed("Failed to get list transaction"))?;

    Ok(Json(Envelope::ok(
        "Get list transaction success",
        TransactionListResponse {
            list_group: summary.list_group.into_iter().map(map_group).collect(),
            total_income: summary.total_income,
            total_expense: summary.total_expense,
            remaining_balance: summary.remaining_balance,
        },
    )))
}

pub async fn create(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    JsonBody(payload): JsonBody<TransactionNew>,
) -> Result<(StatusCode, Json<Envelope<TransactionView>>), ServerError> {
    let date = parse_date(&payload.date)?;

    let mut cmd = engine::TransactionCmd::new(user.id, payload.category_id, payload.amount, date);
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }

    let tx = state
        .engine
        .create_transaction(cmd)
        .await
        .map_err(ServerError::failed("Failed to create transaction"))?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok(
            "Transaction created successfully",
            map_transaction(tx),
        )),
    ))
}

pub async fn get_detail(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<Envelope<TransactionView>>, ServerError> {
    let tx = state
        .engine
        .transaction_detail(user.id, id)
        .await
        .map_err(failed_on_transaction("Failed to get transaction detail"))?;

    Ok(Json(Envelope::ok(
        "Get transaction detail success",
        map_transaction(tx),
    )))
}

pub async fn update(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(payload): JsonBody<TransactionUpdate>,
) -> Result<Json<Envelope<TransactionView>>, ServerError> {
    // Zero amounts and blank text count as missing.
    let (Some(amount), Some(description), Some(category_id), Some(date)) = (
        payload.amount.filter(|amount| *amount != 0),
        payload.description.filter(|text| !text.trim().is_empty()),
        payload.category_id,
        payload.date.filter(|text| !text.trim().is_empty()),
    ) else {
        return Err(ServerError::Generic("All fields are required".to_string()));
    };
    let date = parse_date(&date)?;

    let tx = state
        .engine
        .update_transaction(engine::UpdateTransactionCmd {
            user_id: user.id,
            transaction_id: id,
            amount,
            description,
            category_id,
            date,
        })
        .await
        .map_err(failed_on_transaction("Failed to update transaction"))?;

    Ok(Json(Envelope::ok(
        "Update transaction success",
        map_transaction(tx),
    )))
}

pub async fn delete(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<Envelope<TransactionView>>, ServerError> {
    let tx = state
        .engine
        .delete_transaction(user.id, id)
        .await
        .map_err(failed_on_transaction("Failed to delete transaction"))?;

    Ok(Json(Envelope::ok(
        "Delete transaction success",
        map_transaction(tx),
    )))
}
