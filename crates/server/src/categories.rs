//! Categories API endpoints.

use api_types::{
    Envelope, TransactionKind as ApiKind,
    category::{CategoryCreate, CategoryUpdate, CategoryView},
};
use axum::{Extension, Json, extract::State, http::StatusCode};
use uuid::Uuid;

use crate::{
    ServerError,
    extract::{JsonBody, PathParam},
    server::ServerState,
};

pub(crate) fn map_kind(kind: engine::TransactionKind) -> ApiKind {
    match kind {
        engine::TransactionKind::Income => ApiKind::Income,
        engine::TransactionKind::Expense => ApiKind::Expense,
    }
}

fn engine_kind(kind: ApiKind) -> engine::TransactionKind {
    match kind {
        ApiKind::Income => engine::TransactionKind::Income,
        ApiKind::Expense => engine::TransactionKind::Expense,
    }
}

pub(crate) fn map_category(category: engine::Category) -> CategoryView {
    CategoryView {
        id: category.id,
        name: category.name,
        kind: map_kind(category.kind),
        created_by: category.created_by,
        created_at: category.created_at,
    }
}

pub async fn list(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
) -> Result<Json<Envelope<Vec<CategoryView>>>, ServerError> {
    let categories = state
        .engine
        .list_categories(user.id)
        .await
        .map_err(ServerError::failed("Failed to get list category"))?
        .into_iter()
        .map(map_category)
        .collect();

    Ok(Json(Envelope::ok("Get list category success", categories)))
}

pub async fn create(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    JsonBody(payload): JsonBody<CategoryCreate>,
) -> Result<(StatusCode, Json<Envelope<CategoryView>>), ServerError> {
    let category = state
        .engine
        .create_category(engine::CategoryCmd {
            user_id: user.id,
            name: payload.name,
            kind: engine_kind(payload.kind),
        })
        .await
        .map_err(ServerError::failed("Failed to create category"))?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok(
            "Category created successfully",
            map_category(category),
        )),
    ))
}

pub async fn get_detail(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<Envelope<CategoryView>>, ServerError> {
    let category = state
        .engine
        .category(user.id, id)
        .await
        .map_err(ServerError::failed("Failed to get category detail"))?;

    Ok(Json(Envelope::ok(
        "Get category detail success",
        map_category(category),
    )))
}

pub async fn update(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(payload): JsonBody<CategoryUpdate>,
) -> Result<Json<Envelope<CategoryView>>, ServerError> {
    if payload.name.is_none() && payload.kind.is_none() {
        return Err(ServerError::Generic(
            "provide at least one of name or type".to_string(),
        ));
    }

    let category = state
        .engine
        .update_category(engine::UpdateCategoryCmd {
            user_id: user.id,
            category_id: id,
            name: payload.name,
            kind: payload.kind.map(engine_kind),
        })
        .await
        .map_err(ServerError::failed("Failed to update category"))?;

    Ok(Json(Envelope::ok(
        "Update category success",
        map_category(category),
    )))
}

pub async fn delete(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<Envelope<CategoryView>>, ServerError> {
    let category = state
        .engine
        .delete_category(user.id, id)
        .await
        .map_err(ServerError::failed("Failed to delete category"))?;

    Ok(Json(Envelope::ok(
        "Delete category success",
        map_category(category),
    )))
}
