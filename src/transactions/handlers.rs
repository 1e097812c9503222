use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::{CreateTransaction, ListQuery, PatchTransaction, RecentQuery},
    repo_types::{Transaction, TransactionFilter},
};
use crate::{
    auth::AuthUser,
    categories::services::check_visible,
    error::ApiError,
    extract::{ValidJson, ValidPath, ValidQuery},
    import::{self, MAX_UPLOAD_BYTES},
    state::AppState,
};

const DEFAULT_RECENT: u32 = 5;

pub fn transaction_routes() -> Router<AppState> {
    Router::new()
        .route("/transactions", get(list_transactions).post(create_transaction))
        .route("/transactions/recent", get(recent_transactions))
        .route(
            "/transactions/:id",
            get(get_transaction)
                .patch(update_transaction)
                .delete(delete_transaction),
        )
        .route(
            "/transactions/import",
            post(import::handlers::import_transactions)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + 64 * 1024)),
        )
}

#[instrument(skip(state))]
pub async fn list_transactions(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidQuery(q): ValidQuery<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    let filter = q.into_filter()?;
    let transactions = state.store.list_transactions(auth.user_id, &filter).await?;
    let categories = state.store.list_categories(auth.user_id).await?;
    Ok(Json(json!({ "transactions": transactions, "categories": categories })))
}

#[instrument(skip(state))]
pub async fn recent_transactions(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidQuery(q): ValidQuery<RecentQuery>,
) -> Result<Json<Value>, ApiError> {
    let filter = TransactionFilter {
        limit: Some(i64::from(q.limit.unwrap_or(DEFAULT_RECENT))),
        ..TransactionFilter::default()
    };
    let transactions = state.store.list_transactions(auth.user_id, &filter).await?;
    Ok(Json(json!({ "transactions": transactions })))
}

#[instrument(skip(state, payload))]
pub async fn create_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(payload): ValidJson<CreateTransaction>,
) -> Result<(StatusCode, Json<Transaction>), ApiError> {
    let new = payload.validate()?;
    check_visible(state.store.as_ref(), auth.user_id, new.category_id).await?;
    let mut created = state.store.insert_transactions(auth.user_id, vec![new]).await?;
    let tx = created
        .pop()
        .ok_or_else(|| anyhow::anyhow!("insert returned no row"))?;
    info!(user_id = %auth.user_id, transaction_id = %tx.id, "transaction created");
    Ok((StatusCode::CREATED, Json(tx)))
}

#[instrument(skip(state))]
pub async fn get_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<Json<Transaction>, ApiError> {
    let tx = state
        .store
        .get_transaction(auth.user_id, id)
        .await?
        .ok_or(ApiError::NotFound("Transaction"))?;
    Ok(Json(tx))
}

#[instrument(skip(state, payload))]
pub async fn update_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidPath(id): ValidPath<Uuid>,
    ValidJson(payload): ValidJson<PatchTransaction>,
) -> Result<Json<Transaction>, ApiError> {
    let mut tx = state
        .store
        .get_transaction(auth.user_id, id)
        .await?
        .ok_or(ApiError::NotFound("Transaction"))?;
    payload.apply(&mut tx)?;
    check_visible(state.store.as_ref(), auth.user_id, tx.category_id).await?;
    let saved = state
        .store
        .save_transaction(&tx)
        .await?
        .ok_or(ApiError::NotFound("Transaction"))?;
    Ok(Json(saved))
}

#[instrument(skip(state))]
pub async fn delete_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !state.store.delete_transaction(auth.user_id, id).await? {
        return Err(ApiError::NotFound("Transaction"));
    }
    info!(user_id = %auth.user_id, transaction_id = %id, "transaction deleted");
    Ok(StatusCode::NO_CONTENT)
}
