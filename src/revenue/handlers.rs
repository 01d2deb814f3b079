use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use super::{
    dto::{RevenueEnvelope, RevenueInput, RevenueList, RevenueStats, ValidRevenue},
    repo::{self, Revenue, RevenueRow, SourceStat},
};
use crate::{
    access::{delete_scoped, find_visible, list_visible, Access, Scope},
    auth::extractors::Viewer,
    dto::Message,
    error::{json_body, AppError, AppResult},
    extract::RecordId,
    ledger,
    patch::SetList,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/revenue", get(list_revenue).post(create_revenue))
        .route("/revenue/stats", get(revenue_stats))
        .route(
            "/revenue/:id",
            get(get_revenue).put(update_revenue).delete(delete_revenue),
        )
}

#[instrument(skip(state, viewer), fields(user_id = viewer.id))]
pub async fn list_revenue(
    State(state): State<AppState>,
    viewer: Viewer,
) -> AppResult<Json<RevenueList>> {
    let revenue =
        list_visible::<Revenue>(&state.db, Scope::for_viewer(&viewer, Access::Read)).await?;
    Ok(Json(RevenueList { revenue }))
}

#[instrument(skip(state, viewer), fields(user_id = viewer.id))]
pub async fn get_revenue(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    viewer: Viewer,
) -> AppResult<Json<RevenueEnvelope>> {
    let revenue = find_visible::<Revenue>(&state.db, Scope::for_viewer(&viewer, Access::Read), id)
        .await?
        .ok_or(AppError::NotFound("Revenue"))?;
    Ok(Json(RevenueEnvelope { revenue }))
}

#[instrument(skip(state, viewer, payload), fields(user_id = viewer.id))]
pub async fn create_revenue(
    State(state): State<AppState>,
    viewer: Viewer,
    payload: Result<Json<RevenueInput>, JsonRejection>,
) -> AppResult<(StatusCode, Json<RevenueEnvelope>)> {
    let row = resolve(&state, viewer.id, json_body(payload)?.validate()?).await?;
    let revenue = repo::insert(&state.db, viewer.id, &row).await?;
    info!(revenue_id = revenue.id, "revenue recorded");
    Ok((StatusCode::CREATED, Json(RevenueEnvelope { revenue })))
}

/// Replaces every editable column of a revenue entry.
#[instrument(skip(state, viewer, payload), fields(user_id = viewer.id))]
pub async fn update_revenue(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    viewer: Viewer,
    payload: Result<Json<RevenueInput>, JsonRejection>,
) -> AppResult<Json<RevenueEnvelope>> {
    let row = resolve(&state, viewer.id, json_body(payload)?.validate()?).await?;

    let mut set = SetList::new("revenue");
    set.set("source", Some(row.source))
        .set("product", Some(row.product))
        .set("quantity", Some(row.quantity))
        .set("amount", Some(row.amount))
        .set("date", Some(row.date))
        .set("crop_id", Some(row.crop_id))
        .set("payment_received", Some(row.payment_received));

    let revenue = set
        .finish(id, Scope::for_viewer(&viewer, Access::Write))
        .build_query_as::<Revenue>()
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::NotFound("Revenue"))?;
    Ok(Json(RevenueEnvelope { revenue }))
}

#[instrument(skip(state, viewer), fields(user_id = viewer.id))]
pub async fn delete_revenue(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    viewer: Viewer,
) -> AppResult<Json<Message>> {
    if !delete_scoped::<Revenue>(&state.db, Scope::for_viewer(&viewer, Access::Write), id).await? {
        return Err(AppError::NotFound("Revenue"));
    }
    Ok(Json(Message::new("Revenue deleted successfully")))
}

#[instrument(skip(state, viewer), fields(user_id = viewer.id))]
pub async fn revenue_stats(
    State(state): State<AppState>,
    viewer: Viewer,
) -> AppResult<Json<RevenueStats>> {
    let (stats, total) = ledger::stats::<SourceStat>(
        &state.db,
        "revenue",
        "source",
        Scope::for_viewer(&viewer, Access::Read),
    )
    .await?;
    Ok(Json(RevenueStats { stats, total }))
}

async fn resolve(state: &AppState, user_id: i64, valid: ValidRevenue) -> AppResult<RevenueRow> {
    Ok(RevenueRow {
        crop_id: ledger::resolve_crop(&state.db, user_id, valid.crop).await?,
        source: valid.source,
        product: valid.product,
        quantity: valid.quantity,
        amount: valid.amount,
        date: valid.date,
        payment_received: valid.payment_received,
    })
}
