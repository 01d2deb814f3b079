use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use super::{
    dto::{ExpenseEnvelope, ExpenseInput, ExpenseList, ExpenseStats, ValidExpense},
    repo::{self, CategoryStat, Expense, ExpenseRow},
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
        .route("/expenses", get(list_expenses).post(create_expense))
        .route("/expenses/stats", get(expense_stats))
        .route(
            "/expenses/:id",
            get(get_expense).put(update_expense).delete(delete_expense),
        )
}

#[instrument(skip(state, viewer), fields(user_id = viewer.id))]
pub async fn list_expenses(
    State(state): State<AppState>,
    viewer: Viewer,
) -> AppResult<Json<ExpenseList>> {
    let expenses =
        list_visible::<Expense>(&state.db, Scope::for_viewer(&viewer, Access::Read)).await?;
    Ok(Json(ExpenseList { expenses }))
}

#[instrument(skip(state, viewer), fields(user_id = viewer.id))]
pub async fn get_expense(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    viewer: Viewer,
) -> AppResult<Json<ExpenseEnvelope>> {
    let expense = find_visible::<Expense>(&state.db, Scope::for_viewer(&viewer, Access::Read), id)
        .await?
        .ok_or(AppError::NotFound("Expense"))?;
    Ok(Json(ExpenseEnvelope { expense }))
}

#[instrument(skip(state, viewer, payload), fields(user_id = viewer.id))]
pub async fn create_expense(
    State(state): State<AppState>,
    viewer: Viewer,
    payload: Result<Json<ExpenseInput>, JsonRejection>,
) -> AppResult<(StatusCode, Json<ExpenseEnvelope>)> {
    let row = resolve(&state, viewer.id, json_body(payload)?.validate()?).await?;
    let expense = repo::insert(&state.db, viewer.id, &row).await?;
    info!(expense_id = expense.id, "expense recorded");
    Ok((StatusCode::CREATED, Json(ExpenseEnvelope { expense })))
}

#[instrument(skip(state, viewer, payload), fields(user_id = viewer.id))]
pub async fn update_expense(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    viewer: Viewer,
    payload: Result<Json<ExpenseInput>, JsonRejection>,
) -> AppResult<Json<ExpenseEnvelope>> {
    let row = resolve(&state, viewer.id, json_body(payload)?.validate()?).await?;

    let mut set = SetList::new("expenses");
    set.set("category", Some(row.category))
        .set("description", Some(row.description))
        .set("amount", Some(row.amount))
        .set("date", Some(row.date))
        .set("crop_id", Some(row.crop_id))
        .set("payment_method", Some(row.payment_method));

    let expense = set
        .finish(id, Scope::for_viewer(&viewer, Access::Write))
        .build_query_as::<Expense>()
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::NotFound("Expense"))?;
    Ok(Json(ExpenseEnvelope { expense }))
}

#[instrument(skip(state, viewer), fields(user_id = viewer.id))]
pub async fn delete_expense(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    viewer: Viewer,
) -> AppResult<Json<Message>> {
    if !delete_scoped::<Expense>(&state.db, Scope::for_viewer(&viewer, Access::Write), id).await? {
        return Err(AppError::NotFound("Expense"));
    }
    Ok(Json(Message::new("Expense deleted successfully")))
}

#[instrument(skip(state, viewer), fields(user_id = viewer.id))]
pub async fn expense_stats(
    State(state): State<AppState>,
    viewer: Viewer,
) -> AppResult<Json<ExpenseStats>> {
    let (stats, total) = ledger::stats::<CategoryStat>(
        &state.db,
        "expenses",
        "category",
        Scope::for_viewer(&viewer, Access::Read),
    )
    .await?;
    Ok(Json(ExpenseStats { stats, total }))
}

async fn resolve(state: &AppState, user_id: i64, valid: ValidExpense) -> AppResult<ExpenseRow> {
    Ok(ExpenseRow {
        crop_id: ledger::resolve_crop(&state.db, user_id, valid.crop).await?,
        category: valid.category,
        description: valid.description,
        amount: valid.amount,
        date: valid.date,
        payment_method: valid.payment_method,
    })
}
