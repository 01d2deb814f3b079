//! Pieces shared by the money ledgers (expenses and revenue).

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;
use sqlx::{postgres::PgRow, FromRow, PgPool, Postgres, QueryBuilder};
use tracing::{debug, warn};

use crate::{
    access::Scope,
    crops,
    error::{AppError, AppResult},
};

/// How an entry points at a crop: by id, or by the crop's name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CropRef {
    Id(i64),
    Name(String),
}

/// Resolves a crop reference against `user_id`'s crops.
///
/// An id must name one of the caller's crops. A name that matches none of
/// them resolves to no crop.
pub async fn resolve_crop(
    db: &PgPool,
    user_id: i64,
    crop: Option<CropRef>,
) -> AppResult<Option<i64>> {
    match crop {
        None => Ok(None),
        Some(CropRef::Id(id)) if id <= 0 => Ok(None),
        Some(CropRef::Id(id)) => {
            if crops::repo::exists(db, Scope::Owner(user_id), id).await? {
                Ok(Some(id))
            } else {
                warn!(crop_id = id, "entry references a crop the caller does not own");
                Err(AppError::BadRequest("Invalid crop_id".into()))
            }
        }
        Some(CropRef::Name(name)) => {
            let name = name.trim();
            if name.is_empty() {
                return Ok(None);
            }
            let id = crops::repo::find_id_by_name(db, user_id, name).await?;
            if id.is_none() {
                debug!(crop = name, "no crop with that name; storing entry without crop");
            }
            Ok(id)
        }
    }
}

/// Amounts are stored as `NUMERIC(12, 2)`.
const AMOUNT_LIMIT: i64 = 10_000_000_000;

/// Validates a money amount, rounded to cents the way the column stores it.
pub fn check_amount(amount: Option<Decimal>) -> AppResult<Decimal> {
    let Some(amount) = amount else {
        return Err(AppError::BadRequest("Amount is required".into()));
    };
    let amount = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(AppError::BadRequest("Amount cannot be negative".into()));
    }
    if amount >= Decimal::new(AMOUNT_LIMIT, 0) {
        return Err(AppError::BadRequest(
            "Amount must be less than 10000000000".into(),
        ));
    }
    Ok(amount.abs())
}

fn stats_query(table: &str, group_column: &str, scope: Scope) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
    qb.push(group_column)
        .push(
            ", COUNT(*) AS count, SUM(amount) AS total_amount, \
             ROUND(AVG(amount), 2) AS average_amount FROM ",
        )
        .push(table)
        .push(" WHERE ");
    scope.push_predicate(&mut qb, "user_id");
    qb.push(" GROUP BY ")
        .push(group_column)
        .push(" ORDER BY total_amount DESC");
    qb
}

/// Per-group totals of `table` grouped by `group_column`, plus the grand total.
pub async fn stats<R>(
    db: &PgPool,
    table: &str,
    group_column: &str,
    scope: Scope,
) -> anyhow::Result<(Vec<R>, Decimal)>
where
    R: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let rows = stats_query(table, group_column, scope)
        .build_query_as::<R>()
        .fetch_all(db)
        .await?;

    let mut total = QueryBuilder::<Postgres>::new("SELECT COALESCE(SUM(amount), 0) FROM ");
    total.push(table).push(" WHERE ");
    scope.push_predicate(&mut total, "user_id");
    let total = total.build_query_scalar::<Decimal>().fetch_one(db).await?;

    Ok((rows, total))
}
