use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::{Date, OffsetDateTime};

use crate::access::OwnedResource;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Expense {
    pub id: i64,
    pub user_id: i64,
    pub crop_id: Option<i64>,
    pub category: String,
    pub description: String,
    pub amount: Decimal,
    pub date: Date,
    pub payment_method: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    #[sqlx(default)]
    pub crop_name: Option<String>,
    #[sqlx(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[sqlx(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
}

impl OwnedResource for Expense {
    const TABLE: &'static str = "expenses";
    const OWNER_COLUMN: &'static str = "e.user_id";
    const ID_COLUMN: &'static str = "e.id";
    const SELECT: &'static str = r#"
        SELECT e.*, c.name AS crop_name, u.name AS user_name, u.email AS user_email
        FROM expenses e
        LEFT JOIN crops c ON c.id = e.crop_id
        LEFT JOIN users u ON u.id = e.user_id"#;
    const ORDER_BY: &'static str = "e.date DESC, e.created_at DESC";
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CategoryStat {
    pub category: String,
    pub count: i64,
    pub total_amount: Decimal,
    pub average_amount: Decimal,
}

/// Validated expense columns, as stored.
#[derive(Debug, Clone)]
pub struct ExpenseRow {
    pub crop_id: Option<i64>,
    pub category: String,
    pub description: String,
    pub amount: Decimal,
    pub date: Date,
    pub payment_method: Option<String>,
}

pub async fn insert(db: &PgPool, user_id: i64, row: &ExpenseRow) -> anyhow::Result<Expense> {
    let expense = sqlx::query_as::<_, Expense>(
        r#"
        INSERT INTO expenses (user_id, crop_id, category, description, amount, date, payment_method)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(row.crop_id)
    .bind(&row.category)
    .bind(&row.description)
    .bind(row.amount)
    .bind(row.date)
    .bind(&row.payment_method)
    .fetch_one(db)
    .await?;
    Ok(expense)
}
