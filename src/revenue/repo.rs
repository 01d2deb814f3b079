use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::{Date, OffsetDateTime};

use crate::access::OwnedResource;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Revenue {
    pub id: i64,
    pub user_id: i64,
    pub crop_id: Option<i64>,
    pub source: String,
    pub product: String,
    pub quantity: Option<String>,
    pub amount: Decimal,
    pub date: Date,
    pub payment_received: bool,
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

impl OwnedResource for Revenue {
    const TABLE: &'static str = "revenue";
    const OWNER_COLUMN: &'static str = "r.user_id";
    const ID_COLUMN: &'static str = "r.id";
    const SELECT: &'static str = r#"
        SELECT r.*, c.name AS crop_name, u.name AS user_name, u.email AS user_email
        FROM revenue r
        LEFT JOIN crops c ON c.id = r.crop_id
        LEFT JOIN users u ON u.id = r.user_id"#;
    const ORDER_BY: &'static str = "r.date DESC, r.created_at DESC";
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SourceStat {
    pub source: String,
    pub count: i64,
    pub total_amount: Decimal,
    pub average_amount: Decimal,
}

#[derive(Debug, Clone)]
pub struct RevenueRow {
    pub crop_id: Option<i64>,
    pub source: String,
    pub product: String,
    pub quantity: Option<String>,
    pub amount: Decimal,
    pub date: Date,
    pub payment_received: bool,
}

pub async fn insert(db: &PgPool, user_id: i64, row: &RevenueRow) -> anyhow::Result<Revenue> {
    let revenue = sqlx::query_as::<_, Revenue>(
        r#"
        INSERT INTO revenue (user_id, crop_id, source, product, quantity, amount, date, payment_received)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(row.crop_id)
    .bind(&row.source)
    .bind(&row.product)
    .bind(&row.quantity)
    .bind(row.amount)
    .bind(row.date)
    .bind(row.payment_received)
    .fetch_one(db)
    .await?;
    Ok(revenue)
}
