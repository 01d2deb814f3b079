use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use time::OffsetDateTime;

use super::dto::NewField;
use crate::access::{OwnedResource, Scope};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Field {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub location: Option<String>,
    pub area: Option<Decimal>,
    pub area_unit: String,
    pub soil_type: Option<String>,
    pub image: Option<String>,
    pub notes: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    #[sqlx(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[sqlx(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
}

impl OwnedResource for Field {
    const TABLE: &'static str = "fields";
    const OWNER_COLUMN: &'static str = "f.user_id";
    const ID_COLUMN: &'static str = "f.id";
    const SELECT: &'static str = r#"
        SELECT f.*, u.name AS user_name, u.email AS user_email
        FROM fields f
        LEFT JOIN users u ON u.id = f.user_id"#;
    const ORDER_BY: &'static str = "f.created_at DESC";
}

/// Outcome of a field delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDeletion {
    Deleted,
    NotFound,
    HasCrops,
}

pub async fn insert(db: &PgPool, user_id: i64, new: &NewField) -> anyhow::Result<Field> {
    let field = sqlx::query_as::<_, Field>(
        r#"
        INSERT INTO fields (user_id, name, location, area, area_unit, soil_type, image, notes)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(&new.name)
    .bind(&new.location)
    .bind(new.area)
    .bind(new.area_unit.as_deref().unwrap_or("acres"))
    .bind(&new.soil_type)
    .bind(&new.image)
    .bind(&new.notes)
    .fetch_one(db)
    .await?;
    Ok(field)
}

/// Deletes a field unless crops still reference it.
///
/// The field row is locked first so a crop cannot be attached between the
/// dependency check and the delete.
pub async fn delete(db: &PgPool, scope: Scope, id: i64) -> anyhow::Result<FieldDeletion> {
    let mut tx = db.begin().await?;

    let mut lock = QueryBuilder::<Postgres>::new("SELECT id FROM fields WHERE id = ");
    lock.push_bind(id).push(" AND ");
    scope.push_predicate(&mut lock, "user_id");
    lock.push(" FOR UPDATE");
    if lock.build().fetch_optional(&mut *tx).await?.is_none() {
        return Ok(FieldDeletion::NotFound);
    }

    let has_crops = sqlx::query_scalar::<_, bool>(
        r#"SELECT EXISTS (SELECT 1 FROM crops WHERE field_id = $1)"#,
    )
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;
    if has_crops {
        return Ok(FieldDeletion::HasCrops);
    }

    sqlx::query(r#"DELETE FROM fields WHERE id = $1"#)
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(FieldDeletion::Deleted)
}

/// Whether `field_id` belongs to `user_id`.
pub async fn is_owned_by(db: &PgPool, field_id: i64, user_id: i64) -> anyhow::Result<bool> {
    let owned = sqlx::query_scalar::<_, bool>(
        r#"SELECT EXISTS (SELECT 1 FROM fields WHERE id = $1 AND user_id = $2)"#,
    )
    .bind(field_id)
    .bind(user_id)
    .fetch_one(db)
    .await?;
    Ok(owned)
}
