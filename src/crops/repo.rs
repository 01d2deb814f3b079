use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use time::{Date, OffsetDateTime};

use super::dto::NewCrop;
use super::records::{Schedule, Spray, Treatment};
use crate::access::{OwnedResource, Scope};

pub const DEFAULT_STATUS: &str = "Planted";
pub const DEFAULT_HEALTH: &str = "Good";
pub const DEFAULT_IMAGE: &str = "🌾";

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Crop {
    pub id: i64,
    pub user_id: i64,
    pub field_id: Option<i64>,
    pub name: String,
    pub variety: Option<String>,
    pub area: Option<String>,
    pub planted_date: Date,
    pub expected_harvest_date: Option<Date>,
    pub actual_harvest_date: Option<Date>,
    pub status: String,
    pub progress: i32,
    pub health: String,
    pub image: String,
    pub notes: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    #[sqlx(default)]
    pub field_name: Option<String>,
    #[sqlx(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[sqlx(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
}

impl OwnedResource for Crop {
    const TABLE: &'static str = "crops";
    const OWNER_COLUMN: &'static str = "c.user_id";
    const ID_COLUMN: &'static str = "c.id";
    const SELECT: &'static str = r#"
        SELECT c.*, f.name AS field_name, u.name AS user_name, u.email AS user_email
        FROM crops c
        LEFT JOIN fields f ON f.id = c.field_id
        LEFT JOIN users u ON u.id = c.user_id"#;
    const ORDER_BY: &'static str = "c.created_at DESC";
}

/// A crop together with everything recorded against it.
#[derive(Debug, Serialize)]
pub struct CropDetails {
    #[serde(flatten)]
    pub crop: Crop,
    pub schedule: Vec<Schedule>,
    pub fertilizers: Vec<Treatment>,
    pub pesticides: Vec<Treatment>,
    pub sprays: Vec<Spray>,
}

pub async fn load_details(db: &PgPool, crop: Crop) -> anyhow::Result<CropDetails> {
    let schedule = sqlx::query_as::<_, Schedule>(
        r#"SELECT * FROM schedules WHERE crop_id = $1 ORDER BY date"#,
    )
    .bind(crop.id)
    .fetch_all(db)
    .await?;

    let fertilizers = sqlx::query_as::<_, Treatment>(
        r#"SELECT * FROM fertilizers WHERE crop_id = $1 ORDER BY date DESC"#,
    )
    .bind(crop.id)
    .fetch_all(db)
    .await?;

    let pesticides = sqlx::query_as::<_, Treatment>(
        r#"SELECT * FROM pesticides WHERE crop_id = $1 ORDER BY date DESC"#,
    )
    .bind(crop.id)
    .fetch_all(db)
    .await?;

    let sprays = sqlx::query_as::<_, Spray>(
        r#"SELECT * FROM sprays WHERE crop_id = $1 ORDER BY date DESC, time DESC"#,
    )
    .bind(crop.id)
    .fetch_all(db)
    .await?;

    Ok(CropDetails {
        crop,
        schedule,
        fertilizers,
        pesticides,
        sprays,
    })
}

pub async fn insert(db: &PgPool, user_id: i64, new: &NewCrop) -> anyhow::Result<Crop> {
    let crop = sqlx::query_as::<_, Crop>(
        r#"
        INSERT INTO crops (user_id, name, variety, field_id, area, planted_date,
                           expected_harvest_date, status, progress, health, image, notes)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(&new.name)
    .bind(&new.variety)
    .bind(new.field_id)
    .bind(&new.area)
    .bind(new.planted_date)
    .bind(new.expected_harvest_date)
    .bind(new.status.as_deref().unwrap_or(DEFAULT_STATUS))
    .bind(new.progress.unwrap_or(0))
    .bind(new.health.as_deref().unwrap_or(DEFAULT_HEALTH))
    .bind(new.image.as_deref().unwrap_or(DEFAULT_IMAGE))
    .bind(&new.notes)
    .fetch_one(db)
    .await?;
    Ok(crop)
}

/// Whether a crop exists inside `scope`.
pub async fn exists(db: &PgPool, scope: Scope, id: i64) -> anyhow::Result<bool> {
    let mut qb = QueryBuilder::<Postgres>::new("SELECT EXISTS (SELECT 1 FROM crops WHERE id = ");
    qb.push_bind(id).push(" AND ");
    scope.push_predicate(&mut qb, "user_id");
    qb.push(")");
    let found = qb.build_query_scalar::<bool>().fetch_one(db).await?;
    Ok(found)
}

/// Looks up one of `user_id`'s crops by name.
pub async fn find_id_by_name(db: &PgPool, user_id: i64, name: &str) -> anyhow::Result<Option<i64>> {
    let id = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT id FROM crops
        WHERE user_id = $1 AND name = $2
        ORDER BY created_at DESC
        LIMIT 1
        "#,
    )
    .bind(user_id)
    .bind(name)
    .fetch_optional(db)
    .await?;
    Ok(id)
}
