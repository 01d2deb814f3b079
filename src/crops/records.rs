//! Records attached to a crop: schedule entries, fertilizer and pesticide
//! applications, and sprays. They carry no owner column of their own; every
//! query reaches the owner through the parent crop.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use time::{Date, OffsetDateTime, Time};

use crate::{
    access::Scope,
    dto::{check_len, required},
    error::{AppError, AppResult},
};

time::serde::format_description!(clock_time, Time, "[hour]:[minute]");

/// A table of crop records and how it is named in responses.
pub trait CropRecord {
    const TABLE: &'static str;
    /// Singular name for "not found" errors.
    const LABEL: &'static str;
    const DELETED: &'static str;
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Schedule {
    pub id: i64,
    pub crop_id: i64,
    pub date: Date,
    pub task: String,
    pub done: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Fertilizer or pesticide application; both tables share a shape.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Treatment {
    pub id: i64,
    pub crop_id: i64,
    pub date: Date,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
    pub quantity: String,
    pub notes: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Spray {
    pub id: i64,
    pub crop_id: i64,
    pub date: Date,
    #[serde(with = "clock_time::option")]
    pub time: Option<Time>,
    pub name: String,
    pub quantity: String,
    pub notes: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

pub struct Fertilizers;
pub struct Pesticides;

impl CropRecord for Schedule {
    const TABLE: &'static str = "schedules";
    const LABEL: &'static str = "Schedule";
    const DELETED: &'static str = "Schedule deleted successfully";
}

impl CropRecord for Fertilizers {
    const TABLE: &'static str = "fertilizers";
    const LABEL: &'static str = "Fertilizer";
    const DELETED: &'static str = "Fertilizer deleted successfully";
}

impl CropRecord for Pesticides {
    const TABLE: &'static str = "pesticides";
    const LABEL: &'static str = "Pesticide";
    const DELETED: &'static str = "Pesticide deleted successfully";
}

impl CropRecord for Spray {
    const TABLE: &'static str = "sprays";
    const LABEL: &'static str = "Spray";
    const DELETED: &'static str = "Spray deleted successfully";
}

#[derive(Debug, Deserialize)]
pub struct NewSchedule {
    pub date: Date,
    #[serde(default)]
    pub task: String,
}

impl NewSchedule {
    pub fn validate(mut self) -> AppResult<Self> {
        self.task = required(&self.task, "Task").map_err(AppError::BadRequest)?;
        Ok(self)
    }
}

#[derive(Debug, Deserialize)]
pub struct ScheduleDone {
    pub done: bool,
}

#[derive(Debug, Deserialize)]
pub struct NewTreatment {
    pub date: Date,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub quantity: String,
    pub notes: Option<String>,
}

impl NewTreatment {
    pub fn validate(mut self) -> AppResult<Self> {
        self.kind = required(&self.kind, "Type").map_err(AppError::BadRequest)?;
        self.quantity = required(&self.quantity, "Quantity").map_err(AppError::BadRequest)?;
        check_len(Some(self.kind.as_str()), 255, "Type")?;
        check_len(Some(self.quantity.as_str()), 100, "Quantity")?;
        Ok(self)
    }
}

#[derive(Debug, Deserialize)]
pub struct NewSpray {
    pub date: Date,
    #[serde(default, with = "clock_time::option")]
    pub time: Option<Time>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub quantity: String,
    pub notes: Option<String>,
}

impl NewSpray {
    pub fn validate(mut self) -> AppResult<Self> {
        self.name = required(&self.name, "Spray name").map_err(AppError::BadRequest)?;
        self.quantity = required(&self.quantity, "Quantity").map_err(AppError::BadRequest)?;
        check_len(Some(self.name.as_str()), 255, "Spray name")?;
        check_len(Some(self.quantity.as_str()), 100, "Quantity")?;
        Ok(self)
    }
}

pub async fn insert_schedule(
    db: &PgPool,
    crop_id: i64,
    new: &NewSchedule,
) -> anyhow::Result<Schedule> {
    let row = sqlx::query_as::<_, Schedule>(
        r#"INSERT INTO schedules (crop_id, date, task) VALUES ($1, $2, $3) RETURNING *"#,
    )
    .bind(crop_id)
    .bind(new.date)
    .bind(&new.task)
    .fetch_one(db)
    .await?;
    Ok(row)
}

/// Inserts into `fertilizers` or `pesticides`.
pub async fn insert_treatment<R: CropRecord>(
    db: &PgPool,
    crop_id: i64,
    new: &NewTreatment,
) -> anyhow::Result<Treatment> {
    let mut qb = QueryBuilder::<Postgres>::new("INSERT INTO ");
    qb.push(R::TABLE)
        .push(" (crop_id, date, type, quantity, notes) VALUES (")
        .push_bind(crop_id)
        .push(", ")
        .push_bind(new.date)
        .push(", ")
        .push_bind(new.kind.clone())
        .push(", ")
        .push_bind(new.quantity.clone())
        .push(", ")
        .push_bind(new.notes.clone())
        .push(") RETURNING *");
    Ok(qb.build_query_as::<Treatment>().fetch_one(db).await?)
}

pub async fn insert_spray(db: &PgPool, crop_id: i64, new: &NewSpray) -> anyhow::Result<Spray> {
    let row = sqlx::query_as::<_, Spray>(
        r#"
        INSERT INTO sprays (crop_id, date, time, name, quantity, notes)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(crop_id)
    .bind(new.date)
    .bind(new.time)
    .bind(&new.name)
    .bind(&new.quantity)
    .bind(&new.notes)
    .fetch_one(db)
    .await?;
    Ok(row)
}

/// Sets the done flag of a schedule entry whose crop is inside `scope`.
pub async fn set_schedule_done(
    db: &PgPool,
    scope: Scope,
    id: i64,
    done: bool,
) -> anyhow::Result<Option<Schedule>> {
    let mut qb = QueryBuilder::<Postgres>::new("UPDATE schedules s SET done = ");
    qb.push_bind(done)
        .push(", updated_at = NOW() FROM crops c WHERE s.crop_id = c.id AND s.id = ")
        .push_bind(id)
        .push(" AND ");
    scope.push_predicate(&mut qb, "c.user_id");
    qb.push(" RETURNING s.*");
    Ok(qb.build_query_as::<Schedule>().fetch_optional(db).await?)
}

fn scoped_delete<R: CropRecord>(scope: Scope, id: i64) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::<Postgres>::new("DELETE FROM ");
    qb.push(R::TABLE)
        .push(" r USING crops c WHERE r.crop_id = c.id AND r.id = ")
        .push_bind(id)
        .push(" AND ");
    scope.push_predicate(&mut qb, "c.user_id");
    qb.push(" RETURNING r.id");
    qb
}

/// Deletes one record whose crop is inside `scope`; `false` when nothing matched.
pub async fn delete<R: CropRecord>(db: &PgPool, scope: Scope, id: i64) -> anyhow::Result<bool> {
    let deleted = scoped_delete::<R>(scope, id).build().fetch_optional(db).await?;
    Ok(deleted.is_some())
}
