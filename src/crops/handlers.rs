use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    dto::{
        CropDetailsEnvelope, CropEnvelope, CropList, CropPatch, FertilizerEnvelope, NewCrop,
        PesticideEnvelope, ScheduleEnvelope, SprayEnvelope,
    },
    records::{
        self, CropRecord, Fertilizers, NewSchedule, NewSpray, NewTreatment, Pesticides, Schedule,
        ScheduleDone, Spray,
    },
    repo::{self, Crop},
};
use crate::{
    access::{delete_scoped, find_visible, list_visible, Access, Scope},
    auth::extractors::Viewer,
    dto::Message,
    error::{json_body, AppError, AppResult},
    extract::RecordId,
    fields,
    patch::SetList,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/crops", get(list_crops).post(create_crop))
        .route(
            "/crops/:id",
            get(get_crop).put(update_crop).delete(delete_crop),
        )
        .route("/crops/:id/schedules", post(add_schedule))
        .route("/crops/:id/fertilizers", post(add_fertilizer))
        .route("/crops/:id/pesticides", post(add_pesticide))
        .route("/crops/:id/sprays", post(add_spray))
        .route(
            "/crops/schedules/:id",
            put(update_schedule).delete(delete_record::<Schedule>),
        )
        .route("/crops/fertilizers/:id", delete(delete_record::<Fertilizers>))
        .route("/crops/pesticides/:id", delete(delete_record::<Pesticides>))
        .route("/crops/sprays/:id", delete(delete_record::<Spray>))
}

#[instrument(skip(state, viewer), fields(user_id = viewer.id))]
pub async fn list_crops(
    State(state): State<AppState>,
    viewer: Viewer,
) -> AppResult<Json<CropList>> {
    let crops = list_visible::<Crop>(&state.db, Scope::for_viewer(&viewer, Access::Read)).await?;
    Ok(Json(CropList { crops }))
}

#[instrument(skip(state, viewer), fields(user_id = viewer.id))]
pub async fn get_crop(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    viewer: Viewer,
) -> AppResult<Json<CropDetailsEnvelope>> {
    let crop = find_visible::<Crop>(&state.db, Scope::for_viewer(&viewer, Access::Read), id)
        .await?
        .ok_or(AppError::NotFound("Crop"))?;
    let crop = repo::load_details(&state.db, crop).await?;
    Ok(Json(CropDetailsEnvelope { crop }))
}

#[instrument(skip(state, viewer, payload), fields(user_id = viewer.id))]
pub async fn create_crop(
    State(state): State<AppState>,
    viewer: Viewer,
    payload: Result<Json<NewCrop>, JsonRejection>,
) -> AppResult<(StatusCode, Json<CropEnvelope>)> {
    let new = json_body(payload)?.validate()?;
    if let Some(field_id) = new.field_id {
        ensure_own_field(&state, viewer.id, field_id).await?;
    }
    let crop = repo::insert(&state.db, viewer.id, &new).await?;
    info!(crop_id = crop.id, "crop created");
    Ok((StatusCode::CREATED, Json(CropEnvelope { crop })))
}

#[instrument(skip(state, viewer, payload), fields(user_id = viewer.id))]
pub async fn update_crop(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    viewer: Viewer,
    payload: Result<Json<CropPatch>, JsonRejection>,
) -> AppResult<Json<CropEnvelope>> {
    let patch = json_body(payload)?.validate()?;
    if let Some(field_id) = patch.new_field_id() {
        ensure_own_field(&state, viewer.id, field_id).await?;
    }

    let mut set = SetList::new("crops");
    set.set("name", patch.name)
        .set("variety", patch.variety)
        .set("field_id", patch.field_id)
        .set("area", patch.area)
        .set("planted_date", patch.planted_date)
        .set("expected_harvest_date", patch.expected_harvest_date)
        .set("actual_harvest_date", patch.actual_harvest_date)
        .set("status", patch.status)
        .set("progress", patch.progress)
        .set("health", patch.health)
        .set("image", patch.image)
        .set("notes", patch.notes);
    if set.is_empty() {
        return Err(AppError::BadRequest("No fields to update".into()));
    }

    let crop = set
        .finish(id, Scope::for_viewer(&viewer, Access::Write))
        .build_query_as::<Crop>()
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::NotFound("Crop"))?;
    Ok(Json(CropEnvelope { crop }))
}

#[instrument(skip(state, viewer), fields(user_id = viewer.id))]
pub async fn delete_crop(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    viewer: Viewer,
) -> AppResult<Json<Message>> {
    if !delete_scoped::<Crop>(&state.db, Scope::for_viewer(&viewer, Access::Write), id).await? {
        return Err(AppError::NotFound("Crop"));
    }
    info!(crop_id = id, "crop deleted");
    Ok(Json(Message::new("Crop deleted successfully")))
}

#[instrument(skip(state, viewer, payload), fields(user_id = viewer.id))]
pub async fn add_schedule(
    State(state): State<AppState>,
    RecordId(crop_id): RecordId,
    viewer: Viewer,
    payload: Result<Json<NewSchedule>, JsonRejection>,
) -> AppResult<(StatusCode, Json<ScheduleEnvelope>)> {
    let new = json_body(payload)?.validate()?;
    ensure_writable_crop(&state, &viewer, crop_id).await?;
    let schedule = records::insert_schedule(&state.db, crop_id, &new).await?;
    Ok((StatusCode::CREATED, Json(ScheduleEnvelope { schedule })))
}

#[instrument(skip(state, viewer, payload), fields(user_id = viewer.id))]
pub async fn add_fertilizer(
    State(state): State<AppState>,
    RecordId(crop_id): RecordId,
    viewer: Viewer,
    payload: Result<Json<NewTreatment>, JsonRejection>,
) -> AppResult<(StatusCode, Json<FertilizerEnvelope>)> {
    let new = json_body(payload)?.validate()?;
    ensure_writable_crop(&state, &viewer, crop_id).await?;
    let fertilizer = records::insert_treatment::<Fertilizers>(&state.db, crop_id, &new).await?;
    Ok((StatusCode::CREATED, Json(FertilizerEnvelope { fertilizer })))
}

#[instrument(skip(state, viewer, payload), fields(user_id = viewer.id))]
pub async fn add_pesticide(
    State(state): State<AppState>,
    RecordId(crop_id): RecordId,
    viewer: Viewer,
    payload: Result<Json<NewTreatment>, JsonRejection>,
) -> AppResult<(StatusCode, Json<PesticideEnvelope>)> {
    let new = json_body(payload)?.validate()?;
    ensure_writable_crop(&state, &viewer, crop_id).await?;
    let pesticide = records::insert_treatment::<Pesticides>(&state.db, crop_id, &new).await?;
    Ok((StatusCode::CREATED, Json(PesticideEnvelope { pesticide })))
}

#[instrument(skip(state, viewer, payload), fields(user_id = viewer.id))]
pub async fn add_spray(
    State(state): State<AppState>,
    RecordId(crop_id): RecordId,
    viewer: Viewer,
    payload: Result<Json<NewSpray>, JsonRejection>,
) -> AppResult<(StatusCode, Json<SprayEnvelope>)> {
    let new = json_body(payload)?.validate()?;
    ensure_writable_crop(&state, &viewer, crop_id).await?;
    let spray = records::insert_spray(&state.db, crop_id, &new).await?;
    Ok((StatusCode::CREATED, Json(SprayEnvelope { spray })))
}

#[instrument(skip(state, viewer, payload), fields(user_id = viewer.id))]
pub async fn update_schedule(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    viewer: Viewer,
    payload: Result<Json<ScheduleDone>, JsonRejection>,
) -> AppResult<Json<ScheduleEnvelope>> {
    let ScheduleDone { done } = json_body(payload)?;
    let schedule = records::set_schedule_done(
        &state.db,
        Scope::for_viewer(&viewer, Access::Write),
        id,
        done,
    )
    .await?
    .ok_or(AppError::NotFound(Schedule::LABEL))?;
    Ok(Json(ScheduleEnvelope { schedule }))
}

#[instrument(skip(state, viewer), fields(user_id = viewer.id, table = R::TABLE))]
pub async fn delete_record<R: CropRecord>(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    viewer: Viewer,
) -> AppResult<Json<Message>> {
    let scope = Scope::for_viewer(&viewer, Access::Write);
    if !records::delete::<R>(&state.db, scope, id).await? {
        return Err(AppError::NotFound(R::LABEL));
    }
    Ok(Json(Message::new(R::DELETED)))
}

async fn ensure_writable_crop(state: &AppState, viewer: &Viewer, crop_id: i64) -> AppResult<()> {
    if repo::exists(&state.db, Scope::for_viewer(viewer, Access::Write), crop_id).await? {
        Ok(())
    } else {
        Err(AppError::NotFound("Crop"))
    }
}

async fn ensure_own_field(state: &AppState, user_id: i64, field_id: i64) -> AppResult<()> {
    if fields::repo::is_owned_by(&state.db, field_id, user_id).await? {
        Ok(())
    } else {
        warn!(field_id, "crop references a field the caller does not own");
        Err(AppError::BadRequest("Invalid field_id".into()))
    }
}
