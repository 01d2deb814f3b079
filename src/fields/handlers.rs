use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    dto::{FieldEnvelope, FieldList, FieldPatch, NewField},
    repo::{self, Field, FieldDeletion},
};
use crate::{
    access::{find_visible, list_visible, Access, Scope},
    auth::extractors::Viewer,
    dto::Message,
    error::{json_body, AppError, AppResult},
    extract::RecordId,
    patch::SetList,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/fields", get(list_fields).post(create_field))
        .route(
            "/fields/:id",
            get(get_field).put(update_field).delete(delete_field),
        )
}

#[instrument(skip(state, viewer), fields(user_id = viewer.id))]
pub async fn list_fields(
    State(state): State<AppState>,
    viewer: Viewer,
) -> AppResult<Json<FieldList>> {
    let fields = list_visible::<Field>(&state.db, Scope::for_viewer(&viewer, Access::Read)).await?;
    Ok(Json(FieldList { fields }))
}

#[instrument(skip(state, viewer), fields(user_id = viewer.id))]
pub async fn get_field(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    viewer: Viewer,
) -> AppResult<Json<FieldEnvelope>> {
    let field = find_visible::<Field>(&state.db, Scope::for_viewer(&viewer, Access::Read), id)
        .await?
        .ok_or(AppError::NotFound("Field"))?;
    Ok(Json(FieldEnvelope { field }))
}

#[instrument(skip(state, viewer, payload), fields(user_id = viewer.id))]
pub async fn create_field(
    State(state): State<AppState>,
    viewer: Viewer,
    payload: Result<Json<NewField>, JsonRejection>,
) -> AppResult<(StatusCode, Json<FieldEnvelope>)> {
    let new = json_body(payload)?.validate()?;
    let field = repo::insert(&state.db, viewer.id, &new).await?;
    info!(field_id = field.id, "field created");
    Ok((StatusCode::CREATED, Json(FieldEnvelope { field })))
}

#[instrument(skip(state, viewer, payload), fields(user_id = viewer.id))]
pub async fn update_field(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    viewer: Viewer,
    payload: Result<Json<FieldPatch>, JsonRejection>,
) -> AppResult<Json<FieldEnvelope>> {
    let patch = json_body(payload)?.validate()?;

    let mut set = SetList::new("fields");
    set.set("name", patch.name)
        .set("location", patch.location)
        .set("area", patch.area)
        .set("area_unit", patch.area_unit)
        .set("soil_type", patch.soil_type)
        .set("image", patch.image)
        .set("notes", patch.notes);
    if set.is_empty() {
        return Err(AppError::BadRequest("No fields to update".into()));
    }

    let field = set
        .finish(id, Scope::for_viewer(&viewer, Access::Write))
        .build_query_as::<Field>()
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::NotFound("Field"))?;
    Ok(Json(FieldEnvelope { field }))
}

#[instrument(skip(state, viewer), fields(user_id = viewer.id))]
pub async fn delete_field(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    viewer: Viewer,
) -> AppResult<Json<Message>> {
    match repo::delete(&state.db, Scope::for_viewer(&viewer, Access::Write), id).await? {
        FieldDeletion::Deleted => {
            info!(field_id = id, "field deleted");
            Ok(Json(Message::new("Field deleted successfully")))
        }
        FieldDeletion::NotFound => Err(AppError::NotFound("Field")),
        FieldDeletion::HasCrops => {
            warn!(field_id = id, "field still has crops");
            Err(AppError::BadRequest(
                "Cannot delete field because it has associated crops. Please delete or reassign the crops first.".into(),
            ))
        }
    }
}
