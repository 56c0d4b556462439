use axum::Json;
use axum::extract::Path;
use axum::routing::{patch, post, put};
use axum::{Router, extract::State, http::StatusCode, routing::get};
use chrono::Utc;

use crate::auth::{Identity, require_role};
use crate::error::AppError;
use crate::models::*;
use crate::services::compute_progress;
use crate::settings::Preferences;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/subjects", get(list_subjects))
        .route("/me/profile", get(my_profile).put(update_my_profile))
        .route("/me/classes", get(my_classes))
        .route("/classes/{id}/topics", get(class_topics))
        .route("/tutor/classes", get(tutor_classes))
        .route("/tutor/classes/{id}/topics", get(managed_topics))
        .route("/tutor/classes/{id}/topics/{topic_id}", put(set_topic_visibility))
        .route("/tutors/{id}/slots", get(open_slots))
        .route("/slots", post(publish_slot))
        .route("/appointments", get(list_appointments).post(reserve))
        .route("/appointments/next", get(next_appointment))
        .route("/appointments/{id}/cancel", patch(cancel_appointment))
        .route("/appointments/{id}/complete", patch(complete_appointment))
        .route("/progress", get(progress))
        .route("/settings", get(get_settings).put(put_settings))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

async fn list_subjects(State(state): State<AppState>) -> Result<Json<Vec<Subject>>, AppError> {
    let subjects = state.curriculum().subjects().await?;
    Ok(Json(subjects))
}

async fn my_profile(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<Profile>, AppError> {
    let profile = state.profiles().me(&identity).await?;
    Ok(Json(profile))
}

async fn update_my_profile(
    State(state): State<AppState>,
    identity: Identity,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<Profile>, AppError> {
    let profile = state.profiles().update(&identity, update).await?;
    Ok(Json(profile))
}

async fn my_classes(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<Vec<ClassSummary>>, AppError> {
    require_role(&state.db, &identity, Role::Student).await?;
    let classes = state.curriculum().student_classes(&identity.id).await?;
    Ok(Json(classes))
}

async fn class_topics(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> Result<Json<Vec<Topic>>, AppError> {
    let topics = state.curriculum().active_topics(&identity, &id).await?;
    Ok(Json(topics))
}

async fn tutor_classes(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<Vec<ClassSummary>>, AppError> {
    let classes = state.curriculum().tutor_classes(&identity).await?;
    Ok(Json(classes))
}

async fn managed_topics(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> Result<Json<Vec<ManagedTopic>>, AppError> {
    let topics = state.curriculum().managed_topics(&identity, &id).await?;
    Ok(Json(topics))
}

async fn set_topic_visibility(
    State(state): State<AppState>,
    identity: Identity,
    Path((class_id, topic_id)): Path<(String, i64)>,
    Json(req): Json<VisibilityRequest>,
) -> Result<StatusCode, AppError> {
    state
        .curriculum()
        .set_topic_visibility(&identity, &class_id, topic_id, req.is_active)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn open_slots(
    State(state): State<AppState>,
    _identity: Identity,
    Path(tutor_id): Path<String>,
) -> Result<Json<Vec<AvailabilitySlot>>, AppError> {
    let slots = state.availability().open_slots(&tutor_id, Utc::now()).await?;
    Ok(Json(slots))
}

async fn publish_slot(
    State(state): State<AppState>,
    identity: Identity,
    Json(req): Json<NewSlotRequest>,
) -> Result<(StatusCode, Json<AvailabilitySlot>), AppError> {
    let slot = state.availability().publish_slot(&identity, req).await?;
    Ok((StatusCode::CREATED, Json(slot)))
}

async fn list_appointments(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<Vec<AppointmentDetail>>, AppError> {
    let appointments = state.booking().upcoming(&identity).await?;
    Ok(Json(appointments))
}

async fn next_appointment(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<Option<AppointmentDetail>>, AppError> {
    let next = state.booking().next_for_student(&identity).await?;
    Ok(Json(next))
}

async fn reserve(
    State(state): State<AppState>,
    identity: Identity,
    Json(req): Json<ReserveRequest>,
) -> Result<(StatusCode, Json<Appointment>), AppError> {
    let appointment = state.booking().reserve(&identity, req).await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

async fn cancel_appointment(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> Result<Json<Appointment>, AppError> {
    let appointment = state.booking().cancel(&identity, &id).await?;
    Ok(Json(appointment))
}

async fn complete_appointment(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> Result<Json<Appointment>, AppError> {
    let appointment = state.booking().complete(&identity, &id).await?;
    Ok(Json(appointment))
}

async fn progress(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<ProgressReport>, AppError> {
    require_role(&state.db, &identity, Role::Student).await?;
    let report = compute_progress(&state.db, &identity.id).await?;
    Ok(Json(report))
}

async fn get_settings(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<Preferences>, AppError> {
    let prefs = state.settings.get(&identity.id).await?;
    Ok(Json(prefs))
}

async fn put_settings(
    State(state): State<AppState>,
    identity: Identity,
    Json(prefs): Json<Preferences>,
) -> Result<Json<Preferences>, AppError> {
    state.settings.set(&identity.id, prefs.clone()).await?;
    Ok(Json(prefs))
}
