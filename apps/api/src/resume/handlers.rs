use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::gate::{AdminOnly, AdminOrUser, Authorized};
use crate::errors::AppError;
use crate::models::resume::ResumeRow;
use crate::resume::models::{
    EducationEntry, ExperienceEntry, LinkEntry, ResumeInput, Section, SectionInput, SectionRecord,
    SkillEntry,
};
use crate::resume::repository;
use crate::state::AppState;

#[derive(Serialize)]
pub struct ResumeDetail {
    #[serde(flatten)]
    pub resume: ResumeRow,
    pub education: Vec<SectionRecord<EducationEntry>>,
    pub experience: Vec<SectionRecord<ExperienceEntry>>,
    pub skills: Vec<SectionRecord<SkillEntry>>,
    pub links: Vec<SectionRecord<LinkEntry>>,
}

/// PUT bodies must name the record they update.
fn check_body_id(path_id: Uuid, body_id: Option<Uuid>) -> Result<(), AppError> {
    if body_id != Some(path_id) {
        return Err(AppError::Validation(format!(
            "Body id does not match path id {path_id}"
        )));
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Resumes
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/resume
pub async fn handle_list_resumes(State(state): State<AppState>) -> Result<Json<Vec<ResumeRow>>, AppError> {
    Ok(Json(repository::list_resumes(&state.db).await?))
}

/// GET /api/resume/:id
pub async fn handle_get_resume(
    _caller: Authorized<AdminOrUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ResumeDetail>, AppError> {
    let resume = repository::get_resume(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))?;

    Ok(Json(ResumeDetail {
        education: repository::sections_of_resume(&state.db, id).await?,
        experience: repository::sections_of_resume(&state.db, id).await?,
        skills: repository::sections_of_resume(&state.db, id).await?,
        links: repository::sections_of_resume(&state.db, id).await?,
        resume,
    }))
}

/// POST /api/resume
pub async fn handle_create_resume(
    _caller: Authorized<AdminOnly>,
    State(state): State<AppState>,
    body: Result<Json<ResumeInput>, JsonRejection>,
) -> Result<(StatusCode, Json<ResumeRow>), AppError> {
    let Json(input) = body?;
    input.validate().map_err(AppError::Validation)?;
    let row = repository::insert_resume(&state.db, &input).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// PUT /api/resume/:id
pub async fn handle_update_resume(
    _caller: Authorized<AdminOnly>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Result<Json<ResumeInput>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let Json(input) = body?;
    check_body_id(id, input.id)?;
    input.validate().map_err(AppError::Validation)?;
    if !repository::update_resume(&state.db, id, &input).await? {
        return Err(AppError::NotFound(format!("Resume {id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/resume/:id
pub async fn handle_delete_resume(
    _caller: Authorized<AdminOnly>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !repository::delete_resume(&state.db, id).await? {
        return Err(AppError::NotFound(format!("Resume {id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ────────────────────────────────────────────────────────────────────────────
// Sections (education, experience, skill, link)
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/{kind}
pub async fn handle_list_sections<T: Section>(
    State(state): State<AppState>,
) -> Result<Json<Vec<SectionRecord<T>>>, AppError> {
    Ok(Json(repository::list_sections::<T>(&state.db).await?))
}

/// GET /api/{kind}/:id
pub async fn handle_get_section<T: Section>(
    _caller: Authorized<AdminOrUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SectionRecord<T>>, AppError> {
    repository::get_section::<T>(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("{} {id} not found", T::KIND)))
}

/// POST /api/{kind}
pub async fn handle_create_section<T: Section>(
    _caller: Authorized<AdminOnly>,
    State(state): State<AppState>,
    body: Result<Json<SectionInput<T>>, JsonRejection>,
) -> Result<(StatusCode, Json<SectionRecord<T>>), AppError> {
    let Json(input) = body?;
    input.entry.validate().map_err(AppError::Validation)?;
    let record = repository::insert_section(&state.db, input.resume_id, &input.entry).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// PUT /api/{kind}/:id
pub async fn handle_update_section<T: Section>(
    _caller: Authorized<AdminOnly>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Result<Json<SectionInput<T>>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let Json(input) = body?;
    check_body_id(id, input.id)?;
    input.entry.validate().map_err(AppError::Validation)?;
    if !repository::update_section(&state.db, id, input.resume_id, &input.entry).await? {
        return Err(AppError::NotFound(format!("{} {id} not found", T::KIND)));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/{kind}/:id
pub async fn handle_delete_section<T: Section>(
    _caller: Authorized<AdminOnly>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !repository::delete_section::<T>(&state.db, id).await? {
        return Err(AppError::NotFound(format!("{} {id} not found", T::KIND)));
    }
    Ok(StatusCode::NO_CONTENT)
}
