//! SQL access for resumes and their sections.
//!
//! Expects:
//! - `resumes (id UUID PK, first_name, last_name, email, phone_number, address, summary, interests, created_at, updated_at)`
//! - `resume_sections (id UUID PK, resume_id UUID -> resumes ON DELETE CASCADE, section_type TEXT, data JSONB, created_at, updated_at)`

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::{ResumeRow, SectionRow};
use crate::resume::models::{ResumeInput, Section, SectionRecord};

fn missing_resume(resume_id: Uuid) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| match e {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            AppError::Validation(format!("Resume {resume_id} does not exist"))
        }
        other => AppError::Database(other),
    }
}

fn to_records<T: Section>(rows: Vec<SectionRow>) -> Result<Vec<SectionRecord<T>>, AppError> {
    rows.into_iter()
        .map(|row| SectionRecord::try_from(row).map_err(AppError::Internal))
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Resumes
// ────────────────────────────────────────────────────────────────────────────

pub async fn list_resumes(pool: &PgPool) -> Result<Vec<ResumeRow>, AppError> {
    let rows = sqlx::query_as("SELECT * FROM resumes ORDER BY created_at")
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn get_resume(pool: &PgPool, id: Uuid) -> Result<Option<ResumeRow>, AppError> {
    let row = sqlx::query_as("SELECT * FROM resumes WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn insert_resume(pool: &PgPool, input: &ResumeInput) -> Result<ResumeRow, AppError> {
    let row: ResumeRow = sqlx::query_as(
        r#"
        INSERT INTO resumes
            (id, first_name, last_name, email, phone_number, address, summary, interests)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&input.first_name)
    .bind(&input.last_name)
    .bind(&input.email)
    .bind(&input.phone_number)
    .bind(&input.address)
    .bind(&input.summary)
    .bind(&input.interests)
    .fetch_one(pool)
    .await?;

    info!("Created resume {}", row.id);
    Ok(row)
}

/// Returns false when no resume has this id.
pub async fn update_resume(pool: &PgPool, id: Uuid, input: &ResumeInput) -> Result<bool, AppError> {
    let result = sqlx::query(
        r#"
        UPDATE resumes
        SET first_name = $2, last_name = $3, email = $4, phone_number = $5,
            address = $6, summary = $7, interests = $8, updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(&input.first_name)
    .bind(&input.last_name)
    .bind(&input.email)
    .bind(&input.phone_number)
    .bind(&input.address)
    .bind(&input.summary)
    .bind(&input.interests)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Sections go with it via the cascading foreign key.
pub async fn delete_resume(pool: &PgPool, id: Uuid) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM resumes WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

// ────────────────────────────────────────────────────────────────────────────
// Sections
// ────────────────────────────────────────────────────────────────────────────

pub async fn list_sections<T: Section>(pool: &PgPool) -> Result<Vec<SectionRecord<T>>, AppError> {
    let rows: Vec<SectionRow> = sqlx::query_as(
        "SELECT * FROM resume_sections WHERE section_type = $1 ORDER BY created_at",
    )
    .bind(T::KIND)
    .fetch_all(pool)
    .await?;
    to_records(rows)
}

pub async fn sections_of_resume<T: Section>(
    pool: &PgPool,
    resume_id: Uuid,
) -> Result<Vec<SectionRecord<T>>, AppError> {
    let rows: Vec<SectionRow> = sqlx::query_as(
        "SELECT * FROM resume_sections WHERE resume_id = $1 AND section_type = $2 ORDER BY created_at",
    )
    .bind(resume_id)
    .bind(T::KIND)
    .fetch_all(pool)
    .await?;
    to_records(rows)
}

pub async fn get_section<T: Section>(pool: &PgPool, id: Uuid) -> Result<Option<SectionRecord<T>>, AppError> {
    let row: Option<SectionRow> = sqlx::query_as(
        "SELECT * FROM resume_sections WHERE id = $1 AND section_type = $2",
    )
    .bind(id)
    .bind(T::KIND)
    .fetch_optional(pool)
    .await?;

    row.map(|r| SectionRecord::try_from(r).map_err(AppError::Internal))
        .transpose()
}

pub async fn insert_section<T: Section>(
    pool: &PgPool,
    resume_id: Uuid,
    entry: &T,
) -> Result<SectionRecord<T>, AppError> {
    let data = serde_json::to_value(entry).map_err(anyhow::Error::from)?;
    let row: SectionRow = sqlx::query_as(
        r#"
        INSERT INTO resume_sections (id, resume_id, section_type, data)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(resume_id)
    .bind(T::KIND)
    .bind(data)
    .fetch_one(pool)
    .await
    .map_err(missing_resume(resume_id))?;

    info!("Created {} section {} on resume {resume_id}", T::KIND, row.id);
    SectionRecord::try_from(row).map_err(AppError::Internal)
}

pub async fn update_section<T: Section>(
    pool: &PgPool,
    id: Uuid,
    resume_id: Uuid,
    entry: &T,
) -> Result<bool, AppError> {
    let data = serde_json::to_value(entry).map_err(anyhow::Error::from)?;
    let result = sqlx::query(
        r#"
        UPDATE resume_sections
        SET resume_id = $3, data = $4, updated_at = NOW()
        WHERE id = $1 AND section_type = $2
        "#,
    )
    .bind(id)
    .bind(T::KIND)
    .bind(resume_id)
    .bind(data)
    .execute(pool)
    .await
    .map_err(missing_resume(resume_id))?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete_section<T: Section>(pool: &PgPool, id: Uuid) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM resume_sections WHERE id = $1 AND section_type = $2")
        .bind(id)
        .bind(T::KIND)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
