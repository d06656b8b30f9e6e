pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::auth::handlers as auth;
use crate::resume::handlers as resume;
use crate::resume::models::{EducationEntry, ExperienceEntry, LinkEntry, Section, SkillEntry};
use crate::state::AppState;

/// List/get/create/update/delete routes for one section kind.
fn section_routes<T: Section>() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(resume::handle_list_sections::<T>).post(resume::handle_create_section::<T>),
        )
        .route(
            "/:id",
            get(resume::handle_get_section::<T>)
                .put(resume::handle_update_section::<T>)
                .delete(resume::handle_delete_section::<T>),
        )
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Authentication
        .route("/api/authentication/login", post(auth::handle_login))
        .route("/api/authentication/register", post(auth::handle_register))
        .route("/api/authentication/user-claims", get(auth::handle_user_claims))
        // Resumes
        .route(
            "/api/resume",
            get(resume::handle_list_resumes).post(resume::handle_create_resume),
        )
        .route(
            "/api/resume/:id",
            get(resume::handle_get_resume)
                .put(resume::handle_update_resume)
                .delete(resume::handle_delete_resume),
        )
        // Sections
        .nest("/api/education", section_routes::<EducationEntry>())
        .nest("/api/experience", section_routes::<ExperienceEntry>())
        .nest("/api/skill", section_routes::<SkillEntry>())
        .nest("/api/link", section_routes::<LinkEntry>())
        .with_state(state)
}
