//! HTTP handlers for the journal API
//!
//! Protected handlers take the identity from the request extensions, which
//! only [`crate::middleware::require_auth`] fills in.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use journal_core::{parse_journal_id, AuthenticatedUser, JournalDraft};

use crate::error::ApiError;
use crate::middleware::{clear_session_cookie, session_cookie};
use crate::models::*;
use crate::state::AppState;

/// Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "journal-api".to_string(),
    })
}

/// POST /api/register
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let Json(body) = payload?;

    state
        .auth
        .register(
            body.username.as_deref().unwrap_or_default(),
            body.password.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User registered successfully")),
    ))
}

/// POST /api/login
///
/// Sets the session cookie; the token never appears in the body.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = payload?;

    let issued = state
        .auth
        .login(
            body.username.as_deref().unwrap_or_default(),
            body.password.as_deref().unwrap_or_default(),
        )
        .await?;

    let cookie = session_cookie(&issued.token, &state.cookies);

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse {
            message: "Login successful".to_string(),
            user: UserSummary {
                username: issued.claims.sub,
            },
        }),
    ))
}

/// POST /api/logout
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::SET_COOKIE, clear_session_cookie(&state.cookies))],
        Json(MessageResponse::new("Logout successful")),
    )
}

/// POST /api/journal
pub async fn create_journal(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    payload: Result<Json<JournalDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<JournalResponse>), ApiError> {
    let Json(draft) = payload?;
    let journal = state.journals.create(&user, draft).await?;

    Ok((
        StatusCode::CREATED,
        Json(JournalResponse {
            message: "Journal created successfully".to_string(),
            journal,
        }),
    ))
}

/// GET /api/journal
pub async fn list_journals(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<JournalListResponse>, ApiError> {
    let user_journals = state.journals.list(&user).await?;

    Ok(Json(JournalListResponse {
        message: "Journals fetched successfully".to_string(),
        user_journals,
    }))
}

/// GET /api/journal/search?query=...
pub async fn search_journals(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Query(params) = params?;
    let search_results = state
        .journals
        .search(&user, params.query.as_deref())
        .await?;

    Ok(Json(SearchResponse {
        message: "Journal search results".to_string(),
        search_results,
    }))
}

/// GET /api/journal/:id
pub async fn get_journal(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<Json<JournalResponse>, ApiError> {
    let journal = state.journals.get(&user, parse_journal_id(&id)?).await?;

    Ok(Json(JournalResponse {
        message: "Journal fetched successfully".to_string(),
        journal,
    }))
}

/// PUT /api/journal/:id
pub async fn update_journal(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    payload: Result<Json<JournalDraft>, JsonRejection>,
) -> Result<Json<JournalResponse>, ApiError> {
    let id = parse_journal_id(&id)?;
    let Json(draft) = payload?;
    let journal = state.journals.update(&user, id, draft).await?;

    Ok(Json(JournalResponse {
        message: "Journal updated successfully".to_string(),
        journal,
    }))
}

/// DELETE /api/journal/:id
pub async fn delete_journal(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.journals.delete(&user, parse_journal_id(&id)?).await?;

    Ok(Json(MessageResponse::new("Journal deleted successfully")))
}
