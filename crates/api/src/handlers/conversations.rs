//! Handlers for the `/conversations` resource.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use cityfix_core::conversation::{canonical_pair, is_participant};
use cityfix_core::error::CoreError;
use cityfix_core::query::QueryEntity;
use cityfix_core::types::DbId;
use cityfix_db::models::conversation::Conversation;
use cityfix_db::models::page::Page;
use cityfix_db::repositories::{ConversationRepo, UserRepo};
use cityfix_db::store;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Body for `POST /conversations`: the other participant.
#[derive(Debug, Deserialize)]
pub struct UpsertConversation {
    pub party_id: DbId,
}

/// POST /api/v1/conversations
///
/// Find-or-create the thread between the caller and `party_id`, recording
/// activity on it. Idempotent across participant order: the messaging
/// collaborator calls this on every send.
pub async fn upsert(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<UpsertConversation>,
) -> AppResult<Json<DataResponse<Conversation>>> {
    let pair = canonical_pair(auth.user_id, input.party_id)?;

    let timeout = state.store_timeout();
    store::read(timeout, || {
        UserRepo::find_by_id(&state.pool, input.party_id)
    })
    .await?
    .ok_or_else(|| CoreError::not_found("User", input.party_id))?;

    let conversation = store::write(timeout, ConversationRepo::upsert(&state.pool, pair)).await?;

    Ok(Json(DataResponse { data: conversation }))
}

/// GET /api/v1/conversations
///
/// The caller's conversations, most recent activity first.
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(raw): Query<HashMap<String, String>>,
) -> AppResult<Json<DataResponse<Page<Conversation>>>> {
    let spec = state
        .normalizer
        .normalize(&raw, QueryEntity::Conversations)?;
    let page = store::read(state.store_timeout(), || {
        ConversationRepo::list_for_party(&state.pool, auth.user_id, &spec)
    })
    .await?;

    Ok(Json(DataResponse { data: page }))
}

/// POST /api/v1/conversations/{id}/view
///
/// Mark a conversation as viewed. Only a participant may do so; marking an
/// already-viewed thread is an idempotent success.
pub async fn mark_viewed(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let timeout = state.store_timeout();

    let conversation = store::read(timeout, || ConversationRepo::find_by_id(&state.pool, id))
        .await?
        .ok_or_else(|| CoreError::not_found("Conversation", id))?;

    if !is_participant(
        auth.user_id,
        conversation.party_one_id,
        conversation.party_two_id,
    ) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only a participant may view this conversation".into(),
        )));
    }

    let updated = store::write(timeout, ConversationRepo::mark_viewed(&state.pool, id)).await?;
    if !updated {
        return Err(AppError::Core(CoreError::not_found("Conversation", id)));
    }

    Ok(StatusCode::NO_CONTENT)
}
