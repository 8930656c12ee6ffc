//! HTTP API endpoint handlers.
//!
//! A thin surface: registration and login issue tokens and ensure each
//! user's bot room; room creation exposes the persisted-room invariants.
//! Everything realtime goes over `/ws`.

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
};
use serde::{Deserialize, Serialize};

use soro_shared::time::now_millis;

use crate::{
    domain::{Room, RoomError, User, UserId},
    infrastructure::dto::{RoomSnapshotDto, UserSummaryDto},
    ui::state::AppState,
    usecase::send_message::build_room_snapshot,
};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}

fn error_response(status: StatusCode, message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            message: message.to_string(),
        }),
    )
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub user: UserSummaryDto,
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), (StatusCode, Json<ErrorResponse>)> {
    if request.username.trim().is_empty()
        || request.email.trim().is_empty()
        || request.password.is_empty()
    {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "Username, email, and password are required",
        ));
    }

    if let Ok(Some(_)) = state.store.find_user_by_email(&request.email).await {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "Email already exists",
        ));
    }
    if let Ok(Some(_)) = state.store.find_user_by_username(&request.username).await {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "Username already exists",
        ));
    }

    let user = state
        .store
        .create_user(User::new(request.username, request.email, request.password))
        .await
        .map_err(|e| {
            tracing::error!("failed to create user: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Registration failed")
        })?;

    // Bot-path failures never surface to the user.
    if let Err(e) = state.bot.ensure_bot_room(&user.id).await {
        tracing::warn!("failed to set up bot room for '{}': {}", user.username, e);
    }

    let token = state.tokens.issue(&user.id).map_err(|e| {
        tracing::error!("failed to issue token: {}", e);
        error_response(StatusCode::INTERNAL_SERVER_ERROR, "Registration failed")
    })?;

    tracing::info!("user '{}' registered", user.username);
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User registered successfully".to_string(),
            token,
            user: UserSummaryDto::from(&user),
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, Json<ErrorResponse>)> {
    let user = state
        .store
        .find_user_by_email(&request.email)
        .await
        .map_err(|e| {
            tracing::error!("login lookup failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Login failed")
        })?
        .filter(|user| user.credential == request.password)
        .ok_or_else(|| error_response(StatusCode::UNAUTHORIZED, "Invalid credentials"))?;

    if let Err(e) = state.bot.ensure_bot_room(&user.id).await {
        tracing::warn!("failed to ensure bot room for '{}': {}", user.username, e);
    }

    let token = state.tokens.issue(&user.id).map_err(|e| {
        tracing::error!("failed to issue token: {}", e);
        error_response(StatusCode::INTERNAL_SERVER_ERROR, "Login failed")
    })?;

    tracing::info!("user '{}' logged in", user.username);
    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        token,
        user: UserSummaryDto::from(&user),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    pub name: String,
    pub description: Option<String>,
    pub participants: Vec<String>,
    #[serde(default)]
    pub is_group: bool,
}

/// Resolve the bearer token on an HTTP request to a user.
async fn authorized_user(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<User, (StatusCode, Json<ErrorResponse>)> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));
    state
        .authenticate
        .execute(token)
        .await
        .map_err(|e| error_response(StatusCode::UNAUTHORIZED, &e.to_string()))
}

pub async fn create_room(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<RoomSnapshotDto>), (StatusCode, Json<ErrorResponse>)> {
    let creator = authorized_user(&state, &headers).await?;

    // The creator is always a participant, listed once.
    let mut participants = vec![creator.id.clone()];
    for raw in &request.participants {
        let user_id = UserId::parse(raw)
            .map_err(|_| error_response(StatusCode::BAD_REQUEST, "Invalid participant id"))?;
        if !participants.contains(&user_id) {
            participants.push(user_id);
        }
    }
    let is_group = request.is_group || participants.len() > 2;

    // Direct rooms are unique per pair: return the existing one instead
    // of creating a duplicate.
    if !is_group && participants.len() == 2 {
        match state
            .store
            .find_direct_room(&participants[0], &participants[1])
            .await
        {
            Ok(Some(existing)) => {
                let snapshot = build_room_snapshot(&*state.store, &existing.id)
                    .await
                    .ok()
                    .flatten()
                    .ok_or_else(|| {
                        error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load room")
                    })?;
                return Ok((StatusCode::OK, Json(RoomSnapshotDto::from(&snapshot))));
            }
            Ok(None) => {}
            Err(e) => {
                tracing::error!("direct room lookup failed: {}", e);
                return Err(error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to create room",
                ));
            }
        }
    }

    let room = Room::new(
        request.name,
        request.description,
        participants,
        is_group,
        false,
        creator.id.clone(),
        now_millis(),
    )
    .map_err(|e| match e {
        RoomError::EmptyName | RoomError::NameTooLong | RoomError::NotEnoughParticipants => {
            error_response(StatusCode::BAD_REQUEST, &e.to_string())
        }
    })?;

    let room = state.store.create_room(room).await.map_err(|e| {
        tracing::error!("failed to create room: {}", e);
        error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create room")
    })?;

    let snapshot = build_room_snapshot(&*state.store, &room.id)
        .await
        .ok()
        .flatten()
        .ok_or_else(|| {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load room")
        })?;

    tracing::info!("room '{}' created by '{}'", room.id, creator.username);
    Ok((StatusCode::CREATED, Json(RoomSnapshotDto::from(&snapshot))))
}
