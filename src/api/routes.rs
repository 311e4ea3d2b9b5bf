//! API route handlers

use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::AppState;
use crate::auth::{
    extract_bearer_token, hash_password, role_for_registration_key, verify_password, Claims, Role,
};
use crate::error::{ReliefError, Result};
use crate::lifecycle::{self, SubmitRequest};
use crate::store::{DistrictView, Request};

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    "OK"
}

// === Credential issuance ===

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
    pub username: String,
    pub password: String,
    /// Shared registration key that determines the granted role
    pub key: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub username: String,
    pub role: Role,
}

/// POST /register
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterBody>,
) -> Result<Json<RegisterResponse>> {
    let role = role_for_registration_key(&state.auth, &body.key)
        .ok_or_else(|| ReliefError::InvalidInput("invalid registration key".into()))?;
    if body.password.is_empty() {
        return Err(ReliefError::InvalidInput("password is empty".into()));
    }

    let password_hash = hash_password(&body.password)?;
    let mut store = state.store.lock().await;
    let user = store.create_user(&body.username, &password_hash, role)?;

    info!(username = %user.username, role = user.role.as_str(), "User registered");
    Ok(Json(RegisterResponse {
        username: user.username,
        role: user.role,
    }))
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: Role,
    pub username: String,
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginBody>,
) -> Result<Json<LoginResponse>> {
    let store = state.store.lock().await;
    let user = store
        .user_by_username(&body.username)?
        .ok_or_else(|| ReliefError::Unauthorized("invalid credentials".into()))?;
    drop(store);

    if !verify_password(&body.password, &user.password_hash)? {
        return Err(ReliefError::Unauthorized("invalid credentials".into()));
    }

    let (token, _claims) = state.tokens.issue(&user.username, user.role)?;
    Ok(Json(LoginResponse {
        token,
        role: user.role,
        username: user.username,
    }))
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub message: String,
}

/// POST /logout - revoke the presented token for the rest of its lifetime
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<LogoutResponse>> {
    let claims = authenticated_claims(&state, &headers).await?;

    let mut store = state.store.lock().await;
    store.revoke_token(&claims.jti, claims.exp as i64)?;

    Ok(Json(LogoutResponse {
        message: format!("user {} logged out", claims.sub),
    }))
}

// === Request lifecycle ===

/// POST /submit-request
pub async fn submit_request(
    State(state): State<AppState>,
    Json(body): Json<SubmitRequest>,
) -> Result<Json<Request>> {
    let mut store = state.store.lock().await;
    let request = lifecycle::submit(&mut store, body)?;
    Ok(Json(request))
}

/// GET /requests
pub async fn list_requests(State(state): State<AppState>) -> Result<Json<Vec<Request>>> {
    let store = state.store.lock().await;
    Ok(Json(store.list_requests()?))
}

/// POST /requests/{id}/resolve - administrator only
pub async fn resolve_request(
    State(state): State<AppState>,
    Path(request_id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<Request>> {
    require_admin(&state, &headers).await?;

    let mut store = state.store.lock().await;
    let request = lifecycle::resolve(&mut store, request_id)?;
    Ok(Json(request))
}

// === Districts and inventory ===

/// GET /districts
pub async fn list_districts(State(state): State<AppState>) -> Result<Json<Vec<DistrictView>>> {
    let store = state.store.lock().await;
    Ok(Json(store.list_district_views()?))
}

/// GET /districts/{id}
pub async fn get_district(
    State(state): State<AppState>,
    Path(district_id): Path<i64>,
) -> Result<Json<DistrictView>> {
    let store = state.store.lock().await;
    Ok(Json(store.district_view(district_id)?))
}

/// GET /districts/{id}/requests
pub async fn district_requests(
    State(state): State<AppState>,
    Path(district_id): Path<i64>,
) -> Result<Json<Vec<Request>>> {
    let store = state.store.lock().await;
    Ok(Json(store.list_requests_by_district(district_id)?))
}

/// POST /districts/{id}/inventory - batched signed-delta adjust,
/// administrator only
pub async fn adjust_inventory(
    State(state): State<AppState>,
    Path(district_id): Path<i64>,
    headers: HeaderMap,
    Json(deltas): Json<BTreeMap<String, i64>>,
) -> Result<Json<DistrictView>> {
    require_admin(&state, &headers).await?;

    let mut store = state.store.lock().await;
    store.apply_inventory_batch(district_id, &deltas)?;
    Ok(Json(store.district_view(district_id)?))
}

#[derive(Debug, Serialize)]
pub struct TransferResponse {
    pub source: DistrictView,
    pub target: DistrictView,
}

/// POST /districts/{src}/transfer/{dst} - batched transfer, administrator
/// only
pub async fn transfer_inventory(
    State(state): State<AppState>,
    Path((source_id, target_id)): Path<(i64, i64)>,
    headers: HeaderMap,
    Json(items): Json<BTreeMap<String, i64>>,
) -> Result<Json<TransferResponse>> {
    require_admin(&state, &headers).await?;

    let mut store = state.store.lock().await;
    store.transfer_inventory(source_id, target_id, &items)?;
    Ok(Json(TransferResponse {
        source: store.district_view(source_id)?,
        target: store.district_view(target_id)?,
    }))
}

// === Auth helpers ===

/// Verify the bearer token and check it has not been revoked.
async fn authenticated_claims(state: &AppState, headers: &HeaderMap) -> Result<Claims> {
    let header = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    let token = extract_bearer_token(header)
        .ok_or_else(|| ReliefError::Unauthorized("missing bearer token".into()))?;

    let claims = state.tokens.verify(token)?;

    let store = state.store.lock().await;
    if store.is_token_revoked(&claims.jti)? {
        return Err(ReliefError::Unauthorized("token revoked".into()));
    }
    Ok(claims)
}

async fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<Claims> {
    let claims = authenticated_claims(state, headers).await?;
    if claims.role != Role::Administrator {
        return Err(ReliefError::Forbidden(
            "administrator role required".into(),
        ));
    }
    Ok(claims)
}
