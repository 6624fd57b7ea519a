use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gatepass_domain::id::UserId;

use crate::error::TicketingError;
use crate::handlers::identity::CurrentUser;
use crate::state::AppState;
use crate::usecase::auth::{
    LoginInput, LoginUseCase, RegisterInput, RegisterUseCase, VerifyOtpInput, VerifyOtpUseCase,
};

// ── POST /register ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub id: UserId,
    pub email: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), TicketingError> {
    let usecase = RegisterUseCase {
        users: state.user_repo(),
        hasher: state.hasher(),
        entropy: state.entropy(),
        clock: state.clock(),
    };
    let user = usecase
        .execute(RegisterInput {
            email: body.email,
            password: body.password,
            first_name: body.first_name,
            last_name: body.last_name,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id: user.id,
            email: user.email,
        }),
    ))
}

// ── POST /login ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(alias = "username")]
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub otp_required: bool,
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, TicketingError> {
    let usecase = LoginUseCase {
        users: state.user_repo(),
        challenges: state.otp_repo(),
        hasher: state.hasher(),
        entropy: state.entropy(),
        clock: state.clock(),
    };
    usecase
        .execute(LoginInput {
            email: body.email,
            password: body.password,
        })
        .await?;
    Ok(Json(LoginResponse { otp_required: true }))
}

// ── POST /otp/verify ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub code: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub token: String,
    pub token_type: &'static str,
    #[serde(serialize_with = "gatepass_core::serde::to_rfc3339_ms")]
    pub expires_at: DateTime<Utc>,
}

pub async fn verify_otp(
    State(state): State<AppState>,
    Json(body): Json<VerifyOtpRequest>,
) -> Result<Json<SessionResponse>, TicketingError> {
    let usecase = VerifyOtpUseCase {
        users: state.user_repo(),
        challenges: state.otp_repo(),
        clock: state.clock(),
        sessions: state.sessions.clone(),
    };
    let session = usecase
        .execute(VerifyOtpInput {
            email: body.email,
            code: body.code,
        })
        .await?;
    Ok(Json(SessionResponse {
        token: session.token,
        token_type: "Bearer",
        expires_at: session.expires_at,
    }))
}

// ── GET /me ───────────────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub id: UserId,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub roles: Vec<String>,
}

pub async fn me(CurrentUser(user): CurrentUser) -> Json<MeResponse> {
    Json(MeResponse {
        id: user.id,
        email: user.email,
        first_name: user.first_name,
        last_name: user.last_name,
        roles: user.roles.to_strings(),
    })
}
