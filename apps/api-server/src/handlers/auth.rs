//! Authentication handlers.

use actix_web::{HttpResponse, web};

use blog_core::DomainError;
use blog_core::domain::Admin;
use blog_core::error::RepoError;
use blog_shared::dto::{AdminResponse, AuthResponse, LoginRequest, RegisterAdminRequest};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const MIN_PASSWORD_LEN: usize = 8;
const ADMIN_ROLE: &str = "admin";

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn email_taken() -> DomainError {
    DomainError::Duplicate("Email already registered".to_string())
}

fn issue_token(state: &AppState, admin: &Admin) -> AppResult<AuthResponse> {
    let token = state
        .tokens
        .generate_token(admin.id, &admin.email, vec![ADMIN_ROLE.to_string()])
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(AuthResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: state.tokens.expiration_seconds().max(0) as u64,
    })
}

/// POST /api/auth/register
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterAdminRequest>,
) -> AppResult<HttpResponse> {
    if !state.settings.allow_registration {
        return Err(AppError::Forbidden(
            "Admin registration is disabled".to_string(),
        ));
    }

    let req = body.into_inner();
    let email = normalize_email(&req.email);

    let mut errors = Vec::new();
    if email.is_empty() || !email.contains('@') {
        errors.push("email: must be a valid email address".to_string());
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(format!(
            "password: must be at least {MIN_PASSWORD_LEN} characters"
        ));
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    if state.admins.find_by_email(&email).await?.is_some() {
        return Err(email_taken().into());
    }

    let password_hash = state
        .passwords
        .hash(&req.password)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let admin = state
        .admins
        .insert(Admin::new(email, password_hash))
        .await
        .map_err(|e| match e {
            RepoError::Constraint(_) => email_taken(),
            other => other.into(),
        })?;

    tracing::info!(admin_id = %admin.id, "Admin registered");

    Ok(HttpResponse::Created().json(issue_token(&state, &admin)?))
}

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let invalid = || AppError::Unauthorized("Invalid email or password".to_string());

    let admin = state
        .admins
        .find_by_email(&normalize_email(&req.email))
        .await?
        .ok_or_else(invalid)?;

    let valid = state
        .passwords
        .verify(&req.password, &admin.password_hash)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    if !valid {
        tracing::warn!(admin_id = %admin.id, "Failed login attempt");
        return Err(invalid());
    }

    Ok(HttpResponse::Ok().json(issue_token(&state, &admin)?))
}

/// GET /api/auth/me - Protected route
pub async fn me(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let admin = state
        .admins
        .find_by_id(identity.admin_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Admin not found".to_string()))?;

    Ok(HttpResponse::Ok().json(AdminResponse {
        id: admin.id,
        email: admin.email,
        roles: identity.roles,
        created_at: admin.created_at,
    }))
}
