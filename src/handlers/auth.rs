use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::auth::{generate_jwt, generate_token};
use crate::emails::EmailRecipient;
use crate::error::{ApiError, FieldError};
use crate::models::{AuthUser, NewUser};
use crate::validation::{
    validate_account_inputs, validate_email, validate_one_shot_token, validate_password,
};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmAccountRequest {
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub password: Option<String>,
}

/// POST /api/auth/create-account
pub async fn create_account(
    State(state): State<AppState>,
    Json(payload): Json<CreateAccountRequest>,
) -> Response {
    let errors = validate_account_inputs(&payload.name, &payload.email, &payload.password);
    if !errors.is_empty() {
        return ApiError::validation(errors).into_response();
    }

    // Present after validation
    let name = payload.name.unwrap_or_default();
    let email = payload.email.unwrap_or_default();
    let password = payload.password.unwrap_or_default();

    match state.users.find_by_email(&email).await {
        Ok(Some(_)) => {
            return (
                StatusCode::CONFLICT,
                Json(json!({ "error": "El correo electrónico ya está en uso" })),
            )
                .into_response();
        }
        Ok(None) => {}
        Err(e) => {
            tracing::error!("store error checking for duplicate email: {}", e);
            return server_error_creating_account();
        }
    }

    let password_hash = match bcrypt::hash(&password, bcrypt::DEFAULT_COST) {
        Ok(hash) => hash,
        Err(e) => {
            tracing::error!("password hashing failed: {}", e);
            return server_error_creating_account();
        }
    };

    let token = generate_token();
    let user = match state
        .users
        .create(NewUser {
            name,
            email,
            password: password_hash,
            token: token.clone(),
        })
        .await
    {
        Ok(user) => user,
        Err(e) => {
            tracing::error!("store error creating account: {}", e);
            return server_error_creating_account();
        }
    };

    let recipient = EmailRecipient {
        name: user.name.clone(),
        email: user.email.clone(),
        token,
    };
    if let Err(e) = state.mailer.send_confirmation_email(&recipient).await {
        tracing::error!("confirmation email dispatch failed: {}", e);
        return server_error_creating_account();
    }

    (
        StatusCode::CREATED,
        Json(json!("Usuario creado correctamente")),
    )
        .into_response()
}

fn server_error_creating_account() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Error en el servidor al crear su cuenta" })),
    )
        .into_response()
}

/// POST /api/auth/confirm-account
pub async fn confirm_account(
    State(state): State<AppState>,
    Json(payload): Json<ConfirmAccountRequest>,
) -> Response {
    let errors = validate_one_shot_token(&payload.token);
    if !errors.is_empty() {
        return ApiError::validation(errors).into_response();
    }

    let token = payload.token.unwrap_or_default();
    let user = match state.users.find_by_token(&token).await {
        Ok(user) => user,
        Err(e) => {
            tracing::error!("store error confirming account: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Error al confirmar la cuenta" })),
            )
                .into_response();
        }
    };

    let Some(user) = user else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Token no válido" })),
        )
            .into_response();
    };

    if let Err(e) = state.users.confirm(user.id).await {
        tracing::error!("store error confirming account: {}", e);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Error al confirmar la cuenta" })),
        )
            .into_response();
    }

    Json(json!(
        "Cuenta confirmada correctamente, ya puede iniciar sesión"
    ))
    .into_response()
}

/// POST /api/auth/login - on success the body is the session credential
pub async fn login(State(state): State<AppState>, Json(payload): Json<LoginRequest>) -> Response {
    let mut errors = validate_email(&payload.email);
    if payload.password.as_deref().unwrap_or("").is_empty() {
        errors.push(FieldError::body(
            "password",
            "La contraseña no puede ir vacía",
        ));
    }
    if !errors.is_empty() {
        return ApiError::validation(errors).into_response();
    }

    let email = payload.email.unwrap_or_default();
    let password = payload.password.unwrap_or_default();

    let user = match state.users.find_by_email(&email).await {
        Ok(user) => user,
        Err(e) => {
            tracing::error!("store error during login: {}", e);
            return server_error_logging_in();
        }
    };

    let Some(user) = user else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Usuario no encontrado" })),
        )
            .into_response();
    };

    // Unconfirmed accounts can never authenticate
    if !user.confirmed {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": "La cuenta no ha sido confirmada" })),
        )
            .into_response();
    }

    match bcrypt::verify(&password, &user.password) {
        Ok(true) => {}
        Ok(false) => {
            return (
                StatusCode::FORBIDDEN,
                Json(json!({ "error": "Contraseña incorrecta" })),
            )
                .into_response();
        }
        Err(e) => {
            tracing::error!("password verification failed: {}", e);
            return server_error_logging_in();
        }
    }

    match generate_jwt(user.id) {
        Ok(token) => Json(json!(token)).into_response(),
        Err(e) => {
            tracing::error!("session credential generation failed: {}", e);
            server_error_logging_in()
        }
    }
}

fn server_error_logging_in() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Error en el servidor al iniciar sesión" })),
    )
        .into_response()
}

/// POST /api/auth/forgot-password - reuses the one-shot token field for the
/// reset flow
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Response {
    let errors = validate_email(&payload.email);
    if !errors.is_empty() {
        return ApiError::validation(errors).into_response();
    }

    let email = payload.email.unwrap_or_default();
    let user = match state.users.find_by_email(&email).await {
        Ok(user) => user,
        Err(e) => {
            tracing::error!("store error during forgot-password: {}", e);
            return server_error_resetting_password();
        }
    };

    let Some(user) = user else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Usuario no encontrado" })),
        )
            .into_response();
    };

    let token = generate_token();
    if let Err(e) = state.users.set_token(user.id, &token).await {
        tracing::error!("store error storing reset token: {}", e);
        return server_error_resetting_password();
    }

    let recipient = EmailRecipient {
        name: user.name.clone(),
        email: user.email.clone(),
        token,
    };
    if let Err(e) = state.mailer.send_password_reset_email(&recipient).await {
        tracing::error!("password reset email dispatch failed: {}", e);
        return server_error_resetting_password();
    }

    Json(json!("Revisa tu email para instrucciones")).into_response()
}

/// POST /api/auth/validate-token
pub async fn validate_token(
    State(state): State<AppState>,
    Json(payload): Json<ConfirmAccountRequest>,
) -> Response {
    let errors = validate_one_shot_token(&payload.token);
    if !errors.is_empty() {
        return ApiError::validation(errors).into_response();
    }

    let token = payload.token.unwrap_or_default();
    match state.users.find_by_token(&token).await {
        Ok(Some(_)) => Json(json!("Token válido, asigna un nuevo password")).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Token no válido" })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("store error validating token: {}", e);
            server_error_resetting_password()
        }
    }
}

/// POST /api/auth/reset-password/:token
pub async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Response {
    let errors = validate_password(&payload.password);
    if !errors.is_empty() {
        return ApiError::validation(errors).into_response();
    }

    let user = match state.users.find_by_token(&token).await {
        Ok(user) => user,
        Err(e) => {
            tracing::error!("store error during password reset: {}", e);
            return server_error_resetting_password();
        }
    };

    let Some(user) = user else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Token no válido" })),
        )
            .into_response();
    };

    let password_hash = match bcrypt::hash(payload.password.unwrap_or_default(), bcrypt::DEFAULT_COST)
    {
        Ok(hash) => hash,
        Err(e) => {
            tracing::error!("password hashing failed: {}", e);
            return server_error_resetting_password();
        }
    };

    if let Err(e) = state.users.reset_password(user.id, &password_hash).await {
        tracing::error!("store error resetting password: {}", e);
        return server_error_resetting_password();
    }

    Json(json!("El password se modificó correctamente")).into_response()
}

fn server_error_resetting_password() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Hubo un error" })),
    )
        .into_response()
}

/// GET /api/auth/user - the authenticated actor resolved by the guard chain
pub async fn current_user(Extension(user): Extension<AuthUser>) -> Response {
    Json(user).into_response()
}
