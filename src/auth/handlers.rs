use actix_web::{http::header, web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::auth::basic::parse_basic_header;
use crate::error::{AppError, AuthError};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// `GET /api/login` — exchange Basic credentials for a signed token.
pub async fn login(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let credentials = match header_value.and_then(parse_basic_header) {
        Some(credentials) => credentials,
        None => {
            return Ok(HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "Missing or invalid Authorization header. Expected 'Basic <base64(username:password)>'"
            })));
        }
    };

    match state
        .auth
        .verify(&credentials.username, &credentials.password)
        .await
    {
        Ok(identity) => {
            let token = state.auth.issue(&identity)?;
            info!("Login successful for {}", identity.username);
            Ok(HttpResponse::Ok().json(TokenResponse { token }))
        }
        Err(e) => {
            error!("Login failed for {}: {}", credentials.username, e);
            // Empty, unknown, and mismatched credentials all answer with the
            // same 401; the payload never says which check failed.
            Err(AuthError::InvalidCredentials.into())
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub login: Option<String>,
    pub password: Option<String>,
}

/// `POST /api/sign_up` — hash the password and create the credential record.
/// The response never echoes the stored hash.
pub async fn sign_up(
    req: web::Json<SignUpRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let login = req.login.as_deref().unwrap_or("");
    let password = req.password.as_deref().unwrap_or("");

    if let Err(e) = state.auth.register(login, password).await {
        error!("Sign-up failed for {}: {}", login, e);
        return Err(e.into());
    }

    info!("New user registered: {}", login);
    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "User signed up successfully"
    })))
}
