use std::future::{ready, Ready};

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};

use crate::auth::service::Identity;
use crate::error::{AppError, AuthError};
use crate::AppState;

/// Token gate for protected routes.
///
/// A handler takes `Identity` as an argument and therefore cannot run unless
/// extraction succeeded; a missing or bad token produces exactly one 401 and
/// the handler body is never reached. There is no fall-through path to guard
/// against manually.
impl FromRequest for Identity {
    type Error = AppError;
    type Future = Ready<Result<Identity, AppError>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(identity_from_request(req))
    }
}

fn identity_from_request(req: &HttpRequest) -> Result<Identity, AppError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::InternalError("application state not configured".to_string()))?;

    // The token is presented as the raw header value, no scheme prefix.
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(AuthError::Unauthorized)?;

    let identity = state.auth.validate(token)?;
    Ok(identity)
}
