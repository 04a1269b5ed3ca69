use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, FromRequest, HttpRequest, HttpResponse};
use futures::future::LocalBoxFuture;
use tracing::{info, warn};

use crate::auth::models::{LoginRequest, RegisterRequest, UserResponse};
use crate::db::User;
use crate::error::{AppError, AuthError};
use crate::AppState;

pub async fn register(
    req: web::Json<RegisterRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let req = req.into_inner();
    info!("Received registration request for email: {}", req.email);

    match state.auth_service.register(req).await {
        Ok(response) => Ok(HttpResponse::Created().json(response)),
        Err(e) => {
            warn!("Registration failed: {}", e);
            Err(e)
        }
    }
}

pub async fn login(
    req: web::Json<LoginRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let req = req.into_inner();
    info!("Received login request for email: {}", req.email);

    let response = state.auth_service.login(req).await?;
    Ok(HttpResponse::Ok().json(response))
}

pub async fn me(user: CurrentUser) -> HttpResponse {
    HttpResponse::Ok().json(UserResponse::from(user.0))
}

/// The caller resolved from `Authorization: Bearer <token>`.
pub struct CurrentUser(pub User);

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let token = bearer_token(req).map(str::to_owned);
        let state = req.app_data::<web::Data<AppState>>().cloned();

        Box::pin(async move {
            let token = token?;
            let state = state.ok_or_else(|| {
                AppError::InternalError("Application state is not configured".into())
            })?;
            let user = state.auth_service.resolve_caller(&token).await?;
            Ok(CurrentUser(user))
        })
    }
}

fn bearer_token(req: &HttpRequest) -> Result<&str, AuthError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    // Auth schemes are case-insensitive.
    match header.trim().split_once(char::is_whitespace) {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            Ok(token.trim())
        }
        _ => Err(AuthError::MissingToken),
    }
}
