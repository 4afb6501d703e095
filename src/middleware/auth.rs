use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use futures::future::{ready, LocalBoxFuture};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::admin;
use crate::AppState;

/// The authenticated admin, resolved from `Authorization: Bearer <token>`.
/// Used as an extractor in protected routes; the account is re-read on every request.
#[derive(Debug, Clone)]
pub struct AuthAdmin {
    pub admin: admin::Model,
}

impl AuthAdmin {
    pub fn id(&self) -> Uuid {
        self.admin.id
    }
}

impl FromRequest for AuthAdmin {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        // 1. Extract the token synchronously, the request is not 'static
        let token = bearer_token(req);
        let state = req.app_data::<web::Data<AppState>>().cloned();

        Box::pin(async move {
            let token = token?;
            let state = state.ok_or_else(|| AppError::Internal("application state missing".to_string()))?;

            // 2. Verify signature, expiry and that the account is still active
            let admin = state.auth.verify_token(&token).await?;
            Ok(AuthAdmin { admin })
        })
    }
}

/// Like `AuthAdmin`, but anonymous when the header is missing or the token is rejected
#[derive(Debug, Clone)]
pub struct OptionalAuthAdmin(pub Option<admin::Model>);

impl OptionalAuthAdmin {
    pub fn is_admin(&self) -> bool {
        self.0.is_some()
    }
}

impl FromRequest for OptionalAuthAdmin {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        if req.headers().get(header::AUTHORIZATION).is_none() {
            return Box::pin(ready(Ok(OptionalAuthAdmin(None))));
        }

        let token = bearer_token(req);
        let state = req.app_data::<web::Data<AppState>>().cloned();

        Box::pin(async move {
            let (Ok(token), Some(state)) = (token, state) else {
                return Ok(OptionalAuthAdmin(None));
            };
            match state.auth.verify_token(&token).await {
                Ok(admin) => Ok(OptionalAuthAdmin(Some(admin))),
                Err(e) => {
                    tracing::debug!(error = %e, "optional authentication failed, continuing anonymously");
                    Ok(OptionalAuthAdmin(None))
                }
            }
        })
    }
}

fn bearer_token(req: &HttpRequest) -> Result<String, AppError> {
    let value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            AppError::Unauthorized("Authentication required. Please provide a valid token.".to_string())
        })?;

    let token = value.strip_prefix("Bearer ").ok_or_else(|| {
        AppError::Unauthorized("Authentication required. Please provide a valid token.".to_string())
    })?;

    let token = token.trim();
    if token.is_empty() {
        return Err(AppError::Unauthorized("Authentication token is missing.".to_string()));
    }
    Ok(token.to_string())
}
