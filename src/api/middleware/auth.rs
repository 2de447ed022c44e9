//! Session authentication middleware.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    extract::CookieJar,
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::api::AppState;
use crate::config::AUTH_COOKIE_NAME;
use common::AppError;

/// Resolve the caller and inject their `Identity` into request extensions.
///
/// The token is taken from `Authorization: Bearer …` or, failing that, from
/// the session cookie set at login.
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = match (&bearer, jar.get(AUTH_COOKIE_NAME)) {
        (Some(TypedHeader(Authorization(bearer))), _) => bearer.token().to_string(),
        (None, Some(cookie)) => cookie.value().to_string(),
        (None, None) => return Err(AppError::Unauthorized),
    };

    let identity = state.auth_service.verify(&token).await.map_err(|err| {
        tracing::debug!(error = %err, "Rejected session token");
        AppError::Unauthorized
    })?;

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}
