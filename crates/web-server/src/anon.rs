use crate::AppState;
use crate::error::AppError;
use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use configuration::AnonCookieConfig;
use core_types::AnonId;
use std::sync::Arc;

/// Makes sure every request carries an anonymous id.
///
/// A valid id in the cookie is reused. Otherwise a new one is generated and
/// sent back with the response.
pub async fn anon_identity(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let config = &state.settings.anon_cookie;
    let existing = jar
        .get(&config.name)
        .and_then(|cookie| AnonId::parse(cookie.value()));

    match existing {
        Some(anon) => {
            request.extensions_mut().insert(anon);
            next.run(request).await
        }
        None => {
            let anon = AnonId::generate();
            tracing::debug!(anon = %anon, "Issued a new anonymous id.");
            request.extensions_mut().insert(anon);
            let response = next.run(request).await;
            (jar.add(anon_cookie(config, anon)), response).into_response()
        }
    }
}

pub fn anon_cookie(config: &AnonCookieConfig, anon: AnonId) -> Cookie<'static> {
    Cookie::build((config.name.clone(), anon.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure)
        .max_age(time::Duration::days(config.max_age_days))
        .build()
}

/// The anonymous id of the current rater, set by [`anon_identity`].
#[derive(Debug, Clone, Copy)]
pub struct Rater(pub AnonId);

#[async_trait]
impl<S> FromRequestParts<S> for Rater
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AnonId>()
            .copied()
            .map(Rater)
            .ok_or_else(|| AppError::Internal("anonymous id middleware is not installed".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_attributes() {
        let config = AnonCookieConfig {
            max_age_days: configuration::MAX_COOKIE_AGE_DAYS,
            secure: true,
            ..Default::default()
        };
        let anon = AnonId::generate();
        let cookie = anon_cookie(&config, anon).to_string();
        assert!(cookie.starts_with(&format!("rtd_anon_id={}", anon)));
        assert!(cookie.contains("Max-Age=34560000"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("HttpOnly"));
    }
}
