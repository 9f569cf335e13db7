use app_core::error::AppError;
use app_core::extractors::AppQuery;
use app_core::oauth::OAuthError;
use app_core::session::Session;
use axum::debug_handler;
use axum::extract::State;
use axum::http::{HeaderMap, header};
use axum::response::{IntoResponse, Response};
use tower_cookies::cookie::{SameSite, time};
use tower_cookies::{Cookie, Cookies};

use super::found;
use crate::domain::inout::prelude::*;
use crate::inbound::model::prelude::*;
use crate::inbound::session::UserSession;
use crate::inbound::state::PortalState;
use crate::inbound::view;

pub const COOKIE_OAUTH_STATE: &str = "__oauth_state";
pub const CALLBACK_PATH: &str = "/auth";

const OAUTH_STATE_MAX_AGE_MINUTES: i64 = 3;

#[debug_handler]
pub async fn login(
    State(state): State<PortalState>,
    cookies: Cookies,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let redirect_uri = match callback_url(&headers) {
        Some(url) => url,
        None => state
            .config
            .get::<String>("oauth.google.redirect_uri")
            .map_err(|_| AppError::RequestFormat("Cannot determine the OAuth callback URL".to_string()))?,
    };

    let output = state.authn.begin_login(BeginLoginInput { redirect_uri: redirect_uri.clone() }).await?;

    let value = serde_json::to_string(&OAuthStateCookie {
        csrf_token: output.csrf_token,
        pkce_verifier: output.pkce_verifier,
        redirect_uri,
    })?;

    let cookie = Cookie::build((COOKIE_OAUTH_STATE, value))
        .http_only(true)
        .secure(state.session.is_secure())
        .path("/")
        .max_age(time::Duration::minutes(OAUTH_STATE_MAX_AGE_MINUTES))
        .same_site(SameSite::Lax)
        .build();

    cookies.private(state.session.key()).add(cookie);

    Ok(found(&output.auth_url))
}

#[debug_handler(state = PortalState)]
pub async fn auth_callback(
    State(state): State<PortalState>,
    cookies: Cookies,
    mut session: Session,
    AppQuery(query): AppQuery<OAuthCallbackRequest>,
) -> Response {
    let jar = cookies.private(state.session.key());
    let stored = jar
        .get(COOKIE_OAUTH_STATE)
        .and_then(|cookie| serde_json::from_str::<OAuthStateCookie>(cookie.value()).ok());
    jar.remove(Cookie::build((COOKIE_OAUTH_STATE, "")).path("/").build());

    let input = match verify_callback(query, stored) {
        Ok(input) => input,
        Err(err) => return oauth_error_page(err),
    };

    match state.authn.complete_login(input).await {
        Ok(output) => {
            if let Err(err) = session.set_user(&output.profile) {
                return err.into_response();
            }
            tracing::info!(user_id = %output.profile.user_id, persisted = output.persisted, "User signed in");
            found("/welcome")
        },
        Err(AppError::OAuth(err)) => oauth_error_page(err),
        Err(err) => err.into_response(),
    }
}

/// Checks the provider's answer against the state stored by [`login`].
fn verify_callback(
    query: OAuthCallbackRequest,
    stored: Option<OAuthStateCookie>,
) -> Result<CompleteLoginInput, OAuthError> {
    if let Some(code) = query.error {
        return Err(OAuthError::Provider { code, description: query.error_description });
    }

    let stored = match (stored, query.state) {
        (Some(stored), Some(state)) if stored.csrf_token == state => stored,
        _ => return Err(OAuthError::StateMismatch),
    };

    let code = query.code.filter(|c| !c.is_empty()).ok_or(OAuthError::MissingCode)?;

    Ok(CompleteLoginInput { code, pkce_verifier_secret: stored.pkce_verifier, redirect_uri: stored.redirect_uri })
}

fn oauth_error_page(err: OAuthError) -> Response {
    tracing::warn!(code = err.code(), "OAuth login failed: {}", err);
    view::error_page(err.code()).into_response()
}

/// Absolute callback URL derived from the request origin, honouring reverse
/// proxy headers.
fn callback_url(headers: &HeaderMap) -> Option<String> {
    let host = first_value(headers, "x-forwarded-host").or_else(|| first_value(headers, header::HOST.as_str()))?;
    let scheme = first_value(headers, "x-forwarded-proto").unwrap_or("http");

    Some(format!("{scheme}://{host}{CALLBACK_PATH}"))
}

fn first_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}
