//! Cookie-backed sessions.
//!
//! The whole session is a JSON object stored in one private (encrypted and
//! authenticated) cookie. Handlers receive it through the [`Session`]
//! extractor, which requires [`tower_cookies::CookieManagerLayer`] and
//! [`SessionSettings`] reachable from the router state.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tower_cookies::cookie::{SameSite, time};
use tower_cookies::{Cookie, Cookies, Key};

use super::error::AppError;

pub const DEFAULT_COOKIE_NAME: &str = "session";
pub const DEFAULT_MAX_AGE_SECS: i64 = 14 * 24 * 60 * 60;

#[derive(Clone)]
pub struct SessionSettings {
    key: Key,
    cookie_name: String,
    max_age_secs: i64,
    secure: bool,
}

impl SessionSettings {
    pub fn new(key: Key) -> Self {
        Self { key, cookie_name: DEFAULT_COOKIE_NAME.to_string(), max_age_secs: DEFAULT_MAX_AGE_SECS, secure: false }
    }

    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    pub fn with_max_age_secs(mut self, secs: i64) -> Self {
        self.max_age_secs = secs;
        self
    }

    /// Marks the cookie `Secure`; enable when served over HTTPS only.
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn key(&self) -> &Key {
        &self.key
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub fn is_secure(&self) -> bool {
        self.secure
    }
}

/// Per-request view of the session. Every mutation is written back to the
/// cookie jar immediately; the cookie manager layer emits it with the
/// response.
pub struct Session {
    cookies: Cookies,
    settings: SessionSettings,
    data: Map<String, Value>,
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
    SessionSettings: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let cookies = Cookies::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| AppError::Session(msg.to_string()))?;
        let settings = SessionSettings::from_ref(state);

        // A cookie that fails decryption is dropped by the private jar, so a
        // tampered session reads as an empty one.
        let data = match cookies.private(&settings.key).get(&settings.cookie_name) {
            Some(cookie) => serde_json::from_str::<Map<String, Value>>(cookie.value()).unwrap_or_else(|err| {
                tracing::warn!("Discarding unreadable session cookie: {}", err);
                Map::new()
            }),
            None => Map::new(),
        };

        Ok(Self { cookies, settings, data })
    }
}

impl Session {
    /// Returns the value under `key`, or `None` when it is absent or does not
    /// deserialize into `T`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.data.get(key).cloned().and_then(|value| serde_json::from_value(value).ok())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn insert<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), AppError> {
        self.data.insert(key.to_string(), serde_json::to_value(value)?);
        self.save();
        Ok(())
    }

    /// Removes `key`, returning its previous value. Removing an absent key is
    /// a no-op.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let removed = self.data.remove(key);
        if removed.is_some() {
            self.save();
        }
        removed
    }

    /// Drops every key and expires the cookie.
    pub fn clear(&mut self) {
        self.data.clear();
        self.save();
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn save(&self) {
        let jar = self.cookies.private(&self.settings.key);

        if self.data.is_empty() {
            jar.remove(Cookie::build((self.settings.cookie_name.clone(), "")).path("/").build());
            return;
        }

        let value = Value::Object(self.data.clone()).to_string();
        let cookie = Cookie::build((self.settings.cookie_name.clone(), value))
            .http_only(true)
            .secure(self.settings.secure)
            .path("/")
            .max_age(time::Duration::seconds(self.settings.max_age_secs))
            .same_site(SameSite::Lax)
            .build();

        jar.add(cookie);
    }
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use axum::response::Response;
    use axum::routing::get;
    use serde::Deserialize;
    use tower::ServiceExt;
    use tower_cookies::CookieManagerLayer;

    use super::*;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Visitor {
        name: String,
    }

    fn settings() -> SessionSettings {
        SessionSettings::new(Key::generate())
    }

    fn app(settings: SessionSettings) -> Router {
        Router::new()
            .route(
                "/set",
                get(|mut session: Session| async move {
                    session.insert("visitor", &Visitor { name: "ada".to_string() }).unwrap();
                    StatusCode::NO_CONTENT
                }),
            )
            .route(
                "/get",
                get(|session: Session| async move {
                    session.get::<Visitor>("visitor").map(|v| v.name).unwrap_or_else(|| "anonymous".to_string())
                }),
            )
            .route(
                "/remove",
                get(|mut session: Session| async move {
                    let removed = session.remove("visitor").is_some();
                    session.clear();
                    removed.to_string()
                }),
            )
            .layer(CookieManagerLayer::new())
            .with_state(settings)
    }

    fn session_cookie(response: &Response) -> Option<String> {
        response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with(&format!("{DEFAULT_COOKIE_NAME}=")))
            .map(|v| v.split(';').next().unwrap_or_default().to_string())
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn request(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_insert_then_get_across_requests() {
        let app = app(settings());

        let response = app.clone().oneshot(request("/set", None)).await.unwrap();
        let cookie = session_cookie(&response).expect("session cookie set");
        let raw = response.headers()[header::SET_COOKIE].to_str().unwrap().to_string();
        assert!(raw.contains("HttpOnly"));
        assert!(raw.contains("SameSite=Lax"));
        assert!(!cookie.contains("visitor"), "cookie value must be encrypted");

        let response = app.oneshot(request("/get", Some(&cookie))).await.unwrap();
        assert_eq!(body_text(response).await, "ada");
    }

    #[tokio::test]
    async fn test_cookie_from_other_key_is_ignored() {
        let response = app(settings()).oneshot(request("/set", None)).await.unwrap();
        let cookie = session_cookie(&response).unwrap();

        let response = app(settings()).oneshot(request("/get", Some(&cookie))).await.unwrap();

        assert_eq!(body_text(response).await, "anonymous");
    }

    #[tokio::test]
    async fn test_remove_absent_key_is_noop() {
        let response = app(settings()).oneshot(request("/remove", None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "false");
    }

    #[tokio::test]
    async fn test_clear_expires_cookie() {
        let app = app(settings());
        let response = app.clone().oneshot(request("/set", None)).await.unwrap();
        let cookie = session_cookie(&response).unwrap();

        let response = app.clone().oneshot(request("/remove", Some(&cookie))).await.unwrap();
        let removal = response.headers()[header::SET_COOKIE].to_str().unwrap().to_string();
        assert!(removal.starts_with(&format!("{DEFAULT_COOKIE_NAME}=;")));
        assert!(removal.contains("Max-Age=0"));
        assert_eq!(body_text(response).await, "true");
    }

    #[tokio::test]
    async fn test_missing_cookie_layer_is_internal_error() {
        let app = Router::new().route("/get", get(|_session: Session| async { "unreachable" })).with_state(settings());

        let response = app.oneshot(request("/get", None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
