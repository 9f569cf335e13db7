use axum::Router;
use axum::routing::{get, post};

use crate::inbound::http::authn::*;
use crate::inbound::http::pages::*;
use crate::inbound::http::search::*;
use crate::inbound::state::PortalState;

/// Page, login and search routes. Requires [`tower_cookies::CookieManagerLayer`]
/// to be layered on top.
pub fn create_router(state: PortalState) -> Router {
    Router::new()
        // pages
        .route("/", get(index))
        .route("/welcome", get(welcome))
        .route("/logout", get(logout))
        // authentication
        .route("/login", get(login))
        .route(CALLBACK_PATH, get(auth_callback))
        // search
        .route("/search-blogs/", post(search_blogs))
        .with_state(state)
}
