use app_core::session::Session;
use axum::debug_handler;
use axum::response::{IntoResponse, Response};

use super::found;
use crate::inbound::session::UserSession;
use crate::inbound::state::PortalState;
use crate::inbound::view;

#[debug_handler(state = PortalState)]
pub async fn index(session: Session) -> Response {
    match session.get_user() {
        Some(_) => found("/welcome"),
        None => view::home_page().into_response(),
    }
}

#[debug_handler(state = PortalState)]
pub async fn welcome(session: Session) -> Response {
    match session.get_user() {
        Some(user) => view::welcome_page(&user).into_response(),
        None => found("/"),
    }
}

#[debug_handler(state = PortalState)]
pub async fn logout(mut session: Session) -> Response {
    if !session.remove_user() {
        tracing::debug!("Logout without a signed-in user");
    }
    session.clear();

    found("/")
}
