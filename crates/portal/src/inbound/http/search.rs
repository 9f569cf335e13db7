use app_core::extractors::AppJson;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::{Json, debug_handler};

use crate::domain::inout::prelude::*;
use crate::inbound::model::prelude::*;
use crate::inbound::state::PortalState;

#[debug_handler]
pub async fn search_blogs(
    State(state): State<PortalState>,
    AppJson(req): AppJson<SearchBlogsRequest>,
) -> impl IntoResponse {
    state
        .search
        .search(SearchInput { slug: req.slug })
        .await
        .map(SearchBlogsResponse::from)
        .map(Json)
}
