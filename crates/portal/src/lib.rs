mod domain;
mod inbound;
mod outbound;
mod usecase;

use std::sync::Arc;
use std::time::Duration;

use app_core::config::Config;
use app_core::error::AppError;
use app_core::oauth::OAuthProvider;
use app_core::session::SessionSettings;
use app_core::uid::Generator;
pub use inbound::router::create_router;
pub use inbound::state::PortalState;

use crate::outbound::content::{DEFAULT_SORT_BY, HASHNODE_ENDPOINT, HashnodeClient};
use crate::outbound::profile::{AppwriteProfileRepository, AppwriteSettings};
use crate::usecase::authn::AuthnService;
use crate::usecase::search::SearchService;

const DEFAULT_TIMEOUT_SECS: u64 = 10;

pub struct Dependency {
    pub config: Arc<Config>,
    pub session: SessionSettings,
    pub oauth: Arc<dyn OAuthProvider>,
    pub uid: Arc<dyn Generator>,
}

pub fn new(dep: Dependency) -> Result<PortalState, AppError> {
    let config = &dep.config;

    let profiles = Arc::new(AppwriteProfileRepository::new(
        AppwriteSettings {
            endpoint: config.get("appwrite.endpoint")?,
            project_id: config.get("appwrite.project_id")?,
            api_key: config.get("appwrite.api_key")?,
            database_id: config.get("appwrite.database_id")?,
            collection_id: config.get("appwrite.collection_id")?,
        },
        dep.uid,
        Duration::from_secs(config.get_or("appwrite.timeout_secs", DEFAULT_TIMEOUT_SECS)?),
    )?);

    let content = Arc::new(HashnodeClient::new(
        config.get_or("hashnode.endpoint", HASHNODE_ENDPOINT.to_string())?,
        config.get_or("hashnode.sort_by", DEFAULT_SORT_BY.to_string())?,
        Duration::from_secs(config.get_or("hashnode.timeout_secs", DEFAULT_TIMEOUT_SECS)?),
    )?);

    let authn_svc = Arc::new(AuthnService::new(dep.oauth, profiles));
    let search_svc = Arc::new(SearchService::new(content));

    Ok(PortalState::new(dep.session, dep.config, authn_svc, search_svc))
}
