use std::sync::Arc;

use app_core::config::Config;
use app_core::session::SessionSettings;
use axum::extract::FromRef;

use crate::usecase::authn::AuthnUseCase;
use crate::usecase::search::SearchUseCase;

#[derive(Clone)]
pub struct PortalState {
    pub session: SessionSettings,
    pub config: Arc<Config>,
    pub authn: Arc<dyn AuthnUseCase>,
    pub search: Arc<dyn SearchUseCase>,
}

impl PortalState {
    pub fn new(
        session: SessionSettings,
        config: Arc<Config>,
        authn: Arc<dyn AuthnUseCase>,
        search: Arc<dyn SearchUseCase>,
    ) -> Self {
        Self { session, config, authn, search }
    }
}

impl FromRef<PortalState> for SessionSettings {
    fn from_ref(state: &PortalState) -> Self {
        state.session.clone()
    }
}

#[cfg(test)]
mod tests {
    use app_core::config::test_utils::TestConfigBuilder;
    use tower_cookies::Key;

    use super::*;
    use crate::usecase::authn::MockAuthnUseCase;
    use crate::usecase::search::MockSearchUseCase;

    #[test]
    fn test_portal_state_new() {
        let key = Key::generate();
        let authn: Arc<dyn AuthnUseCase> = Arc::new(MockAuthnUseCase::new());
        let search: Arc<dyn SearchUseCase> = Arc::new(MockSearchUseCase::new());
        let config = Arc::new(TestConfigBuilder::new().build());

        let state = PortalState::new(SessionSettings::new(key.clone()), config, authn.clone(), search.clone());

        assert!(Arc::ptr_eq(&state.authn, &authn));
        assert!(Arc::ptr_eq(&state.search, &search));
        assert_eq!(SessionSettings::from_ref(&state).key().master(), key.master());
    }
}
