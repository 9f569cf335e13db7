use std::sync::Arc;

use app_core::error::AppError;
use app_core::oauth::OAuthProvider;
use async_trait::async_trait;

use crate::domain::entity::profile::UserProfile;
use crate::domain::inout::prelude::*;
use crate::outbound::profile::ProfileRepository;

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait AuthnUseCase: Send + Sync {
    async fn begin_login(&self, input: BeginLoginInput) -> Result<BeginLoginOutput, AppError>;
    async fn complete_login(&self, input: CompleteLoginInput) -> Result<CompleteLoginOutput, AppError>;
}

#[derive(Clone)]
pub struct AuthnService {
    oauth: Arc<dyn OAuthProvider>,
    profiles: Arc<dyn ProfileRepository>,
}

impl AuthnService {
    pub fn new(oauth: Arc<dyn OAuthProvider>, profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { oauth, profiles }
    }

    /// Appends the profile to the repository. A failed write is logged and
    /// reported as `false`; it never fails the login.
    async fn persist_profile(&self, profile: &UserProfile) -> bool {
        match self.profiles.create_document(profile).await {
            Ok(_) => true,
            Err(err) => {
                tracing::error!(user_id = %profile.user_id, error = ?err, "Failed to persist login profile");
                false
            },
        }
    }
}

#[async_trait]
impl AuthnUseCase for AuthnService {
    async fn begin_login(&self, input: BeginLoginInput) -> Result<BeginLoginOutput, AppError> {
        let details = self.oauth.get_authorization_details(&input.redirect_uri)?;

        Ok(BeginLoginOutput {
            auth_url: details.url,
            csrf_token: details.csrf_token.secret().to_string(),
            pkce_verifier: details.pkce_verifier.secret().to_string(),
        })
    }

    async fn complete_login(&self, input: CompleteLoginInput) -> Result<CompleteLoginOutput, AppError> {
        let access_token = self
            .oauth
            .exchange_code(input.code, input.pkce_verifier_secret, input.redirect_uri)
            .await?;

        let claims = self.oauth.get_user_profile(&access_token).await?;
        let profile = UserProfile::from(claims);

        let persisted = self.persist_profile(&profile).await;

        Ok(CompleteLoginOutput { profile, persisted })
    }
}

#[cfg(test)]
mod tests {
    use app_core::oauth::{
        AuthorizationDetails, CsrfToken, MockOAuthProvider, OAuthError, OAuthUserProfile, PkceCodeVerifier,
    };
    use mockall::predicate::*;

    use super::*;
    use crate::outbound::profile::MockProfileRepository;

    fn claims() -> OAuthUserProfile {
        OAuthUserProfile {
            provider_user_id: "sub-1".to_string(),
            email: "ada@example.com".to_string(),
            name: Some("Ada".to_string()),
            avatar_url: Some("https://example.com/a.png".to_string()),
        }
    }

    fn expected_profile() -> UserProfile {
        UserProfile {
            user_id: "sub-1".to_string(),
            email: "ada@example.com".to_string(),
            name: "Ada".to_string(),
            picture: "https://example.com/a.png".to_string(),
        }
    }

    fn input() -> CompleteLoginInput {
        CompleteLoginInput {
            code: "code-123".to_string(),
            pkce_verifier_secret: "verifier".to_string(),
            redirect_uri: "http://localhost:8000/auth".to_string(),
        }
    }

    fn provider_returning_claims() -> MockOAuthProvider {
        let mut oauth = MockOAuthProvider::new();
        oauth
            .expect_exchange_code()
            .with(eq("code-123".to_string()), eq("verifier".to_string()), eq("http://localhost:8000/auth".to_string()))
            .times(1)
            .returning(|_, _, _| Box::pin(async move { Ok("access-token".to_string()) }));
        oauth
            .expect_get_user_profile()
            .with(eq("access-token"))
            .times(1)
            .returning(|_| Box::pin(async move { Ok(claims()) }));
        oauth
    }

    #[tokio::test]
    async fn test_begin_login_exposes_secrets() {
        let mut oauth = MockOAuthProvider::new();
        oauth
            .expect_get_authorization_details()
            .with(eq("http://localhost:8000/auth"))
            .returning(|_| {
                Ok(AuthorizationDetails {
                    url: "https://accounts.example.com/auth?state=csrf".to_string(),
                    csrf_token: CsrfToken::new("csrf".to_string()),
                    pkce_verifier: PkceCodeVerifier::new("verifier".to_string()),
                })
            });
        let service = AuthnService::new(Arc::new(oauth), Arc::new(MockProfileRepository::new()));

        let output = service
            .begin_login(BeginLoginInput { redirect_uri: "http://localhost:8000/auth".to_string() })
            .await
            .unwrap();

        assert_eq!(output.auth_url, "https://accounts.example.com/auth?state=csrf");
        assert_eq!(output.csrf_token, "csrf");
        assert_eq!(output.pkce_verifier, "verifier");
    }

    #[tokio::test]
    async fn test_complete_login_persists_profile() {
        let mut profiles = MockProfileRepository::new();
        profiles
            .expect_create_document()
            .withf(|profile| *profile == expected_profile())
            .times(1)
            .returning(|_| Box::pin(async move { Ok("doc-1".to_string()) }));
        let service = AuthnService::new(Arc::new(provider_returning_claims()), Arc::new(profiles));

        let output = service.complete_login(input()).await.unwrap();

        assert_eq!(output.profile, expected_profile());
        assert!(output.persisted);
    }

    #[tokio::test]
    async fn test_complete_login_survives_repository_failure() {
        let mut profiles = MockProfileRepository::new();
        profiles
            .expect_create_document()
            .times(1)
            .returning(|_| Box::pin(async move { Err(AppError::Internal) }));
        let service = AuthnService::new(Arc::new(provider_returning_claims()), Arc::new(profiles));

        let output = service.complete_login(input()).await.unwrap();

        assert_eq!(output.profile, expected_profile());
        assert!(!output.persisted);
    }

    #[tokio::test]
    async fn test_complete_login_provider_rejection() {
        let mut oauth = MockOAuthProvider::new();
        oauth.expect_exchange_code().returning(|_, _, _| {
            Box::pin(async move { Err(OAuthError::Provider { code: "invalid_grant".to_string(), description: None }) })
        });
        oauth.expect_get_user_profile().never();
        let mut profiles = MockProfileRepository::new();
        profiles.expect_create_document().never();
        let service = AuthnService::new(Arc::new(oauth), Arc::new(profiles));

        let err = service.complete_login(input()).await.unwrap_err();

        assert!(matches!(err, AppError::OAuth(ref e) if e.code() == "invalid_grant"));
    }
}
