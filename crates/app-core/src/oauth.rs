//! OAuth 2.0 / OpenID Connect authorization-code flow with PKCE.

use std::borrow::Cow;
use std::time::Duration;

use oauth2::basic::BasicClient;
pub use oauth2::{CsrfToken, PkceCodeVerifier};
use oauth2::{AuthUrl, AuthorizationCode, ClientId, ClientSecret, PkceCodeChallenge, RedirectUrl, Scope, TokenResponse, TokenUrl};
use reqwest::{Client, redirect};
use serde::Deserialize;
use thiserror::Error;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

const SCOPES: [&str; 3] = ["openid", "email", "profile"];

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("Invalid URL format: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// The provider refused the request, either on the consent screen or at
    /// the token endpoint.
    #[error("Provider rejected the request: {code}")]
    Provider { code: String, description: Option<String> },

    #[error("Callback carried no authorization code")]
    MissingCode,

    #[error("CSRF state is missing or does not match")]
    StateMismatch,

    #[error("Userinfo endpoint responded with {0}")]
    UserInfo(reqwest::StatusCode),

    #[error("Failed to parse user profile response")]
    ProfileParse,
}

impl OAuthError {
    /// Short machine-readable code shown to the user on the error page.
    pub fn code(&self) -> &str {
        match self {
            OAuthError::InvalidUrl(_) => "invalid_redirect_uri",
            OAuthError::HttpClient(_) => "provider_unavailable",
            OAuthError::Provider { code, .. } => code,
            OAuthError::MissingCode => "missing_code",
            OAuthError::StateMismatch => "mismatching_state",
            OAuthError::UserInfo(_) | OAuthError::ProfileParse => "invalid_userinfo",
        }
    }
}

pub struct AuthorizationDetails {
    pub url: String,
    pub csrf_token: CsrfToken,
    pub pkce_verifier: PkceCodeVerifier,
}

/// Identity claims returned by the provider's userinfo endpoint.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct OAuthUserProfile {
    #[serde(rename = "sub")]
    pub provider_user_id: String,
    pub email: String,
    pub name: Option<String>,
    #[serde(rename = "picture")]
    pub avatar_url: Option<String>,
}

#[async_trait::async_trait]
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait OAuthProvider: Send + Sync {
    /// Builds the consent screen URL for a login that returns to
    /// `redirect_uri`, together with the CSRF and PKCE secrets.
    fn get_authorization_details(&self, redirect_uri: &str) -> Result<AuthorizationDetails, OAuthError>;

    /// Exchanges an authorization code for an access token. `redirect_uri`
    /// must be the one used to build the authorization URL.
    async fn exchange_code(
        &self,
        code: String,
        pkce_verifier_secret: String,
        redirect_uri: String,
    ) -> Result<String, OAuthError>;

    /// Fetches the user's identity claims with an access token.
    async fn get_user_profile(&self, access_token: &str) -> Result<OAuthUserProfile, OAuthError>;
}

#[derive(Debug, Clone)]
pub struct ProviderEndpoints {
    pub auth_url: String,
    pub token_url: String,
    pub userinfo_url: String,
}

impl ProviderEndpoints {
    pub fn google() -> Self {
        Self {
            auth_url: GOOGLE_AUTH_URL.to_string(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
            userinfo_url: GOOGLE_USERINFO_URL.to_string(),
        }
    }
}

#[derive(Debug)]
pub struct GoogleOAuthProvider {
    client_id: ClientId,
    client_secret: ClientSecret,
    auth_url: AuthUrl,
    token_url: TokenUrl,
    userinfo_url: url::Url,
    http: Client,
}

impl GoogleOAuthProvider {
    pub fn new(client_id: String, client_secret: String, timeout: Duration) -> Result<Self, OAuthError> {
        Self::with_endpoints(client_id, client_secret, ProviderEndpoints::google(), timeout)
    }

    pub fn with_endpoints(
        client_id: String,
        client_secret: String,
        endpoints: ProviderEndpoints,
        timeout: Duration,
    ) -> Result<Self, OAuthError> {
        // The token endpoint must never be followed through redirects.
        let http = Client::builder().redirect(redirect::Policy::none()).timeout(timeout).build()?;

        Ok(Self {
            client_id: ClientId::new(client_id),
            client_secret: ClientSecret::new(client_secret),
            auth_url: AuthUrl::new(endpoints.auth_url)?,
            token_url: TokenUrl::new(endpoints.token_url)?,
            userinfo_url: url::Url::parse(&endpoints.userinfo_url)?,
            http,
        })
    }
}

#[async_trait::async_trait]
impl OAuthProvider for GoogleOAuthProvider {
    fn get_authorization_details(&self, redirect_uri: &str) -> Result<AuthorizationDetails, OAuthError> {
        let redirect_url = RedirectUrl::new(redirect_uri.to_string())?;
        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let (auth_url, csrf_token) = BasicClient::new(self.client_id.clone())
            .set_client_secret(self.client_secret.clone())
            .set_auth_uri(self.auth_url.clone())
            .set_token_uri(self.token_url.clone())
            .authorize_url(CsrfToken::new_random)
            .add_scopes(SCOPES.iter().map(|s| Scope::new(s.to_string())))
            .set_pkce_challenge(pkce_challenge)
            .set_redirect_uri(Cow::Owned(redirect_url))
            .url();

        tracing::debug!(url = %auth_url, "Generated authorization URL");

        Ok(AuthorizationDetails { url: auth_url.to_string(), csrf_token, pkce_verifier })
    }

    async fn exchange_code(
        &self,
        code: String,
        pkce_verifier_secret: String,
        redirect_uri: String,
    ) -> Result<String, OAuthError> {
        let redirect_url = RedirectUrl::new(redirect_uri)?;

        let token_result = BasicClient::new(self.client_id.clone())
            .set_client_secret(self.client_secret.clone())
            .set_auth_uri(self.auth_url.clone())
            .set_token_uri(self.token_url.clone())
            .exchange_code(AuthorizationCode::new(code))
            .set_pkce_verifier(PkceCodeVerifier::new(pkce_verifier_secret))
            .set_redirect_uri(Cow::Owned(redirect_url))
            .request_async(&self.http)
            .await
            .map_err(|e| {
                let err = match e {
                    oauth2::RequestTokenError::ServerResponse(resp) => OAuthError::Provider {
                        code: resp.error().to_string(),
                        description: resp.error_description().cloned(),
                    },
                    oauth2::RequestTokenError::Parse(_, body) => {
                        tracing::error!(body = %String::from_utf8_lossy(&body), "Unparseable token response");
                        OAuthError::Provider { code: "invalid_token_response".to_string(), description: None }
                    },
                    other => {
                        tracing::error!("Token exchange request failed: {:?}", other);
                        OAuthError::Provider { code: "token_request_failed".to_string(), description: None }
                    },
                };
                tracing::warn!(code = err.code(), "OAuth token exchange failed");
                err
            })?;

        Ok(token_result.access_token().secret().to_string())
    }

    async fn get_user_profile(&self, access_token: &str) -> Result<OAuthUserProfile, OAuthError> {
        let response = self.http.get(self.userinfo_url.clone()).bearer_auth(access_token).send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = %status, "Userinfo request rejected");
            return Err(OAuthError::UserInfo(status));
        }

        response.json().await.map_err(|_| OAuthError::ProfileParse)
    }
}
