use serde::{Deserialize, Serialize};

// ╔════════════════════════════╗
// ║       OAuth Callback       ║
// ╚════════════════════════════╝

/// Query string the provider appends when redirecting back to `/auth`.
#[derive(Debug, Deserialize)]
pub struct OAuthCallbackRequest {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Contents of the short-lived private cookie that links `/login` to `/auth`.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct OAuthStateCookie {
    pub csrf_token: String,
    pub pkce_verifier: String,
    pub redirect_uri: String,
}
