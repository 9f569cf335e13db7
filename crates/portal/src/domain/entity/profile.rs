use app_core::oauth::OAuthUserProfile;
use serde::{Deserialize, Serialize};

/// The authenticated user, as kept in the session and appended to the profile
/// collection on every login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// The provider's subject identifier (`sub` claim).
    pub user_id: String,
    pub email: String,
    pub name: String,
    /// Avatar URL; empty when the provider shares none.
    pub picture: String,
}

impl From<OAuthUserProfile> for UserProfile {
    fn from(claims: OAuthUserProfile) -> Self {
        let name = claims
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| claims.email.clone());

        Self {
            user_id: claims.provider_user_id,
            email: claims.email,
            name,
            picture: claims.avatar_url.unwrap_or_default(),
        }
    }
}
