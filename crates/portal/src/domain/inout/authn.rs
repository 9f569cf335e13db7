use crate::domain::entity::profile::UserProfile;

// ╔════════════════════════════╗
// ║        Begin Login         ║
// ╚════════════════════════════╝

#[derive(Debug)]
pub struct BeginLoginInput {
    /// Absolute URL of this application's callback route.
    pub redirect_uri: String,
}

#[derive(Debug)]
pub struct BeginLoginOutput {
    pub auth_url: String,
    pub csrf_token: String,
    pub pkce_verifier: String,
}

// ╔════════════════════════════╗
// ║       Complete Login       ║
// ╚════════════════════════════╝

#[derive(Debug)]
pub struct CompleteLoginInput {
    pub code: String,
    pub pkce_verifier_secret: String,
    pub redirect_uri: String,
}

#[derive(Debug)]
pub struct CompleteLoginOutput {
    pub profile: UserProfile,
    /// False when the profile could not be written to the repository.
    pub persisted: bool,
}
