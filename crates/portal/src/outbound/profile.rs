use std::sync::Arc;
use std::time::Duration;

use app_core::error::AppError;
use app_core::uid::Generator;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::domain::entity::profile::UserProfile;

/// Append-only store of login profiles.
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait ProfileRepository: Send + Sync {
    /// Persists `profile` as a new document and returns the document ID.
    /// Existing documents for the same user are left untouched.
    async fn create_document(&self, profile: &UserProfile) -> Result<String, AppError>;
}

#[derive(Debug, Clone)]
pub struct AppwriteSettings {
    /// API root, e.g. `https://cloud.appwrite.io/v1`.
    pub endpoint: String,
    pub project_id: String,
    pub api_key: String,
    pub database_id: String,
    pub collection_id: String,
}

/// [`ProfileRepository`] backed by an Appwrite database collection, through
/// its REST API.
pub struct AppwriteProfileRepository {
    http: Client,
    settings: AppwriteSettings,
    uid: Arc<dyn Generator>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateDocumentRequest<'a> {
    document_id: String,
    data: &'a UserProfile,
}

impl AppwriteProfileRepository {
    pub fn new(settings: AppwriteSettings, uid: Arc<dyn Generator>, timeout: Duration) -> Result<Self, AppError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, settings, uid })
    }

    fn documents_url(&self) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents",
            self.settings.endpoint.trim_end_matches('/'),
            self.settings.database_id,
            self.settings.collection_id,
        )
    }
}

#[async_trait]
impl ProfileRepository for AppwriteProfileRepository {
    async fn create_document(&self, profile: &UserProfile) -> Result<String, AppError> {
        let document_id = self.uid.generate()?;

        let response = self
            .http
            .post(self.documents_url())
            .header("X-Appwrite-Project", &self.settings.project_id)
            .header("X-Appwrite-Key", &self.settings.api_key)
            .json(&CreateDocumentRequest { document_id: document_id.clone(), data: profile })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream { status, body });
        }

        tracing::info!(document_id = %document_id, user_id = %profile.user_id, "Stored login profile");

        Ok(document_id)
    }
}
