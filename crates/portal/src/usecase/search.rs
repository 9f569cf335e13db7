use std::sync::Arc;

use app_core::error::AppError;
use async_trait::async_trait;
use validator::Validate;

use crate::domain::entity::blog::BlogSummary;
use crate::domain::inout::prelude::*;
use crate::outbound::content::ContentSource;

/// Number of posts requested from the content platform per search.
pub const PAGE_SIZE: u32 = 10;

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait SearchUseCase: Send + Sync {
    async fn search(&self, input: SearchInput) -> Result<SearchOutput, AppError>;
}

#[derive(Clone)]
pub struct SearchService {
    content: Arc<dyn ContentSource>,
}

impl SearchService {
    pub fn new(content: Arc<dyn ContentSource>) -> Self {
        Self { content }
    }
}

#[async_trait]
impl SearchUseCase for SearchService {
    async fn search(&self, input: SearchInput) -> Result<SearchOutput, AppError> {
        input.validate()?;

        let posts = self.content.tag_posts(&input.slug, PAGE_SIZE).await?;
        let needle = input.slug.to_lowercase();

        let posts: Vec<BlogSummary> = posts
            .into_iter()
            .filter(|post| post.title.to_lowercase().contains(&needle))
            .map(BlogSummary::from)
            .collect();

        tracing::debug!(slug = %input.slug, matched = posts.len(), "Tag search finished");

        Ok(SearchOutput { posts })
    }
}
