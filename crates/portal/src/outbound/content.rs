use std::time::Duration;

use app_core::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::entity::blog::BlogPost;

pub const HASHNODE_ENDPOINT: &str = "https://gql.hashnode.com";
pub const DEFAULT_SORT_BY: &str = "recent";

const TAG_POSTS_QUERY: &str = r#"
query TagPosts($slug: String!, $first: Int!, $filter: TagPostConnectionFilter!) {
  tag(slug: $slug) {
    posts(first: $first, filter: $filter) {
      edges {
        node {
          title
          url
          content {
            markdown
          }
        }
      }
    }
  }
}
"#;

/// A third-party content platform that lists posts by tag.
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait ContentSource: Send + Sync {
    /// Returns at most `first` posts tagged with `slug`, in platform order.
    /// An unknown tag yields an empty list.
    async fn tag_posts(&self, slug: &str, first: u32) -> Result<Vec<BlogPost>, AppError>;
}

/// [`ContentSource`] backed by the Hashnode GraphQL API.
pub struct HashnodeClient {
    http: Client,
    endpoint: String,
    sort_by: String,
}

#[derive(Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: serde_json::Value,
}

#[derive(Deserialize)]
struct GraphQlResponse {
    data: Option<TagData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Deserialize)]
struct TagData {
    tag: Option<Tag>,
}

#[derive(Deserialize)]
struct Tag {
    posts: Option<PostConnection>,
}

#[derive(Deserialize)]
struct PostConnection {
    #[serde(default)]
    edges: Option<Vec<PostEdge>>,
}

#[derive(Deserialize)]
struct PostEdge {
    node: PostNode,
}

#[derive(Deserialize)]
struct PostNode {
    title: String,
    url: String,
    content: Option<PostContent>,
}

#[derive(Deserialize)]
struct PostContent {
    markdown: Option<String>,
}

impl HashnodeClient {
    pub fn new(endpoint: String, sort_by: String, timeout: Duration) -> Result<Self, AppError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, endpoint, sort_by })
    }
}

#[async_trait]
impl ContentSource for HashnodeClient {
    async fn tag_posts(&self, slug: &str, first: u32) -> Result<Vec<BlogPost>, AppError> {
        let request = GraphQlRequest {
            query: TAG_POSTS_QUERY,
            variables: json!({
                "slug": slug,
                "first": first,
                "filter": { "sortBy": self.sort_by },
            }),
        };

        let response = self.http.post(&self.endpoint).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, slug, "Content platform rejected tag query");
            return Err(AppError::Upstream { status, body });
        }

        let payload: GraphQlResponse = serde_json::from_slice(&response.bytes().await?)?;

        for error in &payload.errors {
            tracing::warn!(slug, "GraphQL error from content platform: {}", error.message);
        }

        let edges = payload
            .data
            .and_then(|data| data.tag)
            .and_then(|tag| tag.posts)
            .and_then(|posts| posts.edges)
            .unwrap_or_default();

        Ok(edges
            .into_iter()
            .map(|edge| BlogPost {
                title: edge.node.title,
                url: edge.node.url,
                markdown: edge.node.content.and_then(|c| c.markdown),
            })
            .collect())
    }
}
