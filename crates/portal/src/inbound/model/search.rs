use serde::{Deserialize, Serialize};

use crate::domain::inout::search::SearchOutput;

// ╔════════════════════════════╗
// ║        Search Blogs        ║
// ╚════════════════════════════╝

#[derive(Debug, Deserialize)]
pub struct SearchBlogsRequest {
    pub slug: String,
}

#[derive(Debug, Serialize)]
pub struct BlogPostResponse {
    pub title: String,
    pub blog_url: String,
}

#[derive(Debug, Serialize)]
pub struct SearchBlogsResponse {
    pub posts: Vec<BlogPostResponse>,
}

impl From<SearchOutput> for SearchBlogsResponse {
    fn from(output: SearchOutput) -> Self {
        Self {
            posts: output
                .posts
                .into_iter()
                .map(|post| BlogPostResponse { title: post.title, blog_url: post.blog_url })
                .collect(),
        }
    }
}
