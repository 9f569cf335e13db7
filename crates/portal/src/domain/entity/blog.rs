/// A post as returned by the content platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlogPost {
    pub title: String,
    pub url: String,
    pub markdown: Option<String>,
}

/// The projection handed back to search callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlogSummary {
    pub title: String,
    pub blog_url: String,
}

impl From<BlogPost> for BlogSummary {
    fn from(post: BlogPost) -> Self {
        Self { title: post.title, blog_url: post.url }
    }
}
