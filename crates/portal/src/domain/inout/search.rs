use validator::Validate;

use crate::domain::entity::blog::BlogSummary;

// ╔════════════════════════════╗
// ║        Search Blogs        ║
// ╚════════════════════════════╝

#[derive(Debug, Validate)]
pub struct SearchInput {
    #[validate(length(min = 1, max = 100, message = "must be between 1 and 100 characters long"))]
    pub slug: String,
}

#[derive(Debug, PartialEq)]
pub struct SearchOutput {
    pub posts: Vec<BlogSummary>,
}
