pub mod authn;
pub mod search;
