pub mod blog;
pub mod profile;
