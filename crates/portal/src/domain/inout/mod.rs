pub mod authn;
pub mod search;

pub mod prelude {
    pub use super::authn::*;
    pub use super::search::*;
}
