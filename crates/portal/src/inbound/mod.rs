pub mod http;
pub mod model;
pub mod router;
pub mod session;
pub mod state;
pub mod view;
