//! Typed access to the signed-in user kept in the session.

use app_core::error::AppError;
use app_core::session::Session;

use crate::domain::entity::profile::UserProfile;

pub const USER_KEY: &str = "user";

pub trait UserSession {
    fn get_user(&self) -> Option<UserProfile>;
    fn set_user(&mut self, user: &UserProfile) -> Result<(), AppError>;
    /// Drops the user, reporting whether one was present.
    fn remove_user(&mut self) -> bool;
}

impl UserSession for Session {
    fn get_user(&self) -> Option<UserProfile> {
        self.get(USER_KEY)
    }

    fn set_user(&mut self, user: &UserProfile) -> Result<(), AppError> {
        self.insert(USER_KEY, user)
    }

    fn remove_user(&mut self) -> bool {
        self.remove(USER_KEY).is_some()
    }
}
