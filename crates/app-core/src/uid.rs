//! Document ID generation in the Appwrite `ID.unique()` format.
//!
//! An ID is the hex-encoded Unix seconds, followed by the microsecond part
//! zero-padded to 5 hex digits, followed by `padding` random hex digits. IDs
//! sort roughly by creation time and stay within Appwrite's 36 character
//! limit for any padding up to 23.

use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;
use uuid::Uuid;

const DEFAULT_PADDING: usize = 7;
const MAX_PADDING: usize = 23;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum UidError {
    #[error("System clock is set before the UNIX epoch")]
    ClockBeforeEpoch,

    #[error("Padding {0} exceeds the maximum of {MAX_PADDING}")]
    PaddingOutOfRange(usize),
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait Generator: Send + Sync {
    fn generate(&self) -> Result<String, UidError>;
}

#[derive(Debug, Clone)]
pub struct UniqueId {
    padding: usize,
}

impl UniqueId {
    pub fn new() -> Self {
        Self { padding: DEFAULT_PADDING }
    }

    pub fn with_padding(padding: usize) -> Result<Self, UidError> {
        if padding > MAX_PADDING {
            return Err(UidError::PaddingOutOfRange(padding));
        }
        Ok(Self { padding })
    }
}

impl Default for UniqueId {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator for UniqueId {
    fn generate(&self) -> Result<String, UidError> {
        let now = SystemTime::now().duration_since(UNIX_EPOCH).map_err(|_| UidError::ClockBeforeEpoch)?;

        let mut id = format!("{:x}{:05x}", now.as_secs(), now.subsec_micros());

        // A v4 UUID carries 122 random bits, 32 hex digits once hyphens are
        // dropped; two of them cover the maximum padding.
        let random = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
        id.push_str(&random[..self.padding]);

        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_default_id_shape() {
        let id = UniqueId::new().generate().unwrap();

        // 8 hex digits of seconds until 2106, 5 of micros, 7 of padding.
        assert_eq!(id.len(), 20);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_ids_are_unique() {
        let generator = UniqueId::new();
        let ids: HashSet<String> = (0..1000).map(|_| generator.generate().unwrap()).collect();

        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_custom_padding() {
        let id = UniqueId::with_padding(MAX_PADDING).unwrap().generate().unwrap();

        assert_eq!(id.len(), 13 + MAX_PADDING);
        assert!(id.len() <= 36);
    }

    #[test]
    fn test_padding_out_of_range() {
        assert_eq!(UniqueId::with_padding(24).unwrap_err(), UidError::PaddingOutOfRange(24));
    }
}
