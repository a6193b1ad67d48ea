//! Errors raised by the keyed collections.
//!
//! Every variant signals an integrity bug in the caller (adding a key twice,
//! removing something that is not there, subscribing a member twice). They
//! are returned as `Err` so callers can propagate them with `?`.

use std::fmt::Display;

use thiserror::Error;

/// A type alias for `Result<T, CollectionError>`.
pub type Result<T> = std::result::Result<T, CollectionError>;

/// Integrity violation in a [`Lookup`](crate::lookup::Lookup) or
/// [`LookupGroup`](crate::group::LookupGroup).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollectionError {
    #[error("duplicate key `{key}`")]
    DuplicateKey { key: String },

    #[error("no item with key `{key}`")]
    MissingKey { key: String },

    #[error("member `{name}` is already subscribed")]
    AlreadySubscribed { name: String },

    #[error("member `{name}` is not subscribed")]
    NotSubscribed { name: String },

    #[error("member `{name}` collides with existing key `{key}`")]
    KeyCollision { name: String, key: String },
}

impl CollectionError {
    pub fn duplicate_key(key: impl Display) -> Self {
        Self::DuplicateKey {
            key: key.to_string(),
        }
    }

    pub fn missing_key(key: impl Display) -> Self {
        Self::MissingKey {
            key: key.to_string(),
        }
    }

    pub fn already_subscribed(name: impl Display) -> Self {
        Self::AlreadySubscribed {
            name: name.to_string(),
        }
    }

    pub fn not_subscribed(name: impl Display) -> Self {
        Self::NotSubscribed {
            name: name.to_string(),
        }
    }

    pub fn key_collision(name: impl Display, key: impl Display) -> Self {
        Self::KeyCollision {
            name: name.to_string(),
            key: key.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            CollectionError::duplicate_key("a").to_string(),
            "duplicate key `a`"
        );
        assert_eq!(
            CollectionError::key_collision("b", "x").to_string(),
            "member `b` collides with existing key `x`"
        );
    }
}
