//! User domain model

use serde::{Deserialize, Serialize};

/// A registered bank user
///
/// The lowercase form of the username is the identity key: registration
/// stores it lowercased and every lookup compares lowercase. The password
/// is stored as given - the users store format is `username password`,
/// one line per user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub password: String,
}

impl User {
    /// Create a new user, normalizing the username to lowercase
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into().to_lowercase(),
            password: password.into(),
        }
    }

    /// Case-insensitive username match
    pub fn is_named(&self, username: &str) -> bool {
        self.username == username.to_lowercase()
    }

    /// Validate a candidate username
    ///
    /// Usernames are single whitespace-free tokens so the flat stores can
    /// stay whitespace-delimited.
    pub fn validate_username(username: &str) -> Result<(), &'static str> {
        if username.is_empty() {
            return Err("username cannot be empty");
        }
        if username.chars().any(char::is_whitespace) {
            return Err("username cannot contain whitespace");
        }
        Ok(())
    }
}
