//! Request and response bodies for the auth endpoints, plus the field
//! checks applied before any store access.

use serde::{Deserialize, Serialize};

use crate::db::User;
use crate::error::ValidationError;

pub const NAME_MAX_CHARS: usize = 100;
pub const PASSWORD_MIN_CHARS: usize = 6;

const EMAIL_MAX_CHARS: usize = 254;
const EMAIL_LOCAL_MAX_CHARS: usize = 64;
const EMAIL_LOCAL_SPECIALS: &str = "!#$%&'*+-/=?^_`{|}~.";

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    /// Checks every field and returns the request with its email normalised.
    pub fn validate(self) -> Result<Self, ValidationError> {
        let mut errors = ValidationError::new();

        let name_len = self.name.chars().count();
        if name_len == 0 || name_len > NAME_MAX_CHARS {
            errors.add("name", format!("must be between 1 and {} characters", NAME_MAX_CHARS));
        }

        let email = match normalize_email(&self.email) {
            Some(email) => email,
            None => {
                errors.add("email", "is not a valid email address");
                self.email.clone()
            }
        };

        if self.password.chars().count() < PASSWORD_MIN_CHARS {
            errors.add("password", format!("must be at least {} characters", PASSWORD_MIN_CHARS));
        }

        errors.into_result()?;
        Ok(Self { email, ..self })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    /// Only the email is checked; any password is compared as given.
    pub fn validate(self) -> Result<Self, ValidationError> {
        let email = normalize_email(&self.email)
            .ok_or_else(|| ValidationError::single("email", "is not a valid email address"))?;
        Ok(Self { email, ..self })
    }
}

/// Public projection of a user. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub token: String,
}

/// Returns the address with its domain lower-cased, or `None` when the
/// syntax is not acceptable.
pub fn normalize_email(raw: &str) -> Option<String> {
    if raw.chars().count() > EMAIL_MAX_CHARS {
        return None;
    }

    let (local, domain) = raw.split_once('@')?;
    if !is_valid_local_part(local) || !is_valid_domain(domain) {
        return None;
    }

    Some(format!("{}@{}", local, domain.to_ascii_lowercase()))
}

fn is_valid_local_part(local: &str) -> bool {
    !local.is_empty()
        && local.chars().count() <= EMAIL_LOCAL_MAX_CHARS
        && !local.starts_with('.')
        && !local.ends_with('.')
        && !local.contains("..")
        && local
            .chars()
            .all(|c| c.is_alphanumeric() || EMAIL_LOCAL_SPECIALS.contains(c))
}

fn is_valid_domain(domain: &str) -> bool {
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }

    let labels_ok = labels.iter().all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    });

    // checked above: labels is non-empty
    let tld = labels[labels.len() - 1];
    labels_ok && tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic())
}
