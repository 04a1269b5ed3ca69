use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored account. The hash is kept under the document key `password`.
///
/// Not serialised into HTTP bodies; handlers project to `UserResponse`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(rename = "password")]
    pub password_hash: String,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: String, email: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            email,
            password_hash,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_ids_are_unique() {
        let a = User::new("Ana".into(), "a@x.com".into(), "hash".into());
        let b = User::new("Ana".into(), "a@x.com".into(), "hash".into());
        assert!(!a.id.is_empty());
        assert_ne!(a.id, b.id);
        assert!(Uuid::parse_str(&a.id).is_ok());
    }

    #[test]
    fn test_document_layout() {
        let user = User::new("Ana".into(), "a@x.com".into(), "$2b$04$hash".into());
        let doc = bson::to_document(&user).unwrap();

        assert_eq!(doc.get_str("id").unwrap(), user.id);
        assert_eq!(doc.get_str("password").unwrap(), "$2b$04$hash");
        assert!(doc.get("password_hash").is_none());
        assert!(doc.get_datetime("created_at").is_ok());

        let back: User = bson::from_document(doc).unwrap();
        assert_eq!(back.id, user.id);
        assert_eq!(back.created_at.timestamp_millis(), user.created_at.timestamp_millis());
    }
}
