use serde::Serialize;
use uuid::Uuid;

use super::repo_types::User;

/// Public part of a user returned to clients.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    #[test]
    fn public_user_never_carries_the_credential() {
        let user = User {
            id: Uuid::new_v4(),
            username: "asha".into(),
            email: "asha@example.com".into(),
            password_hash: "$argon2id$v=19$secret".into(),
            created_at: OffsetDateTime::now_utc(),
        };

        let raw = serde_json::to_value(&user).unwrap();
        assert!(raw.get("password_hash").is_none());

        let json = serde_json::to_string(&PublicUser::from(user)).unwrap();
        assert!(json.contains("asha@example.com"));
        assert!(!json.contains("argon2"));
        assert!(!json.contains("password"));
    }
}
