use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    User,
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "USER"),
            Role::Admin => write!(f, "ADMIN"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(Role::User),
            "ADMIN" => Ok(Role::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    /// Formatted `NNN-NN-NNNN`, unique.
    pub identity_id: String,
    /// Stored lowercased, unique.
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub profile_image_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_never_serializes() {
        let user = User {
            id: Uuid::new_v4(),
            identity_id: "123-45-6789".into(),
            email: "t@example.com".into(),
            password_hash: "$argon2id$secret".into(),
            role: Role::User,
            first_name: "Tess".into(),
            last_name: "Traveler".into(),
            phone: None,
            street_address: None,
            city: Some("Denver".into()),
            state: Some("CO".into()),
            zip: Some("80202".into()),
            profile_image_url: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let raw = serde_json::to_string(&user).unwrap();
        assert!(!raw.contains("argon2"));
        assert!(!raw.contains("passwordHash"));
        assert!(raw.contains("\"identityId\":\"123-45-6789\""));
    }

    #[test]
    fn role_round_trips() {
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(Role::User.to_string(), "USER");
        assert!("SUPERUSER".parse::<Role>().is_err());
    }
}
