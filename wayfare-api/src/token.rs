//! Stateless bearer tokens: HMAC-signed claims carrying the principal.
//! Verification failures are split into missing / invalid / expired so the
//! middleware can answer with the precise code.

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use wayfare_core::error::DomainError;
use wayfare_core::principal::Principal;
use wayfare_core::user::User;

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub iat: usize,
    pub exp: usize,
}

pub fn issue(user: &User, secret: &str, ttl_seconds: u64) -> Result<String, DomainError> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user.id.to_string(),
        role: user.role.to_string(),
        email: user.email.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        iat: now as usize,
        exp: (now + ttl_seconds as i64) as usize,
    };
    sign(&claims, secret)
}

pub fn sign(claims: &Claims, secret: &str) -> Result<String, DomainError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| DomainError::internal(format!("token encoding failed: {e}")))
}

pub fn verify(raw: &str, secret: &str) -> Result<Principal, DomainError> {
    let data = decode::<Claims>(
        raw,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => DomainError::TokenExpired,
        _ => DomainError::TokenInvalid,
    })?;

    let claims = data.claims;
    let user_id = Uuid::parse_str(&claims.sub).map_err(|_| DomainError::TokenInvalid)?;
    let role = claims.role.parse().map_err(|_| DomainError::TokenInvalid)?;

    Ok(Principal {
        user_id,
        role,
        email: claims.email,
        first_name: claims.first_name,
        last_name: claims.last_name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayfare_core::user::Role;

    const SECRET: &str = "a-test-secret-that-is-long-enough!!";

    fn user(role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            identity_id: "123-45-6789".into(),
            email: "tess@example.com".into(),
            password_hash: "hash".into(),
            role,
            first_name: "Tess".into(),
            last_name: "Traveler".into(),
            phone: None,
            street_address: None,
            city: None,
            state: None,
            zip: None,
            profile_image_url: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn round_trip_preserves_the_principal() {
        let user = user(Role::Admin);
        let token = issue(&user, SECRET, 3600).unwrap();
        let principal = verify(&token, SECRET).unwrap();
        assert_eq!(principal.user_id, user.id);
        assert_eq!(principal.role, Role::Admin);
        assert_eq!(principal.email, user.email);
    }

    #[test]
    fn tampering_invalidates() {
        let token = issue(&user(Role::User), SECRET, 3600).unwrap();
        let mut tampered = token.clone();
        tampered.pop();
        assert!(matches!(
            verify(&tampered, SECRET),
            Err(DomainError::TokenInvalid)
        ));
        assert!(matches!(
            verify(&token, "another-secret-that-is-long-enough"),
            Err(DomainError::TokenInvalid)
        ));
    }

    #[test]
    fn expiry_is_its_own_error() {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            role: "USER".into(),
            email: "t@example.com".into(),
            first_name: "T".into(),
            last_name: "T".into(),
            iat: (now - 7200) as usize,
            // Past the default validation leeway
            exp: (now - 3600) as usize,
        };
        let token = sign(&claims, SECRET).unwrap();
        assert!(matches!(verify(&token, SECRET), Err(DomainError::TokenExpired)));
    }

    #[test]
    fn garbage_subject_is_invalid() {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "not-a-uuid".into(),
            role: "USER".into(),
            email: "t@example.com".into(),
            first_name: "T".into(),
            last_name: "T".into(),
            iat: now as usize,
            exp: (now + 3600) as usize,
        };
        let token = sign(&claims, SECRET).unwrap();
        assert!(matches!(verify(&token, SECRET), Err(DomainError::TokenInvalid)));
    }
}
