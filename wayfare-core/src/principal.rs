use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::user::Role;

/// The identity and role attached to an authenticated request. Built by the
/// auth middleware from a verified token and passed explicitly into services;
/// never stored globally.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub user_id: Uuid,
    pub role: Role,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Self-or-admin check used by the user endpoints.
    pub fn may_access_user(&self, user_id: Uuid) -> bool {
        self.user_id == user_id || self.is_admin()
    }
}

/// Requests on optionally-authenticated routes carry one of these instead of
/// a nullable principal.
#[derive(Debug, Clone)]
pub enum Auth {
    Anonymous,
    Authenticated(Principal),
}

impl Auth {
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Auth::Anonymous => None,
            Auth::Authenticated(p) => Some(p),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(role: Role) -> Principal {
        Principal {
            user_id: Uuid::new_v4(),
            role,
            email: "t@example.com".into(),
            first_name: "Tess".into(),
            last_name: "Traveler".into(),
        }
    }

    #[test]
    fn self_or_admin() {
        let user = principal(Role::User);
        assert!(user.may_access_user(user.user_id));
        assert!(!user.may_access_user(Uuid::new_v4()));

        let admin = principal(Role::Admin);
        assert!(admin.may_access_user(Uuid::new_v4()));
    }

    #[test]
    fn anonymous_has_no_principal() {
        assert!(Auth::Anonymous.principal().is_none());
        let auth = Auth::Authenticated(principal(Role::User));
        assert!(auth.principal().is_some());
    }
}
