//! Users, the signed-in account, and access tokens.

use serde::{Deserialize, Serialize};

use super::cart::Cart;
use super::id::UserId;
use super::status::Role;
use super::timestamp::Timestamp;

/// A user as returned by the `/users` resource.
///
/// The users listing omits `email` and `role`; single-user responses may
/// carry them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    pub fullname: String,
    #[serde(default)]
    pub role: Option<Role>,
    pub is_active: bool,
    pub created_at: Timestamp,
    #[serde(default)]
    pub carts: Vec<Cart>,
}

/// Request body for creating or replacing a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInput {
    pub fullname: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

/// The signed-in user's own account (`/me`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub fullname: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: Timestamp,
    #[serde(default)]
    pub carts: Vec<Cart>,
}

impl Account {
    /// Whether the account may manage catalog resources.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Request body for editing the signed-in account. The password is required.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountUpdate {
    pub username: String,
    pub fullname: String,
    pub password: String,
}

impl std::fmt::Debug for AccountUpdate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountUpdate")
            .field("username", &self.username)
            .field("fullname", &self.fullname)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Bearer token issued by `POST /login/`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_user_listing_shape_without_email() {
        let user: User = serde_json::from_value(json!({
            "id": 2,
            "username": "ann",
            "fullname": "Ann Lee",
            "is_active": true,
            "created_at": "2025-01-01T00:00:00",
            "carts": []
        }))
        .unwrap();
        assert!(user.email.is_none());
        assert!(user.role.is_none());
    }

    #[test]
    fn test_account_is_admin() {
        let account: Account = serde_json::from_value(json!({
            "id": 1,
            "username": "root",
            "email": "root@example.com",
            "fullname": "Root",
            "role": "admin",
            "is_active": true,
            "created_at": "2025-01-01T00:00:00Z",
            "carts": []
        }))
        .unwrap();
        assert!(account.is_admin());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let update = AccountUpdate {
            username: "ann".to_string(),
            fullname: "Ann".to_string(),
            password: "hunter2-very-secret".to_string(),
        };
        let token = AccessToken {
            access_token: "eyJ-secret-token".to_string(),
            token_type: "bearer".to_string(),
        };

        let debug_output = format!("{update:?} {token:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("hunter2-very-secret"));
        assert!(!debug_output.contains("eyJ-secret-token"));
    }
}
