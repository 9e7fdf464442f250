/**
 * Authentication Handler Types
 *
 * Request and response bodies shared by the signup, login and me handlers.
 */

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::models::{Role, User};

/// Sign up request
#[derive(Deserialize, Serialize, Debug)]
pub struct SignupRequest {
    /// 3-30 chars, starts with a letter, letters/digits/underscore
    pub username: String,
    pub email: String,
    /// At least 6 characters; hashed before storage
    pub password: String,
}

/// Login request
#[derive(Deserialize, Serialize, Debug)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Account fields returned after signup and login
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AccountSummary {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
}

impl From<&User> for AccountSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// Login response body. The token is also set as the `accessToken` cookie.
#[derive(Serialize, Deserialize, Debug)]
pub struct AuthResponse {
    pub token: String,
    pub user: AccountSummary,
}
