/**
 * Session Management and JWT Tokens
 *
 * This module issues and validates the HS256 session tokens used by every
 * protected route, and builds the `accessToken` cookie that carries them for
 * browser clients.
 *
 * # Claims
 *
 * - `sub` - user id
 * - `username`, `role` - identity at issue time
 * - `iat`, `exp` - Unix seconds; `exp` is enforced on verification
 */

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use crate::shared::models::{Role, User};

/// Name of the cookie that carries the session token
pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// User ID
    pub sub: String,
    pub username: String,
    pub role: Role,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
    /// Issued at time (Unix timestamp)
    pub iat: u64,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid, uuid::Error> {
        Uuid::parse_str(&self.sub)
    }
}

fn now_secs() -> u64 {
    Utc::now().timestamp().max(0) as u64
}

/// Signs and verifies session tokens with one shared secret.
#[derive(Clone)]
pub struct SessionManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl SessionManager {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Create a token for `user` that expires after the configured TTL
    pub fn issue(&self, user: &User) -> Result<String, jsonwebtoken::errors::Error> {
        let now = now_secs();
        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            role: user.role,
            exp: now + self.ttl.as_secs(),
            iat: now,
        };
        self.sign(&claims)
    }

    /// Sign arbitrary claims. `issue` is the normal entry point.
    pub fn sign(&self, claims: &Claims) -> Result<String, jsonwebtoken::errors::Error> {
        encode(&Header::default(), claims, &self.encoding)
    }

    /// Check signature and expiry, returning the decoded claims
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())?;
        Ok(data.claims)
    }

    /// `Set-Cookie` value carrying `token`
    pub fn session_cookie(&self, token: &str) -> String {
        format!(
            "{}={}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}",
            ACCESS_TOKEN_COOKIE,
            token,
            self.ttl.as_secs()
        )
    }

    /// `Set-Cookie` value that removes the session cookie
    pub fn clear_cookie() -> String {
        format!(
            "{}=; HttpOnly; SameSite=Strict; Path=/; Max-Age=0",
            ACCESS_TOKEN_COOKIE
        )
    }
}

/// Find the session token in a `Cookie` header value.
pub fn token_from_cookie_header(header: &str) -> Option<&str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == ACCESS_TOKEN_COOKIE)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}
