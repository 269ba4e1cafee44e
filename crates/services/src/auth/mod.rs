use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use bson::oid::ObjectId;
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use taskhub_config::JwtSettings;
use taskhub_db::models::User;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    BadCredentials,
    #[error("Token expired")]
    Expired,
    #[error("Invalid token: {0}")]
    BadToken(String),
    #[error("Password hashing failed: {0}")]
    Hash(String),
}

/// JWT payload. `sub` carries the user id as hex; `kind` keeps the
/// short-lived access token and the long-lived refresh token from
/// being replayed as one another.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub kind: TokenKind,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
}

pub struct AuthService {
    issuer: String,
    access_ttl_secs: u64,
    refresh_ttl_secs: u64,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl AuthService {
    pub fn new(jwt: JwtSettings) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(jwt.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(jwt.secret.as_bytes()),
            issuer: jwt.issuer,
            access_ttl_secs: jwt.access_token_ttl_secs,
            refresh_ttl_secs: jwt.refresh_token_ttl_secs,
        }
    }

    pub fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::Hash(e.to_string()))
    }

    /// Checks `password` against the user's stored hash. A user record
    /// without a hash never authenticates.
    pub fn verify_credentials(&self, user: &User, password: &str) -> Result<(), AuthError> {
        let hash = user
            .password_hash
            .as_deref()
            .ok_or(AuthError::BadCredentials)?;
        let parsed = PasswordHash::new(hash).map_err(|e| AuthError::Hash(e.to_string()))?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|_| AuthError::BadCredentials)
    }

    pub fn issue_tokens(&self, user_id: ObjectId, email: &str) -> Result<TokenPair, AuthError> {
        Ok(TokenPair {
            access_token: self.mint(user_id, email, TokenKind::Access, self.access_ttl_secs)?,
            refresh_token: self.mint(user_id, email, TokenKind::Refresh, self.refresh_ttl_secs)?,
            expires_in: self.access_ttl_secs,
        })
    }

    /// Validates an access token and returns its claims.
    pub fn authenticate(&self, token: &str) -> Result<Claims, AuthError> {
        self.decode_kind(token, TokenKind::Access)
    }

    /// Validates a refresh token and returns its claims.
    pub fn check_refresh(&self, token: &str) -> Result<Claims, AuthError> {
        self.decode_kind(token, TokenKind::Refresh)
    }

    fn mint(
        &self,
        user_id: ObjectId,
        email: &str,
        kind: TokenKind,
        ttl_secs: u64,
    ) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_hex(),
            email: email.to_string(),
            iat: now,
            exp: now + ttl_secs as i64,
            iss: self.issuer.clone(),
            kind,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::BadToken(e.to_string()))
    }

    fn decode_kind(&self, token: &str, kind: TokenKind) -> Result<Claims, AuthError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);

        let data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::BadToken(e.to_string()),
            })?;

        if data.claims.kind != kind {
            return Err(AuthError::BadToken("Wrong token kind".to_string()));
        }
        Ok(data.claims)
    }
}
