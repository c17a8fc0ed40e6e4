use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use hmac::{Hmac, Mac};
use rand::Rng;
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use std::time::Duration;
use tracing::{info, warn};

use super::{AuthError, AuthProvider, LoginRequest, LoginResponse, RegisterRequest, UserProfile};
use crate::config::AuthConfig;

type HmacSha256 = Hmac<Sha256>;

const SALT_LEN: usize = 16;

#[derive(Debug, Clone)]
struct StoredUser {
    full_name: String,
    email: String,
    mobile: Option<String>,
    salt: String,
    password_hash: String,
}

impl StoredUser {
    fn profile(&self) -> UserProfile {
        UserProfile {
            name: self.full_name.clone(),
            email: self.email.clone(),
            mobile: self.mobile.clone(),
        }
    }
}

/// Users keyed by lower-cased email
pub struct InMemoryAuthProvider {
    users: DashMap<String, StoredUser>,
    secret: SecretString,
    token_ttl: Duration,
}

impl InMemoryAuthProvider {
    pub fn new(secret: SecretString, token_ttl: Duration) -> Self {
        Self {
            users: DashMap::new(),
            secret,
            token_ttl,
        }
    }

    /// Use the configured secret or generate a process-local one
    pub fn from_config(config: &AuthConfig) -> Self {
        let secret = match &config.token_secret {
            Some(secret) => secret.clone(),
            None => {
                warn!("No auth token secret configured, tokens will not survive a restart");
                let bytes: [u8; 32] = rand::thread_rng().gen();
                SecretString::new(hex::encode(bytes))
            }
        };
        Self::new(secret, Duration::from_secs(config.token_ttl_secs))
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    fn mac(&self) -> HmacSha256 {
        // HMAC accepts keys of any length.
        HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .unwrap_or_else(|_| unreachable!("HMAC accepts any key length"))
    }

    fn issue_token(&self, email: &str, now: i64) -> String {
        let expiry = now + self.token_ttl.as_secs() as i64;
        let payload = format!("{}.{}", hex::encode(email), expiry);
        let mut mac = self.mac();
        mac.update(payload.as_bytes());
        format!("{}.{}", payload, hex::encode(mac.finalize().into_bytes()))
    }

    /// Check signature and expiry, returning the token's email
    fn check_token(&self, token: &str, now: i64) -> Result<String, AuthError> {
        let mut parts = token.split('.');
        let (Some(email_hex), Some(expiry), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(AuthError::InvalidToken("malformed token".to_string()));
        };

        let signature = hex::decode(signature)
            .map_err(|_| AuthError::InvalidToken("malformed signature".to_string()))?;
        let mut mac = self.mac();
        mac.update(format!("{}.{}", email_hex, expiry).as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| AuthError::InvalidToken("bad signature".to_string()))?;

        let expiry: i64 = expiry
            .parse()
            .map_err(|_| AuthError::InvalidToken("malformed expiry".to_string()))?;
        if now >= expiry {
            return Err(AuthError::InvalidToken("token expired".to_string()));
        }

        let email = hex::decode(email_hex)
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .ok_or_else(|| AuthError::InvalidToken("malformed subject".to_string()))?;
        Ok(email)
    }
}

fn password_mac(salt: &str, password: &str) -> HmacSha256 {
    let mut mac = HmacSha256::new_from_slice(salt.as_bytes())
        .unwrap_or_else(|_| unreachable!("HMAC accepts any key length"));
    mac.update(password.as_bytes());
    mac
}

/// HMAC-SHA256 of the password keyed by the salt, hex encoded
fn hash_password(salt: &str, password: &str) -> String {
    hex::encode(password_mac(salt, password).finalize().into_bytes())
}

/// Constant-time comparison against a stored hash
fn verify_password(salt: &str, password: &str, stored_hash: &str) -> bool {
    match hex::decode(stored_hash) {
        Ok(expected) => password_mac(salt, password).verify_slice(&expected).is_ok(),
        Err(_) => false,
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[async_trait]
impl AuthProvider for InMemoryAuthProvider {
    async fn register(&self, request: RegisterRequest) -> Result<UserProfile, AuthError> {
        request.validate()?;
        let key = normalize_email(&request.email);

        match self.users.entry(key.clone()) {
            Entry::Occupied(_) => Err(AuthError::UserExists),
            Entry::Vacant(slot) => {
                let salt_bytes: [u8; SALT_LEN] = rand::thread_rng().gen();
                let salt = hex::encode(salt_bytes);
                let user = StoredUser {
                    full_name: request.full_name.trim().to_string(),
                    email: key,
                    mobile: request.mobile,
                    password_hash: hash_password(&salt, &request.password),
                    salt,
                };
                let profile = user.profile();
                slot.insert(user);
                info!("Registered new user");
                Ok(profile)
            }
        }
    }

    async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AuthError> {
        let key = normalize_email(&request.email);
        let user = self
            .users
            .get(&key)
            .map(|u| u.clone())
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(&user.salt, &request.password, &user.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(LoginResponse {
            token: self.issue_token(&user.email, Utc::now().timestamp()),
            user: user.profile(),
        })
    }

    async fn verify(&self, token: &str) -> Result<UserProfile, AuthError> {
        let email = self.check_token(token, Utc::now().timestamp())?;
        self.users
            .get(&email)
            .map(|u| u.profile())
            .ok_or_else(|| AuthError::InvalidToken("unknown user".to_string()))
    }
}
