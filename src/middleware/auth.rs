use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::future::{ready, Ready};

use crate::config::SecurityConfig;
use crate::core::{AppError, Result};

type HmacSha256 = Hmac<Sha256>;

pub const USER_ID_HEADER: &str = "X-User-Id";
pub const USER_ROLE_HEADER: &str = "X-User-Role";
pub const AUTH_SIGNATURE_HEADER: &str = "X-Auth-Signature";
pub const CALLBACK_SIGNATURE_HEADER: &str = "X-Callback-Signature";

/// Secrets shared with the upstream auth service and the VA aggregator
#[derive(Debug, Clone)]
pub struct AuthSettings {
    signing_secret: String,
    callback_secret: String,
}

impl AuthSettings {
    pub fn new(signing_secret: impl Into<String>, callback_secret: impl Into<String>) -> Self {
        Self {
            signing_secret: signing_secret.into(),
            callback_secret: callback_secret.into(),
        }
    }

    /// Check an aggregator callback body against its signature header
    pub fn verify_callback(&self, body: &[u8], signature: &str) -> Result<()> {
        verify_hex_hmac(&self.callback_secret, body, signature)
            .map_err(|_| AppError::unauthorized("Invalid callback signature"))
    }
}

impl From<&SecurityConfig> for AuthSettings {
    fn from(config: &SecurityConfig) -> Self {
        Self::new(&config.auth_signing_secret, &config.callback_secret)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// Caller identity asserted by the upstream auth service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub role: Role,
}

/// Caller with the admin role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminUser(pub AuthenticatedUser);

/// Signature the auth service attaches to `X-User-Id` / `X-User-Role`
pub fn sign_identity(secret: &str, user_id: &str, role: Role) -> String {
    sign_payload(secret, format!("{}:{}", user_id, role.as_str()).as_bytes())
}

/// Hex-encoded HMAC-SHA256 of a payload
pub fn sign_payload(secret: &str, payload: &[u8]) -> String {
    // HMAC accepts keys of any length
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return String::new(),
    };
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

fn verify_hex_hmac(secret: &str, payload: &[u8], signature: &str) -> Result<()> {
    let expected = hex::decode(signature.trim())
        .map_err(|_| AppError::unauthorized("Malformed signature"))?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::internal(format!("Invalid HMAC key: {}", e)))?;
    mac.update(payload);

    // Constant-time comparison
    mac.verify_slice(&expected)
        .map_err(|_| AppError::unauthorized("Signature mismatch"))
}

fn header<'a>(req: &'a HttpRequest, name: &str) -> Result<&'a str> {
    req.headers()
        .get(name)
        .and_then(|h| h.to_str().ok())
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::unauthorized(format!("Missing {} header", name)))
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser> {
    let settings = req
        .app_data::<web::Data<AuthSettings>>()
        .ok_or_else(|| AppError::internal("Auth settings not configured"))?;

    let user_id = header(req, USER_ID_HEADER)?;
    let role = Role::parse(header(req, USER_ROLE_HEADER)?)
        .ok_or_else(|| AppError::unauthorized("Unknown role"))?;
    let signature = header(req, AUTH_SIGNATURE_HEADER)?;

    let payload = format!("{}:{}", user_id, role.as_str());
    verify_hex_hmac(&settings.signing_secret, payload.as_bytes(), signature).map_err(|_| {
        tracing::warn!(user_id = %user_id, "Rejected identity with invalid signature");
        AppError::unauthorized("Invalid identity signature")
    })?;

    Ok(AuthenticatedUser {
        user_id: user_id.to_string(),
        role,
    })
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

impl FromRequest for AdminUser {
    type Error = AppError;
    type Future = Ready<Result<Self>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).and_then(|user| match user.role {
            Role::Admin => Ok(AdminUser(user)),
            Role::User => Err(AppError::forbidden("Admin role required")),
        }))
    }
}
