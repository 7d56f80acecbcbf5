// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Access/refresh token signing and verification.
//!
//! Both token kinds are HS256 JWTs signed with the same key and
//! distinguished by a `typ` claim, so one kind can never be replayed as
//! the other. Verification is soft-fail: an invalid token is `None`, never
//! an error — callers treat it as an ordinary authentication-denied
//! outcome.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Access token lifetime: 15 minutes.
pub const ACCESS_TTL_SECS: u64 = 15 * 60;
/// Refresh token lifetime: 7 days.
pub const REFRESH_TTL_SECS: u64 = 7 * 24 * 60 * 60;

const TYP_ACCESS: &str = "access";
const TYP_REFRESH: &str = "refresh";

/// Claims carried by an access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AccessClaims {
    /// Subject (user id)
    pub sub: String,
    /// Token kind tag
    pub typ: String,
    /// Issued at (Unix timestamp)
    pub iat: usize,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
}

/// Claims carried by a refresh token.
///
/// `rv` is required: a refresh token is only valid while it equals the
/// user's stored refresh version, which is how revocation works without
/// any server-side token storage.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RefreshClaims {
    pub sub: String,
    pub typ: String,
    /// Refresh version at issuance
    pub rv: u64,
    pub iat: usize,
    pub exp: usize,
}

/// Token signing/verification service.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenService {
    pub fn new(signing_key: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(signing_key),
            decoding_key: DecodingKey::from_secret(signing_key),
        }
    }

    fn now() -> usize {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as usize)
            .unwrap_or(0)
    }

    /// Sign an access token for a user.
    pub fn sign_access(&self, user_id: &str) -> anyhow::Result<String> {
        let now = Self::now();
        let claims = AccessClaims {
            sub: user_id.to_string(),
            typ: TYP_ACCESS.to_string(),
            iat: now,
            exp: now + ACCESS_TTL_SECS as usize,
        };
        Ok(encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.encoding_key,
        )?)
    }

    /// Sign a refresh token bound to the user's current refresh version.
    pub fn sign_refresh(&self, user_id: &str, refresh_version: u64) -> anyhow::Result<String> {
        let now = Self::now();
        let claims = RefreshClaims {
            sub: user_id.to_string(),
            typ: TYP_REFRESH.to_string(),
            rv: refresh_version,
            iat: now,
            exp: now + REFRESH_TTL_SECS as usize,
        };
        Ok(encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.encoding_key,
        )?)
    }

    /// Verify an access token. `None` on bad signature, expiry, or wrong
    /// token kind.
    pub fn verify_access(&self, token: &str) -> Option<AccessClaims> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<AccessClaims>(token, &self.decoding_key, &validation).ok()?;
        (data.claims.typ == TYP_ACCESS).then_some(data.claims)
    }

    /// Verify a refresh token. `None` on bad signature, expiry, wrong
    /// kind, or missing `rv` (a decode failure, since the field is typed).
    pub fn verify_refresh(&self, token: &str) -> Option<RefreshClaims> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<RefreshClaims>(token, &self.decoding_key, &validation).ok()?;
        (data.claims.typ == TYP_REFRESH).then_some(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(b"test_signing_key_32_bytes_long!!")
    }

    #[test]
    fn test_access_roundtrip() {
        let tokens = service();
        let token = tokens.sign_access("user-1").unwrap();

        let claims = tokens.verify_access(&token).expect("valid access token");
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.typ, "access");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_refresh_roundtrip_carries_version() {
        let tokens = service();
        let token = tokens.sign_refresh("user-1", 5).unwrap();

        let claims = tokens.verify_refresh(&token).expect("valid refresh token");
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.rv, 5);
    }

    #[test]
    fn test_access_token_rejected_as_refresh() {
        let tokens = service();
        let access = tokens.sign_access("user-1").unwrap();
        // The access claims have no `rv`, so refresh decoding fails outright.
        assert!(tokens.verify_refresh(&access).is_none());
    }

    #[test]
    fn test_refresh_token_rejected_as_access() {
        let tokens = service();
        let refresh = tokens.sign_refresh("user-1", 1).unwrap();
        // Decodes structurally (extra fields are ignored) but the typ tag
        // must still reject it.
        assert!(tokens.verify_access(&refresh).is_none());
    }

    #[test]
    fn test_wrong_key_rejected() {
        let tokens = service();
        let other = TokenService::new(b"a_completely_different_key......");

        let token = tokens.sign_access("user-1").unwrap();
        assert!(other.verify_access(&token).is_none());
    }

    #[test]
    fn test_garbage_rejected() {
        let tokens = service();
        assert!(tokens.verify_access("not-a-jwt").is_none());
        assert!(tokens.verify_refresh("").is_none());
    }
}
