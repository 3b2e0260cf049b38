// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signed, time-bounded access tokens.
//!
//! Tokens are compact JWS (HS256) strings: `base64url(header)`,
//! `base64url(claims)` and the HMAC-SHA256 signature over both, joined by
//! dots. The claims carry everything needed to rebuild the principal, so no
//! server-side session exists.
//!
//! Expiry is checked here against the caller's clock rather than by
//! `jsonwebtoken`, because it must be strict (`exp > now`, no leeway) and only
//! evaluated once the signature is known to be good.

use argon2::password_hash::rand_core::{OsRng, RngCore};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::{authority::AuthoritySet, principal::Principal, AuthError};

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Length of generated secrets, matching the SHA-256 block input.
const GENERATED_SECRET_LEN: usize = 64;

/// Claims carried inside every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (username)
    pub sub: String,
    /// Authorities granted at issuance
    pub authorities: AuthoritySet,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expires at (Unix seconds)
    pub exp: i64,
}

/// Process-wide HMAC key, fixed at startup.
#[derive(Clone)]
pub struct SigningSecret(Vec<u8>);

impl SigningSecret {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Random secret for processes started without one configured.
    pub fn generate() -> Self {
        let mut bytes = vec![0u8; GENERATED_SECRET_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SigningSecret(<redacted>)")
    }
}

/// Issues and validates tokens. Immutable after construction.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &SigningSecret, ttl: Duration) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.required_spec_claims.clear();

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign a token for `subject` valid from `now` until `now + ttl`.
    pub fn issue(
        &self,
        subject: &str,
        authorities: &AuthoritySet,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AuthError::Internal("token expiry overflows the clock".into()))?;

        let claims = TokenClaims {
            sub: subject.to_string(),
            authorities: authorities.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::new(ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(e.to_string()))
    }

    /// Validate a token and return the principal it was issued to.
    ///
    /// Any structural or signature problem is `TokenInvalid`; a well-signed
    /// token with `exp <= now` is `TokenExpired`.
    pub fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<Principal, AuthError> {
        let claims = self.decode_claims(token)?;

        if claims.exp <= now.timestamp() {
            return Err(AuthError::TokenExpired);
        }

        Ok(Principal::new(claims.sub, claims.authorities))
    }

    /// Verify the signature and decode the claims without checking expiry.
    pub fn decode_claims(&self, token: &str) -> Result<TokenClaims, AuthError> {
        decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| AuthError::TokenInvalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::authority::authority_set;

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_767_225_600, 0).unwrap()
    }

    fn service() -> TokenService {
        TokenService::new(
            &SigningSecret::new(b"test-secret-test-secret-test-secret".to_vec()),
            Duration::seconds(3600),
        )
    }

    fn admin_authorities() -> AuthoritySet {
        authority_set(["sys:user:view", "sys:user:edit", "sys:user:delete"])
    }

    #[test]
    fn issue_then_validate_round_trips_principal() {
        let svc = service();
        let token = svc.issue("admin", &admin_authorities(), t0()).unwrap();

        let principal = svc.validate(&token, t0()).unwrap();
        assert_eq!(principal.subject, "admin");
        assert_eq!(principal.authorities, admin_authorities());
    }

    #[test]
    fn claims_carry_issue_and_expiry_times() {
        let svc = service();
        let token = svc.issue("admin", &admin_authorities(), t0()).unwrap();
        let claims = svc.decode_claims(&token).unwrap();

        assert_eq!(claims.iat, t0().timestamp());
        assert_eq!(claims.exp, t0().timestamp() + 3600);
    }

    #[test]
    fn token_has_three_segments() {
        let token = service().issue("admin", &admin_authorities(), t0()).unwrap();
        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn expiry_is_strict() {
        let svc = service();
        let token = svc.issue("admin", &admin_authorities(), t0()).unwrap();

        let just_before = t0() + Duration::seconds(3599);
        let at_expiry = t0() + Duration::seconds(3600);
        let after = t0() + Duration::days(1);

        assert!(svc.validate(&token, just_before).is_ok());
        assert_eq!(svc.validate(&token, at_expiry), Err(AuthError::TokenExpired));
        assert_eq!(svc.validate(&token, after), Err(AuthError::TokenExpired));
    }

    #[test]
    fn any_single_character_change_is_rejected() {
        let svc = service();
        let token = svc.issue("admin", &admin_authorities(), t0()).unwrap();
        let chars: Vec<char> = token.chars().collect();

        for i in 0..chars.len() {
            let mut altered = chars.clone();
            altered[i] = if chars[i] == 'A' { 'B' } else { 'A' };
            let altered: String = altered.into_iter().collect();

            assert_eq!(
                svc.validate(&altered, t0()),
                Err(AuthError::TokenInvalid),
                "alteration at byte {i} was accepted"
            );
        }
    }

    #[test]
    fn token_signed_with_other_secret_is_invalid() {
        let other = TokenService::new(
            &SigningSecret::new(b"another-secret-another-secret-xx".to_vec()),
            Duration::seconds(3600),
        );
        let token = other.issue("admin", &admin_authorities(), t0()).unwrap();
        assert_eq!(service().validate(&token, t0()), Err(AuthError::TokenInvalid));
    }

    #[test]
    fn expired_token_with_bad_signature_is_invalid() {
        let other = TokenService::new(
            &SigningSecret::new(b"another-secret-another-secret-xx".to_vec()),
            Duration::seconds(1),
        );
        let token = other.issue("admin", &admin_authorities(), t0()).unwrap();
        let later = t0() + Duration::days(2);
        assert_eq!(service().validate(&token, later), Err(AuthError::TokenInvalid));
    }

    #[test]
    fn malformed_tokens_are_invalid() {
        let svc = service();
        for token in ["", "abc", "a.b", "a.b.c", "...", "Bearer x.y.z"] {
            assert_eq!(svc.validate(token, t0()), Err(AuthError::TokenInvalid));
        }
    }

    #[test]
    fn validation_is_idempotent() {
        let svc = service();
        let token = svc.issue("admin", &admin_authorities(), t0()).unwrap();
        let first = svc.validate(&token, t0()).unwrap();
        for _ in 0..5 {
            assert_eq!(svc.validate(&token, t0()).unwrap(), first);
        }
    }

    #[test]
    fn empty_authority_set_round_trips() {
        let svc = service();
        let token = svc.issue("guest", &AuthoritySet::new(), t0()).unwrap();
        assert!(svc.validate(&token, t0()).unwrap().authorities.is_empty());
    }

    #[test]
    fn oversized_ttl_fails_without_panicking() {
        let svc = TokenService::new(
            &SigningSecret::new(b"test-secret-test-secret-test-secret".to_vec()),
            Duration::seconds(9_000_000_000_000),
        );
        let err = svc.issue("admin", &admin_authorities(), t0()).unwrap_err();
        assert!(matches!(err, AuthError::Internal(_)));
        assert_eq!(err.status_code(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn generated_secrets_differ() {
        let a = SigningSecret::generate();
        let b = SigningSecret::generate();
        assert_ne!(a.as_bytes(), b.as_bytes());
        assert_eq!(format!("{a:?}"), "SigningSecret(<redacted>)");
    }
}
